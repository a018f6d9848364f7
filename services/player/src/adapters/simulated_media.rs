//! services/player/src/adapters/simulated_media.rs
//!
//! An in-process media element. It implements the `MediaResource` port with a
//! virtual playhead, a catalogue of known sources and a log of every command it
//! received, so the binary can run without a real decoder and tests can drive
//! the engine deterministically.

use lesson_player_core::ports::{BindingId, MediaEvent, MediaEventKind, MediaListener, MediaResource};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// A command the resource received, recorded in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCommand {
    Load(String),
    Play,
    Pause,
    SetCurrentTime(f64),
    SetVolume(f64),
    SetPlaybackRate(f64),
    Attach(BindingId),
    Detach(BindingId),
}

struct Inner {
    catalogue: HashMap<String, f64>,
    source: Option<String>,
    metadata_pending: bool,
    paused: bool,
    current_time: f64,
    duration: f64,
    volume: f64,
    rate: f64,
    autoplay_blocked: bool,
    listeners: Vec<(BindingId, Arc<dyn MediaListener>)>,
    commands: Vec<MediaCommand>,
    loads: usize,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            catalogue: HashMap::new(),
            source: None,
            metadata_pending: false,
            paused: true,
            current_time: 0.0,
            duration: 0.0,
            volume: 1.0,
            rate: 1.0,
            autoplay_blocked: false,
            listeners: Vec::new(),
            commands: Vec::new(),
            loads: 0,
        }
    }
}

impl Inner {
    fn clamp(&self, time: f64) -> f64 {
        if !time.is_finite() {
            return 0.0;
        }
        time.clamp(0.0, self.duration.max(0.0))
    }
}

/// A cloneable handle to one simulated media element.
#[derive(Clone, Default)]
pub struct SimulatedMedia {
    inner: Arc<Mutex<Inner>>,
}

impl fmt::Debug for SimulatedMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("SimulatedMedia")
            .field("source", &inner.source)
            .field("paused", &inner.paused)
            .field("current_time", &inner.current_time)
            .field("duration", &inner.duration)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl SimulatedMedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a source URL the element can load, with its duration in seconds.
    pub fn with_source(self, url: impl Into<String>, duration: f64) -> Self {
        self.lock().catalogue.insert(url.into(), duration);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Delivers `kinds` to every attached listener, outside the lock.
    fn dispatch(&self, listeners: Vec<(BindingId, Arc<dyn MediaListener>)>, kinds: Vec<MediaEventKind>) {
        for kind in kinds {
            for (binding, listener) in &listeners {
                listener.on_event(MediaEvent::new(*binding, kind.clone()));
            }
        }
    }

    /// Runs `f` against the element state and dispatches the events it returns.
    fn apply<F>(&self, f: F)
    where
        F: FnOnce(&mut Inner) -> Vec<MediaEventKind>,
    {
        let (listeners, kinds) = {
            let mut inner = self.lock();
            let kinds = f(&mut *inner);
            (inner.listeners.clone(), kinds)
        };
        self.dispatch(listeners, kinds);
    }

    /// Advances the virtual playhead by `seconds` of wall time.
    ///
    /// The first tick after a load reports metadata (or an error for unknown
    /// sources). While playing, position advances by `seconds * rate` and the
    /// element pauses and reports the end once the duration is reached.
    pub fn tick(&self, seconds: f64) {
        self.apply(|inner| {
            let mut kinds = Vec::new();
            let Some(source) = inner.source.clone() else {
                return kinds;
            };

            if inner.metadata_pending {
                inner.metadata_pending = false;
                match inner.catalogue.get(&source).copied() {
                    Some(duration) => {
                        inner.duration = duration;
                        kinds.push(MediaEventKind::DurationChange(duration));
                    }
                    None => {
                        kinds.push(MediaEventKind::Error(format!(
                            "source {} is unreachable or unsupported",
                            source
                        )));
                    }
                }
            }

            if !inner.paused && inner.duration > 0.0 {
                inner.current_time = (inner.current_time + seconds * inner.rate).min(inner.duration);
                kinds.push(MediaEventKind::TimeUpdate(inner.current_time));
                if inner.current_time >= inner.duration {
                    inner.paused = true;
                    kinds.push(MediaEventKind::Pause);
                    kinds.push(MediaEventKind::Ended);
                }
            }
            kinds
        });
    }

    /// Spawns a task that ticks the playhead every `interval` until `cancel` fires.
    pub fn spawn_clock(&self, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let media = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("Media clock stopped.");
                        return;
                    }
                    _ = ticker.tick() => media.tick(interval.as_secs_f64()),
                }
            }
        })
    }

    /// Makes `play()` silently fail, like a browser autoplay policy rejection.
    pub fn block_autoplay(&self, blocked: bool) {
        self.lock().autoplay_blocked = blocked;
    }

    pub fn commands(&self) -> Vec<MediaCommand> {
        self.lock().commands.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    pub fn source(&self) -> Option<String> {
        self.lock().source.clone()
    }

    pub fn load_count(&self) -> usize {
        self.lock().loads
    }

    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    pub fn position(&self) -> f64 {
        self.lock().current_time
    }

    pub fn playback_rate(&self) -> f64 {
        self.lock().rate
    }
}

impl MediaResource for SimulatedMedia {
    fn load(&mut self, url: &str) {
        let mut inner = self.lock();
        inner.commands.push(MediaCommand::Load(url.to_string()));
        inner.source = Some(url.to_string());
        inner.metadata_pending = true;
        inner.paused = true;
        inner.current_time = 0.0;
        inner.duration = 0.0;
        inner.loads += 1;
    }

    fn play(&mut self) {
        self.apply(|inner| {
            inner.commands.push(MediaCommand::Play);
            if inner.source.is_none() || inner.autoplay_blocked {
                debug!("play() rejected by the element.");
                return Vec::new();
            }
            if !inner.paused {
                return Vec::new();
            }
            let mut kinds = Vec::new();
            if inner.duration > 0.0 && inner.current_time >= inner.duration {
                inner.current_time = 0.0;
                kinds.push(MediaEventKind::TimeUpdate(0.0));
            }
            inner.paused = false;
            kinds.push(MediaEventKind::Play);
            kinds
        });
    }

    fn pause(&mut self) {
        self.apply(|inner| {
            inner.commands.push(MediaCommand::Pause);
            if inner.paused {
                return Vec::new();
            }
            inner.paused = true;
            vec![MediaEventKind::Pause]
        });
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.apply(|inner| {
            inner.commands.push(MediaCommand::SetCurrentTime(seconds));
            if inner.source.is_none() {
                return Vec::new();
            }
            inner.current_time = inner.clamp(seconds);
            vec![MediaEventKind::TimeUpdate(inner.current_time)]
        });
    }

    fn set_volume(&mut self, volume: f64) {
        self.apply(|inner| {
            inner.commands.push(MediaCommand::SetVolume(volume));
            if inner.volume == volume {
                return Vec::new();
            }
            inner.volume = volume;
            vec![MediaEventKind::VolumeChange(volume)]
        });
    }

    fn set_playback_rate(&mut self, rate: f64) {
        let mut inner = self.lock();
        inner.commands.push(MediaCommand::SetPlaybackRate(rate));
        inner.rate = rate;
    }

    fn attach(&mut self, binding: BindingId, listener: Arc<dyn MediaListener>) {
        let mut inner = self.lock();
        inner.commands.push(MediaCommand::Attach(binding));
        inner.listeners.push((binding, listener));
    }

    fn detach(&mut self, binding: BindingId) {
        let mut inner = self.lock();
        inner.commands.push(MediaCommand::Detach(binding));
        inner.listeners.retain(|(id, _)| *id != binding);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collect(Mutex<Vec<MediaEvent>>);

    impl MediaListener for Collect {
        fn on_event(&self, event: MediaEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    #[test]
    fn plays_to_the_end_and_reports_it() {
        let mut media = SimulatedMedia::new().with_source("intro.mp4", 2.0);
        let events = Arc::new(Collect::default());
        media.load("intro.mp4");
        media.attach(BindingId(7), events.clone());

        media.tick(0.5);
        media.play();
        media.tick(1.0);
        media.tick(1.5);

        let kinds: Vec<MediaEventKind> = events
            .0
            .lock()
            .unwrap()
            .iter()
            .map(|e| {
                assert_eq!(e.binding, BindingId(7));
                e.kind.clone()
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                MediaEventKind::DurationChange(2.0),
                MediaEventKind::Play,
                MediaEventKind::TimeUpdate(1.0),
                MediaEventKind::TimeUpdate(2.0),
                MediaEventKind::Pause,
                MediaEventKind::Ended,
            ]
        );
        assert!(media.is_paused());
    }

    #[test]
    fn detached_listeners_hear_nothing() {
        let mut media = SimulatedMedia::new().with_source("intro.mp4", 2.0);
        let events = Arc::new(Collect::default());
        media.load("intro.mp4");
        media.attach(BindingId(1), events.clone());
        media.detach(BindingId(1));
        media.tick(0.1);
        media.play();
        assert!(events.0.lock().unwrap().is_empty());
        assert_eq!(media.listener_count(), 0);
    }
}
