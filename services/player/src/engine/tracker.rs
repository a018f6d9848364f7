//! services/player/src/engine/tracker.rs
//!
//! The playback state tracker: sole owner of the media resource and the single
//! source of truth for transport state.
//!
//! Play/pause and volume only change when the resource confirms them through
//! its own events. Playback rate has no confirmation event and is committed
//! immediately.

use lesson_player_core::{
    ports::{BindingId, MediaEvent, MediaEventKind, MediaListener, MediaResource},
    Lesson, PlaybackRate, PlaybackState,
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// What a media event did to the tracked state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The event came from a binding that is no longer current.
    Stale,
    Updated,
    Started,
    Paused,
    Ended,
}

/// The lesson media currently attached to listeners.
#[derive(Debug, Clone, PartialEq)]
struct Binding {
    id: BindingId,
    lesson_id: Uuid,
    url: String,
}

/// A value the host asked the resource for that has not been confirmed yet.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Requested<T> {
    value: Option<T>,
}

impl<T: Copy + PartialEq> Requested<T> {
    fn set(&mut self, value: T) {
        self.value = Some(value);
    }

    fn confirm(&mut self, confirmed: T) {
        if self.value == Some(confirmed) {
            self.value = None;
        }
    }

    fn clear(&mut self) {
        self.value = None;
    }
}

pub struct PlaybackTracker<M: MediaResource> {
    media: M,
    listener: Arc<dyn MediaListener>,
    state: PlaybackState,
    binding: Option<Binding>,
    next_binding: u64,
    requested_playing: Requested<bool>,
    requested_volume: Requested<f64>,
}

impl<M: MediaResource> PlaybackTracker<M> {
    pub fn new(media: M, listener: Arc<dyn MediaListener>) -> Self {
        Self {
            media,
            listener,
            state: PlaybackState::default(),
            binding: None,
            next_binding: 1,
            requested_playing: Requested::default(),
            requested_volume: Requested::default(),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn binding(&self) -> Option<BindingId> {
        self.binding.as_ref().map(|b| b.id)
    }

    pub fn bound_url(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.url.as_str())
    }

    /// Play state the host requested that the resource has not confirmed.
    pub fn pending_play(&self) -> Option<bool> {
        self.requested_playing.value
    }

    pub fn pending_volume(&self) -> Option<f64> {
        self.requested_volume.value
    }

    //=====================================================================================
    // Binding Lifecycle
    //=====================================================================================

    /// Rebinds the resource to `lesson`: detach, reset, load, attach.
    ///
    /// Binding to the lesson and URL that are already bound is a no-op.
    pub fn bind(&mut self, lesson: &Lesson) -> BindingId {
        if let Some(current) = &self.binding {
            if current.lesson_id == lesson.id && current.url == lesson.video_url {
                return current.id;
            }
        }

        self.unbind();

        self.state = PlaybackState::default();
        self.requested_playing.clear();
        self.requested_volume.clear();
        // No listeners are attached here, so the resource stays silent.
        self.media.set_volume(self.state.volume);
        self.media.set_playback_rate(self.state.playback_rate.as_f64());

        self.media.load(&lesson.video_url);

        let id = BindingId(self.next_binding);
        self.next_binding += 1;
        self.media.attach(id, self.listener.clone());
        self.binding = Some(Binding {
            id,
            lesson_id: lesson.id,
            url: lesson.video_url.clone(),
        });

        info!("Bound {} to lesson '{}' ({})", id, lesson.title, lesson.video_url);
        id
    }

    /// Detaches listeners from the current binding, if any.
    pub fn unbind(&mut self) {
        if let Some(previous) = self.binding.take() {
            self.media.detach(previous.id);
            debug!("Detached {}", previous.id);
        }
    }

    //=====================================================================================
    // Resource Events
    //=====================================================================================

    pub fn handle_event(&mut self, event: MediaEvent) -> EventOutcome {
        let is_current = self
            .binding
            .as_ref()
            .is_some_and(|binding| binding.id == event.binding);
        if !is_current {
            debug!("Ignoring {:?} from stale {}", event.kind, event.binding);
            return EventOutcome::Stale;
        }

        match event.kind {
            MediaEventKind::TimeUpdate(time) => {
                self.state.current_time = if self.state.duration > 0.0 {
                    self.state.clamp_time(time)
                } else if time.is_finite() {
                    time.max(0.0)
                } else {
                    0.0
                };
                EventOutcome::Updated
            }
            MediaEventKind::DurationChange(duration) => {
                if duration.is_finite() && duration > 0.0 {
                    self.state.duration = duration;
                    self.state.current_time = self.state.clamp_time(self.state.current_time);
                    debug!("Duration known: {:.2}s", duration);
                } else {
                    warn!("Ignoring unusable duration {}", duration);
                }
                EventOutcome::Updated
            }
            MediaEventKind::Play => {
                self.state.is_playing = true;
                self.requested_playing.confirm(true);
                EventOutcome::Started
            }
            MediaEventKind::Pause => {
                self.state.is_playing = false;
                self.requested_playing.confirm(false);
                EventOutcome::Paused
            }
            MediaEventKind::VolumeChange(volume) => {
                let volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 0.0 };
                self.state.volume = volume;
                self.requested_volume.confirm(volume);
                EventOutcome::Updated
            }
            MediaEventKind::Ended => {
                self.state.is_playing = false;
                self.requested_playing.clear();
                EventOutcome::Ended
            }
            MediaEventKind::Error(message) => {
                warn!(
                    "Media failed to load {}: {}",
                    self.bound_url().unwrap_or("<unbound>"),
                    message
                );
                self.state.load_error = Some(message);
                EventOutcome::Updated
            }
        }
    }

    //=====================================================================================
    // Transport Operations
    //=====================================================================================

    /// Asks the resource to play or pause based on the confirmed state.
    pub fn toggle_play(&mut self) {
        if self.state.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn play(&mut self) {
        if self.binding.is_none() {
            return;
        }
        self.requested_playing.set(true);
        self.media.play();
    }

    pub fn pause(&mut self) {
        if self.binding.is_none() {
            return;
        }
        self.requested_playing.set(false);
        self.media.pause();
    }

    /// Moves the resource to `time`, clamped to `[0, duration]`.
    ///
    /// `current_time` follows when the resource reports its new position.
    pub fn seek(&mut self, time: f64) {
        if self.binding.is_none() {
            return;
        }
        let target = self.state.clamp_time(time);
        debug!("Seeking to {:.2}s (requested {:.2}s)", target, time);
        self.media.set_current_time(target);
    }

    /// A jump requested by a sibling panel. Same contract as [`Self::seek`].
    pub fn external_seek(&mut self, time: f64) {
        self.seek(time);
    }

    pub fn set_volume(&mut self, volume: f64) {
        if self.binding.is_none() {
            return;
        }
        let volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 0.0 };
        if volume == self.state.volume {
            // Resources only report actual changes.
            self.requested_volume.clear();
        } else {
            self.requested_volume.set(volume);
        }
        self.media.set_volume(volume);
    }

    pub fn set_playback_rate(&mut self, rate: PlaybackRate) {
        self.media.set_playback_rate(rate.as_f64());
        self.state.playback_rate = rate;
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.state.is_fullscreen = fullscreen;
    }

    pub fn set_show_controls(&mut self, visible: bool) {
        self.state.show_controls = visible;
    }
}

impl<M: MediaResource> Drop for PlaybackTracker<M> {
    fn drop(&mut self) {
        self.unbind();
    }
}
