//! services/player/src/engine/transport.rs
//!
//! Translates user gestures on the transport bar into tracker and sequence calls.
//! The only state kept here is UI memory: the volume to restore on unmute and
//! whether the rate menu is open.

use crate::engine::tracker::PlaybackTracker;
use crate::error::EngineError;
use lesson_player_core::{ports::MediaResource, LessonSequence, PlaybackRate};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct TransportControls {
    skip_seconds: f64,
    previous_volume: f64,
    muted: bool,
    rate_menu_open: bool,
}

impl TransportControls {
    pub fn new(skip_seconds: f64) -> Self {
        Self {
            skip_seconds,
            previous_volume: 1.0,
            muted: false,
            rate_menu_open: false,
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn previous_volume(&self) -> f64 {
        self.previous_volume
    }

    pub fn rate_menu_open(&self) -> bool {
        self.rate_menu_open
    }

    /// Seeks to the clicked fraction of the progress strip.
    pub fn progress_click<M: MediaResource>(
        &self,
        tracker: &mut PlaybackTracker<M>,
        click_x: f64,
        track_width: f64,
    ) {
        if track_width.is_nan() || track_width <= 0.0 || !click_x.is_finite() {
            debug!("Ignoring progress click on a {}px track", track_width);
            return;
        }
        let fraction = (click_x / track_width).clamp(0.0, 1.0);
        let target = fraction * tracker.state().duration;
        tracker.seek(target);
    }

    pub fn skip_forward<M: MediaResource>(&self, tracker: &mut PlaybackTracker<M>) {
        let target = tracker.state().current_time + self.skip_seconds;
        tracker.seek(target);
    }

    pub fn skip_backward<M: MediaResource>(&self, tracker: &mut PlaybackTracker<M>) {
        let target = tracker.state().current_time - self.skip_seconds;
        tracker.seek(target);
    }

    /// Volume slider drag. Any drag ends the muted state.
    pub fn drag_volume<M: MediaResource>(&mut self, tracker: &mut PlaybackTracker<M>, volume: f64) {
        self.muted = false;
        tracker.set_volume(volume);
    }

    /// The mute icon: restore the remembered volume, or remember and silence.
    pub fn toggle_mute<M: MediaResource>(&mut self, tracker: &mut PlaybackTracker<M>) {
        let current = tracker.state().volume;
        if self.muted || current <= 0.0 {
            let restore = if self.previous_volume > 0.0 {
                self.previous_volume
            } else {
                1.0
            };
            self.muted = false;
            tracker.set_volume(restore);
        } else {
            self.previous_volume = current;
            self.muted = true;
            tracker.set_volume(0.0);
        }
    }

    pub fn toggle_rate_menu(&mut self) -> bool {
        self.rate_menu_open = !self.rate_menu_open;
        self.rate_menu_open
    }

    /// Applies a rate picked from the menu and closes it.
    ///
    /// Rates outside [`PlaybackRate::ALL`] are rejected and leave everything as is.
    pub fn select_rate<M: MediaResource>(
        &mut self,
        tracker: &mut PlaybackTracker<M>,
        rate: f64,
    ) -> Result<PlaybackRate, EngineError> {
        let rate = PlaybackRate::try_from(rate)?;
        self.rate_menu_open = false;
        tracker.set_playback_rate(rate);
        Ok(rate)
    }

    pub fn previous_lesson(&self, sequence: &mut LessonSequence) -> bool {
        sequence.can_go_previous() && sequence.retreat()
    }

    pub fn next_lesson(&self, sequence: &mut LessonSequence) -> bool {
        sequence.can_go_next() && sequence.advance()
    }

    /// Clears per-lesson UI memory after the tracker rebinds.
    pub fn on_rebind(&mut self) {
        self.muted = false;
        self.rate_menu_open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::simulated_media::SimulatedMedia;
    use lesson_player_core::{
        ports::{MediaEvent, MediaListener},
        Lesson,
    };
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    #[derive(Default)]
    struct Collect(Mutex<Vec<MediaEvent>>);

    impl MediaListener for Collect {
        fn on_event(&self, event: MediaEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    struct Rig {
        tracker: PlaybackTracker<SimulatedMedia>,
        events: Arc<Collect>,
        media: SimulatedMedia,
    }

    impl Rig {
        fn ready(duration: f64) -> Self {
            let media = SimulatedMedia::new().with_source("lesson.mp4", duration);
            let events = Arc::new(Collect::default());
            let mut tracker = PlaybackTracker::new(media.clone(), events.clone());
            tracker.bind(&Lesson {
                id: Uuid::new_v4(),
                title: "Lesson".to_string(),
                duration: duration as u32,
                video_url: "lesson.mp4".to_string(),
                completed: false,
                resources: Vec::new(),
                quiz: None,
                notes: Vec::new(),
            });
            media.tick(0.0);
            let mut rig = Self { tracker, events, media };
            rig.pump();
            rig
        }

        fn pump(&mut self) {
            let events = std::mem::take(&mut *self.events.0.lock().unwrap());
            for event in events {
                self.tracker.handle_event(event);
            }
        }
    }

    #[test]
    fn progress_click_maps_fraction_to_duration() {
        let mut rig = Rig::ready(200.0);
        let controls = TransportControls::new(10.0);

        controls.progress_click(&mut rig.tracker, 150.0, 600.0);
        rig.pump();
        assert_eq!(rig.tracker.state().current_time, 50.0);

        controls.progress_click(&mut rig.tracker, 900.0, 600.0);
        rig.pump();
        assert_eq!(rig.tracker.state().current_time, 200.0);

        controls.progress_click(&mut rig.tracker, 10.0, 0.0);
        rig.pump();
        assert_eq!(rig.tracker.state().current_time, 200.0);
    }

    #[test]
    fn skips_are_clamped_to_the_media() {
        let mut rig = Rig::ready(25.0);
        let controls = TransportControls::new(10.0);

        controls.skip_backward(&mut rig.tracker);
        rig.pump();
        assert_eq!(rig.tracker.state().current_time, 0.0);

        controls.skip_forward(&mut rig.tracker);
        rig.pump();
        controls.skip_forward(&mut rig.tracker);
        rig.pump();
        assert_eq!(rig.tracker.state().current_time, 20.0);
        controls.skip_forward(&mut rig.tracker);
        rig.pump();
        assert_eq!(rig.tracker.state().current_time, 25.0);
        assert_eq!(rig.media.position(), 25.0);
    }

    #[test]
    fn mute_toggle_restores_previous_volume() {
        let mut rig = Rig::ready(60.0);
        let mut controls = TransportControls::new(10.0);

        controls.drag_volume(&mut rig.tracker, 0.4);
        rig.pump();
        controls.toggle_mute(&mut rig.tracker);
        rig.pump();
        assert!(controls.is_muted());
        assert_eq!(rig.tracker.state().volume, 0.0);
        assert_eq!(controls.previous_volume(), 0.4);

        controls.toggle_mute(&mut rig.tracker);
        rig.pump();
        assert!(!controls.is_muted());
        assert_eq!(rig.tracker.state().volume, 0.4);
    }

    #[test]
    fn unmuting_after_dragging_to_zero_restores_last_volume() {
        let mut rig = Rig::ready(60.0);
        let mut controls = TransportControls::new(10.0);

        controls.drag_volume(&mut rig.tracker, 0.0);
        rig.pump();
        controls.toggle_mute(&mut rig.tracker);
        rig.pump();
        assert_eq!(rig.tracker.state().volume, 1.0);
    }

    #[test]
    fn unsupported_rate_is_rejected_and_menu_stays_open() {
        let mut rig = Rig::ready(60.0);
        let mut controls = TransportControls::new(10.0);
        assert!(controls.toggle_rate_menu());

        let err = controls.select_rate(&mut rig.tracker, 3.0).unwrap_err();
        assert_eq!(err, EngineError::UnsupportedPlaybackRate(3.0));
        assert_eq!(rig.tracker.state().playback_rate, PlaybackRate::Normal);
        assert!(controls.rate_menu_open());

        let rate = controls.select_rate(&mut rig.tracker, 1.5).unwrap();
        assert_eq!(rate, PlaybackRate::OneAndHalf);
        assert_eq!(rig.tracker.state().playback_rate, PlaybackRate::OneAndHalf);
        assert_eq!(rig.media.playback_rate(), 1.5);
        assert!(!controls.rate_menu_open());
    }
}
