//! services/player/src/engine/session.rs
//!
//! The control loop of one lesson player. It owns the sequence model, the
//! tracker and the controls timer, and applies every input from the single
//! session queue in arrival order.

use crate::engine::{
    controls_timer::ControlsTimer,
    progression::{on_playback_ended, report_completion},
    protocol::{HostCommand, HostUpdate},
    state::{ChannelListener, EngineInput, EngineSettings},
    tracker::{EventOutcome, PlaybackTracker},
    transport::TransportControls,
};
use lesson_player_core::{
    ports::{LessonProgressService, MediaEvent, MediaResource, PortResult},
    Course, CourseError, LessonSequence, PlaybackState,
};
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

pub struct PlayerSession<M: MediaResource> {
    sequence: LessonSequence,
    tracker: PlaybackTracker<M>,
    controls: ControlsTimer,
    transport: TransportControls,
    settings: EngineSettings,
    progress: Arc<dyn LessonProgressService>,
    reports: JoinSet<PortResult<()>>,
    updates: UnboundedSender<HostUpdate>,
}

impl<M: MediaResource> PlayerSession<M> {
    /// Creates a session and binds the media to the course's current lesson.
    ///
    /// `inputs` must be the sender half of the queue later passed to [`Self::run`].
    pub fn new(
        course: Course,
        media: M,
        settings: EngineSettings,
        progress: Arc<dyn LessonProgressService>,
        inputs: UnboundedSender<EngineInput>,
        updates: UnboundedSender<HostUpdate>,
    ) -> Result<Self, CourseError> {
        let sequence = LessonSequence::new(course)?;
        let listener = Arc::new(ChannelListener::new(inputs.clone()));
        let mut session = Self {
            sequence,
            tracker: PlaybackTracker::new(media, listener),
            controls: ControlsTimer::new(settings.controls_hide_delay, inputs),
            transport: TransportControls::new(settings.skip_seconds),
            settings,
            progress,
            reports: JoinSet::new(),
            updates,
        };
        session.rebind();
        Ok(session)
    }

    pub fn state(&self) -> &PlaybackState {
        self.tracker.state()
    }

    pub fn sequence(&self) -> &LessonSequence {
        &self.sequence
    }

    pub fn tracker(&self) -> &PlaybackTracker<M> {
        &self.tracker
    }

    pub fn transport(&self) -> &TransportControls {
        &self.transport
    }

    pub fn controls_countdown_pending(&self) -> bool {
        self.controls.is_pending()
    }

    /// Drives the session until the queue closes or the host asks to shut down.
    ///
    /// Returns the course with any completion changes made during the session,
    /// once every completion report spawned by the session has finished.
    pub async fn run(mut self, mut inputs: UnboundedReceiver<EngineInput>) -> Course {
        info!("Player session started for '{}'.", self.sequence.course().title);

        while let Some(input) = inputs.recv().await {
            if self.handle_input(input).is_break() {
                break;
            }
        }

        self.controls.cancel();
        self.tracker.unbind();
        while let Some(joined) = self.reports.join_next().await {
            if let Err(e) = joined {
                error!("Completion report task failed: {}", e);
            }
        }
        info!(
            "Player session ended with {}/{} lessons completed.",
            self.sequence.completed_count(),
            self.sequence.len()
        );
        self.sequence.into_course()
    }

    /// Applies one input from the session queue.
    ///
    /// # Panics
    ///
    /// Panics outside a tokio runtime: arming the controls countdown and
    /// reporting a completion both spawn tasks.
    pub fn handle_input(&mut self, input: EngineInput) -> ControlFlow<()> {
        match input {
            EngineInput::Host(command) => return self.handle_command(command),
            EngineInput::Media(event) => self.handle_media(event),
            EngineInput::ControlsTimeout { generation } => {
                if self.controls.expire(generation) && self.tracker.state().is_playing {
                    self.tracker.set_show_controls(false);
                    self.publish_state();
                }
            }
        }
        ControlFlow::Continue(())
    }

    //=====================================================================================
    // Host Commands
    //=====================================================================================

    fn handle_command(&mut self, command: HostCommand) -> ControlFlow<()> {
        debug!("Host command: {:?}", command);
        match command {
            HostCommand::SelectLesson { index } => {
                if self.sequence.select_lesson(index) {
                    self.rebind();
                }
            }
            HostCommand::TogglePlay => self.tracker.toggle_play(),
            HostCommand::ProgressClick {
                click_x,
                track_width,
            } => self
                .transport
                .progress_click(&mut self.tracker, click_x, track_width),
            HostCommand::SkipBackward => self.transport.skip_backward(&mut self.tracker),
            HostCommand::SkipForward => self.transport.skip_forward(&mut self.tracker),
            HostCommand::SetVolume { volume } => {
                self.transport.drag_volume(&mut self.tracker, volume)
            }
            HostCommand::ToggleMute => self.transport.toggle_mute(&mut self.tracker),
            HostCommand::ToggleRateMenu => {
                let open = self.transport.toggle_rate_menu();
                self.publish(HostUpdate::RateMenu { open });
            }
            HostCommand::SelectRate { rate } => {
                match self.transport.select_rate(&mut self.tracker, rate) {
                    Ok(rate) => {
                        info!("Playback rate set to {}.", rate);
                        self.publish(HostUpdate::RateMenu { open: false });
                        self.publish_state();
                    }
                    Err(e) => {
                        warn!("Rejected rate selection: {}", e);
                        self.publish(HostUpdate::CommandRejected {
                            reason: e.to_string(),
                        });
                    }
                }
            }
            HostCommand::PreviousLesson => {
                if self.transport.previous_lesson(&mut self.sequence) {
                    self.rebind();
                }
            }
            HostCommand::NextLesson => {
                if self.transport.next_lesson(&mut self.sequence) {
                    self.rebind();
                }
            }
            HostCommand::PointerActivity => {
                let was_visible = self.tracker.state().show_controls;
                self.tracker.set_show_controls(true);
                self.controls.arm();
                if !was_visible {
                    self.publish_state();
                }
            }
            HostCommand::SetFullscreen { fullscreen } => {
                self.tracker.set_fullscreen(fullscreen);
                self.publish_state();
            }
            HostCommand::ExternalSeek { time } => self.tracker.external_seek(time),
            HostCommand::JumpToNote { note_id } => {
                let timestamp = self
                    .sequence
                    .current_lesson()
                    .note(note_id)
                    .map(|note| note.timestamp);
                match timestamp {
                    Some(time) => self.tracker.external_seek(time),
                    None => {
                        warn!("Note {} is not attached to the current lesson.", note_id);
                        self.publish(HostUpdate::CommandRejected {
                            reason: format!("Unknown note {}", note_id),
                        });
                    }
                }
            }
            HostCommand::Shutdown => {
                info!("Shutdown requested by host.");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    //=====================================================================================
    // Media Events
    //=====================================================================================

    fn handle_media(&mut self, event: MediaEvent) {
        match self.tracker.handle_event(event) {
            EventOutcome::Stale => {}
            EventOutcome::Updated => self.publish_state(),
            EventOutcome::Started => {
                self.controls.arm();
                self.publish_state();
            }
            EventOutcome::Paused => {
                self.controls.cancel();
                self.tracker.set_show_controls(true);
                self.publish_state();
            }
            EventOutcome::Ended => {
                self.controls.cancel();
                self.tracker.set_show_controls(true);
                self.publish_state();
                self.finish_lesson();
            }
        }
    }

    fn finish_lesson(&mut self) {
        let course_id = self.sequence.course().id;
        let outcome = on_playback_ended(&mut self.sequence);

        if let Some(lesson_id) = outcome.completed {
            self.publish(HostUpdate::LessonCompleted { lesson_id });
            self.reports
                .spawn(report_completion(self.progress.clone(), course_id, lesson_id));
        }

        if outcome.advanced_to.is_some() {
            self.rebind();
        } else {
            info!("Last lesson of '{}' ended.", self.sequence.course().title);
            self.publish(HostUpdate::CourseFinished);
        }
    }

    //=====================================================================================
    // Rebinding and Host Updates
    //=====================================================================================

    /// Binds the tracker to the lesson under the cursor.
    fn rebind(&mut self) {
        self.controls.cancel();
        self.transport.on_rebind();

        let lesson = self.sequence.current_lesson();
        self.tracker.bind(lesson);
        self.publish(HostUpdate::LessonChanged {
            index: self.sequence.current_index(),
            lesson_id: lesson.id,
            title: lesson.title.clone(),
            video_url: lesson.video_url.clone(),
        });
        self.publish_state();

        if self.settings.autoplay_next {
            self.tracker.play();
        }
    }

    fn publish_state(&self) {
        self.publish(HostUpdate::State {
            state: self.tracker.state().clone(),
        });
    }

    fn publish(&self, update: HostUpdate) {
        if self.updates.send(update).is_err() {
            debug!("Host update channel closed.");
        }
    }
}
