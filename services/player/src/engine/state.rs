//! services/player/src/engine/state.rs
//!
//! Defines the inputs funnelled into a player session and the settings it runs with.

use crate::engine::protocol::HostCommand;
use lesson_player_core::ports::{MediaEvent, MediaListener};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

//=========================================================================================
// EngineSettings
//=========================================================================================

/// Tunables for a single player session.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Inactivity before controls hide while playing.
    pub controls_hide_delay: Duration,
    /// Distance covered by the skip buttons, in seconds.
    pub skip_seconds: f64,
    /// Request playback right after each rebind.
    pub autoplay_next: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            controls_hide_delay: Duration::from_secs(3),
            skip_seconds: 10.0,
            autoplay_next: false,
        }
    }
}

//=========================================================================================
// EngineInput
//=========================================================================================

/// Everything that can happen to a session, in one queue.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineInput {
    /// A gesture or request from the host UI or a sibling panel.
    Host(HostCommand),
    /// An event from the media resource.
    Media(MediaEvent),
    /// The controls countdown armed as `generation` ran out.
    ControlsTimeout { generation: u64 },
}

/// A [`MediaListener`] that forwards events into the session queue.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    tx: UnboundedSender<EngineInput>,
}

impl ChannelListener {
    pub fn new(tx: UnboundedSender<EngineInput>) -> Self {
        Self { tx }
    }
}

impl MediaListener for ChannelListener {
    fn on_event(&self, event: MediaEvent) {
        if self.tx.send(EngineInput::Media(event)).is_err() {
            debug!("Session queue closed; dropping media event.");
        }
    }
}
