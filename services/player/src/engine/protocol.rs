//! services/player/src/engine/protocol.rs
//!
//! Defines the message protocol between the host UI and the playback engine.

use lesson_player_core::PlaybackState;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Host TO the Engine
//=========================================================================================

/// User gestures and panel requests the host forwards to the engine.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostCommand {
    /// Sidebar selection of an arbitrary lesson.
    SelectLesson { index: usize },

    TogglePlay,

    /// A click on the progress strip, in the strip's own pixel space.
    ProgressClick { click_x: f64, track_width: f64 },

    SkipBackward,
    SkipForward,

    /// Volume slider drag.
    SetVolume { volume: f64 },

    /// The mute icon.
    ToggleMute,

    ToggleRateMenu,
    SelectRate { rate: f64 },

    PreviousLesson,
    NextLesson,

    /// Pointer moved over or entered the media surface.
    PointerActivity,

    SetFullscreen { fullscreen: bool },

    /// A jump requested by a sibling panel.
    ExternalSeek { time: f64 },

    /// The notes panel asked to jump to one of the current lesson's notes.
    JumpToNote { note_id: Uuid },

    Shutdown,
}

//=========================================================================================
// Messages Sent FROM the Engine TO the Host
//=========================================================================================

/// Updates the host renders from.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostUpdate {
    /// The confirmed transport state.
    State { state: PlaybackState },

    /// The cursor moved. The host resets its secondary panel to the default tab.
    LessonChanged {
        index: usize,
        lesson_id: Uuid,
        title: String,
        video_url: String,
    },

    LessonCompleted { lesson_id: Uuid },

    /// The last lesson ended; there is nothing to advance to.
    CourseFinished,

    RateMenu { open: bool },

    CommandRejected { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_commands_parse_from_tagged_json() {
        let cmd: HostCommand =
            serde_json::from_str(r#"{"type":"progress_click","click_x":50,"track_width":200}"#)
                .unwrap();
        assert_eq!(
            cmd,
            HostCommand::ProgressClick {
                click_x: 50.0,
                track_width: 200.0
            }
        );

        let cmd: HostCommand = serde_json::from_str(r#"{"type":"next_lesson"}"#).unwrap();
        assert_eq!(cmd, HostCommand::NextLesson);
    }

    #[test]
    fn state_update_uses_camel_case_fields() {
        let json = serde_json::to_value(HostUpdate::State {
            state: PlaybackState::default(),
        })
        .unwrap();
        assert_eq!(json["type"], "state");
        assert_eq!(json["state"]["showControls"], true);
        assert_eq!(json["state"]["playbackRate"], 1.0);
    }
}
