//! crates/lesson_player_core/src/domain.rs
//!
//! Defines the pure, core data structures for the lesson player.
//! Course data arrives from the host as a plain value, so these types carry
//! serde derives using the host's camelCase field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//=========================================================================================
// Course Aggregate
//=========================================================================================

/// The aggregate root for a learning unit.
///
/// `lessons` is ordered and fixed at load time. `current_lesson_index` is the
/// lesson cursor; see [`crate::sequence::LessonSequence`] for the type that
/// upholds its bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub instructor: String,
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub current_lesson_index: usize,
}

/// A single playable unit of a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: Uuid,
    pub title: String,
    /// Informational only. The live media resource reports the real duration.
    pub duration: u32,
    pub video_url: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub quiz: Option<Quiz>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Lesson {
    pub fn note(&self, note_id: Uuid) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == note_id)
    }
}

//=========================================================================================
// Records Attached to a Lesson (consumed by sibling panels)
//=========================================================================================

/// A downloadable or linkable item shown in the resources panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: Uuid,
    pub title: String,
    pub kind: ResourceKind,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Pdf,
    Link,
    Code,
    Document,
}

/// A quiz attached to a lesson. Completion and score are owned by the quiz panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: Uuid,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub score: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub prompt: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice {
        options: Vec<String>,
        #[serde(rename = "correctOption")]
        correct_option: usize,
    },
    TrueFalse {
        answer: bool,
    },
}

/// A timestamped note the learner saved against a lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    /// Position in the lesson media, in seconds.
    pub timestamp: f64,
    pub text: String,
}

/// Represents a lesson completion reported to the progress service.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRecord {
    pub course_id: Uuid,
    pub lesson_id: Uuid,
    pub completed_at: DateTime<Utc>,
}

//=========================================================================================
// Playback State
//=========================================================================================

/// The closed set of playback rates offered by the rate menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub enum PlaybackRate {
    Half,
    ThreeQuarters,
    #[default]
    Normal,
    OneAndQuarter,
    OneAndHalf,
    Double,
}

impl PlaybackRate {
    pub const ALL: [PlaybackRate; 6] = [
        PlaybackRate::Half,
        PlaybackRate::ThreeQuarters,
        PlaybackRate::Normal,
        PlaybackRate::OneAndQuarter,
        PlaybackRate::OneAndHalf,
        PlaybackRate::Double,
    ];

    pub fn as_f64(self) -> f64 {
        match self {
            PlaybackRate::Half => 0.5,
            PlaybackRate::ThreeQuarters => 0.75,
            PlaybackRate::Normal => 1.0,
            PlaybackRate::OneAndQuarter => 1.25,
            PlaybackRate::OneAndHalf => 1.5,
            PlaybackRate::Double => 2.0,
        }
    }
}

impl From<PlaybackRate> for f64 {
    fn from(rate: PlaybackRate) -> Self {
        rate.as_f64()
    }
}

/// Returned when a requested rate is not one of [`PlaybackRate::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("{0} is not a supported playback rate")]
pub struct UnsupportedRate(pub f64);

impl TryFrom<f64> for PlaybackRate {
    type Error = UnsupportedRate;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        PlaybackRate::ALL
            .into_iter()
            .find(|rate| (rate.as_f64() - value).abs() < 1e-9)
            .ok_or(UnsupportedRate(value))
    }
}

impl fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.as_f64())
    }
}

/// Ephemeral transport state for the currently bound lesson media.
///
/// A fresh default value is installed on every rebind. `duration` is 0 until
/// the resource reports metadata, which the host renders as a loading state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub volume: f64,
    pub playback_rate: PlaybackRate,
    pub is_fullscreen: bool,
    pub show_controls: bool,
    /// Set when the bound resource reports it could not load.
    pub load_error: Option<String>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume: 1.0,
            playback_rate: PlaybackRate::Normal,
            is_fullscreen: false,
            show_controls: true,
            load_error: None,
        }
    }
}

impl PlaybackState {
    pub fn is_loading(&self) -> bool {
        self.duration <= 0.0
    }

    /// Clamps a media position into `[0, duration]`.
    pub fn clamp_time(&self, time: f64) -> f64 {
        if !time.is_finite() {
            return 0.0;
        }
        time.clamp(0.0, self.duration.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_conversion_accepts_only_menu_values() {
        assert_eq!(PlaybackRate::try_from(1.25), Ok(PlaybackRate::OneAndQuarter));
        assert_eq!(PlaybackRate::try_from(3.0), Err(UnsupportedRate(3.0)));
        assert_eq!(PlaybackRate::try_from(0.0), Err(UnsupportedRate(0.0)));
    }

    #[test]
    fn rate_serializes_as_number() {
        let json = serde_json::to_string(&PlaybackRate::OneAndHalf).unwrap();
        assert_eq!(json, "1.5");
        let parsed: Result<PlaybackRate, _> = serde_json::from_str("3");
        assert!(parsed.is_err());
    }

    #[test]
    fn clamp_time_respects_duration() {
        let state = PlaybackState {
            duration: 120.0,
            ..PlaybackState::default()
        };
        assert_eq!(state.clamp_time(-5.0), 0.0);
        assert_eq!(state.clamp_time(500.0), 120.0);
        assert_eq!(state.clamp_time(f64::NAN), 0.0);
    }

    #[test]
    fn question_kind_is_tagged() {
        let json = r#"{"id":"6f1c1f7e-2b39-4a53-9f43-0d1b3a3c4b11","prompt":"Ownership?","type":"true_false","answer":true}"#;
        let question: Question = serde_json::from_str(json).unwrap();
        assert_eq!(question.kind, QuestionKind::TrueFalse { answer: true });
    }
}
