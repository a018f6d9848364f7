//! crates/lesson_player_core/src/ports.rs
//!
//! Defines the contracts (traits) between the playback engine and the outside world.
//! The media element, the course source and the progress store all sit behind
//! these traits so the engine can run against a browser element, a native
//! backend or a test double alike.

use crate::domain::{CompletionRecord, Course};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., files, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Media Resource Port
//=========================================================================================

/// Identifies one attach/detach cycle of listeners on the media resource.
///
/// The physical resource is reused across lessons, so the binding (not the
/// resource) is what events are compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub u64);

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "binding#{}", self.0)
    }
}

/// The events a media resource emits.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEventKind {
    /// Playback position advanced (or jumped after a seek), in seconds.
    TimeUpdate(f64),
    /// Duration became known or was revised, in seconds.
    DurationChange(f64),
    Play,
    Pause,
    VolumeChange(f64),
    Ended,
    /// The resource could not load its source.
    Error(String),
}

/// An event tagged with the binding it was delivered through.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaEvent {
    pub binding: BindingId,
    pub kind: MediaEventKind,
}

impl MediaEvent {
    pub fn new(binding: BindingId, kind: MediaEventKind) -> Self {
        Self { binding, kind }
    }
}

/// Receives events from a media resource. Implementations must not block.
pub trait MediaListener: Send + Sync {
    fn on_event(&self, event: MediaEvent);
}

/// The capability set the playback engine needs from a media element.
///
/// Every method is fire-and-forget: outcomes arrive later through the
/// attached listener, never as return values.
pub trait MediaResource: Send {
    /// Points the resource at a new source and begins loading it.
    fn load(&mut self, url: &str);
    fn play(&mut self);
    fn pause(&mut self);
    fn set_current_time(&mut self, seconds: f64);
    fn set_volume(&mut self, volume: f64);
    fn set_playback_rate(&mut self, rate: f64);
    /// Starts delivering events to `listener`, tagged with `binding`.
    fn attach(&mut self, binding: BindingId, listener: Arc<dyn MediaListener>);
    /// Stops delivering events for `binding`.
    fn detach(&mut self, binding: BindingId);
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Loads the course the host wants to present.
    async fn load_course(&self) -> PortResult<Course>;
}

#[async_trait]
pub trait LessonProgressService: Send + Sync {
    /// Persists that a lesson was completed.
    async fn record_completion(&self, record: CompletionRecord) -> PortResult<()>;

    async fn completions_for_course(&self, course_id: Uuid) -> PortResult<Vec<CompletionRecord>>;
}
