pub mod domain;
pub mod ports;
pub mod sequence;

pub use domain::{
    CompletionRecord, Course, Lesson, Note, PlaybackRate, PlaybackState, Question, QuestionKind,
    Quiz, Resource, ResourceKind, UnsupportedRate,
};
pub use ports::{
    BindingId, CourseRepository, LessonProgressService, MediaEvent, MediaEventKind,
    MediaListener, MediaResource, PortError, PortResult,
};
pub use sequence::{CourseError, LessonSequence};
