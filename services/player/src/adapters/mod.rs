pub mod course_file;
pub mod progress_log;
pub mod simulated_media;

pub use course_file::JsonCourseRepository;
pub use progress_log::InMemoryProgressLog;
pub use simulated_media::{MediaCommand, SimulatedMedia};
