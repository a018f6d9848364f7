//! services/player/src/adapters/course_file.rs
//!
//! This module contains the adapter that reads a course fixture from disk.
//! It implements the `CourseRepository` port from the `core` crate.

use async_trait::async_trait;
use lesson_player_core::{
    ports::{CourseRepository, PortError, PortResult},
    Course,
};
use std::path::PathBuf;
use tracing::info;

/// Loads a [`Course`] from a JSON file in the host's camelCase format.
#[derive(Debug, Clone)]
pub struct JsonCourseRepository {
    path: PathBuf,
}

impl JsonCourseRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CourseRepository for JsonCourseRepository {
    async fn load_course(&self) -> PortResult<Course> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PortError::NotFound(self.path.display().to_string())
            } else {
                PortError::Unexpected(format!("reading {}: {}", self.path.display(), e))
            }
        })?;

        let course: Course = serde_json::from_str(&raw).map_err(|e| {
            PortError::Unexpected(format!("parsing {}: {}", self.path.display(), e))
        })?;

        info!(
            "Loaded course '{}' with {} lessons from {}",
            course.title,
            course.lessons.len(),
            self.path.display()
        );
        Ok(course)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_player_core::ResourceKind;
    use std::path::Path;

    fn fixture() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/course.json")
    }

    #[tokio::test]
    async fn loads_the_bundled_fixture() {
        let course = JsonCourseRepository::new(fixture()).load_course().await.unwrap();
        assert_eq!(course.lessons.len(), 3);
        assert_eq!(course.current_lesson_index, 0);
        assert!(course.lessons.iter().all(|l| !l.completed));
        assert_eq!(course.lessons[0].resources[0].kind, ResourceKind::Pdf);
        assert!(course.lessons[1].quiz.is_some());
        assert_eq!(course.lessons[0].notes.len(), 1);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let repo = JsonCourseRepository::new("/definitely/not/here/course.json");
        let err = repo.load_course().await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn non_uuid_ids_are_rejected_as_malformed() {
        let path = std::env::temp_dir().join(format!("course-{}.json", uuid::Uuid::new_v4()));
        let raw = r#"{
            "id": "1",
            "title": "Intro",
            "instructor": "A. Lovelace",
            "currentLessonIndex": 0,
            "lessons": []
        }"#;
        tokio::fs::write(&path, raw).await.unwrap();

        let err = JsonCourseRepository::new(&path).load_course().await.unwrap_err();
        let _ = tokio::fs::remove_file(&path).await;
        assert!(matches!(err, PortError::Unexpected(_)));
    }
}
