//! crates/lesson_player_core/src/sequence.rs
//!
//! The lesson sequence model: a course plus a cursor that always points at a
//! valid lesson.

use crate::domain::{Course, Lesson};
use uuid::Uuid;

/// Returned when a host-supplied course cannot hold a valid lesson cursor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CourseError {
    #[error("Course has no lessons")]
    NoLessons,
    #[error("Lesson cursor {index} is out of range for {len} lessons")]
    CursorOutOfRange { index: usize, len: usize },
}

/// Wraps a [`Course`] so that `current_lesson_index` stays in `[0, lessons.len())`.
///
/// Cursor mutators are permissive: an out-of-range or unchanged target is a
/// no-op reported as `false`.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonSequence {
    course: Course,
}

impl LessonSequence {
    pub fn new(course: Course) -> Result<Self, CourseError> {
        let len = course.lessons.len();
        if len == 0 {
            return Err(CourseError::NoLessons);
        }
        if course.current_lesson_index >= len {
            return Err(CourseError::CursorOutOfRange {
                index: course.current_lesson_index,
                len,
            });
        }
        Ok(Self { course })
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn into_course(self) -> Course {
        self.course
    }

    pub fn len(&self) -> usize {
        self.course.lessons.len()
    }

    /// Always false; construction rejects empty courses.
    pub fn is_empty(&self) -> bool {
        self.course.lessons.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.course.current_lesson_index
    }

    pub fn current_lesson(&self) -> &Lesson {
        &self.course.lessons[self.course.current_lesson_index]
    }

    pub fn can_go_previous(&self) -> bool {
        self.course.current_lesson_index > 0
    }

    pub fn can_go_next(&self) -> bool {
        self.course.current_lesson_index + 1 < self.course.lessons.len()
    }

    /// Moves the cursor to `index`. Returns whether the cursor changed.
    pub fn select_lesson(&mut self, index: usize) -> bool {
        if index >= self.course.lessons.len() || index == self.course.current_lesson_index {
            return false;
        }
        self.course.current_lesson_index = index;
        true
    }

    pub fn advance(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        self.select_lesson(self.course.current_lesson_index + 1)
    }

    pub fn retreat(&mut self) -> bool {
        if !self.can_go_previous() {
            return false;
        }
        self.select_lesson(self.course.current_lesson_index - 1)
    }

    /// Flips the current lesson's `completed` flag to true.
    ///
    /// Returns the lesson id only on the false-to-true transition.
    pub fn mark_current_completed(&mut self) -> Option<Uuid> {
        let index = self.course.current_lesson_index;
        let lesson = &mut self.course.lessons[index];
        if lesson.completed {
            return None;
        }
        lesson.completed = true;
        Some(lesson.id)
    }

    pub fn completed_count(&self) -> usize {
        self.course.lessons.iter().filter(|l| l.completed).count()
    }

    pub fn progress_fraction(&self) -> f64 {
        self.completed_count() as f64 / self.len() as f64
    }
}
