//! services/player/src/engine/progression.rs
//!
//! Reacts to the end of the bound lesson's media: marks the lesson complete
//! (once) and moves the cursor to the next lesson when there is one.

use chrono::Utc;
use lesson_player_core::{
    ports::{LessonProgressService, PortResult},
    CompletionRecord, LessonSequence,
};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// What an end-of-stream did to the course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressionOutcome {
    /// Set only when the lesson flipped from incomplete to complete.
    pub completed: Option<Uuid>,
    /// The new cursor, if the course advanced.
    pub advanced_to: Option<usize>,
}

/// Applies both end-of-stream transitions, in order, to the current lesson.
///
/// Callers must only invoke this for the currently bound resource.
pub fn on_playback_ended(sequence: &mut LessonSequence) -> ProgressionOutcome {
    let completed = sequence.mark_current_completed();
    if let Some(lesson_id) = completed {
        info!("Lesson {} completed.", lesson_id);
    }

    let advanced_to = if sequence.can_go_next() && sequence.advance() {
        Some(sequence.current_index())
    } else {
        None
    };

    ProgressionOutcome {
        completed,
        advanced_to,
    }
}

/// Persists a completion through the progress port. Meant to be spawned.
pub async fn report_completion(
    progress: Arc<dyn LessonProgressService>,
    course_id: Uuid,
    lesson_id: Uuid,
) -> PortResult<()> {
    let record = CompletionRecord {
        course_id,
        lesson_id,
        completed_at: Utc::now(),
    };
    if let Err(e) = progress.record_completion(record).await {
        error!("Failed to record completion of lesson {}: {:?}", lesson_id, e);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_player_core::{Course, Lesson};

    fn sequence(count: usize, cursor: usize) -> LessonSequence {
        let lessons = (0..count)
            .map(|n| Lesson {
                id: Uuid::new_v4(),
                title: format!("Lesson {n}"),
                duration: 30,
                video_url: format!("lesson-{n}.mp4"),
                completed: false,
                resources: Vec::new(),
                quiz: None,
                notes: Vec::new(),
            })
            .collect();
        LessonSequence::new(Course {
            id: Uuid::new_v4(),
            title: "Course".to_string(),
            instructor: "Instructor".to_string(),
            lessons,
            current_lesson_index: cursor,
        })
        .unwrap()
    }

    #[test]
    fn ended_marks_complete_and_advances_by_one() {
        let mut seq = sequence(3, 0);
        let first = seq.current_lesson().id;

        let outcome = on_playback_ended(&mut seq);
        assert_eq!(outcome.completed, Some(first));
        assert_eq!(outcome.advanced_to, Some(1));
        assert_eq!(seq.current_index(), 1);
        let flags: Vec<bool> = seq.course().lessons.iter().map(|l| l.completed).collect();
        assert_eq!(flags, vec![true, false, false]);
    }

    #[test]
    fn ended_on_last_lesson_completes_without_moving() {
        let mut seq = sequence(3, 2);
        let outcome = on_playback_ended(&mut seq);
        assert!(outcome.completed.is_some());
        assert_eq!(outcome.advanced_to, None);
        assert_eq!(seq.current_index(), 2);

        let again = on_playback_ended(&mut seq);
        assert_eq!(again, ProgressionOutcome::default());
        assert_eq!(seq.completed_count(), 1);
    }

    #[test]
    fn replaying_a_completed_lesson_still_advances() {
        let mut seq = sequence(2, 0);
        seq.mark_current_completed();
        let outcome = on_playback_ended(&mut seq);
        assert_eq!(outcome.completed, None);
        assert_eq!(outcome.advanced_to, Some(1));
    }
}
