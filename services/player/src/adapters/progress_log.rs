//! services/player/src/adapters/progress_log.rs
//!
//! An in-memory implementation of the `LessonProgressService` port. The binary
//! uses it in place of a remote progress API; tests use it to observe what the
//! engine reported.

use async_trait::async_trait;
use lesson_player_core::{
    ports::{LessonProgressService, PortResult},
    CompletionRecord,
};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct InMemoryProgressLog {
    records: Mutex<Vec<CompletionRecord>>,
}

impl InMemoryProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl LessonProgressService for InMemoryProgressLog {
    async fn record_completion(&self, record: CompletionRecord) -> PortResult<()> {
        info!(
            "Recorded completion of lesson {} in course {} at {}",
            record.lesson_id, record.course_id, record.completed_at
        );
        self.records.lock().await.push(record);
        Ok(())
    }

    async fn completions_for_course(&self, course_id: Uuid) -> PortResult<Vec<CompletionRecord>> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| r.course_id == course_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn filters_by_course() {
        let log = InMemoryProgressLog::new();
        let course = Uuid::new_v4();
        for course_id in [course, Uuid::new_v4(), course] {
            log.record_completion(CompletionRecord {
                course_id,
                lesson_id: Uuid::new_v4(),
                completed_at: Utc::now(),
            })
            .await
            .unwrap();
        }
        assert_eq!(log.len().await, 3);
        assert_eq!(log.completions_for_course(course).await.unwrap().len(), 2);
    }
}
