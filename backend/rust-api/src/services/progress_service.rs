use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::metrics::PROGRESS_UPSERTS_TOTAL;
use crate::models::{GameAttempt, ProgressKey, UserProgress};
use crate::store::GameStore;

/// Cross-session statistics per user+activity.
///
/// Two write paths exist and they deliberately differ: attempts are counted
/// incrementally, while an explicit upsert overwrites the counters verbatim
/// and only carries the stored history over.
pub struct ProgressService {
    store: Arc<dyn GameStore>,
}

impl ProgressService {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        Self { store }
    }

    /// Counts one attempt against the attempt's user+activity, creating the
    /// record on first play.
    pub async fn absorb_attempt(
        &self,
        attempt: &GameAttempt,
        now: DateTime<Utc>,
    ) -> AppResult<UserProgress> {
        let key = ProgressKey::new(attempt.user_id.clone(), attempt.activity_id.clone());
        let fresh_key = key.clone();
        let attempt = attempt.clone();

        let progress = self
            .store
            .update_progress(
                &key,
                Box::new(move |existing| {
                    let mut progress =
                        existing.unwrap_or_else(|| UserProgress::new(&fresh_key, now));
                    progress.absorb(&attempt, now)?;
                    Ok(progress)
                }),
            )
            .await?;

        tracing::debug!(
            "Progress {} now at {}/{} successes",
            key,
            progress.successes,
            progress.attempts
        );

        Ok(progress)
    }

    /// Stores `progress` as given, except that an existing record's history
    /// replaces whatever history was supplied.
    pub async fn upsert(&self, progress: UserProgress) -> AppResult<UserProgress> {
        let key = progress.key();

        let stored = self
            .store
            .update_progress(
                &key,
                Box::new(move |existing| {
                    let mut next = progress;
                    if let Some(existing) = existing {
                        next.history = existing.history;
                    }
                    Ok(next)
                }),
            )
            .await?;

        PROGRESS_UPSERTS_TOTAL.inc();
        tracing::info!(
            "Saved user progress for {}: attempts={}, successes={}, level={}",
            key,
            stored.attempts,
            stored.successes,
            stored.current_level
        );

        Ok(stored)
    }

    pub async fn get(&self, user_id: &str, activity_id: &str) -> AppResult<UserProgress> {
        let key = ProgressKey::new(user_id, activity_id);
        self.store
            .get_progress(&key)
            .await?
            .ok_or_else(|| AppError::NotFound("User progress not found".to_string()))
    }

    /// All of a user's progress records, most recently played first.
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<UserProgress>> {
        let mut records = self.store.list_progress(user_id).await?;
        records.sort_by(|a, b| b.last_played.cmp(&a.last_played));
        Ok(records)
    }
}
