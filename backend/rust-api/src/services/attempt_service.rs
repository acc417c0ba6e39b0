use chrono::Utc;
use std::sync::Arc;

use super::progress_service::ProgressService;
use super::session_service::SessionService;
use super::target_source::TargetSource;
use crate::error::{AppError, AppResult};
use crate::metrics::record_attempt;
use crate::models::{AttemptRequest, GameAttempt};
use crate::store::GameStore;

pub struct AttemptService {
    sessions: SessionService,
    progress: ProgressService,
    store: Arc<dyn GameStore>,
}

impl AttemptService {
    pub fn new(store: Arc<dyn GameStore>, targets: Arc<dyn TargetSource>) -> Self {
        Self {
            sessions: SessionService::new(store.clone(), targets),
            progress: ProgressService::new(store.clone()),
            store,
        }
    }

    /// Counts the attempt on the session, then on the user's progress for the
    /// session's activity. The attempt is attributed to the session's user and
    /// configuration.
    pub async fn record_attempt(
        &self,
        session_id: &str,
        req: AttemptRequest,
    ) -> AppResult<GameAttempt> {
        let now = Utc::now();
        let success = req.success;

        let session = self
            .store
            .update_session(
                session_id,
                Box::new(move |session| {
                    if session.is_completed {
                        return Err(AppError::InvalidState(
                            "Game session is already completed".to_string(),
                        ));
                    }
                    session.attempts = session
                        .attempts
                        .checked_add(1)
                        .ok_or_else(attempt_limit_reached)?;
                    if success {
                        session.successes = session
                            .successes
                            .checked_add(1)
                            .ok_or_else(attempt_limit_reached)?;
                    }
                    session.last_activity = now;
                    Ok(())
                }),
            )
            .await?;

        let attempt = req.into_attempt(session.user_id, session.configuration_id, now);
        if attempt.success && attempt.inputs_sum() != attempt.target {
            tracing::debug!(
                "Attempt marked successful but inputs sum to {} (target {})",
                attempt.inputs_sum(),
                attempt.target
            );
        }

        if let Err(e) = self.progress.absorb_attempt(&attempt, now).await {
            tracing::warn!(
                "Progress update failed for session {}, reverting counters: {}",
                session_id,
                e
            );
            self.store
                .update_session(
                    session_id,
                    Box::new(move |session| {
                        session.attempts = session.attempts.saturating_sub(1);
                        if success {
                            session.successes = session.successes.saturating_sub(1);
                        }
                        Ok(())
                    }),
                )
                .await?;
            return Err(e);
        }

        record_attempt(attempt.success);
        tracing::info!(
            "Recorded attempt for session {}: target={}, inputs={:?}, success={}",
            session_id,
            attempt.target,
            attempt.inputs,
            attempt.success
        );

        Ok(attempt)
    }

    /// Session-less variant: resumes (or opens) the user's current session for
    /// the activity named in the attempt and records against it.
    pub async fn record_current_attempt(&self, req: AttemptRequest) -> AppResult<GameAttempt> {
        let (user_id, activity_id) = req.identity()?;
        tracing::info!(
            "Received attempt for {}, activity {}",
            user_id,
            activity_id
        );

        let session = self
            .sessions
            .find_or_create_current(&user_id, &activity_id, req.target)
            .await?;

        self.record_attempt(&session.id, req).await
    }
}

fn attempt_limit_reached() -> AppError {
    AppError::InvalidState("Session attempt limit reached".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProgressKey, UserProgress};
    use crate::services::target_source::ThreadRngTargets;
    use crate::store::InMemoryStore;
    use serde_json::json;

    fn setup() -> (AttemptService, Arc<dyn GameStore>) {
        let store: Arc<dyn GameStore> = Arc::new(InMemoryStore::new());
        let service = AttemptService::new(store.clone(), Arc::new(ThreadRngTargets));
        (service, store)
    }

    fn request(success: bool) -> AttemptRequest {
        let inputs = if success { vec![2, 3] } else { vec![1, 1] };
        serde_json::from_value(json!({
            "target": 5,
            "inputs": inputs,
            "success": success,
            "time_spent": 4.2
        }))
        .unwrap()
    }

    fn current_request(user: &str, activity: &str, success: bool) -> AttemptRequest {
        let mut req = request(success);
        req.user_id = Some(user.to_string());
        req.activity_id = Some(activity.to_string());
        req
    }

    #[tokio::test]
    async fn test_counters_track_attempts_and_successes() {
        let (service, store) = setup();
        let session = service
            .sessions
            .find_or_create_current("u1", "c1", 5)
            .await
            .unwrap();

        for success in [true, false, true, true, false] {
            service
                .record_attempt(&session.id, request(success))
                .await
                .unwrap();
        }

        let stored = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.attempts, 5);
        assert_eq!(stored.successes, 3);

        let progress = store
            .get_progress(&ProgressKey::new("u1", "c1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(progress.attempts, 5);
        assert_eq!(progress.successes, 3);
        assert_eq!(progress.history.len(), 5);
    }

    #[tokio::test]
    async fn test_progress_accumulates_across_sessions() {
        let (service, store) = setup();

        let first = service
            .sessions
            .find_or_create_current("u1", "c1", 5)
            .await
            .unwrap();
        service.record_attempt(&first.id, request(true)).await.unwrap();
        service.sessions.complete_session(&first.id).await.unwrap();

        let second = service
            .sessions
            .find_or_create_current("u1", "c1", 5)
            .await
            .unwrap();
        service.record_attempt(&second.id, request(false)).await.unwrap();
        service.record_attempt(&second.id, request(true)).await.unwrap();

        let progress = store
            .get_progress(&ProgressKey::new("u1", "c1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(progress.attempts, 3);
        assert_eq!(progress.successes, 2);
    }

    #[tokio::test]
    async fn test_completed_session_rejects_attempts() {
        let (service, store) = setup();
        let session = service
            .sessions
            .find_or_create_current("u1", "c1", 5)
            .await
            .unwrap();
        service.record_attempt(&session.id, request(true)).await.unwrap();
        service.sessions.complete_session(&session.id).await.unwrap();

        let err = service
            .record_attempt(&session.id, request(true))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        let stored = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.attempts, 1);
        assert_eq!(stored.successes, 1);
        let progress = store
            .get_progress(&ProgressKey::new("u1", "c1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(progress.attempts, 1);
    }

    #[tokio::test]
    async fn test_attempt_past_progress_limit_changes_nothing() {
        let (service, store) = setup();
        let key = ProgressKey::new("u1", "c1");
        let mut saturated = UserProgress::new(&key, Utc::now());
        saturated.attempts = u32::MAX;
        saturated.successes = 1;
        store
            .update_progress(&key, Box::new(move |_| Ok(saturated)))
            .await
            .unwrap();
        let before = store.get_progress(&key).await.unwrap().unwrap();

        let session = service
            .sessions
            .find_or_create_current("u1", "c1", 5)
            .await
            .unwrap();
        let err = service
            .record_attempt(&session.id, request(true))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        assert_eq!(store.get_progress(&key).await.unwrap(), Some(before));
        let stored = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.attempts, 0);
        assert_eq!(stored.successes, 0);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let (service, store) = setup();
        let err = service
            .record_attempt("missing", request(true))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store.list_progress("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_attempt_takes_identity_from_session() {
        let (service, _) = setup();
        let session = service
            .sessions
            .find_or_create_current("u1", "c1", 5)
            .await
            .unwrap();

        let recorded = service
            .record_attempt(&session.id, current_request("someone-else", "other", true))
            .await
            .unwrap();

        assert_eq!(recorded.user_id, "u1");
        assert_eq!(recorded.activity_id, "c1");
    }

    #[tokio::test]
    async fn test_current_attempts_reuse_one_session() {
        let (service, store) = setup();

        service
            .record_current_attempt(current_request("u1", "c1", true))
            .await
            .unwrap();
        service
            .record_current_attempt(current_request("u1", "c1", false))
            .await
            .unwrap();

        let session = service
            .sessions
            .find_or_create_current("u1", "c1", 99)
            .await
            .unwrap();
        assert_eq!(session.attempts, 2);
        assert_eq!(session.successes, 1);
        assert_eq!(session.current_target, 5);
        assert_eq!(store.list_progress("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_current_attempt_requires_identity() {
        let (service, _) = setup();
        let err = service
            .record_current_attempt(request(true))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_concurrent_attempts_are_not_lost() {
        let (service, store) = setup();
        let service = Arc::new(service);
        let session = service
            .sessions
            .find_or_create_current("u1", "c1", 5)
            .await
            .unwrap();

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let service = service.clone();
                let id = session.id.clone();
                tokio::spawn(async move { service.record_attempt(&id, request(i % 2 == 0)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.attempts, 64);
        assert_eq!(stored.successes, 32);
        let progress = store
            .get_progress(&ProgressKey::new("u1", "c1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(progress.attempts, 64);
        assert_eq!(progress.history.len(), 64);
    }
}
