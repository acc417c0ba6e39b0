use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::target_source::TargetSource;
use crate::error::{AppError, AppResult};
use crate::metrics::{SESSIONS_COMPLETED_TOTAL, SESSIONS_TOTAL};
use crate::models::GameSession;
use crate::store::GameStore;

pub struct SessionService {
    store: Arc<dyn GameStore>,
    targets: Arc<dyn TargetSource>,
}

impl SessionService {
    pub fn new(store: Arc<dyn GameStore>, targets: Arc<dyn TargetSource>) -> Self {
        Self { store, targets }
    }

    /// Starts a session against a known configuration, drawing the target
    /// from its range.
    pub async fn create_session(&self, user_id: &str, config_id: &str) -> AppResult<GameSession> {
        let config = self
            .store
            .get_configuration(config_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Game configuration not found".to_string()))?;

        let target = self.targets.draw(&config.target_range);
        let session = GameSession::new(user_id, config_id, target, Utc::now());
        self.store.insert_session(session.clone()).await?;

        SESSIONS_TOTAL.with_label_values(&["configured"]).inc();
        tracing::info!(
            "Session created: {} for user: {}, configuration: {}, target: {}",
            session.id,
            user_id,
            config_id,
            target
        );

        Ok(session)
    }

    pub async fn get_session(&self, session_id: &str) -> AppResult<GameSession> {
        self.store
            .get_session(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Game session not found".to_string()))
    }

    /// Most recently active open session for the pair. When there is none a
    /// session is opened with `fallback_target`, without consulting the
    /// configuration table: `activity_id` does not have to name a stored
    /// configuration.
    pub async fn find_or_create_current(
        &self,
        user_id: &str,
        activity_id: &str,
        fallback_target: i64,
    ) -> AppResult<GameSession> {
        let candidate = GameSession::new(user_id, activity_id, fallback_target, Utc::now());
        let candidate_id = candidate.id.clone();

        let session = self
            .store
            .current_or_insert_session(user_id, activity_id, candidate)
            .await?;

        if session.id == candidate_id {
            SESSIONS_TOTAL.with_label_values(&["fallback"]).inc();
            tracing::info!(
                "Created new session {} for user {}, activity {}",
                session.id,
                user_id,
                activity_id
            );
        } else {
            tracing::debug!(
                "Resuming session {} for user {}, activity {}",
                session.id,
                user_id,
                activity_id
            );
        }

        Ok(session)
    }

    /// Marks the session completed. Completed is terminal, so repeating the
    /// call changes nothing.
    pub async fn complete_session(&self, session_id: &str) -> AppResult<GameSession> {
        let (session, transitioned) = self.mark_completed(session_id).await?;

        if transitioned {
            SESSIONS_COMPLETED_TOTAL.inc();
            tracing::info!("Session completed: {}", session_id);
        }

        Ok(session)
    }

    /// Closes the session and reports whether this call was the one that
    /// closed it.
    async fn mark_completed(&self, session_id: &str) -> AppResult<(GameSession, bool)> {
        let now = Utc::now();
        let transitioned = Arc::new(AtomicBool::new(false));
        let flag = transitioned.clone();

        let session = self
            .store
            .update_session(
                session_id,
                Box::new(move |session| {
                    if !session.is_completed {
                        session.is_completed = true;
                        session.last_activity = now;
                        flag.store(true, Ordering::Relaxed);
                    }
                    Ok(())
                }),
            )
            .await?;

        Ok((session, transitioned.load(Ordering::Relaxed)))
    }
}
