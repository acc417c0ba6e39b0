use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{GameStore, ProgressUpdate, SessionMutation};
use crate::error::{AppError, AppResult};
use crate::models::{GameConfiguration, GameSession, ProgressKey, UserProgress};

#[derive(Default)]
struct Tables {
    configurations: HashMap<String, GameConfiguration>,
    configuration_order: Vec<String>,
    sessions: HashMap<String, GameSession>,
    session_order: Vec<String>,
    progress: HashMap<ProgressKey, UserProgress>,
}

/// Process-lifetime store. A single lock covers all three collections, which
/// makes every trait call atomic with respect to every other.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameStore for InMemoryStore {
    async fn insert_configuration(&self, config: GameConfiguration) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.configurations.contains_key(&config.id) {
            tables.configuration_order.push(config.id.clone());
        }
        tables.configurations.insert(config.id.clone(), config);
        Ok(())
    }

    async fn get_configuration(&self, id: &str) -> AppResult<Option<GameConfiguration>> {
        let tables = self.tables.read().await;
        Ok(tables.configurations.get(id).cloned())
    }

    async fn list_configurations(&self) -> AppResult<Vec<GameConfiguration>> {
        let tables = self.tables.read().await;
        Ok(tables
            .configuration_order
            .iter()
            .filter_map(|id| tables.configurations.get(id).cloned())
            .collect())
    }

    async fn insert_session(&self, session: GameSession) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.sessions.contains_key(&session.id) {
            tables.session_order.push(session.id.clone());
        }
        tables.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get_session(&self, id: &str) -> AppResult<Option<GameSession>> {
        let tables = self.tables.read().await;
        Ok(tables.sessions.get(id).cloned())
    }

    async fn update_session(&self, id: &str, mutation: SessionMutation) -> AppResult<GameSession> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .sessions
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound("Game session not found".to_string()))?;

        let mut draft = stored.clone();
        mutation(&mut draft)?;
        *stored = draft.clone();
        Ok(draft)
    }

    async fn current_or_insert_session(
        &self,
        user_id: &str,
        activity_id: &str,
        candidate: GameSession,
    ) -> AppResult<GameSession> {
        let mut tables = self.tables.write().await;

        let current = tables
            .session_order
            .iter()
            .filter_map(|id| tables.sessions.get(id))
            .filter(|s| s.is_open_for(user_id, activity_id))
            .fold(None::<&GameSession>, |best, s| match best {
                Some(b) if b.last_activity >= s.last_activity => Some(b),
                _ => Some(s),
            })
            .cloned();

        if let Some(session) = current {
            return Ok(session);
        }

        tables.session_order.push(candidate.id.clone());
        tables
            .sessions
            .insert(candidate.id.clone(), candidate.clone());
        Ok(candidate)
    }

    async fn update_progress(
        &self,
        key: &ProgressKey,
        update: ProgressUpdate,
    ) -> AppResult<UserProgress> {
        let mut tables = self.tables.write().await;
        let existing = tables.progress.get(key).cloned();
        let next = update(existing)?;
        tables.progress.insert(key.clone(), next.clone());
        Ok(next)
    }

    async fn get_progress(&self, key: &ProgressKey) -> AppResult<Option<UserProgress>> {
        let tables = self.tables.read().await;
        Ok(tables.progress.get(key).cloned())
    }

    async fn list_progress(&self, user_id: &str) -> AppResult<Vec<UserProgress>> {
        let tables = self.tables.read().await;
        Ok(tables
            .progress
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, ProgressionRules, TargetRange};
    use chrono::{Duration, Utc};

    fn config(id: &str, title: &str) -> GameConfiguration {
        GameConfiguration {
            id: id.to_string(),
            title: title.to_string(),
            difficulty: Difficulty::Beginner,
            target_range: TargetRange { min: 1, max: 10 },
            number_of_addends: 2,
            time_limit: None,
            hints_enabled: true,
            progression_rules: ProgressionRules::default(),
            created_by: "u1".to_string(),
            created_at: Utc::now(),
            is_public: false,
        }
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = InMemoryStore::new();
        tokio_test::block_on(async {
            assert!(store.list_configurations().await.unwrap().is_empty());
            assert!(store.get_session("any").await.unwrap().is_none());
            assert!(store.list_progress("u1").await.unwrap().is_empty());
        });
    }

    #[tokio::test]
    async fn test_overwrite_keeps_listing_position() {
        let store = InMemoryStore::new();
        store.insert_configuration(config("a", "first")).await.unwrap();
        store.insert_configuration(config("b", "second")).await.unwrap();
        store.insert_configuration(config("a", "replaced")).await.unwrap();

        let listed = store.list_configurations().await.unwrap();
        let titles: Vec<_> = listed.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["replaced", "second"]);
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_session_unchanged() {
        let store = InMemoryStore::new();
        let session = GameSession::new("u1", "c1", 5, Utc::now());
        let id = session.id.clone();
        store.insert_session(session.clone()).await.unwrap();

        let result = store
            .update_session(
                &id,
                Box::new(|s| {
                    s.attempts += 1;
                    Err(AppError::InvalidState("nope".to_string()))
                }),
            )
            .await;

        assert!(matches!(result, Err(AppError::InvalidState(_))));
        assert_eq!(store.get_session(&id).await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn test_update_unknown_session_is_not_found() {
        let store = InMemoryStore::new();
        let result = store.update_session("missing", Box::new(|_| Ok(()))).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_current_session_prefers_latest_open() {
        let store = InMemoryStore::new();
        let now = Utc::now();

        let older = GameSession::new("u1", "c1", 3, now - Duration::seconds(30));
        let newer = GameSession::new("u1", "c1", 4, now);
        let mut finished = GameSession::new("u1", "c1", 5, now + Duration::seconds(30));
        finished.is_completed = true;
        let other_user = GameSession::new("u2", "c1", 6, now + Duration::seconds(60));

        for s in [&older, &newer, &finished, &other_user] {
            store.insert_session(s.clone()).await.unwrap();
        }

        let candidate = GameSession::new("u1", "c1", 9, now);
        let current = store
            .current_or_insert_session("u1", "c1", candidate)
            .await
            .unwrap();
        assert_eq!(current.id, newer.id);
    }

    #[tokio::test]
    async fn test_current_session_tie_goes_to_first_inserted() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let first = GameSession::new("u1", "c1", 3, now);
        let second = GameSession::new("u1", "c1", 4, now);
        store.insert_session(first.clone()).await.unwrap();
        store.insert_session(second).await.unwrap();

        let current = store
            .current_or_insert_session("u1", "c1", GameSession::new("u1", "c1", 1, now))
            .await
            .unwrap();
        assert_eq!(current.id, first.id);
    }

    #[tokio::test]
    async fn test_current_session_inserts_candidate_when_none_open() {
        let store = InMemoryStore::new();
        let candidate = GameSession::new("u1", "c1", 12, Utc::now());

        let current = store
            .current_or_insert_session("u1", "c1", candidate.clone())
            .await
            .unwrap();

        assert_eq!(current, candidate);
        assert_eq!(
            store.get_session(&candidate.id).await.unwrap(),
            Some(candidate)
        );
    }

    #[tokio::test]
    async fn test_update_progress_sees_existing_record() {
        let store = InMemoryStore::new();
        let key = ProgressKey::new("u1", "c1");
        let now = Utc::now();

        let created = store
            .update_progress(
                &key,
                Box::new(move |existing| {
                    assert!(existing.is_none());
                    let mut p = UserProgress::new(&ProgressKey::new("u1", "c1"), now);
                    p.attempts = 1;
                    Ok(p)
                }),
            )
            .await
            .unwrap();
        assert_eq!(created.attempts, 1);

        let bumped = store
            .update_progress(
                &key,
                Box::new(|existing| {
                    let mut p = existing.expect("record should exist");
                    p.attempts += 1;
                    Ok(p)
                }),
            )
            .await
            .unwrap();
        assert_eq!(bumped.attempts, 2);
        assert_eq!(store.list_progress("u1").await.unwrap().len(), 1);
        assert!(store.list_progress("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_progress_update_keeps_existing_record() {
        let store = InMemoryStore::new();
        let key = ProgressKey::new("u1", "c1");
        let mut stored = UserProgress::new(&key, Utc::now());
        stored.attempts = 3;
        let seeded = stored.clone();
        store
            .update_progress(&key, Box::new(move |_| Ok(stored)))
            .await
            .unwrap();

        let result = store
            .update_progress(
                &key,
                Box::new(|_| Err(AppError::InvalidState("nope".to_string()))),
            )
            .await;

        assert!(matches!(result, Err(AppError::InvalidState(_))));
        assert_eq!(store.get_progress(&key).await.unwrap(), Some(seeded));
    }
}
