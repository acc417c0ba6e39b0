//! Storage contract for configurations, sessions and progress records.
//!
//! Every read-modify-write goes through a single trait call so the
//! implementation can hold its lock (or run its transaction) around the whole
//! unit. Services never read a record, mutate it and write it back in
//! separate calls.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{GameConfiguration, GameSession, ProgressKey, UserProgress};

pub mod memory;

pub use memory::InMemoryStore;

/// Mutation applied to a stored session in place. Returning an error leaves
/// the stored session untouched.
pub type SessionMutation = Box<dyn FnOnce(&mut GameSession) -> AppResult<()> + Send>;

/// Produces the next progress record from the current one (if any). Returning
/// an error leaves the stored record untouched.
pub type ProgressUpdate =
    Box<dyn FnOnce(Option<UserProgress>) -> AppResult<UserProgress> + Send>;

#[async_trait]
pub trait GameStore: Send + Sync {
    /// Inserts or replaces by id. A replaced id keeps its listing position.
    async fn insert_configuration(&self, config: GameConfiguration) -> AppResult<()>;

    async fn get_configuration(&self, id: &str) -> AppResult<Option<GameConfiguration>>;

    /// All configurations in insertion order.
    async fn list_configurations(&self) -> AppResult<Vec<GameConfiguration>>;

    async fn insert_session(&self, session: GameSession) -> AppResult<()>;

    async fn get_session(&self, id: &str) -> AppResult<Option<GameSession>>;

    /// Applies `mutation` atomically and returns the updated session.
    /// Fails with `NotFound` for an unknown id.
    async fn update_session(&self, id: &str, mutation: SessionMutation) -> AppResult<GameSession>;

    /// Returns the open session for the pair with the latest `last_activity`
    /// (earliest inserted on ties), or stores `candidate` and returns it.
    async fn current_or_insert_session(
        &self,
        user_id: &str,
        activity_id: &str,
        candidate: GameSession,
    ) -> AppResult<GameSession>;

    /// Replaces the record under `key` with `update(existing)` atomically.
    async fn update_progress(&self, key: &ProgressKey, update: ProgressUpdate)
        -> AppResult<UserProgress>;

    async fn get_progress(&self, key: &ProgressKey) -> AppResult<Option<UserProgress>>;

    /// Every progress record owned by `user_id`, in no particular order.
    async fn list_progress(&self, user_id: &str) -> AppResult<Vec<UserProgress>>;
}
