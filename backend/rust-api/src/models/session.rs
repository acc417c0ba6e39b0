use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub id: String,
    pub user_id: String,
    pub configuration_id: String,
    pub current_target: i64,
    pub current_level: u32,
    pub attempts: u32,
    pub successes: u32,
    pub start_time: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub is_completed: bool,
}

impl GameSession {
    /// Fresh active session at level 1 with zeroed counters.
    pub fn new(
        user_id: impl Into<String>,
        configuration_id: impl Into<String>,
        current_target: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            configuration_id: configuration_id.into(),
            current_target,
            current_level: 1,
            attempts: 0,
            successes: 0,
            start_time: now,
            last_activity: now,
            is_completed: false,
        }
    }

    /// Open session belonging to this user+activity pair.
    pub fn is_open_for(&self, user_id: &str, activity_id: &str) -> bool {
        !self.is_completed && self.user_id == user_id && self.configuration_id == activity_id
    }
}

/// Query params for POST /api/game/sessions
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSessionQuery {
    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "config_id must not be empty"))]
    pub config_id: String,
}
