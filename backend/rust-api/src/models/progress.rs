use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

use super::attempt::{AttemptRequest, GameAttempt};
use crate::error::{AppError, AppResult};

/// Upper bound accepted for client-supplied counters, leaving headroom for
/// attempt-driven increments.
pub const MAX_PROGRESS_COUNTER: u32 = 1_000_000_000;

/// Composite identity of a progress record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgressKey {
    pub user_id: String,
    pub activity_id: String,
}

impl ProgressKey {
    pub fn new(user_id: impl Into<String>, activity_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            activity_id: activity_id.into(),
        }
    }
}

impl fmt::Display for ProgressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.user_id, self.activity_id)
    }
}

/// Cumulative statistics for one user on one activity, across sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: String,
    pub activity_id: String,
    pub attempts: u32,
    pub successes: u32,
    pub current_level: u32,
    pub last_played: DateTime<Utc>,
    pub history: Vec<GameAttempt>,
}

impl UserProgress {
    pub fn new(key: &ProgressKey, now: DateTime<Utc>) -> Self {
        Self {
            user_id: key.user_id.clone(),
            activity_id: key.activity_id.clone(),
            attempts: 0,
            successes: 0,
            current_level: 1,
            last_played: now,
            history: Vec::new(),
        }
    }

    pub fn key(&self) -> ProgressKey {
        ProgressKey::new(self.user_id.clone(), self.activity_id.clone())
    }

    /// Counts the attempt and appends a copy to history. Leaves the record
    /// untouched when a counter would overflow.
    pub fn absorb(&mut self, attempt: &GameAttempt, now: DateTime<Utc>) -> AppResult<()> {
        let attempts = self.attempts.checked_add(1).ok_or_else(counter_exhausted)?;
        let successes = if attempt.success {
            self.successes.checked_add(1).ok_or_else(counter_exhausted)?
        } else {
            self.successes
        };

        self.attempts = attempts;
        self.successes = successes;
        self.last_played = now;
        self.history.push(attempt.clone());
        Ok(())
    }
}

fn counter_exhausted() -> AppError {
    AppError::InvalidState("Progress counter limit reached".to_string())
}

/// Request body for POST /api/game/progress
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_counters"))]
pub struct UpsertProgressRequest {
    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub user_id: String,

    #[validate(length(min = 1, message = "activity_id must not be empty"))]
    pub activity_id: String,

    #[validate(range(max = MAX_PROGRESS_COUNTER, message = "attempts is too large"))]
    #[serde(default)]
    pub attempts: u32,

    #[validate(range(max = MAX_PROGRESS_COUNTER, message = "successes is too large"))]
    #[serde(default)]
    pub successes: u32,

    #[validate(range(min = 1, message = "current_level must be at least 1"))]
    #[serde(default = "default_level")]
    pub current_level: u32,

    pub last_played: Option<DateTime<Utc>>,

    #[validate(nested)]
    #[serde(default)]
    pub history: Vec<AttemptRequest>,
}

fn default_level() -> u32 {
    1
}

fn validate_counters(req: &UpsertProgressRequest) -> Result<(), ValidationError> {
    if req.successes > req.attempts {
        let mut err = ValidationError::new("successes");
        err.message = Some("successes must not exceed attempts".into());
        return Err(err);
    }
    Ok(())
}

impl UpsertProgressRequest {
    pub fn into_progress(self, now: DateTime<Utc>) -> UserProgress {
        let history = self
            .history
            .into_iter()
            .map(|attempt| attempt.into_attempt(self.user_id.clone(), self.activity_id.clone(), now))
            .collect();

        UserProgress {
            user_id: self.user_id,
            activity_id: self.activity_id,
            attempts: self.attempts,
            successes: self.successes,
            current_level: self.current_level,
            last_played: self.last_played.unwrap_or(now),
            history,
        }
    }
}
