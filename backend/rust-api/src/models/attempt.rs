use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// One submitted answer. Stored by value inside progress history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameAttempt {
    pub user_id: String,
    pub activity_id: String,
    pub timestamp: DateTime<Utc>,
    pub target: i64,
    pub inputs: Vec<i64>,
    pub success: bool,
    pub time_spent: f64,
}

impl GameAttempt {
    pub fn inputs_sum(&self) -> i64 {
        self.inputs.iter().sum()
    }
}

/// Attempt as it arrives over the wire, after field-name canonicalization.
///
/// `user_id`/`activity_id` are only mandatory for the session-less
/// `/sessions/current/attempts` endpoint; a session-bound attempt takes its
/// identity from the session.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AttemptRequest {
    pub user_id: Option<String>,
    pub activity_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub target: i64,
    #[serde(default)]
    pub inputs: Vec<i64>,
    pub success: bool,
    #[validate(range(min = 0.0, message = "time_spent must not be negative"))]
    pub time_spent: f64,
}

impl AttemptRequest {
    /// The user+activity pair named by the request body itself.
    pub fn identity(&self) -> AppResult<(String, String)> {
        let user_id = non_blank(self.user_id.as_deref())
            .ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;
        let activity_id = non_blank(self.activity_id.as_deref())
            .ok_or_else(|| AppError::Validation("activity_id is required".to_string()))?;
        Ok((user_id.to_string(), activity_id.to_string()))
    }

    pub fn into_attempt(
        self,
        user_id: impl Into<String>,
        activity_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> GameAttempt {
        GameAttempt {
            user_id: user_id.into(),
            activity_id: activity_id.into(),
            timestamp: self.timestamp.unwrap_or(now),
            target: self.target,
            inputs: self.inputs,
            success: self.success,
            time_spent: self.time_spent,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
