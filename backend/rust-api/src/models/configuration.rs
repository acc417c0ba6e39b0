use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub const DEFAULT_LIST_LIMIT: i64 = 10;
pub const MAX_LIST_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Inclusive range the session target is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRange {
    pub min: i64,
    pub max: i64,
}

impl TargetRange {
    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProgressionRules {
    #[validate(range(
        min = 0.0,
        max = 1.0,
        message = "required_success_rate must be between 0 and 1"
    ))]
    #[serde(default = "default_success_rate")]
    pub required_success_rate: f64,

    #[serde(default = "default_advancement_threshold")]
    pub advancement_threshold: u32,
}

impl Default for ProgressionRules {
    fn default() -> Self {
        Self {
            required_success_rate: default_success_rate(),
            advancement_threshold: default_advancement_threshold(),
        }
    }
}

fn default_success_rate() -> f64 {
    0.8
}

fn default_advancement_threshold() -> u32 {
    5
}

/// A stored game template. Immutable after creation; re-posting the same id
/// replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfiguration {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub target_range: TargetRange,
    pub number_of_addends: u32,
    pub time_limit: Option<u32>,
    pub hints_enabled: bool,
    pub progression_rules: ProgressionRules,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub is_public: bool,
}

impl GameConfiguration {
    pub fn visible_to(&self, user_id: &str) -> bool {
        self.is_public || self.created_by == user_id
    }
}

/// Request body for POST /api/game/configurations
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_target_range"))]
pub struct CreateConfigurationRequest {
    /// Optional client-chosen id; generated when absent or blank
    pub id: Option<String>,

    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    pub title: String,

    pub difficulty: Difficulty,

    pub target_range: TargetRange,

    #[validate(range(min = 1, message = "number_of_addends must be at least 1"))]
    #[serde(default = "default_number_of_addends")]
    pub number_of_addends: u32,

    #[validate(range(min = 1, message = "time_limit must be at least 1 second"))]
    pub time_limit: Option<u32>,

    #[serde(default = "default_hints_enabled")]
    pub hints_enabled: bool,

    #[validate(nested)]
    #[serde(default)]
    pub progression_rules: ProgressionRules,

    #[validate(length(min = 1, message = "created_by must not be empty"))]
    pub created_by: String,

    #[serde(default)]
    pub is_public: bool,
}

fn default_number_of_addends() -> u32 {
    2
}

fn default_hints_enabled() -> bool {
    true
}

fn validate_target_range(req: &CreateConfigurationRequest) -> Result<(), ValidationError> {
    if req.target_range.min > req.target_range.max {
        let mut err = ValidationError::new("target_range");
        err.message = Some("target_range.min must not exceed target_range.max".into());
        return Err(err);
    }
    Ok(())
}

impl CreateConfigurationRequest {
    /// Client-supplied id, if it carries anything other than whitespace.
    pub fn requested_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    pub fn into_configuration(self, id: String, created_at: DateTime<Utc>) -> GameConfiguration {
        GameConfiguration {
            id,
            title: self.title,
            difficulty: self.difficulty,
            target_range: self.target_range,
            number_of_addends: self.number_of_addends,
            time_limit: self.time_limit,
            hints_enabled: self.hints_enabled,
            progression_rules: self.progression_rules,
            created_by: self.created_by,
            created_at,
            is_public: self.is_public,
        }
    }
}

/// Query params for GET /api/game/configurations
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ListConfigurationsQuery {
    pub user_id: Option<String>,
    pub difficulty: Option<Difficulty>,
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIST_LIMIT
}

impl ListConfigurationsQuery {
    /// Owner filter; a blank `user_id` means no filter.
    pub fn owner(&self) -> Option<&str> {
        self.user_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

impl Default for ListConfigurationsQuery {
    fn default() -> Self {
        Self {
            user_id: None,
            difficulty: None,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}
