pub mod attempt;
pub mod configuration;
pub mod progress;
pub mod session;

pub use attempt::{AttemptRequest, GameAttempt};
pub use configuration::{
    CreateConfigurationRequest, Difficulty, GameConfiguration, ListConfigurationsQuery,
    ProgressionRules, TargetRange,
};
pub use progress::{ProgressKey, UpsertProgressRequest, UserProgress};
pub use session::{CreateSessionQuery, GameSession};
