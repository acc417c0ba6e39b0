use std::sync::Arc;

use crate::config::Config;
use crate::store::{GameStore, InMemoryStore};
use target_source::{SeededTargets, TargetSource, ThreadRngTargets};

pub mod attempt_service;
pub mod configuration_service;
pub mod progress_service;
pub mod session_service;
pub mod target_source;

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn GameStore>,
    pub targets: Arc<dyn TargetSource>,
}

impl AppState {
    /// In-memory store, with seeded target draws when `game.target_seed` is set.
    pub fn new(config: Config) -> Self {
        let targets: Arc<dyn TargetSource> = match config.target_seed {
            Some(seed) => {
                tracing::info!("Using seeded target generator (seed={})", seed);
                Arc::new(SeededTargets::new(seed))
            }
            None => Arc::new(ThreadRngTargets),
        };

        Self::with_parts(config, Arc::new(InMemoryStore::new()), targets)
    }

    pub fn with_parts(
        config: Config,
        store: Arc<dyn GameStore>,
        targets: Arc<dyn TargetSource>,
    ) -> Self {
        Self {
            config,
            store,
            targets,
        }
    }
}
