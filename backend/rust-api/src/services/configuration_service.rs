use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::metrics::CONFIGURATIONS_CREATED_TOTAL;
use crate::models::configuration::MAX_LIST_LIMIT;
use crate::models::{CreateConfigurationRequest, GameConfiguration, ListConfigurationsQuery};
use crate::store::GameStore;

pub struct ConfigurationService {
    store: Arc<dyn GameStore>,
}

impl ConfigurationService {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        Self { store }
    }

    /// Stores a configuration, generating an id when none was supplied.
    /// An existing configuration with the same id is replaced.
    pub async fn create(&self, req: CreateConfigurationRequest) -> AppResult<GameConfiguration> {
        let id = req
            .requested_id()
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        if self.store.get_configuration(&id).await?.is_some() {
            tracing::warn!("Replacing existing game configuration: {}", id);
        }

        let config = req.into_configuration(id, Utc::now());
        self.store.insert_configuration(config.clone()).await?;

        CONFIGURATIONS_CREATED_TOTAL.inc();
        tracing::info!(
            "Game configuration created: {} ({:?}, range {}..={}) by {}",
            config.id,
            config.difficulty,
            config.target_range.min,
            config.target_range.max,
            config.created_by
        );

        Ok(config)
    }

    /// Filters by owner-or-public and difficulty, then truncates to `limit`,
    /// keeping insertion order.
    pub async fn list(&self, query: &ListConfigurationsQuery) -> AppResult<Vec<GameConfiguration>> {
        let limit = query.limit.clamp(1, MAX_LIST_LIMIT) as usize;

        let configs = self
            .store
            .list_configurations()
            .await?
            .into_iter()
            .filter(|c| query.owner().is_none_or(|user| c.visible_to(user)))
            .filter(|c| query.difficulty.is_none_or(|d| c.difficulty == d))
            .take(limit)
            .collect::<Vec<_>>();

        tracing::debug!(
            "Listed {} configurations (user={:?}, difficulty={:?}, limit={})",
            configs.len(),
            query.owner(),
            query.difficulty,
            limit
        );

        Ok(configs)
    }

    pub async fn get(&self, config_id: &str) -> AppResult<GameConfiguration> {
        self.store
            .get_configuration(config_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Game configuration not found".to_string()))
    }
}
