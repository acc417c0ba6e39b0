use serde::Deserialize;
use std::env;

pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    /// Fixed seed for target draws; unset means OS entropy.
    pub target_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
            target_seed: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // config/{env}.toml first, APP__SECTION__KEY env vars on top
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let defaults = Config::default();

        let host = settings
            .get_string("server.host")
            .or_else(|_| env::var("HOST"))
            .unwrap_or(defaults.host);

        let port = match settings.get_int("server.port") {
            Ok(port) => u16::try_from(port).map_err(|_| {
                config::ConfigError::Message(format!("server.port out of range: {}", port))
            })?,
            Err(_) => match env::var("PORT") {
                Ok(raw) => raw.parse().map_err(|_| {
                    config::ConfigError::Message(format!("PORT is not a valid port: {}", raw))
                })?,
                Err(_) => defaults.port,
            },
        };

        let cors_allowed_origins = settings
            .get_string("cors.allowed_origins")
            .or_else(|_| env::var("CORS_ALLOWED_ORIGINS"))
            .map(|raw| parse_origins(&raw))
            .unwrap_or(defaults.cors_allowed_origins);

        let target_seed = match settings.get_int("game.target_seed") {
            Ok(seed) => Some(u64::try_from(seed).map_err(|_| {
                config::ConfigError::Message(format!("game.target_seed is negative: {}", seed))
            })?),
            Err(_) => None,
        };

        Ok(Config {
            host,
            port,
            cors_allowed_origins,
            target_seed,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
