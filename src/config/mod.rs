use std::env;
use std::time::Duration;

const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

/// Errors raised while reading the process configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing the environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for the environment variable {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub server_host: String,
    pub server_port: u16,
    pub bcrypt_cost: u32,
    pub request_timeout_secs: u64,
    pub views_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = var("JWT_SECRET").ok_or(ConfigError::MissingVar("JWT_SECRET"))?;

        let server_port = match var("SERVER_PORT").or_else(|| var("PORT")) {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT", port))?,
            None => 8080,
        };

        let bcrypt_cost = match var("BCRYPT_COST") {
            Some(cost) => {
                let parsed: u32 = cost
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("BCRYPT_COST", cost.clone()))?;
                if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&parsed) {
                    return Err(ConfigError::InvalidValue("BCRYPT_COST", cost));
                }
                parsed
            }
            None => bcrypt::DEFAULT_COST,
        };

        Ok(Config {
            jwt_secret,
            database_url: var("DATABASE_URL"),
            database_max_connections: var("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(10),
            server_host: var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port,
            bcrypt_cost,
            request_timeout_secs: var("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(30),
            views_dir: var("VIEWS_DIR").unwrap_or_else(|| "views".to_string()),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
