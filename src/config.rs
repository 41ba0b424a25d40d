//! Application configuration loaded from environment variables.
//!
//! Everything here is non-sensitive; there are no remote secret fetches.
//! Policy knobs (trial size, free-tier history cap, cancelled-journey
//! retention) live here so the services stay free of magic numbers.

use std::env;
use std::path::PathBuf;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Directory for the JSON key-value store
    pub data_dir: PathBuf,
    /// Directory for managed media files (photos/audio captures)
    pub media_dir: PathBuf,
    /// Base URL used when generating journey share links
    pub share_base_url: String,
    /// Free-trial identification allowance for new users
    pub max_trial_identifications: u32,
    /// Maximum history entries retained for free-tier users
    pub free_history_limit: usize,
    /// Persist cancelled journeys (with CANCELLED status) instead of
    /// dropping them. Off by default: cancel means discard.
    pub keep_cancelled_journeys: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let data_dir: PathBuf = env::var("DATA_DIR")
            .map_err(|_| ConfigError::Missing("DATA_DIR"))?
            .into();

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            media_dir: env::var("MEDIA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join("media")),
            data_dir,
            share_base_url: env::var("SHARE_BASE_URL")
                .unwrap_or_else(|_| "https://wildtrail.app".to_string()),
            max_trial_identifications: parse_env_or("MAX_TRIAL_IDENTIFICATIONS", 3)?,
            free_history_limit: parse_env_or("FREE_HISTORY_LIMIT", 10)?,
            keep_cancelled_journeys: env::var("KEEP_CANCELLED_JOURNEYS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        let base = env::temp_dir().join("wildtrail-test");
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            media_dir: base.join("media"),
            data_dir: base,
            share_base_url: "https://wildtrail.app".to_string(),
            max_trial_identifications: 3,
            free_history_limit: 10,
            keep_cancelled_journeys: false,
        }
    }
}

/// Parse an env var as a number, falling back to a default when unset.
fn parse_env_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("DATA_DIR", "/tmp/wildtrail-config-test");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.port, 8080);
        assert_eq!(config.max_trial_identifications, 3);
        assert_eq!(config.free_history_limit, 10);
        assert!(!config.keep_cancelled_journeys);
        assert_eq!(
            config.media_dir,
            PathBuf::from("/tmp/wildtrail-config-test/media")
        );
    }
}
