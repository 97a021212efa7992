//! Configuration types.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Bot configuration.
///
/// All values come from the environment with file-relative defaults, so a
/// bare `cubebot` run in a prepared directory just works.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram bot token. When unset the bot runs on the CLI channel.
    pub token: Option<SecretString>,
    /// Schedule source table (externally authored, read-only).
    pub schedule_path: PathBuf,
    /// Persisted credential table.
    pub credentials_path: PathBuf,
    /// Name→group directory table.
    pub directory_path: PathBuf,
    /// Maximum characters per outbound page.
    pub page_size: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: None,
            schedule_path: PathBuf::from("data/schedule.json"),
            credentials_path: PathBuf::from("data/credentials.json"),
            directory_path: PathBuf::from("data/directory.json"),
            page_size: 4000,
        }
    }
}

impl BotConfig {
    /// Build a config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let path = |var: &str, default: PathBuf| {
            std::env::var(var).map(PathBuf::from).unwrap_or(default)
        };
        let page_size = match std::env::var("CUBEBOT_PAGE_SIZE") {
            Ok(raw) => raw.parse().map_err(|e| ConfigError::InvalidValue {
                key: "CUBEBOT_PAGE_SIZE".into(),
                message: format!("{e}: {raw:?}"),
            })?,
            Err(_) => defaults.page_size,
        };
        Ok(Self {
            token: std::env::var("CUBEBOT_TOKEN").ok().map(SecretString::from),
            schedule_path: path("CUBEBOT_SCHEDULE", defaults.schedule_path),
            credentials_path: path("CUBEBOT_CREDENTIALS", defaults.credentials_path),
            directory_path: path("CUBEBOT_DIRECTORY", defaults.directory_path),
            page_size,
        })
    }
}
