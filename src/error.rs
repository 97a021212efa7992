//! Error types for cubebot.

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Persistence errors for the whole-table stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The schedule source is missing or unreadable. Ends the conversation.
    #[error("Schedule source unavailable: {0}")]
    SourceUnavailable(String),

    /// A credential or directory table could not be read. Callers treat the
    /// collection as empty and degrade.
    #[error("Table read failed: {0}")]
    ReadFailed(String),

    #[error("Table write failed: {0}")]
    WriteFailed(String),
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send reply on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Invalid message format: {0}")]
    InvalidMessage(String),
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
