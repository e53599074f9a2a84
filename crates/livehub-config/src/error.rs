//! Error types for config loading and decoding.

use thiserror::Error;

/// Errors returned while loading or decoding config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a config file failed.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing a JSON/JSON5 config file failed.
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] json5::Error),
    /// Parsing a YAML config file failed.
    #[error("failed to parse yaml config: {0}")]
    YamlFailed(#[from] serde_yaml::Error),
    /// Converting JSON values failed.
    #[error("failed to decode config: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// A specific field has the wrong type.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// A key was requested that the merged store does not hold.
    #[error("missing config key: {0}")]
    MissingKey(String),
    /// Generic validation failure.
    #[error("invalid config: {0}")]
    Invalid(String),
}
