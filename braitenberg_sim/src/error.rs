//! Error types for the scenario runner and CLI.

use braitenberg_core::ConfigError;
use braitenberg_env::EnvError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Environment error: {0}")]
    Env(#[from] EnvError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("Invalid arguments: {0}")]
    Usage(String),
}

impl SimError {
    pub fn unknown_scenario(name: impl Into<String>) -> Self {
        Self::UnknownScenario(name.into())
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}
