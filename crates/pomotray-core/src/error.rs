//! Core error types for pomotray-core.
//!
//! Configuration problems fail engine construction outright; command
//! failures are reported to the caller of the operation that triggered them.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Core error type for pomotray-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A task hook command failed
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// The engine driver task is gone
    #[error("Engine driver is not running")]
    DriverClosed,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Errors raised while running a task's shell hook.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The shell could not be spawned
    #[error("Failed to launch '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran and exited unsuccessfully
    #[error("Command '{command}' failed with {status}")]
    Failed { command: String, status: ExitStatus },

    /// Rejected by a non-shell runner
    #[error("Command '{command}' rejected: {message}")]
    Rejected { command: String, message: String },
}

impl CommandError {
    /// The command line that failed.
    pub fn command(&self) -> &str {
        match self {
            CommandError::Launch { command, .. }
            | CommandError::Failed { command, .. }
            | CommandError::Rejected { command, .. } => command,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
