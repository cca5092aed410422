use synapse_core::error::{HookError, ProtocolError};
use thiserror::Error;

/// Errors returned by the engine facade.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EngineError {
    /// A protocol failed or was not found.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Hook setup failed.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),

    /// A command was given arguments it cannot use.
    #[error("invalid arguments for {command}: {message}")]
    InvalidArguments {
        /// Command that rejected its arguments.
        command: String,
        /// What was wrong.
        message: String,
    },

    /// Filesystem failure (result log).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
