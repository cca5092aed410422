//! Error types for protocol execution and hook dispatch.

use thiserror::Error;

/// Protocol execution errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A named input field failed its predicate. No step has run.
    #[error("input validation failed for {protocol}: field '{field}'")]
    InputValidation {
        /// Protocol being executed.
        protocol: String,
        /// The field whose predicate returned false.
        field: String,
    },

    /// A step's result was rejected by the step's own validator.
    #[error("step '{step}' of {protocol} failed validation")]
    StepValidation {
        /// Protocol being executed.
        protocol: String,
        /// Name of the rejected step.
        step: String,
    },

    /// A named output field failed its predicate after all steps ran.
    #[error("output validation failed for {protocol}: field '{field}'")]
    OutputValidation {
        /// Protocol being executed.
        protocol: String,
        /// The field whose predicate returned false.
        field: String,
    },

    /// A step action failed.
    #[error("step '{step}' failed: {message}")]
    Action {
        /// Name of the failing step.
        step: String,
        /// Error message.
        message: String,
    },

    /// No protocol is registered under this name.
    #[error("protocol not found: {0}")]
    NotFound(String),

    /// The shell has already left the `initialized` state.
    #[error("protocol shell for {0} has already been executed")]
    AlreadyExecuted(String),

    /// The rollback itself failed. Replaces the error that triggered it.
    #[error("rollback failed: {0}")]
    Rollback(String),

    /// Catch-all. Include context.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ProtocolError {
    /// Shorthand for an action failure.
    pub fn action(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Action {
            step: step.into(),
            message: message.into(),
        }
    }
}

/// Hook errors. These are logged but do NOT stop dispatch
/// (return a vetoing [`HookOutcome`](crate::HookOutcome) to stop).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HookError {
    /// The hook execution failed.
    #[error("hook failed: {0}")]
    Failed(String),

    /// A hook manifest could not be read or parsed.
    #[error("invalid hook manifest {path}: {message}")]
    Manifest {
        /// File the manifest was read from.
        path: String,
        /// What went wrong.
        message: String,
    },

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
