#![deny(missing_docs)]
//! The synapse protocol engine.
//!
//! [`Engine`] owns a [`ProtocolRegistry`] and a [`HooksManager`] and is the
//! single entry point for running protocols:
//!
//! ```text
//! Engine::execute(name, input)
//!   → pre-protocol hooks (a veto ends here)
//!   → registry.execute → ProtocolShell::execute
//!   → post-protocol hooks
//!   → outcome
//! on error: on-error hooks, then the error is returned
//! ```
//!
//! The engine is an ordinary value: construct one per application (or per
//! test) and pass it by reference.

mod command;
mod config;
mod engine;
mod error;
mod result_log;

pub use command::{COMMANDS, Command};
pub use config::EngineConfig;
pub use engine::{Engine, EngineResponse};
pub use error::EngineError;
pub use result_log::ResultLog;

pub use synapse_hooks::HooksManager;
pub use synapse_shell::ProtocolRegistry;
