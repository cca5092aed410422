//! # synapse-core: types for the synapse protocol engine
//!
//! A *protocol* is a named, versioned, ordered list of steps with optional
//! input/output validation and an optional rollback. This crate defines the
//! vocabulary every other synapse crate speaks:
//!
//! | Concern | Types | What it does |
//! |---------|-------|-------------|
//! | Definition | [`ProtocolDefinition`], [`Step`], [`Predicate`] | What a protocol is |
//! | Execution | [`ShellStatus`], [`ShellMetadata`], [`ShellContext`], [`ProtocolOutcome`] | What a run looks like |
//! | Extension | [`StepAction`], [`Rollback`] | User code run by the shell |
//! | Hooks | [`HookHandler`], [`HookContext`], [`HookOutcome`], [`HookPoint`] | Observation + veto around execution |
//!
//! ## Dependency Notes
//!
//! Inputs and results are `serde_json::Value`. Protocols are composed at
//! runtime (one protocol's results become the next one's input), so a
//! dynamically-shaped value is the natural currency; a generic `T` would
//! break chaining and trait object safety.
//!
//! Step actions, rollbacks and hook handlers use `async-trait` so they can
//! be stored as `Arc<dyn Trait>` in heterogeneous lists.

#![deny(missing_docs)]

pub mod definition;
pub mod error;
pub mod execution;
pub mod hook;
pub mod name;
pub mod step;
pub mod value;

#[cfg(feature = "test-utils")]
pub mod test_utils;

// Re-exports for convenience
pub use definition::{
    Predicate, ProtocolDefinition, ProtocolDefinitionBuilder, Rollback, ValidationRules,
    predicate, rollback_fn,
};
pub use error::{HookError, ProtocolError};
pub use execution::{ProtocolOutcome, ShellContext, ShellMetadata, ShellStatus};
pub use hook::{HookContext, HookHandler, HookOutcome, handler_fn};
pub use name::{HookPoint, ProtocolName};
pub use step::{NamedStep, Step, StepAction, action_fn, async_action_fn};
pub use value::{is_truthy, reason_of};
