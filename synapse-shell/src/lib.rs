#![deny(missing_docs)]
//! Execution machinery for synapse protocols.
//!
//! - [`ProtocolShell`] runs one definition against one input: input
//!   validation, ordered steps, early stop, output validation, rollback.
//! - [`Chain`] runs several definitions in order, feeding each one's
//!   results to the next as input.
//! - [`ProtocolRegistry`] is the name-keyed catalog with category listing
//!   and execute-by-name.

mod chain;
mod registry;
mod shell;

pub use chain::{Chain, ChainLink, ChainOutcome};
pub use registry::ProtocolRegistry;
pub use shell::ProtocolShell;
