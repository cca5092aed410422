//! In-memory helpers for testing.
//!
//! Available behind the `test-utils` feature flag. These are minimal
//! implementations that prove the trait APIs are usable.

mod handlers;
mod order_log;

pub use handlers::{FailingHandler, RecordingHandler, VetoHandler};
pub use order_log::OrderLog;
