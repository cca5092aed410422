#![deny(missing_docs)]
//! Built-in cognitive tool protocols.
//!
//! | Protocol | Purpose |
//! |----------|---------|
//! | `self.reflect` | Review content against criteria |
//! | `self.identify_gaps` | Find what a piece of work does not cover |
//! | `self.improve` | Turn feedback into a revised solution plan |
//! | `code.analyze` | Structure, quality and issues of a code sample |
//! | `thinking.systematic` | Decompose, analyze, synthesize, conclude |
//! | `thinking.extended` | Depth-controlled deliberation |
//!
//! Step actions are descriptive placeholders: each returns an object that
//! names what the step would do and echoes the relevant input, so callers
//! and hooks get a well-shaped trace without any model behind it.

mod code;
mod reflection;
mod thinking;

use serde_json::{Value, json};
use synapse_core::definition::{Predicate, ProtocolDefinition, predicate};
use synapse_shell::ProtocolRegistry;

pub use code::code_analyze;
pub use reflection::{self_identify_gaps, self_improve, self_reflect};
pub use thinking::{thinking_extended, thinking_systematic};

/// Every built-in definition, in registration order.
pub fn definitions() -> Vec<ProtocolDefinition> {
    vec![
        self_reflect(),
        self_identify_gaps(),
        self_improve(),
        code_analyze(),
        thinking_systematic(),
        thinking_extended(),
    ]
}

/// Register every built-in definition under its own name.
pub fn register_all(registry: &mut ProtocolRegistry) -> &mut ProtocolRegistry {
    for definition in definitions() {
        registry.register_definition(definition);
    }
    registry
}

/// Descriptive step result: `{ "action": ..., "description": ..., ...extra }`.
pub(crate) fn describe(action: &str, description: String, extra: Value) -> Value {
    let mut out = json!({ "action": action, "description": description });
    if let (Some(out), Value::Object(extra)) = (out.as_object_mut(), extra) {
        out.extend(extra);
    }
    out
}

/// Non-empty string.
pub(crate) fn non_empty_text() -> Predicate {
    predicate(|v| v.as_str().is_some_and(|s| !s.trim().is_empty()))
}

/// Text of `input[field]`, or empty.
pub(crate) fn text<'a>(input: &'a Value, field: &str) -> &'a str {
    input.get(field).and_then(Value::as_str).unwrap_or("")
}

/// Result fields must be present and non-null.
pub(crate) fn present() -> Predicate {
    predicate(|v| !v.is_null())
}
