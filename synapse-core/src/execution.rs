//! Per-run state: status machine, metadata, the context handed to steps,
//! and the outcome returned to callers.

use crate::name::ProtocolName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle of one protocol shell.
///
/// `Initialized → Executing → {Completed | Stopped | Failed}`. Transitions
/// only move forward; a terminal shell is never re-entered.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShellStatus {
    /// Constructed, not yet executed.
    Initialized,
    /// Steps are running.
    Executing,
    /// All steps and output validation succeeded.
    Completed,
    /// A step asked to stop early. Not an error; no rollback.
    Stopped,
    /// Validation or a step failed. Rollback (if any) was attempted.
    Failed,
}

impl ShellStatus {
    /// Whether this status ends the shell's life.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Stopped | Self::Failed)
    }

    /// Whether moving from `self` to `next` is a legal forward transition.
    pub fn can_advance_to(self, next: ShellStatus) -> bool {
        match self {
            Self::Initialized => next == Self::Executing,
            Self::Executing => next.is_terminal(),
            _ => false,
        }
    }
}

/// Timestamps and status of one shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellMetadata {
    /// When the shell was constructed.
    pub created: DateTime<Utc>,
    /// When `execute` was entered. Set exactly once.
    pub executed: Option<DateTime<Utc>>,
    /// Current status.
    pub status: ShellStatus,
}

impl ShellMetadata {
    /// Fresh metadata stamped with the current time.
    pub fn new() -> Self {
        Self {
            created: Utc::now(),
            executed: None,
            status: ShellStatus::Initialized,
        }
    }
}

impl Default for ShellMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// What a running step (or rollback) can see of its shell.
///
/// Later steps read earlier results from [`ShellContext::results`]; nothing
/// beyond list order enforces those dependencies.
#[derive(Debug, Clone)]
pub struct ShellContext {
    /// Protocol being executed.
    pub protocol: ProtocolName,
    /// The input the protocol was invoked with.
    pub input: Value,
    /// Results recorded so far, keyed by step name.
    pub results: Map<String, Value>,
    /// Snapshot of the shell's metadata.
    pub metadata: ShellMetadata,
}

impl ShellContext {
    /// Create a context for a protocol with the given input and no results.
    pub fn new(protocol: impl Into<ProtocolName>, input: Value) -> Self {
        Self {
            protocol: protocol.into(),
            input,
            results: Map::new(),
            metadata: ShellMetadata::new(),
        }
    }

    /// Result of an earlier step, if it has run.
    pub fn result(&self, step: &str) -> Option<&Value> {
        self.results.get(step)
    }
}

/// The value a protocol run resolves to.
///
/// `success == false` without an error means a step stopped the run early;
/// failures are reported as `Err(ProtocolError)` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolOutcome {
    /// True when every step ran and output validation passed.
    pub success: bool,
    /// Step results keyed by step name.
    pub results: Map<String, Value>,
    /// Why the run stopped early. A non-string `reason` in the stopping
    /// step's result is rendered as its JSON text; the raw value stays in
    /// `results`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Shell metadata, present on completed runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ShellMetadata>,
}

impl ProtocolOutcome {
    /// A completed run.
    pub fn completed(results: Map<String, Value>, metadata: ShellMetadata) -> Self {
        Self {
            success: true,
            results,
            reason: None,
            metadata: Some(metadata),
        }
    }

    /// A run that a step stopped early.
    pub fn stopped(reason: Option<String>, results: Map<String, Value>) -> Self {
        Self {
            success: false,
            results,
            reason,
            metadata: None,
        }
    }

    /// The results as a JSON object, suitable as the next protocol's input.
    pub fn results_value(&self) -> Value {
        Value::Object(self.results.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_only_move_forward() {
        use ShellStatus::*;
        assert!(Initialized.can_advance_to(Executing));
        assert!(Executing.can_advance_to(Completed));
        assert!(Executing.can_advance_to(Stopped));
        assert!(Executing.can_advance_to(Failed));
        assert!(!Initialized.can_advance_to(Completed));
        assert!(!Completed.can_advance_to(Executing));
        assert!(!Failed.can_advance_to(Executing));
        assert!(!Stopped.can_advance_to(Failed));
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&ShellStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
