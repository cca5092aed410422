//! OrderLog: step actions that record when they ran.

use crate::error::ProtocolError;
use crate::execution::ShellContext;
use crate::step::{StepAction, action_fn};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

/// Shared execution-order log. Each action created by [`OrderLog::action`]
/// appends its label when it runs and returns
/// `{ "label": ..., "position": n, "seen": [earlier result keys] }`.
#[derive(Clone, Default)]
pub struct OrderLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl OrderLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// An action that appends `label` to the log.
    pub fn action(&self, label: &str) -> Arc<dyn StepAction> {
        let entries = Arc::clone(&self.entries);
        let label = label.to_string();
        action_fn(move |_input: &Value, shell: &ShellContext| {
            let mut entries = entries.lock().unwrap();
            entries.push(label.clone());
            let seen: Vec<&String> = shell.results.keys().collect();
            Ok(json!({ "label": label, "position": entries.len() - 1, "seen": seen }))
        })
    }

    /// An action that appends `label` and then fails.
    pub fn failing_action(&self, label: &str, message: &str) -> Arc<dyn StepAction> {
        let entries = Arc::clone(&self.entries);
        let label = label.to_string();
        let message = message.to_string();
        action_fn(move |_input: &Value, _shell: &ShellContext| {
            entries.lock().unwrap().push(label.clone());
            Err(ProtocolError::action(label.clone(), message.clone()))
        })
    }

    /// Snapshot of the labels in execution order.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}
