//! Hook handlers with fixed behavior.

use crate::error::HookError;
use crate::hook::{HookContext, HookHandler, HookOutcome};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A handler that records every context it sees and always proceeds.
/// Use `.contexts()` to inspect what was recorded.
#[derive(Default)]
pub struct RecordingHandler {
    contexts: Mutex<Vec<HookContext>>,
}

impl RecordingHandler {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded contexts.
    pub fn contexts(&self) -> Vec<HookContext> {
        self.contexts.lock().unwrap().clone()
    }

    /// How many times the handler ran.
    pub fn calls(&self) -> usize {
        self.contexts.lock().unwrap().len()
    }
}

#[async_trait]
impl HookHandler for RecordingHandler {
    async fn handle(&self, ctx: &HookContext) -> Result<HookOutcome, HookError> {
        self.contexts.lock().unwrap().push(ctx.clone());
        Ok(HookOutcome::proceed())
    }
}

/// A handler that always vetoes with a fixed reason.
pub struct VetoHandler {
    reason: String,
    calls: AtomicUsize,
}

impl VetoHandler {
    /// Create a vetoing handler.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times the handler ran.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HookHandler for VetoHandler {
    async fn handle(&self, _ctx: &HookContext) -> Result<HookOutcome, HookError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(HookOutcome::veto(self.reason.clone()))
    }
}

/// A handler that always errors.
pub struct FailingHandler {
    message: String,
    calls: AtomicUsize,
}

impl FailingHandler {
    /// Create a failing handler.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times the handler ran.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HookHandler for FailingHandler {
    async fn handle(&self, _ctx: &HookContext) -> Result<HookOutcome, HookError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(HookError::Failed(self.message.clone()))
    }
}
