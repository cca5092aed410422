//! The hook interface: observation and veto around protocol execution.

use crate::error::HookError;
use crate::name::{HookPoint, ProtocolName};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// What a handler can see when its hook point fires.
/// Read-only; handlers observe and decide, they don't mutate.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookContext {
    /// Hook point being dispatched.
    pub point: HookPoint,
    /// Protocol concerned (pre/post-protocol).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<ProtocolName>,
    /// Protocol input (pre/post-protocol).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    /// Protocol result (post-protocol).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error message (on-error).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Operation that failed, e.g. `protocol:code.analyze` (on-error).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Free-form payload for caller-defined hook points.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl HookContext {
    /// Create a HookContext with only the hook point set.
    pub fn new(point: impl Into<HookPoint>) -> Self {
        Self {
            point: point.into(),
            protocol: None,
            input: None,
            result: None,
            error: None,
            operation: None,
            data: Value::Null,
        }
    }

    /// Set the protocol name.
    pub fn with_protocol(mut self, protocol: impl Into<ProtocolName>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Set the protocol input.
    pub fn with_input(mut self, input: Value) -> Self {
        self.input = Some(input);
        self
    }

    /// Set the protocol result.
    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    /// Set the error message and failing operation.
    pub fn with_error(mut self, error: impl Into<String>, operation: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self.operation = Some(operation.into());
        self
    }

    /// Set the free-form payload.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// What a handler decides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookOutcome {
    /// `false` vetoes: dispatch stops and the caller should not proceed.
    pub proceed: bool,
    /// Why the handler vetoed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Anything else the handler wants to hand back.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl HookOutcome {
    /// Carry on.
    pub fn proceed() -> Self {
        Self {
            proceed: true,
            reason: None,
            data: Value::Null,
        }
    }

    /// Stop dispatch and tell the caller not to proceed.
    pub fn veto(reason: impl Into<String>) -> Self {
        Self {
            proceed: false,
            reason: Some(reason.into()),
            data: Value::Null,
        }
    }

    /// Attach a payload.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

impl Default for HookOutcome {
    fn default() -> Self {
        Self::proceed()
    }
}

/// A handler registered at one hook point.
///
/// Returning an error does NOT stop dispatch: the error is logged and the
/// next handler runs. Return [`HookOutcome::veto`] to stop.
#[async_trait]
pub trait HookHandler: Send + Sync {
    /// Called each time the handler's hook point is dispatched.
    async fn handle(&self, ctx: &HookContext) -> Result<HookOutcome, HookError>;
}

struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<F> HookHandler for FnHandler<F>
where
    F: Fn(&HookContext) -> Result<HookOutcome, HookError> + Send + Sync + 'static,
{
    async fn handle(&self, ctx: &HookContext) -> Result<HookOutcome, HookError> {
        (self.f)(ctx)
    }
}

/// Create a handler from a synchronous closure.
#[must_use]
pub fn handler_fn<F>(f: F) -> Arc<dyn HookHandler>
where
    F: Fn(&HookContext) -> Result<HookOutcome, HookError> + Send + Sync + 'static,
{
    Arc::new(FnHandler { f })
}
