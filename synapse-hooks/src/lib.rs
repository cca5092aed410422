#![deny(missing_docs)]
//! Hook points and dispatch for synapse.
//!
//! The [`HooksManager`] keeps an ordered list of [`HookHandler`]s per named
//! hook point. Dispatching a point calls its handlers in registration order.
//! The pipeline short-circuits on the first veto (`proceed: false`); later
//! handlers are not called. Handler errors are logged and the pipeline
//! continues (errors don't veto).
//!
//! Handlers can also be declared as JSON manifests on disk and loaded with
//! [`HooksManager::load_dir`]; see [`manifest`].

pub mod manifest;

use std::collections::HashMap;
use std::sync::Arc;
use synapse_core::hook::{HookContext, HookHandler, HookOutcome};
use synapse_core::name::HookPoint;

pub use manifest::{HookManifest, ManifestHandler};

/// Named hook points, each holding handlers in registration order.
///
/// There is no removal: registration order is execution order for the
/// life of the manager.
pub struct HooksManager {
    hooks: HashMap<HookPoint, Vec<Arc<dyn HookHandler>>>,
}

impl HooksManager {
    /// Create a manager with no handlers.
    pub fn new() -> Self {
        Self {
            hooks: HashMap::new(),
        }
    }

    /// Append a handler to the list for `point`, creating the list on first use.
    pub fn register(&mut self, point: impl Into<HookPoint>, handler: Arc<dyn HookHandler>) {
        let point = point.into();
        tracing::debug!(point = %point, "registering hook handler");
        self.hooks.entry(point).or_default().push(handler);
    }

    /// Number of handlers registered at `point`.
    pub fn handler_count(&self, point: &str) -> usize {
        self.hooks.get(point).map_or(0, Vec::len)
    }

    /// Hook points that have at least one handler.
    pub fn points(&self) -> Vec<&HookPoint> {
        self.hooks.keys().collect()
    }

    /// Dispatch `ctx` to every handler registered at `point`.
    ///
    /// Returns [`HookOutcome::proceed`] when no handlers are registered or
    /// none vetoes. The first vetoing handler's outcome is returned as-is
    /// and the remaining handlers are skipped. A handler error is logged and
    /// treated as "carry on".
    pub async fn dispatch(&self, point: &str, ctx: &HookContext) -> HookOutcome {
        let Some(handlers) = self.hooks.get(point) else {
            return HookOutcome::proceed();
        };

        for (index, handler) in handlers.iter().enumerate() {
            match handler.handle(ctx).await {
                Ok(outcome) if !outcome.proceed => {
                    tracing::debug!(
                        point,
                        index,
                        reason = outcome.reason.as_deref().unwrap_or(""),
                        "hook handler vetoed"
                    );
                    return outcome;
                }
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(point, index, error = %e, "hook handler failed; continuing");
                    continue;
                }
            }
        }

        HookOutcome::proceed()
    }
}

impl Default for HooksManager {
    fn default() -> Self {
        Self::new()
    }
}
