use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use synapse_core::definition::ProtocolDefinition;
use synapse_core::execution::ProtocolOutcome;
use synapse_core::hook::{HookContext, HookHandler, HookOutcome};
use synapse_core::name::{HookPoint, ProtocolName};
use synapse_hooks::HooksManager;
use synapse_shell::ProtocolRegistry;

use crate::command::COMMANDS;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::result_log::ResultLog;

/// What [`Engine::execute`] resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EngineResponse {
    /// A `pre-protocol` handler vetoed; the protocol never ran.
    Vetoed(HookOutcome),
    /// The protocol ran (it may still have stopped early).
    Executed(ProtocolOutcome),
}

impl EngineResponse {
    /// Whether a hook prevented the run.
    pub fn is_vetoed(&self) -> bool {
        matches!(self, Self::Vetoed(_))
    }

    /// The protocol outcome, if the protocol ran.
    pub fn outcome(&self) -> Option<&ProtocolOutcome> {
        match self {
            Self::Executed(outcome) => Some(outcome),
            Self::Vetoed(_) => None,
        }
    }
}

/// Registry plus hooks, wired together.
pub struct Engine {
    registry: ProtocolRegistry,
    hooks: HooksManager,
    results: Option<ResultLog>,
}

impl Engine {
    /// An engine with no protocols and no hooks.
    pub fn new() -> Self {
        Self {
            registry: ProtocolRegistry::new(),
            hooks: HooksManager::new(),
            results: None,
        }
    }

    /// An engine with the built-in cognitive protocols registered.
    pub fn with_cognitive_tools() -> Self {
        let mut engine = Self::new();
        synapse_cognitive::register_all(&mut engine.registry);
        engine
    }

    /// Build an engine from configuration: built-in protocols, hook
    /// manifests and the result log.
    pub async fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut engine = if config.cognitive_tools {
            Self::with_cognitive_tools()
        } else {
            Self::new()
        };
        if let Some(dir) = &config.hooks_dir {
            let loaded = engine.hooks.load_dir(dir).await?;
            tracing::info!(dir = %dir.display(), loaded, "loaded hook manifests");
        }
        if let Some(dir) = &config.results_dir {
            engine.results = Some(ResultLog::new(dir));
        }
        Ok(engine)
    }

    /// Write outcomes to `log` from now on.
    pub fn with_result_log(mut self, log: ResultLog) -> Self {
        self.results = Some(log);
        self
    }

    /// The protocol catalog.
    pub fn registry(&self) -> &ProtocolRegistry {
        &self.registry
    }

    /// The hook points.
    pub fn hooks(&self) -> &HooksManager {
        &self.hooks
    }

    /// Register a protocol definition under `name`.
    pub fn register(
        &mut self,
        name: impl Into<ProtocolName>,
        definition: ProtocolDefinition,
    ) -> &mut ProtocolRegistry {
        self.registry.register(name, definition)
    }

    /// Append a handler at `point`.
    pub fn register_hook(&mut self, point: impl Into<HookPoint>, handler: Arc<dyn HookHandler>) {
        self.hooks.register(point, handler);
    }

    /// Dispatch `ctx` to the handlers at `point`.
    pub async fn dispatch_hook(&self, point: &str, ctx: &HookContext) -> HookOutcome {
        self.hooks.dispatch(point, ctx).await
    }

    /// Run a protocol by name, surrounded by the engine's hook points.
    ///
    /// A `pre-protocol` veto is returned as [`EngineResponse::Vetoed`]
    /// without touching the registry. `post-protocol` handlers observe the
    /// outcome but cannot change it. When the protocol fails, `on-error`
    /// handlers run and the error is returned.
    pub async fn execute(&self, name: &str, input: Value) -> Result<EngineResponse, EngineError> {
        let pre = HookContext::new(HookPoint::PRE_PROTOCOL)
            .with_protocol(name)
            .with_input(input.clone());
        let gate = self.hooks.dispatch(HookPoint::PRE_PROTOCOL, &pre).await;
        if !gate.proceed {
            tracing::info!(
                protocol = name,
                reason = gate.reason.as_deref().unwrap_or(""),
                "protocol vetoed by pre-protocol hook"
            );
            return Ok(EngineResponse::Vetoed(gate));
        }

        let outcome = match self.registry.execute(name, input.clone()).await {
            Ok(outcome) => outcome,
            Err(err) => {
                let ctx = HookContext::new(HookPoint::ON_ERROR)
                    .with_protocol(name)
                    .with_error(err.to_string(), format!("protocol:{name}"));
                self.hooks.dispatch(HookPoint::ON_ERROR, &ctx).await;
                return Err(err.into());
            }
        };

        let post = HookContext::new(HookPoint::POST_PROTOCOL)
            .with_protocol(name)
            .with_input(input)
            .with_result(serde_json::to_value(&outcome)?);
        self.hooks.dispatch(HookPoint::POST_PROTOCOL, &post).await;

        if let Some(log) = &self.results {
            log.record(name, &outcome).await?;
        }

        Ok(EngineResponse::Executed(outcome))
    }

    /// Run one of the fixed [`COMMANDS`].
    ///
    /// Unknown commands are logged and ignored: the result is `Ok(None)`.
    pub async fn command(&self, name: &str, args: Value) -> Result<Option<Value>, EngineError> {
        let Some(command) = COMMANDS.iter().find(|c| c.name == name) else {
            tracing::info!(command = name, "unknown command; try /help");
            return Ok(None);
        };
        tracing::debug!(command = name, "running command");
        (command.handler)(self, args).await.map(Some)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
