//! Fixed slash-command table.

use serde_json::{Value, json};
use synapse_core::step::BoxFuture;

use crate::engine::Engine;
use crate::error::EngineError;

type CommandHandler = for<'a> fn(&'a Engine, Value) -> BoxFuture<'a, Result<Value, EngineError>>;

/// One entry of the command table.
pub struct Command {
    /// Literal command string, e.g. `/protocol`.
    pub name: &'static str,
    /// One-line help text.
    pub description: &'static str,
    pub(crate) handler: CommandHandler,
}

/// Every command the engine understands.
pub const COMMANDS: &[Command] = &[
    Command {
        name: "/protocol",
        description: "Run a protocol: {\"name\": ..., \"input\": {...}}",
        handler: run_protocol,
    },
    Command {
        name: "/list",
        description: "List protocols, optionally by {\"category\": ...}",
        handler: list_protocols,
    },
    Command {
        name: "/reflect",
        description: "Run self.reflect with the given input",
        handler: reflect,
    },
    Command {
        name: "/think",
        description: "Run thinking.extended with the given input",
        handler: think,
    },
    Command {
        name: "/help",
        description: "Show this list",
        handler: help,
    },
];

fn run_protocol(engine: &Engine, args: Value) -> BoxFuture<'_, Result<Value, EngineError>> {
    Box::pin(async move {
        let name = args
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| EngineError::InvalidArguments {
                command: "/protocol".into(),
                message: "missing string field 'name'".into(),
            })?;
        let input = args.get("input").cloned().unwrap_or_else(|| json!({}));
        let response = engine.execute(name, input).await?;
        Ok(serde_json::to_value(response)?)
    })
}

fn list_protocols(engine: &Engine, args: Value) -> BoxFuture<'_, Result<Value, EngineError>> {
    Box::pin(async move {
        let registry = engine.registry();
        let names = match args.get("category").and_then(Value::as_str) {
            Some(category) => registry.list_by_category(category),
            None => registry.list(),
        };
        let protocols: Vec<Value> = names
            .into_iter()
            .filter_map(|name| registry.get(name.as_str()))
            .map(|def| json!({ "name": def.name, "version": def.version, "intent": def.intent }))
            .collect();
        Ok(json!({ "protocols": protocols }))
    })
}

fn reflect(engine: &Engine, args: Value) -> BoxFuture<'_, Result<Value, EngineError>> {
    Box::pin(async move {
        let response = engine.execute("self.reflect", args).await?;
        Ok(serde_json::to_value(response)?)
    })
}

fn think(engine: &Engine, args: Value) -> BoxFuture<'_, Result<Value, EngineError>> {
    Box::pin(async move {
        let response = engine.execute("thinking.extended", args).await?;
        Ok(serde_json::to_value(response)?)
    })
}

fn help(_engine: &Engine, _args: Value) -> BoxFuture<'_, Result<Value, EngineError>> {
    Box::pin(async move {
        let commands: Vec<Value> = COMMANDS
            .iter()
            .map(|c| json!({ "name": c.name, "description": c.description }))
            .collect();
        Ok(json!({ "commands": commands }))
    })
}
