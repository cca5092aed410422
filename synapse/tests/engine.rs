use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use synapse::{Engine, EngineConfig, EngineError, EngineResponse, ResultLog};
use synapse_core::test_utils::{FailingHandler, RecordingHandler, VetoHandler};
use synapse_core::*;

fn counting_definition(name: &str, runs: &Arc<AtomicUsize>) -> ProtocolDefinition {
    let runs = Arc::clone(runs);
    ProtocolDefinition::builder(name)
        .step(NamedStep::new("count").action(action_fn(move |_, _| {
            let n = runs.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(json!({ "runs": n }))
        })))
        .build()
}

// --- Hook flow around execution ---

#[tokio::test]
async fn pre_protocol_veto_skips_execution_and_later_handlers() {
    let runs = Arc::new(AtomicUsize::new(0));
    let veto = Arc::new(VetoHandler::new("maintenance"));
    let second = Arc::new(RecordingHandler::new());

    let mut engine = Engine::new();
    engine.register("demo.count", counting_definition("demo.count", &runs));
    engine.register_hook(HookPoint::PRE_PROTOCOL, veto.clone());
    engine.register_hook(HookPoint::PRE_PROTOCOL, second.clone());

    let response = engine.execute("demo.count", json!({})).await.unwrap();

    assert!(response.is_vetoed());
    assert_eq!(response, EngineResponse::Vetoed(HookOutcome::veto("maintenance")));
    assert_eq!(runs.load(Ordering::SeqCst), 0);
    assert_eq!(veto.calls(), 1);
    assert_eq!(second.calls(), 0);
}

#[tokio::test]
async fn hooks_see_protocol_input_and_result() {
    let runs = Arc::new(AtomicUsize::new(0));
    let pre = Arc::new(RecordingHandler::new());
    let post = Arc::new(RecordingHandler::new());

    let mut engine = Engine::new();
    engine.register("demo.count", counting_definition("demo.count", &runs));
    engine.register_hook("pre-protocol", pre.clone());
    engine.register_hook("post-protocol", post.clone());

    let response = engine
        .execute("demo.count", json!({ "k": 1 }))
        .await
        .unwrap();
    let outcome = response.outcome().unwrap();
    assert!(outcome.success);

    let pre_ctx = &pre.contexts()[0];
    assert_eq!(pre_ctx.protocol.as_ref().unwrap().as_str(), "demo.count");
    assert_eq!(pre_ctx.input, Some(json!({ "k": 1 })));

    let post_ctx = &post.contexts()[0];
    let result = post_ctx.result.as_ref().unwrap();
    assert_eq!(result["success"], json!(true));
    assert_eq!(result["results"]["count"], json!({ "runs": 1 }));
}

#[tokio::test]
async fn failing_post_hook_does_not_block_later_handlers() {
    let failing = Arc::new(FailingHandler::new("flaky"));
    let later = Arc::new(RecordingHandler::new());

    let mut engine = Engine::new();
    engine.register("demo.empty", ProtocolDefinition::new("demo.empty"));
    engine.register_hook(HookPoint::POST_PROTOCOL, failing.clone());
    engine.register_hook(HookPoint::POST_PROTOCOL, later.clone());

    let response = engine.execute("demo.empty", json!({})).await.unwrap();
    assert!(response.outcome().unwrap().success);
    assert_eq!(failing.calls(), 1);
    assert_eq!(later.calls(), 1);

    let dispatched = engine
        .dispatch_hook(HookPoint::POST_PROTOCOL, &HookContext::new("post-protocol"))
        .await;
    assert_eq!(dispatched, HookOutcome::proceed());
}

#[tokio::test]
async fn errors_fire_on_error_and_propagate() {
    let on_error = Arc::new(RecordingHandler::new());
    let post = Arc::new(RecordingHandler::new());

    let mut engine = Engine::new();
    engine.register(
        "demo.fail",
        ProtocolDefinition::builder("demo.fail")
            .step(
                NamedStep::new("boom")
                    .action(action_fn(|_, _| Err(ProtocolError::action("boom", "bad")))),
            )
            .build(),
    );
    engine.register_hook(HookPoint::ON_ERROR, on_error.clone());
    engine.register_hook(HookPoint::POST_PROTOCOL, post.clone());

    let err = engine.execute("demo.fail", json!({})).await.unwrap_err();
    assert!(matches!(err, EngineError::Protocol(ProtocolError::Action { .. })));

    let ctx = &on_error.contexts()[0];
    assert_eq!(ctx.operation.as_deref(), Some("protocol:demo.fail"));
    assert_eq!(ctx.error.as_deref(), Some("step 'boom' failed: bad"));
    assert_eq!(post.calls(), 0);
}

#[tokio::test]
async fn unknown_protocol_is_reported_by_name() {
    let on_error = Arc::new(RecordingHandler::new());
    let mut engine = Engine::new();
    engine.register_hook(HookPoint::ON_ERROR, on_error.clone());

    let err = engine
        .execute("nonexistent.protocol", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Protocol(ProtocolError::NotFound(_))));
    assert!(err.to_string().contains("nonexistent.protocol"));
    assert_eq!(on_error.calls(), 1);
}

#[tokio::test]
async fn stopped_protocol_is_not_an_error() {
    let engine = Engine::with_cognitive_tools();
    let response = engine
        .execute("thinking.extended", json!({ "problem": "p", "depth": "abyss" }))
        .await
        .unwrap();
    let outcome = response.outcome().unwrap();
    assert!(!outcome.success);
    assert!(outcome.reason.as_deref().unwrap().contains("abyss"));
}

// --- Result log ---

#[tokio::test]
async fn outcomes_are_written_to_result_log() {
    let dir = tempfile::tempdir().unwrap();
    let engine =
        Engine::with_cognitive_tools().with_result_log(ResultLog::new(dir.path()));

    engine
        .execute("self.reflect", json!({ "content": "hello" }))
        .await
        .unwrap();

    let files: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);
    let name = files[0].file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.starts_with("self.reflect-"));
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&files[0]).unwrap()).unwrap();
    assert_eq!(written["success"], json!(true));
}

// --- Config ---

#[tokio::test]
async fn from_config_loads_hooks_and_builtins() {
    let dir = tempfile::tempdir().unwrap();
    let hooks_dir = dir.path().join("hooks");
    std::fs::create_dir(&hooks_dir).unwrap();
    std::fs::write(
        hooks_dir.join("pre-protocol.json"),
        r#"{"kind": "deny_protocols", "protocols": ["code.analyze"]}"#,
    )
    .unwrap();
    let config_path = dir.path().join("synapse.json");
    std::fs::write(
        &config_path,
        serde_json::to_string(&json!({ "hooks_dir": hooks_dir })).unwrap(),
    )
    .unwrap();

    let config = EngineConfig::discover(None, dir.path()).unwrap();
    let engine = Engine::from_config(&config).await.unwrap();

    assert_eq!(engine.registry().len(), 6);
    assert_eq!(engine.hooks().handler_count("pre-protocol"), 1);
    let response = engine
        .execute("code.analyze", json!({ "code": "fn x() {}" }))
        .await
        .unwrap();
    assert!(response.is_vetoed());
}

#[tokio::test]
async fn config_can_disable_builtins() {
    let config = EngineConfig {
        cognitive_tools: false,
        ..EngineConfig::default()
    };
    let engine = Engine::from_config(&config).await.unwrap();
    assert!(engine.registry().is_empty());
}

#[test]
fn invalid_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ nope").unwrap();
    let err = EngineConfig::from_path(&path).unwrap_err();
    assert!(matches!(err, EngineError::Config(_)));
}
