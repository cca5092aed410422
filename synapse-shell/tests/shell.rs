use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use synapse_core::test_utils::OrderLog;
use synapse_core::*;
use synapse_shell::ProtocolShell;

fn counting_rollback(
    count: &Arc<AtomicUsize>,
    seen: &Arc<Mutex<Vec<String>>>,
) -> Arc<dyn Rollback> {
    let count = Arc::clone(count);
    let seen = Arc::clone(seen);
    rollback_fn(move |err, _shell| {
        count.fetch_add(1, Ordering::SeqCst);
        seen.lock().unwrap().push(err.to_string());
        Ok(())
    })
}

// --- Ordering ---

#[tokio::test]
async fn steps_run_in_order_and_see_earlier_results() {
    let log = OrderLog::new();
    let def = ProtocolDefinition::builder("demo.order")
        .step(NamedStep::new("a").action(log.action("a")))
        .step(NamedStep::new("b").action(log.action("b")))
        .step(NamedStep::new("c").action(log.action("c")))
        .build();

    let mut shell = ProtocolShell::new(def).with_input(json!({}));
    let outcome = shell.execute().await.unwrap();

    assert!(outcome.success);
    assert_eq!(log.entries(), vec!["a", "b", "c"]);
    assert_eq!(outcome.results["b"]["seen"], json!(["a"]));
    assert_eq!(outcome.results["c"]["seen"], json!(["a", "b"]));
    assert_eq!(shell.status(), ShellStatus::Completed);
}

#[tokio::test]
async fn later_step_reads_earlier_result_from_shell() {
    let def = ProtocolDefinition::builder("math.pipeline")
        .step(
            NamedStep::new("base")
                .action(action_fn(|input, _| Ok(json!({ "n": input["n"].clone() })))),
        )
        .step(NamedStep::new("square").action(action_fn(|_, shell| {
            let n = shell
                .result("base")
                .and_then(|r| r["n"].as_i64())
                .unwrap_or(0);
            Ok(json!({ "n": n * n }))
        })))
        .build();

    let mut shell = ProtocolShell::new(def).with_input(json!({ "n": 7 }));
    let outcome = shell.execute().await.unwrap();
    assert_eq!(outcome.results["square"], json!({ "n": 49 }));
}

// --- Early stop ---

#[tokio::test]
async fn stop_short_circuits_without_rollback() {
    let log = OrderLog::new();
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let def = ProtocolDefinition::builder("demo.stop")
        .step(NamedStep::new("first").action(log.action("first")))
        .step(
            NamedStep::new("gate")
                .action(action_fn(|_, _| Ok(json!({ "stop": true, "reason": "x" })))),
        )
        .step(NamedStep::new("never").action(log.action("never")))
        .rollback(counting_rollback(&count, &seen))
        .build();

    let mut shell = ProtocolShell::new(def);
    let outcome = shell.execute().await.unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.reason.as_deref(), Some("x"));
    assert!(outcome.results.contains_key("gate"));
    assert!(!outcome.results.contains_key("never"));
    assert_eq!(log.entries(), vec!["first"]);
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(shell.status(), ShellStatus::Stopped);
}

#[tokio::test]
async fn falsy_stop_does_not_stop() {
    let def = ProtocolDefinition::builder("demo.nostop")
        .step(NamedStep::new("a").action(action_fn(|_, _| Ok(json!({ "stop": false })))))
        .step(NamedStep::new("b").action(action_fn(|_, _| Ok(json!({ "stop": 0 })))))
        .step(NamedStep::new("c"))
        .build();
    let outcome = ProtocolShell::new(def).execute().await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.results.len(), 3);
}

// --- Failure and rollback ---

#[tokio::test]
async fn action_error_triggers_rollback_then_rethrows() {
    let log = OrderLog::new();
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let def = ProtocolDefinition::builder("demo.fail")
        .step(NamedStep::new("ok").action(log.action("ok")))
        .step(NamedStep::new("boom").action(log.failing_action("boom", "kaput")))
        .step(NamedStep::new("after").action(log.action("after")))
        .rollback(counting_rollback(&count, &seen))
        .build();

    let mut shell = ProtocolShell::new(def);
    let err = shell.execute().await.unwrap_err();

    match err {
        ProtocolError::Action { step, message } => {
            assert_eq!(step, "boom");
            assert_eq!(message, "kaput");
        }
        other => panic!("expected the action's own error, got {other:?}"),
    }
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(*seen.lock().unwrap(), vec!["step 'boom' failed: kaput"]);
    assert_eq!(log.entries(), vec!["ok", "boom"]);
    assert_eq!(shell.status(), ShellStatus::Failed);
}

#[tokio::test]
async fn rollback_sees_partial_results() {
    let partial = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&partial);
    let def = ProtocolDefinition::builder("demo.partial")
        .step(NamedStep::new("one"))
        .step(
            NamedStep::new("two")
                .action(action_fn(|_, _| Err(ProtocolError::action("two", "no")))),
        )
        .rollback(rollback_fn(move |_, shell| {
            captured.lock().unwrap().extend(shell.results.keys().cloned());
            Ok(())
        }))
        .build();

    ProtocolShell::new(def).execute().await.unwrap_err();
    assert_eq!(*partial.lock().unwrap(), vec!["one"]);
}

#[tokio::test]
async fn rollback_error_replaces_original() {
    let def = ProtocolDefinition::builder("demo.badrollback")
        .step(
            NamedStep::new("boom")
                .action(action_fn(|_, _| Err(ProtocolError::action("boom", "first")))),
        )
        .rollback(rollback_fn(|_, _| Err(ProtocolError::Rollback("second".into()))))
        .build();

    let err = ProtocolShell::new(def).execute().await.unwrap_err();
    assert!(matches!(err, ProtocolError::Rollback(ref m) if m == "second"));
}

#[tokio::test]
async fn step_validator_rejects_result() {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let def = ProtocolDefinition::builder("demo.stepcheck")
        .step(
            NamedStep::new("score")
                .instruction("produce a score between 0 and 1")
                .action(action_fn(|_, _| Ok(json!({ "score": 3 }))))
                .validate(predicate(|r| r["score"].as_f64().is_some_and(|s| s <= 1.0))),
        )
        .rollback(counting_rollback(&count, &seen))
        .build();

    let err = ProtocolShell::new(def).execute().await.unwrap_err();
    assert!(matches!(err, ProtocolError::StepValidation { ref step, .. } if step == "score"));
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

// --- Validation ---

#[tokio::test]
async fn input_validation_runs_before_any_step() {
    let log = OrderLog::new();
    let def = ProtocolDefinition::builder("demo.input")
        .step(NamedStep::new("a").action(log.action("a")))
        .validate_input("content", predicate(|v| v.is_string()))
        .build();

    let mut shell = ProtocolShell::new(def).with_input(json!({ "other": 1 }));
    let err = shell.execute().await.unwrap_err();

    assert!(matches!(err, ProtocolError::InputValidation { ref field, .. } if field == "content"));
    assert!(log.entries().is_empty());
    assert!(shell.context().results.is_empty());
    assert_eq!(shell.status(), ShellStatus::Failed);
}

#[tokio::test]
async fn input_validation_failure_triggers_rollback() {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let def = ProtocolDefinition::builder("demo.input_rollback")
        .validate_input("x", predicate(|v| v.is_string()))
        .rollback(counting_rollback(&count, &seen))
        .build();

    let mut shell = ProtocolShell::new(def).with_input(json!({}));
    let err = shell.execute().await.unwrap_err();

    assert!(matches!(err, ProtocolError::InputValidation { ref field, .. } if field == "x"));
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(*seen.lock().unwrap(), vec![err.to_string()]);
    assert_eq!(shell.status(), ShellStatus::Failed);
}

#[tokio::test]
async fn output_validation_failure_triggers_rollback() {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let def = ProtocolDefinition::builder("demo.output_rollback")
        .step(NamedStep::new("s").action(action_fn(|_, _| Ok(json!({ "v": 1 })))))
        .validate_output("s", predicate(|_| false))
        .rollback(counting_rollback(&count, &seen))
        .build();

    let mut shell = ProtocolShell::new(def);
    let err = shell.execute().await.unwrap_err();

    assert!(matches!(err, ProtocolError::OutputValidation { ref field, .. } if field == "s"));
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(*seen.lock().unwrap(), vec![err.to_string()]);
    assert_eq!(shell.status(), ShellStatus::Failed);
    assert_eq!(shell.context().results["s"], json!({ "v": 1 }));
}

#[tokio::test]
async fn unvalidated_fields_are_not_checked() {
    let def = ProtocolDefinition::builder("demo.open")
        .validate_input("required", predicate(|v| !v.is_null()))
        .build();
    let shell = ProtocolShell::new(def).with_input(json!({ "required": 1, "extra": null }));
    assert!(shell.validate_input().is_ok());
}

#[tokio::test]
async fn math_add_scenario() {
    let def = ProtocolDefinition::builder("math.add")
        .version("1.0.0")
        .intent("Add two numbers")
        .input("a", json!(0))
        .input("b", json!(0))
        .step(NamedStep::new("add").action(action_fn(|input, _| {
            let a = input["a"].as_i64().unwrap_or(0);
            let b = input["b"].as_i64().unwrap_or(0);
            Ok(json!({ "sum": a + b }))
        })))
        .validate_output("add", predicate(|r| r["sum"].as_i64().is_some_and(|s| s >= 0)))
        .build();

    let ok = ProtocolShell::new(def.clone())
        .with_input(json!({ "a": 2, "b": 3 }))
        .execute()
        .await
        .unwrap();
    assert!(ok.success);
    assert_eq!(serde_json::Value::Object(ok.results), json!({ "add": { "sum": 5 } }));

    let err = ProtocolShell::new(def)
        .with_input(json!({ "a": -10, "b": 1 }))
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(err, ProtocolError::OutputValidation { ref field, .. } if field == "add"));
}

// --- Shell lifecycle ---

#[tokio::test]
async fn empty_process_succeeds_immediately() {
    let mut shell = ProtocolShell::new(ProtocolDefinition::new("demo.empty"));
    let outcome = shell.execute().await.unwrap();
    assert!(outcome.success);
    assert!(outcome.results.is_empty());
    let metadata = outcome.metadata.unwrap();
    assert_eq!(metadata.status, ShellStatus::Completed);
    assert!(metadata.executed.is_some());
}

#[tokio::test]
async fn shell_cannot_be_executed_twice() {
    let mut shell = ProtocolShell::new(ProtocolDefinition::new("demo.once"));
    shell.execute().await.unwrap();
    let executed = shell.metadata().executed;

    let err = shell.execute().await.unwrap_err();
    assert!(matches!(err, ProtocolError::AlreadyExecuted(_)));
    assert_eq!(shell.status(), ShellStatus::Completed);
    assert_eq!(shell.metadata().executed, executed);
}

#[tokio::test]
async fn named_step_without_action_is_placeholder() {
    let def = ProtocolDefinition::builder("demo.placeholder")
        .step(NamedStep::new("think").instruction("consider the problem"))
        .build();
    let outcome = ProtocolShell::new(def).execute().await.unwrap();
    assert_eq!(outcome.results["think"], json!({ "action": null, "completed": true }));
}

#[tokio::test]
async fn callable_steps_record_under_positional_keys() {
    let def = ProtocolDefinition::builder("demo.callable")
        .callable(action_fn(|_, _| Ok(json!("first"))))
        .step(NamedStep::new("named"))
        .callable(async_action_fn(|input, _| {
            Box::pin(async move { Ok(json!({ "echo": input.clone() })) })
        }))
        .build();
    let outcome = ProtocolShell::new(def)
        .with_input(json!("in"))
        .execute()
        .await
        .unwrap();
    assert_eq!(outcome.results["step_0"], json!("first"));
    assert_eq!(outcome.results["step_2"], json!({ "echo": "in" }));
}
