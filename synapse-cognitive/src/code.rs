//! `code.*` protocols.

use serde_json::{Value, json};
use synapse_core::definition::ProtocolDefinition;
use synapse_core::step::{NamedStep, action_fn};

use crate::{describe, non_empty_text, present, text};

const FUNCTION_MARKERS: &[&str] = &["fn ", "def ", "function ", "func "];

fn looks_like_function(line: &str) -> bool {
    let line = line.trim_start();
    FUNCTION_MARKERS
        .iter()
        .any(|marker| line.starts_with(marker) || line.contains(&format!(" {marker}")))
}

/// `code.analyze`: structure, quality and issues of a code sample.
pub fn code_analyze() -> ProtocolDefinition {
    ProtocolDefinition::builder("code.analyze")
        .version("1.0.0")
        .intent("Analyze code structure, quality and likely issues")
        .input("code", json!("<source text>"))
        .input("language", json!("<language name>"))
        .input("focus", json!(["structure", "quality", "issues"]))
        .validate_input("code", non_empty_text())
        .step(
            NamedStep::new("parse_structure")
                .instruction("Identify the units (functions, types, modules) in the code")
                .action(action_fn(|input, _| {
                    let code = text(input, "code");
                    let lines = code.lines().count();
                    let functions = code.lines().filter(|l| looks_like_function(l)).count();
                    let language = match text(input, "language") {
                        "" => "unknown",
                        other => other,
                    };
                    Ok(describe(
                        "parse_structure",
                        format!("Parsed {lines} lines of {language} code"),
                        json!({ "lines": lines, "functions": functions, "language": language }),
                    ))
                })),
        )
        .step(
            NamedStep::new("assess_quality")
                .instruction("Judge readability, naming and cohesion")
                .action(action_fn(|_, shell| {
                    let functions = shell
                        .result("parse_structure")
                        .and_then(|r| r["functions"].as_u64())
                        .unwrap_or(0);
                    Ok(describe(
                        "assess_quality",
                        format!("Assessed quality across {functions} functions"),
                        json!({ "dimensions": ["readability", "naming", "cohesion"] }),
                    ))
                })),
        )
        .step(
            NamedStep::new("find_issues")
                .instruction("Look for bugs, unsafe patterns and missing error handling")
                .action(action_fn(|input, _| {
                    let markers: Vec<Value> = text(input, "code")
                        .lines()
                        .enumerate()
                        .filter(|(_, l)| l.contains("TODO") || l.contains("FIXME"))
                        .map(|(n, l)| json!({ "line": n + 1, "text": l.trim() }))
                        .collect();
                    Ok(describe(
                        "find_issues",
                        format!("Flagged {} annotated lines for review", markers.len()),
                        json!({ "issues": markers }),
                    ))
                })),
        )
        .step(
            NamedStep::new("recommend")
                .instruction("Propose concrete improvements ordered by impact")
                .action(action_fn(|_, _| {
                    Ok(describe(
                        "recommend",
                        "Prepared improvement recommendations".into(),
                        json!({ "recommendations": [] }),
                    ))
                })),
        )
        .output("parse_structure", json!("structural summary"))
        .output("find_issues", json!("issues found"))
        .output("recommend", json!("recommended improvements"))
        .validate_output("recommend", present())
        .build()
}
