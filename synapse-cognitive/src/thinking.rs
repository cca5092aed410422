//! `thinking.*` protocols.

use serde_json::{Value, json};
use synapse_core::definition::{ProtocolDefinition, predicate};
use synapse_core::step::{NamedStep, action_fn};

use crate::{describe, non_empty_text, present, text};

/// Depth levels accepted by `thinking.extended`, with the number of
/// alternatives explored at each.
const DEPTHS: &[(&str, u64)] = &[("standard", 2), ("deep", 4), ("ultra", 8)];

/// `thinking.systematic`: decompose, analyze, synthesize, conclude.
pub fn thinking_systematic() -> ProtocolDefinition {
    ProtocolDefinition::builder("thinking.systematic")
        .version("1.0.0")
        .intent("Work through a problem step by step")
        .input("problem", json!("<problem statement>"))
        .validate_input("problem", non_empty_text())
        .step(
            NamedStep::new("decompose")
                .instruction("Split the problem into independent parts")
                .action(action_fn(|input, _| {
                    let parts: Vec<&str> = text(input, "problem")
                        .split(['.', '?', ';'])
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .collect();
                    Ok(describe(
                        "decompose",
                        format!("Decomposed the problem into {} parts", parts.len()),
                        json!({ "parts": parts }),
                    ))
                })),
        )
        .step(
            NamedStep::new("analyze_components")
                .instruction("Analyze each part on its own terms")
                .action(action_fn(|_, shell| {
                    let parts = shell
                        .result("decompose")
                        .and_then(|r| r["parts"].as_array())
                        .cloned()
                        .unwrap_or_default();
                    let analyses: Vec<Value> = parts
                        .iter()
                        .map(|p| json!({ "part": p, "analysis": "pending" }))
                        .collect();
                    Ok(describe(
                        "analyze_components",
                        format!("Analyzed {} components", analyses.len()),
                        json!({ "analyses": analyses }),
                    ))
                })),
        )
        .step(
            NamedStep::new("synthesize")
                .instruction("Combine the partial analyses into one picture")
                .action(action_fn(|_, _| {
                    Ok(describe(
                        "synthesize",
                        "Synthesized component analyses".into(),
                        json!({}),
                    ))
                })),
        )
        .step(
            NamedStep::new("conclude")
                .instruction("State the conclusion and the confidence in it")
                .action(action_fn(|_, _| {
                    Ok(describe(
                        "conclude",
                        "Drew a conclusion from the synthesis".into(),
                        json!({ "confidence": "unassessed" }),
                    ))
                })),
        )
        .output("conclude", json!("conclusion"))
        .validate_output("conclude", present())
        .build()
}

/// `thinking.extended`: deliberate at a chosen depth.
///
/// An unknown `depth` stops the run early with a reason instead of failing.
pub fn thinking_extended() -> ProtocolDefinition {
    ProtocolDefinition::builder("thinking.extended")
        .version("1.0.0")
        .intent("Deliberate on a complex problem at a chosen depth")
        .input("problem", json!("<problem statement>"))
        .input("depth", json!("standard"))
        .validate_input("problem", non_empty_text())
        .validate_input("depth", predicate(|v| v.is_null() || v.is_string()))
        .step(
            NamedStep::new("understand")
                .instruction("Restate the problem and pick the deliberation depth")
                .action(action_fn(|input, _| {
                    let depth = match text(input, "depth") {
                        "" => "standard",
                        other => other,
                    };
                    let Some((_, breadth)) = DEPTHS.iter().find(|(name, _)| *name == depth) else {
                        return Ok(json!({
                            "stop": true,
                            "reason": format!("unsupported depth: {depth}"),
                        }));
                    };
                    Ok(describe(
                        "understand",
                        format!("Restated the problem for {depth} deliberation"),
                        json!({ "depth": depth, "breadth": breadth }),
                    ))
                })),
        )
        .step(
            NamedStep::new("explore")
                .instruction("Generate alternative approaches")
                .action(action_fn(|_, shell| {
                    let breadth = shell
                        .result("understand")
                        .and_then(|r| r["breadth"].as_u64())
                        .unwrap_or(2);
                    let alternatives: Vec<Value> = (1..=breadth)
                        .map(|n| json!({ "id": n, "approach": format!("alternative {n}") }))
                        .collect();
                    Ok(describe(
                        "explore",
                        format!("Explored {breadth} alternative approaches"),
                        json!({ "alternatives": alternatives }),
                    ))
                })),
        )
        .step(
            NamedStep::new("evaluate")
                .instruction("Weigh the alternatives against each other")
                .action(action_fn(|_, _| {
                    Ok(describe(
                        "evaluate",
                        "Evaluated alternatives on cost, risk and fit".into(),
                        json!({ "criteria": ["cost", "risk", "fit"] }),
                    ))
                })),
        )
        .step(
            NamedStep::new("decide")
                .instruction("Choose an approach and explain the choice")
                .action(action_fn(|_, _| {
                    Ok(describe(
                        "decide",
                        "Selected an approach".into(),
                        json!({ "selected": 1 }),
                    ))
                })),
        )
        .output("explore", json!("alternatives considered"))
        .output("decide", json!("chosen approach"))
        .validate_output("decide", present())
        .build()
}
