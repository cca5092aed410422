//! `self.*` protocols: reflection, gap identification, improvement.

use serde_json::{Value, json};
use synapse_core::definition::{ProtocolDefinition, predicate};
use synapse_core::step::{NamedStep, action_fn};

use crate::{describe, non_empty_text, present, text};

fn criteria(input: &Value) -> Vec<String> {
    match input.get("criteria") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(one)) => vec![one.clone()],
        _ => vec!["clarity".into(), "correctness".into(), "completeness".into()],
    }
}

/// `self.reflect`: review content against a set of criteria.
pub fn self_reflect() -> ProtocolDefinition {
    ProtocolDefinition::builder("self.reflect")
        .version("1.0.0")
        .intent("Reflect on a piece of reasoning or output to surface strengths and weaknesses")
        .input("content", json!("<text to reflect on>"))
        .input("criteria", json!(["clarity", "correctness", "completeness"]))
        .validate_input("content", non_empty_text())
        .step(
            NamedStep::new("review")
                .instruction("Read the content in full and note its claims")
                .action(action_fn(|input, _| {
                    let content = text(input, "content");
                    Ok(describe(
                        "review",
                        format!("Reviewed {} lines of content", content.lines().count()),
                        json!({ "length": content.chars().count() }),
                    ))
                })),
        )
        .step(
            NamedStep::new("assess")
                .instruction("Score the content against each criterion")
                .action(action_fn(|input, _| {
                    let criteria = criteria(input);
                    let assessments: Vec<Value> = criteria
                        .iter()
                        .map(|c| json!({ "criterion": c, "assessment": format!("Assess {c}") }))
                        .collect();
                    Ok(describe(
                        "assess",
                        format!("Assessed content against {} criteria", criteria.len()),
                        json!({ "assessments": assessments }),
                    ))
                })),
        )
        .step(
            NamedStep::new("summarize")
                .instruction("Summarize strengths, weaknesses and next actions")
                .action(action_fn(|_, shell| {
                    let assessed = shell
                        .result("assess")
                        .and_then(|r| r["assessments"].as_array())
                        .map_or(0, Vec::len);
                    Ok(describe(
                        "summarize",
                        format!("Summarized reflection over {assessed} assessments"),
                        json!({ "strengths": [], "weaknesses": [], "next_actions": [] }),
                    ))
                })),
        )
        .output("summarize", json!("strengths, weaknesses and next actions"))
        .validate_output("summarize", present())
        .build()
}

/// `self.identify_gaps`: find what a piece of work does not yet cover.
pub fn self_identify_gaps() -> ProtocolDefinition {
    ProtocolDefinition::builder("self.identify_gaps")
        .version("1.0.0")
        .intent("Identify gaps in knowledge, coverage or reasoning")
        .input("content", json!("<work to inspect>"))
        .input("domain", json!("<subject area>"))
        .validate_input("content", non_empty_text())
        .step(
            NamedStep::new("map_coverage")
                .instruction("List the topics the content addresses")
                .action(action_fn(|input, _| {
                    let domain = text(input, "domain");
                    let domain = if domain.is_empty() { "general" } else { domain };
                    Ok(describe(
                        "map_coverage",
                        format!("Mapped coverage of the content within the {domain} domain"),
                        json!({ "domain": domain }),
                    ))
                })),
        )
        .step(
            NamedStep::new("find_gaps")
                .instruction("Compare coverage with what the domain requires")
                .action(action_fn(|_, _| {
                    Ok(describe(
                        "find_gaps",
                        "Compared mapped coverage with domain expectations".into(),
                        json!({ "gaps": [] }),
                    ))
                })),
        )
        .step(
            NamedStep::new("prioritize")
                .instruction("Order gaps by impact")
                .action(action_fn(|_, _| {
                    Ok(describe(
                        "prioritize",
                        "Prioritized gaps by impact on the outcome".into(),
                        json!({ "priorities": [] }),
                    ))
                })),
        )
        .output("find_gaps", json!("identified gaps"))
        .output("prioritize", json!("gaps ordered by impact"))
        .build()
}

/// `self.improve`: turn feedback into a revised solution plan.
pub fn self_improve() -> ProtocolDefinition {
    ProtocolDefinition::builder("self.improve")
        .version("1.0.0")
        .intent("Improve a solution using feedback from reflection or review")
        .input("solution", json!("<current solution>"))
        .input("feedback", json!("<feedback to address>"))
        .validate_input("solution", non_empty_text())
        .step(
            NamedStep::new("analyze_feedback")
                .instruction("Break the feedback into actionable points")
                .action(action_fn(|input, _| {
                    let points = text(input, "feedback")
                        .lines()
                        .filter(|l| !l.trim().is_empty())
                        .count();
                    Ok(describe(
                        "analyze_feedback",
                        format!("Extracted {points} feedback points"),
                        json!({ "points": points }),
                    ))
                })),
        )
        .step(
            NamedStep::new("plan_changes")
                .instruction("Decide which changes address which points")
                .action(action_fn(|_, shell| {
                    let points = shell
                        .result("analyze_feedback")
                        .and_then(|r| r["points"].as_u64())
                        .unwrap_or(0);
                    if points == 0 {
                        return Ok(json!({
                            "stop": true,
                            "reason": "no actionable feedback to apply",
                        }));
                    }
                    Ok(describe(
                        "plan_changes",
                        format!("Planned changes for {points} feedback points"),
                        json!({ "changes": [] }),
                    ))
                })),
        )
        .step(
            NamedStep::new("apply_changes")
                .instruction("Rewrite the solution with the planned changes")
                .action(action_fn(|input, _| {
                    Ok(describe(
                        "apply_changes",
                        "Applied planned changes to the solution".into(),
                        json!({ "revised": text(input, "solution") }),
                    ))
                })),
        )
        .step(
            NamedStep::new("verify")
                .instruction("Check the revision against the original feedback")
                .action(action_fn(|_, _| {
                    Ok(describe(
                        "verify",
                        "Verified the revision addresses the feedback".into(),
                        json!({ "verified": true }),
                    ))
                }))
                .validate(predicate(|v| v["verified"].as_bool().unwrap_or(false))),
        )
        .output("apply_changes", json!("revised solution"))
        .build()
}
