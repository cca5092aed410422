use chrono::Utc;
use serde_json::{Value, json};
use synapse_core::definition::ProtocolDefinition;
use synapse_core::error::ProtocolError;
use synapse_core::execution::{ProtocolOutcome, ShellContext, ShellMetadata, ShellStatus};
use synapse_core::step::Step;
use synapse_core::value::{is_truthy, reason_of};

use crate::chain::Chain;

/// Runs one protocol definition against one input.
///
/// A shell is single-use: once [`execute`](Self::execute) has been called
/// the shell is terminal and a second call returns
/// [`ProtocolError::AlreadyExecuted`].
pub struct ProtocolShell {
    definition: ProtocolDefinition,
    context: ShellContext,
}

impl ProtocolShell {
    /// Create a shell for `definition` with a `null` input.
    pub fn new(definition: ProtocolDefinition) -> Self {
        let context = ShellContext::new(definition.name.clone(), Value::Null);
        Self {
            definition,
            context,
        }
    }

    /// Set the input the protocol will run against.
    pub fn with_input(mut self, input: Value) -> Self {
        self.context.input = input;
        self
    }

    /// Replace the input before execution.
    pub fn set_input(&mut self, input: Value) {
        self.context.input = input;
    }

    /// The definition this shell runs.
    pub fn definition(&self) -> &ProtocolDefinition {
        &self.definition
    }

    /// Current status.
    pub fn status(&self) -> ShellStatus {
        self.context.metadata.status
    }

    /// Timestamps and status.
    pub fn metadata(&self) -> &ShellMetadata {
        &self.context.metadata
    }

    /// Input, accumulated results and metadata, as steps see them.
    pub fn context(&self) -> &ShellContext {
        &self.context
    }

    /// Compose definitions into a [`Chain`].
    pub fn chain(protocols: impl IntoIterator<Item = ProtocolDefinition>) -> Chain {
        Chain::new(protocols)
    }

    /// Check every input predicate against `input[field]`.
    ///
    /// Fields without a predicate are not checked; a missing field is
    /// presented to its predicate as `null`.
    pub fn validate_input(&self) -> Result<(), ProtocolError> {
        for (field, check) in &self.definition.validation.input {
            let value = self.context.input.get(field).unwrap_or(&Value::Null);
            if !check(value) {
                return Err(ProtocolError::InputValidation {
                    protocol: self.definition.name.to_string(),
                    field: field.clone(),
                });
            }
        }
        Ok(())
    }

    fn validate_output(&self) -> Result<(), ProtocolError> {
        for (field, check) in &self.definition.validation.output {
            let value = self.context.results.get(field).unwrap_or(&Value::Null);
            if !check(value) {
                return Err(ProtocolError::OutputValidation {
                    protocol: self.definition.name.to_string(),
                    field: field.clone(),
                });
            }
        }
        Ok(())
    }

    fn advance(&mut self, next: ShellStatus) {
        let current = self.context.metadata.status;
        if current.can_advance_to(next) {
            self.context.metadata.status = next;
        } else {
            tracing::warn!(
                protocol = %self.definition.name,
                ?current,
                ?next,
                "ignoring backwards shell transition"
            );
        }
    }

    /// Run the protocol.
    ///
    /// Resolves to a successful outcome when every step ran and output
    /// validation passed, or to an unsuccessful outcome (no error, no
    /// rollback) when a step returned a truthy `stop`. Any failure, input
    /// validation included, marks the shell failed, runs the rollback, and
    /// returns the original error. A rollback error replaces the original.
    pub async fn execute(&mut self) -> Result<ProtocolOutcome, ProtocolError> {
        if self.context.metadata.status != ShellStatus::Initialized {
            return Err(ProtocolError::AlreadyExecuted(
                self.definition.name.to_string(),
            ));
        }
        self.advance(ShellStatus::Executing);
        self.context.metadata.executed = Some(Utc::now());
        tracing::debug!(
            protocol = %self.definition.name,
            version = %self.definition.version,
            steps = self.definition.process.len(),
            "executing protocol"
        );

        let run = match self.validate_input() {
            Ok(()) => self.run_steps().await,
            Err(err) => Err(err),
        };

        match run {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                self.advance(ShellStatus::Failed);
                tracing::info!(protocol = %self.definition.name, error = %err, "protocol failed");
                if let Some(rollback) = self.definition.rollback.clone() {
                    tracing::warn!(protocol = %self.definition.name, "invoking rollback");
                    rollback.rollback(&err, &self.context).await?;
                }
                Err(err)
            }
        }
    }

    async fn run_steps(&mut self) -> Result<ProtocolOutcome, ProtocolError> {
        let process = self.definition.process.clone();
        for step in &process {
            let result = self.execute_step(step).await?;
            let stop = result.get("stop").is_some_and(is_truthy);
            let reason = if stop { reason_of(&result) } else { None };
            self.context
                .results
                .insert(step.name().to_string(), result);

            if stop {
                self.advance(ShellStatus::Stopped);
                tracing::info!(
                    protocol = %self.definition.name,
                    step = step.name(),
                    reason = reason.as_deref().unwrap_or(""),
                    "protocol stopped early"
                );
                return Ok(ProtocolOutcome::stopped(
                    reason,
                    self.context.results.clone(),
                ));
            }
        }

        self.validate_output()?;
        self.advance(ShellStatus::Completed);
        tracing::info!(protocol = %self.definition.name, "protocol completed");
        Ok(ProtocolOutcome::completed(
            self.context.results.clone(),
            self.context.metadata.clone(),
        ))
    }

    async fn execute_step(&self, step: &Step) -> Result<Value, ProtocolError> {
        tracing::debug!(
            protocol = %self.definition.name,
            step = step.name(),
            instruction = step.instruction().unwrap_or(""),
            "running step"
        );
        match step {
            Step::Callable { action, .. } => action.run(&self.context.input, &self.context).await,
            Step::Named(named) => {
                let result = match &named.action {
                    Some(action) => action.run(&self.context.input, &self.context).await?,
                    None => json!({ "action": null, "completed": true }),
                };
                if let Some(check) = &named.validation {
                    if !check(&result) {
                        return Err(ProtocolError::StepValidation {
                            protocol: self.definition.name.to_string(),
                            step: named.name.clone(),
                        });
                    }
                }
                Ok(result)
            }
        }
    }
}
