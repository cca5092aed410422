//! Protocol definitions and their builder.

use crate::error::ProtocolError;
use crate::execution::ShellContext;
use crate::name::ProtocolName;
use crate::step::{NamedStep, Step, StepAction};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// A pure check over one value.
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Wrap a closure as a [`Predicate`].
#[must_use]
pub fn predicate<F>(f: F) -> Predicate
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Per-field predicates checked before the first step (`input`) and after
/// the last one (`output`). Fields without a predicate are not checked.
#[derive(Clone, Default)]
pub struct ValidationRules {
    /// Checked against `input[field]`, in insertion order.
    pub input: Vec<(String, Predicate)>,
    /// Checked against `results[field]`, in insertion order.
    pub output: Vec<(String, Predicate)>,
}

impl ValidationRules {
    /// True when neither side has any predicate.
    pub fn is_empty(&self) -> bool {
        self.input.is_empty() && self.output.is_empty()
    }
}

/// Compensating action invoked when a protocol run fails.
///
/// An `Err` returned here replaces the error that triggered the rollback.
#[async_trait]
pub trait Rollback: Send + Sync {
    /// Undo whatever the failed run did.
    async fn rollback(&self, error: &ProtocolError, shell: &ShellContext)
    -> Result<(), ProtocolError>;
}

struct FnRollback<F> {
    f: F,
}

#[async_trait]
impl<F> Rollback for FnRollback<F>
where
    F: Fn(&ProtocolError, &ShellContext) -> Result<(), ProtocolError> + Send + Sync + 'static,
{
    async fn rollback(
        &self,
        error: &ProtocolError,
        shell: &ShellContext,
    ) -> Result<(), ProtocolError> {
        (self.f)(error, shell)
    }
}

/// Create a rollback from a synchronous closure.
#[must_use]
pub fn rollback_fn<F>(f: F) -> Arc<dyn Rollback>
where
    F: Fn(&ProtocolError, &ShellContext) -> Result<(), ProtocolError> + Send + Sync + 'static,
{
    Arc::new(FnRollback { f })
}

/// A named, versioned, ordered list of steps. Immutable once registered.
#[derive(Clone)]
pub struct ProtocolDefinition {
    /// Dotted identifier; the first segment is the category.
    pub name: ProtocolName,
    /// Informational only.
    pub version: String,
    /// What the protocol is for.
    pub intent: String,
    /// Parameter name to default/expected shape. Documentation only.
    pub input_spec: Map<String, Value>,
    /// Steps, executed strictly in order.
    pub process: Vec<Step>,
    /// Named result fields. Documentation only.
    pub output_spec: Map<String, Value>,
    /// Optional field predicates.
    pub validation: ValidationRules,
    /// Invoked with the error when a run fails.
    pub rollback: Option<Arc<dyn Rollback>>,
}

impl ProtocolDefinition {
    /// An empty definition: no steps, no validation, no rollback.
    pub fn new(name: impl Into<ProtocolName>) -> Self {
        Self {
            name: name.into(),
            version: String::new(),
            intent: String::new(),
            input_spec: Map::new(),
            process: Vec::new(),
            output_spec: Map::new(),
            validation: ValidationRules::default(),
            rollback: None,
        }
    }

    /// Start building a definition.
    pub fn builder(name: impl Into<ProtocolName>) -> ProtocolDefinitionBuilder {
        ProtocolDefinitionBuilder {
            def: Self::new(name),
        }
    }

    /// Category prefix of the protocol name.
    pub fn category(&self) -> &str {
        self.name.category()
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> Vec<&str> {
        self.process.iter().map(Step::name).collect()
    }
}

impl fmt::Debug for ProtocolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolDefinition")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("intent", &self.intent)
            .field("input_spec", &self.input_spec)
            .field("process", &self.process)
            .field("output_spec", &self.output_spec)
            .field("has_rollback", &self.rollback.is_some())
            .finish()
    }
}

/// Fluent builder for [`ProtocolDefinition`].
pub struct ProtocolDefinitionBuilder {
    def: ProtocolDefinition,
}

impl ProtocolDefinitionBuilder {
    /// Set the version string.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.def.version = version.into();
        self
    }

    /// Set the intent text.
    pub fn intent(mut self, intent: impl Into<String>) -> Self {
        self.def.intent = intent.into();
        self
    }

    /// Document an input parameter and its default/expected shape.
    pub fn input(mut self, field: impl Into<String>, shape: Value) -> Self {
        self.def.input_spec.insert(field.into(), shape);
        self
    }

    /// Document a named result field.
    pub fn output(mut self, field: impl Into<String>, shape: Value) -> Self {
        self.def.output_spec.insert(field.into(), shape);
        self
    }

    /// Append a named step.
    pub fn step(mut self, step: NamedStep) -> Self {
        self.def.process.push(Step::Named(step));
        self
    }

    /// Append a bare action, keyed `step_<index>`.
    pub fn callable(mut self, action: Arc<dyn StepAction>) -> Self {
        let key = format!("step_{}", self.def.process.len());
        self.def.process.push(Step::Callable { key, action });
        self
    }

    /// Require `predicate(input[field])` before any step runs.
    pub fn validate_input(mut self, field: impl Into<String>, predicate: Predicate) -> Self {
        self.def.validation.input.push((field.into(), predicate));
        self
    }

    /// Require `predicate(results[field])` after all steps ran.
    pub fn validate_output(mut self, field: impl Into<String>, predicate: Predicate) -> Self {
        self.def.validation.output.push((field.into(), predicate));
        self
    }

    /// Set the rollback.
    pub fn rollback(mut self, rollback: Arc<dyn Rollback>) -> Self {
        self.def.rollback = Some(rollback);
        self
    }

    /// Finish the definition.
    pub fn build(self) -> ProtocolDefinition {
        self.def
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::action_fn;
    use serde_json::json;

    #[test]
    fn callable_steps_are_keyed_by_position() {
        let def = ProtocolDefinition::builder("demo.steps")
            .step(NamedStep::new("first"))
            .callable(action_fn(|_, _| Ok(json!(1))))
            .callable(action_fn(|_, _| Ok(json!(2))))
            .build();
        assert_eq!(def.step_names(), vec!["first", "step_1", "step_2"]);
    }

    #[test]
    fn new_definition_is_empty() {
        let def = ProtocolDefinition::new("empty");
        assert!(def.process.is_empty());
        assert!(def.validation.is_empty());
        assert!(def.rollback.is_none());
        assert_eq!(def.category(), "empty");
    }
}
