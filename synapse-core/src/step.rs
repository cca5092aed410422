//! Steps: the units of work inside a protocol.

use crate::definition::Predicate;
use crate::error::ProtocolError;
use crate::execution::ShellContext;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by async step closures.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// User code executed for one step.
///
/// The returned value is recorded under the step's name. A result object
/// with a truthy `stop` field ends the protocol early (not an error).
/// Returning `Err` fails the protocol; the shell runs the rollback and then
/// hands this exact error back to the caller.
#[async_trait]
pub trait StepAction: Send + Sync {
    /// Run the step against the protocol input.
    async fn run(&self, input: &Value, shell: &ShellContext) -> Result<Value, ProtocolError>;
}

struct FnAction<F> {
    f: F,
}

#[async_trait]
impl<F> StepAction for FnAction<F>
where
    F: Fn(&Value, &ShellContext) -> Result<Value, ProtocolError> + Send + Sync + 'static,
{
    async fn run(&self, input: &Value, shell: &ShellContext) -> Result<Value, ProtocolError> {
        (self.f)(input, shell)
    }
}

struct AsyncFnAction<F> {
    f: F,
}

#[async_trait]
impl<F> StepAction for AsyncFnAction<F>
where
    F: for<'a> Fn(&'a Value, &'a ShellContext) -> BoxFuture<'a, Result<Value, ProtocolError>>
        + Send
        + Sync
        + 'static,
{
    async fn run(&self, input: &Value, shell: &ShellContext) -> Result<Value, ProtocolError> {
        (self.f)(input, shell).await
    }
}

/// Create a step action from a synchronous closure.
#[must_use]
pub fn action_fn<F>(f: F) -> Arc<dyn StepAction>
where
    F: Fn(&Value, &ShellContext) -> Result<Value, ProtocolError> + Send + Sync + 'static,
{
    Arc::new(FnAction { f })
}

/// Create a step action from a closure returning a boxed future.
///
/// # Example
///
/// ```ignore
/// let fetch = async_action_fn(|input, _shell| {
///     Box::pin(async move { Ok(serde_json::json!({ "echo": input.clone() })) })
/// });
/// ```
#[must_use]
pub fn async_action_fn<F>(f: F) -> Arc<dyn StepAction>
where
    F: for<'a> Fn(&'a Value, &'a ShellContext) -> BoxFuture<'a, Result<Value, ProtocolError>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(AsyncFnAction { f })
}

/// A step bundling a name, optional instruction text, optional action,
/// and an optional validator over the step's result.
#[derive(Clone)]
pub struct NamedStep {
    /// Result key; unique within the protocol.
    pub name: String,
    /// Human-readable description. Logged, never executed.
    pub instruction: Option<String>,
    /// Work to perform. Without one the step trivially succeeds.
    pub action: Option<Arc<dyn StepAction>>,
    /// Rejecting the step's result fails the whole protocol.
    pub validation: Option<Predicate>,
}

impl NamedStep {
    /// A step with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instruction: None,
            action: None,
            validation: None,
        }
    }

    /// Attach instruction text.
    pub fn instruction(mut self, text: impl Into<String>) -> Self {
        self.instruction = Some(text.into());
        self
    }

    /// Attach the action.
    pub fn action(mut self, action: Arc<dyn StepAction>) -> Self {
        self.action = Some(action);
        self
    }

    /// Attach a result validator.
    pub fn validate(mut self, predicate: Predicate) -> Self {
        self.validation = Some(predicate);
        self
    }
}

/// One entry of a protocol's process list.
///
/// The kind is fixed when the step is added to a definition, so the shell
/// never inspects step shapes at run time.
#[derive(Clone)]
pub enum Step {
    /// A bare action. `key` is assigned from the step's position
    /// (`step_<index>`) when it is added to a definition.
    Callable {
        /// Result key.
        key: String,
        /// The action.
        action: Arc<dyn StepAction>,
    },
    /// A named step object.
    Named(NamedStep),
}

impl Step {
    /// Key under which this step's result is recorded.
    pub fn name(&self) -> &str {
        match self {
            Self::Callable { key, .. } => key,
            Self::Named(step) => &step.name,
        }
    }

    /// Instruction text, if any.
    pub fn instruction(&self) -> Option<&str> {
        match self {
            Self::Callable { .. } => None,
            Self::Named(step) => step.instruction.as_deref(),
        }
    }
}

impl From<NamedStep> for Step {
    fn from(step: NamedStep) -> Self {
        Self::Named(step)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callable { key, .. } => f.debug_struct("Callable").field("key", key).finish(),
            Self::Named(step) => f
                .debug_struct("Named")
                .field("name", &step.name)
                .field("instruction", &step.instruction)
                .field("has_action", &step.action.is_some())
                .field("has_validation", &step.validation.is_some())
                .finish(),
        }
    }
}
