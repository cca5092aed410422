use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use synapse_core::definition::ProtocolDefinition;
use synapse_core::error::ProtocolError;
use synapse_core::execution::ProtocolOutcome;
use synapse_core::name::ProtocolName;

use crate::shell::ProtocolShell;

/// Catalog of protocol definitions keyed by name.
///
/// Registering a name twice replaces the earlier definition (last write
/// wins) while keeping the name's original listing position. Categories
/// are derived from the name's first dotted segment and are never pruned.
/// The registry holds no execution state: every run gets a fresh shell.
pub struct ProtocolRegistry {
    protocols: IndexMap<ProtocolName, ProtocolDefinition>,
    categories: IndexMap<String, IndexSet<ProtocolName>>,
}

impl ProtocolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            protocols: IndexMap::new(),
            categories: IndexMap::new(),
        }
    }

    /// Store `definition` under `name`, replacing any earlier one.
    pub fn register(
        &mut self,
        name: impl Into<ProtocolName>,
        definition: ProtocolDefinition,
    ) -> &mut Self {
        let name = name.into();
        let category = name.category().to_string();
        if self.protocols.insert(name.clone(), definition).is_some() {
            tracing::debug!(protocol = %name, "replaced protocol definition");
        } else {
            tracing::debug!(protocol = %name, category = %category, "registered protocol");
        }
        self.categories.entry(category).or_default().insert(name);
        self
    }

    /// Register a definition under its own name.
    pub fn register_definition(&mut self, definition: ProtocolDefinition) -> &mut Self {
        let name = definition.name.clone();
        self.register(name, definition)
    }

    /// Look up a definition.
    pub fn get(&self, name: &str) -> Option<&ProtocolDefinition> {
        self.protocols.get(name)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.protocols.contains_key(name)
    }

    /// All registered names, in first-registration order.
    pub fn list(&self) -> Vec<&ProtocolName> {
        self.protocols.keys().collect()
    }

    /// Names under `category`; empty when the category is unknown.
    pub fn list_by_category(&self, category: &str) -> Vec<&ProtocolName> {
        self.categories
            .get(category)
            .map(|names| names.iter().collect())
            .unwrap_or_default()
    }

    /// Known categories, in first-registration order.
    pub fn categories(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    /// Number of registered protocols.
    pub fn len(&self) -> usize {
        self.protocols.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }

    /// Run the protocol registered under `name` in a fresh shell.
    pub async fn execute(
        &self,
        name: &str,
        input: Value,
    ) -> Result<ProtocolOutcome, ProtocolError> {
        let definition = self
            .get(name)
            .ok_or_else(|| ProtocolError::NotFound(name.to_string()))?;
        let mut shell = ProtocolShell::new(definition.clone()).with_input(input);
        shell.execute().await
    }
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
