use serde::Serialize;
use serde_json::Value;
use synapse_core::definition::ProtocolDefinition;
use synapse_core::error::ProtocolError;
use synapse_core::execution::ProtocolOutcome;
use synapse_core::name::ProtocolName;

use crate::shell::ProtocolShell;

/// One executed link of a chain.
#[derive(Debug, Clone, Serialize)]
pub struct ChainLink {
    /// Protocol that ran.
    pub protocol: ProtocolName,
    /// What it resolved to.
    pub outcome: ProtocolOutcome,
}

/// Result of running a [`Chain`].
#[derive(Debug, Clone, Serialize)]
pub struct ChainOutcome {
    /// True when every link succeeded.
    pub success: bool,
    /// Executed links, in order. Links after a failure are absent.
    pub results: Vec<ChainLink>,
    /// The link that reported `success: false`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<ProtocolName>,
}

impl ChainOutcome {
    /// Results of the last executed link, if any.
    pub fn last(&self) -> Option<&ProtocolOutcome> {
        self.results.last().map(|link| &link.outcome)
    }
}

/// Fixed sequence of protocols where each one's results become the next
/// one's input.
///
/// Running stops at the first link that resolves with `success: false`.
/// Errors from a link are not caught; they propagate to the caller.
#[derive(Debug, Clone)]
pub struct Chain {
    protocols: Vec<ProtocolDefinition>,
}

impl Chain {
    /// Compose `protocols` in order.
    pub fn new(protocols: impl IntoIterator<Item = ProtocolDefinition>) -> Self {
        Self {
            protocols: protocols.into_iter().collect(),
        }
    }

    /// Number of links.
    pub fn len(&self) -> usize {
        self.protocols.len()
    }

    /// Whether the chain has no links.
    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }

    /// Run every link against `input`, threading results forward.
    pub async fn run(&self, input: Value) -> Result<ChainOutcome, ProtocolError> {
        let mut results = Vec::with_capacity(self.protocols.len());
        let mut current = input;

        for definition in &self.protocols {
            let protocol = definition.name.clone();
            let mut shell = ProtocolShell::new(definition.clone()).with_input(current);
            let outcome = shell.execute().await?;
            let success = outcome.success;
            current = outcome.results_value();
            results.push(ChainLink { protocol, outcome });

            if !success {
                let failed_at = results.last().map(|link| link.protocol.clone());
                tracing::info!(
                    failed_at = %failed_at.as_ref().map_or("", |p| p.as_str()),
                    "protocol chain stopped"
                );
                return Ok(ChainOutcome {
                    success: false,
                    results,
                    failed_at,
                });
            }
        }

        Ok(ChainOutcome {
            success: true,
            results,
            failed_at: None,
        })
    }
}
