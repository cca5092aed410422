//! Declarative hook handlers loaded from a directory.
//!
//! Each `*.json` file in the directory holds one [`HookManifest`]. The hook
//! point comes from the file name: the stem up to its first `.`, so
//! `pre-protocol.json` and `pre-protocol.audit.json` both register at
//! `pre-protocol`. Files are registered in file-name order.
//!
//! ```text
//! hooks/
//!   pre-protocol.deny-code.json   {"kind": "deny_protocols", "protocols": ["code.analyze"]}
//!   post-protocol.json            {"kind": "log", "message": "protocol finished"}
//! ```

use crate::HooksManager;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use synapse_core::error::HookError;
use synapse_core::hook::{HookContext, HookHandler, HookOutcome};

/// What a manifest-defined handler does.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HookManifest {
    /// Emit a tracing event with the dispatch context. Always proceeds.
    Log {
        /// Text included in the event.
        #[serde(default)]
        message: Option<String>,
    },
    /// Always veto.
    Veto {
        /// Reason reported to the caller.
        reason: String,
    },
    /// Veto only when the context's protocol is in the list.
    DenyProtocols {
        /// Protocol names to refuse.
        protocols: Vec<String>,
        /// Reason reported to the caller.
        #[serde(default)]
        reason: Option<String>,
    },
}

/// A [`HookHandler`] backed by a [`HookManifest`].
#[derive(Debug, Clone)]
pub struct ManifestHandler {
    source: PathBuf,
    manifest: HookManifest,
}

impl ManifestHandler {
    /// Wrap a manifest read from `source`.
    pub fn new(source: impl Into<PathBuf>, manifest: HookManifest) -> Self {
        Self {
            source: source.into(),
            manifest,
        }
    }

    /// The manifest this handler runs.
    pub fn manifest(&self) -> &HookManifest {
        &self.manifest
    }
}

#[async_trait]
impl HookHandler for ManifestHandler {
    async fn handle(&self, ctx: &HookContext) -> Result<HookOutcome, HookError> {
        match &self.manifest {
            HookManifest::Log { message } => {
                let context = serde_json::to_string(ctx)
                    .map_err(|e| HookError::Failed(e.to_string()))?;
                tracing::info!(
                    source = %self.source.display(),
                    point = %ctx.point,
                    message = message.as_deref().unwrap_or(""),
                    context = %context,
                    "hook"
                );
                Ok(HookOutcome::proceed())
            }
            HookManifest::Veto { reason } => Ok(HookOutcome::veto(reason.clone())),
            HookManifest::DenyProtocols { protocols, reason } => {
                let denied = ctx
                    .protocol
                    .as_ref()
                    .is_some_and(|p| protocols.iter().any(|d| d == p.as_str()));
                if denied {
                    let reason = reason.clone().unwrap_or_else(|| {
                        format!(
                            "protocol {} denied by {}",
                            ctx.protocol.as_ref().map_or("", |p| p.as_str()),
                            self.source.display()
                        )
                    });
                    Ok(HookOutcome::veto(reason))
                } else {
                    Ok(HookOutcome::proceed())
                }
            }
        }
    }
}

/// Hook point for a manifest file: the file name up to its first `.`.
fn point_from_path(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let point = file_name.split('.').next()?;
    if point.is_empty() {
        None
    } else {
        Some(point.to_string())
    }
}

async fn read_manifest(path: &Path) -> Result<HookManifest, HookError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| HookError::Manifest {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    serde_json::from_str(&contents).map_err(|e| HookError::Manifest {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

impl HooksManager {
    /// Register a handler for every `*.json` manifest in `dir`.
    ///
    /// A missing directory registers nothing. A manifest that cannot be read
    /// or parsed is logged and skipped. Returns how many handlers were
    /// registered.
    pub async fn load_dir(&mut self, dir: &Path) -> Result<usize, HookError> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(HookError::Other(Box::new(e))),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| HookError::Other(Box::new(e)))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let Some(point) = point_from_path(&path) else {
                tracing::warn!(
                    path = %path.display(),
                    "hook manifest has no usable name; skipping"
                );
                continue;
            };
            match read_manifest(&path).await {
                Ok(manifest) => {
                    self.register(point, Arc::new(ManifestHandler::new(path.clone(), manifest)));
                    loaded += 1;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to load hook manifest; skipping");
                }
            }
        }

        tracing::debug!(dir = %dir.display(), loaded, "loaded hook manifests");
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_is_stem_before_first_dot() {
        assert_eq!(
            point_from_path(Path::new("/h/pre-protocol.json")).as_deref(),
            Some("pre-protocol")
        );
        assert_eq!(
            point_from_path(Path::new("/h/on-error.notify.json")).as_deref(),
            Some("on-error")
        );
        assert_eq!(point_from_path(Path::new("/h/.json")), None);
    }
}
