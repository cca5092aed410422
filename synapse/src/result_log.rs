//! On-disk record of protocol outcomes.

use crate::error::EngineError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use synapse_core::execution::ProtocolOutcome;

/// Writes each outcome as pretty JSON under a directory.
///
/// Layout:
/// ```text
/// root/
///   <protocol>-<unix-millis>-<seq>.json
/// ```
///
/// The directory is created lazily on first write.
pub struct ResultLog {
    root: PathBuf,
    seq: AtomicU64,
}

impl ResultLog {
    /// Create a log rooted at `root`.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            seq: AtomicU64::new(0),
        }
    }

    /// Directory outcomes are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `outcome` for `protocol` and return the file path.
    pub async fn record(
        &self,
        protocol: &str,
        outcome: &ProtocolOutcome,
    ) -> Result<PathBuf, EngineError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let millis = chrono::Utc::now().timestamp_millis();
        let path = self
            .root
            .join(format!("{}-{millis}-{seq}.json", file_safe(protocol)));
        let contents = serde_json::to_string_pretty(outcome)?;
        tokio::fs::write(&path, contents).await?;
        tracing::debug!(protocol, path = %path.display(), "recorded protocol outcome");
        Ok(path)
    }
}

/// Replace anything outside `[A-Za-z0-9._-]` with `_`.
fn file_safe(name: &str) -> String {
    name.chars()
        .map(|ch| match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => ch,
            _ => '_',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_safe_keeps_dotted_names() {
        assert_eq!(file_safe("code.analyze"), "code.analyze");
        assert_eq!(file_safe("../etc/passwd"), ".._etc_passwd");
    }
}
