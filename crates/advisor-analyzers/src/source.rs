//! Where snapshots come from

use advisor_core::{AdvisorError, Result, StockSnapshot};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supplies a snapshot for a symbol
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self, symbol: &str) -> Result<StockSnapshot>;
}

/// Read and parse a snapshot JSON file
pub async fn read_snapshot(path: impl AsRef<Path>) -> Result<StockSnapshot> {
    let content = tokio::fs::read_to_string(path.as_ref()).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Reads `<dir>/<SYMBOL>.json`
#[derive(Debug, Clone)]
pub struct JsonDirectorySource {
    dir: PathBuf,
}

impl JsonDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a symbol maps to; symbols that could escape the directory are rejected
    pub fn path_for(&self, symbol: &str) -> Result<PathBuf> {
        let symbol = symbol.trim();
        if symbol.is_empty()
            || symbol.contains(['/', '\\'])
            || symbol.starts_with('.')
        {
            return Err(AdvisorError::Source {
                symbol: symbol.to_string(),
                reason: "invalid symbol".to_string(),
            });
        }
        Ok(self.dir.join(format!("{}.json", symbol.to_uppercase())))
    }
}

#[async_trait]
impl SnapshotSource for JsonDirectorySource {
    async fn fetch(&self, symbol: &str) -> Result<StockSnapshot> {
        let path = self.path_for(symbol)?;
        debug!(symbol, path = %path.display(), "Reading snapshot");

        let source_error = |reason: String| AdvisorError::Source {
            symbol: symbol.to_string(),
            reason,
        };
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| source_error(format!("{}: {e}", path.display())))?;
        let mut snapshot: StockSnapshot = serde_json::from_str(&content)
            .map_err(|e| source_error(format!("{}: {e}", path.display())))?;

        if snapshot.symbol.trim().is_empty() {
            snapshot.symbol = symbol.trim().to_uppercase();
        }
        Ok(snapshot)
    }
}
