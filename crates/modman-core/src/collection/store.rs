//! Collection persistence in the XDG state directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;

use crate::collection::ModCollection;
use crate::error::{ModError, Result};
use crate::ops::CollectionSink;

const COLLECTION_FILE: &str = "collection.json";

/// JSON-file backed collection storage.
///
/// Stored at `<state_dir>/collection.json`:
/// - Unix: `$XDG_STATE_HOME/modman` (fallback: `~/.local/state/modman`)
/// - Windows: `%LOCALAPPDATA%\modman`
#[derive(Debug, Clone)]
pub struct JsonCollectionStore {
    state_dir: PathBuf,
}

impl JsonCollectionStore {
    pub fn new(state_dir: PathBuf) -> Self {
        Self { state_dir }
    }

    /// Default state directory for the collection file.
    pub fn default_state_dir() -> anyhow::Result<PathBuf> {
        let base = if cfg!(unix) {
            dirs::state_dir()
                .or_else(dirs::data_local_dir)
                .ok_or_else(|| anyhow::anyhow!("Cannot determine state directory"))?
        } else {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Cannot determine local app data directory"))?
        };
        Ok(base.join("modman"))
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn collection_path(&self) -> PathBuf {
        self.state_dir.join(COLLECTION_FILE)
    }

    /// Load the collection, or an empty one if nothing was stored yet.
    pub fn load(&self) -> anyhow::Result<ModCollection> {
        let path = self.collection_path();
        if !path.exists() {
            return Ok(ModCollection::new());
        }

        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read collection: {}", path.display()))?;
        let collection: ModCollection = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse collection: {}", path.display()))?;
        collection.validate()?;
        Ok(collection)
    }

    /// Save atomically (tmp + rename).
    pub fn save(&self, collection: &ModCollection) -> anyhow::Result<()> {
        fs::create_dir_all(&self.state_dir).with_context(|| {
            format!(
                "Failed to create state directory: {}",
                self.state_dir.display()
            )
        })?;

        let path = self.collection_path();
        let tmp_path = self
            .state_dir
            .join(format!("{}.{}.tmp", COLLECTION_FILE, std::process::id()));

        let bytes =
            serde_json::to_vec_pretty(collection).context("Failed to serialize collection")?;
        fs::write(&tmp_path, bytes)
            .with_context(|| format!("Failed to write tmp collection: {}", tmp_path.display()))?;

        // Windows rename does not replace.
        if cfg!(windows) && path.exists() {
            fs::remove_file(&path).with_context(|| {
                format!("Failed to remove existing collection: {}", path.display())
            })?;
        }
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("Failed to rename tmp collection: {}", tmp_path.display()))?;

        tracing::debug!(path = %path.display(), entries = collection.len(), "collection saved");
        Ok(())
    }
}

#[async_trait]
impl CollectionSink for JsonCollectionStore {
    async fn store(&self, collection: &ModCollection) -> Result<()> {
        let store = self.clone();
        let snapshot = collection.clone();
        tokio::task::spawn_blocking(move || store.save(&snapshot))
            .await
            .map_err(|e| ModError::storage(format!("collection save task failed: {}", e)))?
            .map_err(|e| ModError::storage(format!("{:#}", e)))
    }
}
