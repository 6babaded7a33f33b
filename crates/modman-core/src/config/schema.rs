//! Configuration schema for modman.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::collection::JsonCollectionStore;
use crate::types::UserId;

/// Root configuration structure for modman.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ModmanConfig {
    /// Where the collection file lives
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,

    /// Where installed mods are materialized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<PathBuf>,

    /// Where downloaded mod payloads are picked up from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<PathBuf>,

    /// Identity whose subscriptions are installed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_user: Option<UserId>,
}

impl ModmanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.state_dir {
            Some(dir) => Ok(dir.clone()),
            None => JsonCollectionStore::default_state_dir(),
        }
    }

    pub fn install_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.install_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(default_data_dir()?.join("mods")),
        }
    }

    pub fn source_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.source_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(default_data_dir()?.join("sources")),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if let (Some(install), Some(source)) = (&self.install_dir, &self.source_dir)
            && install == source
        {
            anyhow::bail!(
                "install_dir and source_dir must differ (both are {})",
                install.display()
            );
        }
        Ok(())
    }
}

fn default_data_dir() -> anyhow::Result<PathBuf> {
    dirs::data_local_dir()
        .map(|dir| dir.join("modman"))
        .ok_or_else(|| anyhow::anyhow!("Cannot determine local data directory"))
}
