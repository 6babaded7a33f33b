//! Application context for unified dependency injection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::collection::{JsonCollectionStore, SharedCollection};
use crate::config::ModmanConfig;
use crate::events::EventLog;
use crate::ops::DirectoryInstaller;
use crate::orchestration::ModProcessor;
use crate::types::UserId;

/// Resolved paths and shared services.
///
/// Frontends create this once from the loaded config and pass it to
/// commands; nothing in the library reaches for global state.
#[derive(Debug, Clone)]
pub struct AppContext {
    state_dir: PathBuf,
    install_dir: PathBuf,
    source_dir: PathBuf,
    active_user: Option<UserId>,
    events: EventLog,
}

impl AppContext {
    /// Create a new context with explicit paths.
    pub fn new(
        state_dir: PathBuf,
        install_dir: PathBuf,
        source_dir: PathBuf,
        active_user: Option<UserId>,
    ) -> Self {
        Self {
            state_dir,
            install_dir,
            source_dir,
            active_user,
            events: EventLog::new(),
        }
    }

    /// Resolve every path from the config, applying defaults.
    pub fn from_config(config: &ModmanConfig) -> anyhow::Result<Self> {
        Ok(Self::new(
            config.state_dir()?,
            config.install_dir()?,
            config.source_dir()?,
            config.active_user,
        ))
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn active_user(&self) -> Option<UserId> {
        self.active_user
    }

    pub fn with_active_user(mut self, user: Option<UserId>) -> Self {
        self.active_user = user;
        self
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn collection_store(&self) -> JsonCollectionStore {
        JsonCollectionStore::new(self.state_dir.clone())
    }

    pub fn installer(&self) -> DirectoryInstaller {
        DirectoryInstaller::new(self.source_dir.clone(), self.install_dir.clone())
    }

    /// Load the stored collection into a shared handle.
    pub fn load_collection(&self) -> anyhow::Result<SharedCollection> {
        Ok(self.collection_store().load()?.into_shared())
    }

    /// Write the current in-memory collection back to the store.
    ///
    /// Drivers call this after a failed pass so retry flags set by the
    /// processor survive the process exiting.
    pub async fn save_collection(&self, collection: &SharedCollection) -> anyhow::Result<()> {
        let snapshot = collection.read().await.clone();
        self.collection_store().save(&snapshot)
    }

    /// Wire a processor over `collection` with the directory-backed
    /// operations and the JSON store.
    pub fn processor(&self, collection: SharedCollection) -> ModProcessor {
        let installer = Arc::new(self.installer());
        ModProcessor::new(
            collection,
            self.events.clone(),
            installer.clone(),
            installer,
            Arc::new(self.collection_store()),
        )
        .with_active_user(self.active_user)
    }
}
