//! Contracts for the long-running collaborators the orchestrator drives.
//!
//! Each operation is single-shot and keyed by mod id. Implementations report
//! exactly one terminal outcome per call; the orchestrator awaits it before
//! touching the collection again.

pub mod directory;

use async_trait::async_trait;

use crate::collection::ModCollection;
use crate::error::Result;
use crate::types::ModId;

pub use directory::DirectoryInstaller;

/// Brings an item's on-disk artifacts to the latest version.
#[async_trait]
pub trait InstallOrUpdate: Send + Sync {
    async fn install_or_update(&self, id: ModId) -> Result<()>;
}

/// Removes an item's on-disk artifacts.
#[async_trait]
pub trait Uninstall: Send + Sync {
    async fn uninstall(&self, id: ModId) -> Result<()>;
}

/// Durable storage for the collection.
#[async_trait]
pub trait CollectionSink: Send + Sync {
    async fn store(&self, collection: &ModCollection) -> Result<()>;
}
