//! The mod collection: every known entry plus the request path that
//! creates pending lifecycle states.

pub mod entry;
pub mod store;
pub mod view;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{ModError, Result};
use crate::types::{ModId, ModState, UserId};

pub use entry::ModEntry;
pub use store::JsonCollectionStore;
pub use view::SubscriptionView;

/// Current on-disk format version.
pub const COLLECTION_FORMAT_VERSION: u32 = 1;

/// Process-wide handle to the collection.
///
/// Guards are held for scans and single mutations only, never across an
/// awaited operation.
pub type SharedCollection = Arc<RwLock<ModCollection>>;

/// Outcome of a lifecycle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Changed,
    NoOp,
}

/// Registry of all known entries, keyed by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModCollection {
    /// Format version
    pub version: u32,

    #[serde(default)]
    entries: BTreeMap<ModId, ModEntry>,
}

impl ModCollection {
    pub fn new() -> Self {
        Self {
            version: COLLECTION_FORMAT_VERSION,
            entries: BTreeMap::new(),
        }
    }

    pub fn into_shared(self) -> SharedCollection {
        Arc::new(RwLock::new(self))
    }

    /// All entries in ascending id order.
    pub fn entries(&self) -> impl Iterator<Item = &ModEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: ModId) -> Option<&ModEntry> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: ModId) -> Option<&mut ModEntry> {
        self.entries.get_mut(&id)
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, entry: ModEntry) -> Option<ModEntry> {
        self.entries.insert(entry.id(), entry)
    }

    pub fn remove(&mut self, id: ModId) -> Option<ModEntry> {
        self.entries.remove(&id)
    }

    /// Entries the given identity is subscribed to.
    pub fn subscription_view(&self, user: UserId) -> SubscriptionView<'_> {
        SubscriptionView::new(self, user)
    }

    /// Subscribe `user` to `id` and make sure the item ends up installed.
    pub fn request_install(&mut self, id: ModId, user: UserId) -> RequestOutcome {
        let Some(entry) = self.entries.get_mut(&id) else {
            self.insert(ModEntry::new(id, ModState::InstallationPending).with_subscriber(user));
            return RequestOutcome::Changed;
        };

        let mut changed = entry.add_subscriber(user);
        match entry.state() {
            ModState::Uninstalled => {
                entry.set_state(ModState::InstallationPending);
                changed = true;
            }
            // Files are still on disk, so cancelling the removal is enough.
            ModState::UninstallPending => {
                entry.set_state(ModState::Installed);
                changed = true;
            }
            ModState::InstallationPending | ModState::UpdatePending | ModState::Installed => {}
        }
        if entry.is_no_retry() {
            entry.clear_no_retry();
            changed = true;
        }
        if changed {
            RequestOutcome::Changed
        } else {
            RequestOutcome::NoOp
        }
    }

    /// Schedule an update for an installed item.
    pub fn request_update(&mut self, id: ModId) -> Result<RequestOutcome> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or_else(|| not_in_collection(id))?;

        match entry.state() {
            ModState::Installed => {
                entry.set_state(ModState::UpdatePending);
                entry.clear_no_retry();
                Ok(RequestOutcome::Changed)
            }
            ModState::UpdatePending if entry.is_no_retry() => {
                entry.clear_no_retry();
                Ok(RequestOutcome::Changed)
            }
            ModState::UpdatePending | ModState::InstallationPending => Ok(RequestOutcome::NoOp),
            ModState::UninstallPending | ModState::Uninstalled => Err(ModError::Config {
                message: format!("Mod {} is not installed", id),
            }),
        }
    }

    /// Unsubscribe `user` from `id`; schedules removal once nobody is subscribed.
    pub fn request_uninstall(&mut self, id: ModId, user: UserId) -> Result<RequestOutcome> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or_else(|| not_in_collection(id))?;

        let mut changed = entry.remove_subscriber(user);
        if !entry.subscribers().is_empty() {
            return Ok(if changed {
                RequestOutcome::Changed
            } else {
                RequestOutcome::NoOp
            });
        }

        match entry.state() {
            // Nothing reached the disk yet.
            ModState::InstallationPending => {
                self.entries.remove(&id);
                return Ok(RequestOutcome::Changed);
            }
            ModState::Installed | ModState::UpdatePending => {
                entry.set_state(ModState::UninstallPending);
                entry.clear_no_retry();
                changed = true;
            }
            ModState::UninstallPending if entry.is_no_retry() => {
                entry.clear_no_retry();
                changed = true;
            }
            ModState::UninstallPending | ModState::Uninstalled => {}
        }

        Ok(if changed {
            RequestOutcome::Changed
        } else {
            RequestOutcome::NoOp
        })
    }

    /// Validate a collection read from storage.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.version != COLLECTION_FORMAT_VERSION {
            anyhow::bail!("Unsupported collection version: {}", self.version);
        }
        for (key, entry) in &self.entries {
            if *key != entry.id() {
                anyhow::bail!("Collection key {} does not match entry id {}", key, entry.id());
            }
        }
        Ok(())
    }
}

impl Default for ModCollection {
    fn default() -> Self {
        Self::new()
    }
}

fn not_in_collection(id: ModId) -> ModError {
    ModError::Config {
        message: format!("Mod {} is not in the collection", id),
    }
}
