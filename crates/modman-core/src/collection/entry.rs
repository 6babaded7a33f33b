//! A single content item tracked by the collection.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ModId, ModState, UserId};

/// One installable content item and its lifecycle bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModEntry {
    id: ModId,
    state: ModState,

    /// Sticky suppression of automatic reprocessing.
    #[serde(default)]
    no_retry: bool,

    /// Local identities subscribed to this item
    #[serde(default)]
    subscribers: BTreeSet<UserId>,

    /// Last lifecycle change
    updated_at: DateTime<Utc>,
}

impl ModEntry {
    pub fn new(id: ModId, state: ModState) -> Self {
        Self {
            id,
            state,
            no_retry: false,
            subscribers: BTreeSet::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn id(&self) -> ModId {
        self.id
    }

    pub fn state(&self) -> ModState {
        self.state
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn subscribers(&self) -> &BTreeSet<UserId> {
        &self.subscribers
    }

    pub fn is_subscribed_by(&self, user: UserId) -> bool {
        self.subscribers.contains(&user)
    }

    /// Whether the orchestrator may pick this entry up on its next pass.
    pub fn should_retry(&self) -> bool {
        !self.no_retry
    }

    pub fn is_no_retry(&self) -> bool {
        self.no_retry
    }

    /// Stop automatic reprocessing until a new request clears the flag.
    pub fn mark_no_retry(&mut self) {
        self.no_retry = true;
    }

    /// Re-arm automatic processing. Only the request path calls this.
    pub fn clear_no_retry(&mut self) {
        self.no_retry = false;
    }

    pub(crate) fn set_state(&mut self, state: ModState) {
        self.state = state;
        self.updated_at = Utc::now();
    }

    pub(crate) fn add_subscriber(&mut self, user: UserId) -> bool {
        self.subscribers.insert(user)
    }

    pub(crate) fn remove_subscriber(&mut self, user: UserId) -> bool {
        self.subscribers.remove(&user)
    }

    pub(crate) fn clear_subscribers(&mut self) {
        self.subscribers.clear();
    }

    /// Builder used by tests and importers.
    pub fn with_subscriber(mut self, user: UserId) -> Self {
        self.subscribers.insert(user);
        self
    }

    pub fn with_no_retry(mut self) -> Self {
        self.no_retry = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_is_retryable() {
        let entry = ModEntry::new(ModId(1), ModState::InstallationPending);
        assert!(entry.should_retry());
        assert!(entry.subscribers().is_empty());
    }

    #[test]
    fn test_no_retry_is_sticky_until_cleared() {
        let mut entry = ModEntry::new(ModId(1), ModState::UninstallPending);
        entry.mark_no_retry();
        entry.mark_no_retry();
        assert!(!entry.should_retry());

        entry.set_state(ModState::UninstallPending);
        assert!(!entry.should_retry());

        entry.clear_no_retry();
        assert!(entry.should_retry());
    }

    #[test]
    fn test_missing_optional_fields_deserialize() {
        let json = r#"{"id":7,"state":"installed","updated_at":"2024-01-01T00:00:00Z"}"#;
        let entry: ModEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id(), ModId(7));
        assert_eq!(entry.state(), ModState::Installed);
        assert!(entry.should_retry());
    }
}
