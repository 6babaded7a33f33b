//! Selection and retry-suppression rules for the orchestrator.

use crate::collection::{ModCollection, ModEntry};
use crate::error::{ErrorCondition, ModError};
use crate::types::{ModId, ModState, UserId};

/// The entry chosen for a pass, captured before any operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub id: ModId,
    pub state: ModState,
}

impl Selection {
    fn from_entry(entry: &ModEntry) -> Self {
        Self {
            id: entry.id(),
            state: entry.state(),
        }
    }
}

/// Which collaborator produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    InstallOrUpdate,
    Uninstall,
}

/// Pick the next entry to process.
///
/// Pending removals are served first and regardless of identity. Installs and
/// updates are only considered for the active identity's subscriptions.
/// Within each class the lowest eligible id wins.
pub fn select_next(collection: &ModCollection, active_user: Option<UserId>) -> Option<Selection> {
    let removal = collection
        .entries()
        .find(|entry| entry.state() == ModState::UninstallPending && entry.should_retry());
    if let Some(entry) = removal {
        return Some(Selection::from_entry(entry));
    }

    let user = active_user?;
    collection
        .subscription_view(user)
        .entries()
        .find(|entry| entry.state().is_install_pending() && entry.should_retry())
        .map(Selection::from_entry)
}

/// Whether a failed operation should stop automatic retries of its entry.
///
/// Removal failures always do. Install/update failures do when retrying
/// cannot help: non-cancellation network errors, deferred installs and
/// expired or revoked credentials.
pub fn suppresses_retry(operation: Operation, err: &ModError) -> bool {
    match operation {
        Operation::Uninstall => true,
        Operation::InstallOrUpdate => {
            (err.matches(ErrorCondition::NetworkError) && !err.is_cancelled())
                || err.matches(ErrorCondition::InstallDeferredError)
                || err.matches(ErrorCondition::ExpiredOrRevokedToken)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;

    const USER: UserId = UserId(1);

    fn collection(entries: Vec<ModEntry>) -> ModCollection {
        let mut collection = ModCollection::new();
        for entry in entries {
            collection.insert(entry);
        }
        collection
    }

    #[test]
    fn test_removals_win_over_installs() {
        let collection = collection(vec![
            ModEntry::new(ModId(1), ModState::InstallationPending).with_subscriber(USER),
            ModEntry::new(ModId(9), ModState::UninstallPending),
        ]);

        let selection = select_next(&collection, Some(USER)).unwrap();
        assert_eq!(selection.id, ModId(9));
        assert_eq!(selection.state, ModState::UninstallPending);
    }

    #[test]
    fn test_installs_are_scoped_to_active_user() {
        let collection = collection(vec![
            ModEntry::new(ModId(1), ModState::InstallationPending).with_subscriber(UserId(2)),
            ModEntry::new(ModId(2), ModState::UpdatePending).with_subscriber(USER),
        ]);

        assert_eq!(select_next(&collection, Some(USER)).unwrap().id, ModId(2));
        assert_eq!(select_next(&collection, Some(UserId(3))), None);
        assert_eq!(select_next(&collection, None), None);
    }

    #[test]
    fn test_no_retry_entries_are_skipped() {
        let collection = collection(vec![
            ModEntry::new(ModId(1), ModState::UninstallPending).with_no_retry(),
            ModEntry::new(ModId(2), ModState::InstallationPending)
                .with_subscriber(USER)
                .with_no_retry(),
            ModEntry::new(ModId(3), ModState::InstallationPending).with_subscriber(USER),
        ]);

        assert_eq!(select_next(&collection, Some(USER)).unwrap().id, ModId(3));
    }

    #[test]
    fn test_lowest_id_wins_within_class() {
        let collection = collection(vec![
            ModEntry::new(ModId(30), ModState::UninstallPending),
            ModEntry::new(ModId(10), ModState::UninstallPending),
            ModEntry::new(ModId(20), ModState::UninstallPending),
        ]);

        assert_eq!(select_next(&collection, None).unwrap().id, ModId(10));
    }

    #[test]
    fn test_settled_entries_are_ignored() {
        let collection = collection(vec![
            ModEntry::new(ModId(1), ModState::Installed).with_subscriber(USER),
            ModEntry::new(ModId(2), ModState::Uninstalled),
        ]);

        assert_eq!(select_next(&collection, Some(USER)), None);
    }

    #[test]
    fn test_install_failure_classification() {
        let op = Operation::InstallOrUpdate;
        assert!(!suppresses_retry(op, &NetworkError::Cancelled.into()));
        assert!(suppresses_retry(op, &NetworkError::Timeout.into()));
        assert!(suppresses_retry(op, &NetworkError::HttpStatus { status: 500 }.into()));
        assert!(suppresses_retry(op, &ModError::install_deferred("no space")));
        assert!(suppresses_retry(op, &ModError::ExpiredOrRevokedAccessToken));
        assert!(!suppresses_retry(op, &ModError::filesystem("busy")));
        assert!(!suppresses_retry(op, &ModError::storage("disk")));
    }

    #[test]
    fn test_removal_failures_always_suppress() {
        let op = Operation::Uninstall;
        assert!(suppresses_retry(op, &NetworkError::Cancelled.into()));
        assert!(suppresses_retry(op, &ModError::filesystem("busy")));
        assert!(suppresses_retry(
            op,
            &ModError::DeleteDeferred {
                reason: "file locked".to_string()
            }
        ));
    }
}
