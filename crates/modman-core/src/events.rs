//! Append-only log of mod management events.
//!
//! Every install, update and uninstall attempt the orchestrator finishes is
//! recorded here, successful or not. Reporting code reads the log with
//! [`EventLog::snapshot`] or takes ownership of it with [`EventLog::drain`].

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModError;
use crate::types::ModId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Installed,
    Updated,
    Uninstalled,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventKind::Installed => "installed",
            EventKind::Updated => "updated",
            EventKind::Uninstalled => "uninstalled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModManagementEvent {
    pub id: ModId,
    pub kind: EventKind,

    /// `None` when the operation succeeded.
    pub status: Option<ModError>,

    pub recorded_at: DateTime<Utc>,
}

impl ModManagementEvent {
    pub fn new(id: ModId, kind: EventKind, status: Option<ModError>) -> Self {
        Self {
            id,
            kind,
            status,
            recorded_at: Utc::now(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status.is_none()
    }
}

/// Cloneable handle to the process-wide event log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<ModManagementEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, event: ModManagementEvent) {
        self.lock().push(event);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of every event recorded so far, oldest first.
    pub fn snapshot(&self) -> Vec<ModManagementEvent> {
        self.lock().clone()
    }

    /// Take every recorded event, leaving the log empty.
    pub fn drain(&self) -> Vec<ModManagementEvent> {
        std::mem::take(&mut *self.lock())
    }

    // A panic while holding the lock cannot leave a half-pushed Vec behind.
    fn lock(&self) -> MutexGuard<'_, Vec<ModManagementEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;

    #[test]
    fn test_append_preserves_order() {
        let log = EventLog::new();
        log.append(ModManagementEvent::new(ModId(1), EventKind::Installed, None));
        log.append(ModManagementEvent::new(
            ModId(2),
            EventKind::Uninstalled,
            Some(NetworkError::Timeout.into()),
        ));

        let events = log.snapshot();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, ModId(1));
        assert!(events[0].succeeded());
        assert_eq!(events[1].kind, EventKind::Uninstalled);
        assert!(!events[1].succeeded());
    }

    #[test]
    fn test_clones_share_the_log() {
        let log = EventLog::new();
        let other = log.clone();
        other.append(ModManagementEvent::new(ModId(1), EventKind::Updated, None));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_drain_empties_log() {
        let log = EventLog::new();
        log.append(ModManagementEvent::new(ModId(1), EventKind::Installed, None));

        let drained = log.drain();
        assert_eq!(drained.len(), 1);
        assert!(log.is_empty());
    }
}
