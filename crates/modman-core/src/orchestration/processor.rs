//! Processes the next pending entry of the mod collection.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::collection::SharedCollection;
use crate::error::{ModError, Result};
use crate::events::{EventKind, EventLog, ModManagementEvent};
use crate::ops::{CollectionSink, InstallOrUpdate, Uninstall};
use crate::orchestration::policy::{Operation, Selection, select_next, suppresses_retry};
use crate::types::{ModId, ModState, UserId};

/// Result of a pass that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Nothing eligible was pending.
    Idle,
    /// One entry was driven to completion and the collection persisted.
    Processed { id: ModId, kind: EventKind },
}

/// Summary of a [`ModProcessor::drain`] run.
#[derive(Debug, Default)]
pub struct DrainReport {
    pub processed: Vec<(ModId, EventKind)>,
    pub failure: Option<ModError>,
}

impl DrainReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Lifecycle orchestrator for the mod collection.
///
/// Each call to [`process_next`](Self::process_next) settles at most one
/// entry. Passes are serialized internally; the collection lock is never held
/// while an operation is in flight, so the entry is tracked by id across
/// suspension points.
pub struct ModProcessor {
    collection: SharedCollection,
    events: EventLog,
    active_user: Option<UserId>,
    installer: Arc<dyn InstallOrUpdate>,
    remover: Arc<dyn Uninstall>,
    sink: Arc<dyn CollectionSink>,
    pass: Mutex<()>,
}

impl std::fmt::Debug for ModProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModProcessor")
            .field("active_user", &self.active_user)
            .field("events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl ModProcessor {
    pub fn new(
        collection: SharedCollection,
        events: EventLog,
        installer: Arc<dyn InstallOrUpdate>,
        remover: Arc<dyn Uninstall>,
        sink: Arc<dyn CollectionSink>,
    ) -> Self {
        Self {
            collection,
            events,
            active_user: None,
            installer,
            remover,
            sink,
            pass: Mutex::new(()),
        }
    }

    /// Scope install/update selection to this identity.
    pub fn with_active_user(mut self, user: Option<UserId>) -> Self {
        self.active_user = user;
        self
    }

    pub fn active_user(&self) -> Option<UserId> {
        self.active_user
    }

    pub fn collection(&self) -> &SharedCollection {
        &self.collection
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Run one pass: select, dispatch, record, persist.
    ///
    /// Returns `Ok(Idle)` when nothing is eligible. Operation and persistence
    /// failures are returned unchanged after the entry's retry flag has been
    /// updated.
    pub async fn process_next(&self) -> Result<ProcessOutcome> {
        let _pass = self.pass.lock().await;

        let selection = {
            let collection = self.collection.read().await;
            select_next(&collection, self.active_user)
        };
        let Some(selection) = selection else {
            tracing::debug!("no pending mod management work");
            return Ok(ProcessOutcome::Idle);
        };

        tracing::debug!(mod_id = %selection.id, state = %selection.state, "processing mod");
        if selection.state.is_install_pending() {
            self.install_or_update(selection).await
        } else {
            self.uninstall(selection).await
        }
    }

    /// Call [`process_next`](Self::process_next) until the queue is empty or
    /// a pass fails.
    pub async fn drain(&self) -> DrainReport {
        let mut report = DrainReport::default();
        loop {
            match self.process_next().await {
                Ok(ProcessOutcome::Idle) => break,
                Ok(ProcessOutcome::Processed { id, kind }) => report.processed.push((id, kind)),
                Err(err) => {
                    report.failure = Some(err);
                    break;
                }
            }
        }
        report
    }

    async fn install_or_update(&self, selection: Selection) -> Result<ProcessOutcome> {
        let kind = if selection.state == ModState::InstallationPending {
            EventKind::Installed
        } else {
            EventKind::Updated
        };

        let result = self.installer.install_or_update(selection.id).await;
        self.finish(selection, Operation::InstallOrUpdate, kind, ModState::Installed, result)
            .await
    }

    async fn uninstall(&self, selection: Selection) -> Result<ProcessOutcome> {
        let result = self.remover.uninstall(selection.id).await;
        self.finish(
            selection,
            Operation::Uninstall,
            EventKind::Uninstalled,
            ModState::Uninstalled,
            result,
        )
        .await
    }

    async fn finish(
        &self,
        selection: Selection,
        operation: Operation,
        kind: EventKind,
        settled: ModState,
        result: Result<()>,
    ) -> Result<ProcessOutcome> {
        let id = selection.id;
        self.events
            .append(ModManagementEvent::new(id, kind, result.as_ref().err().cloned()));

        if let Err(err) = result {
            let suppressed =
                suppresses_retry(operation, &err) && self.mark_no_retry(selection).await;
            tracing::warn!(
                mod_id = %id,
                event = %kind,
                error = %err,
                code = err.code(),
                retry_suppressed = suppressed,
                "mod management operation failed"
            );
            return Err(err);
        }

        let snapshot = {
            let mut collection = self.collection.write().await;
            match collection.get_mut(id) {
                // A new request may have landed while the operation ran; it wins.
                Some(entry) if entry.state() == selection.state => {
                    entry.set_state(settled);
                    if settled == ModState::Uninstalled {
                        entry.clear_subscribers();
                    }
                }
                Some(entry) => {
                    tracing::debug!(
                        mod_id = %id,
                        state = %entry.state(),
                        "entry changed during operation, keeping newer state"
                    );
                }
                None => tracing::debug!(mod_id = %id, "entry left the collection during operation"),
            }
            collection.clone()
        };

        self.sink.store(&snapshot).await.inspect_err(|err| {
            tracing::error!(mod_id = %id, error = %err, "failed to persist mod collection");
        })?;

        tracing::info!(mod_id = %id, event = %kind, "mod management operation completed");
        Ok(ProcessOutcome::Processed { id, kind })
    }

    /// Suppress retries for the selected entry. Returns `false` when a newer
    /// request replaced the entry's state while the operation ran.
    async fn mark_no_retry(&self, selection: Selection) -> bool {
        let mut collection = self.collection.write().await;
        match collection.get_mut(selection.id) {
            Some(entry) if entry.state() == selection.state => {
                entry.mark_no_retry();
                true
            }
            Some(entry) => {
                tracing::debug!(
                    mod_id = %selection.id,
                    state = %entry.state(),
                    "entry changed during operation, leaving retry flag alone"
                );
                false
            }
            None => false,
        }
    }
}
