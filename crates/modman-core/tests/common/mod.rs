//! Hand-written fakes for the orchestrator's collaborators.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use modman_core::collection::{ModCollection, ModEntry, SharedCollection};
use modman_core::error::{ModError, Result};
use modman_core::events::EventLog;
use modman_core::ops::{CollectionSink, InstallOrUpdate, Uninstall};
use modman_core::orchestration::ModProcessor;
use modman_core::types::{ModId, UserId};

pub const USER: UserId = UserId(100);

type Hook = Box<dyn FnOnce(&mut ModCollection) + Send>;

/// Install/update and removal fake with scripted failures.
#[derive(Default)]
pub struct FakeOps {
    failures: Mutex<HashMap<ModId, ModError>>,
    installs: Mutex<Vec<ModId>>,
    uninstalls: Mutex<Vec<ModId>>,
    during: Mutex<Option<(SharedCollection, Hook)>>,
}

impl FakeOps {
    pub fn fail(&self, id: ModId, err: ModError) {
        self.failures.lock().unwrap().insert(id, err);
    }

    /// Apply `hook` to the collection while the next operation is in flight.
    pub fn during_next_dispatch(
        &self,
        collection: SharedCollection,
        hook: impl FnOnce(&mut ModCollection) + Send + 'static,
    ) {
        *self.during.lock().unwrap() = Some((collection, Box::new(hook)));
    }

    pub fn installs(&self) -> Vec<ModId> {
        self.installs.lock().unwrap().clone()
    }

    pub fn uninstalls(&self) -> Vec<ModId> {
        self.uninstalls.lock().unwrap().clone()
    }

    pub fn dispatched(&self) -> usize {
        self.installs().len() + self.uninstalls().len()
    }

    async fn run_hook(&self) {
        let pending = self.during.lock().unwrap().take();
        if let Some((collection, hook)) = pending {
            hook(&mut *collection.write().await);
        }
    }

    fn outcome(&self, id: ModId) -> Result<()> {
        match self.failures.lock().unwrap().get(&id) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl InstallOrUpdate for FakeOps {
    async fn install_or_update(&self, id: ModId) -> Result<()> {
        self.installs.lock().unwrap().push(id);
        tokio::task::yield_now().await;
        self.run_hook().await;
        self.outcome(id)
    }
}

#[async_trait]
impl Uninstall for FakeOps {
    async fn uninstall(&self, id: ModId) -> Result<()> {
        self.uninstalls.lock().unwrap().push(id);
        tokio::task::yield_now().await;
        self.run_hook().await;
        self.outcome(id)
    }
}

/// Sink that records every stored snapshot along with the event log length
/// observed at the time of the call.
pub struct RecordingSink {
    events: EventLog,
    stored: Mutex<Vec<(ModCollection, usize)>>,
    failure: Mutex<Option<ModError>>,
}

impl RecordingSink {
    pub fn new(events: EventLog) -> Self {
        Self {
            events,
            stored: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    pub fn fail_with(&self, err: ModError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn calls(&self) -> usize {
        self.stored.lock().unwrap().len()
    }

    pub fn stored(&self) -> Vec<(ModCollection, usize)> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl CollectionSink for RecordingSink {
    async fn store(&self, collection: &ModCollection) -> Result<()> {
        self.stored
            .lock()
            .unwrap()
            .push((collection.clone(), self.events.len()));
        match self.failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

pub struct Harness {
    pub collection: SharedCollection,
    pub events: EventLog,
    pub ops: Arc<FakeOps>,
    pub sink: Arc<RecordingSink>,
    pub processor: ModProcessor,
}

impl Harness {
    pub fn new(entries: Vec<ModEntry>) -> Self {
        let mut collection = ModCollection::new();
        for entry in entries {
            collection.insert(entry);
        }
        let collection = collection.into_shared();
        let events = EventLog::new();
        let ops = Arc::new(FakeOps::default());
        let sink = Arc::new(RecordingSink::new(events.clone()));
        let processor = ModProcessor::new(
            collection.clone(),
            events.clone(),
            ops.clone(),
            ops.clone(),
            sink.clone(),
        )
        .with_active_user(Some(USER));

        Self {
            collection,
            events,
            ops,
            sink,
            processor,
        }
    }

    pub async fn entry(&self, id: ModId) -> Option<ModEntry> {
        self.collection.read().await.get(id).cloned()
    }
}
