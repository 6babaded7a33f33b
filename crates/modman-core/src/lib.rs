//! Modman Core Library
//!
//! Tracks a collection of installable mods with their desired lifecycle
//! state and drives pending installs, updates and removals to completion,
//! one entry per pass.

pub mod collection;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod fs;
pub mod ops;
pub mod orchestration;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Collection
    pub use crate::collection::{
        JsonCollectionStore, ModCollection, ModEntry, RequestOutcome, SharedCollection,
        SubscriptionView,
    };

    // Configuration
    pub use crate::config::{ConfigStore, ModmanConfig};
    pub use crate::context::AppContext;

    // Errors
    pub use crate::error::{ErrorCondition, ModError, NetworkError};

    // Events
    pub use crate::events::{EventKind, EventLog, ModManagementEvent};

    // Operations
    pub use crate::ops::{CollectionSink, DirectoryInstaller, InstallOrUpdate, Uninstall};

    // Orchestration
    pub use crate::orchestration::{DrainReport, ModProcessor, ProcessOutcome};

    pub use crate::types::{ModId, ModState, UserId};
}
