//! Error taxonomy for mod management operations.
//!
//! Collaborators report failures as [`ModError`]. The orchestrator never
//! swallows them: it inspects the error through [`ErrorCondition`] to decide
//! whether the entry may be retried, then hands the same value back to its
//! caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModError>;

/// Failures raised by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NetworkError {
    #[error("operation was cancelled")]
    Cancelled,
    #[error("could not connect to the server")]
    ConnectionFailed,
    #[error("request timed out")]
    Timeout,
    #[error("server responded with HTTP {status}")]
    HttpStatus { status: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ModError {
    #[error("network error: {0}")]
    Network(NetworkError),

    #[error("install deferred: {reason}")]
    InstallDeferred { reason: String },

    #[error("access token expired or revoked")]
    ExpiredOrRevokedAccessToken,

    #[error("delete deferred: {reason}")]
    DeleteDeferred { reason: String },

    #[error("filesystem error: {message}")]
    Filesystem { message: String },

    #[error("storage error: {message}")]
    Storage { message: String },

    #[error("configuration error: {message}")]
    Config { message: String },
}

/// Coarse classes an error can be matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCondition {
    NetworkError,
    InstallDeferredError,
    DeleteDeferredError,
    ExpiredOrRevokedToken,
    FilesystemError,
    StorageError,
}

impl ModError {
    pub fn filesystem(message: impl Into<String>) -> Self {
        ModError::Filesystem {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        ModError::Storage {
            message: message.into(),
        }
    }

    pub fn install_deferred(reason: impl Into<String>) -> Self {
        ModError::InstallDeferred {
            reason: reason.into(),
        }
    }

    /// Check whether this error belongs to the given class.
    ///
    /// Cancellation arrives through the transport and therefore also matches
    /// [`ErrorCondition::NetworkError`]; use [`ModError::is_cancelled`] to tell
    /// it apart.
    pub fn matches(&self, condition: ErrorCondition) -> bool {
        match condition {
            ErrorCondition::NetworkError => matches!(self, ModError::Network(_)),
            ErrorCondition::InstallDeferredError => matches!(self, ModError::InstallDeferred { .. }),
            ErrorCondition::DeleteDeferredError => matches!(self, ModError::DeleteDeferred { .. }),
            ErrorCondition::ExpiredOrRevokedToken => {
                matches!(self, ModError::ExpiredOrRevokedAccessToken)
            }
            ErrorCondition::FilesystemError => matches!(self, ModError::Filesystem { .. }),
            ErrorCondition::StorageError => matches!(self, ModError::Storage { .. }),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ModError::Network(NetworkError::Cancelled))
    }

    /// Short stable label used in logs and reports.
    pub fn code(&self) -> &'static str {
        match self {
            ModError::Network(NetworkError::Cancelled) => "cancelled",
            ModError::Network(_) => "network",
            ModError::InstallDeferred { .. } => "install_deferred",
            ModError::ExpiredOrRevokedAccessToken => "expired_token",
            ModError::DeleteDeferred { .. } => "delete_deferred",
            ModError::Filesystem { .. } => "filesystem",
            ModError::Storage { .. } => "storage",
            ModError::Config { .. } => "config",
        }
    }
}

impl From<NetworkError> for ModError {
    fn from(err: NetworkError) -> Self {
        ModError::Network(err)
    }
}
