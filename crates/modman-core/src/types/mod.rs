//! Shared core types used across the collection, event and orchestration layers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stable identifier of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModId(pub u64);

/// Identifier of a local user identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for ModId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ModId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ModId)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(UserId)
    }
}

/// Lifecycle state of a collection entry.
///
/// Pending states record what the user asked for; `Installed` and
/// `Uninstalled` are the settled outcomes written by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModState {
    InstallationPending,
    Installed,
    UpdatePending,
    UninstallPending,
    Uninstalled,
}

impl ModState {
    pub fn as_str(self) -> &'static str {
        match self {
            ModState::InstallationPending => "installation_pending",
            ModState::Installed => "installed",
            ModState::UpdatePending => "update_pending",
            ModState::UninstallPending => "uninstall_pending",
            ModState::Uninstalled => "uninstalled",
        }
    }

    /// True for states served by the install/update operation.
    pub fn is_install_pending(self) -> bool {
        matches!(self, ModState::InstallationPending | ModState::UpdatePending)
    }

    pub fn is_pending(self) -> bool {
        self.is_install_pending() || self == ModState::UninstallPending
    }
}

impl fmt::Display for ModState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_states() {
        assert!(ModState::InstallationPending.is_install_pending());
        assert!(ModState::UpdatePending.is_install_pending());
        assert!(!ModState::UninstallPending.is_install_pending());
        assert!(ModState::UninstallPending.is_pending());
        assert!(!ModState::Installed.is_pending());
        assert!(!ModState::Uninstalled.is_pending());
    }

    #[test]
    fn test_mod_id_parse() {
        assert_eq!(" 42 ".parse::<ModId>().unwrap(), ModId(42));
        assert!("abc".parse::<ModId>().is_err());
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let json = serde_json::to_string(&ModState::UninstallPending).unwrap();
        assert_eq!(json, "\"uninstall_pending\"");
    }
}
