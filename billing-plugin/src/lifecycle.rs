use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::descriptor::PluginDescriptor;

/// Lifecycle status of a registered plugin.
///
/// Registered -> Installed -> Active -> Inactive -> (uninstall) -> Registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginStatus {
    Registered,
    Installed,
    Active,
    Inactive,
}

impl fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PluginStatus::Registered => "registered",
            PluginStatus::Installed => "installed",
            PluginStatus::Active => "active",
            PluginStatus::Inactive => "inactive",
        };
        f.write_str(name)
    }
}

/// A lifecycle operation callers can request on a plugin.
///
/// The transition table lives here and nowhere else: every registry
/// operation asks `permits` whether its move is legal and `target` where a
/// success lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOp {
    Install,
    Activate,
    Deactivate,
    Uninstall,
}

impl LifecycleOp {
    /// Statuses this operation may be invoked from.
    pub fn allowed_from(self) -> &'static [PluginStatus] {
        match self {
            LifecycleOp::Install => &[PluginStatus::Registered],
            LifecycleOp::Activate => &[PluginStatus::Installed, PluginStatus::Inactive],
            LifecycleOp::Deactivate => &[PluginStatus::Active],
            LifecycleOp::Uninstall => &[PluginStatus::Inactive],
        }
    }

    /// Status a plugin lands in after this operation succeeds.
    pub fn target(self) -> PluginStatus {
        match self {
            LifecycleOp::Install => PluginStatus::Installed,
            LifecycleOp::Activate => PluginStatus::Active,
            LifecycleOp::Deactivate => PluginStatus::Inactive,
            LifecycleOp::Uninstall => PluginStatus::Registered,
        }
    }

    pub fn permits(self, from: PluginStatus) -> bool {
        self.allowed_from().contains(&from)
    }
}

impl fmt::Display for LifecycleOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleOp::Install => "install",
            LifecycleOp::Activate => "activate",
            LifecycleOp::Deactivate => "deactivate",
            LifecycleOp::Uninstall => "uninstall",
        };
        f.write_str(name)
    }
}

/// Per-plugin record owned exclusively by the registry.
///
/// Created on registration and never removed; uninstalling returns the
/// record to `Registered`. Status moves only as the direct result of a
/// successful lifecycle call.
#[derive(Debug)]
pub struct LifecycleRecord {
    pub descriptor: PluginDescriptor,
    pub status: PluginStatus,
}

impl LifecycleRecord {
    pub(crate) fn new(descriptor: PluginDescriptor) -> Self {
        Self {
            descriptor,
            status: PluginStatus::Registered,
        }
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }
}

/// One attempted lifecycle transition.
///
/// Successful transitions record the new status; failed attempts record
/// `to == from` plus the hook's error text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub plugin: String,
    pub from: PluginStatus,
    pub to: PluginStatus,
    pub error: Option<String>,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_covers_the_lifecycle() {
        assert!(LifecycleOp::Install.permits(PluginStatus::Registered));
        assert!(!LifecycleOp::Install.permits(PluginStatus::Installed));
        assert_eq!(LifecycleOp::Install.target(), PluginStatus::Installed);

        assert!(LifecycleOp::Activate.permits(PluginStatus::Installed));
        assert!(LifecycleOp::Activate.permits(PluginStatus::Inactive));
        assert!(!LifecycleOp::Activate.permits(PluginStatus::Active));
        assert_eq!(LifecycleOp::Activate.target(), PluginStatus::Active);

        assert!(LifecycleOp::Deactivate.permits(PluginStatus::Active));
        assert!(!LifecycleOp::Deactivate.permits(PluginStatus::Installed));
        assert_eq!(LifecycleOp::Deactivate.target(), PluginStatus::Inactive);

        assert!(LifecycleOp::Uninstall.permits(PluginStatus::Inactive));
        assert!(!LifecycleOp::Uninstall.permits(PluginStatus::Active));
        assert!(!LifecycleOp::Uninstall.permits(PluginStatus::Registered));
        assert_eq!(LifecycleOp::Uninstall.target(), PluginStatus::Registered);
    }

    #[test]
    fn status_serialization_uses_snake_case() {
        let json = serde_json::to_string(&PluginStatus::Registered).unwrap();
        assert_eq!(json, "\"registered\"");

        let parsed: PluginStatus = serde_json::from_str("\"inactive\"").unwrap();
        assert_eq!(parsed, PluginStatus::Inactive);
    }

    #[test]
    fn display_names_are_lowercase() {
        assert_eq!(PluginStatus::Active.to_string(), "active");
        assert_eq!(PluginStatus::Registered.to_string(), "registered");
        assert_eq!(LifecycleOp::Uninstall.to_string(), "uninstall");
        assert_eq!(LifecycleOp::Deactivate.to_string(), "deactivate");
    }
}
