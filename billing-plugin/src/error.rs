use crate::lifecycle::{LifecycleOp, PluginStatus};

/// Errors produced by plugin lifecycle and capability operations.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("plugin '{0}' already registered")]
    DuplicateName(String),

    #[error("plugin not found: {0}")]
    NotFound(String),

    #[error("plugin '{name}' is {status}, cannot {op}")]
    InvalidState {
        name: String,
        status: PluginStatus,
        op: LifecycleOp,
    },

    /// The dependency graph contains a cycle; no installation order exists.
    #[error("circular dependency detected: {}", .cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },

    /// Deactivation refused while other active plugins depend on the target.
    #[error("Cannot deactivate \"{name}\": active dependents: {}", .dependents.join(", "))]
    DependentsActive {
        name: String,
        dependents: Vec<String>,
    },

    /// A plugin's own lifecycle hook failed. The original error is passed
    /// through unchanged so callers can surface it directly.
    #[error(transparent)]
    Hook(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PluginError>;
