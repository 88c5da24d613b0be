use chrono::Utc;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::descriptor::{PluginDescriptor, PluginManifest};
use crate::error::{PluginError, Result};
use crate::lifecycle::{LifecycleEvent, LifecycleOp, LifecycleRecord, PluginStatus};
use crate::resolver;
use crate::sdk::PlatformSdk;

/// Orchestrates plugin lifecycles for one application process.
///
/// Holds one `LifecycleRecord` per registered plugin, in registration
/// order. Lifecycle operations consult the central transition table, run
/// the plugin's hook to completion, and advance status only when the hook
/// succeeds -- a failing hook leaves status exactly where it was and the
/// hook's error reaches the caller unchanged, so retrying the same
/// operation is always valid.
///
/// Hooks run strictly one at a time; `install_all` is sequential in
/// dependency order. Nothing here persists across restarts.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    records: IndexMap<String, LifecycleRecord>,
    events: Vec<LifecycleEvent>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin at `Registered`. Rejects a name that is already taken.
    pub fn register(&mut self, descriptor: PluginDescriptor) -> Result<()> {
        let name = descriptor.name().to_string();
        if self.records.contains_key(&name) {
            return Err(PluginError::DuplicateName(name));
        }
        debug!("registered plugin '{name}'");
        self.records.insert(name, LifecycleRecord::new(descriptor));
        Ok(())
    }

    /// Install a single plugin, running its install hook against `sdk`.
    ///
    /// Valid only from `Registered`. On hook failure the plugin stays
    /// `Registered` and nothing in the registry records a partial install.
    pub async fn install(&mut self, name: &str, sdk: &mut PlatformSdk) -> Result<()> {
        let record = self.check_transition(name, LifecycleOp::Install)?;
        let from = record.status;
        let hooks = record.descriptor.hooks();

        if let Some(hooks) = hooks {
            if let Err(err) = hooks.install(sdk).await {
                self.record_failure(name, from, LifecycleOp::Install, &err);
                return Err(err.into());
            }
        }
        self.commit(name, from, LifecycleOp::Install.target());
        Ok(())
    }

    /// Install every registered plugin in dependency order, sequentially.
    ///
    /// Fails with `CircularDependency` before any install if no order
    /// exists. Records that already moved past `Registered` are skipped, so
    /// a batch retried after a failure resumes with the plugins that never
    /// installed. The first hook failure aborts the batch: earlier plugins
    /// keep `Installed`, the failing one stays `Registered`, later plugins
    /// are not attempted.
    pub async fn install_all(&mut self, sdk: &mut PlatformSdk) -> Result<()> {
        let order = self.installation_order()?;
        info!("installing {} plugins", order.len());
        for name in order {
            if self.record_for(&name)?.status != PluginStatus::Registered {
                continue;
            }
            self.install(&name, sdk).await?;
        }
        Ok(())
    }

    /// Activate a plugin. Valid from `Installed` or `Inactive`.
    ///
    /// Declared dependencies must be registered, but their own status is
    /// deliberately not checked: activating a plugin whose dependency is
    /// merely `Installed` succeeds. Sequencing activation across a chain is
    /// the caller's job. (Requiring dependencies to be `Active` here would
    /// be the stricter, equally defensible contract.)
    pub async fn activate(&mut self, name: &str) -> Result<()> {
        let record = self.check_transition(name, LifecycleOp::Activate)?;
        let from = record.status;
        for dep in record.descriptor.dependencies() {
            if !self.records.contains_key(dep) {
                return Err(PluginError::NotFound(dep.clone()));
            }
        }
        let hooks = record.descriptor.hooks();

        if let Some(hooks) = hooks {
            if let Err(err) = hooks.activate().await {
                self.record_failure(name, from, LifecycleOp::Activate, &err);
                return Err(err.into());
            }
        }
        self.commit(name, from, LifecycleOp::Activate.target());
        Ok(())
    }

    /// Deactivate a plugin. Valid only from `Active`.
    ///
    /// Refused with `DependentsActive` while any other `Active` plugin
    /// declares this one as a dependency; the deactivate hook is not
    /// invoked in that case. Deactivation is never cascaded.
    pub async fn deactivate(&mut self, name: &str) -> Result<()> {
        let record = self.check_transition(name, LifecycleOp::Deactivate)?;
        let from = record.status;

        let dependents: Vec<String> = self
            .records
            .values()
            .filter(|r| {
                r.name() != name
                    && r.status == PluginStatus::Active
                    && r.descriptor.dependencies().iter().any(|dep| dep == name)
            })
            .map(|r| r.name().to_string())
            .collect();
        if !dependents.is_empty() {
            return Err(PluginError::DependentsActive {
                name: name.to_string(),
                dependents,
            });
        }
        let hooks = record.descriptor.hooks();

        if let Some(hooks) = hooks {
            if let Err(err) = hooks.deactivate().await {
                self.record_failure(name, from, LifecycleOp::Deactivate, &err);
                return Err(err.into());
            }
        }
        self.commit(name, from, LifecycleOp::Deactivate.target());
        Ok(())
    }

    /// Uninstall a plugin. Valid only from `Inactive`.
    ///
    /// Success returns the record to `Registered`; it is never removed from
    /// the registry and stays eligible for a fresh install.
    pub async fn uninstall(&mut self, name: &str) -> Result<()> {
        let record = self.check_transition(name, LifecycleOp::Uninstall)?;
        let from = record.status;
        let hooks = record.descriptor.hooks();

        if let Some(hooks) = hooks {
            if let Err(err) = hooks.uninstall().await {
                self.record_failure(name, from, LifecycleOp::Uninstall, &err);
                return Err(err.into());
            }
        }
        self.commit(name, from, LifecycleOp::Uninstall.target());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&LifecycleRecord> {
        self.records.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Every record, in registration order.
    pub fn all(&self) -> Vec<&LifecycleRecord> {
        self.records.values().collect()
    }

    /// Names of plugins currently `Active`, in registration order.
    pub fn active_plugins(&self) -> Vec<&str> {
        self.records
            .values()
            .filter(|r| r.status == PluginStatus::Active)
            .map(LifecycleRecord::name)
            .collect()
    }

    /// Every attempted transition so far, oldest first.
    pub fn events(&self) -> &[LifecycleEvent] {
        &self.events
    }

    pub fn events_for(&self, name: &str) -> Vec<&LifecycleEvent> {
        self.events.iter().filter(|e| e.plugin == name).collect()
    }

    /// Resolve the installation order for the current descriptor set
    /// without installing anything.
    pub fn installation_order(&self) -> Result<Vec<String>> {
        let manifests: Vec<&PluginManifest> = self
            .records
            .values()
            .map(|r| r.descriptor.manifest())
            .collect();
        resolver::installation_order(&manifests)
    }

    fn record_for(&self, name: &str) -> Result<&LifecycleRecord> {
        self.records
            .get(name)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))
    }

    fn check_transition(&self, name: &str, op: LifecycleOp) -> Result<&LifecycleRecord> {
        let record = self.record_for(name)?;
        if !op.permits(record.status) {
            return Err(PluginError::InvalidState {
                name: name.to_string(),
                status: record.status,
                op,
            });
        }
        Ok(record)
    }

    fn commit(&mut self, name: &str, from: PluginStatus, to: PluginStatus) {
        if let Some(record) = self.records.get_mut(name) {
            record.status = to;
        }
        info!("plugin '{name}' {from} -> {to}");
        self.events.push(LifecycleEvent {
            plugin: name.to_string(),
            from,
            to,
            error: None,
            at: Utc::now(),
        });
    }

    fn record_failure(
        &mut self,
        name: &str,
        status: PluginStatus,
        op: LifecycleOp,
        error: &anyhow::Error,
    ) {
        warn!("plugin '{name}' {op} hook failed while {status}: {error}");
        self.events.push(LifecycleEvent {
            plugin: name.to_string(),
            from: status,
            to: status,
            error: Some(error.to_string()),
            at: Utc::now(),
        });
    }
}
