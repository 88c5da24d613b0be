use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::sdk::PlatformSdk;

/// Static identity and dependency declaration for a plugin.
///
/// Manifests are supplied by external packaging (descriptor files read at
/// process start); the runtime never constructs one itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    pub name: String,
    pub version: String,
    /// Names of plugins this one depends on. Order is not significant.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl PluginManifest {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }
}

/// Lifecycle hooks a plugin may implement.
///
/// Every method defaults to an immediate no-op success, so a plugin only
/// implements the phases it cares about. Hooks may be synchronous or may
/// suspend; the registry awaits each one to completion before touching
/// status. A returned error aborts the transition.
#[async_trait]
pub trait PluginHooks: Send + Sync {
    /// Runs once during installation with the shared capability namespace.
    /// Registrations made here are visible to every plugin installed later
    /// in the same batch.
    async fn install(&self, _sdk: &mut PlatformSdk) -> anyhow::Result<()> {
        Ok(())
    }

    async fn activate(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn deactivate(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn uninstall(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// A plugin as handed to the registry: identity plus optional behavior.
///
/// Descriptors are immutable once registered. A descriptor without hooks is
/// valid; all of its lifecycle phases succeed trivially.
#[derive(Clone)]
pub struct PluginDescriptor {
    manifest: PluginManifest,
    hooks: Option<Arc<dyn PluginHooks>>,
}

impl PluginDescriptor {
    pub fn new(manifest: PluginManifest) -> Self {
        Self {
            manifest,
            hooks: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn PluginHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn version(&self) -> &str {
        &self.manifest.version
    }

    pub fn dependencies(&self) -> &[String] {
        &self.manifest.dependencies
    }

    pub(crate) fn hooks(&self) -> Option<Arc<dyn PluginHooks>> {
        self.hooks.clone()
    }
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("manifest", &self.manifest)
            .field("hooks", &self.hooks.as_ref().map(|_| ".."))
            .finish()
    }
}
