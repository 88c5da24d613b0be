use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Lazily evaluated factory for a registered UI component.
///
/// The loader runs when the host application materializes the component,
/// not at registration time; it produces the JSON payload the view layer
/// renders from.
pub type ComponentLoader = Arc<dyn Fn() -> Value + Send + Sync>;

/// A routable view contributed by a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub path: String,
    pub name: String,
    /// Name of the registered component that renders this route.
    pub view: String,
}

impl RouteEntry {
    pub fn new(path: impl Into<String>, name: impl Into<String>, view: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            view: view.into(),
        }
    }
}

/// Definition of an isolated data store contributed by a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDefinition {
    pub initial_state: Value,
}

impl StoreDefinition {
    pub fn new(initial_state: Value) -> Self {
        Self { initial_state }
    }
}

/// The shared capability namespace handed to every plugin's install hook.
///
/// One instance is threaded through a whole installation pass, so each
/// mutation is immediately visible to plugins installed later in the pass.
/// There is no snapshot isolation; composable plugins build on each other's
/// registrations.
///
/// Collision policy is per collection: components and stores are
/// last-writer-wins keyed inserts, routes are appended unconditionally and
/// never deduplicated. Ambiguity between colliding routes is the owning
/// application's router's to resolve; nothing a plugin registered is
/// silently dropped.
#[derive(Default)]
pub struct PlatformSdk {
    components: IndexMap<String, ComponentLoader>,
    routes: Vec<RouteEntry>,
    stores: IndexMap<String, StoreDefinition>,
}

impl PlatformSdk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component loader under `name`. A later registration with
    /// the same name overwrites the earlier one without error.
    pub fn add_component(&mut self, name: impl Into<String>, loader: ComponentLoader) {
        let name = name.into();
        if self.components.insert(name.clone(), loader).is_some() {
            debug!("component '{name}' overwritten by a later registration");
        }
    }

    /// Append a route. Colliding paths or names are kept as separate
    /// entries, in registration order.
    pub fn add_route(&mut self, route: RouteEntry) {
        self.routes.push(route);
    }

    /// Register a store definition under `id`. Same last-writer-wins policy
    /// as components.
    pub fn create_store(&mut self, id: impl Into<String>, definition: StoreDefinition) {
        let id = id.into();
        if self.stores.insert(id.clone(), definition).is_some() {
            debug!("store '{id}' overwritten by a later registration");
        }
    }

    /// Live view of the registered components. Contents change as later
    /// plugins install.
    pub fn components(&self) -> &IndexMap<String, ComponentLoader> {
        &self.components
    }

    pub fn component(&self, name: &str) -> Option<&ComponentLoader> {
        self.components.get(name)
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    pub fn stores(&self) -> &IndexMap<String, StoreDefinition> {
        &self.stores
    }

    pub fn store(&self, id: &str) -> Option<&StoreDefinition> {
        self.stores.get(id)
    }
}

impl fmt::Debug for PlatformSdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformSdk")
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .field("routes", &self.routes)
            .field("stores", &self.stores.keys().collect::<Vec<_>>())
            .finish()
    }
}
