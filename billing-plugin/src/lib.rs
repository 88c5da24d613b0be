pub mod descriptor;
pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod resolver;
pub mod sdk;

// Re-export the types consumers wire up at application bootstrap.
pub use descriptor::{PluginDescriptor, PluginHooks, PluginManifest};
pub use error::{PluginError, Result};
pub use lifecycle::{LifecycleEvent, LifecycleOp, LifecycleRecord, PluginStatus};
pub use registry::PluginRegistry;
pub use resolver::installation_order;
pub use sdk::{ComponentLoader, PlatformSdk, RouteEntry, StoreDefinition};
