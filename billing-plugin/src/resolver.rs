use std::collections::HashMap;

use tracing::debug;

use crate::descriptor::PluginManifest;
use crate::error::{PluginError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Visited,
}

/// Compute an installation order over the given manifests.
///
/// Depth-first topological sort: every dependency precedes each of its
/// dependents, a dependency shared by several plugins appears exactly once,
/// and plugins with no ordering constraint between them keep their input
/// order. Dependencies naming plugins outside the set contribute no edge.
///
/// Fails with `CircularDependency` naming the cycle path if the graph has a
/// self-reference or a longer cycle; no partial order is returned.
///
/// The adjacency view is rebuilt from the manifests on every call. Nothing
/// is cached on the descriptors, so the set may change between calls.
pub fn installation_order(manifests: &[&PluginManifest]) -> Result<Vec<String>> {
    let by_name: HashMap<&str, &PluginManifest> = manifests
        .iter()
        .map(|manifest| (manifest.name.as_str(), *manifest))
        .collect();

    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut path: Vec<&str> = Vec::new();
    let mut order: Vec<String> = Vec::with_capacity(manifests.len());

    for manifest in manifests {
        visit(&manifest.name, &by_name, &mut marks, &mut path, &mut order)?;
    }

    debug!("resolved installation order: {order:?}");
    Ok(order)
}

fn visit<'a>(
    name: &'a str,
    by_name: &HashMap<&'a str, &'a PluginManifest>,
    marks: &mut HashMap<&'a str, Mark>,
    path: &mut Vec<&'a str>,
    order: &mut Vec<String>,
) -> Result<()> {
    match marks.get(name) {
        Some(Mark::Visited) => return Ok(()),
        Some(Mark::Visiting) => {
            // Reached a node already on the active path: the slice from its
            // first occurrence, closed with the node itself, is the cycle.
            let start = path.iter().position(|n| *n == name).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
            cycle.push(name.to_string());
            return Err(PluginError::CircularDependency { cycle });
        }
        None => {}
    }

    let Some(manifest) = by_name.get(name) else {
        // Unknown names carry no ordering information.
        return Ok(());
    };

    marks.insert(name, Mark::Visiting);
    path.push(name);
    for dep in &manifest.dependencies {
        visit(dep, by_name, marks, path, order)?;
    }
    path.pop();
    marks.insert(name, Mark::Visited);
    order.push(name.to_string());
    Ok(())
}
