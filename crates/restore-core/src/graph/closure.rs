//! Closure, direct-reference and parent queries.

use std::collections::{HashMap, HashSet};

use crate::cache::CacheStore;
use crate::error::{Error, Result};
use crate::reference::ProjectReference;

/// Index a graph by unique name. The first node with a given name wins.
fn index_by_name(graph: &[ProjectReference]) -> HashMap<&str, &ProjectReference> {
    let mut index = HashMap::with_capacity(graph.len());
    for project in graph {
        index.entry(project.unique_name.as_str()).or_insert(project);
    }
    index
}

/// All projects reachable from `root_name`, the root included.
///
/// Returns an empty set when the root is not in `graph`. Reference names
/// with no matching node are skipped.
pub fn compute_closure(root_name: &str, graph: &[ProjectReference]) -> HashSet<ProjectReference> {
    let index = index_by_name(graph);
    let mut closure = HashSet::new();

    let Some(root) = index.get(root_name).copied() else {
        tracing::debug!(project = root_name, "closure root not found in graph");
        return closure;
    };

    closure.insert(root.clone());
    let mut pending = vec![root];

    while let Some(project) = pending.pop() {
        for name in &project.direct_references {
            match index.get(name.as_str()).copied() {
                Some(child) => {
                    if closure.insert(child.clone()) {
                        pending.push(child);
                    }
                }
                None => tracing::debug!(
                    project = %project.unique_name,
                    reference = %name,
                    "skipping unresolved project reference"
                ),
            }
        }
    }

    closure
}

/// The first-level references of `root_name` that exist in `graph`.
pub fn compute_direct_references(
    root_name: &str,
    graph: &[ProjectReference],
) -> HashSet<ProjectReference> {
    let index = index_by_name(graph);

    let Some(root) = index.get(root_name).copied() else {
        return HashSet::new();
    };

    root.direct_references
        .iter()
        .filter_map(|name| index.get(name.as_str()).map(|p| (*p).clone()))
        .collect()
}

/// Projects whose cached closure contains `target`'s manifest.
///
/// The target itself is never reported. Paths compare case-insensitively
/// after resolving to full paths. Results are sorted by unique name.
///
/// # Errors
///
/// `Error::InvalidArgument` when any input is absent.
pub fn get_parents(
    target: Option<&ProjectReference>,
    all_projects: Option<&[ProjectReference]>,
    cache_store: Option<&CacheStore>,
) -> Result<Vec<ProjectReference>> {
    let all_projects = all_projects.ok_or_else(|| Error::invalid_argument("all_projects"))?;
    let target = target.ok_or_else(|| Error::invalid_argument("target"))?;
    let cache_store = cache_store.ok_or_else(|| Error::invalid_argument("cache_store"))?;

    let Some(target_manifest) = target.manifest_path.as_ref() else {
        tracing::debug!(project = %target.unique_name, "target has no manifest, no parents");
        return Ok(Vec::new());
    };
    let target_key = target_manifest.full_path().case_key();

    let mut parents: Vec<ProjectReference> = all_projects
        .iter()
        .filter(|project| *project != target)
        .filter(|project| {
            cache_store.get(&project.project_path).is_some_and(|entry| {
                entry
                    .reference_closure()
                    .iter()
                    .any(|path| path.full_path().case_key() == target_key)
            })
        })
        .cloned()
        .collect();

    parents.sort();
    parents.dedup();
    Ok(parents)
}
