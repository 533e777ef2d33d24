//! Children-first ordering of projects for sequencing restores.
//!
//! A project's cached closure lists the build files of every project it
//! reaches. Walking those closures depth first and emitting each project
//! after its children yields an order in which every project is restored
//! only once its references have been.
//!
//! # Example
//!
//! ```
//! use restore_core::cache::{CacheStore, ProjectCacheEntry};
//! use restore_core::graph::{compute_closure, restore_order};
//! use restore_core::ProjectReference;
//!
//! let graph = vec![
//!     ProjectReference::new("app", "/src/app/app.csproj").with_references(["lib"]),
//!     ProjectReference::new("lib", "/src/lib/lib.csproj"),
//! ];
//!
//! let mut store = CacheStore::new();
//! for project in &graph {
//!     let closure = compute_closure(&project.unique_name, &graph);
//!     let entry = ProjectCacheEntry::from_closure(&closure, None);
//!     store.insert(&project.project_path, entry).unwrap();
//! }
//!
//! let order = restore_order(Some(&graph[0]), Some(graph.as_slice()), &store).unwrap();
//! assert_eq!(order[0].unique_name, "lib");
//! assert_eq!(order[1].unique_name, "app");
//! ```

use std::collections::{HashMap, HashSet};

use crate::cache::CacheStore;
use crate::error::{Error, Result};
use crate::reference::ProjectReference;

/// Accumulated state of a children-first walk.
///
/// `Default` gives a fresh state. Reusing one value across several targets
/// orders all of them together without repeating shared children.
#[derive(Debug, Clone, Default)]
pub struct ChildOrder {
    /// Projects in children-first order.
    ordered: Vec<ProjectReference>,
    /// Unique names of `ordered`.
    ordered_names: HashSet<String>,
    /// Unique names already visited.
    seen: HashSet<String>,
}

impl ChildOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ordered(&self) -> &[ProjectReference] {
        &self.ordered
    }

    pub fn is_ordered(&self, project: &ProjectReference) -> bool {
        self.ordered_names.contains(&project.unique_name)
    }

    fn push(&mut self, project: &ProjectReference) {
        if self.ordered_names.insert(project.unique_name.clone()) {
            self.ordered.push(project.clone());
        }
    }

    pub fn into_ordered(self) -> Vec<ProjectReference> {
        self.ordered
    }
}

struct Frame<'a> {
    project: &'a ProjectReference,
    children: Vec<&'a ProjectReference>,
    next: usize,
}

/// Append `target` and every project in its cached closure to `state`,
/// children strictly before parents.
///
/// Closure entries resolve back to projects by build-file path,
/// case-insensitively. Each project is appended at most once and cycles
/// terminate on the seen-name guard. The walk uses an explicit stack.
///
/// # Errors
///
/// `Error::InvalidArgument` when `target` or `all_projects` is absent.
pub fn order_children(
    target: Option<&ProjectReference>,
    all_projects: Option<&[ProjectReference]>,
    cache_store: &CacheStore,
    state: &mut ChildOrder,
) -> Result<()> {
    let all_projects = all_projects.ok_or_else(|| Error::invalid_argument("all_projects"))?;
    let target = target.ok_or_else(|| Error::invalid_argument("target"))?;

    state.seen.insert(target.unique_name.clone());
    if state.is_ordered(target) {
        return Ok(());
    }

    let mut by_build_file: HashMap<String, &ProjectReference> = HashMap::new();
    for project in all_projects {
        by_build_file
            .entry(project.project_path.full_path().case_key())
            .or_insert(project);
    }

    // The target may not be in `all_projects`; its children must be.
    let mut stack = vec![Frame {
        project: target,
        children: children_of(target, cache_store, &by_build_file),
        next: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        if let Some(child) = frame.children.get(frame.next).copied() {
            frame.next += 1;
            if !state.is_ordered(child) && state.seen.insert(child.unique_name.clone()) {
                stack.push(Frame {
                    project: child,
                    children: children_of(child, cache_store, &by_build_file),
                    next: 0,
                });
            }
        } else if let Some(done) = stack.pop() {
            tracing::trace!(project = %done.project.unique_name, "ordered project");
            state.push(done.project);
        }
    }

    Ok(())
}

/// Projects named by `project`'s cached closure, in closure order.
fn children_of<'a>(
    project: &ProjectReference,
    cache_store: &CacheStore,
    by_build_file: &HashMap<String, &'a ProjectReference>,
) -> Vec<&'a ProjectReference> {
    cache_store
        .get(&project.project_path)
        .map(|entry| {
            entry
                .reference_closure()
                .iter()
                .filter_map(|path| by_build_file.get(&path.full_path().case_key()).copied())
                .collect()
        })
        .unwrap_or_default()
}

/// Children-first order of `target`'s closure, from a fresh state.
pub fn restore_order(
    target: Option<&ProjectReference>,
    all_projects: Option<&[ProjectReference]>,
    cache_store: &CacheStore,
) -> Result<Vec<ProjectReference>> {
    let mut state = ChildOrder::new();
    order_children(target, all_projects, cache_store, &mut state)?;
    Ok(state.into_ordered())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ProjectCacheEntry;
    use pretty_assertions::assert_eq;

    fn project(name: &str) -> ProjectReference {
        ProjectReference::new(name, format!("/work/{name}/{name}.csproj"))
            .with_manifest_path(format!("/work/{name}/project.json"))
    }

    fn names(order: &[ProjectReference]) -> Vec<&str> {
        order.iter().map(|p| p.unique_name.as_str()).collect()
    }

    /// Store whose entries list the given closures verbatim.
    fn store(entries: &[(&ProjectReference, Vec<&ProjectReference>)]) -> CacheStore {
        let mut store = CacheStore::new();
        for (project, closure) in entries {
            let entry = ProjectCacheEntry::from_closure(closure.iter().copied(), None);
            store.insert(&project.project_path, entry).unwrap();
        }
        store
    }

    #[test]
    fn test_multiple_child_hierarchy() {
        let (p1, a, b, c) = (project("project1"), project("a"), project("b"), project("c"));
        let store = store(&[
            (&p1, vec![&a, &b, &c]),
            (&a, vec![&b, &c]),
            (&b, vec![&c]),
            (&c, vec![]),
        ]);
        let projects = vec![p1.clone(), a, b, c];

        let order = restore_order(Some(&p1), Some(projects.as_slice()), &store).unwrap();
        assert_eq!(names(&order), vec!["c", "b", "a", "project1"]);
    }

    #[test]
    fn test_single_child() {
        let (p1, a) = (project("project1"), project("a"));
        let store = store(&[(&p1, vec![&p1, &a]), (&a, vec![&a])]);
        let projects = vec![p1.clone(), a];

        let order = restore_order(Some(&p1), Some(projects.as_slice()), &store).unwrap();
        assert_eq!(names(&order), vec!["a", "project1"]);
    }

    #[test]
    fn test_no_child() {
        let p1 = project("project1");
        let store = store(&[(&p1, vec![&p1])]);
        let projects = vec![p1.clone()];

        let order = restore_order(Some(&p1), Some(projects.as_slice()), &store).unwrap();
        assert_eq!(names(&order), vec!["project1"]);
    }

    #[test]
    fn test_cycle_terminates() {
        let (a, b) = (project("a"), project("b"));
        let store = store(&[(&a, vec![&a, &b]), (&b, vec![&b, &a])]);
        let projects = vec![a.clone(), b];

        let order = restore_order(Some(&a), Some(projects.as_slice()), &store).unwrap();
        assert_eq!(names(&order), vec!["b", "a"]);
    }

    #[test]
    fn test_shared_state_across_targets() {
        let (app, tool, lib) = (project("app"), project("tool"), project("lib"));
        let store = store(&[
            (&app, vec![&app, &lib]),
            (&tool, vec![&tool, &lib]),
            (&lib, vec![&lib]),
        ]);
        let projects = vec![app.clone(), tool.clone(), lib];

        let mut state = ChildOrder::new();
        order_children(Some(&app), Some(projects.as_slice()), &store, &mut state).unwrap();
        order_children(Some(&tool), Some(projects.as_slice()), &store, &mut state).unwrap();
        order_children(Some(&app), Some(projects.as_slice()), &store, &mut state).unwrap();

        assert_eq!(names(state.ordered()), vec!["lib", "app", "tool"]);
        assert!(state.is_ordered(&project("lib")));
        assert!(!state.is_ordered(&project("other")));
    }

    #[test]
    fn test_long_chain_orders_every_project_once() {
        let chain: Vec<ProjectReference> = (0..2000)
            .map(|i| project(&format!("p{i:04}")))
            .collect();
        // Each project's closure lists itself and the next link.
        let entries: Vec<(&ProjectReference, Vec<&ProjectReference>)> = chain
            .iter()
            .enumerate()
            .map(|(i, p)| (p, chain[i..(i + 2).min(chain.len())].iter().collect()))
            .collect();
        let store = store(&entries);

        let mut state = ChildOrder::new();
        order_children(Some(&chain[0]), Some(chain.as_slice()), &store, &mut state).unwrap();
        order_children(Some(&chain[1000]), Some(chain.as_slice()), &store, &mut state).unwrap();

        let order = state.into_ordered();
        assert_eq!(order.len(), chain.len());
        assert_eq!(order[0].unique_name, "p1999");
        assert_eq!(order[1999].unique_name, "p0000");
    }

    #[test]
    fn test_closure_resolves_build_files_case_insensitively() {
        let app = project("app");
        let lib = project("lib");
        let mut shouting = lib.clone();
        shouting.project_path = restore_fs::NormalizedPath::new("/WORK/LIB/LIB.CSPROJ");
        shouting.manifest_path = None;

        let store = store(&[(&app, vec![&app, &shouting])]);
        let projects = vec![app.clone(), lib];

        let order = restore_order(Some(&app), Some(projects.as_slice()), &store).unwrap();
        assert_eq!(names(&order), vec!["lib", "app"]);
    }

    #[test]
    fn test_requires_inputs() {
        let a = project("a");
        let store = CacheStore::new();
        let projects = vec![a.clone()];

        let err = restore_order(None, Some(projects.as_slice()), &store).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { name: "target" }));

        let err = restore_order(Some(&a), None, &store).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { name: "all_projects" }));
    }
}
