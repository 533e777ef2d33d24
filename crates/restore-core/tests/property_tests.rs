use proptest::prelude::*;
use restore_core::cache::{CacheStore, ProjectCacheEntry};
use restore_core::{ProjectReference, cache_has_changes, compute_closure, restore_order};
use std::collections::{HashMap, HashSet};

fn name(index: usize) -> String {
    format!("p{index}")
}

fn build_graph(edges: &[Vec<usize>], reverse: bool) -> Vec<ProjectReference> {
    edges
        .iter()
        .enumerate()
        .map(|(i, targets)| {
            let mut refs: Vec<String> = targets.iter().map(|t| name(*t)).collect();
            if reverse {
                refs.reverse();
            }
            ProjectReference::new(name(i), format!("/src/{i}/{i}.csproj"))
                .with_manifest_path(format!("/src/{i}/project.json"))
                .with_references(refs)
        })
        .collect()
}

/// Arbitrary graphs, cycles and dangling names allowed.
fn any_graph() -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1usize..10).prop_flat_map(|n| prop::collection::vec(prop::collection::vec(0..n + 2, 0..4), n))
}

/// Acyclic graphs: edges only point to higher indices.
fn acyclic_graph() -> impl Strategy<Value = Vec<Vec<usize>>> {
    any_graph().prop_map(|edges| {
        let n = edges.len();
        edges
            .into_iter()
            .enumerate()
            .map(|(i, targets)| targets.into_iter().filter(|t| *t > i && *t < n).collect())
            .collect()
    })
}

fn store_for(graph: &[ProjectReference]) -> CacheStore {
    let mut store = CacheStore::new();
    for project in graph {
        let closure = compute_closure(&project.unique_name, graph);
        store
            .insert(&project.project_path, ProjectCacheEntry::from_closure(&closure, None))
            .unwrap();
    }
    store
}

proptest! {
    #[test]
    fn test_closure_contains_root_and_is_closed(edges in any_graph()) {
        let graph = build_graph(&edges, false);
        let closure = compute_closure("p0", &graph);
        prop_assert!(closure.contains("p0"));

        // Every member's closure stays inside the root's closure
        for member in &closure {
            let inner = compute_closure(&member.unique_name, &graph);
            prop_assert!(inner.is_subset(&closure));
        }
    }

    #[test]
    fn test_closure_ignores_reference_order(edges in any_graph()) {
        let forward = build_graph(&edges, false);
        let backward = build_graph(&edges, true);
        for project in &forward {
            prop_assert_eq!(
                compute_closure(&project.unique_name, &forward),
                compute_closure(&project.unique_name, &backward)
            );
        }
    }

    #[test]
    fn test_store_is_reflexive(edges in any_graph()) {
        let store = store_for(&build_graph(&edges, false));
        prop_assert!(!cache_has_changes(&store, &store));
    }

    #[test]
    fn test_order_places_children_first(edges in acyclic_graph()) {
        let graph = build_graph(&edges, false);
        let store = store_for(&graph);
        let order = restore_order(Some(&graph[0]), Some(graph.as_slice()), &store).unwrap();

        let names: Vec<&str> = order.iter().map(|p| p.unique_name.as_str()).collect();
        let unique: HashSet<&str> = names.iter().copied().collect();
        prop_assert_eq!(unique.len(), names.len());

        let closure: HashSet<String> = compute_closure("p0", &graph)
            .into_iter()
            .map(|p| p.unique_name)
            .collect();
        prop_assert_eq!(unique.len(), closure.len());
        prop_assert_eq!(names.last().copied(), Some("p0"));

        let position: HashMap<&str, usize> =
            names.iter().enumerate().map(|(i, n)| (*n, i)).collect();
        for project in &order {
            for child in &project.direct_references {
                if let Some(child_position) = position.get(child.as_str()) {
                    prop_assert!(*child_position < position[project.unique_name.as_str()]);
                }
            }
        }
    }

    #[test]
    fn test_order_terminates_on_cycles(edges in any_graph()) {
        let graph = build_graph(&edges, false);
        let store = store_for(&graph);
        let order = restore_order(Some(&graph[0]), Some(graph.as_slice()), &store).unwrap();

        let unique: HashSet<&str> = order.iter().map(|p| p.unique_name.as_str()).collect();
        prop_assert_eq!(unique.len(), order.len());
    }
}
