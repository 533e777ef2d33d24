//! Closure, parents and order commands

use restore_core::{ChildOrder, ReferenceCache, get_parents, order_children};
use std::path::Path;

use super::print_names;
use crate::context::GraphContext;
use crate::error::Result;

/// Run the closure command
pub fn run_closure(dg_spec: &Path, project: &str, json: bool) -> Result<()> {
    let ctx = GraphContext::load(dg_spec)?;
    ctx.find(project)?;

    let closure = ctx.spec.closure(project)?;
    print_names(&format!("Closure of {project}"), &closure, json)
}

/// Run the parents command
pub async fn run_parents(dg_spec: &Path, project: &str, json: bool) -> Result<()> {
    let ctx = GraphContext::load(dg_spec)?;
    let target = ctx.find(project)?;

    let mut session = ReferenceCache::new();
    let store = ctx.snapshot(&mut session).await?;
    let parents = get_parents(Some(target), Some(ctx.graph.as_slice()), Some(&store))?;

    print_names(&format!("Parents of {project}"), &parents, json)
}

/// Run the order command
pub async fn run_order(dg_spec: &Path, projects: &[String], json: bool) -> Result<()> {
    let ctx = GraphContext::load(dg_spec)?;
    let roots = if projects.is_empty() {
        ctx.spec.restore.clone()
    } else {
        projects.to_vec()
    };

    let mut session = ReferenceCache::new();
    let store = ctx.snapshot(&mut session).await?;

    let mut state = ChildOrder::new();
    for root in &roots {
        let target = ctx.find(root)?;
        order_children(Some(target), Some(ctx.graph.as_slice()), &store, &mut state)?;
    }

    print_names("Restore order", &state.into_ordered(), json)
}
