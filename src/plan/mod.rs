//! Ordering engine: from dependency edges to an ordered drop/create plan.

pub mod action;
pub mod definition;
pub mod graph;

pub use action::{Action, ActionKind, Plan, plan};
pub use definition::{Definition, DefinitionProvider, Definitions, collect_definitions};
pub use graph::{DependencyGraph, NodeIndex, descendants, topological_order};

use crate::catalog::Catalog;
use crate::catalog::id::CatalogObject;
use crate::error::PlanError;
use tracing::{debug, info};

/// Topologically order every relation that transitively depends on `target`.
///
/// The target itself is never part of the result. A target absent from the
/// graph simply has no dependents.
pub fn order(graph: &DependencyGraph, target: &CatalogObject) -> Result<Vec<CatalogObject>, PlanError> {
    let Some(start) = graph.node_index(target) else {
        debug!("{} has no recorded dependencies", target);
        return Ok(Vec::new());
    };

    // A cycle through the target puts the target in its own descendant set,
    // which the sort below rejects along with any other cycle.
    let nodes = descendants(graph, start);
    debug!("{} has {} transitive dependents", target, nodes.len());

    let sorted = topological_order(graph, &nodes).map_err(|cycle| PlanError::CyclicDependency {
        target: target.clone(),
        cycle: cycle.into_iter().map(|n| graph.object(n).clone()).collect(),
    })?;

    Ok(sorted
        .into_iter()
        .filter(|&n| n != start)
        .map(|n| graph.object(n).clone())
        .collect())
}

/// Build the rebuild plan for `target` from everything in `catalog`.
pub fn build_plan(catalog: &Catalog, target: &CatalogObject) -> Result<Plan, PlanError> {
    let graph = DependencyGraph::from_edges(&catalog.edges);
    let topo_order = order(&graph, target)?;
    let plan = plan(&topo_order, target);

    info!(
        "Planned rebuild of {}: {} dependent relation{}",
        target.describe(),
        plan.dependent_count(),
        if plan.dependent_count() == 1 { "" } else { "s" }
    );
    Ok(plan)
}
