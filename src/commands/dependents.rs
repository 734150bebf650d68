//! Show which relations a rebuild of the target would touch, without
//! fetching any definitions.

use crate::catalog::Catalog;
use crate::catalog::id::{CatalogObject, DependencyEdge, QualifiedName};
use crate::config::Config;
use crate::db::{begin_snapshot, connect_to_database};
use crate::error::PlanError;
use crate::plan::{DependencyGraph, order};
use anyhow::{Context, Result};
use console::style;
use petgraph::dot::{Config as DotConfig, Dot};
use petgraph::graph::DiGraph;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DependentsFormat {
    /// Human-readable list in rebuild order
    #[default]
    Text,
    /// JSON output for piping to jq
    Json,
    /// Graphviz DOT
    Dot,
}

#[derive(Debug, Serialize)]
pub struct DependentsReport {
    pub target: CatalogObject,
    /// Transitive dependents, least dependent first
    pub rebuild_order: Vec<CatalogObject>,
    /// Direct edges among the target and its dependents
    pub edges: Vec<DependencyEdge>,
}

pub async fn cmd_dependents(config: &Config, target: &str, format: DependentsFormat) -> Result<()> {
    let target: QualifiedName = target.parse()?;

    let options = config.database.connect_options()?;
    let pool = connect_to_database(options, "database").await?;
    let mut tx = begin_snapshot(&pool).await?;
    let catalog = Catalog::load(&mut *tx, &target).await?;
    tx.rollback().await.context("Failed to end catalog transaction")?;
    pool.close().await;

    let object = catalog.resolve_target(&target)?;
    let report = dependents_report(&catalog, &object)?;

    let output = match format {
        DependentsFormat::Text => render_text(&report),
        DependentsFormat::Json => serde_json::to_string_pretty(&report)?,
        DependentsFormat::Dot => render_dot(&report),
    };
    println!("{}", output);

    Ok(())
}

pub fn dependents_report(
    catalog: &Catalog,
    target: &CatalogObject,
) -> Result<DependentsReport, PlanError> {
    let graph = DependencyGraph::from_edges(&catalog.edges);
    let rebuild_order = order(&graph, target)?;

    let members: BTreeSet<&CatalogObject> =
        rebuild_order.iter().chain(std::iter::once(target)).collect();
    let edges: BTreeSet<DependencyEdge> = catalog
        .edges
        .iter()
        .filter(|e| members.contains(&e.source) && members.contains(&e.dependent))
        .cloned()
        .collect();

    Ok(DependentsReport {
        target: target.clone(),
        rebuild_order,
        edges: edges.into_iter().collect(),
    })
}

pub fn render_text(report: &DependentsReport) -> String {
    let mut lines = vec![style(report.target.describe()).bold().to_string()];

    if report.rebuild_order.is_empty() {
        lines.push("  (no dependent relations)".to_string());
        return lines.join("\n");
    }

    lines.push(format!(
        "{} dependent relation(s), in rebuild order:",
        report.rebuild_order.len()
    ));
    for (i, object) in report.rebuild_order.iter().enumerate() {
        lines.push(format!("  {:>3}. {}", i + 1, object.describe()));
    }

    lines.join("\n")
}

pub fn render_dot(report: &DependentsReport) -> String {
    let mut graph: DiGraph<String, &str> = DiGraph::new();
    let mut nodes = HashMap::new();

    for object in std::iter::once(&report.target).chain(report.rebuild_order.iter()) {
        nodes.insert(object, graph.add_node(object.to_string()));
    }
    for edge in &report.edges {
        if let (Some(&source), Some(&dependent)) =
            (nodes.get(&edge.source), nodes.get(&edge.dependent))
        {
            graph.add_edge(source, dependent, "");
        }
    }

    format!("{}", Dot::with_config(&graph, &[DotConfig::EdgeNoLabel]))
}
