use crate::catalog::dependency::{RawDependencyRow, RawRelationRow};
use crate::catalog::id::{CatalogObject, DependencyEdge, QualifiedName};
use crate::error::PlanError;
use sqlx::PgConnection;
use std::collections::BTreeSet;
use tracing::info;

pub mod column;
pub mod definition;
pub mod dependency;
pub mod grant;
pub mod id;
pub mod index;
pub mod trigger;
pub mod utils;

/// The slice of the catalog a single planning run works from: every direct
/// view dependency, plus the relations that share the target's name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub edges: Vec<DependencyEdge>,
    pub relations: Vec<CatalogObject>,
}

impl Catalog {
    /// Read dependency edges and target candidates over one connection.
    ///
    /// Run this inside the same transaction as the later definition fetches
    /// so both see one snapshot of the schema.
    pub async fn load(conn: &mut PgConnection, target: &QualifiedName) -> anyhow::Result<Self> {
        let rows = dependency::fetch(&mut *conn).await?;
        let relations = dependency::fetch_relations_named(&mut *conn, target).await?;
        let catalog = Self::from_rows(rows, relations)?;

        info!(
            "Loaded {} view dependencies across {} relations",
            catalog.edges.len(),
            catalog.objects().len()
        );
        Ok(catalog)
    }

    /// Build a catalog from raw rows, rejecting relation kinds that cannot be rebuilt.
    pub fn from_rows(
        rows: Vec<RawDependencyRow>,
        relations: Vec<RawRelationRow>,
    ) -> Result<Self, PlanError> {
        let edges = rows
            .into_iter()
            .map(RawDependencyRow::into_edge)
            .collect::<Result<Vec<_>, _>>()?;
        let relations = relations
            .into_iter()
            .map(RawRelationRow::into_object)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { edges, relations })
    }

    pub fn from_edges(edges: Vec<DependencyEdge>) -> Self {
        Self {
            edges,
            relations: Vec::new(),
        }
    }

    /// Every distinct object seen in an edge or looked up by name.
    pub fn objects(&self) -> BTreeSet<&CatalogObject> {
        self.edges
            .iter()
            .flat_map(|e| [&e.source, &e.dependent])
            .chain(self.relations.iter())
            .collect()
    }

    /// Resolve `target` to exactly one known object.
    pub fn resolve_target(&self, target: &QualifiedName) -> Result<CatalogObject, PlanError> {
        let candidates: Vec<CatalogObject> = self
            .objects()
            .into_iter()
            .filter(|o| o.matches(target))
            .cloned()
            .collect();

        match candidates.as_slice() {
            [only] => Ok(only.clone()),
            _ => Err(PlanError::AmbiguousOrMissingTarget {
                target: target.to_string(),
                count: candidates.len(),
                candidates,
            }),
        }
    }
}
