//! src/catalog/dependency.rs
//! Fetch direct view dependencies via pg_depend + pg_rewrite
use super::id::{CatalogObject, DependencyEdge, QualifiedName, RelationKind};
use super::utils::is_system_schema;
use crate::error::PlanError;
use anyhow::{Context, Result};
use sqlx::PgConnection;
use sqlx::postgres::types::Oid;
use tracing::debug;

/// One direct dependency between two relations, exactly as read from the catalog.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RawDependencyRow {
    pub dependent_schema: String,
    pub dependent_name: String,
    pub dependent_oid: Oid,
    pub dependent_kind: String,
    pub source_schema: String,
    pub source_name: String,
    pub source_oid: Oid,
    pub source_kind: String,
}

impl RawDependencyRow {
    pub fn into_edge(self) -> Result<DependencyEdge, PlanError> {
        let dependent_kind = RelationKind::from_code(
            &self.dependent_kind,
            &format!("{}.{}", self.dependent_schema, self.dependent_name),
        )?;
        let source_kind = RelationKind::from_code(
            &self.source_kind,
            &format!("{}.{}", self.source_schema, self.source_name),
        )?;

        Ok(DependencyEdge::new(
            CatalogObject::new(
                self.source_schema,
                self.source_name,
                source_kind,
                self.source_oid.0,
            ),
            CatalogObject::new(
                self.dependent_schema,
                self.dependent_name,
                dependent_kind,
                self.dependent_oid.0,
            ),
        ))
    }
}

/// A relation whose schema and name match the requested target.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RawRelationRow {
    pub schema: String,
    pub name: String,
    pub oid: Oid,
    pub kind: String,
}

impl RawRelationRow {
    pub fn into_object(self) -> Result<CatalogObject, PlanError> {
        let kind = RelationKind::from_code(&self.kind, &format!("{}.{}", self.schema, self.name))?;
        Ok(CatalogObject::new(self.schema, self.name, kind, self.oid.0))
    }
}

const DEPENDENCY_EDGES_SQL: &str = r#"
    SELECT DISTINCT
      dependent_ns.nspname::text  AS dependent_schema,
      dependent.relname::text     AS dependent_name,
      dependent.oid               AS dependent_oid,
      dependent.relkind::text     AS dependent_kind,
      source_ns.nspname::text     AS source_schema,
      source.relname::text        AS source_name,
      source.oid                  AS source_oid,
      source.relkind::text        AS source_kind
    FROM pg_depend d
    JOIN pg_rewrite r
      ON d.classid = 'pg_rewrite'::regclass::oid
     AND d.objid   = r.oid
    JOIN pg_class dependent
      ON r.ev_class = dependent.oid
    JOIN pg_namespace dependent_ns
      ON dependent.relnamespace = dependent_ns.oid
    JOIN pg_class source
      ON d.refclassid = 'pg_class'::regclass::oid
     AND d.refobjid   = source.oid
    JOIN pg_namespace source_ns
      ON source.relnamespace = source_ns.oid
    WHERE source.oid <> dependent.oid
      AND dependent.relkind IN ('v', 'm')
      AND source.relkind IN ('v', 'm')
    ORDER BY source_schema, source_name, dependent_schema, dependent_name
"#;

/// Fetch every direct view/materialized-view dependency outside system schemas.
///
/// Only direct edges are read; the transitive closure is computed in memory.
pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<RawDependencyRow>> {
    let rows: Vec<RawDependencyRow> = sqlx::query_as(DEPENDENCY_EDGES_SQL)
        .fetch_all(&mut *conn)
        .await
        .context("Failed to read view dependencies from pg_depend")?;

    let total = rows.len();
    let rows: Vec<RawDependencyRow> = rows
        .into_iter()
        .filter(|row| {
            !is_system_schema(&row.dependent_schema) && !is_system_schema(&row.source_schema)
        })
        .collect();

    debug!(
        "Read {} dependency edges ({} involving system schemas skipped)",
        rows.len(),
        total - rows.len()
    );

    Ok(rows)
}

/// Fetch every relation, of any kind, named `name`.
pub async fn fetch_relations_named(
    conn: &mut PgConnection,
    name: &QualifiedName,
) -> Result<Vec<RawRelationRow>> {
    sqlx::query_as(
        r#"
        SELECT
          n.nspname::text  AS schema,
          c.relname::text  AS name,
          c.oid            AS oid,
          c.relkind::text  AS kind
        FROM pg_class c
        JOIN pg_namespace n
          ON c.relnamespace = n.oid
        WHERE n.nspname = $1
          AND c.relname = $2
        ORDER BY c.oid
        "#,
    )
    .bind(&name.schema)
    .bind(&name.name)
    .fetch_all(&mut *conn)
    .await
    .with_context(|| format!("Failed to look up relation {}", name))
}
