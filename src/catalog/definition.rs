//! Reconstruct the creation text of a view or materialized view from the catalog
use super::column::{self, ColumnDetail};
use super::grant::{self, Grant};
use super::id::{CatalogObject, RelationKind};
use super::{index, trigger};
use crate::plan::definition::{Definition, DefinitionProvider};
use crate::render::definition::render_definition_body;
use anyhow::{Context, Result};
use sqlx::PgConnection;
use sqlx::postgres::types::Oid;
use tracing::debug;

/// Everything needed to recreate a relation exactly as it currently exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDefinition {
    /// Defining query as returned by `pg_get_viewdef`.
    pub query: String,
    /// `reloptions` entries as stored, e.g. `security_barrier=true` or `check_option=local`.
    pub options: Vec<String>,
    pub owner: String,
    /// Relation grants first, then column grants.
    pub grants: Vec<Grant>,
    /// Index definitions; only materialized views carry indexes.
    pub indexes: Vec<String>,
    pub triggers: Vec<String>,
    pub rules: Vec<String>,
    pub comment: Option<String>,
    pub columns: Vec<ColumnDetail>,
}

impl RelationDefinition {
    /// Options for the `WITH (...)` clause. The check option is rendered after the query instead.
    pub fn create_options(&self) -> Vec<String> {
        self.options
            .iter()
            .filter(|o| !o.starts_with("check_option="))
            .cloned()
            .collect()
    }

    /// `LOCAL` or `CASCADED` when the view was created `WITH ... CHECK OPTION`.
    pub fn check_option(&self) -> Option<String> {
        self.options
            .iter()
            .find_map(|o| o.strip_prefix("check_option="))
            .map(str::to_uppercase)
    }
}

#[derive(sqlx::FromRow)]
struct RawDefinition {
    query: String,
    options: Vec<String>,
    owner: String,
    comment: Option<String>,
}

/// Fetch the definition of `object`, or `None` when no relation with its oid,
/// schema, name and kind exists any more.
pub async fn fetch(
    conn: &mut PgConnection,
    object: &CatalogObject,
) -> Result<Option<RelationDefinition>> {
    let raw: Option<RawDefinition> = sqlx::query_as(
        r#"
        SELECT
          pg_catalog.pg_get_viewdef(c.oid, true)            AS query,
          COALESCE(c.reloptions, '{}')::text[]              AS options,
          pg_catalog.pg_get_userbyid(c.relowner)::text      AS owner,
          pg_catalog.obj_description(c.oid, 'pg_class')     AS comment
        FROM pg_class c
        JOIN pg_namespace n
          ON c.relnamespace = n.oid
        WHERE c.oid = $1
          AND n.nspname = $2
          AND c.relname = $3
          AND c.relkind::text = $4
        "#,
    )
    .bind(Oid(object.oid))
    .bind(&object.schema)
    .bind(&object.name)
    .bind(object.kind.code())
    .fetch_optional(&mut *conn)
    .await
    .with_context(|| format!("Failed to read definition of {}", object.describe()))?;

    let Some(raw) = raw else {
        return Ok(None);
    };

    let mut grants = grant::fetch_for_relation(conn, object.oid).await?;
    grants.extend(grant::fetch_column_grants(conn, object.oid).await?);
    let indexes = match object.kind {
        RelationKind::MaterializedView => index::fetch_definitions(conn, object.oid).await?,
        RelationKind::View => Vec::new(),
    };

    Ok(Some(RelationDefinition {
        query: raw.query,
        options: raw.options,
        owner: raw.owner,
        grants,
        indexes,
        triggers: trigger::fetch_trigger_definitions(conn, object.oid).await?,
        rules: trigger::fetch_rule_definitions(conn, object.oid).await?,
        comment: raw.comment,
        columns: column::fetch_details(conn, object.oid).await?,
    }))
}

/// Definition provider backed by a live connection, normally one that is
/// inside the same read-only transaction used to discover dependencies.
pub struct PgDefinitionProvider<'c> {
    conn: &'c mut PgConnection,
    include_comments: bool,
}

impl<'c> PgDefinitionProvider<'c> {
    pub fn new(conn: &'c mut PgConnection, include_comments: bool) -> Self {
        Self {
            conn,
            include_comments,
        }
    }
}

impl DefinitionProvider for PgDefinitionProvider<'_> {
    async fn definition(&mut self, object: &CatalogObject) -> Result<Option<Definition>> {
        debug!("Fetching definition of {}", object.describe());
        let definition = fetch(self.conn, object).await?;
        Ok(definition.map(|d| {
            Definition::new(
                d.create_options(),
                render_definition_body(object, &d, self.include_comments),
            )
        }))
    }
}
