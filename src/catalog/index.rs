//! Fetch index definitions on a materialized view
use anyhow::{Context, Result};
use sqlx::PgConnection;
use sqlx::postgres::types::Oid;

/// `CREATE INDEX` statements for every index on the relation, ordered by index name.
/// Statements are returned without a trailing semicolon.
pub async fn fetch_definitions(conn: &mut PgConnection, relation_oid: u32) -> Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT pg_catalog.pg_get_indexdef(i.indexrelid) AS definition
        FROM pg_index i
        JOIN pg_class ic ON ic.oid = i.indexrelid
        WHERE i.indrelid = $1
        ORDER BY ic.relname
        "#,
    )
    .bind(Oid(relation_oid))
    .fetch_all(&mut *conn)
    .await
    .with_context(|| format!("Failed to read indexes for relation oid {}", relation_oid))?;

    Ok(rows.into_iter().map(|(definition,)| definition).collect())
}
