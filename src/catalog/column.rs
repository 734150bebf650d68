//! Per-column state of a view that lives outside its query: comments and defaults
use anyhow::{Context, Result};
use sqlx::PgConnection;
use sqlx::postgres::types::Oid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ColumnDetail {
    pub name: String,
    pub comment: Option<String>,
    /// Default expression from `ALTER VIEW ... ALTER COLUMN ... SET DEFAULT`
    pub default_expr: Option<String>,
}

/// Columns of the relation that carry a comment or a default, in column order.
pub async fn fetch_details(conn: &mut PgConnection, relation_oid: u32) -> Result<Vec<ColumnDetail>> {
    sqlx::query_as(
        r#"
        SELECT
            a.attname::text AS name,
            d.description AS comment,
            pg_catalog.pg_get_expr(ad.adbin, ad.adrelid) AS default_expr
        FROM pg_attribute a
        LEFT JOIN pg_description d
          ON d.objoid = a.attrelid
         AND d.classoid = 'pg_class'::regclass
         AND d.objsubid = a.attnum
        LEFT JOIN pg_attrdef ad
          ON ad.adrelid = a.attrelid
         AND ad.adnum = a.attnum
        WHERE a.attrelid = $1
          AND a.attnum > 0
          AND NOT a.attisdropped
          AND (d.description IS NOT NULL OR ad.adbin IS NOT NULL)
        ORDER BY a.attnum
        "#,
    )
    .bind(Oid(relation_oid))
    .fetch_all(&mut *conn)
    .await
    .with_context(|| format!("Failed to read column details for relation oid {}", relation_oid))
}
