//! Triggers and rewrite rules attached to a view
use anyhow::{Context, Result};
use sqlx::PgConnection;
use sqlx::postgres::types::Oid;

/// `CREATE TRIGGER` statements for user triggers on the relation, ordered by name.
/// Statements are returned without a trailing semicolon.
pub async fn fetch_trigger_definitions(
    conn: &mut PgConnection,
    relation_oid: u32,
) -> Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT pg_catalog.pg_get_triggerdef(t.oid, true) AS definition
        FROM pg_trigger t
        WHERE t.tgrelid = $1
          AND NOT t.tgisinternal
        ORDER BY t.tgname
        "#,
    )
    .bind(Oid(relation_oid))
    .fetch_all(&mut *conn)
    .await
    .with_context(|| format!("Failed to read triggers for relation oid {}", relation_oid))?;

    Ok(rows.into_iter().map(|(definition,)| definition).collect())
}

/// `CREATE RULE` statements for the relation, ordered by name.
///
/// The `_RETURN` rule is the view's own query and is recreated with it.
pub async fn fetch_rule_definitions(
    conn: &mut PgConnection,
    relation_oid: u32,
) -> Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT pg_catalog.pg_get_ruledef(r.oid, true) AS definition
        FROM pg_rewrite r
        WHERE r.ev_class = $1
          AND r.rulename <> '_RETURN'
        ORDER BY r.rulename
        "#,
    )
    .bind(Oid(relation_oid))
    .fetch_all(&mut *conn)
    .await
    .with_context(|| format!("Failed to read rules for relation oid {}", relation_oid))?;

    Ok(rows.into_iter().map(|(definition,)| definition).collect())
}
