//! Fetch privileges granted on a single relation and on its columns
use anyhow::{Context, Result};
use sqlx::PgConnection;
use sqlx::postgres::types::Oid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GranteeType {
    Role(String),
    Public,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub grantee: GranteeType,
    pub privileges: Vec<String>, // e.g., ["SELECT", "INSERT"]
    pub with_grant_option: bool,
    pub object_owner: String,
    /// Columns a column-level grant applies to; empty for the whole relation.
    pub columns: Vec<String>,
}

/// The owner's privileges are implicit and come back with `ALTER ... OWNER TO`.
pub fn is_owner_grant(grant: &Grant) -> bool {
    match &grant.grantee {
        GranteeType::Role(role_name) => role_name == &grant.object_owner,
        GranteeType::Public => false,
    }
}

#[derive(sqlx::FromRow)]
struct RawPrivilege {
    grantee: String,
    privilege_type: String,
    is_grantable: bool,
    object_owner: String,
}

/// Fetch the explicit grants on one relation, grouped by grantee and grant option.
/// Owner grants are left out.
pub async fn fetch_for_relation(conn: &mut PgConnection, oid: u32) -> Result<Vec<Grant>> {
    let rows: Vec<RawPrivilege> = sqlx::query_as(
        r#"
        SELECT
            CASE
                WHEN acl.grantee = 0 THEN 'PUBLIC'
                ELSE r.rolname::text
            END AS grantee,
            acl.privilege_type AS privilege_type,
            acl.is_grantable AS is_grantable,
            owner_role.rolname::text AS object_owner
        FROM pg_class c
        JOIN pg_roles owner_role ON c.relowner = owner_role.oid,
        LATERAL aclexplode(COALESCE(c.relacl, acldefault('r', c.relowner))) AS acl
        LEFT JOIN pg_roles r ON r.oid = acl.grantee
        WHERE c.oid = $1
        ORDER BY CASE WHEN acl.grantee = 0 THEN 'PUBLIC' ELSE r.rolname::text END,
                 acl.is_grantable,
                 acl.privilege_type
        "#,
    )
    .bind(Oid(oid))
    .fetch_all(&mut *conn)
    .await
    .with_context(|| format!("Failed to read privileges for relation oid {}", oid))?;

    Ok(group_privileges(rows)
        .into_iter()
        .filter(|grant| !is_owner_grant(grant))
        .collect())
}

#[derive(sqlx::FromRow)]
struct RawColumnPrivilege {
    column_name: String,
    grantee: String,
    privilege_type: String,
    is_grantable: bool,
    object_owner: String,
}

/// Fetch column-level grants from `pg_attribute.attacl`.
///
/// Columns sharing a grantee, privilege and grant option are grouped into one
/// grant, in column order.
pub async fn fetch_column_grants(conn: &mut PgConnection, oid: u32) -> Result<Vec<Grant>> {
    let rows: Vec<RawColumnPrivilege> = sqlx::query_as(
        r#"
        SELECT
            a.attname::text AS column_name,
            CASE
                WHEN acl.grantee = 0 THEN 'PUBLIC'
                ELSE r.rolname::text
            END AS grantee,
            acl.privilege_type AS privilege_type,
            acl.is_grantable AS is_grantable,
            owner_role.rolname::text AS object_owner
        FROM pg_attribute a
        JOIN pg_class c ON c.oid = a.attrelid
        JOIN pg_roles owner_role ON c.relowner = owner_role.oid,
        LATERAL aclexplode(a.attacl) AS acl
        LEFT JOIN pg_roles r ON r.oid = acl.grantee
        WHERE a.attrelid = $1
          AND a.attnum > 0
          AND NOT a.attisdropped
          AND a.attacl IS NOT NULL
        ORDER BY CASE WHEN acl.grantee = 0 THEN 'PUBLIC' ELSE r.rolname::text END,
                 acl.is_grantable,
                 acl.privilege_type,
                 a.attnum
        "#,
    )
    .bind(Oid(oid))
    .fetch_all(&mut *conn)
    .await
    .with_context(|| format!("Failed to read column privileges for relation oid {}", oid))?;

    Ok(group_column_privileges(rows))
}

fn group_column_privileges(rows: Vec<RawColumnPrivilege>) -> Vec<Grant> {
    let mut result: Vec<Grant> = Vec::new();

    for row in rows {
        let grantee = if row.grantee == "PUBLIC" {
            GranteeType::Public
        } else {
            GranteeType::Role(row.grantee)
        };

        match result.last_mut() {
            Some(grant)
                if grant.grantee == grantee
                    && grant.with_grant_option == row.is_grantable
                    && grant.privileges == [row.privilege_type.as_str()] =>
            {
                grant.columns.push(row.column_name);
            }
            _ => result.push(Grant {
                grantee,
                privileges: vec![row.privilege_type],
                with_grant_option: row.is_grantable,
                object_owner: row.object_owner,
                columns: vec![row.column_name],
            }),
        }
    }

    result
}

fn group_privileges(rows: Vec<RawPrivilege>) -> Vec<Grant> {
    let mut result = Vec::new();
    let mut current_grant: Option<Grant> = None;

    for row in rows {
        let grantee = if row.grantee == "PUBLIC" {
            GranteeType::Public
        } else {
            GranteeType::Role(row.grantee)
        };

        match &mut current_grant {
            Some(grant)
                if grant.grantee == grantee && grant.with_grant_option == row.is_grantable =>
            {
                grant.privileges.push(row.privilege_type);
            }
            _ => {
                if let Some(grant) = current_grant.take() {
                    result.push(grant);
                }
                current_grant = Some(Grant {
                    grantee,
                    privileges: vec![row.privilege_type],
                    with_grant_option: row.is_grantable,
                    object_owner: row.object_owner,
                    columns: Vec::new(),
                });
            }
        }
    }

    if let Some(grant) = current_grant {
        result.push(grant);
    }

    result
}
