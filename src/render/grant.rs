//! SQL rendering for privileges granted on a relation

use crate::catalog::grant::{Grant, GranteeType};
use crate::catalog::id::CatalogObject;
use crate::render::{qualified_name, quote_ident};
use itertools::Itertools;

/// Render a GRANT statement restoring `grant` on `object`.
///
/// Views and materialized views are both addressed without an object type
/// keyword, the same way PostgreSQL accepts them for tables. Column-level
/// grants list their columns after each privilege.
pub fn render_grant_statement(object: &CatalogObject, grant: &Grant) -> String {
    let privileges = if grant.columns.is_empty() {
        grant.privileges.join(", ")
    } else {
        let columns = grant.columns.iter().map(|c| quote_ident(c)).join(", ");
        grant
            .privileges
            .iter()
            .map(|p| format!("{} ({})", p, columns))
            .join(", ")
    };
    let grantee = match &grant.grantee {
        GranteeType::Role(name) => quote_ident(name),
        GranteeType::Public => "PUBLIC".to_string(),
    };
    let grant_option = if grant.with_grant_option {
        " WITH GRANT OPTION"
    } else {
        ""
    };

    format!(
        "GRANT {} ON {} TO {}{};",
        privileges,
        qualified_name(object),
        grantee,
        grant_option
    )
}
