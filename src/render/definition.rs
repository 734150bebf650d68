//! Body text that follows `CREATE ... AS` when a relation is recreated.
//!
//! The body is the defining query, with its check option, followed by the
//! statements that restore what dropping the relation loses. Options that go
//! in the `WITH (...)` clause before `AS` are rendered with the CREATE itself.

use crate::catalog::definition::RelationDefinition;
use crate::catalog::id::CatalogObject;
use crate::render::grant::render_grant_statement;
use crate::render::{escape_string, qualified_name, quote_ident, render_comment_sql};

pub fn render_definition_body(
    object: &CatalogObject,
    definition: &RelationDefinition,
    include_comments: bool,
) -> String {
    let relation = format!("{} {}", object.kind.sql_keyword(), qualified_name(object));
    let query = definition.query.trim().trim_end_matches(';').trim_end();
    let mut statements = match definition.check_option() {
        Some(check_option) => vec![format!("{}\n  WITH {} CHECK OPTION;", query, check_option)],
        None => vec![format!("{};", query)],
    };

    for index in &definition.indexes {
        statements.push(terminated(index));
    }

    for column in &definition.columns {
        if let Some(default_expr) = &column.default_expr {
            statements.push(format!(
                "ALTER {} ALTER COLUMN {} SET DEFAULT {};",
                relation,
                quote_ident(&column.name),
                default_expr
            ));
        }
    }

    statements.push(format!(
        "ALTER {} OWNER TO {};",
        relation,
        quote_ident(&definition.owner)
    ));

    for grant in &definition.grants {
        statements.push(render_grant_statement(object, grant));
    }

    statements.extend(definition.triggers.iter().map(|t| terminated(t)));
    statements.extend(definition.rules.iter().map(|r| terminated(r)));

    if include_comments {
        if let Some(comment) = &definition.comment {
            statements.push(render_comment_sql(object, Some(comment)));
        }
        for column in &definition.columns {
            if let Some(comment) = &column.comment {
                statements.push(format!(
                    "COMMENT ON COLUMN {}.{} IS {};",
                    qualified_name(object),
                    quote_ident(&column.name),
                    escape_string(comment)
                ));
            }
        }
    }

    statements.join("\n")
}

fn terminated(statement: &str) -> String {
    format!("{};", statement.trim().trim_end_matches(';').trim_end())
}
