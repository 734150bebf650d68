pub mod action;
pub mod definition;
pub mod grant;
pub mod script;

pub use action::render_action;
pub use script::{ScriptOptions, render_script};

use crate::catalog::id::CatalogObject;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Safety {
    Safe,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSql {
    pub safety: Safety,
    pub sql: String,
}

impl RenderedSql {
    pub fn new(sql: String) -> Self {
        Self {
            sql,
            safety: Safety::Safe,
        }
    }

    pub fn destructive(sql: String) -> Self {
        Self {
            sql,
            safety: Safety::Destructive,
        }
    }
}

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub fn escape_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// `"schema"."name"`, each part quoted separately.
pub fn qualified_name(object: &CatalogObject) -> String {
    format!("{}.{}", quote_ident(&object.schema), quote_ident(&object.name))
}

/// COMMENT ON statement for a view or materialized view
pub fn render_comment_sql(object: &CatalogObject, comment: Option<&str>) -> String {
    let target = format!("{} {}", object.kind.sql_keyword(), qualified_name(object));
    match comment {
        Some(comment_text) => format!("COMMENT ON {} IS {};", target, escape_string(comment_text)),
        None => format!("COMMENT ON {} IS NULL;", target),
    }
}
