//! SQL rendering for planned drop/create actions

use crate::catalog::id::RelationKind;
use crate::error::PlanError;
use crate::plan::action::{Action, ActionKind};
use crate::plan::definition::Definitions;
use crate::render::{RenderedSql, qualified_name};

/// Render one action. CREATE actions take their body from `definitions`.
pub fn render_action(action: &Action, definitions: &Definitions) -> Result<RenderedSql, PlanError> {
    let object = &action.object;
    let name = qualified_name(object);

    match action.kind {
        ActionKind::Drop => Ok(RenderedSql::destructive(format!(
            "DROP {} {};",
            object.kind.sql_keyword(),
            name
        ))),
        ActionKind::Create => {
            let definition = definitions
                .get(object)
                .filter(|d| !d.body.trim().is_empty())
                .ok_or_else(|| PlanError::UndefinedCreateBody {
                    object: object.clone(),
                })?;
            let body = definition.body.trim();

            // Materialized views cannot be replaced in place
            let create = match object.kind {
                RelationKind::View => "CREATE OR REPLACE VIEW",
                RelationKind::MaterializedView => "CREATE MATERIALIZED VIEW",
            };
            let with_clause = if definition.options.is_empty() {
                String::new()
            } else {
                format!(" WITH ({})", definition.options.join(", "))
            };
            let terminator = if body.ends_with(';') { "" } else { ";" };

            Ok(RenderedSql::new(format!(
                "{} {}{} AS\n{}{}",
                create, name, with_clause, body, terminator
            )))
        }
    }
}
