//! Assemble a full rebuild script from a plan and its definitions

use crate::constants::{CREATE_DEPENDENTS_MARKER, DROP_DEPENDENTS_MARKER, TARGET_MARKER};
use crate::error::PlanError;
use crate::plan::action::{Action, Plan};
use crate::plan::definition::Definitions;
use crate::render::{RenderedSql, Safety, render_action};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptOptions {
    /// Enclose the statements in `BEGIN;` / `COMMIT;`.
    pub wrap_in_transaction: bool,
}

/// Render the whole script in memory. Nothing is written anywhere, so a
/// failure here never leaves a partial script behind.
pub fn render_script(
    plan: &Plan,
    definitions: &Definitions,
    options: &ScriptOptions,
) -> Result<String, PlanError> {
    let drops = render_all(&plan.drops, definitions)?;
    let target_actions = render_all(&plan.target_actions, definitions)?;
    let creates = render_all(&plan.creates, definitions)?;

    let destructive = [&drops, &target_actions, &creates]
        .into_iter()
        .flatten()
        .filter(|r| r.safety == Safety::Destructive)
        .count();

    let mut blocks = vec![header(plan, destructive, options)];

    if options.wrap_in_transaction {
        blocks.push("BEGIN;".to_string());
    }

    blocks.push(DROP_DEPENDENTS_MARKER.to_string());
    blocks.extend(drops.into_iter().map(|r| r.sql));

    blocks.push(TARGET_MARKER.to_string());
    blocks.extend(target_actions.into_iter().map(|r| r.sql));

    blocks.push(CREATE_DEPENDENTS_MARKER.to_string());
    blocks.extend(creates.into_iter().map(|r| r.sql));

    if options.wrap_in_transaction {
        blocks.push("COMMIT;".to_string());
    }

    debug!("Rendered {} script blocks for {}", blocks.len(), plan.target);
    Ok(blocks.join("\n\n") + "\n")
}

fn render_all(actions: &[Action], definitions: &Definitions) -> Result<Vec<RenderedSql>, PlanError> {
    actions
        .iter()
        .map(|action| render_action(action, definitions))
        .collect()
}

fn header(plan: &Plan, destructive: usize, options: &ScriptOptions) -> String {
    let target = &plan.target;
    let mut lines = vec![
        format!("-- Rebuild of {} {}", target.kind, target),
        "--".to_string(),
        format!(
            "-- {} dependent relation(s) are dropped first, most dependent first.",
            plan.dependent_count()
        ),
        format!("-- {} is then dropped and created again.", target),
        "-- Finally the dependents are recreated from their current definitions,".to_string(),
        "-- least dependent first, with their options, owners, grants, comments,".to_string(),
        "-- indexes, triggers and rules restored.".to_string(),
        format!("-- {} statement(s) below drop a relation.", destructive),
        "--".to_string(),
        "-- Edit the target's definition under the TARGET RELATION marker.".to_string(),
        "-- Every relation dropped here is recreated further down.".to_string(),
    ];
    if !options.wrap_in_transaction {
        lines.push("-- Run it in a single transaction so a failure leaves nothing dropped.".to_string());
    }
    lines.join("\n")
}
