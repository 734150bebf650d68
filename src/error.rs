//! Error kinds raised while planning a rebuild.
//!
//! Every variant is fatal to the current run. Catalog and I/O failures are
//! reported through `anyhow` by the callers; these are the failures that the
//! planning logic itself can detect.

use crate::catalog::id::CatalogObject;
use itertools::Itertools;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("target `{target}` must have the form schema.name")]
    MalformedTarget { target: String },

    #[error(
        "there must be exactly one relation matching the target {target}, but found {count}{}",
        format_candidates(.candidates)
    )]
    AmbiguousOrMissingTarget {
        target: String,
        count: usize,
        candidates: Vec<CatalogObject>,
    },

    #[error(
        "relation {relation} has kind '{code}'; only views ('v') and materialized views ('m') can be rebuilt"
    )]
    UnknownRelationKind { code: String, relation: String },

    #[error(
        "cyclic dependency among relations depending on {target}{}",
        format_cycle(.cycle)
    )]
    CyclicDependency {
        target: CatalogObject,
        cycle: Vec<CatalogObject>,
    },

    #[error("no definition is available for {object}; it may have been dropped or renamed")]
    MissingDefinition { object: CatalogObject },

    #[error("CREATE for {object} was rendered before its definition was attached")]
    UndefinedCreateBody { object: CatalogObject },
}

fn format_candidates(candidates: &[CatalogObject]) -> String {
    if candidates.is_empty() {
        String::new()
    } else {
        format!(": {}", candidates.iter().map(|c| c.describe()).join(", "))
    }
}

fn format_cycle(cycle: &[CatalogObject]) -> String {
    match cycle.first() {
        Some(first) => format!(
            ": {} -> {}",
            cycle.iter().map(ToString::to_string).join(" -> "),
            first
        ),
        None => String::new(),
    }
}
