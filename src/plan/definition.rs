//! Definition lookup for CREATE actions.

use super::action::Plan;
use crate::catalog::id::CatalogObject;
use crate::error::PlanError;
use anyhow::Result;
use std::collections::HashMap;
use tracing::debug;

/// Creation text for one relation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definition {
    /// Entries for the `WITH (...)` clause before `AS`, e.g. `security_barrier=true`.
    pub options: Vec<String>,
    /// Everything after `AS`: the query and the statements that follow it.
    pub body: String,
}

impl Definition {
    pub fn new(options: Vec<String>, body: impl Into<String>) -> Self {
        Self {
            options,
            body: body.into(),
        }
    }
}

impl From<String> for Definition {
    fn from(body: String) -> Self {
        Self::new(Vec::new(), body)
    }
}

impl From<&str> for Definition {
    fn from(body: &str) -> Self {
        Self::new(Vec::new(), body)
    }
}

/// Source of the current creation text for a relation.
///
/// `Ok(None)` means the relation has no reconstructable definition. `Err` is
/// reserved for failures of the provider itself, such as a lost connection.
#[allow(async_fn_in_trait)]
pub trait DefinitionProvider {
    async fn definition(&mut self, object: &CatalogObject) -> Result<Option<Definition>>;
}

/// Fixed definitions, keyed by object identity.
impl DefinitionProvider for HashMap<CatalogObject, String> {
    async fn definition(&mut self, object: &CatalogObject) -> Result<Option<Definition>> {
        Ok(self.get(object).cloned().map(Definition::from))
    }
}

/// Creation text per object, joined with the plan's actions at render time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definitions {
    by_object: HashMap<CatalogObject, Definition>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object: CatalogObject, definition: impl Into<Definition>) {
        self.by_object.insert(object, definition.into());
    }

    pub fn get(&self, object: &CatalogObject) -> Option<&Definition> {
        self.by_object.get(object)
    }

    pub fn len(&self) -> usize {
        self.by_object.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_object.is_empty()
    }
}

impl FromIterator<(CatalogObject, String)> for Definitions {
    fn from_iter<I: IntoIterator<Item = (CatalogObject, String)>>(iter: I) -> Self {
        Self {
            by_object: iter
                .into_iter()
                .map(|(object, body)| (object, Definition::from(body)))
                .collect(),
        }
    }
}

/// Fetch a definition for every object the plan creates.
///
/// Any object without a non-blank definition aborts the run with
/// [`PlanError::MissingDefinition`].
pub async fn collect_definitions<P: DefinitionProvider>(
    plan: &Plan,
    provider: &mut P,
) -> Result<Definitions> {
    let mut definitions = Definitions::new();

    for object in plan.objects_to_create() {
        match provider.definition(object).await? {
            Some(definition) if !definition.body.trim().is_empty() => {
                debug!("Attached definition for {}", object);
                let body = definition.body.trim().to_string();
                definitions.insert(object.clone(), Definition { body, ..definition });
            }
            _ => {
                return Err(PlanError::MissingDefinition {
                    object: object.clone(),
                }
                .into());
            }
        }
    }

    Ok(definitions)
}
