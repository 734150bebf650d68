use crate::catalog::id::CatalogObject;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Drop,
    Create,
}

/// One planned statement. Definitions are not stored here; they are looked
/// up from [`Definitions`](super::definition::Definitions) when rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Action {
    pub kind: ActionKind,
    pub object: CatalogObject,
}

impl Action {
    pub fn drop(object: CatalogObject) -> Self {
        Self {
            kind: ActionKind::Drop,
            object,
        }
    }

    pub fn create(object: CatalogObject) -> Self {
        Self {
            kind: ActionKind::Create,
            object,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ActionKind::Drop => write!(f, "drop {}", self.object),
            ActionKind::Create => write!(f, "create {}", self.object),
        }
    }
}

/// The ordered rebuild of one target and everything depending on it.
///
/// `drops ++ target_actions ++ creates` is the execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub target: CatalogObject,
    /// Dependents, most dependent first.
    pub drops: Vec<Action>,
    /// Drop then create the target.
    pub target_actions: Vec<Action>,
    /// Dependents, least dependent first.
    pub creates: Vec<Action>,
}

impl Plan {
    pub fn steps(&self) -> impl Iterator<Item = &Action> {
        self.drops
            .iter()
            .chain(self.target_actions.iter())
            .chain(self.creates.iter())
    }

    /// Objects whose CREATE statements need a definition.
    pub fn objects_to_create(&self) -> impl Iterator<Item = &CatalogObject> {
        self.steps()
            .filter(|a| a.kind == ActionKind::Create)
            .map(|a| &a.object)
    }

    pub fn dependent_count(&self) -> usize {
        self.creates.len()
    }
}

/// Turn a topological order of the target's dependents into a plan.
pub fn plan(topo_order: &[CatalogObject], target: &CatalogObject) -> Plan {
    Plan {
        target: target.clone(),
        drops: topo_order.iter().rev().cloned().map(Action::drop).collect(),
        target_actions: vec![Action::drop(target.clone()), Action::create(target.clone())],
        creates: topo_order.iter().cloned().map(Action::create).collect(),
    }
}
