use crate::error::PlanError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The kinds of relation whose definitions can be dropped and recreated.
///
/// Variant order is part of the deterministic tie-break used when ordering
/// dependents, so views sort before materialized views of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    View,
    MaterializedView,
}

impl RelationKind {
    /// Map a `pg_class.relkind` code. `relation` is only used for the error.
    pub fn from_code(code: &str, relation: &str) -> Result<Self, PlanError> {
        match code {
            "v" => Ok(RelationKind::View),
            "m" => Ok(RelationKind::MaterializedView),
            other => Err(PlanError::UnknownRelationKind {
                code: other.to_string(),
                relation: relation.to_string(),
            }),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RelationKind::View => "v",
            RelationKind::MaterializedView => "m",
        }
    }

    /// SQL keyword(s) naming this kind, as used in DROP/ALTER/COMMENT.
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            RelationKind::View => "VIEW",
            RelationKind::MaterializedView => "MATERIALIZED VIEW",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::View => write!(f, "view"),
            RelationKind::MaterializedView => write!(f, "materialized view"),
        }
    }
}

/// One view or materialized view as seen in the catalog during a single run.
///
/// Equality covers all four fields, so two relations that share a name but
/// not an oid (for example one dropped and recreated between reads) are
/// distinct objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CatalogObject {
    pub schema: String,
    pub name: String,
    pub kind: RelationKind,
    pub oid: u32,
}

impl CatalogObject {
    pub fn new(
        schema: impl Into<String>,
        name: impl Into<String>,
        kind: RelationKind,
        oid: u32,
    ) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            kind,
            oid,
        }
    }

    pub fn matches(&self, name: &QualifiedName) -> bool {
        self.schema == name.schema && self.name == name.name
    }

    /// Long form used in diagnostics, e.g. `view public.a (oid 16384)`.
    pub fn describe(&self) -> String {
        format!("{} {}.{} (oid {})", self.kind, self.schema, self.name, self.oid)
    }
}

impl fmt::Display for CatalogObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// `dependent`'s definition references `source`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DependencyEdge {
    pub source: CatalogObject,
    pub dependent: CatalogObject,
}

impl DependencyEdge {
    pub fn new(source: CatalogObject, dependent: CatalogObject) -> Self {
        Self { source, dependent }
    }
}

/// A user supplied `schema.name` reference.
///
/// Names are taken literally: no case folding and no quoted identifiers, so
/// a name containing a dot cannot be addressed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub schema: String,
    pub name: String,
}

impl FromStr for QualifiedName {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            [schema, name] if !schema.is_empty() && !name.is_empty() => Ok(QualifiedName {
                schema: schema.to_string(),
                name: name.to_string(),
            }),
            _ => Err(PlanError::MalformedTarget {
                target: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}
