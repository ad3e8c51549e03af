//! Property definitions: the nodes of a nesting schema.

use serde::{Deserialize, Serialize};

/// The kind of a property, matching the declarative `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// `COLUMN`: a scalar field copied from one input column.
    Column,
    /// `ONE`: a singular nested relation.
    One,
    /// `MANY`: a plural nested relation.
    Many,
}

impl PropertyKind {
    /// The declarative tag for this kind.
    pub const fn tag(self) -> &'static str {
        match self {
            PropertyKind::Column => "COLUMN",
            PropertyKind::One => "ONE",
            PropertyKind::Many => "MANY",
        }
    }

    /// Parse a declarative tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "COLUMN" => Some(PropertyKind::Column),
            "ONE" => Some(PropertyKind::One),
            "MANY" => Some(PropertyKind::Many),
            _ => None,
        }
    }
}

/// Maps one output field to one input column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawColumnDef")]
pub struct ColumnDef {
    /// Output field name.
    pub name: String,
    /// Input column the value is read from.
    #[serde(rename = "column")]
    pub source_column: String,
    /// Part of the level's identity key.
    #[serde(rename = "isId")]
    pub is_identity: bool,
}

/// Declarative form where `column` defaults to `name` and `isId` to false.
#[derive(Deserialize)]
struct RawColumnDef {
    name: String,
    #[serde(default)]
    column: Option<String>,
    #[serde(default, rename = "isId")]
    is_id: bool,
}

impl From<RawColumnDef> for ColumnDef {
    fn from(raw: RawColumnDef) -> Self {
        let source_column = raw.column.unwrap_or_else(|| raw.name.clone());
        Self {
            name: raw.name,
            source_column,
            is_identity: raw.is_id,
        }
    }
}

impl ColumnDef {
    /// Create a non-identity column reading `source_column` into `name`.
    pub fn new(name: impl Into<String>, source_column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_column: source_column.into(),
            is_identity: false,
        }
    }

    /// Create a column whose source column has the same name as the field.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source_column: name.clone(),
            name,
            is_identity: false,
        }
    }

    /// Mark this column as part of the identity key.
    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self
    }
}

/// A nested relation: the children form the schema of the nested entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDef {
    /// Output field name.
    pub name: String,
    /// Child properties, including the nested level's identity columns.
    #[serde(rename = "properties")]
    pub children: Vec<PropertyDef>,
}

impl RelationDef {
    pub fn new(name: impl Into<String>, children: Vec<PropertyDef>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    /// Identity columns declared directly on this level.
    pub fn identity_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        identity_columns(&self.children)
    }

    /// Non-identity columns declared directly on this level.
    pub fn value_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        value_columns(&self.children)
    }

    /// Nested relations declared directly on this level.
    pub fn relations(&self) -> impl Iterator<Item = &PropertyDef> {
        relations(&self.children)
    }
}

/// One node of a nesting schema.
///
/// The declarative JSON form is tagged by `type`:
///
/// ```json
/// {"type": "COLUMN", "name": "id", "column": "track_id", "isId": true}
/// {"type": "MANY", "name": "tracks", "properties": [...]}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PropertyDef {
    /// Scalar field.
    #[serde(rename = "COLUMN")]
    Column(ColumnDef),
    /// Singular nested relation.
    #[serde(rename = "ONE")]
    Object(RelationDef),
    /// Plural nested relation.
    #[serde(rename = "MANY")]
    Array(RelationDef),
}

impl PropertyDef {
    /// A non-identity column.
    pub fn column(name: impl Into<String>, source_column: impl Into<String>) -> Self {
        PropertyDef::Column(ColumnDef::new(name, source_column))
    }

    /// An identity column.
    pub fn id(name: impl Into<String>, source_column: impl Into<String>) -> Self {
        PropertyDef::Column(ColumnDef::new(name, source_column).identity())
    }

    /// A singular nested relation.
    pub fn object(name: impl Into<String>, children: Vec<PropertyDef>) -> Self {
        PropertyDef::Object(RelationDef::new(name, children))
    }

    /// A plural nested relation.
    pub fn array(name: impl Into<String>, children: Vec<PropertyDef>) -> Self {
        PropertyDef::Array(RelationDef::new(name, children))
    }

    /// Output field name.
    pub fn name(&self) -> &str {
        match self {
            PropertyDef::Column(c) => &c.name,
            PropertyDef::Object(r) | PropertyDef::Array(r) => &r.name,
        }
    }

    pub const fn kind(&self) -> PropertyKind {
        match self {
            PropertyDef::Column(_) => PropertyKind::Column,
            PropertyDef::Object(_) => PropertyKind::One,
            PropertyDef::Array(_) => PropertyKind::Many,
        }
    }

    /// Whether this is a column marked as identity.
    pub fn is_identity(&self) -> bool {
        matches!(self, PropertyDef::Column(c) if c.is_identity)
    }
}

impl From<ColumnDef> for PropertyDef {
    fn from(def: ColumnDef) -> Self {
        PropertyDef::Column(def)
    }
}

/// Identity columns among `properties`, in declaration order.
pub fn identity_columns(properties: &[PropertyDef]) -> impl Iterator<Item = &ColumnDef> {
    properties.iter().filter_map(|p| match p {
        PropertyDef::Column(c) if c.is_identity => Some(c),
        _ => None,
    })
}

/// Non-identity columns among `properties`, in declaration order.
pub fn value_columns(properties: &[PropertyDef]) -> impl Iterator<Item = &ColumnDef> {
    properties.iter().filter_map(|p| match p {
        PropertyDef::Column(c) if !c.is_identity => Some(c),
        _ => None,
    })
}

/// Object and Array properties among `properties`, in declaration order.
pub fn relations(properties: &[PropertyDef]) -> impl Iterator<Item = &PropertyDef> {
    properties
        .iter()
        .filter(|p| !matches!(p, PropertyDef::Column(_)))
}
