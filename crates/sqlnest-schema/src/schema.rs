//! Top-level nesting schema.

use crate::property::{ColumnDef, PropertyDef, PropertyKind, identity_columns};
use serde::{Deserialize, Serialize};
use sqlnest_core::{Error, Result, SchemaError, SchemaErrorKind};

/// An ordered sequence of top-level property definitions.
///
/// Defines the shape of one hydrated record. Well-formedness (every level
/// declaring at least one identity column) is not enforced; see
/// [`Schema::levels_without_identity`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    properties: Vec<PropertyDef>,
}

impl Schema {
    pub fn new(properties: Vec<PropertyDef>) -> Self {
        Self { properties }
    }

    /// Load a schema from its declarative JSON form.
    ///
    /// Accepts either a bare array of properties or an object with a
    /// `properties` array.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let properties = match json {
            serde_json::Value::Array(_) => json,
            serde_json::Value::Object(map) => map.get("properties").ok_or_else(|| {
                invalid("schema object has no 'properties' array".to_string(), None)
            })?,
            _ => {
                return Err(invalid(
                    "schema must be an array of properties".to_string(),
                    None,
                ));
            }
        };

        check_type_tags(properties, "$")?;

        let properties: Vec<PropertyDef> = serde_json::from_value(properties.clone())
            .map_err(|e| invalid(format!("malformed schema: {}", e), Some(e)))?;

        tracing::debug!(
            properties = properties.len(),
            "Loaded schema from declarative form"
        );
        Ok(Self { properties })
    }

    /// Parse a schema from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| invalid(format!("schema is not valid JSON: {}", e), Some(e)))?;
        Self::from_json(&json)
    }

    /// Top-level properties in declaration order.
    pub fn properties(&self) -> &[PropertyDef] {
        &self.properties
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PropertyDef> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Top-level identity columns in declaration order.
    pub fn identity_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        identity_columns(&self.properties)
    }

    /// Number of levels in the deepest branch (a flat schema has depth 1).
    pub fn depth(&self) -> usize {
        fn level_depth(properties: &[PropertyDef]) -> usize {
            1 + properties
                .iter()
                .filter_map(|p| match p {
                    PropertyDef::Object(r) | PropertyDef::Array(r) => {
                        Some(level_depth(&r.children))
                    }
                    PropertyDef::Column(_) => None,
                })
                .max()
                .unwrap_or(0)
        }

        level_depth(&self.properties)
    }

    /// Paths of levels that declare no identity columns.
    ///
    /// The root is `$`, nested levels are `$.artist`, `$.tracks.composer`
    /// and so on. At such a level every row matches the first entity ever
    /// created there; hydration does not reject these schemas.
    pub fn levels_without_identity(&self) -> Vec<String> {
        fn walk(properties: &[PropertyDef], path: &str, out: &mut Vec<String>) {
            if identity_columns(properties).next().is_none() {
                out.push(path.to_string());
            }
            for property in properties {
                if let PropertyDef::Object(r) | PropertyDef::Array(r) = property {
                    walk(&r.children, &format!("{}.{}", path, r.name), out);
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.properties, "$", &mut out);
        out
    }
}

impl From<Vec<PropertyDef>> for Schema {
    fn from(properties: Vec<PropertyDef>) -> Self {
        Self::new(properties)
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a PropertyDef;
    type IntoIter = std::slice::Iter<'a, PropertyDef>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.iter()
    }
}

fn invalid(message: String, source: Option<serde_json::Error>) -> Error {
    Error::Schema(SchemaError {
        kind: SchemaErrorKind::Invalid,
        message,
        source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
    })
}

/// Reject unknown `type` tags up front so the error names the offending path.
fn check_type_tags(properties: &serde_json::Value, path: &str) -> Result<()> {
    let Some(items) = properties.as_array() else {
        return Err(invalid(format!("{} must be an array", path), None));
    };

    for (i, item) in items.iter().enumerate() {
        let Some(tag) = item.get("type").and_then(serde_json::Value::as_str) else {
            // Missing tags are reported by the structural parse.
            continue;
        };
        let item_path = format!("{}[{}]", path, i);
        match PropertyKind::from_tag(tag) {
            Some(PropertyKind::One | PropertyKind::Many) => {
                if let Some(children) = item.get("properties") {
                    check_type_tags(children, &format!("{}.properties", item_path))?;
                }
            }
            Some(PropertyKind::Column) => {}
            None => {
                return Err(Error::Schema(SchemaError::new(
                    SchemaErrorKind::UnknownPropertyType,
                    format!("unknown property type '{}' at {}", tag, item_path),
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn album_schema() -> Schema {
        Schema::new(vec![
            PropertyDef::id("a", "id"),
            PropertyDef::column("b", "name"),
            PropertyDef::object(
                "artist",
                vec![
                    PropertyDef::id("id", "artist_id"),
                    PropertyDef::column("name", "artist_name"),
                ],
            ),
            PropertyDef::array(
                "tracks",
                vec![
                    PropertyDef::id("id", "track_id"),
                    PropertyDef::column("title", "track_title"),
                ],
            ),
        ])
    }

    #[test]
    fn test_identity_columns() {
        let schema = album_schema();
        let ids: Vec<_> = schema.identity_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
        assert_eq!(schema.len(), 4);
    }

    #[test]
    fn test_depth() {
        assert_eq!(Schema::default().depth(), 1);
        assert_eq!(album_schema().depth(), 2);

        let deep = Schema::new(vec![PropertyDef::array(
            "tracks",
            vec![PropertyDef::object(
                "composer",
                vec![PropertyDef::array("awards", vec![])],
            )],
        )]);
        assert_eq!(deep.depth(), 4);
    }

    #[test]
    fn test_levels_without_identity() {
        assert!(album_schema().levels_without_identity().is_empty());

        let schema = Schema::new(vec![
            PropertyDef::column("name", "name"),
            PropertyDef::array(
                "tracks",
                vec![
                    PropertyDef::id("id", "track_id"),
                    PropertyDef::object("meta", vec![PropertyDef::column("k", "k")]),
                ],
            ),
        ]);
        assert_eq!(
            schema.levels_without_identity(),
            vec!["$".to_string(), "$.tracks.meta".to_string()]
        );
    }

    #[test]
    fn test_from_json_array() {
        let schema = Schema::from_json(&json!([
            {"type": "COLUMN", "name": "a", "column": "id", "isId": true},
            {"type": "COLUMN", "name": "b", "column": "name"},
            {"type": "ONE", "name": "artist", "properties": [
                {"type": "COLUMN", "name": "id", "column": "artist_id", "isId": true},
                {"type": "COLUMN", "name": "name", "column": "artist_name"}
            ]},
            {"type": "MANY", "name": "tracks", "properties": [
                {"type": "COLUMN", "name": "id", "column": "track_id", "isId": true},
                {"type": "COLUMN", "name": "title", "column": "track_title"}
            ]}
        ]))
        .unwrap();

        assert_eq!(schema, album_schema());
    }

    #[test]
    fn test_from_json_properties_object() {
        let schema = Schema::from_json(&json!({
            "properties": [{"type": "COLUMN", "name": "id", "isId": true}]
        }))
        .unwrap();
        assert_eq!(schema, Schema::new(vec![PropertyDef::id("id", "id")]));
    }

    #[test]
    fn test_from_json_unknown_type() {
        let err = Schema::from_json(&json!([
            {"type": "MANY", "name": "tracks", "properties": [
                {"type": "SOME", "name": "x"}
            ]}
        ]))
        .unwrap_err();

        match err {
            Error::Schema(e) => {
                assert_eq!(e.kind, SchemaErrorKind::UnknownPropertyType);
                assert!(e.message.contains("$[0].properties[0]"), "{}", e.message);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_json_malformed() {
        let err = Schema::from_json(&json!([{"type": "COLUMN"}])).unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaError {
                kind: SchemaErrorKind::Invalid,
                ..
            })
        ));

        assert!(Schema::from_json(&json!("nope")).is_err());
        assert!(Schema::from_json(&json!({"props": []})).is_err());
        assert!(Schema::from_json_str("[").is_err());
    }

    #[test]
    fn test_json_round_trip_form() {
        let schema = album_schema();
        let text = serde_json::to_string(&schema).unwrap();
        assert_eq!(Schema::from_json_str(&text).unwrap(), schema);
    }
}
