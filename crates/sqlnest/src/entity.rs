//! Hydrated output records.
//!
//! An `Entity` is an insertion-ordered map from field name to `FieldValue`.
//! Identity fields are written first when an entity is created; later writes
//! to an existing field keep its original position.

use crate::identity::IdentityIndex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use sqlnest_core::{Error, FromValue, Result, TypeError, Value};
use std::ops::Deref;

const NULL: &Value = &Value::Null;

/// The value of one field of a hydrated entity.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Scalar copied from a row column (may itself be `Value::Null`).
    Scalar(Value),
    /// Singular nested relation.
    Object(Entity),
    /// Plural nested relation.
    List(EntityList),
    /// Relation whose identity was unresolved on the latest row.
    Null,
}

impl FieldValue {
    /// Whether the field serializes as `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null | FieldValue::Scalar(Value::Null))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FieldValue::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Entity> {
        match self {
            FieldValue::Object(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&EntityList> {
        match self {
            FieldValue::List(l) => Some(l),
            _ => None,
        }
    }

    const fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Scalar(_) => "scalar",
            FieldValue::Object(_) => "object",
            FieldValue::List(_) => "list",
            FieldValue::Null => "null",
        }
    }
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        FieldValue::Scalar(v)
    }
}

impl From<Entity> for FieldValue {
    fn from(e: Entity) -> Self {
        FieldValue::Object(e)
    }
}

impl From<EntityList> for FieldValue {
    fn from(l: EntityList) -> Self {
        FieldValue::List(l)
    }
}

/// A hydrated record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    fields: Vec<(String, FieldValue)>,
}

impl Entity {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|(n, _)| n == name)
    }

    /// Get a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.position(name).map(|i| &self.fields[i].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.position(name).map(move |i| &mut self.fields[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Write a field, overwriting in place if it already exists.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(i) => self.fields[i].1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Mark a relation field as unresolved.
    pub fn set_null(&mut self, name: impl Into<String>) {
        self.set(name, FieldValue::Null);
    }

    /// The list stored at `name`, attaching a fresh one if the field is
    /// absent or holds anything other than a list.
    pub(crate) fn list_entry(&mut self, name: &str) -> &mut EntityList {
        let i = match self.position(name) {
            Some(i) => {
                if !matches!(self.fields[i].1, FieldValue::List(_)) {
                    self.fields[i].1 = FieldValue::List(EntityList::new());
                }
                i
            }
            None => {
                self.fields
                    .push((name.to_string(), FieldValue::List(EntityList::new())));
                self.fields.len() - 1
            }
        };
        match &mut self.fields[i].1 {
            FieldValue::List(list) => list,
            _ => unreachable!("field was just set to a list"),
        }
    }

    /// Scalar field value.
    pub fn get_value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(FieldValue::as_value)
    }

    /// Nested object field.
    pub fn get_object(&self, name: &str) -> Option<&Entity> {
        self.get(name).and_then(FieldValue::as_object)
    }

    /// Nested list field.
    pub fn get_list(&self, name: &str) -> Option<&EntityList> {
        self.get(name).and_then(FieldValue::as_list)
    }

    /// Whether the field is absent or null.
    pub fn is_null(&self, name: &str) -> bool {
        self.get(name).is_none_or(FieldValue::is_null)
    }

    /// Get a typed scalar field. An unresolved relation reads as NULL.
    pub fn get_named<T: FromValue>(&self, name: &str) -> Result<T> {
        let field = self.get(name).ok_or_else(|| {
            Error::Type(
                TypeError::new(
                    std::any::type_name::<T>(),
                    format!("field '{}' not found", name),
                )
                .in_column(name),
            )
        })?;
        let value = match field {
            FieldValue::Scalar(v) => v,
            FieldValue::Null => NULL,
            other => {
                return Err(Error::Type(
                    TypeError::new("scalar field", other.kind_name()).in_column(name),
                ));
            }
        };
        T::from_value(value).map_err(|e| match e {
            Error::Type(te) => Error::Type(te.in_column(name)),
            e => e,
        })
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate over (name, value) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Entity {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entity = Entity::new();
        for (k, v) in iter {
            entity.set(k, v);
        }
        entity
    }
}

/// An ordered collection of entities for one plural relation (or the
/// top-level result).
///
/// May carry a private identity index; equality compares entities only.
#[derive(Debug, Clone, Default)]
pub struct EntityList {
    pub(crate) entities: Vec<Entity>,
    pub(crate) index: Option<IdentityIndex>,
}

impl EntityList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    pub fn into_vec(self) -> Vec<Entity> {
        self.entities
    }
}

impl PartialEq for EntityList {
    fn eq(&self, other: &Self) -> bool {
        self.entities == other.entities
    }
}

impl Deref for EntityList {
    type Target = [Entity];

    fn deref(&self) -> &[Entity] {
        &self.entities
    }
}

impl From<Vec<Entity>> for EntityList {
    fn from(entities: Vec<Entity>) -> Self {
        Self {
            entities,
            index: None,
        }
    }
}

impl<'a> IntoIterator for &'a EntityList {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FieldValue::Scalar(v) => v.to_json().serialize(serializer),
            FieldValue::Object(e) => e.serialize(serializer),
            FieldValue::List(l) => l.serialize(serializer),
            FieldValue::Null => serializer.serialize_none(),
        }
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for EntityList {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.entities)
    }
}
