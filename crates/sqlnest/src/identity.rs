//! Identity resolution: the dedup primitive shared by every level.
//!
//! Within one collection (the top-level result or one nested list) there is
//! at most one entity per identity tuple, and entities keep the order their
//! identity was first seen. Rows compare by raw column values; stored
//! entities compare by their mapped identity fields.

use crate::entity::{Entity, EntityList, FieldValue};
use serde::Deserialize;
use sqlnest_core::{Row, Value, hash_value};
use sqlnest_schema::ColumnDef;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;

/// How `resolve_entity` finds an existing entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityLookup {
    /// Linear scan of the collection (default).
    #[default]
    Scan,
    /// Hash index per collection, confirmed with `==`.
    ///
    /// The index keys entities by the identity values they were created
    /// with. Levels where another property shares a name with an identity
    /// column are resolved by scan instead, so output matches `Scan`.
    Hashed,
}

/// Identity-tuple hash -> entity positions, in insertion order.
#[derive(Debug, Clone, Default)]
pub(crate) struct IdentityIndex {
    buckets: HashMap<u64, Vec<usize>>,
}

impl IdentityIndex {
    fn build(entities: &[Entity], id_cols: &[&ColumnDef]) -> Self {
        let mut index = Self::default();
        for (pos, entity) in entities.iter().enumerate() {
            index.insert(hash_entity_identity(entity, id_cols), pos);
        }
        index
    }

    fn insert(&mut self, hash: u64, pos: usize) {
        self.buckets.entry(hash).or_default().push(pos);
    }

    fn candidates(&self, hash: u64) -> &[usize] {
        self.buckets
            .get(&hash)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

fn hash_row_identity(row: &Row, id_cols: &[&ColumnDef]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for col in id_cols {
        hash_value(row.value_or_null(&col.source_column), &mut hasher);
    }
    hasher.finish()
}

fn hash_entity_identity(entity: &Entity, id_cols: &[&ColumnDef]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for col in id_cols {
        match entity.get(&col.name) {
            Some(FieldValue::Scalar(v)) => hash_value(v, &mut hasher),
            // Never equal to a row value, so any bucket will do.
            _ => hasher.write_u8(0xff),
        }
    }
    hasher.finish()
}

/// Whether `entity` carries the same identity as `row`.
///
/// An empty `id_cols` matches every entity.
fn matches_identity(entity: &Entity, row: &Row, id_cols: &[&ColumnDef]) -> bool {
    id_cols.iter().all(|col| {
        entity.get(&col.name).and_then(FieldValue::as_value)
            == Some(row.value_or_null(&col.source_column))
    })
}

/// Resolve-or-create the entity for `row` inside `list`.
///
/// Returns `None` when any identity column is null or absent in `row`; the
/// list is untouched in that case. Otherwise returns the first entity whose
/// identity fields equal the row's identity values, or appends a new entity
/// holding only those identity fields.
///
/// Identities compare with `Value` equality, so a `Double(NaN)` identity
/// never matches and every such row creates a new entity.
pub(crate) fn resolve_entity<'a>(
    id_cols: &[&ColumnDef],
    row: &Row,
    list: &'a mut EntityList,
    lookup: IdentityLookup,
) -> Option<&'a mut Entity> {
    if identity_missing(id_cols, row) {
        return None;
    }

    let found = match lookup {
        IdentityLookup::Scan => list
            .entities
            .iter()
            .position(|e| matches_identity(e, row, id_cols)),
        IdentityLookup::Hashed => {
            let entities = &list.entities;
            let index = list
                .index
                .get_or_insert_with(|| IdentityIndex::build(entities, id_cols));
            index
                .candidates(hash_row_identity(row, id_cols))
                .iter()
                .copied()
                .find(|&pos| matches_identity(&entities[pos], row, id_cols))
        }
    };

    if let Some(pos) = found {
        return Some(&mut list.entities[pos]);
    }

    let pos = list.entities.len();
    if let Some(index) = list.index.as_mut() {
        index.insert(hash_row_identity(row, id_cols), pos);
    }
    list.entities.push(identity_entity(id_cols, row));
    list.entities.last_mut()
}

/// Whether any identity column is null or absent in `row`.
pub(crate) fn identity_missing(id_cols: &[&ColumnDef], row: &Row) -> bool {
    id_cols.iter().any(|col| row.is_null(&col.source_column))
}

/// Identity fields of a fresh entity, in declaration order.
pub(crate) fn identity_entity(id_cols: &[&ColumnDef], row: &Row) -> Entity {
    id_cols
        .iter()
        .map(|col| {
            (
                col.name.clone(),
                Value::clone(row.value_or_null(&col.source_column)),
            )
        })
        .collect()
}
