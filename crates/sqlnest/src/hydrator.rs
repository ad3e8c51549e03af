//! Hydration of flat rows into nested entities.
//!
//! For every row the hydrator resolves (or creates) the top-level entity by
//! its identity columns, then walks the schema in declaration order:
//!
//! - non-identity columns are written onto the entity (last write wins)
//! - `Object` relations are rebuilt from the row and replace the field
//! - `Array` relations resolve an element by identity inside the existing
//!   list and merge into it
//!
//! A level whose identity is null or absent in a row contributes nothing for
//! that row: the top level skips the row, nested levels set their field to
//! null. For arrays that discards everything accumulated so far; a later row
//! with a valid identity starts a fresh list.

use crate::config::HydrateConfig;
use crate::entity::{Entity, EntityList, FieldValue};
use crate::identity::{IdentityLookup, identity_entity, identity_missing, resolve_entity};
use sqlnest_core::{Result, Row, rows_from_json};
use sqlnest_schema::{ColumnDef, PropertyDef, RelationDef, Schema, identity_columns};

/// Hydrates datasets against one schema.
///
/// # Example
///
/// ```
/// use sqlnest::prelude::*;
///
/// let schema = Schema::new(vec![
///     PropertyDef::id("id", "id"),
///     PropertyDef::array(
///         "tracks",
///         vec![
///             PropertyDef::id("id", "track_id"),
///             PropertyDef::column("title", "track_title"),
///         ],
///     ),
/// ]);
///
/// let rows = vec![
///     Row::from_pairs([("id", Value::BigInt(1)), ("track_id", 1i64.into()), ("track_title", "A".into())]),
///     Row::from_pairs([("id", Value::BigInt(1)), ("track_id", 2i64.into()), ("track_title", "B".into())]),
/// ];
///
/// let albums = Hydrator::new(&schema).hydrate(&rows);
/// assert_eq!(albums.len(), 1);
/// assert_eq!(albums[0].get_list("tracks").map(|t| t.len()), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct Hydrator<'s> {
    schema: &'s Schema,
    config: HydrateConfig,
}

impl<'s> Hydrator<'s> {
    /// Create a hydrator with the default configuration.
    pub fn new(schema: &'s Schema) -> Self {
        Self::with_config(schema, HydrateConfig::default())
    }

    pub fn with_config(schema: &'s Schema, config: HydrateConfig) -> Self {
        for path in schema.levels_without_identity() {
            tracing::warn!(
                level = %path,
                "Schema level has no identity columns; every row will match its first entity"
            );
        }
        Self { schema, config }
    }

    pub fn schema(&self) -> &Schema {
        self.schema
    }

    pub fn config(&self) -> &HydrateConfig {
        &self.config
    }

    /// Hydrate `rows` into top-level entities in first-seen order.
    #[tracing::instrument(level = "debug", skip_all, fields(rows = rows.len()))]
    pub fn hydrate(&self, rows: &[Row]) -> Vec<Entity> {
        let id_cols: Vec<&ColumnDef> = self.schema.identity_columns().collect();
        let lookup = self.level_lookup(self.schema.properties());
        let mut result = EntityList::new();
        let mut skipped = 0usize;

        for (i, row) in rows.iter().enumerate() {
            let Some(entity) = resolve_entity(&id_cols, row, &mut result, lookup) else {
                tracing::trace!(row = i, "Row has no top-level identity, skipping");
                skipped += 1;
                continue;
            };
            self.fill(self.schema.properties(), row, entity);
        }

        tracing::debug!(
            entities = result.len(),
            skipped,
            lookup = ?self.config.identity_lookup,
            "Hydration complete"
        );
        result.into_vec()
    }

    /// Lookup mode for one level.
    ///
    /// A hashed index keys entities by their identity at creation, so levels
    /// that can rewrite an identity field afterwards are scanned.
    fn level_lookup(&self, properties: &[PropertyDef]) -> IdentityLookup {
        match self.config.identity_lookup {
            IdentityLookup::Hashed if identity_shadowed(properties) => IdentityLookup::Scan,
            lookup => lookup,
        }
    }

    /// Write one row's contribution to a resolved entity.
    fn fill(&self, properties: &[PropertyDef], row: &Row, entity: &mut Entity) {
        for property in properties {
            match property {
                // Identity fields were written when the entity was created.
                PropertyDef::Column(col) if col.is_identity => {}
                PropertyDef::Column(col) => {
                    entity.set(
                        col.name.as_str(),
                        row.value_or_null(&col.source_column).clone(),
                    );
                }
                PropertyDef::Object(rel) => self.resolve_object(rel, row, entity),
                PropertyDef::Array(rel) => self.resolve_array(rel, row, entity),
            }
        }
    }

    /// Rebuild a singular relation from `row` and replace the parent's field.
    ///
    /// Unlike arrays, the previous object is never looked up or merged into.
    fn resolve_object(&self, rel: &RelationDef, row: &Row, parent: &mut Entity) {
        let id_cols: Vec<&ColumnDef> = identity_columns(&rel.children).collect();
        if identity_missing(&id_cols, row) {
            tracing::trace!(relation = %rel.name, "Object identity missing, nulling field");
            parent.set_null(rel.name.as_str());
            return;
        }

        let mut object = identity_entity(&id_cols, row);
        self.fill(&rel.children, row, &mut object);
        parent.set(rel.name.as_str(), FieldValue::Object(object));
    }

    /// Resolve one element of a plural relation and merge `row` into it.
    fn resolve_array(&self, rel: &RelationDef, row: &Row, parent: &mut Entity) {
        let id_cols: Vec<&ColumnDef> = identity_columns(&rel.children).collect();
        let lookup = self.level_lookup(&rel.children);
        let list = parent.list_entry(&rel.name);

        match resolve_entity(&id_cols, row, list, lookup) {
            Some(element) => self.fill(&rel.children, row, element),
            None => {
                tracing::trace!(relation = %rel.name, "Array identity missing, nulling field");
                parent.set_null(rel.name.as_str());
            }
        }
    }
}

/// Whether an identity column's field name is also written by another
/// property of the same level.
fn identity_shadowed(properties: &[PropertyDef]) -> bool {
    identity_columns(properties).any(|id| {
        properties
            .iter()
            .filter(|p| p.name() == id.name)
            .nth(1)
            .is_some()
    })
}

/// Hydrate `rows` against `schema` with the default configuration.
pub fn hydrate(rows: &[Row], schema: &Schema) -> Vec<Entity> {
    Hydrator::new(schema).hydrate(rows)
}

/// Load a dataset from a JSON array of objects and hydrate it.
pub fn hydrate_json(dataset: &serde_json::Value, schema: &Schema) -> Result<Vec<Entity>> {
    let rows = rows_from_json(dataset)?;
    Ok(hydrate(&rows, schema))
}
