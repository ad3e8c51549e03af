//! SQLNest - hydrate flat SQL join results into nested records.
//!
//! A join over related tables returns one flat row per combination of
//! related records. SQLNest folds those rows back into a tree described by a
//! [`Schema`]:
//!
//! - rows sharing a top-level identity collapse into one entity
//! - `Object` ("ONE") relations become nested records, rebuilt on every row
//! - `Array` ("MANY") relations accumulate one element per distinct identity
//! - entities appear in the order their identity was first seen
//!
//! # Quick Start
//!
//! ```
//! use sqlnest::prelude::*;
//! use serde_json::json;
//!
//! let schema = Schema::from_json(&json!([
//!     {"type": "COLUMN", "name": "id", "isId": true},
//!     {"type": "COLUMN", "name": "name"},
//!     {"type": "MANY", "name": "tracks", "properties": [
//!         {"type": "COLUMN", "name": "id", "column": "track_id", "isId": true},
//!         {"type": "COLUMN", "name": "title", "column": "track_title"}
//!     ]}
//! ]))
//! .unwrap();
//!
//! let albums = hydrate_json(
//!     &json!([
//!         {"id": 1, "name": "A", "track_id": 1, "track_title": "One"},
//!         {"id": 1, "name": "A", "track_id": 2, "track_title": "Two"}
//!     ]),
//!     &schema,
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     serde_json::to_value(&albums).unwrap(),
//!     json!([{"id": 1, "name": "A", "tracks": [
//!         {"id": 1, "title": "One"},
//!         {"id": 2, "title": "Two"}
//!     ]}])
//! );
//! ```

pub mod config;
pub mod entity;
pub mod hydrator;
pub mod identity;

pub use config::HydrateConfig;
pub use entity::{Entity, EntityList, FieldValue};
pub use hydrator::{Hydrator, hydrate, hydrate_json};
pub use identity::IdentityLookup;

// Re-export the input and schema types
pub use sqlnest_core::{
    ColumnInfo, Error, FromValue, Result, Row, SchemaError, SchemaErrorKind, TypeError, Value,
    rows_from_json, rows_from_str,
};
pub use sqlnest_schema::{ColumnDef, PropertyDef, PropertyKind, RelationDef, Schema};

/// Prelude module for convenient imports.
///
/// ```
/// use sqlnest::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Entity, EntityList, Error, FieldValue, FromValue, HydrateConfig, Hydrator,
        IdentityLookup, PropertyDef, Result, Row, Schema, Value, hydrate, hydrate_json,
        rows_from_json,
    };
}
