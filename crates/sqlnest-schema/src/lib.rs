//! Nesting schemas for SQLNest.
//!
//! A schema is an ordered tree of property definitions describing the shape
//! of each hydrated record:
//! - `Column` maps one output field to one input column, optionally as part
//!   of the level's identity
//! - `Object` is a singular nested relation ("ONE")
//! - `Array` is a plural nested relation ("MANY")
//!
//! Schemas are plain data. They can be built in code or loaded from the
//! declarative JSON form (`{"type": "COLUMN" | "ONE" | "MANY", ...}`).

pub mod property;
pub mod schema;

pub use property::{
    ColumnDef, PropertyDef, PropertyKind, RelationDef, identity_columns, relations, value_columns,
};
pub use schema::Schema;
