//! Core types for SQLNest.
//!
//! This crate provides the flat-input side of hydration:
//!
//! - `Value` for dynamically-typed scalar column values
//! - `Row` and `ColumnInfo` for one record of a joined result set
//! - `FromValue` for typed access to values
//! - `Error` / `Result` for the input adapters

pub mod error;
pub mod row;
pub mod value;

pub use error::{Error, Result, SchemaError, SchemaErrorKind, TypeError};
pub use row::{ColumnInfo, FromValue, Row, rows_from_json, rows_from_str};
pub use value::{Value, hash_value};
