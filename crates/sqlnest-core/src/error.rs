//! Error types for SQLNest input adapters.
//!
//! Hydration itself never fails: a missing identity becomes a null field.
//! These errors come from turning external input (JSON datasets, declarative
//! schemas) into `Row`s and `Schema`s, and from typed value access.

use std::fmt;

/// The primary error type for SQLNest operations.
#[derive(Debug)]
pub enum Error {
    /// Type conversion errors
    Type(TypeError),
    /// Schema definition errors
    Schema(SchemaError),
    /// Serialization/deserialization errors
    Serde(String),
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
}

#[derive(Debug)]
pub struct SchemaError {
    pub kind: SchemaErrorKind,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorKind {
    /// Property `type` tag is not COLUMN, ONE or MANY
    UnknownPropertyType,
    /// Malformed schema document
    Invalid,
}

impl TypeError {
    /// Create a type error without column context.
    pub fn new(expected: &'static str, actual: impl Into<String>) -> Self {
        Self {
            expected,
            actual: actual.into(),
            column: None,
        }
    }

    /// Attach the column the value was read from.
    pub fn in_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

impl SchemaError {
    pub fn new(kind: SchemaErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }
}

impl Error {
    /// The column associated with a type error, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            Error::Type(e) => e.column.as_deref(),
            _ => None,
        }
    }

    pub fn is_schema_error(&self) -> bool {
        matches!(self, Error::Schema(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Type(e) => {
                if let Some(col) = &e.column {
                    write!(
                        f,
                        "Type error in column '{}': expected {}, found {}",
                        col, e.expected, e.actual
                    )
                } else {
                    write!(f, "Type error: expected {}, found {}", e.expected, e.actual)
                }
            }
            Error::Schema(e) => write!(f, "Schema error: {}", e.message),
            Error::Serde(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Schema(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}, found {}", self.expected, self.actual)
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Error::Schema(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err.to_string())
    }
}

/// Result type alias for SQLNest operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
