//! Error types for querygen

use thiserror::Error;

/// Result type alias for querygen operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for SQL generation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrmError {
    /// A property selector does not resolve to a known, non-ignored column
    #[error("Invalid property \"{property}\" on {type_name}! Is it ignored?")]
    InvalidProperty { type_name: String, property: String },

    /// The operation needs a primary key and the type declares none
    #[error("No primary key found for type: {0}")]
    NoPrimaryKeyFound(String),

    /// An upsert needs conflict columns and the type declares no unique group
    #[error("No unique key found for type: {0}")]
    NoUniqueKeyFound(String),

    /// A statement was asked to render with zero columns
    #[error("No columns to {clause} for table: {table}")]
    EmptyColumnSet { table: String, clause: String },

    /// `update_only` was called without naming a single SET column
    #[error("No set properties found for type: {0}")]
    EmptySetList(String),

    /// Malformed input to a pure utility
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Settings could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl OrmError {
    /// Create an invalid property error
    pub fn invalid_property(type_name: impl Into<String>, property: impl Into<String>) -> Self {
        Self::InvalidProperty {
            type_name: type_name.into(),
            property: property.into(),
        }
    }

    /// Create an empty column set error
    pub fn empty_columns(table: impl Into<String>, clause: impl Into<String>) -> Self {
        Self::EmptyColumnSet {
            table: table.into(),
            clause: clause.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Check if this is an invalid property error
    pub fn is_invalid_property(&self) -> bool {
        matches!(self, Self::InvalidProperty { .. })
    }

    /// Check if this is a missing primary key error
    pub fn is_no_primary_key(&self) -> bool {
        matches!(self, Self::NoPrimaryKeyFound(_))
    }

    /// Check if this is a missing unique key error
    pub fn is_no_unique_key(&self) -> bool {
        matches!(self, Self::NoUniqueKeyFound(_))
    }
}

impl From<toml::de::Error> for OrmError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for OrmError {
    fn from(err: std::io::Error) -> Self {
        Self::Config(err.to_string())
    }
}
