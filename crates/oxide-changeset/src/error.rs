//! Error types for change-set compilation.

use crate::model::StatementKind;

/// Errors that can occur while compiling a change-set.
#[derive(Debug, thiserror::Error)]
pub enum ChangesetError {
    /// An UPDATE or DELETE target has no primary key column.
    #[error("{kind} on table '{table}' requires a primary key, but none is mapped")]
    MissingPrimaryKey {
        /// Table the statement targets.
        table: String,
        /// Statement being compiled.
        kind: StatementKind,
    },

    /// An UPDATE or DELETE target has more than one primary key column.
    #[error("{kind} on table '{table}' found {count} primary key columns, expected exactly one")]
    MultiplePrimaryKeys {
        /// Table the statement targets.
        table: String,
        /// Statement being compiled.
        kind: StatementKind,
        /// Number of key columns found.
        count: usize,
    },

    /// A SQL type name matched neither classification table (strict mode only).
    #[error("Unrecognized SQL type '{0}'")]
    UnrecognizedSqlType(String),

    /// A NaN or infinite float has no T-SQL literal form.
    #[error("Non-finite value {value} cannot be written as a '{sql_type}' literal")]
    NonFiniteNumber {
        /// SQL type of the column.
        sql_type: String,
        /// The offending value as rendered by Rust.
        value: String,
    },

    /// The entity type has no table mapping.
    #[error("Entity type '{0}' is not mapped to a table")]
    UnknownEntity(String),

    /// The entity type has no column mapped for the property.
    #[error("Entity type '{entity}' has no mapped property '{property}'")]
    UnknownProperty {
        /// Entity type name.
        entity: String,
        /// Property that was looked up.
        property: String,
    },

    /// The change tracker has no entry with this id (never added, or detached).
    #[error("No tracked entry with id {0}")]
    UnknownEntry(usize),

    /// IO error while writing to a stream sink.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error (change-set or options files).
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChangesetError {
    /// Returns whether this error was raised by a missing or ambiguous key.
    #[must_use]
    pub const fn is_key_error(&self) -> bool {
        matches!(
            self,
            Self::MissingPrimaryKey { .. } | Self::MultiplePrimaryKeys { .. }
        )
    }
}

/// Result type for change-set operations.
pub type Result<T> = std::result::Result<T, ChangesetError>;
