//! SQL Server type classification.
//!
//! Decides from a column's configured type name whether its literal is
//! quoted. Matching is substring containment in either direction, so a
//! configured `nvarchar(50)` matches the `nvarchar` entry and a bare `char`
//! matches `nvarchar(max)`. Names matching neither table fall open to
//! unquoted formatting.

use std::fmt;

/// Type names whose literals are single-quoted.
pub const QUOTED_TYPES: &[&str] = &[
    "char varying",
    "char",
    "character varying",
    "character",
    "date",
    "datetime",
    "datetime2",
    "datetimeoffset",
    "national char varying",
    "national character varying",
    "national character",
    "nchar",
    "ntext",
    "nvarchar",
    "nvarchar(max)",
    "rowversion",
    "text",
    "time",
    "timestamp",
    "varchar",
    "uniqueidentifier",
    "xml",
];

/// Type names whose literals are emitted bare.
pub const UNQUOTED_TYPES: &[&str] = &[
    "bigint",
    "binary",
    "bit",
    "dec",
    "decimal",
    "float",
    "image",
    "int",
    "money",
    "numeric",
    "real",
    "smallint",
    "smallmoney",
    "tinyint",
    "varbinary",
];

/// The binary type whose values are hex-encoded.
pub const BINARY_MAX: &str = "varbinary(max)";

/// Literal formatting class of a SQL type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    /// Literal is wrapped in single quotes.
    Quoted,
    /// Literal is emitted bare.
    Unquoted,
    /// Matches neither table; formatted bare.
    Unrecognized,
}

impl TypeClass {
    /// Returns whether literals of this class are quoted.
    #[must_use]
    pub const fn is_quoted(self) -> bool {
        matches!(self, Self::Quoted)
    }

    /// Returns a short lowercase name for display.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quoted => "quoted",
            Self::Unquoted => "unquoted",
            Self::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn matches_any(table: &[&str], sql_type: &str) -> bool {
    table
        .iter()
        .any(|entry| entry.contains(sql_type) || sql_type.contains(entry))
}

/// Classifies a SQL type name. Case-insensitive; surrounding whitespace is ignored.
#[must_use]
pub fn classify(sql_type: &str) -> TypeClass {
    let normalized = sql_type.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return TypeClass::Unrecognized;
    }

    if matches_any(QUOTED_TYPES, &normalized) {
        TypeClass::Quoted
    } else if matches_any(UNQUOTED_TYPES, &normalized) {
        TypeClass::Unquoted
    } else {
        TypeClass::Unrecognized
    }
}

/// Returns whether literals of `sql_type` must be quoted.
#[must_use]
pub fn requires_quoting(sql_type: &str) -> bool {
    classify(sql_type).is_quoted()
}

/// Returns whether `sql_type` is the hex-encoded binary type.
#[must_use]
pub fn is_binary_max(sql_type: &str) -> bool {
    sql_type.trim().eq_ignore_ascii_case(BINARY_MAX)
}
