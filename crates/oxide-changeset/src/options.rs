//! Generator options.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options controlling batch generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Double single quotes inside quoted literals.
    ///
    /// Disabling this reproduces raw interpolation, where a value containing
    /// `'` corrupts the statement.
    pub escape_quotes: bool,
    /// Fail on SQL type names that match neither classification table
    /// instead of formatting them unquoted.
    pub strict_types: bool,
    /// Terminate each statement with a line break after its `;`.
    pub statement_per_line: bool,
    /// Flush the sink after every statement.
    pub flush_each_statement: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            escape_quotes: true,
            strict_types: false,
            statement_per_line: false,
            flush_each_statement: false,
        }
    }
}

impl GeneratorOptions {
    /// Creates the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads options from a JSON document. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON for these options.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads options from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Sets quote escaping.
    #[must_use]
    pub const fn escape_quotes(mut self, enabled: bool) -> Self {
        self.escape_quotes = enabled;
        self
    }

    /// Sets strict type classification.
    #[must_use]
    pub const fn strict_types(mut self, enabled: bool) -> Self {
        self.strict_types = enabled;
        self
    }

    /// Sets one statement per line.
    #[must_use]
    pub const fn statement_per_line(mut self, enabled: bool) -> Self {
        self.statement_per_line = enabled;
        self
    }

    /// Sets flushing after every statement.
    #[must_use]
    pub const fn flush_each_statement(mut self, enabled: bool) -> Self {
        self.flush_each_statement = enabled;
        self
    }
}
