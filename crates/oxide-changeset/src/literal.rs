//! Parameter value literals.
//!
//! Values are inlined as literals in the value clause of `sp_executesql`;
//! only the placeholders inside the statement text are parameters.

use tracing::warn;

use crate::error::{ChangesetError, Result};
use crate::options::GeneratorOptions;
use crate::types::{classify, is_binary_max, TypeClass};
use crate::value::{hex_literal, SqlValue};

/// Renders `value` as a literal for a column of type `sql_type`.
///
/// NULL renders as `NULL` for every type. Otherwise quoted types get their
/// text in single quotes, `varbinary(max)` gets `0x` hex, and everything
/// else is emitted bare.
///
/// # Errors
///
/// Returns [`ChangesetError::UnrecognizedSqlType`] when `options.strict_types`
/// is set and `sql_type` matches neither classification table, and
/// [`ChangesetError::NonFiniteNumber`] for NaN or infinite floats.
pub fn format_literal(
    value: &SqlValue,
    sql_type: &str,
    options: &GeneratorOptions,
) -> Result<String> {
    let class = classify(sql_type);
    if class == TypeClass::Unrecognized {
        if options.strict_types {
            return Err(ChangesetError::UnrecognizedSqlType(sql_type.to_string()));
        }
        warn!(sql_type = %sql_type, "Unrecognized SQL type, formatting value unquoted");
    }

    if value.is_null() {
        return Ok(String::from("NULL"));
    }

    let finite = match value {
        SqlValue::Real(x) => x.is_finite(),
        SqlValue::Float(x) => x.is_finite(),
        _ => true,
    };
    if !finite {
        return Err(ChangesetError::NonFiniteNumber {
            sql_type: sql_type.to_string(),
            value: value.to_string(),
        });
    }

    if class.is_quoted() {
        return Ok(quote(&value.to_string(), options.escape_quotes));
    }

    if is_binary_max(sql_type) {
        if let Some(bytes) = value.as_bytes() {
            return Ok(hex_literal(bytes));
        }
    }

    Ok(value.to_string())
}

/// Wraps `text` in single quotes, doubling embedded quotes when `escape` is set.
#[must_use]
pub fn quote(text: &str, escape: bool) -> String {
    if escape {
        format!("'{}'", text.replace('\'', "''"))
    } else {
        format!("'{text}'")
    }
}
