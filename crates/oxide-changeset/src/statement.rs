//! Statement compilation.
//!
//! Every record becomes one `EXECUTE sp_executesql` call: the statement text
//! with `@p<i>` placeholders, the parameter type clause, and the parameter
//! assignments with their literal values.

use tracing::{debug, warn};

use crate::error::Result;
use crate::literal::format_literal;
use crate::model::{MutationRecord, PropertyValue, StatementKind};
use crate::options::GeneratorOptions;
use crate::select::select_handled;
use crate::sink::OutputSink;

const EXECUTE: &str = "EXECUTE sp_executesql N'";

/// Returns the placeholder for the parameter at `index`.
#[must_use]
pub fn parameter_name(index: usize) -> String {
    format!("@p{index}")
}

/// Bracket-quotes a column name, doubling any `]`.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Doubles `'` so `text` survives inside an `N'...'` literal.
#[must_use]
pub fn escape_embedded(text: &str) -> String {
    text.replace('\'', "''")
}

/// Identifier as written into the statement text.
fn embedded_identifier(name: &str) -> String {
    escape_embedded(&quote_identifier(name))
}

/// Compiles single records into a sink.
#[derive(Debug, Clone, Copy)]
pub struct StatementCompiler<'a> {
    options: &'a GeneratorOptions,
}

impl<'a> StatementCompiler<'a> {
    /// Creates a compiler using `options`.
    #[must_use]
    pub const fn new(options: &'a GeneratorOptions) -> Self {
        Self { options }
    }

    /// Compiles `record` into the statement its state calls for.
    ///
    /// Returns `false` when nothing was written: the record is unchanged, or
    /// it is modified with no updatable property.
    ///
    /// # Errors
    ///
    /// Returns an error on a missing or ambiguous key, an unrecognized type in
    /// strict mode, or a sink failure. Key and type errors are raised before
    /// any text of the statement is written.
    pub fn compile(&self, record: &MutationRecord, sink: &mut dyn OutputSink) -> Result<bool> {
        match record.statement_kind() {
            None => Ok(false),
            Some(StatementKind::Insert) => self.insert(record, sink).map(|()| true),
            Some(StatementKind::Update) => self.update(record, sink),
            Some(StatementKind::Delete) => self.delete(record, sink),
        }
    }

    /// Writes an INSERT for `record`.
    ///
    /// # Errors
    ///
    /// See [`StatementCompiler::compile`].
    pub fn insert(&self, record: &MutationRecord, sink: &mut dyn OutputSink) -> Result<()> {
        let selection = select_handled(record, StatementKind::Insert)?;
        let params = selection.handled;

        if params.is_empty() {
            sink.append(EXECUTE)?;
            sink.append(&format!(
                "INSERT INTO {} DEFAULT VALUES'",
                escape_embedded(&record.table_name)
            ))?;
            self.terminate(sink)?;
            debug!(table = %record.table_name, "Compiled INSERT with default values");
            return Ok(());
        }

        let literals = self.literals(&params)?;

        sink.append(EXECUTE)?;
        sink.append(&format!("INSERT INTO {} (", escape_embedded(&record.table_name)))?;
        write_separated(sink, &params, ", ", |_, p| embedded_identifier(&p.column_name))?;
        sink.append(") VALUES (")?;
        write_separated(sink, &params, ",", |i, _| parameter_name(i))?;
        sink.append(")'")?;
        write_parameters(sink, &params, &literals)?;
        self.terminate(sink)?;

        debug!(
            table = %record.table_name,
            parameters = params.len(),
            "Compiled INSERT"
        );
        Ok(())
    }

    /// Writes an UPDATE for `record`.
    ///
    /// Returns `false`, writing nothing, when no property is updatable.
    ///
    /// # Errors
    ///
    /// See [`StatementCompiler::compile`].
    pub fn update(&self, record: &MutationRecord, sink: &mut dyn OutputSink) -> Result<bool> {
        let selection = select_handled(record, StatementKind::Update)?;
        let Some(key) = selection.primary_key else {
            return Ok(false);
        };

        if selection.handled.is_empty() {
            warn!(
                table = %record.table_name,
                "Skipping UPDATE with no modified columns"
            );
            return Ok(false);
        }

        let params = selection.parameters();
        let literals = self.literals(&params)?;
        let key_index = selection.handled.len();

        sink.append(EXECUTE)?;
        sink.append(&format!("UPDATE {} SET ", escape_embedded(&record.table_name)))?;
        write_separated(sink, &selection.handled, ", ", |i, p| {
            format!("{} = {}", embedded_identifier(&p.column_name), parameter_name(i))
        })?;
        sink.append(&format!(
            " WHERE {}={}'",
            embedded_identifier(&key.column_name),
            parameter_name(key_index)
        ))?;
        write_parameters(sink, &params, &literals)?;
        self.terminate(sink)?;

        debug!(
            table = %record.table_name,
            parameters = params.len(),
            "Compiled UPDATE"
        );
        Ok(true)
    }

    /// Writes a DELETE for `record`.
    ///
    /// # Errors
    ///
    /// See [`StatementCompiler::compile`].
    pub fn delete(&self, record: &MutationRecord, sink: &mut dyn OutputSink) -> Result<bool> {
        let selection = select_handled(record, StatementKind::Delete)?;
        let Some(key) = selection.primary_key else {
            return Ok(false);
        };
        let params = [key];
        let literals = self.literals(&params)?;

        sink.append(EXECUTE)?;
        sink.append(&format!(
            "DELETE FROM {} WHERE {} = {}'",
            escape_embedded(&record.table_name),
            embedded_identifier(&key.column_name),
            parameter_name(0)
        ))?;
        write_parameters(sink, &params, &literals)?;
        self.terminate(sink)?;

        debug!(table = %record.table_name, "Compiled DELETE");
        Ok(true)
    }

    fn literals(&self, params: &[&PropertyValue]) -> Result<Vec<String>> {
        params
            .iter()
            .map(|p| format_literal(&p.current_value, &p.sql_type, self.options))
            .collect()
    }

    fn terminate(&self, sink: &mut dyn OutputSink) -> Result<()> {
        if self.options.statement_per_line {
            sink.append_line(";")?;
        } else {
            sink.append(";")?;
        }
        if self.options.flush_each_statement {
            sink.flush()?;
        }
        Ok(())
    }
}

/// Writes `items` rendered by `render`, with `separator` between them.
fn write_separated<T>(
    sink: &mut dyn OutputSink,
    items: &[T],
    separator: &str,
    mut render: impl FnMut(usize, &T) -> String,
) -> Result<()> {
    let last = items.len().saturating_sub(1);
    for (index, item) in items.iter().enumerate() {
        sink.append(&render(index, item))?;
        if index != last {
            sink.append(separator)?;
        }
    }
    Ok(())
}

/// Writes the type clause and the value assignments.
fn write_parameters(
    sink: &mut dyn OutputSink,
    params: &[&PropertyValue],
    literals: &[String],
) -> Result<()> {
    sink.append(", N'")?;
    write_separated(sink, params, ",", |i, p| {
        format!("{} {}", parameter_name(i), escape_embedded(&p.sql_type))
    })?;
    sink.append("', ")?;
    write_separated(sink, literals, ",", |i, literal| {
        format!("{} = {literal}", parameter_name(i))
    })
}
