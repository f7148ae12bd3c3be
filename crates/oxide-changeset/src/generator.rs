//! Batch generation over a whole change-set.

use std::io::Write;

use tracing::info;

use crate::error::Result;
use crate::model::{EntityState, MutationRecord};
use crate::options::GeneratorOptions;
use crate::sink::{BufferSink, OutputSink, StreamSink};
use crate::statement::StatementCompiler;
use crate::tracker::ChangeSource;

/// Counts of what a batch contained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// INSERT statements written.
    pub inserts: usize,
    /// UPDATE statements written.
    pub updates: usize,
    /// DELETE statements written.
    pub deletes: usize,
    /// Modified records with nothing to update.
    pub skipped: usize,
}

impl BatchSummary {
    /// Total statements written.
    #[must_use]
    pub const fn statements(&self) -> usize {
        self.inserts + self.updates + self.deletes
    }
}

/// Records of a change-set grouped by state, in input order within each group.
#[derive(Debug, Default)]
pub struct Partition<'a> {
    /// Added records.
    pub added: Vec<&'a MutationRecord>,
    /// Modified records.
    pub modified: Vec<&'a MutationRecord>,
    /// Deleted records.
    pub deleted: Vec<&'a MutationRecord>,
}

/// Splits `records` by state. Unchanged records are dropped.
#[must_use]
pub fn partition(records: &[MutationRecord]) -> Partition<'_> {
    let mut partition = Partition::default();
    for record in records {
        match record.state {
            EntityState::Added => partition.added.push(record),
            EntityState::Modified => partition.modified.push(record),
            EntityState::Deleted => partition.deleted.push(record),
            EntityState::Unchanged => {}
        }
    }
    partition
}

/// Compiles change-sets into `sp_executesql` batches.
///
/// # Example
///
/// ```
/// use oxide_changeset::{BatchGenerator, MutationRecord, PropertyValue};
///
/// let records = vec![
///     MutationRecord::deleted("Blog").property(PropertyValue::new("Id", "int", 2).primary_key()),
/// ];
/// let sql = BatchGenerator::new().generate(&records).unwrap();
/// assert_eq!(
///     sql,
///     "EXECUTE sp_executesql N'DELETE FROM Blog WHERE [Id] = @p0', N'@p0 int', @p0 = 2;"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct BatchGenerator {
    options: GeneratorOptions,
}

impl BatchGenerator {
    /// Creates a generator with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator with the given options.
    #[must_use]
    pub const fn with_options(options: GeneratorOptions) -> Self {
        Self { options }
    }

    /// Returns the options in use.
    #[must_use]
    pub const fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Compiles `records` into `sink`: all inserts, then updates, then deletes.
    ///
    /// On error the sink keeps the statements already written.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a statement or the sink.
    pub fn compile(
        &self,
        records: &[MutationRecord],
        sink: &mut dyn OutputSink,
    ) -> Result<BatchSummary> {
        let groups = partition(records);
        info!(
            inserts = groups.added.len(),
            updates = groups.modified.len(),
            deletes = groups.deleted.len(),
            "Generating batch"
        );

        let compiler = StatementCompiler::new(&self.options);
        let mut summary = BatchSummary::default();

        for record in groups.added {
            compiler.insert(record, sink)?;
            summary.inserts += 1;
        }
        for record in groups.modified {
            if compiler.update(record, sink)? {
                summary.updates += 1;
            } else {
                summary.skipped += 1;
            }
        }
        for record in groups.deleted {
            compiler.delete(record, sink)?;
            summary.deletes += 1;
        }

        info!(
            statements = summary.statements(),
            skipped = summary.skipped,
            "Batch generated"
        );
        Ok(summary)
    }

    /// Compiles `records` into a string.
    ///
    /// # Errors
    ///
    /// See [`BatchGenerator::compile`].
    pub fn generate(&self, records: &[MutationRecord]) -> Result<String> {
        let mut sink = BufferSink::new();
        self.compile(records, &mut sink)?;
        Ok(sink.into_string())
    }

    /// Streams the batch for `records` to `writer`.
    ///
    /// # Errors
    ///
    /// See [`BatchGenerator::compile`]. Also fails if the final flush fails.
    pub fn write_to<W: Write>(
        &self,
        records: &[MutationRecord],
        writer: W,
    ) -> Result<BatchSummary> {
        let mut sink = StreamSink::new(writer);
        let summary = self.compile(records, &mut sink)?;
        sink.finish()?;
        Ok(summary)
    }

    /// Compiles everything `source` reports as pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot enumerate its changes, or see
    /// [`BatchGenerator::compile`].
    pub fn generate_from<C: ChangeSource + ?Sized>(&self, source: &C) -> Result<String> {
        let records = source.enumerate_changes()?;
        self.generate(&records)
    }
}

/// Compiles `records` into a string with default options.
///
/// # Errors
///
/// See [`BatchGenerator::compile`].
pub fn generate(records: &[MutationRecord]) -> Result<String> {
    BatchGenerator::new().generate(records)
}
