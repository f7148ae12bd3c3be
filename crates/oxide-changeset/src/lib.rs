//! Compile tracked entity changes into SQL Server `sp_executesql` batches.
//!
//! `oxide-changeset` turns a change-set (entities marked added, modified or
//! deleted) into a batch of `EXECUTE sp_executesql` calls, one per entity,
//! with every parameter value inlined as a T-SQL literal. The batch is meant
//! to be inspected, logged or run by hand; nothing here talks to a database.
//!
//! # Architecture
//!
//! - **Model** - [`MutationRecord`]s and their [`PropertyValue`]s
//! - **Selector** - which properties take part in each statement
//! - **Types** - whether a SQL type's literal is quoted
//! - **Literal** - rendering values as T-SQL literals
//! - **Statement** - compiling one record into one `sp_executesql` call
//! - **Generator** - ordering a change-set into a batch
//! - **Sink** - where the text goes (a string or any writer)
//! - **Schema** / **Tracker** - building records from in-memory entities
//!
//! # Example
//!
//! ```rust
//! use oxide_changeset::prelude::*;
//!
//! let schema = Schema::new().entity(
//!     EntityMapping::new("Blog", "Blog")
//!         .column(ColumnMapping::new("Id", "int").identity())
//!         .column(ColumnMapping::new("Name", "nvarchar(max)")),
//! );
//! let mut tracker = ChangeTracker::new(schema);
//! let blog = tracker
//!     .attach("Blog", [("Id", SqlValue::Int(1)), ("Name", "Blog1".to_sql_value())])
//!     .unwrap();
//! tracker.set(blog, "Name", "Blog is Updated").unwrap();
//!
//! let sql = BatchGenerator::new().generate_from(&tracker).unwrap();
//! assert_eq!(
//!     sql,
//!     "EXECUTE sp_executesql N'UPDATE Blog SET [Name] = @p0 WHERE [Id]=@p1', \
//!      N'@p0 nvarchar(max),@p1 int', @p0 = 'Blog is Updated',@p1 = 1;"
//! );
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Compile a JSON change-set to stdout
//! oxide-changeset generate --input changes.json
//!
//! # One statement per line, into a file
//! oxide-changeset generate --input changes.json --output batch.sql --statement-per-line
//!
//! # Show how type names are classified
//! oxide-changeset classify "nvarchar(50)" int smalldatetime
//! ```

pub mod error;
pub mod generator;
pub mod literal;
pub mod model;
pub mod options;
pub mod schema;
pub mod select;
pub mod sink;
pub mod statement;
pub mod tracker;
pub mod types;
pub mod value;

pub use error::{ChangesetError, Result};
pub use generator::{generate, BatchGenerator, BatchSummary};
pub use model::{EntityState, MutationRecord, PropertyValue, StatementKind, ValueGenerated};
pub use options::GeneratorOptions;
pub use sink::{BufferSink, OutputSink, StreamSink};
pub use value::{SqlValue, ToSqlValue};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{ChangesetError, Result};
    pub use crate::generator::{generate, BatchGenerator, BatchSummary};
    pub use crate::literal::format_literal;
    pub use crate::model::{
        EntityState, MutationRecord, PropertyValue, StatementKind, ValueGenerated,
    };
    pub use crate::options::GeneratorOptions;
    pub use crate::schema::{ColumnMapping, EntityMapping, Schema, SchemaResolver};
    pub use crate::sink::{BufferSink, OutputSink, StreamSink};
    pub use crate::statement::StatementCompiler;
    pub use crate::tracker::{ChangeSource, ChangeTracker, EntryId};
    pub use crate::types::{classify, requires_quoting, TypeClass};
    pub use crate::value::{SqlValue, ToSqlValue};
}
