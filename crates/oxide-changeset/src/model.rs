//! Mutation records consumed by the statement compiler.
//!
//! A [`MutationRecord`] is one tracked entity plus its pending change state.
//! Its properties carry everything the compiler needs from the schema and
//! change-tracking collaborators, so compilation itself never looks anything
//! up. Records are plain data and derive serde so a change-set can be read
//! from JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{SqlValue, ToSqlValue};

/// Pending change state of a tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntityState {
    /// Tracked but not changed. Ignored by the compiler.
    #[default]
    Unchanged,
    /// New entity, compiled to INSERT.
    Added,
    /// Existing entity with changed values, compiled to UPDATE.
    Modified,
    /// Existing entity marked for removal, compiled to DELETE.
    Deleted,
}

/// When the database assigns a column's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueGenerated {
    /// Always supplied by the client.
    #[default]
    Never,
    /// Assigned on insert (identity columns).
    OnAdd,
    /// Assigned on update.
    OnUpdate,
    /// Assigned on every write (computed and rowversion columns).
    OnAddOrUpdate,
}

impl ValueGenerated {
    /// Returns whether the database assigns this column on insert.
    #[must_use]
    pub const fn on_add(self) -> bool {
        matches!(self, Self::OnAdd | Self::OnAddOrUpdate)
    }

    /// Returns whether the database assigns this column on update.
    #[must_use]
    pub const fn on_update(self) -> bool {
        matches!(self, Self::OnUpdate | Self::OnAddOrUpdate)
    }
}

/// The statement a record compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// `INSERT INTO ... VALUES ...`
    Insert,
    /// `UPDATE ... SET ... WHERE ...`
    Update,
    /// `DELETE FROM ... WHERE ...`
    Delete,
}

impl StatementKind {
    /// Returns the SQL keyword for this statement.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }

    /// Returns the statement a record in `state` compiles to, if any.
    #[must_use]
    pub const fn for_state(state: EntityState) -> Option<Self> {
        match state {
            EntityState::Added => Some(Self::Insert),
            EntityState::Modified => Some(Self::Update),
            EntityState::Deleted => Some(Self::Delete),
            EntityState::Unchanged => None,
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field of one mutation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyValue {
    /// Column name, unquoted.
    pub column_name: String,
    /// SQL Server type name as configured, e.g. `nvarchar(max)`.
    pub sql_type: String,
    /// Whether this column is the primary key.
    #[serde(default)]
    pub is_primary_key: bool,
    /// Value-generation policy.
    #[serde(default)]
    pub value_generated: ValueGenerated,
    /// Whether the in-memory value differs from the persisted one.
    #[serde(default)]
    pub is_modified: bool,
    /// The in-memory value.
    #[serde(default)]
    pub current_value: SqlValue,
}

impl PropertyValue {
    /// Creates a client-supplied, unmodified property.
    #[must_use]
    pub fn new(
        column_name: impl Into<String>,
        sql_type: impl Into<String>,
        value: impl ToSqlValue,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            sql_type: sql_type.into(),
            is_primary_key: false,
            value_generated: ValueGenerated::Never,
            is_modified: false,
            current_value: value.to_sql_value(),
        }
    }

    /// Marks the property as the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Sets the value-generation policy.
    #[must_use]
    pub fn generated(mut self, policy: ValueGenerated) -> Self {
        self.value_generated = policy;
        self
    }

    /// Marks the property as modified.
    #[must_use]
    pub fn modified(mut self) -> Self {
        self.is_modified = true;
        self
    }
}

/// One tracked entity with its pending change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRecord {
    /// Change state.
    pub state: EntityState,
    /// Target table.
    pub table_name: String,
    /// Properties in schema order.
    #[serde(default)]
    pub properties: Vec<PropertyValue>,
}

impl MutationRecord {
    /// Creates a record with no properties.
    #[must_use]
    pub fn new(state: EntityState, table_name: impl Into<String>) -> Self {
        Self {
            state,
            table_name: table_name.into(),
            properties: Vec::new(),
        }
    }

    /// Creates an added record.
    #[must_use]
    pub fn added(table_name: impl Into<String>) -> Self {
        Self::new(EntityState::Added, table_name)
    }

    /// Creates a modified record.
    #[must_use]
    pub fn modified(table_name: impl Into<String>) -> Self {
        Self::new(EntityState::Modified, table_name)
    }

    /// Creates a deleted record.
    #[must_use]
    pub fn deleted(table_name: impl Into<String>) -> Self {
        Self::new(EntityState::Deleted, table_name)
    }

    /// Appends a property.
    #[must_use]
    pub fn property(mut self, property: PropertyValue) -> Self {
        self.properties.push(property);
        self
    }

    /// Returns the statement this record compiles to, if any.
    #[must_use]
    pub const fn statement_kind(&self) -> Option<StatementKind> {
        StatementKind::for_state(self.state)
    }
}
