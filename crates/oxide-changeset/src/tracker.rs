//! In-memory change tracking.
//!
//! [`ChangeTracker`] holds entity instances as property/value maps, tracks
//! their state and which properties changed, and turns pending work into
//! [`MutationRecord`]s through its [`SchemaResolver`].

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::{ChangesetError, Result};
use crate::model::{EntityState, MutationRecord, PropertyValue};
use crate::schema::{Schema, SchemaResolver};
use crate::value::{SqlValue, ToSqlValue};

/// Source of pending mutation records.
pub trait ChangeSource {
    /// Returns every pending change, one record per changed entity.
    ///
    /// # Errors
    ///
    /// Returns an error if a pending entity cannot be resolved to a table.
    fn enumerate_changes(&self) -> Result<Vec<MutationRecord>>;
}

impl ChangeSource for [MutationRecord] {
    fn enumerate_changes(&self) -> Result<Vec<MutationRecord>> {
        Ok(self.to_vec())
    }
}

impl ChangeSource for Vec<MutationRecord> {
    fn enumerate_changes(&self) -> Result<Vec<MutationRecord>> {
        Ok(self.clone())
    }
}

/// Handle to a tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(usize);

impl EntryId {
    /// Returns the position of the entry in tracking order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct TrackedEntry {
    entity_type: String,
    state: EntityState,
    current: BTreeMap<String, SqlValue>,
    original: BTreeMap<String, SqlValue>,
    modified: BTreeSet<String>,
}

impl TrackedEntry {
    fn accept(&mut self) {
        self.original.clone_from(&self.current);
        self.modified.clear();
        self.state = EntityState::Unchanged;
    }
}

/// Tracks entity instances and their pending changes.
///
/// Entries are enumerated in the order they were first tracked.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker<S = Schema> {
    schema: S,
    entries: Vec<Option<TrackedEntry>>,
}

impl<S: SchemaResolver> ChangeTracker<S> {
    /// Creates an empty tracker resolving entities through `schema`.
    #[must_use]
    pub const fn new(schema: S) -> Self {
        Self {
            schema,
            entries: Vec::new(),
        }
    }

    /// Returns the schema.
    #[must_use]
    pub const fn schema(&self) -> &S {
        &self.schema
    }

    /// Tracks a new entity to be inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity type or a property is not mapped.
    pub fn add<K, V>(
        &mut self,
        entity_type: &str,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<EntryId>
    where
        K: Into<String>,
        V: ToSqlValue,
    {
        let current = self.collect_values(entity_type, values)?;
        Ok(self.track(TrackedEntry {
            entity_type: entity_type.to_string(),
            state: EntityState::Added,
            current,
            original: BTreeMap::new(),
            modified: BTreeSet::new(),
        }))
    }

    /// Tracks an existing entity as unchanged. Its values become the
    /// originals that later edits are compared against.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity type or a property is not mapped.
    pub fn attach<K, V>(
        &mut self,
        entity_type: &str,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<EntryId>
    where
        K: Into<String>,
        V: ToSqlValue,
    {
        let current = self.collect_values(entity_type, values)?;
        Ok(self.track(TrackedEntry {
            entity_type: entity_type.to_string(),
            original: current.clone(),
            current,
            state: EntityState::Unchanged,
            modified: BTreeSet::new(),
        }))
    }

    /// Sets a property value.
    ///
    /// On an unchanged or modified entry the property is flagged modified
    /// when the value differs from the original, and an unchanged entry
    /// becomes modified. Flags are never cleared by setting a value back.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is not tracked or the property is not
    /// mapped.
    pub fn set(&mut self, id: EntryId, property: &str, value: impl ToSqlValue) -> Result<()> {
        let entity_type = self.entry(id)?.entity_type.clone();
        self.schema.resolve_column(&entity_type, property)?;

        let value = value.to_sql_value();
        let entry = self.entry_mut(id)?;
        if matches!(entry.state, EntityState::Unchanged | EntityState::Modified) {
            let changed = entry
                .original
                .get(property)
                .map_or(!value.is_null(), |original| *original != value);
            if changed {
                entry.modified.insert(property.to_string());
                entry.state = EntityState::Modified;
            }
        }
        entry.current.insert(property.to_string(), value);
        Ok(())
    }

    /// Forces the state of an entry.
    ///
    /// `Modified` flags every mapped property. `Deleted` on an added entry
    /// stops tracking it. `Unchanged` accepts the entry's current values.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is not tracked or its type is not mapped.
    pub fn set_state(&mut self, id: EntryId, state: EntityState) -> Result<()> {
        let entity_type = self.entry(id)?.entity_type.clone();
        let properties: Vec<String> = self
            .schema
            .resolve_table(&entity_type)?
            .columns
            .iter()
            .map(|c| c.property.clone())
            .collect();

        if state == EntityState::Deleted && self.entry(id)?.state == EntityState::Added {
            self.detach(id);
            return Ok(());
        }

        let entry = self.entry_mut(id)?;
        match state {
            EntityState::Modified => {
                entry.modified.extend(properties);
                entry.state = EntityState::Modified;
            }
            EntityState::Unchanged => entry.accept(),
            EntityState::Added | EntityState::Deleted => entry.state = state,
        }
        Ok(())
    }

    /// Marks an entry for deletion. An added entry is simply no longer
    /// tracked.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is not tracked.
    pub fn remove(&mut self, id: EntryId) -> Result<()> {
        if self.entry(id)?.state == EntityState::Added {
            self.detach(id);
        } else {
            self.entry_mut(id)?.state = EntityState::Deleted;
        }
        Ok(())
    }

    /// Returns the state of an entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is not tracked.
    pub fn state(&self, id: EntryId) -> Result<EntityState> {
        Ok(self.entry(id)?.state)
    }

    /// Returns whether a property of an entry is flagged modified.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is not tracked.
    pub fn is_modified(&self, id: EntryId, property: &str) -> Result<bool> {
        Ok(self.entry(id)?.modified.contains(property))
    }

    /// Returns the current value of a property, if set.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is not tracked.
    pub fn value(&self, id: EntryId, property: &str) -> Result<Option<&SqlValue>> {
        Ok(self.entry(id)?.current.get(property))
    }

    /// Returns the tracked entries with their states, in tracking order.
    pub fn entries(&self) -> impl Iterator<Item = (EntryId, EntityState)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| entry.as_ref().map(|e| (EntryId(index), e.state)))
    }

    /// Returns whether any entry has pending changes.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.entries()
            .any(|(_, state)| state != EntityState::Unchanged)
    }

    /// Marks all pending work as persisted: deleted entries stop being
    /// tracked, the rest become unchanged.
    pub fn accept_changes(&mut self) {
        for slot in &mut self.entries {
            if slot
                .as_ref()
                .is_some_and(|entry| entry.state == EntityState::Deleted)
            {
                *slot = None;
            } else if let Some(entry) = slot {
                entry.accept();
            }
        }
    }

    fn collect_values<K, V>(
        &self,
        entity_type: &str,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<BTreeMap<String, SqlValue>>
    where
        K: Into<String>,
        V: ToSqlValue,
    {
        let mapping = self.schema.resolve_table(entity_type)?;
        let mut collected = BTreeMap::new();
        for (property, value) in values {
            let property = property.into();
            if mapping.find(&property).is_none() {
                return Err(ChangesetError::UnknownProperty {
                    entity: entity_type.to_string(),
                    property,
                });
            }
            collected.insert(property, value.to_sql_value());
        }
        Ok(collected)
    }

    fn track(&mut self, entry: TrackedEntry) -> EntryId {
        let id = EntryId(self.entries.len());
        debug!(entity = %entry.entity_type, state = ?entry.state, "Tracking entity");
        self.entries.push(Some(entry));
        id
    }

    fn detach(&mut self, id: EntryId) {
        if let Some(slot) = self.entries.get_mut(id.0) {
            *slot = None;
        }
    }

    fn entry(&self, id: EntryId) -> Result<&TrackedEntry> {
        self.entries
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(ChangesetError::UnknownEntry(id.0))
    }

    fn entry_mut(&mut self, id: EntryId) -> Result<&mut TrackedEntry> {
        self.entries
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(ChangesetError::UnknownEntry(id.0))
    }
}

impl<S: SchemaResolver> ChangeSource for ChangeTracker<S> {
    fn enumerate_changes(&self) -> Result<Vec<MutationRecord>> {
        let mut records = Vec::new();
        for entry in self.entries.iter().flatten() {
            if entry.state == EntityState::Unchanged {
                continue;
            }

            let mapping = self.schema.resolve_table(&entry.entity_type)?;
            let properties = mapping
                .columns
                .iter()
                .map(|column| PropertyValue {
                    column_name: column.column_name.clone(),
                    sql_type: column.sql_type.clone(),
                    is_primary_key: column.primary_key,
                    value_generated: column.value_generated,
                    is_modified: entry.modified.contains(&column.property),
                    current_value: entry
                        .current
                        .get(&column.property)
                        .cloned()
                        .unwrap_or_default(),
                })
                .collect();

            records.push(MutationRecord {
                state: entry.state,
                table_name: mapping.table_name.clone(),
                properties,
            });
        }
        Ok(records)
    }
}
