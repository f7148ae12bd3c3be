//! Entity-to-table mapping.
//!
//! Describes how an entity type maps to a table: its table name and, per
//! property, the column name, SQL type, key flag and value generation. The
//! [`SchemaResolver`] trait is what the change tracker consults; [`Schema`]
//! is the in-memory registry implementing it.

use serde::{Deserialize, Serialize};

use crate::error::{ChangesetError, Result};
use crate::model::ValueGenerated;

/// Mapping of one entity property to a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Property name on the entity.
    pub property: String,
    /// Column name. Defaults to the property name.
    pub column_name: String,
    /// SQL Server type name.
    pub sql_type: String,
    /// Whether this column is the primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Value-generation policy.
    #[serde(default)]
    pub value_generated: ValueGenerated,
}

impl ColumnMapping {
    /// Creates a mapping whose column is named after the property.
    #[must_use]
    pub fn new(property: impl Into<String>, sql_type: impl Into<String>) -> Self {
        let property = property.into();
        Self {
            column_name: property.clone(),
            property,
            sql_type: sql_type.into(),
            primary_key: false,
            value_generated: ValueGenerated::Never,
        }
    }

    /// Sets the column name.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.column_name = name.into();
        self
    }

    /// Marks the column as the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Sets the value-generation policy.
    #[must_use]
    pub fn generated(mut self, policy: ValueGenerated) -> Self {
        self.value_generated = policy;
        self
    }

    /// Marks the column as a database-assigned identity key.
    #[must_use]
    pub fn identity(self) -> Self {
        self.primary_key().generated(ValueGenerated::OnAdd)
    }
}

/// Mapping of one entity type to a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMapping {
    /// Entity type name.
    pub entity_type: String,
    /// Table name.
    pub table_name: String,
    /// Columns in property order.
    #[serde(default)]
    pub columns: Vec<ColumnMapping>,
}

impl EntityMapping {
    /// Creates a mapping with no columns.
    #[must_use]
    pub fn new(entity_type: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            table_name: table_name.into(),
            columns: Vec::new(),
        }
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, column: ColumnMapping) -> Self {
        self.columns.push(column);
        self
    }

    /// Gets a column by property name.
    #[must_use]
    pub fn find(&self, property: &str) -> Option<&ColumnMapping> {
        self.columns.iter().find(|c| c.property == property)
    }

    /// Returns the key columns.
    pub fn primary_key(&self) -> impl Iterator<Item = &ColumnMapping> {
        self.columns.iter().filter(|c| c.primary_key)
    }
}

/// Looks up table and column mappings for entity types.
pub trait SchemaResolver {
    /// Returns the mapping for `entity_type`.
    ///
    /// # Errors
    ///
    /// Returns [`ChangesetError::UnknownEntity`] if the type is not mapped.
    fn resolve_table(&self, entity_type: &str) -> Result<&EntityMapping>;

    /// Returns the column mapping for `property` of `entity_type`.
    ///
    /// # Errors
    ///
    /// Returns [`ChangesetError::UnknownEntity`] or
    /// [`ChangesetError::UnknownProperty`].
    fn resolve_column(&self, entity_type: &str, property: &str) -> Result<&ColumnMapping> {
        self.resolve_table(entity_type)?
            .find(property)
            .ok_or_else(|| ChangesetError::UnknownProperty {
                entity: entity_type.to_string(),
                property: property.to_string(),
            })
    }
}

/// Registry of entity mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Registered mappings.
    pub entities: Vec<EntityMapping>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mapping.
    #[must_use]
    pub fn entity(mut self, mapping: EntityMapping) -> Self {
        self.register(mapping);
        self
    }

    /// Adds a mapping, replacing any previous one for the same entity type.
    pub fn register(&mut self, mapping: EntityMapping) {
        self.entities.retain(|e| e.entity_type != mapping.entity_type);
        self.entities.push(mapping);
    }

    /// Returns the number of mapped entity types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns whether no entity type is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl SchemaResolver for Schema {
    fn resolve_table(&self, entity_type: &str) -> Result<&EntityMapping> {
        self.entities
            .iter()
            .find(|e| e.entity_type == entity_type)
            .ok_or_else(|| ChangesetError::UnknownEntity(entity_type.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new().entity(
            EntityMapping::new("Blog", "Blogs")
                .column(ColumnMapping::new("Id", "int").identity())
                .column(ColumnMapping::new("Name", "nvarchar(max)").column("BlogName")),
        )
    }

    #[test]
    fn test_column_mapping_builder() {
        let column = ColumnMapping::new("Id", "int").identity();
        assert_eq!(column.column_name, "Id");
        assert!(column.primary_key);
        assert_eq!(column.value_generated, ValueGenerated::OnAdd);
    }

    #[test]
    fn test_resolve_table() {
        let schema = schema();
        let mapping = schema.resolve_table("Blog").unwrap();
        assert_eq!(mapping.table_name, "Blogs");
        assert_eq!(mapping.primary_key().count(), 1);
    }

    #[test]
    fn test_resolve_column() {
        let schema = schema();
        let column = schema.resolve_column("Blog", "Name").unwrap();
        assert_eq!(column.column_name, "BlogName");
        assert_eq!(column.sql_type, "nvarchar(max)");
    }

    #[test]
    fn test_unknown_entity_and_property() {
        let schema = schema();
        assert!(matches!(
            schema.resolve_table("Post"),
            Err(ChangesetError::UnknownEntity(name)) if name == "Post"
        ));
        assert!(matches!(
            schema.resolve_column("Blog", "Title"),
            Err(ChangesetError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn test_register_replaces() {
        let mut schema = schema();
        schema.register(EntityMapping::new("Blog", "Blog"));
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.resolve_table("Blog").unwrap().table_name, "Blog");
        assert!(Schema::new().is_empty());
    }

    #[test]
    fn test_schema_from_json() {
        let json = r#"{
            "entities": [{
                "entity_type": "Blog",
                "table_name": "Blog",
                "columns": [
                    { "property": "Id", "column_name": "Id", "sql_type": "int",
                      "primary_key": true, "value_generated": "on_add" }
                ]
            }]
        }"#;
        let schema: Schema = serde_json::from_str(json).unwrap();
        let key = schema.resolve_column("Blog", "Id").unwrap();
        assert_eq!(key.value_generated, ValueGenerated::OnAdd);
    }
}
