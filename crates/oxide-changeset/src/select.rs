//! Column and parameter selection.
//!
//! Decides which properties of a record take part in its statement:
//!
//! - INSERT: every property the database does not assign on insert, in
//!   order. A client-supplied key stays in the list; identity keys are
//!   generated and drop out.
//! - UPDATE: modified properties the database does not assign on update,
//!   with the key pulled out for the WHERE clause.
//! - DELETE: nothing but the key.

use crate::error::{ChangesetError, Result};
use crate::model::{MutationRecord, PropertyValue, StatementKind};

/// The properties a statement is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a> {
    /// Properties in column/parameter order.
    pub handled: Vec<&'a PropertyValue>,
    /// The key property. Always set for UPDATE and DELETE.
    pub primary_key: Option<&'a PropertyValue>,
}

impl<'a> Selection<'a> {
    /// Returns the handled properties followed by the key, if any.
    ///
    /// This is the parameter order of an UPDATE.
    #[must_use]
    pub fn parameters(&self) -> Vec<&'a PropertyValue> {
        self.handled
            .iter()
            .copied()
            .chain(self.primary_key)
            .collect()
    }
}

/// Selects the properties of `record` that take part in a `kind` statement.
///
/// Walks the properties once, in order.
///
/// # Errors
///
/// For UPDATE and DELETE, returns [`ChangesetError::MissingPrimaryKey`] when
/// no property is a key and [`ChangesetError::MultiplePrimaryKeys`] when more
/// than one is.
pub fn select_handled(record: &MutationRecord, kind: StatementKind) -> Result<Selection<'_>> {
    let mut handled = Vec::new();
    let mut keys = Vec::new();

    for property in &record.properties {
        if property.is_primary_key {
            keys.push(property);
            if kind != StatementKind::Insert {
                continue;
            }
        }

        let include = match kind {
            StatementKind::Insert => !property.value_generated.on_add(),
            StatementKind::Update => {
                property.is_modified && !property.value_generated.on_update()
            }
            StatementKind::Delete => false,
        };
        if include {
            handled.push(property);
        }
    }

    if kind != StatementKind::Insert {
        match keys.len() {
            0 => {
                return Err(ChangesetError::MissingPrimaryKey {
                    table: record.table_name.clone(),
                    kind,
                });
            }
            1 => {}
            count => {
                return Err(ChangesetError::MultiplePrimaryKeys {
                    table: record.table_name.clone(),
                    kind,
                    count,
                });
            }
        }
    }

    Ok(Selection {
        handled,
        primary_key: keys.first().copied(),
    })
}
