use crate::constraints::Constraint;
use crate::error::{Error, Result};
use crate::schema::{Column, ColumnId, Schema, Table};

/// Fluent constraint operations on one column of a [`Schema`].
///
/// Obtained from [`Schema::constraints`]. Every operation consumes the builder
/// and hands it back on success so calls can be chained:
///
/// ```
/// use schemata_core::{Column, ColumnType, Schema, Table};
///
/// let mut schema = Schema::new("public");
/// let users = schema.add_table(Table::new("users")).unwrap();
/// let id = schema
///     .add_column(users, Column::new("id", ColumnType::new("integer")))
///     .unwrap();
///
/// schema
///     .constraints(id)
///     .add_primary_key(Some("pk_users"))
///     .and_then(|column| column.add_identity())
///     .unwrap();
///
/// let column = schema.column(id).unwrap();
/// assert!(column.is_primary_key && column.is_identity && !column.nullable);
/// ```
pub struct ConstraintBuilder<'a> {
    schema: &'a mut Schema,
    column: ColumnId,
}

impl<'a> ConstraintBuilder<'a> {
    pub(crate) fn new(schema: &'a mut Schema, column: ColumnId) -> Self {
        Self { schema, column }
    }

    /// Handle of the column this builder operates on.
    pub fn id(&self) -> ColumnId {
        self.column
    }

    pub fn column(&self) -> Result<&Column> {
        self.schema
            .column(self.column)
            .ok_or_else(|| unresolved(self.column))
    }

    /// Make the column the table's primary key.
    ///
    /// Replaces any previous primary key of the table. The column of a replaced
    /// key keeps its `is_primary_key` flag; only the table's key changes.
    pub fn add_primary_key(mut self, name: Option<&str>) -> Result<Self> {
        let (table, index) = self.target()?;
        let column_name = table.columns[index].name.clone();
        let replaced = table
            .primary_key
            .replace(Constraint::primary_key(&table.name, &column_name, name));

        let column = &mut table.columns[index];
        column.is_primary_key = true;
        column.nullable = false;

        tracing::debug!(
            event = "primary_key_added",
            table = %table.name,
            column = %column_name,
            replaced = replaced.is_some()
        );
        Ok(self)
    }

    /// Mark the column as the table's identity column.
    ///
    /// Any other identity column of the same table is cleared first.
    pub fn add_identity(mut self) -> Result<Self> {
        let (table, index) = self.target()?;
        for (position, column) in table.columns.iter_mut().enumerate() {
            column.is_identity = position == index;
        }

        tracing::debug!(
            event = "identity_added",
            table = %table.name,
            column = %table.columns[index].name
        );
        Ok(self)
    }

    /// Add a foreign key from the column to the table named `target`.
    ///
    /// Foreign keys accumulate. The target does not have to exist yet; the
    /// reverse view ([`Schema::foreign_key_children`]) picks the key up once
    /// the target table is present.
    pub fn add_foreign_key(mut self, name: Option<&str>, target: &str) -> Result<Self> {
        self.column()?;
        if target.is_empty() {
            return Err(Error::InvalidArgument(
                "foreign key target table name is empty".to_string(),
            ));
        }

        let resolved = self.schema.table_id(target).is_some();
        let (table, index) = self.target()?;
        let column_name = table.columns[index].name.clone();
        table.foreign_keys.push(Constraint::foreign_key(
            &table.name,
            &column_name,
            name,
            target,
        ));
        table.columns[index].is_foreign_key = true;

        tracing::debug!(
            event = "foreign_key_added",
            table = %table.name,
            column = %column_name,
            refers_to = %target,
            resolved
        );
        Ok(self)
    }

    /// Add a foreign key to the table picked by `selector` from the schema's
    /// tables.
    ///
    /// Fails with [`Error::InvalidArgument`] when the selector picks nothing.
    pub fn add_foreign_key_by<F>(self, name: Option<&str>, selector: F) -> Result<Self>
    where
        F: FnOnce(&[Table]) -> Option<&Table>,
    {
        self.column()?;
        let target = selector(self.schema.tables())
            .map(|table| table.name.clone())
            .ok_or_else(|| {
                Error::InvalidArgument("foreign key selector matched no table".to_string())
            })?;
        self.add_foreign_key(name, &target)
    }

    /// Add a single-column unique key. Unique keys accumulate.
    pub fn add_unique_key(mut self, name: Option<&str>) -> Result<Self> {
        let (table, index) = self.target()?;
        let column_name = table.columns[index].name.clone();
        table
            .unique_keys
            .push(Constraint::unique_key(&table.name, &column_name, name));
        table.columns[index].is_unique_key = true;

        tracing::debug!(
            event = "unique_key_added",
            table = %table.name,
            column = %column_name
        );
        Ok(self)
    }

    fn target(&mut self) -> Result<(&mut Table, usize)> {
        let id = self.column;
        let table = self
            .schema
            .table_mut(id.table)
            .ok_or_else(|| unresolved(id))?;
        if id.index >= table.columns.len() {
            return Err(unresolved(id));
        }
        Ok((table, id.index))
    }
}

fn unresolved(id: ColumnId) -> Error {
    Error::InvalidArgument(format!(
        "column {}:{} is not attached to the schema",
        id.table.0, id.index
    ))
}
