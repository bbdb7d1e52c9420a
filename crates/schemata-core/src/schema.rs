use schemars::JsonSchema;
use serde::Serialize;

use crate::builder::ConstraintBuilder;
use crate::constraints::Constraint;
use crate::error::{Error, Result};
use crate::index::ForeignKeyIndex;
use crate::types::ColumnType;

/// Position of a table inside its owning [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(pub usize);

/// Position of a column: the owning table plus the column's ordinal.
///
/// Handles are positional. They stay valid only while the owning table's
/// `columns` are not reordered or removed through the public field; after
/// that a handle may name a different column or none at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId {
    pub table: TableId,
    pub index: usize,
}

/// A named collection of tables. Table names are unique within a schema.
#[derive(Debug, Clone, Default, Serialize, JsonSchema)]
pub struct Schema {
    name: String,
    tables: Vec<Table>,
}

/// A table owning its columns and key constraints.
#[derive(Debug, Clone, Default, Serialize, JsonSchema)]
pub struct Table {
    pub name: String,
    pub comment: Option<String>,
    pub columns: Vec<Column>,
    /// At most one primary key; the builder replaces it on each call.
    pub primary_key: Option<Constraint>,
    pub foreign_keys: Vec<Constraint>,
    pub unique_keys: Vec<Constraint>,
}

/// Column metadata together with its constraint flags.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub default: Option<String>,
    pub comment: Option<String>,
    pub is_primary_key: bool,
    pub is_identity: bool,
    pub is_foreign_key: bool,
    pub is_unique_key: bool,
}

impl Column {
    /// Create a nullable column without any constraint flags.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            default: None,
            comment: None,
            is_primary_key: false,
            is_identity: false,
            is_foreign_key: false,
            is_unique_key: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    /// The column currently marked as identity, if any.
    pub fn identity_column(&self) -> Option<&Column> {
        self.columns.iter().find(|column| column.is_identity)
    }

    /// All constraints: primary key first, then foreign keys, then unique keys.
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.primary_key
            .iter()
            .chain(self.foreign_keys.iter())
            .chain(self.unique_keys.iter())
    }

    pub(crate) fn constraints_mut(&mut self) -> impl Iterator<Item = &mut Constraint> {
        self.primary_key
            .iter_mut()
            .chain(self.foreign_keys.iter_mut())
            .chain(self.unique_keys.iter_mut())
    }

    /// Whether any foreign key of this table points at `table`.
    pub fn references(&self, table: &str) -> bool {
        self.foreign_keys
            .iter()
            .any(|fk| fk.refers_to_table.as_deref() == Some(table))
    }
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub(crate) fn tables_mut(&mut self) -> &mut [Table] {
        &mut self.tables
    }

    /// Attach a table, rejecting empty or already used names.
    pub fn add_table(&mut self, table: Table) -> Result<TableId> {
        if table.name.is_empty() {
            return Err(Error::InvalidArgument("table name is empty".to_string()));
        }
        if self.table_id(&table.name).is_some() {
            return Err(Error::InvalidArgument(format!(
                "duplicate table name: {}.{}",
                self.name, table.name
            )));
        }

        let id = TableId(self.tables.len());
        self.tables.push(table);
        Ok(id)
    }

    /// Attach a column to an existing table, rejecting duplicate column names.
    pub fn add_column(&mut self, table: TableId, column: Column) -> Result<ColumnId> {
        let schema_name = self.name.clone();
        let owner = self
            .tables
            .get_mut(table.0)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown table id: {}", table.0)))?;

        if owner.column(&column.name).is_some() {
            return Err(Error::InvalidArgument(format!(
                "duplicate column name: {}.{}.{}",
                schema_name, owner.name, column.name
            )));
        }

        let index = owner.columns.len();
        owner.columns.push(column);
        Ok(ColumnId { table, index })
    }

    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.get(id.0)
    }

    /// Mutable access for edits the builder does not cover, such as composite
    /// primary keys.
    ///
    /// Renaming the table or reordering its columns here bypasses the checks of
    /// [`Schema::add_table`] and [`Schema::add_column`] and invalidates existing
    /// [`ColumnId`]s; [`validate_schema`](crate::validate_schema) reports the
    /// resulting duplicates.
    pub fn table_mut(&mut self, id: TableId) -> Option<&mut Table> {
        self.tables.get_mut(id.0)
    }

    /// Resolve a table name to its id. Names match exactly.
    pub fn table_id(&self, name: &str) -> Option<TableId> {
        self.tables
            .iter()
            .position(|table| table.name == name)
            .map(TableId)
    }

    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.name == name)
    }

    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.table(id.table)
            .and_then(|table| table.columns.get(id.index))
    }

    pub fn column_id(&self, table: &str, column: &str) -> Option<ColumnId> {
        let table = self.table_id(table)?;
        let index = self.tables[table.0].column_index(column)?;
        Some(ColumnId { table, index })
    }

    /// Start a constraint chain on the given column.
    ///
    /// The handle is resolved lazily: every builder operation fails with
    /// [`Error::InvalidArgument`] if it does not name a column of this schema.
    pub fn constraints(&mut self, column: ColumnId) -> ConstraintBuilder<'_> {
        ConstraintBuilder::new(self, column)
    }

    /// Start a constraint chain on a column looked up by table and column name.
    pub fn constraints_for(&mut self, table: &str, column: &str) -> Result<ConstraintBuilder<'_>> {
        let id = self.column_id(table, column).ok_or_else(|| {
            Error::InvalidArgument(format!("unknown column: {}.{}.{}", self.name, table, column))
        })?;
        Ok(self.constraints(id))
    }

    /// Tables holding at least one foreign key into `name`, in schema order.
    ///
    /// Computed from the forward foreign keys on every call, so the answer
    /// does not depend on the order tables and keys were added in. Empty when
    /// `name` is not a table of this schema.
    pub fn foreign_key_children(&self, name: &str) -> Vec<&Table> {
        if self.find_table(name).is_none() {
            return Vec::new();
        }
        self.tables
            .iter()
            .filter(|table| table.references(name))
            .collect()
    }

    /// Build a reverse foreign-key index over the whole schema.
    pub fn foreign_key_index(&self) -> ForeignKeyIndex {
        ForeignKeyIndex::build(self)
    }
}
