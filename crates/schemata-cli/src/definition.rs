//! Schema definition files loaded by the CLI.
//!
//! A definition lists tables and columns together with per-column key flags.
//! Loading attaches every table and column first and only then applies the
//! flags through the constraint builder, so foreign keys may point at tables
//! declared later in the file.

use std::path::Path;

use schemars::JsonSchema;
use schemata_core::{Column, ColumnId, ColumnType, Schema, Table};
use serde::Deserialize;

use crate::CliError;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefinition {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<TableDefinition>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TableDefinition {
    pub name: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub length: Option<i32>,
    #[serde(default)]
    pub precision: Option<i32>,
    #[serde(default)]
    pub scale: Option<i32>,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub primary_key: Option<KeyFlag>,
    #[serde(default)]
    pub identity: bool,
    #[serde(default)]
    pub unique: Option<KeyFlag>,
    #[serde(default)]
    pub foreign_key: Option<ForeignKeyDefinition>,
}

/// `true`/`false`, or a table with an explicit constraint name.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum KeyFlag {
    Enabled(bool),
    Named { name: String },
}

/// A referenced table name, or a table with the referenced name and a
/// constraint name.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ForeignKeyDefinition {
    Table(String),
    Detailed {
        table: String,
        #[serde(default)]
        name: Option<String>,
    },
}

fn default_nullable() -> bool {
    true
}

impl KeyFlag {
    /// `None` when the key is not requested, otherwise its optional name.
    fn requested(&self) -> Option<Option<&str>> {
        match self {
            KeyFlag::Enabled(true) => Some(None),
            KeyFlag::Enabled(false) => None,
            KeyFlag::Named { name } => Some(Some(name.as_str())),
        }
    }
}

impl ForeignKeyDefinition {
    fn table(&self) -> &str {
        match self {
            ForeignKeyDefinition::Table(table) => table,
            ForeignKeyDefinition::Detailed { table, .. } => table,
        }
    }

    fn name(&self) -> Option<&str> {
        match self {
            ForeignKeyDefinition::Table(_) => None,
            ForeignKeyDefinition::Detailed { name, .. } => name.as_deref(),
        }
    }
}

impl ColumnDefinition {
    fn to_column(&self) -> Column {
        let mut column = Column::new(
            &self.name,
            ColumnType {
                data_type: self.data_type.clone(),
                length: self.length,
                precision: self.precision,
                scale: self.scale,
            },
        );
        column.nullable = self.nullable;
        column.default = self.default.clone();
        column.comment = self.comment.clone();
        column
    }
}

impl SchemaDefinition {
    /// Read a definition from a `.toml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(toml::from_str(&content)?)
        }
    }

    /// Build the in-memory schema described by this definition.
    pub fn build(&self) -> schemata_core::Result<Schema> {
        let mut schema = Schema::new(&self.name);
        let mut pending: Vec<(ColumnId, &ColumnDefinition)> = Vec::new();

        for table in &self.tables {
            let mut entry = Table::new(&table.name);
            entry.comment = table.comment.clone();
            let table_id = schema.add_table(entry)?;

            for column in &table.columns {
                let column_id = schema.add_column(table_id, column.to_column())?;
                pending.push((column_id, column));
            }
        }

        for (column_id, column) in pending {
            apply_keys(&mut schema, column_id, column)?;
        }

        tracing::info!(
            event = "schema_built",
            schema = %schema.name(),
            tables = schema.tables().len()
        );
        Ok(schema)
    }
}

fn apply_keys(
    schema: &mut Schema,
    column_id: ColumnId,
    column: &ColumnDefinition,
) -> schemata_core::Result<()> {
    let mut builder = schema.constraints(column_id);

    if let Some(name) = column.primary_key.as_ref().and_then(KeyFlag::requested) {
        builder = builder.add_primary_key(name)?;
    }
    if column.identity {
        builder = builder.add_identity()?;
    }
    if let Some(name) = column.unique.as_ref().and_then(KeyFlag::requested) {
        builder = builder.add_unique_key(name)?;
    }
    if let Some(fk) = &column.foreign_key {
        builder.add_foreign_key(fk.name(), fk.table())?;
    }

    Ok(())
}
