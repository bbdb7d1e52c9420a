use std::collections::BTreeMap;

use schemata_core::{
    FkGraphReport, Schema, Table, ValidationReport, build_fk_graph_report, validate_schema,
};
use serde::Serialize;

/// JSON document printed by `schemata inspect`.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub schema: String,
    pub tables: Vec<TableSummary>,
    /// Referenced table name to the names of the tables referencing it.
    pub foreign_key_children: BTreeMap<String, Vec<String>>,
    pub graph: FkGraphReport,
    pub validation: ValidationReport,
    pub named_constraints: usize,
}

#[derive(Debug, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub columns: Vec<ColumnSummary>,
    pub primary_key: Option<Vec<String>>,
    pub foreign_keys: Vec<ForeignKeySummary>,
    pub unique_keys: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    /// Short flag list: `pk`, `identity`, `fk`, `uk`.
    pub flags: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ForeignKeySummary {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub refers_to: Option<String>,
}

impl InspectReport {
    pub fn new(schema: &Schema, named_constraints: usize) -> Self {
        let index = schema.foreign_key_index();
        let foreign_key_children = index
            .iter()
            .map(|(parent, children)| (parent.to_string(), children.iter().cloned().collect()))
            .collect();

        Self {
            schema: schema.name().to_string(),
            tables: schema.tables().iter().map(TableSummary::from).collect(),
            foreign_key_children,
            graph: build_fk_graph_report(schema),
            validation: validate_schema(schema),
            named_constraints,
        }
    }
}

impl From<&Table> for TableSummary {
    fn from(table: &Table) -> Self {
        let columns = table
            .columns
            .iter()
            .map(|column| {
                let flags = [
                    (column.is_primary_key, "pk"),
                    (column.is_identity, "identity"),
                    (column.is_foreign_key, "fk"),
                    (column.is_unique_key, "uk"),
                ]
                .into_iter()
                .filter_map(|(set, flag)| set.then_some(flag))
                .collect();

                ColumnSummary {
                    name: column.name.clone(),
                    data_type: column.column_type.to_string(),
                    nullable: column.nullable,
                    flags,
                }
            })
            .collect();

        Self {
            name: table.name.clone(),
            columns,
            primary_key: table.primary_key.as_ref().map(|pk| pk.columns.clone()),
            foreign_keys: table
                .foreign_keys
                .iter()
                .map(|fk| ForeignKeySummary {
                    name: fk.name.clone(),
                    columns: fk.columns.clone(),
                    refers_to: fk.refers_to_table.clone(),
                })
                .collect(),
            unique_keys: table
                .unique_keys
                .iter()
                .map(|uk| uk.columns.clone())
                .collect(),
        }
    }
}
