use std::collections::{BTreeMap, BTreeSet};

use crate::schema::Schema;

/// Reverse foreign-key view: for every table, the tables referencing it.
///
/// Built in one pass over the forward foreign keys. Targets that are not
/// tables of the schema get no entry, and a table referencing itself is its
/// own child. Rebuild after mutating the schema; the index is a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForeignKeyIndex {
    children: BTreeMap<String, BTreeSet<String>>,
}

impl ForeignKeyIndex {
    pub fn build(schema: &Schema) -> Self {
        let mut children: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for table in schema.tables() {
            for fk in &table.foreign_keys {
                let Some(target) = fk.refers_to_table.as_deref() else {
                    continue;
                };
                if schema.find_table(target).is_none() {
                    continue;
                }
                children
                    .entry(target.to_string())
                    .or_default()
                    .insert(table.name.clone());
            }
        }

        Self { children }
    }

    /// Names of the tables referencing `table`, sorted by name.
    pub fn children(&self, table: &str) -> impl Iterator<Item = &str> {
        self.children
            .get(table)
            .into_iter()
            .flat_map(|names| names.iter().map(String::as_str))
    }

    pub fn has_children(&self, table: &str) -> bool {
        self.children
            .get(table)
            .is_some_and(|names| !names.is_empty())
    }

    /// Number of distinct (parent, child) table pairs.
    pub fn edge_count(&self) -> usize {
        self.children.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Iterate `(parent, children)` pairs in parent name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.children
            .iter()
            .map(|(parent, names)| (parent.as_str(), names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, Table};
    use crate::types::ColumnType;

    fn add(schema: &mut Schema, table: &str, columns: &[&str]) {
        let id = schema.add_table(Table::new(table)).unwrap();
        for column in columns {
            schema
                .add_column(id, Column::new(*column, ColumnType::new("integer")))
                .unwrap();
        }
    }

    #[test]
    fn collects_children_per_parent() {
        let mut schema = Schema::new("public");
        add(&mut schema, "customers", &["id", "referrer_id"]);
        add(&mut schema, "orders", &["id", "customer_id", "billed_to"]);
        add(&mut schema, "invoices", &["id", "customer_id"]);

        for (table, column) in [
            ("orders", "customer_id"),
            ("orders", "billed_to"),
            ("invoices", "customer_id"),
            ("customers", "referrer_id"),
        ] {
            schema
                .constraints_for(table, column)
                .and_then(|builder| builder.add_foreign_key(None, "customers"))
                .unwrap();
        }

        let index = schema.foreign_key_index();
        let children: Vec<&str> = index.children("customers").collect();
        assert_eq!(children, vec!["customers", "invoices", "orders"]);
        assert_eq!(index.edge_count(), 3);
        assert!(!index.has_children("orders"));
        assert_eq!(index.children("orders").count(), 0);
    }

    #[test]
    fn skips_targets_outside_the_schema() {
        let mut schema = Schema::new("public");
        add(&mut schema, "orders", &["customer_id"]);
        schema
            .constraints_for("orders", "customer_id")
            .and_then(|builder| builder.add_foreign_key(None, "customers"))
            .unwrap();

        let index = schema.foreign_key_index();
        assert!(index.is_empty());
        assert!(!index.has_children("customers"));
    }
}
