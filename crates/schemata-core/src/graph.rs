use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::schema::Schema;

/// Summary of FK graph structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FkGraphSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Creation-order report derived from foreign keys.
///
/// `topo_order` lists referenced tables before the tables referencing them and
/// is `None` when the graph has a cycle, in which case `cycle` names the tables
/// that could not be ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FkGraphReport {
    pub summary: FkGraphSummary,
    pub topo_order: Option<Vec<String>>,
    pub cycle: Option<Vec<String>>,
    /// Foreign key targets that are not tables of the schema.
    pub dangling: Vec<String>,
}

/// Build a deterministic FK dependency report for a schema.
pub fn build_fk_graph_report(schema: &Schema) -> FkGraphReport {
    let (graph, dangling) = dependency_edges(schema);
    let summary = FkGraphSummary {
        nodes: graph.len(),
        edges: graph.values().map(BTreeSet::len).sum(),
    };

    let (topo_order, cycle) = match toposort(&graph) {
        Ok(order) => (Some(order), None),
        Err(cycle) => (None, Some(cycle)),
    };

    FkGraphReport {
        summary,
        topo_order,
        cycle,
        dangling: dangling.into_iter().collect(),
    }
}

/// Edges run from a referenced table to each table referencing it.
fn dependency_edges(schema: &Schema) -> (BTreeMap<String, BTreeSet<String>>, BTreeSet<String>) {
    let mut graph: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut dangling = BTreeSet::new();

    for table in schema.tables() {
        graph.entry(table.name.clone()).or_default();

        for target in table
            .foreign_keys
            .iter()
            .filter_map(|fk| fk.refers_to_table.as_deref())
        {
            if schema.find_table(target).is_none() {
                dangling.insert(target.to_string());
            }
            graph
                .entry(target.to_string())
                .or_default()
                .insert(table.name.clone());
        }
    }

    (graph, dangling)
}

fn toposort(graph: &BTreeMap<String, BTreeSet<String>>) -> Result<Vec<String>, Vec<String>> {
    let mut indegree: BTreeMap<&str, usize> =
        graph.keys().map(|node| (node.as_str(), 0)).collect();
    for target in graph.values().flatten() {
        *indegree.entry(target.as_str()).or_insert(0) += 1;
    }

    let mut ready: BTreeSet<&str> = indegree
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(node, _)| *node)
        .collect();
    let mut order = Vec::with_capacity(graph.len());

    while let Some(node) = ready.pop_first() {
        order.push(node.to_string());

        for target in graph.get(node).into_iter().flatten() {
            if let Some(count) = indegree.get_mut(target.as_str()) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    ready.insert(target.as_str());
                }
            }
        }
    }

    if order.len() == graph.len() {
        Ok(order)
    } else {
        Err(indegree
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(node, _)| node.to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, Table};
    use crate::types::ColumnType;

    fn schema(tables: &[(&str, &str, Option<&str>)]) -> Schema {
        let mut schema = Schema::new("public");
        for (table, column, _) in tables {
            let id = schema.add_table(Table::new(*table)).unwrap();
            schema
                .add_column(id, Column::new(*column, ColumnType::new("integer")))
                .unwrap();
        }
        for (table, column, target) in tables {
            if let Some(target) = target {
                schema
                    .constraints_for(table, column)
                    .and_then(|builder| builder.add_foreign_key(None, target))
                    .unwrap();
            }
        }
        schema
    }

    #[test]
    fn toposort_reports_cycle() {
        let schema = schema(&[("users", "manager_id", Some("users"))]);

        let report = build_fk_graph_report(&schema);
        assert!(report.topo_order.is_none());
        assert_eq!(report.cycle, Some(vec!["users".to_string()]));
    }

    #[test]
    fn toposort_orders_dependencies() {
        let schema = schema(&[
            ("order_lines", "order_id", Some("orders")),
            ("orders", "user_id", Some("users")),
            ("users", "id", None),
        ]);

        let report = build_fk_graph_report(&schema);
        assert_eq!(report.summary, FkGraphSummary { nodes: 3, edges: 2 });
        assert_eq!(
            report.topo_order,
            Some(vec![
                "users".to_string(),
                "orders".to_string(),
                "order_lines".to_string()
            ])
        );
        assert!(report.dangling.is_empty());
    }

    #[test]
    fn dangling_targets_become_nodes() {
        let schema = schema(&[("orders", "customer_id", Some("customers"))]);

        let report = build_fk_graph_report(&schema);
        assert_eq!(report.dangling, vec!["customers".to_string()]);
        assert_eq!(
            report.topo_order,
            Some(vec!["customers".to_string(), "orders".to_string()])
        );
    }
}
