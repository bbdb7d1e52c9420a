use schemars::JsonSchema;
use serde::Serialize;

/// Kind of a table-level constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    PrimaryKey,
    ForeignKey,
    UniqueKey,
}

/// Constraint definition preserving column order.
///
/// `name` is `None` for anonymous constraints; see
/// [`Schema::name_anonymous_constraints`](crate::Schema::name_anonymous_constraints).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub name: Option<String>,
    /// Name of the table owning the constraint.
    pub table_name: String,
    pub columns: Vec<String>,
    /// Referenced table name, only set for foreign keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refers_to_table: Option<String>,
}

impl Constraint {
    pub fn primary_key(table: &str, column: &str, name: Option<&str>) -> Self {
        Self::single(ConstraintKind::PrimaryKey, table, column, name, None)
    }

    pub fn foreign_key(table: &str, column: &str, name: Option<&str>, refers_to: &str) -> Self {
        Self::single(
            ConstraintKind::ForeignKey,
            table,
            column,
            name,
            Some(refers_to.to_string()),
        )
    }

    pub fn unique_key(table: &str, column: &str, name: Option<&str>) -> Self {
        Self::single(ConstraintKind::UniqueKey, table, column, name, None)
    }

    fn single(
        kind: ConstraintKind,
        table: &str,
        column: &str,
        name: Option<&str>,
        refers_to_table: Option<String>,
    ) -> Self {
        Self {
            kind,
            name: name.map(str::to_string),
            table_name: table.to_string(),
            columns: vec![column.to_string()],
            refers_to_table,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.columns.iter().any(|name| name == column)
    }
}
