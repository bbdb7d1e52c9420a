use std::collections::BTreeSet;

use serde::Serialize;

use crate::constraints::{Constraint, ConstraintKind};
use crate::error::{Error, Result};
use crate::schema::{Schema, Table};

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Error,
    Warning,
}

/// Structured validation issue with a location path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub code: String,
    pub path: String,
    pub message: String,
}

/// Aggregated validation report with errors and warnings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Returns true when there are no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, code: &str, path: String, message: String) {
        self.errors.push(ValidationIssue {
            severity: IssueSeverity::Error,
            code: code.to_string(),
            path,
            message,
        });
    }

    fn warning(&mut self, code: &str, path: String, message: String) {
        self.warnings.push(ValidationIssue {
            severity: IssueSeverity::Warning,
            code: code.to_string(),
            path,
            message,
        });
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .any(|issue| issue.code == code)
    }

    /// Turn the first error into [`Error::InvalidSchema`], or hand back the warnings.
    pub fn into_result(self) -> Result<Vec<ValidationIssue>> {
        match self.errors.into_iter().next() {
            Some(issue) => Err(Error::InvalidSchema(format!(
                "{} at {}",
                issue.message, issue.path
            ))),
            None => Ok(self.warnings),
        }
    }
}

/// Validate internal consistency of a schema.
///
/// This checks what the builder deliberately accepts:
/// - duplicate tables/columns
/// - constraint columns exist and primary key columns are not nullable
/// - foreign key targets exist
/// - at most one identity column per table
///
/// Duplicate and missing constraint names are reported as warnings.
pub fn validate_schema(schema: &Schema) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen_tables = BTreeSet::new();

    for table in schema.tables() {
        let path = format!("/tables/{}", table.name);
        if !seen_tables.insert(table.name.as_str()) {
            report.error(
                "duplicate_table",
                path.clone(),
                format!("duplicate table name: {}.{}", schema.name(), table.name),
            );
        }

        validate_columns(table, &path, &mut report);

        let mut names = BTreeSet::new();
        for constraint in table.constraints() {
            let constraint_path = format!("{path}/{}", constraint_segment(constraint));
            validate_constraint(schema, table, constraint, &constraint_path, &mut report);

            match &constraint.name {
                Some(name) if !names.insert(name.as_str()) => report.warning(
                    "duplicate_constraint_name",
                    constraint_path,
                    format!("constraint name {name} is used more than once"),
                ),
                Some(_) => {}
                None => report.warning(
                    "anonymous_constraint",
                    constraint_path,
                    format!("{:?} constraint has no name", constraint.kind),
                ),
            }
        }
    }

    report
}

fn validate_columns(table: &Table, path: &str, report: &mut ValidationReport) {
    let mut seen = BTreeSet::new();
    for column in &table.columns {
        if !seen.insert(column.name.as_str()) {
            report.error(
                "duplicate_column",
                format!("{path}/columns/{}", column.name),
                format!("duplicate column name: {}.{}", table.name, column.name),
            );
        }
    }

    let identities: Vec<&str> = table
        .columns
        .iter()
        .filter(|column| column.is_identity)
        .map(|column| column.name.as_str())
        .collect();
    if identities.len() > 1 {
        report.error(
            "multiple_identity",
            format!("{path}/columns"),
            format!(
                "table {} has more than one identity column: {}",
                table.name,
                identities.join(", ")
            ),
        );
    }
}

fn validate_constraint(
    schema: &Schema,
    table: &Table,
    constraint: &Constraint,
    path: &str,
    report: &mut ValidationReport,
) {
    if constraint.columns.is_empty() {
        report.error(
            "empty_constraint",
            path.to_string(),
            format!("constraint on {} has no columns", table.name),
        );
    }
    if constraint.table_name != table.name {
        report.error(
            "constraint_table_mismatch",
            path.to_string(),
            format!(
                "constraint belongs to {} but is attached to {}",
                constraint.table_name, table.name
            ),
        );
    }

    for name in &constraint.columns {
        match table.column(name) {
            None => report.error(
                "unknown_column",
                path.to_string(),
                format!("constraint column not found: {}.{}", table.name, name),
            ),
            Some(column) if constraint.kind == ConstraintKind::PrimaryKey && column.nullable => {
                report.error(
                    "nullable_primary_key",
                    path.to_string(),
                    format!("primary key column is nullable: {}.{}", table.name, name),
                )
            }
            Some(_) => {}
        }
    }

    if constraint.kind == ConstraintKind::ForeignKey {
        match constraint.refers_to_table.as_deref() {
            None => report.error(
                "missing_reference",
                path.to_string(),
                format!("foreign key on {} has no referenced table", table.name),
            ),
            Some(target) if schema.find_table(target).is_none() => report.error(
                "dangling_foreign_key",
                path.to_string(),
                format!("referenced table not found: {}.{}", schema.name(), target),
            ),
            Some(_) => {}
        }
    }
}

fn constraint_segment(constraint: &Constraint) -> String {
    let kind = match constraint.kind {
        ConstraintKind::PrimaryKey => "primary_key",
        ConstraintKind::ForeignKey => "foreign_keys",
        ConstraintKind::UniqueKey => "unique_keys",
    };
    match &constraint.name {
        Some(name) => format!("{kind}/{name}"),
        None => format!("{kind}/{}", constraint.columns.join(",")),
    }
}
