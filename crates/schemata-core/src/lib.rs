//! Core model and constraint builder for schemata.
//!
//! This crate defines the in-memory relational schema model (schemas, tables,
//! columns, constraints), the fluent [`ConstraintBuilder`] used to attach keys
//! to columns, and read-side helpers shared by schema readers and generators.

pub mod builder;
pub mod constraints;
pub mod error;
pub mod graph;
pub mod index;
pub mod naming;
pub mod schema;
pub mod types;
pub mod validation;

pub use builder::ConstraintBuilder;
pub use constraints::{Constraint, ConstraintKind};
pub use error::{Error, Result};
pub use graph::{FkGraphReport, FkGraphSummary, build_fk_graph_report};
pub use index::ForeignKeyIndex;
pub use naming::{ConstraintNamer, DefaultNamer};
pub use schema::{Column, ColumnId, Schema, Table, TableId};
pub use types::ColumnType;
pub use validation::{IssueSeverity, ValidationIssue, ValidationReport, validate_schema};
