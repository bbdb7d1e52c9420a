use crate::constraints::{Constraint, ConstraintKind};
use crate::schema::Schema;

/// Naming convention applied to anonymous constraints.
pub trait ConstraintNamer {
    fn name(&self, constraint: &Constraint) -> String;
}

/// `pk_<table>`, `fk_<table>_<columns>_<referenced table>` and
/// `uk_<table>_<columns>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNamer;

impl ConstraintNamer for DefaultNamer {
    fn name(&self, constraint: &Constraint) -> String {
        let table = &constraint.table_name;
        let columns = constraint.columns.join("_");
        match (constraint.kind, &constraint.refers_to_table) {
            (ConstraintKind::PrimaryKey, _) => format!("pk_{table}"),
            (ConstraintKind::ForeignKey, Some(target)) => format!("fk_{table}_{columns}_{target}"),
            (ConstraintKind::ForeignKey, None) => format!("fk_{table}_{columns}"),
            (ConstraintKind::UniqueKey, _) => format!("uk_{table}_{columns}"),
        }
    }
}

impl Schema {
    /// Give every anonymous constraint a name from `namer`.
    ///
    /// Named constraints are left untouched. Returns how many were named.
    pub fn name_anonymous_constraints(&mut self, namer: &impl ConstraintNamer) -> usize {
        let mut named = 0;
        for table in self.tables_mut() {
            for constraint in table.constraints_mut() {
                if constraint.is_anonymous() {
                    constraint.name = Some(namer.name(constraint));
                    named += 1;
                }
            }
        }
        tracing::debug!(event = "constraints_named", schema = %self.name(), named);
        named
    }
}
