//! Immutable pairing of a cleaned table with its validated column roles.
//!
//! A [`Session`] is what a front end hands to the aggregation functions: it
//! checks that every stage or category column is categorical and every value
//! column numeric before any grouping happens.

use log::{debug, info};

use crate::{
    aggregate::{AggregateMode, AggregateRow, aggregate_by_category},
    clean::{CleanReport, clean_with_report},
    error::{FlowError, RoleError},
    flow::{FlowGraph, FlowSpec, build_flow},
    frame::Table,
    roles::{ColumnRole, ColumnRoles},
};

#[derive(Debug, Clone)]
pub struct Session {
    table: Table,
    roles: ColumnRoles,
    report: CleanReport,
}

impl Session {
    /// Validates `roles` against the headers of `raw` and cleans it.
    pub fn new(raw: &Table, roles: ColumnRoles) -> Result<Self, RoleError> {
        roles.validate(raw.headers())?;
        let (table, report) = clean_with_report(raw, &roles);
        if !report.is_empty() {
            info!(
                "{} numeric cell(s) could not be parsed and were treated as missing",
                report.total()
            );
        }
        Ok(Self {
            table,
            roles,
            report,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn roles(&self) -> &ColumnRoles {
        &self.roles
    }

    pub fn report(&self) -> &CleanReport {
        &self.report
    }

    /// Columns carrying `role`, in table order.
    pub fn columns_with(&self, role: ColumnRole) -> Vec<&str> {
        self.table
            .headers()
            .iter()
            .filter(|name| self.roles.role(name) == role)
            .map(String::as_str)
            .collect()
    }

    pub fn flow_spec<S: AsRef<str>>(&self, stages: &[S], value: &str) -> Result<FlowSpec, FlowError> {
        let spec = FlowSpec::new(
            stages.iter().map(|s| s.as_ref().to_string()).collect(),
            value,
        )?;
        for stage in spec.stages() {
            self.require_role(stage, ColumnRole::Categorical)?;
        }
        self.require_role(spec.value(), ColumnRole::Numeric)?;
        Ok(spec)
    }

    pub fn sankey<S: AsRef<str>>(&self, stages: &[S], value: &str) -> Result<FlowGraph, FlowError> {
        let spec = self.flow_spec(stages, value)?;
        debug!("Building flow {:?} -> '{}'", spec.stages(), spec.value());
        build_flow(&self.table, &spec)
    }

    pub fn bar(
        &self,
        category: &str,
        value: &str,
        mode: AggregateMode,
    ) -> Result<Vec<AggregateRow>, FlowError> {
        self.require_role(category, ColumnRole::Categorical)?;
        self.require_role(value, ColumnRole::Numeric)?;
        aggregate_by_category(&self.table, category, value, mode)
    }

    fn require_role(&self, column: &str, expected: ColumnRole) -> Result<(), FlowError> {
        if self.table.column_index(column).is_none() {
            return Err(FlowError::UnknownColumn(column.to_string()));
        }
        let actual = self.roles.role(column);
        if actual != expected {
            return Err(FlowError::RoleMismatch {
                column: column.to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }
}
