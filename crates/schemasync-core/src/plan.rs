//! Migration plan building.
//!
//! The builder runs the table set differ, emits creates and drops, and then
//! runs the column differ on every shared table whose DDL text looks
//! different. The textual check only decides whether to look closer; the
//! operations always come from the attribute-wise column diff.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::column_diff::diff_columns;
use crate::error::{PlanError, Result};
use crate::operation::{ColumnOperation, TableOperation};
use crate::snapshot::{SchemaSnapshot, TableSnapshot};
use crate::table_diff::diff_table_sets;

/// Options for the plan builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOptions {
    /// Tables left out of the comparison on both sides.
    pub ignored_tables: BTreeSet<String>,
    /// Whether to emit table and column drops.
    pub include_drops: bool,
    /// Whether to skip tables whose `CREATE TABLE` text is identical.
    pub precheck: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            ignored_tables: BTreeSet::new(),
            include_drops: true,
            precheck: true,
        }
    }
}

impl PlanOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignores a table on both sides.
    #[must_use]
    pub fn ignore_table(mut self, name: impl Into<String>) -> Self {
        self.ignored_tables.insert(name.into());
        self
    }

    /// Leaves table and column drops out of the plan.
    #[must_use]
    pub fn without_drops(mut self) -> Self {
        self.include_drops = false;
        self
    }

    /// Runs the column differ on every shared table.
    #[must_use]
    pub fn without_precheck(mut self) -> Self {
        self.precheck = false;
        self
    }
}

/// An ordered list of table operations that reconciles a target with a
/// source.
///
/// Creates precede drops, which precede alters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationPlan {
    operations: Vec<TableOperation>,
}

impl MigrationPlan {
    /// Builds a plan from operations, sorting them into plan order.
    ///
    /// The sort is stable, so operations of the same kind keep their
    /// relative order.
    #[must_use]
    pub fn from_operations(mut operations: Vec<TableOperation>) -> Self {
        operations.sort_by_key(TableOperation::rank);
        Self { operations }
    }

    /// Returns the operations in plan order.
    #[must_use]
    pub fn operations(&self) -> &[TableOperation] {
        &self.operations
    }

    /// Iterates over the operations in plan order.
    pub fn iter(&self) -> std::slice::Iter<'_, TableOperation> {
        self.operations.iter()
    }

    /// Returns true if the target already matches the source.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of table operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Number of operations, counting each column operation of an alter
    /// plus every create and drop.
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.operations
            .iter()
            .map(|op| match op {
                TableOperation::AlterTable { operations, .. } => operations.len(),
                _ => 1,
            })
            .sum()
    }

    /// Names of tables the plan creates.
    pub fn creates(&self) -> impl Iterator<Item = &str> {
        self.names_of(0)
    }

    /// Names of tables the plan drops.
    pub fn drops(&self) -> impl Iterator<Item = &str> {
        self.names_of(1)
    }

    /// Names of tables the plan alters.
    pub fn alters(&self) -> impl Iterator<Item = &str> {
        self.names_of(2)
    }

    fn names_of(&self, rank: u8) -> impl Iterator<Item = &str> {
        self.operations
            .iter()
            .filter(move |op| op.rank() == rank)
            .map(TableOperation::table_name)
    }

    /// Checks the ordering invariant: creates, then drops, then alters.
    #[must_use]
    pub fn is_well_ordered(&self) -> bool {
        self.operations.windows(2).all(|w| w[0].rank() <= w[1].rank())
    }

    /// Consumes the plan, returning its operations.
    #[must_use]
    pub fn into_operations(self) -> Vec<TableOperation> {
        self.operations
    }
}

impl<'a> IntoIterator for &'a MigrationPlan {
    type Item = &'a TableOperation;
    type IntoIter = std::slice::Iter<'a, TableOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

/// Builds migration plans from pairs of snapshots.
#[derive(Debug, Clone, Default)]
pub struct PlanBuilder {
    options: PlanOptions,
}

impl PlanBuilder {
    /// Creates a builder with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder with custom options.
    #[must_use]
    pub const fn with_options(options: PlanOptions) -> Self {
        Self { options }
    }

    /// Returns the builder's options.
    #[must_use]
    pub const fn options(&self) -> &PlanOptions {
        &self.options
    }

    /// Computes the plan that turns `target` into `source`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidInput`] if either snapshot is malformed.
    /// [`PlanError::MissingTable`] signals an internal inconsistency and is
    /// never expected for well-formed snapshots.
    pub fn build(&self, source: &SchemaSnapshot, target: &SchemaSnapshot) -> Result<MigrationPlan> {
        let source = self.without_ignored(source);
        let target = self.without_ignored(target);
        let tables = diff_table_sets(&source, &target)?;

        let mut operations = Vec::new();

        for name in &tables.to_create {
            let table = lookup(&source, name)?;
            debug!(table = %name, "Table missing from target");
            operations.push(TableOperation::create_table(table));
        }

        for name in &tables.to_drop {
            if self.options.include_drops {
                debug!(table = %name, "Table missing from source");
                operations.push(TableOperation::drop_table(name.as_str()));
            } else {
                info!(table = %name, "Leaving target-only table in place");
            }
        }

        for name in &tables.to_inspect {
            let source_table = lookup(&source, name)?;
            let target_table = lookup(&target, name)?;

            if self.options.precheck && statements_match(source_table, target_table) {
                debug!(table = %name, "CREATE TABLE text identical, skipping");
                continue;
            }

            let mut columns = diff_columns(source_table, target_table)?;
            if !self.options.include_drops {
                columns.retain(|op| {
                    if let ColumnOperation::Drop { name: column } = op {
                        info!(table = %name, column = %column, "Leaving target-only column in place");
                        false
                    } else {
                        true
                    }
                });
            }

            if columns.is_empty() {
                debug!(table = %name, "No column differences");
                continue;
            }

            debug!(table = %name, changes = columns.len(), "Table needs altering");
            operations.push(TableOperation::alter_table(name.as_str(), columns));
        }

        let plan = MigrationPlan::from_operations(operations);
        info!(
            creates = tables.to_create.len(),
            operations = plan.len(),
            changes = plan.operation_count(),
            "Migration plan built"
        );
        Ok(plan)
    }

    fn without_ignored(&self, snapshot: &SchemaSnapshot) -> SchemaSnapshot {
        if self.options.ignored_tables.is_empty() {
            return snapshot.clone();
        }
        let mut filtered = snapshot.clone();
        filtered
            .tables
            .retain(|name, _| !self.options.ignored_tables.contains(name));
        filtered
    }
}

/// Computes the plan that turns `target` into `source` with default options.
///
/// # Errors
///
/// See [`PlanBuilder::build`].
pub fn build_plan(source: &SchemaSnapshot, target: &SchemaSnapshot) -> Result<MigrationPlan> {
    PlanBuilder::new().build(source, target)
}

fn lookup<'a>(snapshot: &'a SchemaSnapshot, name: &str) -> Result<&'a TableSnapshot> {
    snapshot
        .get_table(name)
        .ok_or_else(|| PlanError::MissingTable(name.to_string()))
}

/// Returns true if both tables carry `CREATE TABLE` text that is identical
/// once all whitespace is removed.
///
/// A table without captured DDL never matches, so it always gets the full
/// column diff.
#[must_use]
pub fn statements_match(source: &TableSnapshot, target: &TableSnapshot) -> bool {
    match (&source.create_statement, &target.create_statement) {
        (Some(a), Some(b)) => strip_whitespace(a) == strip_whitespace(b),
        _ => false,
    }
}

fn strip_whitespace(sql: &str) -> String {
    sql.chars().filter(|c| !c.is_whitespace()).collect()
}
