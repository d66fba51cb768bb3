//! In-memory plan application.
//!
//! Applies a plan to a snapshot without touching a database, producing the
//! snapshot the target would have after executing the plan. Useful for
//! previews and for checking that a plan converges.

use crate::error::{PlanError, Result};
use crate::operation::{ColumnOperation, TableOperation};
use crate::plan::MigrationPlan;
use crate::snapshot::{SchemaSnapshot, TableSnapshot};

/// Applies `plan` to a copy of `target` and returns the result.
///
/// Altered tables lose their captured `CREATE TABLE` text, since it no
/// longer describes them.
///
/// # Errors
///
/// Returns [`PlanError::MissingTable`] if an operation refers to a table
/// that is absent (or, for creates, already present), and
/// [`PlanError::InvalidInput`] if a column operation cannot be applied.
pub fn apply_plan(target: &SchemaSnapshot, plan: &MigrationPlan) -> Result<SchemaSnapshot> {
    let mut result = target.clone();
    for operation in plan {
        apply_operation(&mut result, operation)?;
    }
    Ok(result)
}

fn apply_operation(schema: &mut SchemaSnapshot, operation: &TableOperation) -> Result<()> {
    match operation {
        TableOperation::CreateTable {
            name,
            create_statement,
            columns,
        } => {
            if schema.tables.contains_key(name) {
                return Err(PlanError::invalid(format!("table '{name}' already exists")));
            }
            let mut table = TableSnapshot::new(name.as_str());
            table.columns.clone_from(columns);
            table.create_statement.clone_from(create_statement);
            table.renumber();
            schema.add_table(table);
        }
        TableOperation::DropTable { name } => {
            schema
                .tables
                .remove(name)
                .ok_or_else(|| PlanError::MissingTable(name.clone()))?;
        }
        TableOperation::AlterTable { name, operations } => {
            let table = schema
                .tables
                .get_mut(name)
                .ok_or_else(|| PlanError::MissingTable(name.clone()))?;
            for op in operations {
                apply_column_operation(table, op)?;
            }
            table.renumber();
            table.create_statement = None;
        }
    }
    Ok(())
}

fn apply_column_operation(table: &mut TableSnapshot, op: &ColumnOperation) -> Result<()> {
    let position = |table: &TableSnapshot, column: &str| {
        table
            .columns
            .iter()
            .position(|c| c.name == column)
            .ok_or_else(|| {
                PlanError::invalid(format!("column '{}.{column}' does not exist", table.name))
            })
    };

    match op {
        ColumnOperation::Add { column, after } => {
            if table.get_column(&column.name).is_some() {
                return Err(PlanError::invalid(format!(
                    "column '{}.{}' already exists",
                    table.name, column.name
                )));
            }
            let index = match after {
                Some(anchor) => position(table, anchor)? + 1,
                None => 0,
            };
            table.columns.insert(index, column.clone());
        }
        ColumnOperation::Modify { name, column } => {
            let index = position(table, name)?;
            let mut replacement = column.clone();
            replacement.name.clone_from(name);
            table.columns[index] = replacement;
        }
        ColumnOperation::Drop { name } => {
            let index = position(table, name)?;
            table.columns.remove(index);
        }
    }
    Ok(())
}
