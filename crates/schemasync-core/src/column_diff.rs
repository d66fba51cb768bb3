//! Column structure comparison.
//!
//! Walks the source table in ordinal order so that every added column can
//! be anchored to the column that precedes it in the source, then appends
//! drops for target-only columns.

use std::collections::{HashMap, HashSet};

use crate::error::{PlanError, Result};
use crate::operation::ColumnOperation;
use crate::snapshot::{ColumnDefinition, TableSnapshot};

/// Compares two versions of the same table and returns the column
/// operations that turn `target` into `source`.
///
/// Adds and modifies come first, in source ordinal order. Drops follow, in
/// target ordinal order.
///
/// # Errors
///
/// Returns [`PlanError::MissingTable`] if the two snapshots describe
/// different tables, or [`PlanError::InvalidInput`] if either is malformed.
pub fn diff_columns(source: &TableSnapshot, target: &TableSnapshot) -> Result<Vec<ColumnOperation>> {
    if source.name != target.name {
        return Err(PlanError::MissingTable(format!(
            "'{}' has no counterpart named '{}'",
            target.name, source.name
        )));
    }
    source.validate()?;
    target.validate()?;

    let target_columns: HashMap<&str, &ColumnDefinition> = target
        .columns
        .iter()
        .map(|c| (c.name.as_str(), c))
        .collect();

    let mut operations = Vec::new();
    let mut previous: Option<&str> = None;

    for column in &source.columns {
        match target_columns.get(column.name.as_str()) {
            None => operations.push(ColumnOperation::add(column.clone(), previous)),
            Some(existing) if !column.same_definition(existing) => {
                operations.push(ColumnOperation::modify(column.clone()));
            }
            Some(_) => {}
        }
        previous = Some(column.name.as_str());
    }

    let source_names: HashSet<&str> = source.column_names().collect();
    operations.extend(
        target
            .columns
            .iter()
            .filter(|c| !source_names.contains(c.name.as_str()))
            .map(|c| ColumnOperation::drop(c.name.as_str())),
    );

    Ok(operations)
}
