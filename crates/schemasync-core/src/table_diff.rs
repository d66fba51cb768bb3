//! Table set comparison.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::snapshot::SchemaSnapshot;

/// How the table sets of two snapshots relate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSetDiff {
    /// Tables present in the source but not in the target.
    pub to_create: BTreeSet<String>,
    /// Tables present in the target but not in the source.
    pub to_drop: BTreeSet<String>,
    /// Tables present in both, candidates for column diffing.
    pub to_inspect: BTreeSet<String>,
}

impl TableSetDiff {
    /// Returns true if both snapshots hold exactly the same table names.
    #[must_use]
    pub fn same_tables(&self) -> bool {
        self.to_create.is_empty() && self.to_drop.is_empty()
    }
}

/// Compares the table names of `source` and `target`.
///
/// # Errors
///
/// Returns [`PlanError::InvalidInput`](crate::PlanError::InvalidInput) if
/// either snapshot is malformed.
pub fn diff_table_sets(source: &SchemaSnapshot, target: &SchemaSnapshot) -> Result<TableSetDiff> {
    source.validate()?;
    target.validate()?;

    let source_names: BTreeSet<&str> = source.table_names().collect();
    let target_names: BTreeSet<&str> = target.table_names().collect();

    Ok(TableSetDiff {
        to_create: source_names
            .difference(&target_names)
            .map(|n| (*n).to_string())
            .collect(),
        to_drop: target_names
            .difference(&source_names)
            .map(|n| (*n).to_string())
            .collect(),
        to_inspect: source_names
            .intersection(&target_names)
            .map(|n| (*n).to_string())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanError;
    use crate::snapshot::{ColumnDefinition, TableSnapshot};

    fn schema(names: &[&str]) -> SchemaSnapshot {
        names.iter().fold(SchemaSnapshot::new(), |s, name| {
            s.table(TableSnapshot::new(*name).column(ColumnDefinition::new("id", "int")))
        })
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn identical_schemas_inspect_everything() {
        let a = schema(&["posts", "users"]);
        let diff = diff_table_sets(&a, &a).unwrap();
        assert!(diff.to_create.is_empty());
        assert!(diff.to_drop.is_empty());
        assert_eq!(diff.to_inspect, set(&["posts", "users"]));
        assert!(diff.same_tables());
    }

    #[test]
    fn partitions_table_names() {
        let source = schema(&["posts", "tags", "users"]);
        let target = schema(&["legacy", "users"]);
        let diff = diff_table_sets(&source, &target).unwrap();
        assert_eq!(diff.to_create, set(&["posts", "tags"]));
        assert_eq!(diff.to_drop, set(&["legacy"]));
        assert_eq!(diff.to_inspect, set(&["users"]));
    }

    #[test]
    fn create_and_drop_are_symmetric() {
        let a = schema(&["a", "b", "c"]);
        let b = schema(&["b", "d"]);
        let forward = diff_table_sets(&a, &b).unwrap();
        let backward = diff_table_sets(&b, &a).unwrap();
        assert_eq!(forward.to_create, backward.to_drop);
        assert_eq!(forward.to_drop, backward.to_create);
        assert_eq!(forward.to_inspect, backward.to_inspect);
    }

    #[test]
    fn empty_snapshots() {
        let diff = diff_table_sets(&SchemaSnapshot::new(), &schema(&["users"])).unwrap();
        assert!(diff.to_create.is_empty());
        assert_eq!(diff.to_drop, set(&["users"]));
        assert!(diff.to_inspect.is_empty());
    }

    #[test]
    fn rejects_invalid_snapshot() {
        let mut bad = SchemaSnapshot::new();
        bad.tables.insert("users".to_string(), TableSnapshot::new("people"));
        let result = diff_table_sets(&bad, &SchemaSnapshot::new());
        assert!(matches!(result, Err(PlanError::InvalidInput(_))));
    }
}
