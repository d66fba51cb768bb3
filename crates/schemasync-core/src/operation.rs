//! Plan operations.
//!
//! Table-level operations wrap the column-level ones produced by the
//! column differ.

use serde::{Deserialize, Serialize};

use crate::snapshot::{ColumnDefinition, TableSnapshot};

/// A change to a single column of an existing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ColumnOperation {
    /// Add a column, positioned after `after` (or first when `None`).
    Add {
        /// The source column definition.
        column: ColumnDefinition,
        /// Name of the preceding source column.
        after: Option<String>,
    },
    /// Drop a column.
    Drop {
        /// Column name.
        name: String,
    },
    /// Redefine an existing column to match the source.
    Modify {
        /// Column name.
        name: String,
        /// The source column definition.
        column: ColumnDefinition,
    },
}

impl ColumnOperation {
    /// Creates an add operation.
    #[must_use]
    pub fn add(column: ColumnDefinition, after: Option<&str>) -> Self {
        Self::Add {
            column,
            after: after.map(str::to_string),
        }
    }

    /// Creates a drop operation.
    #[must_use]
    pub fn drop(name: impl Into<String>) -> Self {
        Self::Drop { name: name.into() }
    }

    /// Creates a modify operation carrying the full source definition.
    #[must_use]
    pub fn modify(column: ColumnDefinition) -> Self {
        Self::Modify {
            name: column.name.clone(),
            column,
        }
    }

    /// Name of the column this operation touches.
    #[must_use]
    pub fn column_name(&self) -> &str {
        match self {
            Self::Add { column, .. } => &column.name,
            Self::Drop { name } | Self::Modify { name, .. } => name,
        }
    }

    /// Returns true for drop operations.
    #[must_use]
    pub const fn is_drop(&self) -> bool {
        matches!(self, Self::Drop { .. })
    }
}

/// A change to the table set of the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TableOperation {
    /// Create a table that only exists in the source.
    CreateTable {
        /// Table name.
        name: String,
        /// Raw DDL from the source, when the reader captured it.
        create_statement: Option<String>,
        /// Source columns, used when the DDL has to be synthesized.
        columns: Vec<ColumnDefinition>,
    },
    /// Drop a table that only exists in the target.
    DropTable {
        /// Table name.
        name: String,
    },
    /// Alter a table present in both schemas.
    AlterTable {
        /// Table name.
        name: String,
        /// Column operations, adds/modifies first then drops.
        operations: Vec<ColumnOperation>,
    },
}

impl TableOperation {
    /// Creates a create-table operation from a source table.
    #[must_use]
    pub fn create_table(table: &TableSnapshot) -> Self {
        Self::CreateTable {
            name: table.name.clone(),
            create_statement: table.create_statement.clone(),
            columns: table.columns.clone(),
        }
    }

    /// Creates a drop-table operation.
    #[must_use]
    pub fn drop_table(name: impl Into<String>) -> Self {
        Self::DropTable { name: name.into() }
    }

    /// Creates an alter-table operation.
    #[must_use]
    pub fn alter_table(name: impl Into<String>, operations: Vec<ColumnOperation>) -> Self {
        Self::AlterTable {
            name: name.into(),
            operations,
        }
    }

    /// Name of the table this operation touches.
    #[must_use]
    pub fn table_name(&self) -> &str {
        match self {
            Self::CreateTable { name, .. }
            | Self::DropTable { name }
            | Self::AlterTable { name, .. } => name,
        }
    }

    /// Ordering rank: creates, then drops, then alters.
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::CreateTable { .. } => 0,
            Self::DropTable { .. } => 1,
            Self::AlterTable { .. } => 2,
        }
    }

    /// Number of column operations (zero for create/drop).
    #[must_use]
    pub fn column_operation_count(&self) -> usize {
        match self {
            Self::AlterTable { operations, .. } => operations.len(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_operation_names() {
        let add = ColumnOperation::add(ColumnDefinition::new("email", "text"), Some("name"));
        assert_eq!(add.column_name(), "email");
        assert_eq!(ColumnOperation::drop("legacy").column_name(), "legacy");
        assert!(ColumnOperation::drop("legacy").is_drop());

        let modify = ColumnOperation::modify(ColumnDefinition::new("name", "varchar(10)"));
        assert_eq!(modify.column_name(), "name");
        assert!(!modify.is_drop());
    }

    #[test]
    fn create_table_copies_source() {
        let table = TableSnapshot::new("posts")
            .column(ColumnDefinition::new("id", "int").not_null())
            .create_statement("CREATE TABLE posts (id int NOT NULL)");
        match TableOperation::create_table(&table) {
            TableOperation::CreateTable {
                name,
                create_statement,
                columns,
            } => {
                assert_eq!(name, "posts");
                assert_eq!(
                    create_statement.as_deref(),
                    Some("CREATE TABLE posts (id int NOT NULL)")
                );
                assert_eq!(columns.len(), 1);
            }
            other => panic!("Expected CreateTable, got {other:?}"),
        }
    }

    #[test]
    fn ranks_follow_plan_order() {
        let create = TableOperation::create_table(&TableSnapshot::new("a"));
        let drop = TableOperation::drop_table("b");
        let alter = TableOperation::alter_table("c", vec![ColumnOperation::drop("x")]);
        assert!(create.rank() < drop.rank());
        assert!(drop.rank() < alter.rank());
        assert_eq!(alter.column_operation_count(), 1);
        assert_eq!(drop.column_operation_count(), 0);
    }

    #[test]
    fn serializes_with_tag() {
        let json = serde_json::to_string(&TableOperation::drop_table("old")).unwrap();
        assert_eq!(json, r#"{"op":"drop_table","name":"old"}"#);
    }
}
