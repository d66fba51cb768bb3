//! Schema snapshot types.
//!
//! A snapshot is a point-in-time capture of one database's tables and
//! columns. Readers build them, the differs consume them, and nothing ever
//! mutates a snapshot once it has been handed to the plan builder.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};

/// A single column as reported by a "describe columns" query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name, unique within its table.
    pub name: String,
    /// Vendor DDL type fragment, e.g. `varchar(255)` or `int(10) unsigned`.
    pub data_type: String,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Default value in vendor-literal form (`'abc'`, `0`, `CURRENT_TIMESTAMP`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Extra attributes such as `auto_increment`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
    /// 0-based position within the table.
    pub ordinal_position: usize,
}

impl ColumnDefinition {
    /// Creates a nullable column with no default and no extra attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            default_value: None,
            extra: None,
            ordinal_position: 0,
        }
    }

    /// Marks the column as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Marks the column as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets the default value (already in literal form).
    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Sets the extra attributes.
    #[must_use]
    pub fn extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    /// Sets the ordinal position.
    #[must_use]
    pub fn at_position(mut self, ordinal_position: usize) -> Self {
        self.ordinal_position = ordinal_position;
        self
    }

    /// Returns true if every comparable attribute matches `other`.
    ///
    /// The name and ordinal position are not compared. Type names are
    /// compared ignoring ASCII case, as are extra attributes (after
    /// trimming); defaults must match exactly.
    #[must_use]
    pub fn same_definition(&self, other: &Self) -> bool {
        self.data_type.eq_ignore_ascii_case(&other.data_type)
            && self.nullable == other.nullable
            && self.default_value == other.default_value
            && normalized_extra(self.extra.as_deref())
                == normalized_extra(other.extra.as_deref())
    }
}

fn normalized_extra(extra: Option<&str>) -> Option<String> {
    extra
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_ascii_lowercase)
}

/// One table of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// Table name.
    pub name: String,
    /// Columns ordered by ordinal position.
    pub columns: Vec<ColumnDefinition>,
    /// Raw `CREATE TABLE` text as reported by the database, if available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_statement: Option<String>,
}

impl TableSnapshot {
    /// Creates an empty table snapshot.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            create_statement: None,
        }
    }

    /// Appends a column, assigning it the next ordinal position.
    #[must_use]
    pub fn column(mut self, column: ColumnDefinition) -> Self {
        let position = self.columns.len();
        self.columns.push(column.at_position(position));
        self
    }

    /// Sets the raw `CREATE TABLE` statement.
    #[must_use]
    pub fn create_statement(mut self, sql: impl Into<String>) -> Self {
        self.create_statement = Some(sql.into());
        self
    }

    /// Gets a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns column names in ordinal order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Checks the table's structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidInput`] if the table or a column is
    /// unnamed, a column name repeats, or ordinal positions are not
    /// `0..len` in order.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PlanError::invalid("table with an empty name"));
        }

        let mut seen = HashSet::with_capacity(self.columns.len());
        for (index, column) in self.columns.iter().enumerate() {
            if column.name.trim().is_empty() {
                return Err(PlanError::invalid(format!(
                    "table '{}' has a column with an empty name",
                    self.name
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(PlanError::invalid(format!(
                    "table '{}' has duplicate column '{}'",
                    self.name, column.name
                )));
            }
            if column.ordinal_position != index {
                return Err(PlanError::invalid(format!(
                    "column '{}.{}' reports ordinal position {} but sits at {}",
                    self.name, column.name, column.ordinal_position, index
                )));
            }
        }

        Ok(())
    }

    /// Reassigns ordinal positions to match the current column order.
    pub(crate) fn renumber(&mut self) {
        for (index, column) in self.columns.iter_mut().enumerate() {
            column.ordinal_position = index;
        }
    }
}

/// A snapshot of every table in one database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    /// Tables keyed by name, sorted for deterministic iteration.
    pub tables: BTreeMap<String, TableSnapshot>,
    /// When the snapshot was read. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

impl SchemaSnapshot {
    /// Creates an empty schema snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table (builder style).
    #[must_use]
    pub fn table(mut self, table: TableSnapshot) -> Self {
        self.add_table(table);
        self
    }

    /// Adds a table, replacing any table with the same name.
    pub fn add_table(&mut self, table: TableSnapshot) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Records the capture time.
    #[must_use]
    pub fn captured_at(mut self, at: DateTime<Utc>) -> Self {
        self.captured_at = Some(at);
        self
    }

    /// Gets a table by name.
    #[must_use]
    pub fn get_table(&self, name: &str) -> Option<&TableSnapshot> {
        self.tables.get(name)
    }

    /// Returns table names in sorted order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Returns the number of tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if the snapshot has no tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Checks every table and that each is keyed under its own name.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidInput`] on the first malformed table.
    pub fn validate(&self) -> Result<()> {
        for (key, table) in &self.tables {
            if key != &table.name {
                return Err(PlanError::invalid(format!(
                    "table '{}' is stored under key '{key}'",
                    table.name
                )));
            }
            table.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> TableSnapshot {
        TableSnapshot::new("users")
            .column(ColumnDefinition::new("id", "int(11)").not_null().extra("auto_increment"))
            .column(ColumnDefinition::new("name", "varchar(255)").not_null())
            .column(ColumnDefinition::new("email", "varchar(255)"))
    }

    #[test]
    fn builder_assigns_ordinal_positions() {
        let table = users();
        let positions: Vec<usize> = table.columns.iter().map(|c| c.ordinal_position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["id", "name", "email"]
        );
    }

    #[test]
    fn same_definition_ignores_type_case_and_position() {
        let a = ColumnDefinition::new("id", "INT(11)").not_null().extra(" AUTO_INCREMENT");
        let b = ColumnDefinition::new("id", "int(11)")
            .not_null()
            .extra("auto_increment")
            .at_position(4);
        assert!(a.same_definition(&b));
    }

    #[test]
    fn same_definition_detects_default_change() {
        let a = ColumnDefinition::new("flag", "tinyint(1)").default_value("0");
        let b = ColumnDefinition::new("flag", "tinyint(1)").default_value("1");
        assert!(!a.same_definition(&b));
    }

    #[test]
    fn empty_extra_equals_missing_extra() {
        let a = ColumnDefinition::new("note", "text").extra("");
        let b = ColumnDefinition::new("note", "text");
        assert!(a.same_definition(&b));
    }

    #[test]
    fn validate_rejects_duplicate_columns() {
        let table = TableSnapshot::new("t")
            .column(ColumnDefinition::new("a", "int"))
            .column(ColumnDefinition::new("a", "int"));
        assert!(matches!(table.validate(), Err(PlanError::InvalidInput(_))));
    }

    #[test]
    fn validate_rejects_empty_table_name() {
        let table = TableSnapshot::new("  ").column(ColumnDefinition::new("id", "int"));
        assert!(matches!(table.validate(), Err(PlanError::InvalidInput(_))));

        let schema = SchemaSnapshot::new().table(TableSnapshot::new(""));
        assert!(matches!(schema.validate(), Err(PlanError::InvalidInput(_))));
    }

    #[test]
    fn validate_rejects_empty_column_name() {
        let table = TableSnapshot::new("t")
            .column(ColumnDefinition::new("id", "int"))
            .column(ColumnDefinition::new("", "text"));
        assert!(matches!(table.validate(), Err(PlanError::InvalidInput(_))));
    }

    #[test]
    fn validate_rejects_out_of_order_positions() {
        let mut table = users();
        table.columns[1].ordinal_position = 7;
        assert!(matches!(table.validate(), Err(PlanError::InvalidInput(_))));
    }

    #[test]
    fn validate_rejects_mismatched_key() {
        let mut schema = SchemaSnapshot::new();
        schema.tables.insert("accounts".to_string(), users());
        assert!(matches!(schema.validate(), Err(PlanError::InvalidInput(_))));
    }

    #[test]
    fn schema_snapshot_lookup() {
        let schema = SchemaSnapshot::new().table(users()).table(TableSnapshot::new("posts"));
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.table_names().collect::<Vec<_>>(), vec!["posts", "users"]);
        assert!(schema.get_table("users").is_some());
        assert!(schema.get_table("missing").is_none());
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn serializes_without_empty_optionals() {
        let column = ColumnDefinition::new("id", "int");
        let json = serde_json::to_string(&column).unwrap();
        assert!(!json.contains("default_value"));
        assert!(!json.contains("extra"));
    }
}
