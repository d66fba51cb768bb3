//! SQLite dialect.
//!
//! SQLite cannot position added columns or redefine existing ones in place.
//! Adds go to the end of the table and modifies are rendered as comments.
//! Adds that `ALTER TABLE ... ADD COLUMN` would reject are rendered as
//! comments too.

use crate::snapshot::ColumnDefinition;

use super::{PlanDialect, Statement, StatementKind};

/// Defaults SQLite refuses on an added column.
const NON_CONSTANT_DEFAULTS: &[&str] = &["CURRENT_TIME", "CURRENT_DATE", "CURRENT_TIMESTAMP"];

/// SQLite migration dialect.
#[derive(Debug, Clone, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PlanDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn column_definition(&self, column: &ColumnDefinition) -> String {
        let mut parts = vec![self.quote_identifier(&column.name)];
        if !column.data_type.is_empty() {
            parts.push(column.data_type.clone());
        }
        if !column.nullable {
            parts.push("NOT NULL".to_string());
        }
        if let Some(ref default) = column.default_value {
            parts.push(format!("DEFAULT {default}"));
        }
        parts.join(" ")
    }

    fn add_column(&self, table: &str, column: &ColumnDefinition, _after: Option<&str>) -> Statement {
        if let Some(restriction) = add_column_restriction(column) {
            return Statement::new(
                table,
                StatementKind::Unsupported,
                format!(
                    "-- ADD COLUMN {restriction} not supported in SQLite. \
                     Table recreation required for: {}.{}",
                    table, column.name
                ),
            );
        }
        Statement::new(
            table,
            StatementKind::AddColumn,
            format!(
                "ALTER TABLE {} ADD COLUMN {}",
                self.quote_identifier(table),
                self.column_definition(column)
            ),
        )
    }

    fn modify_column(&self, table: &str, column: &ColumnDefinition) -> Statement {
        Statement::new(
            table,
            StatementKind::Unsupported,
            format!(
                "-- MODIFY COLUMN not supported in SQLite. \
                 Table recreation required for: {}.{}",
                table, column.name
            ),
        )
    }
}

/// Describes why SQLite would reject adding `column`, if it would.
fn add_column_restriction(column: &ColumnDefinition) -> Option<&'static str> {
    match column.default_value.as_deref().map(str::trim) {
        None if !column.nullable => Some("of a NOT NULL column without a default"),
        Some(default) if !column.nullable && default.eq_ignore_ascii_case("NULL") => {
            Some("of a NOT NULL column without a default")
        }
        Some(default) if !is_constant_default(default) => Some("with a non-constant default"),
        _ => None,
    }
}

fn is_constant_default(default: &str) -> bool {
    let upper = default.to_ascii_uppercase();
    !default.starts_with('(') && !NON_CONSTANT_DEFAULTS.contains(&upper.as_str())
}
