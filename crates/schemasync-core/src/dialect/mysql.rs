//! MySQL / MariaDB dialect.
//!
//! Column positions are kept with `AFTER` / `FIRST`, and redefinitions use
//! `MODIFY COLUMN`.

use crate::snapshot::ColumnDefinition;

use super::{PlanDialect, RenderOptions, Statement, StatementKind};

/// Type prefixes that accept `CHARACTER SET` / `COLLATE`.
const CHARACTER_TYPES: &[&str] = &[
    "char", "varchar", "tinytext", "text", "mediumtext", "longtext", "enum", "set",
];

/// MySQL migration dialect.
#[derive(Debug, Clone, Default)]
pub struct MySqlDialect {
    options: RenderOptions,
}

impl MySqlDialect {
    /// Creates a MySQL dialect with no character set or collation clauses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a MySQL dialect with the given rendering options.
    #[must_use]
    pub const fn with_options(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Returns the rendering options.
    #[must_use]
    pub const fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// `CHARACTER SET` / `COLLATE` clause for a character column, if any.
    fn charset_clause(&self, data_type: &str) -> Option<String> {
        if !is_character_type(data_type) {
            return None;
        }
        let mut clauses = Vec::new();
        if let Some(ref charset) = self.options.character_set {
            clauses.push(format!("CHARACTER SET {charset}"));
        }
        if let Some(ref collation) = self.options.collation {
            clauses.push(format!("COLLATE {collation}"));
        }
        if clauses.is_empty() {
            None
        } else {
            Some(clauses.join(" "))
        }
    }
}

/// Returns true if `data_type` names a character type.
fn is_character_type(data_type: &str) -> bool {
    let base: String = data_type
        .trim()
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .collect::<String>()
        .to_ascii_lowercase();
    CHARACTER_TYPES.contains(&base.as_str())
}

impl PlanDialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn column_definition(&self, column: &ColumnDefinition) -> String {
        let mut parts = vec![
            self.quote_identifier(&column.name),
            column.data_type.clone(),
        ];
        if let Some(clause) = self.charset_clause(&column.data_type) {
            parts.push(clause);
        }
        parts.push(if column.nullable { "NULL" } else { "NOT NULL" }.to_string());
        if let Some(ref default) = column.default_value {
            parts.push(format!("DEFAULT {default}"));
        }
        if let Some(extra) = column
            .extra
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
        {
            parts.push(extra.to_string());
        }
        parts.join(" ")
    }

    fn add_column(&self, table: &str, column: &ColumnDefinition, after: Option<&str>) -> Statement {
        let position = after.map_or_else(
            || "FIRST".to_string(),
            |anchor| format!("AFTER {}", self.quote_identifier(anchor)),
        );
        Statement::new(
            table,
            StatementKind::AddColumn,
            format!(
                "ALTER TABLE {} ADD COLUMN {} {}",
                self.quote_identifier(table),
                self.column_definition(column),
                position
            ),
        )
    }

    fn modify_column(&self, table: &str, column: &ColumnDefinition) -> Statement {
        Statement::new(
            table,
            StatementKind::ModifyColumn,
            format!(
                "ALTER TABLE {} MODIFY COLUMN {}",
                self.quote_identifier(table),
                self.column_definition(column)
            ),
        )
    }
}
