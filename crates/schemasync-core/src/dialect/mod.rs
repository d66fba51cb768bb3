//! Dialect-specific statement rendering.
//!
//! A plan is engine-neutral. Dialects turn each operation into one or more
//! [`Statement`]s carrying the DDL text for a particular database.

mod mysql;
mod sqlite;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use mysql::MySqlDialect;
pub use sqlite::SqliteDialect;

use crate::operation::{ColumnOperation, TableOperation};
use crate::plan::MigrationPlan;
use crate::snapshot::ColumnDefinition;

/// What a rendered statement does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// `CREATE TABLE`.
    CreateTable,
    /// `DROP TABLE`.
    DropTable,
    /// `ALTER TABLE ... ADD COLUMN`.
    AddColumn,
    /// `ALTER TABLE ... MODIFY COLUMN`.
    ModifyColumn,
    /// `ALTER TABLE ... DROP COLUMN`.
    DropColumn,
    /// The dialect cannot express the operation; `sql` is a comment.
    Unsupported,
}

/// One rendered DDL statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Table the statement touches.
    pub table: String,
    /// Kind of statement.
    pub kind: StatementKind,
    /// SQL text, without a trailing semicolon.
    pub sql: String,
}

impl Statement {
    /// Creates a statement.
    #[must_use]
    pub fn new(table: impl Into<String>, kind: StatementKind, sql: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            kind,
            sql: sql.into(),
        }
    }

    /// Returns false for comments standing in for unsupported operations.
    #[must_use]
    pub fn is_executable(&self) -> bool {
        self.kind != StatementKind::Unsupported
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Rendering settings that are configuration rather than schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Character set applied to added/modified character columns.
    pub character_set: Option<String>,
    /// Collation applied to added/modified character columns.
    pub collation: Option<String>,
}

impl RenderOptions {
    /// Creates options with no character set or collation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the character set.
    #[must_use]
    pub fn character_set(mut self, charset: impl Into<String>) -> Self {
        self.character_set = Some(charset.into());
        self
    }

    /// Sets the collation.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }
}

/// Renders plan operations as SQL for a specific database.
pub trait PlanDialect: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Quotes an identifier (table or column name).
    fn quote_identifier(&self, name: &str) -> String;

    /// Renders a column definition: name, type, nullability, default, extra.
    fn column_definition(&self, column: &ColumnDefinition) -> String {
        let mut parts = vec![
            self.quote_identifier(&column.name),
            column.data_type.clone(),
        ];
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

    /// Generates SQL for creating a table, reusing captured DDL when present.
    fn create_table(
        &self,
        name: &str,
        create_statement: Option<&str>,
        columns: &[ColumnDefinition],
    ) -> String {
        if let Some(sql) = create_statement {
            return sql.trim().trim_end_matches(';').to_string();
        }
        let col_defs: Vec<String> = columns
            .iter()
            .map(|c| format!("  {}", self.column_definition(c)))
            .collect();
        format!(
            "CREATE TABLE {} (\n{}\n)",
            self.quote_identifier(name),
            col_defs.join(",\n")
        )
    }

    /// Generates SQL for dropping a table.
    fn drop_table(&self, name: &str) -> String {
        format!("DROP TABLE {}", self.quote_identifier(name))
    }

    /// Generates SQL for adding a column after `after` (or first).
    fn add_column(&self, table: &str, column: &ColumnDefinition, after: Option<&str>) -> Statement;

    /// Generates SQL for redefining a column.
    fn modify_column(&self, table: &str, column: &ColumnDefinition) -> Statement;

    /// Generates SQL for dropping a column.
    fn drop_column(&self, table: &str, column: &str) -> Statement {
        Statement::new(
            table,
            StatementKind::DropColumn,
            format!(
                "ALTER TABLE {} DROP COLUMN {}",
                self.quote_identifier(table),
                self.quote_identifier(column)
            ),
        )
    }

    /// Renders one column operation.
    fn render_column_operation(&self, table: &str, op: &ColumnOperation) -> Statement {
        match op {
            ColumnOperation::Add { column, after } => {
                self.add_column(table, column, after.as_deref())
            }
            ColumnOperation::Modify { column, .. } => self.modify_column(table, column),
            ColumnOperation::Drop { name } => self.drop_column(table, name),
        }
    }

    /// Renders one table operation; alters yield one statement per column.
    fn render_operation(&self, operation: &TableOperation) -> Vec<Statement> {
        match operation {
            TableOperation::CreateTable {
                name,
                create_statement,
                columns,
            } => vec![Statement::new(
                name.as_str(),
                StatementKind::CreateTable,
                self.create_table(name, create_statement.as_deref(), columns),
            )],
            TableOperation::DropTable { name } => vec![Statement::new(
                name.as_str(),
                StatementKind::DropTable,
                self.drop_table(name),
            )],
            TableOperation::AlterTable { name, operations } => operations
                .iter()
                .map(|op| self.render_column_operation(name, op))
                .collect(),
        }
    }

    /// Renders a whole plan, in plan order.
    fn render_plan(&self, plan: &MigrationPlan) -> Vec<Statement> {
        plan.iter()
            .flat_map(|op| self.render_operation(op))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::TableSnapshot;

    #[test]
    fn statement_display_is_sql() {
        let stmt = Statement::new("users", StatementKind::DropTable, "DROP TABLE `users`");
        assert_eq!(stmt.to_string(), "DROP TABLE `users`");
        assert!(stmt.is_executable());
        assert!(!Statement::new("users", StatementKind::Unsupported, "-- no").is_executable());
    }

    #[test]
    fn render_plan_flattens_alters() {
        let plan = MigrationPlan::from_operations(vec![
            TableOperation::alter_table(
                "users",
                vec![
                    ColumnOperation::add(ColumnDefinition::new("email", "text"), Some("name")),
                    ColumnOperation::drop("legacy"),
                ],
            ),
            TableOperation::create_table(
                &TableSnapshot::new("posts").column(ColumnDefinition::new("id", "int").not_null()),
            ),
        ]);

        let kinds: Vec<StatementKind> = MySqlDialect::new()
            .render_plan(&plan)
            .into_iter()
            .map(|s| s.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                StatementKind::CreateTable,
                StatementKind::AddColumn,
                StatementKind::DropColumn,
            ]
        );
    }

    #[test]
    fn captured_ddl_is_reused_verbatim() {
        let sql = MySqlDialect::new().create_table(
            "posts",
            Some("CREATE TABLE `posts` (`id` int NOT NULL);\n"),
            &[],
        );
        assert_eq!(sql, "CREATE TABLE `posts` (`id` int NOT NULL)");
    }
}
