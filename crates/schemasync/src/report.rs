//! Plan presentation: text, SQL script and JSON.

use schemasync_core::{MigrationPlan, PlanDialect, Statement};
use serde::Serialize;

use crate::error::Result;

/// Headline printed when the plan has changes.
pub const OUT_OF_SYNC: &str = "The database is out of sync!";

/// Headline printed when the plan is empty.
pub const UP_TO_DATE: &str = "The database appears to be up to date.";

/// Output format for a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Headline and numbered statements.
    #[default]
    Text,
    /// Machine-readable plan and statements.
    Json,
    /// Executable SQL script.
    Sql,
}

/// JSON document describing a plan.
#[derive(Debug, Serialize)]
struct PlanReport<'a> {
    dialect: &'a str,
    in_sync: bool,
    operation_count: usize,
    plan: &'a MigrationPlan,
    statements: &'a [Statement],
}

/// Renders a plan in the requested format.
///
/// # Errors
///
/// Returns a serialization error if JSON output fails.
pub fn render<D: PlanDialect>(
    format: OutputFormat,
    plan: &MigrationPlan,
    dialect: &D,
) -> Result<String> {
    let statements = dialect.render_plan(plan);
    match format {
        OutputFormat::Text => Ok(render_text(&statements)),
        OutputFormat::Sql => Ok(render_sql(&statements)),
        OutputFormat::Json => render_json(plan, &statements, dialect.name()),
    }
}

/// Renders a headline followed by a numbered statement list.
#[must_use]
pub fn render_text(statements: &[Statement]) -> String {
    if statements.is_empty() {
        return format!("{UP_TO_DATE}\n");
    }
    let width = statements.len().to_string().len();
    let lines: String = statements
        .iter()
        .enumerate()
        .map(|(index, statement)| format!("{:>width$}. {}\n", index + 1, statement.sql))
        .collect();
    format!("{OUT_OF_SYNC}\n\n{lines}")
}

/// Renders statements as a script, one `;`-terminated statement per line.
///
/// Unsupported operations stay as comments.
#[must_use]
pub fn render_sql(statements: &[Statement]) -> String {
    statements
        .iter()
        .map(|statement| {
            if statement.is_executable() {
                format!("{};\n", statement.sql)
            } else {
                format!("{}\n", statement.sql)
            }
        })
        .collect()
}

/// Renders a plan and its statements as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`crate::SyncError::Serialization`] if serialization fails.
pub fn render_json(plan: &MigrationPlan, statements: &[Statement], dialect: &str) -> Result<String> {
    let report = PlanReport {
        dialect,
        in_sync: plan.is_empty(),
        operation_count: plan.operation_count(),
        plan,
        statements,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
