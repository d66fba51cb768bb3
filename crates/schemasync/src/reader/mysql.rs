//! MySQL / MariaDB snapshot reader.

use std::time::Duration;

use chrono::Utc;
use schemasync_core::{ColumnDefinition, SchemaSnapshot, TableSnapshot};
use sqlx::Row;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use tracing::debug;

use super::SnapshotReader;
use crate::error::{Result, SyncError};

const LIST_TABLES_SQL: &str = "SHOW FULL TABLES WHERE Table_type = 'BASE TABLE'";

const COLUMNS_SQL: &str = r"
SELECT CAST(COLUMN_NAME AS CHAR) AS column_name,
       CAST(DATA_TYPE AS CHAR) AS data_type,
       CAST(COLUMN_TYPE AS CHAR) AS column_type,
       CAST(IS_NULLABLE AS CHAR) AS is_nullable,
       CAST(COLUMN_DEFAULT AS CHAR) AS column_default,
       CAST(EXTRA AS CHAR) AS extra
FROM information_schema.COLUMNS
WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
ORDER BY ORDINAL_POSITION
";

/// `DATA_TYPE` values whose defaults are written without quotes.
const NUMERIC_TYPES: &[&str] = &[
    "tinyint",
    "smallint",
    "mediumint",
    "int",
    "integer",
    "bigint",
    "decimal",
    "numeric",
    "float",
    "double",
    "real",
    "bit",
    "year",
];

/// `DATA_TYPE` values that accept the temporal default keywords below.
const TEMPORAL_TYPES: &[&str] = &["timestamp", "datetime", "date", "time"];

/// Keyword defaults reported without a `DEFAULT_GENERATED` marker.
const TEMPORAL_KEYWORDS: &[&str] = &[
    "CURRENT_TIMESTAMP",
    "CURRENT_DATE",
    "CURRENT_TIME",
    "LOCALTIMESTAMP",
    "LOCALTIME",
    "NOW",
];

/// Reads snapshots from a MySQL or MariaDB database.
#[derive(Debug, Clone)]
pub struct MySqlReader {
    pool: MySqlPool,
}

impl MySqlReader {
    /// Creates a reader over an existing pool.
    #[must_use]
    pub const fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Connects to `url`. A `mariadb:` scheme is accepted as MySQL.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Connection`] if the database cannot be reached.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self> {
        let url = url
            .strip_prefix("mariadb:")
            .map_or_else(|| url.to_string(), |rest| format!("mysql:{rest}"));
        let pool = MySqlPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(timeout)
            .connect(&url)
            .await
            .map_err(SyncError::Connection)?;
        Ok(Self::new(pool))
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    async fn table_names(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(LIST_TABLES_SQL)
            .fetch_all(&self.pool)
            .await
            .map_err(SyncError::catalog)?;
        rows.iter()
            .map(|row| text(row, 0).map_err(SyncError::catalog))
            .collect()
    }

    async fn read_table(&self, name: &str) -> Result<TableSnapshot> {
        let rows = sqlx::query(COLUMNS_SQL)
            .bind(name)
            .fetch_all(&self.pool)
            .await
            .map_err(SyncError::for_table(name))?;

        let mut table = TableSnapshot::new(name);
        for row in &rows {
            table = table.column(column_from_row(row).map_err(SyncError::for_table(name))?);
        }

        let create = sqlx::query(&format!("SHOW CREATE TABLE `{}`", name.replace('`', "``")))
            .fetch_one(&self.pool)
            .await
            .map_err(SyncError::for_table(name))?;
        let ddl = text(&create, 1).map_err(SyncError::for_table(name))?;

        debug!(table = %name, columns = table.columns.len(), "Read table");
        Ok(table.create_statement(ddl))
    }
}

impl SnapshotReader for MySqlReader {
    async fn read_snapshot(&self) -> Result<SchemaSnapshot> {
        let mut snapshot = SchemaSnapshot::new().captured_at(Utc::now());
        for name in self.table_names().await? {
            snapshot.add_table(self.read_table(&name).await?);
        }
        Ok(snapshot)
    }
}

fn column_from_row(row: &MySqlRow) -> std::result::Result<ColumnDefinition, sqlx::Error> {
    let name = text(row, "column_name")?;
    let data_type = text(row, "data_type")?;
    let column_type = text(row, "column_type")?;
    let nullable = text(row, "is_nullable")?.eq_ignore_ascii_case("YES");
    let default = optional_text(row, "column_default")?;
    let extra = optional_text(row, "extra")?.unwrap_or_default();

    let mut column = ColumnDefinition::new(name, column_type);
    column.nullable = nullable;
    column.default_value = normalize_default(default.as_deref(), &data_type, &extra);
    column.extra = strip_default_generated(&extra);
    Ok(column)
}

/// Reads a text cell, accepting servers that report catalog text as binary.
fn text<I>(row: &MySqlRow, index: I) -> std::result::Result<String, sqlx::Error>
where
    I: sqlx::ColumnIndex<MySqlRow> + Copy,
{
    row.try_get::<String, _>(index).or_else(|_| {
        row.try_get::<Vec<u8>, _>(index)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    })
}

fn optional_text<I>(row: &MySqlRow, index: I) -> std::result::Result<Option<String>, sqlx::Error>
where
    I: sqlx::ColumnIndex<MySqlRow> + Copy,
{
    row.try_get::<Option<String>, _>(index).or_else(|_| {
        row.try_get::<Option<Vec<u8>>, _>(index)
            .map(|bytes| bytes.map(|b| String::from_utf8_lossy(&b).into_owned()))
    })
}

/// Converts an `information_schema` default into the literal used in DDL.
///
/// A value is an expression only when `EXTRA` carries MySQL 8's
/// `DEFAULT_GENERATED` marker, or when a temporal column reports one of the
/// temporal keywords (`CURRENT_TIMESTAMP`, `CURRENT_TIMESTAMP(3)`, `now()`).
/// Expressions, numeric defaults of numeric columns and values that are
/// already quoted (as MariaDB reports them) pass through. Everything else is
/// quoted with `'` doubled inside. A bare `NULL` means no default.
#[must_use]
pub fn normalize_default(raw: Option<&str>, data_type: &str, extra: &str) -> Option<String> {
    let value = raw?;
    if value.eq_ignore_ascii_case("NULL") {
        return None;
    }
    let data_type = data_type.to_ascii_lowercase();
    let is_quoted = value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'');
    let is_expression = extra.to_ascii_uppercase().contains("DEFAULT_GENERATED")
        || (TEMPORAL_TYPES.contains(&data_type.as_str()) && is_temporal_keyword(value));
    let is_numeric = NUMERIC_TYPES.contains(&data_type.as_str())
        && (value.parse::<f64>().is_ok() || value.starts_with("b'"));

    if is_quoted || is_expression || is_numeric {
        Some(value.to_string())
    } else {
        Some(format!("'{}'", value.replace('\'', "''")))
    }
}

/// Matches `KEYWORD`, `KEYWORD()` or `KEYWORD(n)`; `NOW` needs the parentheses.
fn is_temporal_keyword(value: &str) -> bool {
    let upper = value.trim().to_ascii_uppercase();
    let (name, precision) = match upper.split_once('(') {
        Some((name, rest)) => match rest.strip_suffix(')') {
            Some(digits) if digits.chars().all(|c| c.is_ascii_digit()) => (name, true),
            _ => return false,
        },
        None => (upper.as_str(), false),
    };
    TEMPORAL_KEYWORDS.contains(&name) && (precision || name != "NOW")
}

/// Removes MySQL 8's `DEFAULT_GENERATED` marker from an `EXTRA` value.
#[must_use]
pub fn strip_default_generated(extra: &str) -> Option<String> {
    let cleaned = extra
        .split_whitespace()
        .filter(|word| !word.eq_ignore_ascii_case("DEFAULT_GENERATED"))
        .collect::<Vec<_>>()
        .join(" ");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_defaults_are_quoted() {
        assert_eq!(
            normalize_default(Some("active"), "varchar", ""),
            Some("'active'".to_string())
        );
        assert_eq!(
            normalize_default(Some("it's"), "varchar", ""),
            Some("'it''s'".to_string())
        );
        assert_eq!(
            normalize_default(Some(""), "char", ""),
            Some("''".to_string())
        );
    }

    #[test]
    fn numeric_defaults_are_verbatim() {
        assert_eq!(normalize_default(Some("0"), "int", ""), Some("0".to_string()));
        assert_eq!(
            normalize_default(Some("1.50"), "decimal", ""),
            Some("1.50".to_string())
        );
        assert_eq!(
            normalize_default(Some("b'1'"), "bit", ""),
            Some("b'1'".to_string())
        );
    }

    #[test]
    fn numeric_text_in_character_column_is_quoted() {
        assert_eq!(
            normalize_default(Some("42"), "varchar", ""),
            Some("'42'".to_string())
        );
    }

    #[test]
    fn expression_defaults_are_verbatim() {
        assert_eq!(
            normalize_default(Some("CURRENT_TIMESTAMP"), "timestamp", "DEFAULT_GENERATED"),
            Some("CURRENT_TIMESTAMP".to_string())
        );
        assert_eq!(
            normalize_default(Some("current_timestamp()"), "datetime", ""),
            Some("current_timestamp()".to_string())
        );
        assert_eq!(
            normalize_default(Some("uuid()"), "char", "DEFAULT_GENERATED"),
            Some("uuid()".to_string())
        );
    }

    #[test]
    fn temporal_keywords_are_verbatim_for_temporal_columns() {
        for value in ["CURRENT_TIMESTAMP(3)", "now()", "NOW(6)", "localtimestamp"] {
            assert_eq!(
                normalize_default(Some(value), "datetime", ""),
                Some(value.to_string()),
                "default {value}"
            );
        }
        assert_eq!(
            normalize_default(Some("CURRENT_DATE"), "date", ""),
            Some("CURRENT_DATE".to_string())
        );
    }

    #[test]
    fn text_with_parentheses_is_quoted() {
        assert_eq!(
            normalize_default(Some("n/a (none)"), "varchar", ""),
            Some("'n/a (none)'".to_string())
        );
        assert_eq!(
            normalize_default(Some("f(x)"), "text", ""),
            Some("'f(x)'".to_string())
        );
    }

    #[test]
    fn temporal_keyword_text_in_character_column_is_quoted() {
        assert_eq!(
            normalize_default(Some("CURRENT_TIMESTAMP"), "varchar", ""),
            Some("'CURRENT_TIMESTAMP'".to_string())
        );
        assert_eq!(
            normalize_default(Some("now()"), "char", ""),
            Some("'now()'".to_string())
        );
    }

    #[test]
    fn malformed_keyword_in_temporal_column_is_quoted() {
        assert_eq!(
            normalize_default(Some("NOW"), "datetime", ""),
            Some("'NOW'".to_string())
        );
        assert_eq!(
            normalize_default(Some("CURRENT_TIMESTAMP(x)"), "timestamp", ""),
            Some("'CURRENT_TIMESTAMP(x)'".to_string())
        );
    }

    #[test]
    fn quoted_text_default_renders_in_add_column() {
        use schemasync_core::{MySqlDialect, PlanDialect};

        let mut column = ColumnDefinition::new("note", "varchar(20)");
        column.default_value = normalize_default(Some("n/a (none)"), "varchar", "");
        let stmt = MySqlDialect::new().add_column("t", &column, Some("id"));
        assert_eq!(
            stmt.sql,
            "ALTER TABLE `t` ADD COLUMN `note` varchar(20) NULL DEFAULT 'n/a (none)' AFTER `id`"
        );
    }

    #[test]
    fn mariadb_quoted_and_null_defaults() {
        assert_eq!(
            normalize_default(Some("'active'"), "varchar", ""),
            Some("'active'".to_string())
        );
        assert_eq!(normalize_default(Some("NULL"), "varchar", ""), None);
        assert_eq!(normalize_default(None, "int", ""), None);
    }

    #[test]
    fn default_generated_is_stripped() {
        assert_eq!(strip_default_generated("DEFAULT_GENERATED"), None);
        assert_eq!(
            strip_default_generated("DEFAULT_GENERATED on update CURRENT_TIMESTAMP"),
            Some("on update CURRENT_TIMESTAMP".to_string())
        );
        assert_eq!(
            strip_default_generated("auto_increment"),
            Some("auto_increment".to_string())
        );
        assert_eq!(strip_default_generated("  "), None);
    }
}
