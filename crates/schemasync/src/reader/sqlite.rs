//! SQLite snapshot reader.

use std::time::Duration;

use chrono::Utc;
use schemasync_core::{ColumnDefinition, SchemaSnapshot, TableSnapshot};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::debug;

use super::SnapshotReader;
use crate::error::{Result, SyncError};

const LIST_TABLES_SQL: &str = "SELECT name, sql FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name";

/// Row returned by `PRAGMA table_info`.
#[derive(Debug, sqlx::FromRow)]
struct TableInfoRow {
    name: String,
    #[sqlx(rename = "type")]
    data_type: String,
    notnull: i64,
    dflt_value: Option<String>,
}

/// Reads snapshots from a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteReader {
    pool: SqlitePool,
}

impl SqliteReader {
    /// Creates a reader over an existing pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Connection`] if the database cannot be opened.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(timeout)
            .connect(url)
            .await
            .map_err(SyncError::Connection)?;
        Ok(Self::new(pool))
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn read_table(&self, name: &str, ddl: Option<String>) -> Result<TableSnapshot> {
        let pragma = format!("PRAGMA table_info(\"{}\")", name.replace('"', "\"\""));
        let rows: Vec<TableInfoRow> = sqlx::query_as(&pragma)
            .fetch_all(&self.pool)
            .await
            .map_err(SyncError::for_table(name))?;

        let table = rows.into_iter().fold(TableSnapshot::new(name), |table, row| {
            let mut column = ColumnDefinition::new(row.name, row.data_type);
            column.nullable = row.notnull == 0;
            column.default_value = row.dflt_value;
            table.column(column)
        });

        debug!(table = %name, columns = table.columns.len(), "Read table");
        Ok(match ddl {
            Some(sql) => table.create_statement(sql),
            None => table,
        })
    }
}

impl SnapshotReader for SqliteReader {
    async fn read_snapshot(&self) -> Result<SchemaSnapshot> {
        let tables: Vec<(String, Option<String>)> = sqlx::query_as(LIST_TABLES_SQL)
            .fetch_all(&self.pool)
            .await
            .map_err(SyncError::catalog)?;

        let mut snapshot = SchemaSnapshot::new().captured_at(Utc::now());
        for (name, ddl) in tables {
            snapshot.add_table(self.read_table(&name, ddl).await?);
        }
        Ok(snapshot)
    }
}
