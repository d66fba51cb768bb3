//! Schema snapshot readers.
//!
//! A reader captures the tables and columns of one live database as a
//! [`SchemaSnapshot`]. The planner never talks to a database itself; both
//! snapshots are read up front and handed over explicitly.

mod mysql;
mod sqlite;

use std::future::Future;
use std::time::Duration;

use schemasync_core::SchemaSnapshot;
use tracing::info;

pub use mysql::{MySqlReader, normalize_default, strip_default_generated};
pub use sqlite::SqliteReader;

use crate::error::{Result, SyncError};

/// Default time allowed for establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Produces a [`SchemaSnapshot`] from a live database.
pub trait SnapshotReader: Send + Sync {
    /// Reads every base table with its columns and `CREATE TABLE` text.
    ///
    /// The result is fully materialized before it is returned.
    fn read_snapshot(&self) -> impl Future<Output = Result<SchemaSnapshot>> + Send;
}

/// Database engine behind a connection URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// MySQL or MariaDB.
    MySql,
    /// SQLite.
    Sqlite,
}

impl Backend {
    /// Detects the backend from a URL scheme.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnsupportedUrl`] for schemes other than
    /// `mysql:`, `mariadb:` and `sqlite:`.
    pub fn from_url(url: &str) -> Result<Self> {
        let scheme = url
            .split_once(':')
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .ok_or_else(|| SyncError::UnsupportedUrl(url.to_string()))?;
        match scheme.as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(SyncError::UnsupportedUrl(url.to_string())),
        }
    }

    /// Returns the backend name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }
}

/// A connected reader for whichever backend a URL names.
#[derive(Debug, Clone)]
pub enum DatabaseReader {
    /// MySQL / MariaDB reader.
    MySql(MySqlReader),
    /// SQLite reader.
    Sqlite(SqliteReader),
}

impl DatabaseReader {
    /// Connects to `url`, choosing the reader from its scheme.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnsupportedUrl`] for unknown schemes and
    /// [`SyncError::Connection`] if the database cannot be reached.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self> {
        match Backend::from_url(url)? {
            Backend::MySql => Ok(Self::MySql(MySqlReader::connect(url, timeout).await?)),
            Backend::Sqlite => Ok(Self::Sqlite(SqliteReader::connect(url, timeout).await?)),
        }
    }

    /// Returns the backend of this reader.
    #[must_use]
    pub const fn backend(&self) -> Backend {
        match self {
            Self::MySql(_) => Backend::MySql,
            Self::Sqlite(_) => Backend::Sqlite,
        }
    }
}

impl SnapshotReader for DatabaseReader {
    async fn read_snapshot(&self) -> Result<SchemaSnapshot> {
        match self {
            Self::MySql(reader) => reader.read_snapshot().await,
            Self::Sqlite(reader) => reader.read_snapshot().await,
        }
    }
}

/// Checks that both URLs name the same backend.
///
/// # Errors
///
/// Returns [`SyncError::UnsupportedUrl`] or [`SyncError::MixedBackends`].
pub fn same_backend(source_url: &str, target_url: &str) -> Result<Backend> {
    let source = Backend::from_url(source_url)?;
    let target = Backend::from_url(target_url)?;
    if source != target {
        return Err(SyncError::MixedBackends {
            source_backend: source.name(),
            target_backend: target.name(),
        });
    }
    Ok(source)
}

/// Reads the source and target snapshots concurrently.
///
/// If either read fails, the error is returned and no pair is produced.
///
/// # Errors
///
/// Returns the first error reported by either reader.
pub async fn read_pair<S, T>(source: &S, target: &T) -> Result<(SchemaSnapshot, SchemaSnapshot)>
where
    S: SnapshotReader,
    T: SnapshotReader,
{
    let (source, target) = tokio::try_join!(source.read_snapshot(), target.read_snapshot())?;
    info!(
        source_tables = source.len(),
        target_tables = target.len(),
        "Read schema snapshots"
    );
    Ok((source, target))
}
