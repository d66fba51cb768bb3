//! Error types for reading, planning and applying schema changes.

use schemasync_core::PlanError;

/// Errors that can occur while synchronizing two databases.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A database could not be reached.
    #[error("Connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// A catalog query failed while reading a snapshot.
    #[error("Failed to read schema{}: {source}", .table.as_ref().map(|t| format!(" of table '{t}'")).unwrap_or_default())]
    Introspection {
        /// Table being read, if the failure is table-specific.
        table: Option<String>,
        /// Underlying database error.
        source: sqlx::Error,
    },

    /// The snapshots could not be diffed.
    #[error("Planning error: {0}")]
    Plan(#[from] PlanError),

    /// A plan statement failed on the target.
    #[error("Failed to execute '{statement}': {source}")]
    Execution {
        /// Statement that failed.
        statement: String,
        /// Underlying database error.
        source: sqlx::Error,
    },

    /// The database URL has no supported scheme.
    #[error("Unsupported database URL: {0}")]
    UnsupportedUrl(String),

    /// Source and target use different database engines.
    #[error("Source ({source_backend}) and target ({target_backend}) must use the same backend")]
    MixedBackends {
        /// Source backend name.
        source_backend: &'static str,
        /// Target backend name.
        target_backend: &'static str,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    /// Wraps a catalog query failure that is not tied to one table.
    pub(crate) const fn catalog(source: sqlx::Error) -> Self {
        Self::Introspection {
            table: None,
            source,
        }
    }

    /// Returns a closure wrapping a catalog query failure for `table`.
    pub(crate) fn for_table(table: &str) -> impl FnOnce(sqlx::Error) -> Self + '_ {
        move |source| Self::Introspection {
            table: Some(table.to_string()),
            source,
        }
    }
}

/// Result type for synchronization operations.
pub type Result<T> = std::result::Result<T, SyncError>;
