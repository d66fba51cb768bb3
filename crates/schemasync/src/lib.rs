//! Live-database schema synchronization.
//!
//! `schemasync` reads the table and column structure of a *source* and a
//! *target* database, plans the DDL that brings the target in line with the
//! source (via [`schemasync_core`]), and presents or applies that plan.
//!
//! # Architecture
//!
//! - **Readers** - [`MySqlReader`] and [`SqliteReader`] capture a
//!   [`SchemaSnapshot`](schemasync_core::SchemaSnapshot); [`read_pair`] reads
//!   both sides concurrently.
//! - **Report** - text, SQL script and JSON output of a plan.
//! - **Executor** - applies a plan to the target, optionally in one
//!   transaction or as a dry run.
//!
//! # Example
//!
//! ```rust,ignore
//! use schemasync::prelude::*;
//!
//! let source = DatabaseReader::connect("mysql://app@prod/app", DEFAULT_CONNECT_TIMEOUT).await?;
//! let target = DatabaseReader::connect("mysql://app@staging/app", DEFAULT_CONNECT_TIMEOUT).await?;
//!
//! let (source_snapshot, target_snapshot) = read_pair(&source, &target).await?;
//! let plan = build_plan(&source_snapshot, &target_snapshot)?;
//! print!("{}", render(OutputFormat::Text, &plan, &MySqlDialect::new())?);
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Show what the target is missing
//! schemasync --source mysql://prod/app --target mysql://staging/app diff
//!
//! # Fail a CI job when the schemas drift
//! schemasync check
//!
//! # Apply the plan to the target
//! schemasync apply --dry-run
//! ```

pub mod error;
pub mod executor;
pub mod reader;
pub mod report;

pub use error::{Result, SyncError};
pub use executor::{ApplySummary, PlanExecutor};
pub use reader::{
    Backend, DEFAULT_CONNECT_TIMEOUT, DatabaseReader, MySqlReader, SnapshotReader, SqliteReader,
    read_pair, same_backend,
};
pub use report::{OutputFormat, render, render_json, render_sql, render_text};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{Result, SyncError};
    pub use crate::executor::{ApplySummary, PlanExecutor};
    pub use crate::reader::{
        Backend, DEFAULT_CONNECT_TIMEOUT, DatabaseReader, MySqlReader, SnapshotReader,
        SqliteReader, read_pair, same_backend,
    };
    pub use crate::report::{OutputFormat, render};
    pub use schemasync_core::prelude::*;
}
