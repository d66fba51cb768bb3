//! # schemasync-core
//!
//! Compares two schema snapshots (a *source* and a *target*) and plans the
//! DDL that brings the target's tables and columns in line with the source.
//!
//! The crate is pure: it never talks to a database. Readers in the
//! `schemasync` crate produce [`SchemaSnapshot`]s, this crate turns a pair of
//! them into a [`MigrationPlan`], and a [`PlanDialect`] renders the plan as
//! SQL.
//!
//! # Architecture
//!
//! - **Table set differ** ([`diff_table_sets`]) - which tables to create,
//!   drop, or inspect.
//! - **Column differ** ([`diff_columns`]) - add/modify/drop per column, with
//!   `AFTER` anchors taken from the source's column order.
//! - **Plan builder** ([`PlanBuilder`], [`build_plan`]) - creates, then
//!   drops, then alters. A whitespace-insensitive comparison of the
//!   `CREATE TABLE` text decides which shared tables get a column diff.
//! - **Dialects** ([`MySqlDialect`], [`SqliteDialect`]) - statement rendering.
//! - **Simulation** ([`apply_plan`]) - applies a plan to a snapshot in memory.
//!
//! # Example
//!
//! ```rust
//! use schemasync_core::prelude::*;
//!
//! let target = SchemaSnapshot::new().table(
//!     TableSnapshot::new("users")
//!         .column(ColumnDefinition::new("id", "int(11)").not_null())
//!         .column(ColumnDefinition::new("name", "varchar(255)").not_null()),
//! );
//! let source = SchemaSnapshot::new().table(
//!     TableSnapshot::new("users")
//!         .column(ColumnDefinition::new("id", "int(11)").not_null())
//!         .column(ColumnDefinition::new("name", "varchar(255)").not_null())
//!         .column(ColumnDefinition::new("email", "varchar(255)")),
//! );
//!
//! let plan = build_plan(&source, &target).unwrap();
//! let sql: Vec<String> = MySqlDialect::new()
//!     .render_plan(&plan)
//!     .into_iter()
//!     .map(|s| s.sql)
//!     .collect();
//!
//! assert_eq!(
//!     sql,
//!     vec!["ALTER TABLE `users` ADD COLUMN `email` varchar(255) NULL AFTER `name`"]
//! );
//! ```

pub mod column_diff;
pub mod dialect;
pub mod error;
pub mod operation;
pub mod plan;
pub mod simulate;
pub mod snapshot;
pub mod table_diff;

pub use column_diff::diff_columns;
pub use dialect::{MySqlDialect, PlanDialect, RenderOptions, SqliteDialect, Statement, StatementKind};
pub use error::{PlanError, Result};
pub use operation::{ColumnOperation, TableOperation};
pub use plan::{MigrationPlan, PlanBuilder, PlanOptions, build_plan, statements_match};
pub use simulate::apply_plan;
pub use snapshot::{ColumnDefinition, SchemaSnapshot, TableSnapshot};
pub use table_diff::{TableSetDiff, diff_table_sets};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::dialect::{
        MySqlDialect, PlanDialect, RenderOptions, SqliteDialect, Statement, StatementKind,
    };
    pub use crate::error::{PlanError, Result};
    pub use crate::operation::{ColumnOperation, TableOperation};
    pub use crate::plan::{MigrationPlan, PlanBuilder, PlanOptions, build_plan};
    pub use crate::simulate::apply_plan;
    pub use crate::snapshot::{ColumnDefinition, SchemaSnapshot, TableSnapshot};
    pub use crate::table_diff::{TableSetDiff, diff_table_sets};
    pub use crate::column_diff::diff_columns;
}
