//! Plan executor.
//!
//! Applies a rendered plan to the target database, statement by statement,
//! in plan order.

use schemasync_core::{MigrationPlan, PlanDialect, Statement};
use sqlx::{Database, Executor, Pool};
use tracing::{debug, info, warn};

use crate::error::{Result, SyncError};

/// Outcome of applying a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplySummary {
    /// Statements that ran, or would run in dry-run mode.
    pub executed: Vec<Statement>,
    /// Statements the dialect could not express.
    pub skipped: Vec<Statement>,
}

/// Executes migration plans against a target database.
pub struct PlanExecutor<DB: Database, D: PlanDialect> {
    pool: Pool<DB>,
    dialect: D,
    dry_run: bool,
    transactional: bool,
}

impl<DB, D> PlanExecutor<DB, D>
where
    DB: Database,
    D: PlanDialect,
    for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
{
    /// Creates a new plan executor.
    pub fn new(pool: Pool<DB>, dialect: D) -> Self {
        Self {
            pool,
            dialect,
            dry_run: false,
            transactional: false,
        }
    }

    /// Enables dry-run mode (statements are rendered but not executed).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Runs every statement inside one transaction.
    ///
    /// Engines that commit DDL implicitly (MySQL) still apply each statement
    /// on its own.
    #[must_use]
    pub fn transactional(mut self, enabled: bool) -> Self {
        self.transactional = enabled;
        self
    }

    /// Returns the dialect.
    #[must_use]
    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    /// Returns the statements a plan renders to, without executing them.
    #[must_use]
    pub fn sql_for(&self, plan: &MigrationPlan) -> Vec<Statement> {
        self.dialect.render_plan(plan)
    }

    /// Applies a plan, stopping at the first failing statement.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Execution`] naming the statement that failed,
    /// or [`SyncError::Connection`] if no connection could be acquired.
    pub async fn apply(&self, plan: &MigrationPlan) -> Result<ApplySummary> {
        let (executed, skipped): (Vec<Statement>, Vec<Statement>) = self
            .sql_for(plan)
            .into_iter()
            .partition(Statement::is_executable);

        for statement in &skipped {
            warn!(comment = %statement.sql, "Skipping comment (unsupported operation)");
        }

        if self.dry_run {
            info!(
                statements = executed.len(),
                dialect = self.dialect.name(),
                "Dry run, nothing executed"
            );
            return Ok(ApplySummary { executed, skipped });
        }

        if self.transactional {
            let mut tx = self.pool.begin().await.map_err(SyncError::Connection)?;
            for statement in &executed {
                debug!(sql = %statement.sql, "Executing SQL");
                sqlx::raw_sql(&statement.sql)
                    .execute(&mut *tx)
                    .await
                    .map_err(|source| execution_error(statement, source))?;
            }
            tx.commit().await.map_err(SyncError::Connection)?;
        } else {
            for statement in &executed {
                debug!(sql = %statement.sql, "Executing SQL");
                sqlx::raw_sql(&statement.sql)
                    .execute(&self.pool)
                    .await
                    .map_err(|source| execution_error(statement, source))?;
            }
        }

        info!(
            statements = executed.len(),
            skipped = skipped.len(),
            "Plan applied successfully"
        );
        Ok(ApplySummary { executed, skipped })
    }
}

fn execution_error(statement: &Statement, source: sqlx::Error) -> SyncError {
    SyncError::Execution {
        statement: statement.sql.clone(),
        source,
    }
}
