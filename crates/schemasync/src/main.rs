//! schemasync CLI
//!
//! Command-line tool for comparing and synchronizing database schemas.

use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use schemasync::prelude::*;
use schemasync::report::render_sql;

/// Compare two databases and bring the target's tables and columns in line
/// with the source.
#[derive(Parser)]
#[command(name = "schemasync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source database URL (the schema to copy).
    #[arg(short, long, env = "SOURCE_DATABASE_URL", global = true)]
    source: Option<String>,

    /// Target database URL (the schema to update).
    #[arg(short, long, env = "TARGET_DATABASE_URL", global = true)]
    target: Option<String>,

    /// Seconds to wait for a database connection.
    #[arg(long, default_value_t = 30, global = true)]
    connect_timeout: u64,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options controlling which changes are planned.
#[derive(Args)]
struct PlanArgs {
    /// Table to leave out of the comparison (repeatable).
    #[arg(long = "ignore-table", value_name = "TABLE")]
    ignore_tables: Vec<String>,

    /// Do not drop tables or columns that only exist on the target.
    #[arg(long)]
    no_drops: bool,

    /// Diff every shared table, even when its CREATE TABLE text matches.
    #[arg(long)]
    no_precheck: bool,
}

impl PlanArgs {
    fn options(&self) -> PlanOptions {
        let mut options = self
            .ignore_tables
            .iter()
            .fold(PlanOptions::new(), |options, table| options.ignore_table(table));
        if self.no_drops {
            options = options.without_drops();
        }
        if self.no_precheck {
            options = options.without_precheck();
        }
        options
    }
}

/// Options controlling how statements are rendered.
#[derive(Args)]
struct RenderArgs {
    /// Character set for added or modified character columns (MySQL).
    #[arg(long)]
    character_set: Option<String>,

    /// Collation for added or modified character columns (MySQL).
    #[arg(long)]
    collation: Option<String>,
}

impl RenderArgs {
    fn options(&self) -> RenderOptions {
        let mut options = RenderOptions::new();
        if let Some(charset) = &self.character_set {
            options = options.character_set(charset);
        }
        if let Some(collation) = &self.collation {
            options = options.collation(collation);
        }
        options
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    Source,
    Target,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the changes the target needs.
    Diff {
        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[command(flatten)]
        plan: PlanArgs,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Exit with status 1 if the target is out of sync.
    Check {
        #[command(flatten)]
        plan: PlanArgs,
    },

    /// Apply the changes to the target.
    Apply {
        /// Run all statements in a single transaction.
        #[arg(long)]
        transaction: bool,

        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        plan: PlanArgs,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Print one side's schema snapshot as JSON.
    Snapshot {
        /// Which database to read.
        #[arg(long, value_enum, default_value = "source")]
        side: Side,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let timeout = Duration::from_secs(cli.connect_timeout);

    match &cli.command {
        Commands::Snapshot { side } => {
            let url = match side {
                Side::Source => source_url(&cli)?,
                Side::Target => target_url(&cli)?,
            };
            let reader = DatabaseReader::connect(url, timeout).await?;
            let snapshot = reader.read_snapshot().await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }

        Commands::Diff {
            format,
            plan,
            render: render_args,
        } => {
            let (target, plan) = plan_from(&cli, timeout, plan).await?;
            let output = match target {
                DatabaseReader::MySql(_) => render(
                    *format,
                    &plan,
                    &MySqlDialect::with_options(render_args.options()),
                )?,
                DatabaseReader::Sqlite(_) => render(*format, &plan, &SqliteDialect::new())?,
            };
            print!("{output}");
        }

        Commands::Check { plan } => {
            let (target, plan) = plan_from(&cli, timeout, plan).await?;
            let output = match target {
                DatabaseReader::MySql(_) => render(OutputFormat::Text, &plan, &MySqlDialect::new())?,
                DatabaseReader::Sqlite(_) => {
                    render(OutputFormat::Text, &plan, &SqliteDialect::new())?
                }
            };
            print!("{output}");
            if !plan.is_empty() {
                std::process::exit(1);
            }
        }

        Commands::Apply {
            transaction,
            dry_run,
            plan,
            render: render_args,
        } => {
            let (target, plan) = plan_from(&cli, timeout, plan).await?;
            if plan.is_empty() {
                info!("The database appears to be up to date, nothing to apply.");
                return Ok(());
            }
            if *dry_run {
                info!("Dry run mode - SQL will be printed but not executed.");
            }

            let summary = match target {
                DatabaseReader::MySql(reader) => {
                    PlanExecutor::new(
                        reader.pool().clone(),
                        MySqlDialect::with_options(render_args.options()),
                    )
                    .transactional(*transaction)
                    .dry_run(*dry_run)
                    .apply(&plan)
                    .await?
                }
                DatabaseReader::Sqlite(reader) => {
                    PlanExecutor::new(reader.pool().clone(), SqliteDialect::new())
                        .transactional(*transaction)
                        .dry_run(*dry_run)
                        .apply(&plan)
                        .await?
                }
            };

            if *dry_run {
                print!("{}", render_sql(&summary.executed));
            } else {
                info!(
                    "Applied {} statement(s), skipped {}.",
                    summary.executed.len(),
                    summary.skipped.len()
                );
            }
        }
    }

    Ok(())
}

fn source_url(cli: &Cli) -> anyhow::Result<&str> {
    cli.source
        .as_deref()
        .context("no source database; pass --source or set SOURCE_DATABASE_URL")
}

fn target_url(cli: &Cli) -> anyhow::Result<&str> {
    cli.target
        .as_deref()
        .context("no target database; pass --target or set TARGET_DATABASE_URL")
}

/// Connects to both databases, reads them and builds the plan.
///
/// Returns the target reader so the caller can render or apply against it.
async fn plan_from(
    cli: &Cli,
    timeout: Duration,
    args: &PlanArgs,
) -> anyhow::Result<(DatabaseReader, MigrationPlan)> {
    let source_url = source_url(cli)?;
    let target_url = target_url(cli)?;
    let backend = same_backend(source_url, target_url)?;
    info!(backend = backend.name(), "Comparing schemas");

    let (source, target) = tokio::try_join!(
        DatabaseReader::connect(source_url, timeout),
        DatabaseReader::connect(target_url, timeout)
    )?;
    let (source_snapshot, target_snapshot) = read_pair(&source, &target).await?;

    let plan = PlanBuilder::with_options(args.options()).build(&source_snapshot, &target_snapshot)?;
    Ok((target, plan))
}
