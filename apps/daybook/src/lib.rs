//! # Daybook Application Library
//!
//! Wires configuration, the persistence gateway and the operator shell.
//!
//! ## Module Organization
//! ```text
//! daybook_lib/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── config.rs       ◄─── TOML + env configuration
//! ├── service.rs      ◄─── DayBookService: mutate, then persist
//! ├── shell.rs        ◄─── Line-oriented operator loop
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command parsing
//! │   ├── day.rs      ◄─── Sales figures, close, new day, history
//! │   └── debt.rs     ◄─── Debts, repayments, debtor list
//! └── error.rs        ◄─── AppError returned by every command
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod service;
pub mod shell;

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use daybook_db::{Database, DbConfig, MemoryGateway, PersistenceGateway};

use config::DaybookConfig;
use error::{AppError, AppResult, ErrorCode};
use service::DayBookService;
use shell::Shell;

/// Command-line flags.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "daybook", version, about = "Daily sales ledger for a single shop")]
pub struct Cli {
    /// Config file (default: platform config dir, daybook.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SQLite file, overrides the config file and DAYBOOK_DB_PATH
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Keep everything in memory; nothing survives exit
    #[arg(long, conflicts_with = "db")]
    pub ephemeral: bool,
}

/// Runs the application.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Initialize Logging (stderr, RUST_LOG aware)                         │
/// │  2. Load Configuration (defaults → file → env → flags)                  │
/// │  3. Open the Gateway                                                    │
/// │     • SQLite with WAL mode, pending migrations applied                  │
/// │     • or the in-memory gateway with --ephemeral                         │
/// │  4. Restore the Day (stored session + debtors, or a fresh day)          │
/// │  5. Run the Shell on stdin/stdout                                       │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(cli: Cli) -> AppResult<()> {
    init_tracing();

    info!("Starting Daybook");

    let mut config = DaybookConfig::load(cli.config.clone())?;
    if let Some(db) = cli.db.clone() {
        config.database.path = Some(db);
    }

    if cli.ephemeral {
        info!("Using in-memory store, nothing will be kept");
        return run_shell(MemoryGateway::new(), &config).await;
    }

    let db_path = config.database_path()?;
    info!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::new(db_path)).await.map_err(|e| {
        AppError::new(
            ErrorCode::PersistenceFailure,
            format!("Could not open the database: {e}"),
        )
    })?;
    info!("Database connected and migrations applied");

    let result = run_shell(db.clone(), &config).await;
    db.close().await;
    result
}

async fn run_shell<G: PersistenceGateway>(gateway: G, config: &DaybookConfig) -> AppResult<()> {
    let service =
        DayBookService::start(gateway, config.commission_policy(), config.name_rule()).await?;
    info!(policy = %config.commission_policy(), "Commission policy");

    let mut shell = Shell::new(service, config.store.name.clone());
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    shell
        .run(stdin, &mut stdout)
        .await
        .map_err(|e| AppError::internal(format!("Terminal I/O failed: {e}")))
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so they never interleave with shell output.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=daybook=trace` - Show trace for daybook crates only
/// - Default: `info,daybook=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,daybook=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
