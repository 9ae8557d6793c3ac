//! Payroll engine command line.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use payroll_engine as app;
use serde::Serialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use app::config::{AppConfig, ConfigLoadResult, LoggingConfig};
use app::db;
use app::models::EmployeeId;
use app::period::PayPeriod;
use app::service::PayrollService;
use app::store::{MemoryStore, RecordStore};

/// Compute payroll from attendance and pay ledgers.
#[derive(Parser)]
#[command(name = "payroll", version)]
struct Cli {
    /// Use config.toml from current directory (dev mode)
    #[arg(long)]
    dev: bool,

    /// Config file path (overrides --dev)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Read records from a JSON fixture instead of the database
    #[arg(long, value_name = "PATH")]
    fixture: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Payroll row for one employee and month
    Employee { employee_id: EmployeeId, period: PayPeriod },
    /// Printed payslip with per-day lines
    Payslip { employee_id: EmployeeId, period: PayPeriod },
    /// Payroll table for every active employee
    Monthly { period: PayPeriod },
    /// Twelve monthly rows for one employee
    Annual { employee_id: EmployeeId, year: i32 },
    /// Validate the config file and test the database connection
    CheckConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None if cli.dev => PathBuf::from("config.toml"),
        None => AppConfig::default_path(),
    };
    let loaded = AppConfig::try_load(&config_path);
    let config = match &loaded {
        ConfigLoadResult::Loaded(config) => config.clone(),
        ConfigLoadResult::Missing => AppConfig::default(),
        ConfigLoadResult::Invalid(e) => bail!("Config {} is invalid: {e}", config_path.display()),
    };

    let _guard = init_logging(&config.logging);
    tracing::info!("Payroll engine starting...");
    tracing::info!("Config path: {:?}", config_path);
    if matches!(loaded, ConfigLoadResult::Missing) {
        tracing::warn!("Config missing, using defaults");
    }

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    rt.block_on(run(cli, config))
}

/// Install stderr logging plus an optional daily rolling file.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let (file_layer, guard) = match config.file_enabled.then(|| file_appender(config)).flatten() {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

fn file_appender(config: &LoggingConfig) -> Option<RollingFileAppender> {
    let directory = config.resolved_directory();
    if let Err(e) = std::fs::create_dir_all(&directory) {
        eprintln!("Log directory {} unavailable: {e}", directory.display());
        return None;
    }

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&config.file_prefix)
        .build(&directory)
        .map_err(|e| eprintln!("File logging disabled: {e}"))
        .ok()
}

async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    if let Command::CheckConfig = cli.command {
        return check_config(&cli, &config).await;
    }

    let store = open_store(&cli, &config).await?;
    let service = PayrollService::from_config(store, &config);

    match cli.command {
        Command::Employee { employee_id, period } => {
            print_json(&service.compute_employee_payroll(employee_id, period).await?)
        }
        Command::Payslip { employee_id, period } => print_json(&service.compute_payslip(employee_id, period).await?),
        Command::Monthly { period } => print_json(&service.compute_monthly_payroll(period).await?),
        Command::Annual { employee_id, year } => print_json(&service.compute_annual_payroll(employee_id, year).await?),
        Command::CheckConfig => Ok(()),
    }
}

async fn open_store(cli: &Cli, config: &AppConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    if let Some(path) = &cli.fixture {
        let store = MemoryStore::from_json_file(path).with_context(|| format!("Failed to load fixture {path:?}"))?;
        return Ok(Arc::new(store));
    }

    let conn = db::connect(&config.database.connection_string())
        .await
        .context("Failed to connect to database")?;

    if let Ok(version) = db::get_version(&conn).await {
        tracing::info!("PostgreSQL: {}", version);
    }

    Ok(Arc::new(db::PgRecordStore::new(conn)))
}

async fn check_config(cli: &Cli, config: &AppConfig) -> anyhow::Result<()> {
    config.validate()?;

    let database = if cli.fixture.is_some() {
        "skipped (fixture)".to_string()
    } else {
        let conn = db::connect(&config.database.connection_string())
            .await
            .context("Failed to connect to database")?;
        db::test_connection(&conn).await.context("Database check failed")?;
        db::get_version(&conn).await.unwrap_or_else(|_| "Unknown".to_owned())
    };

    print_json(&serde_json::json!({
        "valid": true,
        "database": database,
        "cache_ttl_secs": config.cache.ttl_secs,
        "max_concurrent_employees": config.batch.max_concurrent_employees,
        "log_directory": config.logging.resolved_directory(),
        "policy": config.policy,
    }))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
