mod config;
mod managers;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use managers::backup::BackupRunner;
use managers::notification::{EmailNotifier, Notifier};
use managers::scheduler::Scheduler;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use utils::executor::{CommandExecutor, RealExecutor};

#[derive(Parser)]
#[command(name = "mongo-backup")]
#[command(about = "MongoDB remote to local backup tool with email alerts", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "/etc/mongo-backup/config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduler daemon (default)
    Run,

    /// Perform a single backup attempt now and exit
    Backup,

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Validate doesn't need full logging or connectivity
    if let Some(Commands::Validate) = &cli.command {
        managers::logging::init_console_logging();
        let config = config::load_config(&cli.config)?;
        println!("Configuration is valid!");
        println!("Remote server: {}:{}", config.mongodb.host, config.mongodb.port);
        println!("Database: {}", config.mongodb.database);
        println!("Alert recipients: {}", config.alert_emails.len());
        return Ok(());
    }

    // Load and validate configuration (fatal on missing fields)
    let config = config::load_config(&cli.config)?;

    // Setup logging with file rotation (must keep guard alive)
    let logging_config = managers::logging::LoggingConfig::from_config(
        &config.global.log_directory,
        &config.global.log_level,
        config.global.log_max_files,
        config.global.log_max_size_mb,
    );
    let _log_guard = managers::logging::init_logging(&logging_config)?;

    info!("MongoDB Remote to Local DB Backup Tool");

    // Test connection to the remote server before scheduling anything
    let connect_timeout = Duration::from_secs(config.global.connect_timeout_seconds);
    utils::mongo::check_connectivity(&config.mongodb, connect_timeout).await?;

    info!("Alert emails will be mailed to the following accounts:");
    for email in &config.alert_emails {
        info!("  {}", email);
    }

    // Application context: executor, notifier and runner built once at boot
    let executor: Arc<dyn CommandExecutor> = Arc::new(RealExecutor::new());
    let notifier: Arc<dyn Notifier> = Arc::new(EmailNotifier::new(&config.smtp, &config.alert_emails)?);
    let runner = Arc::new(BackupRunner::new(&config, executor, notifier));

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let interval = Duration::from_secs(config.global.schedule_interval_hours * 3600);
            let scheduler = Scheduler::new(interval, runner);

            tokio::select! {
                _ = scheduler.run() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received, stopping scheduler");
                }
            }
        }

        Commands::Backup => {
            let report = runner.run_once().await;
            if !report.is_success() {
                // Returning Err drops the log guard, flushing the run's
                // log lines before the non-zero exit
                anyhow::bail!("Backup attempt failed ({:?})", report.outcome);
            }
            println!("Backup completed successfully");
        }

        Commands::Validate => {
            unreachable!("Validate is handled before config loading")
        }
    }

    Ok(())
}
