//! Backup runner - one dump attempt and one outcome notification per trigger

use crate::config::{Config, MongoDbConfig};
use crate::managers::notification::{render_notification, Notifier};
use crate::managers::scheduler::ScheduledJob;
use crate::utils::executor::CommandExecutor;
use crate::utils::mongo;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Classification of a single backup attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Dump exited cleanly with an empty error stream
    Success,
    /// Dump ran but exited non-zero or reported errors on stderr
    DumpError,
    /// The dump command could not be started (or timed out)
    LaunchFailure,
}

/// Outcome of one backup attempt, consumed by the notification step
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub stdout: String,
    pub stderr: String,
    pub started_at: DateTime<Local>,
    pub duration: Duration,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.outcome == RunOutcome::Success
    }
}

/// Executes backup attempts against the configured remote database
pub struct BackupRunner {
    mongodb: MongoDbConfig,
    dump_binary: String,
    output_directory: PathBuf,
    dump_timeout: Duration,
    executor: Arc<dyn CommandExecutor>,
    notifier: Arc<dyn Notifier>,
}

impl BackupRunner {
    /// Create a runner from configuration with injected executor and notifier
    pub fn new(
        config: &Config,
        executor: Arc<dyn CommandExecutor>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            mongodb: config.mongodb.clone(),
            dump_binary: config.global.dump_binary.clone(),
            output_directory: crate::config::expand_tilde(&config.global.output_directory),
            dump_timeout: Duration::from_secs(config.global.dump_timeout_seconds),
            executor,
            notifier,
        }
    }

    /// Perform one backup attempt and send exactly one notification.
    ///
    /// All failure modes end in a report, never in a propagated error, so a
    /// failed run can never take down the scheduling loop.
    pub async fn run_once(&self) -> RunReport {
        let started_at = Local::now();
        let clock = Instant::now();

        info!("Attempting backup @ {}", started_at.format("%Y-%m-%d %H:%M:%S"));

        let report = match self.execute_dump(started_at, &clock).await {
            Ok(report) => report,
            Err(e) => {
                // Launch failures still produce a report so the operators
                // hear about them by mail.
                error!("Dump command could not be launched: {:#}", e);
                RunReport {
                    outcome: RunOutcome::LaunchFailure,
                    stdout: String::new(),
                    stderr: format!("{:#}", e),
                    started_at,
                    duration: clock.elapsed(),
                }
            }
        };

        match report.outcome {
            RunOutcome::Success => {
                info!("MongoDump completed with:");
                info!("{}", report.stdout.trim_end());
            }
            RunOutcome::DumpError => {
                error!("MongoDump reported errors: {}", report.stderr.trim_end());
            }
            RunOutcome::LaunchFailure => {}
        }

        // Mail failure is logged and contained; the next trigger must proceed
        let notification = render_notification(&report, &self.mongodb.host);
        if let Err(e) = self.notifier.send(&notification).await {
            warn!("Failed to send notification mail: {:#}", e);
        } else {
            info!("Sent '{}' to alert recipients", notification.subject);
        }

        report
    }

    /// Run mongodump and classify the attempt
    async fn execute_dump(
        &self,
        started_at: DateTime<Local>,
        clock: &Instant,
    ) -> Result<RunReport> {
        let run_dir = self
            .output_directory
            .join(started_at.format("%Y-%m-%d_%H%M%S").to_string());
        std::fs::create_dir_all(&run_dir)?;

        let connection_string = mongo::build_connection_string(&self.mongodb);
        let args = mongo::dump_args(&connection_string, &run_dir);

        let output = self
            .executor
            .run_captured(&self.dump_binary, &args, Some(self.dump_timeout))
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        // Success means a clean exit AND an empty error stream
        let outcome = if output.status.success() && stderr.trim().is_empty() {
            RunOutcome::Success
        } else {
            RunOutcome::DumpError
        };

        Ok(RunReport {
            outcome,
            stdout,
            stderr,
            started_at,
            duration: clock.elapsed(),
        })
    }
}

#[async_trait]
impl ScheduledJob for BackupRunner {
    fn name(&self) -> &str {
        "nightly-backup"
    }

    async fn run(&self) -> Result<()> {
        let report = self.run_once().await;
        if report.is_success() {
            Ok(())
        } else {
            anyhow::bail!("Backup attempt failed ({:?})", report.outcome)
        }
    }
}
