//! Utilities for running commands with proper error handling and timeouts

use anyhow::{Context, Result};
use std::process::{Output, Stdio};
use std::time::Duration;
use tracing::debug;

/// Run a command with optional timeout, capturing stdout and stderr.
///
/// A non-zero exit status is not an error here; the caller inspects the
/// returned `Output` and decides how to classify the attempt.
pub async fn run_captured(
    program: &str,
    args: &[String],
    timeout: Option<Duration>,
) -> Result<Output> {
    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args);
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    debug!("Running command: {} {}", program, args.join(" "));

    let output = if let Some(timeout_duration) = timeout {
        let result = tokio::time::timeout(timeout_duration, cmd.output()).await;
        match result {
            Ok(output) => output.context(format!("Failed to execute {}", program))?,
            Err(_) => anyhow::bail!("Command timed out after {:?}", timeout_duration),
        }
    } else {
        cmd.output()
            .await
            .context(format!("Failed to execute {}", program))?
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.is_empty() {
        debug!("Command output: {}", stdout);
    }

    Ok(output)
}
