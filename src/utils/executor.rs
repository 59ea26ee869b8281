//! Command execution abstraction for testability
//!
//! This module provides a trait-based abstraction for command execution,
//! enabling dependency injection and mocking for tests.

use anyhow::Result;
use async_trait::async_trait;
use std::process::Output;
use std::time::Duration;

/// Abstraction for command execution, enabling mocking in tests
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run a command with optional timeout, capturing output.
    /// A non-zero exit status is reported through the returned `Output`,
    /// not as an error; `Err` means the command could not be run at all.
    async fn run_captured(
        &self,
        program: &str,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<Output>;
}

/// Default implementation using real subprocess calls
#[derive(Debug, Clone, Default)]
pub struct RealExecutor;

impl RealExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for RealExecutor {
    async fn run_captured(
        &self,
        program: &str,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<Output> {
        super::command::run_captured(program, args, timeout).await
    }
}

/// A mock executor for testing that records calls and returns configured
/// responses. Available for use in external test crates.
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Recorded command invocation
    #[derive(Clone, Debug)]
    pub struct CommandCall {
        pub program: String,
        pub args: Vec<String>,
    }

    /// Response configuration for mock
    #[derive(Clone, Debug)]
    pub enum MockResponse {
        /// Command ran; exit code and captured streams as given
        Completed {
            exit_code: i32,
            stdout: String,
            stderr: String,
        },
        /// Command could not be launched at all
        LaunchError { message: String },
        Timeout,
    }

    impl Default for MockResponse {
        fn default() -> Self {
            MockResponse::Completed {
                exit_code: 0,
                stdout: String::new(),
                stderr: String::new(),
            }
        }
    }

    /// Mock executor for testing
    #[derive(Clone, Default)]
    pub struct MockExecutor {
        /// Recorded command invocations
        calls: Arc<Mutex<Vec<CommandCall>>>,
        response: Arc<Mutex<MockResponse>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Configure the response returned for every invocation
        pub fn with_response(self, response: MockResponse) -> Self {
            *self.response.lock().unwrap() = response;
            self
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<CommandCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Get number of calls to a specific program
        pub fn call_count(&self, program: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.program == program)
                .count()
        }

        fn record_call(&self, program: &str, args: &[String]) {
            self.calls.lock().unwrap().push(CommandCall {
                program: program.to_string(),
                args: args.to_vec(),
            });
        }

        #[cfg(unix)]
        fn exit_status(code: i32) -> std::process::ExitStatus {
            use std::os::unix::process::ExitStatusExt;
            std::process::ExitStatus::from_raw(code << 8)
        }
    }

    #[async_trait]
    impl CommandExecutor for MockExecutor {
        async fn run_captured(
            &self,
            program: &str,
            args: &[String],
            _timeout: Option<Duration>,
        ) -> Result<Output> {
            self.record_call(program, args);
            let response = self.response.lock().unwrap().clone();
            match response {
                MockResponse::Completed {
                    exit_code,
                    stdout,
                    stderr,
                } => Ok(Output {
                    status: Self::exit_status(exit_code),
                    stdout: stdout.into_bytes(),
                    stderr: stderr.into_bytes(),
                }),
                MockResponse::LaunchError { message } => {
                    anyhow::bail!("Failed to execute {}: {}", program, message)
                }
                MockResponse::Timeout => {
                    anyhow::bail!("Command timed out")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;

    #[tokio::test]
    async fn test_mock_executor_records_calls() {
        let executor = MockExecutor::new();

        let _ = executor
            .run_captured("test-program", &["arg1".to_string(), "arg2".to_string()], None)
            .await;

        assert_eq!(executor.call_count("test-program"), 1);

        let calls = executor.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "test-program");
        assert_eq!(calls[0].args, vec!["arg1", "arg2"]);
    }

    #[tokio::test]
    async fn test_mock_executor_completed_response() {
        let executor = MockExecutor::new().with_response(MockResponse::Completed {
            exit_code: 1,
            stdout: String::new(),
            stderr: "boom".to_string(),
        });

        let output = executor.run_captured("my-program", &[], None).await.unwrap();
        assert!(!output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stderr), "boom");
    }

    #[tokio::test]
    async fn test_mock_executor_launch_error() {
        let executor = MockExecutor::new().with_response(MockResponse::LaunchError {
            message: "No such file or directory".to_string(),
        });

        let result = executor.run_captured("missing-program", &[], None).await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("No such file or directory"));
    }

    #[tokio::test]
    async fn test_real_executor_captures_nonzero_exit() {
        let executor = RealExecutor::new();
        let output = executor
            .run_captured("sh", &["-c".to_string(), "echo out; echo err >&2; exit 3".to_string()], None)
            .await
            .unwrap();

        assert!(!output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "out");
        assert_eq!(String::from_utf8_lossy(&output.stderr).trim(), "err");
    }
}
