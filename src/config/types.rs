use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub global: GlobalConfig,
    pub mongodb: MongoDbConfig,
    pub smtp: SmtpConfig,
    /// Operators to notify after every backup attempt
    pub alert_emails: Vec<String>,
}

/// Global settings: output location, schedule, timeouts, logging
#[derive(Debug, Clone, Deserialize)]
pub struct GlobalConfig {
    /// Directory that receives the dump output (a date-stamped
    /// subdirectory is created per run)
    pub output_directory: PathBuf,

    /// Hours between scheduled backup attempts
    #[serde(default = "default_interval_hours")]
    pub schedule_interval_hours: u64,

    /// Timeout settings
    #[serde(default = "default_dump_timeout")]
    pub dump_timeout_seconds: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Dump binary to invoke (resolved from PATH unless absolute)
    #[serde(default = "default_dump_binary")]
    pub dump_binary: String,

    /// Logging configuration
    #[serde(default = "default_log_directory")]
    pub log_directory: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_max_files")]
    pub log_max_files: u32,
    #[serde(default = "default_log_max_size_mb")]
    pub log_max_size_mb: u64,
}

/// Remote database connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct MongoDbConfig {
    pub host: String,
    #[serde(default = "default_mongo_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Database name to dump
    pub database: String,
}

/// Outbound mail server settings
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender address for notification mails
    pub from: String,
}

// Default value functions

fn default_interval_hours() -> u64 { 24 }
fn default_dump_timeout() -> u64 { 3600 }
fn default_connect_timeout() -> u64 { 10 }
fn default_dump_binary() -> String { "mongodump".to_string() }
fn default_mongo_port() -> u16 { 27017 }
fn default_smtp_port() -> u16 { 587 }
fn default_log_directory() -> PathBuf { PathBuf::from("~/logs") }
fn default_log_level() -> String { "info".to_string() }
fn default_log_max_files() -> u32 { 10 }
fn default_log_max_size_mb() -> u64 { 10 }
