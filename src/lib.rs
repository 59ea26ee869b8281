//! Mongo Backup Library
//!
//! Scheduled MongoDB backups via mongodump with email notifications.

pub mod config;
pub mod managers;
pub mod utils;

// Re-export commonly used types
pub use config::{load_config, Config};
pub use managers::backup::{BackupRunner, RunOutcome, RunReport};
pub use managers::logging::{init_console_logging, init_logging, LogGuard, LoggingConfig};
pub use managers::notification::{EmailNotifier, Notification, Notifier};
pub use managers::scheduler::{ScheduledJob, Scheduler};
