//! Email notification port
//!
//! Every backup attempt produces exactly one notification mail to the
//! configured operators. The transport is behind the `Notifier` trait so
//! tests can swap in a recording mock.

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use crate::config::SmtpConfig;
use crate::managers::backup::{RunOutcome, RunReport};

/// A composed notification, ready for delivery
#[derive(Debug, Clone)]
pub struct Notification {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Outbound notification transport
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification to all configured recipients
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// SMTP implementation of the notification port
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    recipients: Vec<Mailbox>,
}

impl EmailNotifier {
    /// Create a notifier from SMTP settings and the recipient list
    pub fn new(smtp: &SmtpConfig, alert_emails: &[String]) -> Result<Self> {
        let credentials = Credentials::new(smtp.username.clone(), smtp.password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
            .context(format!("Invalid SMTP relay host: {}", smtp.host))?
            .port(smtp.port)
            .credentials(credentials)
            .build();

        let from = smtp
            .from
            .parse()
            .context(format!("Invalid sender address: {}", smtp.from))?;

        let recipients = alert_emails
            .iter()
            .map(|addr| {
                addr.parse()
                    .context(format!("Invalid alert address: {}", addr))
            })
            .collect::<Result<Vec<Mailbox>>>()?;

        Ok(Self {
            mailer,
            from,
            recipients,
        })
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(&notification.subject);

        for recipient in &self.recipients {
            builder = builder.to(recipient.clone());
        }

        let email = builder
            .multipart(MultiPart::alternative_plain_html(
                notification.text_body.clone(),
                notification.html_body.clone(),
            ))
            .context("Failed to build notification mail")?;

        self.mailer
            .send(email)
            .await
            .context("Failed to send notification mail")?;

        debug!("Notification mail accepted by SMTP relay");
        Ok(())
    }
}

/// Compose the notification for a completed backup attempt
pub fn render_notification(report: &RunReport, host: &str) -> Notification {
    let timestamp = report.started_at.format("%Y-%m-%d %H:%M:%S").to_string();
    let duration = format_duration(report.duration.as_secs());

    match report.outcome {
        RunOutcome::Success => {
            info!("Composing success notification");
            Notification {
                subject: format!("MongoDB Backup Completed on {}", host),
                text_body: format!(
                    "MongoDB has been backed up on {}.\n\n\
                     Time of event: {}\nDuration: {}\n\nOutput from mongodump:\n{}",
                    host, timestamp, duration, report.stdout
                ),
                html_body: format!(
                    "<p><b>Dear Sys Admin</b></p>\
                     <p>The MongoDB backup has been completed on {}. Event details below:</p>\
                     <p><b><u>Time of event</u></b> {}</p>\
                     <p><b><u>Duration</u></b> {}</p>\
                     <pre>{}</pre>",
                    host, timestamp, duration, report.stdout
                ),
            }
        }
        RunOutcome::DumpError | RunOutcome::LaunchFailure => {
            let detail = if report.outcome == RunOutcome::LaunchFailure {
                format!("The dump command could not be launched:\n{}", report.stderr)
            } else {
                format!("Output from mongodump:\n{}", report.stderr)
            };

            Notification {
                subject: format!("MongoDB Backup Failure on {}", host),
                text_body: format!(
                    "MongoDB auto backup failed on {}.\n\n\
                     Time of event: {}\nDuration: {}\n\n{}",
                    host, timestamp, duration, detail
                ),
                html_body: format!(
                    "<p><b>Dear Sys Admin</b></p>\
                     <p>The MongoDB backup failed on {}. Log details for the event:</p>\
                     <p><b><u>Time of event</u></b> {}</p>\
                     <p><b><u>Duration</u></b> {}</p>\
                     <pre>{}</pre>",
                    host, timestamp, duration, detail
                ),
            }
        }
    }
}

/// Format duration in human-readable form
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        let minutes = seconds / 60;
        let secs = seconds % 60;
        if secs == 0 {
            format!("{}m", minutes)
        } else {
            format!("{}m {}s", minutes, secs)
        }
    } else {
        let hours = seconds / 3600;
        let minutes = (seconds % 3600) / 60;
        if minutes == 0 {
            format!("{}h", hours)
        } else {
            format!("{}h {}m", hours, minutes)
        }
    }
}

/// A recording notifier for tests. Available for use in external test crates.
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub struct RecordingNotifier {
        sent: Arc<Mutex<Vec<Notification>>>,
        fail: Arc<Mutex<bool>>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every subsequent send fail
        pub fn failing(self) -> Self {
            *self.fail.lock().unwrap() = true;
            self
        }

        pub fn sent(&self) -> Vec<Notification> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, notification: &Notification) -> Result<()> {
            if *self.fail.lock().unwrap() {
                anyhow::bail!("SMTP relay unavailable");
            }
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }
}
