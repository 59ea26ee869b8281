use super::types::*;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Load and validate configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate the configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.mongodb.host.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "mongodb.host must not be empty".to_string(),
        ));
    }

    if config.mongodb.database.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "mongodb.database must not be empty".to_string(),
        ));
    }

    if config.alert_emails.is_empty() {
        return Err(ConfigError::ValidationError(
            "alert_emails must list at least one recipient".to_string(),
        ));
    }

    for address in &config.alert_emails {
        if !address.contains('@') {
            return Err(ConfigError::ValidationError(format!(
                "alert_emails entry is not a valid address: {}",
                address
            )));
        }
    }

    if config.smtp.host.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "smtp.host must not be empty".to_string(),
        ));
    }

    if !config.smtp.from.contains('@') {
        return Err(ConfigError::ValidationError(format!(
            "smtp.from is not a valid address: {}",
            config.smtp.from
        )));
    }

    if config.global.schedule_interval_hours == 0 {
        return Err(ConfigError::ValidationError(
            "global.schedule_interval_hours must be at least 1".to_string(),
        ));
    }

    if config.global.dump_binary.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "global.dump_binary must not be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> String {
        r#"
alert_emails = ["ops@example.com"]

[global]
output_directory = "/var/backups/mongo"

[mongodb]
host = "db.example.com"
username = "u"
password = "p"
database = "app"

[smtp]
host = "smtp.example.com"
username = "mailer"
password = "secret"
from = "backup@example.com"
"#
        .to_string()
    }

    #[test]
    fn test_defaults_applied() {
        let config: Config = toml::from_str(&base_config()).unwrap();
        assert_eq!(config.mongodb.port, 27017);
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.global.schedule_interval_hours, 24);
        assert_eq!(config.global.dump_timeout_seconds, 3600);
        assert_eq!(config.global.dump_binary, "mongodump");
    }

    #[test]
    fn test_valid_config_passes_validation() {
        let config: Config = toml::from_str(&base_config()).unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_recipient_list_rejected() {
        let raw = base_config().replace(
            r#"alert_emails = ["ops@example.com"]"#,
            "alert_emails = []",
        );
        let config: Config = toml::from_str(&raw).unwrap();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("alert_emails"));
    }

    #[test]
    fn test_bad_recipient_address_rejected() {
        let raw = base_config().replace("ops@example.com", "not-an-address");
        let config: Config = toml::from_str(&raw).unwrap();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("not-an-address"));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let raw = base_config().replace(
            "output_directory = \"/var/backups/mongo\"",
            "output_directory = \"/var/backups/mongo\"\nschedule_interval_hours = 0",
        );
        let config: Config = toml::from_str(&raw).unwrap();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("schedule_interval_hours"));
    }
}
