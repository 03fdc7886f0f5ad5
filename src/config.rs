/// Service configuration.
///
/// All tunables live in a TOML file passed to the monitor binary; SMTP
/// credentials come from the environment (a `.env` file is honored via
/// dotenv) so they never sit next to thresholds in version control.
///
/// Thresholds, paths, and intervals are loaded once at startup into an
/// immutable `MonitorConfig` that is passed into the detector, recorder,
/// and notifier at construction — no module-wide mutable globals.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::sensors::{self, Channel};

/// Environment variable holding the SMTP account username.
pub const ENV_EMAIL_USER: &str = "LUXMON_EMAIL_USER";
/// Environment variable holding the SMTP account password.
pub const ENV_EMAIL_PASSWORD: &str = "LUXMON_EMAIL_PASSWORD";

// ---------------------------------------------------------------------------
// Configuration sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SerialConfig {
    /// Serial device path, e.g. "/dev/ttyUSB0" or "COM21".
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// A timed-out read is treated as "no data", not an error.
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// Directory receiving the per-day CSV and narrative log files.
    pub data_dir: PathBuf,
    /// Sleep between successful poll cycles, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Sleep after a recovered transport or write failure, in seconds.
    #[serde(default = "default_error_retry_secs")]
    pub error_retry_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// Sender address, e.g. "monitor@example.org".
    pub from: String,
    pub recipients: Vec<String>,
}

/// Credentials resolved from the environment, kept out of the TOML file.
#[derive(Debug, Clone)]
pub struct EmailCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    pub serial: SerialConfig,
    pub monitor: PollConfig,
    #[serde(default = "sensors::default_channels")]
    pub channels: Vec<Channel>,
    /// Absent section disables email entirely.
    #[serde(default)]
    pub email: Option<EmailConfig>,
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_read_timeout_secs() -> u64 {
    5
}

fn default_poll_interval_secs() -> u64 {
    600
}

fn default_error_retry_secs() -> u64 {
    10
}

fn default_smtp_port() -> u16 {
    465
}

// ---------------------------------------------------------------------------
// Loading and validation
// ---------------------------------------------------------------------------

impl MonitorConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read config file {}: {}", path.display(), e))?;
        Self::from_toml(&text)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, String> {
        let config: MonitorConfig =
            toml::from_str(text).map_err(|e| format!("invalid config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        sensors::validate(&self.channels)?;
        if self.serial.port.trim().is_empty() {
            return Err("serial.port must be non-empty".to_string());
        }
        if self.monitor.poll_interval_secs == 0 {
            return Err("monitor.poll_interval_secs must be non-zero".to_string());
        }
        if let Some(email) = &self.email {
            if email.recipients.is_empty() {
                return Err("email.recipients must list at least one address".to_string());
            }
        }
        Ok(())
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Reads SMTP credentials from the environment. `None` if either
    /// variable is unset — the caller downgrades to log-only alerts.
    pub fn email_credentials() -> Option<EmailCredentials> {
        let username = std::env::var(ENV_EMAIL_USER).ok()?;
        let password = std::env::var(ENV_EMAIL_PASSWORD).ok()?;
        Some(EmailCredentials { username, password })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"
        [serial]
        port = "/dev/ttyUSB0"
        baud_rate = 9600
        read_timeout_secs = 5

        [monitor]
        data_dir = "/var/lib/luxmon"
        poll_interval_secs = 600
        error_retry_secs = 10

        [[channels]]
        label = "Sensor 1"
        threshold = 15

        [[channels]]
        label = "Sensor 2"
        threshold = 121

        [[channels]]
        label = "Sensor 3"

        [[channels]]
        label = "Sensor 4"
        threshold = 856

        [email]
        smtp_host = "smtp.gmail.com"
        smtp_port = 465
        from = "monitor@example.org"
        recipients = ["lab@example.org", "pi@example.org"]
    "#;

    #[test]
    fn test_full_config_parses() {
        let config = MonitorConfig::from_toml(FULL_CONFIG).expect("config should parse");
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.channel_count(), 4);
        assert_eq!(config.channels[2].threshold, None);
        let email = config.email.expect("email section should be present");
        assert_eq!(email.recipients.len(), 2);
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config = MonitorConfig::from_toml(
            r#"
            [serial]
            port = "COM21"

            [monitor]
            data_dir = "./records"
            "#,
        )
        .expect("minimal config should parse");
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.serial.read_timeout_secs, 5);
        assert_eq!(config.monitor.poll_interval_secs, 600);
        assert_eq!(config.monitor.error_retry_secs, 10);
        assert!(config.email.is_none(), "email should default to disabled");
        // Channels default to the reference deployment.
        assert_eq!(config.channel_count(), 4);
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let result = MonitorConfig::from_toml(
            r#"
            [serial]
            port = "COM21"

            [monitor]
            data_dir = "./records"
            poll_interval_secs = 0
            "#,
        );
        assert!(result.is_err(), "zero poll interval must be rejected");
    }

    #[test]
    fn test_empty_recipient_list_rejected() {
        let result = MonitorConfig::from_toml(
            r#"
            [serial]
            port = "COM21"

            [monitor]
            data_dir = "./records"

            [email]
            smtp_host = "smtp.example.org"
            from = "monitor@example.org"
            recipients = []
            "#,
        );
        assert!(result.is_err(), "email with no recipients must be rejected");
    }

    #[test]
    fn test_blank_serial_port_rejected() {
        let result = MonitorConfig::from_toml(
            r#"
            [serial]
            port = "  "

            [monitor]
            data_dir = "./records"
            "#,
        );
        assert!(result.is_err());
    }
}
