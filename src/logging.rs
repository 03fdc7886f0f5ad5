/// Narrative logging for the light monitoring service.
///
/// Context-rich console logging with component tags and severity levels,
/// plus optional file-based logging for unattended operation. The per-day
/// CSV data files are not written here — see `records`; this module covers
/// the human-readable service log only.

use chrono::Local;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::model::MonitorError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Component tags
// ---------------------------------------------------------------------------

/// Which part of the service produced a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Serial,
    Detector,
    Records,
    Notify,
    Dashboard,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Serial => write!(f, "SERIAL"),
            Component::Detector => write!(f, "DETECT"),
            Component::Records => write!(f, "RECORDS"),
            Component::Notify => write!(f, "NOTIFY"),
            Component::Dashboard => write!(f, "DASH"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for the service log
    log_file: Option<String>,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>) {
        let logger = Logger { min_level, log_file };
        *LOGGER.lock().unwrap() = Some(logger);
    }

    fn log(&self, level: LogLevel, component: Component, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let entry = format!("{} {:5} [{}] {}", timestamp, level.to_string(), component, message);

        match level {
            LogLevel::Error | LogLevel::Warning => eprintln!("{}", entry),
            LogLevel::Info | LogLevel::Debug => println!("{}", entry),
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &entry) {
                eprintln!("Failed to write to service log {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public logging functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>) {
    Logger::init(min_level, log_file.map(String::from));
}

/// Log a general informational message
pub fn info(component: Component, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Info, component, message);
    }
}

/// Log a warning message
pub fn warn(component: Component, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Warning, component, message);
    }
}

/// Log an error message
pub fn error(component: Component, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Error, component, message);
    }
}

/// Log a debug message
pub fn debug(component: Component, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Debug, component, message);
    }
}

// ---------------------------------------------------------------------------
// Cycle failure logging
// ---------------------------------------------------------------------------

/// Maps a cycle failure to its component tag.
pub fn component_for(err: &MonitorError) -> Component {
    match err {
        MonitorError::TransportInit(_) | MonitorError::TransportRead(_) => Component::Serial,
        MonitorError::MalformedLine { .. } => Component::Detector,
        MonitorError::LogWrite { .. } => Component::Records,
        MonitorError::Notify(_) => Component::Notify,
    }
}

/// Logs a poll-cycle failure at the severity its kind deserves.
///
/// Fatal errors log at ERROR; everything the loop recovers from logs at
/// WARN so a tail of the service log distinguishes "process is about to
/// exit" from "one cycle was lost".
pub fn log_cycle_failure(err: &MonitorError) {
    let component = component_for(err);
    if err.is_fatal() {
        error(component, &err.to_string());
    } else {
        warn(component, &err.to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_failures_map_to_their_component() {
        assert_eq!(
            component_for(&MonitorError::TransportRead("timeout".into())),
            Component::Serial
        );
        assert_eq!(
            component_for(&MonitorError::MalformedLine { raw: "x".into() }),
            Component::Detector
        );
        assert_eq!(
            component_for(&MonitorError::LogWrite {
                path: "a.csv".into(),
                detail: "denied".into()
            }),
            Component::Records
        );
        assert_eq!(
            component_for(&MonitorError::Notify("relay down".into())),
            Component::Notify
        );
    }
}
