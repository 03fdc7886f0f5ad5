/// Monitor service entry point.
///
/// Exit codes: 0 on clean interrupt, 1 on configuration or transport
/// initialization failure. Everything after startup is recovered inside
/// the poll loop.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use luxmon_service::config::MonitorConfig;
use luxmon_service::ingest::serial::SerialLineReader;
use luxmon_service::logging::{self, Component, LogLevel};
use luxmon_service::notify::{EmailNotifier, NoopNotifier, Notifier};
use luxmon_service::service::MonitorService;

const DEFAULT_CONFIG_PATH: &str = "luxmon.toml";

fn main() {
    // Credentials may live in a .env next to the binary.
    dotenv::dotenv().ok();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let config = match MonitorConfig::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };

    logging::init_logger(LogLevel::Info, None);

    let reader = match SerialLineReader::open(
        &config.serial.port,
        config.serial.baud_rate,
        Duration::from_secs(config.serial.read_timeout_secs),
    ) {
        Ok(reader) => {
            logging::info(Component::Serial, &format!("connected to {}", config.serial.port));
            reader
        }
        Err(err) => {
            // Transport initialization failure is the one fatal error.
            logging::log_cycle_failure(&err);
            std::process::exit(1);
        }
    };

    let notifier: Box<dyn Notifier> = match (&config.email, MonitorConfig::email_credentials()) {
        (Some(email), Some(credentials)) => {
            match EmailNotifier::from_config(email, credentials) {
                Ok(notifier) => {
                    logging::info(
                        Component::Notify,
                        &format!("email alerts to {} recipient(s)", email.recipients.len()),
                    );
                    Box::new(notifier)
                }
                Err(err) => {
                    // A misconfigured relay should not block monitoring.
                    logging::log_cycle_failure(&err);
                    Box::new(NoopNotifier)
                }
            }
        }
        (Some(_), None) => {
            logging::warn(
                Component::Notify,
                "email configured but credentials unset, alerts will be log-only",
            );
            Box::new(NoopNotifier)
        }
        (None, _) => Box::new(NoopNotifier),
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        if let Err(err) = ctrlc::set_handler(move || shutdown.store(true, Ordering::Relaxed)) {
            logging::warn(Component::System, &format!("no interrupt handler: {}", err));
        }
    }

    let mut service = MonitorService::new(&config, reader, notifier);
    service.run(&shutdown);
}
