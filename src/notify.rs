/// Email notification on detected transitions.
///
/// Thin collaborator around an authenticated SMTP relay. The service calls
/// `notify` once per transition, synchronously, after the transition row is
/// already on disk — a failing relay costs the email, never the record.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::{EmailConfig, EmailCredentials};
use crate::logging::{self, Component};
use crate::model::{EventKind, MonitorError};

// ---------------------------------------------------------------------------
// Message templates
// ---------------------------------------------------------------------------

/// `Light {EVENT} Detected - {label}`
pub fn subject(sensor_label: &str, kind: EventKind) -> String {
    format!("Light {} Detected - {}", kind, sensor_label)
}

/// `{label} turned {EVENT} at {timestamp}`
pub fn body(sensor_label: &str, kind: EventKind, timestamp: &str) -> String {
    format!("{} turned {} at {}", sensor_label, kind, timestamp)
}

// ---------------------------------------------------------------------------
// Notifier seam
// ---------------------------------------------------------------------------

/// Outbound notification contract consumed by the poll loop.
pub trait Notifier {
    fn notify(
        &self,
        sensor_label: &str,
        kind: EventKind,
        timestamp: &str,
    ) -> Result<(), MonitorError>;
}

/// Used when no email section or no credentials are configured: every
/// transition is logged as delivered-nowhere so operators can tell alerts
/// were suppressed rather than missed.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(
        &self,
        sensor_label: &str,
        kind: EventKind,
        timestamp: &str,
    ) -> Result<(), MonitorError> {
        logging::info(
            Component::Notify,
            &format!(
                "email disabled, alert suppressed: {}",
                body(sensor_label, kind, timestamp)
            ),
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SMTP notifier
// ---------------------------------------------------------------------------

pub struct EmailNotifier {
    mailer: SmtpTransport,
    from: Mailbox,
    recipients: Vec<Mailbox>,
}

impl EmailNotifier {
    /// Builds a relay connection over implicit TLS (port 465 in the
    /// reference deployment). Address parse failures are configuration
    /// mistakes and surface at startup, not at first transition.
    pub fn from_config(
        config: &EmailConfig,
        credentials: EmailCredentials,
    ) -> Result<Self, MonitorError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| MonitorError::Notify(format!("invalid from address: {}", e)))?;
        let recipients: Vec<Mailbox> = config
            .recipients
            .iter()
            .map(|r| {
                r.parse()
                    .map_err(|e| MonitorError::Notify(format!("invalid recipient '{}': {}", r, e)))
            })
            .collect::<Result<_, _>>()?;

        let mailer = SmtpTransport::relay(&config.smtp_host)
            .map_err(|e| MonitorError::Notify(format!("SMTP relay setup failed: {}", e)))?
            .port(config.smtp_port)
            .credentials(Credentials::new(credentials.username, credentials.password))
            .build();

        Ok(Self { mailer, from, recipients })
    }
}

impl Notifier for EmailNotifier {
    fn notify(
        &self,
        sensor_label: &str,
        kind: EventKind,
        timestamp: &str,
    ) -> Result<(), MonitorError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(subject(sensor_label, kind));
        for recipient in &self.recipients {
            builder = builder.to(recipient.clone());
        }
        let message = builder
            .body(body(sensor_label, kind, timestamp))
            .map_err(|e| MonitorError::Notify(format!("message build failed: {}", e)))?;

        self.mailer
            .send(&message)
            .map(|_| ())
            .map_err(|e| MonitorError::Notify(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
