/// Core data types for the light monitoring service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O and no external collaborators — only types, the
/// timestamp wire format, and the closed error enumeration the poll loop
/// matches on.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Timestamp format
// ---------------------------------------------------------------------------

/// Wire format for every timestamp the service writes: CSV rows, narrative
/// log lines, and email bodies all use this second-precision local form.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats a timestamp in the shared wire format.
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a timestamp in the shared wire format.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok()
}

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// One complete poll of the sensor board: an ordered value per channel plus
/// the capture timestamp.
///
/// Ephemeral — lives for the duration of one poll cycle and is persisted
/// only as a CSV row, never as a structured record.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub timestamp: NaiveDateTime,
    pub values: Vec<i64>,
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// The two directions a channel can transition in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    On,
    Off,
}

impl EventKind {
    /// Classifies a value against a threshold: strictly above is ON,
    /// equal-to-threshold counts as OFF.
    pub fn from_comparison(value: i64, threshold: i64) -> Self {
        if value > threshold {
            EventKind::On
        } else {
            EventKind::Off
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::On => "ON",
            EventKind::Off => "OFF",
        }
    }

    /// Parses the CSV/email spelling. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "ON" => Some(EventKind::On),
            "OFF" => Some(EventKind::Off),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected state change on one channel.
///
/// Produced by `alert::transitions::TransitionDetector::observe` when a
/// channel's ON/OFF classification differs from its previous known state.
/// Never produced on a channel's first observation or when its threshold
/// is unset.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionEvent {
    pub timestamp: NaiveDateTime,
    /// 0-based channel index. Persisted and displayed 1-based ("sensor3").
    pub channel: usize,
    pub kind: EventKind,
}

impl TransitionEvent {
    /// The 1-based CSV spelling of the channel, e.g. "sensor3".
    /// Matches the raw-readings header columns.
    pub fn sensor_column(&self) -> String {
        format!("sensor{}", self.channel + 1)
    }
}

/// Per-cycle classification of a channel, used only by the narrative status
/// log. `Ignored` marks channels with no configured threshold — they are
/// still recorded as raw data but never produce events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    On,
    Off,
    Ignored,
}

impl std::fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelStatus::On => write!(f, "ON"),
            ChannelStatus::Off => write!(f, "OFF"),
            ChannelStatus::Ignored => write!(f, "IGNORED"),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Everything that can go wrong during startup or a poll cycle.
///
/// The poll loop matches on this enum to pick the corrective action per
/// kind. Only `TransportInit` is fatal; every other kind is logged and the
/// loop continues.
#[derive(Debug, PartialEq)]
pub enum MonitorError {
    /// The serial port could not be opened at startup. Fatal.
    TransportInit(String),
    /// A read from the serial port failed mid-run. The cycle is skipped
    /// and retried after a short delay.
    TransportRead(String),
    /// A line arrived that did not parse to the expected channel count.
    /// The line is discarded.
    MalformedLine { raw: String },
    /// A CSV or narrative-log append failed. That write is lost; the loop
    /// continues.
    LogWrite { path: String, detail: String },
    /// Email delivery failed. The transition is already persisted.
    Notify(String),
}

impl MonitorError {
    /// Only transport initialization failure aborts the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MonitorError::TransportInit(_))
    }
}

impl std::fmt::Display for MonitorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorError::TransportInit(msg) => {
                write!(f, "Serial connection failed: {}", msg)
            }
            MonitorError::TransportRead(msg) => write!(f, "Serial read failed: {}", msg),
            MonitorError::MalformedLine { raw } => write!(f, "Malformed line skipped: {:?}", raw),
            MonitorError::LogWrite { path, detail } => {
                write!(f, "Write to {} failed: {}", path, detail)
            }
            MonitorError::Notify(msg) => write!(f, "Notification failed: {}", msg),
        }
    }
}

impl std::error::Error for MonitorError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
