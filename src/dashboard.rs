/// Transition history loading, filtering, and rendering.
///
/// Reads the per-day transitions CSVs the monitor accumulates and treats
/// them as one logical table with columns (timestamp, sensor, event).
/// Strictly read-only over the recorder's output — the dashboard binary
/// can run while the monitor is writing.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::model::{parse_timestamp, EventKind, TIMESTAMP_FORMAT};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One row of the combined transitions table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionRecord {
    #[serde(with = "wire_timestamp")]
    pub timestamp: NaiveDateTime,
    /// CSV sensor column, e.g. "sensor1".
    pub sensor: String,
    pub event: EventKind,
}

mod wire_timestamp {
    use super::*;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
    }
}

/// Result of loading a directory of transition files.
#[derive(Debug, Default)]
pub struct LoadedTransitions {
    pub records: Vec<TransitionRecord>,
    /// Files that matched the naming convention and were read.
    pub files_read: usize,
    /// Data rows dropped because a column would not parse.
    pub rows_skipped: usize,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Returns true for file names the recorder produces for transitions.
fn is_transitions_file(name: &str) -> bool {
    name.contains("light_transitions") && name.ends_with(".csv")
}

/// Loads and combines every transitions file in `dir`, sorted by timestamp.
///
/// Header rows are skipped; rows whose timestamp or event column does not
/// parse are counted in `rows_skipped` rather than aborting the load — one
/// corrupt line in a month of history should not blank the dashboard.
pub fn load_transitions(dir: &Path) -> Result<LoadedTransitions, std::io::Error> {
    let mut loaded = LoadedTransitions::default();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_transitions_file(&name) {
            continue;
        }
        let content = std::fs::read_to_string(entry.path())?;
        loaded.files_read += 1;

        for line in content.lines().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            match parse_row(line) {
                Some(record) => loaded.records.push(record),
                None => loaded.rows_skipped += 1,
            }
        }
    }

    loaded.records.sort_by_key(|r| r.timestamp);
    Ok(loaded)
}

fn parse_row(line: &str) -> Option<TransitionRecord> {
    let mut columns = line.splitn(3, ',');
    let timestamp = parse_timestamp(columns.next()?)?;
    let sensor = columns.next()?.trim();
    let event = EventKind::parse(columns.next()?)?;
    if sensor.is_empty() {
        return None;
    }
    Some(TransitionRecord { timestamp, sensor: sensor.to_string(), event })
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Conjunctive filter over the combined table. `None` means "no filter"
/// for that dimension, mirroring an empty multi-select.
#[derive(Debug, Default, Clone)]
pub struct TransitionFilter {
    pub sensors: Option<Vec<String>>,
    pub events: Option<Vec<EventKind>>,
    pub dates: Option<Vec<NaiveDate>>,
}

impl TransitionFilter {
    pub fn matches(&self, record: &TransitionRecord) -> bool {
        if let Some(sensors) = &self.sensors {
            if !sensors.iter().any(|s| s == &record.sensor) {
                return false;
            }
        }
        if let Some(events) = &self.events {
            if !events.contains(&record.event) {
                return false;
            }
        }
        if let Some(dates) = &self.dates {
            if !dates.contains(&record.timestamp.date()) {
                return false;
            }
        }
        true
    }

    pub fn retain(&self, records: &[TransitionRecord]) -> Vec<TransitionRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Distinct sensor columns present in the records, sorted.
pub fn sensor_options(records: &[TransitionRecord]) -> Vec<String> {
    let mut sensors: Vec<String> = records.iter().map(|r| r.sensor.clone()).collect();
    sensors.sort();
    sensors.dedup();
    sensors
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Aligned text table of the filtered records.
pub fn render_table(records: &[TransitionRecord]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<20} {:<10} {:<5}\n", "timestamp", "sensor", "event"));
    out.push_str(&format!("{:-<20} {:-<10} {:-<5}\n", "", "", ""));
    for record in records {
        out.push_str(&format!(
            "{:<20} {:<10} {:<5}\n",
            record.timestamp.format(TIMESTAMP_FORMAT),
            record.sensor,
            record.event
        ));
    }
    out.push_str(&format!("{} transition(s)\n", records.len()));
    out
}

/// Width of the scatter strip in buckets.
const SCATTER_COLUMNS: usize = 60;

/// Per-sensor time-bucketed scatter strip: the text rendering of "ON/OFF
/// transitions over time". Each row is one sensor; each column covers an
/// equal slice of the filtered time range; `o` marks ON events, `.` OFF,
/// `*` a bucket containing both.
pub fn render_scatter(records: &[TransitionRecord]) -> String {
    let Some(first) = records.iter().map(|r| r.timestamp).min() else {
        return "no transitions to plot\n".to_string();
    };
    let last = records.iter().map(|r| r.timestamp).max().unwrap_or(first);
    let span_secs = (last - first).num_seconds().max(1);

    let mut out = String::new();
    for sensor in sensor_options(records) {
        let mut cells = vec![' '; SCATTER_COLUMNS];
        for record in records.iter().filter(|r| r.sensor == sensor) {
            let offset = (record.timestamp - first).num_seconds();
            let bucket = ((offset * (SCATTER_COLUMNS as i64 - 1)) / span_secs) as usize;
            let mark = match record.event {
                EventKind::On => 'o',
                EventKind::Off => '.',
            };
            cells[bucket] = match cells[bucket] {
                ' ' => mark,
                prev if prev == mark => mark,
                _ => '*',
            };
        }
        out.push_str(&format!("{:<10} |{}|\n", sensor, cells.iter().collect::<String>()));
    }
    out.push_str(&format!(
        "{:<10}  {} .. {}   (o=ON  .=OFF  *=both)\n",
        "",
        first.format(TIMESTAMP_FORMAT),
        last.format(TIMESTAMP_FORMAT)
    ));
    out
}

/// Filtered records as a JSON array, for downstream plotting.
pub fn to_json(records: &[TransitionRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
