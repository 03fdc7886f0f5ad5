/// Append-only per-day record files.
///
/// Three files per calendar day, all in the configured data directory:
///
///   {date}_light_data.csv         raw readings, one row per poll
///   {date}_light_transitions.csv  detected ON/OFF events
///   {date}_light_log.css          narrative per-channel status lines
///
/// Each file is created with its header exactly once, the first time its
/// date is encountered; every later write appends. The date key is derived
/// from the write timestamp and memoized per process run, so the
/// existence checks run only when the day rolls over, not on every write.
///
/// Single writer, single thread — no locking discipline is needed.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};

use crate::model::{format_timestamp, ChannelStatus, MonitorError, TransitionEvent};

// ---------------------------------------------------------------------------
// File naming
// ---------------------------------------------------------------------------

/// Maps a write timestamp to its file key: the calendar date.
pub fn file_key(timestamp: NaiveDateTime) -> NaiveDate {
    timestamp.date()
}

/// `{date}_light_data.csv`
pub fn readings_path(data_dir: &Path, date: NaiveDate) -> PathBuf {
    data_dir.join(format!("{}_light_data.csv", date.format("%Y-%m-%d")))
}

/// `{date}_light_transitions.csv`
pub fn transitions_path(data_dir: &Path, date: NaiveDate) -> PathBuf {
    data_dir.join(format!("{}_light_transitions.csv", date.format("%Y-%m-%d")))
}

/// `{date}_light_log.css`
pub fn status_log_path(data_dir: &Path, date: NaiveDate) -> PathBuf {
    data_dir.join(format!("{}_light_log.css", date.format("%Y-%m-%d")))
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

pub struct DailyRecorder {
    data_dir: PathBuf,
    channel_count: usize,
    /// Date whose files are known to exist with headers. `None` until the
    /// first write of the process run.
    prepared_date: Option<NaiveDate>,
}

impl DailyRecorder {
    pub fn new(data_dir: PathBuf, channel_count: usize) -> Self {
        Self { data_dir, channel_count, prepared_date: None }
    }

    /// Creates the day's files with their headers if absent.
    ///
    /// Idempotent and memoized: calling this every poll cycle is safe, and
    /// only the first call per date touches the filesystem.
    pub fn ensure_daily_files(&mut self, date: NaiveDate) -> Result<(), MonitorError> {
        if self.prepared_date == Some(date) {
            return Ok(());
        }

        std::fs::create_dir_all(&self.data_dir).map_err(|e| MonitorError::LogWrite {
            path: self.data_dir.display().to_string(),
            detail: e.to_string(),
        })?;

        let header: String = (1..=self.channel_count)
            .fold("timestamp".to_string(), |acc, i| format!("{},sensor{}", acc, i));
        self.create_with_header(&readings_path(&self.data_dir, date), &header)?;
        self.create_with_header(
            &transitions_path(&self.data_dir, date),
            "timestamp,sensor,event",
        )?;
        self.create_with_header(&status_log_path(&self.data_dir, date), "/* Light Sensor Log */")?;

        self.prepared_date = Some(date);
        Ok(())
    }

    fn create_with_header(&self, path: &Path, header: &str) -> Result<(), MonitorError> {
        if path.exists() {
            return Ok(());
        }
        std::fs::write(path, format!("{}\n", header)).map_err(|e| MonitorError::LogWrite {
            path: path.display().to_string(),
            detail: e.to_string(),
        })
    }

    fn append_line(&self, path: &Path, line: &str) -> Result<(), MonitorError> {
        let to_log_write = |e: std::io::Error| MonitorError::LogWrite {
            path: path.display().to_string(),
            detail: e.to_string(),
        };
        let mut file = OpenOptions::new().append(true).open(path).map_err(to_log_write)?;
        writeln!(file, "{}", line).map_err(to_log_write)?;
        // Append-and-flush per line: an interrupt never leaves a torn row.
        file.flush().map_err(to_log_write)
    }

    /// Appends one raw reading row: `timestamp,v1,...,vN`.
    pub fn append_reading(
        &mut self,
        timestamp: NaiveDateTime,
        values: &[i64],
    ) -> Result<(), MonitorError> {
        let date = file_key(timestamp);
        self.ensure_daily_files(date)?;

        let row = values.iter().fold(format_timestamp(timestamp), |acc, v| {
            format!("{},{}", acc, v)
        });
        self.append_line(&readings_path(&self.data_dir, date), &row)
    }

    /// Appends one transition row: `timestamp,sensorK,ON|OFF`.
    pub fn append_transition(&mut self, event: &TransitionEvent) -> Result<(), MonitorError> {
        let date = file_key(event.timestamp);
        self.ensure_daily_files(date)?;

        let row = format!(
            "{},{},{}",
            format_timestamp(event.timestamp),
            event.sensor_column(),
            event.kind
        );
        self.append_line(&transitions_path(&self.data_dir, date), &row)
    }

    /// Appends one narrative status line per channel:
    /// `/* {ts} Sensor {k}: ON|OFF|IGNORED */`.
    pub fn append_statuses(
        &mut self,
        timestamp: NaiveDateTime,
        statuses: &[ChannelStatus],
    ) -> Result<(), MonitorError> {
        let date = file_key(timestamp);
        self.ensure_daily_files(date)?;

        let ts = format_timestamp(timestamp);
        let lines: Vec<String> = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| format!("/* {} Sensor {}: {} */", ts, i + 1, status))
            .collect();
        self.append_line(&status_log_path(&self.data_dir, date), &lines.join("\n"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
