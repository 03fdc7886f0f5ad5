/// The polling loop: read → parse → detect → record → notify → sleep.
///
/// Single-threaded and cooperative. Readings are processed strictly in
/// arrival order; one bad cycle never terminates the process. The outer
/// loop matches on the closed `MonitorError` enumeration and applies the
/// corrective action per kind — skip, delay, or (for transport init only,
/// which never reaches this loop) abort.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Local;

use crate::alert::transitions::TransitionDetector;
use crate::config::MonitorConfig;
use crate::ingest::frame::parse_frame;
use crate::ingest::serial::LineSource;
use crate::logging::{self, Component};
use crate::model::{format_timestamp, MonitorError, SensorReading};
use crate::notify::Notifier;
use crate::records::DailyRecorder;
use crate::sensors;

// ---------------------------------------------------------------------------
// Cycle outcome
// ---------------------------------------------------------------------------

/// What one pass through the loop body accomplished. Decides whether the
/// full poll-interval sleep applies or the loop re-reads immediately.
#[derive(Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The read timed out with nothing buffered.
    NoData,
    /// A reading was persisted; `events` transitions were detected.
    Logged { events: usize },
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub struct MonitorService<S: LineSource> {
    source: S,
    detector: TransitionDetector,
    recorder: DailyRecorder,
    notifier: Box<dyn Notifier>,
    labels: Vec<String>,
    channel_count: usize,
    alerting_count: usize,
    poll_interval: Duration,
    error_retry: Duration,
}

impl<S: LineSource> MonitorService<S> {
    pub fn new(config: &MonitorConfig, source: S, notifier: Box<dyn Notifier>) -> Self {
        let detector = TransitionDetector::new(sensors::thresholds(&config.channels));
        let recorder =
            DailyRecorder::new(config.monitor.data_dir.clone(), config.channel_count());
        let labels = config.channels.iter().map(|c| c.label.clone()).collect();
        Self {
            source,
            detector,
            recorder,
            notifier,
            labels,
            channel_count: config.channel_count(),
            alerting_count: sensors::alerting_channel_count(&config.channels),
            poll_interval: Duration::from_secs(config.monitor.poll_interval_secs),
            error_retry: Duration::from_secs(config.monitor.error_retry_secs),
        }
    }

    /// Runs until `shutdown` is set. Returns only on clean interrupt —
    /// every runtime error is recovered inside the loop.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        logging::info(
            Component::System,
            &format!(
                "monitoring {} channels ({} alerting), polling every {}s",
                self.channel_count,
                self.alerting_count,
                self.poll_interval.as_secs()
            ),
        );

        while !shutdown.load(Ordering::Relaxed) {
            match self.cycle() {
                Ok(CycleOutcome::Logged { events }) => {
                    if events > 0 {
                        logging::info(
                            Component::Detector,
                            &format!("{} transition(s) this cycle", events),
                        );
                    }
                    sleep_interruptible(self.poll_interval, shutdown);
                }
                // No data and discarded lines re-read immediately; the
                // serial timeout already paces the loop.
                Ok(CycleOutcome::NoData) => {
                    logging::debug(Component::Serial, "no data received");
                }
                Err(err @ MonitorError::MalformedLine { .. }) => {
                    logging::log_cycle_failure(&err);
                }
                Err(err) => {
                    logging::log_cycle_failure(&err);
                    sleep_interruptible(self.error_retry, shutdown);
                }
            }
        }

        logging::info(Component::System, "stopped by interrupt");
    }

    /// One poll cycle. Transport and write failures propagate to `run`;
    /// notify failures are handled here because the transition they belong
    /// to is already persisted.
    pub fn cycle(&mut self) -> Result<CycleOutcome, MonitorError> {
        let Some(line) = self.source.read_line()? else {
            return Ok(CycleOutcome::NoData);
        };

        let values = parse_frame(&line, self.channel_count)?;
        let reading = SensorReading { timestamp: Local::now().naive_local(), values };
        self.process(reading)
    }

    /// Detects, records, and notifies for one validated reading. Split from
    /// `cycle` so tests can inject the timestamp.
    pub fn process(&mut self, reading: SensorReading) -> Result<CycleOutcome, MonitorError> {
        logging::info(
            Component::Serial,
            &format!("{}: {:?}", format_timestamp(reading.timestamp), reading.values),
        );

        self.recorder.append_reading(reading.timestamp, &reading.values)?;
        let statuses = self.detector.classify(&reading.values);
        self.recorder.append_statuses(reading.timestamp, &statuses)?;

        let events = self.detector.observe(&reading.values, reading.timestamp);
        for event in &events {
            // Persist first: a slow or failing relay must not lose the row.
            self.recorder.append_transition(event)?;

            let label = self
                .labels
                .get(event.channel)
                .map(String::as_str)
                .unwrap_or("unknown channel");
            let when = format_timestamp(event.timestamp);
            match self.notifier.notify(label, event.kind, &when) {
                Ok(()) => logging::info(
                    Component::Notify,
                    &format!("alert sent: {} {}", label, event.kind),
                ),
                Err(err) => logging::log_cycle_failure(&err),
            }
        }

        Ok(CycleOutcome::Logged { events: events.len() })
    }
}

/// Sleeps in one-second slices so an interrupt is honored promptly even
/// mid-way through a ten-minute poll interval.
fn sleep_interruptible(total: Duration, shutdown: &AtomicBool) {
    let mut remaining = total;
    while !remaining.is_zero() && !shutdown.load(Ordering::Relaxed) {
        let slice = remaining.min(Duration::from_secs(1));
        std::thread::sleep(slice);
        remaining -= slice;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
