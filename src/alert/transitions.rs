/// Per-channel threshold state machine.
///
/// The detector owns the only mutable state in the service: one ON/OFF
/// boolean per alerting channel, compared against each new reading to
/// decide whether a transition happened. State lives in memory only and
/// never survives a restart, so the first reading after startup can never
/// produce an event.
///
/// # Determinism
/// `observe` is deterministic given the detector's state and its input —
/// timestamps are passed in rather than read from the clock, so the whole
/// state machine is testable without time manipulation.

use chrono::NaiveDateTime;

use crate::model::{ChannelStatus, EventKind, TransitionEvent};

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

pub struct TransitionDetector {
    /// Per-channel ON threshold; `None` disables the channel entirely.
    thresholds: Vec<Option<i64>>,
    /// Per-channel last known ON state; `None` until first observation.
    state: Vec<Option<bool>>,
}

impl TransitionDetector {
    /// Creates a detector with all channel states unset.
    pub fn new(thresholds: Vec<Option<i64>>) -> Self {
        let state = vec![None; thresholds.len()];
        Self { thresholds, state }
    }

    pub fn channel_count(&self) -> usize {
        self.thresholds.len()
    }

    /// Feeds one validated reading through the state machine and returns
    /// any transitions, in channel order.
    ///
    /// Per channel:
    /// - unset threshold: skipped — no state is tracked, no event possible.
    /// - strictly above threshold is ON; equal counts as OFF.
    /// - first observation records state silently (no startup alerts).
    /// - a changed state emits one event and updates the record.
    ///
    /// `readings` must have one value per channel; the parser guarantees
    /// this for every line that reaches the detector.
    pub fn observe(&mut self, readings: &[i64], timestamp: NaiveDateTime) -> Vec<TransitionEvent> {
        debug_assert_eq!(readings.len(), self.thresholds.len());

        let mut events = Vec::new();
        for (i, value) in readings.iter().enumerate() {
            let Some(threshold) = self.thresholds[i] else {
                continue;
            };
            let current = *value > threshold;
            match self.state[i] {
                None => self.state[i] = Some(current),
                Some(previous) if previous != current => {
                    events.push(TransitionEvent {
                        timestamp,
                        channel: i,
                        kind: if current { EventKind::On } else { EventKind::Off },
                    });
                    self.state[i] = Some(current);
                }
                Some(_) => {}
            }
        }
        events
    }

    /// Classifies a reading for the narrative status log without touching
    /// state: `Ignored` where the threshold is unset, else ON/OFF by the
    /// same strict comparison `observe` uses.
    pub fn classify(&self, readings: &[i64]) -> Vec<ChannelStatus> {
        readings
            .iter()
            .zip(&self.thresholds)
            .map(|(value, threshold)| match threshold {
                None => ChannelStatus::Ignored,
                Some(t) if value > t => ChannelStatus::On,
                Some(_) => ChannelStatus::Off,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_timestamp;

    /// Reference deployment thresholds: channel 3 never alerts.
    fn detector() -> TransitionDetector {
        TransitionDetector::new(vec![Some(15), Some(121), None, Some(856)])
    }

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).expect("test timestamp should parse")
    }

    #[test]
    fn test_first_observation_emits_nothing() {
        let mut d = detector();
        let events = d.observe(&[100, 200, 300, 1000], ts("2025-05-01 09:50:00"));
        assert!(
            events.is_empty(),
            "first reading has no prior state to compare against, got {:?}",
            events
        );
    }

    #[test]
    fn test_scenario_a_mixed_transitions() {
        // Prior state [OFF, OFF, -, OFF], reading [20, 100, 500, 900]:
        // Sensor1 crosses 15 → ON, Sensor2 stays below 121, Sensor3 is
        // ignored regardless of magnitude, Sensor4 crosses 856 → ON.
        let mut d = detector();
        d.observe(&[0, 0, 0, 0], ts("2025-05-01 09:50:00")); // establish all-OFF

        let events = d.observe(&[20, 100, 500, 900], ts("2025-05-01 10:00:00"));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].channel, 0);
        assert_eq!(events[0].kind, EventKind::On);
        assert_eq!(events[0].timestamp, ts("2025-05-01 10:00:00"));
        assert_eq!(events[1].channel, 3);
        assert_eq!(events[1].kind, EventKind::On);
    }

    #[test]
    fn test_scenario_d_repeated_reading_emits_once() {
        let mut d = detector();
        d.observe(&[0, 0, 0, 0], ts("2025-05-01 09:50:00"));

        let first = d.observe(&[20, 0, 0, 0], ts("2025-05-01 10:00:00"));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].kind, EventKind::On);

        let second = d.observe(&[20, 0, 0, 0], ts("2025-05-01 10:10:00"));
        assert!(second.is_empty(), "no state change means no event, got {:?}", second);
    }

    #[test]
    fn test_off_transition_when_value_drops() {
        let mut d = detector();
        d.observe(&[20, 0, 0, 0], ts("2025-05-01 09:50:00")); // channel 0 starts ON

        let events = d.observe(&[10, 0, 0, 0], ts("2025-05-01 10:00:00"));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].channel, 0);
        assert_eq!(events[0].kind, EventKind::Off);
    }

    #[test]
    fn test_equal_to_threshold_counts_as_off() {
        let mut d = detector();
        d.observe(&[20, 0, 0, 0], ts("2025-05-01 09:50:00")); // ON

        // Dropping to exactly the threshold is an ON→OFF transition.
        let events = d.observe(&[15, 0, 0, 0], ts("2025-05-01 10:00:00"));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Off);
    }

    #[test]
    fn test_unset_threshold_never_emits() {
        let mut d = detector();
        d.observe(&[0, 0, 0, 0], ts("2025-05-01 09:50:00"));

        // Channel 2 swings wildly; it must stay silent.
        for (minute, value) in [(0, 100_000), (10, 0), (20, 999_999)] {
            let events = d.observe(
                &[0, 0, value, 0],
                ts(&format!("2025-05-01 10:{:02}:00", minute)),
            );
            assert!(
                events.is_empty(),
                "ignored channel must never emit, got {:?}",
                events
            );
        }
    }

    #[test]
    fn test_events_come_out_in_channel_order() {
        let mut d = detector();
        d.observe(&[0, 0, 0, 0], ts("2025-05-01 09:50:00"));

        let events = d.observe(&[20, 200, 0, 900], ts("2025-05-01 10:00:00"));
        let channels: Vec<usize> = events.iter().map(|e| e.channel).collect();
        assert_eq!(channels, vec![0, 1, 3]);
    }

    #[test]
    fn test_first_observation_above_threshold_then_drop_emits_off() {
        // Startup while the light is already ON: the silent first
        // observation records ON, so the later drop is a real OFF event.
        let mut d = detector();
        assert!(d.observe(&[20, 0, 0, 0], ts("2025-05-01 09:50:00")).is_empty());

        let events = d.observe(&[5, 0, 0, 0], ts("2025-05-01 10:00:00"));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Off);
    }

    #[test]
    fn test_classify_reports_ignored_and_does_not_mutate_state() {
        let d = detector();
        let statuses = d.classify(&[20, 100, 500, 900]);
        assert_eq!(
            statuses,
            vec![
                ChannelStatus::On,
                ChannelStatus::Off,
                ChannelStatus::Ignored,
                ChannelStatus::On,
            ]
        );

        // classify is pure — a following observe still sees unset state
        // and therefore emits nothing.
        let mut d = d;
        assert!(d.observe(&[20, 100, 500, 900], ts("2025-05-01 10:00:00")).is_empty());
    }

    #[test]
    fn test_classify_equal_to_threshold_is_off() {
        let d = detector();
        let statuses = d.classify(&[15, 121, 0, 856]);
        assert_eq!(
            statuses,
            vec![
                ChannelStatus::Off,
                ChannelStatus::Off,
                ChannelStatus::Ignored,
                ChannelStatus::Off,
            ]
        );
    }

    #[test]
    fn test_alternating_readings_alternate_events() {
        let mut d = TransitionDetector::new(vec![Some(50)]);
        d.observe(&[0], ts("2025-05-01 10:00:00"));

        let mut kinds = Vec::new();
        for (minute, value) in [(10, 100), (20, 0), (30, 100), (40, 0)] {
            let events = d.observe(&[value], ts(&format!("2025-05-01 10:{}:00", minute)));
            assert_eq!(events.len(), 1);
            kinds.push(events[0].kind);
        }
        assert_eq!(
            kinds,
            vec![EventKind::On, EventKind::Off, EventKind::On, EventKind::Off]
        );
    }
}
