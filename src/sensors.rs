/// Channel registry for the light monitoring service.
///
/// Defines the monitored sensor channels, their human-readable labels, and
/// their ON thresholds. This is the single source of truth for channel
/// metadata — the detector, recorder, and notifier all take their channel
/// count and labels from here rather than hardcoding indices.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Channel metadata
// ---------------------------------------------------------------------------

/// Metadata for a single sensor channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Channel {
    /// Human-readable label used in email alerts, e.g. "Sensor 1".
    pub label: String,
    /// ON threshold. Strictly above is ON; absent disables transition
    /// detection and alerting for this channel. The channel is still
    /// recorded as raw data and marked IGNORED in the narrative log.
    #[serde(default)]
    pub threshold: Option<i64>,
}

/// The reference deployment: four photoresistor channels on one board.
/// Channel 3 has no threshold — its enclosure sees ambient light around
/// the clock, so ON/OFF classification is meaningless there.
pub fn default_channels() -> Vec<Channel> {
    let thresholds = [Some(15), Some(121), None, Some(856)];
    thresholds
        .iter()
        .enumerate()
        .map(|(i, t)| Channel {
            label: format!("Sensor {}", i + 1),
            threshold: *t,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Registry helpers
// ---------------------------------------------------------------------------

/// Labels for all channels, in channel order.
pub fn labels(channels: &[Channel]) -> Vec<&str> {
    channels.iter().map(|c| c.label.as_str()).collect()
}

/// Thresholds for all channels, in channel order.
pub fn thresholds(channels: &[Channel]) -> Vec<Option<i64>> {
    channels.iter().map(|c| c.threshold).collect()
}

/// Number of channels that have a threshold and can therefore alert.
pub fn alerting_channel_count(channels: &[Channel]) -> usize {
    channels.iter().filter(|c| c.threshold.is_some()).count()
}

/// Validates a channel list loaded from configuration.
///
/// Rejects an empty list and duplicate labels — duplicates would make
/// email alerts and dashboard filters ambiguous.
pub fn validate(channels: &[Channel]) -> Result<(), String> {
    if channels.is_empty() {
        return Err("at least one channel must be configured".to_string());
    }
    let mut seen = std::collections::HashSet::new();
    for channel in channels {
        if channel.label.trim().is_empty() {
            return Err("channel labels must be non-empty".to_string());
        }
        if !seen.insert(channel.label.as_str()) {
            return Err(format!("duplicate channel label '{}'", channel.label));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_channels_match_reference_deployment() {
        let channels = default_channels();
        assert_eq!(channels.len(), 4);
        assert_eq!(
            thresholds(&channels),
            vec![Some(15), Some(121), None, Some(856)]
        );
    }

    #[test]
    fn test_default_labels_are_one_based() {
        let channels = default_channels();
        assert_eq!(
            labels(&channels),
            vec!["Sensor 1", "Sensor 2", "Sensor 3", "Sensor 4"]
        );
    }

    #[test]
    fn test_alerting_channel_count_excludes_unset_thresholds() {
        let channels = default_channels();
        // Channel 3 has no threshold in the reference deployment.
        assert_eq!(alerting_channel_count(&channels), 3);
    }

    #[test]
    fn test_validate_accepts_default_channels() {
        assert!(validate(&default_channels()).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_list() {
        assert!(validate(&[]).is_err(), "empty channel list must be rejected");
    }

    #[test]
    fn test_validate_rejects_duplicate_labels() {
        let channels = vec![
            Channel { label: "Sensor 1".into(), threshold: Some(10) },
            Channel { label: "Sensor 1".into(), threshold: None },
        ];
        let err = validate(&channels).expect_err("duplicate labels must be rejected");
        assert!(err.contains("Sensor 1"), "error should name the duplicate, got '{}'", err);
    }

    #[test]
    fn test_validate_rejects_blank_label() {
        let channels = vec![Channel { label: "  ".into(), threshold: Some(10) }];
        assert!(validate(&channels).is_err());
    }

    #[test]
    fn test_threshold_field_defaults_to_none_in_toml() {
        // A [[channels]] table without a threshold key disables alerting.
        let channel: Channel = toml::from_str("label = \"Sensor 3\"").unwrap();
        assert_eq!(channel.threshold, None);
    }
}
