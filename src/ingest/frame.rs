/// Line parsing for the sensor board's wire format.
///
/// Each inbound message is one newline-terminated line of comma-separated
/// non-negative integers, exactly one token per channel:
///
///   "23,130,512,900"
///
/// The board occasionally emits truncated or corrupted lines during
/// power-up; those are rejected whole — no partial readings ever reach
/// the detector.

use crate::model::MonitorError;

/// Parses one raw line into ordered channel values.
///
/// Tokens are split on commas; only tokens whose trimmed content is a
/// non-negative integer literal are kept. The line is valid iff the number
/// of kept tokens equals `expected_channels`.
///
/// Anything else — an empty line, a short line, junk tokens displacing a
/// value — is a `MalformedLine` carrying the raw text so the caller can
/// log it before discarding.
pub fn parse_frame(line: &str, expected_channels: usize) -> Result<Vec<i64>, MonitorError> {
    let values: Vec<i64> = line
        .split(',')
        .filter_map(|token| {
            let token = token.trim();
            if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
                token.parse::<i64>().ok()
            } else {
                None
            }
        })
        .collect();

    if values.len() == expected_channels {
        Ok(values)
    } else {
        Err(MonitorError::MalformedLine { raw: line.to_string() })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_line_parses_in_order() {
        let values = parse_frame("20,100,500,900", 4).expect("valid line should parse");
        assert_eq!(values, vec![20, 100, 500, 900]);
    }

    #[test]
    fn test_whitespace_around_tokens_is_tolerated() {
        let values = parse_frame(" 20 , 100 ,500, 900", 4).expect("padded tokens should parse");
        assert_eq!(values, vec![20, 100, 500, 900]);
    }

    #[test]
    fn test_empty_line_is_malformed() {
        let err = parse_frame("", 4).expect_err("empty line must be rejected");
        assert_eq!(err, MonitorError::MalformedLine { raw: String::new() });
    }

    #[test]
    fn test_whitespace_only_line_is_malformed() {
        assert!(parse_frame("   ", 4).is_err());
    }

    #[test]
    fn test_short_line_is_malformed_and_keeps_raw_text() {
        // Scenario C: three tokens where four are expected.
        let err = parse_frame("12,34,56", 4).expect_err("short line must be rejected");
        match err {
            MonitorError::MalformedLine { raw } => assert_eq!(raw, "12,34,56"),
            other => panic!("expected MalformedLine, got {:?}", other),
        }
    }

    #[test]
    fn test_too_many_tokens_is_malformed() {
        assert!(parse_frame("1,2,3,4,5", 4).is_err());
    }

    #[test]
    fn test_junk_token_drops_below_expected_count() {
        // A corrupted value makes the line invalid — no partial reading.
        assert!(parse_frame("20,1x0,500,900", 4).is_err());
        assert!(parse_frame("20,,500,900", 4).is_err());
    }

    #[test]
    fn test_negative_values_are_rejected() {
        // The board never emits negatives; a minus sign means corruption.
        assert!(parse_frame("-1,100,500,900", 4).is_err());
    }

    #[test]
    fn test_junk_tokens_do_not_displace_count() {
        // Four valid integers among junk still parse — the contract counts
        // valid tokens, not raw tokens.
        let values = parse_frame("20,abc,100,500,900", 4).expect("four valid tokens");
        assert_eq!(values, vec![20, 100, 500, 900]);
    }

    #[test]
    fn test_zero_is_a_valid_reading() {
        let values = parse_frame("0,0,0,0", 4).expect("all-dark board should parse");
        assert_eq!(values, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_appended_csv_row_values_round_trip() {
        // Every raw-readings CSV row, minus its timestamp column, re-parses
        // to the original tuple through the same token logic.
        let original = vec![20, 100, 500, 900];
        let row_values = original
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        assert_eq!(parse_frame(&row_values, 4).unwrap(), original);
    }
}
