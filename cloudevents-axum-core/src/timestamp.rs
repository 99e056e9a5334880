//! RFC 3339 timestamp parsing for the `time` attribute.

use chrono::{DateTime, Utc};

use crate::error::DecodeError;

/// Parse an RFC 3339 timestamp into a UTC instant.
///
/// Only RFC 3339 is accepted; looser ISO 8601 forms are rejected.
pub(crate) fn parse_time(value: &str) -> Result<DateTime<Utc>, DecodeError> {
    DateTime::parse_from_rfc3339(value)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|e| DecodeError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_utc() {
        // date -u --date='2018-04-05T17:31:05Z' +%s
        let time = parse_time("2018-04-05T17:31:05Z").unwrap();
        assert_eq!(time.timestamp(), 1522949465);
    }

    #[test]
    fn test_parse_offset() {
        let time = parse_time("2018-04-05T19:31:05+02:00").unwrap();
        assert_eq!(time.timestamp(), 1522949465);

        let time = parse_time("2018-04-05T12:31:05-05:00").unwrap();
        assert_eq!(time.timestamp(), 1522949465);
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let time = parse_time("2018-04-05T17:31:05.250Z").unwrap();
        assert_eq!(time.timestamp(), 1522949465);
        assert_eq!(time.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for value in [
            "",
            "not-a-time",
            "2018-04-05",
            "2018-04-05T17:31:05",
            "2018-13-05T17:31:05Z",
            "April 5, 2018",
        ] {
            let err = parse_time(value).unwrap_err();
            assert!(
                matches!(&err, DecodeError::InvalidTimestamp { value: v, .. } if v == value),
                "value={value}"
            );
        }
    }
}
