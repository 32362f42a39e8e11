//! Timestamp rendering for log lines

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// How the event time is rendered.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use fanlog::TimestampFormat;
///
/// let t = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(TimestampFormat::Iso8601.format(&t), "2025-01-08T10:30:45.000Z");
/// assert_eq!(TimestampFormat::UnixMillis.format(&t), "1736332245000");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// `2025-01-08T10:30:45.123456Z`, for ordering bursts of concurrent events
    Iso8601Micros,

    /// `2025-01-08T10:30:45+00:00`
    Rfc3339,

    /// Milliseconds since the Unix epoch
    UnixMillis,

    /// Any strftime-compatible pattern
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.to_rfc3339_opts(SecondsFormat::Millis, true),
            TimestampFormat::Iso8601Micros => {
                datetime.to_rfc3339_opts(SecondsFormat::Micros, true)
            }
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(pattern) => datetime.format(pattern).to_string(),
        }
    }

    /// JSON form: numeric formats stay numbers
    #[must_use]
    pub fn to_json_value(&self, datetime: &DateTime<Utc>) -> serde_json::Value {
        match self {
            TimestampFormat::UnixMillis => datetime.timestamp_millis().into(),
            _ => serde_json::Value::String(self.format(datetime)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_iso8601() {
        assert_eq!(
            TimestampFormat::Iso8601.format(&fixed_datetime()),
            "2025-01-08T10:30:45.123Z"
        );
        assert_eq!(
            TimestampFormat::Iso8601Micros.format(&fixed_datetime()),
            "2025-01-08T10:30:45.123456Z"
        );
    }

    #[test]
    fn test_rfc3339() {
        let result = TimestampFormat::Rfc3339.format(&fixed_datetime());
        assert!(result.starts_with("2025-01-08T10:30:45"));
        assert!(result.ends_with("+00:00"));
    }

    #[test]
    fn test_custom() {
        let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S".to_string());
        assert_eq!(format.format(&fixed_datetime()), "08/Jan/2025:10:30:45");
    }

    #[test]
    fn test_json_value() {
        let millis = TimestampFormat::UnixMillis.to_json_value(&fixed_datetime());
        assert!(millis.is_number());
        assert!(TimestampFormat::Iso8601.to_json_value(&fixed_datetime()).is_string());
    }

    #[test]
    fn test_deserialization() {
        let format: TimestampFormat =
            serde_json::from_str(r#"{"Custom":"%Y-%m-%d"}"#).expect("deserialize Custom");
        assert_eq!(format, TimestampFormat::Custom("%Y-%m-%d".to_string()));
    }
}
