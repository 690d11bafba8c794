//! Timestamp helpers.
//!
//! Persona timestamps are kept at millisecond precision so that a record
//! serialized to one store and read back from another compares equal.
//!
//! Serde support:
//! - Serialization: `DateTime<Utc>` -> RFC3339 string with milliseconds (`2024-05-01T10:00:00.000Z`)
//! - Deserialization: RFC3339 string or Unix timestamp (seconds or milliseconds) -> `DateTime<Utc>`

use chrono::{DateTime, Duration, DurationRound, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Current time truncated to whole milliseconds.
pub fn now_millis() -> DateTime<Utc> {
    truncate_millis(Utc::now())
}

/// Truncate a timestamp to whole milliseconds.
pub fn truncate_millis(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.duration_trunc(Duration::milliseconds(1)).unwrap_or(dt)
}

/// Timestamp for a mutation of a record last stamped at `previous`.
///
/// Always strictly later than `previous`, even when the clock has not moved
/// (or moved backwards) since.
pub fn next_timestamp(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = now_millis();
    match previous {
        Some(prev) if now <= prev => truncate_millis(prev) + Duration::milliseconds(1),
        _ => now,
    }
}

/// Format a timestamp the way it is stored.
pub fn format(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serializes `DateTime<Utc>` as an RFC3339 string with milliseconds.
pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(dt))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TimestampOrString {
    String(String),
    I64(i64),
    U64(u64),
}

impl TimestampOrString {
    /// Parsed value, truncated to the millisecond precision it is stored at.
    fn into_datetime(self) -> Result<DateTime<Utc>, String> {
        let parsed = match self {
            Self::String(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| format!("Invalid RFC3339 timestamp: {e}")),
            Self::I64(ts) => {
                parse_unix_timestamp(ts).ok_or_else(|| "Invalid Unix timestamp".to_string())
            }
            Self::U64(ts) => i64::try_from(ts)
                .ok()
                .and_then(parse_unix_timestamp)
                .ok_or_else(|| "Invalid Unix timestamp".to_string()),
        };
        parsed.map(truncate_millis)
    }
}

/// Deserializes `DateTime<Utc>` from RFC3339 or Unix timestamp.
///
/// Unix timestamps are auto-detected as seconds or milliseconds.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    TimestampOrString::deserialize(deserializer)?
        .into_datetime()
        .map_err(Error::custom)
}

/// `Option<DateTime<Utc>>` serializer/deserializer helpers.
pub mod option {
    use super::{DateTime, Deserialize, Deserializer, Serializer, TimestampOrString, Utc, format};

    /// Serializes `Option<DateTime<Utc>>` as RFC3339 or `null`.
    pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match dt {
            Some(dt) => serializer.serialize_some(&format(dt)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes `Option<DateTime<Utc>>` from RFC3339, Unix timestamp, or `null`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        Option::<TimestampOrString>::deserialize(deserializer)?
            .map(TimestampOrString::into_datetime)
            .transpose()
            .map_err(Error::custom)
    }
}

/// Parses a Unix timestamp with second/millisecond auto-detection.
fn parse_unix_timestamp(ts: i64) -> Option<DateTime<Utc>> {
    // Values larger than 10^11 are interpreted as milliseconds.
    if ts > 100_000_000_000 {
        DateTime::from_timestamp_millis(ts)
    } else {
        DateTime::from_timestamp(ts, 0)
    }
}
