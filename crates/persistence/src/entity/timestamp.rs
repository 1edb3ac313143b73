//! Fixed-width timestamp encoding.
//!
//! Timestamp fields are stored as RFC 3339 strings with exactly nine
//! fractional digits (`2024-03-01T12:00:00.000000000Z`). Every stored value
//! has the same width, so backends that order sort keys as strings order
//! them chronologically.
//!
//! Use it on entity fields with `#[serde(with = "...::timestamp")]`:
//!
//! ```
//! use chrono::{DateTime, Utc};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Event {
//!     #[serde(with = "storefront_persistence::entity::timestamp")]
//!     at: DateTime<Utc>,
//! }
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

/// Formats a timestamp in the stored form.
pub fn format(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parses any RFC 3339 timestamp into UTC.
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Rewrites an RFC 3339 string into the stored form. Other values are
/// returned unchanged.
pub(crate) fn normalize(value: Value) -> Value {
    match value {
        Value::String(s) => match parse(&s) {
            Some(ts) => Value::String(format(&ts)),
            None => Value::String(s),
        },
        other => other,
    }
}

/// Serializes a timestamp in the stored form.
pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(ts))
}

/// Deserializes a timestamp of any RFC 3339 precision.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

/// The same encoding for optional timestamps.
pub mod option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes an optional timestamp.
    pub fn serialize<S: Serializer>(
        ts: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.serialize_str(&super::format(ts)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes an optional timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => super::parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw))),
            None => Ok(None),
        }
    }
}
