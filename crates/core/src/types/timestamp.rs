//! Serde helpers for API timestamps.
//!
//! The marketplace API emits naive ISO-8601 datetimes (no offset), while
//! RFC 3339 values with an offset are also accepted. Naive values are
//! interpreted as UTC.
//!
//! ```rust
//! # use chrono::{DateTime, Utc};
//! # use serde::Deserialize;
//! #[derive(Deserialize)]
//! struct Row {
//!     #[serde(with = "toys_marketplace_core::types::timestamp")]
//!     created_at: DateTime<Utc>,
//! }
//!
//! let row: Row = serde_json::from_str(r#"{"created_at":"2024-03-01T09:30:00.123456"}"#).unwrap();
//! assert_eq!(row.created_at.to_rfc3339(), "2024-03-01T09:30:00.123456+00:00");
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a timestamp in any of the accepted formats.
///
/// # Errors
///
/// Returns the last parse error when no format matches.
pub fn parse(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(rfc_err) => NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .map(|naive| naive.and_utc())
            .ok_or(rfc_err),
    }
}

/// Serialize as RFC 3339.
///
/// # Errors
///
/// Propagates serializer errors.
pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339())
}

/// Deserialize from any accepted format.
///
/// # Errors
///
/// Fails when the string is not a recognised timestamp.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}

/// The same helpers for `Option<DateTime<Utc>>` fields such as `updated_at`.
pub mod option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize `None` as null.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => super::serialize(dt, serializer),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize null or a missing field as `None`.
    ///
    /// # Errors
    ///
    /// Fails when a present value is not a recognised timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| super::parse(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn test_parse_naive() {
        let dt = parse("2024-01-15T10:20:30").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 1, 15));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (10, 20, 30));
    }

    #[test]
    fn test_parse_naive_fractional_and_space() {
        assert!(parse("2024-01-15T10:20:30.654321").is_ok());
        assert!(parse("2024-01-15 10:20:30").is_ok());
    }

    #[test]
    fn test_parse_with_offset_converts_to_utc() {
        let dt = parse("2024-01-15T12:00:00+02:00").unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("yesterday").is_err());
        assert!(parse("").is_err());
    }
}
