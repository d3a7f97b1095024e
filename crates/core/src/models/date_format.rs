//! Lenient readers for the date strings found in stored snapshots.
//!
//! Dates entered through the form are stored as bare `YYYY-MM-DD`; records
//! stamped by code carry a full ISO timestamp, with or without an offset.
//! Both shapes must load. Writing always uses RFC 3339 / `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const DATE: &str = "%Y-%m-%d";
const LOCAL_DATETIME: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse a stored timestamp. A bare date means midnight UTC; a timestamp
/// without an offset is taken as UTC.
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, LOCAL_DATETIME) {
        return Ok(naive.and_utc());
    }
    NaiveDate::parse_from_str(trimmed, DATE)
        .map(|date| date.and_time(chrono::NaiveTime::MIN).and_utc())
        .map_err(|_| format!("Invalid date '{value}'"))
}

/// Parse a stored calendar date, dropping any time part.
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), DATE)
        .or_else(|_| parse_datetime(value).map(|dt| dt.date_naive()))
        .map_err(|_| format!("Invalid date '{value}'"))
}

pub fn deserialize_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_datetime(&raw).map_err(serde::de::Error::custom)
}

pub fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}
