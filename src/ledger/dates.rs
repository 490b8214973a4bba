//! Calendar date parsing and the serde adapters used by stored records.
//!
//! Records are written as `YYYY-MM-DD`. Older records may carry a full ISO-8601
//! timestamp; only its date part is kept.

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serializer};

use crate::errors::LedgerError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Leading text of every date error raised while decoding a record.
pub(crate) const INVALID_DATE_MARKER: &str = "invalid calendar date";

fn invalid_date<E: de::Error>(raw: &str) -> E {
    E::custom(format_args!("{INVALID_DATE_MARKER} `{raw}`"))
}

/// Parses a calendar date, dropping any time-of-day component.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, LedgerError> {
    let trimmed = raw.trim();
    let date_part = trimmed
        .split(|c| c == 'T' || c == ' ')
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .map_err(|_| LedgerError::InvalidDate(raw.to_string()))
}

pub fn format_calendar_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_calendar_date(*date))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw).map_err(|_| invalid_date(&raw))
}

pub mod option {
    use super::*;

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(value) => super::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => parse_calendar_date(value)
                .map(Some)
                .map_err(|_| invalid_date(value)),
        }
    }
}
