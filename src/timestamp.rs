//! Multi-layout timestamp parsing for the `NotBefore` field.
//!
//! The metadata service has used several textual layouts over its API
//! versions. Layouts are tried in a fixed order and the first one that
//! parses wins.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("timestamp {raw:?} does not match any known layout")]
pub struct TimestampParseError {
    pub raw: String,
}

/// Known layouts, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `2006-01-02T15:04:05Z07:00`
    Rfc3339,
    /// `Mon, 02 Jan 2006 15:04:05 MST`
    Rfc1123,
    /// `02 Jan 06 15:04 -0700`
    Rfc822Z,
    /// `Monday, 02-Jan-06 15:04:05 MST`
    Rfc850,
}

pub const LAYOUTS: [Layout; 4] = [
    Layout::Rfc3339,
    Layout::Rfc1123,
    Layout::Rfc822Z,
    Layout::Rfc850,
];

const SHORT_WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const LONG_WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

impl Layout {
    pub fn parse(self, value: &str) -> Option<DateTime<FixedOffset>> {
        match self {
            Layout::Rfc3339 => DateTime::parse_from_rfc3339(value).ok(),
            // The weekday only has to be a weekday name, it need not agree
            // with the date. RFC 2822 covers the numeric and well-known named
            // zones; any other abbreviation is read as UTC.
            Layout::Rfc1123 => {
                let rest = strip_weekday(value, &SHORT_WEEKDAYS)?;
                DateTime::parse_from_rfc2822(rest)
                    .ok()
                    .or_else(|| named_zone_as_utc(rest, "%d %b %Y %H:%M:%S %Z"))
            }
            Layout::Rfc822Z => DateTime::parse_from_str(value, "%d %b %y %H:%M %z").ok(),
            Layout::Rfc850 => {
                let rest = strip_weekday(value, &LONG_WEEKDAYS)?;
                named_zone_as_utc(rest, "%d-%b-%y %H:%M:%S %Z")
            }
        }
    }
}

/// The text after a leading `<weekday>, `, if the weekday is one of `names`.
fn strip_weekday<'a>(value: &'a str, names: &[&str]) -> Option<&'a str> {
    let (weekday, rest) = value.split_once(", ")?;
    names.contains(&weekday).then_some(rest)
}

fn named_zone_as_utc(value: &str, format: &str) -> Option<DateTime<FixedOffset>> {
    NaiveDateTime::parse_from_str(value, format)
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Parse `value` with the first matching layout.
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>, TimestampParseError> {
    LAYOUTS
        .iter()
        .find_map(|layout| layout.parse(value))
        .ok_or_else(|| TimestampParseError {
            raw: value.to_string(),
        })
}

/// Unix epoch seconds of `value`, see [`parse_timestamp`].
pub fn parse_unix_seconds(value: &str) -> Result<i64, TimestampParseError> {
    parse_timestamp(value).map(|ts| ts.with_timezone(&Utc).timestamp())
}
