//! Date and time values, and the ISO-8601 text they travel as.
//!
//! Neither JSON nor msgpack can carry a date or time natively, so they go out as ISO-8601 text
//! and are recognized again on the way back in. Recognition is strict. A string is only turned
//! back into a temporal value if it matches one of three fixed-width grammars exactly, with ASCII
//! digits only:
//!
//! ```text
//! datetime  YYYY-MM-DD(T| )HH:MM:SS[.f{1,6}][Z|±HH:MM]
//! date      YYYY-MM-DD
//! time      HH:MM:SS[.f{1,6}][Z|±HH:MM]
//! ```
//!
//! Years outside `0000..=9999` use the expanded form, a sign followed by at least four digits
//! (`-0001`, `+10000`). A signed year inside the plain range is not accepted.
//!
//! Text that matches a grammar but names an impossible value (month 13, 25 o'clock) is left
//! alone, as is anything with leading or trailing characters.

use std::fmt;

use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Timelike};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const NANOS_PER_MICRO: u32 = 1_000;
const NANOS_PER_SEC: u32 = 1_000_000_000;

static DATETIME_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^([0-9]{4}|[+-][0-9]{4,6})-([0-9]{2})-([0-9]{2})[T ]",
        r"([0-9]{2}):([0-9]{2}):([0-9]{2})(?:\.([0-9]{1,6}))?",
        r"(Z|[+-][0-9]{2}:[0-9]{2})?$",
    ))
    .expect("datetime grammar is a valid regex")
});

static DATE_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4}|[+-][0-9]{4,6})-([0-9]{2})-([0-9]{2})$")
        .expect("date grammar is a valid regex")
});

static TIME_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^([0-9]{2}):([0-9]{2}):([0-9]{2})(?:\.([0-9]{1,6}))?",
        r"(Z|[+-][0-9]{2}:[0-9]{2})?$",
    ))
    .expect("time grammar is a valid regex")
});

// Shortest possible match is a bare time, longest is an expanded-year datetime with fraction
// and offset.
const MIN_TEMPORAL_LEN: usize = 8;
const MAX_TEMPORAL_LEN: usize = 35;

// Years written without a sign.
const PLAIN_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// A calendar date and wall-clock time, with an optional UTC offset.
///
/// Resolution is one microsecond; anything finer is dropped on construction so that a value
/// always survives a trip through its ISO text. Offsets are kept to the minute.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DateTime {
    naive: NaiveDateTime,
    offset: Option<FixedOffset>,
}

impl DateTime {
    /// A date-time with no offset attached.
    pub fn naive(naive: NaiveDateTime) -> DateTime {
        DateTime {
            naive: NaiveDateTime::new(naive.date(), truncate_time(naive.time())),
            offset: None,
        }
    }

    /// A local date-time at the given offset from UTC.
    pub fn with_offset(local: NaiveDateTime, offset: FixedOffset) -> DateTime {
        DateTime {
            offset: Some(truncate_offset(offset)),
            ..DateTime::naive(local)
        }
    }

    /// The local date-time, without its offset.
    pub fn naive_local(&self) -> NaiveDateTime {
        self.naive
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    /// Convert into a chrono date-time, if an offset is attached.
    pub fn to_chrono(&self) -> Option<chrono::DateTime<FixedOffset>> {
        let offset = self.offset?;
        self.naive.and_local_timezone(offset).single()
    }

    /// Parse strict ISO-8601 date-time text. Returns `None` for anything the datetime grammar
    /// does not accept in full.
    pub fn parse_iso(text: &str) -> Option<DateTime> {
        let caps = DATETIME_GRAMMAR.captures(text)?;
        DateTime::from_captures(&caps)
    }

    fn from_captures(caps: &Captures) -> Option<DateTime> {
        let date = date_from_groups(&caps[1], &caps[2], &caps[3])?;
        let time = time_from_groups(&caps[4], &caps[5], &caps[6], caps.get(7).map(|m| m.as_str()))?;
        let naive = NaiveDateTime::new(date, time);
        match caps.get(8) {
            Some(offset) => Some(DateTime::with_offset(naive, parse_offset(offset.as_str())?)),
            None => Some(DateTime::naive(naive)),
        }
    }
}

impl From<NaiveDateTime> for DateTime {
    fn from(naive: NaiveDateTime) -> Self {
        DateTime::naive(naive)
    }
}

impl From<chrono::DateTime<FixedOffset>> for DateTime {
    fn from(dt: chrono::DateTime<FixedOffset>) -> Self {
        DateTime::with_offset(dt.naive_local(), *dt.offset())
    }
}

impl From<chrono::DateTime<chrono::Utc>> for DateTime {
    fn from(dt: chrono::DateTime<chrono::Utc>) -> Self {
        DateTime::with_offset(dt.naive_utc(), utc())
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_date(f, &self.naive.date())?;
        f.write_str("T")?;
        write_time(f, &self.naive.time())?;
        if let Some(offset) = self.offset {
            write_offset(f, offset)?;
        }
        Ok(())
    }
}

/// A wall-clock time with an optional UTC offset, at microsecond resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Time {
    naive: NaiveTime,
    offset: Option<FixedOffset>,
}

impl Time {
    pub fn naive(naive: NaiveTime) -> Time {
        Time {
            naive: truncate_time(naive),
            offset: None,
        }
    }

    pub fn with_offset(local: NaiveTime, offset: FixedOffset) -> Time {
        Time {
            naive: truncate_time(local),
            offset: Some(truncate_offset(offset)),
        }
    }

    pub fn naive_local(&self) -> NaiveTime {
        self.naive
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    /// Parse strict ISO-8601 time text.
    pub fn parse_iso(text: &str) -> Option<Time> {
        let caps = TIME_GRAMMAR.captures(text)?;
        let time = time_from_groups(&caps[1], &caps[2], &caps[3], caps.get(4).map(|m| m.as_str()))?;
        match caps.get(5) {
            Some(offset) => Some(Time::with_offset(time, parse_offset(offset.as_str())?)),
            None => Some(Time::naive(time)),
        }
    }
}

impl From<NaiveTime> for Time {
    fn from(naive: NaiveTime) -> Self {
        Time::naive(naive)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_time(f, &self.naive)?;
        if let Some(offset) = self.offset {
            write_offset(f, offset)?;
        }
        Ok(())
    }
}

/// Parse strict ISO-8601 date text (`YYYY-MM-DD`).
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let caps = DATE_GRAMMAR.captures(text)?;
    date_from_groups(&caps[1], &caps[2], &caps[3])
}

/// Format a date the way the marshaler sends it.
pub fn date_to_iso(date: &NaiveDate) -> String {
    struct IsoDate<'a>(&'a NaiveDate);
    impl fmt::Display for IsoDate<'_> {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write_date(f, self.0)
        }
    }
    IsoDate(date).to_string()
}

/// A temporal value recognized in wire text.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Detected {
    DateTime(DateTime),
    Date(NaiveDate),
    Time(Time),
}

/// Run the grammars in order (datetime, date, time) and return the first full match. A string
/// that matches a grammar but fails calendar validation is not retried against later grammars;
/// the grammars are disjoint anyway.
pub(crate) fn detect(text: &str) -> Option<Detected> {
    let bytes = text.as_bytes();
    if bytes.len() < MIN_TEMPORAL_LEN
        || bytes.len() > MAX_TEMPORAL_LEN
        || !(bytes[0].is_ascii_digit() || bytes[0] == b'+' || bytes[0] == b'-')
    {
        return None;
    }
    if let Some(caps) = DATETIME_GRAMMAR.captures(text) {
        return DateTime::from_captures(&caps).map(Detected::DateTime);
    }
    if DATE_GRAMMAR.is_match(text) {
        return parse_iso_date(text).map(Detected::Date);
    }
    Time::parse_iso(text).map(Detected::Time)
}

fn utc() -> FixedOffset {
    chrono::Utc.fix()
}

fn truncate_time(time: NaiveTime) -> NaiveTime {
    let nanos = time.nanosecond() / NANOS_PER_MICRO * NANOS_PER_MICRO;
    time.with_nanosecond(nanos).unwrap_or(time)
}

fn truncate_offset(offset: FixedOffset) -> FixedOffset {
    let secs = offset.local_minus_utc() / 60 * 60;
    FixedOffset::east_opt(secs).unwrap_or(offset)
}

fn date_from_groups(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let signed = year.starts_with(['+', '-']);
    let year: i32 = year.parse().ok()?;
    if signed == PLAIN_YEARS.contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}

fn time_from_groups(hour: &str, min: &str, sec: &str, fraction: Option<&str>) -> Option<NaiveTime> {
    let micro = match fraction {
        // Right-pad to six digits: ".5" is 500000 microseconds
        Some(digits) => format!("{:0<6}", digits).parse().ok()?,
        None => 0,
    };
    NaiveTime::from_hms_micro_opt(hour.parse().ok()?, min.parse().ok()?, sec.parse().ok()?, micro)
}

fn parse_offset(text: &str) -> Option<FixedOffset> {
    if text == "Z" {
        return Some(utc());
    }
    let sign = if text.starts_with('-') { -1 } else { 1 };
    let hours: i32 = text.get(1..3)?.parse().ok()?;
    let minutes: i32 = text.get(4..6)?.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn write_date(f: &mut fmt::Formatter, date: &NaiveDate) -> fmt::Result {
    if PLAIN_YEARS.contains(&date.year()) {
        write!(f, "{:04}", date.year())?;
    } else {
        write!(f, "{:+05}", date.year())?;
    }
    write!(f, "-{:02}-{:02}", date.month(), date.day())
}

fn write_time(f: &mut fmt::Formatter, time: &NaiveTime) -> fmt::Result {
    write!(f, "{:02}:{:02}:{:02}", time.hour(), time.minute(), time.second())?;
    // Leap seconds carry an extra second in the nanosecond field
    let micros = (time.nanosecond() % NANOS_PER_SEC) / NANOS_PER_MICRO;
    if micros != 0 {
        write!(f, ".{:06}", micros)?;
    }
    Ok(())
}

fn write_offset(f: &mut fmt::Formatter, offset: FixedOffset) -> fmt::Result {
    let secs = offset.local_minus_utc();
    let sign = if secs < 0 { '-' } else { '+' };
    let secs = secs.abs();
    write!(f, "{}{:02}:{:02}", sign, secs / 3600, (secs % 3600) / 60)
}
