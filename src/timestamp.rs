// 🕐 Timestamp Parser - heterogeneous attendance export timestamps
//
// Four layouts, chosen by content:
//   AM/PM present, len >= 21 → "MM/DD/YYYY hh:mm:ss AM"
//   AM/PM present, len <  21 → "MM/DD/YYYY hh:mm AM"
//   no marker,     len >= 19 → "MM/DD/YYYY HH:mm:ss"
//   no marker,     len <  19 → "MM/DD/YYYY HH:mm"
//
// The length thresholds assume 2-digit month/day/hour. One-digit variants can
// be routed to the wrong layout; the dispatch lives in TimestampLayout::detect
// so it can be swapped for try-each-layout parsing without touching callers.

use crate::error::{PresenceError, PresenceResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampLayout {
    TwelveHourWithSeconds,
    TwelveHour,
    TwentyFourHourWithSeconds,
    TwentyFourHour,
}

impl TimestampLayout {
    /// Pick a layout from the marker and character length of the input
    pub fn detect(value: &str) -> Self {
        let has_meridiem = value.contains("AM") || value.contains("PM");
        let len = value.chars().count();

        match (has_meridiem, len) {
            (true, len) if len >= 21 => TimestampLayout::TwelveHourWithSeconds,
            (true, _) => TimestampLayout::TwelveHour,
            (false, len) if len >= 19 => TimestampLayout::TwentyFourHourWithSeconds,
            (false, _) => TimestampLayout::TwentyFourHour,
        }
    }

    /// chrono format string for this layout
    pub fn format(&self) -> &'static str {
        match self {
            TimestampLayout::TwelveHourWithSeconds => "%m/%d/%Y %I:%M:%S %p",
            TimestampLayout::TwelveHour => "%m/%d/%Y %I:%M %p",
            TimestampLayout::TwentyFourHourWithSeconds => "%m/%d/%Y %H:%M:%S",
            TimestampLayout::TwentyFourHour => "%m/%d/%Y %H:%M",
        }
    }

    pub fn parse(&self, value: &str) -> PresenceResult<NaiveDateTime> {
        NaiveDateTime::parse_from_str(value, self.format())
            .map_err(|e| PresenceError::format(value, format!("{:?} layout: {}", self, e)))
    }
}

/// Parse an attendance timestamp via the detected layout
pub fn parse_timestamp(value: &str) -> PresenceResult<NaiveDateTime> {
    TimestampLayout::detect(value).parse(value)
}

/// Parse the leading `MM/DD/YYYY` of a timestamp
pub fn parse_date_prefix(value: &str) -> PresenceResult<NaiveDate> {
    let prefix: String = value.chars().take(10).collect();
    NaiveDate::parse_from_str(&prefix, "%m/%d/%Y")
        .map_err(|e| PresenceError::format(value, format!("date prefix: {}", e)))
}

/// Parse a time of day such as "09:00 AM" (24-hour "09:00" also accepted)
pub fn parse_time_of_day(value: &str) -> PresenceResult<NaiveTime> {
    let trimmed = value.trim();

    NaiveTime::parse_from_str(trimmed, "%I:%M %p")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|e| PresenceError::format(value, format!("time of day: {}", e)))
}

// ============================================================================
// TESTS
// ============================================================================
