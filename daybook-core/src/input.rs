//! Parsing of user-supplied date, time and weekday strings.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::error::{DaybookError, DaybookResult};
use crate::occurrence::{DATE_FORMAT, TimeOfDay};

/// Parse YYYY-MM-DD
pub fn parse_date(s: &str) -> DaybookResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| DaybookError::InvalidDate(s.to_string()))
}

/// Parse HH:MM (24h clock)
pub fn parse_time(s: &str) -> DaybookResult<TimeOfDay> {
    let invalid = || DaybookError::InvalidTime(s.to_string());

    let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
    let hour: u8 = hour.trim().parse().map_err(|_| invalid())?;
    let minute: u8 = minute.trim().parse().map_err(|_| invalid())?;

    TimeOfDay::new(hour, minute).ok_or_else(invalid)
}

/// Like `parse_time`, but blank input means "no time" (all-day).
pub fn parse_optional_time(s: &str) -> DaybookResult<Option<TimeOfDay>> {
    if s.trim().is_empty() {
        return Ok(None);
    }
    parse_time(s).map(Some)
}

/// Parse a weekday list into indices 0 (Monday) through 6 (Sunday).
///
/// Accepts `all`, or comma separated short/full English names
/// (`mon,wed`, `tuesday, thu`).
pub fn parse_weekdays(s: &str) -> DaybookResult<BTreeSet<u8>> {
    let normalized = s.trim().to_lowercase();
    if normalized == "all" || normalized == "daily" {
        return Ok((0..7).collect());
    }

    let days = normalized
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| weekday_index(p).ok_or_else(|| DaybookError::InvalidWeekdays(s.to_string())))
        .collect::<DaybookResult<BTreeSet<u8>>>()?;

    if days.is_empty() {
        return Err(DaybookError::InvalidWeekdays(s.to_string()));
    }
    Ok(days)
}

fn weekday_index(name: &str) -> Option<u8> {
    match name {
        "mon" | "monday" => Some(0),
        "tue" | "tues" | "tuesday" => Some(1),
        "wed" | "wednesday" => Some(2),
        "thu" | "thur" | "thurs" | "thursday" => Some(3),
        "fri" | "friday" => Some(4),
        "sat" | "saturday" => Some(5),
        "sun" | "sunday" => Some(6),
        _ => None,
    }
}
