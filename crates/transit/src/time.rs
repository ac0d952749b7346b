//! Conversions between schedule strings, wall-clock time and seconds since
//! midnight.
//!
//! This is the only place where calendar/time parsing happens. Everything
//! downstream works on plain seconds-of-day.

use chrono::{Local, NaiveTime, Timelike};

use crate::models::types::{Result, TransitError};

/// Seconds in one day
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Parse an "HH:mm" schedule entry into seconds since midnight.
///
/// Both fields must be two digits. Malformed entries are reported as
/// [`TransitError::InvalidTime`]; callers treat such a run as unavailable
/// rather than failing.
pub fn parse_time_to_seconds(text: &str) -> Result<u32> {
    let trimmed = text.trim();
    if trimmed.len() != 5 {
        return Err(TransitError::InvalidTime(text.to_string()));
    }
    let time = NaiveTime::parse_from_str(trimmed, "%H:%M")
        .map_err(|_| TransitError::InvalidTime(text.to_string()))?;
    Ok(time.hour() * 3600 + time.minute() * 60)
}

/// Parse a time of day given as "HH:mm:ss" or "HH:mm".
pub fn parse_clock(text: &str) -> Result<u32> {
    let trimmed = text.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .map(seconds_of_day)
        .or_else(|_| parse_time_to_seconds(trimmed))
        .map_err(|_| TransitError::InvalidTime(text.to_string()))
}

/// Seconds since midnight for a time of day, seconds included.
pub fn seconds_of_day(time: NaiveTime) -> u32 {
    time.hour() * 3600 + time.minute() * 60 + time.second()
}

/// Current local time of day in seconds since midnight.
pub fn now_in_seconds() -> u32 {
    seconds_of_day(Local::now().time())
}

/// Format seconds since midnight as "HH:mm:ss".
///
/// Values past midnight wrap around.
pub fn format_clock(seconds: u32) -> String {
    let s = seconds % SECONDS_PER_DAY;
    format!("{:02}:{:02}:{:02}", s / 3600, (s / 60) % 60, s % 60)
}

/// Short human readable countdown ("now", "45 s", "12 min", "1 h 5 m").
///
/// Negative values mean the vehicle has just passed the stop.
pub fn format_countdown(seconds: i64) -> String {
    if seconds < 0 {
        return "now".to_string();
    }
    if seconds < 60 {
        return format!("{} s", seconds);
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{} min", minutes);
    }
    format!("{} h {} m", minutes / 60, minutes % 60)
}
