//! Resolve `--since` / `--start` / `--end` into a concrete time window.

use std::sync::OnceLock;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use regex::Regex;

use crate::error::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DEFAULT_WINDOW_DAYS: i64 = 7;

/// An inclusive `[start, end]` window. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// Resolve user-supplied range expressions against `now`.
///
/// Precedence:
/// 1. `start` and `end` both set: two calendar dates; `since` is ignored.
/// 2. only `start` set: `[start, now]`.
/// 3. `since` set: `[now - since, now]`.
/// 4. nothing set: the trailing seven days.
///
/// Dates are read as midnight UTC, so `--end 2025-11-07` stops at the
/// beginning of that day.
pub fn resolve(since: &str, start: &str, end: &str, now: DateTime<Utc>) -> Result<TimeRange> {
    if !start.is_empty() && !end.is_empty() {
        let start_time = parse_date("start", start)?;
        let end_time = parse_date("end", end)?;
        if end_time < start_time {
            return Err(Error::InvertedRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        return Ok(TimeRange {
            start: start_time,
            end: end_time,
        });
    }

    if !start.is_empty() {
        let start_time = parse_date("start", start)?;
        return Ok(TimeRange {
            start: start_time,
            end: now,
        });
    }

    if !since.is_empty() {
        let duration = parse_duration(since)?;
        let start_time = now
            .checked_sub_signed(duration)
            .ok_or_else(|| Error::InvalidDuration {
                input: since.to_string(),
            })?;
        return Ok(TimeRange {
            start: start_time,
            end: now,
        });
    }

    Ok(TimeRange {
        start: now - Duration::days(DEFAULT_WINDOW_DAYS),
        end: now,
    })
}

fn parse_date(field: &'static str, input: &str) -> Result<DateTime<Utc>> {
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::InvalidDate {
            field,
            input: input.to_string(),
        })
}

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)([hdw])$").expect("duration pattern is valid"))
}

/// Parse `24h`, `7d` or `2w`. No other units, signs, decimals or combinations.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let invalid = || Error::InvalidDuration {
        input: input.to_string(),
    };

    let captures = duration_pattern().captures(input).ok_or_else(invalid)?;
    let value: i64 = captures[1].parse().map_err(|_| invalid())?;

    let duration = match &captures[2] {
        "h" => Duration::try_hours(value),
        "d" => Duration::try_days(value),
        "w" => Duration::try_weeks(value),
        _ => None,
    };
    duration.ok_or_else(invalid)
}

pub fn format_date(at: DateTime<Utc>) -> String {
    at.format(DATE_FORMAT).to_string()
}

pub fn format_date_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

pub fn format_time(at: DateTime<Utc>) -> String {
    at.format("%H:%M").to_string()
}
