//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::LazyLock as Lazy;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::catalog::TimezoneCatalog;
use crate::consts::{DISPLAY_DATE_FMT, INPUT_DATE_FMT, INPUT_TIME_FMT};
use crate::error::{Error, ValidationError};
use crate::parser::HostTimezone;

static INPUT_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").unwrap());
static TIME_24H: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{2}):([0-9]{2}):([0-9]{2})$").unwrap());
static TIME_12H: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2}):([0-9]{2}):([0-9]{2}) (AM|PM|am|pm)$").unwrap()
});

// ===== global functions =====

/// Parses a calendar date, either in the set-date input format
/// (`2023-04-12`) or in the clock display format (`Wed 12 Apr 2023`).
///
/// Impossible dates are rejected, as are display dates whose weekday does not
/// agree with the day.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let bad_date = || ValidationError::BadDate(value.to_owned());

    if let Some(captures) = INPUT_DATE.captures(value) {
        let year: i32 = captures[1].parse().map_err(|_| bad_date())?;
        let month: u32 = captures[2].parse().map_err(|_| bad_date())?;
        let day: u32 = captures[3].parse().map_err(|_| bad_date())?;
        return NaiveDate::from_ymd_opt(year, month, day).ok_or_else(bad_date);
    }

    NaiveDate::parse_from_str(value, DISPLAY_DATE_FMT).map_err(|_| bad_date())
}

/// Parses a time of day, either on the 24-hour clock (`14:14:28`) or on the
/// 12-hour clock (`02:14:28 PM`).
///
/// Two digits are required for every component and leap seconds are
/// rejected.
pub fn parse_time(value: &str) -> Result<NaiveTime, ValidationError> {
    let bad_time = || ValidationError::BadTime(value.to_owned());

    let (hour, minute, second) = if let Some(captures) = TIME_24H.captures(value)
    {
        let hour: u32 = captures[1].parse().map_err(|_| bad_time())?;
        let minute: u32 = captures[2].parse().map_err(|_| bad_time())?;
        let second: u32 = captures[3].parse().map_err(|_| bad_time())?;
        (hour, minute, second)
    } else if let Some(captures) = TIME_12H.captures(value) {
        let hour: u32 = captures[1].parse().map_err(|_| bad_time())?;
        let minute: u32 = captures[2].parse().map_err(|_| bad_time())?;
        let second: u32 = captures[3].parse().map_err(|_| bad_time())?;
        if !(1..=12).contains(&hour) {
            return Err(bad_time());
        }
        let pm = captures[4].eq_ignore_ascii_case("PM");
        (hour % 12 + if pm { 12 } else { 0 }, minute, second)
    } else {
        return Err(bad_time());
    };

    // `from_hms_opt` rejects hour 24 and minute/second 60.
    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(bad_time)
}

/// Checks that the given string is a real calendar date.
pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    parse_date(value).map(|_| ())
}

/// Checks that the given string is a well-formed time of day.
pub fn validate_time(value: &str) -> Result<(), ValidationError> {
    parse_time(value).map(|_| ())
}

/// Checks that the given abbreviation is the one of the host's current
/// timezone, and that this timezone is one of the valid timezones.
///
/// Abbreviations (`IDT`) and timezone names (`Asia/Jerusalem`) are different
/// strings, so the mapping between them comes from the host itself.
pub fn validate_timezone(
    abbreviation: &str,
    host_tz: &HostTimezone,
    catalog: &TimezoneCatalog,
) -> Result<(), ValidationError> {
    if !catalog.contains(&host_tz.name) {
        return Err(ValidationError::UnknownTimezone(host_tz.name.clone()));
    }
    if host_tz.abbreviation != abbreviation {
        return Err(ValidationError::TimezoneAbbrevMismatch(
            host_tz.abbreviation.clone(),
            abbreviation.to_owned(),
        ));
    }
    Ok(())
}

/// Converts a displayed date to the set-date input format.
///
/// e.g. "Wed 12 Apr 2023" -> "2023-04-12"
pub fn convert_show_clock_date(value: &str) -> Result<String, ValidationError> {
    parse_date(value).map(|date| date.format(INPUT_DATE_FMT).to_string())
}

/// Converts a displayed time to the set-date input format.
///
/// e.g. "02:14:28 PM" -> "14:14:28"
pub fn convert_show_clock_time(value: &str) -> Result<String, ValidationError> {
    parse_time(value).map(|time| time.format(INPUT_TIME_FMT).to_string())
}

/// Asserts that two values are equal (or different).
pub fn verify_value(
    subject: &str,
    expected: &str,
    actual: &str,
    should_be_equal: bool,
) -> Result<(), Error> {
    if (expected == actual) != should_be_equal {
        return Err(Error::ValueMismatch(
            subject.to_owned(),
            expected.to_owned(),
            actual.to_owned(),
            should_be_equal,
        ));
    }
    Ok(())
}

/// Asserts that two "YYYY-MM-DD HH:MM:SS" values designate the same moment.
///
/// Dates must be identical. Times may differ by at most `margin` seconds; a
/// zero margin requires identical times.
pub fn verify_datetime(
    expected: &str,
    actual: &str,
    margin: u64,
) -> Result<(), Error> {
    let expected_dt = parse_input_datetime(expected)?;
    let actual_dt = parse_input_datetime(actual)?;

    verify_value(
        "date",
        &expected_dt.date().format(INPUT_DATE_FMT).to_string(),
        &actual_dt.date().format(INPUT_DATE_FMT).to_string(),
        true,
    )?;

    let diff = (actual_dt.time() - expected_dt.time()).num_seconds().unsigned_abs();
    if diff > margin {
        return Err(Error::ValueMismatch(
            format!("time (allowed margin {margin}s, diff {diff}s)"),
            expected_dt.time().format(INPUT_TIME_FMT).to_string(),
            actual_dt.time().format(INPUT_TIME_FMT).to_string(),
            true,
        ));
    }

    Ok(())
}

/// Formats a date and time the way the set-date command takes them.
pub fn format_input_datetime(datetime: &NaiveDateTime) -> String {
    format!(
        "{} {}",
        datetime.format(INPUT_DATE_FMT),
        datetime.format(INPUT_TIME_FMT)
    )
}

// ===== helper functions =====

fn parse_input_datetime(value: &str) -> Result<NaiveDateTime, ValidationError> {
    let (date, time) = value
        .split_once(' ')
        .ok_or_else(|| ValidationError::BadDate(value.to_owned()))?;
    Ok(NaiveDateTime::new(parse_date(date)?, parse_time(time)?))
}

// ===== unit tests =====
