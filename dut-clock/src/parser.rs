//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use derive_new::new;

use crate::consts::TIMEDATECTL_TIME_ZONE;
use crate::error::ParseError;
use crate::validators;

// Number of whitespace-separated tokens making up the displayed date
// ("Mon 03 Apr 2023").
const DATE_TOKENS: usize = 4;

/// Output of the clock-display command, split into its three fields.
///
/// e.g. "Mon 03 Apr 2023 11:29:46 AM UTC" ->
/// date "Mon 03 Apr 2023", time "11:29:46 AM", timezone "UTC"
///
/// A record is only ever built by [`ShowClock::parse`], which rejects
/// malformed dates and times, so all three fields are well-formed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShowClock {
    date: String,
    time: String,
    timezone: String,
}

/// Timezone currently configured on the host, as reported by timedatectl.
///
/// e.g. "America/Inuvik (MDT, -0600)" -> name "America/Inuvik",
/// abbreviation "MDT"
#[derive(Clone, Debug, Eq, PartialEq, new)]
pub struct HostTimezone {
    pub name: String,
    pub abbreviation: String,
}

// ===== impl ShowClock =====

impl ShowClock {
    /// Splits the clock-display output into date, time and timezone.
    ///
    /// The first non-empty line is used. Its first four tokens are the date,
    /// the next one is the time (followed by an AM/PM token on the 12-hour
    /// clock) and the remaining tokens are the timezone.
    pub fn parse(output: &str) -> Result<ShowClock, ParseError> {
        let line = output
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or(ParseError::Empty)?;
        let tokens = line.split_whitespace().collect::<Vec<_>>();
        let missing_fields =
            || ParseError::MissingFields(line.to_owned(), tokens.len());

        if tokens.len() < DATE_TOKENS + 2 {
            return Err(missing_fields());
        }
        let date = tokens[..DATE_TOKENS].join(" ");
        let (time, timezone) = match tokens.get(DATE_TOKENS + 1) {
            Some(token) if is_meridiem(token) => (
                tokens[DATE_TOKENS..DATE_TOKENS + 2].join(" "),
                &tokens[DATE_TOKENS + 2..],
            ),
            _ => (tokens[DATE_TOKENS].to_owned(), &tokens[DATE_TOKENS + 1..]),
        };
        if timezone.is_empty() {
            return Err(missing_fields());
        }
        let timezone = timezone.join(" ");

        validators::validate_date(&date).map_err(ParseError::BadField)?;
        validators::validate_time(&time).map_err(ParseError::BadField)?;

        Ok(ShowClock {
            date,
            time,
            timezone,
        })
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    /// Returns the displayed moment as a date-time value.
    pub fn naive_datetime(&self) -> Result<NaiveDateTime, ParseError> {
        let date = validators::parse_date(&self.date).map_err(ParseError::BadField)?;
        let time = validators::parse_time(&self.time).map_err(ParseError::BadField)?;
        Ok(NaiveDateTime::new(date, time))
    }

    /// Returns the displayed moment in the set-date input format
    /// ("YYYY-MM-DD HH:MM:SS").
    pub fn input_datetime(&self) -> Result<String, ParseError> {
        self.naive_datetime()
            .map(|datetime| validators::format_input_datetime(&datetime))
    }
}

impl std::fmt::Display for ShowClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.date, self.time, self.timezone)
    }
}

// ===== impl HostTimezone =====

impl HostTimezone {
    /// Parses the value of the timedatectl timezone row.
    pub fn parse(value: &str) -> Result<HostTimezone, ParseError> {
        let malformed = || ParseError::MalformedTimezone(value.to_owned());

        let (name, details) = value.trim().split_once(' ').ok_or_else(malformed)?;
        let details = details
            .trim()
            .strip_prefix('(')
            .and_then(|details| details.strip_suffix(')'))
            .ok_or_else(malformed)?;
        let abbreviation = details.split(',').next().unwrap_or_default().trim();
        if abbreviation.is_empty() {
            return Err(malformed());
        }

        Ok(HostTimezone::new(name.to_owned(), abbreviation.to_owned()))
    }

    /// Extracts the host timezone from the full timedatectl output.
    pub fn from_timedatectl(output: &str) -> Result<HostTimezone, ParseError> {
        let rows = parse_key_value(output)?;
        let value = rows
            .get(TIMEDATECTL_TIME_ZONE)
            .ok_or_else(|| ParseError::MissingKey(TIMEDATECTL_TIME_ZONE.to_owned()))?;
        HostTimezone::parse(value)
    }
}

// ===== global functions =====

/// Parses "Key: value" rows, one per line, into a map.
///
/// Rows are split at their first colon and both sides are trimmed. Empty lines
/// are skipped.
pub fn parse_key_value(
    output: &str,
) -> Result<BTreeMap<String, String>, ParseError> {
    output
        .lines()
        .map(str::trim)
        .filter(|row| !row.is_empty())
        .map(|row| {
            let (key, value) = row
                .split_once(':')
                .ok_or_else(|| ParseError::MalformedRow(row.to_owned()))?;
            Ok((key.trim().to_owned(), value.trim().to_owned()))
        })
        .collect()
}

// ===== helper functions =====

fn is_meridiem(token: &str) -> bool {
    token.eq_ignore_ascii_case("AM") || token.eq_ignore_ascii_case("PM")
}

// ===== unit tests =====
