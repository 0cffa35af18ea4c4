//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::{debug, debug_span, info};

use crate::parser::{HostTimezone, ShowClock};

// Clock test debug messages.
#[derive(Debug)]
pub enum Debug<'a> {
    ShowClockParsed(&'a ShowClock),
    HostTimezone(&'a HostTimezone),
    CatalogLoaded(usize),
    TimezoneSelected(&'a str),
    InvalidTimezoneSelected(&'a str),
    DateTimeSelected(&'a str),
    InvalidInputAttempt(&'a str, &'a str),
    GuardAcquire(&'static str, &'a str),
    GuardRelease(&'static str, &'a str),
    NtpPolling(u64, bool),
}

// ===== impl Debug =====

impl Debug<'_> {
    // Log debug message using the tracing API.
    pub(crate) fn log(&self) {
        match self {
            Debug::ShowClockParsed(record) => {
                debug!(
                    date = %record.date(),
                    time = %record.time(),
                    timezone = %record.timezone(),
                    "{}", self
                );
            }
            Debug::HostTimezone(host_tz) => {
                debug!(
                    name = %host_tz.name,
                    abbreviation = %host_tz.abbreviation,
                    "{}", self
                );
            }
            Debug::CatalogLoaded(count) => {
                debug!(%count, "{}", self);
            }
            Debug::TimezoneSelected(timezone)
            | Debug::InvalidTimezoneSelected(timezone) => {
                info!(%timezone, "{}", self);
            }
            Debug::DateTimeSelected(datetime) => {
                info!(%datetime, "{}", self);
            }
            Debug::InvalidInputAttempt(input, expected) => {
                info!(%input, %expected, "{}", self);
            }
            Debug::GuardAcquire(guard, value)
            | Debug::GuardRelease(guard, value) => {
                debug_span!("fixture", %guard).in_scope(|| {
                    debug!(%value, "{}", self);
                });
            }
            Debug::NtpPolling(interval, matched) => {
                debug!(%interval, %matched, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::ShowClockParsed(..) => {
                write!(f, "parsed clock output")
            }
            Debug::HostTimezone(..) => {
                write!(f, "host timezone")
            }
            Debug::CatalogLoaded(..) => {
                write!(f, "loaded valid timezones")
            }
            Debug::TimezoneSelected(..) => {
                write!(f, "selected new timezone")
            }
            Debug::InvalidTimezoneSelected(..) => {
                write!(f, "selected invalid timezone")
            }
            Debug::DateTimeSelected(..) => {
                write!(f, "selected date and time")
            }
            Debug::InvalidInputAttempt(..) => {
                write!(f, "trying invalid input")
            }
            Debug::GuardAcquire(..) => {
                write!(f, "acquiring")
            }
            Debug::GuardRelease(..) => {
                write!(f, "releasing")
            }
            Debug::NtpPolling(..) => {
                write!(f, "waiting for NTP synchronization")
            }
        }
    }
}
