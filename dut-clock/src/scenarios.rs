//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::str::FromStr;

use dut_utils::step;
use serde::Deserialize;

use crate::consts::{INPUT_DATE_FMT, INPUT_TIME_FMT, Messages};
use crate::context::TestCxt;
use crate::debug::Debug;
use crate::error::Error;
use crate::fixtures::{TimeRestoreGuard, TimezoneGuard};
use crate::random;
use crate::validators;

/// Clock test scenarios.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    ShowClock,
    ConfigClockTimezone,
    ConfigClockDate,
}

// ===== impl Scenario =====

impl Scenario {
    pub const ALL: [Scenario; 3] = [
        Scenario::ShowClock,
        Scenario::ConfigClockTimezone,
        Scenario::ConfigClockDate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::ShowClock => "show-clock",
            Scenario::ConfigClockTimezone => "config-clock-timezone",
            Scenario::ConfigClockDate => "config-clock-date",
        }
    }

    pub fn run(&self, cxt: &mut TestCxt) -> Result<(), Error> {
        match self {
            Scenario::ShowClock => test_show_clock(cxt),
            Scenario::ConfigClockTimezone => test_config_clock_timezone(cxt),
            Scenario::ConfigClockDate => test_config_clock_date(cxt),
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Scenario, String> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == s)
            .ok_or_else(|| format!("unknown scenario \"{s}\""))
    }
}

// ===== global functions =====

/// Checks that the clock-display output is well-formed.
///
/// 1. Run show clock
/// 2. Validate date, time and timezone
pub fn test_show_clock(cxt: &mut TestCxt) -> Result<(), Error> {
    let mut cxt = TimezoneGuard::acquire(cxt)?;

    step("Run show clock and verify info is valid", || {
        cxt.show_clock_verified()
    })?;

    Ok(())
}

/// Checks that the set-timezone command works.
///
/// 1. Set a new valid timezone
/// 2. Verify the timezone changed
/// 3. Set an invalid timezone
/// 4. Verify the timezone hasn't changed
pub fn test_config_clock_timezone(cxt: &mut TestCxt) -> Result<(), Error> {
    let mut cxt = TimezoneGuard::acquire(cxt)?;

    let catalog = cxt.timezone_catalog()?;
    let orig_timezone = cxt.host_timezone()?;

    let new_timezone = step("Select a random new valid timezone", || {
        catalog
            .choose_other(&mut cxt.rng, &orig_timezone.name)
            .map(str::to_owned)
            .ok_or_else(|| Error::NoCandidate(orig_timezone.name.clone()))
    })?;
    Debug::TimezoneSelected(&new_timezone).log();

    let output = step(&format!("Set the new timezone \"{new_timezone}\""), || {
        cxt.set_timezone(&new_timezone)
    })?;
    cxt.verify_command(&output, true, "")?;

    let before = step(&format!("Verify timezone changed to \"{new_timezone}\""), || {
        let record = cxt.show_clock_verified()?;
        cxt.verify_timezone_value(&new_timezone, record.timezone())?;
        Ok::<_, Error>(record)
    })?;

    let invalid_timezone = step("Select a random string as invalid timezone", || {
        random::random_invalid_timezone(&mut cxt.rng, &catalog)
    });
    Debug::InvalidTimezoneSelected(&invalid_timezone).log();

    let output = step(
        &format!("Try to set the invalid timezone \"{invalid_timezone}\""),
        || cxt.set_timezone(&invalid_timezone),
    )?;
    let expected_err = cxt.consts.messages.bad_timezone.render(&invalid_timezone);
    cxt.verify_command(&output, false, &expected_err)?;

    step("Verify timezone has not changed", || {
        let after = cxt.show_clock_verified()?;
        cxt.verify_timezone_value(&new_timezone, after.timezone())?;
        validators::verify_value(
            "timezone",
            before.timezone(),
            after.timezone(),
            true,
        )
    })
}

/// Checks that the set-date command works.
///
/// 1. Set a new valid date and time
/// 2. Verify the date and time changed
/// 3. Try to set invalid dates and times
/// 4. Verify each attempt fails and leaves the clock unchanged
pub fn test_config_clock_date(cxt: &mut TestCxt) -> Result<(), Error> {
    let mut cxt = TimezoneGuard::acquire(cxt)?;
    let mut cxt = TimeRestoreGuard::acquire(&mut cxt)?;

    let (new_date, new_time) = step("Select valid date and time to set", || {
        let min_date = cxt.consts.min_date;
        let max_date = cxt.consts.max_date;
        let date = random::random_date(&mut cxt.rng, min_date, max_date);
        let time = random::random_time(&mut cxt.rng);
        (
            date.format(INPUT_DATE_FMT).to_string(),
            time.format(INPUT_TIME_FMT).to_string(),
        )
    });
    let new_datetime = format!("{new_date} {new_time}");
    Debug::DateTimeSelected(&new_datetime).log();

    let output = step(&format!("Set new date and time \"{new_datetime}\""), || {
        cxt.set_date(&new_datetime)
    })?;
    cxt.verify_command(&output, true, "")?;

    step(&format!("Verify date and time changed to \"{new_datetime}\""), || {
        let record = cxt.show_clock_verified()?;
        validators::verify_datetime(
            &new_datetime,
            &record.input_datetime()?,
            cxt.consts.time_margin,
        )
    })?;

    let random_len = cxt.consts.random_len;
    let rand_str = step("Select random string as invalid input", || {
        random::random_token(&mut cxt.rng, random_len)
    });
    let inputs = invalid_date_inputs(
        &cxt.consts.messages,
        &rand_str,
        &new_date,
        &new_time,
    );

    for (invalid_input, expected_err) in inputs {
        Debug::InvalidInputAttempt(&invalid_input, &expected_err).log();
        verify_failed_set_date(&mut cxt, &invalid_input, &expected_err)?;
    }

    Ok(())
}

/// Malformed set-date inputs, paired with the error each one must produce.
///
/// 1. No argument: missing date
/// 2. One nonsense token: missing time
/// 3. Two nonsense tokens: bad date and bad time
/// 4. Nonsense date with a valid time: bad date only
/// 5. Valid date with a nonsense time: bad time only
pub fn invalid_date_inputs(
    messages: &Messages,
    rand_str: &str,
    valid_date: &str,
    valid_time: &str,
) -> Vec<(String, String)> {
    vec![
        (String::new(), messages.missing_date.clone()),
        (rand_str.to_owned(), messages.missing_time.clone()),
        (
            format!("{rand_str} {rand_str}"),
            format!(
                "{}\n{}",
                messages.bad_date.render(rand_str),
                messages.bad_time.render(rand_str)
            ),
        ),
        (
            format!("{rand_str} {valid_time}"),
            messages.bad_date.render(rand_str),
        ),
        (
            format!("{valid_date} {rand_str}"),
            messages.bad_time.render(rand_str),
        ),
    ]
}

// ===== helper functions =====

// Tries an invalid set-date input and verifies that it fails with the expected
// error and that the clock shows the same value as right before the attempt.
fn verify_failed_set_date(
    cxt: &mut TestCxt,
    invalid_input: &str,
    expected_err: &str,
) -> Result<(), Error> {
    let before = step("Get show clock output before running the config command", || {
        cxt.show_clock_verified()
    })?;

    let output = step(&format!("Try to set \"{invalid_input}\""), || {
        cxt.set_date(invalid_input)
    })?;

    let after = step("Get show clock output after running the config command", || {
        cxt.show_clock_verified()
    })?;

    cxt.verify_command(&output, false, expected_err)?;

    step(
        &format!("Verify date and time have not changed (still \"{before}\")"),
        || {
            validators::verify_datetime(
                &before.input_datetime()?,
                &after.input_datetime()?,
                cxt.consts.time_margin,
            )
        },
    )
}
