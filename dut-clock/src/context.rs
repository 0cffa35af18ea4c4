//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::time::Duration;

use dut_utils::runner::{CommandRunner, HostSet};
use dut_utils::step;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::catalog::TimezoneCatalog;
use crate::consts::ClockConsts;
use crate::debug::Debug;
use crate::error::Error;
use crate::parser::{HostTimezone, ShowClock};
use crate::validators;
use crate::verifier;

/// Everything a clock test needs, passed explicitly to each scenario.
#[derive(Debug)]
pub struct TestCxt {
    pub runner: CommandRunner,
    pub hosts: HostSet,
    pub consts: ClockConsts,
    pub ntp_server: Option<String>,
    pub rng: StdRng,
    catalog: Option<TimezoneCatalog>,
}

// ===== impl TestCxt =====

impl TestCxt {
    pub fn new(
        runner: CommandRunner,
        hosts: HostSet,
        consts: ClockConsts,
        ntp_server: Option<String>,
        seed: u64,
    ) -> TestCxt {
        TestCxt {
            runner,
            hosts,
            consts,
            ntp_server,
            rng: StdRng::seed_from_u64(seed),
            catalog: None,
        }
    }

    /// Runs the clock-display command and parses its output.
    ///
    /// Only the structure and the date/time grammars are checked; see
    /// [`TestCxt::show_clock_verified`] for the timezone check.
    pub fn show_clock(&mut self) -> Result<ShowClock, Error> {
        let output = run_cmd(
            &mut self.runner,
            &self.hosts,
            &self.consts.commands.show_clock,
            None,
        )?;
        let record = step("Split output of show clock", || ShowClock::parse(&output))?;
        Debug::ShowClockParsed(&record).log();
        Ok(record)
    }

    /// Runs the clock-display command, parses its output and validates all
    /// three fields, including the timezone against the host's state.
    pub fn show_clock_verified(&mut self) -> Result<ShowClock, Error> {
        let record = self.show_clock()?;
        self.validate_timezone(record.timezone())?;
        Ok(record)
    }

    /// Reads the host's current timezone through timedatectl.
    pub fn host_timezone(&mut self) -> Result<HostTimezone, Error> {
        let output = run_cmd(
            &mut self.runner,
            &self.hosts,
            &self.consts.commands.timedatectl,
            None,
        )?;
        let host_tz = HostTimezone::from_timedatectl(&output)?;
        Debug::HostTimezone(&host_tz).log();
        Ok(host_tz)
    }

    /// Returns the list of valid timezones, fetching it from the host the
    /// first time.
    pub fn timezone_catalog(&mut self) -> Result<TimezoneCatalog, Error> {
        if let Some(catalog) = &self.catalog {
            return Ok(catalog.clone());
        }

        let output = step("Get list of valid timezones", || {
            run_cmd(
                &mut self.runner,
                &self.hosts,
                &self.consts.commands.show_clock_timezones,
                None,
            )
        })?;
        let catalog = TimezoneCatalog::parse(&output)?;
        Debug::CatalogLoaded(catalog.len()).log();
        self.catalog = Some(catalog.clone());
        Ok(catalog)
    }

    /// Verifies that a displayed timezone abbreviation belongs to a valid
    /// timezone currently configured on the host.
    pub fn validate_timezone(&mut self, abbreviation: &str) -> Result<(), Error> {
        step(&format!("Validate timezone \"{abbreviation}\""), || {
            let host_tz = self.host_timezone()?;
            let catalog = self.timezone_catalog()?;
            validators::validate_timezone(abbreviation, &host_tz, &catalog)?;
            Ok(())
        })
    }

    /// Verifies that the host is configured with the `expected` timezone and
    /// that `abbreviation` is its displayed abbreviation.
    pub fn verify_timezone_value(
        &mut self,
        expected: &str,
        abbreviation: &str,
    ) -> Result<(), Error> {
        step(
            &format!("Verify timezone \"{abbreviation}\" matches \"{expected}\""),
            || {
                let host_tz = self.host_timezone()?;
                validators::verify_value(
                    "timezone name",
                    &host_tz.name,
                    expected,
                    true,
                )?;
                validators::verify_value(
                    "timezone abbreviation",
                    &host_tz.abbreviation,
                    abbreviation,
                    true,
                )
            },
        )
    }

    /// Runs the set-timezone command.
    pub fn set_timezone(&mut self, timezone: &str) -> Result<String, Error> {
        run_cmd(
            &mut self.runner,
            &self.hosts,
            &self.consts.commands.config_clock_timezone,
            Some(timezone),
        )
    }

    /// Runs the set-date command. The input is passed unquoted.
    pub fn set_date(&mut self, input: &str) -> Result<String, Error> {
        run_cmd(
            &mut self.runner,
            &self.hosts,
            &self.consts.commands.config_clock_date,
            Some(input),
        )
    }

    /// Verifies the outcome of a configuration command against the
    /// configured success marker.
    pub fn verify_command(
        &self,
        output: &str,
        should_succeed: bool,
        expected_err: &str,
    ) -> Result<(), Error> {
        let msg = if should_succeed {
            "Verify that command succeeded".to_owned()
        } else {
            format!("Verify that command failed with \"{expected_err}\"")
        };
        step(&msg, || {
            verifier::verify_command(
                output,
                should_succeed,
                expected_err,
                &self.consts.messages.success,
            )
        })
    }

    /// Synchronizes the host clock with an NTP server, then removes the
    /// server from the configuration again.
    pub fn sync_with_ntp(&mut self, server: &str) -> Result<(), Error> {
        step(&format!("Sync with NTP server {server}"), || {
            let output = run_cmd(
                &mut self.runner,
                &self.hosts,
                &self.consts.commands.config_ntp_add,
                Some(server),
            )?;
            verifier::verify_substring(
                &self.consts.messages.ntp_add_success.render(server),
                &output,
            )?;

            let output = run_cmd(
                &mut self.runner,
                &self.hosts,
                &self.consts.commands.show_ntp,
                None,
            )?;
            let polling = self.consts.ntp.polling_regex.polling_interval(&output);
            let interval = polling.unwrap_or(self.consts.ntp.default_polling);
            Debug::NtpPolling(interval, polling.is_some()).log();
            std::thread::sleep(Duration::from_secs(interval));

            let output = run_cmd(
                &mut self.runner,
                &self.hosts,
                &self.consts.commands.config_ntp_del,
                Some(server),
            )?;
            verifier::verify_substring(
                &self.consts.messages.ntp_del_success.render(server),
                &output,
            )
        })
    }
}

// ===== global functions =====

/// Runs a command on the host set as a test step.
pub fn run_cmd(
    runner: &mut CommandRunner,
    hosts: &HostSet,
    command: &str,
    param: Option<&str>,
) -> Result<String, Error> {
    let msg = match param {
        Some(param) => format!("Run command \"{command}\" with param \"{param}\""),
        None => format!("Run command \"{command}\""),
    };
    step(&msg, || runner.run(hosts, command, param).map_err(Error::from))
}
