//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use dut_utils::transport::{CommandOutput, Transport, TransportError};
use itertools::Itertools;

// Timezones known to the simulated device: name, abbreviation and UTC offset
// in minutes. Offsets are fixed (no DST transitions).
const ZONES: [(&str, &str, i64); 9] = [
    ("America/Inuvik", "MDT", -360),
    ("America/New_York", "EDT", -240),
    ("America/Sao_Paulo", "-03", -180),
    ("Asia/Jerusalem", "IDT", 180),
    ("Asia/Kolkata", "IST", 330),
    ("Asia/Tokyo", "JST", 540),
    ("Australia/Sydney", "AEST", 600),
    ("Etc/UTC", "UTC", 0),
    ("Europe/Berlin", "CEST", 120),
];

const SHOW_CLOCK_FMT: &str = "%a %d %b %Y %I:%M:%S %p";
const TIMEDATECTL_FMT: &str = "%a %Y-%m-%d %H:%M:%S";

/// In-memory device emulating the clock-related CLI of a network switch.
///
/// Clones share the same state, so a test keeps a handle to inspect and
/// tamper with the device while the test context owns another one as its
/// transport.
#[derive(Clone, Debug)]
pub struct SimulatedDut {
    state: Arc<Mutex<DutState>>,
}

/// Misbehaviors that can be injected into the simulated device.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Fault {
    // Failed set-date commands still move the clock by this many seconds.
    DriftOnFailure(i64),
    // The clock-display command prints garbage.
    MangleShowClock,
    // Every command fails at the transport level.
    TransportDown,
    // Successful configuration commands print a warning.
    NoisySuccess,
    // Unknown timezones are silently accepted.
    AcceptInvalidTimezone,
}

#[derive(Debug)]
struct DutState {
    utc: NaiveDateTime,
    timezone: &'static str,
    ntp_reference: Option<NaiveDateTime>,
    ntp_servers: BTreeSet<String>,
    ntp_polling: u64,
    faults: Vec<Fault>,
    commands: Vec<String>,
}

// ===== impl SimulatedDut =====

impl SimulatedDut {
    pub const HOSTNAME: &'static str = "dut1";

    pub fn new(utc: NaiveDateTime) -> SimulatedDut {
        let state = DutState {
            utc,
            timezone: "Etc/UTC",
            ntp_reference: None,
            ntp_servers: Default::default(),
            ntp_polling: 0,
            faults: Default::default(),
            commands: Default::default(),
        };
        SimulatedDut {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn utc(&self) -> NaiveDateTime {
        self.state().utc
    }

    pub fn timezone(&self) -> &'static str {
        self.state().timezone
    }

    /// Sets the time served by NTP servers added to the device.
    pub fn set_ntp_reference(&self, utc: NaiveDateTime) {
        self.state().ntp_reference = Some(utc);
    }

    pub fn ntp_servers(&self) -> BTreeSet<String> {
        self.state().ntp_servers.clone()
    }

    pub fn inject(&self, fault: Fault) {
        self.state().faults.push(fault);
    }

    pub fn clear_faults(&self) {
        self.state().faults.clear();
    }

    /// Commands received so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.state().commands.clone()
    }

    pub fn timezone_names() -> impl Iterator<Item = &'static str> {
        ZONES.iter().map(|(name, _, _)| *name)
    }

    fn state(&self) -> MutexGuard<'_, DutState> {
        self.state.lock().unwrap()
    }
}

impl Transport for SimulatedDut {
    fn exec(
        &mut self,
        host: &str,
        command: &str,
    ) -> Result<CommandOutput, TransportError> {
        let mut state = self.state();
        if state.has_fault(|fault| matches!(fault, Fault::TransportDown)) {
            return Err(TransportError::ConnectionError(
                host.to_owned(),
                format!("ssh: connect to host {host} port 22: Connection refused"),
            ));
        }
        state.commands.push(command.to_owned());
        Ok(state.exec(command))
    }
}

// ===== impl DutState =====

impl DutState {
    fn exec(&mut self, command: &str) -> CommandOutput {
        // Longer commands first, so "show clock" doesn't match
        // "show clock timezones".
        if let Some(args) = args(command, "show clock timezones") {
            self.show_clock_timezones(&args)
        } else if let Some(args) = args(command, "show clock") {
            self.show_clock(&args)
        } else if let Some(args) = args(command, "config clock timezone") {
            self.config_clock_timezone(&args)
        } else if let Some(args) = args(command, "config clock date") {
            self.config_clock_date(&args)
        } else if let Some(args) = args(command, "timedatectl") {
            self.timedatectl(&args)
        } else if let Some(args) = args(command, "show ntp") {
            self.show_ntp(&args)
        } else if let Some(args) = args(command, "config ntp add") {
            self.config_ntp_add(&args)
        } else if let Some(args) = args(command, "config ntp del") {
            self.config_ntp_del(&args)
        } else {
            failure("", &format!("Error: No such command \"{command}\"."))
        }
    }

    fn show_clock(&self, _args: &[&str]) -> CommandOutput {
        if self.has_fault(|fault| matches!(fault, Fault::MangleShowClock)) {
            return success("clock is not available");
        }

        let (_, abbreviation, _) = self.zone();
        success(&format!(
            "{} {}",
            self.local_time().format(SHOW_CLOCK_FMT),
            abbreviation
        ))
    }

    fn show_clock_timezones(&self, _args: &[&str]) -> CommandOutput {
        success(&SimulatedDut::timezone_names().join("\n"))
    }

    fn config_clock_timezone(&mut self, args: &[&str]) -> CommandOutput {
        const USAGE: &str = "config clock timezone [OPTIONS] <timezone>";

        let name = match args {
            [] => return failure(USAGE, r#"Error: Missing argument "<timezone>""#),
            [name] => *name,
            [_, extra, ..] => {
                return failure(
                    USAGE,
                    &format!("Error: Got unexpected extra argument ({extra})"),
                );
            }
        };

        match zone(name) {
            Some((name, _, _)) => {
                self.timezone = name;
                self.config_success()
            }
            None if self
                .has_fault(|fault| matches!(fault, Fault::AcceptInvalidTimezone)) =>
            {
                self.config_success()
            }
            None => failure(
                USAGE,
                &format!("Timezone {name} does not conform format"),
            ),
        }
    }

    fn config_clock_date(&mut self, args: &[&str]) -> CommandOutput {
        const USAGE: &str =
            "config clock date [OPTIONS] <YYYY-MM-DD> <HH:MM:SS>";

        let output = match args {
            [] => failure(USAGE, r#"Error: Missing argument "<YYYY-MM-DD>""#),
            [_] => failure(USAGE, r#"Error: Missing argument "<HH:MM:SS>""#),
            [date, time] => {
                let parsed_date = NaiveDate::parse_from_str(date, "%Y-%m-%d");
                let parsed_time = NaiveTime::parse_from_str(time, "%H:%M:%S");
                match (parsed_date, parsed_time) {
                    (Ok(date), Ok(time)) => {
                        let local = NaiveDateTime::new(date, time);
                        let (_, _, offset) = self.zone();
                        self.utc = local - TimeDelta::minutes(offset);
                        return self.config_success();
                    }
                    (parsed_date, parsed_time) => {
                        let mut errors = vec![];
                        if parsed_date.is_err() {
                            errors.push(format!(
                                "Date {date} does not conform format YYYY-MM-DD"
                            ));
                        }
                        if parsed_time.is_err() {
                            errors.push(format!(
                                "Time {time} does not conform format HH:MM:SS"
                            ));
                        }
                        failure(USAGE, &errors.join("\n"))
                    }
                }
            }
            [_, _, extra, ..] => failure(
                USAGE,
                &format!("Error: Got unexpected extra argument ({extra})"),
            ),
        };

        for fault in &self.faults {
            if let Fault::DriftOnFailure(seconds) = fault {
                self.utc += TimeDelta::seconds(*seconds);
            }
        }
        output
    }

    fn timedatectl(&self, _args: &[&str]) -> CommandOutput {
        let (name, abbreviation, offset) = self.zone();
        let local = self.local_time();
        let synchronized = if self.ntp_servers.is_empty() { "no" } else { "yes" };
        let ntp_service = if self.ntp_servers.is_empty() {
            "inactive"
        } else {
            "active"
        };

        success(&format!(
            "               Local time: {} {}\n           \
             Universal time: {} UTC\n                 \
             RTC time: {}\n                \
             Time zone: {} ({}, {})\n\
             System clock synchronized: {}\n              \
             NTP service: {}\n          \
             RTC in local mode: no",
            local.format(TIMEDATECTL_FMT),
            abbreviation,
            self.utc.format(TIMEDATECTL_FMT),
            self.utc.format(TIMEDATECTL_FMT),
            name,
            abbreviation,
            format_offset(offset),
            synchronized,
            ntp_service,
        ))
    }

    fn show_ntp(&self, _args: &[&str]) -> CommandOutput {
        match self.ntp_servers.first() {
            Some(server) => success(&format!(
                "synchronised to NTP server ({}) at stratum 2\n   \
                 time correct to within 12 ms\n   \
                 polling server every {} s",
                server, self.ntp_polling
            )),
            None => success("unsynchronised\n  time server re-starting\n   polling server every 8 s"),
        }
    }

    fn config_ntp_add(&mut self, args: &[&str]) -> CommandOutput {
        let [server] = args else {
            return failure("config ntp add <ntp_ip_address>", "Error: Invalid arguments");
        };
        self.ntp_servers.insert((*server).to_owned());
        if let Some(reference) = self.ntp_reference {
            self.utc = reference;
        }
        success(&format!(
            "NTP server {server} added to configuration\nRestarting ntp-config service..."
        ))
    }

    fn config_ntp_del(&mut self, args: &[&str]) -> CommandOutput {
        let [server] = args else {
            return failure("config ntp del <ntp_ip_address>", "Error: Invalid arguments");
        };
        if !self.ntp_servers.remove(*server) {
            return failure(
                "config ntp del <ntp_ip_address>",
                &format!("NTP server {server} is not configured."),
            );
        }
        success(&format!(
            "NTP server {server} removed from configuration\nRestarting ntp-config service..."
        ))
    }

    fn config_success(&self) -> CommandOutput {
        if self.has_fault(|fault| matches!(fault, Fault::NoisySuccess)) {
            return success("Warning: clock settings changed");
        }
        success("")
    }

    fn zone(&self) -> (&'static str, &'static str, i64) {
        // The current timezone always comes from the zone table.
        zone(self.timezone).unwrap_or(("Etc/UTC", "UTC", 0))
    }

    fn local_time(&self) -> NaiveDateTime {
        let (_, _, offset) = self.zone();
        self.utc + TimeDelta::minutes(offset)
    }

    fn has_fault(&self, f: impl Fn(&Fault) -> bool) -> bool {
        self.faults.iter().any(f)
    }
}

// ===== helper functions =====

// Returns the arguments following `command`, if `cmd_line` invokes it.
fn args<'a>(cmd_line: &'a str, command: &str) -> Option<Vec<&'a str>> {
    let rest = cmd_line.trim().strip_prefix(command)?;
    if !rest.is_empty() && !rest.starts_with(' ') {
        return None;
    }
    Some(rest.split_whitespace().collect())
}

fn zone(name: &str) -> Option<(&'static str, &'static str, i64)> {
    ZONES.iter().find(|(zone, _, _)| *zone == name).copied()
}

fn format_offset(minutes: i64) -> String {
    let sign = if minutes < 0 { '-' } else { '+' };
    let minutes = minutes.abs();
    format!("{}{:02}{:02}", sign, minutes / 60, minutes % 60)
}

fn success(stdout: &str) -> CommandOutput {
    CommandOutput::new(stdout.to_owned(), String::new(), true)
}

fn failure(usage: &str, error: &str) -> CommandOutput {
    let stderr = if usage.is_empty() {
        format!("{error}\n")
    } else {
        format!(
            "Usage: {usage}\nTry \"{} -h\" for help.\n\n{error}\n",
            usage.split(" [").next().unwrap_or(usage)
        )
    };
    CommandOutput::new(String::new(), stderr, false)
}
