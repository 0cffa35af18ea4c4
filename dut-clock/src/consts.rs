//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

#![allow(clippy::derivable_impls)]

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;

// Key of the timezone row in the timedatectl output.
pub const TIMEDATECTL_TIME_ZONE: &str = "Time zone";

// Date and time formats accepted by the set-date command.
pub const INPUT_DATE_FMT: &str = "%Y-%m-%d";
pub const INPUT_TIME_FMT: &str = "%H:%M:%S";

// Date format printed by the clock-display command.
pub const DISPLAY_DATE_FMT: &str = "%a %d %b %Y";

/// Device-defined constants used by the clock tests.
///
/// Command strings, the success marker and the error message templates are
/// firmware specific, so all of them can be overridden from the configuration
/// file.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClockConsts {
    pub commands: Commands,
    pub messages: Messages,
    pub test_timezone: String,
    pub time_margin: u64,
    pub random_len: usize,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub ntp: Ntp,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Commands {
    pub show_clock: String,
    pub show_clock_timezones: String,
    pub config_clock_timezone: String,
    pub config_clock_date: String,
    pub timedatectl: String,
    pub show_ntp: String,
    pub config_ntp_add: String,
    pub config_ntp_del: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Messages {
    pub success: String,
    pub bad_timezone: Template,
    pub missing_date: String,
    pub missing_time: String,
    pub bad_date: Template,
    pub bad_time: Template,
    pub ntp_add_success: Template,
    pub ntp_del_success: Template,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Ntp {
    pub polling_regex: PollingRegex,
    pub default_polling: u64,
}

/// Message with exactly one `{}` placeholder.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(try_from = "String")]
pub struct Template(String);

/// Regular expression whose first capture group is the NTP polling interval,
/// in seconds.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "String")]
pub struct PollingRegex(Regex);

// ===== impl ClockConsts =====

impl Default for ClockConsts {
    fn default() -> ClockConsts {
        ClockConsts {
            commands: Default::default(),
            messages: Default::default(),
            test_timezone: "Asia/Jerusalem".to_owned(),
            time_margin: 0,
            random_len: 6,
            min_date: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default(),
            max_date: NaiveDate::from_ymd_opt(2231, 12, 31).unwrap_or_default(),
            ntp: Default::default(),
        }
    }
}

// ===== impl Commands =====

impl Default for Commands {
    fn default() -> Commands {
        Commands {
            show_clock: "show clock".to_owned(),
            show_clock_timezones: "show clock timezones".to_owned(),
            config_clock_timezone: "config clock timezone".to_owned(),
            config_clock_date: "config clock date".to_owned(),
            timedatectl: "timedatectl".to_owned(),
            show_ntp: "show ntp".to_owned(),
            config_ntp_add: "config ntp add".to_owned(),
            config_ntp_del: "config ntp del".to_owned(),
        }
    }
}

// ===== impl Messages =====

impl Default for Messages {
    fn default() -> Messages {
        Messages {
            success: String::new(),
            bad_timezone: Template::fixed("Timezone {} does not conform format"),
            missing_date: r#"Error: Missing argument "<YYYY-MM-DD>""#.to_owned(),
            missing_time: r#"Error: Missing argument "<HH:MM:SS>""#.to_owned(),
            bad_date: Template::fixed(
                "Date {} does not conform format YYYY-MM-DD",
            ),
            bad_time: Template::fixed("Time {} does not conform format HH:MM:SS"),
            ntp_add_success: Template::fixed(
                "NTP server {} added to configuration\nRestarting ntp-config service...",
            ),
            ntp_del_success: Template::fixed(
                "NTP server {} removed from configuration\nRestarting ntp-config service...",
            ),
        }
    }
}

// ===== impl Ntp =====

impl Default for Ntp {
    fn default() -> Ntp {
        Ntp {
            polling_regex: PollingRegex::default(),
            default_polling: 6,
        }
    }
}

// ===== impl Template =====

impl Template {
    const PLACEHOLDER: &'static str = "{}";

    // Built-in templates are known to carry a single placeholder.
    fn fixed(template: &str) -> Template {
        Template(template.to_owned())
    }

    /// Substitutes the placeholder with the given value.
    pub fn render(&self, value: &str) -> String {
        self.0.replacen(Template::PLACEHOLDER, value, 1)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Template {
    type Error = String;

    fn try_from(template: String) -> Result<Template, String> {
        match template.matches(Template::PLACEHOLDER).count() {
            1 => Ok(Template(template)),
            count => Err(format!(
                "template \"{template}\" must contain exactly one \"{{}}\" placeholder (found {count})"
            )),
        }
    }
}

// ===== impl PollingRegex =====

impl PollingRegex {
    /// Extracts the polling interval from the NTP status output.
    pub fn polling_interval(&self, output: &str) -> Option<u64> {
        self.0
            .captures(output)
            .and_then(|captures| captures.get(1))
            .and_then(|interval| interval.as_str().parse().ok())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for PollingRegex {
    fn default() -> PollingRegex {
        // The built-in expression is a valid one.
        PollingRegex(
            Regex::new(r"polling server every ([0-9]+)")
                .expect("invalid built-in regex"),
        )
    }
}

impl TryFrom<String> for PollingRegex {
    type Error = String;

    fn try_from(regex: String) -> Result<PollingRegex, String> {
        let regex = Regex::new(&regex).map_err(|error| error.to_string())?;
        if regex.captures_len() < 2 {
            return Err(format!(
                "regex \"{}\" must contain a capture group",
                regex.as_str()
            ));
        }
        Ok(PollingRegex(regex))
    }
}

// ===== unit tests =====
