//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

#![allow(clippy::derivable_impls)]

use dut_clock::consts::ClockConsts;
use dut_clock::scenarios::Scenario;
use dut_utils::transport::SshConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub hosts: Vec<String>,
    pub seed: Option<u64>,
    pub ntp_server: Option<String>,
    pub scenarios: Vec<Scenario>,
    pub ssh: Ssh,
    pub logging: Logging,
    pub clock: ClockConsts,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Ssh {
    pub binary: String,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub connect_timeout: Option<u64>,
    pub options: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Logging {
    pub file: LoggingFile,
    pub stdout: LoggingStdout,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingFile {
    pub enabled: bool,
    pub dir: String,
    pub name: String,
    pub rotation: LoggingFileRotation,
    #[serde(flatten)]
    pub fmt: LoggingFmt,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingStdout {
    pub enabled: bool,
    #[serde(flatten)]
    pub fmt: LoggingFmt,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingFmt {
    pub style: LoggingFmtStyle,
    pub colors: bool,
    pub show_thread_id: bool,
    pub show_source: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingFileRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingFmtStyle {
    Compact,
    Full,
    Json,
    Pretty,
}

// ===== impl Config =====

impl Config {
    const DFLT_FILEPATH: &'static str = "/etc/dut-clock-test.toml";

    pub(crate) fn load(config_file: Option<&str>) -> Result<Config, String> {
        let config_file = config_file.unwrap_or(Config::DFLT_FILEPATH);

        match std::fs::read_to_string(config_file) {
            Ok(config_str) => toml::from_str(&config_str).map_err(|error| {
                format!("Failed to parse configuration file: {error}")
            }),
            Err(err) => {
                eprintln!("Failed to load configuration file: {err}");
                eprintln!("Falling back to default configuration...");
                Ok(Config::default())
            }
        }
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            hosts: vec![],
            seed: None,
            ntp_server: None,
            scenarios: Scenario::ALL.to_vec(),
            ssh: Default::default(),
            logging: Default::default(),
            clock: Default::default(),
        }
    }
}

// ===== impl Ssh =====

impl Default for Ssh {
    fn default() -> Ssh {
        let dflt = SshConfig::default();
        Ssh {
            binary: dflt.binary,
            user: dflt.user,
            port: dflt.port,
            connect_timeout: dflt.connect_timeout,
            options: dflt.options,
        }
    }
}

impl From<Ssh> for SshConfig {
    fn from(ssh: Ssh) -> SshConfig {
        SshConfig::new(
            ssh.binary,
            ssh.user,
            ssh.port,
            ssh.connect_timeout,
            ssh.options,
        )
    }
}

// ===== impl LoggingFile =====

impl Default for LoggingFile {
    fn default() -> LoggingFile {
        LoggingFile {
            enabled: false,
            dir: "/var/log".to_owned(),
            name: "dut-clock-test.log".to_owned(),
            rotation: Default::default(),
            fmt: Default::default(),
        }
    }
}

// ===== impl LoggingStdout =====

impl Default for LoggingStdout {
    fn default() -> LoggingStdout {
        LoggingStdout {
            enabled: true,
            fmt: Default::default(),
        }
    }
}

// ===== impl LoggingFmt =====

impl Default for LoggingFmt {
    fn default() -> LoggingFmt {
        LoggingFmt {
            style: LoggingFmtStyle::Full,
            colors: false,
            show_thread_id: false,
            show_source: false,
        }
    }
}

// ===== unit tests =====
