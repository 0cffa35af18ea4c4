//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

mod config;

use clap::{App, Arg};
use config::{Config, LoggingFileRotation, LoggingFmtStyle};
use dut_clock::context::TestCxt;
use dut_clock::scenarios::Scenario;
use dut_utils::runner::{CommandRunner, HostSet};
use dut_utils::transport::SshTransport;
use tracing::level_filters::LevelFilter;
use tracing::{error, info, info_span};
use tracing_appender::rolling;
use tracing_subscriber::Layer;
use tracing_subscriber::prelude::*;

fn init_tracing(config: &config::Logging) {
    // Enable logging to a file.
    let file = config.file.enabled.then(|| {
        let file_appender = match config.file.rotation {
            LoggingFileRotation::Never => {
                rolling::never(&config.file.dir, &config.file.name)
            }
            LoggingFileRotation::Hourly => {
                rolling::hourly(&config.file.dir, &config.file.name)
            }
            LoggingFileRotation::Daily => {
                rolling::daily(&config.file.dir, &config.file.name)
            }
        };

        let log_level_filter = LevelFilter::from_level(tracing::Level::TRACE);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_target(false)
            .with_thread_ids(config.file.fmt.show_thread_id)
            .with_file(config.file.fmt.show_source)
            .with_line_number(config.file.fmt.show_source)
            .with_ansi(config.file.fmt.colors);
        let layer = match config.file.fmt.style {
            LoggingFmtStyle::Compact => layer.compact().boxed(),
            LoggingFmtStyle::Full => layer.boxed(),
            LoggingFmtStyle::Json => layer.json().boxed(),
            LoggingFmtStyle::Pretty => layer.pretty().boxed(),
        };
        layer.with_filter(log_level_filter)
    });

    // Enable logging to stdout.
    let stdout = config.stdout.enabled.then(|| {
        let log_level_filter = LevelFilter::from_level(tracing::Level::TRACE);
        let layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(config.stdout.fmt.show_thread_id)
            .with_file(config.stdout.fmt.show_source)
            .with_line_number(config.stdout.fmt.show_source)
            .with_ansi(config.stdout.fmt.colors);
        let layer = match config.stdout.fmt.style {
            LoggingFmtStyle::Compact => layer.compact().boxed(),
            LoggingFmtStyle::Full => layer.boxed(),
            LoggingFmtStyle::Json => layer.json().boxed(),
            LoggingFmtStyle::Pretty => layer.pretty().boxed(),
        };
        layer.with_filter(log_level_filter)
    });

    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive("dut=debug".parse().unwrap())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(file)
        .with(stdout)
        .init();
}

fn build_version() -> String {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    match rustc_tools_util::get_version_info!().commit_hash {
        Some(hash) => format!("{VERSION} ({hash})"),
        None => VERSION.to_owned(),
    }
}

// Applies the command-line overrides on top of the configuration file.
fn apply_overrides(
    config: &mut Config,
    matches: &clap::ArgMatches<'_>,
) -> Result<(), String> {
    if let Some(seed) = matches.value_of("seed") {
        config.seed = Some(
            seed.parse()
                .map_err(|error| format!("invalid seed \"{seed}\": {error}"))?,
        );
    }
    if let Some(hosts) = matches.values_of("host") {
        config.hosts = hosts.map(str::to_owned).collect();
    }
    if let Some(scenarios) = matches.values_of("scenario") {
        config.scenarios = scenarios
            .map(str::parse)
            .collect::<Result<Vec<Scenario>, _>>()?;
    }
    if let Some(ntp_server) = matches.value_of("ntp-server") {
        config.ntp_server = Some(ntp_server.to_owned());
    }
    Ok(())
}

fn exit_with_error(msg: &str) -> ! {
    eprintln!("{msg}");
    std::process::exit(1);
}

// ===== main =====

fn main() {
    // Parse command-line parameters.
    let matches = App::new("Device clock conformance tests")
        .version(build_version().as_str())
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("file")
                .help("Specify an alternative configuration file."),
        )
        .arg(
            Arg::with_name("seed")
                .short("s")
                .long("seed")
                .value_name("u64")
                .help("Seed of the random input generator."),
        )
        .arg(
            Arg::with_name("host")
                .short("H")
                .long("host")
                .value_name("host")
                .multiple(true)
                .number_of_values(1)
                .help("Device under test (the first one is the primary host)."),
        )
        .arg(
            Arg::with_name("scenario")
                .long("scenario")
                .value_name("name")
                .multiple(true)
                .number_of_values(1)
                .possible_values(&Scenario::ALL.map(|scenario| scenario.name()))
                .help("Scenario to run (default: all)."),
        )
        .arg(
            Arg::with_name("ntp-server")
                .long("ntp-server")
                .value_name("address")
                .help("NTP server used to restore the clock after the tests."),
        )
        .get_matches();

    // Read configuration file.
    let config_file = matches.value_of("config");
    let mut config = Config::load(config_file)
        .unwrap_or_else(|error| exit_with_error(&error));
    if let Err(error) = apply_overrides(&mut config, &matches) {
        exit_with_error(&error);
    }

    // Initialize tracing.
    init_tracing(&config.logging);

    let Some(hosts) = HostSet::new(config.hosts.clone()) else {
        error!("no hosts configured");
        std::process::exit(1);
    };
    let transport = match SshTransport::new(config.ssh.into()) {
        Ok(transport) => transport,
        Err(error) => {
            error.log();
            std::process::exit(1);
        }
    };

    // Log the seed so that a failing run can be replayed.
    let seed = config.seed.unwrap_or_else(rand::random);
    info!(%seed, %hosts, "starting up");

    let runner = CommandRunner::new(Box::new(transport));
    let mut cxt =
        TestCxt::new(runner, hosts, config.clock, config.ntp_server, seed);

    // Run the selected scenarios in sequence.
    let mut failed = vec![];
    for scenario in &config.scenarios {
        let span = info_span!("scenario", name = %scenario);
        let _span_guard = span.enter();
        match scenario.run(&mut cxt) {
            Ok(()) => info!("scenario passed"),
            Err(error) => {
                error.log();
                error!("scenario failed");
                failed.push(*scenario);
            }
        }
    }

    // Print summary.
    for scenario in &config.scenarios {
        let status = if failed.contains(scenario) {
            "FAILED"
        } else {
            "PASSED"
        };
        println!("{:<24} {}", scenario.name(), status);
    }
    println!(
        "{} passed, {} failed",
        config.scenarios.len() - failed.len(),
        failed.len()
    );

    info!("exiting");
    if !failed.is_empty() {
        std::process::exit(1);
    }
}
