//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use dut_clock::consts::ClockConsts;
use dut_clock::error::{Error, ParseError};
use dut_clock::fixtures::{TimeRestoreGuard, TimezoneGuard};
use dut_clock::scenarios::Scenario;
use dut_clock::test::stub::Fault;
use dut_utils::transport::TransportError;

use super::*;

#[test]
fn state_drift_on_failed_date() {
    let dut = new_dut();
    let start = dut.utc();
    dut.inject(Fault::DriftOnFailure(30));
    let mut cxt = new_cxt(&dut);

    let result = Scenario::ConfigClockDate.run(&mut cxt);
    assert!(matches!(result, Err(Error::ValueMismatch(..))), "{result:?}");

    // Both guards still ran.
    let drift = (dut.utc() - start).num_seconds();
    assert!((0..=2).contains(&drift), "unexpected drift: {drift}s");
    assert_eq!(dut.timezone(), "Asia/Jerusalem");
}

#[test]
fn state_drift_within_margin() {
    let dut = new_dut();
    dut.inject(Fault::DriftOnFailure(2));
    let consts = ClockConsts {
        time_margin: 6,
        ..Default::default()
    };
    let mut cxt = test_cxt(&dut, consts, None, TEST_SEED);

    Scenario::ConfigClockDate.run(&mut cxt).unwrap();
}

#[test]
fn mangled_show_clock() {
    let dut = new_dut();
    dut.inject(Fault::MangleShowClock);
    let mut cxt = new_cxt(&dut);

    let result = Scenario::ShowClock.run(&mut cxt);
    assert!(
        matches!(result, Err(Error::Parse(ParseError::MissingFields(..)))),
        "{result:?}"
    );
}

#[test]
fn transport_down() {
    let dut = new_dut();
    dut.inject(Fault::TransportDown);
    let mut cxt = new_cxt(&dut);

    for scenario in Scenario::ALL {
        let result = scenario.run(&mut cxt);
        assert!(
            matches!(
                result,
                Err(Error::Transport(TransportError::ConnectionError(..)))
            ),
            "{result:?}"
        );
    }
    assert!(dut.commands().is_empty());
}

#[test]
fn noisy_success() {
    let dut = new_dut();
    dut.inject(Fault::NoisySuccess);
    let mut cxt = new_cxt(&dut);

    let result = Scenario::ConfigClockTimezone.run(&mut cxt);
    assert!(
        matches!(result, Err(Error::CommandFailureMismatch(true, ..))),
        "{result:?}"
    );
}

#[test]
fn invalid_timezone_accepted() {
    let dut = new_dut();
    dut.inject(Fault::AcceptInvalidTimezone);
    let mut cxt = new_cxt(&dut);

    let result = Scenario::ConfigClockTimezone.run(&mut cxt);
    assert!(
        matches!(result, Err(Error::CommandFailureMismatch(false, ..))),
        "{result:?}"
    );
    assert_eq!(dut.timezone(), "Asia/Jerusalem");
}

#[test]
fn timezone_guard_restores_test_timezone() {
    let dut = new_dut();
    let mut cxt = new_cxt(&dut);

    {
        let mut guard = TimezoneGuard::acquire(&mut cxt).unwrap();
        assert_eq!(dut.timezone(), "Asia/Jerusalem");
        guard.set_timezone("Asia/Tokyo").unwrap();
        assert_eq!(dut.timezone(), "Asia/Tokyo");
    }

    assert_eq!(dut.timezone(), "Asia/Jerusalem");
}

#[test]
fn time_guard_restores_clock() {
    let dut = new_dut();
    let start = dut.utc();
    let mut cxt = new_cxt(&dut);

    {
        let mut guard = TimeRestoreGuard::acquire(&mut cxt).unwrap();
        guard.set_date("2000-01-01 00:00:00").unwrap();
        assert_eq!(dut.utc(), datetime(2000, 1, 1, 0, 0, 0));
    }

    let drift = (dut.utc() - start).num_seconds();
    assert!((0..=2).contains(&drift), "unexpected drift: {drift}s");
}

#[test]
fn guard_release_failure_is_not_fatal() {
    let dut = new_dut();
    let mut cxt = new_cxt(&dut);

    {
        let _guard = TimezoneGuard::acquire(&mut cxt).unwrap();
        dut.inject(Fault::TransportDown);
    }

    dut.clear_faults();
    Scenario::ShowClock.run(&mut cxt).unwrap();
}

#[test]
fn mismatch_message_shows_both_values() {
    let dut = new_dut();
    dut.inject(Fault::AcceptInvalidTimezone);
    let mut cxt = new_cxt(&dut);

    let error = Scenario::ConfigClockTimezone.run(&mut cxt).unwrap_err();
    let msg = error.to_string();
    assert!(msg.contains("Marker: ''"), "{msg}");
    assert!(msg.contains("Actual: ''"), "{msg}");
}
