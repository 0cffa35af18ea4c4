//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod stub;

use std::sync::Once;

use dut_utils::runner::{CommandRunner, HostSet};
use tracing::info;

use crate::consts::ClockConsts;
use crate::context::TestCxt;
use crate::test::stub::SimulatedDut;

static INIT: Once = Once::new();

// Seed used by tests that don't care about the random selections.
pub const TEST_SEED: u64 = 0x5eed;

// ===== helper functions =====

// Initializes tracing subscriber.
fn init_tracing() {
    tracing_subscriber::fmt::Subscriber::builder()
        .with_target(false)
        .with_ansi(false)
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("starting");
}

// ===== global functions =====

// Common initialization required by all tests.
pub fn setup() {
    INIT.call_once(|| {
        init_tracing();
    });
}

/// Builds a test context talking to the given simulated device.
pub fn test_cxt(
    dut: &SimulatedDut,
    consts: ClockConsts,
    ntp_server: Option<&str>,
    seed: u64,
) -> TestCxt {
    let runner = CommandRunner::new(Box::new(dut.clone()));
    let hosts = HostSet::single(SimulatedDut::HOSTNAME);
    TestCxt::new(runner, hosts, consts, ntp_server.map(str::to_owned), seed)
}
