//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

#![warn(rust_2018_idioms)]

pub mod runner;
pub mod transport;

use tracing::{info, info_span};

// ===== global functions =====

/// Runs the given closure as a named test step.
///
/// The closure executes inside an `info_span!("step")`, and the start and end
/// of the step are logged regardless of the closure's outcome.
pub fn step<T, F>(msg: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let span = info_span!("step", %msg);
    let _guard = span.enter();
    info!("step start");
    let _end = StepEnd;
    f()
}

/// Renders an error along with its chain of sources.
pub fn with_source<E: std::error::Error>(error: E) -> String {
    if let Some(source) = error.source() {
        format!("{} ({})", error, with_source(source))
    } else {
        error.to_string()
    }
}

/// Shows empty strings as `''` so they stand out in assertion messages.
pub fn printable(value: &str) -> &str {
    if value.is_empty() { "''" } else { value }
}

// Logs the end of a step when dropped, so that unwinding still closes it.
struct StepEnd;

impl Drop for StepEnd {
    fn drop(&mut self) {
        info!("step end");
    }
}

// ===== unit tests =====
