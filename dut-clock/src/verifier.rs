//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use enum_as_inner::EnumAsInner;

use crate::error::Error;

/// Result of a configuration command, as seen from its output.
#[derive(Clone, Debug, Eq, PartialEq, EnumAsInner)]
pub enum CommandOutcome {
    Success,
    Failure(String),
}

// ===== impl CommandOutcome =====

impl CommandOutcome {
    /// Classifies a command output. Only an output identical to the success
    /// marker counts as a success.
    pub fn classify(output: &str, success_marker: &str) -> CommandOutcome {
        if output == success_marker {
            CommandOutcome::Success
        } else {
            CommandOutcome::Failure(output.to_owned())
        }
    }
}

// ===== global functions =====

/// Verifies the outcome of a configuration command.
///
/// A command expected to succeed must return exactly the success marker. A
/// command expected to fail must return something else, and that output must
/// contain `expected_err` (the device may add diagnostic text around it).
pub fn verify_command(
    output: &str,
    should_succeed: bool,
    expected_err: &str,
    success_marker: &str,
) -> Result<(), Error> {
    match (CommandOutcome::classify(output, success_marker), should_succeed) {
        (CommandOutcome::Success, true) => Ok(()),
        (CommandOutcome::Failure(output), false) => {
            verify_substring(expected_err, &output)
        }
        (_, should_succeed) => Err(Error::CommandFailureMismatch(
            should_succeed,
            success_marker.to_owned(),
            output.to_owned(),
        )),
    }
}

/// Asserts that `whole` contains `expected_substr`.
pub fn verify_substring(expected_substr: &str, whole: &str) -> Result<(), Error> {
    if !whole.contains(expected_substr) {
        return Err(Error::ErrorTextMismatch(
            expected_substr.to_owned(),
            whole.to_owned(),
        ));
    }
    Ok(())
}

// ===== unit tests =====
