//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use dut_utils::transport::TransportError;
use dut_utils::{printable, with_source};
use tracing::{error, warn};

// Clock test errors.
//
// All of them are fatal to the test case in which they occur.
#[derive(Debug)]
pub enum Error {
    Transport(TransportError),
    Parse(ParseError),
    Validation(ValidationError),
    // Expected success (true) or failure (false), success marker, output.
    CommandFailureMismatch(bool, String, String),
    // Expected substring, whole output.
    ErrorTextMismatch(String, String),
    // Subject, expected value, actual value, whether they should be equal.
    ValueMismatch(String, String, String, bool),
    NoCandidate(String),
}

// Errors found while parsing command output.
#[derive(Debug)]
pub enum ParseError {
    Empty,
    MissingFields(String, usize),
    BadField(ValidationError),
    MalformedRow(String),
    MissingKey(String),
    MalformedTimezone(String),
    EmptyCatalog,
}

// Values that do not conform to their grammar or to the host's state.
#[derive(Debug)]
pub enum ValidationError {
    BadDate(String),
    BadTime(String),
    UnknownTimezone(String),
    TimezoneAbbrevMismatch(String, String),
}

// ===== impl Error =====

impl Error {
    pub fn log(&self) {
        match self {
            Error::Transport(error) => {
                error.log();
            }
            Error::Parse(error) => {
                error!(error = %with_source(error), "{}", self);
            }
            Error::Validation(error) => {
                error.log();
            }
            Error::CommandFailureMismatch(expected_success, marker, output) => {
                error!(
                    %expected_success,
                    marker = %printable(marker),
                    output = %printable(output),
                    "{}", self
                );
            }
            Error::ErrorTextMismatch(expected, output) => {
                error!(%expected, output = %printable(output), "{}", self);
            }
            Error::ValueMismatch(subject, expected, actual, _) => {
                error!(
                    %subject,
                    expected = %printable(expected),
                    actual = %printable(actual),
                    "{}", self
                );
            }
            Error::NoCandidate(current) => {
                error!(%current, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Transport(error) => error.fmt(f),
            Error::Parse(error) => error.fmt(f),
            Error::Validation(error) => error.fmt(f),
            Error::CommandFailureMismatch(true, marker, output) => {
                write!(
                    f,
                    "command was expected to succeed\nExpected: {}\nActual: {}",
                    printable(marker),
                    printable(output)
                )
            }
            Error::CommandFailureMismatch(false, marker, output) => {
                write!(
                    f,
                    "command was expected to fail but returned the success marker\nMarker: {}\nActual: {}",
                    printable(marker),
                    printable(output)
                )
            }
            Error::ErrorTextMismatch(expected, output) => {
                write!(
                    f,
                    "output does not contain the expected substring\nExpected substring: \"{}\"\nGiven (whole) string: \"{}\"",
                    expected, output
                )
            }
            Error::ValueMismatch(subject, expected, actual, true) => {
                write!(
                    f,
                    "{} values are not equal\nExpected: {}\nActual: {}",
                    subject,
                    printable(expected),
                    printable(actual)
                )
            }
            Error::ValueMismatch(subject, expected, actual, false) => {
                write!(
                    f,
                    "{} values are equal\nExpected different from: {}\nActual: {}",
                    subject,
                    printable(expected),
                    printable(actual)
                )
            }
            Error::NoCandidate(current) => {
                write!(f, "no valid timezone other than {current}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport(error) => Some(error),
            Error::Parse(error) => Some(error),
            Error::Validation(error) => Some(error),
            _ => None,
        }
    }
}

impl From<TransportError> for Error {
    fn from(error: TransportError) -> Error {
        Error::Transport(error)
    }
}

impl From<ParseError> for Error {
    fn from(error: ParseError) -> Error {
        Error::Parse(error)
    }
}

impl From<ValidationError> for Error {
    fn from(error: ValidationError) -> Error {
        Error::Validation(error)
    }
}

// ===== impl ParseError =====

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty output"),
            ParseError::MissingFields(line, found) => {
                write!(f, "missing fields in \"{line}\" ({found} tokens)")
            }
            ParseError::BadField(..) => write!(f, "malformed field"),
            ParseError::MalformedRow(row) => {
                write!(f, "row \"{row}\" is not a key-value pair")
            }
            ParseError::MissingKey(key) => write!(f, "missing key \"{key}\""),
            ParseError::MalformedTimezone(value) => {
                write!(f, "malformed timezone \"{value}\"")
            }
            ParseError::EmptyCatalog => write!(f, "empty timezone list"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::BadField(error) => Some(error),
            _ => None,
        }
    }
}

// ===== impl ValidationError =====

impl ValidationError {
    pub(crate) fn log(&self) {
        match self {
            ValidationError::BadDate(value)
            | ValidationError::BadTime(value)
            | ValidationError::UnknownTimezone(value) => {
                warn!(%value, "{}", self);
            }
            ValidationError::TimezoneAbbrevMismatch(expected, actual) => {
                warn!(%expected, %actual, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::BadDate(value) => {
                write!(f, "given string \"{value}\" is not a valid date")
            }
            ValidationError::BadTime(value) => {
                write!(f, "given string \"{value}\" is not a valid time")
            }
            ValidationError::UnknownTimezone(value) => {
                write!(f, "timezone \"{value}\" is not in the valid timezones list")
            }
            ValidationError::TimezoneAbbrevMismatch(expected, actual) => {
                write!(
                    f,
                    "timezone abbreviation mismatch\nExpected: {}\nActual: {}",
                    printable(expected),
                    printable(actual)
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
