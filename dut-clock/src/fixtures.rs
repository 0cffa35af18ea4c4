//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Scoped guards that put the device in a known state before a test and
//! restore it afterwards.
//!
//! Both guards dereference to the [`TestCxt`] they wrap, so a scenario keeps
//! using the context through the guard. Restoration happens when the guard is
//! dropped, on every exit path. Failures while restoring are logged since
//! there is nobody left to return them to.

use std::ops::{Deref, DerefMut};
use std::time::Instant;

use chrono::{NaiveDateTime, TimeDelta};
use dut_utils::step;

use crate::context::TestCxt;
use crate::debug::Debug;
use crate::error::Error;
use crate::validators;

/// Sets the test timezone before the test and again after it.
#[derive(Debug)]
pub struct TimezoneGuard<'a> {
    cxt: &'a mut TestCxt,
}

/// Restores the device clock after a test that changes it.
///
/// With an NTP server configured, the clock is resynchronized from it.
/// Otherwise the clock captured on acquisition, advanced by the time elapsed
/// since then, is set back.
#[derive(Debug)]
pub struct TimeRestoreGuard<'a> {
    cxt: &'a mut TestCxt,
    original: NaiveDateTime,
    acquired: Instant,
}

// ===== impl TimezoneGuard =====

impl<'a> TimezoneGuard<'a> {
    pub fn acquire(cxt: &'a mut TestCxt) -> Result<TimezoneGuard<'a>, Error> {
        let timezone = cxt.consts.test_timezone.clone();
        Debug::GuardAcquire("timezone", &timezone).log();
        step(&format!("Set timezone to {timezone} before test"), || {
            let output = cxt.set_timezone(&timezone)?;
            cxt.verify_command(&output, true, "")
        })?;

        Ok(TimezoneGuard { cxt })
    }

    fn release(&mut self) -> Result<(), Error> {
        let timezone = self.cxt.consts.test_timezone.clone();
        Debug::GuardRelease("timezone", &timezone).log();
        step(&format!("Set timezone to {timezone} after test"), || {
            let output = self.cxt.set_timezone(&timezone)?;
            self.cxt.verify_command(&output, true, "")
        })
    }
}

impl Deref for TimezoneGuard<'_> {
    type Target = TestCxt;

    fn deref(&self) -> &TestCxt {
        &*self.cxt
    }
}

impl DerefMut for TimezoneGuard<'_> {
    fn deref_mut(&mut self) -> &mut TestCxt {
        &mut *self.cxt
    }
}

impl Drop for TimezoneGuard<'_> {
    fn drop(&mut self) {
        if let Err(error) = self.release() {
            error.log();
        }
    }
}

// ===== impl TimeRestoreGuard =====

impl<'a> TimeRestoreGuard<'a> {
    pub fn acquire(cxt: &'a mut TestCxt) -> Result<TimeRestoreGuard<'a>, Error> {
        let record = step("Capture original time", || cxt.show_clock())?;
        let original = record.naive_datetime()?;
        Debug::GuardAcquire("time", &validators::format_input_datetime(&original))
            .log();

        Ok(TimeRestoreGuard {
            cxt,
            original,
            acquired: Instant::now(),
        })
    }

    fn release(&mut self) -> Result<(), Error> {
        match self.cxt.ntp_server.clone() {
            Some(server) => {
                Debug::GuardRelease("time", &server).log();
                self.cxt.sync_with_ntp(&server)
            }
            None => {
                let elapsed = TimeDelta::from_std(self.acquired.elapsed())
                    .unwrap_or(TimeDelta::zero());
                let target = validators::format_input_datetime(
                    &(self.original + TimeDelta::seconds(elapsed.num_seconds())),
                );
                Debug::GuardRelease("time", &target).log();
                step(&format!("Reset time to {target} after test"), || {
                    let output = self.cxt.set_date(&target)?;
                    self.cxt.verify_command(&output, true, "")
                })
            }
        }
    }
}

impl Deref for TimeRestoreGuard<'_> {
    type Target = TestCxt;

    fn deref(&self) -> &TestCxt {
        &*self.cxt
    }
}

impl DerefMut for TimeRestoreGuard<'_> {
    fn deref_mut(&mut self) -> &mut TestCxt {
        &mut *self.cxt
    }
}

impl Drop for TimeRestoreGuard<'_> {
    fn drop(&mut self) {
        if let Err(error) = self.release() {
            error.log();
        }
    }
}
