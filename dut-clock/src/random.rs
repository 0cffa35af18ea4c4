//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use rand::Rng;

use crate::catalog::TimezoneCatalog;

// Length bounds of generated invalid timezone names.
const INVALID_TIMEZONE_MIN_LEN: usize = 1;
const INVALID_TIMEZONE_MAX_LEN: usize = 10;

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

// ===== global functions =====

/// Selects a random date within `[min, max]`.
pub fn random_date<R>(rng: &mut R, min: NaiveDate, max: NaiveDate) -> NaiveDate
where
    R: Rng + ?Sized,
{
    let days = (max - min).num_days().max(0);
    min + TimeDelta::days(rng.random_range(0..=days))
}

/// Selects a random time of day, with one-second resolution.
pub fn random_time<R>(rng: &mut R) -> NaiveTime
where
    R: Rng + ?Sized,
{
    let seconds = rng.random_range(0..SECONDS_PER_DAY);
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap_or_default()
}

/// Generates a random string of lowercase ASCII letters.
pub fn random_token<R>(rng: &mut R, len: usize) -> String
where
    R: Rng + ?Sized,
{
    (0..len)
        .map(|_| char::from(rng.random_range(b'a'..=b'z')))
        .collect()
}

/// Generates a random lowercase string that is not a valid timezone.
pub fn random_invalid_timezone<R>(rng: &mut R, catalog: &TimezoneCatalog) -> String
where
    R: Rng + ?Sized,
{
    loop {
        let len = rng.random_range(INVALID_TIMEZONE_MIN_LEN..=INVALID_TIMEZONE_MAX_LEN);
        let name = random_token(rng, len);
        if !catalog.contains(&name) {
            return name;
        }
    }
}

// ===== unit tests =====
