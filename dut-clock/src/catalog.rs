//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::error::ParseError;

/// Set of timezone names accepted by the host.
///
/// The catalog is a read-only snapshot taken from the host's timezone listing
/// command. Names are kept sorted so that seeded selections are reproducible.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimezoneCatalog {
    names: BTreeSet<String>,
}

// ===== impl TimezoneCatalog =====

impl TimezoneCatalog {
    pub fn new(names: BTreeSet<String>) -> TimezoneCatalog {
        TimezoneCatalog { names }
    }

    /// Parses the whitespace-separated output of the timezone listing
    /// command.
    pub fn parse(output: &str) -> Result<TimezoneCatalog, ParseError> {
        let names = output
            .split_whitespace()
            .map(str::to_owned)
            .collect::<BTreeSet<_>>();
        if names.is_empty() {
            return Err(ParseError::EmptyCatalog);
        }
        Ok(TimezoneCatalog { names })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Picks a random timezone different from `current`.
    pub fn choose_other<R>(&self, rng: &mut R, current: &str) -> Option<&str>
    where
        R: Rng + ?Sized,
    {
        let candidates = self
            .iter()
            .filter(|name| *name != current)
            .collect::<Vec<_>>();
        candidates.choose(rng).copied()
    }
}

// ===== unit tests =====
