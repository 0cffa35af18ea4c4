//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

#![warn(rust_2018_idioms)]

pub mod catalog;
pub mod consts;
pub mod context;
pub mod debug;
pub mod error;
pub mod fixtures;
pub mod parser;
pub mod random;
pub mod scenarios;
#[cfg(feature = "testing")]
pub mod test;
pub mod validators;
pub mod verifier;
