//! Shared test harness modules for the swipe CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod greet_unit;
mod helpers;
mod run_unit;
