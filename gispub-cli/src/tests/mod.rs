//! Shared test harness modules for the gispub CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod adapters_unit;
mod helpers;
