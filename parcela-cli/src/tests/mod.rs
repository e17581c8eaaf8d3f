//! Shared test harness modules for the Parcela CLI.

use super::*;

mod helpers;
mod resolve_unit;
