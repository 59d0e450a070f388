//! Heuristic period adjustment applied after every acknowledgement.
//!
//! Red shortens the expected time between distractions, green lengthens it,
//! yellow leaves it alone. The rule is the same whether the user pressed
//! early or silenced a ringing alarm.

use crate::storage::Outcome;

/// Multiplier applied to the base period per red/green press.
pub const PERIOD_STEP: f64 = 1.5;

/// New base period after the user reported `outcome`.
///
/// `alarm_was_on` is part of the signature so callers pass the context, but
/// early and late presses are adjusted identically.
pub fn adapt_period(period_sec: f64, outcome: Outcome, _alarm_was_on: bool) -> f64 {
    match outcome {
        Outcome::Red => period_sec / PERIOD_STEP,
        Outcome::Yellow => period_sec,
        Outcome::Green => period_sec * PERIOD_STEP,
    }
}
