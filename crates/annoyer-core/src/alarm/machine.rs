//! Alarm state machine.
//!
//! A wall-clock-based machine with two states. It has no internal thread;
//! the caller passes the current time into every `evaluate()`.
//!
//! ## State Transitions
//!
//! ```text
//! Waiting --(p > threshold)--> Alarming
//! Alarming --(p <= threshold)--> Waiting
//! any --(restart)--> Waiting
//! ```
//!
//! Transitions are level-triggered: each evaluation compares the current
//! probability against the current threshold, so a threshold change takes
//! effect at the next evaluation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::probability::probability;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmState {
    Waiting,
    Alarming,
}

/// Sound request produced by an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmEffect {
    None,
    /// Entered `Alarming`.
    Start,
    /// Still `Alarming`; restart the sound if it ran out.
    EnsureActive,
    /// Left `Alarming`.
    Stop,
}

/// Start of the running period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodClock {
    start_time: DateTime<Utc>,
}

impl PeriodClock {
    pub fn start(now: DateTime<Utc>) -> Self {
        Self { start_time: now }
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Seconds since the period began, never negative.
    pub fn elapsed_sec(&self, now: DateTime<Utc>) -> f64 {
        let delta = now - self.start_time;
        let secs = match delta.num_microseconds() {
            Some(us) => us as f64 / 1_000_000.0,
            None => delta.num_milliseconds() as f64 / 1_000.0,
        };
        secs.max(0.0)
    }
}

/// One running period and its alarm state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmMachine {
    state: AlarmState,
    clock: PeriodClock,
    /// Time of the most recent evaluation.
    last_tick: DateTime<Utc>,
}

impl AlarmMachine {
    /// Begin a period at `now` in the `Waiting` state.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: AlarmState::Waiting,
            clock: PeriodClock::start(now),
            last_tick: now,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> AlarmState {
        self.state
    }

    pub fn clock(&self) -> &PeriodClock {
        &self.clock
    }

    pub fn last_tick(&self) -> DateTime<Utc> {
        self.last_tick
    }

    /// Elapsed seconds as of the last evaluation.
    pub fn elapsed_sec(&self) -> f64 {
        self.clock.elapsed_sec(self.last_tick)
    }

    /// Probability as of the last evaluation.
    pub fn probability(&self, base_period_sec: f64) -> f64 {
        probability(self.elapsed_sec(), base_period_sec)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Advance to `now` and compare the probability with `threshold`.
    pub fn evaluate(
        &mut self,
        now: DateTime<Utc>,
        threshold: f64,
        base_period_sec: f64,
    ) -> AlarmEffect {
        self.last_tick = now;
        let p = self.probability(base_period_sec);
        match self.state {
            AlarmState::Waiting => {
                if p > threshold {
                    tracing::debug!(probability = p, threshold, "alarm raised");
                    self.state = AlarmState::Alarming;
                    AlarmEffect::Start
                } else {
                    AlarmEffect::None
                }
            }
            AlarmState::Alarming => {
                if p <= threshold {
                    tracing::debug!(probability = p, threshold, "alarm cleared");
                    self.state = AlarmState::Waiting;
                    AlarmEffect::Stop
                } else {
                    AlarmEffect::EnsureActive
                }
            }
        }
    }

    /// Re-run the comparison at the last evaluation time, after a setting
    /// changed between ticks.
    pub fn reevaluate(&mut self, threshold: f64, base_period_sec: f64) -> AlarmEffect {
        self.evaluate(self.last_tick, threshold, base_period_sec)
    }

    /// Start a new period at `now`. Returns the state the old period ended in.
    pub fn restart(&mut self, now: DateTime<Utc>) -> AlarmState {
        let previous = self.state;
        self.state = AlarmState::Waiting;
        self.clock = PeriodClock::start(now);
        self.last_tick = now;
        previous
    }
}
