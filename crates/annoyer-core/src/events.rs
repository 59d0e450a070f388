use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alarm::{AlarmState, SoundUnavailable};
use crate::storage::HistoryRecord;

/// Every state change in the core produces an Event.
/// The UI polls the return values of `tick()` and the other commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    AlarmStarted {
        probability: f64,
        threshold: f64,
        elapsed_sec: f64,
        at: DateTime<Utc>,
    },
    AlarmStopped {
        probability: f64,
        threshold: f64,
        at: DateTime<Utc>,
    },
    /// The alarm is running silently.
    SoundUnavailable {
        reason: SoundUnavailable,
        at: DateTime<Utc>,
    },
    /// User pressed a stoplight button; the record is already persisted.
    PeriodCompleted {
        record: HistoryRecord,
        previous_period_sec: f64,
        new_period_sec: f64,
        at: DateTime<Utc>,
    },
    PeriodRestarted {
        at: DateTime<Utc>,
    },
    HistoryCleared {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: AlarmState,
        probability: f64,
        threshold: f64,
        base_period_sec: f64,
        elapsed_sec: f64,
        predicted_wait_sec: f64,
        remaining_sec: f64,
        history_len: usize,
        at: DateTime<Utc>,
    },
}
