//! # Annoyer Core Library
//!
//! This library provides the engine behind Annoyer, a reminder that nags the
//! user to check in before they are likely to have drifted off task. The
//! alarm time is not a fixed countdown: it is the moment an exponential
//! time-to-distraction model crosses a user-chosen probability threshold.
//!
//! ## Architecture
//!
//! - **Probability model**: pure functions mapping elapsed time to the chance
//!   of distraction and back
//! - **Alarm state machine**: a wall-clock-based `Waiting`/`Alarming` machine
//!   that requires the caller to periodically invoke `tick()`
//! - **Adaptive controller**: nudges the model's period after every stoplight
//!   button press
//! - **Storage**: settings and the append-only history in one TOML file
//!
//! ## Key Components
//!
//! - [`Annoyer`]: Top-level controller the UI talks to
//! - [`Store`]: Settings and history persistence
//! - [`AlarmSound`]: Trait for the sound playback collaborator
//! - [`Event`]: Notifications returned from every command

pub mod adaptive;
pub mod alarm;
pub mod controller;
pub mod error;
pub mod events;
pub mod format;
pub mod probability;
pub mod storage;

pub use adaptive::adapt_period;
pub use alarm::{AlarmMachine, AlarmSound, AlarmState, PeriodClock, SilentSound, SoundUnavailable};
pub use controller::Annoyer;
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use format::format_duration;
pub use probability::{predicted_wait, probability, MAX_THRESHOLD};
pub use storage::{HistoryRecord, HistoryStats, Outcome, SettingKey, Settings, Store};
