//! Top-level controller.
//!
//! [`Annoyer`] owns the [`Store`], the [`AlarmMachine`] for the running
//! period and the [`AlarmSound`] collaborator. The UI drives it with
//! `tick()` at a fixed small interval and forwards button presses to
//! `acknowledge()`.
//!
//! Not thread-safe: the caller must serialize every call. Nothing here
//! blocks apart from the synchronous write of the storage file.
//!
//! ## Usage
//!
//! ```ignore
//! let store = Store::open_default()?;
//! let mut annoyer = Annoyer::new(store, SilentSound, Utc::now());
//! // In a loop:
//! for event in annoyer.tick(Utc::now()) { /* render */ }
//! // On a button press:
//! annoyer.acknowledge(Outcome::Green, Utc::now())?;
//! ```

use chrono::{DateTime, Utc};
use std::path::PathBuf;

use crate::adaptive::adapt_period;
use crate::alarm::{resolve_sound, AlarmEffect, AlarmMachine, AlarmSound, AlarmState};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::probability::{predicted_wait, remaining};
use crate::storage::{HistoryRecord, HistoryStats, Outcome, SettingKey, Settings, Store};

pub struct Annoyer<S: AlarmSound> {
    store: Store,
    machine: AlarmMachine,
    sound: S,
}

impl<S: AlarmSound> Annoyer<S> {
    /// Start the first period at `now`.
    pub fn new(store: Store, sound: S, now: DateTime<Utc>) -> Self {
        Self {
            store,
            machine: AlarmMachine::new(now),
            sound,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Probability of distraction as of the last tick.
    pub fn current_probability(&self) -> f64 {
        self.machine.probability(self.settings().base_period_sec)
    }

    pub fn current_state(&self) -> AlarmState {
        self.machine.state()
    }

    /// Seconds from period start until the threshold is crossed.
    pub fn predicted_wait_seconds(&self) -> f64 {
        let s = self.settings();
        predicted_wait(s.alarm_threshold, s.base_period_sec)
    }

    /// Seconds since the period began, as of the last tick.
    pub fn elapsed_seconds(&self) -> f64 {
        self.machine.elapsed_sec()
    }

    /// Countdown to the alarm, zero once it is due.
    pub fn remaining_seconds(&self) -> f64 {
        let s = self.settings();
        remaining(self.elapsed_seconds(), s.alarm_threshold, s.base_period_sec)
    }

    pub fn history(&self) -> &[HistoryRecord] {
        self.store.history()
    }

    pub fn stats(&self) -> HistoryStats {
        self.store.stats()
    }

    pub fn settings(&self) -> &Settings {
        self.store.settings()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn sound(&self) -> &S {
        &self.sound
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let s = self.settings();
        Event::StateSnapshot {
            state: self.current_state(),
            probability: self.current_probability(),
            threshold: s.alarm_threshold,
            base_period_sec: s.base_period_sec,
            elapsed_sec: self.elapsed_seconds(),
            predicted_wait_sec: self.predicted_wait_seconds(),
            remaining_sec: self.remaining_seconds(),
            history_len: self.history().len(),
            at: self.machine.last_tick(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Call periodically. Returns the events caused by this tick.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let s = self.store.settings();
        let effect = self
            .machine
            .evaluate(now, s.alarm_threshold, s.base_period_sec);
        self.dispatch(effect)
    }

    /// The user pressed a stoplight button.
    ///
    /// Silences the alarm, adapts the base period, appends the finished
    /// period to the history and starts a new period, whatever the state.
    ///
    /// # Errors
    /// Returns the write error if persisting fails. The record and the new
    /// period are kept in memory and the new period has started regardless.
    pub fn acknowledge(&mut self, outcome: Outcome, now: DateTime<Utc>) -> Result<Event> {
        self.sound.stop();
        let alarm_was_on = self.machine.state() == AlarmState::Alarming;

        let s = self.store.settings();
        let previous_period_sec = s.base_period_sec;
        let record = HistoryRecord {
            duration_sec: self.machine.clock().elapsed_sec(now),
            target_duration_sec: predicted_wait(s.alarm_threshold, s.base_period_sec),
            outcome,
            is_early: !alarm_was_on,
            recorded_at: Some(now),
        };
        let new_period_sec = adapt_period(previous_period_sec, outcome, alarm_was_on)
            .clamp(f64::MIN_POSITIVE, f64::MAX);

        tracing::info!(
            %outcome,
            early = record.is_early,
            duration_sec = record.duration_sec,
            previous_period_sec,
            new_period_sec,
            "period acknowledged"
        );

        self.machine.restart(now);
        self.store.complete_period(new_period_sec, record.clone())?;

        Ok(Event::PeriodCompleted {
            record,
            previous_period_sec,
            new_period_sec,
            at: now,
        })
    }

    /// Set the alarm threshold and re-check the alarm at the last tick.
    ///
    /// Pass `suppress_persist = true` while a drag is in progress and call
    /// [`flush`](Self::flush) when it ends.
    ///
    /// # Errors
    /// On a failed write the new value and the re-check still take effect,
    /// but the alarm events are not returned; query
    /// [`current_state`](Self::current_state) to resync.
    pub fn set_threshold(&mut self, value: f64, suppress_persist: bool) -> Result<Vec<Event>> {
        let value = Settings::checked_threshold(value)?;
        let written = self.store.set_threshold(value, suppress_persist);
        let events = self.reevaluate();
        written.map(|_| events)
    }

    /// Same error contract as [`set_threshold`](Self::set_threshold).
    pub fn set_period(&mut self, seconds: f64) -> Result<Vec<Event>> {
        let seconds = Settings::checked_period(seconds)?;
        let written = self.store.set_period(seconds);
        let events = self.reevaluate();
        written.map(|_| events)
    }

    /// Change or clear the alarm sound.
    ///
    /// Any playing sound is stopped; if the alarm is still on, the next tick
    /// starts the new one.
    pub fn set_sound(&mut self, sound: Option<PathBuf>) -> Result<Vec<Event>> {
        self.sound.stop();
        self.store.set_sound(sound)?;
        let mut events = Vec::new();
        if let Err(reason) = resolve_sound(self.settings().sound_ref.as_deref()) {
            tracing::warn!(%reason, "alarm will be silent");
            events.push(Event::SoundUnavailable {
                reason,
                at: self.machine.last_tick(),
            });
        }
        Ok(events)
    }

    pub fn set_show_graph(&mut self, show: bool) -> Result<()> {
        self.store.set_show_graph(show)
    }

    /// Flip `show_graph`, returning the new value.
    pub fn toggle_graph(&mut self) -> Result<bool> {
        let show = !self.settings().show_graph;
        self.store.set_show_graph(show)?;
        Ok(show)
    }

    /// Set any setting from its string form.
    pub fn set_setting(&mut self, key: SettingKey, value: &str) -> Result<Vec<Event>> {
        if key == SettingKey::Sound {
            return self.set_sound(Settings::parse_sound(value));
        }
        let written = self.store.set_by_key(key, value);
        if let Err(CoreError::Config(_) | CoreError::Validation(_)) = &written {
            return written.map(|_| Vec::new());
        }
        let events = self.reevaluate();
        written.map(|_| events)
    }

    pub fn clear_history(&mut self) -> Result<Event> {
        self.store.clear_history()?;
        Ok(Event::HistoryCleared {
            at: self.machine.last_tick(),
        })
    }

    /// Abandon the running period without recording it.
    pub fn restart_period(&mut self, now: DateTime<Utc>) -> Event {
        self.sound.stop();
        let previous = self.machine.restart(now);
        tracing::info!(?previous, "period restarted");
        Event::PeriodRestarted { at: now }
    }

    /// Write settings held back by `suppress_persist`.
    pub fn flush(&mut self) -> Result<()> {
        self.store.flush()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reevaluate(&mut self) -> Vec<Event> {
        let s = self.store.settings();
        let effect = self.machine.reevaluate(s.alarm_threshold, s.base_period_sec);
        self.dispatch(effect)
    }

    fn dispatch(&mut self, effect: AlarmEffect) -> Vec<Event> {
        let Self {
            store,
            machine,
            sound,
        } = self;
        let settings = store.settings();
        let at = machine.last_tick();
        let probability = machine.probability(settings.base_period_sec);
        let threshold = settings.alarm_threshold;
        let resolved = resolve_sound(settings.sound_ref.as_deref());

        match effect {
            AlarmEffect::None => Vec::new(),
            AlarmEffect::Start => {
                tracing::info!(probability, threshold, "alarm started");
                let mut events = vec![Event::AlarmStarted {
                    probability,
                    threshold,
                    elapsed_sec: machine.elapsed_sec(),
                    at,
                }];
                match resolved {
                    Ok(path) => sound.start(path),
                    Err(reason) => {
                        tracing::warn!(%reason, "alarm is silent");
                        events.push(Event::SoundUnavailable { reason, at });
                    }
                }
                events
            }
            AlarmEffect::EnsureActive => {
                if let Ok(path) = resolved {
                    sound.ensure_active(path);
                }
                Vec::new()
            }
            AlarmEffect::Stop => {
                tracing::info!(probability, threshold, "alarm stopped");
                sound.stop();
                vec![Event::AlarmStopped {
                    probability,
                    threshold,
                    at,
                }]
            }
        }
    }
}
