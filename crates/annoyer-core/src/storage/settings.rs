//! Typed user settings.
//!
//! Stores:
//! - Alarm threshold probability
//! - Base period of the distraction model
//! - Alarm sound file (optional, silent when absent)
//! - Display toggles
//!
//! Settings live in the `[settings]` table of the storage document.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{ConfigError, ValidationError};
use crate::probability::MAX_THRESHOLD;

/// Application settings.
///
/// Unknown keys are rejected on load; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Probability at which the alarm fires, in `[0, MAX_THRESHOLD]`.
    #[serde(default = "default_threshold")]
    pub alarm_threshold: f64,
    /// Scale of the exponential model, seconds. Always > 0.
    #[serde(default = "default_period")]
    pub base_period_sec: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound_ref: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub show_graph: bool,
}

// Default functions
fn default_threshold() -> f64 {
    0.667
}
fn default_period() -> f64 {
    300.0
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            alarm_threshold: default_threshold(),
            base_period_sec: default_period(),
            sound_ref: None,
            show_graph: true,
        }
    }
}

/// Names accepted by [`Settings::get`] and [`Settings::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    AlarmThreshold,
    BasePeriod,
    Sound,
    ShowGraph,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        SettingKey::AlarmThreshold,
        SettingKey::BasePeriod,
        SettingKey::Sound,
        SettingKey::ShowGraph,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::AlarmThreshold => "alarm_threshold",
            SettingKey::BasePeriod => "base_period_sec",
            SettingKey::Sound => "sound_ref",
            SettingKey::ShowGraph => "show_graph",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl Settings {
    /// Clamp a threshold into `[0, MAX_THRESHOLD]`, rejecting NaN and infinities.
    pub fn checked_threshold(value: f64) -> Result<f64, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "alarm_threshold",
                value,
            });
        }
        Ok(value.clamp(0.0, MAX_THRESHOLD))
    }

    /// Resolve a sound path against the current directory.
    pub fn sound_path(path: impl Into<PathBuf>) -> PathBuf {
        let path = path.into();
        std::path::absolute(&path).unwrap_or(path)
    }

    /// Parse a sound setting from text. Blank clears the sound.
    pub fn parse_sound(value: &str) -> Option<PathBuf> {
        let value = value.trim();
        (!value.is_empty()).then(|| Self::sound_path(value))
    }

    /// A base period must be a finite, strictly positive number of seconds.
    pub fn checked_period(value: f64) -> Result<f64, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "base_period_sec",
                value,
            });
        }
        if value <= 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "base_period_sec",
                expected: "greater than 0",
                value,
            });
        }
        Ok(value)
    }

    /// Check invariants of a loaded document.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=MAX_THRESHOLD).contains(&self.alarm_threshold) {
            return Err(ValidationError::OutOfRange {
                field: "alarm_threshold",
                expected: "within [0, 0.9999]",
                value: self.alarm_threshold,
            });
        }
        Self::checked_period(self.base_period_sec)?;
        Ok(())
    }

    /// Get a setting rendered as a string.
    pub fn get(&self, key: SettingKey) -> String {
        match key {
            SettingKey::AlarmThreshold => self.alarm_threshold.to_string(),
            SettingKey::BasePeriod => self.base_period_sec.to_string(),
            SettingKey::Sound => self
                .sound_ref
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            SettingKey::ShowGraph => self.show_graph.to_string(),
        }
    }

    /// Parse `value` and store it under `key`. Nothing changes on error.
    ///
    /// An empty string clears the sound.
    pub fn apply(&mut self, key: SettingKey, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        match key {
            SettingKey::AlarmThreshold => {
                let v = value
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| invalid(format!("cannot parse '{value}' as number: {e}")))?;
                self.alarm_threshold =
                    Self::checked_threshold(v).map_err(|e| invalid(e.to_string()))?;
            }
            SettingKey::BasePeriod => {
                let v = value
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| invalid(format!("cannot parse '{value}' as number: {e}")))?;
                self.base_period_sec =
                    Self::checked_period(v).map_err(|e| invalid(e.to_string()))?;
            }
            SettingKey::Sound => self.sound_ref = Self::parse_sound(value),
            SettingKey::ShowGraph => {
                self.show_graph = value
                    .trim()
                    .parse::<bool>()
                    .map_err(|e| invalid(format!("cannot parse '{value}' as bool: {e}")))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_roundtrip() {
        let settings = Settings::default();
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn settings_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.alarm_threshold, 0.667);
        assert_eq!(settings.base_period_sec, 300.0);
        assert!(settings.sound_ref.is_none());
        assert!(settings.show_graph);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let parsed: Settings = toml::from_str("alarm_threshold = 0.25\n").unwrap();
        assert_eq!(parsed.alarm_threshold, 0.25);
        assert_eq!(parsed.base_period_sec, 300.0);
        assert!(parsed.show_graph);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = toml::from_str::<Settings>("alarm_threshold = 0.5\nvolume = 3\n");
        assert!(result.is_err());
    }

    #[test]
    fn key_parsing_rejects_unknown() {
        assert_eq!(
            "alarm_threshold".parse::<SettingKey>().unwrap(),
            SettingKey::AlarmThreshold
        );
        assert!(matches!(
            "p_threshold".parse::<SettingKey>(),
            Err(ConfigError::UnknownKey(k)) if k == "p_threshold"
        ));
    }

    #[test]
    fn get_renders_every_key() {
        let settings = Settings::default();
        assert_eq!(settings.get(SettingKey::AlarmThreshold), "0.667");
        assert_eq!(settings.get(SettingKey::BasePeriod), "300");
        assert_eq!(settings.get(SettingKey::Sound), "");
        assert_eq!(settings.get(SettingKey::ShowGraph), "true");
    }

    #[test]
    fn apply_clamps_threshold() {
        let mut settings = Settings::default();
        settings.apply(SettingKey::AlarmThreshold, "1.0").unwrap();
        assert_eq!(settings.alarm_threshold, MAX_THRESHOLD);
        settings.apply(SettingKey::AlarmThreshold, "-3").unwrap();
        assert_eq!(settings.alarm_threshold, 0.0);
    }

    #[test]
    fn apply_rejects_bad_period() {
        let mut settings = Settings::default();
        assert!(settings.apply(SettingKey::BasePeriod, "0").is_err());
        assert!(settings.apply(SettingKey::BasePeriod, "abc").is_err());
        assert!(settings.apply(SettingKey::BasePeriod, "inf").is_err());
        assert_eq!(settings.base_period_sec, 300.0);
    }

    #[test]
    fn apply_sets_and_clears_sound() {
        let mut settings = Settings::default();
        settings.apply(SettingKey::Sound, "/tmp/bell.wav").unwrap();
        assert_eq!(settings.sound_ref, Some(PathBuf::from("/tmp/bell.wav")));
        settings.apply(SettingKey::Sound, "").unwrap();
        assert!(settings.sound_ref.is_none());
    }

    #[test]
    fn relative_sound_is_made_absolute() {
        let parsed = Settings::parse_sound(" sounds/bell.wav ").unwrap();
        assert!(parsed.is_absolute());
        assert!(parsed.ends_with("sounds/bell.wav"));
        assert_eq!(Settings::parse_sound("   "), None);
    }

    #[test]
    fn apply_rejects_invalid_bool() {
        let mut settings = Settings::default();
        assert!(settings.apply(SettingKey::ShowGraph, "not_a_bool").is_err());
        settings.apply(SettingKey::ShowGraph, "false").unwrap();
        assert!(!settings.show_graph);
    }

    #[test]
    fn validate_flags_out_of_range_values() {
        let mut settings = Settings::default();
        settings.alarm_threshold = 1.0;
        assert!(settings.validate().is_err());
        settings.alarm_threshold = 0.5;
        settings.base_period_sec = -1.0;
        assert!(settings.validate().is_err());
    }
}
