//! Completed-period log and summary statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Stoplight button the user pressed to end a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Got distracted.
    Red,
    /// Borderline.
    Yellow,
    /// Stayed on task.
    Green,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Red => "red",
            Outcome::Yellow => "yellow",
            Outcome::Green => "green",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" | "r" => Ok(Outcome::Red),
            "yellow" | "y" => Ok(Outcome::Yellow),
            "green" | "g" => Ok(Outcome::Green),
            other => Err(ConfigError::InvalidValue {
                key: "outcome".to_string(),
                message: format!("expected red, yellow or green, got '{other}'"),
            }),
        }
    }
}

/// One acknowledged period. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Seconds from period start to the button press.
    #[serde(default)]
    pub duration_sec: f64,
    /// Predicted wait to threshold at the moment of the press.
    #[serde(default)]
    pub target_duration_sec: f64,
    pub outcome: Outcome,
    /// Pressed before the alarm fired.
    #[serde(default)]
    pub is_early: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Aggregate view of the history, for the stats display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub count: usize,
    pub red: usize,
    pub yellow: usize,
    pub green: usize,
    pub early: usize,
    pub mean_duration_sec: Option<f64>,
    pub mean_target_duration_sec: Option<f64>,
    /// Mean of duration / target over records with a positive target.
    pub mean_duration_ratio: Option<f64>,
    pub longest_duration_sec: Option<f64>,
}

impl HistoryStats {
    pub fn from_records(records: &[HistoryRecord]) -> Self {
        let mut stats = HistoryStats {
            count: records.len(),
            ..Default::default()
        };
        if records.is_empty() {
            return stats;
        }

        let mut total_duration = 0.0;
        let mut total_target = 0.0;
        let mut ratio_sum = 0.0;
        let mut ratio_n = 0usize;
        let mut longest = f64::MIN;

        for r in records {
            match r.outcome {
                Outcome::Red => stats.red += 1,
                Outcome::Yellow => stats.yellow += 1,
                Outcome::Green => stats.green += 1,
            }
            if r.is_early {
                stats.early += 1;
            }
            total_duration += r.duration_sec;
            total_target += r.target_duration_sec;
            if r.target_duration_sec > 0.0 {
                ratio_sum += r.duration_sec / r.target_duration_sec;
                ratio_n += 1;
            }
            longest = longest.max(r.duration_sec);
        }

        let n = records.len() as f64;
        stats.mean_duration_sec = Some(total_duration / n);
        stats.mean_target_duration_sec = Some(total_target / n);
        stats.mean_duration_ratio = (ratio_n > 0).then(|| ratio_sum / ratio_n as f64);
        stats.longest_duration_sec = Some(longest);
        stats
    }
}
