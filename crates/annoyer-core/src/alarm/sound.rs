//! Boundary to whatever actually plays the alarm.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Sound playback collaborator.
///
/// All three requests must be idempotent: `start` on a playing sound,
/// `ensure_active` on a playing sound and `stop` on a silent one are no-ops.
pub trait AlarmSound {
    /// Begin playing `sound`.
    fn start(&mut self, sound: &Path);
    /// Called on every tick while alarming; restart `sound` if it finished.
    fn ensure_active(&mut self, sound: &Path);
    fn stop(&mut self);
}

/// Plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSound;

impl AlarmSound for SilentSound {
    fn start(&mut self, _sound: &Path) {}
    fn ensure_active(&mut self, _sound: &Path) {}
    fn stop(&mut self) {}
}

/// Why the alarm runs without sound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SoundUnavailable {
    NotConfigured,
    Missing { path: PathBuf },
}

impl fmt::Display for SoundUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundUnavailable::NotConfigured => f.write_str("no alarm sound configured"),
            SoundUnavailable::Missing { path } => {
                write!(f, "alarm sound file not found: {}", path.display())
            }
        }
    }
}

/// The configured sound, if it can be played.
pub fn resolve_sound(sound_ref: Option<&Path>) -> Result<&Path, SoundUnavailable> {
    let path = sound_ref.ok_or(SoundUnavailable::NotConfigured)?;
    if path.is_file() {
        Ok(path)
    } else {
        Err(SoundUnavailable::Missing {
            path: path.to_path_buf(),
        })
    }
}
