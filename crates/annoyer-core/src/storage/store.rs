//! Settings and history persisted together in one TOML document.
//!
//! ```toml
//! [settings]
//! alarm_threshold = 0.667
//! base_period_sec = 300.0
//! show_graph = true
//!
//! [[history]]
//! duration_sec = 41.2
//! target_duration_sec = 329.6
//! outcome = "green"
//! is_early = true
//! ```
//!
//! Every write goes to a sibling `.tmp` file first and is renamed over the
//! document, so a reader never sees a half-written file. The store is not
//! thread-safe; the caller serializes all access.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::data_dir;
use super::history::{HistoryRecord, HistoryStats};
use super::settings::{SettingKey, Settings};
use crate::error::{CoreError, Result};

/// File name of the storage document inside the data directory.
pub const STORE_FILE_NAME: &str = "annoyer.toml";

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    settings: Settings,
    #[serde(default)]
    history: Vec<HistoryRecord>,
}

/// Exclusive owner of settings and history.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    settings: Settings,
    history: Vec<HistoryRecord>,
    /// In-memory state differs from the file.
    dirty: bool,
}

impl Store {
    /// Open the store at `~/.config/annoyer/annoyer.toml`.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created or the
    /// defaults cannot be written.
    pub fn open_default() -> Result<Self> {
        Self::load(data_dir()?.join(STORE_FILE_NAME))
    }

    /// Load from `path`, falling back to defaults.
    ///
    /// A missing file is created with defaults. A file that is not UTF-8,
    /// cannot be parsed, or holds out-of-range settings is renamed to
    /// `<path>.corrupt-<millis>` and replaced with defaults.
    ///
    /// # Errors
    /// Fails if an existing file cannot be read or moved aside, or if the
    /// defaults cannot be written. The file on disk is never overwritten
    /// unless it was missing or has been quarantined first.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "storage file not found, creating defaults");
                return Self::fresh(path);
            }
            Err(source) => {
                tracing::warn!(path = %path.display(), error = %source, "cannot read storage file");
                return Err(CoreError::Read { path, source });
            }
        };

        match parse_document(&bytes) {
            Ok(doc) => {
                tracing::info!(
                    path = %path.display(),
                    entries = doc.history.len(),
                    "loaded storage file"
                );
                Ok(Self {
                    path,
                    settings: doc.settings,
                    history: doc.history,
                    dirty: false,
                })
            }
            Err(reason) => {
                let quarantine = corrupt_path(&path);
                tracing::warn!(
                    path = %path.display(),
                    quarantine = %quarantine.display(),
                    %reason,
                    "storage file is corrupt, using defaults"
                );
                if let Err(source) = fs::rename(&path, &quarantine) {
                    tracing::warn!(error = %source, "failed to move corrupt storage file aside");
                    return Err(CoreError::Persist {
                        path: quarantine,
                        source,
                    });
                }
                Self::fresh(path)
            }
        }
    }

    fn fresh(path: PathBuf) -> Result<Self> {
        let mut store = Self {
            path,
            settings: Settings::default(),
            history: Vec::new(),
            dirty: true,
        };
        store.persist()?;
        Ok(store)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Records in chronological order.
    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }

    pub fn stats(&self) -> HistoryStats {
        HistoryStats::from_records(&self.history)
    }

    /// Changes are waiting for [`flush`](Self::flush).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Set the alarm threshold, clamped into range. Returns the stored value.
    ///
    /// With `suppress_persist` the change is only held in memory until
    /// [`flush`](Self::flush); use it while a drag gesture is in progress.
    ///
    /// # Errors
    /// Validation errors leave the settings untouched. Write errors keep the
    /// new value in memory.
    pub fn set_threshold(&mut self, value: f64, suppress_persist: bool) -> Result<f64> {
        let value = Settings::checked_threshold(value)?;
        self.settings.alarm_threshold = value;
        self.commit(suppress_persist)?;
        Ok(value)
    }

    pub fn set_period(&mut self, seconds: f64) -> Result<()> {
        self.settings.base_period_sec = Settings::checked_period(seconds)?;
        self.commit(false)
    }

    /// Relative paths are resolved against the current directory.
    pub fn set_sound(&mut self, sound: Option<PathBuf>) -> Result<()> {
        self.settings.sound_ref = sound.map(Settings::sound_path);
        self.commit(false)
    }

    pub fn set_show_graph(&mut self, show: bool) -> Result<()> {
        self.settings.show_graph = show;
        self.commit(false)
    }

    /// Set a setting by key from its string form.
    pub fn set_by_key(&mut self, key: SettingKey, value: &str) -> Result<()> {
        self.settings.apply(key, value)?;
        self.commit(false)
    }

    pub fn reset_settings(&mut self) -> Result<()> {
        self.settings = Settings::default();
        self.commit(false)
    }

    /// Append one record and persist in the same call.
    pub fn append(&mut self, record: HistoryRecord) -> Result<()> {
        self.history.push(record);
        self.commit(false)
    }

    /// Store the adapted period and the finished period's record with a
    /// single write.
    pub fn complete_period(&mut self, new_period_sec: f64, record: HistoryRecord) -> Result<()> {
        self.settings.base_period_sec = Settings::checked_period(new_period_sec)?;
        self.history.push(record);
        self.commit(false)
    }

    pub fn clear_history(&mut self) -> Result<()> {
        tracing::info!(entries = self.history.len(), "clearing history");
        self.history.clear();
        self.commit(false)
    }

    /// Write pending changes, if any.
    pub fn flush(&mut self) -> Result<()> {
        if self.dirty {
            self.persist()?;
        }
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn commit(&mut self, suppress_persist: bool) -> Result<()> {
        self.dirty = true;
        if suppress_persist {
            return Ok(());
        }
        self.persist()
    }

    fn persist(&mut self) -> Result<()> {
        let doc = DocumentRef {
            settings: &self.settings,
            history: &self.history,
        };
        let content = toml::to_string_pretty(&doc)?;
        write_atomic(&self.path, &content).map_err(|source| {
            tracing::warn!(path = %self.path.display(), error = %source, "failed to write storage file");
            CoreError::Persist {
                path: self.path.clone(),
                source,
            }
        })?;
        tracing::debug!(path = %self.path.display(), "wrote storage file");
        self.dirty = false;
        Ok(())
    }
}

/// Borrowed twin of [`Document`] so persisting does not clone the history.
#[derive(Serialize)]
struct DocumentRef<'a> {
    settings: &'a Settings,
    history: &'a [HistoryRecord],
}

fn parse_document(bytes: &[u8]) -> Result<Document> {
    let content = std::str::from_utf8(bytes)?;
    let doc: Document = toml::from_str(content)?;
    doc.settings.validate()?;
    Ok(doc)
}

fn companion_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| STORE_FILE_NAME.into());
    name.push(suffix);
    path.with_file_name(name)
}

/// A quarantine name that does not clobber earlier quarantined files.
fn corrupt_path(path: &Path) -> PathBuf {
    let stamp = Utc::now().timestamp_millis();
    let mut candidate = companion_path(path, &format!(".corrupt-{stamp}"));
    let mut n = 1;
    while candidate.exists() {
        candidate = companion_path(path, &format!(".corrupt-{stamp}-{n}"));
        n += 1;
    }
    candidate
}

fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let temp_path = companion_path(path, ".tmp");
    let result = (|| {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Outcome;
    use tempfile::TempDir;

    fn record(outcome: Outcome) -> HistoryRecord {
        HistoryRecord {
            duration_sec: 12.0,
            target_duration_sec: 20.0,
            outcome,
            is_early: true,
            recorded_at: None,
        }
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        let store = Store::load(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.settings(), &Settings::default());
        assert!(store.history().is_empty());
        assert!(!store.is_dirty());
    }

    #[test]
    fn parent_directories_are_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join(STORE_FILE_NAME);
        Store::load(&path).unwrap();
        assert!(path.exists());
    }

    /// Contents of every quarantined copy in `dir`, sorted.
    fn quarantined(dir: &TempDir) -> Vec<Vec<u8>> {
        let mut contents: Vec<Vec<u8>> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("annoyer.toml.corrupt-"))
            })
            .map(|p| fs::read(p).unwrap())
            .collect();
        contents.sort();
        contents
    }

    #[test]
    fn corrupt_file_is_quarantined() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        fs::write(&path, "this is = = not toml").unwrap();

        let store = Store::load(&path).unwrap();
        assert_eq!(store.settings(), &Settings::default());
        assert_eq!(quarantined(&dir), vec![b"this is = = not toml".to_vec()]);
        // The replacement parses cleanly.
        assert!(Store::load(&path).is_ok());
    }

    #[test]
    fn non_utf8_file_is_quarantined_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        let original = b"[settings]\nalarm_threshold = 0.3\n# \xff\xfe user note\n".to_vec();
        fs::write(&path, &original).unwrap();

        let store = Store::load(&path).unwrap();
        assert_eq!(store.settings(), &Settings::default());
        assert_eq!(quarantined(&dir), vec![original]);
    }

    #[test]
    fn repeated_corruption_keeps_every_quarantined_copy() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);

        fs::write(&path, "first = = broken").unwrap();
        Store::load(&path).unwrap();
        fs::write(&path, "second = = broken").unwrap();
        Store::load(&path).unwrap();

        assert_eq!(
            quarantined(&dir),
            vec![b"first = = broken".to_vec(), b"second = = broken".to_vec()]
        );
    }

    #[test]
    fn unreadable_file_is_an_error_and_left_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        fs::create_dir(&path).unwrap();

        assert!(matches!(Store::load(&path), Err(CoreError::Read { .. })));
        assert!(path.is_dir());
        assert!(quarantined(&dir).is_empty());
    }

    #[test]
    fn missing_tables_take_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        fs::write(&path, "[[history]]\noutcome = \"yellow\"\n").unwrap();

        let store = Store::load(&path).unwrap();
        assert_eq!(store.settings(), &Settings::default());
        assert_eq!(store.history().len(), 1);
        assert_eq!(store.history()[0].outcome, Outcome::Yellow);
        assert!(quarantined(&dir).is_empty());
    }

    #[test]
    fn history_record_without_outcome_counts_as_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        let content = "[settings]\nbase_period_sec = 90.0\n\n[[history]]\nduration_sec = 4.0\n";
        fs::write(&path, content).unwrap();

        let store = Store::load(&path).unwrap();
        assert_eq!(store.settings().base_period_sec, 300.0);
        assert!(store.history().is_empty());
        assert_eq!(quarantined(&dir), vec![content.as_bytes().to_vec()]);
    }

    #[test]
    fn out_of_range_settings_count_as_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        fs::write(&path, "[settings]\nbase_period_sec = -5.0\n").unwrap();
        let store = Store::load(&path).unwrap();
        assert_eq!(store.settings().base_period_sec, 300.0);
    }

    #[test]
    fn unknown_setting_key_counts_as_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        fs::write(&path, "[settings]\nalarm_threshold = 0.3\nsound_filename = \"x.wav\"\n").unwrap();
        let store = Store::load(&path).unwrap();
        assert_eq!(store.settings().alarm_threshold, 0.667);
    }

    #[test]
    fn suppressed_threshold_waits_for_flush() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        let mut store = Store::load(&path).unwrap();

        store.set_threshold(0.4, true).unwrap();
        store.set_threshold(0.45, true).unwrap();
        assert!(store.is_dirty());
        assert_eq!(Store::load(&path).unwrap().settings().alarm_threshold, 0.667);

        store.flush().unwrap();
        assert!(!store.is_dirty());
        assert_eq!(Store::load(&path).unwrap().settings().alarm_threshold, 0.45);
    }

    #[test]
    fn invalid_period_leaves_settings_untouched() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::load(dir.path().join(STORE_FILE_NAME)).unwrap();
        assert!(matches!(
            store.set_period(0.0),
            Err(CoreError::Validation(_))
        ));
        assert_eq!(store.settings().base_period_sec, 300.0);
        assert!(!store.is_dirty());
    }

    #[test]
    fn append_persists_immediately() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        let mut store = Store::load(&path).unwrap();
        store.append(record(Outcome::Red)).unwrap();
        store.append(record(Outcome::Green)).unwrap();

        let reloaded = Store::load(&path).unwrap();
        assert_eq!(reloaded.history().len(), 2);
        assert_eq!(reloaded.history()[0].outcome, Outcome::Red);
        assert_eq!(reloaded.history()[1].outcome, Outcome::Green);
    }

    #[test]
    fn failed_write_keeps_change_in_memory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        let mut store = Store::load(&path).unwrap();

        // Turn the target into a directory so the rename cannot succeed.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        let err = store.append(record(Outcome::Yellow)).unwrap_err();
        assert!(matches!(err, CoreError::Persist { .. }));
        assert_eq!(store.history().len(), 1);
        assert!(store.is_dirty());
        assert!(!dir.path().join("annoyer.toml.tmp").exists());

        fs::remove_dir(&path).unwrap();
        store.flush().unwrap();
        assert_eq!(Store::load(&path).unwrap().history().len(), 1);
    }

    #[test]
    fn set_by_key_rejects_bad_value_without_writing() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::load(dir.path().join(STORE_FILE_NAME)).unwrap();
        assert!(store.set_by_key(SettingKey::ShowGraph, "maybe").is_err());
        assert!(store.settings().show_graph);
        assert!(!store.is_dirty());
    }
}
