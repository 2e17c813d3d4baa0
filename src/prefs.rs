use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const PREFERENCES_FILE: &str = "preferences.json";

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// The only state that survives a restart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(rename = "darkMode", default)]
    pub dark_mode: bool,
}

#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(PREFERENCES_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file yields defaults.
    pub fn load(&self) -> Result<Preferences, PreferenceError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Preferences::default())
            }
            Err(source) => {
                return Err(PreferenceError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_slice(&data).map_err(|source| PreferenceError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, prefs: &Preferences) -> Result<(), PreferenceError> {
        self.write_atomic(prefs).map_err(|source| PreferenceError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn write_atomic(&self, prefs: &Preferences) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(prefs)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;

        fs::write(&tmp_path, bytes)?;
        match fs::rename(&tmp_path, &self.path) {
            Ok(()) => Ok(()),
            Err(rename_err) => {
                if self.path.exists() {
                    fs::remove_file(&self.path)?;
                    fs::rename(&tmp_path, &self.path)
                } else {
                    Err(rename_err)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PreferenceError, PreferenceStore, Preferences};
    use std::fs;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PreferenceStore::in_dir(dir.path());

        let prefs = store.load().expect("missing file is not an error");
        assert_eq!(prefs, Preferences::default());
        assert!(!prefs.dark_mode);
    }

    #[test]
    fn save_then_load_keeps_dark_mode() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PreferenceStore::in_dir(&dir.path().join("nested"));

        store
            .save(&Preferences { dark_mode: true })
            .expect("save should succeed");

        let raw = fs::read_to_string(store.path()).expect("file should exist");
        assert!(raw.contains("\"darkMode\": true"));
        assert!(store.load().expect("load should succeed").dark_mode);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn overwrite_replaces_previous_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PreferenceStore::in_dir(dir.path());

        store.save(&Preferences { dark_mode: true }).expect("first save");
        store.save(&Preferences { dark_mode: false }).expect("second save");

        assert!(!store.load().expect("load").dark_mode);
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PreferenceStore::in_dir(dir.path());
        fs::write(store.path(), "{not json").expect("fixture should write");

        let err = store.load().expect_err("corrupt file should fail");
        assert!(matches!(err, PreferenceError::Parse { .. }));
    }
}
