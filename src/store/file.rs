//! Durable on-disk store: one JSON document per key.

use std::path::{Path, PathBuf};

use crate::{MedhanitError, Result};

use super::StateStore;

/// [`StateStore`](super::StateStore) backed by one file per key under a
/// directory.
///
/// Writes go to a tmp file first and are renamed into place, so a
/// document is always either the previous or the new whole value —
/// never a torn write.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created lazily
    /// on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default data directory: `~/.local/share/medhanit` (platform
    /// equivalent), falling back to `.medhanit` in the working directory.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("medhanit")
    }

    /// Directory this store writes under.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

impl StateStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MedhanitError::Store(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            MedhanitError::Store(format!(
                "failed to create store dir {}: {e}",
                self.dir.display()
            ))
        })?;

        // Write to tmp file first, then rename for atomicity
        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, value).map_err(|e| {
            MedhanitError::Store(format!("failed to write {}: {e}", tmp_path.display()))
        })?;
        std::fs::rename(&tmp_path, &path).map_err(|e| {
            MedhanitError::Store(format!(
                "failed to rename {} → {}: {e}",
                tmp_path.display(),
                path.display()
            ))
        })?;

        Ok(())
    }
}
