//! Persisted local state behind a capability interface.
//!
//! The cache, rate-limit window, fetch counter and ad cursor are
//! process-wide state that outlives the session. The core never touches
//! the storage medium directly — every component takes a [`StateStore`]
//! and reads/writes whole serialized documents through it:
//!
//! - [`FileStore`] — durable one-document-per-key JSON files, atomic
//!   replace via tmp + rename. The production backing.
//! - [`MemoryStore`] — a plain in-process map, for tests and ephemeral
//!   sessions.
//!
//! Absent keys mean empty/zero; there is no initialization step and no
//! teardown. A `write` always replaces the whole value for its key in a
//! single atomic step, never a partial field update, so rapid successive
//! calls resolve to last-write-wins with no interleaved state.

mod file;

pub use file::FileStore;

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::Result;

/// Well-known document keys.
pub mod keys {
    /// The medication cache map (also serves as history).
    pub const MEDICATION_CACHE: &str = "medication_cache";
    /// Timestamps of admitted outbound requests.
    pub const REQUEST_TIMESTAMPS: &str = "request_timestamps";
    /// Count of successful, non-bypassed fetches.
    pub const FETCH_COUNT: &str = "fetch_count";
    /// Round-robin index into the ad offer catalog.
    pub const AD_CURSOR: &str = "ad_cursor";
}

/// Key→document store for persisted core state.
///
/// Implementations must make `write` an atomic replace of the whole
/// value for the key.
pub trait StateStore: Send + Sync {
    /// Read the document stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Atomically replace the document stored under `key`.
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// Read and deserialize a persisted document.
///
/// Missing, unreadable, or corrupt documents all degrade to `None` with
/// a warning — persisted state is best-effort, never fatal.
pub(crate) fn read_json<T: DeserializeOwned>(store: &dyn StateStore, key: &str) -> Option<T> {
    let raw = match store.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "failed to read persisted state");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "corrupt persisted state, treating as absent");
            None
        }
    }
}

/// Serialize and persist a document, logging on failure.
///
/// Persistence failures degrade the cache/counters to session-only
/// behaviour; they never surface to the caller.
pub(crate) fn write_json<T: Serialize>(store: &dyn StateStore, key: &str, value: &T) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(key, error = %e, "failed to serialize persisted state");
            return;
        }
    };
    if let Err(e) = store.write(key, &raw) {
        warn!(key, error = %e, "failed to write persisted state");
    }
}

/// In-process [`StateStore`] backed by a mutex-guarded map.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| crate::MedhanitError::Store("state store poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| crate::MedhanitError::Store("state store poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
