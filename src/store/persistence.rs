use crate::core::error::EngineError;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Persisted-value key for the exchange-rate table.
pub const RATE_TABLE_KEY: &str = "exchange_rates";

/// Persisted-value key for the user's selected display currency.
pub const SELECTED_CURRENCY_KEY: &str = "selected_currency";

/// The storage capability injected into the engine.
///
/// The engine persists two independent named values (see the key
/// constants above), each a small JSON document. Any storage technology
/// that can load and save strings by key qualifies; failures surface as
/// [`EngineError::PersistenceUnavailable`] and the engine degrades to
/// memory-only operation rather than blocking the session.
pub trait StateStore {
    /// Read a named value. `Ok(None)` means the value was never written.
    fn load(&self, key: &str) -> Result<Option<String>, EngineError>;

    /// Write a named value, replacing any previous content.
    fn save(&mut self, key: &str, value: &str) -> Result<(), EngineError>;
}

/// In-memory backend for tests and ephemeral sessions.
///
/// Clones share the same underlying map, so a fresh engine constructed
/// over a clone sees everything earlier sessions persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a value, simulating state left by a prior session.
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        self
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self, key: &str) -> Result<Option<String>, EngineError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| EngineError::PersistenceUnavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), EngineError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| EngineError::PersistenceUnavailable(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-per-key backend: each value lives at `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<String>, EngineError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(EngineError::PersistenceUnavailable(e.to_string())),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), EngineError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| EngineError::PersistenceUnavailable(e.to_string()))?;
        fs::write(self.path_for(key), value)
            .map_err(|e| EngineError::PersistenceUnavailable(e.to_string()))
    }
}
