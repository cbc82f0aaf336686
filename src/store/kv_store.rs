use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};

use crate::agent::error::FormError;

/// Local key-value storage holding JSON values.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, FormError>;
    fn set(&self, key: &str, value: Value) -> Result<(), FormError>;
    fn remove(&self, key: &str) -> Result<(), FormError>;
}

/// Process-local store, mostly for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, FormError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), FormError> {
        self.entries().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), FormError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// One JSON object on disk, every key at the top level.
/// The whole file is rewritten on each `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Map<String, Value>, FormError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(FormError::io(self.display_path(), e)),
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(FormError::Store(format!(
                "{} does not hold a JSON object",
                self.display_path()
            ))),
            Err(e) => Err(FormError::parse(self.display_path(), e)),
        }
    }

    fn persist(&self, map: Map<String, Value>) -> Result<(), FormError> {
        let json = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| FormError::serialize(self.display_path(), e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| FormError::io(self.display_path(), e))?;
        }

        std::fs::write(&self.path, json).map_err(|e| FormError::io(self.display_path(), e))
    }

    fn update(&self, f: impl FnOnce(&mut Map<String, Value>)) -> Result<(), FormError> {
        let _held = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut map = self.load()?;
        f(&mut map);
        self.persist(map)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, FormError> {
        let _held = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> Result<(), FormError> {
        self.update(|map| {
            map.insert(key.to_string(), value);
        })
    }

    fn remove(&self, key: &str) -> Result<(), FormError> {
        self.update(|map| {
            map.remove(key);
        })
    }
}
