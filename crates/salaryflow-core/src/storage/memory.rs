use std::collections::{HashMap, HashSet};

use super::KvStore;
use crate::error::PersistenceError;

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    failing: bool,
    rejected: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails, to exercise error paths.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Make writes to `key` fail while reads and other keys keep working.
    pub fn reject_writes_to(&mut self, key: &str) {
        self.rejected.insert(key.to_string());
    }

    fn check_write(&self, key: &str) -> Result<(), PersistenceError> {
        if self.failing || self.rejected.contains(key) {
            return Err(PersistenceError::write(key, "store unavailable"));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        if self.failing {
            return Err(PersistenceError::read(key, "store unavailable"));
        }
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.check_write(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.check_write(key)?;
        self.entries.remove(key);
        Ok(())
    }

    fn put_many(&mut self, entries: &[(&str, String)]) -> Result<(), PersistenceError> {
        for (key, _) in entries {
            self.check_write(key)?;
        }
        for (key, value) in entries {
            self.entries.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}
