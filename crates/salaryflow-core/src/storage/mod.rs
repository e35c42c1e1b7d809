//! Key-value persistence.
//!
//! Everything the app stores is a JSON value under a string key. The store is
//! an injected collaborator: every operation can fail, and callers surface
//! [`PersistenceError`] instead of losing data silently.

pub mod database;
pub mod memory;
pub mod preferences;

pub use database::Database;
pub use memory::MemoryStore;
pub use preferences::Preferences;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::{PersistenceError, Result};

/// Well-known store keys.
pub mod keys {
    pub const THEME: &str = "theme";
    pub const WORK_SETTINGS: &str = "workSettings";
    pub const DISPLAY_SETTINGS: &str = "displaySettings";
    pub const CURRENCY_SETTINGS: &str = "currencySettings";
    pub const EXCHANGE_RATE_SETTINGS: &str = "exchangeRateSettings";
    pub const EXCHANGE_RATES: &str = "exchangeRates";
    pub const RATES_LAST_UPDATED: &str = "ratesLastUpdated";
    pub const ALL_RECORDS: &str = "allRecords";
    pub const LATEST_RECORDS: &str = "latestRecords";
    pub const TIMER_ENGINE: &str = "timerEngine";
}

/// String-keyed store of string values.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    fn put(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Removing a missing key is not an error.
    fn delete(&mut self, key: &str) -> Result<(), PersistenceError>;

    /// Write several entries as one unit: either all of them land or none do.
    fn put_many(&mut self, entries: &[(&str, String)]) -> Result<(), PersistenceError>;
}

impl<S: KvStore + ?Sized> KvStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        (**self).get(key)
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        (**self).put(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<(), PersistenceError> {
        (**self).delete(key)
    }

    fn put_many(&mut self, entries: &[(&str, String)]) -> Result<(), PersistenceError> {
        (**self).put_many(entries)
    }
}

/// Read and decode a JSON value.
///
/// A missing key is `Ok(None)`. A value that no longer decodes is logged and
/// also treated as missing, so callers fall back to their defaults.
///
/// # Errors
/// Returns an error if the store itself fails.
pub fn load_json<T: DeserializeOwned>(store: &impl KvStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(key, error = %e, "stored value is corrupt, using default");
            Ok(None)
        }
    }
}

/// Encode and write a JSON value.
///
/// # Errors
/// Returns an error if encoding or the write fails.
pub fn save_json<T: Serialize + ?Sized>(store: &mut impl KvStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    store.put(key, &json)?;
    Ok(())
}

/// Encode a value for [`KvStore::put_many`].
///
/// # Errors
/// Returns an error if encoding fails.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Returns `~/.config/salaryflow[-dev]/` based on SALARYFLOW_ENV.
///
/// Set SALARYFLOW_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the data directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("SALARYFLOW_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("salaryflow-dev")
    } else {
        base_dir.join("salaryflow")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
