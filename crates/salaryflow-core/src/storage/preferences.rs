//! User preferences.
//!
//! Stored as four JSON sections, each under its own key:
//! - `workSettings`: work schedule used by the rate calculator
//! - `displaySettings`: decimal places and thousands separator
//! - `currencySettings`: default input and display currencies
//! - `exchangeRateSettings`: refresh policy and offline mode
//!
//! The theme lives separately under `theme`.
//!
//! Preferences are saved as a whole; there is no partial write.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{keys, load_json, save_json, to_json, KvStore};
use crate::currency::Currency;
use crate::error::{CoreError, Result};
use crate::rate::{RateInput, SalaryPeriod};

const MAX_DECIMAL_PLACES: u8 = 8;

/// Work schedule configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSettings {
    #[serde(default = "default_days_per_week")]
    pub days_per_week: u8,
    #[serde(default = "default_hours_per_day")]
    pub hours_per_day: f64,
    #[serde(default = "default_vacation_days")]
    pub vacation_days: u32,
}

/// Amount display configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u8,
    #[serde(default = "default_true")]
    pub use_thousand_separator: bool,
}

/// Currency defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencySettings {
    #[serde(default)]
    pub default_input_currency: Currency,
    #[serde(default)]
    pub default_display_currency: Currency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateFrequency {
    #[default]
    Daily,
    Weekly,
    Manual,
}

impl UpdateFrequency {
    /// How old the rate table may get before it counts as stale.
    pub fn max_age(&self) -> Option<chrono::Duration> {
        match self {
            UpdateFrequency::Daily => Some(chrono::Duration::days(1)),
            UpdateFrequency::Weekly => Some(chrono::Duration::days(7)),
            UpdateFrequency::Manual => None,
        }
    }
}

/// Exchange-rate refresh policy.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateSettings {
    #[serde(default)]
    pub update_frequency: UpdateFrequency,
    #[serde(default)]
    pub offline_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Stored theme, or the default when missing or corrupt.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub fn load(store: &impl KvStore) -> Result<Self> {
        Ok(load_json(store, keys::THEME)?.unwrap_or_default())
    }

    /// # Errors
    /// Returns an error if the store fails.
    pub fn save(&self, store: &mut impl KvStore) -> Result<()> {
        save_json(store, keys::THEME, self)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(CoreError::invalid_input(
                "theme",
                format!("expected 'light' or 'dark', got '{other}'"),
            )),
        }
    }
}

/// All preference sections together.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub work: WorkSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub currency: CurrencySettings,
    #[serde(default)]
    pub exchange_rate: ExchangeRateSettings,
}

// Default functions
fn default_days_per_week() -> u8 {
    5
}
fn default_hours_per_day() -> f64 {
    8.0
}
fn default_vacation_days() -> u32 {
    15
}
fn default_decimal_places() -> u8 {
    2
}
fn default_true() -> bool {
    true
}

impl Default for WorkSettings {
    fn default() -> Self {
        Self {
            days_per_week: default_days_per_week(),
            hours_per_day: default_hours_per_day(),
            vacation_days: default_vacation_days(),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            decimal_places: default_decimal_places(),
            use_thousand_separator: true,
        }
    }
}

impl Default for CurrencySettings {
    fn default() -> Self {
        Self {
            default_input_currency: Currency::Cny,
            default_display_currency: Currency::Cny,
        }
    }
}

impl WorkSettings {
    /// # Errors
    /// `InvalidSchedule` or `InvalidInput` when no rate could be derived from this schedule.
    pub fn validate(&self) -> Result<()> {
        RateInput::from_work_settings(1.0, SalaryPeriod::Year, self).working_days()?;
        if !self.hours_per_day.is_finite() || self.hours_per_day <= 0.0 || self.hours_per_day > 24.0 {
            return Err(CoreError::invalid_input(
                "work.hoursPerDay",
                "hours per day must be greater than 0 and at most 24",
            ));
        }
        Ok(())
    }
}

impl DisplaySettings {
    /// # Errors
    /// `InvalidInput` when decimal places exceed the supported maximum.
    pub fn validate(&self) -> Result<()> {
        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(CoreError::invalid_input(
                "display.decimalPlaces",
                format!("at most {MAX_DECIMAL_PLACES} decimal places are supported"),
            ));
        }
        Ok(())
    }
}

impl Preferences {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<()> {
        let unknown = || CoreError::invalid_input(key, "unknown preference key");
        let invalid = |message: String| CoreError::invalid_input(key, message);

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(invalid("preference key is empty".to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) => return Err(unknown()),
                    _ => serde_json::Value::String(value.to_string()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Load every section, defaulting the missing or corrupt ones.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub fn load(store: &impl KvStore) -> Result<Self> {
        Ok(Self {
            work: load_json(store, keys::WORK_SETTINGS)?.unwrap_or_default(),
            display: load_json(store, keys::DISPLAY_SETTINGS)?.unwrap_or_default(),
            currency: load_json(store, keys::CURRENCY_SETTINGS)?.unwrap_or_default(),
            exchange_rate: load_json(store, keys::EXCHANGE_RATE_SETTINGS)?.unwrap_or_default(),
        })
    }

    /// Validate, then write all sections in one batch.
    ///
    /// # Errors
    /// Returns an error if a section is invalid or the store fails; in both
    /// cases the stored sections are left as they were.
    pub fn save(&self, store: &mut impl KvStore) -> Result<()> {
        self.validate()?;
        store.put_many(&[
            (keys::WORK_SETTINGS, to_json(&self.work)?),
            (keys::DISPLAY_SETTINGS, to_json(&self.display)?),
            (keys::CURRENCY_SETTINGS, to_json(&self.currency)?),
            (keys::EXCHANGE_RATE_SETTINGS, to_json(&self.exchange_rate)?),
        ])?;
        Ok(())
    }

    /// # Errors
    /// Returns the first invalid section.
    pub fn validate(&self) -> Result<()> {
        self.work.validate()?;
        self.display.validate()?;
        Ok(())
    }

    /// Get a preference value as string by dot-separated key, e.g. `work.daysPerWeek`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a preference by dot-separated key. Nothing is persisted until [`Preferences::save`].
    ///
    /// # Errors
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Preferences = serde_json::from_value(json)
            .map_err(|e| CoreError::invalid_input(key, e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}
