//! Exchange rates and currency conversion.
//!
//! Rates are expressed against CNY (CNY = 1). The table is refreshed through a
//! [`RateFetcher`]; the bundled [`StaticRateFetcher`] waits a moment and
//! returns the built-in table, since there is no live rate source.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::currency::Currency;
use crate::error::{CoreError, Result};
use crate::storage::preferences::ExchangeRateSettings;
use crate::storage::{keys, load_json, save_json, to_json, KvStore};

/// Currency code → units per 1 CNY.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable(BTreeMap<String, f64>);

impl RateTable {
    pub fn builtin() -> Self {
        let rates = [
            (Currency::Cny, 1.0),
            (Currency::Usd, 0.1394),
            (Currency::Gbp, 0.1079),
            (Currency::Jpy, 15.1823),
            (Currency::Eur, 0.1281),
            (Currency::Hkd, 1.0853),
        ];
        Self(
            rates
                .into_iter()
                .map(|(c, r)| (c.code().to_string(), r))
                .collect(),
        )
    }

    pub fn from_rates(rates: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self(rates.into_iter().collect())
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        self.0.get(&code.to_ascii_uppercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `amount × to_rate / from_rate`.
    ///
    /// # Errors
    /// `UnknownCurrency` when either code is missing or has an unusable rate.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64> {
        let from_rate = self.usable_rate(from)?;
        let to_rate = self.usable_rate(to)?;
        Ok(amount * (to_rate / from_rate))
    }

    fn usable_rate(&self, code: &str) -> Result<f64> {
        match self.rate(code) {
            Some(r) if r.is_finite() && r > 0.0 => Ok(r),
            _ => Err(CoreError::UnknownCurrency(code.to_string())),
        }
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Source of fresh exchange rates.
pub trait RateFetcher {
    /// # Errors
    /// `Network` when the source cannot be reached.
    fn fetch_rates(&self) -> Result<RateTable>;
}

/// Returns the built-in table after a fixed delay.
#[derive(Debug, Clone)]
pub struct StaticRateFetcher {
    delay: Duration,
}

impl StaticRateFetcher {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(1500);

    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for StaticRateFetcher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

impl RateFetcher for StaticRateFetcher {
    fn fetch_rates(&self) -> Result<RateTable> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Ok(RateTable::builtin())
    }
}

/// Persisted rate table with its refresh time.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRates {
    pub rates: RateTable,
    pub last_updated: Option<DateTime<Utc>>,
}

impl ExchangeRates {
    /// Stored table, or the built-in one if nothing (valid) is stored.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub fn load(store: &impl KvStore) -> Result<Self> {
        Ok(Self {
            rates: load_json(store, keys::EXCHANGE_RATES)?.unwrap_or_default(),
            last_updated: load_json(store, keys::RATES_LAST_UPDATED)?,
        })
    }

    /// # Errors
    /// Returns an error if the store fails.
    pub fn save(&self, store: &mut impl KvStore) -> Result<()> {
        match self.last_updated {
            Some(ts) => store.put_many(&[
                (keys::EXCHANGE_RATES, to_json(&self.rates)?),
                (keys::RATES_LAST_UPDATED, to_json(&ts)?),
            ])?,
            None => {
                save_json(store, keys::EXCHANGE_RATES, &self.rates)?;
                store.delete(keys::RATES_LAST_UPDATED)?;
            }
        }
        Ok(())
    }

    /// Whether the refresh policy calls for an update at `now`.
    pub fn is_stale(&self, settings: &ExchangeRateSettings, now: DateTime<Utc>) -> bool {
        let Some(max_age) = settings.update_frequency.max_age() else {
            return false;
        };
        match self.last_updated {
            Some(ts) => now - ts >= max_age,
            None => true,
        }
    }
}

/// Fetch a new table and persist it with `now` as the refresh time.
///
/// # Errors
/// `Offline` when offline mode is on, the fetcher's error when it fails,
/// or a persistence error. Stored rates are untouched on failure.
pub fn update_rates(
    store: &mut impl KvStore,
    fetcher: &impl RateFetcher,
    settings: &ExchangeRateSettings,
    now: DateTime<Utc>,
) -> Result<ExchangeRates> {
    if settings.offline_mode {
        return Err(CoreError::Offline);
    }
    let rates = fetcher.fetch_rates()?;
    let updated = ExchangeRates {
        rates,
        last_updated: Some(now),
    };
    updated.save(store)?;
    info!(currencies = updated.rates.len(), "exchange rates updated");
    Ok(updated)
}
