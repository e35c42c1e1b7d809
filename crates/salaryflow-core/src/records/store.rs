//! Earnings snapshots.
//!
//! The full history lives under `allRecords` (newest first, unbounded) and a
//! copy of the newest three under `latestRecords`. This store is the only
//! writer of both keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::currency::Currency;
use crate::error::{CoreError, Result};
use crate::storage::{keys, load_json, to_json, KvStore};
use crate::timer::{Clock, Reading, TimerEngine};

/// Size of the latest view.
pub const LATEST_CAPACITY: usize = 3;

/// One recorded earnings snapshot. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub amount: f64,
    pub seconds: f64,
    pub currency: Currency,
    pub currency_symbol: String,
    /// Amount minus the previous record's amount; the amount itself for the first record.
    #[serde(rename = "diff")]
    pub delta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    /// Newest first.
    #[default]
    Descending,
}

/// Record history over a key-value store.
pub struct RecordStore<S> {
    store: S,
}

impl<S: KvStore> RecordStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Unbounded history, newest first by insertion.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub fn history(&self) -> Result<Vec<Record>> {
        Ok(load_json(&self.store, keys::ALL_RECORDS)?.unwrap_or_default())
    }

    /// The capped most-recent view.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub fn latest(&self) -> Result<Vec<Record>> {
        Ok(load_json(&self.store, keys::LATEST_RECORDS)?.unwrap_or_default())
    }

    /// Capture the engine's current amount now.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub fn record_snapshot<C: Clock>(&mut self, engine: &TimerEngine<C>) -> Result<Record> {
        self.record_snapshot_at(engine, Utc::now())
    }

    /// # Errors
    /// Returns an error if the store fails.
    pub fn record_snapshot_at<C: Clock>(
        &mut self,
        engine: &TimerEngine<C>,
        at: DateTime<Utc>,
    ) -> Result<Record> {
        self.record_reading(&engine.reading(), at)
    }

    /// Store a reading as a new record.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub fn record_reading(&mut self, reading: &Reading, at: DateTime<Utc>) -> Result<Record> {
        let mut history = self.history()?;
        let mut latest = self.latest()?;

        let previous = history.first().or(latest.first()).map(|r| r.amount);
        let record = Record {
            id: Uuid::new_v4().to_string(),
            timestamp: at,
            amount: reading.amount,
            seconds: reading.elapsed_seconds,
            currency: reading.currency,
            currency_symbol: reading.currency.symbol().to_string(),
            delta: match previous {
                Some(prev) => reading.amount - prev,
                None => reading.amount,
            },
        };

        history.insert(0, record.clone());
        latest.insert(0, record.clone());
        latest.truncate(LATEST_CAPACITY);

        self.write(&history, &latest)?;
        info!(id = %record.id, amount = record.amount, delta = record.delta, "record created");
        Ok(record)
    }

    /// The whole history sorted by timestamp. Records with equal timestamps keep insertion order.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub fn list_all(&self, order: SortOrder) -> Result<Vec<Record>> {
        let mut records = self.history()?;
        sort_records(&mut records, order);
        Ok(records)
    }

    /// Remove one record. Returns `false` and writes nothing when `id` is unknown.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let mut history = self.history()?;
        let before = history.len();
        history.retain(|r| r.id != id);
        if history.len() == before {
            return Ok(false);
        }

        let mut latest = history.clone();
        sort_records(&mut latest, SortOrder::Descending);
        latest.truncate(LATEST_CAPACITY);

        self.write(&history, &latest)?;
        info!(id, "record deleted");
        Ok(true)
    }

    /// # Errors
    /// Returns an error if the store fails.
    pub fn clear_all(&mut self) -> Result<()> {
        self.write(&[], &[])?;
        info!("records cleared");
        Ok(())
    }

    /// CSV of the whole history in `order`.
    ///
    /// # Errors
    /// `NothingToExport` when the history is empty.
    pub fn export_csv(&self, order: SortOrder) -> Result<String> {
        let records = self.list_all(order)?;
        if records.is_empty() {
            return Err(CoreError::NothingToExport);
        }
        super::export::records_to_csv(&records, chrono::Local::now())
    }

    /// Both lists go out in one batch so they never disagree.
    fn write(&mut self, history: &[Record], latest: &[Record]) -> Result<()> {
        self.store.put_many(&[
            (keys::ALL_RECORDS, to_json(history)?),
            (keys::LATEST_RECORDS, to_json(latest)?),
        ])?;
        Ok(())
    }
}

fn sort_records(records: &mut [Record], order: SortOrder) {
    // sort_by is stable, which keeps ties in insertion order.
    match order {
        SortOrder::Ascending => records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
        SortOrder::Descending => records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
    }
}
