use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::currency::Currency;
use crate::timer::{SalarySource, TimerState};

/// Every state change in the system produces an Event.
/// The tick driver forwards them to its observer; the CLI prints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        elapsed_ms: u64,
        amount: f64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// Periodic sample while running.
    Tick {
        elapsed_ms: u64,
        amount: f64,
    },
    StateSnapshot {
        state: TimerState,
        elapsed_ms: u64,
        elapsed: String,
        amount: f64,
        rate_per_second: f64,
        rate_per_minute: f64,
        rate_per_hour: f64,
        currency: Currency,
        currency_symbol: String,
        /// Salary the rate was derived from, when known.
        salary: Option<SalarySource>,
        at: DateTime<Utc>,
    },
}
