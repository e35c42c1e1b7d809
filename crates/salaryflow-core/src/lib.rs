//! # SalaryFlow Core Library
//!
//! This library provides the core logic for SalaryFlow, a "salary ticker"
//! that turns a salary into a per-second earning rate and shows money
//! accumulating in real time. The `salaryflow` CLI is a thin layer over it.
//!
//! ## Architecture
//!
//! - **Rate**: salary and work schedule to per-second/minute/hour rates
//! - **Timer Engine**: a wall-clock-based state machine; the caller (or a
//!   [`TickDriver`]) invokes `tick()` for progress updates
//! - **Records**: snapshots of earnings with a bounded "latest" list and CSV export
//! - **Storage**: string-keyed JSON values behind the [`KvStore`] trait, backed
//!   by SQLite or memory
//! - **Exchange**: a CNY-based rate table with pluggable refresh
//!
//! ## Key Components
//!
//! - [`Session`]: command interface over one user's state
//! - [`TimerEngine`]: core timer state machine
//! - [`RecordStore`]: record history persistence
//! - [`Preferences`]: work schedule, display and currency settings

pub mod currency;
pub mod error;
pub mod events;
pub mod exchange;
pub mod format;
pub mod rate;
pub mod records;
pub mod session;
pub mod storage;
pub mod timer;

pub use currency::Currency;
pub use error::{CoreError, PersistenceError, Result};
pub use events::Event;
pub use exchange::{update_rates, ExchangeRates, RateFetcher, RateTable, StaticRateFetcher};
pub use format::{format_amount, format_duration, format_money, format_signed_delta};
pub use rate::{compute_rate, parse_salary, EarningsRate, RateInput, SalaryPeriod};
pub use records::{Record, RecordStore, SortOrder};
pub use session::Session;
pub use storage::preferences::Theme;
pub use storage::{Database, KvStore, MemoryStore, Preferences};
pub use timer::{Clock, ManualClock, Reading, SystemClock, TickDriver, TimerEngine, TimerState};
