//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller (or [`super::TickDriver`]) is responsible for
//! calling `tick()` periodically.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!   ^________________/ (reset, from any state)
//! ```
//!
//! Elapsed time is always recomputed from a virtual start instant
//! (`now - accumulated` at the moment of starting), never accumulated tick by
//! tick, so late or coalesced ticks cannot drift.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(rate, Currency::Cny);
//! engine.start();
//! // In a loop:
//! engine.tick();
//! let amount = engine.current_amount();
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::clock::{Clock, SystemClock};
use crate::currency::Currency;
use crate::events::Event;
use crate::format::format_duration;
use crate::rate::{EarningsRate, SalaryPeriod};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// Salary figure the rate was derived from, kept for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalarySource {
    pub amount: f64,
    pub period: SalaryPeriod,
}

/// Earned amount and elapsed time taken from one elapsed-time sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub elapsed_ms: u64,
    pub elapsed_seconds: f64,
    pub amount: f64,
    pub currency: Currency,
}

/// Core timer engine.
///
/// Operates on wall-clock deltas -- no internal thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = "C: Default"))]
pub struct TimerEngine<C = SystemClock> {
    state: TimerState,
    rate: EarningsRate,
    currency: Currency,
    #[serde(default)]
    salary: Option<SalarySource>,
    /// `now - accumulated_ms` at the last start; `None` unless running.
    #[serde(default)]
    virtual_start_epoch_ms: Option<u64>,
    accumulated_ms: u64,
    #[serde(skip)]
    clock: C,
}

impl TimerEngine<SystemClock> {
    /// Create an idle engine on the wall clock.
    pub fn new(rate: EarningsRate, currency: Currency) -> Self {
        Self::with_clock(rate, currency, SystemClock)
    }
}

impl Default for TimerEngine<SystemClock> {
    fn default() -> Self {
        Self::new(EarningsRate::ZERO, Currency::default())
    }
}

impl<C: Clock> TimerEngine<C> {
    pub fn with_clock(rate: EarningsRate, currency: Currency, clock: C) -> Self {
        Self {
            state: TimerState::Idle,
            rate,
            currency,
            salary: None,
            virtual_start_epoch_ms: None,
            accumulated_ms: 0,
            clock,
        }
    }

    pub fn with_salary(mut self, amount: f64, period: SalaryPeriod) -> Self {
        self.salary = Some(SalarySource { amount, period });
        self
    }

    /// Reattach a clock after deserializing, which leaves `C::default()`.
    pub fn with_restored_clock(mut self, clock: C) -> Self {
        self.clock = clock;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn rate(&self) -> EarningsRate {
        self.rate
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn currency_symbol(&self) -> &'static str {
        self.currency.symbol()
    }

    pub fn salary(&self) -> Option<SalarySource> {
        self.salary
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.accumulated_ms
    }

    /// `rate × elapsed seconds`, as of the last tick or transition.
    pub fn current_amount(&self) -> f64 {
        self.rate.amount_for_ms(self.accumulated_ms)
    }

    pub fn reading(&self) -> Reading {
        let elapsed_ms = self.accumulated_ms;
        Reading {
            elapsed_ms,
            elapsed_seconds: elapsed_ms as f64 / 1000.0,
            amount: self.rate.amount_for_ms(elapsed_ms),
            currency: self.currency,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let reading = self.reading();
        Event::StateSnapshot {
            state: self.state,
            elapsed_ms: reading.elapsed_ms,
            elapsed: format_duration(reading.elapsed_seconds),
            amount: reading.amount,
            rate_per_second: self.rate.per_second(),
            rate_per_minute: self.rate.per_minute(),
            rate_per_hour: self.rate.per_hour(),
            currency: self.currency,
            currency_symbol: self.currency_symbol().to_string(),
            salary: self.salary(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => None, // Already running.
            TimerState::Idle | TimerState::Paused => {
                let now = self.clock.now_ms();
                self.virtual_start_epoch_ms = Some(now.saturating_sub(self.accumulated_ms));
                self.state = TimerState::Running;
                debug!(elapsed_ms = self.accumulated_ms, "timer started");
                Some(Event::TimerStarted {
                    elapsed_ms: self.accumulated_ms,
                    at: Utc::now(),
                })
            }
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                // Flush elapsed time first.
                self.flush_elapsed();
                self.state = TimerState::Paused;
                self.virtual_start_epoch_ms = None;
                debug!(elapsed_ms = self.accumulated_ms, "timer paused");
                Some(Event::TimerPaused {
                    elapsed_ms: self.accumulated_ms,
                    amount: self.current_amount(),
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Start when stopped, pause when running.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.pause();
        self.state = TimerState::Idle;
        self.virtual_start_epoch_ms = None;
        self.accumulated_ms = 0;
        debug!("timer reset");
        Some(Event::TimerReset { at: Utc::now() })
    }

    /// Call periodically. Returns `Some(Event::Tick)` while running.
    pub fn tick(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                self.flush_elapsed();
                Some(Event::Tick {
                    elapsed_ms: self.accumulated_ms,
                    amount: self.current_amount(),
                })
            }
            _ => None,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush_elapsed(&mut self) {
        if let Some(start) = self.virtual_start_epoch_ms {
            self.accumulated_ms = self.clock.now_ms().saturating_sub(start);
        }
    }
}
