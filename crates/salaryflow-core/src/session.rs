//! Command interface over one user's state.
//!
//! A [`Session`] owns the store handle, the loaded preferences and the current
//! timer engine. Each user action is one method returning a result; rendering
//! is left to the caller. The engine is written back to the store after every
//! command so a new process can pick up a running timer where it left off.

use tracing::debug;

use crate::currency::Currency;
use crate::error::Result;
use crate::events::Event;
use crate::exchange::ExchangeRates;
use crate::format::format_money;
use crate::rate::{compute_rate, EarningsRate, RateInput, SalaryPeriod};
use crate::records::{Record, RecordStore};
use crate::storage::preferences::Theme;
use crate::storage::{keys, load_json, save_json, KvStore, Preferences};
use crate::timer::{Clock, SystemClock, TimerEngine};

pub struct Session<S, C = SystemClock> {
    store: S,
    prefs: Preferences,
    engine: TimerEngine<C>,
    clock: C,
}

impl<S: KvStore> Session<S, SystemClock> {
    /// Load preferences and the persisted engine from `store`.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub fn open(store: S) -> Result<Self> {
        Self::open_with_clock(store, SystemClock)
    }
}

impl<S, C> Session<S, C>
where
    S: KvStore,
    C: Clock + Clone + Default,
{
    /// # Errors
    /// Returns an error if the store fails.
    pub fn open_with_clock(store: S, clock: C) -> Result<Self> {
        let prefs = Preferences::load(&store)?;
        let engine = match load_json::<TimerEngine<C>>(&store, keys::TIMER_ENGINE)? {
            Some(engine) => engine.with_restored_clock(clock.clone()),
            None => TimerEngine::with_clock(
                EarningsRate::ZERO,
                prefs.currency.default_input_currency,
                clock.clone(),
            ),
        };
        Ok(Self {
            store,
            prefs,
            engine,
            clock,
        })
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// Validate and persist a full set of preferences.
    ///
    /// # Errors
    /// Returns an error if validation or the store fails; the session keeps
    /// the previous preferences in that case.
    pub fn save_preferences(&mut self, prefs: Preferences) -> Result<()> {
        prefs.save(&mut self.store)?;
        self.prefs = prefs;
        Ok(())
    }

    /// # Errors
    /// Returns an error if the store fails.
    pub fn theme(&self) -> Result<Theme> {
        Theme::load(&self.store)
    }

    /// # Errors
    /// Returns an error if the store fails.
    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        theme.save(&mut self.store)
    }

    pub fn engine(&self) -> &TimerEngine<C> {
        &self.engine
    }

    /// Swap in an engine (e.g. one handed back by a tick driver) and persist it.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub fn replace_engine(&mut self, engine: TimerEngine<C>) -> Result<()> {
        self.engine = engine;
        self.persist_engine()
    }

    /// Start a new calculation: derive the rate from the stored work schedule
    /// and replace the current engine with a fresh one.
    ///
    /// # Errors
    /// `InvalidInput` / `InvalidSchedule` from the rate calculator, or a store error.
    pub fn begin(
        &mut self,
        salary: f64,
        period: SalaryPeriod,
        currency: Currency,
        auto_start: bool,
    ) -> Result<EarningsRate> {
        let input = RateInput::from_work_settings(salary, period, &self.prefs.work);
        let rate = compute_rate(&input)?;
        debug!(rate = rate.per_second(), %currency, "calculation started");

        self.engine = TimerEngine::with_clock(rate, currency, self.clock.clone()).with_salary(salary, period);
        if auto_start {
            self.engine.start();
        }
        self.persist_engine()?;
        Ok(rate)
    }

    /// # Errors
    /// Returns an error if the store fails.
    pub fn start(&mut self) -> Result<Option<Event>> {
        let event = self.engine.start();
        self.persist_engine()?;
        Ok(event)
    }

    /// # Errors
    /// Returns an error if the store fails.
    pub fn pause(&mut self) -> Result<Option<Event>> {
        let event = self.engine.pause();
        self.persist_engine()?;
        Ok(event)
    }

    /// # Errors
    /// Returns an error if the store fails.
    pub fn toggle(&mut self) -> Result<Option<Event>> {
        let event = self.engine.toggle();
        self.persist_engine()?;
        Ok(event)
    }

    /// # Errors
    /// Returns an error if the store fails.
    pub fn reset(&mut self) -> Result<Option<Event>> {
        let event = self.engine.reset();
        self.persist_engine()?;
        Ok(event)
    }

    /// Sample the clock and return a full snapshot.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub fn status(&mut self) -> Result<Event> {
        self.engine.tick();
        self.persist_engine()?;
        Ok(self.engine.snapshot())
    }

    /// Record the amount earned so far.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub fn record(&mut self) -> Result<Record> {
        self.engine.tick();
        let record = RecordStore::new(&mut self.store).record_snapshot(&self.engine)?;
        self.persist_engine()?;
        Ok(record)
    }

    /// Record history bound to this session's store.
    pub fn records(&mut self) -> RecordStore<&mut S> {
        RecordStore::new(&mut self.store)
    }

    /// # Errors
    /// Returns an error if the store fails.
    pub fn exchange_rates(&self) -> Result<ExchangeRates> {
        ExchangeRates::load(&self.store)
    }

    /// Current amount converted to the default display currency and formatted.
    ///
    /// # Errors
    /// `UnknownCurrency` when the stored rate table lacks either currency.
    pub fn display_amount(&self) -> Result<String> {
        let from = self.engine.currency();
        let to = self.prefs.currency.default_display_currency;
        let amount = if from == to {
            self.engine.current_amount()
        } else {
            self.exchange_rates()?
                .rates
                .convert(self.engine.current_amount(), from.code(), to.code())?
        };
        Ok(format_money(amount, to.code(), to.symbol(), &self.prefs.display))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn persist_engine(&mut self) -> Result<()> {
        save_json(&mut self.store, keys::TIMER_ENGINE, &self.engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::timer::{ManualClock, TimerState};
    use std::time::Duration;

    fn session() -> (Session<MemoryStore, ManualClock>, ManualClock) {
        let clock = ManualClock::new(1_000_000);
        let session = Session::open_with_clock(MemoryStore::new(), clock.clone()).unwrap();
        (session, clock)
    }

    #[test]
    fn begin_uses_stored_schedule() {
        let (mut s, _clock) = session();
        let rate = s.begin(365_000.0, SalaryPeriod::Year, Currency::Cny, false).unwrap();
        assert!((rate.per_second() - 365_000.0 / 246.0 / 8.0 / 3600.0).abs() < 1e-12);
        assert_eq!(s.engine().state(), TimerState::Idle);

        let mut prefs = s.preferences().clone();
        prefs.work.vacation_days = 0;
        s.save_preferences(prefs).unwrap();
        let rate = s.begin(365_000.0, SalaryPeriod::Year, Currency::Cny, true).unwrap();
        assert!((rate.per_second() - 365_000.0 / 261.0 / 8.0 / 3600.0).abs() < 1e-12);
        assert!(s.engine().is_running());
    }

    #[test]
    fn begin_rejects_bad_salary_without_touching_engine() {
        let (mut s, clock) = session();
        s.begin(1000.0, SalaryPeriod::Month, Currency::Usd, true).unwrap();
        clock.advance(Duration::from_secs(3));
        assert!(s.begin(-5.0, SalaryPeriod::Month, Currency::Usd, true).is_err());
        assert!(s.engine().is_running());
        assert_eq!(s.engine().currency(), Currency::Usd);
    }

    #[test]
    fn engine_survives_reopen() {
        let (mut s, clock) = session();
        s.begin(120_000.0, SalaryPeriod::Year, Currency::Eur, true).unwrap();
        clock.advance(Duration::from_secs(30));
        let store = s.into_store();

        let mut reopened = Session::open_with_clock(store, clock.clone()).unwrap();
        clock.advance(Duration::from_secs(30));
        reopened.status().unwrap();
        assert_eq!(reopened.engine().elapsed_ms(), 60_000);
        assert_eq!(reopened.engine().currency(), Currency::Eur);
    }

    #[test]
    fn record_samples_the_clock() {
        let (mut s, clock) = session();
        let rate = s.begin(365_000.0, SalaryPeriod::Year, Currency::Cny, true).unwrap();
        clock.advance(Duration::from_secs(10));
        let first = s.record().unwrap();
        assert_eq!(first.seconds, 10.0);
        assert!((first.amount - rate.per_second() * 10.0).abs() < 1e-9);
        assert_eq!(first.delta, first.amount);

        clock.advance(Duration::from_secs(5));
        let second = s.record().unwrap();
        assert_eq!(second.delta, second.amount - first.amount);
        assert_eq!(s.records().history().unwrap().len(), 2);
    }

    #[test]
    fn pause_then_status_keeps_amount() {
        let (mut s, clock) = session();
        s.begin(365_000.0, SalaryPeriod::Year, Currency::Cny, true).unwrap();
        clock.advance(Duration::from_secs(5));
        s.pause().unwrap();
        let before = s.engine().current_amount();
        clock.advance(Duration::from_secs(100));
        s.status().unwrap();
        assert_eq!(s.engine().current_amount(), before);
    }

    #[test]
    fn display_amount_converts_to_display_currency() {
        let (mut s, clock) = session();
        let mut prefs = s.preferences().clone();
        prefs.currency.default_display_currency = Currency::Usd;
        s.save_preferences(prefs).unwrap();

        // 1 CNY per second.
        s.begin(246.0 * 8.0 * 3600.0, SalaryPeriod::Year, Currency::Cny, true).unwrap();
        clock.advance(Duration::from_secs(1000));
        s.status().unwrap();
        assert_eq!(s.display_amount().unwrap(), "$ 139.40");
    }

    #[test]
    fn display_amount_in_same_currency() {
        let (mut s, clock) = session();
        s.begin(246.0 * 8.0 * 3600.0, SalaryPeriod::Year, Currency::Cny, true).unwrap();
        clock.advance(Duration::from_secs(1234));
        s.status().unwrap();
        assert_eq!(s.display_amount().unwrap(), "¥ 1,234.00");
    }

    #[test]
    fn theme_roundtrip() {
        let (mut s, _clock) = session();
        assert_eq!(s.theme().unwrap(), Theme::Light);
        s.set_theme(Theme::Dark).unwrap();
        assert_eq!(s.theme().unwrap(), Theme::Dark);
    }

    #[test]
    fn failing_store_surfaces_errors() {
        let clock = ManualClock::new(0);
        assert!(Session::open_with_clock(MemoryStore::failing(), clock.clone()).is_err());

        let mut s = Session::open_with_clock(MemoryStore::new(), clock).unwrap();
        s.store_mut().set_failing(true);
        assert!(s.start().is_err());
        assert!(s.record().is_err());
    }
}
