//! Salary to per-second earnings rate.
//!
//! Working days per year are modelled as 365 calendar days minus 52 weeks of
//! non-working weekdays minus vacation days.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::storage::preferences::WorkSettings;

const DAYS_PER_YEAR: i64 = 365;
const WEEKS_PER_YEAR: i64 = 52;
const SECONDS_PER_HOUR: f64 = 3600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalaryPeriod {
    Year,
    Month,
}

impl SalaryPeriod {
    fn periods_per_year(&self) -> f64 {
        match self {
            SalaryPeriod::Year => 1.0,
            SalaryPeriod::Month => 12.0,
        }
    }
}

impl fmt::Display for SalaryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SalaryPeriod::Year => f.write_str("year"),
            SalaryPeriod::Month => f.write_str("month"),
        }
    }
}

impl FromStr for SalaryPeriod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "year" | "yearly" | "annual" => Ok(SalaryPeriod::Year),
            "month" | "monthly" => Ok(SalaryPeriod::Month),
            other => Err(CoreError::invalid_input(
                "salary_period",
                format!("expected 'year' or 'month', got '{other}'"),
            )),
        }
    }
}

/// Everything needed to derive an earnings rate. Built per calculation, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct RateInput {
    pub salary_amount: f64,
    pub salary_period: SalaryPeriod,
    pub work_days_per_week: u8,
    pub work_hours_per_day: f64,
    pub vacation_days_per_year: u32,
}

impl RateInput {
    pub fn from_work_settings(salary_amount: f64, salary_period: SalaryPeriod, work: &WorkSettings) -> Self {
        Self {
            salary_amount,
            salary_period,
            work_days_per_week: work.days_per_week,
            work_hours_per_day: work.hours_per_day,
            vacation_days_per_year: work.vacation_days,
        }
    }

    /// Calendar days worked per year.
    ///
    /// # Errors
    /// `InvalidSchedule` when days per week is outside 1..=7 or the result is not positive.
    pub fn working_days(&self) -> Result<i64> {
        if !(1..=7).contains(&self.work_days_per_week) {
            return Err(CoreError::InvalidSchedule(format!(
                "work days per week must be between 1 and 7, got {}",
                self.work_days_per_week
            )));
        }
        let weekend_days = WEEKS_PER_YEAR * (7 - i64::from(self.work_days_per_week));
        let days = DAYS_PER_YEAR - weekend_days - i64::from(self.vacation_days_per_year);
        if days <= 0 {
            return Err(CoreError::InvalidSchedule(format!(
                "schedule leaves {days} working days per year"
            )));
        }
        Ok(days)
    }
}

/// Currency units earned per elapsed second of work.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EarningsRate(f64);

impl EarningsRate {
    pub const ZERO: EarningsRate = EarningsRate(0.0);

    pub fn per_second(&self) -> f64 {
        self.0
    }

    pub fn per_minute(&self) -> f64 {
        self.0 * 60.0
    }

    pub fn per_hour(&self) -> f64 {
        self.0 * SECONDS_PER_HOUR
    }

    /// Amount earned over `elapsed_ms` milliseconds.
    pub fn amount_for_ms(&self, elapsed_ms: u64) -> f64 {
        self.0 * (elapsed_ms as f64 / 1000.0)
    }
}

/// Derive the per-second rate for a salary and work schedule.
///
/// # Errors
/// `InvalidInput` for a non-positive salary or hours per day,
/// `InvalidSchedule` for a schedule with no working days.
pub fn compute_rate(input: &RateInput) -> Result<EarningsRate> {
    if !input.salary_amount.is_finite() || input.salary_amount <= 0.0 {
        return Err(CoreError::invalid_input(
            "salary_amount",
            "salary must be a positive number",
        ));
    }
    if !input.work_hours_per_day.is_finite()
        || input.work_hours_per_day <= 0.0
        || input.work_hours_per_day > 24.0
    {
        return Err(CoreError::invalid_input(
            "work_hours_per_day",
            "hours per day must be greater than 0 and at most 24",
        ));
    }

    let working_days = input.working_days()?;
    let annual = input.salary_amount * input.salary_period.periods_per_year();
    let rate = annual / working_days as f64 / input.work_hours_per_day / SECONDS_PER_HOUR;
    Ok(EarningsRate(rate))
}

/// Parse a salary typed by the user.
///
/// # Errors
/// `InvalidInput` when the text is not a positive number.
pub fn parse_salary(text: &str) -> Result<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(CoreError::invalid_input(
            "salary_amount",
            format!("'{}' is not a valid salary amount", text.trim()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn input(salary: f64, period: SalaryPeriod) -> RateInput {
        RateInput {
            salary_amount: salary,
            salary_period: period,
            work_days_per_week: 5,
            work_hours_per_day: 8.0,
            vacation_days_per_year: 15,
        }
    }

    #[test]
    fn reference_schedule() {
        let i = input(365_000.0, SalaryPeriod::Year);
        assert_eq!(i.working_days().unwrap(), 246);
        let rate = compute_rate(&i).unwrap();
        let expected = 365_000.0 / 246.0 / 8.0 / 3600.0;
        assert!((rate.per_second() - expected).abs() < 1e-12);
        assert!((rate.per_second() - 0.05148).abs() < 1e-5);
    }

    #[test]
    fn monthly_salary_is_annualized() {
        let monthly = compute_rate(&input(10_000.0, SalaryPeriod::Month)).unwrap();
        let yearly = compute_rate(&input(120_000.0, SalaryPeriod::Year)).unwrap();
        assert!((monthly.per_second() - yearly.per_second()).abs() < 1e-12);
    }

    #[test]
    fn derived_views() {
        let rate = compute_rate(&input(365_000.0, SalaryPeriod::Year)).unwrap();
        assert!((rate.per_minute() - rate.per_second() * 60.0).abs() < 1e-12);
        assert!((rate.per_hour() - rate.per_second() * 3600.0).abs() < 1e-9);
        assert!((rate.amount_for_ms(10_000) - rate.per_second() * 10.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_positive_salary() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = compute_rate(&input(bad, SalaryPeriod::Year)).unwrap_err();
            assert!(matches!(err, CoreError::InvalidInput { .. }));
        }
    }

    #[test]
    fn rejects_degenerate_schedules() {
        let mut i = input(1000.0, SalaryPeriod::Year);
        i.work_days_per_week = 0;
        assert!(matches!(compute_rate(&i), Err(CoreError::InvalidSchedule(_))));

        i.work_days_per_week = 8;
        assert!(matches!(compute_rate(&i), Err(CoreError::InvalidSchedule(_))));

        // One day a week: 365 - 312 = 53 days before vacation.
        i.work_days_per_week = 1;
        i.vacation_days_per_year = 53;
        assert!(matches!(compute_rate(&i), Err(CoreError::InvalidSchedule(_))));
        i.vacation_days_per_year = 52;
        assert_eq!(i.working_days().unwrap(), 1);
    }

    #[test]
    fn rejects_bad_hours() {
        let mut i = input(1000.0, SalaryPeriod::Year);
        i.work_hours_per_day = 0.0;
        assert!(matches!(compute_rate(&i), Err(CoreError::InvalidInput { .. })));
        i.work_hours_per_day = 25.0;
        assert!(matches!(compute_rate(&i), Err(CoreError::InvalidInput { .. })));
    }

    #[test]
    fn parse_salary_inputs() {
        assert_eq!(parse_salary(" 12000 ").unwrap(), 12000.0);
        assert_eq!(parse_salary("1,200,000.5").unwrap(), 1_200_000.5);
        assert!(parse_salary("abc").is_err());
        assert!(parse_salary("").is_err());
        assert!(parse_salary("-5").is_err());
    }

    #[test]
    fn parse_period() {
        assert_eq!("Month".parse::<SalaryPeriod>().unwrap(), SalaryPeriod::Month);
        assert_eq!("year".parse::<SalaryPeriod>().unwrap(), SalaryPeriod::Year);
        assert!("week".parse::<SalaryPeriod>().is_err());
    }

    proptest! {
        #[test]
        fn rate_is_linear_in_salary(
            salary in 1.0f64..1.0e8,
            days in 1u8..=7,
            hours in 0.5f64..24.0,
            vacation in 0u32..40,
        ) {
            let base = RateInput {
                salary_amount: salary,
                salary_period: SalaryPeriod::Year,
                work_days_per_week: days,
                work_hours_per_day: hours,
                vacation_days_per_year: vacation,
            };
            prop_assume!(base.working_days().is_ok());
            let doubled = RateInput { salary_amount: salary * 2.0, ..base.clone() };
            let r1 = compute_rate(&base).unwrap().per_second();
            let r2 = compute_rate(&doubled).unwrap().per_second();
            prop_assert!((r2 - 2.0 * r1).abs() <= 1e-12 * r2.abs().max(1.0));
        }
    }
}
