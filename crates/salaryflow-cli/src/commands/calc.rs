use clap::Args;
use salaryflow_core::{format_money, parse_salary, Currency, RateInput, SalaryPeriod};
use serde_json::json;

use super::{open_session, print_json, CliResult};

#[derive(Args)]
pub struct CalcArgs {
    /// Salary amount (commas allowed, e.g. 365,000)
    salary: String,
    /// Salary period: year or month
    #[arg(long, default_value = "year")]
    period: String,
    /// Salary currency code (defaults to the preferred input currency)
    #[arg(long)]
    currency: Option<String>,
    /// Compute rates without starting the timer
    #[arg(long)]
    no_start: bool,
}

pub fn run(args: CalcArgs) -> CliResult {
    let salary = parse_salary(&args.salary)?;
    let period: SalaryPeriod = args.period.parse()?;

    let mut session = open_session()?;
    let currency = match args.currency.as_deref() {
        Some(code) => code.parse::<Currency>()?,
        None => session.preferences().currency.default_input_currency,
    };

    let rate = session.begin(salary, period, currency, !args.no_start)?;
    let prefs = session.preferences();
    let working_days = RateInput::from_work_settings(salary, period, &prefs.work).working_days()?;
    let money = |amount: f64| format_money(amount, currency.code(), currency.symbol(), &prefs.display);

    print_json(&json!({
        "salary": salary,
        "period": period,
        "currency": currency,
        "workingDays": working_days,
        "perSecond": rate.per_second(),
        "perMinute": rate.per_minute(),
        "perHour": rate.per_hour(),
        "formatted": {
            "perSecond": money(rate.per_second()),
            "perMinute": money(rate.per_minute()),
            "perHour": money(rate.per_hour()),
        },
        "state": session.engine().state(),
    }))
}
