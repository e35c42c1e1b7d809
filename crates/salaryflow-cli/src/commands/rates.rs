use chrono::Utc;
use clap::Subcommand;
use salaryflow_core::{format_money, update_rates, Currency, StaticRateFetcher};
use serde_json::json;

use super::{open_session, print_json, CliResult};

#[derive(Subcommand)]
pub enum RatesAction {
    /// Print the stored exchange-rate table (CNY = 1)
    Show,
    /// Refresh the exchange-rate table
    Update,
    /// Convert an amount between currencies
    Convert {
        amount: String,
        /// Source currency code
        from: String,
        /// Target currency code
        to: String,
    },
}

pub fn run(action: RatesAction) -> CliResult {
    let mut session = open_session()?;

    match action {
        RatesAction::Show => {
            let rates = session.exchange_rates()?;
            let stale = rates.is_stale(&session.preferences().exchange_rate, Utc::now());
            print_json(&json!({
                "rates": rates.rates,
                "lastUpdated": rates.last_updated,
                "stale": stale,
            }))?;
        }
        RatesAction::Update => {
            let settings = session.preferences().exchange_rate.clone();
            let updated = update_rates(
                session.store_mut(),
                &StaticRateFetcher::default(),
                &settings,
                Utc::now(),
            )?;
            print_json(&updated)?;
        }
        RatesAction::Convert { amount, from, to } => {
            let amount: f64 = amount.replace(',', "").trim().parse()?;
            let from: Currency = from.parse()?;
            let to: Currency = to.parse()?;
            let converted = session
                .exchange_rates()?
                .rates
                .convert(amount, from.code(), to.code())?;
            print_json(&json!({
                "amount": converted,
                "currency": to,
                "display": format_money(converted, to.code(), to.symbol(), &session.preferences().display),
            }))?;
        }
    }
    Ok(())
}
