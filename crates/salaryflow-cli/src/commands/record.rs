use std::path::PathBuf;

use chrono::Local;
use clap::Subcommand;
use salaryflow_core::records::{display_time, export_filename};
use salaryflow_core::storage::preferences::DisplaySettings;
use salaryflow_core::{format_money, format_signed_delta, Record, SortOrder};
use serde_json::{json, Value};

use super::{open_session, print_json, CliResult};

#[derive(Subcommand)]
pub enum RecordAction {
    /// Record the amount earned so far
    Add,
    /// List all records (newest first)
    List {
        /// Oldest first
        #[arg(long)]
        asc: bool,
    },
    /// Show the three most recent records
    Latest,
    /// Delete a record by ID
    Delete {
        /// Record ID
        id: String,
    },
    /// Delete every record
    Clear,
    /// Export all records as CSV
    Export {
        /// Oldest first
        #[arg(long)]
        asc: bool,
        /// Output file (defaults to a timestamped name in the current directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn order(asc: bool) -> SortOrder {
    if asc {
        SortOrder::Ascending
    } else {
        SortOrder::Descending
    }
}

fn render(record: &Record, display: &DisplaySettings) -> Value {
    let code = record.currency.code();
    json!({
        "id": record.id,
        "time": display_time(record.timestamp, &Local::now()),
        "amount": format_money(record.amount, code, &record.currency_symbol, display),
        "delta": format_signed_delta(record.delta, code, &record.currency_symbol, display),
        "seconds": record.seconds,
        "record": record,
    })
}

pub fn run(action: RecordAction) -> CliResult {
    let mut session = open_session()?;
    let display = session.preferences().display.clone();

    match action {
        RecordAction::Add => {
            let record = session.record()?;
            print_json(&render(&record, &display))?;
        }
        RecordAction::List { asc } => {
            let records = session.records().list_all(order(asc))?;
            let rows: Vec<Value> = records.iter().map(|r| render(r, &display)).collect();
            print_json(&rows)?;
        }
        RecordAction::Latest => {
            let records = session.records().latest()?;
            let rows: Vec<Value> = records.iter().map(|r| render(r, &display)).collect();
            print_json(&rows)?;
        }
        RecordAction::Delete { id } => {
            if session.records().delete(&id)? {
                println!("deleted {id}");
            } else {
                // Unknown ids are a no-op.
                eprintln!("no record with id {id}");
            }
        }
        RecordAction::Clear => {
            session.records().clear_all()?;
            println!("all records cleared");
        }
        RecordAction::Export { asc, output } => {
            let csv = session.records().export_csv(order(asc))?;
            let path = output.unwrap_or_else(|| PathBuf::from(export_filename(Local::now())));
            std::fs::write(&path, csv)?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
