pub mod calc;
pub mod prefs;
pub mod rates;
pub mod record;
pub mod theme;
pub mod timer;

use salaryflow_core::{Database, Session};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Session over the on-disk database.
pub fn open_session() -> Result<Session<Database>, Box<dyn std::error::Error>> {
    Ok(Session::open(Database::open()?)?)
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
