use clap::Subcommand;
use salaryflow_core::Preferences;

use super::{open_session, print_json, CliResult};

#[derive(Subcommand)]
pub enum PrefsAction {
    /// Get a preference value
    Get {
        /// Dot-separated key (e.g. "work.daysPerWeek", "display.decimalPlaces")
        key: String,
    },
    /// Set a preference value
    Set {
        /// Dot-separated key
        key: String,
        /// New value
        value: String,
    },
    /// List all preferences
    List,
    /// Reset preferences to defaults
    Reset,
}

pub fn run(action: PrefsAction) -> CliResult {
    let mut session = open_session()?;

    match action {
        PrefsAction::Get { key } => match session.preferences().get(&key) {
            Some(value) => println!("{value}"),
            None => {
                eprintln!("unknown key: {key}");
                std::process::exit(1);
            }
        },
        PrefsAction::Set { key, value } => {
            let mut prefs = session.preferences().clone();
            prefs.set(&key, &value)?;
            session.save_preferences(prefs)?;
            println!("ok");
        }
        PrefsAction::List => print_json(session.preferences())?,
        PrefsAction::Reset => {
            session.save_preferences(Preferences::default())?;
            println!("preferences reset to defaults");
        }
    }
    Ok(())
}
