use clap::Subcommand;
use salaryflow_core::Theme;

use super::{open_session, CliResult};

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Print the current theme
    Show,
    /// Switch between light and dark
    Toggle,
    /// Set the theme explicitly
    Set {
        /// light or dark
        theme: String,
    },
}

pub fn run(action: ThemeAction) -> CliResult {
    let mut session = open_session()?;

    let theme = match action {
        ThemeAction::Show => session.theme()?,
        ThemeAction::Toggle => {
            let theme = session.theme()?.toggle();
            session.set_theme(theme)?;
            theme
        }
        ThemeAction::Set { theme } => {
            let theme: Theme = theme.parse()?;
            session.set_theme(theme)?;
            theme
        }
    };
    println!("{theme}");
    Ok(())
}
