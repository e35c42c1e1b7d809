use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "salaryflow", version, about = "SalaryFlow CLI: watch your salary tick")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate earning rates from a salary and start the timer
    Calc(commands::calc::CalcArgs),
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Earnings records
    Record {
        #[command(subcommand)]
        action: commands::record::RecordAction,
    },
    /// Preferences management
    Prefs {
        #[command(subcommand)]
        action: commands::prefs::PrefsAction,
    },
    /// Light/dark theme
    Theme {
        #[command(subcommand)]
        action: commands::theme::ThemeAction,
    },
    /// Exchange rates
    Rates {
        #[command(subcommand)]
        action: commands::rates::RatesAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SALARYFLOW_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Calc(args) => commands::calc::run(args),
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Record { action } => commands::record::run(action),
        Commands::Prefs { action } => commands::prefs::run(action),
        Commands::Theme { action } => commands::theme::run(action),
        Commands::Rates { action } => commands::rates::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
