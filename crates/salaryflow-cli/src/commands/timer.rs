use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use salaryflow_core::{format_duration, format_money, Database, Event, Session, TickDriver};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::debug;

use super::{open_session, print_json, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume ticking
    Start,
    /// Pause ticking, keeping the amount earned so far
    Pause,
    /// Start if not running, otherwise pause
    Toggle,
    /// Back to idle with zero elapsed time
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Show the amount ticking live until Ctrl-C
    Watch {
        /// Stop after this many seconds
        #[arg(long)]
        seconds: Option<u64>,
    },
}

pub fn run(action: TimerAction) -> CliResult {
    let mut session = open_session()?;

    let event = match action {
        TimerAction::Start => session.start()?,
        TimerAction::Pause => session.pause()?,
        TimerAction::Toggle => session.toggle()?,
        TimerAction::Reset => session.reset()?,
        TimerAction::Status => {
            let snapshot = session.status()?;
            return print_json(&json!({
                "snapshot": snapshot,
                "display": session.display_amount()?,
            }));
        }
        TimerAction::Watch { seconds } => return watch(session, seconds),
    };

    match event {
        Some(event) => print_json(&event),
        // No transition happened; show where the timer is.
        None => print_json(&session.status()?),
    }
}

fn watch(mut session: Session<Database>, seconds: Option<u64>) -> CliResult {
    let currency = session.engine().currency();
    let display = session.preferences().display.clone();
    let runtime = tokio::runtime::Runtime::new()?;
    debug!(?seconds, "watch started");

    let engine = runtime.block_on(async {
        let (tx, mut events) = mpsc::unbounded_channel();
        let driver = TickDriver::spawn(session.engine().clone(), tx);
        if !session.engine().is_running() {
            driver.start().await?;
        }

        let limit = async {
            match seconds {
                Some(s) => tokio::time::sleep(Duration::from_secs(s)).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(limit);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => break,
                _ = &mut limit => break,
                Some(event) = events.recv() => {
                    if let Event::Tick { elapsed_ms, amount } = event {
                        let mut out = std::io::stdout().lock();
                        let _ = write!(
                            out,
                            "\r{}  {}",
                            format_duration(elapsed_ms as f64 / 1000.0),
                            format_money(amount, currency.code(), currency.symbol(), &display),
                        );
                        let _ = out.flush();
                    }
                }
            }
        }
        println!();
        debug!("watch stopped");
        driver.shutdown().await
    })?;

    session.replace_engine(engine)?;
    print_json(&session.status()?)
}
