//! Periodic sampling loop for a [`TimerEngine`].
//!
//! One task owns the engine. Commands and ticks are serialized through a
//! single `select!`, and the tick arm is only enabled while the engine is
//! running, so once a pause or reset has been acknowledged no further tick
//! can touch the engine.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::clock::Clock;
use super::engine::{Reading, TimerEngine};
use crate::error::{CoreError, Result};
use crate::events::Event;

/// Default sampling cadence.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

const COMMAND_BUFFER: usize = 16;

enum Command {
    Start(oneshot::Sender<Option<Event>>),
    Pause(oneshot::Sender<Option<Event>>),
    Toggle(oneshot::Sender<Option<Event>>),
    Reset(oneshot::Sender<Option<Event>>),
    Read(oneshot::Sender<Reading>),
}

/// Handle to a running tick loop.
///
/// Dropping the handle without calling [`TickDriver::shutdown`] also stops
/// the loop; the engine is dropped with it.
pub struct TickDriver<C> {
    commands: mpsc::Sender<Command>,
    task: JoinHandle<TimerEngine<C>>,
}

impl<C> TickDriver<C>
where
    C: Clock + Send + 'static,
{
    /// Spawn the loop on the current tokio runtime with the default cadence.
    ///
    /// Every event the engine produces (transitions and ticks) is sent to
    /// `observer`. A closed observer does not stop the loop.
    pub fn spawn(engine: TimerEngine<C>, observer: mpsc::UnboundedSender<Event>) -> Self {
        Self::spawn_with_interval(engine, observer, TICK_INTERVAL)
    }

    pub fn spawn_with_interval(
        engine: TimerEngine<C>,
        observer: mpsc::UnboundedSender<Event>,
        period: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let task = tokio::spawn(run_loop(engine, rx, observer, period));
        Self { commands: tx, task }
    }

    pub async fn start(&self) -> Result<Option<Event>> {
        self.request(Command::Start).await
    }

    pub async fn pause(&self) -> Result<Option<Event>> {
        self.request(Command::Pause).await
    }

    pub async fn toggle(&self) -> Result<Option<Event>> {
        self.request(Command::Toggle).await
    }

    pub async fn reset(&self) -> Result<Option<Event>> {
        self.request(Command::Reset).await
    }

    /// Latest amount and elapsed time, from one sample.
    pub async fn reading(&self) -> Result<Reading> {
        self.request(Command::Read).await
    }

    /// Stop the loop and hand the engine back, e.g. to persist it.
    pub async fn shutdown(self) -> Result<TimerEngine<C>> {
        drop(self.commands);
        self.task.await.map_err(|_| CoreError::DriverStopped)
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| CoreError::DriverStopped)?;
        response.await.map_err(|_| CoreError::DriverStopped)
    }
}

async fn run_loop<C: Clock>(
    mut engine: TimerEngine<C>,
    mut commands: mpsc::Receiver<Command>,
    observer: mpsc::UnboundedSender<Event>,
    period: Duration,
) -> TimerEngine<C> {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            command = commands.recv() => {
                let Some(command) = command else { break };
                match command {
                    Command::Start(reply) => {
                        let event = engine.start();
                        if event.is_some() {
                            interval.reset();
                        }
                        notify(&observer, &event);
                        let _ = reply.send(event);
                    }
                    Command::Pause(reply) => {
                        let event = engine.pause();
                        notify(&observer, &event);
                        let _ = reply.send(event);
                    }
                    Command::Toggle(reply) => {
                        let event = engine.toggle();
                        if engine.is_running() {
                            interval.reset();
                        }
                        notify(&observer, &event);
                        let _ = reply.send(event);
                    }
                    Command::Reset(reply) => {
                        let event = engine.reset();
                        notify(&observer, &event);
                        let _ = reply.send(event);
                    }
                    Command::Read(reply) => {
                        engine.tick();
                        let _ = reply.send(engine.reading());
                    }
                }
            }

            _ = interval.tick(), if engine.is_running() => {
                let event = engine.tick();
                notify(&observer, &event);
            }
        }
    }

    debug!("tick driver stopped");
    engine
}

fn notify(observer: &mpsc::UnboundedSender<Event>, event: &Option<Event>) {
    if let Some(event) = event {
        let _ = observer.send(event.clone());
    }
}
