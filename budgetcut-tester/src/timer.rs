//! Real-time driver: one task owns the session and serializes every action.
//!
//! Player [`Command`]s and the once-per-period ticker share one channel, so a
//! tick can never interleave with a cut. The ticker is started when a run
//! begins and aborted as soon as the session leaves `Running`. Only the
//! [`TimerDriver`] handle holds a strong sender, so dropping it closes the
//! channel and ends the owner task.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use budgetcut_game::{Command, CueSink, GameSession, GameState, Transition};
use log::{debug, info};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

const CHANNEL_CAPACITY: usize = 64;

enum Request {
    Command {
        command: Command,
        reply: oneshot::Sender<Transition>,
    },
    /// One period elapsed on the ticker spawned as `generation`.
    Tick { generation: u64 },
    Shutdown,
}

/// Handle to a running driver task.
pub struct TimerDriver<S: CueSink> {
    requests: mpsc::Sender<Request>,
    states: watch::Receiver<GameState>,
    task: JoinHandle<GameSession<S>>,
}

impl<S> TimerDriver<S>
where
    S: CueSink + Send + 'static,
{
    /// Spawn the owner task. `period` is the length of one game second.
    #[must_use]
    pub fn spawn(session: GameSession<S>, period: Duration) -> Self {
        let (requests, inbox) = mpsc::channel(CHANNEL_CAPACITY);
        let (publisher, states) = watch::channel(session.state().clone());
        let task = tokio::spawn(run_owner(
            session,
            inbox,
            requests.downgrade(),
            publisher,
            period,
        ));
        Self {
            requests,
            states,
            task,
        }
    }

    /// Queue a command and wait for the transition it produced.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver task has already stopped.
    pub async fn send(&self, command: Command) -> Result<Transition> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Command { command, reply })
            .await
            .map_err(|_| anyhow!("timer driver stopped"))?;
        response.await.context("timer driver dropped the reply")
    }

    /// Latest state published by the owner task.
    #[must_use]
    pub fn state(&self) -> GameState {
        self.states.borrow().clone()
    }

    /// Wait until the owner publishes a newer state.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver task has stopped.
    pub async fn changed(&mut self) -> Result<GameState> {
        self.states
            .changed()
            .await
            .map_err(|_| anyhow!("timer driver stopped"))?;
        Ok(self.states.borrow_and_update().clone())
    }

    /// Stop the ticker and owner task, returning the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner task panicked or was cancelled.
    pub async fn shutdown(self) -> Result<GameSession<S>> {
        // A closed channel means the owner already exited; join either way.
        let _ = self.requests.send(Request::Shutdown).await;
        self.task.await.context("timer driver task failed")
    }
}

async fn run_owner<S: CueSink>(
    mut session: GameSession<S>,
    mut inbox: mpsc::Receiver<Request>,
    requests: mpsc::WeakSender<Request>,
    publisher: watch::Sender<GameState>,
    period: Duration,
) -> GameSession<S> {
    let mut ticker: Option<JoinHandle<()>> = None;
    let mut generation = 0_u64;

    while let Some(request) = inbox.recv().await {
        let (command, reply) = match request {
            Request::Command { command, reply } => (command, Some(reply)),
            // Ticks queued by a ticker that has since been stopped.
            Request::Tick { generation: sent } if sent != generation => continue,
            Request::Tick { .. } => (Command::Tick, None),
            Request::Shutdown => break,
        };
        if matches!(command, Command::Start) {
            stop_ticker(&mut ticker);
        }
        let label = command.label();
        let transition = session.handle(command);
        debug!("driver applied {label}: {transition:?}");

        if session.timer_should_run() {
            if ticker.is_none() {
                generation += 1;
                info!("clock started ({period:?} per second)");
                ticker = Some(spawn_ticker(requests.clone(), period, generation));
            }
        } else {
            stop_ticker(&mut ticker);
        }

        publisher.send_replace(session.state().clone());
        if let Some(reply) = reply {
            // The caller may have given up waiting.
            let _ = reply.send(transition);
        }
    }

    stop_ticker(&mut ticker);
    session
}

fn stop_ticker(ticker: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = ticker.take() {
        handle.abort();
        info!("clock stopped");
    }
}

fn spawn_ticker(
    requests: mpsc::WeakSender<Request>,
    period: Duration,
    generation: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let Some(requests) = requests.upgrade() else {
                break;
            };
            if requests.send(Request::Tick { generation }).await.is_err() {
                break;
            }
        }
    })
}
