// Session task: drives one game shell from player commands and its timers.

use super::shell::Game;
use super::types::{SessionCommand, ShellSnapshot};
use std::future::pending;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{Instrument, debug, info, info_span};

/// Channels for talking to a running session.
pub struct SessionHandle {
    /// Sender for player commands into the session task.
    commands: mpsc::Sender<SessionCommand>,
    /// Latest view of the game, replaced after every change.
    snapshots: watch::Receiver<ShellSnapshot>,
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Queues a command. Fails once the session has exited.
    pub async fn send(
        &self,
        command: SessionCommand,
    ) -> Result<(), mpsc::error::SendError<SessionCommand>> {
        self.commands.send(command).await
    }

    pub fn snapshot(&self) -> ShellSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ShellSnapshot> {
        self.snapshots.clone()
    }

    /// Stops the session without running its back callback.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Waits for the session task to exit.
    pub async fn join(self) {
        if let Err(error) = self.task.await {
            debug!(%error, "session task ended abnormally");
        }
    }
}

/// Spawns the session task for `game`. `on_back` runs after teardown when the
/// player leaves with [`SessionCommand::Back`].
pub fn spawn_session<F>(game: Box<dyn Game>, capacity: usize, on_back: F) -> SessionHandle
where
    F: FnOnce() + Send + 'static,
{
    let (commands_tx, commands_rx) = mpsc::channel(capacity.max(1));
    let (snapshots_tx, snapshots_rx) = watch::channel(game.snapshot());
    let shutdown = Arc::new(Notify::new());

    let span = info_span!("session", game_id = %game.game_id());
    let task = tokio::spawn(
        session_task(game, commands_rx, snapshots_tx, shutdown.clone(), on_back).instrument(span),
    );

    SessionHandle {
        commands: commands_tx,
        snapshots: snapshots_rx,
        shutdown,
        task,
    }
}

enum Wake {
    Shutdown,
    Command(Option<SessionCommand>),
    Tick,
    Signal,
}

async fn session_task<F>(
    mut game: Box<dyn Game>,
    mut commands: mpsc::Receiver<SessionCommand>,
    snapshots: watch::Sender<ShellSnapshot>,
    shutdown: Arc<Notify>,
    on_back: F,
) where
    F: FnOnce(),
{
    info!("session opened");
    let mut countdown: Option<Interval> = None;
    let mut leaving = false;

    loop {
        let signal_at = game.wake_at();
        // Due timers are handled before commands queued at the same instant.
        let wake = tokio::select! {
            biased;
            _ = shutdown.notified() => Wake::Shutdown,
            _ = sleep_until(signal_at) => Wake::Signal,
            _ = next_tick(&mut countdown) => Wake::Tick,
            command = commands.recv() => Wake::Command(command),
        };

        match wake {
            Wake::Shutdown => break,
            Wake::Command(None) => {
                debug!("command channel closed");
                break;
            }
            Wake::Command(Some(SessionCommand::Back)) => {
                leaving = true;
                break;
            }
            Wake::Command(Some(command)) => {
                // A fresh round gets a fresh countdown phase.
                if apply(game.as_mut(), command) {
                    countdown = None;
                }
            }
            Wake::Tick => game.tick(),
            Wake::Signal => game.wake(),
        }

        rearm(&mut countdown, game.countdown());
        snapshots.send_replace(game.snapshot());
    }

    game.teardown();
    snapshots.send_replace(game.snapshot());
    info!(leaving, "session closed");
    if leaving {
        on_back();
    }
}

// Returns true when a new round began.
fn apply(game: &mut dyn Game, command: SessionCommand) -> bool {
    let began = match command {
        SessionCommand::Start => game.start(),
        SessionCommand::Restart => game.restart(),
        SessionCommand::Act(action) => {
            game.act(action);
            return false;
        }
        SessionCommand::End => {
            if let Err(error) = game.end() {
                debug!(%error, "end ignored");
            }
            return false;
        }
        SessionCommand::Back => return false,
    };

    match began {
        Ok(()) => true,
        Err(error) => {
            debug!(%error, "start ignored");
            false
        }
    }
}

fn rearm(countdown: &mut Option<Interval>, period: Option<Duration>) {
    match (period, countdown.is_some()) {
        (Some(period), false) => {
            // First tick lands one full period after the round starts.
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            *countdown = Some(interval);
        }
        (None, true) => *countdown = None,
        _ => {}
    }
}

async fn next_tick(countdown: &mut Option<Interval>) {
    match countdown {
        Some(interval) => {
            interval.tick().await;
        }
        None => pending::<()>().await,
    }
}

async fn sleep_until(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(Instant::from_std(deadline)).await,
        None => pending::<()>().await,
    }
}
