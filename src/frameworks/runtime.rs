// Framework bootstrap for the arcade runtime and its terminal hub.

use crate::domain::ports::{Clock, IdentitySource, SystemClock};
use crate::frameworks::config;
use crate::interface_adapters::clients::{AuthClient, SignUpOutcome, StatsClient};
use crate::interface_adapters::identity::SessionIdentity;
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::terminal::{
    HELP, HubCommand, parse_line, render_catalog, render_history, render_leaderboard,
    render_snapshot, render_summary,
};
use crate::use_cases::{
    GameCatalog, SessionCommand, SessionHandle, ShellSnapshot, StatsSync, spawn_session,
};

use std::future::pending;
use std::io::{self, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

const OFFLINE: &str = "offline: no stats service configured";

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Game output owns stdout.
    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();
    let state = build_state().await?;
    run(state, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

pub async fn build_state() -> Result<AppState> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let identity = Arc::new(SessionIdentity::default());

    let Some(base_url) = config::stats_service_url() else {
        info!("STATS_SERVICE_URL not set; scores will not be saved");
        return Ok(AppState {
            catalog: GameCatalog::new(clock, None, config::TICK_INTERVAL),
            identity,
            auth_client: None,
        });
    };

    let api_key = config::stats_api_key();
    let timeout = config::stats_timeout();
    let stats_client = StatsClient::new(base_url.clone(), api_key.clone(), timeout)
        .map_err(|e| io::Error::other(format!("failed to initialize stats client: {e}")))?;
    let auth_client = AuthClient::new(base_url.clone(), api_key, timeout)
        .map_err(|e| io::Error::other(format!("failed to initialize auth client: {e}")))?;
    debug!(
        stats_base_url = %base_url,
        stats_timeout_ms = timeout.as_millis() as u64,
        "stats client configured"
    );

    if let Some((email, password)) = config::player_credentials() {
        match auth_client.sign_in(&email, &password).await {
            Ok(player) => {
                info!(user_id = %player.user_id, "signed in");
                identity.set(player);
            }
            Err(error) => warn!(%error, "sign-in failed; playing anonymously"),
        }
    }

    let sync = StatsSync::new(Arc::new(stats_client), identity.clone());
    Ok(AppState {
        catalog: GameCatalog::new(clock, Some(sync), config::TICK_INTERVAL),
        identity,
        auth_client: Some(Arc::new(auth_client)),
    })
}

struct ActiveSession {
    handle: SessionHandle,
    snapshots: watch::Receiver<ShellSnapshot>,
}

enum HubEvent {
    Line(Option<String>),
    Snapshot,
}

/// Runs the hub: reads commands from `input` until `quit` or end of input,
/// and writes the catalog and live game snapshots to `output`.
pub async fn run<R, W>(state: AppState, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let (back_tx, mut back_rx) = mpsc::unbounded_channel::<String>();
    let mut session: Option<ActiveSession> = None;

    say(&mut output, &render_catalog(state.catalog.games())).await?;

    loop {
        let event = tokio::select! {
            line = lines.next_line() => HubEvent::Line(line?),
            _ = next_snapshot(&mut session) => HubEvent::Snapshot,
        };

        let line = match event {
            HubEvent::Line(Some(line)) => line,
            HubEvent::Line(None) => break,
            HubEvent::Snapshot => {
                if let Some(active) = &mut session {
                    let snapshot = active.snapshots.borrow_and_update().clone();
                    say(&mut output, &render_snapshot(&snapshot)).await?;
                }
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(&line) {
            Err(error) => say(&mut output, &error.to_string()).await?,
            Ok(HubCommand::Quit) => break,
            Ok(HubCommand::Help) => say(&mut output, HELP).await?,
            Ok(HubCommand::List) => {
                say(&mut output, &render_catalog(state.catalog.games())).await?;
            }
            Ok(HubCommand::History(game_id)) => {
                let text = match state.catalog.sync() {
                    None => OFFLINE.to_string(),
                    Some(sync) if !sync.is_signed_in() => "sign in to see your history".to_string(),
                    Some(sync) => {
                        render_history(&sync.history(game_id.as_deref(), config::HISTORY_LIMIT).await)
                    }
                };
                say(&mut output, &text).await?;
            }
            Ok(HubCommand::Stats) => {
                let text = match state.catalog.sync() {
                    None => OFFLINE.to_string(),
                    Some(sync) if !sync.is_signed_in() => "sign in to see your stats".to_string(),
                    Some(sync) => {
                        let order_of = |game_id: &str| state.catalog.score_order(game_id);
                        match sync.summary(order_of, config::SUMMARY_LIMIT).await {
                            Some(summary) => render_summary(&summary, state.catalog.games()),
                            None => "could not load your stats".to_string(),
                        }
                    }
                };
                say(&mut output, &text).await?;
            }
            Ok(HubCommand::Leaderboard(game_id)) => {
                let text = match (state.catalog.find(&game_id), state.catalog.sync()) {
                    (None, _) => format!("unknown game `{game_id}`"),
                    (Some(_), None) => OFFLINE.to_string(),
                    (Some(game), Some(sync)) => {
                        match sync
                            .leaderboard(game.id, game.order, config::LEADERBOARD_LIMIT)
                            .await
                        {
                            Ok(entries) => render_leaderboard(game.title, &entries),
                            Err(error) => format!("could not load the leaderboard: {error}"),
                        }
                    }
                };
                say(&mut output, &text).await?;
            }
            Ok(HubCommand::SignIn { email, password }) => {
                let text = sign_in(&state, &email, &password).await;
                say(&mut output, &text).await?;
            }
            Ok(HubCommand::SignUp {
                email,
                password,
                username,
            }) => {
                let text = sign_up(&state, &email, &password, &username).await;
                say(&mut output, &text).await?;
            }
            Ok(HubCommand::SignOut) => {
                let text = sign_out(&state).await;
                say(&mut output, &text).await?;
            }
            Ok(HubCommand::Play(game_id)) => {
                if session.is_some() {
                    say(&mut output, "finish this game first (`back`)").await?;
                    continue;
                }
                let Some(game) = state.catalog.launch(&game_id).await else {
                    say(&mut output, &format!("unknown game `{game_id}`")).await?;
                    continue;
                };

                let back = back_tx.clone();
                let handle = spawn_session(game, config::COMMAND_CHANNEL_CAPACITY, move || {
                    let _ = back.send(game_id);
                });
                let mut snapshots = handle.subscribe();
                let snapshot = snapshots.borrow_and_update().clone();
                say(&mut output, &render_snapshot(&snapshot)).await?;
                session = Some(ActiveSession { handle, snapshots });
            }
            Ok(HubCommand::Session(command)) => {
                let Some(active) = &session else {
                    say(&mut output, "no game running (`play <game-id>`)").await?;
                    continue;
                };
                let leaving = command == SessionCommand::Back;
                if active.handle.send(command).await.is_err() {
                    debug!("session already closed");
                }
                if !leaving {
                    continue;
                }
                if let Some(active) = session.take() {
                    close(active, &mut output).await?;
                }
                if let Ok(game_id) = back_rx.try_recv() {
                    debug!(%game_id, "back at the hub");
                    say(&mut output, &render_catalog(state.catalog.games())).await?;
                }
            }
        }
    }

    if let Some(active) = session.take() {
        active.handle.shutdown();
        close(active, &mut output).await?;
    }
    sign_out(&state).await;
    output.flush().await
}

// Waits for the session task to exit and shows where the player left off.
async fn close<W: AsyncWrite + Unpin>(active: ActiveSession, output: &mut W) -> Result<()> {
    let ActiveSession { handle, snapshots } = active;
    handle.join().await;
    let last = snapshots.borrow().clone();
    say(output, &render_snapshot(&last)).await
}

async fn next_snapshot(session: &mut Option<ActiveSession>) {
    let Some(active) = session else {
        return pending().await;
    };
    if active.snapshots.changed().await.is_err() {
        pending::<()>().await;
    }
}

async fn sign_in(state: &AppState, email: &str, password: &str) -> String {
    let Some(auth_client) = &state.auth_client else {
        return OFFLINE.to_string();
    };
    if state.identity.current().is_some() {
        return "already signed in (`signout` first)".to_string();
    }
    match auth_client.sign_in(email, password).await {
        Ok(player) => {
            info!(user_id = %player.user_id, "signed in");
            state.identity.set(player);
            format!("signed in as {email}")
        }
        Err(error) => {
            warn!(%error, "sign-in failed");
            format!("sign-in failed: {error}")
        }
    }
}

async fn sign_up(state: &AppState, email: &str, password: &str, username: &str) -> String {
    let Some(auth_client) = &state.auth_client else {
        return OFFLINE.to_string();
    };
    if state.identity.current().is_some() {
        return "already signed in (`signout` first)".to_string();
    }
    match auth_client.sign_up(email, password, username).await {
        Ok(SignUpOutcome::SignedIn(player)) => {
            info!(user_id = %player.user_id, "signed up");
            state.identity.set(player);
            format!("welcome, {username}! you are signed in")
        }
        Ok(SignUpOutcome::ConfirmationPending { user_id }) => {
            info!(%user_id, "sign-up awaiting email confirmation");
            format!("check {email} to confirm the account, then `signin`")
        }
        Err(error) => {
            warn!(%error, "sign-up failed");
            format!("sign-up failed: {error}")
        }
    }
}

async fn sign_out(state: &AppState) -> String {
    let Some(auth_client) = &state.auth_client else {
        return OFFLINE.to_string();
    };
    let Some(player) = state.identity.clear() else {
        return "not signed in".to_string();
    };
    match auth_client.sign_out(&player).await {
        Ok(()) => {
            info!(user_id = %player.user_id, "signed out");
            "signed out".to_string()
        }
        Err(error) => {
            warn!(%error, "sign-out failed");
            format!("signed out locally; the service said: {error}")
        }
    }
}

async fn say<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output.write_all(text.as_bytes()).await?;
    if !text.ends_with('\n') {
        output.write_all(b"\n").await?;
    }
    output.flush().await
}
