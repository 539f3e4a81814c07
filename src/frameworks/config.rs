use std::{env, time::Duration};

// Runtime constants and environment lookups (not gameplay tuning).

/// Base URL of the hosted stats/auth service. Unset means offline play.
pub fn stats_service_url() -> Option<String> {
    env::var("STATS_SERVICE_URL")
        .ok()
        .filter(|value| !value.trim().is_empty())
}

pub fn stats_api_key() -> String {
    env::var("STATS_API_KEY").unwrap_or_default()
}

pub fn stats_timeout() -> Duration {
    let millis = env::var("STATS_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(1500);
    Duration::from_millis(millis)
}

/// Email and password to sign in with at startup, when both are set.
pub fn player_credentials() -> Option<(String, String)> {
    let email = env::var("ARCADE_EMAIL").ok()?;
    let password = env::var("ARCADE_PASSWORD").ok()?;
    Some((email, password))
}

pub const COMMAND_CHANNEL_CAPACITY: usize = 64;

pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);
// Rows shown by `history`.
pub const HISTORY_LIMIT: usize = 10;
// Rows shown by `top`.
pub const LEADERBOARD_LIMIT: usize = 10;
// Most recent rounds folded into `stats`.
pub const SUMMARY_LIMIT: usize = 1000;
