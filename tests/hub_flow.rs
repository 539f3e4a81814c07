mod support;

use arcade::domain::ports::{Clock, SystemClock};
use arcade::interface_adapters::clients::{AuthClient, StatsClient};
use arcade::interface_adapters::identity::SessionIdentity;
use arcade::interface_adapters::state::AppState;
use arcade::use_cases::{GameCatalog, StatsSync};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const TICK: Duration = Duration::from_millis(1000);

fn offline_state() -> AppState {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    AppState {
        catalog: GameCatalog::new(clock, None, TICK).with_seed(42),
        identity: Arc::new(SessionIdentity::default()),
        auth_client: None,
    }
}

async fn play(state: AppState, script: &str) -> String {
    let mut output = Vec::new();
    arcade::run(state, script.as_bytes(), &mut output)
        .await
        .expect("hub runs");
    String::from_utf8(output).expect("utf-8 output")
}

#[tokio::test]
async fn procrastination_round_plays_through_the_hub() {
    let output = play(
        offline_state(),
        "play procrastination-station\nstart\ntarget 0\ntarget 0\ntarget 1\nback\nquit\n",
    )
    .await;

    assert!(output.contains("Procrastination Station"));
    assert!(
        output.contains("[procrastination-station] finished with 7 | last score 7"),
        "{output}"
    );
    // Leaving a game lists the catalog again.
    assert!(output.matches("games:").count() >= 2, "{output}");
}

#[tokio::test]
async fn hub_reports_bad_input_and_keeps_going() {
    let output = play(
        offline_state(),
        "press\nplay chaos-page\ndance\nhistory\nplay mug-shot\nplay true-color\nquit\n",
    )
    .await;

    assert!(output.contains("no game running"), "{output}");
    assert!(output.contains("unknown game `chaos-page`"), "{output}");
    assert!(output.contains("unknown command `dance`"), "{output}");
    assert!(output.contains("offline"), "{output}");
    assert!(output.contains("[mug-shot] ready"), "{output}");
    assert!(output.contains("finish this game first"), "{output}");
}

fn online_state(base_url: &str) -> AppState {
    let timeout = Duration::from_secs(2);
    let auth = AuthClient::new(base_url, support::API_KEY, timeout).expect("auth client");
    let stats = StatsClient::new(base_url, support::API_KEY, timeout).expect("stats client");
    let identity = Arc::new(SessionIdentity::default());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let sync = StatsSync::new(Arc::new(stats), identity.clone());
    AppState {
        catalog: GameCatalog::new(clock, Some(sync), TICK).with_seed(3),
        identity,
        auth_client: Some(Arc::new(auth)),
    }
}

#[tokio::test]
async fn sign_up_play_then_review_stats_and_leaderboard() {
    let base_url = support::ensure_server();
    let email = format!("{}@example.com", Uuid::new_v4());

    let first = play(
        online_state(base_url),
        &format!(
            "stats\nsignup {email} {password} ada\nplay procrastination-station\nstart\n\
             target 0\ntarget 0\ntarget 1\nback\nquit\n",
            password = support::PASSWORD,
        ),
    )
    .await;
    assert!(first.contains("sign in to see your stats"), "{first}");
    assert!(first.contains("welcome, ada! you are signed in"), "{first}");
    assert!(first.contains("finished with 7"), "{first}");
    support::wait_for_rows(&support::user_id_for(&email), 1).await;

    let second = play(
        online_state(base_url),
        &format!(
            "signin {email} {password}\nstats\ntop procrastination-station\ntop chaos-page\n\
             signout\nsignout\nquit\n",
            password = support::PASSWORD,
        ),
    )
    .await;
    assert!(second.contains(&format!("signed in as {email}")), "{second}");
    assert!(second.contains("1 rounds across 1 games"), "{second}");
    assert!(second.contains("1 plays | best 7 | average 7"), "{second}");
    assert!(second.contains("Procrastination Station leaderboard"), "{second}");
    assert!(second.contains("ada"), "{second}");
    assert!(second.contains("unknown game `chaos-page`"), "{second}");
    assert!(second.contains("signed out\n"), "{second}");
    assert!(second.contains("not signed in"), "{second}");
}

#[tokio::test]
async fn signed_in_rounds_are_saved_and_the_player_signed_out() {
    let base_url = support::ensure_server();
    let timeout = Duration::from_secs(2);
    let auth = AuthClient::new(base_url, support::API_KEY, timeout).expect("auth client");
    let stats = StatsClient::new(base_url, support::API_KEY, timeout).expect("stats client");

    let email = format!("{}@example.com", Uuid::new_v4());
    let player = auth.sign_in(&email, support::PASSWORD).await.expect("sign in");
    let token = player.access_token.clone();
    let identity = Arc::new(SessionIdentity::default());
    identity.set(player);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let sync = StatsSync::new(Arc::new(stats), identity.clone());
    let state = AppState {
        catalog: GameCatalog::new(clock, Some(sync), TICK).with_seed(1),
        identity,
        auth_client: Some(Arc::new(auth)),
    };

    let output = play(
        state,
        "play procrastination-station\nstart\ntarget 2\ntarget 2\ntarget 2\nback\nquit\n",
    )
    .await;
    assert!(output.contains("finished with 6"), "{output}");

    let rows = support::wait_for_rows(&support::user_id_for(&email), 1).await;
    assert_eq!(rows[0].body["game_id"], "procrastination-station");
    assert_eq!(rows[0].body["score"], 6);
    assert_eq!(rows[0].body["metadata"]["choices"], serde_json::json!([2, 2, 2]));
    assert!(support::logged_out(&token));
}
