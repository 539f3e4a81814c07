#[tokio::main]
async fn main() {
    if let Err(e) = arcade::run_with_config().await {
        tracing::error!(error = %e, "arcade exited with an error");
        std::process::exit(1);
    }
}
