use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

use jarvys_interface::api;
use jarvys_interface::config::Config;
use jarvys_interface::logs;
use jarvys_interface::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("JARVYS_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load(std::env::args());
    let port = config.port;
    let publish_interval = config.publish_interval;
    let log_file = config.log_file.clone();
    let state = AppState::new(config);

    // Periodic publisher: one snapshot per tick to every attached viewer.
    let publisher_state = state.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(publish_interval);
        loop {
            ticker.tick().await;
            publisher_state.refresh_and_publish().await;
        }
    });

    if let Some(path) = log_file {
        let relay = state.relay.clone();
        tokio::spawn(async move {
            logs::tail_into_relay(path, relay).await;
        });
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(event = "listening", %addr);

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!(event = "shutdown");
        })
        .await?;
    Ok(())
}
