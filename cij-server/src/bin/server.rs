//! Simulator binary: serves protocol sessions until Ctrl+C.

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use cij_server_lib::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting CIJ printer simulator");

    let config = cij_server_lib::init_foundation()?;
    let shutdown = CancellationToken::new();

    let server_token = shutdown.clone();
    let mut server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(config, server_token).await {
            tracing::error!("Server failed: {e}");
        }
    });

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Shutting down...");
            shutdown.cancel();
            server_handle.await?;
        }
        // The listener failed to bind or stopped on its own.
        joined = &mut server_handle => joined?,
    }
    Ok(())
}
