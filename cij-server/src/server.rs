//! TCP listener: one session task per connection.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::session::{self, CloseReason, SessionError};

/// Bind the configured address and serve until `shutdown` is cancelled.
pub async fn start_server(config: AppConfig, shutdown: CancellationToken) -> Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("CIJ protocol server listening on {}", listener.local_addr()?);

    serve(listener, Arc::new(config), shutdown).await
}

/// Accept connections on an already-bound listener.
///
/// On shutdown, open sessions are cancelled and awaited before returning.
pub async fn serve(
    listener: TcpListener,
    config: Arc<AppConfig>,
    shutdown: CancellationToken,
) -> Result<()> {
    let mut sessions = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let config = config.clone();
                    let token = shutdown.child_token();
                    sessions.spawn(handle_connection(stream, peer, config, token));
                }
                Err(e) => tracing::warn!("Accept failed: {e}"),
            },
            Some(joined) = sessions.join_next(), if !sessions.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!("Session task panicked: {e}");
                }
            }
        }
    }

    tracing::info!("Server stopping, waiting for {} session(s)", sessions.len());
    while sessions.join_next().await.is_some() {}
    Ok(())
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    config: Arc<AppConfig>,
    shutdown: CancellationToken,
) {
    let session_id = uuid::Uuid::new_v4().to_string();
    if let Err(e) = stream.set_nodelay(true) {
        tracing::debug!(session = %session_id, "set_nodelay failed: {e}");
    }
    tracing::info!(session = %session_id, %peer, "Client connected");

    match session::run(stream, &config, shutdown).await {
        Ok(summary) => {
            let reason = match summary.reason {
                CloseReason::PeerClosed => "peer closed",
                CloseReason::Shutdown => "shutdown",
            };
            tracing::info!(
                session = %session_id,
                commands = summary.commands,
                errors = summary.errors,
                "Client disconnected ({reason})"
            );
        }
        Err(SessionError::IdleTimeout(after)) => {
            tracing::info!(session = %session_id, "Closing idle session after {after:?}");
        }
        Err(e) => tracing::warn!(session = %session_id, "Session failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    async fn spawn_server() -> (SocketAddr, CancellationToken, tokio::task::JoinHandle<Result<()>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let config = Arc::new(AppConfig {
            drift_enabled: false,
            ..AppConfig::default()
        });
        let token = CancellationToken::new();
        let handle = tokio::spawn(serve(listener, config, token.clone()));
        (addr, token, handle)
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let (addr, token, handle) = spawn_server().await;

        let mut first = BufReader::new(TcpStream::connect(addr).await.unwrap());
        let mut second = BufReader::new(TcpStream::connect(addr).await.unwrap());

        first.get_mut().write_all(b"^SJ 1\r\n").await.unwrap();
        let mut line = String::new();
        first.read_line(&mut line).await.unwrap();
        assert_eq!(line, ">\r\n");

        second.get_mut().write_all(b"^SU\r\n").await.unwrap();
        line.clear();
        second.read_line(&mut line).await.unwrap();
        assert!(line.starts_with("HV:0 JET:0"), "{line}");

        token.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_closes_open_connections() {
        let (addr, token, handle) = spawn_server().await;
        let mut client = BufReader::new(TcpStream::connect(addr).await.unwrap());

        client.get_mut().write_all(b"^VV\r\n").await.unwrap();
        let mut line = String::new();
        client.read_line(&mut line).await.unwrap();
        assert_eq!(line, "VV:4.2.1\r\n");

        token.cancel();
        handle.await.unwrap().unwrap();

        line.clear();
        let n = client.read_line(&mut line).await.unwrap();
        assert_eq!(n, 0);
    }
}
