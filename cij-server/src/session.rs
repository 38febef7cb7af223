//! One protocol session over a byte stream.
//!
//! Each connection owns its own [`Engine`]. Lines are read up to `\n`, Telnet
//! negotiation is stripped, blank lines are ignored, and every reply is
//! written back followed by `\r\n`. Between commands a timer feeds simulated
//! drift into the engine.

use std::time::Duration;

use cij_protocol::Engine;
use cij_protocol::format::LINE_SEPARATOR;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::drift::Drift;
use crate::telnet::TelnetFilter;

/// Longest line accepted before the session is dropped.
pub const MAX_LINE_LEN: usize = 4096;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Idle for {0:?}")]
    IdleTimeout(Duration),

    #[error("Line exceeds {} bytes", MAX_LINE_LEN)]
    LineTooLong,
}

/// Why a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    PeerClosed,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub reason: CloseReason,
    pub commands: u64,
    pub errors: u64,
}

/// Run a session until the peer disconnects, the idle timeout fires, or
/// `shutdown` is cancelled.
pub async fn run<S>(
    stream: S,
    config: &AppConfig,
    shutdown: CancellationToken,
) -> Result<SessionSummary, SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut engine = Engine::with_options(config.engine_options());
    let result = drive(stream, config, &mut engine, &shutdown).await;

    match serde_json::to_string(&engine.snapshot()) {
        Ok(json) => tracing::debug!(snapshot = %json, "Session final state"),
        Err(e) => tracing::warn!("Failed to serialize session state: {e}"),
    }
    result
}

async fn drive<S>(
    stream: S,
    config: &AppConfig,
    engine: &mut Engine,
    shutdown: &CancellationToken,
) -> Result<SessionSummary, SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut filter = TelnetFilter::new();

    let drift_interval = config.drift_interval();
    let mut drift = Drift::from_entropy();
    let mut ticker = tokio::time::interval_at(Instant::now() + drift_interval, drift_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let idle_timeout = config.idle_timeout();
    let mut last_activity = Instant::now();

    let mut summary = SessionSummary {
        reason: CloseReason::PeerClosed,
        commands: 0,
        errors: 0,
    };
    // Partial reads survive a cancelled read_until and are resumed next loop.
    let mut raw = Vec::new();

    loop {
        let deadline = idle_timeout.map(|t| last_activity + t);
        // raw never exceeds MAX_LINE_LEN here, so the budget is at least one byte.
        let mut limited = (&mut reader).take((MAX_LINE_LEN + 1 - raw.len()) as u64);

        tokio::select! {
            _ = shutdown.cancelled() => {
                summary.reason = CloseReason::Shutdown;
                return Ok(summary);
            }
            _ = idle(deadline) => {
                let timeout = idle_timeout.unwrap_or_default();
                return Err(SessionError::IdleTimeout(timeout));
            }
            _ = ticker.tick(), if config.drift_enabled => {
                let update = drift.step(engine.state(), drift_interval);
                if let Err(e) = engine.apply_telemetry(&update) {
                    tracing::warn!("Drift update rejected: {e}");
                }
            }
            read = limited.read_until(b'\n', &mut raw) => {
                let n = read?;
                if raw.len() > MAX_LINE_LEN {
                    return Err(SessionError::LineTooLong);
                }
                let eof = n == 0 || !raw.ends_with(b"\n");
                last_activity = Instant::now();

                let mut data = Vec::with_capacity(raw.len());
                filter.feed(&raw, &mut data);
                raw.clear();

                let text = String::from_utf8_lossy(&data);
                let line = text.trim();
                if !line.is_empty() {
                    let reply = engine.process(line);
                    summary.commands += 1;
                    if !reply.success {
                        summary.errors += 1;
                    }
                    writer.write_all(reply.response.as_bytes()).await?;
                    writer.write_all(LINE_SEPARATOR.as_bytes()).await?;
                    writer.flush().await?;
                }

                if eof {
                    return Ok(summary);
                }
            }
        }
    }
}

/// Resolves at `deadline`, or never.
async fn idle(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
