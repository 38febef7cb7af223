//! Network simulator for the CIJ command protocol.
//!
//! Listens on TCP (Telnet-compatible), gives each connection its own
//! [`cij_protocol::Engine`], and drives simulated metric drift between
//! commands.

pub mod config;
pub mod drift;
pub mod server;
pub mod session;
pub mod telnet;

pub use config::AppConfig;

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Load the environment and the runtime configuration, and log the effective
/// settings with secrets masked.
pub fn init_foundation() -> Result<AppConfig, anyhow::Error> {
    load_dotenv();

    let config = AppConfig::from_env();
    let settings = serde_json::to_string(&config.describe())?;
    tracing::info!(settings = %settings, "Configuration loaded");

    Ok(config)
}
