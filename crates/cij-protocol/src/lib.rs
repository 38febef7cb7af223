//! Command protocol engine for continuous-inkjet printers.
//!
//! Parses caret commands (`^PW 1500`), validates them against a fixed command
//! table, applies them to an in-memory [`ProtocolState`], and renders the
//! protocol's terse or verbose (echo) response. The engine performs no I/O:
//! a transport feeds it complete lines and relays the replies.
//!
//! ```
//! use cij_protocol::Engine;
//!
//! let mut engine = Engine::new();
//! assert_eq!(engine.process("^SJ 1").response, ">");
//! assert!(engine.snapshot().subsystems.jet_running);
//! ```

pub mod engine;
pub mod error;
pub mod format;
pub mod grammar;
pub mod options;
pub mod outcome;
pub mod state;
pub mod telemetry;
pub mod transcript;

// Re-exports for convenience
pub use engine::{Engine, Reply};
pub use error::{ProtocolError, TelemetryError};
pub use grammar::{Category, Command, COMMANDS};
pub use options::EngineOptions;
pub use state::{FluidLevel, ProtocolState};
pub use telemetry::TelemetryUpdate;
pub use transcript::{Direction, LogEntry};

/// Result type alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests;
