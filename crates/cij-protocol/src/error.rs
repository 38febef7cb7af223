//! Protocol error taxonomy.
//!
//! Every failure a command can produce maps to exactly one variant, and each
//! variant carries a stable numeric code plus a short label for the terse
//! wire format. The `Display` text is the long form used in echo mode.

/// Errors reported back to the peer as a protocol-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ProtocolError {
    #[error("Invalid command format")]
    InvalidFormat,

    #[error("Login failed, password not accepted")]
    AuthenticationFailed,

    #[error("Command not recognized")]
    UnknownCommand,

    #[error("Message not found")]
    MessageNotFound,

    #[error("Delete failed, message is currently selected")]
    DeleteFailed,

    #[error("Cannot print in the current printer state")]
    CannotPrint,

    #[error("Jet is stopped")]
    JetStopped,

    #[error("Invalid print width")]
    InvalidWidth,

    #[error("Invalid print height")]
    InvalidHeight,

    #[error("Invalid pitch")]
    InvalidPitch,

    #[error("Invalid print delay")]
    InvalidDelay,

    #[error("Invalid reverse delay")]
    InvalidReverseDelay,

    #[error("Invalid photo-eye trigger delay")]
    InvalidTriggerDelay,

    #[error("Invalid repeat count")]
    InvalidRepeat,

    #[error("Invalid gap")]
    InvalidGap,

    #[error("Invalid bold weight")]
    InvalidBold,

    #[error("Counter not found")]
    CounterNotFound,

    #[error("Font not found")]
    FontNotFound,

    #[error("Message already exists")]
    MessageExists,
}

impl ProtocolError {
    /// Every variant, in code order.
    pub const ALL: [ProtocolError; 19] = [
        Self::InvalidFormat,
        Self::AuthenticationFailed,
        Self::UnknownCommand,
        Self::MessageNotFound,
        Self::DeleteFailed,
        Self::CannotPrint,
        Self::JetStopped,
        Self::InvalidWidth,
        Self::InvalidHeight,
        Self::InvalidPitch,
        Self::InvalidDelay,
        Self::InvalidReverseDelay,
        Self::InvalidTriggerDelay,
        Self::InvalidRepeat,
        Self::InvalidGap,
        Self::InvalidBold,
        Self::CounterNotFound,
        Self::FontNotFound,
        Self::MessageExists,
    ];

    /// Stable wire code. Never renumber an existing variant.
    pub fn code(self) -> u16 {
        match self {
            Self::InvalidFormat => 1,
            Self::AuthenticationFailed => 2,
            Self::UnknownCommand => 3,
            Self::MessageNotFound => 4,
            Self::DeleteFailed => 5,
            Self::CannotPrint => 6,
            Self::JetStopped => 7,
            Self::InvalidWidth => 8,
            Self::InvalidHeight => 9,
            Self::InvalidPitch => 10,
            Self::InvalidDelay => 11,
            Self::InvalidReverseDelay => 12,
            Self::InvalidTriggerDelay => 13,
            Self::InvalidRepeat => 14,
            Self::InvalidGap => 15,
            Self::InvalidBold => 16,
            Self::CounterNotFound => 17,
            Self::FontNotFound => 18,
            Self::MessageExists => 19,
        }
    }

    /// Compact label used by the terse format.
    pub fn short_label(self) -> &'static str {
        match self {
            Self::InvalidFormat => "FORMAT",
            Self::AuthenticationFailed => "LOGIN FAILED",
            Self::UnknownCommand => "UNKNOWN COMMAND",
            Self::MessageNotFound => "MSG NOT FOUND",
            Self::DeleteFailed => "DELETE FAILED",
            Self::CannotPrint => "CANNOT PRINT",
            Self::JetStopped => "JET STOPPED",
            Self::InvalidWidth => "BAD WIDTH",
            Self::InvalidHeight => "BAD HEIGHT",
            Self::InvalidPitch => "BAD PITCH",
            Self::InvalidDelay => "BAD DELAY",
            Self::InvalidReverseDelay => "BAD REV DELAY",
            Self::InvalidTriggerDelay => "BAD TRIG DELAY",
            Self::InvalidRepeat => "BAD REPEAT",
            Self::InvalidGap => "BAD GAP",
            Self::InvalidBold => "BAD BOLD",
            Self::CounterNotFound => "CNT NOT FOUND",
            Self::FontNotFound => "FONT NOT FOUND",
            Self::MessageExists => "MSG EXISTS",
        }
    }
}

/// Errors raised when a collaborator injects telemetry the state cannot hold.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TelemetryError {
    #[error("Ink level cannot be GOOD (only makeup reports GOOD)")]
    InkLevelGood,

    #[error("Runtime delta must be a finite, non-negative number of hours, got {0}")]
    InvalidRuntimeDelta(f64),

    #[error("Metric {name} must be finite, got {value}")]
    NonFiniteMetric { name: &'static str, value: f64 },
}
