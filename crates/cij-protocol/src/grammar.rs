//! Command grammar: the fixed table of caret commands and their argument shapes.
//!
//! Adding a command means adding one row to [`COMMANDS`]. The dispatcher only
//! ever sees a parsed [`Arg`], never raw text.

use std::num::IntErrorKind;

use crate::Result;
use crate::error::ProtocolError;
use crate::state::CounterId;
use crate::state::SettingKey;

/// Broad grouping of commands, as documented by the printer vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    System,
    Query,
    Printing,
    Message,
    Settings,
    OneToOne,
}

/// Inclusive numeric range with the error reported when a value falls outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRange {
    pub min: i64,
    pub max: i64,
    pub error: ProtocolError,
}

impl IntRange {
    pub const fn new(min: i64, max: i64, error: ProtocolError) -> Self {
        Self { min, max, error }
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn check(&self, value: i64) -> Result<i64> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(self.error)
        }
    }
}

pub const DELAY_RANGE: IntRange = IntRange::new(0, 99_999, ProtocolError::InvalidDelay);
pub const REVERSE_DELAY_RANGE: IntRange =
    IntRange::new(0, 99_999, ProtocolError::InvalidReverseDelay);
pub const TRIGGER_DELAY_RANGE: IntRange =
    IntRange::new(0, 9_999, ProtocolError::InvalidTriggerDelay);
pub const PITCH_RANGE: IntRange = IntRange::new(0, 99_999, ProtocolError::InvalidPitch);
pub const HEIGHT_RANGE: IntRange = IntRange::new(1, 10, ProtocolError::InvalidHeight);
pub const WIDTH_RANGE: IntRange = IntRange::new(0, 16_000, ProtocolError::InvalidWidth);
pub const REPEAT_RANGE: IntRange = IntRange::new(0, 30_000, ProtocolError::InvalidRepeat);
pub const GAP_RANGE: IntRange = IntRange::new(0, 9_999, ProtocolError::InvalidGap);
pub const BOLD_RANGE: IntRange = IntRange::new(0, 9, ProtocolError::InvalidBold);

/// Shape of the payload that may follow a command code.
///
/// `optional` shapes treat an empty payload as a query for the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape {
    None,
    Flag { optional: bool },
    Integer { range: IntRange, optional: bool },
    Text { optional: bool },
    TextPair,
    Counter,
    CounterValue,
    Delimiter,
}

/// A parsed, validated argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// No payload was supplied.
    None,
    Flag(bool),
    Int(i64),
    Text(String),
    Pair(String, String),
    Counter(CounterId),
    CounterValue(CounterId, u64),
    Delimiter(char, bool),
}

impl ArgShape {
    /// Whether an empty payload is acceptable (bare command or query form).
    pub fn accepts_absent(self) -> bool {
        match self {
            Self::None | Self::Delimiter => true,
            Self::Flag { optional } | Self::Integer { optional, .. } | Self::Text { optional } => {
                optional
            }
            Self::TextPair | Self::Counter | Self::CounterValue => false,
        }
    }

    /// Parse a payload against this shape, then range-check numeric values.
    ///
    /// An absent payload and a malformed one are never confused: the former
    /// yields [`Arg::None`] (or a format error when the shape requires a
    /// payload), the latter always a format or range error.
    pub fn parse(self, payload: &str) -> Result<Arg> {
        let payload = payload.trim();
        if payload.is_empty() {
            return if self.accepts_absent() {
                Ok(Arg::None)
            } else {
                Err(ProtocolError::InvalidFormat)
            };
        }

        match self {
            Self::None => Err(ProtocolError::InvalidFormat),
            Self::Flag { .. } => parse_flag(payload).map(Arg::Flag),
            Self::Integer { range, .. } => {
                let value = parse_int(payload, range.error)?;
                range.check(value).map(Arg::Int)
            }
            Self::Text { .. } => Ok(Arg::Text(payload.to_string())),
            Self::TextPair => match split_quoted(payload).as_deref() {
                Some([a, b]) if !a.is_empty() && !b.is_empty() => {
                    Ok(Arg::Pair(a.to_string(), b.to_string()))
                }
                _ => Err(ProtocolError::InvalidFormat),
            },
            Self::Counter => match split_exact::<1>(payload) {
                Some([id]) => parse_counter_id(id).map(Arg::Counter),
                None => Err(ProtocolError::InvalidFormat),
            },
            Self::CounterValue => match split_exact::<2>(payload) {
                Some([id, value]) => {
                    let id = parse_counter_id(id)?;
                    let value = value
                        .parse::<u64>()
                        .map_err(|_| ProtocolError::InvalidFormat)?;
                    Ok(Arg::CounterValue(id, value))
                }
                None => Err(ProtocolError::InvalidFormat),
            },
            Self::Delimiter => match split_exact::<2>(payload) {
                Some([symbol, flag]) => {
                    let mut chars = symbol.chars();
                    let (Some(c), None) = (chars.next(), chars.next()) else {
                        return Err(ProtocolError::InvalidFormat);
                    };
                    Ok(Arg::Delimiter(c, parse_flag(flag)?))
                }
                None => Err(ProtocolError::InvalidFormat),
            },
        }
    }
}

fn parse_flag(s: &str) -> Result<bool> {
    match s {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(ProtocolError::InvalidFormat),
    }
}

/// Parse a signed decimal. A well-formed number too large for `i64` is still
/// a number, so it yields `overflow` instead of a format error.
fn parse_int(s: &str, overflow: ProtocolError) -> Result<i64> {
    s.parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => overflow,
        _ => ProtocolError::InvalidFormat,
    })
}

fn parse_counter_id(s: &str) -> Result<CounterId> {
    let index = parse_int(s, ProtocolError::CounterNotFound)?;
    CounterId::from_index(index).ok_or(ProtocolError::CounterNotFound)
}

/// Split on whitespace, keeping double-quoted runs together so names with
/// spaces survive. `None` on an unterminated quote.
fn split_quoted(s: &str) -> Option<Vec<&str>> {
    let mut out = Vec::new();
    let mut rest = s.trim_start();
    while !rest.is_empty() {
        if let Some(quoted) = rest.strip_prefix('"') {
            let end = quoted.find('"')?;
            out.push(&quoted[..end]);
            rest = quoted[end + 1..].trim_start();
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            out.push(&rest[..end]);
            rest = rest[end..].trim_start();
        }
    }
    Some(out)
}

/// Split on whitespace into exactly `N` tokens.
fn split_exact<const N: usize>(s: &str) -> Option<[&str; N]> {
    let mut out = [""; N];
    let mut parts = s.split_whitespace();
    for slot in out.iter_mut() {
        *slot = parts.next()?;
    }
    match parts.next() {
        Some(_) => None,
        None => Some(out),
    }
}

/// What the dispatcher does with a command once its argument is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Version,
    EchoOn,
    EchoOff,
    Jet,
    Utf8,
    Login,
    Logout,
    Status,
    Counters,
    DateTime,
    Temperatures,
    Diagnostics,
    ListMessages,
    ListLogos,
    ListFonts,
    CurrentMessage,
    MessageSettings,
    HighVoltage,
    ForcePrint,
    PhotoEyeOn,
    PhotoEyeOff,
    SelectMessage,
    NewMessage,
    CopyMessage,
    DeleteMessage,
    ViewMessage,
    Delimiter,
    Font,
    Setting(SettingKey),
    AutoAlign,
    SetCounter,
    ResetCounter,
    QueryCounter,
    OneToOneBegin,
    OneToOneEnd,
}

/// One row of the command table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub code: &'static str,
    pub category: Category,
    pub label: &'static str,
    pub description: &'static str,
    pub arg: ArgShape,
    pub op: Op,
}

const fn cmd(
    code: &'static str,
    category: Category,
    label: &'static str,
    description: &'static str,
    arg: ArgShape,
    op: Op,
) -> Command {
    Command { code, category, label, description, arg, op }
}

const FLAG_OR_QUERY: ArgShape = ArgShape::Flag { optional: true };
const NAME: ArgShape = ArgShape::Text { optional: false };
const NAME_OR_QUERY: ArgShape = ArgShape::Text { optional: true };

const fn setting(range: IntRange) -> ArgShape {
    ArgShape::Integer { range, optional: true }
}

use Category::{Message, OneToOne, Printing, Query, Settings, System};

/// The full command table.
#[rustfmt::skip]
pub static COMMANDS: &[Command] = &[
    // -- System --
    cmd("VV", System, "Version", "Report the firmware version", ArgShape::None, Op::Version),
    cmd("EN", System, "Echo On", "Switch to verbose responses", ArgShape::None, Op::EchoOn),
    cmd("EF", System, "Echo Off", "Switch to terse responses", ArgShape::None, Op::EchoOff),
    cmd("SJ", System, "Jet", "Start (1) or stop (0) the ink jet", FLAG_OR_QUERY, Op::Jet),
    cmd("UT", System, "UTF-8 Mode", "Enable or disable UTF-8 message text", FLAG_OR_QUERY, Op::Utf8),
    cmd("LG", System, "Login", "Log in with the shared password", NAME, Op::Login),
    cmd("LO", System, "Logout", "End the logged-in session", ArgShape::None, Op::Logout),
    // -- Query --
    cmd("SU", Query, "Status", "Report subsystem, session and consumable status", ArgShape::None, Op::Status),
    cmd("CN", Query, "Counters", "Report all counters", ArgShape::None, Op::Counters),
    cmd("TM", Query, "Date/Time", "Report the printer clock", ArgShape::None, Op::DateTime),
    cmd("TP", Query, "Temperatures", "Report printhead and electronics temperature", ArgShape::None, Op::Temperatures),
    cmd("SD", Query, "Diagnostics", "Report live jet metrics and runtime hours", ArgShape::None, Op::Diagnostics),
    cmd("LM", Query, "Messages", "List stored messages", ArgShape::None, Op::ListMessages),
    cmd("LL", Query, "Logos", "List stored logos", ArgShape::None, Op::ListLogos),
    cmd("LF", Query, "Fonts", "List available fonts", ArgShape::None, Op::ListFonts),
    cmd("GM", Query, "Current Message", "Report the selected message", ArgShape::None, Op::CurrentMessage),
    cmd("MS", Query, "Message Settings", "Report the print settings in effect", ArgShape::None, Op::MessageSettings),
    // -- Printing --
    cmd("PR", Printing, "High Voltage", "Enable (1) or disable (0) deflection high voltage", FLAG_OR_QUERY, Op::HighVoltage),
    cmd("PT", Printing, "Force Print", "Trigger one print immediately", ArgShape::None, Op::ForcePrint),
    cmd("FE", Printing, "Force Photo-Eye On", "Force photo-eye triggering, optionally with a trigger delay", ArgShape::Integer { range: TRIGGER_DELAY_RANGE, optional: true }, Op::PhotoEyeOn),
    cmd("FF", Printing, "Force Photo-Eye Off", "Return to external photo-eye triggering", ArgShape::None, Op::PhotoEyeOff),
    // -- Message --
    cmd("SM", Message, "Select Message", "Select the message to print", NAME_OR_QUERY, Op::SelectMessage),
    cmd("NM", Message, "New Message", "Create an empty message", NAME, Op::NewMessage),
    cmd("CM", Message, "Copy Message", "Copy a message under a new name; quote names containing spaces", ArgShape::TextPair, Op::CopyMessage),
    cmd("DM", Message, "Delete Message", "Delete a stored message", NAME, Op::DeleteMessage),
    cmd("VM", Message, "View Message", "Report one stored message", NAME, Op::ViewMessage),
    cmd("MD", Message, "Field Delimiter", "Set the data field delimiter and enable flag", ArgShape::Delimiter, Op::Delimiter),
    cmd("CF", Message, "Font", "Change the message font", NAME_OR_QUERY, Op::Font),
    // -- Settings --
    cmd("DA", Settings, "Delay", "Print delay", setting(DELAY_RANGE), Op::Setting(SettingKey::Delay)),
    cmd("DR", Settings, "Reverse Delay", "Print delay for reverse direction", setting(REVERSE_DELAY_RANGE), Op::Setting(SettingKey::ReverseDelay)),
    cmd("DP", Settings, "Trigger Delay", "Photo-eye trigger delay", setting(TRIGGER_DELAY_RANGE), Op::Setting(SettingKey::TriggerDelay)),
    cmd("PA", Settings, "Pitch", "Distance between repeated prints", setting(PITCH_RANGE), Op::Setting(SettingKey::Pitch)),
    cmd("PH", Settings, "Print Height", "Character height", setting(HEIGHT_RANGE), Op::Setting(SettingKey::Height)),
    cmd("PW", Settings, "Print Width", "Character width", setting(WIDTH_RANGE), Op::Setting(SettingKey::Width)),
    cmd("RA", Settings, "Repeat", "Repeat count per trigger", setting(REPEAT_RANGE), Op::Setting(SettingKey::Repeat)),
    cmd("GP", Settings, "Gap", "Gap between characters", setting(GAP_RANGE), Op::Setting(SettingKey::Gap)),
    cmd("SB", Settings, "Bold", "Bold weight", setting(BOLD_RANGE), Op::Setting(SettingKey::Bold)),
    cmd("SA", Settings, "Auto Align", "Enable or disable auto alignment", FLAG_OR_QUERY, Op::AutoAlign),
    cmd("CC", Settings, "Set Counter", "Set a counter to a value", ArgShape::CounterValue, Op::SetCounter),
    cmd("CD", Settings, "Reset Counter", "Reset a counter to zero", ArgShape::Counter, Op::ResetCounter),
    cmd("CH", Settings, "Counter", "Report one counter", ArgShape::Counter, Op::QueryCounter),
    // -- One-to-one --
    cmd("MB", OneToOne, "One-to-One Begin", "Print exactly once per trigger", ArgShape::None, Op::OneToOneBegin),
    cmd("ME", OneToOne, "One-to-One End", "Leave one-to-one mode", ArgShape::None, Op::OneToOneEnd),
];

/// Find a command by its exact code, ignoring case.
pub fn lookup(code: &str) -> Option<&'static Command> {
    COMMANDS.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

/// A line split into its command and the remaining payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub command: &'static Command,
    /// Remaining text after the code, trimmed, original case preserved.
    pub payload: &'a str,
}

/// Split a raw line into command and payload.
///
/// The code is matched against the run of letters following `^`; the longest
/// table code that prefixes that run wins, so `^PW1500` and `^PW 1500` are
/// the same command.
pub fn tokenize(line: &str) -> Result<Token<'_>> {
    let body = line
        .trim()
        .strip_prefix('^')
        .ok_or(ProtocolError::UnknownCommand)?;

    let letters_len = body.bytes().take_while(|b| b.is_ascii_alphabetic()).count();
    let letters = body[..letters_len].to_ascii_uppercase();

    let command = COMMANDS
        .iter()
        .filter(|c| letters.starts_with(c.code))
        .max_by_key(|c| c.code.len())
        .ok_or(ProtocolError::UnknownCommand)?;

    Ok(Token {
        command,
        payload: body[command.code.len()..].trim(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_unique() {
        let codes: HashSet<&str> = COMMANDS.iter().map(|c| c.code).collect();
        assert_eq!(codes.len(), COMMANDS.len());
    }

    #[test]
    fn test_lookup_case_insensitive() {
        assert_eq!(lookup("pw").map(|c| c.op), Some(Op::Setting(SettingKey::Width)));
        assert_eq!(lookup("Sj").map(|c| c.op), Some(Op::Jet));
        assert!(lookup("ZZ").is_none());
    }

    #[test]
    fn test_tokenize_with_and_without_space() {
        let spaced = tokenize("^PW 1500").unwrap();
        let glued = tokenize("^pw1500").unwrap();
        assert_eq!(spaced.command.code, "PW");
        assert_eq!(glued.command.code, "PW");
        assert_eq!(spaced.payload, "1500");
        assert_eq!(glued.payload, "1500");
    }

    #[test]
    fn test_tokenize_preserves_payload_case() {
        let token = tokenize("  ^sm  Lot Code  ").unwrap();
        assert_eq!(token.command.code, "SM");
        assert_eq!(token.payload, "Lot Code");
    }

    #[test]
    fn test_tokenize_rejects_unknown() {
        assert_eq!(tokenize("PW 100"), Err(ProtocolError::UnknownCommand));
        assert_eq!(tokenize("^ZZ"), Err(ProtocolError::UnknownCommand));
        assert_eq!(tokenize("^"), Err(ProtocolError::UnknownCommand));
        assert_eq!(tokenize(""), Err(ProtocolError::UnknownCommand));
        assert_eq!(tokenize("^P"), Err(ProtocolError::UnknownCommand));
    }

    #[test]
    fn test_parse_absent_vs_malformed() {
        let width = lookup("PW").unwrap().arg;
        assert_eq!(width.parse(""), Ok(Arg::None));
        assert_eq!(width.parse("abc"), Err(ProtocolError::InvalidFormat));
        assert_eq!(width.parse("16001"), Err(ProtocolError::InvalidWidth));
        assert_eq!(width.parse("-1"), Err(ProtocolError::InvalidWidth));
        assert_eq!(width.parse("16000"), Ok(Arg::Int(16_000)));
    }

    #[test]
    fn test_parse_flag() {
        let shape = ArgShape::Flag { optional: true };
        assert_eq!(shape.parse("1"), Ok(Arg::Flag(true)));
        assert_eq!(shape.parse("0"), Ok(Arg::Flag(false)));
        assert_eq!(shape.parse("2"), Err(ProtocolError::InvalidFormat));
        assert_eq!(shape.parse(""), Ok(Arg::None));
    }

    #[test]
    fn test_parse_required_text() {
        let shape = ArgShape::Text { optional: false };
        assert_eq!(shape.parse(""), Err(ProtocolError::InvalidFormat));
        assert_eq!(shape.parse("Hello"), Ok(Arg::Text("Hello".into())));
    }

    #[test]
    fn test_parse_none_rejects_payload() {
        assert_eq!(ArgShape::None.parse("x"), Err(ProtocolError::InvalidFormat));
        assert_eq!(ArgShape::None.parse("   "), Ok(Arg::None));
    }

    #[test]
    fn test_parse_counter_shapes() {
        assert_eq!(ArgShape::Counter.parse("3"), Ok(Arg::Counter(CounterId::Custom(2))));
        assert_eq!(ArgShape::Counter.parse("9"), Err(ProtocolError::CounterNotFound));
        assert_eq!(ArgShape::Counter.parse("x"), Err(ProtocolError::InvalidFormat));
        assert_eq!(
            ArgShape::CounterValue.parse("0 42"),
            Ok(Arg::CounterValue(CounterId::Product, 42))
        );
        assert_eq!(ArgShape::CounterValue.parse("0 -1"), Err(ProtocolError::InvalidFormat));
        assert_eq!(ArgShape::CounterValue.parse("0"), Err(ProtocolError::InvalidFormat));
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(ArgShape::Delimiter.parse("; 1"), Ok(Arg::Delimiter(';', true)));
        assert_eq!(ArgShape::Delimiter.parse(""), Ok(Arg::None));
        assert_eq!(ArgShape::Delimiter.parse(";; 1"), Err(ProtocolError::InvalidFormat));
        assert_eq!(ArgShape::Delimiter.parse("; 5"), Err(ProtocolError::InvalidFormat));
    }

    #[test]
    fn test_parse_text_pair() {
        assert_eq!(
            ArgShape::TextPair.parse("Src Dst"),
            Ok(Arg::Pair("Src".into(), "Dst".into()))
        );
        assert_eq!(ArgShape::TextPair.parse("OnlyOne"), Err(ProtocolError::InvalidFormat));
        assert_eq!(ArgShape::TextPair.parse("a b c"), Err(ProtocolError::InvalidFormat));
    }

    #[test]
    fn test_every_setting_row_uses_its_key_range() {
        for command in COMMANDS {
            if let Op::Setting(key) = command.op {
                assert_eq!(
                    command.arg,
                    ArgShape::Integer { range: key.range(), optional: true },
                    "{} range mismatch",
                    command.code
                );
            }
        }
    }
}
