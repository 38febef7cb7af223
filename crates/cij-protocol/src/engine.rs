//! Command dispatcher: one line in, one reply out.

use chrono::Local;

use crate::error::{ProtocolError, TelemetryError};
use crate::format::{self, Mode};
use crate::grammar::{self, Arg, Command, Op};
use crate::options::EngineOptions;
use crate::outcome::{Field, Outcome};
use crate::state::{CounterId, FluidLevel, ProtocolState, SettingKey};
use crate::telemetry::TelemetryUpdate;
use crate::transcript::{Direction, LogEntry, Transcript};

/// Result of processing one line.
///
/// `success` is the protocol-level outcome; callers should branch on it (or on
/// `error`) rather than on the response text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub success: bool,
    pub response: String,
    pub error: Option<ProtocolError>,
}

/// One printer session: protocol state, transcript and options.
///
/// Not internally synchronized. Give each connection its own engine, or
/// serialize access externally.
#[derive(Debug, Clone)]
pub struct Engine {
    state: ProtocolState,
    transcript: Transcript,
    options: EngineOptions,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self {
            state: ProtocolState::new(),
            transcript: Transcript::with_capacity(options.log_capacity),
            options,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Parse, validate, apply and render one command line.
    ///
    /// Never panics on malformed input; every failure becomes an error reply.
    pub fn process(&mut self, line: &str) -> Reply {
        self.transcript.record(Direction::Received, line);

        let outcome = Outcome::from(self.execute(line));
        // Rendered after the transition so ^EN / ^EF answer in their own mode.
        let mode = Mode::from_echo(self.state.session.echo);
        let response = format::render(&outcome, mode);

        match outcome.error() {
            Some(err) => tracing::debug!(
                line = line.trim(),
                code = err.code(),
                error = %err,
                "Command rejected"
            ),
            None => tracing::debug!(line = line.trim(), "Command processed"),
        }

        self.transcript.record(Direction::Sent, &response);
        Reply {
            success: outcome.is_success(),
            response,
            error: outcome.error(),
        }
    }

    /// Owned copy of the current state, for dashboards and tests.
    pub fn snapshot(&self) -> ProtocolState {
        self.state.clone()
    }

    /// Borrowed view of the current state.
    pub fn state(&self) -> &ProtocolState {
        &self.state
    }

    /// Transcript entries, most recent first.
    pub fn history(&self) -> Vec<LogEntry> {
        self.transcript.history()
    }

    /// Restore factory defaults and clear the transcript.
    pub fn reset(&mut self) {
        self.state = ProtocolState::new();
        let cleared = self.transcript.clear();
        tracing::info!(cleared, "Protocol state reset to factory defaults");
    }

    /// Inject externally measured or simulated telemetry between commands.
    pub fn apply_telemetry(&mut self, update: &TelemetryUpdate) -> Result<(), TelemetryError> {
        self.state.apply_telemetry(update)
    }

    fn execute(&mut self, line: &str) -> crate::Result<Outcome> {
        let token = grammar::tokenize(line)?;
        let arg = token.command.arg.parse(token.payload)?;
        self.apply(token.command, arg)
    }

    fn apply(&mut self, command: &Command, arg: Arg) -> crate::Result<Outcome> {
        let state = &mut self.state;
        let outcome = match (command.op, arg) {
            // -- System --
            (Op::Version, Arg::None) => Outcome::Value(Field::text(
                command.code,
                "Firmware Version",
                self.options.firmware_version.clone(),
            )),
            (Op::EchoOn, Arg::None) => {
                state.set_echo(true);
                Outcome::Done
            }
            (Op::EchoOff, Arg::None) => {
                state.set_echo(false);
                Outcome::Done
            }
            (Op::Jet, Arg::None) => report_flag(command, state.subsystems.jet_running),
            (Op::Jet, Arg::Flag(on)) => {
                state.set_jet(on);
                Outcome::Done
            }
            (Op::Utf8, Arg::None) => report_flag(command, state.session.utf8),
            (Op::Utf8, Arg::Flag(on)) => {
                state.set_utf8(on);
                Outcome::Done
            }
            (Op::Login, Arg::Text(password)) => {
                if !password.eq_ignore_ascii_case(&self.options.password) {
                    return Err(ProtocolError::AuthenticationFailed);
                }
                state.set_logged_in(true);
                Outcome::Done
            }
            (Op::Logout, Arg::None) => {
                state.set_logged_in(false);
                Outcome::Done
            }

            // -- Queries --
            (Op::Status, Arg::None) => status(state),
            (Op::Counters, Arg::None) => Outcome::Fields {
                title: "Counters",
                fields: CounterId::ALL
                    .into_iter()
                    .map(|id| Field::int(id.key(), id.label(), state.counters.get(id)))
                    .collect(),
            },
            (Op::DateTime, Arg::None) => Outcome::Value(Field::text(
                command.code,
                command.label,
                Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            )),
            (Op::Temperatures, Arg::None) => Outcome::Fields {
                title: "Temperatures",
                fields: vec![
                    Field::decimal("TPH", "Printhead", state.temperatures.printhead, 1),
                    Field::decimal("TEL", "Electronics", state.temperatures.electronics, 1),
                ],
            },
            (Op::Diagnostics, Arg::None) => diagnostics(state),
            (Op::ListMessages, Arg::None) => Outcome::List {
                title: "Messages",
                items: state.store.messages.clone(),
            },
            (Op::ListLogos, Arg::None) => Outcome::List {
                title: "Logos",
                items: state.store.logos.clone(),
            },
            (Op::ListFonts, Arg::None) => Outcome::List {
                title: "Fonts",
                items: state.store.fonts.clone(),
            },
            (Op::CurrentMessage, Arg::None) => {
                Outcome::Value(Field::text(command.code, command.label, state.store.current.clone()))
            }
            (Op::MessageSettings, Arg::None) => message_settings(state),

            // -- Printing --
            (Op::HighVoltage, Arg::None) => report_flag(command, state.subsystems.high_voltage),
            (Op::HighVoltage, Arg::Flag(on)) => {
                state.set_high_voltage(on)?;
                Outcome::Done
            }
            (Op::ForcePrint, Arg::None) => {
                state.record_print()?;
                let empty = state.consumables.ink == FluidLevel::Empty
                    || state.consumables.makeup == FluidLevel::Empty;
                if empty {
                    tracing::warn!(
                        ink = state.consumables.ink.as_str(),
                        makeup = state.consumables.makeup.as_str(),
                        "Forced print with an empty consumable"
                    );
                }
                Outcome::Done
            }
            (Op::PhotoEyeOn, Arg::None) => {
                state.set_forced_photo_eye(true, None);
                Outcome::Done
            }
            (Op::PhotoEyeOn, Arg::Int(delay)) => {
                let delay = u32::try_from(delay).map_err(|_| ProtocolError::InvalidTriggerDelay)?;
                state.set_forced_photo_eye(true, Some(delay));
                Outcome::Done
            }
            (Op::PhotoEyeOff, Arg::None) => {
                state.set_forced_photo_eye(false, None);
                Outcome::Done
            }

            // -- Messages --
            (Op::SelectMessage, Arg::None) => {
                Outcome::Value(Field::text(command.code, "Current Message", state.store.current.clone()))
            }
            (Op::SelectMessage, Arg::Text(name)) => {
                state.select_message(&name)?;
                Outcome::Done
            }
            (Op::NewMessage, Arg::Text(name)) => {
                state.create_message(&name)?;
                Outcome::Done
            }
            (Op::CopyMessage, Arg::Pair(source, target)) => {
                state.copy_message(&source, &target)?;
                Outcome::Done
            }
            (Op::DeleteMessage, Arg::Text(name)) => {
                state.delete_message(&name)?;
                Outcome::Done
            }
            (Op::ViewMessage, Arg::Text(name)) => {
                let idx = state
                    .store
                    .position(&name)
                    .ok_or(ProtocolError::MessageNotFound)?;
                let stored = state.store.messages[idx].clone();
                let selected = state.store.is_current(&stored);
                Outcome::Fields {
                    title: "Message",
                    fields: vec![
                        Field::text("NAME", "Name", stored),
                        Field::int("POS", "Position", (idx + 1) as u64),
                        Field::flag("SEL", "Selected", selected),
                    ],
                }
            }
            (Op::Delimiter, Arg::None) => Outcome::Fields {
                title: command.label,
                fields: vec![
                    Field::text("DLM", "Delimiter", state.store.delimiter.symbol.to_string()),
                    Field::flag("DEN", "Enabled", state.store.delimiter.enabled),
                ],
            },
            (Op::Delimiter, Arg::Delimiter(symbol, enabled)) => {
                state.set_delimiter(symbol, enabled);
                Outcome::Done
            }
            (Op::Font, Arg::None) => {
                Outcome::Value(Field::text(command.code, command.label, state.store.current_font.clone()))
            }
            (Op::Font, Arg::Text(name)) => {
                state.set_font(&name)?;
                Outcome::Done
            }

            // -- Settings --
            (Op::Setting(key), Arg::None) => Outcome::Value(setting_field(state, key)),
            (Op::Setting(key), Arg::Int(value)) => {
                state.write_setting(key, value)?;
                Outcome::Done
            }
            (Op::AutoAlign, Arg::None) => report_flag(command, state.session.auto_align),
            (Op::AutoAlign, Arg::Flag(on)) => {
                state.set_auto_align(on);
                Outcome::Done
            }
            (Op::SetCounter, Arg::CounterValue(id, value)) => {
                state.set_counter(id, value);
                Outcome::Done
            }
            (Op::ResetCounter, Arg::Counter(id)) => {
                state.reset_counter(id);
                Outcome::Done
            }
            (Op::QueryCounter, Arg::Counter(id)) => {
                Outcome::Value(Field::int(id.key(), id.label(), state.counters.get(id)))
            }

            // -- One-to-one --
            (Op::OneToOneBegin, Arg::None) => {
                state.begin_one_to_one()?;
                Outcome::Done
            }
            (Op::OneToOneEnd, Arg::None) => {
                state.end_one_to_one();
                Outcome::Done
            }

            // The grammar never pairs an op with a shape it does not declare.
            (_, _) => return Err(ProtocolError::InvalidFormat),
        };
        Ok(outcome)
    }
}

fn report_flag(command: &Command, on: bool) -> Outcome {
    Outcome::Value(Field::flag(command.code, command.label, on))
}

fn setting_field(state: &ProtocolState, key: SettingKey) -> Field {
    Field::int(key.key(), key.label(), state.settings.get(key))
}

fn status(state: &ProtocolState) -> Outcome {
    let sub = &state.subsystems;
    let session = &state.session;
    Outcome::Fields {
        title: "Printer Status",
        fields: vec![
            Field::flag("HV", "High Voltage", sub.high_voltage),
            Field::flag("JET", "Jet", sub.jet_running),
            Field::flag("V300", "Valve 300", sub.valve_300),
            Field::flag("AUX1", "Auxiliary 1", sub.aux_1),
            Field::flag("AUX2", "Auxiliary 2", sub.aux_2),
            Field::flag("AUX3", "Auxiliary 3", sub.aux_3),
            Field::flag("GUT", "Gutter", sub.gutter),
            Field::flag("MOD", "Modulator", sub.modulator),
            Field::flag("ECHO", "Echo", session.echo),
            Field::flag("UTF8", "UTF-8", session.utf8),
            Field::flag("1TO1", "One-to-One", session.one_to_one),
            Field::flag("FPE", "Forced Photo-Eye", session.forced_photo_eye),
            Field::flag("ALN", "Auto Align", session.auto_align),
            Field::flag("LOG", "Logged In", session.logged_in),
            Field::level("INK", "Ink", state.consumables.ink),
            Field::level("MKP", "Makeup", state.consumables.makeup),
            Field::text("MSG", "Message", state.store.current.clone()),
        ],
    }
}

fn diagnostics(state: &ProtocolState) -> Outcome {
    let m = &state.metrics;
    Outcome::Fields {
        title: "Diagnostics",
        fields: vec![
            Field::int("MOD", "Modulation", m.modulation),
            Field::int("CHG", "Charge %", m.charge_percent),
            Field::decimal("PRS", "Pressure", m.pressure, 1),
            Field::int("RPS", "RPS", m.rps),
            Field::int("PHS", "Phase Quality %", m.phase_quality),
            Field::decimal("VIS", "Viscosity", m.viscosity, 2),
            Field::decimal("PWR", "Power-On Hours", state.runtime.power_on, 1),
            Field::decimal("JTH", "Ink Stream Hours", state.runtime.ink_stream, 1),
        ],
    }
}

fn message_settings(state: &ProtocolState) -> Outcome {
    let mut fields = Vec::with_capacity(SettingKey::ALL.len() + 3);
    fields.push(Field::text("MSG", "Message", state.store.current.clone()));
    fields.extend(SettingKey::ALL.into_iter().map(|key| setting_field(state, key)));
    fields.push(Field::text("FNT", "Font", state.store.current_font.clone()));
    fields.push(Field::flag("ALN", "Auto Align", state.session.auto_align));
    Outcome::Fields {
        title: "Message Settings",
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_command() {
        let mut engine = Engine::new();
        let reply = engine.process("^ZZ");
        assert!(!reply.success);
        assert_eq!(reply.error, Some(ProtocolError::UnknownCommand));
        assert_eq!(reply.response, "? 3: UNKNOWN COMMAND");
    }

    #[test]
    fn test_echo_on_answers_verbose() {
        let mut engine = Engine::new();
        assert_eq!(engine.process("^EN").response, "Command Successful!");
        assert_eq!(engine.process("^EF").response, ">");
    }

    #[test]
    fn test_transcript_records_both_directions() {
        let mut engine = Engine::new();
        engine.process("^SJ 1");
        let history = engine.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].direction, Direction::Sent);
        assert_eq!(history[0].text, ">");
        assert_eq!(history[1].direction, Direction::Received);
        assert_eq!(history[1].text, "^SJ 1");
    }

    #[test]
    fn test_no_arg_command_rejects_payload() {
        let mut engine = Engine::new();
        let reply = engine.process("^PT 5");
        assert_eq!(reply.error, Some(ProtocolError::InvalidFormat));
    }
}
