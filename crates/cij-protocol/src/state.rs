//! Protocol state: everything the printer reports, plus the rules that keep it consistent.
//!
//! Fields are public for reading through [`crate::Engine::snapshot`]. Mutation
//! goes through the `pub(crate)` entry points below, which the dispatcher is
//! the only caller of. Coupled flags (jet / high voltage / one-to-one) are
//! updated together inside a single call.

use serde::Serialize;

use crate::Result;
use crate::error::ProtocolError;
use crate::grammar::{
    IntRange, BOLD_RANGE, DELAY_RANGE, GAP_RANGE, HEIGHT_RANGE, PITCH_RANGE, REPEAT_RANGE,
    REVERSE_DELAY_RANGE, TRIGGER_DELAY_RANGE, WIDTH_RANGE,
};

const DEFAULT_MESSAGES: &[&str] = &["DEFAULT", "TEST", "LOT CODE", "EXPIRY"];
const DEFAULT_LOGOS: &[&str] = &["LOGO1", "RECYCLE", "CE MARK"];
const DEFAULT_FONTS: &[&str] = &["5X5", "7X5", "9X7", "12X9", "16X10", "24X16"];
const DEFAULT_FONT: &str = "7X5";

/// Ink or makeup fluid level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FluidLevel {
    Full,
    /// Reported by the makeup tank only.
    Good,
    Low,
    Empty,
}

impl FluidLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "FULL",
            Self::Good => "GOOD",
            Self::Low => "LOW",
            Self::Empty => "EMPTY",
        }
    }
}

/// On/off status of the print engine hardware.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubsystemFlags {
    pub high_voltage: bool,
    pub jet_running: bool,
    pub valve_300: bool,
    pub aux_1: bool,
    pub aux_2: bool,
    pub aux_3: bool,
    pub gutter: bool,
    pub modulator: bool,
}

/// Flags scoped to the current protocol session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionFlags {
    pub echo: bool,
    pub utf8: bool,
    pub one_to_one: bool,
    pub forced_photo_eye: bool,
    pub auto_align: bool,
    pub logged_in: bool,
}

/// Live jet metrics. Written only through telemetry injection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveMetrics {
    pub modulation: u32,
    pub charge_percent: u32,
    pub pressure: f64,
    pub rps: u32,
    pub phase_quality: u32,
    pub viscosity: f64,
}

impl Default for LiveMetrics {
    fn default() -> Self {
        Self {
            modulation: 120,
            charge_percent: 50,
            pressure: 40.0,
            rps: 60,
            phase_quality: 100,
            viscosity: 3.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Temperatures {
    pub printhead: f64,
    pub electronics: f64,
}

impl Default for Temperatures {
    fn default() -> Self {
        Self {
            printhead: 32.0,
            electronics: 38.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Consumables {
    pub ink: FluidLevel,
    pub makeup: FluidLevel,
}

impl Default for Consumables {
    fn default() -> Self {
        Self {
            ink: FluidLevel::Full,
            makeup: FluidLevel::Full,
        }
    }
}

/// Identifies one counter on the wire: `0` product, `1`-`4` custom, `5` print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CounterId {
    Product,
    /// Zero-based custom counter slot (`0..4`).
    Custom(u8),
    Print,
}

impl CounterId {
    pub const ALL: [CounterId; 6] = [
        Self::Product,
        Self::Custom(0),
        Self::Custom(1),
        Self::Custom(2),
        Self::Custom(3),
        Self::Print,
    ];

    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::Product),
            1..=4 => Some(Self::Custom((index - 1) as u8)),
            5 => Some(Self::Print),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Self::Product => 0,
            Self::Custom(slot) => slot + 1,
            Self::Print => 5,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Product => "PC",
            Self::Custom(0) => "C1",
            Self::Custom(1) => "C2",
            Self::Custom(2) => "C3",
            Self::Custom(_) => "C4",
            Self::Print => "PRC",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Product => "Product Count",
            Self::Custom(0) => "Custom Counter 1",
            Self::Custom(1) => "Custom Counter 2",
            Self::Custom(2) => "Custom Counter 3",
            Self::Custom(_) => "Custom Counter 4",
            Self::Print => "Print Count",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub product: u64,
    pub print: u64,
    pub custom: [u64; 4],
}

impl Counters {
    pub fn get(&self, id: CounterId) -> u64 {
        match id {
            CounterId::Product => self.product,
            CounterId::Print => self.print,
            CounterId::Custom(slot) => self.custom[slot as usize],
        }
    }

    fn set(&mut self, id: CounterId, value: u64) {
        match id {
            CounterId::Product => self.product = value,
            CounterId::Print => self.print = value,
            CounterId::Custom(slot) => self.custom[slot as usize] = value,
        }
    }

    fn record_print(&mut self) {
        self.product = self.product.saturating_add(1);
        self.print = self.print.saturating_add(1);
        for c in &mut self.custom {
            *c = c.saturating_add(1);
        }
    }
}

/// A range-checked print setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SettingKey {
    Delay,
    ReverseDelay,
    TriggerDelay,
    Pitch,
    Height,
    Width,
    Repeat,
    Gap,
    Bold,
}

impl SettingKey {
    pub const ALL: [SettingKey; 9] = [
        Self::Delay,
        Self::ReverseDelay,
        Self::TriggerDelay,
        Self::Pitch,
        Self::Height,
        Self::Width,
        Self::Repeat,
        Self::Gap,
        Self::Bold,
    ];

    pub fn range(self) -> IntRange {
        match self {
            Self::Delay => DELAY_RANGE,
            Self::ReverseDelay => REVERSE_DELAY_RANGE,
            Self::TriggerDelay => TRIGGER_DELAY_RANGE,
            Self::Pitch => PITCH_RANGE,
            Self::Height => HEIGHT_RANGE,
            Self::Width => WIDTH_RANGE,
            Self::Repeat => REPEAT_RANGE,
            Self::Gap => GAP_RANGE,
            Self::Bold => BOLD_RANGE,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Delay => "DA",
            Self::ReverseDelay => "DR",
            Self::TriggerDelay => "DP",
            Self::Pitch => "PA",
            Self::Height => "PH",
            Self::Width => "PW",
            Self::Repeat => "RA",
            Self::Gap => "GP",
            Self::Bold => "SB",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Delay => "Delay",
            Self::ReverseDelay => "Reverse Delay",
            Self::TriggerDelay => "Trigger Delay",
            Self::Pitch => "Pitch",
            Self::Height => "Print Height",
            Self::Width => "Print Width",
            Self::Repeat => "Repeat",
            Self::Gap => "Gap",
            Self::Bold => "Bold",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintSettings {
    pub delay: u32,
    pub reverse_delay: u32,
    pub trigger_delay: u32,
    pub pitch: u32,
    pub height: u32,
    pub width: u32,
    pub repeat: u32,
    pub gap: u32,
    pub bold: u32,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            delay: 100,
            reverse_delay: 100,
            trigger_delay: 0,
            pitch: 0,
            height: 10,
            width: 1000,
            repeat: 0,
            gap: 0,
            bold: 0,
        }
    }
}

impl PrintSettings {
    pub fn get(&self, key: SettingKey) -> u32 {
        match key {
            SettingKey::Delay => self.delay,
            SettingKey::ReverseDelay => self.reverse_delay,
            SettingKey::TriggerDelay => self.trigger_delay,
            SettingKey::Pitch => self.pitch,
            SettingKey::Height => self.height,
            SettingKey::Width => self.width,
            SettingKey::Repeat => self.repeat,
            SettingKey::Gap => self.gap,
            SettingKey::Bold => self.bold,
        }
    }

    fn slot(&mut self, key: SettingKey) -> &mut u32 {
        match key {
            SettingKey::Delay => &mut self.delay,
            SettingKey::ReverseDelay => &mut self.reverse_delay,
            SettingKey::TriggerDelay => &mut self.trigger_delay,
            SettingKey::Pitch => &mut self.pitch,
            SettingKey::Height => &mut self.height,
            SettingKey::Width => &mut self.width,
            SettingKey::Repeat => &mut self.repeat,
            SettingKey::Gap => &mut self.gap,
            SettingKey::Bold => &mut self.bold,
        }
    }
}

/// Separator between variable data fields in a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDelimiter {
    pub symbol: char,
    pub enabled: bool,
}

impl Default for FieldDelimiter {
    fn default() -> Self {
        Self {
            symbol: '|',
            enabled: false,
        }
    }
}

/// Stored messages, logos and fonts. `current` always names an entry of `messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageStore {
    pub messages: Vec<String>,
    pub logos: Vec<String>,
    pub current: String,
    pub fonts: Vec<String>,
    pub current_font: String,
    pub delimiter: FieldDelimiter,
}

impl Default for MessageStore {
    fn default() -> Self {
        let owned = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            messages: owned(DEFAULT_MESSAGES),
            logos: owned(DEFAULT_LOGOS),
            current: DEFAULT_MESSAGES[0].to_string(),
            fonts: owned(DEFAULT_FONTS),
            current_font: DEFAULT_FONT.to_string(),
            delimiter: FieldDelimiter::default(),
        }
    }
}

impl MessageStore {
    /// Position of a message, matched case-insensitively.
    pub fn position(&self, name: &str) -> Option<usize> {
        position_ci(&self.messages, name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn is_current(&self, name: &str) -> bool {
        self.current.eq_ignore_ascii_case(name)
    }
}

fn position_ci(names: &[String], name: &str) -> Option<usize> {
    names.iter().position(|n| n.eq_ignore_ascii_case(name))
}

/// Cumulative runtime meters, in hours.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RuntimeHours {
    pub power_on: f64,
    pub ink_stream: f64,
}

/// The complete state reported by one printer session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProtocolState {
    pub subsystems: SubsystemFlags,
    pub session: SessionFlags,
    pub metrics: LiveMetrics,
    pub temperatures: Temperatures,
    pub consumables: Consumables,
    pub counters: Counters,
    pub settings: PrintSettings,
    pub store: MessageStore,
    pub runtime: RuntimeHours,
}

impl ProtocolState {
    /// Factory defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start or stop the jet. Stopping also drops high voltage and one-to-one mode.
    pub(crate) fn set_jet(&mut self, running: bool) {
        self.subsystems.jet_running = running;
        if !running {
            self.subsystems.high_voltage = false;
            self.subsystems.valve_300 = false;
            self.session.one_to_one = false;
        }
    }

    /// High voltage and valve-300 switch together; enabling requires a running jet.
    pub(crate) fn set_high_voltage(&mut self, on: bool) -> Result<()> {
        if on && !self.subsystems.jet_running {
            return Err(ProtocolError::CannotPrint);
        }
        self.subsystems.high_voltage = on;
        self.subsystems.valve_300 = on;
        Ok(())
    }

    /// One-to-one supersedes forced photo-eye, so entering it clears both it and its delay.
    pub(crate) fn begin_one_to_one(&mut self) -> Result<()> {
        if !self.subsystems.jet_running {
            return Err(ProtocolError::JetStopped);
        }
        self.session.one_to_one = true;
        self.session.forced_photo_eye = false;
        self.settings.trigger_delay = 0;
        Ok(())
    }

    pub(crate) fn end_one_to_one(&mut self) {
        self.session.one_to_one = false;
    }

    pub(crate) fn set_forced_photo_eye(&mut self, on: bool, trigger_delay: Option<u32>) {
        self.session.forced_photo_eye = on;
        if let Some(delay) = trigger_delay {
            self.settings.trigger_delay = delay;
        }
    }

    pub(crate) fn set_echo(&mut self, on: bool) {
        self.session.echo = on;
    }

    pub(crate) fn set_utf8(&mut self, on: bool) {
        self.session.utf8 = on;
    }

    pub(crate) fn set_auto_align(&mut self, on: bool) {
        self.session.auto_align = on;
    }

    pub(crate) fn set_logged_in(&mut self, on: bool) {
        self.session.logged_in = on;
    }

    /// Select a stored message. Returns the stored spelling of its name.
    pub(crate) fn select_message(&mut self, name: &str) -> Result<&str> {
        let idx = self
            .store
            .position(name)
            .ok_or(ProtocolError::MessageNotFound)?;
        self.store.current = self.store.messages[idx].clone();
        Ok(&self.store.current)
    }

    pub(crate) fn create_message(&mut self, name: &str) -> Result<()> {
        if self.store.contains(name) {
            return Err(ProtocolError::MessageExists);
        }
        self.store.messages.push(name.to_string());
        Ok(())
    }

    pub(crate) fn copy_message(&mut self, source: &str, target: &str) -> Result<()> {
        if !self.store.contains(source) {
            return Err(ProtocolError::MessageNotFound);
        }
        self.create_message(target)
    }

    /// Remove a message. The selected message can never be deleted.
    pub(crate) fn delete_message(&mut self, name: &str) -> Result<()> {
        let idx = self
            .store
            .position(name)
            .ok_or(ProtocolError::MessageNotFound)?;
        if self.store.is_current(name) {
            return Err(ProtocolError::DeleteFailed);
        }
        self.store.messages.remove(idx);
        Ok(())
    }

    pub(crate) fn set_font(&mut self, name: &str) -> Result<&str> {
        let idx = position_ci(&self.store.fonts, name).ok_or(ProtocolError::FontNotFound)?;
        self.store.current_font = self.store.fonts[idx].clone();
        Ok(&self.store.current_font)
    }

    pub(crate) fn set_delimiter(&mut self, symbol: char, enabled: bool) {
        self.store.delimiter = FieldDelimiter { symbol, enabled };
    }

    /// A forced print needs high voltage; every counter advances by one.
    pub(crate) fn record_print(&mut self) -> Result<()> {
        if !self.subsystems.high_voltage {
            return Err(ProtocolError::CannotPrint);
        }
        self.counters.record_print();
        Ok(())
    }

    /// Range-check then write. Nothing changes when the value is rejected.
    pub(crate) fn write_setting(&mut self, key: SettingKey, value: i64) -> Result<()> {
        let value = key.range().check(value)?;
        let value = u32::try_from(value).map_err(|_| key.range().error)?;
        *self.settings.slot(key) = value;
        Ok(())
    }

    pub(crate) fn set_counter(&mut self, id: CounterId, value: u64) {
        self.counters.set(id, value);
    }

    pub(crate) fn reset_counter(&mut self, id: CounterId) {
        self.counters.set(id, 0);
    }
}
