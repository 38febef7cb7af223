//! Mode-independent results produced by the dispatcher.

use crate::error::ProtocolError;
use crate::state::FluidLevel;

/// A single reported value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Flag(bool),
    Int(u64),
    /// Value with a fixed number of decimals.
    Decimal(f64, usize),
    Text(String),
    Level(FluidLevel),
}

/// A labelled value: `key` is the terse name, `label` the verbose one.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
    pub value: FieldValue,
}

impl Field {
    pub fn new(key: &'static str, label: &'static str, value: FieldValue) -> Self {
        Self { key, label, value }
    }

    pub fn flag(key: &'static str, label: &'static str, on: bool) -> Self {
        Self::new(key, label, FieldValue::Flag(on))
    }

    pub fn int(key: &'static str, label: &'static str, value: impl Into<u64>) -> Self {
        Self::new(key, label, FieldValue::Int(value.into()))
    }

    pub fn decimal(key: &'static str, label: &'static str, value: f64, places: usize) -> Self {
        Self::new(key, label, FieldValue::Decimal(value, places))
    }

    pub fn text(key: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        Self::new(key, label, FieldValue::Text(value.into()))
    }

    pub fn level(key: &'static str, label: &'static str, level: FluidLevel) -> Self {
        Self::new(key, label, FieldValue::Level(level))
    }
}

/// What a command produced, before it is rendered in terse or verbose form.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Bare success.
    Done,
    /// One value, typically the query form of a setting.
    Value(Field),
    /// A titled block of values.
    Fields {
        title: &'static str,
        fields: Vec<Field>,
    },
    /// A titled list of names.
    List {
        title: &'static str,
        items: Vec<String>,
    },
    Failed(ProtocolError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    pub fn error(&self) -> Option<ProtocolError> {
        match self {
            Self::Failed(e) => Some(*e),
            _ => None,
        }
    }
}

impl From<Result<Outcome, ProtocolError>> for Outcome {
    fn from(result: Result<Outcome, ProtocolError>) -> Self {
        result.unwrap_or_else(Outcome::Failed)
    }
}
