//! Response formatter: renders an [`Outcome`] in terse or verbose (echo) form.

use crate::outcome::{Field, FieldValue, Outcome};

/// Separator between lines of a multi-line response.
pub const LINE_SEPARATOR: &str = "\r\n";

/// Terminates list responses in terse mode.
pub const END_OF_LIST: &str = "//EOL";

pub const TERSE_OK: &str = ">";
pub const VERBOSE_OK: &str = "Command Successful!";

/// Which of the two wire formats to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Terse,
    Verbose,
}

impl Mode {
    pub fn from_echo(echo: bool) -> Self {
        if echo { Self::Verbose } else { Self::Terse }
    }
}

/// Render an outcome. This is the only place that knows about the two formats.
pub fn render(outcome: &Outcome, mode: Mode) -> String {
    match (outcome, mode) {
        (Outcome::Done, Mode::Terse) => TERSE_OK.to_string(),
        (Outcome::Done, Mode::Verbose) => VERBOSE_OK.to_string(),

        (Outcome::Value(field), Mode::Terse) => terse_field(field),
        (Outcome::Value(field), Mode::Verbose) => verbose_field(field),

        (Outcome::Fields { fields, .. }, Mode::Terse) => fields
            .iter()
            .map(terse_field)
            .collect::<Vec<_>>()
            .join(" "),
        (Outcome::Fields { title, fields }, Mode::Verbose) => {
            let mut lines = Vec::with_capacity(fields.len() + 1);
            lines.push(title.to_string());
            lines.extend(fields.iter().map(verbose_field));
            lines.join(LINE_SEPARATOR)
        }

        (Outcome::List { items, .. }, Mode::Terse) => {
            let mut lines = items.clone();
            lines.push(END_OF_LIST.to_string());
            lines.join(LINE_SEPARATOR)
        }
        (Outcome::List { title, items }, Mode::Verbose) => {
            let mut lines = Vec::with_capacity(items.len() + 1);
            lines.push(format!("{title} ({}):", items.len()));
            lines.extend(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| format!("  {}. {item}", i + 1)),
            );
            lines.join(LINE_SEPARATOR)
        }

        (Outcome::Failed(err), Mode::Terse) => format!("? {}: {}", err.code(), err.short_label()),
        (Outcome::Failed(err), Mode::Verbose) => format!("Error {}: {err}", err.code()),
    }
}

fn terse_field(field: &Field) -> String {
    format!("{}:{}", field.key, terse_value(&field.value))
}

fn verbose_field(field: &Field) -> String {
    format!("{}: {}", field.label, verbose_value(&field.value))
}

fn terse_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Flag(on) => String::from(if *on { "1" } else { "0" }),
        other => plain_value(other),
    }
}

fn verbose_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Flag(on) => String::from(if *on { "ON" } else { "OFF" }),
        other => plain_value(other),
    }
}

fn plain_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Flag(on) => on.to_string(),
        FieldValue::Int(n) => n.to_string(),
        FieldValue::Decimal(v, places) => format!("{v:.prec$}", prec = *places),
        FieldValue::Text(s) => s.clone(),
        FieldValue::Level(level) => level.as_str().to_string(),
    }
}
