//! Command: the closed set of actions a device can receive.
//!
//! Callers hand commands over as free text (`"Turn On"`, `"Set Brightness 75"`, …).
//! The text is parsed exactly once, when it crosses into the domain, using a
//! fixed case-insensitive precedence so that overlapping keywords resolve the
//! same way every time (`"disarm"` contains `"arm"`, so it is checked first).

use std::fmt;
use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};

/// An operation that can be applied to a [`Device`](crate::device::Device).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Command {
    TurnOn,
    TurnOff,
    /// Target brightness before clamping to `0..=100`.
    SetBrightness(i64),
    /// Target temperature in °C before clamping to `10.0..=30.0`.
    SetTemperature(f64),
    Arm,
    Disarm,
}

impl Command {
    /// Parse free text into a command.
    ///
    /// Rules are tried in order and the first keyword found wins:
    /// `disarm`, `arm`, `brightness`, `temperature`, `on`, `off`.
    /// The numeric argument of `brightness`/`temperature` is the last
    /// whitespace-separated token; integers beyond `i64` saturate and
    /// infinities are kept, so clamping later applies to them too. Returns
    /// `None` when no rule matches, or when the first matching rule needs an
    /// argument that does not parse (NaN included).
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let lowered = text.to_lowercase();

        if lowered.contains("disarm") {
            Some(Self::Disarm)
        } else if lowered.contains("arm") {
            Some(Self::Arm)
        } else if lowered.contains("brightness") {
            parse_saturating(last_token(&lowered)?).map(Self::SetBrightness)
        } else if lowered.contains("temperature") {
            last_token(&lowered)?
                .parse::<f64>()
                .ok()
                .filter(|value| !value.is_nan())
                .map(Self::SetTemperature)
        } else if lowered.contains("on") {
            Some(Self::TurnOn)
        } else if lowered.contains("off") {
            Some(Self::TurnOff)
        } else {
            None
        }
    }
}

fn last_token(text: &str) -> Option<&str> {
    text.split_whitespace().next_back()
}

fn parse_saturating(token: &str) -> Option<i64> {
    match token.parse::<i64>() {
        Ok(value) => Some(value),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

/// Canonical display form, which [`Command::parse`] maps back to the same command.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TurnOn => f.write_str("Turn On"),
            Self::TurnOff => f.write_str("Turn Off"),
            Self::SetBrightness(value) => write!(f, "Set Brightness {value}"),
            Self::SetTemperature(value) => write!(f, "Set Temperature {value}"),
            Self::Arm => f.write_str("Arm"),
            Self::Disarm => f.write_str("Disarm"),
        }
    }
}

/// The action of a task: the text supplied by the caller together with the
/// command parsed from it.
///
/// Serialized as the raw text; deserializing re-parses it, so the two never
/// disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TaskAction {
    text: String,
    command: Option<Command>,
}

impl TaskAction {
    /// Parse caller-supplied text. Unrecognised text yields an inert action.
    #[must_use]
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        let command = Command::parse(&text);
        Self { text, command }
    }

    /// The text exactly as supplied.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The parsed command, or `None` when the text matched no rule.
    #[must_use]
    pub fn command(&self) -> Option<Command> {
        self.command
    }
}

impl From<Command> for TaskAction {
    fn from(command: Command) -> Self {
        Self {
            text: command.to_string(),
            command: Some(command),
        }
    }
}

impl From<String> for TaskAction {
    fn from(text: String) -> Self {
        Self::parse(text)
    }
}

impl From<&str> for TaskAction {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<TaskAction> for String {
    fn from(action: TaskAction) -> Self {
        action.text
    }
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
