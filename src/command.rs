//! Control command decoding.
//!
//! Each input line is one JSON object. The only step that looks at raw text
//! is [`parse`]; everything downstream works on the closed [`Command`] enum.

use serde::Deserialize;
use serde_json::Value;

/// A decoded control command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show an image, replacing any image already on screen.
    AddImage {
        x: u32,
        y: u32,
        max_width: u32,
        max_height: u32,
        path: String,
    },
    /// Remove the image currently on screen, if any.
    RemoveImage,
    /// Valid JSON whose `action` is missing or not supported.
    Unrecognized { raw: String },
}

impl Command {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddImage { .. } => "add",
            Command::RemoveImage => "remove",
            Command::Unrecognized { .. } => "unrecognized",
        }
    }
}

/// Reasons a line could not be turned into a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The line is not valid JSON (or not valid UTF-8).
    #[error("malformed command: {0}")]
    Malformed(String),
    /// The action is known but its fields are missing or have the wrong type.
    #[error("invalid fields for '{action}' command: {reason}")]
    InvalidFields { action: &'static str, reason: String },
}

#[derive(Deserialize)]
struct AddFields {
    x: u32,
    y: u32,
    max_width: u32,
    max_height: u32,
    path: String,
}

/// Parse one input line into a [`Command`].
///
/// Pure: no logging and no side effects. Callers decide how loudly to report
/// errors and unsupported actions.
pub fn parse(line: &str) -> Result<Command, ParseError> {
    let value: Value =
        serde_json::from_str(line).map_err(|e| ParseError::Malformed(e.to_string()))?;

    match value.get("action").and_then(Value::as_str) {
        Some("add") => {
            let fields = AddFields::deserialize(&value).map_err(|e| ParseError::InvalidFields {
                action: "add",
                reason: e.to_string(),
            })?;
            Ok(Command::AddImage {
                x: fields.x,
                y: fields.y,
                max_width: fields.max_width,
                max_height: fields.max_height,
                path: fields.path,
            })
        }
        Some("remove") => Ok(Command::RemoveImage),
        _ => Ok(Command::Unrecognized {
            raw: line.trim().to_string(),
        }),
    }
}

/// Parse raw bytes read from the input stream.
///
/// Lines that are not UTF-8 are reported as [`ParseError::Malformed`] instead
/// of ending the stream.
pub fn parse_bytes(line: &[u8]) -> Result<Command, ParseError> {
    let text = std::str::from_utf8(line).map_err(|e| ParseError::Malformed(e.to_string()))?;
    parse(text)
}
