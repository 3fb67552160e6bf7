//! [`Protocol`] implementation for AT command modules.
//!
//! Every received line is one of:
//!
//! - a final result code (`OK`, `ERROR`, `+CME ERROR: <n>`,
//!   `+CMS ERROR: <n>`), which confirms the command in flight;
//! - an event line starting with the event marker, matched against the
//!   event table;
//! - anything else (command echo, unknown text), which is dropped.

use tracing::debug;

use wirelink_core::error::{Error, Result};
use wirelink_core::protocol::{Classified, Protocol};

use crate::events::{match_event, AtEvent, EventMatch};
use crate::line::LineAssembler;

/// Default line terminator.
pub const CRLF: &[u8] = b"\r\n";

/// Line framing parameters of an AT module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtConfig {
    /// One- or two-byte line terminator (default `\r\n`).
    pub eol: Vec<u8>,
    /// First character of event lines (default `+`).
    pub event_marker: char,
    /// Longest line accepted, terminator excluded (default 1024).
    pub max_line: usize,
}

impl Default for AtConfig {
    fn default() -> Self {
        Self {
            eol: CRLF.to_vec(),
            event_marker: '+',
            max_line: 1024,
        }
    }
}

/// Correlation key of an AT confirmation.
///
/// AT modules answer one command at a time, so every final result code
/// confirms whatever is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtKey {
    Final,
}

/// Final result code of a command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AtStatus {
    Ok,
    Error,
    /// `+CME ERROR: <code>`; the code is kept as sent, numeric or verbose.
    CmeError(String),
    /// `+CMS ERROR: <code>`
    CmsError(String),
}

impl AtStatus {
    pub fn is_ok(&self) -> bool {
        *self == AtStatus::Ok
    }
}

/// Parse a final result code, if `line` is one.
pub fn final_result(line: &str) -> Option<AtStatus> {
    match line {
        "OK" => Some(AtStatus::Ok),
        "ERROR" => Some(AtStatus::Error),
        _ => {
            if let Some(code) = line.strip_prefix("+CME ERROR:") {
                Some(AtStatus::CmeError(code.trim().to_string()))
            } else {
                line.strip_prefix("+CMS ERROR:")
                    .map(|code| AtStatus::CmsError(code.trim().to_string()))
            }
        }
    }
}

/// Classify one complete line.
pub fn classify_line(line: &str, marker: char) -> Result<Classified<AtKey, AtStatus, AtEvent>> {
    if let Some(status) = final_result(line) {
        return Ok(Classified::Confirmation {
            key: AtKey::Final,
            status,
        });
    }

    let Some(body) = line.strip_prefix(marker) else {
        return Err(Error::UnrecognizedMessage(line.to_string()));
    };

    match match_event(body) {
        EventMatch::Parsed(event) => Ok(Classified::Event(event)),
        EventMatch::Malformed(name) => Err(Error::UnrecognizedMessage(format!(
            "malformed {marker}{name} line: {line}"
        ))),
        EventMatch::Unknown => Err(Error::UnrecognizedMessage(line.to_string())),
    }
}

/// Line assembler and classifier of one AT module.
#[derive(Debug)]
pub struct AtProtocol {
    lines: LineAssembler,
    marker: char,
}

impl AtProtocol {
    pub fn new(config: &AtConfig) -> Result<Self> {
        Ok(AtProtocol {
            lines: LineAssembler::new(&config.eol, config.max_line)?,
            marker: config.event_marker,
        })
    }
}

impl Protocol for AtProtocol {
    type Key = AtKey;
    type Status = AtStatus;
    type Event = AtEvent;

    fn push_byte(&mut self, byte: u8) -> Option<Result<Classified<AtKey, AtStatus, AtEvent>>> {
        let line = match self.lines.push(byte)? {
            Ok(line) => line,
            Err(e) => return Some(Err(e)),
        };
        debug!(line = %line, "AT line received");
        Some(classify_line(&line, self.marker))
    }

    fn reset(&mut self) {
        self.lines.reset();
    }
}
