//! Typed unsolicited result codes.
//!
//! Lines that start with the event marker are matched against [`EVENT_TABLE`]
//! by name, longest name first, and parsed into an [`AtEvent`].

use crate::command::{is_quoted, split_args, unquote};

/// An unsolicited (or information) line from an AT module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtEvent {
    /// `+CEREG`: EPS network registration status.
    NetworkRegistration {
        stat: u8,
        /// Tracking area code, hex string.
        tac: Option<String>,
        /// E-UTRAN cell id, hex string.
        eci: Option<String>,
        /// Access technology.
        act: Option<u8>,
    },
    /// `+CREG`: circuit-switched network registration status.
    CircuitRegistration {
        stat: u8,
        /// Location area code, hex string.
        lac: Option<String>,
        /// Cell id, hex string.
        ci: Option<String>,
        act: Option<u8>,
    },
    /// `+CSQ`: received signal strength and bit error rate.
    SignalQuality { rssi: u8, ber: u8 },
    /// `+CSCON`: radio connection state.
    ConnectionStatus { connected: bool },
    /// `+CPIN`: SIM state, e.g. `READY` or `SIM PIN`.
    SimStatus(String),
    /// `+CGEV`: packet domain event, e.g. `ME PDN ACT 1`.
    PacketDomain(String),
}

type Parser = fn(&str) -> Option<AtEvent>;

/// Known event names and their parsers, longest name first.
pub static EVENT_TABLE: &[(&str, Parser)] = &[
    ("CEREG", parse_cereg),
    ("CSCON", parse_cscon),
    ("CREG", parse_creg),
    ("CPIN", parse_cpin),
    ("CGEV", parse_cgev),
    ("CSQ", parse_csq),
];

/// Outcome of matching one marker line against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventMatch {
    /// Known name, parsed.
    Parsed(AtEvent),
    /// Known name, but the arguments did not parse.
    Malformed(&'static str),
    /// No entry for this name.
    Unknown,
}

/// Match `body` (the line with its marker removed) against the table.
pub fn match_event(body: &str) -> EventMatch {
    for &(name, parse) in EVENT_TABLE {
        let Some(rest) = body.strip_prefix(name) else {
            continue;
        };
        let Some(args) = rest.strip_prefix(':') else {
            continue;
        };
        return match parse(args.trim()) {
            Some(event) => EventMatch::Parsed(event),
            None => EventMatch::Malformed(name),
        };
    }
    EventMatch::Unknown
}

fn parse_u8(arg: &str) -> Option<u8> {
    unquote(arg).parse().ok()
}

fn optional_text(arg: Option<&&str>) -> Option<String> {
    arg.map(|a| unquote(a))
        .filter(|a| !a.is_empty())
        .map(str::to_string)
}

type Registration = (u8, Option<String>, Option<String>, Option<u8>);

/// `<stat>[,<area>,<cell>[,<act>]]`, optionally preceded by the `<n>`
/// setting when the line answers a query.
fn parse_registration(text: &str) -> Option<Registration> {
    let mut args = split_args(text);
    // Query answers lead with the bare <n> setting; unsolicited ones
    // start at <stat>, followed by quoted area and cell codes.
    if args.len() >= 2 && !is_quoted(args[1]) && !args[1].is_empty() {
        args.remove(0);
    }
    let stat = parse_u8(args.first()?)?;
    let area = optional_text(args.get(1));
    let cell = optional_text(args.get(2));
    let act = match args.get(3) {
        Some(a) if !a.is_empty() => Some(parse_u8(a)?),
        _ => None,
    };
    Some((stat, area, cell, act))
}

fn parse_cereg(text: &str) -> Option<AtEvent> {
    let (stat, tac, eci, act) = parse_registration(text)?;
    Some(AtEvent::NetworkRegistration { stat, tac, eci, act })
}

fn parse_creg(text: &str) -> Option<AtEvent> {
    let (stat, lac, ci, act) = parse_registration(text)?;
    Some(AtEvent::CircuitRegistration { stat, lac, ci, act })
}

fn parse_csq(text: &str) -> Option<AtEvent> {
    let args = split_args(text);
    match args.as_slice() {
        [rssi, ber] => Some(AtEvent::SignalQuality {
            rssi: parse_u8(rssi)?,
            ber: parse_u8(ber)?,
        }),
        _ => None,
    }
}

fn parse_cscon(text: &str) -> Option<AtEvent> {
    let args = split_args(text);
    // `<mode>` unsolicited, `<n>,<mode>` in a query answer.
    let mode = match args.as_slice() {
        [mode] | [_, mode] => parse_u8(mode)?,
        _ => return None,
    };
    Some(AtEvent::ConnectionStatus {
        connected: mode != 0,
    })
}

fn parse_cpin(text: &str) -> Option<AtEvent> {
    let state = unquote(text);
    (!state.is_empty()).then(|| AtEvent::SimStatus(state.to_string()))
}

fn parse_cgev(text: &str) -> Option<AtEvent> {
    (!text.is_empty()).then(|| AtEvent::PacketDomain(text.to_string()))
}
