// wirelink command-line tool -- exercises binary-framed and AT command
// modules against real hardware or a mock transport.
//
// Usage:
//   wirelink-cli --family radio --port /dev/ttyUSB0 reset
//   wirelink-cli --family ble --port /dev/ttyUSB1 send 0x04 "01 02 03"
//   wirelink-cli --family ble --mock state
//   wirelink-cli --family at --port /dev/ttyUSB2 at +CEREG 2
//   wirelink-cli --family at --port /dev/ttyUSB2 at --query +CPIN
//   wirelink-cli --family at --port /dev/ttyUSB2 monitor --duration 60
//   wirelink-cli --family radio --mock stats
//
// The port and baud rate may also come from WIRELINK_PORT and WIRELINK_BAUD.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::level_filters::LevelFilter;

use wirelink::at::command::encode_command;
use wirelink::at::protocol::CRLF;
use wirelink::at::{AtArg, AtCommand, AtEvent, AtModule, AtModuleBuilder, AtStatus};
use wirelink::binary::commands::{self, confirmation_of};
use wirelink::binary::frame::{encode_frame, encode_request};
use wirelink::binary::{BinaryModule, BinaryModuleBuilder, FrameProfile, Indication};
use wirelink::StatsSnapshot;
use wirelink_test_harness::MockTransport;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// wirelink command-line tool -- talks to a wireless module over a UART.
#[derive(Parser)]
#[command(name = "wirelink-cli", version, about)]
struct Cli {
    /// Module family: the wire format spoken on the port.
    #[arg(long, value_enum, default_value_t = Family::Radio)]
    family: Family,

    /// Serial port path (e.g. /dev/ttyUSB0, COM3).
    /// Required unless --mock is used.
    #[arg(long, env = "WIRELINK_PORT")]
    port: Option<String>,

    /// Override the default baud rate (115200).
    #[arg(long, env = "WIRELINK_BAUD")]
    baud: Option<u32>,

    /// How long each command waits for its confirmation, in milliseconds.
    #[arg(long, default_value_t = 500)]
    timeout_ms: u64,

    /// Resend a command after a timeout or a corrupted confirmation.
    #[arg(long)]
    retry: bool,

    /// Log verbosity on stderr.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Use a mock transport instead of a real serial port.
    /// The mock answers every command with a success confirmation, which
    /// is enough to check CLI parsing and builder wiring without hardware.
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Family {
    /// Sub-GHz radio: binary frames with a 1-byte length field.
    Radio,
    /// BLE module or second radio: binary frames with a 2-byte length field.
    Ble,
    /// WiFi or cellular module: AT command lines.
    At,
}

impl Family {
    fn profile(self) -> Option<FrameProfile> {
        match self {
            Family::Radio => Some(FrameProfile::short_length()),
            Family::Ble => Some(FrameProfile::extended_length()),
            Family::At => None,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Parse a hex string like "0x04" or "04" into a u8.
fn parse_hex_u8(s: &str) -> std::result::Result<u8, String> {
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u8::from_str_radix(s, 16).map_err(|e| format!("invalid hex byte: {e}"))
}

/// Request payload given on the command line as hex.
#[derive(Clone, Debug, PartialEq, Eq)]
struct HexPayload(Vec<u8>);

/// Parse a hex payload like "01 02 0A", "01:02:0a" or "01020A".
fn parse_hex_bytes(s: &str) -> std::result::Result<HexPayload, String> {
    let digits: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != ',')
        .collect();
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits in {s:?}"));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|e| format!("invalid hex payload {s:?}: {e}"))
        })
        .collect::<std::result::Result<Vec<u8>, String>>()
        .map(HexPayload)
}

#[derive(Subcommand)]
enum Command {
    /// Reset the module and wait for the reset confirmation. Binary only.
    Reset,

    /// Query the module state and print the returned status. Binary only.
    State,

    /// Send one request frame and print the confirmation status. Binary only.
    Send {
        /// Command identity, hex (e.g. 0x04). Category bits must be clear.
        #[arg(value_parser = parse_hex_u8)]
        identity: u8,

        /// Payload bytes, hex (e.g. "01 02 03").
        #[arg(value_parser = parse_hex_bytes, default_value = "")]
        payload: HexPayload,
    },

    /// Send one AT command and print its final result code. AT only.
    At {
        /// Command keyword after "AT" (e.g. +CEREG). Empty sends a bare "AT".
        keyword: String,

        /// Arguments; integers are sent bare, everything else quoted.
        args: Vec<String>,

        /// Send the query form `AT<keyword>?` instead.
        #[arg(long, conflicts_with = "args")]
        query: bool,
    },

    /// Print unsolicited events until the duration elapses or Ctrl-C.
    Monitor {
        /// How long to listen, in seconds (0 = until Ctrl-C).
        #[arg(long, default_value_t = 0)]
        duration: u64,
    },

    /// Run a health check, then print the receive counters.
    Stats,
}

// ---------------------------------------------------------------------------
// Link construction
// ---------------------------------------------------------------------------

/// A built module together with the receiving end of its event sink.
enum Link {
    Binary {
        module: BinaryModule,
        events: mpsc::UnboundedReceiver<Indication>,
    },
    At {
        module: AtModule,
        events: mpsc::UnboundedReceiver<AtEvent>,
    },
}

impl Link {
    fn stats(&self) -> StatsSnapshot {
        match self {
            Link::Binary { module, .. } => module.stats(),
            Link::At { module, .. } => module.stats(),
        }
    }

    async fn close(self) {
        let result = match self {
            Link::Binary { module, .. } => module.close().await,
            Link::At { module, .. } => module.close().await,
        };
        if let Err(e) = result {
            tracing::warn!("closing link: {e}");
        }
    }
}

fn validate_options(cli: &Cli) -> Result<()> {
    if !cli.mock && cli.port.is_none() {
        bail!("--port (or WIRELINK_PORT) is required unless --mock is used");
    }

    let binary_only = matches!(
        cli.command,
        Command::Reset | Command::State | Command::Send { .. }
    );
    match (cli.family, &cli.command) {
        (Family::At, _) if binary_only => {
            bail!("this command needs a binary module; use --family radio or --family ble")
        }
        (Family::Radio | Family::Ble, Command::At { .. }) => {
            bail!("the `at` command needs --family at")
        }
        _ => Ok(()),
    }
}

/// Convert CLI words into AT arguments: integers bare, the rest quoted.
fn at_args(words: &[String]) -> Vec<AtArg> {
    words
        .iter()
        .map(|w| match w.parse::<i64>() {
            Ok(n) => AtArg::Int(n),
            Err(_) => AtArg::Str(w.clone()),
        })
        .collect()
}

fn at_command(args: &[String], query: bool) -> AtCommand {
    if query {
        AtCommand::Query
    } else if args.is_empty() {
        AtCommand::Execute
    } else {
        AtCommand::Set(at_args(args))
    }
}

/// Script a mock transport that confirms whatever the chosen command sends.
fn mock_transport(cli: &Cli) -> Result<MockTransport> {
    let mut mock = MockTransport::new();
    let injector = mock.injector();

    match cli.family.profile() {
        Some(profile) => {
            let mut confirm = |identity: u8, payload: &[u8]| -> Result<()> {
                let request = encode_request(&profile, identity, payload)?;
                let confirmation = encode_frame(&profile, confirmation_of(identity), &[0x00])?;
                mock.expect(&request, &confirmation);
                Ok(())
            };
            match &cli.command {
                Command::Reset | Command::Stats => confirm(commands::RESET, &[])?,
                Command::State => confirm(commands::GET_STATE, &[])?,
                Command::Send { identity, payload } => confirm(*identity, &payload.0)?,
                Command::Monitor { .. } => {
                    let indication =
                        encode_frame(&profile, commands::DATA_IND, &[0xC3, 0x01, 0x02, 0x03])?;
                    injector.push(&indication);
                }
                Command::At { .. } => {}
            }
        }
        None => {
            let ok = b"\r\nOK\r\n";
            match &cli.command {
                Command::At {
                    keyword,
                    args,
                    query,
                } => {
                    let line = encode_command(keyword, &at_command(args, *query), CRLF, 1024)?;
                    mock.expect(&line, ok);
                }
                Command::Stats => mock.expect(b"AT\r\n", ok),
                Command::Monitor { .. } => {
                    injector.push(b"\r\n+CEREG: 1,\"1234\",\"01020304\",7\r\n+CSQ: 23,99\r\n");
                }
                Command::Reset | Command::State | Command::Send { .. } => {}
            }
        }
    }

    Ok(mock)
}

async fn create_link(cli: &Cli) -> Result<Link> {
    let timeout = Duration::from_millis(cli.timeout_ms);
    let mock = if cli.mock {
        Some(mock_transport(cli)?)
    } else {
        None
    };

    match cli.family.profile() {
        Some(profile) => {
            let (tx, events) = mpsc::unbounded_channel();
            let mut builder = BinaryModuleBuilder::new(profile)
                .command_timeout(timeout)
                .auto_retry(cli.retry)
                .event_sink(tx);
            if let Some(baud) = cli.baud {
                builder = builder.baud_rate(baud);
            }
            let module = match (mock, cli.port.as_deref()) {
                (Some(mock), _) => builder.build_with_transport(Box::new(mock)).await,
                (None, Some(port)) => builder.serial_port(port).build().await,
                (None, None) => bail!("no port configured"),
            }
            .context("failed to start binary module")?;
            Ok(Link::Binary { module, events })
        }
        None => {
            let (tx, events) = mpsc::unbounded_channel();
            let mut builder = AtModuleBuilder::new()
                .command_timeout(timeout)
                .auto_retry(cli.retry)
                .event_sink(tx);
            if let Some(baud) = cli.baud {
                builder = builder.baud_rate(baud);
            }
            let module = match (mock, cli.port.as_deref()) {
                (Some(mock), _) => builder.build_with_transport(Box::new(mock)).await,
                (None, Some(port)) => builder.serial_port(port).build().await,
                (None, None) => bail!("no port configured"),
            }
            .context("failed to start AT module")?;
            Ok(Link::At { module, events })
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn cmd_reset(module: &BinaryModule) -> Result<()> {
    let start = Instant::now();
    module.reset().await.context("reset failed")?;
    println!("Reset confirmed in {:?}", start.elapsed());
    Ok(())
}

async fn cmd_state(module: &BinaryModule) -> Result<()> {
    let status = module.get_state().await.context("get-state failed")?;
    println!("State: {status}");
    Ok(())
}

async fn cmd_send(module: &BinaryModule, identity: u8, payload: &[u8]) -> Result<()> {
    let status = module
        .request_status(identity, payload)
        .await
        .with_context(|| format!("request 0x{identity:02X} failed"))?;
    let verdict = if status.is_success() { "ok" } else { "error" };
    println!("Confirmation 0x{:02X}: status {status} ({verdict})", confirmation_of(identity));
    Ok(())
}

async fn cmd_at(module: &AtModule, keyword: &str, args: &[String], query: bool) -> Result<()> {
    let status = module
        .command_status(keyword, at_command(args, query))
        .await
        .with_context(|| format!("AT{keyword} failed"))?;
    match status {
        AtStatus::Ok => println!("OK"),
        AtStatus::Error => println!("ERROR"),
        AtStatus::CmeError(code) => println!("+CME ERROR: {code}"),
        AtStatus::CmsError(code) => println!("+CMS ERROR: {code}"),
    }
    Ok(())
}

async fn next_event<E>(events: &mut mpsc::UnboundedReceiver<E>) -> Option<E> {
    events.recv().await
}

async fn cmd_monitor(link: &mut Link, duration_secs: u64) -> Result<()> {
    println!("Monitoring module events (Ctrl-C to stop)...");

    let deadline = (duration_secs > 0).then(|| Instant::now() + Duration::from_secs(duration_secs));
    let sleep = async {
        match deadline {
            Some(dl) => tokio::time::sleep_until(dl).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(sleep);

    loop {
        let line = match link {
            Link::Binary { events, .. } => tokio::select! {
                event = next_event(events) => event.map(|ind| {
                    format!(
                        "[indication] 0x{:02X} (id 0x{:02X}) {:02X?}",
                        ind.command,
                        ind.identity(),
                        &ind.payload[..]
                    )
                }),
                _ = &mut sleep => {
                    println!("Monitor duration elapsed.");
                    break;
                }
                _ = tokio::signal::ctrl_c() => break,
            },
            Link::At { events, .. } => tokio::select! {
                event = next_event(events) => event.map(|e| format!("[event] {e:?}")),
                _ = &mut sleep => {
                    println!("Monitor duration elapsed.");
                    break;
                }
                _ = tokio::signal::ctrl_c() => break,
            },
        };

        match line {
            Some(line) => println!("{line}"),
            None => {
                println!("Event channel closed.");
                break;
            }
        }
    }

    print_stats(&link.stats());
    Ok(())
}

async fn cmd_stats(link: &Link) -> Result<()> {
    let check = match link {
        Link::Binary { module, .. } => module.reset().await,
        Link::At { module, .. } => module.ping().await,
    };
    match check {
        Ok(()) => println!("Health check: ok"),
        Err(e) => println!("Health check: {e}"),
    }
    print_stats(&link.stats());
    Ok(())
}

fn print_stats(stats: &StatsSnapshot) {
    println!("Receive counters:");
    println!("  Messages:       {}", stats.messages);
    println!("  Corrupt:        {}", stats.corrupt);
    println!("  Unrecognized:   {}", stats.unrecognized);
    println!("  Confirmations:  {}", stats.confirmations);
    println!("  Overflows:      {}", stats.overflows);
    println!("  Events:         {}", stats.events);
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_logging(level: LogLevel) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level.as_filter())
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    validate_options(&cli)?;

    let mut link = create_link(&cli).await?;

    let result = run(&cli.command, &mut link).await;

    link.close().await;
    result
}

async fn run(command: &Command, link: &mut Link) -> Result<()> {
    match (command, link) {
        (Command::Reset, Link::Binary { module, .. }) => cmd_reset(module).await,
        (Command::State, Link::Binary { module, .. }) => cmd_state(module).await,
        (Command::Send { identity, payload }, Link::Binary { module, .. }) => {
            cmd_send(module, *identity, &payload.0).await
        }
        (
            Command::At {
                keyword,
                args,
                query,
            },
            Link::At { module, .. },
        ) => cmd_at(module, keyword, args, *query).await,
        (Command::Monitor { duration }, link) => cmd_monitor(link, *duration).await,
        (Command::Stats, link) => cmd_stats(link).await,
        (Command::At { .. }, Link::Binary { .. }) => {
            bail!("the `at` command needs an AT link")
        }
        (_, Link::At { .. }) => bail!("this command needs a binary link"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_byte_parsing() {
        assert_eq!(parse_hex_u8("0x04"), Ok(0x04));
        assert_eq!(parse_hex_u8("3F"), Ok(0x3F));
        assert!(parse_hex_u8("0x100").is_err());
    }

    #[test]
    fn hex_payload_parsing() {
        assert_eq!(
            parse_hex_bytes("01 02 0a"),
            Ok(HexPayload(vec![0x01, 0x02, 0x0A]))
        );
        assert_eq!(parse_hex_bytes("01:02"), Ok(HexPayload(vec![0x01, 0x02])));
        assert_eq!(parse_hex_bytes(""), Ok(HexPayload(vec![])));
        assert!(parse_hex_bytes("123").is_err());
        assert!(parse_hex_bytes("zz").is_err());
    }

    #[test]
    fn at_words_become_typed_args() {
        let words = vec!["1".to_string(), "IP".to_string(), "-5".to_string()];
        assert_eq!(
            at_args(&words),
            vec![AtArg::Int(1), AtArg::Str("IP".into()), AtArg::Int(-5)]
        );
        assert_eq!(at_command(&[], true), AtCommand::Query);
        assert_eq!(at_command(&[], false), AtCommand::Execute);
    }

    #[test]
    fn family_command_mismatch_is_rejected() {
        let cli = Cli::parse_from(["wirelink-cli", "--family", "at", "--mock", "reset"]);
        assert!(validate_options(&cli).is_err());
        let cli = Cli::parse_from(["wirelink-cli", "--mock", "at", "+CSQ"]);
        assert!(validate_options(&cli).is_err());
        let cli = Cli::parse_from(["wirelink-cli", "--family", "ble", "--mock", "state"]);
        assert!(validate_options(&cli).is_ok());
    }

    #[tokio::test]
    async fn command_on_wrong_link_is_an_error() {
        let cli = Cli::parse_from(["wirelink-cli", "--family", "at", "--mock", "stats"]);
        let mut link = create_link(&cli).await.unwrap();
        assert!(run(&Command::Reset, &mut link).await.is_err());
        link.close().await;

        let cli = Cli::parse_from(["wirelink-cli", "--family", "ble", "--mock", "stats"]);
        let mut link = create_link(&cli).await.unwrap();
        let at = Command::At {
            keyword: "+CSQ".into(),
            args: vec![],
            query: false,
        };
        assert!(run(&at, &mut link).await.is_err());
        link.close().await;
    }

    #[tokio::test]
    async fn mock_send_round_trip() {
        let cli = Cli::parse_from(["wirelink-cli", "--family", "ble", "--mock", "send", "0x04", "AA BB"]);
        let link = create_link(&cli).await.unwrap();
        match &link {
            Link::Binary { module, .. } => cmd_send(module, 0x04, &[0xAA, 0xBB]).await.unwrap(),
            Link::At { .. } => panic!("expected a binary link"),
        }
        assert_eq!(link.stats().confirmations, 1);
        link.close().await;
    }

    #[tokio::test]
    async fn mock_at_command_round_trip() {
        let cli = Cli::parse_from(["wirelink-cli", "--family", "at", "--mock", "at", "+CEREG", "2"]);
        let link = create_link(&cli).await.unwrap();
        match &link {
            Link::At { module, .. } => cmd_at(module, "+CEREG", &["2".into()], false).await.unwrap(),
            Link::Binary { .. } => panic!("expected an AT link"),
        }
        link.close().await;
    }
}
