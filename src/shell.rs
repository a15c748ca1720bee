/// Console command surface.
///
/// Commands arrive as text lines on the serial console:
///
/// ```text
/// scan enable
/// scan start passive|active
/// scan stop
/// scan rssi read
/// scan rssi average
/// scan rssi print start|stop
/// scan change_name <name>
/// scan status
/// scan help
/// ```
///
/// `bt_scan` is accepted as an alias for `scan`. Every command completes;
/// failures are reported as text, never as a distinct exit status.
use core::fmt::{self, Write};

use crate::board;
use crate::controller::{ScanController, ScanError};
use crate::monitor::OutputSink;
use crate::protocol::{serialize_message, DeviceMessage, NameString, MAX_MSG_LEN, VERSION};
use crate::radio::{ScanMode, ScanRadio};
use crate::rssi::StatsError;

/// Longest accepted console line
pub const MAX_LINE_LEN: usize = 128;

/// A parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Enable,
    Start(ScanMode),
    Stop,
    RssiRead,
    RssiAverage,
    RssiPrint(bool),
    ChangeName(NameString),
    Status,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Blank line
    Empty,
    /// First word is not `scan`/`bt_scan`
    UnknownRoot,
    /// Subcommand path not recognised; carries the usage for that level
    Unknown(&'static str),
    /// Required argument missing; carries the usage
    MissingArgument(&'static str),
    /// Extra words after a complete command
    TooManyArguments(&'static str),
    /// Name longer than an advertised local name can be
    NameTooLong,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => Ok(()),
            ParseError::UnknownRoot => write!(f, "unknown command, try: {}", USAGE_ROOT),
            ParseError::Unknown(usage) => write!(f, "unknown subcommand, usage: {}", usage),
            ParseError::MissingArgument(usage) => write!(f, "missing argument, usage: {}", usage),
            ParseError::TooManyArguments(usage) => {
                write!(f, "too many arguments, usage: {}", usage)
            }
            ParseError::NameTooLong => f.write_str("name too long (max 32 bytes)"),
        }
    }
}

const USAGE_ROOT: &str = "scan <enable|start|stop|rssi|change_name|status|help>";
const USAGE_START: &str = "scan start <passive|active>";
const USAGE_RSSI: &str = "scan rssi <read|average|print>";
const USAGE_PRINT: &str = "scan rssi print <start|stop>";
const USAGE_NAME: &str = "scan change_name <name>";

const HELP: &str = "\
scan enable                 Set default configuration and enable scanning
scan start passive|active   Start scanning
scan stop                   Stop scanning
scan rssi read              Display the latest rssi value
scan rssi average           Display the average rssi value
scan rssi print start|stop  Print rssi values in real time
scan change_name <name>     Change the name of the target device
scan status                 Print engine status as JSON";

/// Parse one console line.
pub fn parse_command(line: &str) -> Result<ShellCommand, ParseError> {
    let mut words = line.split_whitespace();

    match words.next() {
        None => return Err(ParseError::Empty),
        Some("scan") | Some("bt_scan") => {}
        Some(_) => return Err(ParseError::UnknownRoot),
    }

    let cmd = match words.next() {
        None => return Err(ParseError::MissingArgument(USAGE_ROOT)),
        Some("enable") => ShellCommand::Enable,
        Some("stop") => ShellCommand::Stop,
        Some("status") => ShellCommand::Status,
        Some("help") => ShellCommand::Help,
        Some("start") => match words.next() {
            Some("passive") => ShellCommand::Start(ScanMode::Passive),
            Some("active") => ShellCommand::Start(ScanMode::Active),
            Some(_) => return Err(ParseError::Unknown(USAGE_START)),
            None => return Err(ParseError::MissingArgument(USAGE_START)),
        },
        Some("rssi") => match words.next() {
            Some("read") => ShellCommand::RssiRead,
            Some("average") => ShellCommand::RssiAverage,
            Some("print") => match words.next() {
                Some("start") => ShellCommand::RssiPrint(true),
                Some("stop") => ShellCommand::RssiPrint(false),
                Some(_) => return Err(ParseError::Unknown(USAGE_PRINT)),
                None => return Err(ParseError::MissingArgument(USAGE_PRINT)),
            },
            Some(_) => return Err(ParseError::Unknown(USAGE_RSSI)),
            None => return Err(ParseError::MissingArgument(USAGE_RSSI)),
        },
        Some("change_name") => {
            let name = words
                .next()
                .ok_or(ParseError::MissingArgument(USAGE_NAME))?;
            let name = NameString::try_from(name).map_err(|_| ParseError::NameTooLong)?;
            ShellCommand::ChangeName(name)
        }
        Some(_) => return Err(ParseError::Unknown(USAGE_ROOT)),
    };

    if words.next().is_some() {
        return Err(ParseError::TooManyArguments(usage_of(&cmd)));
    }
    Ok(cmd)
}

fn usage_of(cmd: &ShellCommand) -> &'static str {
    match cmd {
        ShellCommand::Start(_) => USAGE_START,
        ShellCommand::RssiRead | ShellCommand::RssiAverage => USAGE_RSSI,
        ShellCommand::RssiPrint(_) => USAGE_PRINT,
        ShellCommand::ChangeName(_) => USAGE_NAME,
        _ => USAGE_ROOT,
    }
}

/// Run a command against the engine and write the report to `out`.
///
/// Only a failing `out` produces an error.
pub fn execute<R, S, W>(
    ctl: &mut ScanController<'_, R, S>,
    cmd: &ShellCommand,
    out: &mut W,
) -> fmt::Result
where
    R: ScanRadio,
    S: OutputSink,
    W: Write,
{
    match cmd {
        ShellCommand::Enable => match ctl.initialize() {
            Ok(()) => {
                writeln!(out, "Bluetooth initialized")?;
                if !ctl.filter().is_installed() {
                    writeln!(out, "Scanning filters cannot be set")?;
                }
                writeln!(out, "Scanning module enabled")
            }
            Err(e) => writeln!(out, "Could not enable Bluetooth ({})", e),
        },
        ShellCommand::Start(mode) => match ctl.start_scan(*mode) {
            Ok(()) => match mode {
                ScanMode::Passive => writeln!(out, "Passive scanning on"),
                ScanMode::Active => writeln!(out, "Active scanning on"),
            },
            Err(ScanError::AlreadyScanning) => writeln!(out, "Scanning already enabled"),
            Err(ScanError::RadioDisabled) => {
                writeln!(out, "Bluetooth not enabled, run 'scan enable' first")
            }
            Err(ScanError::StartFailed(code)) => {
                writeln!(out, "Scanning failed to start, err {}", code)
            }
            Err(e) => writeln!(out, "Scanning failed to start ({})", e),
        },
        ShellCommand::Stop => match ctl.stop_scan() {
            Ok(()) => writeln!(out, "Scanning has stopped"),
            Err(ScanError::NotScanning) => writeln!(out, "Scanning is not on"),
            Err(ScanError::StopFailed(code)) => {
                writeln!(out, "Scanning failed to stop, err {}", code)
            }
            Err(e) => writeln!(out, "Scanning failed to stop ({})", e),
        },
        ShellCommand::RssiRead => match ctl.read_latest() {
            Some(rssi) => writeln!(out, "Latest rssi: {}", rssi),
            None => writeln!(out, "Latest rssi: no sample yet"),
        },
        ShellCommand::RssiAverage => match ctl.read_average() {
            Ok(avg) => writeln!(out, "Average rssi value {}", avg),
            Err(StatsError::NoSamples) => writeln!(out, "Average rssi value: no samples yet"),
        },
        ShellCommand::RssiPrint(enabled) => {
            ctl.set_live_print(*enabled);
            if *enabled {
                writeln!(out, "Active rssi print on")
            } else {
                writeln!(out, "Active rssi print off")
            }
        }
        ShellCommand::ChangeName(name) => match ctl.set_target(name.as_str()) {
            Ok(()) => writeln!(out, "The target device name was set to: {}", name),
            Err(e) => writeln!(out, "Scanning filters cannot be set ({})", e),
        },
        ShellCommand::Status => write_status(ctl, out),
        ShellCommand::Help => writeln!(out, "{}", HELP),
    }
}

fn write_status<R, S, W>(ctl: &ScanController<'_, R, S>, out: &mut W) -> fmt::Result
where
    R: ScanRadio,
    S: OutputSink,
    W: Write,
{
    let snap = ctl.monitor().snapshot();
    let msg = DeviceMessage::Status {
        state: snap.state.as_str(),
        target: ctl.filter().target().as_str(),
        installed: ctl.filter().is_installed(),
        samples: snap.samples.min(u8::MAX as usize) as u8,
        latest: snap.latest,
        average: snap.average,
        live_print: snap.live_print,
        matches: snap.matches,
        board: board::BOARD_NAME,
        version: VERSION,
    };

    let mut buf = [0u8; MAX_MSG_LEN];
    let len = serialize_message(&msg, &mut buf).ok_or(fmt::Error)?;
    let json = core::str::from_utf8(&buf[..len]).map_err(|_| fmt::Error)?;
    out.write_str(json)
}

/// Console line accumulator.
/// Accumulates bytes until a newline is found, then yields the line.
pub struct LineReader {
    buf: [u8; MAX_LINE_LEN],
    pos: usize,
    /// Set after an overflow; the rest of that line is discarded
    discarding: bool,
}

impl LineReader {
    pub const fn new() -> Self {
        Self {
            buf: [0; MAX_LINE_LEN],
            pos: 0,
            discarding: false,
        }
    }

    /// Feed a byte into the reader. Returns a complete, non-empty line
    /// (without terminator) when one is detected.
    pub fn feed(&mut self, byte: u8) -> Option<&str> {
        match byte {
            b'\n' | b'\r' => {
                let complete = !self.discarding && self.pos > 0;
                let len = self.pos;
                self.pos = 0;
                self.discarding = false;
                if complete {
                    core::str::from_utf8(&self.buf[..len]).ok()
                } else {
                    None
                }
            }
            // Backspace / DEL from an interactive terminal
            0x08 | 0x7F => {
                self.pos = self.pos.saturating_sub(1);
                None
            }
            _ if self.discarding => None,
            _ if self.pos < self.buf.len() => {
                self.buf[self.pos] = byte;
                self.pos += 1;
                None
            }
            _ => {
                log::warn!("Console line longer than {} bytes dropped", MAX_LINE_LEN);
                self.pos = 0;
                self.discarding = true;
                None
            }
        }
    }
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new()
    }
}
