/// Contracts between the scan engine and the platform radio stack.
///
/// The stack is driven through [`ScanRadio`] from the control context and
/// reports matches back through [`ScanCallbacks`] from its own context,
/// at whatever rate the air delivers advertisements.
use core::fmt;

use crate::defaults::ScanParams;
use crate::protocol::NameString;

/// Scan type requested from the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Listen only
    Passive,
    /// Send scan requests to collect scan-response data as well
    Active,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Passive => "passive",
            ScanMode::Active => "active",
        }
    }
}

/// Filter class understood by the stack. The engine only uses one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Exact match on the advertised local name
    Name,
}

/// Failure reported by the radio stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    /// The request is already in effect (scan running / not running)
    Already,
    /// Any other stack-specific error code
    Code(i32),
}

impl StackError {
    /// Numeric code for reporting, `-EALREADY` style for [`StackError::Already`].
    pub fn code(&self) -> i32 {
        match self {
            StackError::Already => -EALREADY,
            StackError::Code(code) => *code,
        }
    }
}

impl fmt::Display for StackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackError::Already => f.write_str("already"),
            StackError::Code(code) => write!(f, "err {}", code),
        }
    }
}

/// `EALREADY` as numbered by newlib/Zephyr.
pub const EALREADY: i32 = 120;

/// Advertiser information handed to the callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub addr: [u8; 6],
    /// Local name as advertised (may be empty)
    pub name: NameString,
    /// Received signal strength (dBm)
    pub rssi: i8,
}

/// Which filter matched a reported device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterMatch {
    pub kind: FilterKind,
}

/// Scan control API of the platform radio stack.
///
/// All calls come from the control context. Implementations may block
/// briefly on the underlying stack but never on engine state.
pub trait ScanRadio {
    /// Power up the radio.
    fn enable(&mut self) -> Result<(), StackError>;

    /// Apply scan parameters. Called once, right after a successful enable.
    fn init_scan(&mut self, params: &ScanParams);

    /// Start delivering match/error events to the engine.
    /// The controller calls this at most once.
    fn register_callbacks(&mut self);

    /// Install a filter value of the given kind.
    fn add_filter(&mut self, kind: FilterKind, value: &str) -> Result<(), StackError>;

    /// Turn on matching for a filter kind. `match_all` is unused with a
    /// single filter slot.
    fn enable_filter(&mut self, kind: FilterKind, match_all: bool) -> Result<(), StackError>;

    /// Drop every installed filter.
    fn remove_all_filters(&mut self) -> Result<(), StackError>;

    fn start(&mut self, mode: ScanMode) -> Result<(), StackError>;

    fn stop(&mut self) -> Result<(), StackError>;
}

/// Event delivery from the radio stack.
///
/// Invoked from the stack's own context, concurrently with control
/// operations. Implementations must return promptly.
pub trait ScanCallbacks {
    fn on_match(&self, device: &DeviceInfo, filter_match: &FilterMatch, connectable: bool);

    /// Connection to a matched device failed.
    fn on_error(&self, device: &DeviceInfo);
}

impl<T: ScanCallbacks + ?Sized> ScanCallbacks for &T {
    fn on_match(&self, device: &DeviceInfo, filter_match: &FilterMatch, connectable: bool) {
        (**self).on_match(device, filter_match, connectable)
    }

    fn on_error(&self, device: &DeviceInfo) {
        (**self).on_error(device)
    }
}
