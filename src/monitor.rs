/// Shared scan state and event routing.
///
/// `ScanMonitor` is the half of the engine both contexts touch: the control
/// context reads statistics and moves the lifecycle state, the radio context
/// records matches. Every field lives behind one critical-section mutex so a
/// push and a read never see a torn window. Output to the sink happens after
/// the critical section is released.
use core::cell::RefCell;
use core::fmt;

use critical_section::Mutex;

use crate::defaults::RSSI_WINDOW;
use crate::events::ScanEvent;
use crate::filter::format_mac;
use crate::protocol::MacString;
use crate::radio::{DeviceInfo, FilterMatch, ScanCallbacks, ScanMode};
use crate::rssi::{RssiBuffer, StatsError};

/// Scan lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Radio not powered up yet
    Disabled,
    Idle,
    ScanningPassive,
    ScanningActive,
}

impl ScanState {
    pub(crate) fn scanning(mode: ScanMode) -> Self {
        match mode {
            ScanMode::Passive => ScanState::ScanningPassive,
            ScanMode::Active => ScanState::ScanningActive,
        }
    }

    pub fn is_scanning(&self) -> bool {
        matches!(self, ScanState::ScanningPassive | ScanState::ScanningActive)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanState::Disabled => "disabled",
            ScanState::Idle => "idle",
            ScanState::ScanningPassive => "scanning_passive",
            ScanState::ScanningActive => "scanning_active",
        }
    }
}

/// Something the monitor reports on its own, outside any command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Live RSSI echo
    Sample(i16),
    /// Connection to a matched peer failed
    ConnectFailed([u8; 6]),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Sample(rssi) => write!(f, "rssi: {}", rssi),
            Notice::ConnectFailed(addr) => {
                let mut mac = MacString::new();
                format_mac(addr, &mut mac);
                write!(f, "Connection to peer failed! ({})", mac)
            }
        }
    }
}

/// Where notices go (console, log, test recorder).
///
/// Called from the radio context, so implementations must not block.
pub trait OutputSink {
    fn emit(&self, notice: &Notice);
}

/// Sink that drops everything.
pub struct NullSink;

impl OutputSink for NullSink {
    fn emit(&self, _notice: &Notice) {}
}

/// Point-in-time copy of the shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSnapshot {
    pub state: ScanState,
    pub latest: Option<i16>,
    pub average: Option<i16>,
    pub samples: usize,
    pub live_print: bool,
    pub matches: u32,
}

struct MonitorState {
    state: ScanState,
    latest: Option<i16>,
    live_print: bool,
    samples: RssiBuffer<RSSI_WINDOW>,
    matches: u32,
}

pub struct ScanMonitor<S> {
    inner: Mutex<RefCell<MonitorState>>,
    sink: S,
}

impl<S: OutputSink> ScanMonitor<S> {
    pub const fn new(sink: S) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(MonitorState {
                state: ScanState::Disabled,
                latest: None,
                live_print: false,
                samples: RssiBuffer::new(),
                matches: 0,
            })),
            sink,
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut MonitorState) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow(cs).borrow_mut()))
    }

    pub fn state(&self) -> ScanState {
        self.with(|s| s.state)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub(crate) fn set_state(&self, state: ScanState) {
        let previous = self.with(|s| core::mem::replace(&mut s.state, state));
        if previous != state {
            log::info!("Scan state {} -> {}", previous.as_str(), state.as_str());
        }
    }

    pub fn set_live_print(&self, enabled: bool) {
        self.with(|s| s.live_print = enabled);
    }

    pub fn live_print(&self) -> bool {
        self.with(|s| s.live_print)
    }

    /// Most recent sample, if any match has been seen.
    pub fn read_latest(&self) -> Option<i16> {
        self.with(|s| s.latest)
    }

    pub fn read_average(&self) -> Result<i16, StatsError> {
        self.with(|s| s.samples.average())
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        self.with(|s| MonitorSnapshot {
            state: s.state,
            latest: s.latest,
            average: s.samples.average().ok(),
            samples: s.samples.len(),
            live_print: s.live_print,
            matches: s.matches,
        })
    }

    /// Record a sample. Lifecycle state is deliberately not consulted:
    /// matches still in flight after a stop are kept.
    pub fn record(&self, rssi: i16) {
        let echo = self.with(|s| {
            s.latest = Some(rssi);
            s.samples.push(rssi);
            s.matches = s.matches.wrapping_add(1);
            s.live_print
        });
        log::trace!("Match rssi {}", rssi);
        if echo {
            self.sink.emit(&Notice::Sample(rssi));
        }
    }

    /// Route a queued event to the matching callback.
    pub fn dispatch(&self, event: &ScanEvent) {
        match event {
            ScanEvent::Match {
                device,
                filter_match,
                connectable,
            } => self.on_match(device, filter_match, *connectable),
            ScanEvent::ConnectError { device } => self.on_error(device),
        }
    }
}

impl<S: OutputSink> ScanCallbacks for ScanMonitor<S> {
    fn on_match(&self, device: &DeviceInfo, _filter_match: &FilterMatch, _connectable: bool) {
        self.record(i16::from(device.rssi));
    }

    fn on_error(&self, device: &DeviceInfo) {
        log::warn!("Connection to matched device failed");
        self.sink.emit(&Notice::ConnectFailed(device.addr));
    }
}
