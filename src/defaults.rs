/// Compiled-in defaults for the scan engine.
///
/// Everything the firmware needs before the operator issues a command lives
/// here: the sentinel filter name, the RSSI window length and the radio scan
/// parameters handed to the stack at enable time.
use crate::radio::ScanMode;

/// Name installed as the target filter when scanning is enabled.
pub const DEFAULT_TARGET_NAME: &str = "Default";

/// Number of samples kept for the rolling RSSI average.
pub const RSSI_WINDOW: usize = 20;

/// Depth of the queue between the radio callback context and the engine.
pub const EVENT_QUEUE_DEPTH: usize = 16;

/// Scan interval/window unit (microseconds per tick, HCI units).
const SCAN_TICK_US: u32 = 625;

/// Scan parameters passed to the radio stack on enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanParams {
    /// Scan type used when the stack needs one at init time.
    /// `start_scan` still picks the mode per request.
    pub mode: ScanMode,
    /// Report each advertiser once per scan window
    pub filter_duplicates: bool,
    /// Scan interval in 0.625 ms ticks
    pub interval: u16,
    /// Scan window in 0.625 ms ticks (≤ interval)
    pub window: u16,
    /// Connect to a device as soon as it matches the filter.
    /// Always off: the engine only samples RSSI.
    pub connect_if_match: bool,
}

impl ScanParams {
    pub const DEFAULT: Self = Self {
        mode: ScanMode::Passive,
        filter_duplicates: true,
        interval: 0x0010,
        window: 0x0010,
        connect_if_match: false,
    };

    /// Scan interval in whole milliseconds (rounded down, at least 1).
    pub fn interval_ms(&self) -> u16 {
        ticks_to_ms(self.interval)
    }

    /// Scan window in whole milliseconds (rounded down, at least 1).
    pub fn window_ms(&self) -> u16 {
        ticks_to_ms(self.window)
    }
}

impl Default for ScanParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn ticks_to_ms(ticks: u16) -> u16 {
    let ms = u32::from(ticks) * SCAN_TICK_US / 1000;
    ms.clamp(1, u32::from(u16::MAX)) as u16
}
