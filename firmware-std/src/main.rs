//! rssimon: ESP-IDF std firmware
//!
//! Thread-based host for the scan engine on FreeRTOS. NimBLE (via
//! esp32-nimble) provides the radio; advertisements are filtered in the
//! scan thread and handed to the engine through the event queue. The
//! serial console on the main thread runs shell commands.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rssimon::{board, shell};

use esp32_nimble::{BLEDevice, BLEScan};
use esp_idf_svc::hal::task::block_on;
use rssimon::adv::AdvReport;
use rssimon::controller::ScanController;
use rssimon::defaults::ScanParams;
use rssimon::events::EventQueue;
use rssimon::filter::NameFilter;
use rssimon::monitor::{Notice, OutputSink, ScanMonitor};
use rssimon::protocol::VERSION;
use rssimon::radio::{FilterKind, FilterMatch, ScanCallbacks, ScanMode, ScanRadio, StackError};
use rssimon::shell::{LineReader, ParseError};

/// Length of one NimBLE scan round. A stop request waits at most this long.
const SCAN_ROUND_MS: i32 = 1000;

/// Room for the longest shell report (status JSON plus text).
const REPORT_LEN: usize = 1024;

// ── Shared state ─────────────────────────────────────────────────────

/// Prints monitor notices on the console.
struct ConsoleSink;

impl OutputSink for ConsoleSink {
    fn emit(&self, notice: &Notice) {
        println!("{}", notice);
    }
}

static MONITOR: ScanMonitor<ConsoleSink> = ScanMonitor::new(ConsoleSink);
static EVENTS: EventQueue = EventQueue::new();

/// Name the scan thread matches against; `None` until a filter is enabled.
static TARGET: Mutex<Option<NameFilter>> = Mutex::new(None);

/// Set once the engine has registered for match delivery.
static DELIVER: AtomicBool = AtomicBool::new(false);

// ── NimBLE radio ─────────────────────────────────────────────────────

struct ScanWorker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// NimBLE-backed scan control. Name filtering happens in the scan
/// callback since the host API has no controller-side name filter.
struct NimbleRadio {
    enabled: bool,
    params: ScanParams,
    /// Added but not yet enabled
    pending: Option<NameFilter>,
    worker: Option<ScanWorker>,
}

impl NimbleRadio {
    fn new() -> Self {
        Self {
            enabled: false,
            params: ScanParams::DEFAULT,
            pending: None,
            worker: None,
        }
    }
}

impl ScanRadio for NimbleRadio {
    fn enable(&mut self) -> Result<(), StackError> {
        if self.enabled {
            return Err(StackError::Already);
        }
        // First take() brings up the NimBLE host
        let _ = BLEDevice::take();
        self.enabled = true;
        log::info!("NimBLE host up");
        Ok(())
    }

    fn init_scan(&mut self, params: &ScanParams) {
        self.params = *params;
    }

    fn register_callbacks(&mut self) {
        DELIVER.store(true, Ordering::Release);
    }

    fn add_filter(&mut self, kind: FilterKind, value: &str) -> Result<(), StackError> {
        match kind {
            FilterKind::Name => {
                let filter = NameFilter::new(value).map_err(|_| StackError::Code(-1))?;
                self.pending = Some(filter);
                Ok(())
            }
        }
    }

    fn enable_filter(&mut self, _kind: FilterKind, _match_all: bool) -> Result<(), StackError> {
        let filter = self.pending.take().ok_or(StackError::Already)?;
        let mut target = TARGET.lock().map_err(|_| StackError::Code(-1))?;
        *target = Some(filter);
        Ok(())
    }

    fn remove_all_filters(&mut self) -> Result<(), StackError> {
        self.pending = None;
        let mut target = TARGET.lock().map_err(|_| StackError::Code(-1))?;
        *target = None;
        Ok(())
    }

    fn start(&mut self, mode: ScanMode) -> Result<(), StackError> {
        if self.worker.is_some() {
            return Err(StackError::Already);
        }
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();
        let params = self.params;
        let handle = thread::Builder::new()
            .name("blescan".into())
            .stack_size(4096)
            .spawn(move || scan_thread(mode, params, thread_stop))
            .map_err(|e| {
                log::error!("BLE scan thread spawn failed: {}", e);
                StackError::Code(-1)
            })?;
        self.worker = Some(ScanWorker { stop, handle });
        Ok(())
    }

    fn stop(&mut self) -> Result<(), StackError> {
        let worker = self.worker.take().ok_or(StackError::Already)?;
        worker.stop.store(true, Ordering::Relaxed);
        if worker.handle.join().is_err() {
            log::error!("BLE scan thread panicked");
        }
        Ok(())
    }
}

// ── BLE scan thread ──────────────────────────────────────────────────

fn scan_thread(mode: ScanMode, params: ScanParams, stop: Arc<AtomicBool>) {
    log::info!("BLE scan thread started ({})", mode.as_str());

    let ble_device = BLEDevice::take();
    let mut scan = BLEScan::new();
    scan.active_scan(mode == ScanMode::Active)
        .filter_duplicates(params.filter_duplicates)
        .interval(params.interval_ms())
        .window(params.window_ms());

    while !stop.load(Ordering::Relaxed) {
        let round = block_on(scan.start(ble_device, SCAN_ROUND_MS, |device, data| {
            if stop.load(Ordering::Relaxed) {
                return Some(());
            }
            let addr = device.addr().as_be_bytes();
            handle_advertisement(&addr, device.rssi(), data.payload());
            None::<()> // Continue scanning
        }));
        if let Err(e) = round {
            log::warn!("BLE scan round failed: {:?}", e);
            thread::sleep(Duration::from_millis(100));
        }
    }

    log::info!("BLE scan thread stopped");
}

fn handle_advertisement(addr: &[u8; 6], rssi: i8, payload: &[u8]) {
    if !DELIVER.load(Ordering::Acquire) {
        return;
    }
    let report = AdvReport::parse(addr, rssi, payload);
    let matched = TARGET
        .lock()
        .map(|t| t.as_ref().is_some_and(|f| f.matches(&report.name)))
        .unwrap_or(false);
    if matched {
        let filter_match = FilterMatch {
            kind: FilterKind::Name,
        };
        EVENTS.on_match(&report.device_info(), &filter_match, false);
    }
}

// ── Event thread ─────────────────────────────────────────────────────

fn event_thread() {
    log::info!("Event thread started");
    loop {
        let event = block_on(EVENTS.receive());
        MONITOR.dispatch(&event);
    }
}

// ── Console ──────────────────────────────────────────────────────────

fn run_line(ctl: &mut ScanController<'_, NimbleRadio, ConsoleSink>, line: &str) {
    let cmd = match shell::parse_command(line) {
        Ok(cmd) => cmd,
        Err(ParseError::Empty) => return,
        Err(e) => {
            println!("{}", e);
            return;
        }
    };
    let mut report: heapless::String<REPORT_LEN> = heapless::String::new();
    if shell::execute(ctl, &cmd, &mut report).is_err() {
        log::warn!("Shell report truncated");
    }
    print!("{}", report);
}

fn console_loop(ctl: &mut ScanController<'_, NimbleRadio, ConsoleSink>) -> ! {
    let mut reader = LineReader::new();
    let mut stdin = std::io::stdin();
    let mut buf = [0u8; 64];
    loop {
        match stdin.read(&mut buf) {
            Ok(n) if n > 0 => {
                for &byte in &buf[..n] {
                    if let Some(line) = reader.feed(byte) {
                        run_line(ctl, line);
                    }
                }
            }
            // VFS console is non-blocking; poll
            _ => thread::sleep(Duration::from_millis(10)),
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Bind the ESP-IDF logger to the `log` facade
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!("rssimon v{} starting on {} (std)", VERSION, board::BOARD_NAME);

    // Hold power on (M5StickC Plus2)
    #[cfg(feature = "m5stickc")]
    let _power_hold = {
        use esp_idf_svc::hal::gpio::PinDriver;
        use esp_idf_svc::hal::peripherals::Peripherals;
        let peripherals = Peripherals::take()?;
        let mut p = PinDriver::output(peripherals.pins.gpio4)?;
        p.set_high()?;
        p
    };

    thread::Builder::new()
        .name("events".into())
        .stack_size(4096)
        .spawn(event_thread)?;
    log::info!("Event thread spawned");

    let mut ctl = ScanController::new(NimbleRadio::new(), &MONITOR);
    println!("Type 'scan help' for commands");

    console_loop(&mut ctl)
}
