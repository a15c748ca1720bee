/// Scan lifecycle control.
///
/// `ScanController` is the control-context half of the engine. It owns the
/// radio stack handle and the filter configuration and moves the lifecycle
/// state held by the shared [`ScanMonitor`]:
///
/// ```text
/// Disabled --initialize--> Idle --start_scan(mode)--> Scanning{Passive,Active}
///                           ^                                   |
///                           +------------- stop_scan -----------+
/// ```
///
/// Switching modes takes an explicit stop and start; `start_scan` while
/// scanning is rejected.
use core::fmt;

use crate::defaults::ScanParams;
use crate::filter::{FilterConfig, FilterError, NameFilter};
use crate::monitor::{OutputSink, ScanMonitor, ScanState};
use crate::radio::{FilterKind, ScanMode, ScanRadio, StackError};
use crate::rssi::StatsError;

/// Radio power-up failure. The engine stays `Disabled`; retry is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    EnableFailed(i32),
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RadioError::EnableFailed(code) => write!(f, "radio enable failed, err {}", code),
        }
    }
}

/// Scan start/stop failure. None of these are fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    AlreadyScanning,
    NotScanning,
    /// `start_scan` before the radio was enabled
    RadioDisabled,
    StartFailed(i32),
    StopFailed(i32),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::AlreadyScanning => f.write_str("scanning already enabled"),
            ScanError::NotScanning => f.write_str("scanning is not on"),
            ScanError::RadioDisabled => f.write_str("radio not enabled"),
            ScanError::StartFailed(code) => write!(f, "scanning failed to start, err {}", code),
            ScanError::StopFailed(code) => write!(f, "scanning failed to stop, err {}", code),
        }
    }
}

pub struct ScanController<'m, R, S> {
    radio: R,
    params: ScanParams,
    filter: FilterConfig,
    monitor: &'m ScanMonitor<S>,
    callbacks_registered: bool,
}

impl<'m, R: ScanRadio, S: OutputSink> ScanController<'m, R, S> {
    pub fn new(radio: R, monitor: &'m ScanMonitor<S>) -> Self {
        Self::with_params(radio, monitor, ScanParams::DEFAULT)
    }

    pub fn with_params(radio: R, monitor: &'m ScanMonitor<S>, params: ScanParams) -> Self {
        Self {
            radio,
            params,
            filter: FilterConfig::new(),
            monitor,
            callbacks_registered: false,
        }
    }

    /// Power up the radio, register callbacks and install the target filter.
    ///
    /// A no-op once the radio is up. A filter install failure does not fail
    /// the enable; check [`FilterConfig::is_installed`] afterwards.
    pub fn initialize(&mut self) -> Result<(), RadioError> {
        if self.monitor.state() != ScanState::Disabled {
            log::debug!("Radio already enabled");
            return Ok(());
        }

        self.radio.enable().map_err(|e| {
            log::warn!("Radio enable failed: {}", e);
            RadioError::EnableFailed(e.code())
        })?;
        log::info!("Radio enabled");

        self.radio.init_scan(&self.params);
        if !self.callbacks_registered {
            self.radio.register_callbacks();
            self.callbacks_registered = true;
        }
        self.monitor.set_state(ScanState::Idle);

        let target = self.filter.target().clone();
        if let Err(e) = self.install(target) {
            log::warn!("Default filter not installed: {}", e);
        }
        Ok(())
    }

    /// Replace the target name filter.
    ///
    /// Before the radio is enabled this only records the name for
    /// [`initialize`](Self::initialize) to install. Afterwards the stack's
    /// filters are cleared and the new one installed; if the stack rejects
    /// it, no filter is left installed.
    pub fn set_target(&mut self, name: &str) -> Result<(), FilterError> {
        let target = NameFilter::new(name)?;
        self.filter.set_target(target.clone());

        if self.monitor.state() == ScanState::Disabled {
            log::info!("Target '{}' recorded, installed on enable", target);
            return Ok(());
        }
        self.install(target)
    }

    fn install(&mut self, target: NameFilter) -> Result<(), FilterError> {
        if let Err(e) = self.radio.remove_all_filters() {
            log::warn!("Removing filters failed: {}", e);
        }
        // Nothing is installed from here until the new filter is enabled.
        self.filter.set_active(None);

        let installed = self
            .radio
            .add_filter(FilterKind::Name, target.as_str())
            .and_then(|()| self.radio.enable_filter(FilterKind::Name, false));

        match installed {
            Ok(()) => {
                log::info!("Target name filter set to '{}'", target);
                self.filter.set_active(Some(target));
                Ok(())
            }
            Err(e) => {
                log::warn!("Filter '{}' rejected: {}", target, e);
                Err(FilterError::InstallFailed(e.code()))
            }
        }
    }

    pub fn start_scan(&mut self, mode: ScanMode) -> Result<(), ScanError> {
        match self.monitor.state() {
            ScanState::Disabled => return Err(ScanError::RadioDisabled),
            ScanState::ScanningPassive | ScanState::ScanningActive => {
                return Err(ScanError::AlreadyScanning)
            }
            ScanState::Idle => {}
        }

        match self.radio.start(mode) {
            Ok(()) => {
                self.monitor.set_state(ScanState::scanning(mode));
                Ok(())
            }
            Err(StackError::Already) => Err(ScanError::AlreadyScanning),
            Err(StackError::Code(code)) => {
                log::warn!("Scan start ({}) failed, err {}", mode.as_str(), code);
                Err(ScanError::StartFailed(code))
            }
        }
    }

    pub fn stop_scan(&mut self) -> Result<(), ScanError> {
        if !self.monitor.state().is_scanning() {
            return Err(ScanError::NotScanning);
        }

        match self.radio.stop() {
            Ok(()) => {
                self.monitor.set_state(ScanState::Idle);
                Ok(())
            }
            Err(StackError::Already) => {
                // The stack had already stopped on its own.
                self.monitor.set_state(ScanState::Idle);
                Err(ScanError::NotScanning)
            }
            Err(StackError::Code(code)) => {
                log::warn!("Scan stop failed, err {}", code);
                Err(ScanError::StopFailed(code))
            }
        }
    }

    pub fn set_live_print(&self, enabled: bool) {
        self.monitor.set_live_print(enabled);
    }

    pub fn read_latest(&self) -> Option<i16> {
        self.monitor.read_latest()
    }

    pub fn read_average(&self) -> Result<i16, StatsError> {
        self.monitor.read_average()
    }

    pub fn state(&self) -> ScanState {
        self.monitor.state()
    }

    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }

    pub fn params(&self) -> &ScanParams {
        &self.params
    }

    pub fn monitor(&self) -> &'m ScanMonitor<S> {
        self.monitor
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }
}
