//! Minimal in-process radio stack for integration tests.
//!
//! Filters by name the way a real stack does and forwards matches to
//! whatever callbacks it was handed, once `register_callbacks` ran.

#![allow(dead_code)]

use rssimon::adv::AdvReport;
use rssimon::defaults::ScanParams;
use rssimon::filter::NameFilter;
use rssimon::radio::{FilterKind, FilterMatch, ScanCallbacks, ScanMode, ScanRadio, StackError};

pub struct LoopbackRadio<C> {
    callbacks: C,
    registered: bool,
    enabled: bool,
    filter: Option<NameFilter>,
    filter_enabled: bool,
    scanning: Option<ScanMode>,
}

impl<C: ScanCallbacks> LoopbackRadio<C> {
    pub fn new(callbacks: C) -> Self {
        Self {
            callbacks,
            registered: false,
            enabled: false,
            filter: None,
            filter_enabled: false,
            scanning: None,
        }
    }

    /// Simulate one advertisement reaching the stack.
    pub fn receive(&self, addr: [u8; 6], rssi: i8, ad_data: &[u8]) {
        if !self.registered || self.scanning.is_none() || !self.filter_enabled {
            return;
        }
        let report = AdvReport::parse(&addr, rssi, ad_data);
        let matched = self
            .filter
            .as_ref()
            .is_some_and(|f| f.matches(report.name.as_str()));
        if matched {
            let filter_match = FilterMatch {
                kind: FilterKind::Name,
            };
            self.callbacks
                .on_match(&report.device_info(), &filter_match, false);
        }
    }
}

impl<C: ScanCallbacks> ScanRadio for LoopbackRadio<C> {
    fn enable(&mut self) -> Result<(), StackError> {
        if self.enabled {
            return Err(StackError::Already);
        }
        self.enabled = true;
        Ok(())
    }

    fn init_scan(&mut self, _params: &ScanParams) {}

    fn register_callbacks(&mut self) {
        assert!(!self.registered, "callbacks registered twice");
        self.registered = true;
    }

    fn add_filter(&mut self, _kind: FilterKind, value: &str) -> Result<(), StackError> {
        if self.filter.is_some() {
            // Single filter slot
            return Err(StackError::Code(-12));
        }
        self.filter = Some(NameFilter::new(value).map_err(|_| StackError::Code(-22))?);
        Ok(())
    }

    fn enable_filter(&mut self, _kind: FilterKind, _match_all: bool) -> Result<(), StackError> {
        self.filter_enabled = true;
        Ok(())
    }

    fn remove_all_filters(&mut self) -> Result<(), StackError> {
        self.filter = None;
        self.filter_enabled = false;
        Ok(())
    }

    fn start(&mut self, mode: ScanMode) -> Result<(), StackError> {
        if self.scanning.is_some() {
            return Err(StackError::Already);
        }
        self.scanning = Some(mode);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), StackError> {
        self.scanning.take().map(|_| ()).ok_or(StackError::Already)
    }
}

/// Advertising payload carrying a complete local name.
pub fn named_adv(name: &str) -> Vec<u8> {
    let mut ad = vec![0x02, 0x01, 0x06];
    ad.push(name.len() as u8 + 1);
    ad.push(0x09);
    ad.extend_from_slice(name.as_bytes());
    ad
}
