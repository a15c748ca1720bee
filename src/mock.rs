//! Scripted radio stack for host tests.

use std::string::String;
use std::vec::Vec;

use crate::defaults::ScanParams;
use crate::radio::{FilterKind, ScanMode, ScanRadio, StackError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Enable,
    InitScan,
    RegisterCallbacks,
    AddFilter(String),
    EnableFilter,
    RemoveAllFilters,
    Start(ScanMode),
    Stop,
}

/// Records every call and answers with the configured results.
pub struct MockRadio {
    pub calls: Vec<Call>,
    /// Filters the "stack" currently holds
    pub filters: Vec<String>,
    pub enable_result: Result<(), StackError>,
    pub add_filter_result: Result<(), StackError>,
    pub start_result: Result<(), StackError>,
    pub stop_result: Result<(), StackError>,
}

impl MockRadio {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            filters: Vec::new(),
            enable_result: Ok(()),
            add_filter_result: Ok(()),
            start_result: Ok(()),
            stop_result: Ok(()),
        }
    }

    pub fn registrations(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == Call::RegisterCallbacks)
            .count()
    }
}

impl ScanRadio for MockRadio {
    fn enable(&mut self) -> Result<(), StackError> {
        self.calls.push(Call::Enable);
        self.enable_result
    }

    fn init_scan(&mut self, _params: &ScanParams) {
        self.calls.push(Call::InitScan);
    }

    fn register_callbacks(&mut self) {
        self.calls.push(Call::RegisterCallbacks);
    }

    fn add_filter(&mut self, _kind: FilterKind, value: &str) -> Result<(), StackError> {
        self.calls.push(Call::AddFilter(value.into()));
        self.add_filter_result?;
        self.filters.push(value.into());
        Ok(())
    }

    fn enable_filter(&mut self, _kind: FilterKind, _match_all: bool) -> Result<(), StackError> {
        self.calls.push(Call::EnableFilter);
        Ok(())
    }

    fn remove_all_filters(&mut self) -> Result<(), StackError> {
        self.calls.push(Call::RemoveAllFilters);
        self.filters.clear();
        Ok(())
    }

    fn start(&mut self, mode: ScanMode) -> Result<(), StackError> {
        self.calls.push(Call::Start(mode));
        self.start_result
    }

    fn stop(&mut self) -> Result<(), StackError> {
        self.calls.push(Call::Stop);
        self.stop_result
    }
}
