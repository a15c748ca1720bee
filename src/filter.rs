/// Target name filter: the single filter slot of the scan engine.
///
/// The radio stack does the actual matching; this module only validates
/// names and remembers which one is wanted and which one the stack has.
/// No re-filtering happens on the engine side.
use core::fmt;

use crate::defaults::DEFAULT_TARGET_NAME;
use crate::protocol::{MacString, NameString};

/// Filter install failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterError {
    /// Empty, or longer than a BLE local name can be
    InvalidName,
    /// The radio stack rejected the filter (stack error code)
    InstallFailed(i32),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::InvalidName => f.write_str("invalid target name"),
            FilterError::InstallFailed(code) => write!(f, "filter install failed, err {}", code),
        }
    }
}

/// A validated, non-empty device name to match exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFilter {
    name: NameString,
}

impl NameFilter {
    pub fn new(name: &str) -> Result<Self, FilterError> {
        if name.is_empty() {
            return Err(FilterError::InvalidName);
        }
        let name = NameString::try_from(name).map_err(|_| FilterError::InvalidName)?;
        Ok(Self { name })
    }

    pub fn as_str(&self) -> &str {
        self.name.as_str()
    }

    /// Exact, case-sensitive comparison against an advertised name.
    pub fn matches(&self, advertised: &str) -> bool {
        self.name.as_str() == advertised
    }
}

impl fmt::Display for NameFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime filter state, owned by the control context.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Name the operator asked for
    target: NameFilter,
    /// Name currently installed in the radio stack
    active: Option<NameFilter>,
}

impl FilterConfig {
    pub fn new() -> Self {
        Self {
            target: Self::default_target(),
            active: None,
        }
    }

    fn default_target() -> NameFilter {
        // The compiled-in default is short and non-empty (checked in tests).
        NameFilter {
            name: NameString::try_from(DEFAULT_TARGET_NAME).unwrap_or_default(),
        }
    }

    pub fn target(&self) -> &NameFilter {
        &self.target
    }

    pub fn active(&self) -> Option<&NameFilter> {
        self.active.as_ref()
    }

    pub fn is_installed(&self) -> bool {
        self.active.is_some()
    }

    /// Record a new desired name without touching the stack.
    pub(crate) fn set_target(&mut self, target: NameFilter) {
        self.target = target;
    }

    /// The stack now holds `target` (or nothing, after a failed install).
    pub(crate) fn set_active(&mut self, active: Option<NameFilter>) {
        self.active = active;
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a 6-byte MAC address into "AA:BB:CC:DD:EE:FF" string
pub fn format_mac(mac: &[u8; 6], buf: &mut MacString) {
    use core::fmt::Write;
    buf.clear();
    let _ = write!(
        buf,
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    );
}
