/// Advertisement data parsing for radio stack implementations.
///
/// Stacks that do not filter by name themselves (NimBLE on ESP-IDF, HCI
/// hosts) decode the local name here and compare it with the installed
/// [`NameFilter`](crate::filter::NameFilter) before reporting a match.
///
/// AD structure format: [length] [type] [data...]
/// Types we care about:
///   0x08/0x09 = Shortened/Complete local name
///   0xFF      = Manufacturer specific data (first 2 bytes = company ID, little-endian)
use crate::protocol::NameString;
use crate::radio::DeviceInfo;

const AD_SHORT_NAME: u8 = 0x08;
const AD_COMPLETE_NAME: u8 = 0x09;
const AD_MANUFACTURER: u8 = 0xFF;

/// Fields of one advertising report relevant to name filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvReport {
    pub addr: [u8; 6],
    pub rssi: i8,
    pub name: NameString,
    /// True when the name came from a Complete Local Name structure
    pub name_complete: bool,
    /// Manufacturer company ID (0 if not present)
    pub manufacturer_id: u16,
}

impl AdvReport {
    /// Parse advertisement data bytes. Malformed trailing structures are
    /// ignored; whatever parsed before them is kept.
    pub fn parse(addr: &[u8; 6], rssi: i8, ad_data: &[u8]) -> Self {
        let mut report = AdvReport {
            addr: *addr,
            rssi,
            name: NameString::new(),
            name_complete: false,
            manufacturer_id: 0,
        };

        let mut pos = 0;
        while pos < ad_data.len() {
            let len = ad_data[pos] as usize;
            if len == 0 || pos + 1 + len > ad_data.len() {
                break;
            }

            let ad_type = ad_data[pos + 1];
            let data = &ad_data[pos + 2..pos + 1 + len];

            match ad_type {
                // A complete name wins over a shortened one in either order
                AD_SHORT_NAME | AD_COMPLETE_NAME if !report.name_complete => {
                    if let Ok(name) = core::str::from_utf8(data) {
                        report.name = truncate_name(name);
                        report.name_complete = ad_type == AD_COMPLETE_NAME;
                    }
                }
                AD_MANUFACTURER => {
                    if data.len() >= 2 {
                        report.manufacturer_id = u16::from_le_bytes([data[0], data[1]]);
                    }
                }
                _ => {}
            }

            pos += 1 + len;
        }

        report
    }

    /// Device info as handed to the engine callbacks.
    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            addr: self.addr,
            name: self.name.clone(),
            rssi: self.rssi,
        }
    }
}

/// Copy as much of `name` as fits, cutting on a char boundary.
fn truncate_name(name: &str) -> NameString {
    let mut out = NameString::new();
    for c in name.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
