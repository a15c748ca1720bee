/// JSON status protocol and shared fixed-size string types.
///
/// Status reports are newline-delimited JSON (NDJSON) so a host script can
/// poll the monitor over the same console the shell runs on.
/// Uses `heapless` types for no_std/no-alloc operation.
use heapless::String;
use serde::Serialize;

/// Maximum length for MAC address strings ("AA:BB:CC:DD:EE:FF")
pub type MacString = String<18>;

/// Advertised local name (BLE legacy advertising caps it well below this)
pub type NameString = String<32>;

/// Messages sent from the monitor to a host
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum DeviceMessage<'a> {
    /// Engine status report
    #[serde(rename = "status")]
    Status {
        /// Lifecycle state: "disabled", "idle", "scanning_passive", "scanning_active"
        state: &'static str,
        /// Requested target name
        target: &'a str,
        /// Whether the target filter is installed in the radio stack
        installed: bool,
        /// Valid samples in the rolling window
        samples: u8,
        #[serde(skip_serializing_if = "Option::is_none")]
        latest: Option<i16>,
        #[serde(skip_serializing_if = "Option::is_none")]
        average: Option<i16>,
        live_print: bool,
        /// Matches seen since boot
        matches: u32,
        /// Board identifier
        board: &'static str,
        /// Firmware version
        version: &'static str,
    },
}

/// Firmware version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum size of a serialized JSON message
pub const MAX_MSG_LEN: usize = 512;

/// Serialize a DeviceMessage to JSON bytes and write to the output buffer.
/// Returns the number of bytes written, or None if serialization failed.
pub fn serialize_message(msg: &DeviceMessage, buf: &mut [u8]) -> Option<usize> {
    match serde_json_core::to_slice(msg, buf) {
        Ok(len) => {
            // Append newline for NDJSON
            if len < buf.len() {
                buf[len] = b'\n';
                Some(len + 1)
            } else {
                Some(len)
            }
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status<'a>(target: &'a str, latest: Option<i16>) -> DeviceMessage<'a> {
        DeviceMessage::Status {
            state: "scanning_passive",
            target,
            installed: true,
            samples: 3,
            latest,
            average: latest,
            live_print: false,
            matches: 42,
            board: "test_board",
            version: "0.1.0",
        }
    }

    #[test]
    fn serialize_status_message() {
        let msg = status("Thingy", Some(-61));
        let mut buf = [0u8; MAX_MSG_LEN];
        let len = serialize_message(&msg, &mut buf).unwrap();
        let json = core::str::from_utf8(&buf[..len]).unwrap();
        assert!(json.ends_with('\n'));
        assert!(json.contains(r#""type":"status""#));
        assert!(json.contains(r#""state":"scanning_passive""#));
        assert!(json.contains(r#""target":"Thingy""#));
        assert!(json.contains(r#""latest":-61"#));
        assert!(json.contains(r#""matches":42"#));
        assert!(json.contains(r#""board":"test_board""#));
    }

    #[test]
    fn absent_samples_are_omitted() {
        let msg = status("Default", None);
        let mut buf = [0u8; MAX_MSG_LEN];
        let len = serialize_message(&msg, &mut buf).unwrap();
        let json = core::str::from_utf8(&buf[..len]).unwrap();
        assert!(!json.contains("latest"));
        assert!(!json.contains("average"));
    }

    #[test]
    fn too_small_buffer_fails() {
        let msg = status("Default", None);
        let mut buf = [0u8; 16];
        assert!(serialize_message(&msg, &mut buf).is_none());
    }

    #[test]
    fn version_is_semver() {
        let parts: heapless::Vec<&str, 4> = VERSION.split('.').collect();
        assert_eq!(
            parts.len(),
            3,
            "VERSION should be semver (major.minor.patch)"
        );
        for part in &parts {
            assert!(part.parse::<u32>().is_ok(), "'{part}' is not a number");
        }
    }
}
