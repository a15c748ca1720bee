//! End-to-end console sessions against the loopback radio.

mod common;

use std::sync::Mutex;

use rssimon::controller::ScanController;
use rssimon::monitor::{Notice, OutputSink, ScanMonitor};
use rssimon::shell::{execute, parse_command, LineReader};

use common::{named_adv, LoopbackRadio};

#[derive(Default)]
struct Console(Mutex<Vec<String>>);

impl OutputSink for Console {
    fn emit(&self, notice: &Notice) {
        self.0.lock().unwrap().push(notice.to_string());
    }
}

type Ctl<'m> = ScanController<'m, LoopbackRadio<&'m ScanMonitor<Console>>, Console>;

fn run(ctl: &mut Ctl<'_>, line: &str) -> String {
    let mut out = String::new();
    match parse_command(line) {
        Ok(cmd) => execute(ctl, &cmd, &mut out).unwrap(),
        Err(e) => out = format!("{e}\n"),
    }
    out
}

const PEER: [u8; 6] = [0xC0, 0x01, 0x02, 0x03, 0x04, 0x05];

#[test]
fn operator_session() {
    let monitor = ScanMonitor::new(Console::default());
    let mut ctl: Ctl = ScanController::new(LoopbackRadio::new(&monitor), &monitor);

    assert!(run(&mut ctl, "scan enable").contains("Scanning module enabled"));
    assert_eq!(run(&mut ctl, "scan start passive"), "Passive scanning on\n");

    // Only the default target is reported by the stack
    ctl.radio().receive(PEER, -40, &named_adv("Default"));
    ctl.radio().receive(PEER, -90, &named_adv("Stranger"));
    ctl.radio().receive(PEER, -42, &named_adv("Default"));
    assert_eq!(run(&mut ctl, "scan rssi read"), "Latest rssi: -42\n");
    assert_eq!(run(&mut ctl, "scan rssi average"), "Average rssi value -41\n");

    assert_eq!(
        run(&mut ctl, "scan change_name Thingy"),
        "The target device name was set to: Thingy\n"
    );
    ctl.radio().receive(PEER, -60, &named_adv("Default"));
    ctl.radio().receive(PEER, -61, &named_adv("Thingy"));
    assert_eq!(run(&mut ctl, "scan rssi read"), "Latest rssi: -61\n");

    run(&mut ctl, "scan rssi print start");
    ctl.radio().receive(PEER, -62, &named_adv("Thingy"));
    run(&mut ctl, "scan rssi print stop");
    ctl.radio().receive(PEER, -63, &named_adv("Thingy"));
    assert_eq!(*monitor_console(&monitor), vec!["rssi: -62".to_string()]);

    assert_eq!(run(&mut ctl, "scan stop"), "Scanning has stopped\n");
    assert_eq!(run(&mut ctl, "scan stop"), "Scanning is not on\n");
    assert_eq!(run(&mut ctl, "scan start active"), "Active scanning on\n");
    assert_eq!(run(&mut ctl, "scan start active"), "Scanning already enabled\n");
}

fn monitor_console<'a>(
    monitor: &'a ScanMonitor<Console>,
) -> std::sync::MutexGuard<'a, Vec<String>> {
    monitor.sink().0.lock().unwrap()
}

#[test]
fn commands_before_enable() {
    let monitor = ScanMonitor::new(Console::default());
    let mut ctl: Ctl = ScanController::new(LoopbackRadio::new(&monitor), &monitor);

    assert_eq!(
        run(&mut ctl, "scan start passive"),
        "Bluetooth not enabled, run 'scan enable' first\n"
    );
    assert_eq!(run(&mut ctl, "scan stop"), "Scanning is not on\n");
    assert_eq!(
        run(&mut ctl, "scan change_name Early"),
        "The target device name was set to: Early\n"
    );
    run(&mut ctl, "scan enable");
    run(&mut ctl, "scan start passive");
    ctl.radio().receive(PEER, -70, &named_adv("Early"));
    assert_eq!(run(&mut ctl, "scan rssi read"), "Latest rssi: -70\n");

    // Re-enabling must not register callbacks a second time
    assert!(run(&mut ctl, "scan enable").contains("Bluetooth initialized"));
}

#[test]
fn console_bytes_to_commands() {
    let monitor = ScanMonitor::new(Console::default());
    let mut ctl: Ctl = ScanController::new(LoopbackRadio::new(&monitor), &monitor);
    let mut reader = LineReader::new();
    let mut transcript = String::new();

    for &b in b"scan enable\r\nscan bogus\r\nscan status\r\n" {
        if let Some(line) = reader.feed(b) {
            let line = line.to_string();
            transcript.push_str(&run(&mut ctl, &line));
        }
    }

    assert!(transcript.contains("Bluetooth initialized"));
    assert!(transcript.contains("unknown subcommand"));
    assert!(transcript.contains(r#""state":"idle""#));
}
