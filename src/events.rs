/// Message-passing boundary between the radio context and the engine.
///
/// Radio stacks that call back from an interrupt or a driver task hand
/// events to an [`EventQueue`] with a non-blocking `try_send`; a single
/// consumer drains the queue into the [`ScanMonitor`]. Safe to call from
/// ISR context (no allocation, no blocking).
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::defaults::EVENT_QUEUE_DEPTH;
use crate::monitor::{OutputSink, ScanMonitor};
use crate::radio::{DeviceInfo, FilterMatch, ScanCallbacks};

/// A callback invocation captured for later delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Match {
        device: DeviceInfo,
        filter_match: FilterMatch,
        connectable: bool,
    },
    ConnectError {
        device: DeviceInfo,
    },
}

/// Async channel type for scan events
pub type ScanChannel = Channel<CriticalSectionRawMutex, ScanEvent, EVENT_QUEUE_DEPTH>;

pub struct EventQueue {
    channel: ScanChannel,
    dropped: AtomicU32,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Enqueue without blocking. A full queue drops the event.
    pub fn push(&self, event: ScanEvent) {
        if self.channel.try_send(event).is_err() {
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            log::warn!("Scan event queue full, {} events dropped", dropped);
        }
    }

    /// Wait for the next event.
    pub async fn receive(&self) -> ScanEvent {
        self.channel.receive().await
    }

    /// Deliver everything queued so far. Returns the number of events.
    pub fn drain_into<S: OutputSink>(&self, monitor: &ScanMonitor<S>) -> usize {
        let mut delivered = 0;
        while let Ok(event) = self.channel.try_receive() {
            monitor.dispatch(&event);
            delivered += 1;
        }
        delivered
    }

    /// Events lost to a full queue since boot.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanCallbacks for EventQueue {
    fn on_match(&self, device: &DeviceInfo, filter_match: &FilterMatch, connectable: bool) {
        self.push(ScanEvent::Match {
            device: device.clone(),
            filter_match: *filter_match,
            connectable,
        });
    }

    fn on_error(&self, device: &DeviceInfo) {
        self.push(ScanEvent::ConnectError {
            device: device.clone(),
        });
    }
}
