//! rssimon library: portable BLE scan-and-sample engine.
//!
//! Watches advertisements from nearby devices, lets the radio stack filter
//! them by advertised name, and keeps a rolling window of RSSI samples for
//! the matched device. Live and averaged readings are exposed through a
//! console command surface.
//!
//! Everything here is `no_std`, no allocator, testable on any host with
//! `cargo test`. Platform binaries (the ESP-IDF firmware in `firmware-std/`)
//! are thin consumers that provide the radio stack and the console.
//!
//! Two execution contexts meet in this crate:
//! - the **control** context owns a [`controller::ScanController`] and runs
//!   console commands;
//! - the **radio** context invokes [`radio::ScanCallbacks`] on the shared
//!   [`monitor::ScanMonitor`], directly or through an [`events::EventQueue`].

#![cfg_attr(not(test), no_std)]

pub mod adv;
pub mod board;
pub mod controller;
pub mod defaults;
pub mod events;
pub mod filter;
pub mod monitor;
pub mod protocol;
pub mod radio;
pub mod rssi;
pub mod shell;

#[cfg(test)]
mod mock;
