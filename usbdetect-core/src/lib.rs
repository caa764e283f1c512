//! The core, UI-agnostic library for the `usbdetect` utility.
//!
//! `usbdetect-core` finds the USB mass-storage devices currently mounted on a
//! Linux host. It does so by correlating two external information sources:
//! the mount table printed by `df -h`, and the udev properties printed by
//! `udevadm info -q property -n <device>` for each mounted device node.
//!
//! The library is structured into several key modules:
//! - [`device`]: The per-pass `DiskInfo` record and the public
//!   `UsbStorageDevice` it is converted into.
//! - [`mounts`]: Parses mount-table rows into candidate devices.
//! - [`properties`]: Parses `KEY=VALUE` udev properties of one device.
//! - [`process`]: The command execution boundary the parsers read from.
//! - [`platform`]: The detector tying the steps together.
//! - [`config`]: Commands, device prefix and USB marker used by the detector.
//!
//! Detection never fails outright. A command that cannot be launched or read
//! is logged through `tracing` and only reduces the number of devices found.
//!
//! ## Example: Listing USB Drives
//!
//! ```rust,no_run
//! use usbdetect_core::config::DetectorConfig;
//! use usbdetect_core::platform::LinuxStorageDetector;
//!
//! let detector = LinuxStorageDetector::new(DetectorConfig::default());
//! let detection = detector.detect();
//!
//! if detection.is_degraded() {
//!     eprintln!("some devices could not be inspected");
//! }
//!
//! for device in detection.into_devices() {
//!     println!("{device}");
//! }
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod mounts;
pub mod platform;
pub mod process;
pub mod properties;

pub use error::{ConfigError, DetectError};
