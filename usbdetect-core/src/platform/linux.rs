use tracing::{debug, error, warn};

use crate::config::DetectorConfig;
use crate::device::{DiskInfo, UsbStorageDevice};
use crate::error::{DetectError, Result};
use crate::mounts::{MountEntry, scan_mounts};
use crate::process::{CommandExecutor, SystemExecutor};
use crate::properties::resolve_properties;

/// The outcome of one detection pass.
///
/// Detection never fails as a whole. Command failures are logged, recorded
/// in `failures`, and only reduce the number of disks found. An empty
/// `disks` with no failures means there really is no USB drive mounted.
#[derive(Debug, Default)]
pub struct Detection {
    /// USB disks in mount-table order.
    pub disks: Vec<DiskInfo>,
    /// Command invocations that failed during the pass.
    pub failures: Vec<DetectError>,
}

impl Detection {
    /// Whether some devices may be missing because a command failed.
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn into_devices(self) -> Vec<UsbStorageDevice> {
        self.disks.into_iter().map(UsbStorageDevice::from).collect()
    }
}

/// Finds mounted USB storage by correlating `df` output with udev properties.
///
/// Each call runs the mount-table command once, then one property query per
/// mounted device node, one after another.
#[derive(Debug)]
pub struct LinuxStorageDetector<E = SystemExecutor> {
    executor: E,
    config: DetectorConfig,
}

impl LinuxStorageDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self::with_executor(SystemExecutor, config)
    }
}

impl<E: CommandExecutor> LinuxStorageDetector<E> {
    pub fn with_executor(executor: E, config: DetectorConfig) -> Self {
        Self { executor, config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Runs one enumeration pass.
    ///
    /// The order of the mount table is preserved and a device listed twice is
    /// resolved, and reported, twice. If the mount table cannot be read the
    /// result is empty; if one device cannot be queried only that device is
    /// left out.
    pub fn detect(&self) -> Detection {
        let mut detection = Detection::default();

        let entries = match scan_mounts(&self.executor, &self.config) {
            Ok(entries) => entries,
            Err(err) => {
                error!(error = %err, "failed to read the mount table");
                detection.failures.push(err);
                return detection;
            }
        };

        for entry in entries {
            let Some(disk) = DiskInfo::from_mount(entry, &self.config.device_prefix) else {
                continue;
            };
            let properties = match resolve_properties(&self.executor, &self.config, disk.device())
            {
                Ok(properties) => properties,
                Err(err) => {
                    error!(device = disk.device(), error = %err, "failed to query device properties");
                    detection.failures.push(err);
                    continue;
                }
            };

            let disk = disk.with_properties(properties);
            if disk.is_usb {
                debug!(device = disk.device(), mount_point = %disk.mount_point, "found USB disk");
                detection.disks.push(disk);
            } else {
                debug!(device = disk.device(), "not on the USB bus, skipping");
            }
        }

        detection
    }

    /// Runs one enumeration pass and converts the USB disks found.
    pub fn storage_devices(&self) -> Vec<UsbStorageDevice> {
        self.detect().into_devices()
    }

    /// Resolves a single device node, whether or not it is a USB device.
    ///
    /// The mount point is taken from the first mount-table entry for `device`
    /// and left empty when the device is not mounted or the mount table
    /// cannot be read.
    pub fn detect_device(&self, device: &str) -> Result<DiskInfo> {
        let not_a_device_node = || DetectError::NotADeviceNode {
            device: device.to_string(),
            prefix: self.config.device_prefix.clone(),
        };
        if device.is_empty() || !device.starts_with(&self.config.device_prefix) {
            return Err(not_a_device_node());
        }

        let mount_point = match scan_mounts(&self.executor, &self.config) {
            Ok(entries) => entries
                .into_iter()
                .find(|entry| entry.device == device)
                .map(|entry| entry.mount_point)
                .unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "failed to read the mount table");
                String::new()
            }
        };

        let properties = resolve_properties(&self.executor, &self.config, device)?;
        let entry = MountEntry {
            device: device.to_string(),
            mount_point,
        };
        let disk = DiskInfo::from_mount(entry, &self.config.device_prefix)
            .ok_or_else(not_a_device_node)?;
        Ok(disk.with_properties(properties))
    }
}

/// Lists the USB storage devices currently mounted on this system.
///
/// This runs `df -h` and `udevadm info` with the default configuration.
/// Failures are logged and yield fewer devices; use
/// [`LinuxStorageDetector::detect`] to inspect them.
pub fn get_usb_devices() -> Vec<UsbStorageDevice> {
    LinuxStorageDetector::new(DetectorConfig::default()).storage_devices()
}
