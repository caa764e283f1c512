use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::mounts::MountEntry;
use crate::properties::DeviceProperties;

/// A mounted device as seen during a single detection pass.
///
/// Built from a mount-table entry whose device path already passed the
/// device-node prefix check, then completed with its resolved properties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiskInfo {
    device: String,
    /// Where the device's filesystem is mounted (e.g. `/media/usb`).
    pub mount_point: String,
    /// Whether udev reports the device on the USB bus.
    pub is_usb: bool,
    /// The filesystem label, if it has one.
    pub name: Option<String>,
    /// The filesystem UUID, if it has one.
    pub uuid: Option<String>,
}

impl DiskInfo {
    /// Starts an unresolved record for a mount-table entry.
    ///
    /// Returns `None` unless the device path is non-empty and under `prefix`.
    pub(crate) fn from_mount(entry: MountEntry, prefix: &str) -> Option<Self> {
        if entry.device.is_empty() || !entry.device.starts_with(prefix) {
            return None;
        }
        Some(Self {
            device: entry.device,
            mount_point: entry.mount_point,
            is_usb: false,
            name: None,
            uuid: None,
        })
    }

    /// The device-node path (e.g. `/dev/sdh1`).
    pub fn device(&self) -> &str {
        &self.device
    }

    pub(crate) fn with_properties(mut self, properties: DeviceProperties) -> Self {
        self.is_usb = properties.is_usb;
        self.name = properties.label;
        self.uuid = properties.uuid;
        self
    }
}

/// A mounted USB mass-storage device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UsbStorageDevice {
    /// The directory the device is mounted on.
    pub root_directory: PathBuf,
    /// The filesystem label, or the mount directory's name when unlabeled.
    pub device_name: String,
    pub uuid: Option<String>,
    /// The device-node path (e.g. `/dev/sdb1`).
    pub device: PathBuf,
}

impl From<DiskInfo> for UsbStorageDevice {
    fn from(disk: DiskInfo) -> Self {
        let root_directory = PathBuf::from(&disk.mount_point);
        let device_name = disk
            .name
            .filter(|name| !name.is_empty())
            .or_else(|| file_name(&root_directory))
            .unwrap_or_else(|| disk.device.clone());

        Self {
            root_directory,
            device_name,
            uuid: disk.uuid,
            device: PathBuf::from(disk.device),
        }
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}

impl fmt::Display for UsbStorageDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<15} {:<20} {:<12} {}",
            self.device.display(),
            self.device_name,
            self.uuid.as_deref().unwrap_or("-"),
            self.root_directory.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usb_disk(mount_point: &str, name: Option<&str>) -> DiskInfo {
        DiskInfo::from_mount(entry("/dev/sdh1", mount_point), "/dev/")
            .unwrap()
            .with_properties(DeviceProperties {
                is_usb: true,
                label: name.map(str::to_string),
                uuid: Some("1234-ABCD".to_string()),
            })
    }

    fn entry(device: &str, mount_point: &str) -> MountEntry {
        MountEntry {
            device: device.to_string(),
            mount_point: mount_point.to_string(),
        }
    }

    #[test]
    fn new_disk_is_unresolved() {
        let disk = DiskInfo::from_mount(entry("/dev/sdh1", "/media/usb"), "/dev/").unwrap();
        assert_eq!(disk.device(), "/dev/sdh1");
        assert_eq!(disk.mount_point, "/media/usb");
        assert!(!disk.is_usb);
        assert_eq!(disk.name, None);
        assert_eq!(disk.uuid, None);
    }

    #[test]
    fn only_prefixed_devices_become_disks() {
        assert!(DiskInfo::from_mount(entry("tmpfs", "/run"), "/dev/").is_none());
        assert!(DiskInfo::from_mount(entry("", "/media/usb"), "/dev/").is_none());
        assert!(DiskInfo::from_mount(entry("//nas/share", "/mnt/nas"), "/dev/").is_none());
        assert!(DiskInfo::from_mount(entry("/dev/sdb1", "/media/a"), "/dev/sd").is_some());
        assert!(DiskInfo::from_mount(entry("/dev/nvme0n1p1", "/boot"), "/dev/sd").is_none());
    }

    #[test]
    fn converts_labeled_disk() {
        let device = UsbStorageDevice::from(usb_disk("/media/usb", Some("MYUSB")));
        assert_eq!(device.root_directory, PathBuf::from("/media/usb"));
        assert_eq!(device.device_name, "MYUSB");
        assert_eq!(device.uuid.as_deref(), Some("1234-ABCD"));
        assert_eq!(device.device, PathBuf::from("/dev/sdh1"));
    }

    #[test]
    fn unlabeled_disk_is_named_after_mount_directory() {
        let device = UsbStorageDevice::from(usb_disk("/media/me/STICK", None));
        assert_eq!(device.device_name, "STICK");

        let device = UsbStorageDevice::from(usb_disk("/media/me/STICK", Some("")));
        assert_eq!(device.device_name, "STICK");
    }

    #[test]
    fn disk_mounted_at_root_falls_back_to_device_path() {
        let device = UsbStorageDevice::from(usb_disk("/", None));
        assert_eq!(device.device_name, "/dev/sdh1");
    }

    #[test]
    fn display_lists_device_label_uuid_and_mount() {
        let row = UsbStorageDevice::from(usb_disk("/media/usb", Some("MYUSB"))).to_string();
        assert!(row.starts_with("/dev/sdh1"));
        assert!(row.contains("MYUSB"));
        assert!(row.contains("1234-ABCD"));
        assert!(row.ends_with("/media/usb"));
    }
}
