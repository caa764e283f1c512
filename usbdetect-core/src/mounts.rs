//! Mount-table scanning.
//!
//! Reads `df -h` style output, where each row starts with the device, ends
//! with the mount point, and has the use percentage as the last column
//! before the mount point:
//!
//! ```text
//! Filesystem      Size  Used Avail Use% Mounted on
//! /dev/sdh1        32G   10G   22G  32% /media/usb
//! tmpfs           1.6G  2.1M  1.6G   1% /run
//! ```

use lazy_regex::regex_captures;
use tracing::debug;

use crate::config::DetectorConfig;
use crate::error::{DetectError, Result};
use crate::process::CommandExecutor;

/// A mounted device found in the mount table, pending USB confirmation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MountEntry {
    pub device: String,
    pub mount_point: String,
}

/// Parses one mount-table row. Header and pseudo-filesystem rows whose first
/// column is not an absolute path return `None`.
pub fn parse_mount_line(line: &str) -> Option<MountEntry> {
    let (_, device, mount_point) = regex_captures!(r"^(/[^ ]+)[^%]+%[ ]+(.+)$", line)?;
    Some(MountEntry {
        device: device.to_string(),
        mount_point: mount_point.to_string(),
    })
}

/// Runs the mount-table command and returns the mounted device nodes in the
/// order they are listed. Repeated devices are kept.
pub fn scan_mounts<E: CommandExecutor>(
    executor: &E,
    config: &DetectorConfig,
) -> Result<Vec<MountEntry>> {
    let command = config.mount_command();
    let mut entries = Vec::new();

    for line in executor.execute(&command)? {
        let line = line.map_err(|source| DetectError::Read {
            command: command.to_string(),
            source,
        })?;

        let Some(entry) = parse_mount_line(&line) else {
            continue;
        };
        if !entry.device.starts_with(&config.device_prefix) {
            debug!(device = %entry.device, "not a device node, skipping");
            continue;
        }
        entries.push(entry);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_device_row() {
        let entry = parse_mount_line("/dev/sdh1 32G 10G 22G 32% /media/usb").unwrap();
        assert_eq!(entry.device, "/dev/sdh1");
        assert_eq!(entry.mount_point, "/media/usb");
    }

    #[test]
    fn keeps_spaces_in_mount_point() {
        let entry =
            parse_mount_line("/dev/sdb1       7.5G  3.1G  4.4G  42% /media/me/My Stick").unwrap();
        assert_eq!(entry.device, "/dev/sdb1");
        assert_eq!(entry.mount_point, "/media/me/My Stick");
    }

    #[test]
    fn skips_header_and_pseudo_filesystems() {
        assert!(parse_mount_line("Filesystem      Size  Used Avail Use% Mounted on").is_none());
        assert!(parse_mount_line("tmpfs 0 0 0 0% /run").is_none());
        assert!(parse_mount_line("udev 7.8G 0 7.8G 0% /dev").is_none());
    }

    #[test]
    fn skips_rows_without_percentage_or_mount_point() {
        assert!(parse_mount_line("/dev/sda1 100G 50G 50G").is_none());
        assert!(parse_mount_line("/dev/sda1 100G 50G 50G 50%").is_none());
        assert!(parse_mount_line("/dev/sda1").is_none());
        assert!(parse_mount_line("").is_none());
    }

    #[test]
    fn non_device_paths_still_parse() {
        // Filtering on the device prefix happens in `scan_mounts`.
        let entry = parse_mount_line("/home/me/disk.img 1G 1M 1G 1% /mnt/img").unwrap();
        assert_eq!(entry.device, "/home/me/disk.img");
    }
}
