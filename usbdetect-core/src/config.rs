//! Detector configuration.
//!
//! Every field has a default matching a stock Linux host, so an empty TOML
//! document is a valid configuration.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::process::CommandSpec;

pub const DEFAULT_DEVICE_PREFIX: &str = "/dev/";
pub const DEFAULT_MOUNT_COMMAND: &str = "df -h";
pub const DEFAULT_PROPERTY_COMMAND: &str = "udevadm info -q property -n";
pub const DEFAULT_USB_BUS: &str = "usb";

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DetectorConfig {
    /// Mount-table entries whose device does not start with this are ignored.
    pub device_prefix: String,
    /// Command listing mounted filesystems, one per line.
    pub mount_command: String,
    /// Command printing `KEY=VALUE` properties. The device path is appended.
    pub property_command: String,
    /// `ID_BUS` value that marks a USB device. Compared case-sensitively.
    pub usb_bus: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            device_prefix: DEFAULT_DEVICE_PREFIX.to_string(),
            mount_command: DEFAULT_MOUNT_COMMAND.to_string(),
            property_command: DEFAULT_PROPERTY_COMMAND.to_string(),
            usb_bus: DEFAULT_USB_BUS.to_string(),
        }
    }
}

impl DetectorConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    /// The mount-table command. Falls back to the default when blank.
    pub fn mount_command(&self) -> CommandSpec {
        CommandSpec::parse(&self.mount_command)
            .or_else(|| CommandSpec::parse(DEFAULT_MOUNT_COMMAND))
            .unwrap_or_else(|| CommandSpec::new("df"))
    }

    /// The property query for `device`.
    pub fn property_command(&self, device: &str) -> CommandSpec {
        CommandSpec::parse(&self.property_command)
            .or_else(|| CommandSpec::parse(DEFAULT_PROPERTY_COMMAND))
            .unwrap_or_else(|| CommandSpec::new("udevadm"))
            .arg(device)
    }
}
