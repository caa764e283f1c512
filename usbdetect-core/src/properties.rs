//! Device-property resolution through `udevadm info -q property`.
//!
//! The query prints one `KEY=VALUE` pair per line, for example:
//!
//! ```text
//! DEVNAME=/dev/sdh1
//! ID_BUS=usb
//! ID_FS_LABEL=MYUSB
//! ID_FS_UUID=1234-ABCD
//! ```

use crate::config::DetectorConfig;
use crate::error::{DetectError, Result};
use crate::process::CommandExecutor;

pub const KEY_BUS: &str = "ID_BUS";
pub const KEY_FS_LABEL: &str = "ID_FS_LABEL";
pub const KEY_FS_UUID: &str = "ID_FS_UUID";

/// Properties relevant to USB detection. The default value is what an
/// unresolvable device ends up with: not USB, no label, no UUID.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceProperties {
    pub is_usb: bool,
    pub label: Option<String>,
    pub uuid: Option<String>,
}

impl DeviceProperties {
    /// Folds one property into the set. Unrecognized keys are ignored and a
    /// repeated key overrides the earlier value.
    pub fn apply(&mut self, key: &str, value: &str, usb_bus: &str) {
        match key {
            KEY_BUS => self.is_usb = value == usb_bus,
            KEY_FS_LABEL => self.label = Some(value.to_string()),
            KEY_FS_UUID => self.uuid = Some(value.to_string()),
            _ => {}
        }
    }
}

/// Splits a `KEY=VALUE` line on the first `=` and trims both halves.
///
/// Lines without `=` and lines with only whitespace after it are skipped.
pub fn parse_property_line(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some((key.trim(), value))
}

/// Queries the properties of `device`.
///
/// Properties parsed before a read error are discarded, so a failed query
/// never yields a partially resolved device.
pub fn resolve_properties<E: CommandExecutor>(
    executor: &E,
    config: &DetectorConfig,
    device: &str,
) -> Result<DeviceProperties> {
    let command = config.property_command(device);
    let mut properties = DeviceProperties::default();

    for line in executor.execute(&command)? {
        let line = line.map_err(|source| DetectError::Read {
            command: command.to_string(),
            source,
        })?;

        if let Some((key, value)) = parse_property_line(&line) {
            properties.apply(key, value, &config.usb_bus);
        }
    }

    Ok(properties)
}
