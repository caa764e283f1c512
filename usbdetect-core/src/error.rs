//! Error types for device detection and configuration loading.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A failure while invoking one of the external information sources.
///
/// `Spawn` and `Read` are I/O failures scoped to a single command invocation.
/// The detector logs them and degrades to fewer results instead of
/// returning them to its caller; they surface only through
/// [`crate::platform::Detection::failures`] and single-device lookups.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read output of `{command}`: {source}")]
    Read {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{device} is not a device node under {prefix}")]
    NotADeviceNode { device: String, prefix: String },
}

impl DetectError {
    /// The rendered command line that failed, for invocation failures.
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::Spawn { command, .. } | Self::Read { command, .. } => Some(command),
            Self::NotADeviceNode { .. } => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, DetectError>;
