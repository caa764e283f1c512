//! Provides platform-specific functionality.
//!
//! This module contains the logic for interacting with the operating system to
//! discover mounted USB storage devices.
//!
//! It uses conditional compilation (`#[cfg]`) to expose the implementation for
//! the target OS. Only Linux is supported; the public API of each submodule is
//! meant to be identical so the rest of the library can use it without
//! worrying about the underlying platform.

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use self::linux::*;
