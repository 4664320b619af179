//! Device module - Virtual input device emulation
//!
//! This module provides:
//! - The capability and identity declaration of the emulated device
//! - A control channel abstraction over the kernel's uinput interface
//! - The emulator that creates, feeds and destroys the virtual device

mod descriptor;
mod emulator;
mod traits;

#[cfg(target_os = "linux")]
mod linux;

pub use descriptor::*;
pub use emulator::*;
pub use traits::*;

#[cfg(target_os = "linux")]
pub use linux::UinputChannel;

/// Default uinput control node
pub const DEFAULT_CONTROL_PATH: &str = "/dev/uinput";
