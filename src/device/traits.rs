//! Device trait definitions
//!
//! The control channel is the only thing that talks to the kernel; the
//! emulator and the replay engine only see these traits.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::descriptor::Capability;
use crate::event::InputEvent;

/// Errors that can occur while driving the virtual device
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Cannot open control interface {path}: {source}")]
    Unavailable { path: PathBuf, source: io::Error },

    #[error("Capability declaration {capability:?} failed: {source}")]
    DeclarationFailed {
        capability: Capability,
        source: io::Error,
    },

    #[error("Device creation failed: {0}")]
    CreationFailed(io::Error),

    #[error("Event injection failed: {0}")]
    InjectionFailed(io::Error),

    #[error("Device destruction failed: {0}")]
    DestroyFailed(io::Error),
}

pub type DeviceResult<T> = Result<T, DeviceError>;

/// Raw commands understood by a virtual-input control interface
pub trait ControlChannel {
    /// Register one event type or code the device will support
    fn declare(&mut self, capability: Capability) -> io::Result<()>;

    /// Write the device descriptor payload
    fn write_descriptor(&mut self, descriptor: &[u8]) -> io::Result<()>;

    /// Instantiate the device from the written descriptor
    fn create(&mut self) -> io::Result<()>;

    /// Write one raw event record, returning the number of bytes accepted
    fn write_event(&mut self, record: &[u8]) -> io::Result<usize>;

    /// Remove the device from the system
    fn destroy(&mut self) -> io::Result<()>;
}

/// Destination for replayed events
pub trait EventSink {
    fn inject(&mut self, event: &InputEvent) -> DeviceResult<()>;
}
