//! Virtual device lifecycle
//!
//! Owns the control channel from creation to destruction. Capability
//! declaration is best-effort; creation is all-or-nothing.

use std::io;

use super::descriptor::DeviceDescriptor;
use super::traits::{ControlChannel, DeviceError, DeviceResult, EventSink};
use crate::event::{InputEvent, RECORD_SIZE};

/// Outcome of a capability declaration pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeclarationReport {
    pub declared: usize,
    pub failed: usize,
}

/// A virtual input device built on a control channel
pub struct DeviceEmulator<C: ControlChannel> {
    channel: C,
    descriptor: DeviceDescriptor,
    created: bool,
}

impl<C: ControlChannel> DeviceEmulator<C> {
    pub fn new(channel: C, descriptor: DeviceDescriptor) -> Self {
        Self {
            channel,
            descriptor,
            created: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_created(&self) -> bool {
        self.created
    }

    /// Register every capability, one call per entry.
    ///
    /// Failures are logged and counted; the remaining entries are still
    /// declared.
    pub fn declare_capabilities(&mut self) -> DeclarationReport {
        let mut report = DeclarationReport::default();

        for capability in self.descriptor.capabilities.iter() {
            match self.channel.declare(*capability) {
                Ok(()) => report.declared += 1,
                Err(source) => {
                    let err = DeviceError::DeclarationFailed {
                        capability: *capability,
                        source,
                    };
                    tracing::warn!("{}", err);
                    report.failed += 1;
                }
            }
        }

        tracing::debug!(
            "Declared {} capabilities ({} failed)",
            report.declared,
            report.failed
        );
        report
    }

    /// Write the descriptor and instantiate the device
    pub fn create_device(&mut self) -> DeviceResult<()> {
        let setup = self.descriptor.to_user_dev_bytes();
        self.channel
            .write_descriptor(&setup)
            .map_err(DeviceError::CreationFailed)?;
        self.channel.create().map_err(DeviceError::CreationFailed)?;

        self.created = true;
        tracing::info!(
            "Virtual device '{}' created (bus {:#06x}, {:04x}:{:04x} v{:04x})",
            self.descriptor.name,
            self.descriptor.id.bustype,
            self.descriptor.id.vendor,
            self.descriptor.id.product,
            self.descriptor.id.version
        );
        Ok(())
    }

    /// Write one event verbatim to the device
    pub fn inject(&mut self, event: &InputEvent) -> DeviceResult<()> {
        let written = self
            .channel
            .write_event(&event.to_bytes())
            .map_err(DeviceError::InjectionFailed)?;

        if written != RECORD_SIZE {
            return Err(DeviceError::InjectionFailed(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write: {} of {} bytes", written, RECORD_SIZE),
            )));
        }
        Ok(())
    }

    /// Destroy the device and release the channel
    pub fn destroy_device(mut self) -> DeviceResult<()> {
        self.teardown()
    }

    fn teardown(&mut self) -> DeviceResult<()> {
        if !self.created {
            return Ok(());
        }
        self.created = false;
        self.channel.destroy().map_err(DeviceError::DestroyFailed)?;
        tracing::info!("Virtual device '{}' destroyed", self.descriptor.name);
        Ok(())
    }
}

impl<C: ControlChannel> EventSink for DeviceEmulator<C> {
    fn inject(&mut self, event: &InputEvent) -> DeviceResult<()> {
        DeviceEmulator::inject(self, event)
    }
}

impl<C: ControlChannel> Drop for DeviceEmulator<C> {
    fn drop(&mut self) {
        if let Err(e) = self.teardown() {
            tracing::error!("{}", e);
        }
    }
}
