//! Linux uinput control channel
//!
//! Requirements:
//! - uinput module must be loaded: sudo modprobe uinput
//! - /dev/uinput must be writable by the current user

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;

use super::descriptor::Capability;
use super::traits::{ControlChannel, DeviceError, DeviceResult};

mod ioctl {
    nix::ioctl_none!(ui_dev_create, b'U', 1);
    nix::ioctl_none!(ui_dev_destroy, b'U', 2);
    nix::ioctl_write_int!(ui_set_evbit, b'U', 100);
    nix::ioctl_write_int!(ui_set_keybit, b'U', 101);
    nix::ioctl_write_int!(ui_set_relbit, b'U', 102);
    nix::ioctl_write_int!(ui_set_absbit, b'U', 103);
}

/// Control channel backed by the uinput device node
pub struct UinputChannel {
    file: File,
}

impl UinputChannel {
    /// Open the control interface for non-blocking writes
    pub fn open(path: &Path) -> DeviceResult<Self> {
        let file = OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
            .map_err(|source| DeviceError::Unavailable {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!("Opened control interface {}", path.display());
        Ok(Self { file })
    }
}

impl ControlChannel for UinputChannel {
    fn declare(&mut self, capability: Capability) -> io::Result<()> {
        let fd = self.file.as_raw_fd();
        let result = unsafe {
            match capability {
                Capability::EventType(code) => ioctl::ui_set_evbit(fd, code.into()),
                Capability::Key(code) => ioctl::ui_set_keybit(fd, code.into()),
                Capability::Relative(code) => ioctl::ui_set_relbit(fd, code.into()),
                Capability::Absolute(code) => ioctl::ui_set_absbit(fd, code.into()),
            }
        };
        result.map(drop).map_err(io::Error::from)
    }

    fn write_descriptor(&mut self, descriptor: &[u8]) -> io::Result<()> {
        self.file.write_all(descriptor)
    }

    fn create(&mut self) -> io::Result<()> {
        unsafe { ioctl::ui_dev_create(self.file.as_raw_fd()) }
            .map(drop)
            .map_err(io::Error::from)
    }

    fn write_event(&mut self, record: &[u8]) -> io::Result<usize> {
        self.file.write(record)
    }

    fn destroy(&mut self) -> io::Result<()> {
        unsafe { ioctl::ui_dev_destroy(self.file.as_raw_fd()) }
            .map(drop)
            .map_err(io::Error::from)
    }
}
