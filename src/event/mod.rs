//! Event module - Recorded input event records
//!
//! The event log is a flat sequence of fixed-size records with no header,
//! no count and no framing. Each record is byte-for-byte the kernel's
//! `struct input_event`, so it can be written to uinput untouched.

mod codec;
mod record;

pub use codec::*;
pub use record::*;
