//! evreplay - Recorded input event playback
//!
//! Replays a captured stream of input events through a virtual uinput
//! device, reproducing the recorded gaps between events.
//!
//! - [`device`] declares, creates and destroys the virtual device
//! - [`replay`] drives the timed re-emission of the log
//! - [`event`] is the on-disk record format shared by both

pub mod config;
pub mod device;
pub mod event;
pub mod replay;
