//! Replay module - Timed re-emission of a recorded event log
//!
//! Reads records in order and hands each one to an `EventSink` after
//! waiting out the gap recorded before it.

mod cursor;
mod engine;
mod pacer;

pub use cursor::*;
pub use engine::*;
pub use pacer::*;

use std::time::Duration;

/// Default recorded event log location
pub const DEFAULT_LOG_PATH: &str = "/tmp/record-input.log";

/// Wait before the first record; its absolute timestamp has no predecessor
pub const FIRST_EVENT_DELAY: Duration = Duration::from_millis(10);
