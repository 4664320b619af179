//! Input event record types

use std::fmt;

use evdev::EventType;

/// Size of one record on disk and on the wire (64-bit `struct input_event`)
pub const RECORD_SIZE: usize = std::mem::size_of::<InputEvent>();

const MICROS_PER_SEC: i64 = 1_000_000;

/// Timestamp pair as stored in `struct timeval`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventTime {
    pub sec: i64,
    pub usec: i64,
}

impl EventTime {
    pub const fn new(sec: i64, usec: i64) -> Self {
        Self { sec, usec }
    }

    /// Signed difference `self - earlier` in microseconds.
    ///
    /// Seconds and microseconds are subtracted element-wise with a borrow,
    /// the same way `timersub` does, then combined.
    pub fn micros_since(&self, earlier: &EventTime) -> i64 {
        let mut sec = self.sec.wrapping_sub(earlier.sec);
        let mut usec = self.usec.wrapping_sub(earlier.usec);
        if usec < 0 {
            sec = sec.wrapping_sub(1);
            usec += MICROS_PER_SEC;
        }
        sec.saturating_mul(MICROS_PER_SEC).saturating_add(usec)
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.sec, self.usec)
    }
}

/// One recorded input event (matches the Linux kernel structure)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputEvent {
    pub time: EventTime,
    pub type_: u16,
    pub code: u16,
    pub value: i32,
}

impl InputEvent {
    pub fn new(time: EventTime, type_: u16, code: u16, value: i32) -> Self {
        Self {
            time,
            type_,
            code,
            value,
        }
    }

    pub fn event_type(&self) -> EventType {
        EventType(self.type_)
    }

    /// Serialize to the native kernel layout
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut bytes = [0u8; RECORD_SIZE];
        bytes[0..8].copy_from_slice(&self.time.sec.to_ne_bytes());
        bytes[8..16].copy_from_slice(&self.time.usec.to_ne_bytes());
        bytes[16..18].copy_from_slice(&self.type_.to_ne_bytes());
        bytes[18..20].copy_from_slice(&self.code.to_ne_bytes());
        bytes[20..24].copy_from_slice(&self.value.to_ne_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < RECORD_SIZE {
            return None;
        }
        Some(Self {
            time: EventTime {
                sec: i64::from_ne_bytes(bytes[0..8].try_into().ok()?),
                usec: i64::from_ne_bytes(bytes[8..16].try_into().ok()?),
            },
            type_: u16::from_ne_bytes(bytes[16..18].try_into().ok()?),
            code: u16::from_ne_bytes(bytes[18..20].try_into().ok()?),
            value: i32::from_ne_bytes(bytes[20..24].try_into().ok()?),
        })
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {:?} code={:#x} value={}",
            self.time,
            self.event_type(),
            self.code,
            self.value
        )
    }
}
