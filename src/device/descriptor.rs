//! Device identity and capability declaration

use evdev::{AbsoluteAxisType, EventType, Key, RelativeAxisType};
use serde::{Deserialize, Serialize};

/// Capacity of the name field in `struct uinput_user_dev`
pub const UINPUT_MAX_NAME_SIZE: usize = 80;

/// Number of absolute axes the kernel tracks ranges for
pub const ABS_CNT: usize = 64;

/// Size of the legacy `struct uinput_user_dev`
pub const USER_DEV_SIZE: usize = UINPUT_MAX_NAME_SIZE + 8 + 4 + 4 * ABS_CNT * 4;

pub const BUS_BLUETOOTH: u16 = 0x05;

// Exclusive upper bounds of the declared key and button ranges
const KEY_MICMUTE: u16 = 248;
const BTN_TASK: u16 = 0x117;

/// One entry of the capability declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    EventType(u16),
    Key(u16),
    Relative(u16),
    Absolute(u16),
}

/// Ordered list of declarations, issued one call per entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    entries: Vec<Capability>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full keyboard, standard mouse buttons, relative and absolute X/Y
    pub fn standard() -> Self {
        let mut set = Self::new();

        set.push(Capability::EventType(EventType::KEY.0));
        for code in Key::KEY_ESC.code()..KEY_MICMUTE {
            set.push(Capability::Key(code));
        }
        for code in Key::BTN_LEFT.code()..BTN_TASK {
            set.push(Capability::Key(code));
        }

        set.push(Capability::EventType(EventType::RELATIVE.0));
        set.push(Capability::Relative(RelativeAxisType::REL_X.0));
        set.push(Capability::Relative(RelativeAxisType::REL_Y.0));

        set.push(Capability::EventType(EventType::ABSOLUTE.0));
        set.push(Capability::Absolute(AbsoluteAxisType::ABS_X.0));
        set.push(Capability::Absolute(AbsoluteAxisType::ABS_Y.0));

        set
    }

    pub fn push(&mut self, capability: Capability) {
        if !self.entries.contains(&capability) {
            self.entries.push(capability);
        }
    }

    pub fn contains(&self, capability: &Capability) -> bool {
        self.entries.contains(capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bus type and vendor/product/version identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputId {
    pub bustype: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
}

impl Default for InputId {
    fn default() -> Self {
        Self {
            bustype: BUS_BLUETOOTH,
            vendor: 0x0315,
            product: 0x0607,
            version: 0x0412,
        }
    }
}

/// Value range of one absolute axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsRange {
    pub axis: u16,
    pub min: i32,
    pub max: i32,
}

impl AbsRange {
    pub fn new(axis: AbsoluteAxisType, min: i32, max: i32) -> Self {
        Self {
            axis: axis.0,
            min,
            max,
        }
    }

    /// Default screen-sized ranges for ABS_X and ABS_Y
    pub fn screen(width: i32, height: i32) -> Vec<Self> {
        vec![
            Self::new(AbsoluteAxisType::ABS_X, 0, width),
            Self::new(AbsoluteAxisType::ABS_Y, 0, height),
        ]
    }
}

/// Identity and capabilities of the virtual device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub name: String,
    pub id: InputId,
    pub capabilities: CapabilitySet,
    pub abs_ranges: Vec<AbsRange>,
}

impl Default for DeviceDescriptor {
    fn default() -> Self {
        Self {
            name: "blueberry-input".to_string(),
            id: InputId::default(),
            capabilities: CapabilitySet::standard(),
            abs_ranges: AbsRange::screen(1920, 1080),
        }
    }
}

impl DeviceDescriptor {
    /// Serialize as `struct uinput_user_dev` in native byte order.
    ///
    /// The name is truncated to leave room for the NUL terminator and
    /// axes outside `ABS_CNT` are skipped.
    pub fn to_user_dev_bytes(&self) -> Vec<u8> {
        let mut data = vec![0u8; USER_DEV_SIZE];

        let name = self.name.as_bytes();
        let len = name.len().min(UINPUT_MAX_NAME_SIZE - 1);
        data[..len].copy_from_slice(&name[..len]);

        let id = UINPUT_MAX_NAME_SIZE;
        data[id..id + 2].copy_from_slice(&self.id.bustype.to_ne_bytes());
        data[id + 2..id + 4].copy_from_slice(&self.id.vendor.to_ne_bytes());
        data[id + 4..id + 6].copy_from_slice(&self.id.product.to_ne_bytes());
        data[id + 6..id + 8].copy_from_slice(&self.id.version.to_ne_bytes());

        // ff_effects_max stays zero
        let absmax = id + 8 + 4;
        let absmin = absmax + ABS_CNT * 4;

        for range in &self.abs_ranges {
            let axis = range.axis as usize;
            if axis >= ABS_CNT {
                continue;
            }
            let max_at = absmax + axis * 4;
            let min_at = absmin + axis * 4;
            data[max_at..max_at + 4].copy_from_slice(&range.max.to_ne_bytes());
            data[min_at..min_at + 4].copy_from_slice(&range.min.to_ne_bytes());
        }

        data
    }
}
