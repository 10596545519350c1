//! Touch reports
//!
//! Reports are read from the packet registers starting at `PACKET_BYTE_0`.
//! Relative mode uses four bytes, absolute mode six.

/// Relative mode button: primary (left)
pub const BUTTON_PRIMARY: u8 = 1 << 0;
/// Relative mode button: secondary (right)
pub const BUTTON_SECONDARY: u8 = 1 << 1;
/// Relative mode button: auxiliary (middle)
pub const BUTTON_AUXILIARY: u8 = 1 << 2;

/// A decoded report
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Report {
    Relative(RelativeReport),
    Absolute(AbsoluteReport),
}

/// Relative (mouse) mode report
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RelativeReport {
    /// Button states (see `BUTTON_xxx`)
    pub buttons: u8,
    /// X movement since the last report
    pub x: i8,
    /// Y movement since the last report
    pub y: i8,
    /// Scroll wheel movement, only reported with intellimouse enabled
    pub scroll: i8,
}

impl RelativeReport {
    /// Number of packet bytes in a relative report
    pub const LEN: usize = 4;

    /// Decode the raw packet bytes
    pub const fn from_bytes(raw: [u8; Self::LEN]) -> Self {
        Self {
            buttons: raw[0] & 0x07,
            x: raw[1] as i8,
            y: raw[2] as i8,
            scroll: raw[3] as i8,
        }
    }

    /// The report in its packet byte layout, as used by USB HID mice
    pub const fn to_bytes(self) -> [u8; Self::LEN] {
        [self.buttons, self.x as u8, self.y as u8, self.scroll as u8]
    }

    pub const fn primary(&self) -> bool {
        self.buttons & BUTTON_PRIMARY != 0
    }

    pub const fn secondary(&self) -> bool {
        self.buttons & BUTTON_SECONDARY != 0
    }

    pub const fn auxiliary(&self) -> bool {
        self.buttons & BUTTON_AUXILIARY != 0
    }
}

/// Absolute mode report
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AbsoluteReport {
    /// Button states (6 bits)
    pub buttons: u8,
    /// 12-bit X position
    pub x: u16,
    /// 12-bit Y position
    pub y: u16,
    /// Z level (6 bits); 0 once the touch has ended
    pub z: u8,
}

impl AbsoluteReport {
    /// Number of packet bytes in an absolute report
    pub const LEN: usize = 6;

    /// Decode the raw packet bytes
    ///
    /// Byte 4 carries the high nibbles of X (low nibble) and Y (high
    /// nibble).  Byte 1 is not used.
    pub const fn from_bytes(raw: [u8; Self::LEN]) -> Self {
        Self {
            buttons: raw[0] & 0x3F,
            x: raw[2] as u16 | ((raw[4] as u16 & 0x0F) << 8),
            y: raw[3] as u16 | ((raw[4] as u16 & 0xF0) << 4),
            z: raw[5] & 0x3F,
        }
    }

    /// True while a finger or stylus is on the trackpad
    pub const fn is_touching(&self) -> bool {
        self.z != 0
    }
}
