//! Register IDs for the Pinnacle ASIC
//!
//! Direct registers are reached with the Register Access Protocol (RAP) and
//! occupy a 5-bit address space.  Extended registers are reached indirectly
//! through the ERA window registers (`ERA_VALUE`, `ERA_ADDR_HIGH`,
//! `ERA_ADDR_LOW`, `ERA_CONTROL`).

macro_rules! register_id {
    ($name:ident, $addr:literal) => {
        register_id!($name, u8, $addr);
    };
    ($name:ident, $sz:ty, $addr:literal) => {
        $crate::paste::paste! {
            pub const [<$name:upper>]: $sz = $addr;
        }
    };
}

// Direct (RAP) registers
register_id!(FIRMWARE_ID, 0x00);
register_id!(FIRMWARE_VERSION, 0x01);
register_id!(STATUS, 0x02);
register_id!(SYS_CONFIG, 0x03);
register_id!(FEED_CONFIG_1, 0x04);
register_id!(FEED_CONFIG_2, 0x05);
register_id!(FEED_CONFIG_3, 0x06);
register_id!(CAL_CONFIG, 0x07);
register_id!(SAMPLE_RATE, 0x09);
register_id!(Z_IDLE, 0x0A);
register_id!(ADC_RESULT, 0x11);
register_id!(PACKET_BYTE_0, 0x12);
register_id!(ANYMEAS_TOGGLE, 0x13);
register_id!(ERA_VALUE, 0x1B);
register_id!(ERA_ADDR_HIGH, 0x1C);
register_id!(ERA_ADDR_LOW, 0x1D);
register_id!(ERA_CONTROL, 0x1E);
register_id!(HCO_ID, 0x1F);

// Extended (ERA) registers
register_id!(ERA_FINGER_STYLUS, u16, 0x00EB);
register_id!(ERA_X_AXIS_WIDE_Z_MIN, u16, 0x0149);
register_id!(ERA_Y_AXIS_WIDE_Z_MIN, u16, 0x0168);
register_id!(ERA_ADC_GAIN, u16, 0x0187);
register_id!(ERA_TIMER_RELOAD_0, u16, 0x019E);
register_id!(ERA_TIMER_RELOAD_1, u16, 0x019F);
register_id!(ERA_CALIBRATION_MATRIX, u16, 0x01DF);

/// Number of direct registers
pub const RAP_REGISTER_COUNT: usize = 32;

/// Mask applied to a direct register address on the wire
pub const RAP_ADDR_MASK: u8 = 0x1F;
/// Command prefix for a direct register read
pub const RAP_READ: u8 = 0xA0;
/// Command prefix for a direct register write
pub const RAP_WRITE: u8 = 0x80;

/// Expected contents of `FIRMWARE_ID`
pub const EXPECTED_FIRMWARE_ID: u8 = 7;
/// Expected contents of `FIRMWARE_VERSION`
pub const EXPECTED_FIRMWARE_VERSION: u8 = 58;

/// `ERA_CONTROL` command: read one byte
pub const ERA_CMD_READ: u8 = 0x01;
/// `ERA_CONTROL` command: write one byte
pub const ERA_CMD_WRITE: u8 = 0x02;
/// `ERA_CONTROL` command: read one byte, then advance the address
pub const ERA_CMD_READ_AUTO_INC: u8 = 0x05;

/// `STATUS`: software data ready
pub const STATUS_DATA_READY: u8 = 1 << 2;

/// `SYS_CONFIG`: shutdown
pub const SYS_CONFIG_SHUTDOWN: u8 = 1 << 1;
/// `SYS_CONFIG`: allow sleep
pub const SYS_CONFIG_ALLOW_SLEEP: u8 = 1 << 2;
/// `SYS_CONFIG`: AnyMeas mode select and measurement start bits
pub const SYS_CONFIG_ANYMEAS: u8 = 0x18;
/// `SYS_CONFIG`: AnyMeas mode select
pub const SYS_CONFIG_ANYMEAS_MODE: u8 = 0x08;

/// `FEED_CONFIG_1`: feed enable
pub const FEED_CONFIG_1_FEED_ENABLE: u8 = 1 << 0;
/// `FEED_CONFIG_1`: data mode field (relative / absolute)
pub const FEED_CONFIG_1_DATA_MODE: u8 = 0b110;
/// `FEED_CONFIG_1`: invert X axis (absolute mode)
pub const FEED_CONFIG_1_INVERT_X: u8 = 1 << 6;
/// `FEED_CONFIG_1`: invert Y axis (absolute mode)
pub const FEED_CONFIG_1_INVERT_Y: u8 = 1 << 7;

/// `FEED_CONFIG_2`: intellimouse (scroll byte) enable
pub const FEED_CONFIG_2_INTELLIMOUSE: u8 = 1 << 0;
/// `FEED_CONFIG_2`: all taps disable
pub const FEED_CONFIG_2_TAPS_DISABLE: u8 = 1 << 1;
/// `FEED_CONFIG_2`: secondary tap disable
pub const FEED_CONFIG_2_SECONDARY_TAP_DISABLE: u8 = 1 << 2;
/// `FEED_CONFIG_2`: glide extend disable
pub const FEED_CONFIG_2_GLIDE_EXTEND_DISABLE: u8 = 1 << 4;
/// `FEED_CONFIG_2`: swap X and Y (90 degree rotation)
pub const FEED_CONFIG_2_ROTATE_90: u8 = 1 << 7;

/// `FEED_CONFIG_3` value selecting the fast (200/300 Hz) sample timer
pub const FEED_CONFIG_3_FAST_TIMER: u8 = 10;

/// `CAL_CONFIG`: calibration running / request
pub const CAL_CONFIG_RUN: u8 = 1 << 0;
/// `CAL_CONFIG` value enabling every compensation without running
pub const CAL_CONFIG_ALL_COMPENSATIONS: u8 = 0x1E;

/// Timer reload value for 300 Hz sampling
pub const TIMER_RELOAD_300HZ: u8 = 6;
/// Timer reload value for 200 Hz sampling
pub const TIMER_RELOAD_200HZ: u8 = 9;
/// Timer reload value for the regular sample timer
pub const TIMER_RELOAD_DEFAULT: u8 = 19;

/// Default absolute mode Z-idle packet count
pub const DEFAULT_Z_IDLE: u8 = 30;
