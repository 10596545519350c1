//! Cirque Pinnacle capacitive touch controller device driver
//!
//! This crate provides a device driver for the Cirque Pinnacle ASIC used on
//! Cirque's circular GlidePoint trackpads.
//!
//! The Pinnacle connects to the target via SPI or I2C plus an optional
//! data-ready (DR) GPIO.  The [`embedded_hal`](https://docs.rs/embedded-hal)
//! `blocking::spi`, `blocking::i2c`, `blocking::delay` and `digital::v2`
//! interfaces are used, so should work with any target that provides these.
//!
//! A Pinnacle device on SPI is created with:
//!
//! ```rust,ignore
//!     let cs_pin = pins.gpio17.into_push_pull_output();
//!     let dr_pin = pins.gpio7.into_floating_input();
//!     let mut trackpad = cirque_pinnacle::PinnacleTouch::new_spi(spi, cs_pin, Some(dr_pin), delay)?;
//! ```
//!
//! or, on I2C and without the data-ready line:
//!
//! ```rust,ignore
//!     let mut trackpad = cirque_pinnacle::PinnacleTouch::<_, cirque_pinnacle::NoPin, _>::new_i2c(
//!         i2c,
//!         cirque_pinnacle::DEFAULT_I2C_ADDR,
//!         None,
//!         delay,
//!     )?;
//! ```
//!
//! Construction checks the firmware identity registers and fails with
//! [`Error::NotResponding`] if no Pinnacle answers.  The device starts in
//! relative (mouse) mode with the feed enabled at 100 samples per second.
//!
//! Reports are polled with `report()`:
//!
//! ```rust,ignore
//!     trackpad.set_data_mode(cirque_pinnacle::DataMode::Absolute)?;
//!     if let Some(cirque_pinnacle::Report::Absolute(touch)) = trackpad.report(true)? {
//!         info!("{},{} z={} buttons={:b}", touch.x, touch.y, touch.z, touch.buttons);
//!     }
//! ```
//!
//! Settings that live in the extended register space (sample rate timers,
//! ADC gain, calibration matrix, ...) are reached through Extended Register
//! Access (ERA).  The feed is paused for the duration of every ERA
//! transaction and put back the way it was found afterwards.
//!
//! Enable the `defmt` feature for `defmt::Format` implementations and driver
//! log output.

#![no_std]

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::blocking::{i2c, spi};
use embedded_hal::digital::v2::{InputPin, OutputPin};
use paste;

mod anymeas;
mod era;
mod interface;
pub mod registers;
mod report;

#[cfg(test)]
mod testing;

pub use anymeas::{AnyMeasConfig, AnyMeasFreq, AnyMeasGain};
pub use anymeas::{CTRL_PWR_IDLE, CTRL_REPEAT, MUX_NPN, MUX_PNP, MUX_REF0, MUX_REF1};
pub use interface::{I2cInterface, Interface, SpiInterface, DEFAULT_I2C_ADDR};
pub use report::{AbsoluteReport, RelativeReport, Report};
pub use report::{BUTTON_AUXILIARY, BUTTON_PRIMARY, BUTTON_SECONDARY};

use registers::*;

/// Errors produced by the Pinnacle device
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// An error accessing the chip-select or data-ready GPIO pins
    GPIOError,
    /// An error accessing the SPI interface
    SPIError,
    /// An error accessing the I2C interface
    I2CError,
    /// The firmware identity registers did not match a Pinnacle
    NotResponding,
    /// Timeout waiting for the device to finish a command
    Timeout,
    /// AnyMeas mode was requested without a data-ready pin
    NoDataReadyPin,
    /// A register burst was longer than the register file
    InvalidLength,
}

pub type Result<T> = core::result::Result<T, Error>;

/// Sample rates accepted by [`PinnacleTouch::set_sample_rate`]
pub const SAMPLE_RATES: [u16; 8] = [10, 20, 40, 60, 80, 100, 200, 300];

/// Sample rate used at start-up and as the fallback for unsupported values
pub const DEFAULT_SAMPLE_RATE: u16 = 100;

/// Number of entries in the calibration matrix
pub const CALIBRATION_MATRIX_LEN: usize = 46;

/// Data reporting mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DataMode {
    /// Relative (mouse) mode: button state plus X/Y/scroll deltas
    Relative = 0x00,
    /// AnyMeas mode: raw ADC measurements, requires the data-ready pin
    AnyMeas = 0x01,
    /// Absolute mode: button state plus 12-bit X/Y positions and Z
    Absolute = 0x02,
}

/// Placeholder for a missing data-ready pin
///
/// Use as the `DR` type parameter when constructing with `None`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPin;

impl InputPin for NoPin {
    type Error = core::convert::Infallible;

    fn is_high(&self) -> core::result::Result<bool, Self::Error> {
        Ok(false)
    }

    fn is_low(&self) -> core::result::Result<bool, Self::Error> {
        Ok(true)
    }
}

/// Driver configuration
///
/// Every busy-wait (ERA command completion, calibration, AnyMeas
/// measurement) polls at most `busy_poll_limit` times, waiting
/// `busy_poll_interval_us` between polls, before giving up with
/// [`Error::Timeout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub(crate) busy_poll_limit: u32,
    pub(crate) busy_poll_interval_us: u32,
}

impl Config {
    /// Default configuration: up to 100000 polls, 10us apart
    pub const fn new() -> Self {
        Self {
            busy_poll_limit: 100_000,
            busy_poll_interval_us: 10,
        }
    }

    /// Sets the maximum number of polls per busy-wait
    #[must_use]
    pub const fn with_busy_poll_limit(mut self, limit: u32) -> Self {
        self.busy_poll_limit = limit;
        self
    }

    /// Sets the wait between two polls, in microseconds
    #[must_use]
    pub const fn with_busy_poll_interval_us(mut self, us: u32) -> Self {
        self.busy_poll_interval_us = us;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Relative mode options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RelativeConfig {
    /// Swap X and Y (rotate the trackpad by 90 degrees)
    pub rotate90: bool,
    /// Report taps as button presses
    pub taps: bool,
    /// Report taps in the top right corner as secondary button presses
    pub secondary_tap: bool,
    /// Keep moving for a while after the finger reaches the edge
    pub glide_extend: bool,
    /// Report the scroll wheel byte
    pub intellimouse: bool,
}

impl RelativeConfig {
    /// Power-on defaults: taps, secondary tap and glide extend enabled
    pub const fn new() -> Self {
        Self {
            rotate90: false,
            taps: true,
            secondary_tap: true,
            glide_extend: true,
            intellimouse: false,
        }
    }

    /// Contents of the `FEED_CONFIG_2` register
    ///
    /// The tap and glide options are disable bits on the chip.
    pub const fn feed_config_2(self) -> u8 {
        let mut value = 0;
        if self.rotate90 {
            value |= FEED_CONFIG_2_ROTATE_90;
        }
        if !self.glide_extend {
            value |= FEED_CONFIG_2_GLIDE_EXTEND_DISABLE;
        }
        if !self.secondary_tap {
            value |= FEED_CONFIG_2_SECONDARY_TAP_DISABLE;
        }
        if !self.taps {
            value |= FEED_CONFIG_2_TAPS_DISABLE;
        }
        if self.intellimouse {
            value |= FEED_CONFIG_2_INTELLIMOUSE;
        }
        value
    }
}

impl Default for RelativeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Absolute mode options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AbsoluteConfig {
    /// Number of empty packets reported after a touch ends (clamped to 255)
    pub z_idle_count: u32,
    /// Invert the X axis
    pub invert_x: bool,
    /// Invert the Y axis
    pub invert_y: bool,
}

impl AbsoluteConfig {
    /// 30 Z-idle packets, no axis inversion
    pub const fn new() -> Self {
        Self {
            z_idle_count: DEFAULT_Z_IDLE as u32,
            invert_x: false,
            invert_y: false,
        }
    }
}

impl Default for AbsoluteConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Compensations applied when the Pinnacle calibrates itself
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationConfig {
    pub tap: bool,
    pub track_error: bool,
    pub nerd: bool,
    pub background: bool,
}

impl CalibrationConfig {
    /// All compensations enabled
    pub const fn new() -> Self {
        Self {
            tap: true,
            track_error: true,
            nerd: true,
            background: true,
        }
    }

    /// Contents of the `CAL_CONFIG` register
    pub const fn cal_config(self, run: bool) -> u8 {
        ((self.tap as u8) << 4)
            | ((self.track_error as u8) << 3)
            | ((self.nerd as u8) << 2)
            | ((self.background as u8) << 1)
            | run as u8
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// ADC gain used while tracking (relative and absolute modes)
///
/// `Sensitivity0` is the most sensitive setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AdcGain {
    Sensitivity0 = 0,
    Sensitivity1 = 1,
    Sensitivity2 = 2,
    Sensitivity3 = 3,
}

/// Pinnacle driver
///
/// Owns the bus interface, the optional data-ready pin and a delay provider.
/// The session state (data mode, sample rate) is tracked here, so one
/// instance must own the chip exclusively.
pub struct PinnacleTouch<IFACE, DR, D> {
    interface: IFACE,
    dr_pin: Option<DR>,
    delay: D,
    config: Config,
    mode: DataMode,
    sample_rate: u16,
}

/// Pinnacle on a SPI bus
pub type PinnacleTouchSpi<SPI, CS, DR, D> = PinnacleTouch<SpiInterface<SPI, CS>, DR, D>;

/// Pinnacle on an I2C bus
pub type PinnacleTouchI2c<I2C, DR, D> = PinnacleTouch<I2cInterface<I2C>, DR, D>;

impl<IFACE, DR, D> PinnacleTouch<IFACE, DR, D> {
    /// Current data reporting mode
    pub fn data_mode(&self) -> DataMode {
        self.mode
    }

    /// Current sample rate in samples per second
    pub fn sample_rate(&self) -> u16 {
        self.sample_rate
    }

    /// Driver configuration
    pub fn config(&self) -> Config {
        self.config
    }

    /// Release the bus interface, data-ready pin and delay
    pub fn release(self) -> (IFACE, Option<DR>, D) {
        (self.interface, self.dr_pin, self.delay)
    }
}

impl<SPI, CS, DR, D> PinnacleTouch<SpiInterface<SPI, CS>, DR, D>
where
    SPI: spi::Transfer<u8> + spi::Write<u8>,
    CS: OutputPin,
    DR: InputPin,
    D: DelayUs<u32>,
{
    /// Create and initialize a Pinnacle device on SPI
    ///
    /// `spi` is the SPI bus, configured for mode 1
    /// `cs_pin` is a push pull output GPIO
    /// `dr_pin` is an optional floating input GPIO
    pub fn new_spi(spi: SPI, cs_pin: CS, dr_pin: Option<DR>, delay: D) -> Result<Self> {
        Self::new(SpiInterface::new(spi, cs_pin), dr_pin, delay, Config::new())
    }
}

impl<I2C, DR, D> PinnacleTouch<I2cInterface<I2C>, DR, D>
where
    I2C: i2c::Write + i2c::Read,
    DR: InputPin,
    D: DelayUs<u32>,
{
    /// Create and initialize a Pinnacle device on I2C
    ///
    /// `addr` is the 7-bit device address, normally [`DEFAULT_I2C_ADDR`]
    /// `dr_pin` is an optional floating input GPIO
    pub fn new_i2c(i2c: I2C, addr: u8, dr_pin: Option<DR>, delay: D) -> Result<Self> {
        Self::new(I2cInterface::new(i2c, addr), dr_pin, delay, Config::new())
    }
}

impl<IFACE, DR, D> PinnacleTouch<IFACE, DR, D>
where
    IFACE: Interface,
    DR: InputPin,
    D: DelayUs<u32>,
{
    /// Create and initialize a Pinnacle device
    ///
    /// Fails with [`Error::NotResponding`] before touching any other register
    /// if the firmware identity does not match.
    pub fn new(interface: IFACE, dr_pin: Option<DR>, delay: D, config: Config) -> Result<Self> {
        let mut touch = PinnacleTouch {
            interface,
            dr_pin,
            delay,
            config,
            mode: DataMode::Relative,
            sample_rate: DEFAULT_SAMPLE_RATE,
        };
        touch.init()?;
        Ok(touch)
    }

    fn init(&mut self) -> Result<()> {
        let mut id = [0u8; 2];
        self.interface.read_registers(FIRMWARE_ID, &mut id)?;
        if id != [EXPECTED_FIRMWARE_ID, EXPECTED_FIRMWARE_VERSION] {
            #[cfg(feature = "defmt")]
            defmt::warn!("unexpected firmware id {=u8}, version {=u8}", id[0], id[1]);
            return Err(Error::NotResponding);
        }
        self.interface.write_register(Z_IDLE, DEFAULT_Z_IDLE)?;
        // clear reset flag, enable the relative feed, disable taps
        self.interface.write_registers(SYS_CONFIG, &[0, 1, 2])?;
        self.mode = DataMode::Relative;
        self.set_sample_rate(DEFAULT_SAMPLE_RATE)?;
        self.clear_status_flags()?;
        #[cfg(feature = "defmt")]
        defmt::debug!("pinnacle initialized");
        Ok(())
    }

    /// Test if the touch data feed is enabled
    pub fn feed_enable(&mut self) -> Result<bool> {
        Ok(self.interface.read_register(FEED_CONFIG_1)? & FEED_CONFIG_1_FEED_ENABLE != 0)
    }

    /// Enable or disable the touch data feed
    ///
    /// Only writes the register if the state changes.
    pub fn set_feed_enable(&mut self, enable: bool) -> Result<()> {
        let config1 = self.interface.read_register(FEED_CONFIG_1)?;
        if (config1 & FEED_CONFIG_1_FEED_ENABLE != 0) == enable {
            return Ok(());
        }
        let config1 = (config1 & !FEED_CONFIG_1_FEED_ENABLE) | enable as u8;
        self.interface.write_register(FEED_CONFIG_1, config1)
    }

    /// Select the data reporting mode
    ///
    /// Switching to relative or absolute mode re-enables the feed.  Switching
    /// to [`DataMode::AnyMeas`] requires the data-ready pin.
    pub fn set_data_mode(&mut self, mode: DataMode) -> Result<()> {
        match mode {
            DataMode::AnyMeas => self.enter_anymeas()?,
            DataMode::Relative | DataMode::Absolute if self.mode == DataMode::AnyMeas => {
                let sys_config = self.interface.read_register(SYS_CONFIG)? & !SYS_CONFIG_ANYMEAS;
                self.mode = mode;
                self.interface
                    .write_registers(SYS_CONFIG, &[sys_config, 1 | mode as u8, 2])?;
                self.set_sample_rate(DEFAULT_SAMPLE_RATE)?;
                self.interface
                    .write_register(CAL_CONFIG, CAL_CONFIG_ALL_COMPENSATIONS)?;
                self.interface.write_register(Z_IDLE, DEFAULT_Z_IDLE)?;
            }
            DataMode::Relative | DataMode::Absolute => {
                self.interface
                    .write_register(FEED_CONFIG_1, FEED_CONFIG_1_FEED_ENABLE | mode as u8)?;
            }
        }
        self.mode = mode;
        #[cfg(feature = "defmt")]
        defmt::debug!("data mode {}", mode);
        Ok(())
    }

    /// Test if the trackpad was customized with a hardware configuration
    pub fn hard_configured(&mut self) -> Result<bool> {
        Ok(self.interface.read_register(HCO_ID)? != 0)
    }

    /// Configure relative mode options
    pub fn relative_mode_config(&mut self, config: RelativeConfig) -> Result<()> {
        self.interface.write_register(FEED_CONFIG_2, config.feed_config_2())
    }

    /// Configure absolute mode options
    ///
    /// Leaves the feed enable and data mode bits of `FEED_CONFIG_1` untouched.
    pub fn absolute_mode_config(&mut self, config: AbsoluteConfig) -> Result<()> {
        let z_idle = config.z_idle_count.min(u8::MAX as u32) as u8;
        self.interface.write_register(Z_IDLE, z_idle)?;
        let mut config1 = self.interface.read_register(FEED_CONFIG_1)?
            & !(FEED_CONFIG_1_INVERT_X | FEED_CONFIG_1_INVERT_Y);
        if config.invert_y {
            config1 |= FEED_CONFIG_1_INVERT_Y;
        }
        if config.invert_x {
            config1 |= FEED_CONFIG_1_INVERT_X;
        }
        self.interface.write_register(FEED_CONFIG_1, config1)
    }

    /// Test if a new report is waiting
    ///
    /// Uses the data-ready pin if there is one, otherwise the status register.
    pub fn available(&mut self) -> Result<bool> {
        match &self.dr_pin {
            Some(pin) => pin.is_high().map_err(|_| Error::GPIOError),
            None => Ok(self.interface.read_register(STATUS)? & STATUS_DATA_READY != 0),
        }
    }

    /// Read the latest report
    ///
    /// With `only_new` set, returns `Ok(None)` unless a new report is waiting.
    /// Always `Ok(None)` in AnyMeas mode.
    pub fn report(&mut self, only_new: bool) -> Result<Option<Report>> {
        if self.mode == DataMode::AnyMeas {
            return Ok(None);
        }
        if only_new && !self.available()? {
            return Ok(None);
        }
        let report = if self.mode == DataMode::Absolute {
            let mut rd_buf = [0u8; AbsoluteReport::LEN];
            self.interface.read_registers(PACKET_BYTE_0, &mut rd_buf)?;
            Report::Absolute(AbsoluteReport::from_bytes(rd_buf))
        } else {
            let mut rd_buf = [0u8; RelativeReport::LEN];
            self.interface.read_registers(PACKET_BYTE_0, &mut rd_buf)?;
            Report::Relative(RelativeReport::from_bytes(rd_buf))
        };
        self.clear_status_flags()?;
        Ok(Some(report))
    }

    /// Clear the status register (data ready and command complete flags)
    ///
    /// Waits the 50us the chip needs before the next register access.
    pub fn clear_status_flags(&mut self) -> Result<()> {
        self.interface.write_register(STATUS, 0)?;
        self.delay.delay_us(50);
        Ok(())
    }

    /// Set the number of samples per second
    ///
    /// Supported rates are listed in [`SAMPLE_RATES`]; anything else selects
    /// [`DEFAULT_SAMPLE_RATE`].  Ignored in AnyMeas mode.
    pub fn set_sample_rate(&mut self, rate: u16) -> Result<()> {
        if self.mode == DataMode::AnyMeas {
            return Ok(());
        }
        let rate = match rate {
            200 | 300 => {
                self.interface
                    .write_register(FEED_CONFIG_3, FEED_CONFIG_3_FAST_TIMER)?;
                let reload = if rate == 300 {
                    TIMER_RELOAD_300HZ
                } else {
                    TIMER_RELOAD_200HZ
                };
                self.era_write(ERA_TIMER_RELOAD_0, reload)?;
                self.era_write(ERA_TIMER_RELOAD_1, reload)?;
                self.interface.write_register(SAMPLE_RATE, 0)?;
                rate
            }
            _ => {
                self.interface.write_register(FEED_CONFIG_3, 0)?;
                self.era_write(ERA_TIMER_RELOAD_0, TIMER_RELOAD_DEFAULT)?;
                self.era_write(ERA_TIMER_RELOAD_1, TIMER_RELOAD_DEFAULT)?;
                let rate = if SAMPLE_RATES.contains(&rate) {
                    rate
                } else {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("unsupported sample rate {=u16}, using 100", rate);
                    DEFAULT_SAMPLE_RATE
                };
                self.interface.write_register(SAMPLE_RATE, rate as u8)?;
                rate
            }
        };
        self.sample_rate = rate;
        Ok(())
    }

    /// Select finger and/or stylus detection and set the sample rate
    pub fn detect_finger_stylus(
        &mut self,
        enable_finger: bool,
        enable_stylus: bool,
        sample_rate: u16,
    ) -> Result<()> {
        let finger_stylus = self.era_read(ERA_FINGER_STYLUS)?
            | ((enable_stylus as u8) << 2)
            | enable_finger as u8;
        self.era_write(ERA_FINGER_STYLUS, finger_stylus)?;
        self.set_sample_rate(sample_rate)
    }

    /// Configure compensations and optionally run a calibration
    ///
    /// With `run` set, waits for the calibration to finish.  Ignored in
    /// AnyMeas mode.
    pub fn calibrate(&mut self, run: bool, config: CalibrationConfig) -> Result<()> {
        if self.mode == DataMode::AnyMeas {
            return Ok(());
        }
        self.interface
            .write_register(CAL_CONFIG, config.cal_config(run))?;
        if run {
            self.poll_until(|touch| {
                Ok(touch.interface.read_register(CAL_CONFIG)? & CAL_CONFIG_RUN == 0)
            })?;
            self.clear_status_flags()?;
        }
        Ok(())
    }

    /// Read the 46 entry calibration matrix
    pub fn calibration_matrix(&mut self) -> Result<[i16; CALIBRATION_MATRIX_LEN]> {
        let mut rd_buf = [0u8; CALIBRATION_MATRIX_LEN * 2];
        self.era_read_bytes(ERA_CALIBRATION_MATRIX, &mut rd_buf)?;
        let mut matrix = [0i16; CALIBRATION_MATRIX_LEN];
        for (entry, bytes) in matrix.iter_mut().zip(rd_buf.chunks_exact(2)) {
            *entry = i16::from_le_bytes([bytes[0], bytes[1]]);
        }
        Ok(matrix)
    }

    /// Write the calibration matrix
    ///
    /// Short matrices are padded with zeros, extra entries are ignored.
    pub fn set_calibration_matrix(&mut self, matrix: &[i16]) -> Result<()> {
        self.with_feed_paused(|touch| {
            for index in 0..CALIBRATION_MATRIX_LEN {
                let bytes = matrix.get(index).copied().unwrap_or(0).to_le_bytes();
                let addr = ERA_CALIBRATION_MATRIX + (index as u16) * 2;
                touch.era_write_paused(addr, bytes[0])?;
                touch.era_write_paused(addr + 1, bytes[1])?;
            }
            Ok(())
        })
    }

    /// Set the tracking ADC gain
    pub fn set_adc_gain(&mut self, gain: AdcGain) -> Result<()> {
        let value = (self.era_read(ERA_ADC_GAIN)? & 0x3F) | ((gain as u8) << 6);
        self.era_write(ERA_ADC_GAIN, value)
    }

    /// Change the wide Z thresholds used to detect fingers near the edges
    ///
    /// The chip defaults are 0x04 (X axis) and 0x03 (Y axis).
    pub fn tune_edge_sensitivity(
        &mut self,
        x_axis_wide_z_min: u8,
        y_axis_wide_z_min: u8,
    ) -> Result<()> {
        self.era_write(ERA_X_AXIS_WIDE_Z_MIN, x_axis_wide_z_min)?;
        self.era_write(ERA_Y_AXIS_WIDE_Z_MIN, y_axis_wide_z_min)
    }

    /// Call `done` until it returns `true`, at most `busy_poll_limit` times
    pub(crate) fn poll_until<F>(&mut self, mut done: F) -> Result<()>
    where
        F: FnMut(&mut Self) -> Result<bool>,
    {
        for _ in 0..self.config.busy_poll_limit.max(1) {
            if done(self)? {
                return Ok(());
            }
            if self.config.busy_poll_interval_us > 0 {
                self.delay.delay_us(self.config.busy_poll_interval_us);
            }
        }
        #[cfg(feature = "defmt")]
        defmt::warn!("pinnacle busy after {=u32} polls", self.config.busy_poll_limit);
        Err(Error::Timeout)
    }
}

macro_rules! sys_config_flag {
    ($name:ident, $mask:ident) => {
        $crate::paste::paste! {
            impl<IFACE, DR, D> PinnacleTouch<IFACE, DR, D>
            where
                IFACE: Interface,
            {
                #[doc="Read the " [<$mask:upper>] " flag"]
                pub fn [<$name:lower>](&mut self) -> Result<bool> {
                    Ok(self.interface.read_register(SYS_CONFIG)? & $mask != 0)
                }

                #[doc="Write the " [<$mask:upper>] " flag"]
                pub fn [<set_ $name:lower>](&mut self, enable: bool) -> Result<()> {
                    let value = self.interface.read_register(SYS_CONFIG)? & !$mask;
                    let value = if enable { value | $mask } else { value };
                    self.interface.write_register(SYS_CONFIG, value)
                }
            }
        }
    };
}

sys_config_flag!(allow_sleep, SYS_CONFIG_ALLOW_SLEEP);
sys_config_flag!(shutdown, SYS_CONFIG_SHUTDOWN);
