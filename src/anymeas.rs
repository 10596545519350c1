//! AnyMeas mode: raw ADC measurements
//!
//! In AnyMeas mode the Pinnacle stops tracking and instead measures the
//! sensor lines selected by a pair of 32-bit toggle/polarity masks.  The
//! data-ready pin signals when a measurement has completed.

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::InputPin;

use crate::interface::Interface;
use crate::registers::*;
use crate::{DataMode, Error, PinnacleTouch, Result};

/// Enables a built-in reference capacitor (~0.5pF)
pub const MUX_REF1: u8 = 0x10;
/// Enables a built-in reference capacitor (~0.25pF)
pub const MUX_REF0: u8 = 0x08;
/// Enables the PNP sense line
pub const MUX_PNP: u8 = 0x04;
/// Enables the NPN sense line
pub const MUX_NPN: u8 = 0x01;

/// Repeat measurements (needed for more than one measurement)
pub const CTRL_REPEAT: u8 = 0x80;
/// Enter low power mode after the measurements complete
pub const CTRL_PWR_IDLE: u8 = 0x40;

/// Register block written by [`PinnacleTouch::anymeas_mode_config`]
const ANYMEAS_CONFIG_LEN: usize = 10;

/// ADC gain in AnyMeas mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AnyMeasGain {
    /// Around 100% gain
    Gain100 = 0xC0,
    /// Around 133% gain
    Gain133 = 0x80,
    /// Around 166% gain
    Gain166 = 0x40,
    /// Around 200% gain
    Gain200 = 0x00,
}

/// Toggle frequency in AnyMeas mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AnyMeasFreq {
    /// Around 500,000Hz
    Freq0 = 0x02,
    /// Around 444,444Hz
    Freq1 = 0x03,
    /// Around 400,000Hz
    Freq2 = 0x04,
    /// Around 363,636Hz
    Freq3 = 0x05,
    /// Around 333,333Hz
    Freq4 = 0x06,
    /// Around 307,692Hz
    Freq5 = 0x07,
    /// Around 267,000Hz
    Freq6 = 0x09,
    /// Around 235,000Hz
    Freq7 = 0x0B,
}

/// AnyMeas measurement options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnyMeasConfig {
    pub gain: AnyMeasGain,
    pub frequency: AnyMeasFreq,
    /// ADC samples per measurement: 128, 256 or 384 (512 selects 384)
    pub sample_length: u16,
    /// Sense line and reference capacitor selection (see `MUX_xxx`)
    pub mux_ctrl: u8,
    /// Toggle aperture width in nanoseconds, 250 to 1875 in steps of 125
    pub aperture_width: u16,
    /// Measurement count, optionally with `CTRL_REPEAT`/`CTRL_PWR_IDLE`
    pub ctrl_pwr_cnt: u8,
}

impl AnyMeasConfig {
    pub const fn new() -> Self {
        Self {
            gain: AnyMeasGain::Gain200,
            frequency: AnyMeasFreq::Freq0,
            sample_length: 512,
            mux_ctrl: MUX_PNP,
            aperture_width: 500,
            ctrl_pwr_cnt: 1,
        }
    }

    /// Contents of the register block starting at `FEED_CONFIG_2`
    pub(crate) fn register_block(self) -> [u8; ANYMEAS_CONFIG_LEN] {
        let sample_length = (self.sample_length / 128).clamp(1, 3) as u8;
        let aperture = (self.aperture_width / 125).clamp(2, 15) as u8;
        [
            self.gain as u8 | self.frequency as u8,
            sample_length,
            self.mux_ctrl,
            0,
            aperture,
            0,
            19,
            0,
            0,
            self.ctrl_pwr_cnt,
        ]
    }
}

impl Default for AnyMeasConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl<IFACE, DR, D> PinnacleTouch<IFACE, DR, D>
where
    IFACE: Interface,
    DR: InputPin,
    D: DelayUs<u32>,
{
    pub(crate) fn enter_anymeas(&mut self) -> Result<()> {
        if self.dr_pin.is_none() {
            return Err(Error::NoDataReadyPin);
        }
        let sys_config = self.interface.read_register(SYS_CONFIG)? & !SYS_CONFIG_ANYMEAS;
        self.interface
            .write_register(SYS_CONFIG, sys_config | SYS_CONFIG_ANYMEAS_MODE)?;
        // let pending tracking computations expire
        self.delay.delay_us(10_000);
        self.write_anymeas_config(AnyMeasConfig::new())?;
        self.mode = DataMode::AnyMeas;
        Ok(())
    }

    /// Configure AnyMeas measurements
    ///
    /// Only has an effect in AnyMeas mode.
    pub fn anymeas_mode_config(&mut self, config: AnyMeasConfig) -> Result<()> {
        if self.mode != DataMode::AnyMeas {
            return Ok(());
        }
        self.write_anymeas_config(config)
    }

    fn write_anymeas_config(&mut self, config: AnyMeasConfig) -> Result<()> {
        self.interface
            .write_registers(FEED_CONFIG_2, &config.register_block())?;
        self.interface.write_registers(ANYMEAS_TOGGLE, &[0u8; 8])?;
        self.clear_status_flags()
    }

    /// Start a measurement of the lines selected by `bits_to_toggle`
    ///
    /// Only has an effect in AnyMeas mode.
    pub fn start_measure_adc(&mut self, bits_to_toggle: u32, toggle_polarity: u32) -> Result<()> {
        if self.mode != DataMode::AnyMeas {
            return Ok(());
        }
        let mut tog_pol = [0u8; 8];
        tog_pol[..4].copy_from_slice(&bits_to_toggle.to_be_bytes());
        tog_pol[4..].copy_from_slice(&toggle_polarity.to_be_bytes());
        self.interface.write_registers(ANYMEAS_TOGGLE, &tog_pol)?;
        let sys_config = self.interface.read_register(SYS_CONFIG)?;
        self.interface
            .write_register(SYS_CONFIG, sys_config | SYS_CONFIG_ANYMEAS)
    }

    /// Fetch the result of a measurement started with `start_measure_adc()`
    ///
    /// Returns `Ok(None)` outside AnyMeas mode or while the measurement is
    /// still running.
    pub fn get_measure_adc(&mut self) -> Result<Option<i16>> {
        if self.mode != DataMode::AnyMeas {
            return Ok(None);
        }
        if !self.available()? {
            return Ok(None);
        }
        let mut rd_buf = [0u8; 2];
        self.interface.read_registers(ADC_RESULT, &mut rd_buf)?;
        self.clear_status_flags()?;
        Ok(Some(i16::from_le_bytes(rd_buf)))
    }

    /// Start a measurement and wait for its result
    ///
    /// Returns `Ok(None)` outside AnyMeas mode.
    pub fn measure_adc(
        &mut self,
        bits_to_toggle: u32,
        toggle_polarity: u32,
    ) -> Result<Option<i16>> {
        if self.mode != DataMode::AnyMeas {
            return Ok(None);
        }
        self.start_measure_adc(bits_to_toggle, toggle_polarity)?;
        let mut result = None;
        self.poll_until(|touch| {
            result = touch.get_measure_adc()?;
            Ok(result.is_some())
        })?;
        Ok(result)
    }
}
