//! Simulated Pinnacle for unit tests
//!
//! `FakeChip` models the direct register file, the extended register space
//! and the ERA command engine.  `FakeSpi`, `FakeCs`, `FakeI2c`, `FakeDr` and
//! `FakeDelay` put the `embedded-hal` blocking traits in front of it so the
//! real bus adapters are exercised byte for byte.

extern crate std;

use core::cell::RefCell;
use core::convert::Infallible;
use std::rc::Rc;
use std::vec;
use std::vec::Vec;

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::blocking::{i2c, spi};
use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::interface::{I2cInterface, SpiInterface, DEFAULT_I2C_ADDR};
use crate::registers::*;
use crate::{Config, PinnacleTouch, Result};

/// A register-level event seen by the simulated chip
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Access {
    Read(u8),
    Write(u8, u8),
    Delay(u32),
}

/// One I2C transfer as seen on the wire
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum I2cFrame {
    Write(u8, Vec<u8>),
    Read(u8, usize),
}

/// Injected bus fault
#[derive(Debug)]
pub(crate) struct BusFault;

struct State {
    regs: [u8; RAP_REGISTER_COUNT],
    ext: Vec<u8>,
    log: Vec<Access>,
    spi_frames: Vec<Vec<u8>>,
    i2c_frames: Vec<I2cFrame>,
    cs_asserted: bool,
    cs_cycles: usize,
    dr_level: bool,
    fail_next_transfer: bool,
    fail_write_to: Option<u8>,
    era_busy_polls: u32,
    era_pending_polls: u32,
    era_stuck: bool,
    era_cmd_while_feeding: bool,
    cal_busy_polls: u32,
    cal_pending_polls: u32,
    cal_stuck: bool,
}

impl State {
    fn read(&mut self, reg: u8) -> u8 {
        let reg = reg & RAP_ADDR_MASK;
        self.log.push(Access::Read(reg));
        match reg {
            ERA_CONTROL if self.era_stuck => {}
            ERA_CONTROL if self.era_pending_polls > 0 => self.era_pending_polls -= 1,
            ERA_CONTROL => self.regs[ERA_CONTROL as usize] = 0,
            CAL_CONFIG if self.cal_stuck => {}
            CAL_CONFIG if self.cal_pending_polls > 0 => self.cal_pending_polls -= 1,
            CAL_CONFIG => self.regs[CAL_CONFIG as usize] &= !CAL_CONFIG_RUN,
            _ => {}
        }
        self.regs[reg as usize]
    }

    fn write(&mut self, reg: u8, value: u8) -> core::result::Result<(), BusFault> {
        let reg = reg & RAP_ADDR_MASK;
        if self.fail_write_to == Some(reg) {
            self.fail_write_to = None;
            return Err(BusFault);
        }
        self.log.push(Access::Write(reg, value));
        self.regs[reg as usize] = value;
        match reg {
            ERA_CONTROL if value != 0 => self.run_era_command(value),
            CAL_CONFIG if value & CAL_CONFIG_RUN != 0 => {
                self.cal_pending_polls = self.cal_busy_polls;
            }
            _ => {}
        }
        Ok(())
    }

    fn era_address(&self) -> u16 {
        u16::from_be_bytes([
            self.regs[ERA_ADDR_HIGH as usize],
            self.regs[ERA_ADDR_LOW as usize],
        ])
    }

    fn run_era_command(&mut self, cmd: u8) {
        if self.regs[FEED_CONFIG_1 as usize] & FEED_CONFIG_1_FEED_ENABLE != 0 {
            self.era_cmd_while_feeding = true;
        }
        let addr = self.era_address();
        match cmd {
            ERA_CMD_READ => self.regs[ERA_VALUE as usize] = self.ext[addr as usize],
            ERA_CMD_READ_AUTO_INC => {
                self.regs[ERA_VALUE as usize] = self.ext[addr as usize];
                let [high, low] = addr.wrapping_add(1).to_be_bytes();
                self.regs[ERA_ADDR_HIGH as usize] = high;
                self.regs[ERA_ADDR_LOW as usize] = low;
            }
            ERA_CMD_WRITE => self.ext[addr as usize] = self.regs[ERA_VALUE as usize],
            _ => {}
        }
        // command complete
        self.regs[STATUS as usize] |= 1 << 3;
        self.era_pending_polls = self.era_busy_polls;
    }

    fn begin_transfer(&mut self) -> core::result::Result<(), BusFault> {
        if self.fail_next_transfer {
            self.fail_next_transfer = false;
            return Err(BusFault);
        }
        Ok(())
    }
}

/// Shared handle to a simulated Pinnacle
#[derive(Clone)]
pub(crate) struct FakeChip(Rc<RefCell<State>>);

impl FakeChip {
    pub(crate) fn new() -> Self {
        let mut regs = [0u8; RAP_REGISTER_COUNT];
        regs[FIRMWARE_ID as usize] = EXPECTED_FIRMWARE_ID;
        regs[FIRMWARE_VERSION as usize] = EXPECTED_FIRMWARE_VERSION;
        Self(Rc::new(RefCell::new(State {
            regs,
            ext: vec![0u8; 0x1_0000],
            log: Vec::new(),
            spi_frames: Vec::new(),
            i2c_frames: Vec::new(),
            cs_asserted: false,
            cs_cycles: 0,
            dr_level: false,
            fail_next_transfer: false,
            fail_write_to: None,
            era_busy_polls: 2,
            era_pending_polls: 0,
            era_stuck: false,
            era_cmd_while_feeding: false,
            cal_busy_polls: 2,
            cal_pending_polls: 0,
            cal_stuck: false,
        })))
    }

    pub(crate) fn with_reg(self, reg: u8, value: u8) -> Self {
        self.set_reg(reg, value);
        self
    }

    pub(crate) fn set_reg(&self, reg: u8, value: u8) {
        self.0.borrow_mut().regs[reg as usize] = value;
    }

    pub(crate) fn reg(&self, reg: u8) -> u8 {
        self.0.borrow().regs[reg as usize]
    }

    pub(crate) fn set_ext(&self, addr: u16, value: u8) {
        self.0.borrow_mut().ext[addr as usize] = value;
    }

    pub(crate) fn ext(&self, addr: u16) -> u8 {
        self.0.borrow().ext[addr as usize]
    }

    pub(crate) fn set_data_ready(&self, level: bool) {
        self.0.borrow_mut().dr_level = level;
    }

    /// Make the busy flag stay set forever
    pub(crate) fn hang_era(&self) {
        self.0.borrow_mut().era_stuck = true;
    }

    /// Make a started calibration never finish
    pub(crate) fn hang_calibration(&self) {
        self.0.borrow_mut().cal_stuck = true;
    }

    pub(crate) fn fail_next_transfer(&self) {
        self.0.borrow_mut().fail_next_transfer = true;
    }

    /// Fail the next write that targets `reg`
    pub(crate) fn fail_write_to(&self, reg: u8) {
        self.0.borrow_mut().fail_write_to = Some(reg);
    }

    pub(crate) fn era_cmd_while_feeding(&self) -> bool {
        self.0.borrow().era_cmd_while_feeding
    }

    pub(crate) fn log(&self) -> Vec<Access> {
        self.0.borrow().log.clone()
    }

    pub(crate) fn clear_log(&self) {
        let mut state = self.0.borrow_mut();
        state.log.clear();
        state.spi_frames.clear();
        state.i2c_frames.clear();
    }

    pub(crate) fn writes(&self) -> Vec<(u8, u8)> {
        self.0
            .borrow()
            .log
            .iter()
            .filter_map(|access| match access {
                Access::Write(reg, value) => Some((*reg, *value)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn writes_to(&self, reg: u8) -> Vec<u8> {
        self.writes()
            .into_iter()
            .filter(|(r, _)| *r == reg)
            .map(|(_, v)| v)
            .collect()
    }

    pub(crate) fn spi_frames(&self) -> Vec<Vec<u8>> {
        self.0.borrow().spi_frames.clone()
    }

    pub(crate) fn i2c_frames(&self) -> Vec<I2cFrame> {
        self.0.borrow().i2c_frames.clone()
    }

    pub(crate) fn cs_asserted(&self) -> bool {
        self.0.borrow().cs_asserted
    }

    pub(crate) fn cs_cycles(&self) -> usize {
        self.0.borrow().cs_cycles
    }
}

/// SPI front end of the simulated chip
pub(crate) struct FakeSpi(FakeChip);

impl FakeSpi {
    pub(crate) fn new(chip: &FakeChip) -> Self {
        Self(chip.clone())
    }
}

impl spi::Transfer<u8> for FakeSpi {
    type Error = BusFault;

    fn transfer<'w>(&mut self, words: &'w mut [u8]) -> core::result::Result<&'w [u8], BusFault> {
        let mut state = (self.0).0.borrow_mut();
        assert!(state.cs_asserted, "SPI transfer without chip select");
        state.begin_transfer()?;
        state.spi_frames.push(words.to_vec());
        let cmd = words[0];
        assert_eq!(cmd & 0xE0, RAP_READ, "transfer is only used for reads");
        let reg = cmd & RAP_ADDR_MASK;
        for (offset, word) in words.iter_mut().enumerate() {
            *word = if offset < 3 {
                0xFF
            } else {
                state.read(reg.wrapping_add((offset - 3) as u8))
            };
        }
        Ok(words)
    }
}

impl spi::Write<u8> for FakeSpi {
    type Error = BusFault;

    fn write(&mut self, words: &[u8]) -> core::result::Result<(), BusFault> {
        let mut state = (self.0).0.borrow_mut();
        assert!(state.cs_asserted, "SPI write without chip select");
        state.begin_transfer()?;
        state.spi_frames.push(words.to_vec());
        assert_eq!(words.len(), 2, "one register per SPI write frame");
        assert_eq!(words[0] & 0xE0, RAP_WRITE);
        state.write(words[0], words[1])
    }
}

/// Chip-select line of the simulated chip
pub(crate) struct FakeCs(FakeChip);

impl FakeCs {
    pub(crate) fn new(chip: &FakeChip) -> Self {
        Self(chip.clone())
    }
}

impl OutputPin for FakeCs {
    type Error = Infallible;

    fn set_low(&mut self) -> core::result::Result<(), Infallible> {
        let mut state = (self.0).0.borrow_mut();
        assert!(!state.cs_asserted, "nested chip select");
        state.cs_asserted = true;
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Infallible> {
        let mut state = (self.0).0.borrow_mut();
        if state.cs_asserted {
            state.cs_cycles += 1;
        }
        state.cs_asserted = false;
        Ok(())
    }
}

/// I2C front end of the simulated chip
pub(crate) struct FakeI2c {
    chip: FakeChip,
    pointer: u8,
}

impl FakeI2c {
    pub(crate) fn new(chip: &FakeChip) -> Self {
        Self {
            chip: chip.clone(),
            pointer: 0,
        }
    }
}

impl i2c::Write for FakeI2c {
    type Error = BusFault;

    fn write(&mut self, address: u8, bytes: &[u8]) -> core::result::Result<(), BusFault> {
        let mut state = self.chip.0.borrow_mut();
        state.begin_transfer()?;
        state.i2c_frames.push(I2cFrame::Write(address, bytes.to_vec()));
        if let [cmd] = bytes {
            if cmd & 0xE0 == RAP_READ {
                self.pointer = cmd & RAP_ADDR_MASK;
                return Ok(());
            }
        }
        assert_eq!(bytes.len() % 2, 0, "writes are (register, value) pairs");
        for pair in bytes.chunks(2) {
            assert_eq!(pair[0] & 0xE0, RAP_WRITE);
            state.write(pair[0], pair[1])?;
        }
        Ok(())
    }
}

impl i2c::Read for FakeI2c {
    type Error = BusFault;

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> core::result::Result<(), BusFault> {
        let mut state = self.chip.0.borrow_mut();
        state.begin_transfer()?;
        state.i2c_frames.push(I2cFrame::Read(address, buffer.len()));
        for (offset, slot) in buffer.iter_mut().enumerate() {
            *slot = state.read(self.pointer.wrapping_add(offset as u8));
        }
        Ok(())
    }
}

/// Data-ready line of the simulated chip
pub(crate) struct FakeDr(FakeChip);

impl FakeDr {
    pub(crate) fn new(chip: &FakeChip) -> Self {
        Self(chip.clone())
    }
}

impl InputPin for FakeDr {
    type Error = Infallible;

    fn is_high(&self) -> core::result::Result<bool, Infallible> {
        Ok((self.0).0.borrow().dr_level)
    }

    fn is_low(&self) -> core::result::Result<bool, Infallible> {
        Ok(!(self.0).0.borrow().dr_level)
    }
}

/// Delay provider that records each wait in the chip's access log
pub(crate) struct FakeDelay(FakeChip);

impl FakeDelay {
    pub(crate) fn new(chip: &FakeChip) -> Self {
        Self(chip.clone())
    }
}

impl DelayUs<u32> for FakeDelay {
    fn delay_us(&mut self, us: u32) {
        (self.0).0.borrow_mut().log.push(Access::Delay(us));
    }
}

pub(crate) type SpiTouch = PinnacleTouch<SpiInterface<FakeSpi, FakeCs>, FakeDr, FakeDelay>;
pub(crate) type I2cTouch = PinnacleTouch<I2cInterface<FakeI2c>, FakeDr, FakeDelay>;

/// Default test configuration: no delay between busy polls
pub(crate) const fn test_config() -> Config {
    Config::new()
        .with_busy_poll_limit(50)
        .with_busy_poll_interval_us(0)
}

pub(crate) fn spi_touch(chip: &FakeChip) -> Result<SpiTouch> {
    PinnacleTouch::new(
        SpiInterface::new(FakeSpi::new(chip), FakeCs::new(chip)),
        None,
        FakeDelay::new(chip),
        test_config(),
    )
}

pub(crate) fn spi_touch_with_dr(chip: &FakeChip) -> Result<SpiTouch> {
    PinnacleTouch::new(
        SpiInterface::new(FakeSpi::new(chip), FakeCs::new(chip)),
        Some(FakeDr::new(chip)),
        FakeDelay::new(chip),
        test_config(),
    )
}

pub(crate) fn i2c_touch(chip: &FakeChip) -> Result<I2cTouch> {
    PinnacleTouch::new(
        I2cInterface::new(FakeI2c::new(chip), DEFAULT_I2C_ADDR),
        None,
        FakeDelay::new(chip),
        test_config(),
    )
}
