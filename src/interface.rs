//! Bus bindings for the Register Access Protocol
//!
//! The Pinnacle speaks the same register protocol over SPI and I2C, but the
//! framing differs:
//!
//! * SPI reads clock out the command byte followed by filler bytes, and the
//!   first three bytes clocked in are discarded.  Writes are one chip-select
//!   frame per register.
//! * I2C reads are a command write followed by a separate read.  Writes send
//!   every (address, value) pair in a single transfer.

use embedded_hal::blocking::{i2c, spi};
use embedded_hal::digital::v2::OutputPin;

use crate::registers::{RAP_ADDR_MASK, RAP_READ, RAP_REGISTER_COUNT, RAP_WRITE};
use crate::{Error, Result};

/// Default 7-bit I2C address of the Pinnacle
pub const DEFAULT_I2C_ADDR: u8 = 0x2A;

/// Filler clocked out after a single register read command
const SPI_FILL_READ: u8 = 0xFB;
/// Filler clocked out while auto-incrementing through a burst read
const SPI_FILL_AUTO_INC: u8 = 0xFC;
/// Bytes clocked in before the first payload byte of a SPI read
const SPI_READ_PREAMBLE: usize = 3;

const fn rap_read_cmd(reg: u8) -> u8 {
    (reg & RAP_ADDR_MASK) | RAP_READ
}

const fn rap_write_cmd(reg: u8) -> u8 {
    (reg & RAP_ADDR_MASK) | RAP_WRITE
}

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// Direct register access over one of the supported buses
pub trait Interface: sealed::Sealed {
    /// Read a single register
    fn read_register(&mut self, reg: u8) -> Result<u8>;
    /// Read `buffer.len()` consecutive registers starting at `reg`
    fn read_registers(&mut self, reg: u8, buffer: &mut [u8]) -> Result<()>;
    /// Write a single register
    fn write_register(&mut self, reg: u8, value: u8) -> Result<()>;
    /// Write `values` to consecutive registers starting at `reg`
    fn write_registers(&mut self, reg: u8, values: &[u8]) -> Result<()>;
}

/// SPI register interface
///
/// The chip-select line is asserted for exactly one frame per call and is
/// always released again, whether or not the transfer succeeded.
pub struct SpiInterface<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI, CS> SpiInterface<SPI, CS> {
    /// Create a new SPI interface
    ///
    /// `spi` must be configured for mode 1 (CPOL = 0, CPHA = 1)
    /// `cs` is a push pull output GPIO driving the Pinnacle's SS line
    pub const fn new(spi: SPI, cs: CS) -> Self {
        Self { spi, cs }
    }

    /// Release the SPI bus and chip-select pin
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }
}

impl<SPI, CS> SpiInterface<SPI, CS>
where
    CS: OutputPin,
{
    fn frame<T, F: FnOnce(&mut SPI) -> Result<T>>(&mut self, f: F) -> Result<T> {
        self.cs.set_low().map_err(|_| Error::GPIOError)?;
        let res = f(&mut self.spi);
        let released = self.cs.set_high().map_err(|_| Error::GPIOError);
        let value = res?;
        released.map(|()| value)
    }
}

impl<SPI, CS> Interface for SpiInterface<SPI, CS>
where
    SPI: spi::Transfer<u8> + spi::Write<u8>,
    CS: OutputPin,
{
    fn read_register(&mut self, reg: u8) -> Result<u8> {
        let mut buf = [rap_read_cmd(reg), SPI_FILL_READ, SPI_FILL_READ, SPI_FILL_READ];
        self.frame(|spi| {
            spi.transfer(&mut buf).map_err(|_| Error::SPIError)?;
            Ok(())
        })?;
        Ok(buf[SPI_READ_PREAMBLE])
    }

    fn read_registers(&mut self, reg: u8, buffer: &mut [u8]) -> Result<()> {
        let count = buffer.len();
        if count == 0 {
            return Ok(());
        }
        if count > RAP_REGISTER_COUNT {
            return Err(Error::InvalidLength);
        }
        let len = count + SPI_READ_PREAMBLE;
        let mut buf = [SPI_FILL_AUTO_INC; RAP_REGISTER_COUNT + SPI_READ_PREAMBLE];
        buf[0] = rap_read_cmd(reg);
        buf[len - 1] = SPI_FILL_READ;
        self.frame(|spi| {
            spi.transfer(&mut buf[..len]).map_err(|_| Error::SPIError)?;
            Ok(())
        })?;
        buffer.copy_from_slice(&buf[SPI_READ_PREAMBLE..len]);
        Ok(())
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<()> {
        let msg = [rap_write_cmd(reg), value];
        self.frame(|spi| spi.write(&msg).map_err(|_| Error::SPIError))
    }

    fn write_registers(&mut self, reg: u8, values: &[u8]) -> Result<()> {
        if values.len() > RAP_REGISTER_COUNT {
            return Err(Error::InvalidLength);
        }
        for (offset, value) in values.iter().enumerate() {
            self.write_register(reg.wrapping_add(offset as u8), *value)?;
        }
        Ok(())
    }
}

impl<SPI, CS> sealed::Sealed for SpiInterface<SPI, CS> {}

/// I2C register interface
pub struct I2cInterface<I2C> {
    i2c: I2C,
    addr: u8,
}

impl<I2C> I2cInterface<I2C> {
    /// Create a new I2C interface with the given bus and 7-bit address
    pub const fn new(i2c: I2C, addr: u8) -> Self {
        Self { i2c, addr }
    }

    /// The 7-bit device address in use
    pub const fn address(&self) -> u8 {
        self.addr
    }

    /// Release the I2C bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> Interface for I2cInterface<I2C>
where
    I2C: i2c::Write + i2c::Read,
{
    fn read_register(&mut self, reg: u8) -> Result<u8> {
        let mut rd_buf = [0u8; 1];
        self.read_registers(reg, &mut rd_buf)?;
        Ok(rd_buf[0])
    }

    fn read_registers(&mut self, reg: u8, buffer: &mut [u8]) -> Result<()> {
        if buffer.is_empty() {
            return Ok(());
        }
        if buffer.len() > RAP_REGISTER_COUNT {
            return Err(Error::InvalidLength);
        }
        self.i2c
            .write(self.addr, &[rap_read_cmd(reg)])
            .map_err(|_| Error::I2CError)?;
        self.i2c
            .read(self.addr, buffer)
            .map_err(|_| Error::I2CError)
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<()> {
        self.write_registers(reg, &[value])
    }

    fn write_registers(&mut self, reg: u8, values: &[u8]) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        if values.len() > RAP_REGISTER_COUNT {
            return Err(Error::InvalidLength);
        }
        let mut msg = [0u8; RAP_REGISTER_COUNT * 2];
        for (offset, value) in values.iter().enumerate() {
            msg[offset * 2] = rap_write_cmd(reg.wrapping_add(offset as u8));
            msg[offset * 2 + 1] = *value;
        }
        self.i2c
            .write(self.addr, &msg[..values.len() * 2])
            .map_err(|_| Error::I2CError)
    }
}

impl<I2C> sealed::Sealed for I2cInterface<I2C> {}
