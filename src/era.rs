//! Extended Register Access
//!
//! Extended registers are reached through a window of direct registers:
//! the 16-bit address goes into `ERA_ADDR_HIGH`/`ERA_ADDR_LOW`, the data byte
//! into `ERA_VALUE`, and a command into `ERA_CONTROL`.  The chip clears
//! `ERA_CONTROL` once the command has completed.
//!
//! The feed must be disabled while an ERA command runs.  The public entry
//! points save the feed state, disable it, and restore the saved state on
//! every exit path.

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::InputPin;

use crate::interface::Interface;
use crate::registers::*;
use crate::{PinnacleTouch, Result};

impl<IFACE, DR, D> PinnacleTouch<IFACE, DR, D>
where
    IFACE: Interface,
    DR: InputPin,
    D: DelayUs<u32>,
{
    /// Read one extended register
    pub fn era_read(&mut self, addr: u16) -> Result<u8> {
        self.with_feed_paused(|touch| touch.era_read_paused(addr))
    }

    /// Read `buffer.len()` bytes starting at extended register `addr`
    ///
    /// The address is written once; each byte is fetched with the
    /// auto-incrementing read command, so the chip advances the address.
    pub fn era_read_bytes(&mut self, addr: u16, buffer: &mut [u8]) -> Result<()> {
        self.with_feed_paused(|touch| {
            touch.write_era_address(addr)?;
            for slot in buffer.iter_mut() {
                *slot = touch.era_command_read(ERA_CMD_READ_AUTO_INC)?;
            }
            Ok(())
        })
    }

    /// Write one extended register
    pub fn era_write(&mut self, addr: u16, value: u8) -> Result<()> {
        self.with_feed_paused(|touch| touch.era_write_paused(addr, value))
    }

    /// Run `f` with the feed disabled, then put the feed back as it was
    ///
    /// The saved state is restored even if `f` fails; the error from `f`
    /// takes precedence over one from the restore.
    pub(crate) fn with_feed_paused<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let was_enabled = self.feed_enable()?;
        self.set_feed_enable(false)?;
        let res = f(self);
        let restored = self.set_feed_enable(was_enabled);
        let value = res?;
        restored.map(|()| value)
    }

    pub(crate) fn era_read_paused(&mut self, addr: u16) -> Result<u8> {
        #[cfg(feature = "defmt")]
        defmt::trace!("era read {=u16:#06x}", addr);
        self.write_era_address(addr)?;
        self.era_command_read(ERA_CMD_READ)
    }

    pub(crate) fn era_write_paused(&mut self, addr: u16, value: u8) -> Result<()> {
        #[cfg(feature = "defmt")]
        defmt::trace!("era write {=u16:#06x} = {=u8:#04x}", addr, value);
        self.interface.write_register(ERA_VALUE, value)?;
        self.write_era_address(addr)?;
        self.interface.write_register(ERA_CONTROL, ERA_CMD_WRITE)?;
        self.wait_era_complete()?;
        self.clear_status_flags()
    }

    fn write_era_address(&mut self, addr: u16) -> Result<()> {
        self.interface.write_registers(ERA_ADDR_HIGH, &addr.to_be_bytes())
    }

    fn era_command_read(&mut self, cmd: u8) -> Result<u8> {
        self.interface.write_register(ERA_CONTROL, cmd)?;
        self.wait_era_complete()?;
        let value = self.interface.read_register(ERA_VALUE)?;
        self.clear_status_flags()?;
        Ok(value)
    }

    fn wait_era_complete(&mut self) -> Result<()> {
        self.poll_until(|touch| Ok(touch.interface.read_register(ERA_CONTROL)? == 0))
    }
}
