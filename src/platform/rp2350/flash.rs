//! RP2350 Flash implementation
//!
//! # Flash Layout
//!
//! ```text
//! [Firmware]           0x000000 - 0x040000 (256 KB) - PROTECTED
//! [Parameter Block 0]  0x040000 - 0x041000 (4 KB)
//! [Parameter Block 1]  0x041000 - 0x042000 (4 KB)
//! ```

use crate::platform::{error::FlashError, traits::FlashInterface, Result};
use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;

/// Total Flash capacity for Pico 2 W
pub const FLASH_SIZE: usize = 4 * 1024 * 1024;

/// Minimum firmware size (protect first 256 KB)
const FIRMWARE_SIZE: u32 = 0x40000;

/// Flash block size (minimum erase unit)
const BLOCK_SIZE: u32 = ERASE_SIZE as u32;

/// RP2350 Flash implementation
///
/// Wraps the blocking Embassy flash driver. XIP is suspended by the driver
/// during erase and program, so these calls stall the core for their whole
/// duration.
pub struct Rp2350Flash<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
}

impl<'d> Rp2350Flash<'d> {
    /// Wrap the blocking flash driver
    pub fn new(flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>) -> Self {
        Self { flash }
    }

    fn is_writable(&self, address: u32) -> bool {
        (FIRMWARE_SIZE..FLASH_SIZE as u32).contains(&address)
    }
}

impl FlashInterface for Rp2350Flash<'_> {
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        if address as usize + buf.len() > FLASH_SIZE {
            return Err(FlashError::InvalidAddress.into());
        }
        self.flash
            .blocking_read(address, buf)
            .map_err(|_| FlashError::ReadFailed.into())
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        if !self.is_writable(address) || address as usize + data.len() > FLASH_SIZE {
            return Err(FlashError::InvalidAddress.into());
        }
        self.flash
            .blocking_write(address, data)
            .map_err(|_| FlashError::WriteFailed.into())
    }

    fn erase(&mut self, address: u32, size: u32) -> Result<()> {
        if !self.is_writable(address)
            || !address.is_multiple_of(BLOCK_SIZE)
            || !size.is_multiple_of(BLOCK_SIZE)
            || address as usize + size as usize > FLASH_SIZE
        {
            return Err(FlashError::InvalidAddress.into());
        }
        self.flash
            .blocking_erase(address, address + size)
            .map_err(|_| FlashError::EraseFailed.into())
    }

    fn block_size(&self) -> u32 {
        BLOCK_SIZE
    }

    fn capacity(&self) -> u32 {
        FLASH_SIZE as u32
    }
}
