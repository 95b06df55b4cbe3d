//! Mock Flash implementation for testing
//!
//! Provides in-memory Flash simulation for unit tests.

use crate::platform::{error::FlashError, traits::FlashInterface, Result};
use std::vec;
use std::vec::Vec;

/// Flash block size (4 KB)
const BLOCK_SIZE: u32 = 4096;

/// Simulated capacity (firmware region plus 256 KB of data blocks)
const FLASH_CAPACITY: u32 = 0x80000;

/// Firmware region kept read-only
const FIRMWARE_SIZE: u32 = 0x40000;

/// Mock Flash implementation
///
/// Simulates Flash storage in memory. Supports:
/// - 1→0 only programming, 0xFF erase
/// - Erase counting per block
/// - Power-loss injection (next write completes only halfway)
/// - Whole-device failure injection
#[derive(Debug)]
pub struct MockFlash {
    storage: Vec<u8>,
    erase_counts: Vec<u32>,
    power_loss: bool,
    /// Make every operation fail
    pub fail_all: bool,
}

impl MockFlash {
    /// Create a new, fully erased mock Flash
    pub fn new() -> Self {
        Self {
            storage: vec![0xFF; FLASH_CAPACITY as usize],
            erase_counts: vec![0; (FLASH_CAPACITY / BLOCK_SIZE) as usize],
            power_loss: false,
            fail_all: false,
        }
    }

    /// Flash contents (for test verification)
    pub fn contents(&self, address: u32, len: usize) -> &[u8] {
        &self.storage[address as usize..address as usize + len]
    }

    /// Overwrite bytes with a corrupt pattern
    pub fn inject_corruption(&mut self, address: u32, len: usize) {
        for byte in &mut self.storage[address as usize..address as usize + len] {
            *byte ^= 0xAA;
        }
    }

    /// Number of times the block holding `address` was erased
    pub fn erase_count(&self, address: u32) -> u32 {
        self.erase_counts[(address / BLOCK_SIZE) as usize]
    }

    /// Total erase count across all blocks
    pub fn total_erase_count(&self) -> u32 {
        self.erase_counts.iter().sum()
    }

    /// Cut power halfway through the next write
    pub fn simulate_power_loss(&mut self) {
        self.power_loss = true;
    }

    fn check_range(&self, address: u32, len: usize) -> Result<()> {
        if address as usize + len > FLASH_CAPACITY as usize {
            return Err(FlashError::InvalidAddress.into());
        }
        Ok(())
    }

    fn is_writable(&self, address: u32) -> bool {
        (FIRMWARE_SIZE..FLASH_CAPACITY).contains(&address)
    }
}

impl Default for MockFlash {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashInterface for MockFlash {
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        if self.fail_all {
            return Err(FlashError::ReadFailed.into());
        }
        self.check_range(address, buf.len())?;
        buf.copy_from_slice(self.contents(address, buf.len()));
        Ok(())
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        if self.fail_all {
            return Err(FlashError::WriteFailed.into());
        }
        if !self.is_writable(address) {
            return Err(FlashError::InvalidAddress.into());
        }
        self.check_range(address, data.len())?;

        let write_len = if self.power_loss {
            self.power_loss = false;
            data.len() / 2
        } else {
            data.len()
        };

        // Programming can only clear bits
        let start = address as usize;
        for (cell, byte) in self.storage[start..start + write_len]
            .iter_mut()
            .zip(data)
        {
            *cell &= *byte;
        }
        Ok(())
    }

    fn erase(&mut self, address: u32, size: u32) -> Result<()> {
        if self.fail_all {
            return Err(FlashError::EraseFailed.into());
        }
        if !self.is_writable(address)
            || !address.is_multiple_of(BLOCK_SIZE)
            || !size.is_multiple_of(BLOCK_SIZE)
        {
            return Err(FlashError::InvalidAddress.into());
        }
        self.check_range(address, size as usize)?;

        self.storage[address as usize..(address + size) as usize].fill(0xFF);
        for block in (address / BLOCK_SIZE)..((address + size) / BLOCK_SIZE) {
            self.erase_counts[block as usize] += 1;
        }
        Ok(())
    }

    fn block_size(&self) -> u32 {
        BLOCK_SIZE
    }

    fn capacity(&self) -> u32 {
        FLASH_CAPACITY
    }
}
