//! Flash interface trait
//!
//! Flash holds the persisted operator settings.

use crate::platform::Result;

/// Flash interface trait
///
/// # Flash Characteristics
///
/// - Flash is organized in 4 KB blocks on RP2350
/// - Erase operations set all bytes to 0xFF
/// - Write operations can only change bits from 1→0 (must erase first)
/// - Operations are blocking and can take tens of milliseconds
///
/// # Memory Layout (RP2350)
///
/// ```text
/// [Firmware]           0x000000 - 0x040000 (256 KB) - DO NOT WRITE
/// [Parameter Block 0]  0x040000 - 0x041000 (4 KB)
/// [Parameter Block 1]  0x041000 - 0x042000 (4 KB)
/// ```
pub trait FlashInterface {
    /// Read `buf.len()` bytes starting at `address`
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if the range is out of bounds.
    /// Returns `PlatformError::Flash(FlashError::ReadFailed)` if the read operation fails.
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()>;

    /// Write `data` starting at `address`
    ///
    /// The target region must have been erased.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if the address is in the
    /// firmware region or out of bounds.
    /// Returns `PlatformError::Flash(FlashError::WriteFailed)` if the write operation fails.
    fn write(&mut self, address: u32, data: &[u8]) -> Result<()>;

    /// Erase `size` bytes starting at `address` (both block-aligned)
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if the region is
    /// misaligned, in the firmware region or out of bounds.
    /// Returns `PlatformError::Flash(FlashError::EraseFailed)` if the erase operation fails.
    fn erase(&mut self, address: u32, size: u32) -> Result<()>;

    /// Minimum erasable unit in bytes
    fn block_size(&self) -> u32;

    /// Total flash capacity in bytes
    fn capacity(&self) -> u32;
}
