//! Flash-backed Parameter Storage
//!
//! Persistent named parameters with CRC validation and two alternating
//! blocks, so a save interrupted by power loss never destroys the previous
//! copy.
//!
//! # Flash Block Format
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ Magic: [u8; 4] = b"MILE"                      │  Offset: 0
//! ├───────────────────────────────────────────────┤
//! │ Version: u32 = 1                              │  Offset: 4
//! ├───────────────────────────────────────────────┤
//! │ Sequence: u32                                 │  Offset: 8
//! ├───────────────────────────────────────────────┤
//! │ Parameter Count: u32                          │  Offset: 12
//! ├───────────────────────────────────────────────┤
//! │ Parameters: [(name, type, value)]             │  Offset: 16
//! │   name: [u8; 16] (NUL-padded)                 │
//! │   type: u8 (1=Bool, 2=Int)                    │
//! │   value: 1 byte (Bool) or i32 LE (Int)        │
//! ├───────────────────────────────────────────────┤
//! │ CRC32 (ISO-HDLC): u32                         │  Offset: block_size - 4
//! └───────────────────────────────────────────────┘
//! ```
//!
//! Saves go to the block not holding the newest valid copy, with the
//! sequence number incremented. Loads pick the valid block with the highest
//! sequence.

use crate::platform::{FlashInterface, PlatformError};
use core::fmt;
use heapless::{FnvIndexMap, String};

/// Parameter block base address (Flash offset)
pub const PARAM_BLOCK_BASE: u32 = 0x040000;

/// Parameter block size (4 KB per block)
pub const PARAM_BLOCK_SIZE: u32 = 4096;

/// Number of alternating parameter blocks
pub const PARAM_BLOCK_COUNT: u32 = 2;

/// Magic number for parameter blocks
const PARAM_MAGIC: [u8; 4] = *b"MILE";

/// Parameter format version
const PARAM_VERSION: u32 = 1;

/// Maximum parameter name length
pub const PARAM_NAME_LEN: usize = 16;

/// Maximum number of parameters
const MAX_PARAMS: usize = 32;

/// Header bytes before the first entry
const HEADER_LEN: usize = 16;

/// CRC trailer bytes
const CRC_LEN: usize = 4;

const CRC32: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC);

/// Parameter store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParameterError {
    /// Name was never registered
    UnknownParameter,
    /// Value type differs from the registered type
    TypeMismatch,
    /// Name longer than 16 bytes
    NameTooLong,
    /// No room for another parameter
    StoreFull,
    /// Block failed magic, version, CRC or entry validation
    InvalidBlock,
    /// Underlying flash failure
    Flash(PlatformError),
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterError::UnknownParameter => write!(f, "Unknown parameter"),
            ParameterError::TypeMismatch => write!(f, "Parameter type mismatch"),
            ParameterError::NameTooLong => write!(f, "Parameter name too long"),
            ParameterError::StoreFull => write!(f, "Parameter store full"),
            ParameterError::InvalidBlock => write!(f, "Invalid parameter block"),
            ParameterError::Flash(e) => write!(f, "Parameter flash error: {}", e),
        }
    }
}

impl From<PlatformError> for ParameterError {
    fn from(e: PlatformError) -> Self {
        ParameterError::Flash(e)
    }
}

/// Result type for parameter operations
pub type Result<T> = core::result::Result<T, ParameterError>;

/// Parameter value types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamValue {
    /// Boolean parameter
    Bool(bool),
    /// 32-bit signed integer
    Int(i32),
}

impl ParamValue {
    fn type_id(&self) -> u8 {
        match self {
            ParamValue::Bool(_) => 1,
            ParamValue::Int(_) => 2,
        }
    }

    fn encoded_len(&self) -> usize {
        match self {
            ParamValue::Bool(_) => 1,
            ParamValue::Int(_) => 4,
        }
    }

    fn encode(&self, out: &mut [u8]) {
        match self {
            ParamValue::Bool(b) => out[0] = *b as u8,
            ParamValue::Int(i) => out[..4].copy_from_slice(&i.to_le_bytes()),
        }
    }

    fn decode(type_id: u8, buf: &[u8], offset: &mut usize) -> Result<Self> {
        match type_id {
            1 => {
                let byte = *buf.get(*offset).ok_or(ParameterError::InvalidBlock)?;
                *offset += 1;
                Ok(ParamValue::Bool(byte != 0))
            }
            2 => {
                let bytes = buf
                    .get(*offset..*offset + 4)
                    .ok_or(ParameterError::InvalidBlock)?;
                *offset += 4;
                Ok(ParamValue::Int(i32::from_le_bytes([
                    bytes[0], bytes[1], bytes[2], bytes[3],
                ])))
            }
            _ => Err(ParameterError::InvalidBlock),
        }
    }

    fn same_type(&self, other: &ParamValue) -> bool {
        self.type_id() == other.type_id()
    }
}

type ParamName = String<PARAM_NAME_LEN>;

fn key(name: &str) -> Result<ParamName> {
    let mut key = ParamName::new();
    key.push_str(name)
        .map_err(|_| ParameterError::NameTooLong)?;
    Ok(key)
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

fn block_address(block: u32) -> u32 {
    PARAM_BLOCK_BASE + block * PARAM_BLOCK_SIZE
}

/// Parameter store with Flash persistence
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    parameters: FnvIndexMap<ParamName, ParamValue, MAX_PARAMS>,
    dirty: bool,
    /// Block and sequence of the newest valid copy on flash
    persisted: Option<(u32, u32)>,
}

impl ParameterStore {
    /// Create a new empty parameter store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the newest valid block from Flash
    ///
    /// Returns an empty store when no block is valid. Flash read failures
    /// are propagated.
    pub fn load_from_flash<F: FlashInterface>(flash: &mut F) -> Result<Self> {
        let mut newest: Option<(u32, u32, Self)> = None;

        for block in 0..PARAM_BLOCK_COUNT {
            match Self::load_from_block(flash, block_address(block)) {
                Ok((sequence, store)) => {
                    if newest.as_ref().map_or(true, |(_, seq, _)| sequence > *seq) {
                        newest = Some((block, sequence, store));
                    }
                }
                Err(ParameterError::InvalidBlock) => {
                    crate::log_debug!("Parameter block {} invalid", block);
                }
                Err(e) => return Err(e),
            }
        }

        match newest {
            Some((block, sequence, mut store)) => {
                crate::log_info!(
                    "Loaded {} parameters from block {} (seq {})",
                    store.count(),
                    block,
                    sequence
                );
                store.persisted = Some((block, sequence));
                Ok(store)
            }
            None => {
                crate::log_warn!("No valid parameter blocks found, using defaults");
                Ok(Self::new())
            }
        }
    }

    fn load_from_block<F: FlashInterface>(flash: &mut F, address: u32) -> Result<(u32, Self)> {
        let mut buf = [0u8; PARAM_BLOCK_SIZE as usize];
        flash.read(address, &mut buf)?;

        if buf[0..4] != PARAM_MAGIC || read_u32(&buf, 4) != PARAM_VERSION {
            return Err(ParameterError::InvalidBlock);
        }

        let crc_offset = buf.len() - CRC_LEN;
        if read_u32(&buf, crc_offset) != CRC32.checksum(&buf[..crc_offset]) {
            return Err(ParameterError::InvalidBlock);
        }

        let sequence = read_u32(&buf, 8);
        let count = read_u32(&buf, 12) as usize;
        if count > MAX_PARAMS {
            return Err(ParameterError::InvalidBlock);
        }

        let body = &buf[..crc_offset];
        let mut store = Self::new();
        let mut offset = HEADER_LEN;

        for _ in 0..count {
            let name_bytes = body
                .get(offset..offset + PARAM_NAME_LEN)
                .ok_or(ParameterError::InvalidBlock)?;
            let name_len = name_bytes
                .iter()
                .position(|&b| b == 0)
                .unwrap_or(PARAM_NAME_LEN);
            let name = core::str::from_utf8(&name_bytes[..name_len])
                .map_err(|_| ParameterError::InvalidBlock)?;
            offset += PARAM_NAME_LEN;

            let type_id = *body.get(offset).ok_or(ParameterError::InvalidBlock)?;
            offset += 1;
            let value = ParamValue::decode(type_id, body, &mut offset)?;

            store
                .parameters
                .insert(key(name)?, value)
                .map_err(|_| ParameterError::InvalidBlock)?;
        }

        Ok((sequence, store))
    }

    /// Save parameters to Flash
    ///
    /// No-op when nothing changed since the last load or save.
    pub fn save_to_flash<F: FlashInterface>(&mut self, flash: &mut F) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        let (block, sequence) = match self.persisted {
            Some((active, seq)) => ((active + 1) % PARAM_BLOCK_COUNT, seq.wrapping_add(1)),
            None => (0, 1),
        };

        let mut buf = [0xFFu8; PARAM_BLOCK_SIZE as usize];
        buf[0..4].copy_from_slice(&PARAM_MAGIC);
        buf[4..8].copy_from_slice(&PARAM_VERSION.to_le_bytes());
        buf[8..12].copy_from_slice(&sequence.to_le_bytes());
        buf[12..16].copy_from_slice(&(self.parameters.len() as u32).to_le_bytes());

        let crc_offset = buf.len() - CRC_LEN;
        let mut offset = HEADER_LEN;
        for (name, value) in &self.parameters {
            let entry_len = PARAM_NAME_LEN + 1 + value.encoded_len();
            if offset + entry_len > crc_offset {
                return Err(ParameterError::StoreFull);
            }

            let name_field = &mut buf[offset..offset + PARAM_NAME_LEN];
            name_field.fill(0);
            name_field[..name.len()].copy_from_slice(name.as_bytes());
            offset += PARAM_NAME_LEN;

            buf[offset] = value.type_id();
            offset += 1;

            value.encode(&mut buf[offset..]);
            offset += value.encoded_len();
        }

        let crc = CRC32.checksum(&buf[..crc_offset]);
        buf[crc_offset..].copy_from_slice(&crc.to_le_bytes());

        let address = block_address(block);
        flash.erase(address, PARAM_BLOCK_SIZE)?;
        flash.write(address, &buf)?;

        self.persisted = Some((block, sequence));
        self.dirty = false;

        crate::log_info!(
            "Saved {} parameters to block {} (seq {})",
            self.parameters.len(),
            block,
            sequence
        );
        Ok(())
    }

    /// Get parameter value
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.get(&key(name).ok()?)
    }

    /// Get a Bool parameter
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            ParamValue::Bool(b) => Some(*b),
            ParamValue::Int(_) => None,
        }
    }

    /// Get an Int parameter
    pub fn get_int(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            ParamValue::Int(i) => Some(*i),
            ParamValue::Bool(_) => None,
        }
    }

    /// Set a registered parameter
    ///
    /// Marks the store dirty only if the value changed.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<()> {
        let key = key(name)?;
        let current = self
            .parameters
            .get_mut(&key)
            .ok_or(ParameterError::UnknownParameter)?;

        if !current.same_type(&value) {
            return Err(ParameterError::TypeMismatch);
        }
        if *current != value {
            *current = value;
            self.dirty = true;
        }
        Ok(())
    }

    /// Register a parameter with its default value
    ///
    /// A parameter already present (e.g. loaded from Flash) keeps its value
    /// unless the stored type differs, in which case the default replaces it.
    pub fn register(&mut self, name: &str, default_value: ParamValue) -> Result<()> {
        let key = key(name)?;

        if let Some(existing) = self.parameters.get_mut(&key) {
            if !existing.same_type(&default_value) {
                *existing = default_value;
                self.dirty = true;
            }
            return Ok(());
        }

        self.parameters
            .insert(key, default_value)
            .map_err(|_| ParameterError::StoreFull)?;
        self.dirty = true;
        Ok(())
    }

    /// Parameter names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(|k| k.as_str())
    }

    /// Number of parameters
    pub fn count(&self) -> usize {
        self.parameters.len()
    }

    /// Check if store has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// A valid block was loaded or saved
    pub fn is_persisted(&self) -> bool {
        self.persisted.is_some()
    }

    /// Sequence number of the newest copy on flash
    pub fn sequence(&self) -> Option<u32> {
        self.persisted.map(|(_, seq)| seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockFlash;

    fn store() -> ParameterStore {
        let mut store = ParameterStore::new();
        store.register("MILES_PROTO", ParamValue::Int(0)).unwrap();
        store.register("MILES_SIDE", ParamValue::Bool(false)).unwrap();
        store
    }

    #[test]
    fn test_parameter_store_basic() {
        let mut store = store();
        assert_eq!(store.get_int("MILES_PROTO"), Some(0));
        assert!(store.is_dirty());

        store.set("MILES_PROTO", ParamValue::Int(3)).unwrap();
        assert_eq!(store.get("MILES_PROTO"), Some(&ParamValue::Int(3)));
        assert_eq!(store.get_bool("MILES_PROTO"), None);
    }

    #[test]
    fn test_set_rejects_unknown_and_mismatched() {
        let mut store = store();
        assert_eq!(
            store.set("NOPE", ParamValue::Int(1)),
            Err(ParameterError::UnknownParameter)
        );
        assert_eq!(
            store.set("MILES_SIDE", ParamValue::Int(1)),
            Err(ParameterError::TypeMismatch)
        );
        assert_eq!(
            store.register("A_VERY_LONG_PARAMETER_NAME", ParamValue::Int(1)),
            Err(ParameterError::NameTooLong)
        );
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let mut flash = MockFlash::new();
        let mut store = store();
        store.set("MILES_PROTO", ParamValue::Int(4)).unwrap();
        store.set("MILES_SIDE", ParamValue::Bool(true)).unwrap();
        store.save_to_flash(&mut flash).unwrap();
        assert!(!store.is_dirty());
        assert_eq!(flash.contents(PARAM_BLOCK_BASE, 4), b"MILE");

        let loaded = ParameterStore::load_from_flash(&mut flash).unwrap();
        assert_eq!(loaded.get_int("MILES_PROTO"), Some(4));
        assert_eq!(loaded.get_bool("MILES_SIDE"), Some(true));
        assert_eq!(loaded.sequence(), Some(1));
        assert!(!loaded.is_dirty());
    }

    #[test]
    fn test_empty_flash_loads_empty_store() {
        let mut flash = MockFlash::new();
        let loaded = ParameterStore::load_from_flash(&mut flash).unwrap();
        assert_eq!(loaded.count(), 0);
        assert!(!loaded.is_persisted());
    }

    #[test]
    fn test_saves_alternate_blocks() {
        let mut flash = MockFlash::new();
        let mut store = store();

        for proto in 1..=3 {
            store.set("MILES_PROTO", ParamValue::Int(proto)).unwrap();
            store.save_to_flash(&mut flash).unwrap();
        }

        assert_eq!(flash.erase_count(block_address(0)), 2);
        assert_eq!(flash.erase_count(block_address(1)), 1);

        let loaded = ParameterStore::load_from_flash(&mut flash).unwrap();
        assert_eq!(loaded.get_int("MILES_PROTO"), Some(3));
        assert_eq!(loaded.sequence(), Some(3));
    }

    #[test]
    fn test_torn_write_keeps_previous_copy() {
        let mut flash = MockFlash::new();
        let mut store = store();
        store.set("MILES_PROTO", ParamValue::Int(2)).unwrap();
        store.save_to_flash(&mut flash).unwrap();

        store.set("MILES_PROTO", ParamValue::Int(4)).unwrap();
        flash.simulate_power_loss();
        store.save_to_flash(&mut flash).unwrap();

        let loaded = ParameterStore::load_from_flash(&mut flash).unwrap();
        assert_eq!(loaded.get_int("MILES_PROTO"), Some(2));
    }

    #[test]
    fn test_corrupted_block_rejected() {
        let mut flash = MockFlash::new();
        let mut store = store();
        store.save_to_flash(&mut flash).unwrap();
        flash.inject_corruption(PARAM_BLOCK_BASE + HEADER_LEN as u32, 4);

        let loaded = ParameterStore::load_from_flash(&mut flash).unwrap();
        assert!(!loaded.is_persisted());
    }

    #[test]
    fn test_clean_store_skips_flash() {
        let mut flash = MockFlash::new();
        let mut store = store();
        store.save_to_flash(&mut flash).unwrap();
        store.set("MILES_PROTO", ParamValue::Int(0)).unwrap();
        store.save_to_flash(&mut flash).unwrap();
        assert_eq!(flash.total_erase_count(), 1);
    }

    #[test]
    fn test_register_keeps_loaded_value() {
        let mut flash = MockFlash::new();
        let mut store = store();
        store.set("MILES_SIDE", ParamValue::Bool(true)).unwrap();
        store.save_to_flash(&mut flash).unwrap();

        let mut loaded = ParameterStore::load_from_flash(&mut flash).unwrap();
        loaded.register("MILES_SIDE", ParamValue::Bool(false)).unwrap();
        assert_eq!(loaded.get_bool("MILES_SIDE"), Some(true));
        assert!(!loaded.is_dirty());
    }

    #[test]
    fn test_flash_failure_propagates() {
        let mut flash = MockFlash::new();
        flash.fail_all = true;
        assert!(matches!(
            ParameterStore::load_from_flash(&mut flash),
            Err(ParameterError::Flash(_))
        ));

        let mut store = store();
        assert!(matches!(
            store.save_to_flash(&mut flash),
            Err(ParameterError::Flash(_))
        ));
        assert!(store.is_dirty());
    }
}
