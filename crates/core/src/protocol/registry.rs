//! Protocol code registry
//!
//! Immutable, ordered table of the MILES codes the device can emit. The table is
//! fixed at build time and validated once at startup; it is never mutated afterwards.

use core::fmt;

/// Number of bits in a MILES word
pub const FRAME_LEN: usize = 11;

/// One transmittable MILES code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolCode {
    /// Registry identifier (persisted as the selected protocol)
    pub id: u8,
    /// Display name
    pub name: &'static str,
    /// 11-bit pattern, index 0 is sent first; every entry is 0 or 1
    pub pattern: [u8; FRAME_LEN],
}

impl ProtocolCode {
    /// Create a protocol code
    pub const fn new(id: u8, name: &'static str, pattern: [u8; FRAME_LEN]) -> Self {
        Self { id, name, pattern }
    }
}

/// Built-in code table
///
/// Patterns are placeholders until the real range codes are calibrated.
pub const BUILTIN_CODES: [ProtocolCode; 5] = [
    ProtocolCode::new(
        0,
        "Universal Kill (Basic)",
        [1, 1, 0, 0, 0, 1, 0, 1, 1, 0, 1],
    ),
    ProtocolCode::new(1, "Player ID 001", [1, 0, 0, 1, 0, 0, 1, 1, 0, 1, 0]),
    ProtocolCode::new(2, "Player ID 002", [1, 0, 1, 1, 0, 0, 1, 0, 1, 1, 0]),
    ProtocolCode::new(3, "Pause/Reset", [1, 1, 0, 0, 0, 1, 0, 1, 0, 1, 1]),
    ProtocolCode::new(4, "End Exercise", [1, 1, 0, 0, 0, 1, 1, 1, 1, 1, 0]),
];

/// Registry validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The table has no entries
    Empty,
    /// Two entries share an id
    DuplicateId {
        /// Offending id
        id: u8,
    },
    /// A pattern contains something other than 0 or 1
    InvalidBit {
        /// Code id
        id: u8,
        /// Bit index
        index: usize,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Empty => write!(f, "protocol registry is empty"),
            RegistryError::DuplicateId { id } => write!(f, "duplicate protocol id {}", id),
            RegistryError::InvalidBit { id, index } => {
                write!(f, "protocol {} has a non-binary bit at index {}", id, index)
            }
        }
    }
}

/// Ordered, read-only protocol table
#[derive(Debug, Clone, Copy)]
pub struct ProtocolRegistry {
    codes: &'static [ProtocolCode],
}

impl ProtocolRegistry {
    /// Wrap a static code table
    ///
    /// Call [`validate`](Self::validate) once at startup before use.
    pub const fn new(codes: &'static [ProtocolCode]) -> Self {
        Self { codes }
    }

    /// Registry over [`BUILTIN_CODES`]
    pub const fn builtin() -> Self {
        Self::new(&BUILTIN_CODES)
    }

    /// Check the table invariants: non-empty, unique ids, binary patterns
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.codes.is_empty() {
            return Err(RegistryError::Empty);
        }

        for (i, code) in self.codes.iter().enumerate() {
            if self.codes[..i].iter().any(|c| c.id == code.id) {
                return Err(RegistryError::DuplicateId { id: code.id });
            }
            if let Some(index) = code.pattern.iter().position(|&b| b > 1) {
                return Err(RegistryError::InvalidBit { id: code.id, index });
            }
        }

        Ok(())
    }

    /// Look up a code by id
    pub fn get(&self, id: u8) -> Option<&'static ProtocolCode> {
        self.codes.iter().find(|c| c.id == id)
    }

    /// Check whether `id` is present
    pub fn contains(&self, id: u8) -> bool {
        self.get(id).is_some()
    }

    /// First entry in registry order
    pub fn first(&self) -> Option<&'static ProtocolCode> {
        self.codes.first()
    }

    /// Entry following `id` in registry order, wrapping at the end
    ///
    /// An unknown `id` selects the first entry.
    pub fn next_after(&self, id: u8) -> Option<&'static ProtocolCode> {
        match self.codes.iter().position(|c| c.id == id) {
            Some(pos) => self.codes.get((pos + 1) % self.codes.len()),
            None => self.first(),
        }
    }

    /// Iterate over codes in registry order
    pub fn iter(&self) -> impl Iterator<Item = &'static ProtocolCode> {
        self.codes.iter()
    }

    /// Number of codes
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Check if the registry has no codes
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static DUPLICATE: [ProtocolCode; 2] = [
        ProtocolCode::new(7, "A", [0; FRAME_LEN]),
        ProtocolCode::new(7, "B", [1; FRAME_LEN]),
    ];

    static NON_BINARY: [ProtocolCode; 1] = [ProtocolCode::new(
        1,
        "Bad",
        [1, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0],
    )];

    #[test]
    fn test_builtin_registry_is_valid() {
        let registry = ProtocolRegistry::builtin();
        assert_eq!(registry.validate(), Ok(()));
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_get_by_id() {
        let registry = ProtocolRegistry::builtin();
        assert_eq!(registry.get(3).map(|c| c.name), Some("Pause/Reset"));
        assert!(registry.get(42).is_none());
        assert!(!registry.contains(42));
    }

    #[test]
    fn test_next_after_wraps() {
        let registry = ProtocolRegistry::builtin();
        assert_eq!(registry.next_after(0).map(|c| c.id), Some(1));
        assert_eq!(registry.next_after(4).map(|c| c.id), Some(0));
    }

    #[test]
    fn test_next_after_unknown_selects_first() {
        let registry = ProtocolRegistry::builtin();
        assert_eq!(registry.next_after(99).map(|c| c.id), Some(0));
    }

    #[test]
    fn test_validate_rejects_empty() {
        static EMPTY: [ProtocolCode; 0] = [];
        assert_eq!(
            ProtocolRegistry::new(&EMPTY).validate(),
            Err(RegistryError::Empty)
        );
    }

    #[test]
    fn test_validate_rejects_duplicate_id() {
        assert_eq!(
            ProtocolRegistry::new(&DUPLICATE).validate(),
            Err(RegistryError::DuplicateId { id: 7 })
        );
    }

    #[test]
    fn test_validate_rejects_non_binary_bit() {
        assert_eq!(
            ProtocolRegistry::new(&NON_BINARY).validate(),
            Err(RegistryError::InvalidBit { id: 1, index: 3 })
        );
    }
}
