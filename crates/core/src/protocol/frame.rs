//! Frame encoding
//!
//! A [`Frame`] is the 11-bit word actually put on the emitter: the selected
//! protocol pattern with the team side written into one fixed bit.

use super::registry::{ProtocolCode, FRAME_LEN};
use core::fmt;

/// Team side encoded into every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    /// Blue force (side bit 0)
    #[default]
    Blufor,
    /// Opposing force (side bit 1)
    Opfor,
}

impl Side {
    /// Bit value written into the frame
    pub fn bit(self) -> u8 {
        match self {
            Side::Blufor => 0,
            Side::Opfor => 1,
        }
    }

    /// The other side
    pub fn toggled(self) -> Self {
        match self {
            Side::Blufor => Side::Opfor,
            Side::Opfor => Side::Blufor,
        }
    }

    /// Display name
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Blufor => "BLUFOR",
            Side::Opfor => "OPFOR",
        }
    }

    /// Persisted flag form (`true` = OPFOR)
    pub fn is_opfor(self) -> bool {
        self == Side::Opfor
    }
}

impl From<bool> for Side {
    fn from(opfor: bool) -> Self {
        if opfor {
            Side::Opfor
        } else {
            Side::Blufor
        }
    }
}

/// Encoded, ready-to-send bit frame
///
/// Built once per fire transition and consumed by the transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    bits: [u8; FRAME_LEN],
}

impl Frame {
    /// Bits in transmission order
    pub fn bits(&self) -> &[u8; FRAME_LEN] {
        &self.bits
    }

    /// Whether bit `index` is set
    pub fn is_set(&self, index: usize) -> bool {
        self.bits.get(index).is_some_and(|&b| b == 1)
    }

    /// Frame length (always [`FRAME_LEN`])
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Always false; frames have a fixed length
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Pack into an integer, first-sent bit as MSB (for logging)
    pub fn to_word(&self) -> u16 {
        self.bits
            .iter()
            .fold(0u16, |acc, &b| (acc << 1) | u16::from(b))
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.bits {
            f.write_str(if b == 1 { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Encoder configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderError {
    /// Side bit index outside the frame
    SideIndexOutOfRange {
        /// Requested index
        index: usize,
    },
}

impl fmt::Display for EncoderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncoderError::SideIndexOutOfRange { index } => {
                write!(f, "side bit index {} outside {}-bit frame", index, FRAME_LEN)
            }
        }
    }
}

/// Builds frames with the side flag at a configured bit position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameEncoder {
    side_index: usize,
}

impl FrameEncoder {
    /// Side bit position used unless calibrated otherwise
    pub const DEFAULT_SIDE_INDEX: usize = 5;

    /// Create an encoder writing the side flag at `side_index`
    pub fn new(side_index: usize) -> Result<Self, EncoderError> {
        if side_index >= FRAME_LEN {
            return Err(EncoderError::SideIndexOutOfRange { index: side_index });
        }
        Ok(Self { side_index })
    }

    /// Configured side bit position
    pub fn side_index(&self) -> usize {
        self.side_index
    }

    /// Copy the code pattern and overwrite the side bit
    pub fn encode(&self, code: &ProtocolCode, side: Side) -> Frame {
        let mut bits = [0u8; FRAME_LEN];
        for (dst, &src) in bits.iter_mut().zip(code.pattern.iter()) {
            *dst = u8::from(src != 0);
        }
        bits[self.side_index] = side.bit();
        Frame { bits }
    }
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self {
            side_index: Self::DEFAULT_SIDE_INDEX,
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::string::ToString;

    use super::*;
    use crate::protocol::registry::ProtocolRegistry;

    #[test]
    fn test_encode_preserves_all_but_side_bit() {
        let registry = ProtocolRegistry::builtin();

        for index in 0..FRAME_LEN {
            let encoder = FrameEncoder::new(index).unwrap();
            for code in registry.iter() {
                for side in [Side::Blufor, Side::Opfor] {
                    let frame = encoder.encode(code, side);
                    assert_eq!(frame.len(), FRAME_LEN);
                    for (i, &bit) in frame.bits().iter().enumerate() {
                        assert!(bit <= 1);
                        if i == index {
                            assert_eq!(bit, side.bit());
                        } else {
                            assert_eq!(bit, code.pattern[i]);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_opfor_sets_default_side_bit() {
        let code = ProtocolRegistry::builtin().get(1).copied().unwrap();
        assert_eq!(code.pattern[5], 0);

        let frame = FrameEncoder::default().encode(&code, Side::Opfor);
        assert!(frame.is_set(5));
        assert_eq!(frame.to_string(), "10010111010");
    }

    #[test]
    fn test_blufor_clears_default_side_bit() {
        let code = ProtocolRegistry::builtin().get(0).copied().unwrap();
        assert_eq!(code.pattern[5], 1);

        let frame = FrameEncoder::default().encode(&code, Side::Blufor);
        assert!(!frame.is_set(5));
    }

    #[test]
    fn test_side_index_out_of_range() {
        assert_eq!(
            FrameEncoder::new(FRAME_LEN),
            Err(EncoderError::SideIndexOutOfRange { index: FRAME_LEN })
        );
    }

    #[test]
    fn test_to_word_msb_first() {
        let code = ProtocolCode::new(9, "T", [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
        let frame = FrameEncoder::new(10).unwrap().encode(&code, Side::Blufor);
        assert_eq!(frame.to_word(), 0b100_0000_0000);
    }

    #[test]
    fn test_side_from_flag() {
        assert_eq!(Side::from(true), Side::Opfor);
        assert_eq!(Side::from(false), Side::Blufor);
        assert_eq!(Side::Blufor.toggled(), Side::Opfor);
        assert!(Side::Opfor.is_opfor());
    }
}
