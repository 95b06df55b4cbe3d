//! MILES protocol codes and frame encoding

pub mod frame;
pub mod registry;

pub use frame::{EncoderError, Frame, FrameEncoder, Side};
pub use registry::{ProtocolCode, ProtocolRegistry, RegistryError, BUILTIN_CODES, FRAME_LEN};
