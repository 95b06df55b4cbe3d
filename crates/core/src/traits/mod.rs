//! Collaborator traits for the drop controller core.
//!
//! This module provides trait abstractions that decouple the state machine
//! from the emitter hardware, the settings storage and the status display.
//!
//! # Design
//!
//! - Trait definitions are pure and have no feature gates
//! - Mock implementations are always available for host testing
//! - Platform implementations live in the root crate

pub mod persistence;
pub mod render;
pub mod transmit;

pub use persistence::{MemorySettingsStore, NoPersistence, SaveRejected, SettingsStore};
pub use render::{NullRenderer, RecordingRenderer, RenderRejected, StatusRenderer};
pub use transmit::{ConfirmationResult, FrameTransmitter, MockTransmitter, TransmitError};
