//! Device drivers
//!
//! Drivers built on the platform traits that implement the collaborator
//! traits of `miles_drop_core`.
//!
//! ## Modules
//!
//! - `emitter`: IR emitter and self-sense confirmation (`FrameTransmitter`)
//! - `inputs`: Button and sensor sampling with polarity
//! - `status`: Log-backed status renderer (`StatusRenderer`)

pub mod emitter;
pub mod inputs;
pub mod status;

pub use emitter::{EmitterTiming, IrEmitter, TimingError, LEAD_IN_US};
pub use inputs::{InputBank, InputPins, InputPolarity};
pub use status::LogRenderer;
