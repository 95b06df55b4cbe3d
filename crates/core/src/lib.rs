//! miles_drop_core - Pure no_std logic for the MILES drop controller
//!
//! This crate contains the platform-agnostic state machine, protocol encoding
//! and input processing, testable on host without any feature flags or
//! embassy dependencies.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies
//! - **Trait abstractions**: Emitter, storage and display injected via traits
//! - **Explicit time**: Every time-dependent call takes `now_us`
//!
//! # Modules
//!
//! - [`traits`]: Transmitter, settings store and renderer abstractions
//! - [`protocol`]: MILES code registry and frame encoding
//! - [`input`]: Button debouncing and power-hold detection
//! - [`fsm`]: Arming state machine
//! - [`settings`]: Operator settings
//! - [`status`]: Status snapshot for the display

#![no_std]

pub mod fsm;
pub mod input;
pub mod protocol;
pub mod settings;
pub mod status;
pub mod traits;

pub use fsm::{OperationalState, StateMachine};
pub use settings::Settings;
pub use status::StatusSnapshot;
