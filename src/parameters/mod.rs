//! Parameter Storage System
//!
//! Flash-backed named parameters holding the operator settings and the
//! emitter/input calibration.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │   FlashSettingsStore (SettingsStore)   │
//! │   MilesParams (typed view)             │
//! └──────────────┬─────────────────────────┘
//!                │
//!                ▼
//! ┌────────────────────────────────────────┐
//! │        ParameterStore                  │
//! │  - In-memory parameter map             │
//! │  - Two alternating CRC'd blocks        │
//! └──────────────┬─────────────────────────┘
//!                │
//!                ▼
//! ┌────────────────────────────────────────┐
//! │         Flash Interface                │
//! └────────────────────────────────────────┘
//! ```

pub mod miles;
pub mod settings_store;
pub mod storage;

pub use miles::MilesParams;
pub use settings_store::FlashSettingsStore;
pub use storage::{ParamValue, ParameterError, ParameterStore};
