//! Button input processing

pub mod debounce;

pub use debounce::{
    ButtonDebouncer, ButtonLevels, HoldDetector, InputDebouncer, InputEvents, DEBOUNCE_MS,
    POWER_HOLD_MS,
};
