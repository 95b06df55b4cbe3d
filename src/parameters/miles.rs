//! MILES Drop Controller Parameters
//!
//! # Parameters
//!
//! Operator selection (written on every change):
//! - `MILES_PROTO` - Selected protocol id
//! - `MILES_SIDE` - Side flag (false = BLUFOR, true = OPFOR)
//!
//! Emitter calibration:
//! - `MILES_BIN_US` - Bin duration (µs)
//! - `MILES_PULSE_US` - Pulse width (µs, at most one bin)
//! - `MILES_SIDE_BIT` - Frame index carrying the side flag
//! - `MILES_CONF_MS` - Self-sense confirmation window (ms)
//!
//! Input polarity:
//! - `MILES_BTN_INV` - Buttons active-low
//! - `MILES_LIM_INV` - Limit switch active-low
//! - `MILES_ALT_INV` - Altitude input active-low
//! - `MILES_SNS_INV` - Self-sense input active-low
//!
//! Calibration defaults can be overridden at build time through the
//! `MILES_BIN_US`, `MILES_PULSE_US`, `MILES_SIDE_BIT` and `MILES_CONFIRM_MS`
//! environment variables.

use super::storage::{ParamValue, ParameterStore, Result};
use crate::devices::emitter::{
    EmitterTiming, DEFAULT_BIN_US, DEFAULT_CONFIRM_MS, DEFAULT_PULSE_US,
};
use crate::devices::inputs::InputPolarity;
use miles_drop_core::protocol::{FrameEncoder, Side};
use miles_drop_core::Settings;

/// Selected protocol id
pub const PARAM_PROTO: &str = "MILES_PROTO";
/// Side flag
pub const PARAM_SIDE: &str = "MILES_SIDE";

/// MILES parameters loaded from the parameter store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MilesParams {
    /// Selected protocol id (may be unknown to the registry)
    pub protocol_id: u8,
    /// Team side
    pub side: Side,
    /// Bin duration (µs)
    pub bin_us: u32,
    /// Pulse width (µs)
    pub pulse_us: u32,
    /// Side bit index
    pub side_bit: usize,
    /// Confirmation window (ms)
    pub confirm_ms: u32,
    /// Input polarity
    pub polarity: InputPolarity,
    /// Self-sense active-low
    pub sense_active_low: bool,
}

impl MilesParams {
    /// Register MILES parameters with default values
    ///
    /// Parameters are only registered if they don't already exist.
    pub fn register_defaults(store: &mut ParameterStore) -> Result<()> {
        let defaults = Self::default();

        store.register(PARAM_PROTO, ParamValue::Int(defaults.protocol_id as i32))?;
        store.register(PARAM_SIDE, ParamValue::Bool(defaults.side.is_opfor()))?;

        store.register("MILES_BIN_US", ParamValue::Int(defaults.bin_us as i32))?;
        store.register("MILES_PULSE_US", ParamValue::Int(defaults.pulse_us as i32))?;
        store.register("MILES_SIDE_BIT", ParamValue::Int(defaults.side_bit as i32))?;
        store.register("MILES_CONF_MS", ParamValue::Int(defaults.confirm_ms as i32))?;

        let polarity = defaults.polarity;
        store.register("MILES_BTN_INV", ParamValue::Bool(polarity.buttons_active_low))?;
        store.register("MILES_LIM_INV", ParamValue::Bool(polarity.limit_active_low))?;
        store.register("MILES_ALT_INV", ParamValue::Bool(polarity.altitude_active_low))?;
        store.register("MILES_SNS_INV", ParamValue::Bool(defaults.sense_active_low))?;

        Ok(())
    }

    /// Load MILES parameters from parameter store
    ///
    /// Missing or mistyped entries fall back to the defaults.
    pub fn from_store(store: &ParameterStore) -> Self {
        let d = Self::default();
        let int = |name: &str, default: u32| {
            store
                .get_int(name)
                .map_or(default, |v| u32::try_from(v).unwrap_or(0))
        };
        let flag = |name: &str, default: bool| store.get_bool(name).unwrap_or(default);

        Self {
            protocol_id: store
                .get_int(PARAM_PROTO)
                .map_or(d.protocol_id, |v| u8::try_from(v).unwrap_or(u8::MAX)),
            side: Side::from(flag(PARAM_SIDE, d.side.is_opfor())),
            bin_us: int("MILES_BIN_US", d.bin_us),
            pulse_us: int("MILES_PULSE_US", d.pulse_us),
            side_bit: int("MILES_SIDE_BIT", d.side_bit as u32) as usize,
            confirm_ms: int("MILES_CONF_MS", d.confirm_ms),
            polarity: InputPolarity {
                buttons_active_low: flag("MILES_BTN_INV", d.polarity.buttons_active_low),
                limit_active_low: flag("MILES_LIM_INV", d.polarity.limit_active_low),
                altitude_active_low: flag("MILES_ALT_INV", d.polarity.altitude_active_low),
            },
            sense_active_low: flag("MILES_SNS_INV", d.sense_active_low),
        }
    }

    /// Operator settings part
    pub fn settings(&self) -> Settings {
        Settings::new(self.protocol_id, self.side)
    }

    /// Validated emitter timing, built-in defaults if invalid
    pub fn emitter_timing(&self) -> EmitterTiming {
        EmitterTiming::new(self.bin_us, self.pulse_us, self.confirm_ms).unwrap_or_else(|e| {
            crate::log_warn!("Invalid emitter timing ({:?}), using defaults", e);
            EmitterTiming::DEFAULT
        })
    }

    /// Frame encoder for the configured side bit, default index if invalid
    pub fn encoder(&self) -> FrameEncoder {
        FrameEncoder::new(self.side_bit).unwrap_or_else(|_| {
            crate::log_warn!(
                "Invalid side bit {}, using {}",
                self.side_bit,
                FrameEncoder::DEFAULT_SIDE_INDEX
            );
            FrameEncoder::default()
        })
    }
}

impl Default for MilesParams {
    fn default() -> Self {
        Self {
            protocol_id: 0,
            side: Side::Blufor,
            bin_us: build_default(env!("MILES_BIN_US"), DEFAULT_BIN_US),
            pulse_us: build_default(env!("MILES_PULSE_US"), DEFAULT_PULSE_US),
            side_bit: build_default(
                env!("MILES_SIDE_BIT"),
                FrameEncoder::DEFAULT_SIDE_INDEX as u32,
            ) as usize,
            confirm_ms: build_default(env!("MILES_CONFIRM_MS"), DEFAULT_CONFIRM_MS),
            polarity: InputPolarity::default(),
            sense_active_low: false,
        }
    }
}

/// Parse a build-time override, empty or malformed values give `fallback`
fn build_default(value: &str, fallback: u32) -> u32 {
    value.parse::<u32>().unwrap_or(fallback)
}
