//! Arming state machine
//!
//! Evaluated once per control cycle with the debounced button events and the
//! sensor levels of that cycle. Rules, in priority order:
//!
//! 1. Protocol/side selection events update [`Settings`] in any state.
//! 2. A power hold returns to SAFE from any state (SAFE itself arms to
//!    SAFE_READY) and cancels the EXPENDED timer.
//! 3. Otherwise the current state's own guard is evaluated.
//!
//! At most one transition is taken per cycle. The ARMED_IR_FLASH → EXPENDED
//! transition builds the frame, counts the shot and blocks in the transmitter
//! until the confirmation window has closed.

use super::error::FireError;
use super::state::OperationalState;
use crate::input::InputEvents;
use crate::protocol::{Frame, FrameEncoder, ProtocolCode, ProtocolRegistry};
use crate::settings::Settings;
use crate::traits::{ConfirmationResult, FrameTransmitter, TransmitError};

/// Time spent in EXPENDED before returning to SAFE (ms)
pub const EXPENDED_MS: u64 = 5000;

/// Sensor levels sampled this cycle (polarity already applied)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorInputs {
    /// Carrier limit switch pressed
    pub limit_pressed: bool,
    /// Altitude at or above the release threshold
    pub altitude_reached: bool,
}

/// Why a transition was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCause {
    /// Power button held
    PowerHold,
    /// Limit switch closed
    LimitPressed,
    /// Limit switch opened
    LimitReleased,
    /// Altitude sensor reached threshold
    AltitudeReached,
    /// Manual fire button
    ManualFire,
    /// Frame transmitted
    Fired,
    /// EXPENDED timer elapsed
    ExpendedTimeout,
}

impl TransitionCause {
    /// Short name for logging
    pub fn as_str(self) -> &'static str {
        match self {
            TransitionCause::PowerHold => "power hold",
            TransitionCause::LimitPressed => "limit pressed",
            TransitionCause::LimitReleased => "limit released",
            TransitionCause::AltitudeReached => "altitude reached",
            TransitionCause::ManualFire => "manual fire",
            TransitionCause::Fired => "fired",
            TransitionCause::ExpendedTimeout => "expended timeout",
        }
    }
}

/// A transition taken during one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State before
    pub from: OperationalState,
    /// State after
    pub to: OperationalState,
    /// Trigger
    pub cause: TransitionCause,
}

/// Record of one shot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireRecord {
    /// Protocol that was sent
    pub protocol_id: u8,
    /// Frame handed to the transmitter
    pub frame: Frame,
    /// Shot number (shot_count after this shot)
    pub shot: u32,
    /// Self-sense outcome
    pub confirmation: ConfirmationResult,
    /// Transmitter fault, if the frame may not have gone out completely
    pub fault: Option<TransmitError>,
    /// Control cycle time of the fire transition (µs)
    pub fired_at_us: u64,
}

/// Everything that happened during one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepReport {
    /// Transition taken, if any
    pub transition: Option<Transition>,
    /// Settings changed and should be persisted
    pub settings_changed: bool,
    /// Shot fired this step
    pub fired: Option<FireRecord>,
    /// Fire error to report
    pub fault: Option<FireError>,
}

/// Drop controller state machine
///
/// Owns the operational state, the operator settings and the session
/// counters. Single owner, driven by the control loop only.
#[derive(Debug, Clone)]
pub struct StateMachine {
    state: OperationalState,
    registry: ProtocolRegistry,
    encoder: FrameEncoder,
    settings: Settings,
    expended_duration_us: u64,
    expended_since_us: Option<u64>,
    shot_count: u32,
    last_fire: Option<FireRecord>,
}

impl StateMachine {
    /// Create a machine in SAFE
    pub fn new(registry: ProtocolRegistry, encoder: FrameEncoder, settings: Settings) -> Self {
        Self {
            state: OperationalState::Safe,
            registry,
            encoder,
            settings,
            expended_duration_us: EXPENDED_MS * 1000,
            expended_since_us: None,
            shot_count: 0,
            last_fire: None,
        }
    }

    /// Override the EXPENDED hold time
    pub fn with_expended_duration(mut self, ms: u64) -> Self {
        self.expended_duration_us = ms * 1000;
        self
    }

    /// Current state
    pub fn state(&self) -> OperationalState {
        self.state
    }

    /// Current settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings (startup load)
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Protocol registry
    pub fn registry(&self) -> &ProtocolRegistry {
        &self.registry
    }

    /// Frame encoder
    pub fn encoder(&self) -> &FrameEncoder {
        &self.encoder
    }

    /// Selected protocol, `None` if the id is not in the registry
    pub fn selected_protocol(&self) -> Option<&'static ProtocolCode> {
        self.registry.get(self.settings.protocol_id)
    }

    /// Frames transmitted since boot
    pub fn shot_count(&self) -> u32 {
        self.shot_count
    }

    /// Most recent shot
    pub fn last_fire(&self) -> Option<&FireRecord> {
        self.last_fire.as_ref()
    }

    /// Confirmation of the most recent shot
    pub fn last_confirmation(&self) -> Option<ConfirmationResult> {
        self.last_fire.map(|r| r.confirmation)
    }

    /// Time left in EXPENDED, `None` in any other state
    pub fn expended_remaining_us(&self, now_us: u64) -> Option<u64> {
        if self.state != OperationalState::Expended {
            return None;
        }
        let elapsed = self
            .expended_since_us
            .map_or(0, |since| now_us.saturating_sub(since));
        Some(self.expended_duration_us.saturating_sub(elapsed))
    }

    /// Run one control cycle
    ///
    /// Blocks inside `transmitter` when the fire transition is taken.
    pub fn step<T: FrameTransmitter>(
        &mut self,
        events: InputEvents,
        sensors: SensorInputs,
        now_us: u64,
        transmitter: &mut T,
    ) -> StepReport {
        let mut report = StepReport {
            settings_changed: self.apply_selection(events),
            ..StepReport::default()
        };

        if events.contains(InputEvents::POWER_HOLD) {
            self.expended_since_us = None;
            let to = self.state.on_power_hold();
            report.transition = Some(self.enter(to, TransitionCause::PowerHold));
            return report;
        }

        let next = match self.state {
            OperationalState::Safe => None,
            OperationalState::SafeReady => sensors
                .limit_pressed
                .then_some((OperationalState::ArmedFly, TransitionCause::LimitPressed)),
            OperationalState::ArmedFly => (!sensors.limit_pressed)
                .then_some((OperationalState::ArmedSensing, TransitionCause::LimitReleased)),
            OperationalState::ArmedSensing => {
                if sensors.altitude_reached {
                    Some((
                        OperationalState::ArmedIrFlash,
                        TransitionCause::AltitudeReached,
                    ))
                } else if events.contains(InputEvents::MANUAL_FIRE) {
                    Some((OperationalState::ArmedIrFlash, TransitionCause::ManualFire))
                } else {
                    None
                }
            }
            OperationalState::ArmedIrFlash => match self.fire(now_us, transmitter) {
                Ok(record) => {
                    report.fired = Some(record);
                    report.fault = record.fault.map(FireError::Transmit);
                    self.expended_since_us = Some(now_us);
                    Some((OperationalState::Expended, TransitionCause::Fired))
                }
                Err(e) => {
                    report.fault = Some(e);
                    None
                }
            },
            OperationalState::Expended => {
                let since = *self.expended_since_us.get_or_insert(now_us);
                (now_us.saturating_sub(since) >= self.expended_duration_us)
                    .then_some((OperationalState::Safe, TransitionCause::ExpendedTimeout))
            }
        };

        if let Some((to, cause)) = next {
            if to != OperationalState::Expended {
                self.expended_since_us = None;
            }
            report.transition = Some(self.enter(to, cause));
        }

        report
    }

    fn enter(&mut self, to: OperationalState, cause: TransitionCause) -> Transition {
        let transition = Transition {
            from: self.state,
            to,
            cause,
        };
        self.state = to;
        transition
    }

    fn apply_selection(&mut self, events: InputEvents) -> bool {
        let before = self.settings;

        if events.contains(InputEvents::NEXT_PROTOCOL) {
            if let Some(code) = self.registry.next_after(self.settings.protocol_id) {
                self.settings.protocol_id = code.id;
            }
        }
        if events.contains(InputEvents::TOGGLE_SIDE) {
            self.settings.side = self.settings.side.toggled();
        }

        self.settings != before
    }

    fn fire<T: FrameTransmitter>(
        &mut self,
        now_us: u64,
        transmitter: &mut T,
    ) -> Result<FireRecord, FireError> {
        let id = self.settings.protocol_id;
        let code = self
            .registry
            .get(id)
            .ok_or(FireError::UnknownProtocol { id })?;
        let frame = self.encoder.encode(code, self.settings.side);

        // Counted before the first bit goes out
        self.shot_count = self.shot_count.saturating_add(1);

        let (confirmation, fault) = match transmitter.transmit(&frame) {
            Ok(result) => (result, None),
            Err(e) => (ConfirmationResult::not_confirmed(now_us), Some(e)),
        };

        let record = FireRecord {
            protocol_id: id,
            frame,
            shot: self.shot_count,
            confirmation,
            fault,
            fired_at_us: now_us,
        };
        self.last_fire = Some(record);
        Ok(record)
    }
}
