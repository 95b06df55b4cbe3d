//! Status snapshot handed to the display

use crate::fsm::{Indicator, OperationalState, SensorInputs, StateMachine};
use crate::protocol::Side;
use crate::traits::ConfirmationResult;

/// How long "IR FLASHED" stays up after a shot (ms)
pub const FLASH_TOAST_MS: u64 = 600;

/// How long "CONFIRMED" stays up after a confirmed shot (ms)
pub const CONFIRM_SHOW_MS: u64 = 800;

/// Name shown when the selected id is not in the registry
pub const UNKNOWN_PROTOCOL_NAME: &str = "UNKNOWN";

/// Everything the status display needs for one refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Operational state
    pub state: OperationalState,
    /// Lamp class
    pub indicator: Indicator,
    /// Selected protocol id
    pub protocol_id: u8,
    /// Selected protocol name
    pub protocol_name: &'static str,
    /// Team side
    pub side: Side,
    /// Frames sent since boot
    pub shot_count: u32,
    /// Outcome of the most recent shot
    pub last_confirmation: Option<ConfirmationResult>,
    /// Shot fired less than [`FLASH_TOAST_MS`] ago
    pub flash_toast: bool,
    /// Confirmed shot less than [`CONFIRM_SHOW_MS`] ago
    pub confirmed_visible: bool,
    /// Whole seconds until EXPENDED returns to SAFE (rounded up)
    pub expended_remaining_s: Option<u32>,
    /// Limit switch level
    pub limit_pressed: bool,
    /// Altitude sensor level
    pub altitude_reached: bool,
}

impl StatusSnapshot {
    /// Capture the machine state at `now_us`
    pub fn capture(machine: &StateMachine, sensors: SensorInputs, now_us: u64) -> Self {
        let settings = machine.settings();
        let last_fire = machine.last_fire();
        let since_fire_us = last_fire.map(|r| now_us.saturating_sub(r.fired_at_us));

        let flash_toast = since_fire_us.is_some_and(|us| us < FLASH_TOAST_MS * 1000);
        let confirmed_visible = last_fire
            .zip(since_fire_us)
            .is_some_and(|(r, us)| r.confirmation.confirmed && us < CONFIRM_SHOW_MS * 1000);

        Self {
            state: machine.state(),
            indicator: machine.state().indicator(),
            protocol_id: settings.protocol_id,
            protocol_name: machine
                .selected_protocol()
                .map_or(UNKNOWN_PROTOCOL_NAME, |c| c.name),
            side: settings.side,
            shot_count: machine.shot_count(),
            last_confirmation: machine.last_confirmation(),
            flash_toast,
            confirmed_visible,
            expended_remaining_s: machine
                .expended_remaining_us(now_us)
                .map(|us| us.div_ceil(1_000_000) as u32),
            limit_pressed: sensors.limit_pressed,
            altitude_reached: sensors.altitude_reached,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputEvents;
    use crate::protocol::{FrameEncoder, ProtocolRegistry};
    use crate::settings::Settings;
    use crate::traits::MockTransmitter;

    const MS: u64 = 1000;

    fn fired_machine(tx: &mut MockTransmitter) -> StateMachine {
        let mut m = StateMachine::new(
            ProtocolRegistry::builtin(),
            FrameEncoder::default(),
            Settings::new(2, Side::Opfor),
        );
        let idle = SensorInputs::default();
        let limit = SensorInputs {
            limit_pressed: true,
            altitude_reached: false,
        };
        m.step(InputEvents::POWER_HOLD, idle, 0, tx);
        m.step(InputEvents::empty(), limit, 10 * MS, tx);
        m.step(InputEvents::empty(), idle, 20 * MS, tx);
        m.step(InputEvents::MANUAL_FIRE, idle, 30 * MS, tx);
        m.step(InputEvents::empty(), idle, 40 * MS, tx);
        assert_eq!(m.state(), OperationalState::Expended);
        m
    }

    #[test]
    fn test_idle_snapshot() {
        let m = StateMachine::new(
            ProtocolRegistry::builtin(),
            FrameEncoder::default(),
            Settings::default(),
        );
        let snap = StatusSnapshot::capture(&m, SensorInputs::default(), 0);
        assert_eq!(snap.state, OperationalState::Safe);
        assert_eq!(snap.indicator, Indicator::Safe);
        assert_eq!(snap.protocol_name, "Universal Kill (Basic)");
        assert_eq!(snap.shot_count, 0);
        assert!(snap.last_confirmation.is_none());
        assert!(!snap.flash_toast);
        assert!(snap.expended_remaining_s.is_none());
    }

    #[test]
    fn test_feedback_windows() {
        let mut tx = MockTransmitter::confirming();
        let m = fired_machine(&mut tx);
        let idle = SensorInputs::default();

        let snap = StatusSnapshot::capture(&m, idle, 40 * MS);
        assert!(snap.flash_toast);
        assert!(snap.confirmed_visible);
        assert_eq!(snap.expended_remaining_s, Some(5));
        assert_eq!(snap.protocol_name, "Player ID 002");
        assert_eq!(snap.side, Side::Opfor);

        let snap = StatusSnapshot::capture(&m, idle, 700 * MS);
        assert!(!snap.flash_toast);
        assert!(snap.confirmed_visible);

        let snap = StatusSnapshot::capture(&m, idle, 900 * MS);
        assert!(!snap.confirmed_visible);
        assert_eq!(snap.expended_remaining_s, Some(5));

        let snap = StatusSnapshot::capture(&m, idle, 4_100 * MS);
        assert_eq!(snap.expended_remaining_s, Some(1));
    }

    #[test]
    fn test_unconfirmed_shot_never_shows_confirmed() {
        let mut tx = MockTransmitter::silent();
        let m = fired_machine(&mut tx);
        let snap = StatusSnapshot::capture(&m, SensorInputs::default(), 40 * MS);
        assert!(snap.flash_toast);
        assert!(!snap.confirmed_visible);
        assert_eq!(snap.last_confirmation.map(|c| c.confirmed), Some(false));
        assert_eq!(snap.shot_count, 1);
    }

    #[test]
    fn test_unknown_protocol_name() {
        let m = StateMachine::new(
            ProtocolRegistry::builtin(),
            FrameEncoder::default(),
            Settings::new(42, Side::Blufor),
        );
        let snap = StatusSnapshot::capture(&m, SensorInputs::default(), 0);
        assert_eq!(snap.protocol_name, UNKNOWN_PROTOCOL_NAME);
    }
}
