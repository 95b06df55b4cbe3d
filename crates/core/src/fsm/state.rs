//! Operational states

/// Arming state of the drop controller
///
/// Progresses SAFE → SAFE_READY → ARMED_FLY → ARMED_SENSING →
/// ARMED_IR_FLASH → EXPENDED → SAFE; a power hold returns to SAFE from
/// anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationalState {
    /// Disarmed (boot state)
    #[default]
    Safe,
    /// Operator armed, waiting for the carrier limit switch
    SafeReady,
    /// Mounted on the carrier, limit switch pressed
    ArmedFly,
    /// Released from the carrier, waiting for altitude or manual fire
    ArmedSensing,
    /// Fire committed, frame goes out on the next cycle
    ArmedIrFlash,
    /// Shot fired, cooling down before returning to SAFE
    Expended,
}

/// Coarse indicator class (maps to the green/orange/red state lamps)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// Disarmed
    Safe,
    /// Any armed state
    Armed,
    /// Shot fired
    Expended,
}

impl OperationalState {
    /// Display name (static so it can be logged on every target)
    pub fn as_str(self) -> &'static str {
        match self {
            OperationalState::Safe => "SAFE",
            OperationalState::SafeReady => "SAFE READY",
            OperationalState::ArmedFly => "ARMED FLY",
            OperationalState::ArmedSensing => "ARMED SENSE",
            OperationalState::ArmedIrFlash => "IR FLASH",
            OperationalState::Expended => "EXPENDED",
        }
    }

    /// Indicator class for this state
    pub fn indicator(self) -> Indicator {
        match self {
            OperationalState::Safe => Indicator::Safe,
            OperationalState::SafeReady
            | OperationalState::ArmedFly
            | OperationalState::ArmedSensing
            | OperationalState::ArmedIrFlash => Indicator::Armed,
            OperationalState::Expended => Indicator::Expended,
        }
    }

    /// Target of a power hold from this state
    pub fn on_power_hold(self) -> Self {
        match self {
            OperationalState::Safe => OperationalState::SafeReady,
            _ => OperationalState::Safe,
        }
    }
}

impl core::fmt::Display for OperationalState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [OperationalState; 6] = [
        OperationalState::Safe,
        OperationalState::SafeReady,
        OperationalState::ArmedFly,
        OperationalState::ArmedSensing,
        OperationalState::ArmedIrFlash,
        OperationalState::Expended,
    ];

    #[test]
    fn test_power_hold_targets() {
        for state in ALL {
            let expected = if state == OperationalState::Safe {
                OperationalState::SafeReady
            } else {
                OperationalState::Safe
            };
            assert_eq!(state.on_power_hold(), expected);
        }
    }

    #[test]
    fn test_indicator_classes() {
        assert_eq!(OperationalState::Safe.indicator(), Indicator::Safe);
        assert_eq!(OperationalState::SafeReady.indicator(), Indicator::Armed);
        assert_eq!(OperationalState::ArmedIrFlash.indicator(), Indicator::Armed);
        assert_eq!(OperationalState::Expended.indicator(), Indicator::Expended);
    }

    #[test]
    fn test_default_is_safe() {
        assert_eq!(OperationalState::default(), OperationalState::Safe);
    }
}
