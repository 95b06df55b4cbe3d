//! Button debouncing
//!
//! Turns raw per-cycle button levels into discrete events. Momentary buttons
//! are rate limited; the power button only reports a single event per
//! continuous hold that crosses the hold threshold.

use bitflags::bitflags;

/// Minimum spacing between accepted momentary button events (ms)
pub const DEBOUNCE_MS: u64 = 200;

/// Continuous press required for a power hold event (ms)
pub const POWER_HOLD_MS: u64 = 800;

bitflags! {
    /// Debounced events produced in one control cycle
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct InputEvents: u8 {
        /// Power button held past the hold threshold
        const POWER_HOLD = 0b0000_0001;
        /// Select the next protocol
        const NEXT_PROTOCOL = 0b0000_0010;
        /// Toggle BLUFOR/OPFOR
        const TOGGLE_SIDE = 0b0000_0100;
        /// Manual fire request
        const MANUAL_FIRE = 0b0000_1000;
    }
}

/// Logical (polarity-corrected) button levels sampled this cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonLevels {
    /// Power/arm button pressed
    pub power: bool,
    /// Next-protocol button pressed
    pub next: bool,
    /// Side-toggle button pressed
    pub side: bool,
    /// Manual-fire button pressed
    pub fire: bool,
}

/// Rate limiter for one momentary button
///
/// An active reading is accepted when no event has been accepted yet or at
/// least `interval_us` has passed since the last accepted one.
#[derive(Debug, Clone, Copy)]
pub struct ButtonDebouncer {
    interval_us: u64,
    last_accepted_us: Option<u64>,
}

impl ButtonDebouncer {
    /// Create a debouncer with the given minimum spacing
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_us: interval_ms * 1000,
            last_accepted_us: None,
        }
    }

    /// Feed one sample, returns `true` if it is accepted as an event
    pub fn update(&mut self, active: bool, now_us: u64) -> bool {
        if !active {
            return false;
        }

        let accept = match self.last_accepted_us {
            None => true,
            Some(last) => now_us.saturating_sub(last) >= self.interval_us,
        };

        if accept {
            self.last_accepted_us = Some(now_us);
        }
        accept
    }
}

impl Default for ButtonDebouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_MS)
    }
}

/// Edge-triggered long-press detector
#[derive(Debug, Clone, Copy)]
pub struct HoldDetector {
    threshold_us: u64,
    held_since_us: Option<u64>,
    fired: bool,
}

impl HoldDetector {
    /// Create a detector firing after `threshold_ms` of continuous press
    pub fn new(threshold_ms: u64) -> Self {
        Self {
            threshold_us: threshold_ms * 1000,
            held_since_us: None,
            fired: false,
        }
    }

    /// Feed one sample, returns `true` exactly once per qualifying hold
    pub fn update(&mut self, active: bool, now_us: u64) -> bool {
        if !active {
            self.held_since_us = None;
            self.fired = false;
            return false;
        }

        let since = *self.held_since_us.get_or_insert(now_us);
        if !self.fired && now_us.saturating_sub(since) >= self.threshold_us {
            self.fired = true;
            return true;
        }
        false
    }

    /// Time the button has been held, if pressed
    pub fn held_for_us(&self, now_us: u64) -> Option<u64> {
        self.held_since_us.map(|since| now_us.saturating_sub(since))
    }
}

impl Default for HoldDetector {
    fn default() -> Self {
        Self::new(POWER_HOLD_MS)
    }
}

/// Debounce state for all four buttons
#[derive(Debug, Clone, Copy, Default)]
pub struct InputDebouncer {
    power: HoldDetector,
    next: ButtonDebouncer,
    side: ButtonDebouncer,
    fire: ButtonDebouncer,
}

impl InputDebouncer {
    /// Create a debouncer with the standard intervals
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debouncer with custom intervals
    pub fn with_intervals(debounce_ms: u64, hold_ms: u64) -> Self {
        Self {
            power: HoldDetector::new(hold_ms),
            next: ButtonDebouncer::new(debounce_ms),
            side: ButtonDebouncer::new(debounce_ms),
            fire: ButtonDebouncer::new(debounce_ms),
        }
    }

    /// Process one cycle of button levels
    pub fn poll(&mut self, levels: ButtonLevels, now_us: u64) -> InputEvents {
        let mut events = InputEvents::empty();
        events.set(InputEvents::POWER_HOLD, self.power.update(levels.power, now_us));
        events.set(InputEvents::NEXT_PROTOCOL, self.next.update(levels.next, now_us));
        events.set(InputEvents::TOGGLE_SIDE, self.side.update(levels.side, now_us));
        events.set(InputEvents::MANUAL_FIRE, self.fire.update(levels.fire, now_us));
        events
    }

    /// Power hold progress, for UI feedback
    pub fn power_held_for_us(&self, now_us: u64) -> Option<u64> {
        self.power.held_for_us(now_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: u64 = 1000;

    #[test]
    fn test_first_press_accepted() {
        let mut button = ButtonDebouncer::default();
        assert!(button.update(true, 0));
    }

    #[test]
    fn test_presses_closer_than_interval_collapse() {
        let mut button = ButtonDebouncer::default();
        assert!(button.update(true, 1_000 * MS));
        assert!(!button.update(true, 1_100 * MS));
        assert!(!button.update(true, 1_199 * MS));
    }

    #[test]
    fn test_presses_at_interval_register() {
        let mut button = ButtonDebouncer::default();
        assert!(button.update(true, 1_000 * MS));
        assert!(button.update(true, 1_200 * MS));
        assert!(button.update(true, 1_450 * MS));
    }

    #[test]
    fn test_rejected_press_does_not_restart_interval() {
        let mut button = ButtonDebouncer::default();
        assert!(button.update(true, 0));
        assert!(!button.update(true, 150 * MS));
        assert!(button.update(true, 200 * MS));
    }

    #[test]
    fn test_released_never_fires() {
        let mut button = ButtonDebouncer::default();
        assert!(!button.update(false, 0));
        assert!(!button.update(false, 10_000 * MS));
    }

    #[test]
    fn test_hold_fires_once_at_threshold() {
        let mut hold = HoldDetector::default();
        assert!(!hold.update(true, 0));
        assert!(!hold.update(true, 799 * MS));
        assert!(hold.update(true, 800 * MS));
        assert!(!hold.update(true, 1_600 * MS));
        assert!(!hold.update(true, 5_000 * MS));
    }

    #[test]
    fn test_hold_rearms_after_release() {
        let mut hold = HoldDetector::default();
        hold.update(true, 0);
        assert!(hold.update(true, 800 * MS));
        assert!(!hold.update(false, 900 * MS));
        assert!(hold.held_for_us(900 * MS).is_none());

        assert!(!hold.update(true, 1_000 * MS));
        assert!(hold.update(true, 1_800 * MS));
    }

    #[test]
    fn test_short_taps_never_fire() {
        let mut hold = HoldDetector::default();
        for i in 0..10 {
            let t = i * 1_000 * MS;
            assert!(!hold.update(true, t));
            assert!(!hold.update(true, t + 500 * MS));
            assert!(!hold.update(false, t + 600 * MS));
        }
    }

    #[test]
    fn test_poll_collects_events() {
        let mut debouncer = InputDebouncer::new();
        let levels = ButtonLevels {
            power: true,
            next: true,
            side: false,
            fire: true,
        };

        let events = debouncer.poll(levels, 0);
        assert_eq!(events, InputEvents::NEXT_PROTOCOL | InputEvents::MANUAL_FIRE);

        let events = debouncer.poll(levels, 100 * MS);
        assert!(events.is_empty());

        let events = debouncer.poll(levels, 800 * MS);
        assert_eq!(
            events,
            InputEvents::POWER_HOLD | InputEvents::NEXT_PROTOCOL | InputEvents::MANUAL_FIRE
        );
        assert_eq!(debouncer.power_held_for_us(800 * MS), Some(800 * MS));
    }

    #[test]
    fn test_custom_intervals() {
        let mut debouncer = InputDebouncer::with_intervals(50, 100);
        let press = ButtonLevels {
            power: true,
            ..Default::default()
        };
        assert!(debouncer.poll(press, 0).is_empty());
        assert_eq!(debouncer.poll(press, 100 * MS), InputEvents::POWER_HOLD);
    }
}
