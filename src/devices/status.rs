//! Status renderer writing to the log

use core::convert::Infallible;
use miles_drop_core::status::StatusSnapshot;
use miles_drop_core::traits::StatusRenderer;

/// Renders snapshots as log lines
///
/// Used when no display is attached. One line per pushed snapshot plus one
/// for each active feedback flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRenderer;

impl LogRenderer {
    /// Create a renderer
    pub fn new() -> Self {
        Self
    }
}

impl StatusRenderer for LogRenderer {
    type Error = Infallible;

    fn render(&mut self, snapshot: &StatusSnapshot) -> Result<(), Self::Error> {
        crate::log_info!(
            "[{}] {} ({}) {} shots={} limit={} alt={}",
            snapshot.state.as_str(),
            snapshot.protocol_name,
            snapshot.protocol_id,
            snapshot.side.as_str(),
            snapshot.shot_count,
            snapshot.limit_pressed,
            snapshot.altitude_reached
        );
        if let Some(remaining) = snapshot.expended_remaining_s {
            crate::log_info!("Reset in {}s", remaining);
        }
        if snapshot.flash_toast {
            crate::log_info!("IR FLASHED");
        }
        if snapshot.confirmed_visible {
            crate::log_info!("CONFIRMED");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miles_drop_core::fsm::{SensorInputs, StateMachine};
    use miles_drop_core::protocol::{FrameEncoder, ProtocolRegistry};
    use miles_drop_core::Settings;

    #[test]
    fn test_log_renderer_never_fails() {
        let machine = StateMachine::new(
            ProtocolRegistry::builtin(),
            FrameEncoder::default(),
            Settings::default(),
        );
        let snapshot = StatusSnapshot::capture(&machine, SensorInputs::default(), 0);
        assert!(LogRenderer::new().render(&snapshot).is_ok());
    }
}
