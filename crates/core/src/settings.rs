//! Operator settings
//!
//! The selected protocol and team side. Owned by the state machine, persisted
//! through a [`SettingsStore`](crate::traits::SettingsStore).

use crate::protocol::{ProtocolRegistry, Side};

/// Persisted operator selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settings {
    /// Selected protocol id
    pub protocol_id: u8,
    /// Team side
    pub side: Side,
}

impl Settings {
    /// Create settings
    pub fn new(protocol_id: u8, side: Side) -> Self {
        Self { protocol_id, side }
    }

    /// Defaults for `registry`: its first code, BLUFOR
    pub fn defaults_for(registry: &ProtocolRegistry) -> Self {
        Self {
            protocol_id: registry.first().map_or(0, |c| c.id),
            side: Side::Blufor,
        }
    }

    /// Replace an id unknown to `registry` with its first code
    ///
    /// Returns `true` if the id had to be replaced.
    pub fn sanitize(&mut self, registry: &ProtocolRegistry) -> bool {
        if registry.contains(self.protocol_id) {
            return false;
        }
        self.protocol_id = registry.first().map_or(0, |c| c.id);
        true
    }
}
