//! Settings persistence abstraction

use crate::settings::Settings;

/// Non-volatile storage for [`Settings`]
///
/// Loaded once at startup and saved after every change. Implementations that
/// lost their backing storage must keep answering: `load` returns `None` and
/// `save` either succeeds as a no-op or reports the error, never blocks.
pub trait SettingsStore {
    /// Error reported by `save`
    type Error: core::fmt::Debug;

    /// Read persisted settings, `None` if nothing valid is stored
    fn load(&mut self) -> Option<Settings>;

    /// Persist `settings`
    fn save(&mut self, settings: &Settings) -> Result<(), Self::Error>;
}

/// Store that never persists anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPersistence;

impl SettingsStore for NoPersistence {
    type Error = core::convert::Infallible;

    fn load(&mut self) -> Option<Settings> {
        None
    }

    fn save(&mut self, _settings: &Settings) -> Result<(), Self::Error> {
        Ok(())
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// In-memory store for tests
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    /// Currently stored value
    pub stored: Option<Settings>,
    /// Number of successful saves
    pub saves: u32,
    /// Make every save fail
    pub fail_saves: bool,
}

/// Error returned by [`MemorySettingsStore`] when `fail_saves` is set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveRejected;

impl MemorySettingsStore {
    /// Store preloaded with `settings`
    pub fn with(settings: Settings) -> Self {
        Self {
            stored: Some(settings),
            ..Self::default()
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    type Error = SaveRejected;

    fn load(&mut self) -> Option<Settings> {
        self.stored
    }

    fn save(&mut self, settings: &Settings) -> Result<(), Self::Error> {
        if self.fail_saves {
            return Err(SaveRejected);
        }
        self.stored = Some(*settings);
        self.saves += 1;
        Ok(())
    }
}
