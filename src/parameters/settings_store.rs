//! Flash-backed operator settings
//!
//! Implements [`SettingsStore`] on top of [`ParameterStore`]. A store built
//! without flash is detached and keeps the controller running headless.

use super::miles::{MilesParams, PARAM_PROTO, PARAM_SIDE};
use super::storage::{ParamValue, ParameterError, ParameterStore};
use crate::platform::FlashInterface;
use miles_drop_core::traits::SettingsStore;
use miles_drop_core::Settings;

/// Operator settings persisted in the MILES parameter group
pub struct FlashSettingsStore<F: FlashInterface> {
    flash: Option<F>,
    params: ParameterStore,
    detached_logged: bool,
}

impl<F: FlashInterface> FlashSettingsStore<F> {
    /// Open the parameter blocks on `flash`
    ///
    /// A flash read failure detaches the store.
    pub fn new(mut flash: F) -> Self {
        match ParameterStore::load_from_flash(&mut flash) {
            Ok(params) => Self::with_params(Some(flash), params),
            Err(e) => {
                crate::log_error!("Parameter flash unreadable ({:?}), settings not persisted", e);
                Self::with_params(None, ParameterStore::new())
            }
        }
    }

    /// Store without backing flash (defaults only, saves are dropped)
    pub fn detached() -> Self {
        Self::with_params(None, ParameterStore::new())
    }

    fn with_params(flash: Option<F>, mut params: ParameterStore) -> Self {
        if let Err(e) = MilesParams::register_defaults(&mut params) {
            crate::log_warn!("MILES parameter registration failed: {:?}", e);
        }
        Self {
            flash,
            params,
            detached_logged: false,
        }
    }

    /// True when no flash is attached
    pub fn is_detached(&self) -> bool {
        self.flash.is_none()
    }

    /// Full MILES parameter set (calibration and polarity included)
    pub fn miles_params(&self) -> MilesParams {
        MilesParams::from_store(&self.params)
    }

    /// Underlying parameter store
    pub fn parameters(&self) -> &ParameterStore {
        &self.params
    }
}

impl<F: FlashInterface> SettingsStore for FlashSettingsStore<F> {
    type Error = ParameterError;

    fn load(&mut self) -> Option<Settings> {
        if self.flash.is_none() || !self.params.is_persisted() {
            return None;
        }
        Some(self.miles_params().settings())
    }

    fn save(&mut self, settings: &Settings) -> Result<(), Self::Error> {
        self.params
            .set(PARAM_PROTO, ParamValue::Int(settings.protocol_id as i32))?;
        self.params
            .set(PARAM_SIDE, ParamValue::Bool(settings.side.is_opfor()))?;

        match self.flash.as_mut() {
            Some(flash) => self.params.save_to_flash(flash),
            None => {
                if !self.detached_logged {
                    crate::log_warn!("No parameter flash, settings kept in memory only");
                    self.detached_logged = true;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockFlash;
    use miles_drop_core::protocol::Side;

    #[test]
    fn test_fresh_flash_loads_nothing() {
        let mut store = FlashSettingsStore::new(MockFlash::new());
        assert!(!store.is_detached());
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_save_survives_reboot() {
        let mut store = FlashSettingsStore::new(MockFlash::new());
        store.save(&Settings::new(2, Side::Opfor)).unwrap();

        let flash = store.flash.take().unwrap();
        let mut rebooted = FlashSettingsStore::new(flash);
        assert_eq!(rebooted.load(), Some(Settings::new(2, Side::Opfor)));
    }

    #[test]
    fn test_detached_store_is_inert() {
        let mut store = FlashSettingsStore::<MockFlash>::detached();
        assert!(store.is_detached());
        assert!(store.save(&Settings::new(1, Side::Blufor)).is_ok());
        assert!(store.save(&Settings::new(2, Side::Blufor)).is_ok());
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_unreadable_flash_detaches() {
        let mut flash = MockFlash::new();
        flash.fail_all = true;
        let store = FlashSettingsStore::new(flash);
        assert!(store.is_detached());
    }

    #[test]
    fn test_write_failure_reported() {
        let mut store = FlashSettingsStore::new(MockFlash::new());
        if let Some(flash) = store.flash.as_mut() {
            flash.fail_all = true;
        }
        assert!(matches!(
            store.save(&Settings::new(3, Side::Opfor)),
            Err(ParameterError::Flash(_))
        ));
    }
}
