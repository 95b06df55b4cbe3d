//! Control loop
//!
//! [`Controller`] is the single owner of all runtime state. The firmware
//! calls [`Controller::run_cycle`] every 5 ms; each cycle samples the inputs,
//! debounces the buttons, steps the state machine (blocking inside the
//! emitter on a fire), persists changed settings and pushes a status
//! snapshot when it differs from the previous one.

use crate::devices::inputs::InputBank;
use crate::platform::GpioInterface;
use heapless::String;
use miles_drop_core::fsm::{FireError, SensorInputs, StateMachine, StepReport};
use miles_drop_core::input::InputDebouncer;
use miles_drop_core::protocol::{Frame, FrameEncoder, ProtocolRegistry, RegistryError, FRAME_LEN};
use miles_drop_core::status::StatusSnapshot;
use miles_drop_core::traits::{FrameTransmitter, SettingsStore, StatusRenderer, TransmitError};
use miles_drop_core::Settings;

/// Control cycle period (ms)
pub const CYCLE_PERIOD_MS: u64 = 5;

/// Drop controller context
pub struct Controller<P, X, S, R>
where
    P: GpioInterface,
    X: FrameTransmitter,
    S: SettingsStore,
    R: StatusRenderer,
{
    inputs: InputBank<P>,
    debouncer: InputDebouncer,
    machine: StateMachine,
    transmitter: X,
    store: S,
    renderer: Option<R>,
    last_snapshot: Option<StatusSnapshot>,
}

impl<P, X, S, R> Controller<P, X, S, R>
where
    P: GpioInterface,
    X: FrameTransmitter,
    S: SettingsStore,
    R: StatusRenderer,
{
    /// Validate the registry, load the settings and start in SAFE
    ///
    /// `renderer = None` runs headless.
    pub fn new(
        inputs: InputBank<P>,
        transmitter: X,
        mut store: S,
        renderer: Option<R>,
        registry: ProtocolRegistry,
        encoder: FrameEncoder,
    ) -> Result<Self, RegistryError> {
        registry.validate()?;

        let mut settings = match store.load() {
            Some(settings) => {
                crate::log_info!(
                    "Loaded settings: protocol {}, {}",
                    settings.protocol_id,
                    settings.side.as_str()
                );
                settings
            }
            None => {
                crate::log_info!("No stored settings, using defaults");
                Settings::defaults_for(&registry)
            }
        };
        if settings.sanitize(&registry) {
            crate::log_warn!(
                "Stored protocol not in registry, using {}",
                settings.protocol_id
            );
        }

        if renderer.is_none() {
            crate::log_warn!("No status display, running headless");
        }

        Ok(Self {
            inputs,
            debouncer: InputDebouncer::new(),
            machine: StateMachine::new(registry, encoder, settings),
            transmitter,
            store,
            renderer,
            last_snapshot: None,
        })
    }

    /// Run one control cycle at `now_us`
    pub fn run_cycle(&mut self, now_us: u64) -> StepReport {
        let events = self.debouncer.poll(self.inputs.buttons(), now_us);
        let sensors = self.inputs.sensors();

        let report = self
            .machine
            .step(events, sensors, now_us, &mut self.transmitter);

        self.log_report(&report);
        if report.settings_changed {
            self.persist_settings();
        }
        self.render(sensors, now_us);

        report
    }

    /// State machine
    pub fn machine(&self) -> &StateMachine {
        &self.machine
    }

    /// Frame transmitter
    pub fn transmitter(&self) -> &X {
        &self.transmitter
    }

    /// Settings store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Status renderer, `None` when headless
    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    fn log_report(&self, report: &StepReport) {
        if report.settings_changed {
            let settings = self.machine.settings();
            let name = self
                .machine
                .selected_protocol()
                .map_or("UNKNOWN", |c| c.name);
            crate::log_info!(
                "Protocol {} ({}), {}",
                settings.protocol_id,
                name,
                settings.side.as_str()
            );
        }

        if let Some(t) = report.transition {
            crate::log_info!(
                "{} -> {} ({})",
                t.from.as_str(),
                t.to.as_str(),
                t.cause.as_str()
            );
        }

        if let Some(fire) = report.fired {
            let bits = frame_bits(&fire.frame);
            crate::log_info!(
                "Shot {}: protocol {} frame {} {}",
                fire.shot,
                fire.protocol_id,
                bits.as_str(),
                if fire.confirmation.confirmed {
                    "confirmed"
                } else {
                    "not confirmed"
                }
            );
        }

        match report.fault {
            Some(FireError::UnknownProtocol { id }) => {
                crate::log_error!("Fire aborted: protocol {} not in registry", id);
            }
            Some(FireError::Transmit(e)) => {
                crate::log_error!("Transmission fault: {}", transmit_fault_name(e));
            }
            None => {}
        }
    }

    fn persist_settings(&mut self) {
        let settings = *self.machine.settings();
        if self.store.save(&settings).is_err() {
            crate::log_warn!("Settings save failed, continuing with in-memory settings");
        }
    }

    fn render(&mut self, sensors: SensorInputs, now_us: u64) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        let snapshot = StatusSnapshot::capture(&self.machine, sensors, now_us);
        if self.last_snapshot == Some(snapshot) {
            return;
        }
        if renderer.render(&snapshot).is_err() {
            crate::log_warn!("Status render failed");
        }
        self.last_snapshot = Some(snapshot);
    }
}

/// Frame as a "0"/"1" string
pub fn frame_bits(frame: &Frame) -> String<FRAME_LEN> {
    let mut bits = String::new();
    for &bit in frame.bits() {
        // FRAME_LEN capacity always fits one char per bit
        let _ = bits.push(if bit == 1 { '1' } else { '0' });
    }
    bits
}

fn transmit_fault_name(e: TransmitError) -> &'static str {
    match e {
        TransmitError::Output => "emitter output fault",
        TransmitError::Timer => "transmit timer fault",
    }
}
