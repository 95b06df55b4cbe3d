//! MILES drop controller firmware
//!
//! Wires the RP2350 pins to the controller and runs the control cycle every
//! 5 ms.
//!
//! # Pins
//!
//! | GPIO | Function |
//! |------|----------|
//! | GP8  | IR emitter output |
//! | GP18 | IR self-sense input |
//! | GP10 | Power / arm button (long press) |
//! | GP2  | Next protocol button |
//! | GP3  | Side toggle button |
//! | GP4  | Manual fire button |
//! | GP6  | Carrier limit switch |
//! | GP7  | Altitude threshold input |
//!
//! # Usage
//!
//! ```bash
//! cargo run --release --features pico2_w --target thumbv8m.main-none-eabihf
//! ```

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::flash::{Blocking, Flash};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_time::{Duration, Instant, Ticker, Timer};
use {defmt_rtt as _, panic_probe as _};

use miles_drop::core::control::{Controller, CYCLE_PERIOD_MS};
use miles_drop::devices::{InputBank, InputPins, IrEmitter, LogRenderer};
use miles_drop::parameters::FlashSettingsStore;
use miles_drop::platform::rp2350::{Rp2350Flash, Rp2350Input, Rp2350Output, Rp2350Timer, FLASH_SIZE};
use miles_drop_core::protocol::ProtocolRegistry;

#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

fn pull_for(active_low: bool) -> Pull {
    if active_low {
        Pull::Up
    } else {
        Pull::Down
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    info!("MILES drop controller starting");

    // Parameters first: polarity and emitter calibration live there
    let flash = Flash::<_, Blocking, FLASH_SIZE>::new_blocking(p.FLASH);
    let store = FlashSettingsStore::new(Rp2350Flash::new(flash));
    if store.is_detached() {
        warn!("Parameter flash unavailable, settings will not persist");
    }
    let params = store.miles_params();
    let polarity = params.polarity;

    let button_pull = pull_for(polarity.buttons_active_low);
    let limit_pull = pull_for(polarity.limit_active_low);
    let altitude_pull = pull_for(polarity.altitude_active_low);

    let pins = InputPins {
        power: Rp2350Input::new(Input::new(p.PIN_10, button_pull), button_pull),
        next: Rp2350Input::new(Input::new(p.PIN_2, button_pull), button_pull),
        side: Rp2350Input::new(Input::new(p.PIN_3, button_pull), button_pull),
        fire: Rp2350Input::new(Input::new(p.PIN_4, button_pull), button_pull),
        limit: Rp2350Input::new(Input::new(p.PIN_6, limit_pull), limit_pull),
        altitude: Rp2350Input::new(Input::new(p.PIN_7, altitude_pull), altitude_pull),
    };

    let emitter = IrEmitter::new(
        Rp2350Output::new(Output::new(p.PIN_8, Level::Low)),
        Rp2350Input::new(Input::new(p.PIN_18, Pull::None), Pull::None),
        Rp2350Timer::new(),
        params.emitter_timing(),
        params.sense_active_low,
    );

    let mut controller = match Controller::new(
        InputBank::new(pins, polarity),
        emitter,
        store,
        Some(LogRenderer::new()),
        ProtocolRegistry::builtin(),
        params.encoder(),
    ) {
        Ok(controller) => controller,
        Err(e) => {
            error!("Protocol table invalid: {}", Display2Format(&e));
            loop {
                Timer::after_secs(1).await;
            }
        }
    };

    info!("Control loop running ({} ms cycle)", CYCLE_PERIOD_MS);

    let mut ticker = Ticker::every(Duration::from_millis(CYCLE_PERIOD_MS));
    loop {
        controller.run_cycle(Instant::now().as_micros());
        ticker.next().await;
    }
}
