use std::env;
use std::fs;
use std::path::PathBuf;

/// Calibration defaults that can be overridden at build time
///
/// An empty value means "use the built-in default".
const CALIBRATION_VARS: [&str; 4] = [
    "MILES_BIN_US",
    "MILES_PULSE_US",
    "MILES_SIDE_BIT",
    "MILES_CONFIRM_MS",
];

fn main() {
    for var in CALIBRATION_VARS {
        match env::var(var) {
            Ok(value) => {
                println!("cargo:rustc-env={}={}", var, value);
                println!("cargo:warning=Using {} from environment: {}", var, value);
            }
            Err(_) => println!("cargo:rustc-env={}=", var),
        }
        println!("cargo:rerun-if-env-changed={}", var);
    }

    // Linker script for the RP2350 target
    if env::var_os("CARGO_FEATURE_PICO2_W").is_some() {
        let out = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR not set"));
        fs::write(out.join("memory.x"), include_bytes!("memory.x")).expect("write memory.x");
        println!("cargo:rustc-link-search={}", out.display());
        println!("cargo:rustc-link-arg-bins=--nmagic");
        println!("cargo:rustc-link-arg-bins=-Tlink.x");
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }
    println!("cargo:rerun-if-changed=memory.x");
}
