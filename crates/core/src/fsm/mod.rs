//! Drop controller state machine

pub mod error;
pub mod machine;
pub mod state;

pub use error::FireError;
pub use machine::{
    FireRecord, SensorInputs, StateMachine, StepReport, Transition, TransitionCause, EXPENDED_MS,
};
pub use state::{Indicator, OperationalState};
