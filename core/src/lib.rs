//! Simulation and tracking core for the Rust radar-fusion platform.
//!
//! The modules cover the measurement chain end to end: target kinematics,
//! per-waveform measurement models, normalization into a common ENU frame,
//! and greedy multi-target tracking with a lifecycle state machine.

pub mod bus;
pub mod math;
pub mod normalize;
pub mod prelude;
pub mod schema;
pub mod sim;
pub mod telemetry;
pub mod tracker;

pub use prelude::{MeasurementModel, SensorError};
