pub mod aesa;
pub mod fmcw;
pub mod measurement;
pub mod pulse;
pub mod target;

pub use aesa::AesaModel;
pub use fmcw::FmcwModel;
pub use measurement::build_model;
pub use pulse::PulseDopplerModel;
pub use target::{Maneuver, OperatingVolume, Target};
