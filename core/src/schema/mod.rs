pub mod detection;
pub mod sensor;
pub mod track;

pub use detection::{NormalizedDetection, RawDetection};
pub use sensor::{NoiseProfile, RadarKind, SensorConfig, Waveform};
pub use track::{Track, TrackSnapshot, TrackState};
