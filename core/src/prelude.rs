use crate::schema::{RawDetection, SensorConfig};
use crate::sim::Target;
use rand::rngs::StdRng;

/// Sensor-level failures: the affected sensor is skipped, never the pipeline.
#[derive(thiserror::Error, Debug)]
pub enum SensorError {
    #[error("sensor {0} is disabled")]
    Disabled(String),
    #[error("misconfigured sensor {id}: {reason}")]
    Misconfigured { id: String, reason: String },
}

pub type SensorResult<T> = Result<T, SensorError>;

/// Capability required of every radar-waveform measurement model.
///
/// `measure` emits at most one detection per (target, tick); false alarms are
/// drawn independently of any target. Models may keep per-dwell state (beam
/// steering), hence `&mut self`.
pub trait MeasurementModel: Send {
    fn config(&self) -> &SensorConfig;

    fn measure(&mut self, target: &Target, timestamp: f64, rng: &mut StdRng)
        -> Option<RawDetection>;

    fn false_alarms(&mut self, timestamp: f64, rng: &mut StdRng) -> Vec<RawDetection> {
        crate::sim::measurement::draw_false_alarms(self.config(), timestamp, rng)
    }
}
