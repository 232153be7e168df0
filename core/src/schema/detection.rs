use crate::schema::sensor::RadarKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sensor-frame detection emitted by a measurement model.
///
/// Ephemeral: produced and consumed within a single tick. Azimuth is
/// sensor-relative (degrees clockwise from the boresight, wrapped to
/// [0, 360)); waveform-specific fields ride in `diagnostics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDetection {
    pub sensor_id: String,
    pub kind: RadarKind,
    pub timestamp: f64,
    pub range_m: f64,
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub doppler_mps: f64,
    pub snr_db: f64,
    #[serde(default)]
    pub diagnostics: Value,
}

/// Detection projected into the unified ENU schema. Immutable once created.
///
/// The velocity estimate carries only the radial (Doppler) component along
/// the line of sight; the tangential component is zero by construction, a
/// documented limitation of single-sensor measurements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedDetection {
    pub timestamp: f64,
    pub sensor_id: String,
    pub kind: RadarKind,
    pub range_m: f64,
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub doppler_mps: f64,
    pub snr_db: f64,
    pub position_enu: [f64; 3],
    pub velocity_enu: [f64; 3],
    #[serde(default)]
    pub diagnostics: Value,
}
