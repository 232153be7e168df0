use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of supported radar waveform families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RadarKind {
    #[serde(rename = "FMCW")]
    Fmcw,
    #[serde(rename = "PULSE_DOPPLER")]
    PulseDoppler,
    #[serde(rename = "AESA")]
    Aesa,
}

impl RadarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RadarKind::Fmcw => "FMCW",
            RadarKind::PulseDoppler => "PULSE_DOPPLER",
            RadarKind::Aesa => "AESA",
        }
    }
}

impl fmt::Display for RadarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-waveform parameters. Adding a radar type means adding a variant here
/// and a model in `sim`; dispatch lives in `sim::measurement::build_model`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Waveform {
    #[serde(rename = "FMCW")]
    Fmcw { bandwidth_mhz: f64, chirp_time_us: f64 },
    #[serde(rename = "PULSE_DOPPLER")]
    PulseDoppler {
        prf_hz: f64,
        pulse_width_us: f64,
        num_pulses: u32,
    },
    #[serde(rename = "AESA")]
    Aesa { elements: u32, beam_width_deg: f64 },
}

impl Waveform {
    pub fn kind(&self) -> RadarKind {
        match self {
            Waveform::Fmcw { .. } => RadarKind::Fmcw,
            Waveform::PulseDoppler { .. } => RadarKind::PulseDoppler,
            Waveform::Aesa { .. } => RadarKind::Aesa,
        }
    }
}

/// Gaussian measurement-noise standard deviations. Variants scale these by
/// fixed per-type factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseProfile {
    pub range_m: f64,
    pub angle_deg: f64,
    pub doppler_mps: f64,
}

impl Default for NoiseProfile {
    fn default() -> Self {
        Self {
            range_m: 5.0,
            angle_deg: 0.5,
            doppler_mps: 0.5,
        }
    }
}

/// Static description of one radar site. Immutable after load; shared
/// read-only by every pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    pub id: String,
    #[serde(flatten)]
    pub waveform: Waveform,
    /// ENU position of the sensor in the common frame, meters.
    pub location: [f64; 3],
    /// Boresight yaw, degrees clockwise from north. Measured azimuths are
    /// relative to this.
    #[serde(default)]
    pub boresight_deg: f64,
    pub frequency_ghz: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_min_range_m")]
    pub min_range_m: f64,
    #[serde(default = "default_max_range_m")]
    pub max_range_m: f64,
    /// Full angular width of the field of regard, centered on the boresight.
    #[serde(default = "default_azimuth_fov_deg")]
    pub azimuth_fov_deg: f64,
    /// Peak probability of detection, reached at high SNR.
    #[serde(default = "default_detection_probability")]
    pub detection_probability: f64,
    /// Expected false alarms per tick (Poisson rate).
    #[serde(default = "default_false_alarm_rate")]
    pub false_alarm_rate: f64,
    #[serde(default)]
    pub noise: NoiseProfile,
}

impl SensorConfig {
    pub fn kind(&self) -> RadarKind {
        self.waveform.kind()
    }
}

fn default_enabled() -> bool {
    true
}

fn default_min_range_m() -> f64 {
    50.0
}

fn default_max_range_m() -> f64 {
    10_000.0
}

fn default_azimuth_fov_deg() -> f64 {
    360.0
}

fn default_detection_probability() -> f64 {
    0.95
}

fn default_false_alarm_rate() -> f64 {
    1.0
}
