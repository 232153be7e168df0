use crate::prelude::MeasurementModel;
use crate::schema::{RadarKind, RawDetection, SensorConfig};
use crate::sim::measurement::{attempt_detection, NoiseScale, SPEED_OF_LIGHT};
use crate::sim::target::Target;
use rand::rngs::StdRng;
use serde_json::json;

/// Continuous-wave model: range couples to the beat frequency of the chirped
/// carrier. No ambiguity handling.
pub struct FmcwModel {
    config: SensorConfig,
    bandwidth_hz: f64,
    chirp_time_s: f64,
    range_resolution_m: f64,
}

impl FmcwModel {
    pub fn new(config: SensorConfig, bandwidth_mhz: f64, chirp_time_us: f64) -> Self {
        let bandwidth_hz = bandwidth_mhz * 1.0e6;
        Self {
            range_resolution_m: SPEED_OF_LIGHT / (2.0 * bandwidth_hz),
            chirp_time_s: chirp_time_us * 1.0e-6,
            bandwidth_hz,
            config,
        }
    }

    fn beat_frequency_khz(&self, range_m: f64) -> f64 {
        2.0 * self.bandwidth_hz * range_m / (SPEED_OF_LIGHT * self.chirp_time_s) / 1000.0
    }
}

impl MeasurementModel for FmcwModel {
    fn config(&self) -> &SensorConfig {
        &self.config
    }

    fn measure(&mut self, target: &Target, timestamp: f64, rng: &mut StdRng) -> Option<RawDetection> {
        let (obs, snr_db) =
            attempt_detection(&self.config, target, rng, &NoiseScale::uniform(1.0), |_| 0.0)?;
        Some(RawDetection {
            sensor_id: self.config.id.clone(),
            kind: RadarKind::Fmcw,
            timestamp,
            range_m: obs.range_m,
            azimuth_deg: obs.azimuth_deg,
            elevation_deg: obs.elevation_deg,
            doppler_mps: obs.doppler_mps,
            snr_db,
            diagnostics: json!({
                "target_id": target.id,
                "rcs_dbsm": target.rcs_dbsm,
                "beat_frequency_khz": self.beat_frequency_khz(obs.range_m),
                "chirp_time_us": self.chirp_time_s * 1.0e6,
                "range_resolution_m": self.range_resolution_m,
                "false_alarm": false,
            }),
        })
    }
}
