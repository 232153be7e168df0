use crate::prelude::MeasurementModel;
use crate::schema::{RadarKind, RawDetection, SensorConfig};
use crate::sim::measurement::{attempt_detection, NoiseScale, SPEED_OF_LIGHT};
use crate::sim::target::Target;
use rand::rngs::StdRng;
use serde_json::json;

/// Pulsed model: the reported range and Doppler fold into the unambiguous
/// intervals set by the PRF. Only first-order (single-PRF) folding is
/// modeled; the fold order goes to diagnostics.
pub struct PulseDopplerModel {
    config: SensorConfig,
    prf_hz: f64,
    pulse_width_us: f64,
    num_pulses: u32,
    wavelength_m: f64,
    max_unambiguous_range_m: f64,
    max_unambiguous_velocity_mps: f64,
}

impl PulseDopplerModel {
    pub fn new(config: SensorConfig, prf_hz: f64, pulse_width_us: f64, num_pulses: u32) -> Self {
        let wavelength_m = SPEED_OF_LIGHT / (config.frequency_ghz * 1.0e9);
        Self {
            prf_hz,
            pulse_width_us,
            num_pulses,
            wavelength_m,
            max_unambiguous_range_m: SPEED_OF_LIGHT / (2.0 * prf_hz),
            max_unambiguous_velocity_mps: wavelength_m * prf_hz / 4.0,
            config,
        }
    }

    fn fold_range(&self, range_m: f64) -> (f64, i64) {
        let order = (range_m / self.max_unambiguous_range_m).floor() as i64;
        (range_m.rem_euclid(self.max_unambiguous_range_m), order)
    }

    fn fold_doppler(&self, doppler_mps: f64) -> f64 {
        let half_span = self.max_unambiguous_velocity_mps;
        (doppler_mps + half_span).rem_euclid(2.0 * half_span) - half_span
    }
}

impl MeasurementModel for PulseDopplerModel {
    fn config(&self) -> &SensorConfig {
        &self.config
    }

    fn measure(&mut self, target: &Target, timestamp: f64, rng: &mut StdRng) -> Option<RawDetection> {
        let scale = NoiseScale {
            range: 1.0,
            azimuth: 1.0,
            elevation: 1.5,
            doppler: 1.0,
        };
        let (obs, snr_db) = attempt_detection(&self.config, target, rng, &scale, |_| 0.0)?;
        let (range_folded, fold_order) = self.fold_range(obs.range_m);
        let doppler_folded = self.fold_doppler(obs.doppler_mps);
        Some(RawDetection {
            sensor_id: self.config.id.clone(),
            kind: RadarKind::PulseDoppler,
            timestamp,
            range_m: range_folded,
            azimuth_deg: obs.azimuth_deg,
            elevation_deg: obs.elevation_deg,
            doppler_mps: doppler_folded,
            snr_db,
            diagnostics: json!({
                "target_id": target.id,
                "rcs_dbsm": target.rcs_dbsm,
                "doppler_freq_hz": 2.0 * obs.doppler_mps / self.wavelength_m,
                "prf_hz": self.prf_hz,
                "pulse_width_us": self.pulse_width_us,
                "num_pulses": self.num_pulses,
                "range_fold_order": fold_order,
                "max_unambiguous_range_m": self.max_unambiguous_range_m,
                "max_unambiguous_velocity_mps": self.max_unambiguous_velocity_mps,
                "false_alarm": false,
            }),
        })
    }
}
