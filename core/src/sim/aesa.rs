use crate::math::geometry::wrap_signed_deg;
use crate::prelude::MeasurementModel;
use crate::schema::{RadarKind, RawDetection, SensorConfig};
use crate::sim::measurement::{attempt_detection, gaussian, NoiseScale};
use crate::sim::target::Target;
use rand::rngs::StdRng;
use serde_json::json;

const SCAN_STEP_DEG: f64 = 5.0;
const SCAN_AZIMUTH_LIMIT_DEG: f64 = 60.0;
const SCAN_ELEVATION_LIMIT_DEG: f64 = 45.0;
const MIN_BEAM_GAIN_DB: f64 = -40.0;
const REFERENCE_ELEMENTS: f64 = 1024.0;
const PHASE_NOISE_STD_DEG: f64 = 5.0;

/// Steered-array model: a scanning pencil beam whose Gaussian roll-off and
/// element count shape the SNR. Beam pointing is sensor-relative, signed
/// degrees from the boresight.
pub struct AesaModel {
    config: SensorConfig,
    elements: u32,
    beam_width_deg: f64,
    beam_azimuth_deg: f64,
    beam_elevation_deg: f64,
}

impl AesaModel {
    pub fn new(config: SensorConfig, elements: u32, beam_width_deg: f64) -> Self {
        Self {
            config,
            elements,
            beam_width_deg,
            beam_azimuth_deg: 0.0,
            beam_elevation_deg: 0.0,
        }
    }

    /// Electronically steer the beam, clamped to the scan limits.
    pub fn steer_beam(&mut self, azimuth_deg: f64, elevation_deg: f64) {
        self.beam_azimuth_deg =
            azimuth_deg.clamp(-SCAN_AZIMUTH_LIMIT_DEG, SCAN_AZIMUTH_LIMIT_DEG);
        self.beam_elevation_deg =
            elevation_deg.clamp(-SCAN_ELEVATION_LIMIT_DEG, SCAN_ELEVATION_LIMIT_DEG);
    }

    /// Gaussian beam-pattern roll-off from the pointing offset, clamped to
    /// the sidelobe floor.
    pub fn beam_gain_db(&self, azimuth_deg: f64, elevation_deg: f64) -> f64 {
        let az_off = wrap_signed_deg(azimuth_deg - self.beam_azimuth_deg);
        let el_off = elevation_deg - self.beam_elevation_deg;
        let gain = -12.0
            * ((az_off / self.beam_width_deg).powi(2) + (el_off / self.beam_width_deg).powi(2));
        gain.max(MIN_BEAM_GAIN_DB)
    }

    /// Aperture gain relative to a reference 1024-element array.
    pub fn array_gain_db(&self) -> f64 {
        10.0 * (self.elements as f64 / REFERENCE_ELEMENTS).log10()
    }

    fn advance_scan(&mut self) {
        self.beam_azimuth_deg += SCAN_STEP_DEG;
        if self.beam_azimuth_deg > SCAN_AZIMUTH_LIMIT_DEG {
            self.beam_azimuth_deg = -SCAN_AZIMUTH_LIMIT_DEG;
        }
    }
}

impl MeasurementModel for AesaModel {
    fn config(&self) -> &SensorConfig {
        &self.config
    }

    fn measure(&mut self, target: &Target, timestamp: f64, rng: &mut StdRng) -> Option<RawDetection> {
        let scale = NoiseScale {
            range: 0.5,
            azimuth: 0.3,
            elevation: 0.3,
            doppler: 0.5,
        };
        let array_gain_db = self.array_gain_db();
        let beam = &*self;
        let (obs, snr_db) = attempt_detection(&self.config, target, rng, &scale, |truth| {
            beam.beam_gain_db(truth.azimuth_deg, truth.elevation_deg) + array_gain_db
        })?;
        let beam_gain_db = self.beam_gain_db(obs.azimuth_deg, obs.elevation_deg);
        let detection = RawDetection {
            sensor_id: self.config.id.clone(),
            kind: RadarKind::Aesa,
            timestamp,
            range_m: obs.range_m,
            azimuth_deg: obs.azimuth_deg,
            elevation_deg: obs.elevation_deg,
            doppler_mps: obs.doppler_mps,
            snr_db,
            diagnostics: json!({
                "target_id": target.id,
                "rcs_dbsm": target.rcs_dbsm,
                "beam_azimuth_deg": self.beam_azimuth_deg,
                "beam_elevation_deg": self.beam_elevation_deg,
                "beam_gain_db": beam_gain_db,
                "num_elements": self.elements,
                "phase_noise_deg": gaussian(rng, PHASE_NOISE_STD_DEG),
                "false_alarm": false,
            }),
        };
        self.advance_scan();
        Some(detection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{NoiseProfile, Waveform};
    use rand::SeedableRng;

    fn exact_sensor() -> SensorConfig {
        SensorConfig {
            id: "AESA_C".into(),
            waveform: Waveform::Aesa {
                elements: 1024,
                beam_width_deg: 2.0,
            },
            location: [0.0, 0.0, 0.0],
            boresight_deg: 0.0,
            frequency_ghz: 35.0,
            enabled: true,
            min_range_m: 50.0,
            max_range_m: 10_000.0,
            azimuth_fov_deg: 120.0,
            detection_probability: 1.0,
            false_alarm_rate: 0.0,
            noise: NoiseProfile {
                range_m: 0.0,
                angle_deg: 0.0,
                doppler_mps: 0.0,
            },
        }
    }

    #[test]
    fn steer_beam_clamps_to_scan_limits() {
        let mut model = AesaModel::new(exact_sensor(), 1024, 2.0);
        model.steer_beam(30.0, 10.0);
        assert_eq!(model.beam_azimuth_deg, 30.0);
        assert_eq!(model.beam_elevation_deg, 10.0);
        model.steer_beam(100.0, 50.0);
        assert_eq!(model.beam_azimuth_deg, SCAN_AZIMUTH_LIMIT_DEG);
        assert_eq!(model.beam_elevation_deg, SCAN_ELEVATION_LIMIT_DEG);
    }

    #[test]
    fn beam_gain_peaks_on_axis() {
        let mut model = AesaModel::new(exact_sensor(), 1024, 2.0);
        model.steer_beam(0.0, 0.0);
        assert_eq!(model.beam_gain_db(0.0, 0.0), 0.0);
        assert!(model.beam_gain_db(10.0, 10.0) < 0.0);
        // Far sidelobes bottom out at the floor.
        assert_eq!(model.beam_gain_db(50.0, 40.0), MIN_BEAM_GAIN_DB);
    }

    #[test]
    fn array_gain_scales_with_element_count() {
        let reference = AesaModel::new(exact_sensor(), 1024, 2.0);
        let doubled = AesaModel::new(exact_sensor(), 2048, 2.0);
        assert_eq!(reference.array_gain_db(), 0.0);
        assert!((doubled.array_gain_db() - 3.0103).abs() < 1e-3);
    }

    #[test]
    fn noiseless_measurement_reports_beam_state() {
        let mut model = AesaModel::new(exact_sensor(), 1024, 2.0);
        let mut rng = StdRng::seed_from_u64(31);
        // On boresight, inside the beam when pointed there.
        model.steer_beam(0.0, 0.0);
        let target = Target {
            id: 9,
            position: [0.0, 1000.0, 0.0],
            velocity: [0.0, 0.0, 0.0],
            rcs_dbsm: 10.0,
            maneuver: None,
        };
        let detection = model.measure(&target, 0.0, &mut rng).unwrap();
        assert!((detection.range_m - 1000.0).abs() < 1e-9);
        assert!(detection.azimuth_deg.abs() < 1e-9);
        assert_eq!(detection.diagnostics["num_elements"], 1024);
        // The scan stepped after the dwell.
        assert_eq!(detection.diagnostics["beam_azimuth_deg"], 0.0);
        assert_eq!(model.beam_azimuth_deg, SCAN_STEP_DEG);
    }
}
