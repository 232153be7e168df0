//! Projects sensor-frame detections into the unified ENU schema.

use crate::math::geometry::{add, scale, spherical_to_enu, wrap_deg};
use crate::schema::{NormalizedDetection, RadarKind, RawDetection, SensorConfig};

/// Per-detection normalization failures. Non-fatal: the offending detection
/// is dropped, an error counter incremented, and the tick continues.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NormalizeError {
    #[error("unsupported sensor type: sensor {sensor_id} is configured as {expected} but the detection is tagged {got}")]
    UnsupportedSensorType {
        sensor_id: String,
        expected: RadarKind,
        got: RadarKind,
    },
    #[error("malformed detection from {sensor_id}: {reason}")]
    MalformedDetection { sensor_id: String, reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer;

impl Normalizer {
    /// Normalize one raw detection against the emitting sensor's config.
    pub fn normalize(
        &self,
        raw: &RawDetection,
        sensor: &SensorConfig,
    ) -> Result<NormalizedDetection, NormalizeError> {
        if raw.kind != sensor.kind() {
            return Err(NormalizeError::UnsupportedSensorType {
                sensor_id: sensor.id.clone(),
                expected: sensor.kind(),
                got: raw.kind,
            });
        }
        for (name, value) in [
            ("range", raw.range_m),
            ("azimuth", raw.azimuth_deg),
            ("elevation", raw.elevation_deg),
            ("doppler", raw.doppler_mps),
            ("snr", raw.snr_db),
        ] {
            if !value.is_finite() {
                return Err(NormalizeError::MalformedDetection {
                    sensor_id: raw.sensor_id.clone(),
                    reason: format!("non-finite {name}"),
                });
            }
        }
        Ok(match raw.kind {
            RadarKind::Fmcw => self.normalize_fmcw(raw, sensor),
            RadarKind::PulseDoppler => self.normalize_pulse_doppler(raw, sensor),
            RadarKind::Aesa => self.normalize_aesa(raw, sensor),
        })
    }

    fn normalize_fmcw(&self, raw: &RawDetection, sensor: &SensorConfig) -> NormalizedDetection {
        self.project(raw, sensor)
    }

    /// Range and Doppler arrive already folded into the PRF intervals; the
    /// fold diagnostics ride through untouched.
    fn normalize_pulse_doppler(
        &self,
        raw: &RawDetection,
        sensor: &SensorConfig,
    ) -> NormalizedDetection {
        self.project(raw, sensor)
    }

    fn normalize_aesa(&self, raw: &RawDetection, sensor: &SensorConfig) -> NormalizedDetection {
        self.project(raw, sensor)
    }

    /// Shared polar-to-ENU projection. The sensor's boresight yaw is applied
    /// as an azimuth offset (the z-rotation in polar form), then the result
    /// is translated by the sensor location.
    fn project(&self, raw: &RawDetection, sensor: &SensorConfig) -> NormalizedDetection {
        let azimuth_abs = wrap_deg(raw.azimuth_deg + sensor.boresight_deg);
        let local = spherical_to_enu(raw.range_m, azimuth_abs, raw.elevation_deg);
        let position_enu = add(sensor.location, local);
        // Radial component only; the tangential component is unobservable
        // from a single sensor and stays zero.
        let los = spherical_to_enu(1.0, azimuth_abs, raw.elevation_deg);
        let velocity_enu = scale(los, raw.doppler_mps);
        NormalizedDetection {
            timestamp: raw.timestamp,
            sensor_id: raw.sensor_id.clone(),
            kind: raw.kind,
            range_m: raw.range_m,
            azimuth_deg: raw.azimuth_deg,
            elevation_deg: raw.elevation_deg,
            doppler_mps: raw.doppler_mps,
            snr_db: raw.snr_db,
            position_enu,
            velocity_enu,
            diagnostics: raw.diagnostics.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::geometry::{enu_to_spherical, sub, wrap_deg};
    use crate::schema::{NoiseProfile, Waveform};
    use serde_json::json;

    fn sensor() -> SensorConfig {
        SensorConfig {
            id: "RADAR_A".into(),
            waveform: Waveform::Fmcw {
                bandwidth_mhz: 4000.0,
                chirp_time_us: 50.0,
            },
            location: [100.0, 200.0, 5.0],
            boresight_deg: 30.0,
            frequency_ghz: 77.0,
            enabled: true,
            min_range_m: 50.0,
            max_range_m: 10_000.0,
            azimuth_fov_deg: 360.0,
            detection_probability: 0.95,
            false_alarm_rate: 1.0,
            noise: NoiseProfile::default(),
        }
    }

    fn raw(range_m: f64, azimuth_deg: f64, elevation_deg: f64) -> RawDetection {
        RawDetection {
            sensor_id: "RADAR_A".into(),
            kind: RadarKind::Fmcw,
            timestamp: 1.5,
            range_m,
            azimuth_deg,
            elevation_deg,
            doppler_mps: -12.5,
            snr_db: 18.0,
            diagnostics: json!({ "beat_frequency_khz": 42.0, "false_alarm": false }),
        }
    }

    #[test]
    fn inverse_projection_recovers_polar_measurement() {
        let sensor = sensor();
        let normalizer = Normalizer::default();
        let raw = raw(3000.0, 45.0, 10.0);
        let normalized = normalizer.normalize(&raw, &sensor).unwrap();

        let rel = sub(normalized.position_enu, sensor.location);
        let (range, azimuth_abs, elevation) = enu_to_spherical(rel);
        assert!((range - 3000.0).abs() < 1e-6);
        assert!((wrap_deg(azimuth_abs - sensor.boresight_deg) - 45.0).abs() < 1e-6);
        assert!((elevation - 10.0).abs() < 1e-6);
    }

    #[test]
    fn velocity_is_radial_along_line_of_sight() {
        let sensor = sensor();
        let normalizer = Normalizer::default();
        let raw = raw(1000.0, 0.0, 0.0);
        let normalized = normalizer.normalize(&raw, &sensor).unwrap();

        let rel = sub(normalized.position_enu, sensor.location);
        let speed = crate::math::geometry::norm(normalized.velocity_enu);
        assert!((speed - 12.5).abs() < 1e-9);
        // Anti-parallel to the line of sight: the target is approaching.
        let cos = crate::math::geometry::dot(normalized.velocity_enu, rel) / (speed * 1000.0);
        assert!((cos + 1.0).abs() < 1e-9);
    }

    #[test]
    fn kind_mismatch_is_unsupported() {
        let sensor = sensor();
        let normalizer = Normalizer::default();
        let mut bad = raw(1000.0, 0.0, 0.0);
        bad.kind = RadarKind::Aesa;
        assert!(matches!(
            normalizer.normalize(&bad, &sensor),
            Err(NormalizeError::UnsupportedSensorType { .. })
        ));
    }

    #[test]
    fn non_finite_fields_are_malformed() {
        let sensor = sensor();
        let normalizer = Normalizer::default();
        let mut bad = raw(1000.0, 0.0, 0.0);
        bad.doppler_mps = f64::NAN;
        let err = normalizer.normalize(&bad, &sensor).unwrap_err();
        assert!(matches!(err, NormalizeError::MalformedDetection { .. }));

        bad = raw(f64::INFINITY, 0.0, 0.0);
        assert!(normalizer.normalize(&bad, &sensor).is_err());
    }

    #[test]
    fn diagnostics_pass_through_untouched() {
        let sensor = sensor();
        let normalizer = Normalizer::default();
        let normalized = normalizer.normalize(&raw(1000.0, 0.0, 0.0), &sensor).unwrap();
        assert_eq!(normalized.diagnostics["beat_frequency_khz"], 42.0);
        assert_eq!(normalized.snr_db, 18.0);
    }
}
