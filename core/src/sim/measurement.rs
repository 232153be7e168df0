//! Shared measurement steps: field-of-regard gating, the simplified radar
//! equation, the detection-probability ramp, noise application, and
//! false-alarm synthesis. The per-waveform models layer their
//! parameterization on top of these.

use crate::math::geometry::{dot, norm, scale, sub, wrap_deg, wrap_signed_deg};
use crate::prelude::{MeasurementModel, SensorError, SensorResult};
use crate::schema::{RawDetection, SensorConfig, Waveform};
use crate::sim::target::Target;
use crate::sim::{AesaModel, FmcwModel, PulseDopplerModel};
use rand::{rngs::StdRng, Rng};
use rand_distr::{Distribution, Normal, Poisson};
use serde_json::json;

pub const SPEED_OF_LIGHT: f64 = 3.0e8;

/// Reference SNR at 1 km for a 0 dBsm scatterer.
pub const REFERENCE_SNR_DB: f64 = 30.0;
/// Hard floor of the receiver chain.
pub const NOISE_FLOOR_DB: f64 = -10.0;
/// SNR at or below this yields Pd = 0.
pub const PD_FLOOR_DB: f64 = 0.0;
/// SNR at or above this yields the sensor's peak detection probability.
pub const PD_CEILING_DB: f64 = 13.0;

const SNR_FLUCTUATION_DB: f64 = 2.0;
const FALSE_ALARM_ELEVATION_RANGE: (f64, f64) = (-10.0, 45.0);
const FALSE_ALARM_DOPPLER_RANGE: (f64, f64) = (-50.0, 50.0);
const FALSE_ALARM_SNR_RANGE: (f64, f64) = (0.0, 8.0);

/// True polar geometry of a target relative to a sensor. Azimuth is
/// sensor-relative, wrapped to [0, 360).
#[derive(Debug, Clone, Copy)]
pub struct TruthObservation {
    pub range_m: f64,
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub doppler_mps: f64,
}

/// Per-waveform scaling of the sensor's noise profile.
#[derive(Debug, Clone, Copy)]
pub struct NoiseScale {
    pub range: f64,
    pub azimuth: f64,
    pub elevation: f64,
    pub doppler: f64,
}

impl NoiseScale {
    pub fn uniform(factor: f64) -> Self {
        Self {
            range: factor,
            azimuth: factor,
            elevation: factor,
            doppler: factor,
        }
    }
}

/// Compute the true observation, or `None` when the target sits outside the
/// sensor's field of regard or the geometry is degenerate. The minimum-range
/// floor also rejects zero-range geometry.
pub fn observe(target: &Target, config: &SensorConfig) -> Option<TruthObservation> {
    let rel = sub(target.position, config.location);
    let range_m = norm(rel);
    if !range_m.is_finite() || range_m < config.min_range_m || range_m > config.max_range_m {
        return None;
    }
    let azimuth_abs = wrap_deg(rel[0].atan2(rel[1]).to_degrees());
    let elevation_deg = (rel[2] / range_m).clamp(-1.0, 1.0).asin().to_degrees();
    let offset = wrap_signed_deg(azimuth_abs - config.boresight_deg);
    if offset.abs() > config.azimuth_fov_deg / 2.0 {
        return None;
    }
    let los = scale(rel, 1.0 / range_m);
    Some(TruthObservation {
        range_m,
        azimuth_deg: wrap_deg(offset),
        elevation_deg,
        doppler_mps: dot(target.velocity, los),
    })
}

/// Simplified radar equation: reference SNR at 1 km, inverse-fourth-power
/// range falloff, additive RCS, 2 dB Gaussian fluctuation, hard floor.
pub fn signal_to_noise_db(range_m: f64, rcs_dbsm: f64, rng: &mut StdRng) -> f64 {
    let range_loss_db = 40.0 * (range_m / 1000.0).log10();
    let snr_db = REFERENCE_SNR_DB - range_loss_db + rcs_dbsm + gaussian(rng, SNR_FLUCTUATION_DB);
    snr_db.max(NOISE_FLOOR_DB)
}

/// Probability of detection as a monotone ramp in SNR: zero at or below
/// `PD_FLOOR_DB`, the sensor's peak probability at or above `PD_CEILING_DB`.
pub fn detection_probability(snr_db: f64, peak: f64) -> f64 {
    if snr_db <= PD_FLOOR_DB {
        0.0
    } else if snr_db >= PD_CEILING_DB {
        peak
    } else {
        peak * (snr_db - PD_FLOOR_DB) / (PD_CEILING_DB - PD_FLOOR_DB)
    }
}

pub fn gaussian(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    Normal::new(0.0, std_dev)
        .map(|dist| dist.sample(rng))
        .unwrap_or(0.0)
}

/// One Bernoulli detection attempt against a target. `snr_bonus_db` lets a
/// variant shape the SNR from the true geometry (beam patterns, array gain)
/// before the probability gate. Returns the noisy polar measurement and the
/// SNR that gated it.
pub(crate) fn attempt_detection<F>(
    config: &SensorConfig,
    target: &Target,
    rng: &mut StdRng,
    noise_scale: &NoiseScale,
    snr_bonus_db: F,
) -> Option<(TruthObservation, f64)>
where
    F: Fn(&TruthObservation) -> f64,
{
    let truth = observe(target, config)?;
    let snr_db = signal_to_noise_db(truth.range_m, target.rcs_dbsm, rng) + snr_bonus_db(&truth);
    let pd = detection_probability(snr_db, config.detection_probability);
    if rng.gen::<f64>() >= pd {
        return None;
    }
    let noise = &config.noise;
    let noisy = TruthObservation {
        range_m: (truth.range_m + gaussian(rng, noise.range_m * noise_scale.range)).max(0.0),
        azimuth_deg: wrap_deg(
            truth.azimuth_deg + gaussian(rng, noise.angle_deg * noise_scale.azimuth),
        ),
        elevation_deg: (truth.elevation_deg
            + gaussian(rng, noise.angle_deg * noise_scale.elevation))
        .clamp(-90.0, 90.0),
        doppler_mps: truth.doppler_mps + gaussian(rng, noise.doppler_mps * noise_scale.doppler),
    };
    Some((noisy, snr_db))
}

/// Poisson-distributed false alarms with uniform geometry inside the
/// sensor's coverage volume and a low random SNR.
pub fn draw_false_alarms(
    config: &SensorConfig,
    timestamp: f64,
    rng: &mut StdRng,
) -> Vec<RawDetection> {
    if config.false_alarm_rate <= 0.0 {
        return Vec::new();
    }
    let count = Poisson::new(config.false_alarm_rate)
        .map(|dist| dist.sample(rng) as usize)
        .unwrap_or(0);
    let half_fov = config.azimuth_fov_deg / 2.0;
    (0..count)
        .map(|_| {
            let offset = if half_fov > 0.0 {
                rng.gen_range(-half_fov..half_fov)
            } else {
                0.0
            };
            let range_m = if config.min_range_m < config.max_range_m {
                rng.gen_range(config.min_range_m..config.max_range_m)
            } else {
                config.min_range_m
            };
            RawDetection {
                sensor_id: config.id.clone(),
                kind: config.kind(),
                timestamp,
                range_m,
                azimuth_deg: wrap_deg(offset),
                elevation_deg: rng
                    .gen_range(FALSE_ALARM_ELEVATION_RANGE.0..FALSE_ALARM_ELEVATION_RANGE.1),
                doppler_mps: rng
                    .gen_range(FALSE_ALARM_DOPPLER_RANGE.0..FALSE_ALARM_DOPPLER_RANGE.1),
                snr_db: rng.gen_range(FALSE_ALARM_SNR_RANGE.0..FALSE_ALARM_SNR_RANGE.1),
                diagnostics: json!({ "false_alarm": true }),
            }
        })
        .collect()
}

/// Build the measurement model for a sensor. Misconfigured parameters are
/// rejected here so a bad sensor is skipped for the whole run, not per tick.
pub fn build_model(config: &SensorConfig) -> SensorResult<Box<dyn MeasurementModel>> {
    if !config.enabled {
        return Err(SensorError::Disabled(config.id.clone()));
    }
    match config.waveform {
        Waveform::Fmcw {
            bandwidth_mhz,
            chirp_time_us,
        } => {
            if bandwidth_mhz <= 0.0 || chirp_time_us <= 0.0 {
                return Err(SensorError::Misconfigured {
                    id: config.id.clone(),
                    reason: "FMCW bandwidth and chirp time must be positive".into(),
                });
            }
            Ok(Box::new(FmcwModel::new(
                config.clone(),
                bandwidth_mhz,
                chirp_time_us,
            )))
        }
        Waveform::PulseDoppler {
            prf_hz,
            pulse_width_us,
            num_pulses,
        } => {
            if prf_hz <= 0.0 || config.frequency_ghz <= 0.0 {
                return Err(SensorError::Misconfigured {
                    id: config.id.clone(),
                    reason: "PRF and carrier frequency must be positive".into(),
                });
            }
            Ok(Box::new(PulseDopplerModel::new(
                config.clone(),
                prf_hz,
                pulse_width_us,
                num_pulses,
            )))
        }
        Waveform::Aesa {
            elements,
            beam_width_deg,
        } => {
            if elements == 0 || beam_width_deg <= 0.0 {
                return Err(SensorError::Misconfigured {
                    id: config.id.clone(),
                    reason: "AESA element count and beam width must be positive".into(),
                });
            }
            Ok(Box::new(AesaModel::new(
                config.clone(),
                elements,
                beam_width_deg,
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NoiseProfile;
    use rand::SeedableRng;

    pub(crate) fn test_sensor(waveform: Waveform) -> SensorConfig {
        SensorConfig {
            id: "TEST".into(),
            waveform,
            location: [0.0, 0.0, 0.0],
            boresight_deg: 0.0,
            frequency_ghz: 10.0,
            enabled: true,
            min_range_m: 50.0,
            max_range_m: 10_000.0,
            azimuth_fov_deg: 360.0,
            detection_probability: 0.95,
            false_alarm_rate: 1.0,
            noise: NoiseProfile::default(),
        }
    }

    fn fmcw() -> Waveform {
        Waveform::Fmcw {
            bandwidth_mhz: 4000.0,
            chirp_time_us: 50.0,
        }
    }

    fn static_target(position: [f64; 3]) -> Target {
        Target {
            id: 1,
            position,
            velocity: [0.0, 0.0, 0.0],
            rcs_dbsm: 10.0,
            maneuver: None,
        }
    }

    #[test]
    fn detection_probability_is_monotone_in_snr() {
        let mut previous = 0.0;
        let mut snr = -15.0;
        while snr <= 30.0 {
            let pd = detection_probability(snr, 0.95);
            assert!(pd >= previous, "Pd decreased at {snr} dB");
            assert!((0.0..=0.95).contains(&pd));
            previous = pd;
            snr += 0.25;
        }
        assert_eq!(detection_probability(PD_FLOOR_DB, 0.95), 0.0);
        assert_eq!(detection_probability(PD_CEILING_DB, 0.95), 0.95);
    }

    #[test]
    fn observe_rejects_targets_outside_field_of_regard() {
        let config = test_sensor(fmcw());
        assert!(observe(&static_target([20_000.0, 0.0, 0.0]), &config).is_none());
        // Inside the minimum range, zero range included.
        assert!(observe(&static_target([0.0, 0.0, 0.0]), &config).is_none());
        assert!(observe(&static_target([10.0, 0.0, 0.0]), &config).is_none());

        let mut sector = test_sensor(fmcw());
        sector.azimuth_fov_deg = 90.0;
        // Due south of a north-facing sector sensor.
        assert!(observe(&static_target([0.0, -1000.0, 0.0]), &sector).is_none());
        assert!(observe(&static_target([0.0, 1000.0, 0.0]), &sector).is_some());
    }

    #[test]
    fn observe_reports_radial_velocity() {
        let config = test_sensor(fmcw());
        let target = Target {
            id: 1,
            position: [0.0, 1000.0, 0.0],
            velocity: [0.0, -10.0, 0.0],
            rcs_dbsm: 10.0,
            maneuver: None,
        };
        let truth = observe(&target, &config).unwrap();
        assert!((truth.doppler_mps + 10.0).abs() < 1e-9, "approaching target");
    }

    #[test]
    fn false_alarm_rate_zero_emits_nothing() {
        let mut config = test_sensor(fmcw());
        config.false_alarm_rate = 0.0;
        let mut rng = StdRng::seed_from_u64(5);
        assert!(draw_false_alarms(&config, 0.0, &mut rng).is_empty());
    }

    #[test]
    fn false_alarms_stay_inside_coverage() {
        let config = test_sensor(fmcw());
        let mut rng = StdRng::seed_from_u64(6);
        for tick in 0..50 {
            for alarm in draw_false_alarms(&config, tick as f64 * 0.1, &mut rng) {
                assert!(alarm.range_m >= config.min_range_m);
                assert!(alarm.range_m <= config.max_range_m);
                assert!((0.0..360.0).contains(&alarm.azimuth_deg));
                assert_eq!(alarm.diagnostics["false_alarm"], true);
            }
        }
    }

    #[test]
    fn build_model_rejects_misconfigured_sensors() {
        let bad_prf = test_sensor(Waveform::PulseDoppler {
            prf_hz: 0.0,
            pulse_width_us: 1.0,
            num_pulses: 128,
        });
        assert!(matches!(
            build_model(&bad_prf),
            Err(SensorError::Misconfigured { .. })
        ));

        let mut disabled = test_sensor(fmcw());
        disabled.enabled = false;
        assert!(matches!(build_model(&disabled), Err(SensorError::Disabled(_))));

        assert!(build_model(&test_sensor(fmcw())).is_ok());
    }
}
