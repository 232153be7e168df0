use anyhow::Context;
use radfusecore::schema::{NoiseProfile, SensorConfig, Waveform};
use radfusecore::tracker::TrackerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Full simulation scenario: timing, population, operating volume, tracker
/// tuning, and the ordered sensor list. Loaded once at startup; immutable
/// afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_interval_ms: u64,
    pub num_targets: usize,
    pub seed: u64,
    pub volume_min: [f64; 3],
    pub volume_max: [f64; 3],
    /// Std-dev of the per-tick random velocity perturbation; zero disables
    /// maneuvers.
    pub maneuver_accel_std_mps2: f64,
    pub max_speed_mps: f64,
    pub tracker: TrackerConfig,
    pub sensors: Vec<SensorConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            num_targets: 10,
            seed: 42,
            volume_min: [-5000.0, 1000.0, 50.0],
            volume_max: [5000.0, 8000.0, 500.0],
            maneuver_accel_std_mps2: 0.0,
            max_speed_mps: 80.0,
            tracker: TrackerConfig::default(),
            sensors: default_sensors(),
        }
    }
}

impl SimulationConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading simulation config {}", path_ref.display()))?;
        let config: SimulationConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing simulation config {}", path_ref.display()))?;
        Ok(config)
    }
}

fn sensor(id: &str, waveform: Waveform, location: [f64; 3], frequency_ghz: f64) -> SensorConfig {
    SensorConfig {
        id: id.into(),
        waveform,
        location,
        boresight_deg: 0.0,
        frequency_ghz,
        enabled: true,
        min_range_m: 50.0,
        max_range_m: 10_000.0,
        azimuth_fov_deg: 360.0,
        detection_probability: 0.95,
        false_alarm_rate: 1.0,
        noise: NoiseProfile::default(),
    }
}

/// Three-radar default scenario: one of each waveform family.
fn default_sensors() -> Vec<SensorConfig> {
    let mut aesa = sensor(
        "RADAR_C",
        Waveform::Aesa {
            elements: 1024,
            beam_width_deg: 2.0,
        },
        [2000.0, -1000.0, 20.0],
        35.0,
    );
    aesa.azimuth_fov_deg = 120.0;
    vec![
        sensor(
            "RADAR_A",
            Waveform::Fmcw {
                bandwidth_mhz: 4000.0,
                chirp_time_us: 50.0,
            },
            [0.0, 0.0, 10.0],
            77.0,
        ),
        sensor(
            "RADAR_B",
            Waveform::PulseDoppler {
                prf_hz: 10_000.0,
                pulse_width_us: 1.0,
                num_pulses: 128,
            },
            [1000.0, 1000.0, 15.0],
            10.0,
        ),
        aesa,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use radfusecore::schema::RadarKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_scenario_covers_all_waveforms() {
        let config = SimulationConfig::default();
        assert_eq!(config.sensors.len(), 3);
        let kinds: Vec<RadarKind> = config.sensors.iter().map(|s| s.kind()).collect();
        assert!(kinds.contains(&RadarKind::Fmcw));
        assert!(kinds.contains(&RadarKind::PulseDoppler));
        assert!(kinds.contains(&RadarKind::Aesa));
    }

    #[test]
    fn config_load_reads_yaml() {
        let yaml = r#"
tick_interval_ms: 50
num_targets: 4
seed: 7
tracker:
  association_gate_m: 250.0
  confirmation_hits: 2
sensors:
  - id: TEST_A
    type: FMCW
    bandwidth_mhz: 1000.0
    chirp_time_us: 40.0
    location: [0.0, 0.0, 5.0]
    frequency_ghz: 77.0
  - id: TEST_B
    type: PULSE_DOPPLER
    prf_hz: 8000.0
    pulse_width_us: 1.0
    num_pulses: 64
    location: [500.0, 500.0, 5.0]
    boresight_deg: 45.0
    frequency_ghz: 10.0
"#;
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(yaml.as_bytes()).unwrap();
        let path = temp.into_temp_path();
        let config = SimulationConfig::load(&path).unwrap();
        assert_eq!(config.tick_interval_ms, 50);
        assert_eq!(config.num_targets, 4);
        assert_eq!(config.tracker.confirmation_hits, 2);
        assert_eq!(config.sensors.len(), 2);
        assert_eq!(config.sensors[0].kind(), RadarKind::Fmcw);
        assert_eq!(config.sensors[1].boresight_deg, 45.0);
        // Unspecified sensor fields fall back to their defaults.
        assert_eq!(config.sensors[0].max_range_m, 10_000.0);
        assert!(config.sensors[0].enabled);
    }

    #[test]
    fn config_load_rejects_unknown_waveforms() {
        let yaml = r#"
sensors:
  - id: TEST_X
    type: OVER_THE_HORIZON
    location: [0.0, 0.0, 5.0]
    frequency_ghz: 0.02
"#;
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(yaml.as_bytes()).unwrap();
        let path = temp.into_temp_path();
        assert!(SimulationConfig::load(&path).is_err());
    }
}
