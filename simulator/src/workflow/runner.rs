use crate::workflow::config::SimulationConfig;
use radfusecore::bus::{TickBroadcaster, TickUpdate};
use radfusecore::normalize::Normalizer;
use radfusecore::prelude::MeasurementModel;
use radfusecore::schema::{NormalizedDetection, SensorConfig, TrackSnapshot};
use radfusecore::sim::{build_model, Maneuver, OperatingVolume, Target};
use radfusecore::telemetry::{LogManager, MetricsRecorder};
use radfusecore::tracker::Tracker;
use rand::{rngs::StdRng, SeedableRng};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

/// Result of one pipeline tick, handed to external consumers as-is.
pub struct TickReport {
    pub timestamp: f64,
    pub detections: Arc<Vec<NormalizedDetection>>,
    pub tracks: Arc<Vec<TrackSnapshot>>,
}

/// Owns the whole per-tick pipeline: targets, measurement models, normalizer,
/// tracker, and the outbound bus. One runner means one writer for the track
/// set, which is what serializes the tracker update.
pub struct Runner {
    config: SimulationConfig,
    volume: OperatingVolume,
    sensors: BTreeMap<String, SensorConfig>,
    models: Vec<Box<dyn MeasurementModel>>,
    targets: Vec<Target>,
    normalizer: Normalizer,
    tracker: Tracker,
    rng: StdRng,
    metrics: Arc<MetricsRecorder>,
    broadcaster: TickBroadcaster,
    logger: LogManager,
    clock_s: f64,
    last_tick_started: Option<Instant>,
}

impl Runner {
    pub fn new(config: SimulationConfig) -> anyhow::Result<Self> {
        let volume = OperatingVolume {
            min: config.volume_min,
            max: config.volume_max,
        };
        let mut rng = StdRng::seed_from_u64(config.seed);
        let metrics = Arc::new(MetricsRecorder::new());

        let mut sensors = BTreeMap::new();
        let mut models = Vec::new();
        for sensor in &config.sensors {
            match build_model(sensor) {
                Ok(model) => {
                    sensors.insert(sensor.id.clone(), sensor.clone());
                    models.push(model);
                }
                Err(err) => {
                    log::warn!("skipping sensor: {}", err);
                    metrics.record_sensor_error();
                }
            }
        }
        if models.is_empty() {
            anyhow::bail!("no usable sensors in configuration");
        }

        let maneuver = (config.maneuver_accel_std_mps2 > 0.0).then(|| Maneuver {
            accel_std_mps2: config.maneuver_accel_std_mps2,
            max_speed_mps: config.max_speed_mps,
        });
        let targets = (0..config.num_targets)
            .map(|i| Target::spawn(i as u32, &volume, maneuver, &mut rng))
            .collect();

        Ok(Self {
            tracker: Tracker::new(config.tracker.clone()),
            normalizer: Normalizer::default(),
            broadcaster: TickBroadcaster::new(64),
            logger: LogManager::new(),
            clock_s: 0.0,
            last_tick_started: None,
            config,
            volume,
            sensors,
            models,
            targets,
            rng,
            metrics,
        })
    }

    pub fn metrics(&self) -> Arc<MetricsRecorder> {
        self.metrics.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TickUpdate> {
        self.broadcaster.subscribe()
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.config.tick_interval_ms)
    }

    /// Replace the simulated population (scenario setup).
    #[cfg(test)]
    pub fn set_targets(&mut self, targets: Vec<Target>) {
        self.targets = targets;
    }

    /// Advance the pipeline one tick: targets, detection generation,
    /// normalization, tracker update, broadcast. The tracker only ever sees
    /// the complete batch; an abandoned tick leaves it untouched.
    pub fn tick(&mut self) -> anyhow::Result<TickReport> {
        let now = Instant::now();
        let achieved_interval = self
            .last_tick_started
            .map(|started| now.duration_since(started).as_secs_f64())
            .unwrap_or(0.0);
        self.last_tick_started = Some(now);

        let dt = self.config.tick_interval_ms as f64 / 1000.0;
        let timestamp = self.clock_s;

        for target in &mut self.targets {
            target.advance(dt, &self.volume, &mut self.rng);
        }

        let mut raw = Vec::new();
        for model in &mut self.models {
            for target in &self.targets {
                if let Some(detection) = model.measure(target, timestamp, &mut self.rng) {
                    raw.push(detection);
                }
            }
            raw.extend(model.false_alarms(timestamp, &mut self.rng));
        }

        let mut detections = Vec::with_capacity(raw.len());
        for detection in &raw {
            let Some(sensor) = self.sensors.get(&detection.sensor_id) else {
                self.metrics.record_sensor_error();
                self.logger.flag(&format!(
                    "detection from unknown sensor {}",
                    detection.sensor_id
                ));
                continue;
            };
            match self.normalizer.normalize(detection, sensor) {
                Ok(normalized) => detections.push(normalized),
                Err(err) => {
                    self.metrics.record_dropped();
                    self.logger.flag(&format!("dropping detection: {}", err));
                }
            }
        }

        self.tracker.update(&detections, timestamp);

        let detections = Arc::new(detections);
        let tracks = Arc::new(self.tracker.snapshots());
        let active = self.tracker.active_tracks().count();
        self.metrics
            .record_tick(detections.len(), active, achieved_interval);
        self.broadcaster.publish(TickUpdate {
            timestamp,
            detections: detections.clone(),
            tracks: tracks.clone(),
            status: self.metrics.snapshot(),
        });

        self.clock_s += dt;
        Ok(TickReport {
            timestamp,
            detections,
            tracks,
        })
    }

    /// Fixed-period tick loop. A late tick delays the next one; ticks never
    /// overlap and the tracker never sees batches out of order.
    pub async fn run(&mut self, max_ticks: Option<u64>) -> anyhow::Result<()> {
        let mut interval = time::interval(self.tick_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut completed = 0u64;
        loop {
            interval.tick().await;
            if let Err(err) = self.tick() {
                log::error!("tick abandoned, track set unchanged: {err:#}");
            }
            completed += 1;
            if let Some(limit) = max_ticks {
                if completed >= limit {
                    return Ok(());
                }
            }
        }
    }
}
