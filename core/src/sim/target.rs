use crate::math::geometry::{add, norm, scale, Vec3};
use rand::{rngs::StdRng, Rng};
use rand_distr::{Distribution, Normal};

/// Axis-aligned operating volume for the simulated population.
#[derive(Debug, Clone, Copy)]
pub struct OperatingVolume {
    pub min: Vec3,
    pub max: Vec3,
}

impl OperatingVolume {
    pub fn contains(&self, p: Vec3) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }

    fn sample(&self, rng: &mut StdRng) -> Vec3 {
        let mut p = [0.0; 3];
        for i in 0..3 {
            p[i] = if self.min[i] < self.max[i] {
                rng.gen_range(self.min[i]..self.max[i])
            } else {
                self.min[i]
            };
        }
        p
    }
}

/// Bounded random-walk maneuver parameters.
#[derive(Debug, Clone, Copy)]
pub struct Maneuver {
    pub accel_std_mps2: f64,
    pub max_speed_mps: f64,
}

const SPAWN_VELOCITY_RANGES: [(f64, f64); 3] = [(-50.0, 50.0), (-30.0, 30.0), (-5.0, 5.0)];
const SPAWN_RCS_RANGE: (f64, f64) = (0.0, 20.0);

/// Ground-truth kinematic state of one simulated object. Owned by the
/// simulation orchestrator; sensors only ever read it.
#[derive(Debug, Clone)]
pub struct Target {
    pub id: u32,
    pub position: Vec3,
    pub velocity: Vec3,
    pub rcs_dbsm: f64,
    pub maneuver: Option<Maneuver>,
}

impl Target {
    pub fn spawn(
        id: u32,
        volume: &OperatingVolume,
        maneuver: Option<Maneuver>,
        rng: &mut StdRng,
    ) -> Self {
        let mut velocity = [0.0; 3];
        for (axis, (lo, hi)) in SPAWN_VELOCITY_RANGES.iter().enumerate() {
            velocity[axis] = rng.gen_range(*lo..*hi);
        }
        Self {
            id,
            position: volume.sample(rng),
            velocity,
            rcs_dbsm: rng.gen_range(SPAWN_RCS_RANGE.0..SPAWN_RCS_RANGE.1),
            maneuver,
        }
    }

    /// Advance one tick. Leaving the operating volume respawns the target in
    /// place of removing it, so the population size stays constant. Total
    /// function over valid input.
    pub fn advance(&mut self, dt: f64, volume: &OperatingVolume, rng: &mut StdRng) {
        self.position = add(self.position, scale(self.velocity, dt));
        if let Some(maneuver) = self.maneuver {
            if maneuver.accel_std_mps2 > 0.0 {
                if let Ok(perturbation) = Normal::new(0.0, maneuver.accel_std_mps2 * dt) {
                    for axis in 0..3 {
                        self.velocity[axis] += perturbation.sample(rng);
                    }
                }
                let speed = norm(self.velocity);
                if speed > maneuver.max_speed_mps {
                    self.velocity = scale(self.velocity, maneuver.max_speed_mps / speed);
                }
            }
        }
        if !volume.contains(self.position) {
            *self = Target::spawn(self.id, volume, self.maneuver, rng);
        }
    }
}
