//! ENU-frame vector and angle helpers shared by the simulation, the
//! normalizer, and the tracker. Azimuth is measured in degrees clockwise
//! from north throughout.

pub type Vec3 = [f64; 3];

pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn scale(v: Vec3, k: f64) -> Vec3 {
    [v[0] * k, v[1] * k, v[2] * k]
}

pub fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn norm(v: Vec3) -> f64 {
    dot(v, v).sqrt()
}

/// Wrap an angle into [0, 360).
pub fn wrap_deg(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}

/// Wrap an angle into [-180, 180).
pub fn wrap_signed_deg(angle: f64) -> f64 {
    (angle + 180.0).rem_euclid(360.0) - 180.0
}

/// Project a polar measurement into ENU Cartesian.
pub fn spherical_to_enu(range_m: f64, azimuth_deg: f64, elevation_deg: f64) -> Vec3 {
    let az = azimuth_deg.to_radians();
    let el = elevation_deg.to_radians();
    [
        range_m * el.cos() * az.sin(),
        range_m * el.cos() * az.cos(),
        range_m * el.sin(),
    ]
}

/// Inverse of `spherical_to_enu`: (range, azimuth in [0, 360), elevation).
pub fn enu_to_spherical(v: Vec3) -> (f64, f64, f64) {
    let range = norm(v);
    if range <= f64::EPSILON {
        return (0.0, 0.0, 0.0);
    }
    let azimuth = wrap_deg(v[0].atan2(v[1]).to_degrees());
    let elevation = (v[2] / range).clamp(-1.0, 1.0).asin().to_degrees();
    (range, azimuth, elevation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spherical_round_trip_recovers_polar_measurement() {
        let v = spherical_to_enu(2500.0, 123.0, 12.5);
        let (range, azimuth, elevation) = enu_to_spherical(v);
        assert!((range - 2500.0).abs() < 1e-6);
        assert!((azimuth - 123.0).abs() < 1e-6);
        assert!((elevation - 12.5).abs() < 1e-6);
    }

    #[test]
    fn north_is_zero_azimuth() {
        let v = spherical_to_enu(1000.0, 0.0, 0.0);
        assert!((v[0]).abs() < 1e-9);
        assert!((v[1] - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn wrapping_covers_negative_angles() {
        assert!((wrap_deg(-90.0) - 270.0).abs() < 1e-9);
        assert!((wrap_signed_deg(350.0) + 10.0).abs() < 1e-9);
        assert!((wrap_signed_deg(-190.0) - 170.0).abs() < 1e-9);
    }
}
