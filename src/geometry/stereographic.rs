//! Stereographic projection of the unit sphere.
//!
//! The projection is tangent at a reference point (lon0, lat0) with unit
//! scale there, so a point at great-circle distance θ from the reference
//! lands at plane radius ρ = 2 tan(θ/2). The antipode of the reference point
//! maps to infinity.
//!
//! # Example
//!
//! ```
//! use simple_grid::geometry::{CoordinateProjection, StereographicProjection};
//!
//! let proj = StereographicProjection::new(0.3, 0.8);
//! let (x, y) = proj.forward(0.35, 0.75);
//! let (lon, lat) = proj.inverse(x, y);
//! assert!((lon - 0.35).abs() < 1e-12);
//! assert!((lat - 0.75).abs() < 1e-12);
//! ```

use std::f64::consts::FRAC_PI_2;

use super::sphere::{normalize_longitude, ANGLE_TOLERANCE};

/// Trait for sphere-to-plane projections (radians in, plane units out).
pub trait CoordinateProjection {
    /// Map (lon, lat) to plane coordinates (x, y).
    fn forward(&self, lon: f64, lat: f64) -> (f64, f64);

    /// Map plane coordinates (x, y) back to (lon, lat), lon in [0, 2π).
    fn inverse(&self, x: f64, y: f64) -> (f64, f64);
}

/// Plane radius of a point at angular distance `theta` from the tangent point.
///
/// Equivalent to 2·sqrt((1 - cos θ)/(1 + cos θ)); diverges as θ → π.
#[inline]
pub fn plane_radius(theta: f64) -> f64 {
    let c = theta.cos();
    2.0 * ((1.0 - c) / (1.0 + c)).sqrt()
}

/// Stereographic projection about a reference point on the unit sphere.
#[derive(Debug, Clone, Copy)]
pub struct StereographicProjection {
    lon0: f64,
    lat0: f64,
    sin_lat0: f64,
    cos_lat0: f64,
}

impl StereographicProjection {
    /// Create a projection tangent at (lon0, lat0), in radians.
    ///
    /// A reference latitude within round-off of a pole is snapped to it.
    pub fn new(lon0: f64, lat0: f64) -> Self {
        let lat0 = if (lat0 - FRAC_PI_2).abs() < ANGLE_TOLERANCE {
            FRAC_PI_2
        } else if (lat0 + FRAC_PI_2).abs() < ANGLE_TOLERANCE {
            -FRAC_PI_2
        } else {
            lat0
        };

        Self {
            lon0,
            lat0,
            sin_lat0: lat0.sin(),
            cos_lat0: lat0.cos(),
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.lon0, self.lat0)
    }
}

impl CoordinateProjection for StereographicProjection {
    fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let dlon = lon - self.lon0;
        let (sin_lat, cos_lat) = lat.sin_cos();
        let cos_c = self.sin_lat0 * sin_lat + self.cos_lat0 * cos_lat * dlon.cos();
        let k = 2.0 / (1.0 + cos_c);

        let x = k * cos_lat * dlon.sin();
        let y = k * (self.cos_lat0 * sin_lat - self.sin_lat0 * cos_lat * dlon.cos());
        (x, y)
    }

    fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let rho = x.hypot(y);
        if rho < ANGLE_TOLERANCE {
            return (normalize_longitude(self.lon0), self.lat0);
        }

        let c = 2.0 * (0.5 * rho).atan();
        let (sin_c, cos_c) = c.sin_cos();

        let lat = (cos_c * self.sin_lat0 + y * sin_c * self.cos_lat0 / rho)
            .clamp(-1.0, 1.0)
            .asin();
        let lon = self.lon0
            + (x * sin_c).atan2(rho * self.cos_lat0 * cos_c - y * self.sin_lat0 * sin_c);

        (normalize_longitude(lon), lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::great_circle_distance;
    use std::f64::consts::PI;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_plane_radius_matches_half_angle_tangent() {
        for &theta in &[0.0_f64, 0.1, 0.5, 1.0, 2.0, 3.0] {
            let expected = 2.0 * (0.5 * theta).tan();
            assert!((plane_radius(theta) - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn test_center_maps_to_origin() {
        let proj = StereographicProjection::new(1.2, -0.4);
        let (x, y) = proj.forward(1.2, -0.4);
        assert!(x.abs() < TOL && y.abs() < TOL);

        let (lon, lat) = proj.inverse(0.0, 0.0);
        assert!((lon - 1.2).abs() < TOL);
        assert!((lat + 0.4).abs() < TOL);
    }

    #[test]
    fn test_radius_encodes_angular_distance() {
        let proj = StereographicProjection::new(0.5, 0.7);
        for &theta in &[0.05, 0.3, 1.0, 2.5] {
            let r = plane_radius(theta);
            for k in 0..8 {
                let az = 2.0 * PI * k as f64 / 8.0;
                let (lon, lat) = proj.inverse(r * az.cos(), r * az.sin());
                let d = great_circle_distance(0.5, 0.7, lon, lat);
                assert!((d - theta).abs() < 1e-10, "theta={} got {}", theta, d);
            }
        }
    }

    #[test]
    fn test_positive_y_points_north() {
        let proj = StereographicProjection::new(0.0, 0.0);
        let (lon, lat) = proj.inverse(0.0, 0.2);
        assert!(lon.abs() < TOL);
        assert!(lat > 0.0);

        let (lon, _) = proj.inverse(0.2, 0.0);
        assert!(lon > 0.0 && lon < PI);
    }

    #[test]
    fn test_polar_reference_is_snapped() {
        let proj = StereographicProjection::new(0.0, FRAC_PI_2 - 1e-14);
        assert_eq!(proj.center().1, FRAC_PI_2);

        let (_, lat) = proj.inverse(0.1, 0.0);
        assert!(lat < FRAC_PI_2);
    }

    #[test]
    fn test_roundtrip() {
        let proj = StereographicProjection::new(4.0, -1.0);
        for &(lon, lat) in &[(4.1, -0.9), (3.5, -1.3), (5.0, 0.2)] {
            let (x, y) = proj.forward(lon, lat);
            let (lon2, lat2) = proj.inverse(x, y);
            assert!((lon - lon2).abs() < 1e-10);
            assert!((lat - lat2).abs() < 1e-10);
        }
    }
}
