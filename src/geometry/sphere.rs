//! Unit-sphere coordinate utilities.
//!
//! Longitudes and latitudes are in radians. Longitudes returned by this
//! module are normalized to [0, 2π).

use std::f64::consts::{PI, TAU};

/// Round-off allowance used when comparing angles.
pub const ANGLE_TOLERANCE: f64 = 1.0e-12;

/// Map a longitude into [0, 2π).
#[inline]
pub fn normalize_longitude(lon: f64) -> f64 {
    let lon = lon.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if lon >= TAU {
        0.0
    } else {
        lon
    }
}

/// Signed shorter-arc difference `to - from`, in (-π, π].
#[inline]
pub fn longitude_delta(from: f64, to: f64) -> f64 {
    let d = (to - from).rem_euclid(TAU);
    if d > PI {
        d - TAU
    } else {
        d
    }
}

/// Periodicity-aware mean of two longitudes.
///
/// Returns the midpoint of the shorter arc between the two, in [0, 2π).
/// An exactly antipodal pair resolves to the midpoint of the eastward arc
/// from `lon1` to `lon2`.
#[inline]
pub fn average_longitude(lon1: f64, lon2: f64) -> f64 {
    normalize_longitude(lon1 + 0.5 * longitude_delta(lon1, lon2))
}

/// Project (lon, lat) onto the unit sphere.
#[inline]
pub fn rll_to_xyz(lon: f64, lat: f64) -> [f64; 3] {
    let cos_lat = lat.cos();
    [lon.cos() * cos_lat, lon.sin() * cos_lat, lat.sin()]
}

/// Recover (lon, lat) from a Cartesian point, projecting it onto the sphere.
///
/// The origin maps to (0, 0).
pub fn xyz_to_rll(p: [f64; 3]) -> (f64, f64) {
    let r = norm(p);
    if r == 0.0 {
        return (0.0, 0.0);
    }
    let z = (p[2] / r).clamp(-1.0, 1.0);
    let lat = z.asin();
    let lon = if p[0] == 0.0 && p[1] == 0.0 {
        0.0
    } else {
        normalize_longitude(p[1].atan2(p[0]))
    };
    (lon, lat)
}

/// Great-circle distance between two points on the unit sphere (haversine).
pub fn great_circle_distance(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (0.5 * dlat).sin().powi(2) + lat1.cos() * lat2.cos() * (0.5 * dlon).sin().powi(2);
    2.0 * a.sqrt().min(1.0).asin()
}

/// Area of the spherical triangle spanned by three unit vectors.
///
/// Uses tan(E/2) = |a·(b×c)| / (1 + a·b + b·c + c·a), which stays accurate
/// for small and degenerate triangles.
pub fn spherical_triangle_area(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> f64 {
    let triple = dot(a, cross(b, c)).abs();
    let denom = 1.0 + dot(a, b) + dot(b, c) + dot(c, a);
    2.0 * triple.atan2(denom)
}

#[inline]
pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

/// Scale a vector to unit length. The zero vector is returned unchanged.
#[inline]
pub fn normalize(a: [f64; 3]) -> [f64; 3] {
    let r = norm(a);
    if r == 0.0 {
        a
    } else {
        [a[0] / r, a[1] / r, a[2] / r]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_average_longitude_plain() {
        assert!((average_longitude(0.0, 0.2) - 0.1).abs() < TOL);
        assert!((average_longitude(0.2, 0.0) - 0.1).abs() < TOL);
    }

    #[test]
    fn test_average_longitude_across_meridian() {
        let west = TAU - 0.2;
        let east = 0.1;
        let avg = average_longitude(west, east);
        assert!((avg - (TAU - 0.05)).abs() < TOL, "got {}", avg);
        assert!((average_longitude(east, west) - avg).abs() < TOL);
    }

    #[test]
    fn test_average_longitude_antipodal_goes_east() {
        assert!((average_longitude(0.0, PI) - FRAC_PI_2).abs() < TOL);
        assert!((average_longitude(PI, 0.0) - 1.5 * PI).abs() < TOL);
    }

    #[test]
    fn test_longitude_delta_range() {
        assert!((longitude_delta(0.1, TAU - 0.1) + 0.2).abs() < TOL);
        assert!((longitude_delta(TAU - 0.1, 0.1) - 0.2).abs() < TOL);
        assert!((longitude_delta(0.0, PI) - PI).abs() < TOL);
    }

    #[test]
    fn test_xyz_roundtrip() {
        for &(lon, lat) in &[(0.0, 0.0), (1.0, 0.5), (4.0, -1.2), (6.0, 0.3)] {
            let (lon2, lat2) = xyz_to_rll(rll_to_xyz(lon, lat));
            assert!((lon - lon2).abs() < TOL);
            assert!((lat - lat2).abs() < TOL);
        }
    }

    #[test]
    fn test_xyz_to_rll_projects_interior_points() {
        let (lon, lat) = xyz_to_rll([0.5, 0.0, 0.0]);
        assert!(lon.abs() < TOL);
        assert!(lat.abs() < TOL);

        let (_, lat) = xyz_to_rll([0.0, 0.0, -3.0]);
        assert!((lat + FRAC_PI_2).abs() < TOL);
    }

    #[test]
    fn test_octant_triangle_area() {
        // One octant of the unit sphere has area 4π/8
        let area = spherical_triangle_area([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]);
        assert!((area - PI / 2.0).abs() < TOL);
    }

    #[test]
    fn test_great_circle_distance() {
        assert!((great_circle_distance(0.0, 0.0, FRAC_PI_2, 0.0) - FRAC_PI_2).abs() < TOL);
        assert!((great_circle_distance(1.0, -FRAC_PI_2, 2.0, FRAC_PI_2) - PI).abs() < 1e-9);
    }
}
