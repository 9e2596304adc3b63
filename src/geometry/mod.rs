//! Spherical geometry.
//!
//! Provides:
//! - Conversions between (lon, lat) and unit-sphere Cartesian coordinates
//! - Periodicity-aware longitude arithmetic
//! - Spherical triangle areas and great-circle distances
//! - Stereographic projection

mod sphere;
mod stereographic;

pub use sphere::{
    average_longitude, cross, dot, great_circle_distance, longitude_delta, norm, normalize,
    normalize_longitude, rll_to_xyz, spherical_triangle_area, xyz_to_rll, ANGLE_TOLERANCE,
};
pub use stereographic::{plane_radius, CoordinateProjection, StereographicProjection};
