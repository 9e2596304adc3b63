//! Point samplers on a stereographic plane.
//!
//! Both samplers lay points out in plane coordinates around a tangent
//! point and map them back to the sphere. Spacing is given as an angular
//! distance along the sphere, converted to plane radius so that sample
//! rings stay equally spaced in great-circle distance from the center.
//!
//! These grids carry no areas and no adjacency.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use super::{GridData, SimpleGrid};
use crate::error::GridError;
use crate::geometry::{plane_radius, CoordinateProjection, StereographicProjection, ANGLE_TOLERANCE};
use crate::spatial::SpatialIndex;

/// Square `n × n` block of samples centred on (center_lon, center_lat).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectilinearStereographic {
    /// Tangent longitude (radians)
    pub center_lon: f64,
    /// Tangent latitude (radians)
    pub center_lat: f64,
    /// Samples per side
    pub n: usize,
    /// Angular spacing between samples (degrees)
    pub spacing_deg: f64,
    /// Request cell areas (not implemented; generation fails when set)
    pub calculate_area: bool,
}

impl RectilinearStereographic {
    pub fn new(center_lon: f64, center_lat: f64, n: usize, spacing_deg: f64) -> Self {
        Self {
            center_lon,
            center_lat,
            n,
            spacing_deg,
            calculate_area: false,
        }
    }

    pub fn with_area(mut self, calculate_area: bool) -> Self {
        self.calculate_area = calculate_area;
        self
    }
}

/// Polar disc of samples: `n_radial` rings of `n_azimuthal` points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialStereographic {
    pub center_lon: f64,
    pub center_lat: f64,
    pub n_radial: usize,
    pub n_azimuthal: usize,
    /// Angular spacing between rings (degrees)
    pub spacing_deg: f64,
    pub calculate_area: bool,
}

impl RadialStereographic {
    /// Fewest azimuthal slices accepted.
    pub const MIN_AZIMUTHAL: usize = 8;

    pub fn new(
        center_lon: f64,
        center_lat: f64,
        n_radial: usize,
        n_azimuthal: usize,
        spacing_deg: f64,
    ) -> Self {
        Self {
            center_lon,
            center_lat,
            n_radial,
            n_azimuthal,
            spacing_deg,
            calculate_area: false,
        }
    }

    pub fn with_area(mut self, calculate_area: bool) -> Self {
        self.calculate_area = calculate_area;
        self
    }
}

fn check_center_and_spacing(center_lat: f64, spacing_deg: f64) -> Result<(), GridError> {
    if !(center_lat.abs() <= FRAC_PI_2 + ANGLE_TOLERANCE) {
        return Err(GridError::precondition(format!(
            "Center latitude must be in [-pi/2, pi/2] (got {})",
            center_lat
        )));
    }
    if !(spacing_deg > 0.0) || !spacing_deg.is_finite() {
        return Err(GridError::precondition(format!(
            "Grid spacing must be positive (got {})",
            spacing_deg
        )));
    }
    Ok(())
}

impl<I: SpatialIndex> SimpleGrid<I> {
    /// Sample an `n × n` rectilinear block on the stereographic plane.
    ///
    /// Sample `j·n + i` sits at plane coordinates (x_i, y_j). Dims are `[n, n]`.
    pub fn generate_rectilinear_stereographic(
        &mut self,
        config: &RectilinearStereographic,
    ) -> Result<(), GridError> {
        self.ensure_uninitialized("generate_rectilinear_stereographic")?;

        let n = config.n;
        if n < 1 {
            return Err(GridError::precondition(
                "Rectilinear stereographic grid needs at least one sample per side",
            ));
        }
        check_center_and_spacing(config.center_lat, config.spacing_deg)?;

        if config.calculate_area {
            return Err(GridError::unsupported(
                "Unable to calculate area of rectilinear stereographic grid (not implemented)",
            ));
        }

        let delta = config.spacing_deg.to_radians();
        let half_extent = 0.5 * delta * (n - 1) as f64;
        if half_extent > PI - ANGLE_TOLERANCE {
            return Err(GridError::geometry(format!(
                "Total angular coverage of rectilinear stereographic grid too large \
                 (half-extent {} rad reaches the antipode)",
                half_extent
            )));
        }

        // Plane coordinate of each row/column, sign-matched to its angle
        let axis: Vec<f64> = (0..n)
            .map(|k| {
                let theta = -half_extent + delta * k as f64;
                plane_radius(theta.abs()).copysign(theta)
            })
            .collect();

        let proj = StereographicProjection::new(config.center_lon, config.center_lat);
        let mut lon = Vec::with_capacity(n * n);
        let mut lat = Vec::with_capacity(n * n);
        for &y in &axis {
            for &x in &axis {
                let (lo, la) = proj.inverse(x, y);
                lon.push(lo);
                lat.push(la);
            }
        }

        self.commit(GridData {
            dims: vec![n, n],
            lon,
            lat,
            area: None,
            connectivity: vec![Vec::new(); n * n],
        })
    }

    /// Sample rings of points around the tangent point.
    ///
    /// Ring `j` sits at angular distance (j + 1/2)·spacing; sample
    /// `j·nA + i` is at azimuth 2π·i/nA. Dims are `[nR, nA]`.
    pub fn generate_radial_stereographic(
        &mut self,
        config: &RadialStereographic,
    ) -> Result<(), GridError> {
        self.ensure_uninitialized("generate_radial_stereographic")?;

        let (n_r, n_a) = (config.n_radial, config.n_azimuthal);
        if n_a < RadialStereographic::MIN_AZIMUTHAL {
            return Err(GridError::precondition(format!(
                "Minimum of {} azimuthal slices allowed ({} requested)",
                RadialStereographic::MIN_AZIMUTHAL,
                n_a
            )));
        }
        if n_r < 1 {
            return Err(GridError::precondition(
                "Radial stereographic grid needs at least one ring",
            ));
        }
        check_center_and_spacing(config.center_lat, config.spacing_deg)?;

        if config.calculate_area {
            return Err(GridError::unsupported(
                "Unable to calculate area of radial stereographic grid (not implemented)",
            ));
        }

        let delta = config.spacing_deg.to_radians();
        let max_radius = (n_r as f64 - 0.5) * delta;
        if max_radius >= PI {
            return Err(GridError::geometry(format!(
                "Total angular coverage of radial stereographic grid too large \
                 (outer ring at {} rad)",
                max_radius
            )));
        }

        let proj = StereographicProjection::new(config.center_lon, config.center_lat);
        let mut lon = Vec::with_capacity(n_r * n_a);
        let mut lat = Vec::with_capacity(n_r * n_a);
        for j in 0..n_r {
            let rho = plane_radius((j as f64 + 0.5) * delta);
            for i in 0..n_a {
                let azimuth = TAU * i as f64 / n_a as f64;
                let (lo, la) = proj.inverse(rho * azimuth.cos(), rho * azimuth.sin());
                lon.push(lo);
                lat.push(la);
            }
        }

        self.commit(GridData {
            dims: vec![n_r, n_a],
            lon,
            lat,
            area: None,
            connectivity: vec![Vec::new(); n_r * n_a],
        })
    }
}
