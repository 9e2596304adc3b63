//! Structured latitude-longitude grids.
//!
//! Cells are the tensor product of a latitude axis and a longitude axis,
//! laid out latitude-major (cell = j·nLon + i). Cell boundaries sit halfway
//! between neighbouring centers. Global grids close at the poles and wrap
//! in longitude; regional grids extrapolate half a spacing past the first
//! and last centers instead.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use super::{report_total_area, GridData, SimpleGrid};
use crate::error::GridError;
use crate::geometry::{average_longitude, longitude_delta, ANGLE_TOLERANCE};
use crate::io::GriddedDataSource;
use crate::spatial::SpatialIndex;

/// Names of the coordinate variables read by
/// [`SimpleGrid::generate_lat_lon_from_source`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatLonVariables {
    pub lat: String,
    pub lon: String,
}

impl LatLonVariables {
    pub fn new(lat: impl Into<String>, lon: impl Into<String>) -> Self {
        Self {
            lat: lat.into(),
            lon: lon.into(),
        }
    }
}

impl Default for LatLonVariables {
    fn default() -> Self {
        Self::new("lat", "lon")
    }
}

/// Cell-centred coordinate axes, in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct LatLonAxes {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
}

impl LatLonAxes {
    /// Uniform global axes: `n_lat` bands from pole to pole and `n_lon`
    /// columns starting at longitude 0.
    pub fn uniform(n_lat: usize, n_lon: usize) -> Self {
        Self::region((-90.0, 90.0), (0.0, 360.0), n_lat, n_lon)
    }

    /// Uniform axes covering a box given in degrees as (min, max) pairs.
    ///
    /// Centers sit half a spacing inside the bounds.
    pub fn region(
        lat_bounds_deg: (f64, f64),
        lon_bounds_deg: (f64, f64),
        n_lat: usize,
        n_lon: usize,
    ) -> Self {
        Self {
            lat: cell_centres(lat_bounds_deg, n_lat),
            lon: cell_centres(lon_bounds_deg, n_lon),
        }
    }
}

fn cell_centres((min, max): (f64, f64), n: usize) -> Vec<f64> {
    let step = (max - min) / n.max(1) as f64;
    (0..n)
        .map(|k| (min + (k as f64 + 0.5) * step).to_radians())
        .collect()
}

impl<I: SpatialIndex> SimpleGrid<I> {
    /// Populate the grid from latitude and longitude centers in radians.
    ///
    /// `lat` must be monotone (either direction) with values in [-π/2, π/2];
    /// longitudes lie in [-2π, 2π]. Resulting dims are `[nLat, nLon]`.
    pub fn generate_lat_lon(
        &mut self,
        lat: &[f64],
        lon: &[f64],
        regional: bool,
    ) -> Result<(), GridError> {
        self.ensure_uninitialized("generate_lat_lon")?;
        let data = lat_lon_grid(lat, lon, regional)?;
        if let Some(area) = &data.area {
            report_total_area(area);
        }
        self.commit(data)
    }

    /// Populate the grid from coordinate variables (in degrees) read from a
    /// gridded data source.
    pub fn generate_lat_lon_from_source<S>(
        &mut self,
        source: &S,
        regional: bool,
        names: &LatLonVariables,
    ) -> Result<(), GridError>
    where
        S: GriddedDataSource + ?Sized,
    {
        self.ensure_uninitialized("generate_lat_lon")?;

        let lat = read_axis(source, &names.lat)?;
        let lon = read_axis(source, &names.lon)?;

        self.generate_lat_lon(&lat, &lon, regional)
    }
}

fn read_axis<S>(source: &S, name: &str) -> Result<Vec<f64>, GridError>
where
    S: GriddedDataSource + ?Sized,
{
    let len = source.dimension_len(name).ok_or_else(|| {
        GridError::precondition(format!("No dimension \"{}\" found in input file", name))
    })?;
    let values = source.read_variable_1d(name)?.ok_or_else(|| {
        GridError::precondition(format!("No variable \"{}\" found in input file", name))
    })?;
    if values.len() != len {
        return Err(GridError::format(format!(
            "Variable \"{}\" has {} values but dimension \"{}\" has length {}",
            name,
            values.len(),
            name,
            len
        )));
    }
    Ok(values.into_iter().map(f64::to_radians).collect())
}

/// Build the cell data of a latitude-longitude grid without touching any
/// grid state.
fn lat_lon_grid(lat: &[f64], lon: &[f64], regional: bool) -> Result<GridData, GridError> {
    let n_lat = lat.len();
    let n_lon = lon.len();

    if n_lat < 2 {
        return Err(GridError::precondition(format!(
            "At least two latitudes needed to generate grid (got {})",
            n_lat
        )));
    }
    if n_lon < 2 {
        return Err(GridError::precondition(format!(
            "At least two longitudes needed to generate grid (got {})",
            n_lon
        )));
    }

    if let Some(&bad) = lat.iter().find(|v| !(v.abs() <= FRAC_PI_2 + ANGLE_TOLERANCE)) {
        return Err(GridError::geometry(format!(
            "Latitude array must be given in radians within [-pi/2, pi/2] (found {})",
            bad
        )));
    }
    if let Some(&bad) = lon.iter().find(|v| !(v.abs() <= TAU + ANGLE_TOLERANCE)) {
        return Err(GridError::geometry(format!(
            "Longitude array must be given in radians within [-2pi, 2pi] (found {})",
            bad
        )));
    }

    let orient = if lat[1] < lat[0] { -1.0 } else { 1.0 };
    for (j, pair) in lat.windows(2).enumerate() {
        if orient * pair[1] < orient * pair[0] {
            return Err(GridError::geometry(format!(
                "Latitude array must be monotone (lat[{}] = {}, lat[{}] = {})",
                j,
                pair[0],
                j + 1,
                pair[1]
            )));
        }
    }

    let spans = longitude_spans(lon, regional)?;

    let n_cells = n_lat * n_lon;
    let mut lon_out = Vec::with_capacity(n_cells);
    let mut lat_out = Vec::with_capacity(n_cells);
    let mut area = Vec::with_capacity(n_cells);
    let mut connectivity = Vec::with_capacity(n_cells);

    for j in 0..n_lat {
        let lat1 = if j == 0 {
            if regional {
                lat[0] - 0.5 * (lat[1] - lat[0])
            } else {
                -orient * FRAC_PI_2
            }
        } else {
            0.5 * (lat[j - 1] + lat[j])
        };
        let lat2 = if j == n_lat - 1 {
            if regional {
                lat[j] + 0.5 * (lat[j] - lat[j - 1])
            } else {
                orient * FRAC_PI_2
            }
        } else {
            0.5 * (lat[j] + lat[j + 1])
        };
        let band = (lat2.sin() - lat1.sin()).abs();

        for i in 0..n_lon {
            lon_out.push(lon[i]);
            lat_out.push(lat[j]);
            area.push(band * spans[i]);
            connectivity.push(compass_neighbors(j, i, n_lat, n_lon, regional));
        }
    }

    Ok(GridData {
        dims: vec![n_lat, n_lon],
        lon: lon_out,
        lat: lat_out,
        area: Some(area),
        connectivity,
    })
}

/// Longitudinal width of every column, checked to be at most π.
fn longitude_spans(lon: &[f64], regional: bool) -> Result<Vec<f64>, GridError> {
    let n_lon = lon.len();
    let wrap = average_longitude(lon[n_lon - 1], lon[0]);

    let mut spans = Vec::with_capacity(n_lon);
    for i in 0..n_lon {
        let west = if i == 0 {
            if regional {
                lon[0] - 0.5 * longitude_delta(lon[0], lon[1])
            } else {
                wrap
            }
        } else {
            average_longitude(lon[i - 1], lon[i])
        };
        let east = if i == n_lon - 1 {
            if regional {
                lon[i] + 0.5 * longitude_delta(lon[i - 1], lon[i])
            } else {
                wrap
            }
        } else {
            average_longitude(lon[i], lon[i + 1])
        };

        // Eastward extent from west to east edge
        let span = (east - west).rem_euclid(TAU);
        if span > PI + ANGLE_TOLERANCE {
            return Err(GridError::geometry(format!(
                "Grid longitude spacing exceeds pi at column {} (west edge {}, east edge {}). \
                 Did you mean to specify regional?",
                i, west, east
            )));
        }
        spans.push(span);
    }
    Ok(spans)
}

/// Neighbours of cell (j, i) in fixed compass order: south row, north row,
/// east, west. Polar rows have no row neighbour beyond the pole; regional
/// boundary columns have no horizontal neighbours.
fn compass_neighbors(j: usize, i: usize, n_lat: usize, n_lon: usize, regional: bool) -> Vec<usize> {
    let mut nbrs = Vec::with_capacity(4);
    if j != 0 {
        nbrs.push((j - 1) * n_lon + i);
    }
    if j != n_lat - 1 {
        nbrs.push((j + 1) * n_lon + i);
    }
    if !regional || (i != 0 && i != n_lon - 1) {
        nbrs.push(j * n_lon + (i + 1) % n_lon);
        nbrs.push(j * n_lon + (i + n_lon - 1) % n_lon);
    }
    nbrs
}
