//! Flat cell collections on the sphere.
//!
//! A [`SimpleGrid`] starts out empty and is populated by exactly one
//! generator:
//! - [`SimpleGrid::generate_lat_lon`] / [`SimpleGrid::generate_lat_lon_from_source`]
//! - [`SimpleGrid::generate_rectilinear_stereographic`] / [`SimpleGrid::generate_radial_stereographic`]
//! - [`SimpleGrid::from_mesh_fv`] (one cell per mesh face)
//! - [`SimpleGrid::from_mesh_fe`] (one cell per continuous GLL node)
//! - [`SimpleGrid::from_file`] (connectivity file)
//!
//! Generators build their result off to the side and only commit it on
//! success, so a failed call leaves the grid empty.
//!
//! # Example
//!
//! ```
//! use simple_grid::{LatLonAxes, SimpleGrid};
//!
//! let axes = LatLonAxes::uniform(6, 12);
//! let mut grid = SimpleGrid::new();
//! grid.generate_lat_lon(&axes.lat, &axes.lon, false).unwrap();
//! assert_eq!(grid.dims(), &[6, 12]);
//!
//! grid.build_kd_tree().unwrap();
//! let cell = grid.nearest_node(grid.lon()[7], grid.lat()[7]).unwrap();
//! assert_eq!(cell, 7);
//! ```

mod adjacency;
mod finite_element;
mod finite_volume;
mod latlon;
mod stereographic;

pub use adjacency::NeighborSets;
pub use latlon::{LatLonAxes, LatLonVariables};
pub use stereographic::{RadialStereographic, RectilinearStereographic};

use std::path::Path;

use tracing::{debug, info};

use crate::error::GridError;
use crate::geometry::rll_to_xyz;
use crate::io::{read_connectivity_file, write_connectivity_file};
use crate::spatial::{KdTreeIndex, SpatialIndex};

/// Cell data of a populated grid.
///
/// All per-cell arrays run over the cells in flat row-major order of `dims`.
#[derive(Clone, Debug, PartialEq)]
pub struct GridData {
    /// Tensor-product shape; the product is the cell count
    pub dims: Vec<usize>,
    /// Center longitudes (radians)
    pub lon: Vec<f64>,
    /// Center latitudes (radians)
    pub lat: Vec<f64>,
    /// Cell areas on the unit sphere (steradians); `None` when the
    /// generator cannot compute them
    pub area: Option<Vec<f64>>,
    /// Neighbour cell indices of each cell
    pub connectivity: Vec<Vec<usize>>,
}

impl GridData {
    /// Number of cells implied by `dims` (0 when `dims` is empty).
    pub fn cell_count(&self) -> usize {
        if self.dims.is_empty() {
            0
        } else {
            self.dims.iter().product()
        }
    }
}

/// Population state of a grid.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum GridState {
    #[default]
    Uninitialized,
    Initialized(GridData),
}

/// Grid of cells with centers, areas, adjacency and an optional
/// nearest-cell index.
///
/// The index type is a capability parameter; it defaults to a k-d tree.
#[derive(Debug)]
pub struct SimpleGrid<I = KdTreeIndex> {
    state: GridState,
    index: Option<I>,
}

impl SimpleGrid {
    /// Create an empty grid using the default k-d tree index.
    pub fn new() -> Self {
        Self::with_spatial_index()
    }
}

impl Default for SimpleGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: SpatialIndex> SimpleGrid<I> {
    /// Create an empty grid using a caller-chosen spatial index type.
    pub fn with_spatial_index() -> Self {
        Self {
            state: GridState::Uninitialized,
            index: None,
        }
    }

    /// True once any generator has populated the grid or an index exists.
    pub fn is_initialized(&self) -> bool {
        matches!(self.state, GridState::Initialized(_)) || self.index.is_some()
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn data(&self) -> Option<&GridData> {
        match &self.state {
            GridState::Initialized(data) => Some(data),
            GridState::Uninitialized => None,
        }
    }

    /// Grid shape; empty while uninitialized.
    pub fn dims(&self) -> &[usize] {
        self.data().map(|d| d.dims.as_slice()).unwrap_or(&[])
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.data().map_or(0, |d| d.lon.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Center longitudes in radians.
    pub fn lon(&self) -> &[f64] {
        self.data().map(|d| d.lon.as_slice()).unwrap_or(&[])
    }

    /// Center latitudes in radians.
    pub fn lat(&self) -> &[f64] {
        self.data().map(|d| d.lat.as_slice()).unwrap_or(&[])
    }

    /// Cell areas in steradians.
    ///
    /// Fails for grids whose generator does not compute areas
    /// (stereographic samplers).
    pub fn area(&self) -> Result<&[f64], GridError> {
        match self.data() {
            None => Err(GridError::precondition("Grid is not initialized")),
            Some(GridData { area: None, .. }) => Err(GridError::unsupported(
                "Cell areas are not available for this grid (not implemented)",
            )),
            Some(GridData {
                area: Some(area), ..
            }) => Ok(area),
        }
    }

    /// Sum of all cell areas.
    pub fn total_area(&self) -> Result<f64, GridError> {
        Ok(self.area()?.iter().sum())
    }

    /// Neighbour lists of every cell.
    pub fn connectivity(&self) -> &[Vec<usize>] {
        self.data().map(|d| d.connectivity.as_slice()).unwrap_or(&[])
    }

    pub fn has_spatial_index(&self) -> bool {
        self.index.is_some()
    }

    /// Map per-axis coordinates to the flat cell index (row-major).
    pub fn coordinate_vector_to_index(&self, coords: &[usize]) -> Result<usize, GridError> {
        let dims = self.dims();
        if dims.is_empty() {
            return Err(GridError::precondition(
                "Invalid grid: dimensions have not been set",
            ));
        }
        if coords.len() != dims.len() {
            return Err(GridError::precondition(format!(
                "Invalid coordinate vector: {} components for a {}-dimensional grid",
                coords.len(),
                dims.len()
            )));
        }

        let mut ix = 0;
        for (d, (&c, &n)) in coords.iter().zip(dims).enumerate() {
            if c >= n {
                return Err(GridError::precondition(format!(
                    "Coordinate vector out of range: component {} is {} (dimension size {})",
                    d, c, n
                )));
            }
            ix = ix * n + c;
        }
        Ok(ix)
    }

    /// Populate the grid from a connectivity file.
    pub fn from_file(&mut self, path: impl AsRef<Path>) -> Result<(), GridError> {
        self.ensure_uninitialized("from_file")?;
        let data = read_connectivity_file(path.as_ref())?;
        self.commit(data)
    }

    /// Write the grid to a connectivity file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), GridError> {
        let data = self
            .data()
            .ok_or_else(|| GridError::precondition("Cannot write an uninitialized grid"))?;
        write_connectivity_file(data, path.as_ref())
    }

    /// Build the nearest-cell index over the cell centers.
    pub fn build_kd_tree(&mut self) -> Result<(), GridError> {
        if self.index.is_some() {
            return Err(GridError::precondition("k-d tree already exists"));
        }

        let (lon, lat) = (self.lon(), self.lat());
        if lon.is_empty() {
            return Err(GridError::precondition(
                "At least one grid cell needed to build a k-d tree",
            ));
        }
        if lon.len() != lat.len() {
            return Err(GridError::internal(format!(
                "Longitude and latitude arrays differ in length ({} != {})",
                lon.len(),
                lat.len()
            )));
        }

        let entries: Vec<([f64; 3], usize)> = lon
            .iter()
            .zip(lat)
            .enumerate()
            .map(|(cell, (&lo, &la))| (rll_to_xyz(lo, la), cell))
            .collect();

        let index = I::build(&entries)?;
        debug!("Built spatial index over {} cells", entries.len());
        self.index = Some(index);
        Ok(())
    }

    /// Index of the cell whose center is nearest to (lon, lat), in radians.
    pub fn nearest_node(&self, lon: f64, lat: f64) -> Result<usize, GridError> {
        let index = self.index.as_ref().ok_or_else(|| {
            GridError::precondition("build_kd_tree() must be called before nearest_node()")
        })?;

        let found = index.nearest(&rll_to_xyz(lon, lat));
        match found.as_slice() {
            [cell] => Ok(*cell),
            _ => Err(GridError::internal(format!(
                "Nearest-neighbour query returned incorrect result size ({})",
                found.len()
            ))),
        }
    }

    pub(crate) fn ensure_uninitialized(&self, operation: &str) -> Result<(), GridError> {
        if self.is_initialized() {
            Err(GridError::already_initialized(operation))
        } else {
            Ok(())
        }
    }

    fn commit(&mut self, data: GridData) -> Result<(), GridError> {
        if self.is_initialized() {
            return Err(GridError::internal("Grid was initialized twice"));
        }
        debug!("Grid initialized: dims {:?}, {} cells", data.dims, data.lon.len());
        self.state = GridState::Initialized(data);
        Ok(())
    }
}

/// Emit the total-area diagnostic.
fn report_total_area(area: &[f64]) {
    let total: f64 = area.iter().sum();
    info!("Total calculated area: {:.15e}", total);
}
