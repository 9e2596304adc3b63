//! NetCDF-backed gridded data source.
//!
//! ```rust,ignore
//! use simple_grid::io::NetcdfSource;
//! use simple_grid::{LatLonVariables, SimpleGrid};
//!
//! let source = NetcdfSource::open("era5_t2m.nc")?;
//! let mut grid = SimpleGrid::new();
//! grid.generate_lat_lon_from_source(
//!     &source,
//!     false,
//!     &LatLonVariables::new("latitude", "longitude"),
//! )?;
//! ```

use std::path::Path;

use tracing::debug;

use super::source::GriddedDataSource;
use crate::error::GridError;

/// Open netCDF file queried by dimension and variable name.
pub struct NetcdfSource {
    file: netcdf::File,
}

impl NetcdfSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GridError> {
        let path = path.as_ref();
        let file = netcdf::open(path)?;
        debug!("Opened {}", path.display());
        Ok(Self { file })
    }
}

impl GriddedDataSource for NetcdfSource {
    fn dimension_len(&self, name: &str) -> Option<usize> {
        self.file.dimension(name).map(|d| d.len())
    }

    fn read_variable_1d(&self, name: &str) -> Result<Option<Vec<f64>>, GridError> {
        let Some(var) = self.file.variable(name) else {
            return Ok(None);
        };
        let rank = var.dimensions().len();
        if rank != 1 {
            return Err(GridError::format(format!(
                "Variable \"{}\" has {} dimensions (expected 1)",
                name, rank
            )));
        }
        let values: Vec<f64> = var.get_values(..)?;
        Ok(Some(values))
    }
}

impl std::fmt::Debug for NetcdfSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetcdfSource").finish_non_exhaustive()
    }
}
