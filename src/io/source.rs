//! Read access to gridded climate-data files.

use crate::error::GridError;

/// Dimension and coordinate-variable lookup by name.
///
/// Implemented by [`NetcdfSource`](super::NetcdfSource) when the `netcdf`
/// feature is enabled; tests and other callers can supply in-memory sources.
pub trait GriddedDataSource {
    /// Length of the named dimension, if present.
    fn dimension_len(&self, name: &str) -> Option<usize>;

    /// Values of the named one-dimensional variable, if present.
    fn read_variable_1d(&self, name: &str) -> Result<Option<Vec<f64>>, GridError>;
}
