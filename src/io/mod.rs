//! Grid file formats and external data sources.
//!
//! - **Connectivity files**: versioned text exchange format holding dims,
//!   cell centers, areas and neighbour lists
//! - **Gridded data sources**: dimension/variable lookup used to build
//!   latitude-longitude grids from climate-data files
//! - **NetCDF**: [`NetcdfSource`] (requires the `netcdf` feature)

mod connectivity_file;
#[cfg(feature = "netcdf")]
mod netcdf_source;
mod source;

pub use connectivity_file::{
    read_connectivity, read_connectivity_file, write_connectivity, write_connectivity_file,
    FILE_IDENTIFIER,
};
#[cfg(feature = "netcdf")]
pub use netcdf_source::NetcdfSource;
pub use source::GriddedDataSource;
