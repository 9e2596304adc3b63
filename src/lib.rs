//! # simple-grid
//!
//! Flat cell grids on the unit sphere for regridding and connectivity tools.
//!
//! A grid is a collection of cells with center coordinates, areas and a
//! neighbour graph. This crate provides:
//! - Structured latitude-longitude grids (global or regional)
//! - Rectilinear and radial stereographic point samplers
//! - Finite-volume grids from mesh faces
//! - Continuous finite-element grids from GLL nodes (Gauss-Lobatto)
//! - A text exchange format for grid connectivity
//! - Tensor-coordinate to flat-index mapping
//! - Nearest-cell lookup backed by a k-d tree

pub mod error;
pub mod geometry;
pub mod grid;
pub mod io;
pub mod mesh;
pub mod polynomial;
pub mod spatial;

pub use error::GridError;
pub use geometry::{rll_to_xyz, xyz_to_rll, CoordinateProjection, StereographicProjection};
pub use grid::{
    GridData, GridState, LatLonAxes, LatLonVariables, NeighborSets, RadialStereographic,
    RectilinearStereographic, SimpleGrid,
};
pub use io::{read_connectivity_file, write_connectivity_file, GriddedDataSource, FILE_IDENTIFIER};
#[cfg(feature = "netcdf")]
pub use io::NetcdfSource;
pub use mesh::{ElementMetadata, FiniteElementMetadata, GllMetadata, Mesh, MeshKind};
pub use polynomial::{GaussLobatto, Quadrature};
pub use spatial::{KdTreeIndex, SpatialIndex};
