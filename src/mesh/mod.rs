//! Mesh representation.
//!
//! Provides the unstructured-mesh collaborator that grids are derived from:
//! - Polygonal mesh on the unit sphere with edge-to-face adjacency
//! - Spherical face areas
//! - Cubed-sphere and regular latitude-longitude mesh generators
//! - Continuous spectral-element metadata (shared GLL node ids, Jacobians)

mod metadata;
mod unstructured;

pub use metadata::{
    apply_local_map, ElementMetadata, FiniteElementMetadata, GllMetadata, LocalMapPoint,
};
pub use unstructured::{EdgeKey, FacePair, Mesh, MeshKind};
