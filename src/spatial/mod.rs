//! Nearest-neighbour lookup over unit-sphere points.
//!
//! The grid only ever hands the index Cartesian projections of cell centers
//! together with an opaque cell payload, and asks for the single nearest
//! entry. [`SpatialIndex`] captures exactly that capability so the
//! concrete tree can be swapped out.

mod kdtree;

pub use kdtree::KdTreeIndex;

use crate::error::GridError;

/// Capability interface for a 3D nearest-neighbour index.
pub trait SpatialIndex: Sized {
    /// Build an index over `(point, payload)` entries.
    fn build(entries: &[([f64; 3], usize)]) -> Result<Self, GridError>;

    /// Payloads of the entries nearest to `point`.
    ///
    /// A well-behaved index returns exactly one payload.
    fn nearest(&self, point: &[f64; 3]) -> Vec<usize>;
}
