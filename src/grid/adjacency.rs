//! Neighbour-set accumulation for mesh-derived grids.

use std::collections::BTreeSet;

/// Per-cell sets of neighbour indices.
///
/// Insertions are deduplicated; [`NeighborSets::into_connectivity`]
/// flattens every set in ascending order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NeighborSets {
    sets: Vec<BTreeSet<usize>>,
}

impl NeighborSets {
    pub fn new(n_cells: usize) -> Self {
        Self {
            sets: vec![BTreeSet::new(); n_cells],
        }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Record `neighbor` as adjacent to `cell`. Out-of-range cells are ignored.
    pub fn insert(&mut self, cell: usize, neighbor: usize) {
        if let Some(set) = self.sets.get_mut(cell) {
            set.insert(neighbor);
        }
    }

    /// Record a symmetric adjacency.
    pub fn link(&mut self, a: usize, b: usize) {
        self.insert(a, b);
        self.insert(b, a);
    }

    pub fn into_connectivity(self) -> Vec<Vec<usize>> {
        self.sets
            .into_iter()
            .map(|set| set.into_iter().collect())
            .collect()
    }
}
