//! k-d tree backed [`SpatialIndex`].

use std::collections::HashMap;
use std::fmt;

use kiddo::{ImmutableKdTree, SquaredEuclidean};
use tracing::debug;

use super::SpatialIndex;
use crate::error::GridError;

/// Centers closer than this on every axis are one point.
const COINCIDENT_TOLERANCE: f64 = 1e-12;

/// Immutable k-d tree over 3D points with a payload per point.
///
/// Near-coincident points (e.g. every sample of a polar latitude row) are
/// merged into one entry carrying the lowest payload. The rest are stored in
/// a fixed rotated frame so that structured grids do not line up on a split
/// axis; the bulk builder cannot split a run of equal values.
pub struct KdTreeIndex {
    tree: ImmutableKdTree<f64, 3>,
    payloads: Vec<usize>,
    frame: [[f64; 3]; 3],
}

impl KdTreeIndex {
    /// Number of distinct points in the tree.
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

fn rotate(frame: &[[f64; 3]; 3], p: &[f64; 3]) -> [f64; 3] {
    frame.map(|row| row[0] * p[0] + row[1] * p[1] + row[2] * p[2])
}

/// Proper z-x-z Euler rotation with angles chosen off every symmetry of a
/// lat-lon or cubed-sphere grid.
fn generic_frame() -> [[f64; 3]; 3] {
    let (s1, c1) = 0.5_f64.sin_cos();
    let (s2, c2) = 0.9_f64.sin_cos();
    let (s3, c3) = 1.3_f64.sin_cos();
    [
        [c1 * c3 - c2 * s1 * s3, -c1 * s3 - c2 * c3 * s1, s1 * s2],
        [c3 * s1 + c1 * c2 * s3, c1 * c2 * c3 - s1 * s3, -c1 * s2],
        [s2 * s3, c3 * s2, c2],
    ]
}

fn coincidence_key(p: &[f64; 3]) -> [i64; 3] {
    p.map(|c| (c / COINCIDENT_TOLERANCE).round() as i64)
}

impl SpatialIndex for KdTreeIndex {
    fn build(entries: &[([f64; 3], usize)]) -> Result<Self, GridError> {
        if entries.is_empty() {
            return Err(GridError::precondition(
                "k-d tree construction needs at least one point",
            ));
        }

        if let Some(bad) = entries
            .iter()
            .position(|(p, _)| p.iter().any(|c| !c.is_finite()))
        {
            return Err(GridError::internal(format!(
                "k-d tree construction failed: point {} is not finite",
                bad
            )));
        }

        let mut unique: Vec<[f64; 3]> = Vec::with_capacity(entries.len());
        let mut payloads: Vec<usize> = Vec::with_capacity(entries.len());
        let mut seen: HashMap<[i64; 3], usize> = HashMap::with_capacity(entries.len());
        for (point, payload) in entries {
            match seen.get(&coincidence_key(point)) {
                Some(&slot) => payloads[slot] = payloads[slot].min(*payload),
                None => {
                    seen.insert(coincidence_key(point), unique.len());
                    unique.push(*point);
                    payloads.push(*payload);
                }
            }
        }
        if unique.len() < entries.len() {
            debug!(
                "Merged {} points into {} distinct points",
                entries.len(),
                unique.len()
            );
        }

        let frame = generic_frame();
        let points: Vec<[f64; 3]> = unique.iter().map(|p| rotate(&frame, p)).collect();
        let tree = ImmutableKdTree::new_from_slice(&points);
        Ok(Self {
            tree,
            payloads,
            frame,
        })
    }

    fn nearest(&self, point: &[f64; 3]) -> Vec<usize> {
        self.tree
            .nearest_n::<SquaredEuclidean>(&rotate(&self.frame, point), 1)
            .into_iter()
            .filter_map(|n| self.payloads.get(n.item as usize).copied())
            .collect()
    }
}

impl fmt::Debug for KdTreeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KdTreeIndex")
            .field("len", &self.payloads.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::rll_to_xyz;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_nearest_returns_payload() {
        let entries = vec![
            ([1.0, 0.0, 0.0], 10),
            ([0.0, 1.0, 0.0], 20),
            ([0.0, 0.0, 1.0], 30),
        ];
        let index = KdTreeIndex::build(&entries).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.nearest(&[0.9, 0.1, 0.0]), vec![10]);
        assert_eq!(index.nearest(&[0.0, 0.2, 0.9]), vec![30]);
    }

    #[test]
    fn test_coincident_points() {
        let entries: Vec<_> = (0..100).map(|i| ([0.0, 0.0, 1.0], i)).collect();
        let index = KdTreeIndex::build(&entries).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.nearest(&[0.0, 0.0, 1.0]), vec![0]);
    }

    #[test]
    fn test_pole_rows_keep_lowest_payload() {
        // Pole samples differ by ~1e-17 in x and y; payloads go in descending.
        let mut entries = Vec::new();
        for i in (0..360).rev() {
            let lon = (i as f64).to_radians();
            entries.push((rll_to_xyz(lon, FRAC_PI_2), 1000 + i));
            entries.push((rll_to_xyz(lon, -FRAC_PI_2), 2000 + i));
        }
        entries.push(([1.0, 0.0, 0.0], 7));
        entries.push(([0.0, -0.0, -1.0], 5));
        entries.push(([0.0, 1.0, 0.0], 8));
        let index = KdTreeIndex::build(&entries).unwrap();

        assert_eq!(index.len(), 4);
        assert_eq!(index.nearest(&[0.0, 0.01, 0.99]), vec![1000]);
        assert_eq!(index.nearest(&[0.0, 0.0, -1.0]), vec![5]);
        assert_eq!(index.nearest(&[0.99, 0.0, 0.01]), vec![7]);
        assert_eq!(index.nearest(&[0.0, 0.99, 0.01]), vec![8]);
    }

    #[test]
    fn test_rows_sharing_height() {
        // Every row of a 1 degree grid shares one z value.
        let mut entries = Vec::new();
        for j in 0..30 {
            let lat = (60.0 + j as f64).to_radians();
            for i in 0..360 {
                let lon = (i as f64).to_radians();
                entries.push((rll_to_xyz(lon, lat), entries.len()));
            }
        }
        let index = KdTreeIndex::build(&entries).unwrap();

        assert_eq!(index.len(), entries.len());
        for (point, payload) in &entries {
            assert_eq!(index.nearest(point), vec![*payload]);
        }
    }

    #[test]
    fn test_empty_build_fails() {
        assert!(KdTreeIndex::build(&[]).is_err());
    }

    #[test]
    fn test_non_finite_point_fails() {
        let entries = vec![([f64::NAN, 0.0, 0.0], 0)];
        assert!(matches!(
            KdTreeIndex::build(&entries),
            Err(GridError::Internal(_))
        ));
    }
}
