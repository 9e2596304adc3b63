//! Continuous finite-element grids: one cell per unique GLL node.

use super::{report_total_area, GridData, NeighborSets, SimpleGrid};
use crate::error::GridError;
use crate::geometry::xyz_to_rll;
use crate::mesh::{apply_local_map, FiniteElementMetadata, GllMetadata, Mesh};
use crate::polynomial::{GaussLobatto, Quadrature};
use crate::spatial::SpatialIndex;

impl<I: SpatialIndex> SimpleGrid<I> {
    /// Populate the grid from the GLL nodes of a quadrilateral mesh.
    ///
    /// Uses the default Gauss-Lobatto rule and continuous GLL metadata.
    /// See [`SimpleGrid::from_mesh_fe_with`].
    pub fn from_mesh_fe(
        &mut self,
        mesh: &Mesh,
        continuous: bool,
        n_points: usize,
    ) -> Result<(), GridError> {
        self.from_mesh_fe_with(
            mesh,
            continuous,
            n_points,
            &GaussLobatto,
            &GllMetadata::new(GaussLobatto),
        )
    }

    /// Populate the grid from the GLL nodes of a quadrilateral mesh with
    /// caller-supplied quadrature and element metadata.
    ///
    /// Cells are the unique global nodes. A node's area is the sum of its
    /// local weights, its center is the element map evaluated at its GLL
    /// coordinates, and its neighbours are the adjacent slots within every
    /// element it belongs to. Dims are `[nUnique]`. Only continuous
    /// discretizations are supported.
    pub fn from_mesh_fe_with<Q, M>(
        &mut self,
        mesh: &Mesh,
        continuous: bool,
        n_points: usize,
        quadrature: &Q,
        metadata: &M,
    ) -> Result<(), GridError>
    where
        Q: Quadrature + ?Sized,
        M: FiniteElementMetadata + ?Sized,
    {
        if !continuous {
            return Err(GridError::unsupported(
                "Discontinuous finite-element grids are not implemented",
            ));
        }
        self.ensure_uninitialized("from_mesh_fe")?;
        if n_points < 2 {
            return Err(GridError::precondition(format!(
                "At least 2 points per element edge needed ({} requested)",
                n_points
            )));
        }

        if mesh.face_areas.is_empty() {
            return Err(GridError::precondition(
                "Mesh::calculate_face_areas() must be called prior to from_mesh_fe()",
            ));
        }
        if mesh.edge_map.is_empty() {
            return Err(GridError::precondition(
                "Mesh::construct_edge_map() must be called prior to from_mesh_fe()",
            ));
        }

        let (gll, _weights) = quadrature.points(n_points)?;
        if gll.len() != n_points {
            return Err(GridError::internal(format!(
                "Quadrature returned {} nodes for {} points",
                gll.len(),
                n_points
            )));
        }

        let meta = metadata.generate(mesh, n_points)?;
        let n_faces = mesh.n_faces();
        if meta.n_elements() != n_faces || meta.n_points() != n_points {
            return Err(GridError::internal(format!(
                "Element metadata covers {} elements of {} points (expected {} of {})",
                meta.n_elements(),
                meta.n_points(),
                n_faces,
                n_points
            )));
        }

        let area = meta.unique_jacobian();
        let n_unique = area.len();
        let last = n_points - 1;

        let mut lon = vec![0.0; n_unique];
        let mut lat = vec![0.0; n_unique];
        let mut neighbors = NeighborSets::new(n_unique);

        for (k, face) in mesh.faces.iter().enumerate() {
            if face.len() != 4 {
                return Err(GridError::precondition(format!(
                    "Mesh must only contain quadrilateral elements (face {} has {} nodes)",
                    k,
                    face.len()
                )));
            }
            let mut corners = [[0.0; 3]; 4];
            for (c, &v) in face.iter().enumerate() {
                corners[c] = *mesh.nodes.get(v).ok_or_else(|| {
                    GridError::precondition(format!(
                        "Face {} references node {} out of range",
                        k, v
                    ))
                })?;
            }

            for j in 0..n_points {
                for i in 0..n_points {
                    let id = meta.node_id(k, j, i);
                    if id >= n_unique {
                        return Err(GridError::internal(format!(
                            "Element {} slot ({}, {}) has node id {} beyond {} unique nodes",
                            k, j, i, id, n_unique
                        )));
                    }

                    let (lo, la) = xyz_to_rll(apply_local_map(&corners, gll[i], gll[j]).point);
                    lon[id] = lo;
                    lat[id] = la;

                    if i > 0 {
                        neighbors.insert(id, meta.node_id(k, j, i - 1));
                    }
                    if i < last {
                        neighbors.insert(id, meta.node_id(k, j, i + 1));
                    }
                    if j > 0 {
                        neighbors.insert(id, meta.node_id(k, j - 1, i));
                    }
                    if j < last {
                        neighbors.insert(id, meta.node_id(k, j + 1, i));
                    }
                }
            }
        }

        report_total_area(&area);

        self.commit(GridData {
            dims: vec![n_unique],
            lon,
            lat,
            area: Some(area),
            connectivity: neighbors.into_connectivity(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::SimpleGrid;
    use crate::mesh::ElementMetadata;
    use std::f64::consts::PI;

    fn prepared(mut mesh: Mesh) -> Mesh {
        mesh.calculate_face_areas().unwrap();
        mesh.construct_edge_map().unwrap();
        mesh
    }

    /// Metadata that claims the wrong element count.
    struct ShortMetadata;

    impl FiniteElementMetadata for ShortMetadata {
        fn generate(&self, _mesh: &Mesh, n_points: usize) -> Result<ElementMetadata, GridError> {
            let n = n_points * n_points;
            ElementMetadata::new(n_points, 1, (0..n).collect(), vec![1.0; n])
        }
    }

    #[test]
    fn test_cubed_sphere_gll_nodes() {
        let mesh = prepared(Mesh::cubed_sphere(2));
        let mut grid = SimpleGrid::new();
        grid.from_mesh_fe(&mesh, true, 4).unwrap();

        // 6 (n (nP - 1))^2 + 2 unique nodes
        let expected = 6 * 6 * 6 + 2;
        assert_eq!(grid.dims(), &[expected]);
        assert_eq!(grid.len(), expected);

        let total = grid.total_area().unwrap();
        assert!((total - 4.0 * PI).abs() < 0.01 * 4.0 * PI, "total {}", total);
        assert!(grid.area().unwrap().iter().all(|&a| a > 0.0));
    }

    #[test]
    fn test_gll_connectivity() {
        let mesh = prepared(Mesh::cubed_sphere(1));
        let mut grid = SimpleGrid::new();
        grid.from_mesh_fe(&mesh, true, 3).unwrap();

        // Cube with one element per panel: 8 corners, 12 edge midpoints, 6 centers
        assert_eq!(grid.len(), 26);

        let conn = grid.connectivity();
        let mut by_degree = [0; 5];
        for (cell, nbrs) in conn.iter().enumerate() {
            assert!(nbrs.windows(2).all(|w| w[0] < w[1]));
            assert!(!nbrs.contains(&cell));
            for &n in nbrs {
                assert!(conn[n].contains(&cell), "{} -> {} not symmetric", cell, n);
            }
            by_degree[nbrs.len()] += 1;
        }
        // Corners touch 3 edge nodes, edge nodes 2 corners + 2 centers,
        // centers their 4 edge nodes
        assert_eq!(by_degree[3], 8);
        assert_eq!(by_degree[4], 18);
    }

    #[test]
    fn test_gll_centers_on_sphere() {
        let mesh = prepared(Mesh::cubed_sphere(1));
        let mut grid = SimpleGrid::new();
        grid.from_mesh_fe(&mesh, true, 3).unwrap();

        // Corners of the cube sit at latitude ±asin(1/sqrt 3)
        let corner_lat = (1.0 / 3f64.sqrt()).asin();
        let corners = grid
            .lat()
            .iter()
            .filter(|lat| (lat.abs() - corner_lat).abs() < 1e-12)
            .count();
        assert_eq!(corners, 8);
    }

    #[test]
    fn test_discontinuous_unsupported() {
        let mesh = prepared(Mesh::cubed_sphere(1));
        let mut grid = SimpleGrid::new();
        let err = grid.from_mesh_fe(&mesh, false, 4).unwrap_err();
        assert!(matches!(err, GridError::Unsupported(_)));
        assert!(!grid.is_initialized());
    }

    #[test]
    fn test_requires_prepared_mesh() {
        let mut grid = SimpleGrid::new();
        let err = grid.from_mesh_fe(&Mesh::cubed_sphere(1), true, 4).unwrap_err();
        assert!(matches!(err, GridError::Precondition(_)));
        assert!(err.to_string().contains("calculate_face_areas"));
    }

    #[test]
    fn test_rejects_too_few_points() {
        let mesh = prepared(Mesh::cubed_sphere(1));
        let mut grid = SimpleGrid::new();
        assert!(grid.from_mesh_fe(&mesh, true, 1).is_err());
        assert!(!grid.is_initialized());
    }

    /// Evenly spaced nodes for any count, including degenerate ones.
    struct EvenNodes;

    impl Quadrature for EvenNodes {
        fn points(&self, n_points: usize) -> Result<(Vec<f64>, Vec<f64>), GridError> {
            let step = 1.0 / n_points.max(2).saturating_sub(1) as f64;
            let nodes = (0..n_points).map(|k| k as f64 * step).collect();
            Ok((nodes, vec![1.0 / n_points.max(1) as f64; n_points]))
        }
    }

    #[test]
    fn test_permissive_quadrature_still_needs_two_points() {
        let mesh = prepared(Mesh::cubed_sphere(1));
        for n_points in [0, 1] {
            let mut grid = SimpleGrid::new();
            let metadata = GllMetadata::new(EvenNodes);
            let err = grid
                .from_mesh_fe_with(&mesh, true, n_points, &EvenNodes, &metadata)
                .unwrap_err();
            assert!(matches!(err, GridError::Precondition(_)), "{} points", n_points);
            assert!(!grid.is_initialized());
        }
    }

    #[test]
    fn test_metadata_mismatch_is_internal() {
        let mesh = prepared(Mesh::cubed_sphere(1));
        let mut grid = SimpleGrid::new();
        let err = grid
            .from_mesh_fe_with(&mesh, true, 3, &GaussLobatto, &ShortMetadata)
            .unwrap_err();
        assert!(matches!(err, GridError::Internal(_)));
    }
}
