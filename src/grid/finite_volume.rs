//! Finite-volume grids: one cell per mesh face.

use super::{report_total_area, GridData, NeighborSets, SimpleGrid};
use crate::error::GridError;
use crate::geometry::{norm, normalize_longitude, xyz_to_rll};
use crate::mesh::{Mesh, MeshKind};
use crate::spatial::SpatialIndex;

impl<I: SpatialIndex> SimpleGrid<I> {
    /// Populate the grid from the faces of a mesh.
    ///
    /// The mesh must already carry face areas and an edge map. Cell `k` is
    /// face `k`; its neighbours are the faces sharing an edge with it, in
    /// ascending order. Dims are `[nFaces]`.
    pub fn from_mesh_fv(&mut self, mesh: &Mesh) -> Result<(), GridError> {
        self.ensure_uninitialized("from_mesh_fv")?;

        if mesh.face_areas.is_empty() {
            return Err(GridError::precondition(
                "Mesh::calculate_face_areas() must be called prior to from_mesh_fv()",
            ));
        }
        if mesh.edge_map.is_empty() {
            return Err(GridError::precondition(
                "Mesh::construct_edge_map() must be called prior to from_mesh_fv()",
            ));
        }

        let n_faces = mesh.n_faces();
        if mesh.face_areas.len() != n_faces {
            return Err(GridError::precondition(format!(
                "Mesh has {} faces but {} face areas",
                n_faces,
                mesh.face_areas.len()
            )));
        }

        let mut neighbors = NeighborSets::new(n_faces);
        for (edge, pair) in &mesh.edge_map {
            let out_of_range = pair.first >= n_faces || pair.second.is_some_and(|f| f >= n_faces);
            if out_of_range {
                return Err(GridError::precondition(format!(
                    "EdgeMap FacePair for edge ({}, {}) references a face out of range ({} faces)",
                    edge.0, edge.1, n_faces
                )));
            }
            if let Some(second) = pair.second {
                neighbors.link(pair.first, second);
            }
        }

        let mut lon = Vec::with_capacity(n_faces);
        let mut lat = Vec::with_capacity(n_faces);
        for k in 0..n_faces {
            let (lo, la) = match mesh.kind {
                MeshKind::RegularLatLon => lat_lon_face_center(mesh, k)?,
                MeshKind::Unstructured => centroid_face_center(mesh, k)?,
            };
            lon.push(lo);
            lat.push(la);
        }

        let area = mesh.face_areas.clone();
        report_total_area(&area);

        self.commit(GridData {
            dims: vec![n_faces],
            lon,
            lat,
            area: Some(area),
            connectivity: neighbors.into_connectivity(),
        })
    }
}

fn face_node(mesh: &Mesh, face: usize, node: usize) -> Result<[f64; 3], GridError> {
    mesh.nodes.get(node).copied().ok_or_else(|| {
        GridError::precondition(format!(
            "Face {} references node {} out of range ({} nodes)",
            face,
            node,
            mesh.n_nodes()
        ))
    })
}

/// Center of a regular lat-lon quadrilateral: the mean node longitude and
/// latitude, with longitudes unwrapped against the running mean.
fn lat_lon_face_center(mesh: &Mesh, k: usize) -> Result<(f64, f64), GridError> {
    let face = &mesh.faces[k];
    if face.len() != 4 {
        return Err(GridError::precondition(format!(
            "Regular lat-lon mesh face {} has {} nodes (expected 4)",
            k,
            face.len()
        )));
    }

    let mut lon_sum = 0.0;
    let mut lat_sum = 0.0;
    for (m, &node) in face.iter().enumerate() {
        let (lon_rad, lat_rad) = xyz_to_rll(face_node(mesh, k, node)?);
        let mut lon_deg = lon_rad.to_degrees();

        if m > 0 {
            let mean = lon_sum / m as f64;
            if (lon_deg - mean).abs() > 180.0 {
                lon_deg += if mean > lon_deg { 360.0 } else { -360.0 };
            }
            if (lon_deg - mean).abs() > 180.0 {
                return Err(GridError::geometry(format!(
                    "Face {} spans more than 180 degrees of longitude \
                     (node {} at {} degrees, running mean {} degrees)",
                    k, node, lon_deg, mean
                )));
            }
        }

        lon_sum += lon_deg;
        lat_sum += lat_rad.to_degrees();
    }

    Ok((
        normalize_longitude((0.25 * lon_sum).to_radians()),
        (0.25 * lat_sum).to_radians(),
    ))
}

/// Center of a general face: the Cartesian node mean projected onto the
/// sphere.
fn centroid_face_center(mesh: &Mesh, k: usize) -> Result<(f64, f64), GridError> {
    let face = &mesh.faces[k];
    let mut sum = [0.0; 3];
    for &node in face {
        let p = face_node(mesh, k, node)?;
        sum[0] += p[0];
        sum[1] += p[1];
        sum[2] += p[2];
    }

    if norm(sum) < 1.0e-14 {
        return Err(GridError::geometry(format!(
            "Face {} has a degenerate centroid",
            k
        )));
    }
    Ok(xyz_to_rll(sum))
}
