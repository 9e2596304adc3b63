//! Unstructured mesh on the unit sphere.
//!
//! The mesh stores:
//! - Node coordinates (Cartesian, on or near the unit sphere)
//! - Face-node connectivity (counter-clockwise seen from outside)
//! - Per-face spherical areas (filled by [`Mesh::calculate_face_areas`])
//! - Edge-to-face adjacency (filled by [`Mesh::construct_edge_map`])
//!
//! Grids are derived from a mesh only after both derived tables are present.

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::error::GridError;
use crate::geometry::{normalize, rll_to_xyz, spherical_triangle_area};

/// Undirected edge between two mesh nodes, stored with the lower index first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey(pub usize, pub usize);

impl EdgeKey {
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}

/// Faces adjacent to an edge. Boundary edges have no second face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FacePair {
    pub first: usize,
    pub second: Option<usize>,
}

impl FacePair {
    pub fn is_boundary(&self) -> bool {
        self.second.is_none()
    }
}

/// Selects how cell centers are derived from a mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MeshKind {
    /// General mesh; centers come from the Cartesian centroid.
    #[default]
    Unstructured,
    /// Regular latitude-longitude quadrilaterals; centers average node
    /// longitudes and latitudes directly.
    RegularLatLon,
}

/// Polygonal mesh on the unit sphere.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    /// Node coordinates: nodes[i] = [x, y, z]
    pub nodes: Vec<[f64; 3]>,

    /// Face-node connectivity: faces[k] = ordered node indices
    pub faces: Vec<Vec<usize>>,

    /// Spherical area of each face (empty until computed)
    pub face_areas: Vec<f64>,

    /// Edge to adjacent-face map (empty until constructed)
    pub edge_map: BTreeMap<EdgeKey, FacePair>,

    pub kind: MeshKind,
}

impl Mesh {
    /// Create a mesh from nodes and faces. Derived tables start empty.
    pub fn new(nodes: Vec<[f64; 3]>, faces: Vec<Vec<usize>>, kind: MeshKind) -> Self {
        Self {
            nodes,
            faces,
            face_areas: Vec::new(),
            edge_map: BTreeMap::new(),
            kind,
        }
    }

    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Build the edge map from face connectivity.
    ///
    /// Fails if a face references a missing node or an edge is shared by
    /// more than two faces.
    pub fn construct_edge_map(&mut self) -> Result<(), GridError> {
        let mut edge_faces: BTreeMap<EdgeKey, Vec<usize>> = BTreeMap::new();

        for (k, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(GridError::precondition(format!(
                    "Face {} has only {} nodes",
                    k,
                    face.len()
                )));
            }
            for (f, &v0) in face.iter().enumerate() {
                let v1 = face[(f + 1) % face.len()];
                if v0 >= self.nodes.len() || v1 >= self.nodes.len() {
                    return Err(GridError::precondition(format!(
                        "Face {} references node out of range ({} nodes)",
                        k,
                        self.nodes.len()
                    )));
                }
                let faces = edge_faces.entry(EdgeKey::new(v0, v1)).or_default();
                if !faces.contains(&k) {
                    faces.push(k);
                }
            }
        }

        let mut edge_map = BTreeMap::new();
        for (key, faces) in edge_faces {
            if faces.len() > 2 {
                return Err(GridError::precondition(format!(
                    "Edge ({}, {}) is shared by {} faces",
                    key.0,
                    key.1,
                    faces.len()
                )));
            }
            edge_map.insert(
                key,
                FacePair {
                    first: faces[0],
                    second: faces.get(1).copied(),
                },
            );
        }

        self.edge_map = edge_map;
        Ok(())
    }

    /// Compute the spherical area of every face by fan triangulation.
    pub fn calculate_face_areas(&mut self) -> Result<(), GridError> {
        let mut areas = Vec::with_capacity(self.faces.len());
        for (k, face) in self.faces.iter().enumerate() {
            let mut corners = Vec::with_capacity(face.len());
            for &v in face {
                let node = self.nodes.get(v).ok_or_else(|| {
                    GridError::precondition(format!(
                        "Face {} references node {} out of range",
                        k, v
                    ))
                })?;
                corners.push(normalize(*node));
            }

            let area: f64 = (1..corners.len().saturating_sub(1))
                .map(|t| spherical_triangle_area(corners[0], corners[t], corners[t + 1]))
                .sum();
            areas.push(area);
        }

        self.face_areas = areas;
        Ok(())
    }

    /// Gnomonic cubed sphere: each cube face is split into
    /// `resolution × resolution` quadrilaterals and nodes are projected
    /// radially onto the sphere.
    pub fn cubed_sphere(resolution: usize) -> Self {
        let n = resolution.max(1) as i64;

        // (origin, u, v) in lattice units; u × v points outward
        let panels: [([i64; 3], [i64; 3], [i64; 3]); 6] = [
            ([n, 0, 0], [0, 1, 0], [0, 0, 1]),
            ([0, 0, 0], [0, 0, 1], [0, 1, 0]),
            ([0, n, 0], [0, 0, 1], [1, 0, 0]),
            ([0, 0, 0], [1, 0, 0], [0, 0, 1]),
            ([0, 0, n], [1, 0, 0], [0, 1, 0]),
            ([0, 0, 0], [0, 1, 0], [1, 0, 0]),
        ];

        let mut nodes = Vec::new();
        let mut lattice_index: HashMap<[i64; 3], usize> = HashMap::new();
        let mut faces = Vec::with_capacity(6 * (n * n) as usize);

        let mut node_at = |p: [i64; 3], nodes: &mut Vec<[f64; 3]>| -> usize {
            *lattice_index.entry(p).or_insert_with(|| {
                let scale = 2.0 / n as f64;
                nodes.push(normalize([
                    p[0] as f64 * scale - 1.0,
                    p[1] as f64 * scale - 1.0,
                    p[2] as f64 * scale - 1.0,
                ]));
                nodes.len() - 1
            })
        };

        for (origin, u, v) in panels {
            let lattice = |a: i64, b: i64| {
                [
                    origin[0] + a * u[0] + b * v[0],
                    origin[1] + a * u[1] + b * v[1],
                    origin[2] + a * u[2] + b * v[2],
                ]
            };
            for b in 0..n {
                for a in 0..n {
                    let face = vec![
                        node_at(lattice(a, b), &mut nodes),
                        node_at(lattice(a + 1, b), &mut nodes),
                        node_at(lattice(a + 1, b + 1), &mut nodes),
                        node_at(lattice(a, b + 1), &mut nodes),
                    ];
                    faces.push(face);
                }
            }
        }

        Self::new(nodes, faces, MeshKind::Unstructured)
    }

    /// Global regular latitude-longitude mesh of `n_lat × n_lon` quadrilaterals.
    ///
    /// Each longitude column keeps its own node at the poles, so polar faces
    /// have one degenerate edge.
    pub fn regular_lat_lon(n_lat: usize, n_lon: usize) -> Self {
        let n_lat = n_lat.max(1);
        let n_lon = n_lon.max(3);
        let d_lat = PI / n_lat as f64;
        let d_lon = TAU / n_lon as f64;

        let mut nodes = Vec::with_capacity((n_lat + 1) * n_lon);
        for j in 0..=n_lat {
            let lat = -FRAC_PI_2 + j as f64 * d_lat;
            for i in 0..n_lon {
                nodes.push(rll_to_xyz(i as f64 * d_lon, lat));
            }
        }

        let node = |j: usize, i: usize| j * n_lon + (i % n_lon);
        let mut faces = Vec::with_capacity(n_lat * n_lon);
        for j in 0..n_lat {
            for i in 0..n_lon {
                faces.push(vec![
                    node(j, i),
                    node(j, i + 1),
                    node(j + 1, i + 1),
                    node(j + 1, i),
                ]);
            }
        }

        Self::new(nodes, faces, MeshKind::RegularLatLon)
    }
}
