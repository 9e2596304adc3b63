//! Continuous spectral-element metadata.
//!
//! For a mesh of quadrilaterals and an `n_points` GLL rule, every element
//! carries an `n_points × n_points` tensor of degrees of freedom. Nodes on a
//! shared corner or edge are the same global node, so the metadata maps each
//! local (element, j, i) slot to a global node id and records the local
//! integration weight (Jacobian × quadrature weights) of that slot.
//!
//! Local coordinates (α, β) ∈ [0, 1]² follow the face ordering:
//! - α runs from corner 0 to corner 1 (index `i`)
//! - β runs from corner 0 to corner 3 (index `j`)

use std::collections::HashMap;

use super::unstructured::{EdgeKey, Mesh};
use crate::error::GridError;
use crate::geometry::{cross, dot, norm};
use crate::polynomial::{GaussLobatto, Quadrature};

/// Point on the sphere produced by an element's local map, with the
/// tangent vectors of the map at that point.
#[derive(Clone, Copy, Debug)]
pub struct LocalMapPoint {
    pub point: [f64; 3],
    pub d_alpha: [f64; 3],
    pub d_beta: [f64; 3],
}

impl LocalMapPoint {
    /// Area element |∂n/∂α × ∂n/∂β|.
    pub fn jacobian(&self) -> f64 {
        norm(cross(self.d_alpha, self.d_beta))
    }
}

/// Evaluate the bilinear map of a quadrilateral, projected onto the sphere.
pub fn apply_local_map(corners: &[[f64; 3]; 4], alpha: f64, beta: f64) -> LocalMapPoint {
    let [c0, c1, c2, c3] = *corners;
    let mut p = [0.0; 3];
    let mut dp_da = [0.0; 3];
    let mut dp_db = [0.0; 3];
    for d in 0..3 {
        p[d] = (1.0 - alpha) * (1.0 - beta) * c0[d]
            + alpha * (1.0 - beta) * c1[d]
            + alpha * beta * c2[d]
            + (1.0 - alpha) * beta * c3[d];
        dp_da[d] = (1.0 - beta) * (c1[d] - c0[d]) + beta * (c2[d] - c3[d]);
        dp_db[d] = (1.0 - alpha) * (c3[d] - c0[d]) + alpha * (c2[d] - c1[d]);
    }

    let r = norm(p);
    let n = [p[0] / r, p[1] / r, p[2] / r];

    // d(p/|p|) = (dp - n (n·dp)) / |p|
    let project = |dp: [f64; 3]| {
        let s = dot(n, dp);
        [
            (dp[0] - n[0] * s) / r,
            (dp[1] - n[1] * s) / r,
            (dp[2] - n[2] * s) / r,
        ]
    };

    LocalMapPoint {
        point: n,
        d_alpha: project(dp_da),
        d_beta: project(dp_db),
    }
}

/// Per-element node-index and Jacobian tensors, indexed [element][j][i].
#[derive(Clone, Debug)]
pub struct ElementMetadata {
    n_points: usize,
    n_elements: usize,
    node_ids: Vec<usize>,
    jacobian: Vec<f64>,
    n_unique: usize,
}

impl ElementMetadata {
    /// Assemble metadata from flat [element][j][i] tensors.
    pub fn new(
        n_points: usize,
        n_elements: usize,
        node_ids: Vec<usize>,
        jacobian: Vec<f64>,
    ) -> Result<Self, GridError> {
        let expected = n_elements * n_points * n_points;
        if node_ids.len() != expected || jacobian.len() != expected {
            return Err(GridError::internal(format!(
                "Element metadata size mismatch: expected {} entries, got {} ids and {} weights",
                expected,
                node_ids.len(),
                jacobian.len()
            )));
        }
        let n_unique = node_ids.iter().max().map_or(0, |&m| m + 1);
        Ok(Self {
            n_points,
            n_elements,
            node_ids,
            jacobian,
            n_unique,
        })
    }

    pub fn n_points(&self) -> usize {
        self.n_points
    }

    pub fn n_elements(&self) -> usize {
        self.n_elements
    }

    /// Number of distinct global nodes.
    pub fn n_unique(&self) -> usize {
        self.n_unique
    }

    #[inline]
    fn offset(&self, element: usize, j: usize, i: usize) -> usize {
        (element * self.n_points + j) * self.n_points + i
    }

    #[inline]
    pub fn node_id(&self, element: usize, j: usize, i: usize) -> usize {
        self.node_ids[self.offset(element, j, i)]
    }

    #[inline]
    pub fn jacobian(&self, element: usize, j: usize, i: usize) -> f64 {
        self.jacobian[self.offset(element, j, i)]
    }

    /// Global per-node weight: the sum of local weights over every element
    /// slot that maps to the node.
    pub fn unique_jacobian(&self) -> Vec<f64> {
        let mut area = vec![0.0; self.n_unique];
        for (&id, &w) in self.node_ids.iter().zip(&self.jacobian) {
            area[id] += w;
        }
        area
    }
}

/// Capability interface producing spectral-element metadata for a mesh.
pub trait FiniteElementMetadata {
    fn generate(&self, mesh: &Mesh, n_points: usize) -> Result<ElementMetadata, GridError>;
}

/// Continuous GLL metadata: corner and edge nodes are shared between the
/// elements that meet there.
#[derive(Debug, Clone, Default)]
pub struct GllMetadata<Q = GaussLobatto> {
    quadrature: Q,
}

impl<Q: Quadrature> GllMetadata<Q> {
    pub fn new(quadrature: Q) -> Self {
        Self { quadrature }
    }
}

/// Where a local GLL slot lives on its element.
enum Slot {
    Corner(usize),
    Edge { from: usize, to: usize, t: usize },
    Interior,
}

fn classify(i: usize, j: usize, last: usize) -> Slot {
    match (i, j) {
        (0, 0) => Slot::Corner(0),
        (i, 0) if i == last => Slot::Corner(1),
        (i, j) if i == last && j == last => Slot::Corner(2),
        (0, j) if j == last => Slot::Corner(3),
        (i, 0) => Slot::Edge { from: 0, to: 1, t: i },
        (i, j) if i == last => Slot::Edge { from: 1, to: 2, t: j },
        (i, j) if j == last => Slot::Edge { from: 3, to: 2, t: i },
        (0, j) => Slot::Edge { from: 0, to: 3, t: j },
        _ => Slot::Interior,
    }
}

impl<Q: Quadrature> FiniteElementMetadata for GllMetadata<Q> {
    fn generate(&self, mesh: &Mesh, n_points: usize) -> Result<ElementMetadata, GridError> {
        if n_points < 2 {
            return Err(GridError::precondition(format!(
                "GLL metadata needs at least 2 points per edge ({} requested)",
                n_points
            )));
        }
        let (nodes, weights) = self.quadrature.points(n_points)?;
        if nodes.len() != n_points || weights.len() != n_points {
            return Err(GridError::internal(format!(
                "Quadrature returned {} nodes and {} weights for {} points",
                nodes.len(),
                weights.len(),
                n_points
            )));
        }

        let last = n_points - 1;
        let n_elements = mesh.n_faces();
        let n_slots = n_elements * n_points * n_points;

        let mut node_ids = Vec::with_capacity(n_slots);
        let mut jacobian = Vec::with_capacity(n_slots);

        let mut next_id = 0;
        let mut fresh = || {
            next_id += 1;
            next_id - 1
        };
        let mut corner_ids: HashMap<usize, usize> = HashMap::new();
        let mut edge_ids: HashMap<EdgeKey, Vec<usize>> = HashMap::new();

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
                    let id = match classify(i, j, last) {
                        Slot::Corner(c) => *corner_ids.entry(face[c]).or_insert_with(&mut fresh),
                        Slot::Edge { from, to, t } => {
                            let (a, b) = (face[from], face[to]);
                            let shared = edge_ids
                                .entry(EdgeKey::new(a, b))
                                .or_insert_with(|| (1..last).map(|_| fresh()).collect());
                            // Shared positions are counted from the lower node
                            let pos = if a <= b { t - 1 } else { last - t - 1 };
                            shared[pos]
                        }
                        Slot::Interior => fresh(),
                    };
                    node_ids.push(id);

                    let local = apply_local_map(&corners, nodes[i], nodes[j]);
                    jacobian.push(local.jacobian() * weights[i] * weights[j]);
                }
            }
        }

        ElementMetadata::new(n_points, n_elements, node_ids, jacobian)
    }
}
