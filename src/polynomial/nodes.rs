//! Gauss-Lobatto-Legendre nodes and weights.
//!
//! The GLL points of a rule with `n` points are the endpoints ±1 plus the
//! roots of P'_{n-1}. They serve both as quadrature points and as the
//! degree-of-freedom locations of a continuous spectral element, so the
//! endpoints of neighbouring elements coincide.

use std::f64::consts::PI;

use super::legendre::{legendre, legendre_and_derivative};
use crate::error::GridError;

/// Capability interface for a 1D quadrature rule on [0, 1].
pub trait Quadrature {
    /// Return `n_points` nodes (ascending) and weights on [0, 1].
    fn points(&self, n_points: usize) -> Result<(Vec<f64>, Vec<f64>), GridError>;
}

/// Gauss-Lobatto-Legendre rule computed by Newton iteration.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussLobatto;

impl Quadrature for GaussLobatto {
    fn points(&self, n_points: usize) -> Result<(Vec<f64>, Vec<f64>), GridError> {
        if n_points < 2 {
            return Err(GridError::precondition(format!(
                "Gauss-Lobatto quadrature needs at least 2 points ({} requested)",
                n_points
            )));
        }

        let order = n_points - 1;
        let nodes = gauss_lobatto_nodes(order);
        let weights = gauss_lobatto_weights(order, &nodes);

        // Map from [-1, 1] to [0, 1]
        let unit_nodes = nodes.iter().map(|&x| 0.5 * (x + 1.0)).collect();
        let unit_weights = weights.iter().map(|&w| 0.5 * w).collect();

        Ok((unit_nodes, unit_weights))
    }
}

/// Compute the `order + 1` GLL nodes in [-1, 1], endpoints included.
///
/// Interior nodes start from Chebyshev-Lobatto points and are refined with
/// the Newton update x ← x + (1-x²) P'_N / (N(N+1) P_N), which follows from
/// d/dx[(1-x²) P'_N] = -N(N+1) P_N.
pub fn gauss_lobatto_nodes(order: usize) -> Vec<f64> {
    let n = order;
    if n == 0 {
        return vec![0.0];
    }

    let mut nodes: Vec<f64> = (0..=n).map(|j| -(PI * j as f64 / n as f64).cos()).collect();
    nodes[0] = -1.0;
    nodes[n] = 1.0;

    let scale = (n * (n + 1)) as f64;
    for node in nodes.iter_mut().take(n).skip(1) {
        let mut x = *node;
        for _ in 0..100 {
            let (p_n, dp_n) = legendre_and_derivative(n, x);
            let update = (1.0 - x * x) * dp_n / (scale * p_n);
            x += update;
            if update.abs() < 1e-15 {
                break;
            }
        }
        *node = x;
    }

    nodes
}

/// GLL weights on [-1, 1]: w_j = 2 / (N(N+1) P_N(x_j)²).
pub fn gauss_lobatto_weights(order: usize, nodes: &[f64]) -> Vec<f64> {
    if order == 0 {
        return vec![2.0];
    }

    let denom = (order * (order + 1)) as f64;
    nodes
        .iter()
        .map(|&x| {
            let p_n = legendre(order, x);
            2.0 / (denom * p_n * p_n)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodes_symmetric_with_endpoints() {
        for order in 1..=6 {
            let nodes = gauss_lobatto_nodes(order);
            assert_eq!(nodes.len(), order + 1);
            assert!((nodes[0] + 1.0).abs() < 1e-14);
            assert!((nodes[order] - 1.0).abs() < 1e-14);
            for i in 0..nodes.len() / 2 {
                assert!((nodes[i] + nodes[order - i]).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn test_interior_nodes_are_derivative_roots() {
        for order in 2..=6 {
            let nodes = gauss_lobatto_nodes(order);
            for &x in &nodes[1..order] {
                let (_, dp) = legendre_and_derivative(order, x);
                assert!(dp.abs() < 1e-12, "P'_{}({}) = {}", order, x, dp);
            }
        }
    }

    #[test]
    fn test_known_three_point_rule() {
        let nodes = gauss_lobatto_nodes(2);
        let weights = gauss_lobatto_weights(2, &nodes);
        assert!(nodes[1].abs() < 1e-14);
        assert!((weights[0] - 1.0 / 3.0).abs() < 1e-14);
        assert!((weights[1] - 4.0 / 3.0).abs() < 1e-14);
        assert!((weights[2] - 1.0 / 3.0).abs() < 1e-14);
    }

    #[test]
    fn test_unit_interval_rule() {
        for n_points in 2..=8 {
            let (nodes, weights) = GaussLobatto.points(n_points).unwrap();
            assert_eq!(nodes.len(), n_points);
            assert!(nodes[0].abs() < 1e-14);
            assert!((nodes[n_points - 1] - 1.0).abs() < 1e-14);

            let sum: f64 = weights.iter().sum();
            assert!((sum - 1.0).abs() < 1e-14, "weights sum to {}", sum);
        }
    }

    #[test]
    fn test_unit_interval_exactness() {
        // n points integrate polynomials up to degree 2n-3 exactly
        for n_points in 2..=6 {
            let (nodes, weights) = GaussLobatto.points(n_points).unwrap();
            for k in 0..=(2 * n_points - 3) {
                let numerical: f64 = nodes
                    .iter()
                    .zip(&weights)
                    .map(|(&x, &w)| w * x.powi(k as i32))
                    .sum();
                let exact = 1.0 / (k + 1) as f64;
                assert!(
                    (numerical - exact).abs() < 1e-12,
                    "n={} k={}: {} vs {}",
                    n_points,
                    k,
                    numerical,
                    exact
                );
            }
        }
    }

    #[test]
    fn test_rejects_single_point() {
        assert!(matches!(
            GaussLobatto.points(1),
            Err(GridError::Precondition(_))
        ));
    }
}
