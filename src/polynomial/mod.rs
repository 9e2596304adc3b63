//! Polynomial evaluation and quadrature.
//!
//! This module provides:
//! - 1D Legendre polynomials and their derivatives
//! - Gauss-Lobatto-Legendre (GLL) nodes and weights
//! - The [`Quadrature`] capability used by the finite-element importer

mod legendre;
mod nodes;

pub use legendre::{legendre, legendre_and_derivative};
pub use nodes::{gauss_lobatto_nodes, gauss_lobatto_weights, GaussLobatto, Quadrature};
