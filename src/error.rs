//! Error type shared by every grid operation.
//!
//! Each variant corresponds to one class of contract violation. Nothing is
//! retried or recovered internally: the failing call returns the error and
//! the grid keeps whatever state it had before the call.

use thiserror::Error;

/// Errors produced by grid generation, serialization and lookup.
#[derive(Debug, Error)]
pub enum GridError {
    /// File could not be opened, read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// NetCDF library error.
    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),

    /// Caller violated a precondition (re-initialization, missing
    /// collaborator data, out-of-range coordinates, arity mismatch).
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// Malformed or truncated connectivity file.
    #[error("Invalid connectivity file: {0}")]
    Format(String),

    /// Input geometry cannot produce a valid grid.
    #[error("Invalid geometry: {0}")]
    Geometry(String),

    /// Requested operation is not implemented for this kind of grid.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Internal data structures disagree with each other.
    #[error("Internal invariant violated: {0}")]
    Internal(String),
}

impl GridError {
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Error returned when a generator is invoked on a populated grid.
    pub(crate) fn already_initialized(operation: &str) -> Self {
        Self::Precondition(format!(
            "Attempting to call {}() on previously initialized grid",
            operation
        ))
    }
}
