//! Error types for tenrand

use crate::dtype::DType;
use thiserror::Error;

/// Result type alias using tenrand's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tenrand operations
#[derive(Error, Debug)]
pub enum Error {
    /// Shape mismatch in an operation
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Shapes cannot be broadcast together
    #[error("Cannot broadcast shape {from:?} to {to:?}")]
    BroadcastError {
        /// Source shape
        from: Vec<usize>,
        /// Target shape
        to: Vec<usize>,
    },

    /// Unsupported dtype for an operation
    ///
    /// Raised before any generator state is consumed; the output tensor is
    /// left untouched.
    #[error("Unsupported dtype {dtype:?} for operation '{op}'")]
    UnsupportedDType {
        /// The unsupported dtype
        dtype: DType,
        /// The operation name
        op: &'static str,
    },

    /// Out of memory
    #[error("Out of memory: failed to allocate {size} bytes")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
    },
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create a broadcast error
    pub fn broadcast(from: &[usize], to: &[usize]) -> Self {
        Self::BroadcastError {
            from: from.to_vec(),
            to: to.to_vec(),
        }
    }

    /// Create an unsupported dtype error
    pub fn unsupported_dtype(dtype: DType, op: &'static str) -> Self {
        Self::UnsupportedDType { dtype, op }
    }
}
