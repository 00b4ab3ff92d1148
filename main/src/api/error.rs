//! Error types for tensor operations

use thiserror::Error;

/// Result type for tensor operations
pub type TensorResult<T> = Result<T, TensorError>;

/// Errors that can occur in tensor operations.
///
/// The set is closed: every fallible operation in the crate reports one of
/// these variants and never panics on bad shapes or indices.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TensorError {
    #[error("Invalid rank {rank}: expected at most {max}")]
    InvalidRank { rank: i64, max: usize },

    #[error("Invalid dimension size {size} at axis {axis}")]
    InvalidDimensionSize { axis: usize, size: i64 },

    #[error("Null input: {0}")]
    NullInput(String),

    #[error("Failed to allocate {numel} elements")]
    AllocationFailure { numel: usize },

    #[error("Shapes {shape1:?} and {shape2:?} cannot be broadcast together")]
    IncompatibleBroadcastShapes {
        shape1: Vec<usize>,
        shape2: Vec<usize>,
    },

    #[error("Matmul operands must have at least one dimension")]
    MatmulSingletonOperand,

    #[error("Matmul contraction mismatch: {left:?} @ {right:?}")]
    MatmulIncompatibleShapes { left: Vec<usize>, right: Vec<usize> },

    #[error("Axis {axis} given more than once")]
    DuplicateAxis { axis: usize },

    #[error("Invalid axis {axis} for tensor with {ndim} dimensions")]
    InvalidAxis { axis: i64, ndim: usize },

    #[error("Cannot reshape {from:?} into {to:?}: element counts differ")]
    ReshapeNumelMismatch { from: Vec<usize>, to: Vec<usize> },

    #[error("Only single-element tensors convert to a scalar, got {numel} elements")]
    NotScalar { numel: usize },

    #[error("Index {index} out of bounds for axis {dim} with size {size}")]
    IndexOutOfBounds { dim: usize, index: i64, size: usize },

    #[error("Invalid slice {start}:{stop}:{step} for axis {dim} with size {size}")]
    InvalidSliceParameter {
        dim: usize,
        start: i64,
        stop: i64,
        step: i64,
        size: usize,
    },

    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch { expected: Vec<usize>, got: Vec<usize> },

    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

impl TensorError {
    /// Stable integer code for callers that branch on a status value.
    ///
    /// `0` is reserved for success and never returned here.
    pub fn status_code(&self) -> i32 {
        match self {
            TensorError::InvalidRank { .. } => 1,
            TensorError::InvalidDimensionSize { .. } => 2,
            TensorError::NullInput(_) => 3,
            TensorError::AllocationFailure { .. } => 4,
            TensorError::IncompatibleBroadcastShapes { .. } => 5,
            TensorError::MatmulSingletonOperand => 6,
            TensorError::MatmulIncompatibleShapes { .. } => 7,
            TensorError::DuplicateAxis { .. } => 8,
            TensorError::InvalidAxis { .. } => 9,
            TensorError::ReshapeNumelMismatch { .. } => 10,
            TensorError::NotScalar { .. } => 11,
            TensorError::IndexOutOfBounds { .. } => 12,
            TensorError::InvalidSliceParameter { .. } => 13,
            TensorError::ShapeMismatch { .. } => 14,
            TensorError::NotImplemented(_) => 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_are_distinct() {
        let errors = vec![
            TensorError::InvalidRank { rank: 9, max: 8 },
            TensorError::InvalidDimensionSize { axis: 0, size: -1 },
            TensorError::NullInput("released".into()),
            TensorError::AllocationFailure { numel: 1 },
            TensorError::IncompatibleBroadcastShapes { shape1: vec![2], shape2: vec![3] },
            TensorError::MatmulSingletonOperand,
            TensorError::MatmulIncompatibleShapes { left: vec![2, 3], right: vec![4, 5] },
            TensorError::DuplicateAxis { axis: 0 },
            TensorError::InvalidAxis { axis: 3, ndim: 2 },
            TensorError::ReshapeNumelMismatch { from: vec![2, 3], to: vec![4] },
            TensorError::NotScalar { numel: 4 },
            TensorError::IndexOutOfBounds { dim: 0, index: 5, size: 3 },
            TensorError::InvalidSliceParameter { dim: 0, start: 0, stop: 3, step: 0, size: 3 },
            TensorError::ShapeMismatch { expected: vec![2], got: vec![3] },
            TensorError::NotImplemented("view".into()),
        ];
        let mut codes: Vec<i32> = errors.iter().map(|e| e.status_code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(!codes.contains(&0));
    }

    #[test]
    fn test_error_messages() {
        let err = TensorError::IncompatibleBroadcastShapes { shape1: vec![2, 3], shape2: vec![4] };
        assert_eq!(err.to_string(), "Shapes [2, 3] and [4] cannot be broadcast together");

        let err = TensorError::NotScalar { numel: 6 };
        assert!(err.to_string().contains("6 elements"));
    }
}
