//! Error taxonomy for the diffusion pipeline.
//!
//! Three families: shape errors (malformed input, caught before any numeric
//! work), configuration errors (parameters outside their domain), and
//! numerical errors (singular systems, non-finite values, degenerate
//! degrees).  Nothing here is retried or silently clamped; the zero-column
//! fallback in the renormalizer is the only locally handled condition and
//! never reaches this type.

use thiserror::Error;

use crate::graph::NodeID;

/// Which family a [`DiffusionError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Shape,
    Configuration,
    Numerical,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiffusionError {
    #[error("adjacency matrix must be square, got {rows}x{cols}")]
    NonSquare { rows: usize, cols: usize },

    #[error("node {node} out of range for a graph of {nodes} nodes")]
    NodeOutOfRange { node: NodeID, nodes: usize },

    #[error("alpha must lie in (0, 1], got {0}")]
    InvalidAlpha(f64),

    #[error("diffusion time t must be finite and non-negative, got {0}")]
    InvalidDiffusionTime(f64),

    #[error("series order {order} cannot bound the truncation error for t = {t}; use order > t")]
    SeriesOrderTooSmall { order: usize, t: f64 },

    #[error("sparsification threshold must lie in [0, 1), got {0}")]
    InvalidThreshold(f64),

    #[error("top-k sparsification requires k >= 1")]
    InvalidTopK,

    #[error("the eigendecomposition heat kernel requires a symmetric transition operator")]
    EigenNeedsSymmetric,

    #[error("node {node} has non-positive degree {degree} after self-loop augmentation")]
    NonPositiveDegree { node: NodeID, degree: f64 },

    #[error("diffusion system is singular for alpha = {alpha}")]
    SingularSystem { alpha: f64 },

    #[error("diffusion produced a non-finite value at ({row}, {col})")]
    NonFinite { row: usize, col: usize },
}

impl DiffusionError {
    /// The taxonomy family this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        use DiffusionError::*;
        match self {
            NonSquare { .. } | NodeOutOfRange { .. } => ErrorKind::Shape,
            InvalidAlpha(_)
            | InvalidDiffusionTime(_)
            | SeriesOrderTooSmall { .. }
            | InvalidThreshold(_)
            | InvalidTopK
            | EigenNeedsSymmetric => ErrorKind::Configuration,
            NonPositiveDegree { .. } | SingularSystem { .. } | NonFinite { .. } => {
                ErrorKind::Numerical
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            DiffusionError::NonSquare { rows: 3, cols: 4 }.kind(),
            ErrorKind::Shape
        );
        assert_eq!(DiffusionError::InvalidAlpha(0.0).kind(), ErrorKind::Configuration);
        assert_eq!(
            DiffusionError::SingularSystem { alpha: 0.5 }.kind(),
            ErrorKind::Numerical
        );
    }

    #[test]
    fn test_messages_carry_parameters() {
        let err = DiffusionError::SeriesOrderTooSmall { order: 3, t: 5.0 };
        assert_eq!(
            err.to_string(),
            "series order 3 cannot bound the truncation error for t = 5; use order > t"
        );
    }
}
