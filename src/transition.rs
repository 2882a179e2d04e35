//! Self-loop augmentation and degree normalization of the adjacency matrix.
//!
//! Every diffusion kernel runs over `T`, derived from the adjacency `A` by
//! adding the identity and normalizing by the augmented degrees: either the
//! symmetric form `D^{-1/2} (A + I) D^{-1/2}` or the column-stochastic form
//! `(A + I) D^{-1}`.  The self-loops guarantee strictly positive degrees on
//! any graph with non-negative weights, so isolated nodes survive.

use nalgebra_sparse::csr::CsrMatrix;

use crate::errors::DiffusionError;
use crate::graph::Adjacency;

/// How the augmented adjacency is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionKind {
    /// `D^{-1/2} (A + I) D^{-1/2}`, with `D` the row sums of `A + I`.
    /// Symmetric whenever `A` is.
    Symmetric,
    /// `(A + I) D^{-1}`, with `D` the column sums of `A + I`.  Every column
    /// sums to 1.
    ColumnStochastic,
}

/// Degree-normalized, self-loop-augmented transition operator.  Carries its
/// kind so kernels can check preconditions.
#[derive(Debug, Clone)]
pub struct Transition {
    pub(crate) kind: TransitionKind,
    pub(crate) matrix: CsrMatrix<f64>,
}

impl Transition {
    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    pub fn csr(&self) -> &CsrMatrix<f64> {
        &self.matrix
    }

    /// Get number of nodes
    pub fn len(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when every stored (i, j) has a matching (j, i) of equal weight.
    /// The [`TransitionKind::Symmetric`] scaling preserves symmetry but never
    /// creates it: a directed adjacency yields an asymmetric operator.
    pub fn is_symmetric(&self) -> bool {
        self.matrix.triplet_iter().all(|(i, j, w)| {
            let mirrored = self
                .matrix
                .get_entry(j, i)
                .map(|entry| entry.into_value())
                .unwrap_or(0.0);
            mirrored == *w
        })
    }
}

/// Builds the transition operator for `adjacency`.  Fails if any augmented
/// degree comes out non-positive or non-finite, which happens exactly when
/// the input carries negative or non-finite weights.
pub fn build_transition(
    adjacency: &Adjacency,
    kind: TransitionKind,
) -> Result<Transition, DiffusionError> {
    let mut looped = adjacency.csr() + &speye(adjacency.len());
    match kind {
        TransitionKind::Symmetric => {
            let degrees = row_sums(&looped);
            check_degrees(&degrees)?;
            let inv_sqrt: Vec<f64> = degrees.iter().map(|d| 1.0 / d.sqrt()).collect();
            scale_symmetric(&mut looped, &inv_sqrt);
        }
        TransitionKind::ColumnStochastic => {
            let degrees = column_sums(&looped);
            check_degrees(&degrees)?;
            scale_columns(&mut looped, &degrees);
        }
    }
    Ok(Transition {
        kind,
        matrix: looped,
    })
}

/// n x n identity in CSR form.
fn speye(n: usize) -> CsrMatrix<f64> {
    let indptr = (0..n + 1).collect();
    let indices = (0..n).collect();
    let data = vec![1.0; n];
    CsrMatrix::try_from_csr_data(n, n, indptr, indices, data).unwrap()
}

fn row_sums(a: &CsrMatrix<f64>) -> Vec<f64> {
    a.row_iter()
        .map(|row| row.values().iter().sum())
        .collect()
}

fn column_sums(a: &CsrMatrix<f64>) -> Vec<f64> {
    let mut sums = vec![0.0; a.ncols()];
    for (_, col, value) in a.triplet_iter() {
        sums[col] += value;
    }
    sums
}

fn check_degrees(degrees: &[f64]) -> Result<(), DiffusionError> {
    for (node, &degree) in degrees.iter().enumerate() {
        if !(degree > 0.0 && degree.is_finite()) {
            return Err(DiffusionError::NonPositiveDegree { node, degree });
        }
    }
    Ok(())
}

/// `T[i,j] = A_loop[i,j] / sqrt(d_i * d_j)`
fn scale_symmetric(a: &mut CsrMatrix<f64>, inv_sqrt: &[f64]) {
    let nrows = a.nrows();
    let (indptr, indices, data) = a.csr_data_mut();
    for i in 0..nrows {
        for k in indptr[i]..indptr[i + 1] {
            data[k] *= inv_sqrt[i] * inv_sqrt[indices[k]];
        }
    }
}

/// `T[i,j] = A_loop[i,j] / d_j`
fn scale_columns(a: &mut CsrMatrix<f64>, degrees: &[f64]) {
    let (_, indices, data) = a.csr_data_mut();
    for (k, value) in data.iter_mut().enumerate() {
        *value /= degrees[indices[k]];
    }
}

#[cfg(test)]
mod transition_tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::algos::utils::csr_to_dense;

    fn path_graph() -> Adjacency {
        // 0 - 1 - 2 - 3
        Adjacency::from_edges(
            4,
            vec![
                (0, 1, 1.),
                (1, 0, 1.),
                (1, 2, 1.),
                (2, 1, 1.),
                (2, 3, 1.),
                (3, 2, 1.),
            ],
        )
        .unwrap()
    }

    #[test]
    fn symmetric_two_nodes_exact() {
        let adj = Adjacency::from_edges(2, vec![(0, 1, 1.), (1, 0, 1.)]).unwrap();
        let t = build_transition(&adj, TransitionKind::Symmetric).unwrap();
        // Augmented degrees are both 2, so every entry is 1 / sqrt(2 * 2).
        assert_eq!(t.csr().values(), &[0.5; 4]);
        assert_eq!(t.kind(), TransitionKind::Symmetric);
    }

    #[test]
    fn symmetric_follows_adjacency() {
        let t = build_transition(&path_graph(), TransitionKind::Symmetric).unwrap();
        let dense = csr_to_dense(t.csr());
        assert_relative_eq!(dense, dense.transpose(), epsilon = 1e-15);

        let directed = Adjacency::from_edges(2, vec![(0, 1, 1.)]).unwrap();
        let t = build_transition(&directed, TransitionKind::Symmetric).unwrap();
        let dense = csr_to_dense(t.csr());
        assert!(dense != dense.transpose());
    }

    #[test]
    fn symmetry_comes_from_input_not_kind() {
        let t = build_transition(&path_graph(), TransitionKind::Symmetric).unwrap();
        assert!(t.is_symmetric());

        // Same graph, column scaling: unequal degrees break symmetry.
        let t = build_transition(&path_graph(), TransitionKind::ColumnStochastic).unwrap();
        assert!(!t.is_symmetric());

        let directed = Adjacency::from_edges(3, vec![(0, 1, 1.), (1, 2, 1.)]).unwrap();
        let t = build_transition(&directed, TransitionKind::Symmetric).unwrap();
        assert!(!t.is_symmetric());
    }

    #[test]
    fn column_stochastic_sums_to_one() {
        let t = build_transition(&path_graph(), TransitionKind::ColumnStochastic).unwrap();
        for sum in column_sums(t.csr()) {
            assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn isolated_node_keeps_self_loop() {
        // Node 2 has no edges; augmentation leaves it a unit self-loop.
        let adj = Adjacency::from_edges(3, vec![(0, 1, 1.), (1, 0, 1.)]).unwrap();
        for kind in [TransitionKind::Symmetric, TransitionKind::ColumnStochastic] {
            let t = build_transition(&adj, kind).unwrap();
            let dense = csr_to_dense(t.csr());
            assert_relative_eq!(dense[(2, 2)], 1.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn negative_weights_rejected() {
        let adj = Adjacency::from_edges(2, vec![(0, 1, -5.), (1, 0, -5.)]).unwrap();
        let err = build_transition(&adj, TransitionKind::Symmetric).unwrap_err();
        assert_eq!(
            err,
            DiffusionError::NonPositiveDegree {
                node: 0,
                degree: -4.0
            }
        );
    }
}
