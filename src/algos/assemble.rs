//! Converts the normalized diffusion matrix into the edge-list form used by
//! graph-convolution consumers, optionally symmetrizing it first.

use itertools::{EitherOrBoth, Itertools};
use nalgebra::DMatrix;
use nalgebra_sparse::coo::CooMatrix;
use nalgebra_sparse::csc::CscMatrix;
use nalgebra_sparse::csr::CsrMatrix;

use crate::graph::NodeID;

/// How `S[i, j]` and `S[j, i]` are reconciled when the consumer needs an
/// undirected graph.  Absent entries count as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MergePolicy {
    /// Larger of the two weights.
    Max,
    /// Average of the two, preserving total mass as `(S + S^T) / 2` would.
    Mean,
    /// Sum of the two.  Doubles self-loops.
    Sum,
}

impl MergePolicy {
    fn merge(&self, forward: f64, reverse: f64) -> f64 {
        match self {
            MergePolicy::Max => forward.max(reverse),
            MergePolicy::Mean => 0.5 * (forward + reverse),
            MergePolicy::Sum => forward + reverse,
        }
    }
}

/// Parallel edge arrays: entry `e` is the edge `sources[e] -> targets[e]`
/// carrying `weights[e]`, meaning column `sources[e]`, row `targets[e]` of
/// the diffusion matrix.  Edges are sorted by (source, target) and no pair
/// repeats, so runs over the same input are bit-identical.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffusionEdges {
    num_nodes: usize,
    sources: Vec<NodeID>,
    targets: Vec<NodeID>,
    weights: Vec<f64>,
}

impl DiffusionEdges {
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Get number of stored edges
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn sources(&self) -> &[NodeID] {
        &self.sources
    }

    pub fn targets(&self) -> &[NodeID] {
        &self.targets
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// (source, target, weight) triples in (source, target) order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeID, NodeID, f64)> + '_ {
        itertools::izip!(&self.sources, &self.targets, &self.weights)
            .map(|(source, target, weight)| (*source, *target, *weight))
    }

    /// The diffusion matrix these edges were extracted from, as COO with
    /// entry (target, source) = weight.
    pub fn to_coo(&self) -> CooMatrix<f64> {
        let mut coo = CooMatrix::new(self.num_nodes, self.num_nodes);
        for (source, target, weight) in self.iter() {
            coo.push(target, source, weight);
        }
        coo
    }

    /// Dense interchange for consumers without sparse support.
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.num_nodes, self.num_nodes);
        for (source, target, weight) in self.iter() {
            dense[(target, source)] = weight;
        }
        dense
    }
}

/// Merges the matrix with its transpose under `policy`.  Walking the CSC
/// column alongside the matching CSR row gives the union of stored mirror
/// positions in row order, without hashing, so output order is deterministic.
pub fn symmetrize(matrix: &CscMatrix<f64>, policy: MergePolicy) -> CscMatrix<f64> {
    let n = matrix.ncols();
    let row_view = CsrMatrix::from(matrix);
    let (col_offsets, row_indices, values) = matrix.csc_data();
    let (row_offsets, col_indices, mirrored) = row_view.csr_data();

    let mut offsets = Vec::with_capacity(n + 1);
    let mut rows = Vec::new();
    let mut data = Vec::new();
    offsets.push(0);
    for j in 0..n {
        let down = (col_offsets[j]..col_offsets[j + 1]).map(|k| (row_indices[k], values[k]));
        let across = (row_offsets[j]..row_offsets[j + 1]).map(|k| (col_indices[k], mirrored[k]));
        for pair in down.merge_join_by(across, |a, b| a.0.cmp(&b.0)) {
            let (row, weight) = match pair {
                EitherOrBoth::Both((row, forward), (_, reverse)) => {
                    (row, policy.merge(forward, reverse))
                }
                EitherOrBoth::Left((row, forward)) => (row, policy.merge(forward, 0.0)),
                EitherOrBoth::Right((row, reverse)) => (row, policy.merge(0.0, reverse)),
            };
            rows.push(row);
            data.push(weight);
        }
        offsets.push(rows.len());
    }
    CscMatrix::try_from_csc_data(n, n, offsets, rows, data).unwrap()
}

/// Extracts `matrix` into parallel edge arrays, symmetrizing first when a
/// merge policy is given.
pub fn assemble(matrix: &CscMatrix<f64>, merge: Option<MergePolicy>) -> DiffusionEdges {
    let merged;
    let matrix = match merge {
        Some(policy) => {
            merged = symmetrize(matrix, policy);
            &merged
        }
        None => matrix,
    };

    let mut sources = Vec::with_capacity(matrix.nnz());
    let mut targets = Vec::with_capacity(matrix.nnz());
    let mut weights = Vec::with_capacity(matrix.nnz());
    let (col_offsets, row_indices, values) = matrix.csc_data();
    for col in 0..matrix.ncols() {
        for k in col_offsets[col]..col_offsets[col + 1] {
            sources.push(col);
            targets.push(row_indices[k]);
            weights.push(values[k]);
        }
    }
    DiffusionEdges {
        num_nodes: matrix.ncols(),
        sources,
        targets,
        weights,
    }
}

#[cfg(test)]
mod assemble_tests {
    use approx::assert_relative_eq;
    use hashbrown::HashSet;

    use super::*;

    /// 2x2 with the single entry (row 0, col 1) = 0.3.
    fn one_way() -> CscMatrix<f64> {
        CscMatrix::try_from_csc_data(2, 2, vec![0, 0, 1], vec![0], vec![0.3]).unwrap()
    }

    #[test]
    fn assemble_orders_by_source_then_target() {
        let matrix = CscMatrix::try_from_csc_data(
            3,
            3,
            vec![0, 2, 2, 3],
            vec![0, 2, 1],
            vec![0.4, 0.6, 1.0],
        )
        .unwrap();
        let edges = assemble(&matrix, None);
        assert_eq!(edges.num_nodes(), 3);
        assert_eq!(edges.len(), 3);
        assert_eq!(edges.sources(), &[0, 0, 2]);
        assert_eq!(edges.targets(), &[0, 2, 1]);
        assert_eq!(edges.weights(), &[0.4, 0.6, 1.0]);
    }

    #[test]
    fn merge_policies() {
        // Max keeps the missing direction at the stored weight.
        let edges = assemble(&one_way(), Some(MergePolicy::Max));
        assert_eq!(edges.sources(), &[0, 1]);
        assert_eq!(edges.targets(), &[1, 0]);
        assert_eq!(edges.weights(), &[0.3, 0.3]);

        let edges = assemble(&one_way(), Some(MergePolicy::Mean));
        assert_eq!(edges.weights(), &[0.15, 0.15]);

        let edges = assemble(&one_way(), Some(MergePolicy::Sum));
        assert_eq!(edges.weights(), &[0.3, 0.3]);
    }

    #[test]
    fn sum_doubles_self_loops() {
        let matrix = CscMatrix::try_from_csc_data(1, 1, vec![0, 1], vec![0], vec![0.4]).unwrap();
        let edges = assemble(&matrix, Some(MergePolicy::Sum));
        assert_eq!(edges.weights(), &[0.8]);
    }

    #[test]
    fn symmetrized_output_is_symmetric_without_duplicates() {
        let matrix = CscMatrix::try_from_csc_data(
            3,
            3,
            vec![0, 2, 3, 4],
            vec![0, 1, 2, 0],
            vec![0.7, 0.3, 1.0, 1.0],
        )
        .unwrap();
        let edges = assemble(&matrix, Some(MergePolicy::Max));
        let dense = edges.to_dense();
        assert_relative_eq!(dense, dense.transpose(), epsilon = 1e-15);

        let pairs: HashSet<_> = edges.iter().map(|(s, t, _)| (s, t)).collect();
        assert_eq!(pairs.len(), edges.len());
    }

    #[test]
    fn coo_and_dense_agree() {
        let edges = assemble(&one_way(), None);
        let coo = edges.to_coo();
        let dense = edges.to_dense();
        assert_eq!(coo.nnz(), edges.len());
        for (i, j, w) in coo.triplet_iter() {
            assert_eq!(dense[(i, j)], *w);
        }
        assert_eq!(dense[(0, 1)], 0.3);
    }
}
