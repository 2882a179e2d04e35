use nalgebra_sparse::coo::CooMatrix;
use nalgebra_sparse::csr::CsrMatrix;

use crate::errors::DiffusionError;

pub type NodeID = usize;

/// Caller-provided adjacency matrix.  Square, with non-negative weights;
/// undirected graphs store both directions.  We keep it in CSR form since
/// adjacency lists tend to use more memory, and the pipeline never mutates
/// it: every stage derives a fresh matrix.
#[derive(Debug, Clone)]
pub struct Adjacency {
    matrix: CsrMatrix<f64>,
}

impl Adjacency {
    /// Wraps an existing CSR matrix, rejecting non-square input.
    pub fn from_csr(matrix: CsrMatrix<f64>) -> Result<Self, DiffusionError> {
        if matrix.nrows() != matrix.ncols() {
            return Err(DiffusionError::NonSquare {
                rows: matrix.nrows(),
                cols: matrix.ncols(),
            });
        }
        Ok(Adjacency { matrix })
    }

    /// Builds the adjacency matrix from (from, to, weight) triplets.
    /// Duplicate coordinates are summed.
    pub fn from_edges(
        num_nodes: usize,
        edges: impl IntoIterator<Item = (NodeID, NodeID, f64)>,
    ) -> Result<Self, DiffusionError> {
        let mut coo = CooMatrix::new(num_nodes, num_nodes);
        for (from_node, to_node, weight) in edges {
            let node = from_node.max(to_node);
            if node >= num_nodes {
                return Err(DiffusionError::NodeOutOfRange {
                    node,
                    nodes: num_nodes,
                });
            }
            coo.push(from_node, to_node, weight);
        }
        Ok(Adjacency {
            matrix: CsrMatrix::from(&coo),
        })
    }

    /// Get number of nodes in graph
    pub fn len(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get number of stored edges in graph
    pub fn edges(&self) -> usize {
        self.matrix.nnz()
    }

    /// The underlying CSR view.
    pub fn csr(&self) -> &CsrMatrix<f64> {
        &self.matrix
    }

    /// True when every stored (i, j) has a matching (j, i) of equal weight.
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
