//! Reduces the dense diffusion matrix to its significant entries.
//!
//! Either policy works column by column, so the survivors of column `j` are
//! the nodes most relevant to node `j`.  Failing entries are absent from the
//! output, not stored as zeros, and non-positive entries never survive.

use float_ord::FloatOrd;
use nalgebra::DMatrix;
use nalgebra_sparse::csc::CscMatrix;
use rayon::prelude::*;

use crate::errors::DiffusionError;
use crate::graph::NodeID;

/// Which entries of the dense diffusion matrix survive.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SparsifyPolicy {
    /// Keep entries with `value >= eps`, `eps` in [0, 1).  An entry exactly
    /// at the threshold survives.
    Threshold { eps: f64 },
    /// Keep the `k` largest entries of each column, ties going to the lower
    /// row index.  Columns with fewer than `k` positive entries keep them
    /// all.
    TopK { k: usize },
}

impl SparsifyPolicy {
    pub fn validate(&self) -> Result<(), DiffusionError> {
        match *self {
            SparsifyPolicy::Threshold { eps } => {
                if !(eps >= 0.0 && eps < 1.0) {
                    return Err(DiffusionError::InvalidThreshold(eps));
                }
            }
            SparsifyPolicy::TopK { k } => {
                if k == 0 {
                    return Err(DiffusionError::InvalidTopK);
                }
            }
        }
        Ok(())
    }
}

/// Applies `policy` to every column of `dense`, producing the survivors as a
/// column-compressed matrix.
pub fn sparsify(
    dense: &DMatrix<f64>,
    policy: &SparsifyPolicy,
) -> Result<CscMatrix<f64>, DiffusionError> {
    policy.validate()?;
    let nrows = dense.nrows();
    // Column-major storage, so each chunk is one column.
    let columns: Vec<Vec<(NodeID, f64)>> = dense
        .as_slice()
        .par_chunks(nrows.max(1))
        .map(|column| select_column(column, policy))
        .collect();

    let mut offsets = Vec::with_capacity(columns.len() + 1);
    let mut rows = Vec::new();
    let mut values = Vec::new();
    offsets.push(0);
    for column in columns {
        for (row, value) in column {
            rows.push(row);
            values.push(value);
        }
        offsets.push(rows.len());
    }
    Ok(CscMatrix::try_from_csc_data(nrows, dense.ncols(), offsets, rows, values).unwrap())
}

fn select_column(column: &[f64], policy: &SparsifyPolicy) -> Vec<(NodeID, f64)> {
    match *policy {
        SparsifyPolicy::Threshold { eps } => column
            .iter()
            .enumerate()
            .filter(|(_, &value)| value > 0.0 && value >= eps)
            .map(|(row, &value)| (row, value))
            .collect(),
        SparsifyPolicy::TopK { k } => {
            let mut survivors: Vec<(NodeID, f64)> = column
                .iter()
                .enumerate()
                .filter(|(_, &value)| value > 0.0)
                .map(|(row, &value)| (row, value))
                .collect();
            if survivors.len() > k {
                survivors.sort_by_key(|&(row, value)| (FloatOrd(-value), row));
                survivors.truncate(k);
                survivors.sort_by_key(|&(row, _)| row);
            }
            survivors
        }
    }
}
