//! Rescales sparsified columns back into probability distributions.

use nalgebra_sparse::csc::CscMatrix;

/// Divides every column by its sum, making the matrix column-stochastic
/// again after sparsification dropped mass.  A column whose entries were all
/// sparsified away gets a unit self-loop on the diagonal, so every node
/// keeps exactly one outgoing unit of probability and downstream layers
/// never see an all-zero neighborhood.  Columns already summing to 1 pass
/// through unchanged, so a second application is a no-op.
pub fn renormalize(matrix: &CscMatrix<f64>) -> CscMatrix<f64> {
    let (col_offsets, row_indices, values) = matrix.csc_data();

    let mut offsets = Vec::with_capacity(matrix.ncols() + 1);
    let mut rows = Vec::with_capacity(row_indices.len());
    let mut data = Vec::with_capacity(values.len());
    offsets.push(0);
    for col in 0..matrix.ncols() {
        let (start, stop) = (col_offsets[col], col_offsets[col + 1]);
        let denom = values[start..stop].iter().sum::<f64>();
        if denom > 0.0 {
            for k in start..stop {
                rows.push(row_indices[k]);
                data.push(values[k] / denom);
            }
        } else {
            rows.push(col);
            data.push(1.0);
        }
        offsets.push(rows.len());
    }
    CscMatrix::try_from_csc_data(matrix.nrows(), matrix.ncols(), offsets, rows, data).unwrap()
}
