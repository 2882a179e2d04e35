use nalgebra::DMatrix;
use nalgebra_sparse::csr::CsrMatrix;
use rayon::prelude::*;

use crate::errors::DiffusionError;

/// Densifies a CSR matrix.  The kernels run dense from this point on.
pub(crate) fn csr_to_dense(a: &CsrMatrix<f64>) -> DMatrix<f64> {
    let mut dense = DMatrix::zeros(a.nrows(), a.ncols());
    for (i, j, value) in a.triplet_iter() {
        dense[(i, j)] = *value;
    }
    dense
}

/// Rejects NaN or infinite entries anywhere in a kernel output, reporting
/// the first offending coordinate in column-major order.  Never clamps.
pub(crate) fn check_finite(a: &DMatrix<f64>) -> Result<(), DiffusionError> {
    let nrows = a.nrows();
    // Column-major storage, so each chunk is one column.
    let bad = a
        .as_slice()
        .par_chunks(nrows.max(1))
        .enumerate()
        .find_map_first(|(col, column)| {
            column
                .iter()
                .position(|v| !v.is_finite())
                .map(|row| (row, col))
        });

    match bad {
        Some((row, col)) => Err(DiffusionError::NonFinite { row, col }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod utils_tests {
    use super::*;
    use nalgebra_sparse::coo::CooMatrix;

    #[test]
    fn test_csr_to_dense() {
        let mut coo = CooMatrix::new(2, 3);
        coo.push(0, 1, 2.0);
        coo.push(1, 2, -1.5);
        let dense = csr_to_dense(&CsrMatrix::from(&coo));
        assert_eq!(
            dense,
            DMatrix::from_row_slice(2, 3, &[0.0, 2.0, 0.0, 0.0, 0.0, -1.5])
        );
    }

    #[test]
    fn test_check_finite() {
        let mut a = DMatrix::zeros(3, 3);
        assert!(check_finite(&a).is_ok());

        a[(1, 2)] = f64::NAN;
        assert_eq!(
            check_finite(&a).unwrap_err(),
            DiffusionError::NonFinite { row: 1, col: 2 }
        );

        a[(1, 2)] = f64::INFINITY;
        assert!(check_finite(&a).is_err());
    }
}
