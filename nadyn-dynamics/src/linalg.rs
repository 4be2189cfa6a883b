use crate::c64;
use crate::defaults::{EIGEN_EPS, EIGEN_MAX_ITER};
use crate::error::{DynamicsError, Result};
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::prelude::*;

/// Eigendecomposition of a Hermitian matrix. Only the lower triangle is read.
/// The eigenvalues are returned in ascending order, degenerate eigenvalues keep
/// the order of the solver. The columns of the second array are the eigenvectors.
pub fn hermitian_eigh(mat: ArrayView2<c64>) -> Result<(Array1<f64>, Array2<c64>)> {
    let n: usize = mat.nrows();
    DynamicsError::check_dim("hermitian matrix", n, mat.ncols())?;
    if mat.iter().any(|val| !val.re.is_finite() || !val.im.is_finite()) {
        return Err(DynamicsError::Degeneracy(String::from(
            "matrix to diagonalize contains non-finite elements",
        )));
    }
    let matrix: DMatrix<c64> = DMatrix::from_fn(n, n, |i, j| mat[[i, j]]);
    let eigen = SymmetricEigen::try_new(matrix, EIGEN_EPS, EIGEN_MAX_ITER)
        .ok_or(DynamicsError::Eigensolver(n))?;

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));

    let values: Array1<f64> = order.iter().map(|&k| eigen.eigenvalues[k]).collect();
    let vectors: Array2<c64> =
        Array2::from_shape_fn((n, n), |(i, j)| eigen.eigenvectors[(i, order[j])]);
    Ok((values, vectors))
}

/// Fix the arbitrary phase of each eigenvector: the component with the largest
/// modulus becomes real and positive (the first one wins on ties).
pub fn fix_gauge(vectors: &mut Array2<c64>) {
    for mut column in vectors.axis_iter_mut(Axis(1)) {
        let mut idx: usize = 0;
        let mut max_val: f64 = -1.0;
        for (k, val) in column.iter().enumerate() {
            if val.norm() > max_val {
                max_val = val.norm();
                idx = k;
            }
        }
        if max_val > 0.0 {
            let phase: c64 = column[idx].conj() / max_val;
            column.mapv_inplace(|val| val * phase);
        }
    }
}

/// Conjugate transpose
pub fn dagger(mat: ArrayView2<c64>) -> Array2<c64> {
    mat.t().mapv(|val| val.conj())
}

/// Unitary transformation `U^† A U`
pub fn transform(u: ArrayView2<c64>, a: ArrayView2<c64>) -> Array2<c64> {
    dagger(u).dot(&a.dot(&u))
}

/// `<c|A|c>`
pub fn expectation(a: ArrayView2<c64>, c: ArrayView1<c64>) -> c64 {
    c.mapv(|val| val.conj()).dot(&a.dot(&c))
}

pub fn norm_sqr(c: ArrayView1<c64>) -> f64 {
    c.iter().map(|val| val.norm_sqr()).sum()
}
