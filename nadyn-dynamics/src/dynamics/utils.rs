use crate::c64;
use crate::error::{DynamicsError, Result};
use crate::linalg::{expectation, norm_sqr};
use ndarray::prelude::*;

/// Classical kinetic energy `sum_n p_n^2 / (2 m_n)`
pub fn get_kinetic_energy(p: ArrayView1<f64>, inv_m: ArrayView1<f64>) -> f64 {
    0.5 * p
        .iter()
        .zip(inv_m.iter())
        .map(|(p_n, inv_m_n)| p_n * p_n * inv_m_n)
        .sum::<f64>()
}

/// Mean-field electronic energy `<C|H|C> / <C|C>`
pub fn get_mean_field_energy(ham: ArrayView2<c64>, c: ArrayView1<c64>) -> Result<f64> {
    DynamicsError::check_dim("electronic amplitudes", ham.nrows(), c.len())?;
    let norm: f64 = norm_sqr(c);
    if norm == 0.0 {
        return Err(DynamicsError::ZeroNorm);
    }
    Ok(expectation(ham, c).re / norm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn kinetic_energy_of_two_dofs() {
        let p: Array1<f64> = array![2.0, -3.0];
        let inv_m: Array1<f64> = array![0.5, 0.1];
        assert_abs_diff_eq!(get_kinetic_energy(p.view(), inv_m.view()), 1.45, epsilon = 1e-14);
    }

    #[test]
    fn mean_field_energy_is_normalized() {
        let ham: Array2<c64> = array![
            [c64::new(-1.0, 0.0), c64::new(0.0, 0.0)],
            [c64::new(0.0, 0.0), c64::new(1.0, 0.0)],
        ];
        let c: Array1<c64> = array![c64::new(2.0, 0.0), c64::new(0.0, 2.0)];
        assert_abs_diff_eq!(
            get_mean_field_energy(ham.view(), c.view()).unwrap(),
            0.0,
            epsilon = 1e-14
        );
    }
}
