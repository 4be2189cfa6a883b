use crate::c64;
use crate::error::{DynamicsError, Result};
use crate::hamiltonian::HamiltonianEnsemble;
use crate::interface::{Hamiltonian, Representation};
use crate::linalg::{dagger, hermitian_eigh};
use ndarray::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Integrator of the electronic Schroedinger equation `i dC/dt = Hvib C`
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PropagationMethod {
    /// exact propagator from the eigendecomposition of Hvib
    #[default]
    Exponential,
    /// classic fourth order Runge-Kutta with `substeps` equal intervals
    RungeKutta { substeps: usize },
}

impl PropagationMethod {
    pub fn new(use_rk_integration: bool, integration_steps: usize) -> Self {
        if use_rk_integration {
            PropagationMethod::RungeKutta {
                substeps: integration_steps.max(1),
            }
        } else {
            PropagationMethod::Exponential
        }
    }
}

/// Propagator `exp(-i Hvib dt)` of a Hermitian matrix
pub fn exponential_propagator(hvib: ArrayView2<c64>, dt: f64) -> Result<Array2<c64>> {
    let (eig, eig_vec): (Array1<f64>, Array2<c64>) = hermitian_eigh(hvib)?;
    let diag: Array1<c64> = eig.mapv(|val| (-c64::i() * dt * val).exp());
    Ok(eig_vec.dot(&Array::from_diag(&diag).dot(&dagger(eig_vec.view()))))
}

fn runge_kutta_step(coefficients: ArrayView1<c64>, delta_rk: f64, mat: ArrayView2<c64>) -> Array1<c64> {
    let k_1: Array1<c64> = mat.dot(&coefficients) * c64::from(delta_rk);
    let tmp: Array1<c64> = &coefficients + &(&k_1 * c64::from(0.5));

    let k_2: Array1<c64> = mat.dot(&tmp) * c64::from(delta_rk);
    let tmp: Array1<c64> = &coefficients + &(&k_2 * c64::from(0.5));

    let k_3: Array1<c64> = mat.dot(&tmp) * c64::from(delta_rk);
    let tmp: Array1<c64> = &coefficients + &k_3;

    let k_4: Array1<c64> = mat.dot(&tmp) * c64::from(delta_rk);

    &coefficients + &((k_1 + k_2 * c64::from(2.0) + k_3 * c64::from(2.0) + k_4) / c64::from(6.0))
}

/// Integrate `dC/dt = -i Hvib C` over `dt` with a constant Hvib
pub fn integrate(
    method: PropagationMethod,
    hvib: ArrayView2<c64>,
    coefficients: ArrayView1<c64>,
    dt: f64,
) -> Result<Array1<c64>> {
    DynamicsError::check_dim("vibronic Hamiltonian", hvib.nrows(), coefficients.len())?;
    match method {
        PropagationMethod::Exponential => {
            Ok(exponential_propagator(hvib, dt)?.dot(&coefficients))
        }
        PropagationMethod::RungeKutta { substeps } => {
            let n_delta: usize = substeps.max(1);
            let delta_rk: f64 = dt / n_delta as f64;
            let mat: Array2<c64> = hvib.mapv(|val| -c64::i() * val);
            let mut new_coefficients: Array1<c64> = coefficients.to_owned();
            for _ in 0..n_delta {
                new_coefficients = runge_kutta_step(new_coefficients.view(), delta_rk, mat.view());
            }
            Ok(new_coefficients)
        }
    }
}

/// Propagate the amplitudes of a single trajectory by `dt` (either sign) under
/// the current vibronic Hamiltonian of `ham` in the representation `rep`.
pub fn propagate_electronic<H: Hamiltonian + ?Sized>(
    dt: f64,
    mut c: ArrayViewMut1<c64>,
    ham: &H,
    rep: Representation,
    method: PropagationMethod,
) -> Result<()> {
    DynamicsError::check_dim("electronic amplitudes", ham.nstates(), c.len())?;
    let new_c: Array1<c64> = integrate(method, ham.get_hvib(rep), c.view(), dt)?;
    c.assign(&new_c);
    Ok(())
}

/// Propagate the amplitudes `[nstates, ntraj]` of all trajectories by `dt`.
pub fn propagate_electronic_ensemble<H: Hamiltonian>(
    dt: f64,
    c: &mut Array2<c64>,
    ham: &HamiltonianEnsemble<H>,
    rep: Representation,
    method: PropagationMethod,
) -> Result<()> {
    DynamicsError::check_dim("amplitude columns", ham.len(), c.ncols())?;
    let children: &[H] = ham.children();
    c.axis_iter_mut(Axis(1))
        .into_par_iter()
        .enumerate()
        .try_for_each(|(i, column)| propagate_electronic(dt, column, &children[i], rep, method))
}
