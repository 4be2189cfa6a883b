use crate::c64;
use crate::dynamics::electronic::{
    propagate_electronic, propagate_electronic_ensemble, PropagationMethod,
};
use crate::dynamics::reordering::{
    get_reordering, permute_amplitudes, permute_columns, phase_correct_amplitudes, state_overlap,
    AssignmentPolicy,
};
use crate::error::{DynamicsError, Result};
use crate::hamiltonian::HamiltonianEnsemble;
use crate::interface::{DiabaticModel, Hamiltonian, Representation};
use log::trace;
use ndarray::prelude::*;
use ndarray::Zip;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Settings shared by all variants of the Ehrenfest step
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepParameters {
    // time step in atomic units, may be negative
    pub dt: f64,
    pub rep: Representation,
    pub method: PropagationMethod,
}

impl StepParameters {
    pub fn new(dt: f64, rep: Representation) -> Self {
        StepParameters {
            dt,
            rep,
            method: PropagationMethod::Exponential,
        }
    }

    pub fn with_method(mut self, method: PropagationMethod) -> Self {
        self.method = method;
        self
    }
}

/// Bookkeeping of the adiabatic states between two nuclear steps.
/// It has no effect in the diabatic representation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Corrections {
    pub do_reordering: bool,
    pub do_phase_correction: bool,
    pub assignment: AssignmentPolicy,
}

impl Default for Corrections {
    fn default() -> Self {
        Corrections {
            do_reordering: true,
            do_phase_correction: true,
            assignment: AssignmentPolicy::Greedy,
        }
    }
}

impl Corrections {
    pub fn none() -> Self {
        Corrections {
            do_reordering: false,
            do_phase_correction: false,
            assignment: AssignmentPolicy::Greedy,
        }
    }

    fn is_active(&self, rep: Representation) -> bool {
        rep == Representation::Adiabatic && (self.do_reordering || self.do_phase_correction)
    }
}

fn check_nuclear_shapes(
    q: &Array2<f64>,
    p: &Array2<f64>,
    inv_m: ArrayView1<f64>,
    ndof: usize,
    ntraj: usize,
) -> Result<()> {
    DynamicsError::check_dim("coordinate rows", ndof, q.nrows())?;
    DynamicsError::check_dim("coordinate columns", ntraj, q.ncols())?;
    DynamicsError::check_dim("momentum rows", ndof, p.nrows())?;
    DynamicsError::check_dim("momentum columns", ntraj, p.ncols())?;
    DynamicsError::check_dim("inverse masses", ndof, inv_m.len())
}

/// `p += Re(F) dt`
fn kick(p: &mut Array2<f64>, forces: ArrayView2<c64>, dt: f64) {
    Zip::from(p)
        .and(forces)
        .for_each(|p_val, f_val| *p_val += f_val.re * dt);
}

/// `q += inv_m p dt` for every dof and trajectory
fn drift(q: &mut Array2<f64>, p: &Array2<f64>, inv_m: ArrayView1<f64>, dt: f64) {
    Zip::from(q.rows_mut())
        .and(p.rows())
        .and(&inv_m)
        .for_each(|mut q_n, p_n, &inv_m_n| q_n.scaled_add(inv_m_n * dt, &p_n));
}

/// One Ehrenfest step of a single trajectory. `q` and `p` are `[ndof, 1]`,
/// `c` is `[nstates, 1]`. The handle has to be evaluated at the current
/// geometry before the first step.
pub fn ehrenfest0<H: Hamiltonian + ?Sized>(
    c: &mut Array2<c64>,
    q: &mut Array2<f64>,
    p: &mut Array2<f64>,
    inv_m: ArrayView1<f64>,
    ham: &mut H,
    model: &dyn DiabaticModel,
    params: &StepParameters,
) -> Result<()> {
    check_nuclear_shapes(q, p, inv_m, ham.ndof(), 1)?;
    DynamicsError::check_dim("amplitude rows", ham.nstates(), c.nrows())?;
    DynamicsError::check_dim("amplitude columns", 1, c.ncols())?;
    let (dt, rep, method) = (params.dt, params.rep, params.method);

    ham.compute_nac(rep, p.column(0), inv_m)?;
    ham.compute_hvib(rep);
    propagate_electronic(0.5 * dt, c.column_mut(0), &*ham, rep, method)?;

    let forces: Array1<c64> = ham.ehrenfest_forces(rep, c.column(0))?;
    kick(p, forces.view().insert_axis(Axis(1)), 0.5 * dt);
    drift(q, p, inv_m, dt);

    ham.compute_diabatic(model, q.column(0))?;
    ham.compute_adiabatic()?;

    let forces: Array1<c64> = ham.ehrenfest_forces(rep, c.column(0))?;
    kick(p, forces.view().insert_axis(Axis(1)), 0.5 * dt);

    ham.compute_nac(rep, p.column(0), inv_m)?;
    ham.compute_hvib(rep);
    propagate_electronic(0.5 * dt, c.column_mut(0), &*ham, rep, method)
}

/// One Ehrenfest step of all trajectories. The columns of `q`, `p` (`[ndof, ntraj]`)
/// and `c` (`[nstates, ntraj]`) belong to the handles of `ham` in the same order.
pub fn ehrenfest1<H: Hamiltonian>(
    c: &mut Array2<c64>,
    q: &mut Array2<f64>,
    p: &mut Array2<f64>,
    inv_m: ArrayView1<f64>,
    ham: &mut HamiltonianEnsemble<H>,
    model: &dyn DiabaticModel,
    params: &StepParameters,
) -> Result<()> {
    ensemble_step(c, q, p, inv_m, ham, model, params, Corrections::none())
}

/// Ehrenfest step of all trajectories which keeps the adiabatic states consistent
/// between the steps: after the new geometry has been evaluated, the states are
/// matched to the ones of the previous step (`do_reordering`) and their phases are
/// aligned (`do_phase_correction`). The amplitudes follow both operations.
#[allow(clippy::too_many_arguments)]
pub fn ehrenfest2<H: Hamiltonian>(
    c: &mut Array2<c64>,
    q: &mut Array2<f64>,
    p: &mut Array2<f64>,
    inv_m: ArrayView1<f64>,
    ham: &mut HamiltonianEnsemble<H>,
    model: &dyn DiabaticModel,
    params: &StepParameters,
    corrections: Corrections,
) -> Result<()> {
    ensemble_step(c, q, p, inv_m, ham, model, params, corrections)
}

/// [ehrenfest2] with reordering and phase correction switched on
pub fn ehrenfest2_default<H: Hamiltonian>(
    c: &mut Array2<c64>,
    q: &mut Array2<f64>,
    p: &mut Array2<f64>,
    inv_m: ArrayView1<f64>,
    ham: &mut HamiltonianEnsemble<H>,
    model: &dyn DiabaticModel,
    params: &StepParameters,
) -> Result<()> {
    ensemble_step(c, q, p, inv_m, ham, model, params, Corrections::default())
}

#[allow(clippy::too_many_arguments)]
fn ensemble_step<H: Hamiltonian>(
    c: &mut Array2<c64>,
    q: &mut Array2<f64>,
    p: &mut Array2<f64>,
    inv_m: ArrayView1<f64>,
    ham: &mut HamiltonianEnsemble<H>,
    model: &dyn DiabaticModel,
    params: &StepParameters,
    corrections: Corrections,
) -> Result<()> {
    let ntraj: usize = ham.len();
    let (nstates, ndof): (usize, usize) = ham
        .children()
        .first()
        .map_or((c.nrows(), q.nrows()), |h| (h.nstates(), h.ndof()));
    check_nuclear_shapes(q, p, inv_m, ndof, ntraj)?;
    DynamicsError::check_dim("amplitude rows", nstates, c.nrows())?;
    DynamicsError::check_dim("amplitude columns", ntraj, c.ncols())?;
    if ntraj == 0 {
        return Ok(());
    }
    let (dt, rep, method) = (params.dt, params.rep, params.method);

    ham.compute_nac(rep, p.view(), inv_m)?;
    ham.compute_hvib(rep);
    propagate_electronic_ensemble(0.5 * dt, c, ham, rep, method)?;

    let forces: Array2<c64> = ham.ehrenfest_forces(rep, c.view())?;
    kick(p, forces.view(), 0.5 * dt);
    drift(q, p, inv_m, dt);

    // basis of the previous geometry, only needed for the adiabatic bookkeeping
    let mut u_prev: Option<Vec<Array2<c64>>> = if corrections.is_active(rep) {
        Some(ham.basis_transforms())
    } else {
        None
    };

    ham.compute_diabatic(model, q.view())?;
    ham.compute_adiabatic()?;

    if let Some(u_prev) = u_prev.as_mut() {
        c.axis_iter_mut(Axis(1))
            .into_par_iter()
            .zip(ham.children_mut().par_iter_mut())
            .zip(u_prev.par_iter_mut())
            .try_for_each(|((c_i, ham_i), u_prev_i)| {
                correct_adiabatic_states(c_i, ham_i, u_prev_i, &corrections)
            })?;
    }

    let forces: Array2<c64> = ham.ehrenfest_forces(rep, c.view())?;
    kick(p, forces.view(), 0.5 * dt);

    ham.compute_nac(rep, p.view(), inv_m)?;
    ham.compute_hvib(rep);
    propagate_electronic_ensemble(0.5 * dt, c, ham, rep, method)
}

/// Reorder and phase-correct the adiabatic states of one trajectory against the
/// basis `u_prev` of the previous geometry.
fn correct_adiabatic_states<H: Hamiltonian>(
    mut c: ArrayViewMut1<c64>,
    ham: &mut H,
    u_prev: &mut Array2<c64>,
    corrections: &Corrections,
) -> Result<()> {
    if corrections.do_reordering {
        let overlap: Array2<c64> = state_overlap(u_prev.view(), ham.get_basis_transform());
        let perm: Vec<usize> = get_reordering(overlap.view(), corrections.assignment)?;
        if perm.iter().enumerate().any(|(i, &pi)| i != pi) {
            trace!("reordering of the adiabatic states: {:?}", perm);
        }
        permute_amplitudes(c.view_mut(), &perm)?;
        ham.update_ordering(&perm)?;
        permute_columns(u_prev, &perm)?;
    }
    if corrections.do_phase_correction {
        let phases: Array1<c64> = ham.update_phases(u_prev.view())?;
        phase_correct_amplitudes(c, phases.view())?;
    }
    Ok(())
}
