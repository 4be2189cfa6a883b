use super::Ensemble;
use crate::c64;
use crate::dynamics::{
    ehrenfest0, ehrenfest1, ehrenfest2, propagate_electronic, Corrections, PropagationMethod,
    StepParameters,
};
use crate::error::Result;
use crate::interface::{DiabaticModel, Hamiltonian, Representation};
use log::debug;
use ndarray::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Variant of the Ehrenfest integrator used by [Ensemble::ehrenfest_step]
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IntegratorKind {
    /// every trajectory on its own
    Ehrenfest0,
    /// all trajectories in one batch
    Ehrenfest1,
    /// batch with reordering and phase correction of the adiabatic states
    #[default]
    Ehrenfest2,
}

impl<H: Hamiltonian> Ensemble<H> {
    /// Propagate the amplitudes of trajectory `i` by `dt` under its current Hvib
    pub fn el_propagate_electronic(
        &mut self,
        i: usize,
        dt: f64,
        rep: Representation,
        method: PropagationMethod,
    ) -> Result<()> {
        self.check_index(i)?;
        propagate_electronic(
            dt,
            self.el[i].amplitudes.view_mut(),
            self.ham.child(i)?,
            rep,
            method,
        )
    }

    pub fn el_propagate_electronic_all(
        &mut self,
        dt: f64,
        rep: Representation,
        method: PropagationMethod,
    ) -> Result<()> {
        let children: &[H] = self.ham.children();
        let is_active: &[bool] = &self.is_active;
        self.el
            .par_iter_mut()
            .enumerate()
            .filter(|(i, _)| is_active[*i])
            .try_for_each(|(i, el)| {
                propagate_electronic(dt, el.amplitudes.view_mut(), &children[i], rep, method)
            })
    }

    /// Drift of the coordinates of trajectory `i`
    pub fn mol_propagate_q(&mut self, i: usize, dt: f64) -> Result<()> {
        self.check_index(i)?;
        self.mol[i].propagate_q(dt);
        Ok(())
    }

    pub fn mol_propagate_q_all(&mut self, dt: f64) {
        for (mol, _) in self
            .mol
            .iter_mut()
            .zip(self.is_active.iter())
            .filter(|(_, active)| **active)
        {
            mol.propagate_q(dt);
        }
    }

    /// Kick of the momenta of trajectory `i` with its stored force
    pub fn mol_propagate_p(&mut self, i: usize, dt: f64) -> Result<()> {
        self.check_index(i)?;
        self.mol[i].propagate_p(dt);
        Ok(())
    }

    pub fn mol_propagate_p_all(&mut self, dt: f64) {
        for (mol, _) in self
            .mol
            .iter_mut()
            .zip(self.is_active.iter())
            .filter(|(_, active)| **active)
        {
            mol.propagate_p(dt);
        }
    }

    /// Store the mean-field force of trajectory `i` in `mol[i].f`
    pub fn mol_update_forces(&mut self, i: usize, rep: Representation) -> Result<()> {
        self.check_index(i)?;
        let forces: Array1<c64> = self
            .ham
            .child(i)?
            .ehrenfest_forces(rep, self.el[i].amplitudes.view())?;
        self.mol[i].f = forces.mapv(|val| val.re);
        Ok(())
    }

    pub fn mol_update_forces_all(&mut self, rep: Representation) -> Result<()> {
        let children: &[H] = self.ham.children();
        let el = &self.el;
        let is_active: &[bool] = &self.is_active;
        self.mol
            .par_iter_mut()
            .enumerate()
            .filter(|(i, _)| is_active[*i])
            .try_for_each(|(i, mol)| -> Result<()> {
                let forces: Array1<c64> =
                    children[i].ehrenfest_forces(rep, el[i].amplitudes.view())?;
                mol.f = forces.mapv(|val| val.re);
                Ok(())
            })
    }

    /// Ehrenfest step of the active trajectories composed of the delegated
    /// electronic and nuclear sub-steps. Equivalent to [ehrenfest0] for every
    /// trajectory.
    pub fn ehrenfest_step_delegated(
        &mut self,
        dt: f64,
        model: &dyn DiabaticModel,
        rep: Representation,
        method: PropagationMethod,
    ) -> Result<()> {
        let half_dt: f64 = 0.5 * dt;
        self.ham_compute_couplings_all(rep)?;
        self.el_propagate_electronic_all(half_dt, rep, method)?;
        self.mol_update_forces_all(rep)?;
        self.mol_propagate_p_all(half_dt);
        self.mol_propagate_q_all(dt);
        self.ham_compute_all(model, rep)?;
        self.mol_update_forces_all(rep)?;
        self.mol_propagate_p_all(half_dt);
        self.ham_compute_couplings_all(rep)?;
        self.el_propagate_electronic_all(half_dt, rep, method)
    }

    /// One step of all trajectories (active or not) with the chosen integrator.
    /// The handles must have been evaluated at the current geometries. After the
    /// step the forces are updated and the discrete states follow a possible
    /// relabeling of the adiabatic states.
    pub fn ehrenfest_step(
        &mut self,
        model: &dyn DiabaticModel,
        params: &StepParameters,
        integrator: IntegratorKind,
        corrections: Corrections,
    ) -> Result<()> {
        let inv_m: Array1<f64> = self.inverse_masses()?;
        let orderings: Vec<Vec<usize>> = self
            .ham
            .children()
            .iter()
            .map(|ham| ham.ordering().to_vec())
            .collect();

        match integrator {
            IntegratorKind::Ehrenfest0 => {
                for i in 0..self.ntraj() {
                    let mut c: Array2<c64> = self.el[i].amplitudes.clone().insert_axis(Axis(1));
                    let mut q: Array2<f64> = self.mol[i].q.clone().insert_axis(Axis(1));
                    let mut p: Array2<f64> = self.mol[i].p.clone().insert_axis(Axis(1));
                    ehrenfest0(
                        &mut c,
                        &mut q,
                        &mut p,
                        inv_m.view(),
                        self.ham.child_mut(i)?,
                        model,
                        params,
                    )?;
                    self.el[i].amplitudes.assign(&c.column(0));
                    self.mol[i].q.assign(&q.column(0));
                    self.mol[i].p.assign(&p.column(0));
                }
            }
            IntegratorKind::Ehrenfest1 | IntegratorKind::Ehrenfest2 => {
                let mut c: Array2<c64> = self.amplitudes();
                let mut q: Array2<f64> = self.positions();
                let mut p: Array2<f64> = self.momenta();
                if integrator == IntegratorKind::Ehrenfest1 {
                    ehrenfest1(&mut c, &mut q, &mut p, inv_m.view(), &mut self.ham, model, params)?;
                } else {
                    ehrenfest2(
                        &mut c,
                        &mut q,
                        &mut p,
                        inv_m.view(),
                        &mut self.ham,
                        model,
                        params,
                        corrections,
                    )?;
                }
                for (i, (el, mol)) in self.el.iter_mut().zip(self.mol.iter_mut()).enumerate() {
                    el.amplitudes.assign(&c.column(i));
                    mol.q.assign(&q.column(i));
                    mol.p.assign(&p.column(i));
                }
            }
        }

        for (i, (el, ham)) in self.el.iter_mut().zip(self.ham.children()).enumerate() {
            let after: &[usize] = ham.ordering();
            if let Some(label) = orderings[i].iter().position(|&k| k == el.istate) {
                if after[label] != el.istate {
                    debug!(
                        "trajectory {}: active state {} is relabeled to {}",
                        i, el.istate, after[label]
                    );
                    el.istate = after[label];
                }
            }
        }
        self.update_all_forces(params.rep)
    }

    fn update_all_forces(&mut self, rep: Representation) -> Result<()> {
        let children: &[H] = self.ham.children();
        let el = &self.el;
        self.mol
            .par_iter_mut()
            .zip(children.par_iter())
            .zip(el.par_iter())
            .try_for_each(|((mol, ham), el)| -> Result<()> {
                let forces: Array1<c64> = ham.ehrenfest_forces(rep, el.amplitudes.view())?;
                mol.f = forces.mapv(|val| val.re);
                Ok(())
            })
    }
}
