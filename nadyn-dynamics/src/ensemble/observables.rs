use super::Ensemble;
use crate::c64;
use crate::dynamics::utils::{get_kinetic_energy, get_mean_field_energy};
use crate::error::{DynamicsError, Result};
use crate::interface::{DiabaticData, DiabaticModel, Hamiltonian, Representation};
use crate::linalg::hermitian_eigh;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

/// Spatial window `xmin <= q[dof] <= xmax` that selects the trajectories
/// entering a population estimate.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Window {
    pub dof: usize,
    pub xmin: f64,
    pub xmax: f64,
}

impl Window {
    pub fn new(dof: usize, xmin: f64, xmax: f64) -> Self {
        Window { dof, xmin, xmax }
    }

    pub fn contains(&self, q: ArrayView1<f64>) -> Result<bool> {
        match q.get(self.dof) {
            Some(&x) => Ok(x >= self.xmin && x <= self.xmax),
            None => Err(DynamicsError::DimensionMismatch {
                what: "window dof",
                expected: q.len(),
                found: self.dof,
            }),
        }
    }
}

fn in_window(window: Option<&Window>, q: ArrayView1<f64>) -> Result<bool> {
    window.map_or(Ok(true), |window| window.contains(q))
}

impl<H: Hamiltonian> Ensemble<H> {
    /// Mean-field populations `sum_traj |C_i|^2 / ntraj` of the trajectories
    /// inside `window`
    pub fn se_pop(&self, window: Option<&Window>) -> Result<Array1<f64>> {
        let mut pops: Array1<f64> = Array1::zeros(self.nstates);
        if self.ntraj() == 0 {
            return Ok(pops);
        }
        for (el, mol) in self.el.iter().zip(self.mol.iter()) {
            if in_window(window, mol.q.view())? {
                pops += &el.populations();
            }
        }
        Ok(pops / self.ntraj() as f64)
    }

    /// Fraction of the trajectories inside `window` whose discrete state is `i`
    pub fn sh_pop(&self, window: Option<&Window>) -> Result<Array1<f64>> {
        let mut pops: Array1<f64> = Array1::zeros(self.nstates);
        if self.ntraj() == 0 {
            return Ok(pops);
        }
        for (el, mol) in self.el.iter().zip(self.mol.iter()) {
            if in_window(window, mol.q.view())? {
                let count: &mut f64 = pops.get_mut(el.istate).ok_or(
                    DynamicsError::DimensionMismatch {
                        what: "active state",
                        expected: self.nstates,
                        found: el.istate,
                    },
                )?;
                *count += 1.0;
            }
        }
        Ok(pops / self.ntraj() as f64)
    }

    /// Diabatic populations of a two-state model obtained by projecting the
    /// occupied adiabatic state of every trajectory in `window` onto the two
    /// diabats. The model is evaluated into scratch buffers, the handles are
    /// left untouched.
    pub fn sh_pop1(
        &self,
        window: Option<&Window>,
        model: &dyn DiabaticModel,
    ) -> Result<Array1<f64>> {
        if self.nstates != 2 {
            return Err(DynamicsError::UnsupportedStateCount {
                what: "diabatic projection of the active state",
                expected: 2,
                found: self.nstates,
            });
        }
        let mut pops: Array1<f64> = Array1::zeros(2);
        let ntraj: usize = self.ntraj();
        if ntraj == 0 {
            return Ok(pops);
        }
        for (el, mol) in self.el.iter().zip(self.mol.iter()) {
            if !in_window(window, mol.q.view())? {
                continue;
            }
            let mut data: DiabaticData = DiabaticData::new(2, mol.q.len());
            model.compute(mol.q.view(), &mut data)?;
            let (energies, _): (Array1<f64>, Array2<c64>) = hermitian_eigh(data.ham.view())?;

            let energy: f64 = *energies.get(el.istate).ok_or(DynamicsError::DimensionMismatch {
                what: "active state",
                expected: 2,
                found: el.istate,
            })?;
            let h0: f64 = data.ham[[0, 0]].re;
            let coupling: f64 = data.ham[[0, 1]].norm();

            let detuning: f64 = (h0 - energy).powi(2);
            let v_sq: f64 = coupling * coupling;
            let denom: f64 = detuning + v_sq;
            if denom > 0.0 {
                pops[0] += v_sq / denom;
                pops[1] += detuning / denom;
            } else {
                pops[0] += 1.0;
            }
        }
        Ok(pops / ntraj as f64)
    }

    /// Average classical kinetic energy per trajectory
    pub fn kinetic_energy(&self) -> f64 {
        if self.ntraj() == 0 {
            return 0.0;
        }
        let total: f64 = self
            .mol
            .iter()
            .map(|mol| get_kinetic_energy(mol.p.view(), mol.inverse_masses().view()))
            .sum();
        total / self.ntraj() as f64
    }

    /// Average mean-field potential energy per trajectory. The amplitudes have
    /// to be expressed in `rep`.
    pub fn potential_energy(&self, rep: Representation) -> Result<f64> {
        if self.ntraj() == 0 {
            return Ok(0.0);
        }
        let mut total: f64 = 0.0;
        for (el, ham) in self.el.iter().zip(self.ham.children()) {
            total += get_mean_field_energy(ham.get_ham(rep), el.amplitudes.view())?;
        }
        Ok(total / self.ntraj() as f64)
    }

    pub fn total_energy(&self, rep: Representation) -> Result<f64> {
        Ok(self.kinetic_energy() + self.potential_energy(rep)?)
    }
}
