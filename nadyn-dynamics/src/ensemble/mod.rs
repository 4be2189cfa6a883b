pub use observables::*;
pub use propagation::*;
pub use state::*;

mod observables;
mod propagation;
mod state;

use crate::c64;
use crate::error::{DynamicsError, Result};
use crate::hamiltonian::{HamiltonianEnsemble, VibronicHamiltonian};
use crate::interface::{DiabaticModel, Hamiltonian, Representation};
use ndarray::prelude::*;
use rayon::prelude::*;

/// Ensemble of independent trajectories. Every trajectory consists of its
/// electronic state, its nuclear state and its Hamiltonian handle, all three
/// stored at the same index. Operations on the whole ensemble skip the
/// trajectories that are flagged as inactive.
#[derive(Clone, Debug)]
pub struct Ensemble<H: Hamiltonian> {
    nstates: usize,
    ndof: usize,
    pub el: Vec<ElectronicState>,
    pub mol: Vec<NuclearState>,
    pub ham: HamiltonianEnsemble<H>,
    pub is_active: Vec<bool>,
}

impl Ensemble<VibronicHamiltonian> {
    /// Ensemble with all trajectories in the electronic state `istate`
    pub fn from_nuclear_states(
        nstates: usize,
        istate: usize,
        mol: Vec<NuclearState>,
    ) -> Result<Self> {
        let ndof: usize = mol.first().map_or(0, |state| state.ndof());
        if istate >= nstates {
            return Err(DynamicsError::UnsupportedStateCount {
                what: "initial state",
                expected: istate + 1,
                found: nstates,
            });
        }
        let el: Vec<ElectronicState> = (0..mol.len())
            .map(|_| ElectronicState::new(nstates, istate))
            .collect();
        let children: Vec<VibronicHamiltonian> = (0..mol.len())
            .map(|_| VibronicHamiltonian::new(nstates, ndof))
            .collect();
        Ensemble::new(nstates, ndof, el, mol, children)
    }
}

impl<H: Hamiltonian> Ensemble<H> {
    pub fn new(
        nstates: usize,
        ndof: usize,
        el: Vec<ElectronicState>,
        mol: Vec<NuclearState>,
        children: Vec<H>,
    ) -> Result<Self> {
        let ntraj: usize = el.len();
        DynamicsError::check_dim("nuclear states", ntraj, mol.len())?;
        DynamicsError::check_dim("Hamiltonian handles", ntraj, children.len())?;
        for state in el.iter() {
            DynamicsError::check_dim("electronic amplitudes", nstates, state.nstates())?;
        }
        for state in mol.iter() {
            DynamicsError::check_dim("coordinates", ndof, state.q.len())?;
            DynamicsError::check_dim("momenta", ndof, state.p.len())?;
            DynamicsError::check_dim("masses", ndof, state.mass.len())?;
            DynamicsError::check_dim("forces", ndof, state.f.len())?;
        }
        for ham in children.iter() {
            DynamicsError::check_dim("Hamiltonian states", nstates, ham.nstates())?;
            DynamicsError::check_dim("Hamiltonian dofs", ndof, ham.ndof())?;
        }
        Ok(Ensemble {
            nstates,
            ndof,
            el,
            mol,
            ham: HamiltonianEnsemble::new(children),
            is_active: vec![true; ntraj],
        })
    }

    pub fn ntraj(&self) -> usize {
        self.el.len()
    }

    pub fn nstates(&self) -> usize {
        self.nstates
    }

    pub fn ndof(&self) -> usize {
        self.ndof
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<()> {
        let ntraj: usize = self.ntraj();
        if index < ntraj && index < self.mol.len() && index < self.ham.len() {
            Ok(())
        } else {
            Err(DynamicsError::TrajectoryIndex { index, ntraj })
        }
    }

    /// Replace the Hamiltonian handle of trajectory `i`
    pub fn set_hamiltonian(&mut self, i: usize, ham: H) -> Result<()> {
        self.check_index(i)?;
        DynamicsError::check_dim("Hamiltonian states", self.nstates, ham.nstates())?;
        DynamicsError::check_dim("Hamiltonian dofs", self.ndof, ham.ndof())?;
        self.ham.set_child(i, ham)
    }

    /// Evaluate the diabatic model at the coordinates of trajectory `i`
    pub fn ham_compute_diabatic(&mut self, i: usize, model: &dyn DiabaticModel) -> Result<()> {
        self.check_index(i)?;
        let q: ArrayView1<f64> = self.mol[i].q.view();
        self.ham.child_mut(i)?.compute_diabatic(model, q)
    }

    pub fn ham_compute_adiabatic(&mut self, i: usize) -> Result<()> {
        self.ham.child_mut(i)?.compute_adiabatic()
    }

    /// Update the couplings and the vibronic Hamiltonian of trajectory `i` from its momenta
    pub fn ham_compute_couplings(&mut self, i: usize, rep: Representation) -> Result<()> {
        self.check_index(i)?;
        compute_couplings(self.ham.child_mut(i)?, &self.mol[i], rep)
    }

    /// Full evaluation of the handle of trajectory `i` at its current
    /// coordinates and momenta: both representations, couplings and Hvib.
    pub fn ham_compute(
        &mut self,
        i: usize,
        model: &dyn DiabaticModel,
        rep: Representation,
    ) -> Result<()> {
        self.check_index(i)?;
        evaluate(self.ham.child_mut(i)?, &self.mol[i], model, rep)
    }

    /// [Ensemble::ham_compute] for every active trajectory
    pub fn ham_compute_all(&mut self, model: &dyn DiabaticModel, rep: Representation) -> Result<()> {
        let mol: &[NuclearState] = &self.mol;
        let is_active: &[bool] = &self.is_active;
        self.ham
            .children_mut()
            .par_iter_mut()
            .enumerate()
            .filter(|(i, _)| is_active[*i])
            .try_for_each(|(i, ham)| evaluate(ham, &mol[i], model, rep))
    }

    /// [Ensemble::ham_compute_couplings] for every active trajectory
    pub fn ham_compute_couplings_all(&mut self, rep: Representation) -> Result<()> {
        let mol: &[NuclearState] = &self.mol;
        let is_active: &[bool] = &self.is_active;
        self.ham
            .children_mut()
            .par_iter_mut()
            .enumerate()
            .filter(|(i, _)| is_active[*i])
            .try_for_each(|(i, ham)| compute_couplings(ham, &mol[i], rep))
    }

    /// Element `(a, b)` of the electronic Hamiltonian of trajectory `i`
    pub fn ham_h(&self, i: usize, rep: Representation, a: usize, b: usize) -> Result<c64> {
        element(self.ham.child(i)?.get_ham(rep), a, b)
    }

    /// Element `(a, b)` of the gradient of the Hamiltonian along dof `n`
    pub fn ham_d1ham(
        &self,
        i: usize,
        rep: Representation,
        n: usize,
        a: usize,
        b: usize,
    ) -> Result<c64> {
        let d1ham = self.ham.child(i)?.get_d1ham(rep);
        if n >= d1ham.dim().0 {
            return Err(DynamicsError::DimensionMismatch {
                what: "dof index",
                expected: d1ham.dim().0,
                found: n,
            });
        }
        element(d1ham.index_axis(Axis(0), n), a, b)
    }

    pub fn ham_nac(&self, i: usize, rep: Representation, a: usize, b: usize) -> Result<c64> {
        element(self.ham.child(i)?.get_nac(rep), a, b)
    }

    pub fn ham_hvib(&self, i: usize, rep: Representation, a: usize, b: usize) -> Result<c64> {
        element(self.ham.child(i)?.get_hvib(rep), a, b)
    }

    /// Coordinates `[ndof, ntraj]`
    pub fn positions(&self) -> Array2<f64> {
        let mut q: Array2<f64> = Array2::zeros((self.ndof, self.ntraj()));
        for (mut column, state) in q.axis_iter_mut(Axis(1)).zip(self.mol.iter()) {
            column.assign(&state.q);
        }
        q
    }

    /// Momenta `[ndof, ntraj]`
    pub fn momenta(&self) -> Array2<f64> {
        let mut p: Array2<f64> = Array2::zeros((self.ndof, self.ntraj()));
        for (mut column, state) in p.axis_iter_mut(Axis(1)).zip(self.mol.iter()) {
            column.assign(&state.p);
        }
        p
    }

    /// Amplitudes `[nstates, ntraj]`
    pub fn amplitudes(&self) -> Array2<c64> {
        let mut c: Array2<c64> = Array2::zeros((self.nstates, self.ntraj()));
        for (mut column, state) in c.axis_iter_mut(Axis(1)).zip(self.el.iter()) {
            column.assign(&state.amplitudes);
        }
        c
    }

    /// Inverse masses shared by all trajectories
    pub fn inverse_masses(&self) -> Result<Array1<f64>> {
        let first: &NuclearState = match self.mol.first() {
            Some(state) => state,
            None => return Ok(Array1::zeros(self.ndof)),
        };
        for (i, state) in self.mol.iter().enumerate().skip(1) {
            if state.mass != first.mass {
                return Err(DynamicsError::InconsistentMasses(i));
            }
        }
        Ok(first.inverse_masses())
    }
}

fn compute_couplings<H: Hamiltonian + ?Sized>(
    ham: &mut H,
    mol: &NuclearState,
    rep: Representation,
) -> Result<()> {
    ham.compute_nac(rep, mol.p.view(), mol.inverse_masses().view())?;
    ham.compute_hvib(rep);
    Ok(())
}

fn evaluate<H: Hamiltonian + ?Sized>(
    ham: &mut H,
    mol: &NuclearState,
    model: &dyn DiabaticModel,
    rep: Representation,
) -> Result<()> {
    ham.compute_diabatic(model, mol.q.view())?;
    ham.compute_adiabatic()?;
    compute_couplings(ham, mol, rep)
}

fn element(mat: ArrayView2<c64>, a: usize, b: usize) -> Result<c64> {
    mat.get((a, b))
        .copied()
        .ok_or(DynamicsError::DimensionMismatch {
            what: "state index",
            expected: mat.nrows(),
            found: a.max(b),
        })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::interface::DiabaticData;

    pub(crate) fn tully_like(q: ArrayView1<f64>, out: &mut DiabaticData) -> Result<()> {
        let v11: f64 = 0.01 * q[0].signum() * (1.0 - (-1.6 * q[0].abs()).exp());
        out.ham[[0, 0]] = c64::from(v11);
        out.ham[[1, 1]] = c64::from(-v11);
        out.ham[[0, 1]] = c64::from(0.005 * (-q[0] * q[0]).exp());
        out.ham[[1, 0]] = out.ham[[0, 1]];
        out.d1ham[[0, 0, 0]] = c64::from(0.016 * (-1.6 * q[0].abs()).exp());
        out.d1ham[[0, 1, 1]] = -out.d1ham[[0, 0, 0]];
        out.d1ham[[0, 0, 1]] = c64::from(-0.01 * q[0] * (-q[0] * q[0]).exp());
        out.d1ham[[0, 1, 0]] = out.d1ham[[0, 0, 1]];
        Ok(())
    }

    pub(crate) fn small_ensemble(positions: &[f64]) -> Ensemble<VibronicHamiltonian> {
        let mol: Vec<NuclearState> = positions
            .iter()
            .map(|&q| NuclearState::new(array![q], array![10.0], array![2000.0]))
            .collect();
        Ensemble::from_nuclear_states(2, 0, mol).unwrap()
    }

    #[test]
    fn plumbing_evaluates_the_handle() {
        let mut ensemble = small_ensemble(&[-0.5, 0.5]);
        ensemble
            .ham_compute(1, &tully_like, Representation::Adiabatic)
            .unwrap();
        let h00: c64 = ensemble.ham_h(1, Representation::Diabatic, 0, 0).unwrap();
        assert!((h00.re - 0.01 * (1.0 - (-0.8f64).exp())).abs() < 1e-14);
        let e0: c64 = ensemble.ham_h(1, Representation::Adiabatic, 0, 0).unwrap();
        let e1: c64 = ensemble.ham_h(1, Representation::Adiabatic, 1, 1).unwrap();
        assert!(e0.re < e1.re);
        // Hvib = H - i NAC
        let nac: c64 = ensemble.ham_nac(1, Representation::Adiabatic, 0, 1).unwrap();
        let hvib: c64 = ensemble.ham_hvib(1, Representation::Adiabatic, 0, 1).unwrap();
        assert!((hvib + c64::i() * nac).norm() < 1e-14);
        assert!(ensemble
            .ham_d1ham(1, Representation::Diabatic, 0, 0, 1)
            .is_ok());
        assert!(matches!(
            ensemble.ham_h(1, Representation::Diabatic, 2, 0),
            Err(DynamicsError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            ensemble.ham_h(2, Representation::Diabatic, 0, 0),
            Err(DynamicsError::TrajectoryIndex { .. })
        ));
    }

    #[test]
    fn packed_arrays_follow_trajectory_order() {
        let ensemble = small_ensemble(&[-1.0, 0.0, 2.0]);
        assert_eq!(ensemble.positions(), array![[-1.0, 0.0, 2.0]]);
        assert_eq!(ensemble.momenta(), array![[10.0, 10.0, 10.0]]);
        let occupied: Array1<c64> = Array1::from_elem(3, c64::new(1.0, 0.0));
        assert_eq!(ensemble.amplitudes().row(0).to_owned(), occupied);
        assert_eq!(ensemble.inverse_masses().unwrap(), array![1.0 / 2000.0]);
    }

    #[test]
    fn inconsistent_construction_is_rejected() {
        let mol: Vec<NuclearState> = vec![NuclearState::new(array![0.0], array![0.0], array![1.0])];
        let result = Ensemble::new(
            2,
            1,
            vec![ElectronicState::new(3, 0)],
            mol.clone(),
            vec![VibronicHamiltonian::new(2, 1)],
        );
        assert!(matches!(
            result,
            Err(DynamicsError::DimensionMismatch { .. })
        ));
        let mut ensemble = small_ensemble(&[0.0, 1.0]);
        ensemble.mol[1].mass[0] = 1000.0;
        assert!(matches!(
            ensemble.inverse_masses(),
            Err(DynamicsError::InconsistentMasses(1))
        ));
        assert!(Ensemble::from_nuclear_states(2, 2, mol).is_err());
    }
}
