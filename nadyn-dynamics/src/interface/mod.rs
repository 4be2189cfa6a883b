use crate::c64;
use crate::error::Result;
pub use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

/// Electronic basis in which amplitudes, couplings and forces are expressed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    #[default]
    Diabatic,
    Adiabatic,
}

/// Buffers filled by a [DiabaticModel] at one nuclear geometry.
/// `d1ham` and `dc1` are indexed as `[dof, state, state]`.
#[derive(Clone, Debug)]
pub struct DiabaticData {
    pub ham: Array2<c64>,
    pub d1ham: Array3<c64>,
    pub dc1: Array3<c64>,
}

impl DiabaticData {
    pub fn new(nstates: usize, ndof: usize) -> Self {
        DiabaticData {
            ham: Array2::zeros((nstates, nstates)),
            d1ham: Array3::zeros((ndof, nstates, nstates)),
            dc1: Array3::zeros((ndof, nstates, nstates)),
        }
    }

    pub fn nstates(&self) -> usize {
        self.ham.nrows()
    }

    pub fn ndof(&self) -> usize {
        self.d1ham.dim().0
    }

    pub fn zero(&mut self) {
        self.ham.fill(c64::new(0.0, 0.0));
        self.d1ham.fill(c64::new(0.0, 0.0));
        self.dc1.fill(c64::new(0.0, 0.0));
    }
}

/// Trait that provides an interface for an external model of the diabatic
/// electronic Hamiltonian. The model writes the matrix elements, their
/// gradients and the diabatic derivative couplings at the geometry `q`
/// into the zeroed buffers of `out`.
pub trait DiabaticModel: Sync {
    fn compute(&self, q: ArrayView1<f64>, out: &mut DiabaticData) -> Result<()>;
}

impl<F> DiabaticModel for F
where
    F: Fn(ArrayView1<f64>, &mut DiabaticData) -> Result<()> + Sync,
{
    fn compute(&self, q: ArrayView1<f64>, out: &mut DiabaticData) -> Result<()> {
        self(q, out)
    }
}

/// Per-trajectory Hamiltonian handle. It caches the electronic quantities of
/// one trajectory in both representations. All mutation happens through
/// this trait, the representation is always passed explicitly.
pub trait Hamiltonian: Send + Sync {
    fn nstates(&self) -> usize;

    fn ndof(&self) -> usize;

    /// Evaluate the diabatic Hamiltonian, its gradients and the diabatic
    /// derivative couplings at `q`.
    fn compute_diabatic(&mut self, model: &dyn DiabaticModel, q: ArrayView1<f64>) -> Result<()>;

    /// Diagonalize the current diabatic Hamiltonian and transform the gradients
    /// and couplings to the adiabatic basis.
    fn compute_adiabatic(&mut self) -> Result<()>;

    fn compute_nac_dia(&mut self, p: ArrayView1<f64>, inv_m: ArrayView1<f64>) -> Result<()>;

    fn compute_nac_adi(&mut self, p: ArrayView1<f64>, inv_m: ArrayView1<f64>) -> Result<()>;

    fn compute_hvib_dia(&mut self);

    fn compute_hvib_adi(&mut self);

    /// Mean-field force `-<C|dH/dq_n|C> / <C|C>` for every nuclear dof.
    fn ehrenfest_forces_dia(&self, c: ArrayView1<c64>) -> Result<Array1<c64>>;

    fn ehrenfest_forces_adi(&self, c: ArrayView1<c64>) -> Result<Array1<c64>>;

    /// Diabatic-to-adiabatic transformation, columns are the adiabatic states.
    fn get_basis_transform(&self) -> ArrayView2<c64>;

    /// Relabel the adiabatic states: old state `i` becomes state `perm[i]`.
    fn update_ordering(&mut self, perm: &[usize]) -> Result<()>;

    /// Align the phases of the adiabatic states with `u_prev` and return the
    /// applied phase factors.
    fn update_phases(&mut self, u_prev: ArrayView2<c64>) -> Result<Array1<c64>>;

    fn get_ham(&self, rep: Representation) -> ArrayView2<c64>;

    fn get_d1ham(&self, rep: Representation) -> ArrayView3<c64>;

    fn get_nac(&self, rep: Representation) -> ArrayView2<c64>;

    fn get_hvib(&self, rep: Representation) -> ArrayView2<c64>;

    /// `ordering()[k]` is the current index of the adiabatic state that carried
    /// the label `k` when the handle was created.
    fn ordering(&self) -> &[usize];

    fn compute_nac(
        &mut self,
        rep: Representation,
        p: ArrayView1<f64>,
        inv_m: ArrayView1<f64>,
    ) -> Result<()> {
        match rep {
            Representation::Diabatic => self.compute_nac_dia(p, inv_m),
            Representation::Adiabatic => self.compute_nac_adi(p, inv_m),
        }
    }

    fn compute_hvib(&mut self, rep: Representation) {
        match rep {
            Representation::Diabatic => self.compute_hvib_dia(),
            Representation::Adiabatic => self.compute_hvib_adi(),
        }
    }

    fn ehrenfest_forces(&self, rep: Representation, c: ArrayView1<c64>) -> Result<Array1<c64>> {
        match rep {
            Representation::Diabatic => self.ehrenfest_forces_dia(c),
            Representation::Adiabatic => self.ehrenfest_forces_adi(c),
        }
    }
}
