use crate::c64;
use crate::error::{DynamicsError, Result};
use crate::interface::{DiabaticModel, Hamiltonian, Representation};
use ndarray::prelude::*;
use rayon::prelude::*;

/// Collection of per-trajectory Hamiltonian handles. The batched operations act
/// on arrays whose columns correspond to the trajectories and distribute the
/// work of the individual handles over the rayon thread pool.
#[derive(Clone, Debug)]
pub struct HamiltonianEnsemble<H: Hamiltonian> {
    children: Vec<H>,
}

impl<H: Hamiltonian> HamiltonianEnsemble<H> {
    pub fn new(children: Vec<H>) -> Self {
        HamiltonianEnsemble { children }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn children(&self) -> &[H] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [H] {
        &mut self.children
    }

    pub fn child(&self, index: usize) -> Result<&H> {
        let ntraj: usize = self.len();
        self.children
            .get(index)
            .ok_or(DynamicsError::TrajectoryIndex { index, ntraj })
    }

    pub fn child_mut(&mut self, index: usize) -> Result<&mut H> {
        let ntraj: usize = self.len();
        self.children
            .get_mut(index)
            .ok_or(DynamicsError::TrajectoryIndex { index, ntraj })
    }

    /// Replace the handle of trajectory `index`
    pub fn set_child(&mut self, index: usize, ham: H) -> Result<()> {
        *self.child_mut(index)? = ham;
        Ok(())
    }

    fn check_columns(&self, what: &'static str, ncols: usize) -> Result<()> {
        DynamicsError::check_dim(what, self.len(), ncols)
    }

    /// Evaluate the diabatic model for every trajectory, `q` is `[ndof, ntraj]`.
    pub fn compute_diabatic(&mut self, model: &dyn DiabaticModel, q: ArrayView2<f64>) -> Result<()> {
        self.check_columns("coordinate columns", q.ncols())?;
        self.children
            .par_iter_mut()
            .enumerate()
            .try_for_each(|(i, ham)| ham.compute_diabatic(model, q.column(i)))
    }

    pub fn compute_adiabatic(&mut self) -> Result<()> {
        self.children
            .par_iter_mut()
            .try_for_each(|ham| ham.compute_adiabatic())
    }

    pub fn compute_nac(
        &mut self,
        rep: Representation,
        p: ArrayView2<f64>,
        inv_m: ArrayView1<f64>,
    ) -> Result<()> {
        self.check_columns("momentum columns", p.ncols())?;
        self.children
            .par_iter_mut()
            .enumerate()
            .try_for_each(|(i, ham)| ham.compute_nac(rep, p.column(i), inv_m))
    }

    pub fn compute_hvib(&mut self, rep: Representation) {
        self.children
            .par_iter_mut()
            .for_each(|ham| ham.compute_hvib(rep));
    }

    /// Mean-field forces `[ndof, ntraj]` for the amplitudes `c` (`[nstates, ntraj]`).
    pub fn ehrenfest_forces(&self, rep: Representation, c: ArrayView2<c64>) -> Result<Array2<c64>> {
        self.check_columns("amplitude columns", c.ncols())?;
        let ndof: usize = self.children.first().map_or(0, |ham| ham.ndof());
        let columns: Vec<Array1<c64>> = self
            .children
            .par_iter()
            .enumerate()
            .map(|(i, ham)| ham.ehrenfest_forces(rep, c.column(i)))
            .collect::<Result<Vec<Array1<c64>>>>()?;

        let mut forces: Array2<c64> = Array2::zeros((ndof, self.len()));
        for (mut column, force) in forces.axis_iter_mut(Axis(1)).zip(columns.iter()) {
            DynamicsError::check_dim("force components", ndof, force.len())?;
            column.assign(force);
        }
        Ok(forces)
    }

    /// Snapshot of the basis transforms of all trajectories
    pub fn basis_transforms(&self) -> Vec<Array2<c64>> {
        self.children
            .iter()
            .map(|ham| ham.get_basis_transform().to_owned())
            .collect()
    }
}
