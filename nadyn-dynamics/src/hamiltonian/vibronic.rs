use crate::c64;
use crate::defaults::{MIN_ENERGY_GAP, PHASE_OVERLAP_THRESHOLD};
use crate::error::{DynamicsError, Result};
use crate::interface::{DiabaticData, DiabaticModel, Hamiltonian, Representation};
use crate::linalg::{dagger, expectation, fix_gauge, hermitian_eigh, norm_sqr, transform};
use log::trace;
use ndarray::prelude::*;
use ndarray::Zip;

/// Hamiltonian handle of a single trajectory. The diabatic quantities come from
/// an external [DiabaticModel], the adiabatic ones are obtained by diagonalization.
#[derive(Clone, Debug)]
pub struct VibronicHamiltonian {
    nstates: usize,
    ndof: usize,
    // diabatic Hamiltonian, gradients and derivative couplings
    diabatic: DiabaticData,
    // adiabatic energies on the diagonal
    ham_adi: Array2<c64>,
    d1ham_adi: Array3<c64>,
    dc1_adi: Array3<c64>,
    // columns: adiabatic states in the diabatic basis
    basis_transform: Array2<c64>,
    nac_dia: Array2<c64>,
    nac_adi: Array2<c64>,
    hvib_dia: Array2<c64>,
    hvib_adi: Array2<c64>,
    ordering: Vec<usize>,
}

/// Energy gap with its magnitude raised to at least `MIN_ENERGY_GAP`,
/// an exact zero (of either sign) becomes `+MIN_ENERGY_GAP`
fn bounded_gap(gap: f64) -> f64 {
    if gap == 0.0 {
        MIN_ENERGY_GAP
    } else if gap.abs() < MIN_ENERGY_GAP {
        MIN_ENERGY_GAP.copysign(gap)
    } else {
        gap
    }
}

impl VibronicHamiltonian {
    pub fn new(nstates: usize, ndof: usize) -> Self {
        let zeros_2d: Array2<c64> = Array2::zeros((nstates, nstates));
        let zeros_3d: Array3<c64> = Array3::zeros((ndof, nstates, nstates));
        VibronicHamiltonian {
            nstates,
            ndof,
            diabatic: DiabaticData::new(nstates, ndof),
            ham_adi: zeros_2d.clone(),
            d1ham_adi: zeros_3d.clone(),
            dc1_adi: zeros_3d,
            basis_transform: Array2::eye(nstates),
            nac_dia: zeros_2d.clone(),
            nac_adi: zeros_2d.clone(),
            hvib_dia: zeros_2d.clone(),
            hvib_adi: zeros_2d,
            ordering: (0..nstates).collect(),
        }
    }

    /// Diabatic derivative couplings `[dof, state, state]`
    pub fn dc1(&self, rep: Representation) -> ArrayView3<c64> {
        match rep {
            Representation::Diabatic => self.diabatic.dc1.view(),
            Representation::Adiabatic => self.dc1_adi.view(),
        }
    }

    fn check_shapes(&self, data: &DiabaticData) -> Result<()> {
        DynamicsError::check_dim("diabatic Hamiltonian rows", self.nstates, data.ham.nrows())?;
        DynamicsError::check_dim("diabatic Hamiltonian columns", self.nstates, data.ham.ncols())?;
        for arr in [&data.d1ham, &data.dc1] {
            let (ndof, rows, cols) = arr.dim();
            DynamicsError::check_dim("diabatic gradient dofs", self.ndof, ndof)?;
            DynamicsError::check_dim("diabatic gradient rows", self.nstates, rows)?;
            DynamicsError::check_dim("diabatic gradient columns", self.nstates, cols)?;
        }
        Ok(())
    }

    fn nac_from_couplings(
        &self,
        dc1: ArrayView3<c64>,
        p: ArrayView1<f64>,
        inv_m: ArrayView1<f64>,
    ) -> Result<Array2<c64>> {
        DynamicsError::check_dim("momenta", self.ndof, p.len())?;
        DynamicsError::check_dim("inverse masses", self.ndof, inv_m.len())?;
        let mut nac: Array2<c64> = Array2::zeros((self.nstates, self.nstates));
        for (n, dc1_n) in dc1.axis_iter(Axis(0)).enumerate() {
            nac.scaled_add(c64::from(p[n] * inv_m[n]), &dc1_n);
        }
        Ok(nac)
    }

    /// Mean-field force from the generalized gradient `d1ham + [dc1, H]`
    fn mean_field_forces(
        &self,
        ham: ArrayView2<c64>,
        d1ham: ArrayView3<c64>,
        dc1: ArrayView3<c64>,
        c: ArrayView1<c64>,
    ) -> Result<Array1<c64>> {
        DynamicsError::check_dim("electronic amplitudes", self.nstates, c.len())?;
        let norm: f64 = norm_sqr(c);
        if norm == 0.0 {
            return Err(DynamicsError::ZeroNorm);
        }
        let forces: Array1<c64> = d1ham
            .axis_iter(Axis(0))
            .zip(dc1.axis_iter(Axis(0)))
            .map(|(d1ham_n, dc1_n)| {
                let gradient: Array2<c64> = &d1ham_n + &dc1_n.dot(&ham) - ham.dot(&dc1_n);
                -expectation(gradient.view(), c) / norm
            })
            .collect();
        Ok(forces)
    }
}

impl Hamiltonian for VibronicHamiltonian {
    fn nstates(&self) -> usize {
        self.nstates
    }

    fn ndof(&self) -> usize {
        self.ndof
    }

    fn compute_diabatic(&mut self, model: &dyn DiabaticModel, q: ArrayView1<f64>) -> Result<()> {
        DynamicsError::check_dim("coordinates", self.ndof, q.len())?;
        self.diabatic.zero();
        model.compute(q, &mut self.diabatic)?;
        self.check_shapes(&self.diabatic)
    }

    fn compute_adiabatic(&mut self) -> Result<()> {
        let (energies, mut u): (Array1<f64>, Array2<c64>) =
            hermitian_eigh(self.diabatic.ham.view())?;
        fix_gauge(&mut u);

        self.ham_adi = Array2::from_diag(&energies.mapv(|val| c64::new(val, 0.0)));
        for n in 0..self.ndof {
            let grad: Array2<c64> =
                transform(u.view(), self.diabatic.d1ham.index_axis(Axis(0), n));
            let dc1_transformed: Array2<c64> =
                transform(u.view(), self.diabatic.dc1.index_axis(Axis(0), n));

            let mut d1ham_n = self.d1ham_adi.index_axis_mut(Axis(0), n);
            d1ham_n.fill(c64::new(0.0, 0.0));
            d1ham_n.diag_mut().assign(&grad.diag());

            // <i|dH/dq|j> / (E_j - E_i) with the gap bounded from below
            let mut dc1_n = self.dc1_adi.index_axis_mut(Axis(0), n);
            dc1_n.assign(&dc1_transformed);
            for i in 0..self.nstates {
                for j in 0..self.nstates {
                    if i == j {
                        continue;
                    }
                    dc1_n[[i, j]] += grad[[i, j]] / bounded_gap(energies[j] - energies[i]);
                }
            }
        }
        self.basis_transform = u;
        trace!("adiabatic energies: {}", energies);
        Ok(())
    }

    fn compute_nac_dia(&mut self, p: ArrayView1<f64>, inv_m: ArrayView1<f64>) -> Result<()> {
        self.nac_dia = self.nac_from_couplings(self.diabatic.dc1.view(), p, inv_m)?;
        Ok(())
    }

    fn compute_nac_adi(&mut self, p: ArrayView1<f64>, inv_m: ArrayView1<f64>) -> Result<()> {
        self.nac_adi = self.nac_from_couplings(self.dc1_adi.view(), p, inv_m)?;
        Ok(())
    }

    fn compute_hvib_dia(&mut self) {
        self.hvib_dia = &self.diabatic.ham - &self.nac_dia.mapv(|val| c64::i() * val);
    }

    fn compute_hvib_adi(&mut self) {
        self.hvib_adi = &self.ham_adi - &self.nac_adi.mapv(|val| c64::i() * val);
    }

    fn ehrenfest_forces_dia(&self, c: ArrayView1<c64>) -> Result<Array1<c64>> {
        self.mean_field_forces(
            self.diabatic.ham.view(),
            self.diabatic.d1ham.view(),
            self.diabatic.dc1.view(),
            c,
        )
    }

    fn ehrenfest_forces_adi(&self, c: ArrayView1<c64>) -> Result<Array1<c64>> {
        self.mean_field_forces(
            self.ham_adi.view(),
            self.d1ham_adi.view(),
            self.dc1_adi.view(),
            c,
        )
    }

    fn get_basis_transform(&self) -> ArrayView2<c64> {
        self.basis_transform.view()
    }

    fn update_ordering(&mut self, perm: &[usize]) -> Result<()> {
        validate_permutation(perm, self.nstates)?;
        // only the couplings of the previous geometry still carry the old labels
        for mat in [&mut self.nac_adi, &mut self.hvib_adi] {
            let old: Array2<c64> = mat.clone();
            for (i, &pi) in perm.iter().enumerate() {
                for (j, &pj) in perm.iter().enumerate() {
                    mat[[pi, pj]] = old[[i, j]];
                }
            }
        }
        self.ordering = self.ordering.iter().map(|&k| perm[k]).collect();
        Ok(())
    }

    fn update_phases(&mut self, u_prev: ArrayView2<c64>) -> Result<Array1<c64>> {
        DynamicsError::check_dim("previous basis rows", self.nstates, u_prev.nrows())?;
        DynamicsError::check_dim("previous basis columns", self.nstates, u_prev.ncols())?;

        let overlap: Array2<c64> = dagger(u_prev).dot(&self.basis_transform);
        let mut phases: Array1<c64> = Array1::ones(self.nstates);
        for (j, phase) in phases.iter_mut().enumerate() {
            let o_jj: c64 = overlap[[j, j]];
            if !o_jj.re.is_finite() || !o_jj.im.is_finite() {
                return Err(DynamicsError::Degeneracy(format!(
                    "overlap of state {} with the previous step is not finite",
                    j
                )));
            }
            if o_jj.norm() >= PHASE_OVERLAP_THRESHOLD {
                *phase = o_jj.conj() / o_jj.norm();
            }
        }

        Zip::from(self.basis_transform.columns_mut())
            .and(&phases)
            .for_each(|mut column, &phase| column.mapv_inplace(|val| val * phase));

        let correction: Array2<c64> =
            Array2::from_shape_fn((self.nstates, self.nstates), |(i, j)| {
                phases[i].conj() * phases[j]
            });
        for mut dc1_n in self.dc1_adi.axis_iter_mut(Axis(0)) {
            dc1_n *= &correction;
        }
        self.nac_adi *= &correction;
        self.hvib_adi *= &correction;
        Ok(phases)
    }

    fn get_ham(&self, rep: Representation) -> ArrayView2<c64> {
        match rep {
            Representation::Diabatic => self.diabatic.ham.view(),
            Representation::Adiabatic => self.ham_adi.view(),
        }
    }

    fn get_d1ham(&self, rep: Representation) -> ArrayView3<c64> {
        match rep {
            Representation::Diabatic => self.diabatic.d1ham.view(),
            Representation::Adiabatic => self.d1ham_adi.view(),
        }
    }

    fn get_nac(&self, rep: Representation) -> ArrayView2<c64> {
        match rep {
            Representation::Diabatic => self.nac_dia.view(),
            Representation::Adiabatic => self.nac_adi.view(),
        }
    }

    fn get_hvib(&self, rep: Representation) -> ArrayView2<c64> {
        match rep {
            Representation::Diabatic => self.hvib_dia.view(),
            Representation::Adiabatic => self.hvib_adi.view(),
        }
    }

    fn ordering(&self) -> &[usize] {
        &self.ordering
    }
}

/// Check that `perm` contains every index below `n` exactly once.
pub fn validate_permutation(perm: &[usize], n: usize) -> Result<()> {
    let mut seen: Vec<bool> = vec![false; n];
    if perm.len() != n {
        return Err(DynamicsError::InvalidPermutation(perm.to_vec()));
    }
    for &idx in perm {
        if idx >= n || seen[idx] {
            return Err(DynamicsError::InvalidPermutation(perm.to_vec()));
        }
        seen[idx] = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, AbsDiffEq};

    const EPSILON: f64 = 1e-10;

    #[test]
    fn vanishing_gaps_are_bounded_with_positive_sign_at_zero() {
        assert_eq!(bounded_gap(0.0), MIN_ENERGY_GAP);
        assert_eq!(bounded_gap(-0.0), MIN_ENERGY_GAP);
        assert_eq!(bounded_gap(-1e-14), -MIN_ENERGY_GAP);
        assert_eq!(bounded_gap(1e-14), MIN_ENERGY_GAP);
        assert_eq!(bounded_gap(-0.25), -0.25);
    }

    /// Two diabatic states with linear diagonal slopes and constant coupling
    struct LinearCrossing {
        slope: f64,
        coupling: f64,
    }

    impl DiabaticModel for LinearCrossing {
        fn compute(&self, q: ArrayView1<f64>, out: &mut DiabaticData) -> Result<()> {
            out.ham[[0, 0]] = c64::from(self.slope * q[0]);
            out.ham[[1, 1]] = c64::from(-self.slope * q[0]);
            out.ham[[0, 1]] = c64::from(self.coupling);
            out.ham[[1, 0]] = c64::from(self.coupling);
            out.d1ham[[0, 0, 0]] = c64::from(self.slope);
            out.d1ham[[0, 1, 1]] = c64::from(-self.slope);
            Ok(())
        }
    }

    struct FailingModel;

    impl DiabaticModel for FailingModel {
        fn compute(&self, _q: ArrayView1<f64>, _out: &mut DiabaticData) -> Result<()> {
            Err(DynamicsError::evaluation("backend unavailable"))
        }
    }

    fn evaluated(q: f64) -> VibronicHamiltonian {
        let model = LinearCrossing {
            slope: 0.01,
            coupling: 0.005,
        };
        let mut ham = VibronicHamiltonian::new(2, 1);
        ham.compute_diabatic(&model, array![q].view()).unwrap();
        ham.compute_adiabatic().unwrap();
        ham
    }

    #[test]
    fn adiabatic_energies_of_two_state_model() {
        let ham = evaluated(0.3);
        let h0: f64 = 0.01 * 0.3;
        let gap: f64 = (h0 * h0 + 0.005 * 0.005).sqrt();
        let h_adi = ham.get_ham(Representation::Adiabatic);
        assert_abs_diff_eq!(h_adi[[0, 0]].re, -gap, epsilon = EPSILON);
        assert_abs_diff_eq!(h_adi[[1, 1]].re, gap, epsilon = EPSILON);
        assert_abs_diff_eq!(h_adi[[0, 1]].norm(), 0.0, epsilon = EPSILON);
    }

    #[test]
    fn adiabatic_gradients_match_finite_differences() {
        let delta: f64 = 1e-5;
        let ham = evaluated(0.3);
        let plus = evaluated(0.3 + delta);
        let minus = evaluated(0.3 - delta);
        for k in 0..2 {
            let numerical: f64 = (plus.get_ham(Representation::Adiabatic)[[k, k]].re
                - minus.get_ham(Representation::Adiabatic)[[k, k]].re)
                / (2.0 * delta);
            let analytic: f64 = ham.get_d1ham(Representation::Adiabatic)[[0, k, k]].re;
            assert_abs_diff_eq!(numerical, analytic, epsilon = 1e-7);
        }
    }

    #[test]
    fn adiabatic_couplings_are_antihermitian() {
        let ham = evaluated(-0.2);
        let dc1 = ham.dc1(Representation::Adiabatic);
        let d01: c64 = dc1[[0, 0, 1]];
        let d10: c64 = dc1[[0, 1, 0]];
        assert!(d01.norm() > 0.0);
        assert!((d01 + d10.conj()).abs_diff_eq(&c64::new(0.0, 0.0), EPSILON));
    }

    #[test]
    fn forces_agree_between_representations() {
        let mut ham = evaluated(0.1);
        let c_dia: Array1<c64> = array![c64::new(0.6, 0.0), c64::new(0.0, 0.8)];
        // amplitudes in the adiabatic basis: U^† C
        let c_adi: Array1<c64> = dagger(ham.get_basis_transform()).dot(&c_dia);
        let f_dia = ham.ehrenfest_forces(Representation::Diabatic, c_dia.view()).unwrap();
        let f_adi = ham.ehrenfest_forces(Representation::Adiabatic, c_adi.view()).unwrap();
        assert_abs_diff_eq!(f_dia[0].re, f_adi[0].re, epsilon = 1e-9);

        ham.compute_nac(Representation::Adiabatic, array![1.0].view(), array![0.5].view())
            .unwrap();
        ham.compute_hvib(Representation::Adiabatic);
        let hvib = ham.get_hvib(Representation::Adiabatic);
        assert!(hvib.abs_diff_eq(&dagger(hvib.view()), EPSILON));
    }

    #[test]
    fn linear_slope_gives_constant_force() {
        let ham = evaluated(5.0);
        let c: Array1<c64> = array![c64::new(1.0, 0.0), c64::new(0.0, 0.0)];
        let forces = ham.ehrenfest_forces_dia(c.view()).unwrap();
        assert_abs_diff_eq!(forces[0].re, -0.01, epsilon = EPSILON);
    }

    #[test]
    fn zero_amplitudes_are_rejected() {
        let ham = evaluated(0.0);
        let c: Array1<c64> = Array1::zeros(2);
        assert!(matches!(
            ham.ehrenfest_forces_dia(c.view()),
            Err(DynamicsError::ZeroNorm)
        ));
    }

    #[test]
    fn evaluation_errors_are_propagated() {
        let mut ham = VibronicHamiltonian::new(2, 1);
        let result = ham.compute_diabatic(&FailingModel, array![0.0].view());
        assert!(matches!(result, Err(DynamicsError::Evaluation(_))));
    }

    #[test]
    fn wrong_coordinate_length_is_rejected() {
        let mut ham = VibronicHamiltonian::new(2, 1);
        let model = LinearCrossing {
            slope: 0.01,
            coupling: 0.005,
        };
        let result = ham.compute_diabatic(&model, array![0.0, 1.0].view());
        assert!(matches!(
            result,
            Err(DynamicsError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn phases_against_own_basis_are_unity() {
        let mut ham = evaluated(0.4);
        let u_prev: Array2<c64> = ham.get_basis_transform().to_owned();
        let phases = ham.update_phases(u_prev.view()).unwrap();
        assert!(phases.abs_diff_eq(&Array1::ones(2), EPSILON));
        assert!(ham.get_basis_transform().abs_diff_eq(&u_prev, EPSILON));
    }

    #[test]
    fn phases_undo_sign_flip() {
        let mut ham = evaluated(0.4);
        let mut u_prev: Array2<c64> = ham.get_basis_transform().to_owned();
        u_prev.column_mut(1).mapv_inplace(|val| -val);
        let phases = ham.update_phases(u_prev.view()).unwrap();
        assert!(phases[0].abs_diff_eq(&c64::new(1.0, 0.0), EPSILON));
        assert!(phases[1].abs_diff_eq(&c64::new(-1.0, 0.0), EPSILON));
        assert!(ham.get_basis_transform().abs_diff_eq(&u_prev, EPSILON));
    }

    #[test]
    fn ordering_is_composed() {
        let mut ham = VibronicHamiltonian::new(3, 1);
        ham.update_ordering(&[1, 2, 0]).unwrap();
        assert_eq!(ham.ordering(), &[1, 2, 0]);
        ham.update_ordering(&[1, 2, 0]).unwrap();
        assert_eq!(ham.ordering(), &[2, 0, 1]);
        assert!(matches!(
            ham.update_ordering(&[0, 0, 1]),
            Err(DynamicsError::InvalidPermutation(_))
        ));
    }
}
