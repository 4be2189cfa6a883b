use crate::c64;
use ndarray::prelude::*;

/// Electronic state of one trajectory: the amplitudes in the propagation
/// representation and the index of the discrete (active) state.
#[derive(Clone, Debug, PartialEq)]
pub struct ElectronicState {
    pub amplitudes: Array1<c64>,
    pub istate: usize,
}

impl ElectronicState {
    /// Amplitudes localized in `istate`
    pub fn new(nstates: usize, istate: usize) -> Self {
        let mut amplitudes: Array1<c64> = Array1::zeros(nstates);
        if let Some(val) = amplitudes.get_mut(istate) {
            *val = c64::new(1.0, 0.0);
        }
        ElectronicState { amplitudes, istate }
    }

    pub fn from_amplitudes(amplitudes: Array1<c64>, istate: usize) -> Self {
        ElectronicState { amplitudes, istate }
    }

    pub fn nstates(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn populations(&self) -> Array1<f64> {
        self.amplitudes.mapv(|val| val.norm_sqr())
    }
}

/// Classical nuclear degrees of freedom of one trajectory
#[derive(Clone, Debug, PartialEq)]
pub struct NuclearState {
    pub q: Array1<f64>,
    pub p: Array1<f64>,
    pub mass: Array1<f64>,
    // force acting on the nuclei
    pub f: Array1<f64>,
}

impl NuclearState {
    pub fn new(q: Array1<f64>, p: Array1<f64>, mass: Array1<f64>) -> Self {
        let f: Array1<f64> = Array1::zeros(q.len());
        NuclearState { q, p, mass, f }
    }

    pub fn ndof(&self) -> usize {
        self.q.len()
    }

    pub fn inverse_masses(&self) -> Array1<f64> {
        self.mass.mapv(|m| 1.0 / m)
    }

    /// `q += p / m dt`
    pub fn propagate_q(&mut self, dt: f64) {
        let velocities: Array1<f64> = &self.p / &self.mass;
        self.q.scaled_add(dt, &velocities);
    }

    /// `p += f dt`
    pub fn propagate_p(&mut self, dt: f64) {
        self.p.scaled_add(dt, &self.f);
    }
}
