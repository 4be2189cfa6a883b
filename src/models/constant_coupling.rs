use crate::defaults::*;
use nadyn_dynamics::c64;
use nadyn_dynamics::interface::{DiabaticData, DiabaticModel};
use nadyn_dynamics::Result;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

fn default_coupling() -> f64 {
    CONSTANT_COUPLING
}
fn default_detuning() -> f64 {
    CONSTANT_DETUNING
}

/// Two-level system with `H = [[eps, v], [v, -eps]]` at every geometry.
/// The nuclei feel no force, the populations oscillate with the Rabi
/// frequency `2 sqrt(eps^2 + v^2)`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ConstantCoupling {
    #[serde(default = "default_coupling")]
    pub v: f64,
    #[serde(default = "default_detuning")]
    pub eps: f64,
}

impl Default for ConstantCoupling {
    fn default() -> Self {
        Self {
            v: default_coupling(),
            eps: default_detuning(),
        }
    }
}

impl DiabaticModel for ConstantCoupling {
    fn compute(&self, _q: ArrayView1<f64>, out: &mut DiabaticData) -> Result<()> {
        out.ham[[0, 0]] = c64::new(self.eps, 0.0);
        out.ham[[1, 1]] = c64::new(-self.eps, 0.0);
        out.ham[[0, 1]] = c64::new(self.v, 0.0);
        out.ham[[1, 0]] = c64::new(self.v, 0.0);
        Ok(())
    }
}
