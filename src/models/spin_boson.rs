use super::first_coordinate;
use crate::defaults::*;
use nadyn_dynamics::c64;
use nadyn_dynamics::interface::{DiabaticData, DiabaticModel};
use nadyn_dynamics::Result;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

fn default_mass() -> f64 {
    SPIN_BOSON_MASS
}
fn default_omega() -> f64 {
    SPIN_BOSON_OMEGA
}
fn default_shift() -> f64 {
    SPIN_BOSON_SHIFT
}
fn default_bias() -> f64 {
    SPIN_BOSON_BIAS
}
fn default_coupling() -> f64 {
    SPIN_BOSON_COUPLING
}

/// Two displaced harmonic wells of one mode with a constant diabatic coupling
///
/// V11 = m w^2 (x - x0)^2 / 2 + bias / 2, V22 = m w^2 (x + x0)^2 / 2 - bias / 2
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SpinBoson {
    #[serde(default = "default_mass")]
    pub mass: f64,
    #[serde(default = "default_omega")]
    pub omega: f64,
    #[serde(default = "default_shift")]
    pub shift: f64,
    #[serde(default = "default_bias")]
    pub bias: f64,
    #[serde(default = "default_coupling")]
    pub coupling: f64,
}

impl Default for SpinBoson {
    fn default() -> Self {
        Self {
            mass: default_mass(),
            omega: default_omega(),
            shift: default_shift(),
            bias: default_bias(),
            coupling: default_coupling(),
        }
    }
}

impl SpinBoson {
    fn force_constant(&self) -> f64 {
        self.mass * self.omega * self.omega
    }
}

impl DiabaticModel for SpinBoson {
    fn compute(&self, q: ArrayView1<f64>, out: &mut DiabaticData) -> Result<()> {
        let x: f64 = first_coordinate(q)?;
        let k: f64 = self.force_constant();
        let left: f64 = x - self.shift;
        let right: f64 = x + self.shift;

        out.ham[[0, 0]] = c64::new(0.5 * k * left * left + 0.5 * self.bias, 0.0);
        out.ham[[1, 1]] = c64::new(0.5 * k * right * right - 0.5 * self.bias, 0.0);
        out.ham[[0, 1]] = c64::new(self.coupling, 0.0);
        out.ham[[1, 0]] = c64::new(self.coupling, 0.0);

        out.d1ham[[0, 0, 0]] = c64::new(k * left, 0.0);
        out.d1ham[[0, 1, 1]] = c64::new(k * right, 0.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::check_gradients;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn wells_are_displaced_and_biased() {
        let model = SpinBoson::default();
        let mut out = DiabaticData::new(2, 1);
        model.compute(array![model.shift].view(), &mut out).unwrap();
        assert_abs_diff_eq!(out.ham[[0, 0]].re, 0.5 * model.bias, epsilon = 1e-14);
        assert_abs_diff_eq!(out.d1ham[[0, 0, 0]].re, 0.0, epsilon = 1e-14);
        model.compute(array![-model.shift].view(), &mut out).unwrap();
        assert_abs_diff_eq!(out.ham[[1, 1]].re, -0.5 * model.bias, epsilon = 1e-14);
    }

    #[test]
    fn gradients_match_finite_differences() {
        check_gradients(&SpinBoson::default(), &[-2.0, -0.3, 0.0, 0.8, 2.5]);
    }
}
