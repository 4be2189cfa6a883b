use super::first_coordinate;
use crate::defaults::*;
use nadyn_dynamics::c64;
use nadyn_dynamics::interface::{DiabaticData, DiabaticModel};
use nadyn_dynamics::Result;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

fn default_a() -> f64 {
    TULLY_A
}
fn default_b() -> f64 {
    TULLY_B
}
fn default_c() -> f64 {
    TULLY_C
}
fn default_d() -> f64 {
    TULLY_D
}

/// Simple avoided crossing of Tully, J. Chem. Phys. 93, 1061 (1990)
///
/// V11 = A (1 - exp(-B|x|)) sign(x), V22 = -V11, V12 = C exp(-D x^2)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TullySimpleAvoidedCrossing {
    #[serde(default = "default_a")]
    pub a: f64,
    #[serde(default = "default_b")]
    pub b: f64,
    #[serde(default = "default_c")]
    pub c: f64,
    #[serde(default = "default_d")]
    pub d: f64,
}

impl Default for TullySimpleAvoidedCrossing {
    fn default() -> Self {
        Self {
            a: default_a(),
            b: default_b(),
            c: default_c(),
            d: default_d(),
        }
    }
}

impl DiabaticModel for TullySimpleAvoidedCrossing {
    fn compute(&self, q: ArrayView1<f64>, out: &mut DiabaticData) -> Result<()> {
        let x: f64 = first_coordinate(q)?;
        let decay: f64 = (-self.b * x.abs()).exp();
        let gauss: f64 = (-self.d * x * x).exp();

        let v11: f64 = self.a * x.signum() * (1.0 - decay);
        let v12: f64 = self.c * gauss;
        out.ham[[0, 0]] = c64::new(v11, 0.0);
        out.ham[[1, 1]] = c64::new(-v11, 0.0);
        out.ham[[0, 1]] = c64::new(v12, 0.0);
        out.ham[[1, 0]] = c64::new(v12, 0.0);

        let dv11: f64 = self.a * self.b * decay;
        let dv12: f64 = -2.0 * self.c * self.d * x * gauss;
        out.d1ham[[0, 0, 0]] = c64::new(dv11, 0.0);
        out.d1ham[[0, 1, 1]] = c64::new(-dv11, 0.0);
        out.d1ham[[0, 0, 1]] = c64::new(dv12, 0.0);
        out.d1ham[[0, 1, 0]] = c64::new(dv12, 0.0);
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
    fn asymptotic_energies() {
        let model = TullySimpleAvoidedCrossing::default();
        let mut out = DiabaticData::new(2, 1);
        model.compute(array![-20.0].view(), &mut out).unwrap();
        assert_abs_diff_eq!(out.ham[[0, 0]].re, -TULLY_A, epsilon = 1e-12);
        assert_abs_diff_eq!(out.ham[[0, 1]].re, 0.0, epsilon = 1e-12);
        model.compute(array![0.0].view(), &mut out).unwrap();
        assert_abs_diff_eq!(out.ham[[0, 0]].re, 0.0);
        assert_abs_diff_eq!(out.ham[[0, 1]].re, TULLY_C);
    }

    #[test]
    fn gradients_match_finite_differences() {
        check_gradients(
            &TullySimpleAvoidedCrossing::default(),
            &[-3.0, -0.7, -0.1, 0.2, 1.5, 4.0],
        );
    }
}
