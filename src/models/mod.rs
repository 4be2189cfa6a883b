mod constant_coupling;
mod spin_boson;
mod tully;

pub use constant_coupling::ConstantCoupling;
pub use spin_boson::SpinBoson;
pub use tully::TullySimpleAvoidedCrossing;

use nadyn_dynamics::interface::DiabaticModel;
use nadyn_dynamics::DynamicsError;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Model Hamiltonian of the `[model]` table, selected by its `kind`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelConfig {
    ConstantCoupling(ConstantCoupling),
    Tully(TullySimpleAvoidedCrossing),
    SpinBoson(SpinBoson),
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig::Tully(TullySimpleAvoidedCrossing::default())
    }
}

impl ModelConfig {
    /// All models are two-state models
    pub fn nstates(&self) -> usize {
        2
    }

    pub fn as_model(&self) -> &dyn DiabaticModel {
        match self {
            ModelConfig::ConstantCoupling(model) => model,
            ModelConfig::Tully(model) => model,
            ModelConfig::SpinBoson(model) => model,
        }
    }
}

/// Reaction coordinate of the one-dimensional models
fn first_coordinate(q: ArrayView1<f64>) -> Result<f64, DynamicsError> {
    q.first().copied().ok_or(DynamicsError::DimensionMismatch {
        what: "model coordinates",
        expected: 1,
        found: 0,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use nadyn_dynamics::c64;
    use nadyn_dynamics::interface::DiabaticData;
    use ndarray::prelude::*;

    /// Compare the analytic gradient of every matrix element with central
    /// differences of the Hamiltonian
    pub(crate) fn check_gradients(model: &dyn DiabaticModel, positions: &[f64]) {
        let h: f64 = 1e-5;
        let mut out = DiabaticData::new(2, 1);
        let mut plus = DiabaticData::new(2, 1);
        let mut minus = DiabaticData::new(2, 1);
        for &x in positions.iter() {
            model.compute(array![x].view(), &mut out).unwrap();
            model.compute(array![x + h].view(), &mut plus).unwrap();
            model.compute(array![x - h].view(), &mut minus).unwrap();
            let numerical: Array2<c64> = (&plus.ham - &minus.ham) / c64::new(2.0 * h, 0.0);
            for (a, b) in numerical.iter().zip(out.d1ham.index_axis(Axis(0), 0).iter()) {
                assert!(
                    (a - b).norm() < 1e-8,
                    "gradient at x = {} differs: {} vs {}",
                    x,
                    a,
                    b
                );
            }
            assert_eq!(out.ham[[0, 1]], out.ham[[1, 0]].conj());
        }
    }

    #[test]
    fn model_is_selected_by_kind() {
        let config: ModelConfig = toml::from_str("kind = \"spin_boson\"\ncoupling = 0.1").unwrap();
        match config {
            ModelConfig::SpinBoson(model) => assert_eq!(model.coupling, 0.1),
            _ => panic!("wrong model {:?}", config),
        }
        let default: ModelConfig = toml::from_str("kind = \"tully\"").unwrap();
        assert_eq!(default, ModelConfig::default());
    }

    #[test]
    fn empty_coordinates_are_rejected() {
        let mut out = DiabaticData::new(2, 0);
        let q: Array1<f64> = Array1::zeros(0);
        assert!(ModelConfig::default().as_model().compute(q.view(), &mut out).is_err());
    }
}
