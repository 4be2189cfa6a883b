use crate::constants;
use serde::{Deserialize, Serialize};

/// Ensemble averages of one nuclear step.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StepRecord {
    pub step: usize,
    /// time in fs
    pub time: f64,
    pub kinetic_energy: f64,
    pub potential_energy: f64,
    pub total_energy: f64,
    pub se_pop: Vec<f64>,
    pub sh_pop: Vec<f64>,
}

impl StepRecord {
    /// `time` is expected in atomic units
    pub fn new(
        step: usize,
        time: f64,
        kinetic_energy: f64,
        potential_energy: f64,
        se_pop: Vec<f64>,
        sh_pop: Vec<f64>,
    ) -> StepRecord {
        StepRecord {
            step,
            time: time * constants::AU_TO_FS,
            kinetic_energy,
            potential_energy,
            total_energy: kinetic_energy + potential_energy,
            se_pop,
            sh_pop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn record_converts_time_to_fs() {
        let record = StepRecord::new(3, constants::FS_TO_AU, 0.5, -0.25, vec![1.0], vec![1.0]);
        assert_abs_diff_eq!(record.time, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(record.total_energy, 0.25);
    }
}
