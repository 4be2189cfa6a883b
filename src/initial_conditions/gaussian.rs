use crate::defaults::*;
use anyhow::{bail, Context, Result};
use nadyn_dynamics::ensemble::NuclearState;
use ndarray::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

fn default_positions() -> Vec<f64> {
    vec![INITIAL_POSITION]
}
fn default_momenta() -> Vec<f64> {
    vec![INITIAL_MOMENTUM]
}
fn default_position_widths() -> Vec<f64> {
    vec![POSITION_WIDTH]
}
fn default_momentum_widths() -> Vec<f64> {
    vec![MOMENTUM_WIDTH]
}
fn default_masses() -> Vec<f64> {
    vec![NUCLEAR_MASS]
}
fn default_seed() -> u64 {
    SEED
}

/// Centers and standard deviations of the nuclear distribution, one entry per dof
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct InitialConditionsConfig {
    #[serde(default = "default_positions")]
    pub positions: Vec<f64>,
    #[serde(default = "default_momenta")]
    pub momenta: Vec<f64>,
    #[serde(default = "default_position_widths")]
    pub position_widths: Vec<f64>,
    #[serde(default = "default_momentum_widths")]
    pub momentum_widths: Vec<f64>,
    #[serde(default = "default_masses")]
    pub masses: Vec<f64>,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for InitialConditionsConfig {
    fn default() -> Self {
        Self {
            positions: default_positions(),
            momenta: default_momenta(),
            position_widths: default_position_widths(),
            momentum_widths: default_momentum_widths(),
            masses: default_masses(),
            seed: default_seed(),
        }
    }
}

impl InitialConditionsConfig {
    pub fn ndof(&self) -> usize {
        self.positions.len()
    }
}

/// Independent Gaussian distributions of the positions and momenta of every
/// dof, sampled with a seeded generator
pub struct GaussianEnsemble<'a> {
    pub nsample: usize,
    pub ndof: usize,
    config: &'a InitialConditionsConfig,
}

impl<'a> GaussianEnsemble<'a> {
    pub fn new(config: &'a InitialConditionsConfig, nsample: usize) -> Result<GaussianEnsemble<'a>> {
        let ndof: usize = config.ndof();
        let lengths = [
            ("momenta", config.momenta.len()),
            ("position_widths", config.position_widths.len()),
            ("momentum_widths", config.momentum_widths.len()),
            ("masses", config.masses.len()),
        ];
        for (name, len) in lengths.iter() {
            if *len != ndof {
                bail!(
                    "initial_conditions.{} has {} entries, but {} positions are given",
                    name,
                    len,
                    ndof
                );
            }
        }
        if config.masses.iter().any(|&m| m <= 0.0) {
            bail!("all nuclear masses have to be positive");
        }
        Ok(GaussianEnsemble {
            nsample,
            ndof,
            config,
        })
    }

    fn distributions(centers: &[f64], widths: &[f64]) -> Result<Vec<Normal<f64>>> {
        centers
            .iter()
            .zip(widths.iter())
            .map(|(&mean, &width)| {
                Normal::new(mean, width).with_context(|| {
                    format!("invalid distribution with mean {} and width {}", mean, width)
                })
            })
            .collect()
    }

    pub fn get_ensemble(&self) -> Result<Vec<NuclearState>> {
        let dist_q: Vec<Normal<f64>> =
            Self::distributions(&self.config.positions, &self.config.position_widths)?;
        let dist_p: Vec<Normal<f64>> =
            Self::distributions(&self.config.momenta, &self.config.momentum_widths)?;
        let masses: Array1<f64> = Array1::from(self.config.masses.clone());
        let mut rng: StdRng = StdRng::seed_from_u64(self.config.seed);

        let states: Vec<NuclearState> = (0..self.nsample)
            .map(|_| {
                let q: Array1<f64> = dist_q.iter().map(|dist| dist.sample(&mut rng)).collect();
                let p: Array1<f64> = dist_p.iter().map(|dist| dist.sample(&mut rng)).collect();
                NuclearState::new(q, p, masses.clone())
            })
            .collect();
        Ok(states)
    }
}
