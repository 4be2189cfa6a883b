use crate::constants;
use crate::dynamics::StepParameters;
use crate::ensemble::{Ensemble, Window};
use crate::error::{DynamicsError, Result};
use crate::initialization::DynamicConfiguration;
use crate::interface::{DiabaticModel, Hamiltonian};
use crate::output::{
    print_footer_dynamics, print_header_dynamics_step, print_simulation_settings, print_step_data,
    StepRecord,
};
use log::debug;
use std::time::Instant;

/// Struct that holds the [DynamicConfiguration] together with the ensemble
/// of trajectories that is propagated
pub struct Simulation<H: Hamiltonian> {
    pub config: DynamicConfiguration,
    /// stepsize in atomic units
    pub stepsize: f64,
    pub actual_time: f64,
    pub ensemble: Ensemble<H>,
}

impl<H: Hamiltonian> Simulation<H> {
    pub fn new(config: DynamicConfiguration, ensemble: Ensemble<H>) -> Result<Simulation<H>> {
        DynamicsError::check_dim("number of states", config.nstates, ensemble.nstates())?;
        let stepsize: f64 = config.stepsize * constants::FS_TO_AU;
        Ok(Simulation {
            config,
            stepsize,
            actual_time: 0.0,
            ensemble,
        })
    }

    pub fn step_parameters(&self) -> StepParameters {
        StepParameters::new(self.stepsize, self.config.representation)
            .with_method(self.config.propagation_method())
    }

    /// Evaluate the Hamiltonian handles and the forces at the initial
    /// geometries and return the averages at t = 0
    pub fn initialize(&mut self, model: &dyn DiabaticModel) -> Result<StepRecord> {
        let rep = self.config.representation;
        self.ensemble.ham_compute_all(model, rep)?;
        self.ensemble.mol_update_forces_all(rep)?;
        self.actual_time = 0.0;
        self.record(0)
    }

    pub fn step(&mut self, model: &dyn DiabaticModel, step: usize) -> Result<StepRecord> {
        let params: StepParameters = self.step_parameters();
        self.ensemble.ehrenfest_step(
            model,
            &params,
            self.config.integrator,
            self.config.corrections(),
        )?;
        self.actual_time += self.stepsize;
        self.record(step)
    }

    pub fn record(&self, step: usize) -> Result<StepRecord> {
        let window: Option<Window> = self.config.window();
        let kinetic: f64 = self.ensemble.kinetic_energy();
        let potential: f64 = self.ensemble.potential_energy(self.config.representation)?;
        Ok(StepRecord::new(
            step,
            self.actual_time,
            kinetic,
            potential,
            self.ensemble.se_pop(window.as_ref())?.to_vec(),
            self.ensemble.sh_pop(window.as_ref())?.to_vec(),
        ))
    }

    /// Run `nstep` Ehrenfest steps and collect the averages of every step
    pub fn run(&mut self, model: &dyn DiabaticModel) -> Result<Vec<StepRecord>> {
        print_simulation_settings(&self.config);
        let interval: usize = self.config.print_config.print_interval.max(1);

        let mut records: Vec<StepRecord> = Vec::with_capacity(self.config.nstep + 1);
        let initial: StepRecord = self.initialize(model)?;
        print_step_data(&initial, &self.config.print_config);
        records.push(initial);

        for step in 1..=self.config.nstep {
            let timer: Instant = Instant::now();
            let record: StepRecord = self.step(model, step)?;
            if step % interval == 0 {
                print_header_dynamics_step();
                print_step_data(&record, &self.config.print_config);
                print_footer_dynamics(timer.elapsed().as_secs_f64());
            } else {
                debug!("step {} finished", step);
            }
            records.push(record);
        }
        Ok(records)
    }
}
