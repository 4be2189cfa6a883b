use crate::initialization::{DynamicConfiguration, PrintConfiguration};
use crate::output::StepRecord;
use log::{info, warn};

pub fn print_simulation_settings(config: &DynamicConfiguration) {
    info!("{:^80}", "");
    info!("{: ^80}", "Ehrenfest Dynamics");
    info!("{:-^80}", "");
    info!("{:<40} {:>20}", "number of steps:", config.nstep);
    info!("{:<40} {:>17.4} fs", "stepsize:", config.stepsize);
    info!("{:<40} {:>20}", "number of trajectories:", config.ntraj);
    info!("{:<40} {:>20}", "number of states:", config.nstates);
    info!("{:<40} {:>20}", "initial state:", config.initial_state);
    info!("{:<40} {:>20}", "representation:", format!("{:?}", config.representation));
    info!("{:<40} {:>20}", "integrator:", format!("{:?}", config.integrator));
    info!("{:<40} {:>20}", "electronic propagator:", format!("{:?}", config.propagation_method()));
    let corrections = config.corrections();
    info!("{:<40} {:>20}", "reordering of states:", corrections.do_reordering);
    info!("{:<40} {:>20}", "phase correction:", corrections.do_phase_correction);
    info!("{:<40} {:>20}", "assignment:", format!("{:?}", corrections.assignment));
    if let Some(window) = config.window() {
        info!(
            "{:<40} {:>6} [{:>8.3}, {:>8.3}]",
            "population window (dof, range):", window.dof, window.xmin, window.xmax
        );
    }
    info!("{:-^80}", "");
}

pub fn print_header_dynamics_step() {
    warn!("{:^90}", "");
    warn!("{: ^90}", "Ehrenfest Dynamics Step");
    warn!("{:-^90}", "");
}

pub fn print_footer_dynamics(timing: f64) {
    warn!("{:-<90} ", "");
    warn!("{:>78} {:>8.2} s", "Ehrenfest Dynamics Step finished in", timing);
}

pub fn print_step_data(record: &StepRecord, config: &PrintConfiguration) {
    warn!("{:<25} {:>10}", "Step:", record.step);
    warn!("{:<25} {:>14.4} fs", "Time:", record.time);
    if config.print_energies {
        warn!("{:<25} {:>18.10} Hartree", "Kinetic Energy:", record.kinetic_energy);
        warn!("{:<25} {:>18.10} Hartree", "Potential Energy:", record.potential_energy);
        warn!("{:<25} {:>18.10} Hartree", "Total Energy:", record.total_energy);
    }
    if config.print_populations {
        warn!("{:-^60}", " Populations ");
        warn!("{: <10} {: >20} {: >20}", "State", "mean-field", "discrete");
        for (i, (se, sh)) in record.se_pop.iter().zip(record.sh_pop.iter()).enumerate() {
            warn!("{: <10} {: >20.10} {: >20.10}", i, se, sh);
        }
    }
}
