use crate::defaults::CONFIG_FILE_NAME;
use crate::initial_conditions::GaussianEnsemble;
use crate::io::{read_input, write_footer, write_header, write_records, Configuration};
use crate::utils::Timer;
use anyhow::{bail, Result};
use clap::Parser;
use env_logger::Builder;
use log::{info, LevelFilter};
use nadyn_dynamics::ensemble::{Ensemble, NuclearState};
use nadyn_dynamics::initialization::Simulation;
use nadyn_dynamics::output::StepRecord;
use std::io::Write;
use std::path::{Path, PathBuf};

mod defaults;
mod initial_conditions;
mod io;
mod models;
mod utils;

/// Ehrenfest dynamics of trajectory ensembles on model Hamiltonians
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// configuration file, written with the default settings if it does not exist
    #[arg(default_value = CONFIG_FILE_NAME)]
    config: PathBuf,
}

fn main() -> Result<()> {
    let cli: Cli = Cli::parse();
    let config: Configuration = read_input(&cli.config)?;

    // Multithreading.
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.parallelization.number_of_cores)
        .build_global()?;

    // Logging.
    let log_level: LevelFilter = match config.verbose {
        2 => LevelFilter::Trace,
        1 => LevelFilter::Debug,
        0 => LevelFilter::Info,
        -1 => LevelFilter::Warn,
        -2 => LevelFilter::Error,
        _ => LevelFilter::Info,
    };
    Builder::new()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .filter(None, log_level)
        .init();

    write_header();
    let timer: Timer = Timer::start();

    let nstates: usize = config.model.nstates();
    if config.dynamics.nstates != nstates {
        bail!(
            "the model has {} states, but dynamics.nstates is {}",
            nstates,
            config.dynamics.nstates
        );
    }

    // Sample the nuclear initial conditions and set up the ensemble.
    let mol: Vec<NuclearState> =
        GaussianEnsemble::new(&config.initial_conditions, config.dynamics.ntraj)?.get_ensemble()?;
    let ensemble = Ensemble::from_nuclear_states(nstates, config.dynamics.initial_state, mol)?;

    let mut simulation = Simulation::new(config.dynamics.clone(), ensemble)?;
    let records: Vec<StepRecord> = simulation.run(config.model.as_model())?;

    if config.output.write_output {
        let path: &Path = Path::new(&config.output.output_file);
        write_records(path, &records)?;
        info!("{:<40} {:>38}", "averages written to:", path.display());
    }

    write_footer(timer);
    Ok(())
}
