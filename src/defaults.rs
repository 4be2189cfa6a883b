// config file that is read, or written with the default settings if it is missing
pub const CONFIG_FILE_NAME: &str = "nadyn.toml";
pub const VERBOSE: i8 = 0;
pub const NUMBER_OF_CORES: usize = 1;

// MODELS
// Tully's simple avoided crossing in atomic units
pub const TULLY_A: f64 = 0.01;
pub const TULLY_B: f64 = 1.6;
pub const TULLY_C: f64 = 0.005;
pub const TULLY_D: f64 = 1.0;
// two-level system with constant coupling
pub const CONSTANT_COUPLING: f64 = 0.01;
pub const CONSTANT_DETUNING: f64 = 0.0;
// spin-boson type model with a single mode
pub const SPIN_BOSON_MASS: f64 = 2000.0;
pub const SPIN_BOSON_OMEGA: f64 = 2.0e-4;
pub const SPIN_BOSON_SHIFT: f64 = 2.0;
pub const SPIN_BOSON_BIAS: f64 = 0.0;
pub const SPIN_BOSON_COUPLING: f64 = 1.0e-4;

// INITIAL CONDITIONS
// centers and widths of the Gaussian distributions of q and p for every dof
pub const INITIAL_POSITION: f64 = -10.0;
pub const INITIAL_MOMENTUM: f64 = 20.0;
pub const POSITION_WIDTH: f64 = 0.5;
pub const MOMENTUM_WIDTH: f64 = 1.0;
// nuclear mass in atomic units
pub const NUCLEAR_MASS: f64 = 2000.0;
pub const SEED: u64 = 42;

// OUTPUT
pub const WRITE_OUTPUT: bool = true;
pub const OUTPUT_FILE_NAME: &str = "nadyn_output.json";
