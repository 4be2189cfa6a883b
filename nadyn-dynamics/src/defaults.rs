// number of nuclear steps
pub const NSTEP: usize = 1000;
// nuclear stepsize in fs
pub const STEPSIZE: f64 = 0.1;
// number of trajectories in the ensemble
pub const NTRAJ: usize = 1;
// number of electronic states
pub const NSTATES: usize = 2;
// initial electronic state
pub const INITIAL_STATE: usize = 0;
// Follow the identity of the adiabatic states through avoided crossings.
// Only takes effect for the adiabatic representation and the integrator ehrenfest2.
pub const DO_REORDERING: bool = true;
// Align the phases of the adiabatic states between two nuclear steps.
pub const DO_PHASE_CORRECTION: bool = true;
// integrate the electronic equation with RK4 instead of the matrix exponential
pub const USE_RK_INTEGRATION: bool = false;
// number of RK4 substeps per electronic half step
pub const INTEGRATION_STEPS: usize = 100;
pub const PRINT_ENERGIES: bool = true;
pub const PRINT_POPULATIONS: bool = true;
// print every n-th step
pub const PRINT_INTERVAL: usize = 1;
// restrict the population estimators to a spatial window
pub const USE_WINDOW: bool = false;
// dof and limits of the spatial window
pub const WINDOW_DOF: usize = 0;
pub const WINDOW_XMIN: f64 = -1.0e6;
pub const WINDOW_XMAX: f64 = 1.0e6;

// lower bound of the energy gap in the adiabatic derivative couplings (hartree)
pub const MIN_ENERGY_GAP: f64 = 1.0e-10;
// overlaps smaller than this leave the phase of a state unchanged
pub const PHASE_OVERLAP_THRESHOLD: f64 = 1.0e-12;
// scaling of the squared overlaps to integer weights for the optimal assignment
pub const ASSIGNMENT_WEIGHT_SCALE: f64 = 1.0e9;
// convergence settings of the Hermitian eigensolver
pub const EIGEN_EPS: f64 = f64::EPSILON;
pub const EIGEN_MAX_ITER: usize = 100_000;
