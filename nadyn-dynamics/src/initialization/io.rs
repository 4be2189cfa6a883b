use crate::defaults::*;
use crate::dynamics::{AssignmentPolicy, Corrections, PropagationMethod};
use crate::ensemble::{IntegratorKind, Window};
use crate::interface::Representation;
use serde::{Deserialize, Serialize};

fn default_nstep() -> usize {
    NSTEP
}
fn default_stepsize() -> f64 {
    STEPSIZE
}
fn default_ntraj() -> usize {
    NTRAJ
}
fn default_nstates() -> usize {
    NSTATES
}
fn default_initial_state() -> usize {
    INITIAL_STATE
}
fn default_do_reordering() -> bool {
    DO_REORDERING
}
fn default_do_phase_correction() -> bool {
    DO_PHASE_CORRECTION
}
fn default_rk_integration() -> bool {
    USE_RK_INTEGRATION
}
fn default_integration_steps() -> usize {
    INTEGRATION_STEPS
}
fn default_print_energies() -> bool {
    PRINT_ENERGIES
}
fn default_print_populations() -> bool {
    PRINT_POPULATIONS
}
fn default_print_interval() -> usize {
    PRINT_INTERVAL
}
fn default_use_window() -> bool {
    USE_WINDOW
}
fn default_window_dof() -> usize {
    WINDOW_DOF
}
fn default_window_xmin() -> f64 {
    WINDOW_XMIN
}
fn default_window_xmax() -> f64 {
    WINDOW_XMAX
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DynamicConfiguration {
    #[serde(default = "default_nstep")]
    pub nstep: usize,
    /// nuclear stepsize in fs
    #[serde(default = "default_stepsize")]
    pub stepsize: f64,
    #[serde(default = "default_ntraj")]
    pub ntraj: usize,
    #[serde(default = "default_nstates")]
    pub nstates: usize,
    #[serde(default = "default_initial_state")]
    pub initial_state: usize,
    #[serde(default)]
    pub representation: Representation,
    #[serde(default)]
    pub integrator: IntegratorKind,
    #[serde(default)]
    pub ehrenfest_config: EhrenfestConfiguration,
    #[serde(default)]
    pub population_window: WindowConfiguration,
    #[serde(default)]
    pub print_config: PrintConfiguration,
}

impl Default for DynamicConfiguration {
    fn default() -> Self {
        Self {
            nstep: default_nstep(),
            stepsize: default_stepsize(),
            ntraj: default_ntraj(),
            nstates: default_nstates(),
            initial_state: default_initial_state(),
            representation: Representation::default(),
            integrator: IntegratorKind::default(),
            ehrenfest_config: EhrenfestConfiguration::default(),
            population_window: WindowConfiguration::default(),
            print_config: PrintConfiguration::default(),
        }
    }
}

impl DynamicConfiguration {
    pub fn propagation_method(&self) -> PropagationMethod {
        PropagationMethod::new(
            self.ehrenfest_config.use_rk_integration,
            self.ehrenfest_config.integration_steps,
        )
    }

    pub fn corrections(&self) -> Corrections {
        Corrections {
            do_reordering: self.ehrenfest_config.do_reordering,
            do_phase_correction: self.ehrenfest_config.do_phase_correction,
            assignment: self.ehrenfest_config.assignment,
        }
    }

    /// Window of the population estimators, `None` if all trajectories count
    pub fn window(&self) -> Option<Window> {
        let config: &WindowConfiguration = &self.population_window;
        if config.use_window {
            Some(Window::new(config.dof, config.xmin, config.xmax))
        } else {
            None
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EhrenfestConfiguration {
    #[serde(default = "default_do_reordering")]
    pub do_reordering: bool,
    #[serde(default = "default_do_phase_correction")]
    pub do_phase_correction: bool,
    #[serde(default)]
    pub assignment: AssignmentPolicy,
    #[serde(default = "default_rk_integration")]
    pub use_rk_integration: bool,
    #[serde(default = "default_integration_steps")]
    pub integration_steps: usize,
}

impl Default for EhrenfestConfiguration {
    fn default() -> Self {
        Self {
            do_reordering: default_do_reordering(),
            do_phase_correction: default_do_phase_correction(),
            assignment: AssignmentPolicy::default(),
            use_rk_integration: default_rk_integration(),
            integration_steps: default_integration_steps(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WindowConfiguration {
    #[serde(default = "default_use_window")]
    pub use_window: bool,
    #[serde(default = "default_window_dof")]
    pub dof: usize,
    #[serde(default = "default_window_xmin")]
    pub xmin: f64,
    #[serde(default = "default_window_xmax")]
    pub xmax: f64,
}

impl Default for WindowConfiguration {
    fn default() -> Self {
        Self {
            use_window: default_use_window(),
            dof: default_window_dof(),
            xmin: default_window_xmin(),
            xmax: default_window_xmax(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PrintConfiguration {
    #[serde(default = "default_print_energies")]
    pub print_energies: bool,
    #[serde(default = "default_print_populations")]
    pub print_populations: bool,
    #[serde(default = "default_print_interval")]
    pub print_interval: usize,
}

impl Default for PrintConfiguration {
    fn default() -> Self {
        Self {
            print_energies: default_print_energies(),
            print_populations: default_print_populations(),
            print_interval: default_print_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_gives_defaults() {
        let config: DynamicConfiguration = toml::from_str("").unwrap();
        assert_eq!(config, DynamicConfiguration::default());
        assert_eq!(config.integrator, IntegratorKind::Ehrenfest2);
        assert_eq!(config.representation, Representation::Diabatic);
        assert_eq!(config.window(), None);
        assert_eq!(config.propagation_method(), PropagationMethod::Exponential);
    }

    #[test]
    fn nested_tables_are_parsed() {
        let input: &str = r#"
            nstep = 20
            representation = "adiabatic"
            integrator = "ehrenfest1"

            [ehrenfest_config]
            assignment = "optimal"
            use_rk_integration = true
            integration_steps = 10

            [population_window]
            use_window = true
            xmin = 5.0
        "#;
        let config: DynamicConfiguration = toml::from_str(input).unwrap();
        assert_eq!(config.nstep, 20);
        assert_eq!(config.representation, Representation::Adiabatic);
        assert_eq!(config.integrator, IntegratorKind::Ehrenfest1);
        assert_eq!(
            config.propagation_method(),
            PropagationMethod::RungeKutta { substeps: 10 }
        );
        let corrections: Corrections = config.corrections();
        assert_eq!(corrections.assignment, AssignmentPolicy::Optimal);
        assert!(corrections.do_reordering);
        assert_eq!(config.window(), Some(Window::new(0, 5.0, WINDOW_XMAX)));
        assert_eq!(config.print_config, PrintConfiguration::default());
    }
}
