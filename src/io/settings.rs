use crate::defaults::*;
use crate::initial_conditions::InitialConditionsConfig;
use crate::models::ModelConfig;
use nadyn_dynamics::initialization::DynamicConfiguration;
use serde::{Deserialize, Serialize};

fn default_verbose() -> i8 {
    VERBOSE
}
fn default_number_of_cores() -> usize {
    NUMBER_OF_CORES
}
fn default_write_output() -> bool {
    WRITE_OUTPUT
}
fn default_output_file() -> String {
    String::from(OUTPUT_FILE_NAME)
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Configuration {
    #[serde(default = "default_verbose")]
    pub verbose: i8,
    #[serde(default)]
    pub parallelization: ParallelizationConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub initial_conditions: InitialConditionsConfig,
    #[serde(default)]
    pub dynamics: DynamicConfiguration,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            verbose: default_verbose(),
            parallelization: ParallelizationConfig::default(),
            model: ModelConfig::default(),
            initial_conditions: InitialConditionsConfig::default(),
            dynamics: DynamicConfiguration::default(),
            output: OutputConfig::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ParallelizationConfig {
    #[serde(default = "default_number_of_cores")]
    pub number_of_cores: usize,
}

impl Default for ParallelizationConfig {
    fn default() -> Self {
        Self {
            number_of_cores: default_number_of_cores(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_write_output")]
    pub write_output: bool,
    #[serde(default = "default_output_file")]
    pub output_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            write_output: default_write_output(),
            output_file: default_output_file(),
        }
    }
}
