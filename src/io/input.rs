use crate::io::Configuration;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Read the configuration file. If it does not exist, the default settings
/// are used and written to `config_file_path`, so that the user can see all
/// the options.
pub fn read_input(config_file_path: &Path) -> Result<Configuration> {
    let config_string: String = if config_file_path.exists() {
        fs::read_to_string(config_file_path)
            .with_context(|| format!("unable to read {}", config_file_path.display()))?
    } else {
        String::new()
    };
    let config: Configuration = toml::from_str(&config_string)
        .with_context(|| format!("unable to parse {}", config_file_path.display()))?;

    if !config_file_path.exists() {
        let config_string: String =
            toml::to_string(&config).context("unable to serialize the configuration")?;
        fs::write(config_file_path, config_string)
            .with_context(|| format!("unable to write {}", config_file_path.display()))?;
    }
    Ok(config)
}
