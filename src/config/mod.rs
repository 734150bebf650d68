pub mod builder;
pub mod defaults;
pub mod merge;
pub mod types;


pub use builder::ConfigBuilder;
pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Read a config file. A missing file is the same as an empty one.
pub fn load_config(config_file: &str) -> Result<ConfigInput> {
    if !Path::new(config_file).exists() {
        return Ok(ConfigInput::default());
    }

    let contents = std::fs::read_to_string(config_file)
        .with_context(|| format!("Failed to read config file {}", config_file))?;
    let config_input = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", config_file))?;

    Ok(config_input)
}
