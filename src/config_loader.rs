use crate::config::ExperimentConfig;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::Path;

/// Load, parse and validate an experiment configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<ExperimentConfig> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration '{}'", config_path.display()))?;

    let config: ExperimentConfig = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration '{}'", config_path.display()))?;

    config.validate()?;

    info!(
        "Loaded {} sweep with parameters {:?}",
        config.sweep.topology,
        config.sweep.parameters.keys().collect::<Vec<_>>()
    );
    Ok(config)
}

/// Parse and validate an experiment configuration from YAML text
pub fn parse_config(yaml: &str) -> Result<ExperimentConfig> {
    let config: ExperimentConfig = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
}

/// Read `general.log_level` from a configuration file without validating it.
///
/// Used before logging is initialised; any problem yields `None`.
pub fn peek_log_level(config_path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(config_path).ok()?;
    let value: serde_yaml::Value = serde_yaml::from_str(&content).ok()?;
    value
        .get("general")?
        .get("log_level")?
        .as_str()
        .map(str::to_string)
}

/// CLI values that override a loaded configuration
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub seed: Option<u64>,
    pub executable: Option<String>,
    pub timeout: Option<std::time::Duration>,
    pub topology_dir: Option<std::path::PathBuf>,
    pub results: Option<std::path::PathBuf>,
}

/// Apply CLI overrides to a configuration and re-validate it
pub fn apply_overrides(config: &mut ExperimentConfig, overrides: &CliOverrides) -> Result<()> {
    if let Some(seed) = overrides.seed {
        info!("Overriding seed: {}", seed);
        config.general.seed = seed;
    }

    if let Some(executable) = &overrides.executable {
        info!("Overriding synthesis executable: {}", executable);
        match &mut config.synthesis {
            Some(synthesis) => synthesis.executable = executable.clone(),
            None => {
                config.synthesis = Some(crate::config::SynthesisConfig {
                    executable: executable.clone(),
                    timeout: None,
                    algorithms: crate::synthesis::default_algorithms(),
                })
            }
        }
    }

    if let Some(timeout) = overrides.timeout {
        match &mut config.synthesis {
            Some(synthesis) => synthesis.timeout = Some(timeout),
            None => log::warn!("Ignoring timeout override: no synthesis executable configured"),
        }
    }

    if let Some(dir) = &overrides.topology_dir {
        config.output.topology_dir = dir.clone();
    }
    if let Some(results) = &overrides.results {
        config.output.results = results.clone();
    }

    config.validate()?;
    Ok(())
}
