use clap::{Args as ClapArgs, Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::path::PathBuf;
use std::time::Duration;

use linksweep::config::{ExperimentConfig, GeneralConfig, OutputConfig, SweepConfig, SynthesisConfig};
use linksweep::config_loader::{self, CliOverrides};
use linksweep::orchestrator;
use linksweep::sweep::{canonical_key, ParamValue, ParameterMap};
use linksweep::synthesis::default_algorithms;
use linksweep::topology::TopologyKind;
use linksweep::utils::parse_duration;

/// Topology sweeps with degraded links for collective synthesis experiments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate topology files only
    Generate {
        #[command(flatten)]
        sweep: SweepArgs,
    },
    /// Generate topology files, run every algorithm, write the results table
    Run {
        #[command(flatten)]
        sweep: SweepArgs,

        #[command(flatten)]
        synthesis: SynthesisArgs,
    },
    /// Run every algorithm over an existing topology directory
    Collect {
        /// Directory holding previously generated topology files
        #[arg(short = 'd', long)]
        topology_dir: PathBuf,

        /// Topology kind, needed when the directory has no manifest
        #[arg(long)]
        topology: Option<TopologyKind>,

        /// Configuration file providing the synthesis section
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        synthesis: SynthesisArgs,
    },
}

#[derive(ClapArgs, Debug, Default)]
struct SweepArgs {
    /// Path to the experiment configuration YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Topology kind (ring, outin, grid, hierarchical)
    #[arg(long)]
    topology: Option<TopologyKind>,

    /// World sizes to sweep
    #[arg(long, num_args = 1.., value_name = "N")]
    world_size: Vec<ParamValue>,

    /// Fast-to-slow bandwidth ratios; hierarchical takes AxBxC tuples
    #[arg(long, num_args = 1.., value_name = "RATIO")]
    bandwidth_ratio: Vec<ParamValue>,

    /// Fractions of directed links to degrade
    #[arg(long, num_args = 1.., value_name = "P")]
    slow_link_proportion: Vec<ParamValue>,

    /// Pod and leaf counts as PODSxLEAVES
    #[arg(long, num_args = 1.., value_name = "PxL")]
    layer_sizes: Vec<ParamValue>,

    /// Seed for bad-link sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory for topology files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Default)]
struct SynthesisArgs {
    /// Synthesis tool executable (name on PATH or path)
    #[arg(long)]
    executable: Option<String>,

    /// Per-invocation timeout, e.g. "90s" or "30m"
    #[arg(long, value_parser = parse_duration)]
    timeout: Option<Duration>,

    /// Output path of the results table
    #[arg(short, long)]
    results: Option<PathBuf>,
}

impl SweepArgs {
    /// Parameter lists given on the command line, keyed canonically
    fn parameters(&self) -> ParameterMap {
        let mut parameters = ParameterMap::new();
        for (key, values) in [
            ("world_size", &self.world_size),
            ("bandwidth_ratio", &self.bandwidth_ratio),
            ("slow_link_proportion", &self.slow_link_proportion),
            ("layer_sizes", &self.layer_sizes),
        ] {
            if !values.is_empty() {
                parameters.insert(key.to_string(), values.clone());
            }
        }
        parameters
    }

    fn config_path(&self) -> Option<&PathBuf> {
        self.config.as_ref()
    }
}

/// Build the experiment configuration from a YAML file and/or flags.
///
/// Flags replace the matching values of the file.
fn build_config(sweep: &SweepArgs, synthesis: Option<&SynthesisArgs>) -> Result<ExperimentConfig> {
    let cli_parameters = sweep.parameters();

    let mut config = match &sweep.config {
        Some(path) => {
            let mut config = config_loader::load_config(path)?;
            if let Some(topology) = sweep.topology {
                if topology != config.sweep.topology {
                    warn!(
                        "Overriding topology {} with {}",
                        config.sweep.topology, topology
                    );
                    config.sweep.topology = topology;
                }
            }
            for (key, values) in cli_parameters {
                config
                    .sweep
                    .parameters
                    .retain(|existing, _| canonical_key(existing) != Some(key.as_str()));
                info!("Overriding {} from the command line", key);
                config.sweep.parameters.insert(key, values);
            }
            config
        }
        None => {
            let topology = sweep
                .topology
                .ok_or_else(|| eyre!("--topology is required when no --config is given"))?;
            ExperimentConfig {
                general: GeneralConfig::default(),
                sweep: SweepConfig {
                    topology,
                    parameters: cli_parameters,
                },
                synthesis: None,
                output: OutputConfig::default(),
            }
        }
    };

    let overrides = CliOverrides {
        seed: sweep.seed,
        executable: synthesis.and_then(|s| s.executable.clone()),
        timeout: synthesis.and_then(|s| s.timeout),
        topology_dir: sweep.output_dir.clone(),
        results: synthesis.and_then(|s| s.results.clone()),
    };
    config_loader::apply_overrides(&mut config, &overrides)?;
    Ok(config)
}

/// Synthesis settings and results path for collect mode
fn collect_settings(
    config_path: Option<&PathBuf>,
    synthesis: &SynthesisArgs,
) -> Result<(SynthesisConfig, PathBuf)> {
    let (mut settings, mut results) = match config_path {
        Some(path) => {
            let config = config_loader::load_config(path)?;
            let settings = match (config.synthesis, &synthesis.executable) {
                (Some(settings), _) => settings,
                (None, Some(executable)) => SynthesisConfig {
                    executable: executable.clone(),
                    timeout: None,
                    algorithms: default_algorithms(),
                },
                (None, None) => {
                    return Err(eyre!(
                        "'{}' has no synthesis section and no --executable was given",
                        path.display()
                    ))
                }
            };
            (settings, config.output.results)
        }
        None => {
            let executable = synthesis
                .executable
                .clone()
                .ok_or_else(|| eyre!("--executable is required when no --config is given"))?;
            let settings = SynthesisConfig {
                executable,
                timeout: None,
                algorithms: default_algorithms(),
            };
            (settings, OutputConfig::default().results)
        }
    };

    if let Some(executable) = &synthesis.executable {
        settings.executable = executable.clone();
    }
    if let Some(timeout) = synthesis.timeout {
        settings.timeout = Some(timeout);
    }
    if let Some(path) = &synthesis.results {
        results = path.clone();
    }
    settings.validate()?;
    Ok((settings, results))
}

fn log_level(args: &Args) -> String {
    let config_path = match &args.command {
        Command::Generate { sweep } | Command::Run { sweep, .. } => sweep.config_path(),
        Command::Collect { config, .. } => config.as_ref(),
    };
    args.log_level
        .clone()
        .or_else(|| config_path.and_then(|path| config_loader::peek_log_level(path)))
        .unwrap_or_else(|| "info".to_string())
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    let level = log_level(&args);
    env_logger::Builder::from_env(Env::default().default_filter_or(level.as_str())).init();

    info!("Starting linksweep v{}", env!("CARGO_PKG_VERSION"));

    match &args.command {
        Command::Generate { sweep } => {
            let config = build_config(sweep, None)?;
            info!("Output directory: {:?}", config.output.topology_dir);

            let outcome = orchestrator::generate_topologies(&config)
                .wrap_err("Topology generation failed")?;
            info!(
                "Generated {} topology files ({} tuples skipped)",
                outcome.written.len(),
                outcome.skipped
            );
        }
        Command::Run { sweep, synthesis } => {
            let config = build_config(sweep, Some(synthesis))?;
            info!("Output directory: {:?}", config.output.topology_dir);

            let summary = orchestrator::run_experiment(&config).wrap_err("Experiment failed")?;
            info!(
                "Generated {} topology files ({} tuples skipped)",
                summary.files_written, summary.tuples_skipped
            );
            info!(
                "Recorded {} rows in {:?} ({} runs without a result)",
                summary.rows_recorded, config.output.results, summary.units_without_row
            );
        }
        Command::Collect {
            topology_dir,
            topology,
            config,
            synthesis,
        } => {
            let (settings, results) = collect_settings(config.as_ref(), synthesis)?;
            let summary =
                orchestrator::collect_results(topology_dir, *topology, &settings, &results)
                    .wrap_err("Result collection failed")?;
            info!(
                "Recorded {} rows from {} files in {:?} ({} without a metric, {} process failures)",
                summary.rows, summary.files, results, summary.no_metric, summary.process_failures
            );
        }
    }

    info!("Done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from([
            "linksweep",
            "generate",
            "--topology",
            "ring",
            "--world-size",
            "4",
            "8",
            "--bandwidth-ratio",
            "50",
            "--slow-link-proportion",
            "0.1",
        ]);

        let Command::Generate { sweep } = args.command else {
            panic!("expected generate subcommand");
        };
        assert_eq!(sweep.topology, Some(TopologyKind::Ring));
        assert_eq!(
            sweep.world_size,
            vec![ParamValue::Integer(4), ParamValue::Integer(8)]
        );
        assert_eq!(sweep.slow_link_proportion, vec![ParamValue::Float(0.1)]);
        assert!(args.log_level.is_none());
    }

    #[test]
    fn test_run_args() {
        let args = Args::parse_from([
            "linksweep",
            "run",
            "--topology",
            "hierarchical",
            "--layer-sizes",
            "2x4",
            "--bandwidth-ratio",
            "100x50x25",
            "--executable",
            "./tacos.sh",
            "--timeout",
            "10m",
            "--log-level",
            "debug",
        ]);

        assert_eq!(args.log_level.as_deref(), Some("debug"));
        let Command::Run { sweep, synthesis } = args.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(sweep.layer_sizes.len(), 1);
        assert_eq!(synthesis.timeout, Some(Duration::from_secs(600)));

        let config = build_config(&sweep, Some(&synthesis)).unwrap();
        assert_eq!(config.sweep.topology, TopologyKind::Hierarchical);
        assert_eq!(config.synthesis.unwrap().executable, "./tacos.sh");
    }

    #[test]
    fn test_timeout_flag_uses_config_grammar() {
        let args = Args::parse_from([
            "linksweep",
            "collect",
            "--topology-dir",
            "topologies",
            "--executable",
            "tacos",
            "--timeout",
            "1h30m",
        ]);
        let Command::Collect { synthesis, .. } = args.command else {
            panic!("expected collect subcommand");
        };
        assert_eq!(synthesis.timeout, Some(Duration::from_secs(5400)));
    }

    #[test]
    fn test_build_config_requires_topology() {
        let sweep = SweepArgs::default();
        assert!(build_config(&sweep, None).is_err());
    }

    #[test]
    fn test_flags_override_config_aliases() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(
            temp_file,
            "sweep:\n  topology: ring\n  gs: [4]\n  bm: [50]\n  bbp: [0.5]\n"
        )
        .unwrap();

        let sweep = SweepArgs {
            config: Some(temp_file.path().to_path_buf()),
            world_size: vec![ParamValue::Integer(6), ParamValue::Integer(8)],
            seed: Some(3),
            ..Default::default()
        };
        let config = build_config(&sweep, None).unwrap();
        assert!(!config.sweep.parameters.contains_key("gs"));
        assert_eq!(config.sweep.plan().unwrap().len(), 2);
        assert_eq!(config.general.seed, 3);
    }

    #[test]
    fn test_collect_requires_executable() {
        assert!(collect_settings(None, &SynthesisArgs::default()).is_err());

        let synthesis = SynthesisArgs {
            executable: Some("tacos".to_string()),
            ..Default::default()
        };
        let (settings, results) = collect_settings(None, &synthesis).unwrap();
        assert_eq!(settings.algorithms.len(), 3);
        assert_eq!(results, PathBuf::from("results.csv"));
    }
}
