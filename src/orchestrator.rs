//! Experiment orchestrator.
//!
//! Coordinates the full flow: sweep generation, synthesis-tool runs per
//! topology file and algorithm, and aggregation into the results table.

use color_eyre::eyre::{eyre, Context, Result};
use log::{info, warn};
use std::fs;
use std::path::Path;

use crate::config::{ExperimentConfig, SynthesisConfig};
use crate::results::{aggregate, AggregateSummary, ResultsTable, TopologyUnit};
use crate::sweep::{self, scan_file_name, Manifest, SweepOutcome};
use crate::synthesis::ExternalTool;
use crate::topology::TopologyKind;
use crate::utils::{is_explicit_path, resolve_executable, validate_executable};

/// Counters over one full experiment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExperimentSummary {
    pub files_written: usize,
    pub tuples_skipped: usize,
    pub rows_recorded: usize,
    /// (file, algorithm) units that ended without a row
    pub units_without_row: usize,
}

/// Generate every topology of the configured sweep and its manifest.
pub fn generate_topologies(config: &ExperimentConfig) -> Result<SweepOutcome> {
    config.validate()?;
    sweep::run(
        config.sweep.topology,
        &config.sweep.parameters,
        &config.output.topology_dir,
        config.general.seed,
    )
}

/// Build the external tool from configuration.
///
/// A missing or non-executable explicit path is only warned about here:
/// every invocation reports it again and the sweep carries on.
pub fn build_tool(synthesis: &SynthesisConfig) -> Result<ExternalTool> {
    let executable = resolve_executable(&synthesis.executable)
        .wrap_err_with(|| format!("Cannot resolve executable '{}'", synthesis.executable))?;

    if is_explicit_path(&synthesis.executable) {
        if let Err(e) = validate_executable(&executable) {
            warn!("{} (every invocation will fail)", e);
        }
    }
    if let Some(timeout) = synthesis.timeout {
        info!("Synthesis invocations time out after {:?}", timeout);
    }

    Ok(ExternalTool::new(executable).with_timeout(synthesis.timeout))
}

fn units_from_manifest(dir: &Path, manifest: &Manifest) -> Vec<TopologyUnit> {
    manifest
        .sorted_entries()
        .into_iter()
        .filter_map(|entry| {
            let path = dir.join(&entry.file);
            if !path.exists() {
                warn!("Manifest lists '{}' but the file is missing, skipping", entry.file);
                return None;
            }
            Some(TopologyUnit {
                path,
                parameters: entry.params.column_values(),
            })
        })
        .collect()
}

fn units_from_file_names(dir: &Path, kind: TopologyKind) -> Result<Vec<TopologyUnit>> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .wrap_err_with(|| format!("Failed to read topology directory '{}'", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".csv"))
        .collect();
    names.sort();

    let mut units = Vec::with_capacity(names.len());
    for name in names {
        match scan_file_name(&name) {
            Some((found, parameters)) if found == kind => units.push(TopologyUnit {
                path: dir.join(&name),
                parameters,
            }),
            Some((found, _)) => {
                warn!("Skipping '{}': {} topology, expected {}", name, found, kind)
            }
            None => warn!("Skipping '{}': parameters cannot be read from the file name", name),
        }
    }
    Ok(units)
}

/// Topology files of a directory with their parameters.
///
/// The manifest is used when present; otherwise parameters are recovered
/// from file names, which requires `kind`.
pub fn discover_units(
    dir: &Path,
    kind: Option<TopologyKind>,
) -> Result<(TopologyKind, Vec<TopologyUnit>)> {
    if let Some(manifest) = Manifest::load(dir)? {
        if let Some(kind) = kind {
            if kind != manifest.topology {
                return Err(eyre!(
                    "'{}' holds {} topologies, not {}",
                    dir.display(),
                    manifest.topology,
                    kind
                ));
            }
        }
        info!("Using manifest of {} {} topologies", manifest.entries.len(), manifest.topology);
        return Ok((manifest.topology, units_from_manifest(dir, &manifest)));
    }

    let kind = kind.ok_or_else(|| {
        eyre!(
            "'{}' has no manifest; the topology kind must be given",
            dir.display()
        )
    })?;
    info!("No manifest in {:?}, reading parameters from file names", dir);
    Ok((kind, units_from_file_names(dir, kind)?))
}

/// Run the synthesis tool over an existing topology directory.
pub fn collect_results(
    topology_dir: &Path,
    kind: Option<TopologyKind>,
    synthesis: &SynthesisConfig,
    results_path: &Path,
) -> Result<AggregateSummary> {
    let (kind, units) = discover_units(topology_dir, kind)?;
    let tool = build_tool(synthesis)?;

    let mut table = ResultsTable::create(results_path, kind)?;
    info!("Results will be written to {:?}", results_path);
    aggregate(&tool, &synthesis.algorithms, &units, &mut table)
}

/// Generate the sweep, run every algorithm on every file, and write results.
pub fn run_experiment(config: &ExperimentConfig) -> Result<ExperimentSummary> {
    let synthesis = config.synthesis()?;
    let outcome = generate_topologies(config)?;

    let units = units_from_manifest(&config.output.topology_dir, &outcome.manifest);
    let tool = build_tool(synthesis)?;
    let mut table = ResultsTable::create(&config.output.results, config.sweep.topology)?;
    info!("Results will be written to {:?}", config.output.results);

    let aggregated = aggregate(&tool, &synthesis.algorithms, &units, &mut table)?;

    Ok(ExperimentSummary {
        files_written: outcome.written.len(),
        tuples_skipped: outcome.skipped,
        rows_recorded: aggregated.rows,
        units_without_row: aggregated.no_metric + aggregated.process_failures,
    })
}
