//! Sweep driver: one topology file per parameter tuple.

use color_eyre::eyre::{Context, Result};
use log::{error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};

use crate::sweep::manifest::{Manifest, ManifestEntry};
use crate::sweep::naming::topology_file_name;
use crate::sweep::params::ParameterMap;
use crate::sweep::plan::SweepPlan;
use crate::topology::{generate, write_topology, TopologyKind};

/// What a sweep produced
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    /// Written topology files, in product order
    pub written: Vec<PathBuf>,
    /// Tuples rejected by typing or generation
    pub skipped: usize,
    pub manifest: Manifest,
}

/// Validate `parameters` for `kind` and generate every tuple into `output_dir`.
///
/// A configuration error aborts before anything is written.
pub fn run(
    kind: TopologyKind,
    parameters: &ParameterMap,
    output_dir: &Path,
    seed: u64,
) -> Result<SweepOutcome> {
    let plan = SweepPlan::new(kind, parameters)
        .wrap_err_with(|| format!("Invalid {} sweep configuration", kind))?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut outcome = run_plan(&plan, output_dir, &mut rng)?;
    outcome.manifest.seed = seed;
    outcome.manifest.save(output_dir)?;
    Ok(outcome)
}

/// Generate every tuple of a validated plan, threading `rng` through in order.
///
/// Tuples that fail typing or generation are logged and skipped. The
/// returned manifest is not saved.
pub fn run_plan<R: Rng + ?Sized>(
    plan: &SweepPlan,
    output_dir: &Path,
    rng: &mut R,
) -> Result<SweepOutcome> {
    fs::create_dir_all(output_dir)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", output_dir.display()))?;
    info!(
        "Generating {} {} topologies in {:?}",
        plan.len(),
        plan.kind(),
        output_dir
    );

    let mut outcome = SweepOutcome {
        written: Vec::new(),
        skipped: 0,
        manifest: Manifest::new(plan.kind(), 0),
    };

    for tuple in plan.tuples() {
        let described = tuple
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        let params = match plan.typed(&tuple) {
            Ok(params) => params,
            Err(e) => {
                error!("Skipping tuple ({}): {}", described, e);
                outcome.skipped += 1;
                continue;
            }
        };
        let topology = match generate(&params, rng) {
            Ok(topology) => topology,
            Err(e) => {
                error!("Skipping tuple ({}): {}", described, e);
                outcome.skipped += 1;
                continue;
            }
        };

        let file_name = topology_file_name(&params);
        let path = output_dir.join(&file_name);
        write_topology(&topology, &path)?;
        info!(
            "Generated {} | nodes: {} | links: {} | slow links: {}",
            file_name,
            topology.node_count,
            topology.links.len(),
            topology.slow_link_count()
        );

        outcome.manifest.entries.push(ManifestEntry {
            file: file_name,
            params,
        });
        outcome.written.push(path);
    }

    info!(
        "Topology generation completed: {} written, {} skipped",
        outcome.written.len(),
        outcome.skipped
    );
    Ok(outcome)
}
