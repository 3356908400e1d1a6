//! # Linksweep - Topology sweeps for collective synthesis experiments
//!
//! This library generates families of network topologies with degraded
//! links, runs an external collective synthesis tool against each one, and
//! aggregates the reported synthesis times into a results table.
//!
//! ## Overview
//!
//! An experiment sweeps the Cartesian product of a few topology parameters.
//! Every parameter tuple becomes one topology file. Each file is then handed
//! to the synthesis tool once per algorithm, and the best reported
//! "Synthesized Collective Time" lands in one results row.
//!
//! ## Key Features
//!
//! - **Topology Families**: Ring, outin, square grid and hierarchical pods
//! - **Bad-Link Sampling**: Uniform, seeded selection of degraded links
//! - **Reproducible**: Identical seed and parameters give identical files
//! - **Best-of-N Algorithms**: Repeated randomized runs reduced to their minimum
//! - **Resumable Collection**: A manifest records every generated tuple
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `config`: Experiment configuration structures and validation
//! - `config_loader`: YAML loading and command-line overrides
//! - `topology`: Link model, generators, bad-link sampling, file writer
//! - `sweep`: Parameter maps, sweep plans, file naming, manifest, driver
//! - `synthesis`: Algorithm catalogue, process invocation, metric extraction
//! - `results`: Results table and per-file aggregation
//! - `utils`: Executable resolution and duration parsing
//! - `orchestrator`: High-level generate, collect and run flows
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use linksweep::{config_loader, orchestrator};
//! use std::path::Path;
//!
//! // Load configuration from YAML file
//! let config = config_loader::load_config(Path::new("ring_sweep.yaml"))?;
//!
//! // Generate every topology, run every algorithm, write the results table
//! let summary = orchestrator::run_experiment(&config)?;
//! println!("{} rows recorded", summary.rows_recorded);
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Configuration Format
//!
//! ```yaml
//! general:
//!   seed: 42
//!
//! sweep:
//!   topology: ring            # ring / outin / grid / hierarchical
//!   world_size: [8, 16]
//!   bandwidth_ratio: [50]
//!   slow_link_proportion: [0.1, 0.25]
//!
//! synthesis:
//!   executable: "./tacos.sh"
//!   timeout: "30m"
//!
//! output:
//!   topology_dir: "topologies"
//!   results: "results.csv"
//! ```
//!
//! ## Error Handling
//!
//! Library entry points return `color_eyre::Result` with context attached.
//! Configuration problems abort a sweep before anything is written; problems
//! with a single parameter tuple or a single tool invocation are logged and
//! skipped.

pub mod config;
pub mod config_loader;
pub mod topology;
pub mod sweep;
pub mod synthesis;
pub mod results;
pub mod utils;
pub mod orchestrator;
