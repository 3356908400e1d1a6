//! Parameter sweeps.
//!
//! Turns a loosely typed parameter map into a validated plan, generates one
//! topology file per parameter tuple, and records the tuples in a manifest.

pub mod params;
pub mod plan;
pub mod naming;
pub mod manifest;
pub mod driver;

pub use params::{canonical_key, ParamValue, ParameterMap};
pub use plan::{ConfigError, SweepPlan};
pub use naming::{scan_file_name, topology_file_name};
pub use manifest::{Manifest, ManifestEntry, MANIFEST_FILE_NAME};
pub use driver::{run, run_plan, SweepOutcome};
