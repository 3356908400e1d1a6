//! Sidecar manifest mapping generated file names to their parameter tuples.

use color_eyre::eyre::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::Path;

use crate::topology::{TopologyKind, TopologyParams};

/// File name of the manifest inside a topology directory
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// One generated topology file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// File name relative to the manifest's directory
    pub file: String,
    pub params: TopologyParams,
}

/// Record of one sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub topology: TopologyKind,
    pub seed: u64,
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(topology: TopologyKind, seed: u64) -> Self {
        Self {
            topology,
            seed,
            entries: Vec::new(),
        }
    }

    /// Entries sorted by file name
    pub fn sorted_entries(&self) -> Vec<&ManifestEntry> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.file.cmp(&b.file));
        entries
    }

    /// Write the manifest into `dir`
    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = dir.join(MANIFEST_FILE_NAME);
        let file = File::create(&path)
            .wrap_err_with(|| format!("Failed to create manifest '{}'", path.display()))?;
        serde_json::to_writer_pretty(file, self)
            .wrap_err_with(|| format!("Failed to write manifest '{}'", path.display()))?;
        info!("Wrote manifest with {} entries to {:?}", self.entries.len(), path);
        Ok(())
    }

    /// Load the manifest from `dir`, or `None` if the directory has none
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(MANIFEST_FILE_NAME);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .wrap_err_with(|| format!("Failed to read manifest '{}'", path.display()))?;
        let manifest = serde_json::from_str(&content)
            .wrap_err_with(|| format!("Failed to parse manifest '{}'", path.display()))?;
        Ok(Some(manifest))
    }
}
