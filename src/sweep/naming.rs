//! Topology file names.
//!
//! A file name encodes the topology kind and every parameter value in key
//! order, e.g. `ring_ws8_bw50_slp0.25.csv` or `hierarchical_ls2x4_bw100x50x25.csv`.
//! The manifest is the primary record of parameters; [`scan_file_name`]
//! recovers them from names alone for directories that have no manifest.

use regex::Regex;
use std::sync::LazyLock;

use crate::topology::{TopologyKind, TopologyParams};

/// Extension of generated topology files
pub const TOPOLOGY_EXTENSION: &str = "csv";

/// Match one `<tag><value>` segment, value being numbers joined by `x`
static SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]+)(\d+(?:\.\d+)?(?:x\d+(?:\.\d+)?)*)$").expect("Invalid segment regex")
});

/// Short tag used for a canonical parameter key inside file names
pub fn key_tag(key: &str) -> &'static str {
    match key {
        "world_size" => "ws",
        "bandwidth_ratio" => "bw",
        "slow_link_proportion" => "slp",
        "layer_sizes" => "ls",
        _ => "p",
    }
}

/// Deterministic file name for one parameter tuple
pub fn topology_file_name(params: &TopologyParams) -> String {
    let kind = params.kind();
    let mut name = kind.as_str().to_string();
    for (key, value) in kind.parameter_keys().iter().zip(params.column_values()) {
        name.push('_');
        name.push_str(key_tag(key));
        name.push_str(&value);
    }
    name.push('.');
    name.push_str(TOPOLOGY_EXTENSION);
    name
}

/// Recover the kind and parameter values (as column text) from a file name.
///
/// Returns `None` when the name does not follow the encoding.
pub fn scan_file_name(file_name: &str) -> Option<(TopologyKind, Vec<String>)> {
    let stem = file_name.strip_suffix(&format!(".{}", TOPOLOGY_EXTENSION))?;
    let mut segments = stem.split('_');
    let kind: TopologyKind = segments.next()?.parse().ok()?;
    let keys = kind.parameter_keys();

    let mut values = Vec::with_capacity(keys.len());
    for key in keys {
        let caps = SEGMENT.captures(segments.next()?)?;
        if caps.get(1)?.as_str() != key_tag(key) {
            return None;
        }
        values.push(caps.get(2)?.as_str().to_string());
    }

    if segments.next().is_some() {
        return None;
    }
    Some((kind, values))
}
