//! Topology type definitions.
//!
//! This file contains the link record, the generated topology instance and
//! the per-kind parameter records for the supported topology families
//! (Ring, Grid, Outin, Hierarchical).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::sweep::ConfigError;

/// Latency assigned to every generated link, in nanoseconds
pub const LINK_LATENCY_NS: u64 = 500;

/// Bandwidth of a degraded ("bad") link, in GB/s
pub const SLOW_LINK_BANDWIDTH: f64 = 1.0;

/// A directed edge of a topology graph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub src: usize,
    pub dest: usize,
    /// Latency in nanoseconds
    pub latency: u64,
    /// Bandwidth in GB/s
    pub bandwidth: f64,
}

impl Link {
    /// Create a link with the fixed system latency
    pub fn new(src: usize, dest: usize, bandwidth: f64) -> Self {
        Self {
            src,
            dest,
            latency: LINK_LATENCY_NS,
            bandwidth,
        }
    }

    /// Returns true if this link carries the degraded bandwidth
    pub fn is_slow(&self) -> bool {
        self.bandwidth == SLOW_LINK_BANDWIDTH
    }
}

/// One generated topology: node count plus links in generation order
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyInstance {
    pub node_count: usize,
    pub links: Vec<Link>,
}

impl TopologyInstance {
    /// Number of links carrying the degraded bandwidth
    pub fn slow_link_count(&self) -> usize {
        self.links.iter().filter(|link| link.is_slow()).count()
    }
}

/// Topology families supported by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopologyKind {
    /// Bidirectional ring
    Ring,
    /// Ring-adjacent pairs fast, every other ordered pair slow
    Outin,
    /// Square mesh with right and bottom neighbours
    #[serde(alias = "mesh")]
    Grid,
    /// Root switch, pods, and fully meshed leaves per pod
    Hierarchical,
}

impl TopologyKind {
    /// Lowercase name used in configuration and file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ring => "ring",
            Self::Outin => "outin",
            Self::Grid => "grid",
            Self::Hierarchical => "hierarchical",
        }
    }

    /// Required sweep parameters in canonical key order.
    ///
    /// The order drives the Cartesian product, the file names and the
    /// leading columns of the results table.
    pub fn parameter_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Ring | Self::Grid => &["world_size", "bandwidth_ratio", "slow_link_proportion"],
            Self::Outin => &["world_size", "bandwidth_ratio"],
            Self::Hierarchical => &["layer_sizes", "bandwidth_ratio"],
        }
    }
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TopologyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ring" => Ok(Self::Ring),
            "outin" => Ok(Self::Outin),
            "grid" | "mesh" => Ok(Self::Grid),
            "hierarchical" => Ok(Self::Hierarchical),
            other => Err(ConfigError::UnknownTopology(other.to_string())),
        }
    }
}

/// Parameters of one ring instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingParams {
    pub world_size: usize,
    pub bandwidth_ratio: u32,
    pub slow_link_proportion: f64,
}

/// Parameters of one square-mesh instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridParams {
    pub world_size: usize,
    pub bandwidth_ratio: u32,
    pub slow_link_proportion: f64,
}

/// Parameters of one outin instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutinParams {
    pub world_size: usize,
    pub bandwidth_ratio: u32,
}

/// Parameters of one two-layer hierarchical instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchicalParams {
    /// `[pods, leaves per pod]`
    pub layer_sizes: [usize; 2],
    /// `[root-pod, pod-leaf, leaf-leaf]` rates in GB/s
    pub bandwidth_ratio: [f64; 3],
}

/// Fully typed parameter tuple for a single topology instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "topology", rename_all = "lowercase")]
pub enum TopologyParams {
    Ring(RingParams),
    Grid(GridParams),
    Outin(OutinParams),
    Hierarchical(HierarchicalParams),
}

impl TopologyParams {
    pub fn kind(&self) -> TopologyKind {
        match self {
            Self::Ring(_) => TopologyKind::Ring,
            Self::Grid(_) => TopologyKind::Grid,
            Self::Outin(_) => TopologyKind::Outin,
            Self::Hierarchical(_) => TopologyKind::Hierarchical,
        }
    }

    /// Parameter values rendered as text, in the kind's canonical key order
    pub fn column_values(&self) -> Vec<String> {
        match self {
            Self::Ring(p) => vec![
                p.world_size.to_string(),
                p.bandwidth_ratio.to_string(),
                p.slow_link_proportion.to_string(),
            ],
            Self::Grid(p) => vec![
                p.world_size.to_string(),
                p.bandwidth_ratio.to_string(),
                p.slow_link_proportion.to_string(),
            ],
            Self::Outin(p) => vec![p.world_size.to_string(), p.bandwidth_ratio.to_string()],
            Self::Hierarchical(p) => vec![
                join_tuple(p.layer_sizes.iter()),
                join_tuple(p.bandwidth_ratio.iter()),
            ],
        }
    }
}

/// Render a tuple value joined by `x`, e.g. `2x4`
pub(crate) fn join_tuple<T: ToString>(values: impl Iterator<Item = T>) -> String {
    values.map(|v| v.to_string()).collect::<Vec<_>>().join("x")
}
