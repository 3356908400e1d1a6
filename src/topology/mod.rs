//! Network topology module.
//!
//! This module contains the link model, the per-family topology generators,
//! bad-link sampling and the topology file writer.

pub mod types;
pub mod generator;
pub mod sampling;
pub mod writer;

// Re-export key types and functions for easier access
pub use types::{
    GridParams, HierarchicalParams, Link, OutinParams, RingParams, TopologyInstance, TopologyKind,
    TopologyParams, LINK_LATENCY_NS, SLOW_LINK_BANDWIDTH,
};
pub use generator::{generate, GenerationError};
pub use writer::{render_topology, write_topology};
