//! Loosely typed sweep parameters as supplied by a front end.
//!
//! A [`ParameterMap`] maps parameter names to candidate value lists. Names
//! are canonicalised (aliases and plural forms accepted) before the map is
//! turned into a [`SweepPlan`](crate::sweep::SweepPlan).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Parameter name to candidate values
pub type ParameterMap = BTreeMap<String, Vec<ParamValue>>;

/// A single candidate value of a sweep parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Integer(i64),
    Float(f64),
    Tuple(Vec<ParamValue>),
}

impl ParamValue {
    /// Short description used in type-mismatch errors
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Tuple(_) => "tuple",
        }
    }

    /// Numeric value of a scalar, if it is one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Tuple(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
            Self::Tuple(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join("x"))
            }
        }
    }
}

impl FromStr for ParamValue {
    type Err = String;

    /// Parse `50`, `0.25`, `100x50x25` or `100,50,25`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains(['x', ',']) {
            return s
                .split(['x', ','])
                .map(|part| part.parse::<ParamValue>())
                .collect::<Result<Vec<_>, _>>()
                .map(ParamValue::Tuple);
        }
        if let Ok(i) = s.parse::<i64>() {
            return Ok(Self::Integer(i));
        }
        s.parse::<f64>()
            .map(Self::Float)
            .map_err(|_| format!("Invalid parameter value: '{}'", s))
    }
}

/// Every parameter name the sweep understands
pub const KNOWN_PARAMETERS: [&str; 4] = [
    "world_size",
    "bandwidth_ratio",
    "slow_link_proportion",
    "layer_sizes",
];

/// Map a user-facing parameter name onto its canonical name.
///
/// Accepts the canonical names, their plurals, and the short forms
/// `gs`, `bm` and `bbp`.
pub fn canonical_key(name: &str) -> Option<&'static str> {
    match name.trim().to_lowercase().replace('-', "_").as_str() {
        "world_size" | "world_sizes" | "gs" => Some("world_size"),
        "bandwidth_ratio" | "bandwidth_ratios" | "bm" => Some("bandwidth_ratio"),
        "slow_link_proportion" | "slow_link_proportions" | "bbp" => Some("slow_link_proportion"),
        "layer_sizes" | "layer_size" => Some("layer_sizes"),
        _ => None,
    }
}
