//! Validated sweep plan.
//!
//! Structural problems with a parameter map (unknown topology, missing or
//! inapplicable parameters, wrong tuple arity) are configuration errors and
//! reject the whole sweep. Value-level problems (a non-integer ratio, a
//! negative size) only invalidate the tuples that carry them.

use crate::sweep::params::{canonical_key, ParamValue, ParameterMap};
use crate::topology::{
    GenerationError, GridParams, HierarchicalParams, OutinParams, RingParams, TopologyKind,
    TopologyParams,
};

/// Configuration errors: fatal for the whole sweep, raised before any I/O
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown topology '{0}' (expected ring, outin, grid or hierarchical)")]
    UnknownTopology(String),

    #[error("unknown sweep parameter '{0}'")]
    UnknownParameter(String),

    #[error("parameter '{parameter}' does not apply to {kind} topologies")]
    InapplicableParameter {
        kind: TopologyKind,
        parameter: &'static str,
    },

    #[error("parameter '{parameter}' given more than once")]
    DuplicateParameter { parameter: &'static str },

    #[error("{kind} topology requires parameter '{parameter}'")]
    MissingParameter {
        kind: TopologyKind,
        parameter: &'static str,
    },

    #[error("parameter '{parameter}' has no candidate values")]
    EmptyParameter { parameter: &'static str },

    #[error("parameter '{parameter}' lists value '{value}' more than once")]
    DuplicateValue {
        parameter: &'static str,
        value: String,
    },

    #[error("parameter '{parameter}' of {kind} topology expects {expected} element(s), got '{found}'")]
    WrongArity {
        kind: TopologyKind,
        parameter: &'static str,
        expected: usize,
        found: String,
    },
}

/// Cartesian product of parameter lists for one topology kind
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPlan {
    kind: TopologyKind,
    /// One axis per canonical key, in the kind's key order
    axes: Vec<(&'static str, Vec<ParamValue>)>,
}

impl SweepPlan {
    /// Validate a parameter map against the parameter set of `kind`.
    pub fn new(kind: TopologyKind, parameters: &ParameterMap) -> Result<Self, ConfigError> {
        let keys = kind.parameter_keys();
        let mut canonical: Vec<(&'static str, &Vec<ParamValue>)> = Vec::new();

        for (name, values) in parameters {
            let key = canonical_key(name)
                .ok_or_else(|| ConfigError::UnknownParameter(name.clone()))?;
            if !keys.contains(&key) {
                return Err(ConfigError::InapplicableParameter {
                    kind,
                    parameter: key,
                });
            }
            if canonical.iter().any(|(k, _)| *k == key) {
                return Err(ConfigError::DuplicateParameter { parameter: key });
            }
            canonical.push((key, values));
        }

        let mut axes = Vec::with_capacity(keys.len());
        for &key in keys {
            let values = canonical
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| *v)
                .ok_or(ConfigError::MissingParameter {
                    kind,
                    parameter: key,
                })?;
            if values.is_empty() {
                return Err(ConfigError::EmptyParameter { parameter: key });
            }
            let expected = expected_arity(kind, key);
            let mut seen: Vec<String> = Vec::with_capacity(values.len());
            for value in values {
                // Values compare by their rendered form, which is what names the file
                let rendered = value.to_string();
                if seen.contains(&rendered) {
                    return Err(ConfigError::DuplicateValue {
                        parameter: key,
                        value: rendered,
                    });
                }
                seen.push(rendered);
                if arity(value) != expected {
                    return Err(ConfigError::WrongArity {
                        kind,
                        parameter: key,
                        expected,
                        found: value.to_string(),
                    });
                }
            }
            axes.push((key, values.clone()));
        }

        Ok(Self { kind, axes })
    }

    pub fn kind(&self) -> TopologyKind {
        self.kind
    }

    /// Number of parameter tuples in the product
    pub fn len(&self) -> usize {
        self.axes.iter().map(|(_, values)| values.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All parameter tuples, first key outermost and last key varying fastest
    pub fn tuples(&self) -> Vec<Vec<ParamValue>> {
        let mut tuples: Vec<Vec<ParamValue>> = vec![Vec::new()];
        for (_, values) in &self.axes {
            tuples = tuples
                .into_iter()
                .flat_map(|prefix| {
                    values.iter().map(move |value| {
                        let mut tuple = prefix.clone();
                        tuple.push(value.clone());
                        tuple
                    })
                })
                .collect();
        }
        tuples
    }

    /// Type one tuple into the kind's parameter record.
    pub fn typed(&self, tuple: &[ParamValue]) -> Result<TopologyParams, GenerationError> {
        match self.kind {
            TopologyKind::Ring => Ok(TopologyParams::Ring(RingParams {
                world_size: as_count("world_size", &tuple[0])?,
                bandwidth_ratio: as_ratio("bandwidth_ratio", &tuple[1])?,
                slow_link_proportion: as_number("slow_link_proportion", &tuple[2])?,
            })),
            TopologyKind::Grid => Ok(TopologyParams::Grid(GridParams {
                world_size: as_count("world_size", &tuple[0])?,
                bandwidth_ratio: as_ratio("bandwidth_ratio", &tuple[1])?,
                slow_link_proportion: as_number("slow_link_proportion", &tuple[2])?,
            })),
            TopologyKind::Outin => Ok(TopologyParams::Outin(OutinParams {
                world_size: as_count("world_size", &tuple[0])?,
                bandwidth_ratio: as_ratio("bandwidth_ratio", &tuple[1])?,
            })),
            TopologyKind::Hierarchical => {
                let sizes = tuple_items(&tuple[0]);
                let rates = tuple_items(&tuple[1]);
                Ok(TopologyParams::Hierarchical(HierarchicalParams {
                    layer_sizes: [
                        as_count("layer_sizes", &sizes[0])?,
                        as_count("layer_sizes", &sizes[1])?,
                    ],
                    bandwidth_ratio: [
                        as_number("bandwidth_ratio", &rates[0])?,
                        as_number("bandwidth_ratio", &rates[1])?,
                        as_number("bandwidth_ratio", &rates[2])?,
                    ],
                }))
            }
        }
    }
}

/// Element count a value must have for `key` under `kind`; scalars count as 1
fn expected_arity(kind: TopologyKind, key: &str) -> usize {
    match (kind, key) {
        (TopologyKind::Hierarchical, "layer_sizes") => 2,
        (TopologyKind::Hierarchical, "bandwidth_ratio") => 3,
        _ => 1,
    }
}

fn arity(value: &ParamValue) -> usize {
    match value {
        ParamValue::Tuple(items) if items.iter().all(|i| !matches!(i, ParamValue::Tuple(_))) => {
            items.len()
        }
        // Nested tuples never match any expected arity
        ParamValue::Tuple(_) => usize::MAX,
        _ => 1,
    }
}

fn tuple_items(value: &ParamValue) -> &[ParamValue] {
    match value {
        ParamValue::Tuple(items) => items,
        other => std::slice::from_ref(other),
    }
}

fn mismatch(parameter: &'static str, expected: &'static str, value: &ParamValue) -> GenerationError {
    GenerationError::TypeMismatch {
        parameter,
        expected,
        found: format!("{} {}", value.type_name(), value),
    }
}

fn as_count(parameter: &'static str, value: &ParamValue) -> Result<usize, GenerationError> {
    match value {
        ParamValue::Integer(i) if *i >= 0 => Ok(*i as usize),
        other => Err(mismatch(parameter, "a non-negative integer", other)),
    }
}

fn as_ratio(parameter: &'static str, value: &ParamValue) -> Result<u32, GenerationError> {
    match value {
        ParamValue::Integer(i) if *i >= 0 && *i <= i64::from(u32::MAX) => Ok(*i as u32),
        other => Err(mismatch(parameter, "a non-negative integer ratio", other)),
    }
}

fn as_number(parameter: &'static str, value: &ParamValue) -> Result<f64, GenerationError> {
    value
        .as_f64()
        .ok_or_else(|| mismatch(parameter, "a number", value))
}
