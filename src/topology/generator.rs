//! Link-list construction for each topology family.
//!
//! Every generator builds the complete directed edge set in a fixed order.
//! Ring and Grid then degrade a sampled subset of that set to the slow rate
//! using the caller's random source; Outin and Hierarchical are
//! deterministic.

use log::{debug, warn};
use rand::Rng;

use crate::topology::sampling::degrade_links;
use crate::topology::types::{
    GridParams, HierarchicalParams, Link, OutinParams, RingParams, TopologyInstance, TopologyKind,
    TopologyParams, SLOW_LINK_BANDWIDTH,
};

/// Errors that invalidate a single parameter tuple.
///
/// These never abort a sweep; the offending tuple is logged and skipped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("{kind} topology needs at least {minimum} nodes, got world_size {world_size}")]
    TooFewNodes {
        kind: TopologyKind,
        world_size: usize,
        minimum: usize,
    },

    #[error("hierarchical layer {layer} must not be empty")]
    EmptyLayer { layer: usize },

    #[error("slow link proportion {proportion} is not a finite non-negative number")]
    InvalidProportion { proportion: f64 },

    #[error("requested {requested} slow links but only {available} links exist")]
    TooManySlowLinks { requested: usize, available: usize },

    #[error("bandwidth must be positive, got {value}")]
    NonPositiveBandwidth { value: f64 },

    #[error("parameter '{parameter}' expects {expected}, got {found}")]
    TypeMismatch {
        parameter: &'static str,
        expected: &'static str,
        found: String,
    },
}

/// Generate one topology instance from a typed parameter tuple.
pub fn generate<R: Rng + ?Sized>(
    params: &TopologyParams,
    rng: &mut R,
) -> Result<TopologyInstance, GenerationError> {
    match params {
        TopologyParams::Ring(p) => generate_ring(p, rng),
        TopologyParams::Grid(p) => generate_grid(p, rng),
        TopologyParams::Outin(p) => generate_outin(p),
        TopologyParams::Hierarchical(p) => generate_hierarchical(p),
    }
}

fn check_bandwidth(value: f64) -> Result<(), GenerationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GenerationError::NonPositiveBandwidth { value })
    }
}

/// Bidirectional ring: `(i, i+1)` and `(i+1, i)` for every node, `2n` links.
pub fn generate_ring<R: Rng + ?Sized>(
    params: &RingParams,
    rng: &mut R,
) -> Result<TopologyInstance, GenerationError> {
    let n = params.world_size;
    if n < 2 {
        return Err(GenerationError::TooFewNodes {
            kind: TopologyKind::Ring,
            world_size: n,
            minimum: 2,
        });
    }
    let good = f64::from(params.bandwidth_ratio);
    check_bandwidth(good)?;

    let mut links = Vec::with_capacity(2 * n);
    for i in 0..n {
        let next = (i + 1) % n;
        links.push(Link::new(i, next, good));
        links.push(Link::new(next, i, good));
    }

    let degraded = degrade_links(&mut links, params.slow_link_proportion, rng)?;
    debug!("Ring of {} nodes: {} links, {} degraded", n, links.len(), degraded);

    Ok(TopologyInstance {
        node_count: n,
        links,
    })
}

/// Square mesh of side `floor(sqrt(world_size))`, `4 * side * (side - 1)` links.
pub fn generate_grid<R: Rng + ?Sized>(
    params: &GridParams,
    rng: &mut R,
) -> Result<TopologyInstance, GenerationError> {
    let side = params.world_size.isqrt();
    if side < 2 {
        return Err(GenerationError::TooFewNodes {
            kind: TopologyKind::Grid,
            world_size: params.world_size,
            minimum: 4,
        });
    }
    if side * side != params.world_size {
        warn!(
            "world_size {} is not a perfect square, using a {}x{} grid of {} nodes",
            params.world_size,
            side,
            side,
            side * side
        );
    }
    let good = f64::from(params.bandwidth_ratio);
    check_bandwidth(good)?;

    let mut links = Vec::with_capacity(4 * side * (side - 1));
    for i in 0..side {
        for j in 0..side {
            let id = i * side + j;
            if j < side - 1 {
                links.push(Link::new(id, id + 1, good));
                links.push(Link::new(id + 1, id, good));
            }
            if i < side - 1 {
                links.push(Link::new(id, id + side, good));
                links.push(Link::new(id + side, id, good));
            }
        }
    }

    let degraded = degrade_links(&mut links, params.slow_link_proportion, rng)?;
    debug!("Grid {}x{}: {} links, {} degraded", side, side, links.len(), degraded);

    Ok(TopologyInstance {
        node_count: side * side,
        links,
    })
}

/// Every ordered pair: ring neighbours are fast, all other pairs slow.
pub fn generate_outin(params: &OutinParams) -> Result<TopologyInstance, GenerationError> {
    let n = params.world_size;
    if n < 2 {
        return Err(GenerationError::TooFewNodes {
            kind: TopologyKind::Outin,
            world_size: n,
            minimum: 2,
        });
    }
    let fast = f64::from(params.bandwidth_ratio);
    check_bandwidth(fast)?;

    let mut links = Vec::with_capacity(n * (n - 1));
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let adjacent = i.abs_diff(j) == 1 || i.abs_diff(j) == n - 1;
            let bandwidth = if adjacent { fast } else { SLOW_LINK_BANDWIDTH };
            links.push(Link::new(i, j, bandwidth));
        }
    }

    Ok(TopologyInstance {
        node_count: n,
        links,
    })
}

/// Root switch (node 0) to pods, pods to their leaves, leaves meshed per pod.
///
/// Pods are numbered `1..=pods`; leaves of pod `p` (0-based) follow as
/// `1 + pods + p * leaves + k`.
pub fn generate_hierarchical(
    params: &HierarchicalParams,
) -> Result<TopologyInstance, GenerationError> {
    let [pods, leaves] = params.layer_sizes;
    for (layer, size) in params.layer_sizes.iter().enumerate() {
        if *size == 0 {
            return Err(GenerationError::EmptyLayer { layer });
        }
    }
    for rate in params.bandwidth_ratio {
        check_bandwidth(rate)?;
    }
    let [root_rate, pod_rate, leaf_rate] = params.bandwidth_ratio;

    let root = 0;
    let pod_id = |p: usize| 1 + p;
    let leaf_id = |p: usize, k: usize| 1 + pods + p * leaves + k;

    let mut links = Vec::new();
    for p in 0..pods {
        links.push(Link::new(root, pod_id(p), root_rate));
        links.push(Link::new(pod_id(p), root, root_rate));
    }

    for p in 0..pods {
        for k in 0..leaves {
            links.push(Link::new(pod_id(p), leaf_id(p, k), pod_rate));
            links.push(Link::new(leaf_id(p, k), pod_id(p), pod_rate));
        }
        for a in 0..leaves {
            for b in (a + 1)..leaves {
                links.push(Link::new(leaf_id(p, a), leaf_id(p, b), leaf_rate));
                links.push(Link::new(leaf_id(p, b), leaf_id(p, a), leaf_rate));
            }
        }
    }

    Ok(TopologyInstance {
        node_count: 1 + pods + pods * leaves,
        links,
    })
}
