//! Bad-link selection.
//!
//! Degradation is applied over the complete directed edge set, after both
//! directions of every connection have been generated, so that each
//! direction is an independent candidate.

use log::debug;
use rand::seq::index;
use rand::Rng;

use crate::topology::generator::GenerationError;
use crate::topology::types::{Link, SLOW_LINK_BANDWIDTH};

/// Tolerance applied before flooring `edges * proportion`, so that
/// products such as `10 * 0.7` do not lose a link to rounding.
const FLOOR_EPSILON: f64 = 1e-9;

/// Number of links to degrade: `floor(edge_count * proportion + 1e-9)`.
///
/// The tolerance means a product within `1e-9` below an integer rounds up
/// to it, so the count can exceed the exact `floor(edge_count * proportion)`
/// by one at such boundaries (e.g. 2 edges at `0.4999999999` give 1).
pub fn slow_link_count(edge_count: usize, proportion: f64) -> Result<usize, GenerationError> {
    if !proportion.is_finite() || proportion < 0.0 {
        return Err(GenerationError::InvalidProportion { proportion });
    }

    let requested = (edge_count as f64 * proportion + FLOOR_EPSILON).floor() as usize;
    if requested > edge_count {
        return Err(GenerationError::TooManySlowLinks {
            requested,
            available: edge_count,
        });
    }
    Ok(requested)
}

/// Sample links without replacement and set their bandwidth to the slow rate.
///
/// Returns the number of degraded links.
pub fn degrade_links<R: Rng + ?Sized>(
    links: &mut [Link],
    proportion: f64,
    rng: &mut R,
) -> Result<usize, GenerationError> {
    let count = slow_link_count(links.len(), proportion)?;

    for idx in index::sample(rng, links.len(), count).into_iter() {
        links[idx].bandwidth = SLOW_LINK_BANDWIDTH;
        debug!("Degraded link {} -> {}", links[idx].src, links[idx].dest);
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn full_links(n: usize) -> Vec<Link> {
        (0..n).map(|i| Link::new(i, (i + 1) % n, 50.0)).collect()
    }

    #[test]
    fn test_slow_link_count_floors() {
        assert_eq!(slow_link_count(8, 0.5).unwrap(), 4);
        assert_eq!(slow_link_count(10, 0.25).unwrap(), 2);
        assert_eq!(slow_link_count(10, 0.7).unwrap(), 7);
        assert_eq!(slow_link_count(10, 0.0).unwrap(), 0);
        assert_eq!(slow_link_count(10, 1.0).unwrap(), 10);
    }

    #[test]
    fn test_slow_link_count_boundary_tolerance() {
        assert_eq!(slow_link_count(2, 0.4999999999).unwrap(), 1);
        assert_eq!(slow_link_count(2, 0.4999).unwrap(), 0);
        assert_eq!(slow_link_count(100, 0.29).unwrap(), 29);
    }

    #[test]
    fn test_slow_link_count_rejects_bad_proportions() {
        assert!(matches!(
            slow_link_count(10, 1.5),
            Err(GenerationError::TooManySlowLinks { requested: 15, available: 10 })
        ));
        assert!(matches!(
            slow_link_count(10, -0.1),
            Err(GenerationError::InvalidProportion { .. })
        ));
        assert!(slow_link_count(10, f64::NAN).is_err());
    }

    #[test]
    fn test_degrade_links_marks_exact_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut links = full_links(20);
        let degraded = degrade_links(&mut links, 0.3, &mut rng).unwrap();
        assert_eq!(degraded, 6);
        assert_eq!(links.iter().filter(|l| l.is_slow()).count(), 6);
    }

    #[test]
    fn test_degrade_links_is_seed_deterministic() {
        let mut a = full_links(16);
        let mut b = full_links(16);
        degrade_links(&mut a, 0.5, &mut StdRng::seed_from_u64(42)).unwrap();
        degrade_links(&mut b, 0.5, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }
}
