//! Order-constrained Beta updates of the within/between edge probabilities.

use crate::error::{Error, Result};
use crate::sufficient_stats::EdgeStats;
use rand::Rng;
use rand_distr::{Beta, Distribution};

/// Beta prior parameters of `p_in` and `p_out`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePriors {
    /// Prior pseudo-count of within-community edges
    pub a_in: f64,
    /// Prior pseudo-count of within-community non-edges
    pub b_in: f64,
    /// Prior pseudo-count of cross-community edges
    pub a_out: f64,
    /// Prior pseudo-count of cross-community non-edges
    pub b_out: f64,
}

/// Draw `(p_in, p_out)` for the next iteration.
///
/// Each candidate comes from its conjugate Beta posterior. A `p_in`
/// candidate not above the previous `p_out` is rejected and the previous
/// `p_in` kept; then a `p_out` candidate not below the new `p_in` is
/// rejected likewise. Starting from `p_in >= p_out` the ordering holds
/// forever.
pub fn update_edge_probs<R: Rng + ?Sized>(
    stats: &EdgeStats,
    priors: &EdgePriors,
    p_in_prev: f64,
    p_out_prev: f64,
    rng: &mut R,
) -> Result<(f64, f64)> {
    let p_in_candidate = beta(
        stats.edges_in as f64 + priors.a_in,
        stats.non_edges_in as f64 + priors.b_in,
    )?
    .sample(rng);

    let p_in = if p_in_candidate > p_out_prev {
        p_in_candidate
    } else {
        p_in_prev
    };

    let p_out_candidate = beta(
        stats.edges_out as f64 + priors.a_out,
        stats.non_edges_out as f64 + priors.b_out,
    )?
    .sample(rng);

    let p_out = if p_out_candidate < p_in {
        p_out_candidate
    } else {
        p_out_prev
    };

    Ok((p_in, p_out))
}

fn beta(a: f64, b: f64) -> Result<Beta<f64>> {
    Beta::new(a, b).map_err(|e| Error::invalid("beta", format!("Beta({a}, {b}): {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn stats(edges_in: i64, non_edges_in: i64, edges_out: i64, non_edges_out: i64) -> EdgeStats {
        EdgeStats {
            community_size: BTreeMap::new(),
            edges_in,
            non_edges_in,
            edges_out,
            non_edges_out,
        }
    }

    const PRIORS: EdgePriors = EdgePriors {
        a_in: 2.0,
        b_in: 1.0,
        a_out: 1.0,
        b_out: 2.0,
    };

    #[test]
    fn test_ordering_never_crosses() {
        let mut rng = SmallRng::seed_from_u64(42);
        // Posterior of p_out sits well above that of p_in
        let s = stats(1, 50, 50, 1);
        let (mut p_in, mut p_out) = (0.8, 0.2);
        for _ in 0..500 {
            (p_in, p_out) = update_edge_probs(&s, &PRIORS, p_in, p_out, &mut rng).unwrap();
            assert!(p_in >= p_out, "p_in={} < p_out={}", p_in, p_out);
        }
    }

    #[test]
    fn test_rejected_draws_keep_previous_values() {
        let mut rng = SmallRng::seed_from_u64(7);
        // p_in candidates near 0, p_out candidates near 1: both rejected
        let s = stats(0, 100_000, 100_000, 0);
        let (p_in, p_out) = update_edge_probs(&s, &PRIORS, 0.8, 0.2, &mut rng).unwrap();
        assert_eq!(p_in, 0.8);
        assert_eq!(p_out, 0.2);
    }

    #[test]
    fn test_posterior_concentrates_on_counts() {
        let mut rng = SmallRng::seed_from_u64(11);
        let s = stats(9_000, 1_000, 1_000, 9_000);
        let (p_in, p_out) = update_edge_probs(&s, &PRIORS, 0.5, 0.4, &mut rng).unwrap();
        assert!((p_in - 0.9).abs() < 0.02, "p_in = {}", p_in);
        assert!((p_out - 0.1).abs() < 0.02, "p_out = {}", p_out);
    }

    #[test]
    fn test_invalid_prior_is_reported() {
        let mut rng = SmallRng::seed_from_u64(1);
        let priors = EdgePriors {
            a_in: 0.0,
            ..PRIORS
        };
        let s = stats(0, 0, 0, 0);
        assert!(matches!(
            update_edge_probs(&s, &priors, 0.8, 0.2, &mut rng),
            Err(Error::InvalidParameter { name: "beta", .. })
        ));
    }
}
