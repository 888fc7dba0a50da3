//! Concentration parameter update (Escobar & West, 1995).
//!
//! Given `k` communities over `n` nodes and a `Gamma(a, b)` prior
//! (shape/rate), draw an auxiliary `eta ~ Beta(alpha + 1, n)`, set
//! `r = b - ln eta`, and draw `alpha` from `Gamma(a + k, 1/r)` when the
//! odds `u / (1 - u)` of a uniform `u` fall below `(a + k) / (n r)`,
//! otherwise from `Gamma(a + k - 1, 1/r)`.
//!
//! The value is recorded with the chain; label resampling does not read it.

use crate::error::{Error, Result};
use rand::Rng;
use rand_distr::{Beta, Distribution, Gamma};

/// Gamma prior (shape, rate) on the concentration parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConcentrationPrior {
    /// Shape
    pub gamma_a: f64,
    /// Rate
    pub gamma_b: f64,
}

/// Draw the next concentration value.
pub fn sample_concentration<R: Rng + ?Sized>(
    alpha_prev: f64,
    num_communities: usize,
    num_nodes: usize,
    prior: &ConcentrationPrior,
    rng: &mut R,
) -> Result<f64> {
    let n = num_nodes as f64;
    let k = num_communities as f64;

    let eta = Beta::new(alpha_prev + 1.0, n)
        .map_err(|e| Error::invalid("alpha", format!("Beta({}, {n}): {e}", alpha_prev + 1.0)))?
        .sample(rng);

    let u: f64 = rng.random();

    let rate = prior.gamma_b - eta.ln();
    let scale = 1.0 / rate;

    let shape = if u / (1.0 - u) < (prior.gamma_a + k) / (n * rate) {
        prior.gamma_a + k
    } else {
        prior.gamma_a + k - 1.0
    };

    let alpha = Gamma::new(shape, scale)
        .map_err(|e| Error::invalid("alpha", format!("Gamma({shape}, {scale}): {e}")))?
        .sample(rng);

    Ok(alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const PRIOR: ConcentrationPrior = ConcentrationPrior {
        gamma_a: 1.0,
        gamma_b: 1.0,
    };

    #[test]
    fn test_alpha_positive() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut alpha = 10.0;
        for _ in 0..1000 {
            alpha = sample_concentration(alpha, 5, 100, &PRIOR, &mut rng).unwrap();
            assert!(alpha > 0.0 && alpha.is_finite(), "alpha = {}", alpha);
        }
    }

    #[test]
    fn test_more_communities_larger_alpha() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mean_alpha = |k: usize, rng: &mut SmallRng| {
            let mut alpha = 1.0;
            let mut sum = 0.0;
            for _ in 0..2000 {
                alpha = sample_concentration(alpha, k, 200, &PRIOR, rng).unwrap();
                sum += alpha;
            }
            sum / 2000.0
        };

        let few = mean_alpha(2, &mut rng);
        let many = mean_alpha(50, &mut rng);
        assert!(many > 3.0 * few, "few = {}, many = {}", few, many);
    }

    #[test]
    fn test_empty_graph_rejected() {
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(matches!(
            sample_concentration(1.0, 0, 0, &PRIOR, &mut rng),
            Err(Error::InvalidParameter { name: "alpha", .. })
        ));
    }
}
