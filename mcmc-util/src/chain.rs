use crate::traits::ChainParam;

/// Collected MCMC samples, burn-in already removed.
pub struct McmcChain<P: ChainParam> {
    pub samples: Vec<P>,
}

/// Scalar parameter chain (e.g., an edge probability or a concentration).
pub type ScalarChain = McmcChain<f64>;

impl<P: ChainParam> McmcChain<P> {
    /// Keep everything after the first `burnin` samples.
    pub fn from_trace(trace: &[P], burnin: usize) -> Self {
        let samples = trace.iter().skip(burnin).cloned().collect();
        Self { samples }
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    fn dim(&self) -> usize {
        self.samples.first().map(|s| s.dim()).unwrap_or(0)
    }

    /// Element-wise posterior mean across samples.
    pub fn posterior_mean(&self) -> Vec<f64> {
        let n = self.n_samples();
        if n == 0 {
            return vec![];
        }
        let mut mean = vec![0.0f64; self.dim()];
        for sample in &self.samples {
            for (m, &v) in mean.iter_mut().zip(sample.as_slice()) {
                *m += v;
            }
        }
        let inv_n = 1.0 / n as f64;
        for m in &mut mean {
            *m *= inv_n;
        }
        mean
    }

    /// Element-wise posterior variance across samples.
    pub fn posterior_variance(&self) -> Vec<f64> {
        let n = self.n_samples();
        if n < 2 {
            return vec![];
        }
        let mean = self.posterior_mean();
        let mut var = vec![0.0f64; mean.len()];
        for sample in &self.samples {
            for ((v, &x), &mu) in var.iter_mut().zip(sample.as_slice()).zip(&mean) {
                let diff = x - mu;
                *v += diff * diff;
            }
        }
        let inv = 1.0 / (n - 1) as f64;
        for v in &mut var {
            *v *= inv;
        }
        var
    }

    /// Element-wise quantile (0 <= q <= 1) across samples.
    pub fn quantile(&self, q: f64) -> Vec<f64> {
        let n = self.n_samples();
        if n == 0 {
            return vec![];
        }
        (0..self.dim())
            .map(|i| {
                let mut vals = self.component(i);
                vals.sort_unstable_by(|a, b| a.total_cmp(b));
                let idx = (q * (n - 1) as f64).clamp(0.0, (n - 1) as f64);
                let lo = idx.floor() as usize;
                let hi = idx.ceil() as usize;
                if lo == hi {
                    vals[lo]
                } else {
                    let frac = idx - lo as f64;
                    vals[lo] * (1.0 - frac) + vals[hi] * frac
                }
            })
            .collect()
    }

    /// Means over `num_batches` consecutive blocks of the chain.
    ///
    /// Returns `num_batches` rows of `dim` values. The last block absorbs
    /// the remainder. A stationary chain shows flat batch means.
    pub fn batch_means(&self, num_batches: usize) -> Vec<Vec<f64>> {
        let n = self.n_samples();
        if n == 0 || num_batches == 0 {
            return vec![];
        }
        let num_batches = num_batches.min(n);
        let size = n / num_batches;
        (0..num_batches)
            .map(|b| {
                let lb = b * size;
                let ub = if b + 1 == num_batches { n } else { lb + size };
                let block = McmcChain {
                    samples: self.samples[lb..ub].to_vec(),
                };
                block.posterior_mean()
            })
            .collect()
    }

    /// Element-wise effective sample size.
    ///
    /// Autocorrelations are summed in consecutive pairs and truncated at the
    /// first negative pair sum (Geyer's initial positive sequence).
    pub fn effective_sample_size(&self) -> Vec<f64> {
        let n = self.n_samples();
        (0..self.dim())
            .map(|i| {
                if n < 4 {
                    return n as f64;
                }
                let x = self.component(i);
                let acf = autocorrelation(&x);
                if acf.is_empty() {
                    return n as f64;
                }
                let mut tau = -1.0;
                let mut lag = 0;
                while lag + 1 < acf.len() {
                    let pair = acf[lag] + acf[lag + 1];
                    if pair < 0.0 {
                        break;
                    }
                    tau += 2.0 * pair;
                    lag += 2;
                }
                (n as f64 / tau.max(1.0 / n as f64)).min(n as f64)
            })
            .collect()
    }

    fn component(&self, i: usize) -> Vec<f64> {
        self.samples.iter().map(|s| s.as_slice()[i]).collect()
    }
}

/// Normalized autocorrelation at lags `0..n/2`.
///
/// Empty if the series has zero variance.
fn autocorrelation(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mean = x.iter().sum::<f64>() / n as f64;
    let centred: Vec<f64> = x.iter().map(|v| v - mean).collect();
    let c0 = centred.iter().map(|v| v * v).sum::<f64>() / n as f64;
    if c0 <= 0.0 {
        return vec![];
    }
    (0..n / 2)
        .map(|lag| {
            let ck = centred[..n - lag]
                .iter()
                .zip(&centred[lag..])
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n as f64;
            ck / c0
        })
        .collect()
}
