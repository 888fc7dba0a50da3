//! Gibbs sampling driver.
//!
//! One iteration is a fixed sequence:
//! 1. count edges and non-edges under the current labels
//! 2. update `p_in`, then `p_out`
//! 3. resample every node's label, in node order
//! 4. update the concentration `alpha`
//!
//! The graph's labels are rewritten after every sweep so the next
//! iteration counts against them.

use crate::concentration::{sample_concentration, ConcentrationPrior};
use crate::edge_probability::{update_edge_probs, EdgePriors};
use crate::error::{Error, Result};
use crate::gibbs::LabelSampler;
use crate::graph::GraphView;
use crate::partition::{estimate_partition, PartitionEstimate};
use crate::sufficient_stats::EdgeStats;
use indicatif::{ProgressBar, ProgressDrawTarget};
use log::{debug, info};
use mcmc_util::ScalarChain;
use rand::Rng;
use std::fmt;

/// Priors and initial values for the detector.
#[derive(Debug, Clone)]
pub struct DetectorOptions {
    /// Beta prior on `p_in`: edge pseudo-count. Default: 2.0
    pub a_in: f64,
    /// Beta prior on `p_in`: non-edge pseudo-count. Default: 1.0
    pub b_in: f64,
    /// Beta prior on `p_out`: edge pseudo-count. Default: 1.0
    pub a_out: f64,
    /// Beta prior on `p_out`: non-edge pseudo-count. Default: 2.0
    pub b_out: f64,
    /// Gamma prior shape on `alpha`. Default: 1.0
    pub gamma_a: f64,
    /// Gamma prior rate on `alpha`. Default: 1.0
    pub gamma_b: f64,
    /// Initial `p_in`. Default: 0.8
    pub p_in: f64,
    /// Initial `p_out`. Default: 0.2
    pub p_out: f64,
    /// Initial `alpha`. Default: 10.0
    pub alpha: f64,
    /// Draw a progress bar over sweeps. Default: false
    pub show_progress: bool,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        DetectorOptions {
            a_in: 2.0,
            b_in: 1.0,
            a_out: 1.0,
            b_out: 2.0,
            gamma_a: 1.0,
            gamma_b: 1.0,
            p_in: 0.8,
            p_out: 0.2,
            alpha: 10.0,
            show_progress: false,
        }
    }
}

impl DetectorOptions {
    /// Check prior constants and initial values.
    pub fn validate(&self) -> Result<()> {
        let priors = [
            ("a_in", self.a_in),
            ("b_in", self.b_in),
            ("a_out", self.a_out),
            ("b_out", self.b_out),
            ("gamma_a", self.gamma_a),
            ("gamma_b", self.gamma_b),
            ("alpha", self.alpha),
        ];
        for (name, value) in priors {
            if !(value > 0.0 && value.is_finite()) {
                return Err(Error::invalid(name, format!("{value} must be positive")));
            }
        }
        for (name, value) in [("p_in", self.p_in), ("p_out", self.p_out)] {
            if !(value > 0.0 && value < 1.0) {
                return Err(Error::invalid(name, format!("{value} is not in (0, 1)")));
            }
        }
        if self.p_in < self.p_out {
            return Err(Error::invalid(
                "p_in",
                format!("p_in = {} is below p_out = {}", self.p_in, self.p_out),
            ));
        }
        Ok(())
    }

    fn edge_priors(&self) -> EdgePriors {
        EdgePriors {
            a_in: self.a_in,
            b_in: self.b_in,
            a_out: self.a_out,
            b_out: self.b_out,
        }
    }

    fn concentration_prior(&self) -> ConcentrationPrior {
        ConcentrationPrior {
            gamma_a: self.gamma_a,
            gamma_b: self.gamma_b,
        }
    }
}

/// Everything one run produced, indexed by iteration `0..=iterations`.
#[derive(Debug, Clone)]
pub struct GibbsTrace {
    /// Label assignment per iteration; row 0 is the starting assignment
    pub labels: Vec<Vec<usize>>,
    /// `p_in` per iteration
    pub p_in: Vec<f64>,
    /// `p_out` per iteration
    pub p_out: Vec<f64>,
    /// `alpha` per iteration
    pub alpha: Vec<f64>,
    /// Edge statistics of `labels[t]`
    pub edge_stats: Vec<EdgeStats>,
}

impl GibbsTrace {
    /// Number of completed sweeps.
    pub fn num_iterations(&self) -> usize {
        self.labels.len().saturating_sub(1)
    }

    /// Number of communities at iteration `t`, `None` past the last one.
    pub fn num_communities(&self, t: usize) -> Option<usize> {
        self.edge_stats.get(t).map(EdgeStats::num_communities)
    }

    /// Representative partition after discarding `burnin` iterations.
    pub fn estimate_partition(&self, burnin: usize) -> Result<PartitionEstimate> {
        estimate_partition(&self.labels, burnin)
    }

    /// `p_in` samples after burn-in.
    pub fn p_in_chain(&self, burnin: usize) -> ScalarChain {
        ScalarChain::from_trace(&self.p_in, burnin)
    }

    /// `p_out` samples after burn-in.
    pub fn p_out_chain(&self, burnin: usize) -> ScalarChain {
        ScalarChain::from_trace(&self.p_out, burnin)
    }

    /// `alpha` samples after burn-in.
    pub fn alpha_chain(&self, burnin: usize) -> ScalarChain {
        ScalarChain::from_trace(&self.alpha, burnin)
    }
}

/// Bayesian planted-partition community detector.
#[derive(Debug, Clone)]
pub struct CommunityDetector {
    options: DetectorOptions,
}

impl CommunityDetector {
    /// Create a detector after validating `options`.
    pub fn new(options: DetectorOptions) -> Result<Self> {
        options.validate()?;
        Ok(CommunityDetector { options })
    }

    /// Options in use.
    pub fn options(&self) -> &DetectorOptions {
        &self.options
    }

    /// Run `iterations` Gibbs sweeps on `graph`.
    ///
    /// * `start_labels` - starting assignment; `None` puts every node in its
    ///   own community, labelled by its index
    /// * `rng` - the only source of randomness; a seeded generator makes the
    ///   trace reproducible
    ///
    /// The label count is checked before anything is written to `graph`.
    /// On success the graph holds the labels of the last sweep.
    pub fn run<G, R>(
        &self,
        graph: &mut G,
        start_labels: Option<&[usize]>,
        iterations: usize,
        rng: &mut R,
    ) -> Result<GibbsTrace>
    where
        G: GraphView + ?Sized,
        R: Rng + ?Sized,
    {
        let n = graph.number_of_nodes();
        if n == 0 {
            return Err(Error::invalid("graph", "no nodes"));
        }
        if iterations == 0 {
            return Err(Error::invalid("iterations", "must be at least 1"));
        }

        let start: Vec<usize> = match start_labels {
            Some(labels) => labels.to_vec(),
            None => {
                info!("Initializing labels with {} different labels", n);
                (0..n).collect()
            }
        };
        graph.set_communities(&start)?;

        let opts = &self.options;
        let edge_priors = opts.edge_priors();
        let concentration_prior = opts.concentration_prior();

        info!(
            "Gibbs: n={}, edges={}, iterations={}, {}",
            n,
            graph.number_of_edges(),
            iterations,
            self
        );

        let mut trace = GibbsTrace {
            labels: Vec::with_capacity(iterations + 1),
            p_in: Vec::with_capacity(iterations + 1),
            p_out: Vec::with_capacity(iterations + 1),
            alpha: Vec::with_capacity(iterations + 1),
            edge_stats: Vec::with_capacity(iterations + 1),
        };
        trace.labels.push(start.clone());
        trace.p_in.push(opts.p_in);
        trace.p_out.push(opts.p_out);
        trace.alpha.push(opts.alpha);

        let mut current = start;
        let mut sampler = LabelSampler::new();

        let pb = ProgressBar::new(iterations as u64);
        if !opts.show_progress {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }

        for i in 1..=iterations {
            let stats = EdgeStats::from_labels(graph, &current)?;

            debug!(
                "iter {}: communities={}, edges_in={}, edges_out={}",
                i,
                stats.num_communities(),
                stats.edges_in,
                stats.edges_out
            );

            let (p_in, p_out) =
                update_edge_probs(&stats, &edge_priors, trace.p_in[i - 1], trace.p_out[i - 1], rng)?;

            let mut community_size = stats.community_size.clone();
            let moves = sampler.sweep(graph, &mut current, &mut community_size, p_in, p_out, rng)?;

            graph.set_communities(&current)?;

            let alpha = sample_concentration(
                trace.alpha[i - 1],
                community_size.len(),
                n,
                &concentration_prior,
                rng,
            )?;

            debug!(
                "iter {}: p_in={:.4}, p_out={:.4}, alpha={:.4}, moves={}",
                i, p_in, p_out, alpha, moves
            );

            trace.edge_stats.push(stats);
            trace.labels.push(current.clone());
            trace.p_in.push(p_in);
            trace.p_out.push(p_out);
            trace.alpha.push(alpha);
            pb.inc(1);
        }
        pb.finish_and_clear();

        trace.edge_stats.push(EdgeStats::from_labels(graph, &current)?);

        info!(
            "Gibbs done: {} communities after {} iterations",
            trace.edge_stats[iterations].num_communities(),
            iterations
        );

        Ok(trace)
    }
}

impl fmt::Display for CommunityDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.options;
        write!(
            f,
            "[INIT: {:?}, {:?}, {:?}, {:?}, {:?}, {:?}]",
            o.a_in, o.b_in, o.a_out, o.b_out, o.gamma_a, o.gamma_b
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_priors() {
        let detector = CommunityDetector::new(DetectorOptions {
            a_in: 5.0,
            b_in: 6.0,
            a_out: 7.0,
            b_out: 8.0,
            gamma_a: 9.0,
            gamma_b: 10.0,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            detector.to_string(),
            "[INIT: 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]"
        );
    }

    #[test]
    fn test_default_options_valid() {
        let detector = CommunityDetector::new(DetectorOptions::default()).unwrap();
        assert_eq!(detector.to_string(), "[INIT: 2.0, 1.0, 1.0, 2.0, 1.0, 1.0]");
    }

    #[test]
    fn test_invalid_options() {
        let bad = [
            DetectorOptions {
                a_in: 0.0,
                ..Default::default()
            },
            DetectorOptions {
                gamma_b: -1.0,
                ..Default::default()
            },
            DetectorOptions {
                p_in: 1.0,
                ..Default::default()
            },
            DetectorOptions {
                p_in: 0.1,
                p_out: 0.3,
                ..Default::default()
            },
            DetectorOptions {
                alpha: f64::NAN,
                ..Default::default()
            },
        ];
        for opts in bad {
            assert!(
                CommunityDetector::new(opts.clone()).is_err(),
                "accepted {:?}",
                opts
            );
        }
    }
}
