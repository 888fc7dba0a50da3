//! Sequential Gibbs sweep over node community labels.
//!
//! For each node, in ascending index order, the node is taken out of its
//! community and a new label is drawn among the communities that remain,
//! weighted by community size times the planted-partition likelihood of
//! the node's edges and non-edges. Later nodes see the labels already
//! drawn for earlier nodes in the same sweep.
//!
//! There is no option to open a new community: a community emptied by its
//! last member disappears for good.

use crate::error::{Error, Result};
use crate::graph::GraphView;
use fnv::FnvHashMap;
use rand::Rng;
use std::collections::BTreeMap;

/// Per-node resampling of community labels.
#[derive(Debug, Default)]
pub struct LabelSampler {
    /// Scratch: candidate labels in ascending order
    candidates: Vec<usize>,
    /// Scratch: log-weight per candidate
    log_weights: Vec<f64>,
    /// Scratch: label -> (edges, non-edges) from the current node
    pair_counts: FnvHashMap<usize, (usize, usize)>,
}

/// `ln p` and `ln (1 - p)` for one edge probability.
#[derive(Debug, Clone, Copy)]
struct LogProb {
    edge: f64,
    non_edge: f64,
}

impl LogProb {
    fn new(p: f64) -> Self {
        LogProb {
            edge: p.ln(),
            non_edge: (1.0 - p).ln(),
        }
    }

    /// `edges * ln p + non_edges * ln (1 - p)`, with `0 * ln 0 = 0`
    fn score(&self, edges: usize, non_edges: usize) -> f64 {
        xlogp(edges, self.edge) + xlogp(non_edges, self.non_edge)
    }
}

fn xlogp(count: usize, log_p: f64) -> f64 {
    if count == 0 {
        0.0
    } else {
        count as f64 * log_p
    }
}

impl LabelSampler {
    /// Create a sampler with empty scratch buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resample every node's label once.
    ///
    /// * `graph` - adjacency (read only)
    /// * `labels` - current labels, updated in place node by node
    /// * `community_size` - population per label matching `labels`, kept in sync
    /// * `p_in`, `p_out` - edge probabilities of this iteration
    ///
    /// Returns the number of nodes whose label changed.
    pub fn sweep<G, R>(
        &mut self,
        graph: &G,
        labels: &mut [usize],
        community_size: &mut BTreeMap<usize, usize>,
        p_in: f64,
        p_out: f64,
        rng: &mut R,
    ) -> Result<usize>
    where
        G: GraphView + ?Sized,
        R: Rng + ?Sized,
    {
        let n = graph.number_of_nodes();
        if labels.len() != n {
            return Err(Error::LabelMismatch {
                expected: n,
                found: labels.len(),
            });
        }

        let lp_in = LogProb::new(p_in);
        let lp_out = LogProb::new(p_out);

        let mut moves = 0;

        for v in 0..n {
            let old_c = labels[v];
            remove_member(community_size, old_c);

            if community_size.is_empty() {
                // lone node: nowhere else to go
                community_size.insert(old_c, 1);
                continue;
            }

            self.compute_log_weights(graph, v, labels, community_size, lp_in, lp_out);

            let u: f64 = rng.random();
            let k = sample_categorical_log(&self.log_weights, u)
                .ok_or(Error::DegenerateDistribution { node: v })?;

            let new_c = self.candidates[k];
            labels[v] = new_c;
            *community_size.entry(new_c).or_insert(0) += 1;

            if new_c != old_c {
                moves += 1;
            }
        }

        Ok(moves)
    }

    /// Fill `candidates` and `log_weights` for node `v`.
    ///
    /// `community_size` must already exclude `v`.
    fn compute_log_weights<G>(
        &mut self,
        graph: &G,
        v: usize,
        labels: &[usize],
        community_size: &BTreeMap<usize, usize>,
        lp_in: LogProb,
        lp_out: LogProb,
    ) where
        G: GraphView + ?Sized,
    {
        self.pair_counts.clear();
        let mut total_edges = 0;
        let mut total_non_edges = 0;

        for (m, &c) in labels.iter().enumerate() {
            if m == v {
                continue;
            }
            let counts = self.pair_counts.entry(c).or_insert((0, 0));
            if graph.has_edge(v, m) {
                counts.0 += 1;
                total_edges += 1;
            } else {
                counts.1 += 1;
                total_non_edges += 1;
            }
        }

        self.candidates.clear();
        self.log_weights.clear();

        for (&c, &size) in community_size {
            let (e_in, ne_in) = self.pair_counts.get(&c).copied().unwrap_or((0, 0));
            let log_lik = lp_in.score(e_in, ne_in)
                + lp_out.score(total_edges - e_in, total_non_edges - ne_in);
            self.candidates.push(c);
            self.log_weights.push((size as f64).ln() + log_lik);
        }
    }
}

fn remove_member(community_size: &mut BTreeMap<usize, usize>, c: usize) {
    if let Some(size) = community_size.get_mut(&c) {
        if *size <= 1 {
            community_size.remove(&c);
        } else {
            *size -= 1;
        }
    }
}

/// Inverse-CDF draw from unnormalized log-weights.
///
/// `u` is a uniform draw in `[0, 1)`. Returns the first index whose
/// cumulative normalized weight reaches `u`, or `None` if no weight is
/// positive and finite.
pub fn sample_categorical_log(log_weights: &[f64], u: f64) -> Option<usize> {
    let max = log_weights
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);

    if !max.is_finite() {
        return None;
    }

    let total: f64 = log_weights.iter().map(|lw| (lw - max).exp()).sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let mut cum = 0.0;
    let mut last_positive = None;
    for (i, lw) in log_weights.iter().enumerate() {
        let w = (lw - max).exp() / total;
        if w > 0.0 {
            last_positive = Some(i);
        }
        cum += w;
        if cum >= u && w > 0.0 {
            return Some(i);
        }
    }

    // rounding left the cumulative sum just short of u
    last_positive
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CommunityGraph;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn sizes(labels: &[usize]) -> BTreeMap<usize, usize> {
        let mut out = BTreeMap::new();
        for &c in labels {
            *out.entry(c).or_insert(0) += 1;
        }
        out
    }

    #[test]
    fn test_sample_categorical_log() {
        let log_weights = vec![-100.0, 0.0, -100.0];
        assert_eq!(sample_categorical_log(&log_weights, 0.01), Some(1));
        assert_eq!(sample_categorical_log(&log_weights, 0.5), Some(1));
        assert_eq!(sample_categorical_log(&log_weights, 0.9999), Some(1));

        let even = vec![0.0, 0.0];
        assert_eq!(sample_categorical_log(&even, 0.25), Some(0));
        assert_eq!(sample_categorical_log(&even, 0.5), Some(0));
        assert_eq!(sample_categorical_log(&even, 0.75), Some(1));
    }

    #[test]
    fn test_sample_categorical_degenerate() {
        let none = vec![f64::NEG_INFINITY; 3];
        assert_eq!(sample_categorical_log(&none, 0.3), None);
        assert_eq!(sample_categorical_log(&[f64::NAN, f64::NAN], 0.3), None);
        assert_eq!(sample_categorical_log(&[], 0.3), None);
    }

    #[test]
    fn test_zero_weight_never_chosen() {
        let log_weights = vec![f64::NEG_INFINITY, 0.0, f64::NEG_INFINITY];
        for u in [0.0, 0.3, 0.999_999] {
            assert_eq!(sample_categorical_log(&log_weights, u), Some(1));
        }
    }

    #[test]
    fn test_weights_match_direct_product() {
        // 0-1, 0-2, 3 isolated; labels [9, 1, 1, 4]
        let graph = CommunityGraph::from_parts(vec![0, 1, 2, 3], vec![(0, 1), (0, 2)]).unwrap();
        let labels = vec![9, 1, 1, 4];
        let mut community_size = sizes(&labels);
        remove_member(&mut community_size, 9);

        let (p_in, p_out) = (0.7, 0.1);
        let mut sampler = LabelSampler::new();
        sampler.compute_log_weights(
            &graph,
            0,
            &labels,
            &community_size,
            LogProb::new(p_in),
            LogProb::new(p_out),
        );

        assert_eq!(sampler.candidates, vec![1, 4]);

        // candidate 1 (size 2): two edges inside, node 3 outside without edge
        let w1 = 2.0 * p_in * p_in * (1.0 - p_out);
        // candidate 4 (size 1): two edges outside, node 3 inside without edge
        let w4 = 1.0 * p_out * p_out * (1.0 - p_in);

        assert!((sampler.log_weights[0] - w1.ln()).abs() < 1e-12);
        assert!((sampler.log_weights[1] - w4.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_sweep_keeps_sizes_in_sync() {
        let graph = CommunityGraph::from_interactions(vec![
            (0, 1),
            (1, 2),
            (0, 2),
            (3, 4),
            (4, 5),
            (3, 5),
            (2, 3),
        ])
        .unwrap();
        let mut labels: Vec<usize> = (0..6).collect();
        let mut community_size = sizes(&labels);
        let mut sampler = LabelSampler::new();
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..20 {
            sampler
                .sweep(&graph, &mut labels, &mut community_size, 0.8, 0.1, &mut rng)
                .unwrap();
            assert_eq!(community_size, sizes(&labels));
            assert_eq!(community_size.values().sum::<usize>(), 6);
        }
    }

    #[test]
    fn test_later_nodes_see_earlier_moves() {
        // node 0 leaves its singleton for {2, 3}; node 1, tied only to
        // node 0, must then follow it there
        let graph = CommunityGraph::from_parts(0..6, vec![(0, 1), (0, 2), (0, 3)]).unwrap();
        let (p_in, p_out) = (1.0 - 1e-6, 1e-6);

        for seed in 0..50 {
            let mut labels = vec![0, 1, 2, 2, 3, 3];
            let mut community_size = sizes(&labels);
            let mut rng = SmallRng::seed_from_u64(seed);
            LabelSampler::new()
                .sweep(&graph, &mut labels, &mut community_size, p_in, p_out, &mut rng)
                .unwrap();

            assert_eq!(labels[0], 2, "seed {}", seed);
            assert_eq!(labels[1], 2, "seed {}", seed);
        }
    }

    #[test]
    fn test_no_new_communities() {
        let graph = CommunityGraph::from_parts(vec![0, 1, 2, 3], vec![(0, 1), (2, 3)]).unwrap();
        let mut labels = vec![10, 10, 20, 20];
        let mut community_size = sizes(&labels);
        let mut sampler = LabelSampler::new();
        let mut rng = SmallRng::seed_from_u64(3);

        for _ in 0..10 {
            sampler
                .sweep(&graph, &mut labels, &mut community_size, 0.6, 0.3, &mut rng)
                .unwrap();
            assert!(labels.iter().all(|c| *c == 10 || *c == 20));
        }
    }

    #[test]
    fn test_lone_node_keeps_label() {
        let graph = CommunityGraph::from_parts(vec![42], Vec::<(i32, i32)>::new()).unwrap();
        let mut labels = vec![5];
        let mut community_size = sizes(&labels);
        let mut rng = SmallRng::seed_from_u64(0);
        let moves = LabelSampler::new()
            .sweep(&graph, &mut labels, &mut community_size, 0.8, 0.2, &mut rng)
            .unwrap();
        assert_eq!(moves, 0);
        assert_eq!(labels, vec![5]);
    }

    #[test]
    fn test_degenerate_weights_surface() {
        // With p_in = 1 and p_out = 0, node 0 fits neither neighbour's community
        let graph = CommunityGraph::from_interactions(vec![(0, 1), (0, 2)]).unwrap();
        let mut labels = vec![0, 1, 2];
        let mut community_size = sizes(&labels);
        let mut rng = SmallRng::seed_from_u64(0);
        let err = LabelSampler::new()
            .sweep(&graph, &mut labels, &mut community_size, 1.0, 0.0, &mut rng)
            .unwrap_err();
        assert_eq!(err, Error::DegenerateDistribution { node: 0 });
    }
}
