//! Point estimate of the partition from a label trace (Dahl, 2006).
//!
//! Labels are not comparable across iterations, so the trace is reduced to
//! pairwise co-clustering frequencies `pi_ij`. Each retained iteration is
//! scored by `sum_{i<j, c_i = c_j} (pi_ij - 1/2)`, which ranks partitions
//! the same way as their least-squares distance to the co-clustering
//! matrix; the highest score wins, first occurrence on ties.

use crate::error::{Error, Result};
use fnv::FnvHashMap;
use nalgebra::DMatrix;
use rayon::prelude::*;

/// Selected partition and the statistics it was chosen with.
#[derive(Debug, Clone)]
pub struct PartitionEstimate {
    /// Absolute iteration index into the full trace (burn-in included)
    pub index: usize,
    /// Labels of that iteration
    pub labels: Vec<usize>,
    /// Score of that iteration
    pub score: f64,
    /// Symmetric `n x n` co-clustering frequencies over retained iterations
    pub coclustering: DMatrix<f64>,
}

impl PartitionEstimate {
    /// Number of communities in the selected partition.
    pub fn num_communities(&self) -> usize {
        relabel_contiguous(&self.labels)
            .iter()
            .max()
            .map(|&k| k + 1)
            .unwrap_or(0)
    }
}

/// Pick the representative partition of `trace[burnin..]`.
pub fn estimate_partition(trace: &[Vec<usize>], burnin: usize) -> Result<PartitionEstimate> {
    if trace.is_empty() {
        return Err(Error::invalid("trace", "no iterations"));
    }
    if burnin >= trace.len() {
        return Err(Error::invalid(
            "burnin",
            format!(
                "burn-in {} leaves nothing of {} iterations",
                burnin,
                trace.len()
            ),
        ));
    }

    let n = trace[0].len();
    if let Some(bad) = trace.iter().find(|labels| labels.len() != n) {
        return Err(Error::LabelMismatch {
            expected: n,
            found: bad.len(),
        });
    }

    let retained = &trace[burnin..];
    let coclustering = coclustering_probability(retained);

    let scores: Vec<f64> = retained
        .par_iter()
        .map(|labels| partition_score(labels, &coclustering))
        .collect();

    let mut best = 0;
    for (t, &s) in scores.iter().enumerate() {
        if s > scores[best] {
            best = t;
        }
    }

    Ok(PartitionEstimate {
        index: best + burnin,
        labels: retained[best].clone(),
        score: scores[best],
        coclustering,
    })
}

/// Fraction of `samples` in which each node pair shares a label.
///
/// The diagonal is 1. [`estimate_partition`] checks row lengths before
/// calling this.
///
/// # Panics
///
/// If a row of `samples` is shorter than the first one.
pub fn coclustering_probability(samples: &[Vec<usize>]) -> DMatrix<f64> {
    let n = samples.first().map(|s| s.len()).unwrap_or(0);
    let t = samples.len() as f64;

    let rows: Vec<Vec<usize>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let mut counts = vec![0usize; n];
            for labels in samples {
                let ci = labels[i];
                for (j, &cj) in labels.iter().enumerate().skip(i + 1) {
                    if ci == cj {
                        counts[j] += 1;
                    }
                }
            }
            counts
        })
        .collect();

    let mut prob = DMatrix::<f64>::identity(n, n);
    for (i, counts) in rows.iter().enumerate() {
        for j in (i + 1)..n {
            let p = counts[j] as f64 / t;
            prob[(i, j)] = p;
            prob[(j, i)] = p;
        }
    }
    prob
}

/// `sum_{i<j, c_i = c_j} (prob_ij - 1/2)`
pub fn partition_score(labels: &[usize], prob: &DMatrix<f64>) -> f64 {
    let n = labels.len();
    let mut score = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            if labels[i] == labels[j] {
                score += prob[(i, j)] - 0.5;
            }
        }
    }
    score
}

/// Map labels to `0..k` in order of first appearance.
pub fn relabel_contiguous(labels: &[usize]) -> Vec<usize> {
    let mut map: FnvHashMap<usize, usize> = FnvHashMap::default();
    labels
        .iter()
        .map(|c| {
            let next = map.len();
            *map.entry(*c).or_insert(next)
        })
        .collect()
}
