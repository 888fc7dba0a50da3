//! Bayesian community detection with a planted-partition block model.
//!
//! Every node pair of an undirected graph is an edge with probability
//! `p_in` when both endpoints share a community and `p_out` otherwise,
//! with `p_in >= p_out`. A Gibbs sampler alternates between
//! order-constrained Beta updates of `(p_in, p_out)`, a sequential sweep
//! over node labels weighted by community size, and an Escobar-West
//! update of the concentration `alpha`. A single representative
//! partition is then picked from the label trace by least squares on
//! co-clustering frequencies.
//!
//! # Model
//!
//! ```text
//! p_in  ~ Beta(a_in, b_in)
//! p_out ~ Beta(a_out, b_out),  p_out <= p_in
//! alpha ~ Gamma(gamma_a, gamma_b)
//! A_ij | c, p_in, p_out ~ Bernoulli(c_i == c_j ? p_in : p_out)
//! ```
//!
//! # References
//!
//! Escobar & West (1995). "Bayesian density estimation and inference
//! using mixtures." JASA 90(430).
//!
//! Dahl (2006). "Model-based clustering for expression data via a
//! Dirichlet process mixture model."

#![deny(missing_docs)]
#![deny(warnings)]

/// Error type shared by every stage
pub mod error;

/// Interaction graph and the view the sampler reads
pub mod graph;

/// Edge and non-edge counts within and across communities
pub mod sufficient_stats;

/// Constrained Beta updates of `p_in` and `p_out`
pub mod edge_probability;

/// Sequential label sweep
pub mod gibbs;

/// Escobar-West concentration update
pub mod concentration;

/// Iteration driver and trace
pub mod detector;

/// Least-squares partition estimate
pub mod partition;


pub use detector::{CommunityDetector, DetectorOptions, GibbsTrace};
pub use error::{Error, Result};
pub use graph::{CommunityGraph, GraphView};
pub use partition::{estimate_partition, PartitionEstimate};
pub use sufficient_stats::EdgeStats;
