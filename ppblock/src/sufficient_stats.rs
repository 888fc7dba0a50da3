//! Edge and non-edge counts inside and across communities.
//!
//! These four counts are the sufficient statistics of the planted-partition
//! likelihood: every node pair is either an edge or a non-edge, and either
//! within one community or across two.

use crate::error::{Error, Result};
use crate::graph::GraphView;
use std::collections::BTreeMap;

/// Sufficient statistics of one community assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeStats {
    /// Community label -> number of member nodes
    pub community_size: BTreeMap<usize, usize>,
    /// Edges whose endpoints share a label
    pub edges_in: i64,
    /// Same-community node pairs without an edge
    pub non_edges_in: i64,
    /// Edges whose endpoints have different labels
    pub edges_out: i64,
    /// Cross-community node pairs without an edge
    pub non_edges_out: i64,
}

impl EdgeStats {
    /// Count edges and non-edges for `labels` over the edges of `graph`.
    ///
    /// Every node contributes to its community's size, including nodes
    /// that appear in no edge. Isolated nodes are counted on purpose: the
    /// communities then cover the node set exactly, and a graph without
    /// any edge still offers every node a community to join.
    pub fn from_labels<G>(graph: &G, labels: &[usize]) -> Result<Self>
    where
        G: GraphView + ?Sized,
    {
        let n = graph.number_of_nodes();
        if labels.len() != n {
            return Err(Error::LabelMismatch {
                expected: n,
                found: labels.len(),
            });
        }

        let mut community_size = BTreeMap::new();
        for &c in labels {
            *community_size.entry(c).or_insert(0usize) += 1;
        }

        let mut edges_in = 0i64;
        let mut edges_out = 0i64;
        for &(i, j) in graph.edges() {
            if labels[i] == labels[j] {
                edges_in += 1;
            } else {
                edges_out += 1;
            }
        }

        let total_pairs = pairs(n);
        let pairs_in: i64 = community_size.values().map(|&s| pairs(s)).sum();

        let non_edges_in = pairs_in - edges_in;
        let non_edges_out = total_pairs - pairs_in - edges_out;

        if non_edges_in < 0 || non_edges_out < 0 {
            return Err(Error::NegativeNonEdges {
                non_edges_in,
                non_edges_out,
            });
        }

        Ok(EdgeStats {
            community_size,
            edges_in,
            non_edges_in,
            edges_out,
            non_edges_out,
        })
    }

    /// Count for the labels currently stored in `graph`.
    pub fn from_graph<G>(graph: &G) -> Result<Self>
    where
        G: GraphView + ?Sized,
    {
        let labels = graph
            .communities()
            .ok_or_else(|| Error::invalid("communities", "graph has no label assignment"))?;
        Self::from_labels(graph, labels)
    }

    /// Number of non-empty communities.
    pub fn num_communities(&self) -> usize {
        self.community_size.len()
    }

    /// `edges_in + edges_out`
    pub fn num_edges(&self) -> i64 {
        self.edges_in + self.edges_out
    }

    /// All four counts together; always `n(n-1)/2`.
    pub fn num_pairs(&self) -> i64 {
        self.edges_in + self.non_edges_in + self.edges_out + self.non_edges_out
    }
}

/// `n choose 2`
fn pairs(n: usize) -> i64 {
    let n = n as i64;
    n * (n - 1).max(0) / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CommunityGraph;

    /// Reports every edge twice, as a multigraph without deduplication would.
    struct DoubledEdges {
        edges: Vec<(usize, usize)>,
    }

    impl GraphView for DoubledEdges {
        fn number_of_nodes(&self) -> usize {
            2
        }
        fn edges(&self) -> &[(usize, usize)] {
            &self.edges
        }
        fn has_edge(&self, i: usize, j: usize) -> bool {
            i != j
        }
        fn communities(&self) -> Option<&[usize]> {
            None
        }
        fn set_communities(&mut self, _labels: &[usize]) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_counts_on_small_graph() {
        // 1-2, 3-4, 1-4 with labels [1, 2, 2, 3]
        let graph = CommunityGraph::from_interactions(vec![(1, 2), (3, 4), (1, 4)]).unwrap();
        let stats = EdgeStats::from_labels(&graph, &[1, 2, 2, 3]).unwrap();

        assert_eq!(stats.num_communities(), 3);
        assert_eq!(stats.community_size[&2], 2);
        assert_eq!(stats.edges_in, 0);
        assert_eq!(stats.edges_out, 3);
        assert_eq!(stats.non_edges_in, 1);
        assert_eq!(stats.non_edges_out, 2);
        assert_eq!(stats.num_pairs(), 6);
    }

    #[test]
    fn test_isolated_nodes_are_counted() {
        let graph = CommunityGraph::from_parts(vec![1, 2, 3, 4], vec![(1, 2)]).unwrap();
        let stats = EdgeStats::from_labels(&graph, &[0, 0, 0, 7]).unwrap();

        assert_eq!(stats.community_size[&0], 3);
        assert_eq!(stats.community_size[&7], 1);
        assert_eq!(stats.edges_in, 1);
        assert_eq!(stats.non_edges_in, 2);
        assert_eq!(stats.edges_out, 0);
        assert_eq!(stats.non_edges_out, 3);
    }

    #[test]
    fn test_label_length_checked() {
        let graph = CommunityGraph::from_interactions(vec![(1, 2)]).unwrap();
        assert!(matches!(
            EdgeStats::from_labels(&graph, &[0]),
            Err(Error::LabelMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn test_from_graph_requires_labels() {
        let mut graph = CommunityGraph::from_interactions(vec![(1, 2)]).unwrap();
        assert!(EdgeStats::from_graph(&graph).is_err());
        graph.set_communities(&[3, 3]).unwrap();
        assert_eq!(EdgeStats::from_graph(&graph).unwrap().edges_in, 1);
    }

    #[test]
    fn test_duplicate_edges_surface_as_error() {
        let graph = DoubledEdges {
            edges: vec![(0, 1), (0, 1)],
        };
        let err = EdgeStats::from_labels(&graph, &[4, 4]).unwrap_err();
        assert_eq!(
            err,
            Error::NegativeNonEdges {
                non_edges_in: -1,
                non_edges_out: 0
            }
        );
    }
}
