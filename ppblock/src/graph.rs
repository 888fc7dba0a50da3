//! Interaction graph with a mutable community assignment.
//!
//! Nodes are kept in ascending identifier order; every index used by the
//! sampler refers to that order. Repeated interactions between one pair
//! are counted, but the pair is a single edge for likelihood purposes.

use crate::error::{Error, Result};
use fnv::{FnvHashMap, FnvHashSet};
use std::collections::BTreeSet;
use std::hash::Hash;

/// What the sampler needs to see of a graph.
///
/// Node indices run over `0..number_of_nodes()` in a fixed order.
pub trait GraphView {
    /// Number of nodes.
    fn number_of_nodes(&self) -> usize;

    /// Distinct unordered edges `(i, j)` with `i < j`, each listed once.
    fn edges(&self) -> &[(usize, usize)];

    /// Whether nodes `i` and `j` interacted at least once.
    fn has_edge(&self, i: usize, j: usize) -> bool;

    /// Current community labels, `None` before the first assignment.
    fn communities(&self) -> Option<&[usize]>;

    /// Replace all labels at once.
    ///
    /// Fails with [`Error::LabelMismatch`] unless `labels.len()` equals
    /// the node count; the stored labels are untouched on failure.
    fn set_communities(&mut self, labels: &[usize]) -> Result<()>;

    /// Number of distinct edges.
    fn number_of_edges(&self) -> usize {
        self.edges().len()
    }

    /// Number of distinct labels currently assigned (0 if unassigned).
    fn number_of_communities(&self) -> usize {
        self.communities()
            .map(|labels| labels.iter().collect::<BTreeSet<_>>().len())
            .unwrap_or(0)
    }
}

/// Undirected interaction graph over arbitrary ordered node identifiers.
#[derive(Debug, Clone)]
pub struct CommunityGraph<N> {
    node_ids: Vec<N>,
    index: FnvHashMap<N, usize>,
    adjacency: Vec<FnvHashSet<usize>>,
    edges: Vec<(usize, usize)>,
    interaction_count: FnvHashMap<(usize, usize), usize>,
    membership: Option<Vec<usize>>,
}

impl<N> CommunityGraph<N>
where
    N: Ord + Clone + Hash,
{
    /// Build a graph whose nodes are the endpoints of `interactions`.
    pub fn from_interactions<I>(interactions: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, N)>,
    {
        Self::from_counted_interactions(
            std::iter::empty(),
            interactions.into_iter().map(|(a, b)| (a, b, 1)),
        )
    }

    /// Build a graph from an explicit node list plus interactions.
    ///
    /// Nodes mentioned only in `interactions` are added too, so isolated
    /// nodes are the only reason to pass `nodes`.
    pub fn from_parts<V, I>(nodes: V, interactions: I) -> Result<Self>
    where
        V: IntoIterator<Item = N>,
        I: IntoIterator<Item = (N, N)>,
    {
        Self::from_counted_interactions(nodes, interactions.into_iter().map(|(a, b)| (a, b, 1)))
    }

    /// Like [`Self::from_parts`] with a multiplicity per record.
    ///
    /// Records with a zero count add their endpoints as nodes but no edge.
    pub fn from_counted_interactions<V, I>(nodes: V, interactions: I) -> Result<Self>
    where
        V: IntoIterator<Item = N>,
        I: IntoIterator<Item = (N, N, usize)>,
    {
        let records: Vec<(N, N, usize)> = interactions.into_iter().collect();

        let mut node_set: BTreeSet<N> = nodes.into_iter().collect();
        for (a, b, _) in &records {
            node_set.insert(a.clone());
            node_set.insert(b.clone());
        }

        let node_ids: Vec<N> = node_set.into_iter().collect();
        let index: FnvHashMap<N, usize> = node_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        let mut interaction_count: FnvHashMap<(usize, usize), usize> = FnvHashMap::default();
        for (a, b, count) in &records {
            let (i, j) = (index[a], index[b]);
            if i == j {
                return Err(Error::SelfInteraction { node: i });
            }
            if *count == 0 {
                continue;
            }
            *interaction_count.entry((i.min(j), i.max(j))).or_default() += count;
        }

        let mut edges: Vec<(usize, usize)> = interaction_count.keys().copied().collect();
        edges.sort_unstable();

        let mut adjacency = vec![FnvHashSet::default(); node_ids.len()];
        for &(i, j) in &edges {
            adjacency[i].insert(j);
            adjacency[j].insert(i);
        }

        Ok(CommunityGraph {
            node_ids,
            index,
            adjacency,
            edges,
            interaction_count,
            membership: None,
        })
    }

    /// Node identifiers in ascending order.
    pub fn node_ids(&self) -> &[N] {
        &self.node_ids
    }

    /// Position of `id` in the node order.
    pub fn index_of(&self, id: &N) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Current label of `id`, if it exists and labels were assigned.
    pub fn community_of(&self, id: &N) -> Option<usize> {
        let i = self.index_of(id)?;
        self.membership.as_ref().map(|labels| labels[i])
    }

    /// Neighbours of node `i`.
    pub fn neighbors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[i].iter().copied()
    }

    /// Recorded interactions between `i` and `j` (0 if none).
    pub fn interaction_count(&self, i: usize, j: usize) -> usize {
        self.interaction_count
            .get(&(i.min(j), i.max(j)))
            .copied()
            .unwrap_or(0)
    }

    /// Total recorded interactions, counting repeats.
    pub fn number_of_interactions(&self) -> usize {
        self.interaction_count.values().sum()
    }
}

impl<N> GraphView for CommunityGraph<N> {
    fn number_of_nodes(&self) -> usize {
        self.adjacency.len()
    }

    fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    fn has_edge(&self, i: usize, j: usize) -> bool {
        self.adjacency[i].contains(&j)
    }

    fn communities(&self) -> Option<&[usize]> {
        self.membership.as_deref()
    }

    fn set_communities(&mut self, labels: &[usize]) -> Result<()> {
        if labels.len() != self.number_of_nodes() {
            return Err(Error::LabelMismatch {
                expected: self.number_of_nodes(),
                found: labels.len(),
            });
        }
        match self.membership.as_mut() {
            Some(membership) => membership.copy_from_slice(labels),
            None => self.membership = Some(labels.to_vec()),
        }
        Ok(())
    }
}
