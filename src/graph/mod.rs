//! Graph engine: adjacency model, cycle detection, topological sorting,
//! weighted propagation and connected components.

pub mod components;
pub mod cycle;
pub mod propagate;
pub mod topology;

pub use components::{component_labels, count_components};
pub use cycle::{
    CycleDetector, CyclePath, CycleReport, NodeState, analyze, find_cycle, is_acyclic,
    is_acyclic_from, safe_nodes,
};
pub use propagate::{Mode, Propagation, propagate, rules};
pub use topology::{TopoOrder, order, sort, sort_layers};

use crate::error::{GraphError, Result};
use crate::models::{Edge, GraphInput, NodeId, Weight};
use std::iter::FusedIterator;
use std::slice;
use tracing::debug;

/// Immutable directed graph over the nodes `0..n`.
///
/// Adjacency lists keep the input edge order, which fixes every traversal
/// tie-break downstream. In-degrees are computed in the same pass as the
/// adjacency lists and never updated separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    adjacency: Vec<Vec<(NodeId, Weight)>>,
    in_degree: Vec<usize>,
    edge_count: usize,
}

impl Graph {
    /// Build a graph of `node_count` nodes from `edges`.
    ///
    /// Fails with [`GraphError::InvalidNode`] on the first endpoint outside
    /// `0..node_count`. Parallel edges are kept as separate entries.
    pub fn build<I, E>(node_count: usize, edges: I) -> Result<Graph>
    where
        I: IntoIterator<Item = E>,
        E: Into<Edge>,
    {
        let mut adjacency: Vec<Vec<(NodeId, Weight)>> = vec![Vec::new(); node_count];
        let mut in_degree = vec![0usize; node_count];
        let mut edge_count = 0;

        for edge in edges {
            let edge: Edge = edge.into();
            for node in [edge.from, edge.to] {
                if node >= node_count {
                    return Err(GraphError::InvalidNode { node, node_count });
                }
            }
            adjacency[edge.from].push((edge.to, edge.weight));
            in_degree[edge.to] += 1;
            edge_count += 1;
        }

        debug!(nodes = node_count, edges = edge_count, "built graph");

        Ok(Graph {
            adjacency,
            in_degree,
            edge_count,
        })
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of edges, counting duplicates
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node < self.node_count()
    }

    /// All node ids in ascending order
    pub fn nodes(&self) -> std::ops::Range<NodeId> {
        0..self.node_count()
    }

    /// Outgoing `(to, weight)` pairs of `node` in input order.
    ///
    /// A node outside the graph has no neighbors.
    pub fn neighbors(&self, node: NodeId) -> Neighbors<'_> {
        let slice = self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[]);
        Neighbors { inner: slice.iter() }
    }

    pub fn in_degree(&self, node: NodeId) -> usize {
        self.in_degree.get(node).copied().unwrap_or(0)
    }

    pub fn out_degree(&self, node: NodeId) -> usize {
        self.adjacency.get(node).map_or(0, Vec::len)
    }

    /// Every edge, grouped by source node in ascending order
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(from, targets)| {
            targets
                .iter()
                .map(move |&(to, weight)| Edge::weighted(from, to, weight))
        })
    }

    /// The same graph with every edge flipped
    pub fn reversed(&self) -> Graph {
        let node_count = self.node_count();
        let mut adjacency: Vec<Vec<(NodeId, Weight)>> = vec![Vec::new(); node_count];
        let mut in_degree = vec![0usize; node_count];

        for edge in self.edges() {
            adjacency[edge.to].push((edge.from, edge.weight));
            in_degree[edge.from] += 1;
        }

        Graph {
            adjacency,
            in_degree,
            edge_count: self.edge_count,
        }
    }

    /// Working copy of the in-degree counters for Kahn-style traversals
    pub(crate) fn in_degrees(&self) -> Vec<usize> {
        self.in_degree.clone()
    }
}

impl TryFrom<GraphInput> for Graph {
    type Error = GraphError;

    fn try_from(input: GraphInput) -> Result<Self> {
        Graph::build(input.nodes, input.edges)
    }
}

/// Lazy iterator over the outgoing edges of one node
#[derive(Debug, Clone)]
pub struct Neighbors<'a> {
    inner: slice::Iter<'a, (NodeId, Weight)>,
}

impl Iterator for Neighbors<'_> {
    type Item = (NodeId, Weight);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Neighbors<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().copied()
    }
}

impl ExactSizeIterator for Neighbors<'_> {}

impl FusedIterator for Neighbors<'_> {}
