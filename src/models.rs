use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense node handle in `0..n`
pub type NodeId = usize;

/// Edge weight; unweighted edges carry [`DEFAULT_WEIGHT`]
pub type Weight = i64;

pub const DEFAULT_WEIGHT: Weight = 1;

/// A directed edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default = "default_weight")]
    pub weight: Weight,
}

fn default_weight() -> Weight {
    DEFAULT_WEIGHT
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Edge {
            from,
            to,
            weight: DEFAULT_WEIGHT,
        }
    }

    pub fn weighted(from: NodeId, to: NodeId, weight: Weight) -> Self {
        Edge { from, to, weight }
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

impl From<(NodeId, NodeId)> for Edge {
    fn from((from, to): (NodeId, NodeId)) -> Self {
        Edge::new(from, to)
    }
}

impl From<(NodeId, NodeId, Weight)> for Edge {
    fn from((from, to, weight): (NodeId, NodeId, Weight)) -> Self {
        Edge::weighted(from, to, weight)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} -> #{} ({})", self.from, self.to, self.weight)
    }
}

/// Edge as written in a graph document: `[from, to]` or `[from, to, weight]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EdgeInput {
    Weighted(NodeId, NodeId, Weight),
    Pair(NodeId, NodeId),
}

impl From<EdgeInput> for Edge {
    fn from(input: EdgeInput) -> Self {
        match input {
            EdgeInput::Weighted(from, to, weight) => Edge::weighted(from, to, weight),
            EdgeInput::Pair(from, to) => Edge::new(from, to),
        }
    }
}

/// A graph document, e.g. `{"nodes": 3, "edges": [[0, 1], [1, 2, 5]]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphInput {
    pub nodes: usize,
    #[serde(default)]
    pub edges: Vec<EdgeInput>,
}
