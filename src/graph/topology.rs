//! Topological sorting using Kahn's algorithm.

use super::Graph;
use crate::error::{GraphError, Result};
use crate::models::NodeId;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::debug;

/// Outcome of Kahn's algorithm, complete or not
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopoOrder {
    /// Nodes in dependency order
    pub order: Vec<NodeId>,
    /// Nodes on a cycle or only reachable through one, ascending
    pub remaining: Vec<NodeId>,
}

impl TopoOrder {
    pub fn is_complete(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn into_result(self) -> Result<Vec<NodeId>> {
        if self.is_complete() {
            Ok(self.order)
        } else {
            Err(GraphError::CycleDetected {
                remaining_nodes: self.remaining,
            })
        }
    }
}

/// Run Kahn's algorithm as far as it goes.
///
/// The frontier is FIFO. It starts with every zero in-degree node in
/// ascending order; nodes released by the same popped node join it in
/// ascending order as well, so the output only depends on the graph.
pub fn order(graph: &Graph) -> TopoOrder {
    let mut in_degree = graph.in_degrees();
    let mut frontier: VecDeque<NodeId> = graph.nodes().filter(|&n| in_degree[n] == 0).collect();
    let mut order = Vec::with_capacity(graph.node_count());
    let mut released = Vec::new();

    while let Some(node) = frontier.pop_front() {
        order.push(node);

        for (next, _) in graph.neighbors(node) {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                released.push(next);
            }
        }

        released.sort_unstable();
        frontier.extend(released.drain(..));
    }

    let remaining: Vec<NodeId> = graph.nodes().filter(|&n| in_degree[n] > 0).collect();
    debug!(
        ordered = order.len(),
        remaining = remaining.len(),
        "topological sort finished"
    );

    TopoOrder { order, remaining }
}

/// Sort `graph` so every edge points forward.
///
/// Returns [`GraphError::CycleDetected`] with the nodes that could not be
/// ordered when the graph has a cycle.
pub fn sort(graph: &Graph) -> Result<Vec<NodeId>> {
    order(graph).into_result()
}

/// Sort `graph` into layers.
///
/// Layer `k` holds, in ascending order, the nodes whose predecessors all sit
/// in layers `0..k`. The number of layers is the minimum number of rounds
/// needed when independent nodes are processed together.
pub fn sort_layers(graph: &Graph) -> Result<Vec<Vec<NodeId>>> {
    let mut in_degree = graph.in_degrees();
    let mut layer: Vec<NodeId> = graph.nodes().filter(|&n| in_degree[n] == 0).collect();
    let mut layers = Vec::new();
    let mut placed = 0;

    while !layer.is_empty() {
        let mut next_layer = Vec::new();
        for &node in &layer {
            for (next, _) in graph.neighbors(node) {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    next_layer.push(next);
                }
            }
        }
        next_layer.sort_unstable();

        placed += layer.len();
        layers.push(layer);
        layer = next_layer;
    }

    if placed < graph.node_count() {
        let remaining_nodes = graph.nodes().filter(|&n| in_degree[n] > 0).collect();
        return Err(GraphError::CycleDetected { remaining_nodes });
    }

    debug!(layers = layers.len(), "layered sort finished");
    Ok(layers)
}
