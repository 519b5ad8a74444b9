//! Weakly connected components.

use super::Graph;
use crate::models::NodeId;
use tracing::debug;

/// Component index of every node, edges taken as undirected.
///
/// Components are numbered in order of their smallest node id.
pub fn component_labels(graph: &Graph) -> Vec<usize> {
    let node_count = graph.node_count();

    // Undirected view: outgoing plus incoming neighbors
    let mut linked: Vec<Vec<NodeId>> = vec![Vec::new(); node_count];
    for edge in graph.edges() {
        linked[edge.from].push(edge.to);
        linked[edge.to].push(edge.from);
    }

    let mut labels: Vec<Option<usize>> = vec![None; node_count];
    let mut stack = Vec::new();
    let mut count = 0;

    for start in graph.nodes() {
        if labels[start].is_some() {
            continue;
        }

        labels[start] = Some(count);
        stack.push(start);
        while let Some(node) = stack.pop() {
            for &next in &linked[node] {
                if labels[next].is_none() {
                    labels[next] = Some(count);
                    stack.push(next);
                }
            }
        }
        count += 1;
    }

    debug!(components = count, "labelled components");
    labels.into_iter().map(|label| label.unwrap_or(0)).collect()
}

/// Number of weakly connected components; isolated nodes count as one each.
pub fn count_components(graph: &Graph) -> usize {
    component_labels(graph)
        .iter()
        .max()
        .map_or(0, |&highest| highest + 1)
}
