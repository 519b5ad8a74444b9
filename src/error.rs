use crate::models::NodeId;
use thiserror::Error;

/// All possible errors raised by the graph engine and its command-line caller
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Node #{node} is out of range for a graph of {node_count} nodes")]
    InvalidNode { node: NodeId, node_count: usize },

    #[error("Graph contains a cycle; cannot order: {nodes}", nodes = format_nodes(remaining_nodes))]
    CycleDetected { remaining_nodes: Vec<NodeId> },

    #[error("Propagation does not settle: #{node} keeps improving around a cycle")]
    Divergent { node: NodeId },

    #[error("Invalid source {0:?}, expected NODE=VALUE")]
    InvalidSource(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Format a list of node ids as a comma-separated string with # prefix.
pub fn format_nodes(nodes: &[NodeId]) -> String {
    nodes
        .iter()
        .map(|id| format!("#{id}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias
pub type Result<T> = std::result::Result<T, GraphError>;
