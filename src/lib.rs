//! # dagkit - directed graph analysis engine
//!
//! Builds a graph from a node count and an edge list, detects cycles,
//! produces topological orders and propagates per-node values along edges.

pub mod cli;
pub mod cli_handlers;
pub mod error;
pub mod graph;
pub mod models;

pub use error::{GraphError, Result};
pub use graph::Graph;
pub use models::*;
