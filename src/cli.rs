use crate::error::GraphError;
use crate::models::NodeId;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dagkit")]
#[command(about = "Directed graph analysis: cycles, topological order, propagation")]
#[command(version)]
pub struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a topological order of the graph
    Sort {
        /// Graph document (JSON)
        file: PathBuf,
        /// Group nodes into layers that can be processed together
        #[arg(long)]
        layers: bool,
    },

    /// Report cycles and eventually safe nodes
    Check {
        /// Graph document (JSON)
        file: PathBuf,
    },

    /// Propagate values from source nodes along weighted edges
    Propagate {
        /// Graph document (JSON)
        file: PathBuf,
        /// Source node and its starting value, e.g. `0=0`
        #[arg(long = "source", required = true, value_parser = parse_source)]
        sources: Vec<(NodeId, i64)>,
        /// Value rule
        #[arg(long, value_enum, default_value_t = RuleArg::Shortest)]
        rule: RuleArg,
        /// Traversal mode
        #[arg(long, value_enum, default_value_t = ModeArg::Auto)]
        mode: ModeArg,
    },

    /// Count weakly connected components
    Components {
        /// Graph document (JSON)
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RuleArg {
    /// Smallest sum of weights (shortest distance, earliest arrival)
    Shortest,
    /// Largest sum of weights (critical path)
    Longest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Topological pass when the graph is acyclic, frontier otherwise
    Auto,
    Dag,
    Frontier,
}

/// Parse `NODE=VALUE`
pub fn parse_source(s: &str) -> Result<(NodeId, i64), GraphError> {
    let invalid = || GraphError::InvalidSource(s.to_string());
    let (node, value) = s.split_once('=').ok_or_else(invalid)?;
    let node = node.trim().parse::<NodeId>().map_err(|_| invalid())?;
    let value = value.trim().parse::<i64>().map_err(|_| invalid())?;
    Ok((node, value))
}
