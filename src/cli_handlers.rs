use crate::cli::{ModeArg, RuleArg};
use crate::error::{Result, format_nodes};
use crate::graph::{self, Graph, Mode, Propagation, rules};
use crate::models::{GraphInput, NodeId};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::info;

/// Load a graph document from `path`
pub fn load_graph(path: &Path) -> Result<Graph> {
    let text = fs::read_to_string(path)?;
    let input: GraphInput = serde_json::from_str(&text)?;
    info!(path = %path.display(), nodes = input.nodes, edges = input.edges.len(), "loaded graph");
    Graph::try_from(input)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Handle the sort command
pub fn handle_sort(path: &Path, layers: bool, json: bool) -> Result<()> {
    let graph = load_graph(path)?;

    if layers {
        let layers = graph::sort_layers(&graph)?;
        if json {
            return print_json(&layers);
        }
        for (i, layer) in layers.iter().enumerate() {
            println!("Layer {}: {}", i + 1, format_nodes(layer));
        }
        return Ok(());
    }

    let order = graph::sort(&graph)?;
    if json {
        return print_json(&order);
    }
    println!("Order: {}", format_nodes(&order));
    Ok(())
}

#[derive(Serialize)]
struct CheckReport {
    acyclic: bool,
    safe_nodes: BTreeSet<NodeId>,
    unsafe_nodes: BTreeSet<NodeId>,
    cycle: Option<Vec<NodeId>>,
}

/// Handle the check command
pub fn handle_check(path: &Path, json: bool) -> Result<()> {
    let graph = load_graph(path)?;
    let analysis = graph::analyze(&graph);
    let cycle = graph::find_cycle(&graph);

    let report = CheckReport {
        acyclic: analysis.is_acyclic(),
        safe_nodes: analysis.safe_nodes(),
        unsafe_nodes: analysis.unsafe_nodes(),
        cycle: cycle.as_ref().map(|c| c.path.clone()),
    };

    if json {
        return print_json(&report);
    }

    let yes_no = |b: bool| if b { "yes" } else { "no" };
    let list = |nodes: &BTreeSet<NodeId>| format_nodes(&nodes.iter().copied().collect::<Vec<_>>());

    println!("Acyclic:      {}", yes_no(report.acyclic));
    println!("Safe nodes:   {}", list(&report.safe_nodes));
    println!("Unsafe nodes: {}", list(&report.unsafe_nodes));
    if let Some(cycle) = cycle {
        println!("Cycle:        {cycle}");
    }
    Ok(())
}

#[derive(Serialize)]
struct PropagateReport {
    mode: Mode,
    values: Vec<Option<i64>>,
    unreached: Vec<NodeId>,
}

/// Handle the propagate command
pub fn handle_propagate(
    path: &Path,
    sources: &[(NodeId, i64)],
    rule: RuleArg,
    mode: ModeArg,
    json: bool,
) -> Result<()> {
    let graph = load_graph(path)?;

    let mode = match mode {
        ModeArg::Auto => Mode::for_graph(&graph),
        ModeArg::Dag => Mode::Dag,
        ModeArg::Frontier => Mode::Frontier,
    };

    let sources = sources.iter().copied();
    let result: Propagation<i64> = match rule {
        RuleArg::Shortest => {
            graph::propagate(&graph, sources, i64::MAX, mode, rules::add, rules::less)?
        }
        RuleArg::Longest => {
            graph::propagate(&graph, sources, i64::MIN, mode, rules::add, rules::greater)?
        }
    };

    let report = PropagateReport {
        mode,
        values: graph.nodes().map(|node| result.get(node).copied()).collect(),
        unreached: result.unreached(),
    };

    if json {
        return print_json(&report);
    }

    for (node, value) in report.values.iter().enumerate() {
        match value {
            Some(value) => println!("#{node}: {value}"),
            None => println!("#{node}: unreached"),
        }
    }
    println!(
        "Reached {}/{} nodes",
        graph.node_count() - report.unreached.len(),
        graph.node_count()
    );
    Ok(())
}

#[derive(Serialize)]
struct ComponentsReport {
    count: usize,
    labels: Vec<usize>,
}

/// Handle the components command
pub fn handle_components(path: &Path, json: bool) -> Result<()> {
    let graph = load_graph(path)?;
    let labels = graph::component_labels(&graph);
    let report = ComponentsReport {
        count: labels.iter().max().map_or(0, |&highest| highest + 1),
        labels,
    };

    if json {
        return print_json(&report);
    }

    println!("Components: {}", report.count);
    for component in 0..report.count {
        let members: Vec<NodeId> = report
            .labels
            .iter()
            .enumerate()
            .filter(|&(_, &label)| label == component)
            .map(|(node, _)| node)
            .collect();
        println!("  {}: {}", component + 1, format_nodes(&members));
    }
    Ok(())
}
