//! Weighted propagation of a per-node attribute along directed edges.
//!
//! A propagation starts from a set of source values and pushes them along
//! edges. `combine(value, weight)` produces the candidate a neighbor is
//! offered, and `should_update(current, candidate)` decides whether the
//! candidate replaces the neighbor's current value. Min-plus gives shortest
//! distances, max-plus gives critical paths, and carrying a value unchanged
//! with a custom comparison gives "best value seen upstream".

use super::{Graph, cycle, topology};
use crate::error::{GraphError, Result};
use crate::models::{NodeId, Weight};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::{debug, trace};

/// How values travel through the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// One pass in topological order. Fails with `CycleDetected` on cyclic graphs.
    Dag,
    /// Best-first frontier; nodes are revisited whenever they improve.
    Frontier,
}

impl Mode {
    /// `Dag` for acyclic graphs, `Frontier` otherwise
    pub fn for_graph(graph: &Graph) -> Mode {
        if cycle::is_acyclic(graph) {
            Mode::Dag
        } else {
            Mode::Frontier
        }
    }
}

/// Per-node values produced by [`propagate`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Propagation<V> {
    values: Vec<V>,
    reached: Vec<bool>,
}

impl<V> Propagation<V> {
    /// Value of `node` if a source or an update reached it
    pub fn get(&self, node: NodeId) -> Option<&V> {
        if self.is_reached(node) {
            self.values.get(node)
        } else {
            None
        }
    }

    /// Values of every node, with the default left in unreached ones
    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn into_values(self) -> Vec<V> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_reached(&self, node: NodeId) -> bool {
        self.reached.get(node).copied().unwrap_or(false)
    }

    /// Reached nodes and their values, ascending by node
    pub fn reached(&self) -> impl Iterator<Item = (NodeId, &V)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|&(node, _)| self.reached[node])
    }

    pub fn unreached(&self) -> Vec<NodeId> {
        self.reached
            .iter()
            .enumerate()
            .filter(|&(_, &reached)| !reached)
            .map(|(node, _)| node)
            .collect()
    }

    pub fn all_reached(&self) -> bool {
        self.reached.iter().all(|&r| r)
    }
}

/// Propagate source values through `graph`.
///
/// Every node starts at `default` and unreached. Sources overwrite it; a
/// source listed twice keeps the value `should_update` prefers. Only reached
/// nodes relax their outgoing edges, so `combine` never sees the default.
///
/// Unreached nodes are not an error; inspect [`Propagation::unreached`].
///
/// Errors:
/// - `InvalidNode` for a source outside the graph,
/// - `CycleDetected` in [`Mode::Dag`] when the graph has a cycle,
/// - `Divergent` in [`Mode::Frontier`] when a value keeps improving around a
///   cycle (for example a negative cycle under min-plus).
pub fn propagate<V, S, C, U>(
    graph: &Graph,
    sources: S,
    default: V,
    mode: Mode,
    combine: C,
    should_update: U,
) -> Result<Propagation<V>>
where
    V: Clone + PartialEq,
    S: IntoIterator<Item = (NodeId, V)>,
    C: Fn(&V, Weight) -> V,
    U: Fn(&V, &V) -> bool,
{
    let mut propagator = Propagator {
        graph,
        combine,
        should_update,
        values: vec![default; graph.node_count()],
        reached: vec![false; graph.node_count()],
    };
    propagator.seed(sources)?;

    match mode {
        Mode::Dag => propagator.run_dag()?,
        Mode::Frontier => propagator.run_frontier()?,
    }

    let result = propagator.finish();
    debug!(
        ?mode,
        nodes = result.len(),
        unreached = result.unreached().len(),
        "propagation finished"
    );
    Ok(result)
}

/// Working state of one propagation
struct Propagator<'g, V, C, U> {
    graph: &'g Graph,
    combine: C,
    should_update: U,
    values: Vec<V>,
    reached: Vec<bool>,
}

impl<V, C, U> Propagator<'_, V, C, U>
where
    V: Clone + PartialEq,
    C: Fn(&V, Weight) -> V,
    U: Fn(&V, &V) -> bool,
{
    fn seed<S>(&mut self, sources: S) -> Result<()>
    where
        S: IntoIterator<Item = (NodeId, V)>,
    {
        let node_count = self.graph.node_count();
        for (node, value) in sources {
            if node >= node_count {
                return Err(GraphError::InvalidNode { node, node_count });
            }
            if !self.reached[node] || (self.should_update)(&self.values[node], &value) {
                self.values[node] = value;
                self.reached[node] = true;
            }
        }
        Ok(())
    }

    /// Offer `from`'s value to `to` over an edge of `weight`.
    fn relax(&mut self, from: NodeId, to: NodeId, weight: Weight) -> bool {
        let candidate = (self.combine)(&self.values[from], weight);
        if !(self.should_update)(&self.values[to], &candidate) {
            return false;
        }
        trace!(from, to, weight, "value improved");
        self.values[to] = candidate;
        self.reached[to] = true;
        true
    }

    /// In topological order a node's value is final before it is read.
    fn run_dag(&mut self) -> Result<()> {
        let graph = self.graph;
        let mut improved = 0usize;
        for node in topology::sort(graph)? {
            if !self.reached[node] {
                continue;
            }
            for (next, weight) in graph.neighbors(node) {
                if self.relax(node, next, weight) {
                    improved += 1;
                }
            }
        }
        trace!(improved, "single pass relaxation done");
        Ok(())
    }

    /// Best-first relaxation.
    ///
    /// The frontier pops the value `should_update` ranks best, ties broken
    /// by ascending node. A popped entry whose value was since replaced is
    /// stale and skipped. `hops` counts the edges behind each node's current
    /// value; reaching `n` hops means the value went around a cycle and still
    /// improved, which would never settle.
    fn run_frontier(&mut self) -> Result<()> {
        let graph = self.graph;
        let node_count = graph.node_count();
        let mut hops = vec![0usize; node_count];
        let mut frontier: BinaryHeap<Pending<'_, V, U>> = BinaryHeap::new();

        for node in graph.nodes().filter(|&n| self.reached[n]) {
            frontier.push(Pending {
                value: self.values[node].clone(),
                node,
                better: &self.should_update,
            });
        }

        while let Some(Pending { value, node, .. }) = frontier.pop() {
            if value != self.values[node] {
                continue;
            }

            for (next, weight) in graph.neighbors(node) {
                let candidate = (self.combine)(&value, weight);
                if !(self.should_update)(&self.values[next], &candidate) {
                    continue;
                }

                hops[next] = hops[node] + 1;
                if hops[next] >= node_count {
                    return Err(GraphError::Divergent { node: next });
                }

                trace!(from = node, to = next, weight, "value improved");
                self.values[next] = candidate.clone();
                self.reached[next] = true;
                frontier.push(Pending {
                    value: candidate,
                    node: next,
                    better: &self.should_update,
                });
            }
        }

        Ok(())
    }

    fn finish(self) -> Propagation<V> {
        Propagation {
            values: self.values,
            reached: self.reached,
        }
    }
}

/// Frontier entry ranked by the caller's own preference.
///
/// BinaryHeap is a max-heap: the entry `should_update` would pick is the
/// greatest, and on a tie the lower node id is.
struct Pending<'r, V, U> {
    value: V,
    node: NodeId,
    better: &'r U,
}

impl<V, U> Ord for Pending<'_, V, U>
where
    U: Fn(&V, &V) -> bool,
{
    fn cmp(&self, other: &Self) -> Ordering {
        if (self.better)(&other.value, &self.value) {
            Ordering::Greater
        } else if (self.better)(&self.value, &other.value) {
            Ordering::Less
        } else {
            other.node.cmp(&self.node)
        }
    }
}

impl<V, U> PartialOrd for Pending<'_, V, U>
where
    U: Fn(&V, &V) -> bool,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<V, U> PartialEq for Pending<'_, V, U>
where
    U: Fn(&V, &V) -> bool,
{
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<V, U> Eq for Pending<'_, V, U> where U: Fn(&V, &V) -> bool {}

/// Ready-made `combine` and `should_update` functions.
pub mod rules {
    use crate::models::Weight;

    /// Add the edge weight, saturating at the integer bounds
    pub fn add(value: &i64, weight: Weight) -> i64 {
        value.saturating_add(weight)
    }

    /// Pass the value along unchanged
    pub fn carry<V: Clone>(value: &V, _weight: Weight) -> V {
        value.clone()
    }

    /// Prefer smaller values
    pub fn less<V: PartialOrd>(current: &V, candidate: &V) -> bool {
        candidate < current
    }

    /// Prefer larger values
    pub fn greater<V: PartialOrd>(current: &V, candidate: &V) -> bool {
        candidate > current
    }
}
