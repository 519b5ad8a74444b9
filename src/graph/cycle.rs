//! Cycle detection with three-color depth-first traversal.

use super::{Graph, Neighbors};
use crate::models::NodeId;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, trace};

/// Traversal color of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    Unvisited,
    /// On the traversal stack, or known to lead into a cycle once traversal ends
    InProgress,
    /// Fully explored; every path from here ends at a node without outgoing edges
    Done,
}

/// A path representing a cycle, with the first node repeated at the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CyclePath {
    pub path: Vec<NodeId>,
}

impl CyclePath {
    pub fn new(path: Vec<NodeId>) -> Self {
        Self { path }
    }

    /// Distinct nodes on the cycle
    pub fn nodes(&self) -> &[NodeId] {
        match self.path.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }

    /// Format the cycle as a string.
    pub fn format(&self) -> String {
        self.path
            .iter()
            .map(|id| format!("#{id}"))
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

impl fmt::Display for CyclePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// Depth-first cycle detector.
///
/// Holds one state array for a single analysis. A `Done` node is never
/// explored twice, however many start nodes reach it, so a full run costs
/// O(V + E). The traversal uses an explicit stack, so deep chains do not
/// overflow the call stack.
pub struct CycleDetector<'g> {
    graph: &'g Graph,
    state: Vec<NodeState>,
    stack: Vec<(NodeId, Neighbors<'g>)>,
}

impl<'g> CycleDetector<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        CycleDetector {
            graph,
            state: vec![NodeState::Unvisited; graph.node_count()],
            stack: Vec::new(),
        }
    }

    /// Explore everything reachable from `start`.
    ///
    /// Returns the `InProgress` node that stopped the traversal, if any. In
    /// that case every node still on the stack leads into a cycle and keeps
    /// its `InProgress` color.
    fn explore(&mut self, start: NodeId) -> Option<NodeId> {
        match self.state[start] {
            NodeState::Done => return None,
            NodeState::InProgress => return Some(start),
            NodeState::Unvisited => {}
        }

        self.state[start] = NodeState::InProgress;
        self.stack.push((start, self.graph.neighbors(start)));

        while let Some((node, neighbors)) = self.stack.last_mut() {
            let node = *node;
            match neighbors.next() {
                Some((next, _)) => match self.state[next] {
                    NodeState::Unvisited => {
                        self.state[next] = NodeState::InProgress;
                        self.stack.push((next, self.graph.neighbors(next)));
                    }
                    NodeState::InProgress => {
                        trace!(from = node, to = next, "edge into unsafe node");
                        return Some(next);
                    }
                    NodeState::Done => {}
                },
                None => {
                    self.state[node] = NodeState::Done;
                    self.stack.pop();
                }
            }
        }

        None
    }

    /// Color every node of the graph.
    pub fn run(self) -> CycleReport {
        let nodes = self.graph.nodes();
        self.run_from(nodes)
    }

    /// Color the nodes reachable from `starts`; the rest stay `Unvisited`.
    ///
    /// Start ids outside the graph are ignored.
    pub fn run_from<I>(mut self, starts: I) -> CycleReport
    where
        I: IntoIterator<Item = NodeId>,
    {
        for start in starts {
            if self.graph.contains(start) && self.explore(start).is_some() {
                self.stack.clear();
            }
        }

        let report = CycleReport { states: self.state };
        debug!(
            nodes = report.states.len(),
            unsafe_nodes = report.unsafe_nodes().len(),
            "cycle analysis finished"
        );
        report
    }

    /// Stop at the first cycle found and return it.
    pub fn first_cycle(mut self) -> Option<CyclePath> {
        for start in self.graph.nodes() {
            let Some(hit) = self.explore(start) else {
                continue;
            };

            if let Some(pos) = self.stack.iter().position(|(node, _)| *node == hit) {
                let mut path: Vec<NodeId> =
                    self.stack[pos..].iter().map(|(node, _)| *node).collect();
                path.push(hit);
                return Some(CyclePath::new(path));
            }
            self.stack.clear();
        }

        None
    }
}

/// Final node colors of one cycle analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    states: Vec<NodeState>,
}

impl CycleReport {
    pub fn states(&self) -> &[NodeState] {
        &self.states
    }

    pub fn state(&self, node: NodeId) -> Option<NodeState> {
        self.states.get(node).copied()
    }

    /// No analyzed node is on or leads into a cycle
    pub fn is_acyclic(&self) -> bool {
        !self.states.contains(&NodeState::InProgress)
    }

    /// Nodes from which every path terminates
    pub fn safe_nodes(&self) -> BTreeSet<NodeId> {
        self.nodes_in(NodeState::Done)
    }

    /// Nodes on a cycle or with a path into one
    pub fn unsafe_nodes(&self) -> BTreeSet<NodeId> {
        self.nodes_in(NodeState::InProgress)
    }

    fn nodes_in(&self, wanted: NodeState) -> BTreeSet<NodeId> {
        self.states
            .iter()
            .enumerate()
            .filter(|&(_, &state)| state == wanted)
            .map(|(node, _)| node)
            .collect()
    }
}

/// Color every node of `graph`.
pub fn analyze(graph: &Graph) -> CycleReport {
    CycleDetector::new(graph).run()
}

pub fn is_acyclic(graph: &Graph) -> bool {
    analyze(graph).is_acyclic()
}

/// Whether any cycle is reachable from `starts`.
pub fn is_acyclic_from<I>(graph: &Graph, starts: I) -> bool
where
    I: IntoIterator<Item = NodeId>,
{
    CycleDetector::new(graph).run_from(starts).is_acyclic()
}

/// Nodes that cannot reach any cycle ("eventually safe" nodes).
pub fn safe_nodes(graph: &Graph) -> BTreeSet<NodeId> {
    analyze(graph).safe_nodes()
}

/// One cycle of `graph`, if any exists.
pub fn find_cycle(graph: &Graph) -> Option<CyclePath> {
    CycleDetector::new(graph).first_cycle()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_is_acyclic() {
        let graph = Graph::build(4, [(0, 1), (1, 2), (2, 3)]).unwrap();
        assert!(is_acyclic(&graph));
        assert_eq!(safe_nodes(&graph), BTreeSet::from([0, 1, 2, 3]));
        assert!(find_cycle(&graph).is_none());
    }

    #[test]
    fn test_two_cycle() {
        let graph = Graph::build(2, [(0, 1), (1, 0)]).unwrap();
        let report = analyze(&graph);
        assert!(!report.is_acyclic());
        assert!(report.safe_nodes().is_empty());
        assert_eq!(report.unsafe_nodes(), BTreeSet::from([0, 1]));
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let graph = Graph::build(1, [(0, 0)]).unwrap();
        assert!(!is_acyclic(&graph));

        let cycle = find_cycle(&graph).unwrap();
        assert_eq!(cycle.path, vec![0, 0]);
        assert_eq!(cycle.nodes(), &[0]);
    }

    #[test]
    fn test_eventually_safe_nodes() {
        // 0 -> 1 -> 3 -> 0 is a cycle; 2, 4, 5 and 6 all end at sinks
        let graph = Graph::build(
            7,
            [(0, 1), (0, 2), (1, 2), (1, 3), (2, 5), (3, 0), (4, 5)],
        )
        .unwrap();

        assert_eq!(safe_nodes(&graph), BTreeSet::from([2, 4, 5, 6]));
        assert_eq!(analyze(&graph).unsafe_nodes(), BTreeSet::from([0, 1, 3]));
    }

    #[test]
    fn test_node_leading_into_cycle_is_unsafe() {
        // 0 -> 1 <-> 2, and 3 -> 0 reached from a later start
        let graph = Graph::build(4, [(0, 1), (1, 2), (2, 1), (3, 0)]).unwrap();
        let report = analyze(&graph);

        assert_eq!(report.state(3), Some(NodeState::InProgress));
        assert_eq!(report.unsafe_nodes(), BTreeSet::from([0, 1, 2, 3]));
    }

    #[test]
    fn test_shared_descendant_explored_once() {
        // Diamond: both branches reach 3, which is Done after the first branch
        let graph = Graph::build(4, [(0, 1), (0, 2), (1, 3), (2, 3)]).unwrap();
        let report = analyze(&graph);
        assert!(report.is_acyclic());
        assert!(report.states().iter().all(|&s| s == NodeState::Done));
    }

    #[test]
    fn test_find_cycle_path() {
        // 0 -> 1 -> 2 -> 3 -> 1
        let graph = Graph::build(4, [(0, 1), (1, 2), (2, 3), (3, 1)]).unwrap();
        let cycle = find_cycle(&graph).unwrap();
        assert_eq!(cycle.path, vec![1, 2, 3, 1]);
        assert_eq!(cycle.nodes(), &[1, 2, 3]);
    }

    #[test]
    fn test_restricted_to_start_set() {
        // 0 -> 1 is clean; 2 <-> 3 is a cycle not reachable from 0
        let graph = Graph::build(4, [(0, 1), (2, 3), (3, 2)]).unwrap();

        assert!(is_acyclic_from(&graph, [0]));
        assert!(!is_acyclic_from(&graph, [0, 2]));
        assert!(!is_acyclic(&graph));

        let report = CycleDetector::new(&graph).run_from([0, 9]);
        assert_eq!(report.state(2), Some(NodeState::Unvisited));
        assert_eq!(report.safe_nodes(), BTreeSet::from([0, 1]));
    }

    #[test]
    fn test_cycle_path_format() {
        let path = CyclePath::new(vec![1, 2, 3, 1]);
        assert_eq!(path.format(), "#1 → #2 → #3 → #1");
        assert_eq!(path.to_string(), "#1 → #2 → #3 → #1");
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let n = 100_000;
        let graph = Graph::build(n, (1..n).map(|i| (i - 1, i))).unwrap();
        assert!(is_acyclic(&graph));
    }

    #[test]
    fn test_empty_graph_is_acyclic() {
        let graph = Graph::build(0, Vec::<(NodeId, NodeId)>::new()).unwrap();
        assert!(is_acyclic(&graph));
        assert!(safe_nodes(&graph).is_empty());
    }
}
