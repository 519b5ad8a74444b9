use dagkit::graph::{self, Mode, rules};
use dagkit::{Graph, NodeId, Weight};
use proptest::prelude::*;

type EdgeList = Vec<(NodeId, NodeId, Weight)>;

/// Random DAG: edges only point from lower to higher rank, and ranks are
/// shuffled onto node ids so the order is not simply ascending.
fn dag() -> impl Strategy<Value = (usize, EdgeList)> {
    (1usize..24)
        .prop_flat_map(|n| {
            let edges = prop::collection::vec((0..n, 0..n, 0i64..20), 0..n * 3);
            let labels = Just((0..n).collect::<Vec<NodeId>>()).prop_shuffle();
            (Just(n), edges, labels)
        })
        .prop_map(|(n, edges, labels)| {
            let edges = edges
                .into_iter()
                .filter(|&(a, b, _)| a != b)
                .map(|(a, b, w)| {
                    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
                    (labels[lo], labels[hi], w)
                })
                .collect();
            (n, edges)
        })
}

/// Random graph, cycles and self-loops allowed
fn any_graph() -> impl Strategy<Value = (usize, EdgeList)> {
    (1usize..20).prop_flat_map(|n| {
        let edges = prop::collection::vec((0..n, 0..n, 0i64..20), 0..n * 2);
        (Just(n), edges)
    })
}

fn position(order: &[NodeId], node: NodeId) -> usize {
    order.iter().position(|&n| n == node).unwrap()
}

proptest! {
    #[test]
    fn dag_sort_is_a_valid_permutation((n, edges) in dag()) {
        let graph = Graph::build(n, edges.clone()).unwrap();
        let order = graph::sort(&graph).unwrap();

        let mut seen = order.clone();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..n).collect::<Vec<_>>());

        for (from, to, _) in edges {
            prop_assert!(position(&order, from) < position(&order, to));
        }
    }

    #[test]
    fn dag_layers_respect_edges((n, edges) in dag()) {
        let graph = Graph::build(n, edges.clone()).unwrap();
        let layers = graph::sort_layers(&graph).unwrap();

        let mut layer_of = vec![usize::MAX; n];
        for (i, layer) in layers.iter().enumerate() {
            for &node in layer {
                layer_of[node] = i;
            }
        }
        prop_assert!(layer_of.iter().all(|&l| l != usize::MAX));
        for (from, to, _) in edges {
            prop_assert!(layer_of[from] < layer_of[to]);
        }
    }

    #[test]
    fn acyclic_iff_sort_succeeds((n, edges) in any_graph()) {
        let graph = Graph::build(n, edges).unwrap();
        let acyclic = graph::is_acyclic(&graph);
        let order = graph::order(&graph);

        prop_assert_eq!(acyclic, graph::sort(&graph).is_ok());
        prop_assert_eq!(acyclic, order.order.len() == n);
        prop_assert_eq!(order.order.len() + order.remaining.len(), n);
    }

    #[test]
    fn cycle_nodes_are_never_ordered((n, edges) in any_graph()) {
        let graph = Graph::build(n, edges).unwrap();
        let order = graph::order(&graph);
        let report = graph::analyze(&graph);

        if let Some(cycle) = graph::find_cycle(&graph) {
            for node in cycle.nodes() {
                prop_assert!(order.remaining.contains(node));
                prop_assert!(report.unsafe_nodes().contains(node));
            }
        } else {
            prop_assert!(order.is_complete());
        }
    }

    #[test]
    fn sort_is_deterministic((n, edges) in any_graph()) {
        let graph = Graph::build(n, edges).unwrap();
        prop_assert_eq!(graph::order(&graph), graph::order(&graph));
    }

    #[test]
    fn safe_nodes_only_lead_to_safe_nodes((n, edges) in any_graph()) {
        let graph = Graph::build(n, edges).unwrap();
        let safe = graph::safe_nodes(&graph);

        for node in graph.nodes() {
            let all_next_safe = graph.neighbors(node).all(|(next, _)| safe.contains(&next));
            prop_assert_eq!(safe.contains(&node), all_next_safe);
        }
    }

    #[test]
    fn dag_and_frontier_propagation_agree((n, edges) in dag(), source in 0usize..24) {
        let source = source % n;
        let graph = Graph::build(n, edges).unwrap();

        let dag = graph::propagate(&graph, [(source, 0)], i64::MAX, Mode::Dag, rules::add, rules::less)
            .unwrap();
        let frontier =
            graph::propagate(&graph, [(source, 0)], i64::MAX, Mode::Frontier, rules::add, rules::less)
                .unwrap();

        prop_assert_eq!(dag, frontier);
    }

    #[test]
    fn connected_nodes_share_a_component((n, edges) in any_graph()) {
        let graph = Graph::build(n, edges.clone()).unwrap();
        let labels = graph::component_labels(&graph);

        for (from, to, _) in edges {
            prop_assert_eq!(labels[from], labels[to]);
        }
        prop_assert!(graph::count_components(&graph) <= n);
    }
}

#[test]
fn scenario_converging_dependencies() {
    let graph = Graph::build(4, [(1, 0), (2, 0), (3, 1), (3, 2)]).unwrap();
    assert_eq!(graph::sort(&graph).unwrap(), vec![3, 1, 2, 0]);
}

#[test]
fn scenario_two_cycle() {
    let graph = Graph::build(2, [(0, 1), (1, 0)]).unwrap();
    assert!(graph::sort(&graph).is_err());
    assert!(!graph::is_acyclic(&graph));
}

#[test]
fn scenario_weighted_chain() {
    let graph = Graph::build(3, [(0, 1, 1), (1, 2, 1)]).unwrap();
    let result = graph::propagate(
        &graph,
        [(0, 0)],
        i64::MAX,
        Mode::Dag,
        |value: &i64, weight| value + weight,
        |current: &i64, candidate: &i64| candidate < current,
    )
    .unwrap();
    assert_eq!(result.values(), &[0, 1, 2]);
}

#[test]
fn scenario_self_loop() {
    let graph = Graph::build(1, [(0, 0)]).unwrap();
    assert!(!graph::is_acyclic(&graph));
}
