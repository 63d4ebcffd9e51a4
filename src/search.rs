use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

// outgoing neighbors reached through edges accepted by `follow`
fn successors<V, E>(
    graph: &DiGraph<V, E>,
    node: NodeIndex,
    follow: &impl Fn(&E) -> bool,
) -> Vec<NodeIndex> {
    graph
        .edges(node)
        .filter(|edge| follow(edge.weight()))
        .map(|edge| edge.target())
        .collect()
}

/// Depth-first search from every vertex, restricted to edges accepted by
/// `follow`. Returns the first cycle found as a closed vertex sequence
/// (`a, b, a`).
pub(crate) fn find_cycle<V, E>(
    graph: &DiGraph<V, E>,
    follow: impl Fn(&E) -> bool,
) -> Option<Vec<NodeIndex>> {
    let mut marks = vec![Mark::Unvisited; graph.node_count()];
    for start in graph.node_indices() {
        if marks[start.index()] != Mark::Unvisited {
            continue;
        }
        marks[start.index()] = Mark::OnPath;
        let mut path = vec![start];
        let mut pending = vec![successors(graph, start, &follow)];

        while let Some(frontier) = pending.last_mut() {
            match frontier.pop() {
                Some(next) => match marks[next.index()] {
                    Mark::OnPath => {
                        let from = path.iter().position(|&n| n == next).unwrap_or(0);
                        let mut cycle = path[from..].to_vec();
                        cycle.push(next);
                        return Some(cycle);
                    }
                    Mark::Done => {}
                    Mark::Unvisited => {
                        marks[next.index()] = Mark::OnPath;
                        path.push(next);
                        pending.push(successors(graph, next, &follow));
                    }
                },
                None => {
                    pending.pop();
                    if let Some(done) = path.pop() {
                        marks[done.index()] = Mark::Done;
                    }
                }
            }
        }
    }
    None
}

/// Outcome of following single outgoing edges from a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SinkWalk {
    /// Reached a vertex with no outgoing edge.
    Sink(NodeIndex),
    /// Hit a vertex with more than one outgoing edge.
    Branch(NodeIndex),
    /// Did not terminate within the vertex count.
    Unterminated,
}

/// Follow the unique outgoing edge of each vertex until a sink.
pub(crate) fn walk_to_sink<V, E>(
    graph: &DiGraph<V, E>,
    start: NodeIndex,
    follow: impl Fn(&E) -> bool,
) -> SinkWalk {
    let mut current = start;
    for _ in 0..=graph.node_count() {
        let mut next = graph
            .edges(current)
            .filter(|edge| follow(edge.weight()))
            .map(|edge| edge.target());
        match (next.next(), next.next()) {
            (None, _) => return SinkWalk::Sink(current),
            (Some(target), None) => current = target,
            (Some(_), Some(_)) => return SinkWalk::Branch(current),
        }
    }
    SinkWalk::Unterminated
}

/// Shortest path from `start` to `goal` with every edge weighing one.
/// The path includes both ends.
pub(crate) fn shortest_path<V, E>(
    graph: &DiGraph<V, E>,
    start: NodeIndex,
    goal: NodeIndex,
) -> Option<Vec<NodeIndex>> {
    petgraph::algo::astar(graph, start, |node| node == goal, |_| 1usize, |_| 0)
        .map(|(_, path)| path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (DiGraph<&'static str, bool>, [NodeIndex; 4]) {
        let mut graph = DiGraph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        let c = graph.add_node("c");
        let d = graph.add_node("d");
        // true edges point at the parent, false edges mirror them
        for (child, parent) in [(b, a), (c, b), (d, a)] {
            graph.add_edge(child, parent, true);
            graph.add_edge(parent, child, false);
        }
        (graph, [a, b, c, d])
    }

    #[test]
    fn no_cycle_on_forward_edges() {
        let (graph, _) = chain();
        assert_eq!(find_cycle(&graph, |forward| *forward), None);
        // mirrored edges make every pair a two-cycle
        assert!(find_cycle(&graph, |_| true).is_some());
    }

    #[test]
    fn cycle_is_reported_closed() {
        let mut graph = DiGraph::<&str, ()>::new();
        let x = graph.add_node("x");
        let y = graph.add_node("y");
        let z = graph.add_node("z");
        graph.add_edge(z, x, ());
        graph.add_edge(x, y, ());
        graph.add_edge(y, x, ());
        let cycle = find_cycle(&graph, |_| true).unwrap();
        assert_eq!(cycle.first(), cycle.last());
        assert_eq!(cycle.len(), 3);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let mut graph = DiGraph::<(), ()>::new();
        let x = graph.add_node(());
        graph.add_edge(x, x, ());
        assert_eq!(find_cycle(&graph, |_| true), Some(vec![x, x]));
    }

    #[test]
    fn walk_reaches_root() {
        let (graph, [a, _, c, _]) = chain();
        assert_eq!(walk_to_sink(&graph, c, |f| *f), SinkWalk::Sink(a));
        assert_eq!(walk_to_sink(&graph, a, |f| *f), SinkWalk::Sink(a));
        assert_eq!(walk_to_sink(&graph, a, |_| true), SinkWalk::Branch(a));
    }

    #[test]
    fn walk_stops_on_cycle() {
        let mut graph = DiGraph::<(), ()>::new();
        let x = graph.add_node(());
        let y = graph.add_node(());
        graph.add_edge(x, y, ());
        graph.add_edge(y, x, ());
        assert_eq!(walk_to_sink(&graph, x, |_| true), SinkWalk::Unterminated);
    }

    #[test]
    fn shortest_path_uses_both_directions() {
        let (graph, [a, b, c, d]) = chain();
        assert_eq!(shortest_path(&graph, c, d), Some(vec![c, b, a, d]));
        assert_eq!(shortest_path(&graph, b, b), Some(vec![b]));

        let mut graph = graph;
        let lonely = graph.add_node("e");
        assert_eq!(shortest_path(&graph, a, lonely), None);
    }
}
