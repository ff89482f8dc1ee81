use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

/// A trait for graphs that can be searched.
///
/// `Node`: The type of node identifiers (e.g., a territory index).
pub trait Graph<Node> {
    /// Return the neighbors of a node.
    fn neighbors(&self, node: &Node) -> Vec<Node>;
}

/// What to do with a newly discovered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    /// Report the node as a reachable destination.
    pub record: bool,
    /// Continue the search through this node.
    pub expand: bool,
}

impl Visit {
    pub const SKIP: Visit = Visit {
        record: false,
        expand: false,
    };
    pub const PASS_THROUGH: Visit = Visit {
        record: false,
        expand: true,
    };
    pub const RECORD_AND_EXPAND: Visit = Visit {
        record: true,
        expand: true,
    };
}

/// A destination found by [`BoundedBfs::explore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reached<Node> {
    pub node: Node,
    /// Number of edges from the start (1 for a direct neighbor).
    pub steps: u32,
    /// Start node first, `node` last.
    pub path: Vec<Node>,
}

/// Breadth-first search bounded by a maximum number of steps.
pub struct BoundedBfs;

impl BoundedBfs {
    /// Explore outward from `start`, never going further than `max_steps` edges.
    ///
    /// Every node is discovered at most once, by its shortest path. On discovery
    /// `visit` decides whether it is recorded, expanded, both or neither. The start
    /// node itself is never recorded. Results come out in discovery order.
    pub fn explore<Node, G, F>(
        graph: &G,
        start: Node,
        max_steps: u32,
        mut visit: F,
    ) -> Vec<Reached<Node>>
    where
        Node: Clone + Eq + Hash,
        G: Graph<Node>,
        F: FnMut(&Node) -> Visit,
    {
        let mut reached = Vec::new();
        let mut visited: HashSet<Node> = HashSet::new();
        let mut queue: VecDeque<(Node, u32, Vec<Node>)> = VecDeque::new();

        visited.insert(start.clone());
        queue.push_back((start.clone(), 0, vec![start]));

        while let Some((current, steps, path)) = queue.pop_front() {
            if steps >= max_steps {
                continue;
            }

            for neighbor in graph.neighbors(&current) {
                if !visited.insert(neighbor.clone()) {
                    continue;
                }

                let decision = visit(&neighbor);
                if !decision.record && !decision.expand {
                    continue;
                }

                let mut next_path = path.clone();
                next_path.push(neighbor.clone());

                if decision.record {
                    reached.push(Reached {
                        node: neighbor.clone(),
                        steps: steps + 1,
                        path: next_path.clone(),
                    });
                }

                // Nodes at the range limit have nothing left to expand
                if decision.expand && steps + 1 < max_steps {
                    queue.push_back((neighbor, steps + 1, next_path));
                }
            }
        }

        reached
    }
}
