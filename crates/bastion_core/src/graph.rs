//! # Weighted Graph
//!
//! Undirected graph with A* search. Nodes carry a payload (usually a mesh
//! vertex); links keep insertion order so that searches are reproducible.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Node handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position in the node list.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A graph node.
#[derive(Clone, Debug)]
pub struct Node<T> {
    /// Payload.
    pub data: T,
    /// Neighbours with link weights.
    pub links: Vec<(NodeId, f64)>,
}

/// Undirected weighted graph.
#[derive(Clone, Debug, Default)]
pub struct Graph<T> {
    nodes: Vec<Node<T>>,
}

/// Open-set entry. Lower `f` first, then earlier insertion.
#[derive(Clone, Copy, Debug)]
struct Open {
    f: f64,
    seq: u64,
    node: NodeId,
}

impl PartialEq for Open {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Open {}

impl Ord for Open {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Open {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Graph<T> {
    /// Empty graph.
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Adds a node.
    pub fn add_node(&mut self, data: T) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            data,
            links: Vec::new(),
        });
        id
    }

    /// Node record.
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.index()]
    }

    /// Number of nodes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Links two nodes both ways. An existing link is re-weighted.
    pub fn link(&mut self, a: NodeId, b: NodeId, weight: f64) {
        if a == b {
            return;
        }
        for (from, to) in [(a, b), (b, a)] {
            let links = &mut self.nodes[from.index()].links;
            match links.iter_mut().find(|(n, _)| *n == to) {
                Some(slot) => slot.1 = weight,
                None => links.push((to, weight)),
            }
        }
    }

    /// Removes the link between two nodes.
    pub fn unlink(&mut self, a: NodeId, b: NodeId) {
        self.nodes[a.index()].links.retain(|(n, _)| *n != b);
        self.nodes[b.index()].links.retain(|(n, _)| *n != a);
    }

    /// Removes every link of a node.
    pub fn unlink_all(&mut self, a: NodeId) {
        let links = std::mem::take(&mut self.nodes[a.index()].links);
        for (n, _) in links {
            self.nodes[n.index()].links.retain(|(m, _)| *m != a);
        }
    }

    /// Cheapest path from `start` to `goal`, both included.
    ///
    /// Nodes in `blocked` are never entered unless they are the goal.
    /// `heuristic` must not overestimate the remaining cost.
    pub fn a_star<H>(&self, start: NodeId, goal: NodeId, blocked: &[NodeId], heuristic: H) -> Option<Vec<NodeId>>
    where
        H: Fn(NodeId) -> f64,
    {
        let n = self.nodes.len();
        if start.index() >= n || goal.index() >= n {
            return None;
        }
        let mut g = vec![f64::INFINITY; n];
        let mut came_from: Vec<Option<NodeId>> = vec![None; n];
        let mut closed = vec![false; n];
        let mut open = BinaryHeap::new();
        let mut seq = 0;

        g[start.index()] = 0.0;
        open.push(Open {
            f: heuristic(start),
            seq,
            node: start,
        });

        while let Some(Open { node, .. }) = open.pop() {
            if node == goal {
                let mut path = vec![goal];
                let mut cur = goal;
                while let Some(prev) = came_from[cur.index()] {
                    path.push(prev);
                    cur = prev;
                }
                path.reverse();
                return Some(path);
            }
            if closed[node.index()] {
                continue;
            }
            closed[node.index()] = true;

            for &(next, weight) in &self.nodes[node.index()].links {
                if closed[next.index()] || (next != goal && blocked.contains(&next)) {
                    continue;
                }
                let tentative = g[node.index()] + weight;
                if tentative < g[next.index()] {
                    g[next.index()] = tentative;
                    came_from[next.index()] = Some(node);
                    seq += 1;
                    open.push(Open {
                        f: tentative + heuristic(next),
                        seq,
                        node: next,
                    });
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A ring of 6 nodes with one shortcut 0-3.
    fn ring() -> Graph<u32> {
        let mut g = Graph::new();
        let ids: Vec<NodeId> = (0..6).map(|i| g.add_node(i)).collect();
        for i in 0..6 {
            g.link(ids[i], ids[(i + 1) % 6], 1.0);
        }
        g.link(ids[0], ids[3], 1.5);
        g
    }

    #[test]
    fn test_shortcut_is_taken() {
        let g = ring();
        let path = g.a_star(NodeId(0), NodeId(3), &[], |_| 0.0).unwrap();
        assert_eq!(path, vec![NodeId(0), NodeId(3)]);
    }

    #[test]
    fn test_unlink_and_blocked() {
        let mut g = ring();
        g.unlink(NodeId(0), NodeId(3));
        let path = g.a_star(NodeId(0), NodeId(3), &[NodeId(1)], |_| 0.0).unwrap();
        assert_eq!(path, vec![NodeId(0), NodeId(5), NodeId(4), NodeId(3)]);
        g.unlink_all(NodeId(4));
        assert!(g.a_star(NodeId(0), NodeId(3), &[NodeId(1)], |_| 0.0).is_none());
    }
}
