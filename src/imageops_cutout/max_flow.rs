//! Min-cut / max-flow over the pixel graph.
//!
//! Nodes are pixels; the source stands for foreground and the sink for
//! background. Terminal links are stored as a single signed residual per
//! node (positive: capacity from the source, negative: capacity to the
//! sink). The common part `min(source, sink)` is flow that every cut pays and
//! is only tracked in the reported energy.
//!
//! The flow is computed with the Boykov-Kolmogorov augmenting-path
//! algorithm. Two search trees grow from the terminals until they touch, the
//! path through the touching edge is augmented, and the tree edges that
//! saturate are repaired by re-adopting the orphaned nodes. The trees are
//! never rebuilt from scratch, which keeps grid graphs with many short
//! source-sink paths fast.

use std::collections::VecDeque;

const NONE: usize = usize::MAX;

/// Tree tags double as the edge-direction bit: for a node in the source
/// tree, `edges[e ^ SOURCE_TREE]` is the outgoing direction of edge `e`.
const SOURCE_TREE: usize = 0;
const SINK_TREE: usize = 1;

#[derive(Debug, Clone, Copy)]
struct Edge {
    to: usize,
    next: usize,
    capacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parent {
    /// In neither tree
    Free,
    /// Linked directly to its terminal
    Terminal,
    /// Lost its parent link in the last augmentation
    Orphan,
    /// Linked through this edge, which points at the parent
    Edge(usize),
}

#[derive(Debug, Clone, Copy)]
struct Node {
    first: usize,
    /// Signed terminal residual
    terminal: f64,
    parent: Parent,
    tree: usize,
    /// Augmentation count at which `distance` was last known exact
    stamp: u64,
    distance: u32,
    active: bool,
}

impl Node {
    const EMPTY: Self = Self {
        first: NONE,
        terminal: 0.0,
        parent: Parent::Free,
        tree: SOURCE_TREE,
        stamp: 0,
        distance: 0,
        active: false,
    };
}

/// Flow network over `node_count` pixel nodes plus a source and a sink
#[derive(Debug, Clone)]
pub struct FlowGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    constant_flow: f64,
    solved: bool,
}

impl FlowGraph {
    /// Creates a graph with room for `edge_hint` directed edges
    pub fn new(node_count: usize, edge_hint: usize) -> Self {
        Self {
            nodes: vec![Node::EMPTY; node_count],
            edges: Vec::with_capacity(edge_hint),
            constant_flow: 0.0,
            solved: false,
        }
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn push_pair(&mut self, from: usize, to: usize, capacity: f64, reverse_capacity: f64) {
        let index = self.edges.len();
        self.edges.push(Edge {
            to,
            next: self.nodes[from].first,
            capacity,
        });
        self.nodes[from].first = index;
        self.edges.push(Edge {
            to: from,
            next: self.nodes[to].first,
            capacity: reverse_capacity,
        });
        self.nodes[to].first = index + 1;
        self.solved = false;
    }

    /// Adds an undirected neighbor link between two pixel nodes
    pub fn add_edge(&mut self, a: usize, b: usize, weight: f64) {
        debug_assert!(a < self.node_count() && b < self.node_count());
        debug_assert!(weight >= 0.0);
        self.push_pair(a, b, weight, weight);
    }

    /// Adds terminal link weights to a pixel node.
    ///
    /// Weights may be any finite value; only their difference shapes the cut.
    /// Repeated calls accumulate.
    pub fn add_terminal_weights(&mut self, node: usize, source_weight: f64, sink_weight: f64) {
        debug_assert!(node < self.node_count());
        let node = &mut self.nodes[node];
        let (mut source_weight, mut sink_weight) = (source_weight, sink_weight);
        if node.terminal > 0.0 {
            source_weight += node.terminal;
        } else {
            sink_weight -= node.terminal;
        }
        self.constant_flow += source_weight.min(sink_weight);
        node.terminal = source_weight - sink_weight;
        self.solved = false;
    }

    /// Computes the maximum flow, which equals the energy of the minimum cut
    pub fn max_flow(&mut self) -> f64 {
        let mut flow = self.constant_flow;
        let mut active = VecDeque::new();
        let mut orphans = Vec::new();
        let mut time = 0u64;

        for (index, node) in self.nodes.iter_mut().enumerate() {
            node.stamp = 0;
            node.active = false;
            if node.terminal == 0.0 {
                node.parent = Parent::Free;
                continue;
            }
            node.parent = Parent::Terminal;
            node.tree = if node.terminal > 0.0 {
                SOURCE_TREE
            } else {
                SINK_TREE
            };
            node.distance = 1;
            node.active = true;
            active.push_back(index);
        }

        while let Some(bridge) = self.grow(&mut active) {
            flow += self.augment(bridge, &mut orphans);
            time += 1;
            self.adopt(&mut orphans, &mut active, time);
        }

        self.solved = true;
        flow
    }

    /// Whether `node` ended on the source (foreground) side of the cut.
    ///
    /// Only meaningful after [`FlowGraph::max_flow`]. The source side is the
    /// final source tree, i.e. the nodes still reachable from the source in
    /// the residual graph; nodes in neither tree go to the sink.
    pub fn in_source_segment(&self, node: usize) -> bool {
        self.solved
            && self
                .nodes
                .get(node)
                .is_some_and(|n| n.tree == SOURCE_TREE && n.parent != Parent::Free)
    }

    /// Grows both trees from the active nodes until they touch.
    ///
    /// Returns the touching edge, oriented from the source tree to the sink
    /// tree. The node that found it stays active.
    fn grow(&mut self, active: &mut VecDeque<usize>) -> Option<usize> {
        while let Some(&v) = active.front() {
            let Node {
                first,
                parent,
                tree,
                stamp,
                distance,
                ..
            } = self.nodes[v];

            if parent != Parent::Free {
                let mut e = first;
                while e != NONE {
                    let edge = self.edges[e];
                    if self.edges[e ^ tree].capacity > 0.0 {
                        let target = &mut self.nodes[edge.to];
                        if target.parent == Parent::Free {
                            target.tree = tree;
                            target.parent = Parent::Edge(e ^ 1);
                            target.stamp = stamp;
                            target.distance = distance + 1;
                            if !target.active {
                                target.active = true;
                                active.push_back(edge.to);
                            }
                        } else if target.tree != tree {
                            return Some(e ^ tree);
                        } else if target.distance > distance + 1 && target.stamp <= stamp {
                            // Shorter path to the root found.
                            target.parent = Parent::Edge(e ^ 1);
                            target.stamp = stamp;
                            target.distance = distance + 1;
                        }
                    }
                    e = edge.next;
                }
            }

            active.pop_front();
            self.nodes[v].active = false;
        }
        None
    }

    /// Pushes the bottleneck flow along the path through `bridge` and
    /// collects the nodes whose parent link saturated.
    fn augment(&mut self, bridge: usize, orphans: &mut Vec<usize>) -> f64 {
        // Direction bit 1 walks the source half, 0 the sink half.
        let mut bottleneck = self.edges[bridge].capacity;
        for k in [1, 0] {
            let mut v = self.edges[bridge ^ k].to;
            while let Parent::Edge(e) = self.nodes[v].parent {
                bottleneck = bottleneck.min(self.edges[e ^ k].capacity);
                v = self.edges[e].to;
            }
            bottleneck = bottleneck.min(self.nodes[v].terminal.abs());
        }

        self.edges[bridge].capacity -= bottleneck;
        self.edges[bridge ^ 1].capacity += bottleneck;

        for k in [1, 0] {
            let mut v = self.edges[bridge ^ k].to;
            while let Parent::Edge(e) = self.nodes[v].parent {
                self.edges[e ^ k ^ 1].capacity += bottleneck;
                self.edges[e ^ k].capacity -= bottleneck;
                if self.edges[e ^ k].capacity <= 0.0 {
                    self.nodes[v].parent = Parent::Orphan;
                    orphans.push(v);
                }
                v = self.edges[e].to;
            }

            let root = &mut self.nodes[v];
            if k == 1 {
                root.terminal -= bottleneck;
            } else {
                root.terminal += bottleneck;
            }
            if root.terminal == 0.0 {
                root.parent = Parent::Orphan;
                orphans.push(v);
            }
        }

        bottleneck
    }

    /// Finds new parents for orphans, or frees them together with the
    /// subtrees hanging off them.
    fn adopt(&mut self, orphans: &mut Vec<usize>, active: &mut VecDeque<usize>, time: u64) {
        while let Some(v) = orphans.pop() {
            let tree = self.nodes[v].tree;

            let mut best: Option<(usize, u32)> = None;
            let mut e = self.nodes[v].first;
            while e != NONE {
                let edge = self.edges[e];
                let candidate = self.nodes[edge.to];
                if self.edges[e ^ tree ^ 1].capacity > 0.0
                    && candidate.tree == tree
                    && candidate.parent != Parent::Free
                {
                    if let Some(distance) = self.root_distance(edge.to, time) {
                        let distance = distance + 1;
                        if best.map_or(true, |(_, shortest)| distance < shortest) {
                            best = Some((e, distance));
                        }
                        self.stamp_path(edge.to, distance, time);
                    }
                }
                e = edge.next;
            }

            if let Some((e, distance)) = best {
                let node = &mut self.nodes[v];
                node.parent = Parent::Edge(e);
                node.stamp = time;
                node.distance = distance;
                continue;
            }

            // No valid parent: free the node and requeue its neighbors.
            self.nodes[v].parent = Parent::Free;
            self.nodes[v].stamp = 0;
            let mut e = self.nodes[v].first;
            while e != NONE {
                let edge = self.edges[e];
                let neighbor = self.nodes[edge.to];
                if neighbor.tree == tree && neighbor.parent != Parent::Free {
                    if self.edges[e ^ tree ^ 1].capacity > 0.0 && !neighbor.active {
                        self.nodes[edge.to].active = true;
                        active.push_back(edge.to);
                    }
                    if let Parent::Edge(parent_edge) = neighbor.parent {
                        if self.edges[parent_edge].to == v {
                            self.nodes[edge.to].parent = Parent::Orphan;
                            orphans.push(edge.to);
                        }
                    }
                }
                e = edge.next;
            }
        }
    }

    /// Distance from `start` to its terminal, or `None` when the path runs
    /// into an orphan. Stamps the terminal-linked root it reaches.
    fn root_distance(&mut self, start: usize, time: u64) -> Option<u32> {
        let mut distance = 0;
        let mut v = start;
        loop {
            let node = self.nodes[v];
            if node.stamp == time {
                return Some(distance + node.distance);
            }
            distance += 1;
            match node.parent {
                Parent::Edge(e) => v = self.edges[e].to,
                Parent::Terminal => {
                    self.nodes[v].stamp = time;
                    self.nodes[v].distance = 1;
                    return Some(distance);
                }
                Parent::Orphan | Parent::Free => return None,
            }
        }
    }

    /// Records exact distances along the path from `start` to its root, given
    /// that the node one step below `start` sits at `distance`.
    fn stamp_path(&mut self, start: usize, mut distance: u32, time: u64) {
        let mut v = start;
        while self.nodes[v].stamp != time {
            distance -= 1;
            let node = &mut self.nodes[v];
            node.stamp = time;
            node.distance = distance;
            match node.parent {
                Parent::Edge(e) => v = self.edges[e].to,
                _ => break,
            }
        }
    }
}
