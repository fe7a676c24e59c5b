//! Topology analysis: loop regions, battery groups and closed-loop detection.
//!
//! All passes are breadth-first walks over the [`NodeGraph`], except the
//! loop-block decomposition which is an iterative depth-first
//! biconnected-components pass over branches.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use super::graph::NodeGraph;
use super::types::{BranchId, ComponentId, NodeId};

/// An ordered set of node handles.
pub type NodeSet = BTreeSet<NodeId>;

/// A connected component of the node graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Nodes of the region
    pub nodes: NodeSet,
    /// Whether a cycle reachable from a powered node was found
    pub closed: bool,
}

/// Assignment of branches to loop blocks (biconnected components).
///
/// Two distinct branches lie on a common simple loop iff they share a block.
#[derive(Debug, Clone, Default)]
pub struct LoopBlocks {
    block_of: HashMap<BranchId, usize>,
    count: usize,
}

impl LoopBlocks {
    /// Get the block containing a branch.
    pub fn block_of(&self, branch: BranchId) -> Option<usize> {
        self.block_of.get(&branch).copied()
    }

    /// Check if two distinct branches lie on a common loop.
    pub fn share_loop(&self, x: BranchId, y: BranchId) -> bool {
        x != y
            && matches!(
                (self.block_of(x), self.block_of(y)),
                (Some(bx), Some(by)) if bx == by
            )
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if there are no blocks.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Result of a full analysis pass.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    /// Loop regions in discovery order
    pub regions: Vec<Region>,
    /// Nodes reachable from each battery's positive terminal
    pub groups: BTreeMap<ComponentId, NodeSet>,
    /// Loop-block assignment of every branch
    pub blocks: LoopBlocks,
    region_index: HashMap<NodeId, usize>,
}

impl Topology {
    /// Get the region containing a node.
    pub fn region_of(&self, node: NodeId) -> Option<&Region> {
        self.region_index.get(&node).map(|&idx| &self.regions[idx])
    }

    /// Check if any region is closed.
    pub fn is_closed(&self) -> bool {
        self.regions.iter().any(|region| region.closed)
    }

    /// Number of closed regions.
    pub fn closed_regions(&self) -> usize {
        self.regions.iter().filter(|region| region.closed).count()
    }
}

/// Read-only analyzer over a node graph.
pub struct TopologyAnalyzer<'a> {
    graph: &'a NodeGraph,
}

impl<'a> TopologyAnalyzer<'a> {
    /// Create an analyzer for the given graph.
    pub fn new(graph: &'a NodeGraph) -> Self {
        Self { graph }
    }

    /// Run every pass.
    ///
    /// `batteries` lists each battery with its positive terminal. A region is
    /// closed if closed-loop detection succeeds on its intersection with at
    /// least one battery group.
    pub fn analyze(&self, batteries: &[(ComponentId, NodeId)]) -> Topology {
        let groups = self.battery_groups(batteries);

        let regions: Vec<Region> = self
            .partition_regions()
            .into_iter()
            .map(|nodes| {
                let closed = groups.values().any(|group| {
                    let overlap: NodeSet = nodes.intersection(group).copied().collect();
                    !overlap.is_empty() && self.is_closed(&overlap)
                });
                Region { nodes, closed }
            })
            .collect();

        let mut region_index = HashMap::new();
        for (idx, region) in regions.iter().enumerate() {
            for &node in &region.nodes {
                region_index.insert(node, idx);
            }
        }

        Topology {
            regions,
            groups,
            blocks: self.loop_blocks(),
            region_index,
        }
    }

    /// Partition every node into disjoint connected regions.
    pub fn partition_regions(&self) -> Vec<NodeSet> {
        let mut seen = NodeSet::new();
        let mut regions = Vec::new();
        for node in self.graph.node_ids() {
            if seen.contains(&node) {
                continue;
            }
            let region = self.reachable_from(node);
            seen.extend(region.iter().copied());
            regions.push(region);
        }
        regions
    }

    /// Collect every node reachable from `start`, including `start`.
    pub fn reachable_from(&self, start: NodeId) -> NodeSet {
        let mut visited = NodeSet::new();
        if !self.graph.contains(start) {
            return visited;
        }
        visited.insert(start);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            if let Some(neighbors) = self.graph.neighbors(current) {
                for &next in neighbors {
                    if visited.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        visited
    }

    /// Map each battery to the nodes reachable from its positive terminal.
    pub fn battery_groups(&self, batteries: &[(ComponentId, NodeId)]) -> BTreeMap<ComponentId, NodeSet> {
        batteries
            .iter()
            .map(|&(battery, positive)| (battery, self.reachable_from(positive)))
            .collect()
    }

    /// Closed-loop detection restricted to `candidates`.
    ///
    /// Breadth-first from every powered candidate, remembering the branch each
    /// node was reached through. Reaching a visited node through any other
    /// branch means two independent paths reconverge.
    pub fn is_closed(&self, candidates: &NodeSet) -> bool {
        let mut visited = NodeSet::new();
        let mut parent: HashMap<NodeId, BranchId> = HashMap::new();

        for &start in candidates.iter().filter(|n| self.graph.is_powered(**n)) {
            if !visited.insert(start) {
                continue;
            }
            let mut queue = VecDeque::from([start]);
            while let Some(current) = queue.pop_front() {
                let Some(incident) = self.graph.incident(current) else {
                    continue;
                };
                for &branch_id in incident {
                    // Walking back over the edge we arrived on is not a cycle.
                    if parent.get(&current) == Some(&branch_id) {
                        continue;
                    }
                    let Some(branch) = self.graph.branch(branch_id) else {
                        continue;
                    };
                    let next = branch.other(current);
                    if !candidates.contains(&next) {
                        continue;
                    }
                    if visited.insert(next) {
                        parent.insert(next, branch_id);
                        queue.push_back(next);
                    } else {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Decompose the branch multigraph into loop blocks.
    ///
    /// Iterative Tarjan with an edge stack. The parent is tracked by branch,
    /// so a second parallel branch back to the parent counts as a back edge.
    pub fn loop_blocks(&self) -> LoopBlocks {
        struct Frame {
            node: NodeId,
            parent_edge: Option<BranchId>,
            pending: Vec<BranchId>,
        }

        let mut blocks = LoopBlocks::default();
        let mut disc: HashMap<NodeId, usize> = HashMap::new();
        let mut low: HashMap<NodeId, usize> = HashMap::new();
        let mut edge_stack: Vec<BranchId> = Vec::new();
        let mut time = 0usize;

        for root in self.graph.node_ids() {
            if disc.contains_key(&root) {
                continue;
            }
            disc.insert(root, time);
            low.insert(root, time);
            time += 1;
            let mut frames = vec![Frame {
                node: root,
                parent_edge: None,
                pending: self.incident_vec(root),
            }];

            loop {
                let Some(frame) = frames.last_mut() else {
                    break;
                };
                let v = frame.node;
                let parent_edge = frame.parent_edge;
                let next = frame.pending.pop();

                match next {
                    Some(edge) => {
                        if Some(edge) == parent_edge {
                            continue;
                        }
                        let Some(branch) = self.graph.branch(edge) else {
                            continue;
                        };
                        let w = branch.other(v);
                        match disc.get(&w).copied() {
                            None => {
                                disc.insert(w, time);
                                low.insert(w, time);
                                time += 1;
                                edge_stack.push(edge);
                                frames.push(Frame {
                                    node: w,
                                    parent_edge: Some(edge),
                                    pending: self.incident_vec(w),
                                });
                            }
                            Some(dw) if dw < disc[&v] => {
                                if dw < low[&v] {
                                    low.insert(v, dw);
                                }
                                edge_stack.push(edge);
                            }
                            // Already pushed from the descendant's side.
                            Some(_) => {}
                        }
                    }
                    None => {
                        frames.pop();
                        let (Some(tree_edge), Some(parent)) = (parent_edge, frames.last()) else {
                            continue;
                        };
                        let u = parent.node;
                        let low_v = low[&v];
                        if low_v < low[&u] {
                            low.insert(u, low_v);
                        }
                        if low_v >= disc[&u] {
                            let block = blocks.count;
                            blocks.count += 1;
                            while let Some(edge) = edge_stack.pop() {
                                blocks.block_of.insert(edge, block);
                                if edge == tree_edge {
                                    break;
                                }
                            }
                        }
                    }
                }
            }
        }
        blocks
    }

    fn incident_vec(&self, node: NodeId) -> Vec<BranchId> {
        self.graph
            .incident(node)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{BodyPath, BranchKind};

    fn cell(graph: &mut NodeGraph, id: usize, p: NodeId, n: NodeId) -> BranchId {
        graph.set_powered(p, true);
        graph.set_powered(n, true);
        graph
            .attach(p, n, BranchKind::Body(ComponentId(id), BodyPath::Cell))
            .unwrap()
    }

    fn filament(graph: &mut NodeGraph, id: usize, p: NodeId, n: NodeId) -> BranchId {
        graph
            .attach(p, n, BranchKind::Body(ComponentId(id), BodyPath::Filament))
            .unwrap()
    }

    #[test]
    fn test_partition_covers_all_nodes() {
        let mut graph = NodeGraph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        let c = graph.add_node("c");
        let d = graph.add_node("d");
        graph.connect(a, b);
        graph.connect(c, d);
        let e = graph.add_node("e");

        let regions = TopologyAnalyzer::new(&graph).partition_regions();
        assert_eq!(regions.len(), 3);
        assert_eq!(regions[0], NodeSet::from([a, b]));
        assert_eq!(regions[1], NodeSet::from([c, d]));
        assert_eq!(regions[2], NodeSet::from([e]));
    }

    #[test]
    fn test_triangle_is_closed() {
        let mut graph = NodeGraph::new();
        let p = graph.add_node("p");
        let n = graph.add_node("n");
        let l = graph.add_node("l");
        cell(&mut graph, 0, p, n);
        graph.connect(p, l);
        filament(&mut graph, 1, l, n);

        let analyzer = TopologyAnalyzer::new(&graph);
        assert!(analyzer.is_closed(&NodeSet::from([p, n, l])));
    }

    #[test]
    fn test_simple_path_is_open() {
        let mut graph = NodeGraph::new();
        let p = graph.add_node("p");
        let n = graph.add_node("n");
        let l = graph.add_node("l");
        cell(&mut graph, 0, p, n);
        filament(&mut graph, 1, n, l);

        let analyzer = TopologyAnalyzer::new(&graph);
        assert!(!analyzer.is_closed(&NodeSet::from([p, n, l])));
    }

    #[test]
    fn test_parallel_branches_close_a_loop() {
        let mut graph = NodeGraph::new();
        let p = graph.add_node("p");
        let n = graph.add_node("n");
        cell(&mut graph, 0, p, n);
        filament(&mut graph, 1, p, n);

        let analyzer = TopologyAnalyzer::new(&graph);
        assert!(analyzer.is_closed(&NodeSet::from([p, n])));
    }

    #[test]
    fn test_unpowered_cycle_is_open() {
        let mut graph = NodeGraph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        let c = graph.add_node("c");
        graph.connect(a, b);
        graph.connect(b, c);
        graph.connect(c, a);

        let analyzer = TopologyAnalyzer::new(&graph);
        assert!(!analyzer.is_closed(&NodeSet::from([a, b, c])));
        let topology = analyzer.analyze(&[]);
        assert!(!topology.is_closed());
    }

    #[test]
    fn test_detection_respects_candidate_set() {
        let mut graph = NodeGraph::new();
        let p = graph.add_node("p");
        let n = graph.add_node("n");
        let x = graph.add_node("x");
        cell(&mut graph, 0, p, n);
        graph.connect(n, x);
        graph.connect(x, p);

        let analyzer = TopologyAnalyzer::new(&graph);
        assert!(analyzer.is_closed(&NodeSet::from([p, n, x])));
        assert!(!analyzer.is_closed(&NodeSet::from([p, n])));
    }

    #[test]
    fn test_battery_groups_follow_reachability() {
        let mut graph = NodeGraph::new();
        let p1 = graph.add_node("p1");
        let n1 = graph.add_node("n1");
        let p2 = graph.add_node("p2");
        let n2 = graph.add_node("n2");
        cell(&mut graph, 0, p1, n1);
        cell(&mut graph, 1, p2, n2);

        let groups = TopologyAnalyzer::new(&graph)
            .battery_groups(&[(ComponentId(0), p1), (ComponentId(1), p2)]);
        assert_eq!(groups[&ComponentId(0)], NodeSet::from([p1, n1]));
        assert_eq!(groups[&ComponentId(1)], NodeSet::from([p2, n2]));
    }

    #[test]
    fn test_bridge_is_its_own_block() {
        // Battery loop p-n-x plus a dangling lamp hanging off x.
        let mut graph = NodeGraph::new();
        let p = graph.add_node("p");
        let n = graph.add_node("n");
        let x = graph.add_node("x");
        let y = graph.add_node("y");
        let battery = cell(&mut graph, 0, p, n);
        graph.connect(n, x);
        graph.connect(x, p);
        let lamp = filament(&mut graph, 1, x, y);

        let blocks = TopologyAnalyzer::new(&graph).loop_blocks();
        assert_eq!(blocks.len(), 2);
        assert!(!blocks.share_loop(battery, lamp));
        let wire = graph.connection_between(n, x).unwrap();
        assert!(blocks.share_loop(battery, wire));
    }

    #[test]
    fn test_blocks_split_at_articulation_point() {
        // Two triangles sharing node c.
        let mut graph = NodeGraph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        let c = graph.add_node("c");
        let d = graph.add_node("d");
        let e = graph.add_node("e");
        for (x, y) in [(a, b), (b, c), (c, a), (c, d), (d, e), (e, c)] {
            graph.connect(x, y);
        }

        let blocks = TopologyAnalyzer::new(&graph).loop_blocks();
        assert_eq!(blocks.len(), 2);
        let ab = graph.connection_between(a, b).unwrap();
        let ca = graph.connection_between(c, a).unwrap();
        let de = graph.connection_between(d, e).unwrap();
        assert!(blocks.share_loop(ab, ca));
        assert!(!blocks.share_loop(ab, de));
    }
}
