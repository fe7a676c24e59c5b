//! Node graph: an arena of nodes joined by owned branches.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, warn};

use super::types::{Branch, BranchId, BranchKind, ComponentId, NodeId, WireId};

/// A node slot in the arena.
#[derive(Debug, Clone)]
struct NodeSlot {
    name: String,
    /// Deduplicated set of adjacent nodes (symmetric)
    neighbors: BTreeSet<NodeId>,
    /// Branches touching this node
    incident: BTreeSet<BranchId>,
    /// True while the node is a battery terminal
    powered: bool,
}

/// The connection graph of a circuit.
///
/// Nodes live in an arena addressed by [`NodeId`]. Every link between two
/// nodes is a [`Branch`] with an owner; the adjacency set of a node is the
/// deduplicated union of its branches. At most one user connection exists per
/// unordered pair of nodes, while component bodies and switch contacts may run
/// in parallel to it.
#[derive(Debug, Clone, Default)]
pub struct NodeGraph {
    slots: Vec<Option<NodeSlot>>,
    names: HashMap<String, NodeId>,
    branches: BTreeMap<BranchId, Branch>,
    next_branch: usize,
}

impl NodeGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node with an empty adjacency set.
    ///
    /// Idempotent: if a node with this name exists, its handle is returned.
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        let name = name.into();
        if let Some(&id) = self.names.get(&name) {
            return id;
        }
        let id = NodeId(self.slots.len());
        self.slots.push(Some(NodeSlot {
            name: name.clone(),
            neighbors: BTreeSet::new(),
            incident: BTreeSet::new(),
            powered: false,
        }));
        self.names.insert(name, id);
        id
    }

    /// Remove a node together with every branch touching it.
    ///
    /// Returns `false` (and does nothing) if the node is absent.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let incident: Vec<BranchId> = match self.slot(id) {
            Some(slot) => slot.incident.iter().copied().collect(),
            None => return false,
        };
        for branch in incident {
            self.remove_branch(branch);
        }
        if let Some(slot) = self.slots[id.0].take() {
            self.names.remove(&slot.name);
            debug!(node = %slot.name, "node removed");
        }
        true
    }

    /// Check if a node is present.
    pub fn contains(&self, id: NodeId) -> bool {
        self.slot(id).is_some()
    }

    /// Find a node by name.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Get the name of a node.
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.slot(id).map(|slot| slot.name.as_str())
    }

    /// Iterate over all live nodes in handle order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(idx, _)| NodeId(idx))
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// Read-only view of a node's adjacency set.
    pub fn neighbors(&self, id: NodeId) -> Option<&BTreeSet<NodeId>> {
        self.slot(id).map(|slot| &slot.neighbors)
    }

    /// Read-only view of the branches touching a node.
    pub fn incident(&self, id: NodeId) -> Option<&BTreeSet<BranchId>> {
        self.slot(id).map(|slot| &slot.incident)
    }

    /// Look up a branch.
    pub fn branch(&self, id: BranchId) -> Option<&Branch> {
        self.branches.get(&id)
    }

    /// Iterate over all branches.
    pub fn branches(&self) -> impl Iterator<Item = (BranchId, &Branch)> + '_ {
        self.branches.iter().map(|(id, branch)| (*id, branch))
    }

    /// Check if two nodes are adjacent through any branch.
    pub fn is_connected(&self, a: NodeId, b: NodeId) -> bool {
        self.slot(a)
            .map(|slot| slot.neighbors.contains(&b))
            .unwrap_or(false)
    }

    /// Find the user connection joining `a` and `b`, if any.
    pub fn connection_between(&self, a: NodeId, b: NodeId) -> Option<BranchId> {
        self.find_branch(a, b, |kind| kind.is_connection())
    }

    /// Connect two nodes with a user connection.
    ///
    /// No-op if either node is missing, `a == b`, or the pair already has a
    /// user connection. Switch contacts and component bodies on the same pair
    /// do not block it. Returns `true` if a connection was added.
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> bool {
        self.connect_with(a, b, None)
    }

    /// Connect two nodes with a connection owned by a wire object.
    pub fn connect_wire(&mut self, a: NodeId, b: NodeId, wire: WireId) -> bool {
        self.connect_with(a, b, Some(wire))
    }

    fn connect_with(&mut self, a: NodeId, b: NodeId, wire: Option<WireId>) -> bool {
        if !self.valid_pair(a, b) {
            return false;
        }
        if self.connection_between(a, b).is_some() {
            debug!(%a, %b, "pair already has a user connection");
            return false;
        }
        self.insert_branch(a, b, BranchKind::Connection(wire));
        true
    }

    /// Remove the user connection between two nodes.
    ///
    /// Component bodies and switch contacts on the same pair are untouched.
    /// Returns `true` only if a connection was removed.
    pub fn disconnect(&mut self, a: NodeId, b: NodeId) -> bool {
        match self.connection_between(a, b) {
            Some(branch) => {
                self.remove_branch(branch);
                true
            }
            None => false,
        }
    }

    /// Remove the connection owned by a wire.
    pub fn disconnect_wire(&mut self, wire: WireId) -> bool {
        let found = self
            .branches
            .iter()
            .find(|(_, branch)| branch.kind == BranchKind::Connection(Some(wire)))
            .map(|(id, _)| *id);
        match found {
            Some(branch) => {
                self.remove_branch(branch);
                true
            }
            None => false,
        }
    }

    /// Attach a component-owned branch between two nodes.
    ///
    /// Returns `None` if the pair is invalid or an identical branch exists.
    pub fn attach(&mut self, a: NodeId, b: NodeId, kind: BranchKind) -> Option<BranchId> {
        if !self.valid_pair(a, b) {
            return None;
        }
        if self.find_branch(a, b, |k| *k == kind).is_some() {
            return None;
        }
        Some(self.insert_branch(a, b, kind))
    }

    /// Remove the branch of the given kind, if present.
    pub fn detach(&mut self, kind: BranchKind) -> bool {
        let found = self
            .branches
            .iter()
            .find(|(_, branch)| branch.kind == kind)
            .map(|(id, _)| *id);
        match found {
            Some(branch) => {
                self.remove_branch(branch);
                true
            }
            None => false,
        }
    }

    /// Remove every branch owned by a component. Returns how many were removed.
    pub fn detach_owner(&mut self, owner: ComponentId) -> usize {
        let owned: Vec<BranchId> = self
            .branches
            .iter()
            .filter(|(_, branch)| branch.kind.owner() == Some(owner))
            .map(|(id, _)| *id)
            .collect();
        for branch in &owned {
            self.remove_branch(*branch);
        }
        owned.len()
    }

    /// Find the branch of a specific kind.
    pub fn branch_of(&self, kind: BranchKind) -> Option<BranchId> {
        self.branches
            .iter()
            .find(|(_, branch)| branch.kind == kind)
            .map(|(id, _)| *id)
    }

    /// Set the powered flag of a node.
    pub fn set_powered(&mut self, id: NodeId, powered: bool) {
        if let Some(Some(slot)) = self.slots.get_mut(id.0) {
            slot.powered = powered;
        }
    }

    /// Check if a node is powered.
    pub fn is_powered(&self, id: NodeId) -> bool {
        self.slot(id).map(|slot| slot.powered).unwrap_or(false)
    }

    fn slot(&self, id: NodeId) -> Option<&NodeSlot> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    fn valid_pair(&self, a: NodeId, b: NodeId) -> bool {
        if !self.contains(a) || !self.contains(b) {
            warn!(%a, %b, "ignoring link to a node that is not in the graph");
            return false;
        }
        if a == b {
            warn!(node = %a, "ignoring link from a node to itself");
            return false;
        }
        true
    }

    fn find_branch(&self, a: NodeId, b: NodeId, pred: impl Fn(&BranchKind) -> bool) -> Option<BranchId> {
        let slot = self.slot(a)?;
        slot.incident
            .iter()
            .copied()
            .find(|id| {
                self.branches
                    .get(id)
                    .map(|branch| branch.joins(a, b) && pred(&branch.kind))
                    .unwrap_or(false)
            })
    }

    fn insert_branch(&mut self, a: NodeId, b: NodeId, kind: BranchKind) -> BranchId {
        let id = BranchId(self.next_branch);
        self.next_branch += 1;
        self.branches.insert(id, Branch { a, b, kind });
        for (this, other) in [(a, b), (b, a)] {
            if let Some(Some(slot)) = self.slots.get_mut(this.0) {
                slot.neighbors.insert(other);
                slot.incident.insert(id);
            }
        }
        debug!(%a, %b, ?kind, branch = %id, "branch added");
        id
    }

    fn remove_branch(&mut self, id: BranchId) {
        let Some(branch) = self.branches.remove(&id) else {
            return;
        };
        for node in [branch.a, branch.b] {
            if let Some(Some(slot)) = self.slots.get_mut(node.0) {
                slot.incident.remove(&id);
            }
        }
        // Adjacency survives while another branch still joins the pair.
        let still_joined = self.find_branch(branch.a, branch.b, |_| true).is_some();
        if !still_joined {
            for (this, other) in [(branch.a, branch.b), (branch.b, branch.a)] {
                if let Some(Some(slot)) = self.slots.get_mut(this.0) {
                    slot.neighbors.remove(&other);
                }
            }
        }
        debug!(a = %branch.a, b = %branch.b, kind = ?branch.kind, branch = %id, "branch removed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::BodyPath;

    fn graph_with(names: &[&str]) -> (NodeGraph, Vec<NodeId>) {
        let mut graph = NodeGraph::new();
        let ids = names.iter().map(|n| graph.add_node(*n)).collect();
        (graph, ids)
    }

    #[test]
    fn test_add_node_is_idempotent() {
        let mut graph = NodeGraph::new();
        let a = graph.add_node("a");
        let again = graph.add_node("a");
        assert_eq!(a, again);
        assert_eq!(graph.node_count(), 1);
        assert!(graph.neighbors(a).unwrap().is_empty());
    }

    #[test]
    fn test_connect_is_symmetric() {
        let (mut graph, ids) = graph_with(&["a", "b"]);
        assert!(graph.connect(ids[0], ids[1]));
        assert!(graph.neighbors(ids[0]).unwrap().contains(&ids[1]));
        assert!(graph.neighbors(ids[1]).unwrap().contains(&ids[0]));
    }

    #[test]
    fn test_connect_twice_is_noop() {
        let (mut graph, ids) = graph_with(&["a", "b"]);
        assert!(graph.connect(ids[0], ids[1]));
        assert!(!graph.connect(ids[1], ids[0]));
        assert_eq!(graph.branches().count(), 1);
        assert_eq!(graph.incident(ids[0]).unwrap().len(), 1);
    }

    #[test]
    fn test_connect_rejects_invalid_references() {
        let (mut graph, ids) = graph_with(&["a"]);
        assert!(!graph.connect(ids[0], NodeId(42)));
        assert!(!graph.connect(ids[0], ids[0]));
        assert_eq!(graph.branches().count(), 0);
    }

    #[test]
    fn test_disconnect_reports_change_only_when_removed() {
        let (mut graph, ids) = graph_with(&["a", "b"]);
        assert!(!graph.disconnect(ids[0], ids[1]));
        graph.connect(ids[0], ids[1]);
        assert!(graph.disconnect(ids[1], ids[0]));
        assert!(!graph.is_connected(ids[0], ids[1]));
        assert!(!graph.disconnect(ids[0], ids[1]));
    }

    #[test]
    fn test_parallel_body_keeps_adjacency() {
        let (mut graph, ids) = graph_with(&["p", "n"]);
        let body = BranchKind::Body(ComponentId(0), BodyPath::Cell);
        assert!(graph.attach(ids[0], ids[1], body).is_some());
        assert!(graph.attach(ids[0], ids[1], body).is_none());
        let lamp = BranchKind::Body(ComponentId(1), BodyPath::Filament);
        graph.attach(ids[1], ids[0], lamp);
        assert_eq!(graph.incident(ids[0]).unwrap().len(), 2);

        assert_eq!(graph.detach_owner(ComponentId(0)), 1);
        assert!(graph.is_connected(ids[0], ids[1]));
        assert!(graph.detach(lamp));
        assert!(!graph.is_connected(ids[0], ids[1]));
    }

    #[test]
    fn test_connection_runs_parallel_to_component_branches() {
        let (mut graph, ids) = graph_with(&["p", "a"]);
        let contact = BranchKind::SwitchContact(ComponentId(3));
        graph.attach(ids[0], ids[1], contact);
        graph.attach(ids[0], ids[1], BranchKind::Body(ComponentId(0), BodyPath::Cell));

        assert!(graph.connect(ids[0], ids[1]));
        assert!(!graph.connect(ids[1], ids[0]));
        assert!(!graph.connect_wire(ids[0], ids[1], WireId(1)));
        assert_eq!(graph.incident(ids[0]).unwrap().len(), 3);

        assert!(graph.detach(contact));
        assert!(graph.connection_between(ids[0], ids[1]).is_some());
        assert!(graph.is_connected(ids[0], ids[1]));
    }

    #[test]
    fn test_remove_node_cascades() {
        let (mut graph, ids) = graph_with(&["a", "b", "c"]);
        graph.connect(ids[0], ids[1]);
        graph.connect(ids[1], ids[2]);
        assert!(graph.remove_node(ids[1]));
        assert!(!graph.contains(ids[1]));
        assert!(graph.neighbors(ids[0]).unwrap().is_empty());
        assert!(graph.neighbors(ids[2]).unwrap().is_empty());
        assert_eq!(graph.branches().count(), 0);
        assert!(!graph.remove_node(ids[1]));
        assert_eq!(graph.find_node("b"), None);
    }

    #[test]
    fn test_wire_owns_connection() {
        let (mut graph, ids) = graph_with(&["a", "b"]);
        assert!(graph.connect_wire(ids[0], ids[1], WireId(7)));
        assert!(!graph.disconnect_wire(WireId(8)));
        assert!(graph.disconnect_wire(WireId(7)));
        assert!(!graph.is_connected(ids[0], ids[1]));
    }
}
