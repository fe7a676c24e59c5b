//! Core types for circuit representation.

use std::fmt;

/// A stable handle to a node in the graph arena.
///
/// Handles are never reused: removing a node leaves its slot empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// A unique identifier for a registered component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub usize);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// A unique identifier for a physical wire object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WireId(pub usize);

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{}", self.0)
    }
}

/// Identity of a single branch between two nodes.
///
/// Cycle detection compares branch identities, so two parallel branches
/// between the same pair of nodes count as two different edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchId(pub usize);

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}", self.0)
    }
}

/// Internal current path of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BodyPath {
    /// Battery positive to negative
    Cell,
    /// Lamp positive to negative
    Filament,
    /// Potentiometer A to B (variable resistance)
    Variable,
    /// Potentiometer A to C (fixed resistance)
    Fixed,
}

/// Who owns a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BranchKind {
    /// A user connection, optionally backed by a wire object.
    Connection(Option<WireId>),
    /// The contact of a closed switch.
    SwitchContact(ComponentId),
    /// A component's internal path.
    Body(ComponentId, BodyPath),
}

impl BranchKind {
    /// The component owning this branch, if any.
    pub fn owner(&self) -> Option<ComponentId> {
        match self {
            BranchKind::Connection(_) => None,
            BranchKind::SwitchContact(id) | BranchKind::Body(id, _) => Some(*id),
        }
    }

    /// Check if this is a user connection.
    pub fn is_connection(&self) -> bool {
        matches!(self, BranchKind::Connection(_))
    }
}

/// A single link between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Branch {
    pub a: NodeId,
    pub b: NodeId,
    pub kind: BranchKind,
}

impl Branch {
    /// Get the endpoint opposite to `node`.
    pub fn other(&self, node: NodeId) -> NodeId {
        if self.a == node {
            self.b
        } else {
            self.a
        }
    }

    /// Check if this branch joins the unordered pair `(x, y)`.
    pub fn joins(&self, x: NodeId, y: NodeId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }
}

/// A physical wire object owning one user connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wire {
    pub name: String,
    pub nodes: [NodeId; 2],
}
