//! Circuit graph representation and topology analysis.
//!
//! This module provides the node arena ([`NodeGraph`]), the branch model that
//! links nodes, and the [`TopologyAnalyzer`] that partitions the graph into
//! loop regions and decides which of them are closed.

mod graph;
mod topology;
mod types;
mod validate;

pub use graph::NodeGraph;
pub use topology::{LoopBlocks, NodeSet, Region, Topology, TopologyAnalyzer};
pub use types::*;
pub use validate::validate_terminals;
