//! Registration-time validation of component terminals.

use std::collections::BTreeSet;

use crate::components::Component;
use crate::error::{LumenError, Result};

use super::NodeGraph;

/// Validate a component's terminals against the graph.
///
/// Checks:
/// - Every terminal refers to a node present in the graph
/// - No node is used for two terminals of the same component
pub fn validate_terminals(component: &Component, graph: &NodeGraph) -> Result<()> {
    let mut seen = BTreeSet::new();
    for (label, node) in component.terminals() {
        if !graph.contains(node) {
            return Err(LumenError::missing_terminal(component.name(), label));
        }
        if !seen.insert(node) {
            return Err(LumenError::DuplicateTerminal {
                component: component.name().to_string(),
                node: graph.node_name(node).unwrap_or("?").to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::NodeId;
    use crate::components::{Battery, Lamp, Potentiometer};

    #[test]
    fn test_valid_terminals() {
        let mut graph = NodeGraph::new();
        let p = graph.add_node("p");
        let n = graph.add_node("n");
        let battery = Component::Battery(Battery::new("BAT1", [p, n], 9.0));
        assert!(validate_terminals(&battery, &graph).is_ok());
    }

    #[test]
    fn test_missing_terminal() {
        let mut graph = NodeGraph::new();
        let p = graph.add_node("p");
        let lamp = Component::Lamp(Lamp::new("LED1", [p, NodeId(99)]));
        let err = validate_terminals(&lamp, &graph).unwrap_err();
        assert!(matches!(err, LumenError::MissingTerminal { ref terminal, .. } if terminal == "negative"));
    }

    #[test]
    fn test_repeated_terminal() {
        let mut graph = NodeGraph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        let pot = Component::Potentiometer(Potentiometer::new("POT1", [a, b, a], 100.0));
        let err = validate_terminals(&pot, &graph).unwrap_err();
        assert!(matches!(err, LumenError::DuplicateTerminal { .. }));
    }
}
