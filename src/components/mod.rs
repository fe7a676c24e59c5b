//! Component models for the circuit engine.
//!
//! This module provides the closed set of supported components:
//! - Sources: Battery
//! - Controls: Switch, Potentiometer
//! - Indicators: Lamp
//!
//! Each component exposes its terminals and the permanent internal paths
//! ("bodies") it contributes to the node graph.

mod controls;
mod lamp;
mod sources;

pub use controls::{Potentiometer, Switch, DEFAULT_FIXED_RESISTANCE, MAX_RESISTANCE, MIN_RESISTANCE};
pub use lamp::{Lamp, LampCondition, LampReading};
pub use sources::Battery;

use crate::circuit::{BodyPath, NodeId};
use crate::dsl::{ComponentDef, ComponentType};
use crate::error::{LumenError, Result};

/// A circuit component.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Battery(Battery),
    Switch(Switch),
    Potentiometer(Potentiometer),
    Lamp(Lamp),
}

impl Component {
    /// Create a component from a description definition.
    pub fn from_def(def: &ComponentDef, nodes: &[NodeId]) -> Result<Self> {
        match def.component_type {
            ComponentType::Battery => {
                let voltage = def.value.ok_or_else(|| {
                    LumenError::invalid_component(&def.name, def.line, "battery requires a voltage")
                })?;
                Ok(Component::Battery(Battery::new(
                    def.name.clone(),
                    [nodes[0], nodes[1]],
                    voltage,
                )))
            }

            ComponentType::Switch => {
                let closed = def
                    .params
                    .get("state")
                    .copied()
                    .or(def.value)
                    .map(|v| v > 0.5)
                    .unwrap_or(false);
                Ok(Component::Switch(Switch::new(
                    def.name.clone(),
                    [nodes[0], nodes[1]],
                    closed,
                )))
            }

            ComponentType::Potentiometer => {
                let resistance = def.value.ok_or_else(|| {
                    LumenError::invalid_component(&def.name, def.line, "potentiometer requires a resistance")
                })?;
                let pot = Potentiometer::new(def.name.clone(), [nodes[0], nodes[1], nodes[2]], resistance);
                Ok(Component::Potentiometer(match def.params.get("fixed") {
                    Some(&fixed) => pot.with_fixed_resistance(fixed),
                    None => pot,
                }))
            }

            ComponentType::Lamp => Ok(Component::Lamp(Lamp::new(
                def.name.clone(),
                [nodes[0], nodes[1]],
            ))),

            // Wires are connections, not components, and are handled by the engine.
            ComponentType::Wire => Err(LumenError::invalid_component(
                &def.name,
                def.line,
                "wires should be handled separately",
            )),
        }
    }

    /// Get the component name.
    pub fn name(&self) -> &str {
        match self {
            Component::Battery(b) => &b.name,
            Component::Switch(s) => &s.name,
            Component::Potentiometer(p) => &p.name,
            Component::Lamp(l) => &l.name,
        }
    }

    /// Human-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Component::Battery(_) => "battery",
            Component::Switch(_) => "switch",
            Component::Potentiometer(_) => "potentiometer",
            Component::Lamp(_) => "lamp",
        }
    }

    /// Terminals with their labels.
    pub fn terminals(&self) -> Vec<(&'static str, NodeId)> {
        match self {
            Component::Battery(b) => vec![("positive", b.nodes[0]), ("negative", b.nodes[1])],
            Component::Switch(s) => vec![("node1", s.nodes[0]), ("node2", s.nodes[1])],
            Component::Potentiometer(p) => vec![("a", p.nodes[0]), ("b", p.nodes[1]), ("c", p.nodes[2])],
            Component::Lamp(l) => vec![("positive", l.nodes[0]), ("negative", l.nodes[1])],
        }
    }

    /// Permanent internal paths this component links while registered.
    ///
    /// A switch has none: its contact follows the open/closed state.
    pub fn bodies(&self) -> Vec<(NodeId, NodeId, BodyPath)> {
        match self {
            Component::Battery(b) => vec![(b.nodes[0], b.nodes[1], BodyPath::Cell)],
            Component::Switch(_) => Vec::new(),
            Component::Potentiometer(p) => vec![
                (p.a(), p.b(), BodyPath::Variable),
                (p.a(), p.c(), BodyPath::Fixed),
            ],
            Component::Lamp(l) => vec![(l.nodes[0], l.nodes[1], BodyPath::Filament)],
        }
    }

    /// Check if the component uses `node` as a terminal.
    pub fn uses_node(&self, node: NodeId) -> bool {
        self.terminals().iter().any(|(_, n)| *n == node)
    }

    /// Get the lamp, if this is one.
    pub fn as_lamp(&self) -> Option<&Lamp> {
        match self {
            Component::Lamp(l) => Some(l),
            _ => None,
        }
    }
}
