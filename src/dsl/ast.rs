//! Abstract Syntax Tree types for the circuit description language.

use std::collections::HashMap;

/// Complete AST representation of a parsed circuit.
#[derive(Debug, Clone, Default)]
pub struct CircuitAst {
    /// All component and wire definitions, in source order
    pub components: Vec<ComponentDef>,
    /// Engine configuration overrides from `.param`
    pub params: Vec<ParamDef>,
    /// All referenced node names, in first-seen order
    pub nodes: Vec<String>,
}

impl CircuitAst {
    /// Create a new empty circuit AST.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a node name if it has not been seen yet.
    pub fn declare_node(&mut self, name: &str) {
        if !self.nodes.iter().any(|n| n == name) {
            self.nodes.push(name.to_string());
        }
    }
}

/// A component (or wire) definition.
#[derive(Debug, Clone)]
pub struct ComponentDef {
    /// Component type
    pub component_type: ComponentType,
    /// Unique component name
    pub name: String,
    /// Connected node names, in terminal order
    pub nodes: Vec<String>,
    /// Primary value (voltage, resistance, switch state)
    pub value: Option<f64>,
    /// Additional `key=value` parameters
    pub params: HashMap<String, f64>,
    /// Source line number for error reporting
    pub line: usize,
}

/// A single `.param key=value` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDef {
    pub name: String,
    pub value: f64,
    pub line: usize,
}

/// Component types supported by the description language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    /// Battery
    Battery,
    /// Switch
    Switch,
    /// Potentiometer
    Potentiometer,
    /// Lamp / LED
    Lamp,
    /// Wire (a user connection, not a component)
    Wire,
}

impl ComponentType {
    /// Parse a component type from a name prefix (`BAT1`, `SW2`, ...).
    pub fn from_prefix(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        if upper.starts_with("BAT") {
            Some(Self::Battery)
        } else if upper.starts_with("POT") {
            Some(Self::Potentiometer)
        } else if upper.starts_with("SW") {
            Some(Self::Switch)
        } else if upper.starts_with("LED") || upper.starts_with("LAMP") {
            Some(Self::Lamp)
        } else if upper.starts_with('W') {
            Some(Self::Wire)
        } else {
            None
        }
    }

    /// Parse a component type from a standalone keyword (`BATTERY <name> ...`).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "BATTERY" => Some(Self::Battery),
            "SWITCH" => Some(Self::Switch),
            "POTENTIOMETER" => Some(Self::Potentiometer),
            "LAMP" | "LED" => Some(Self::Lamp),
            "WIRE" => Some(Self::Wire),
            _ => None,
        }
    }

    /// Get the expected number of nodes for this component type.
    pub fn expected_node_count(&self) -> usize {
        match self {
            Self::Battery | Self::Switch | Self::Lamp | Self::Wire => 2,
            Self::Potentiometer => 3, // a, b (variable), c (fixed)
        }
    }
}
