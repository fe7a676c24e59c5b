//! Voltage sources.

use tracing::warn;

use crate::circuit::NodeId;

/// A battery component.
///
/// Both terminals are marked powered while the battery is registered, and the
/// cell itself links positive to negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Battery {
    pub name: String,
    pub nodes: [NodeId; 2], // [positive, negative]
    voltage: f64,
}

impl Battery {
    /// Create a new battery. Negative or non-finite voltages are clamped to 0.
    pub fn new(name: impl Into<String>, nodes: [NodeId; 2], voltage: f64) -> Self {
        let name = name.into();
        let voltage = if voltage.is_finite() && voltage >= 0.0 {
            voltage
        } else {
            warn!(battery = %name, voltage, "battery voltage out of range, clamping to 0");
            0.0
        };
        Self {
            name,
            nodes,
            voltage,
        }
    }

    /// Get the source voltage.
    pub fn voltage(&self) -> f64 {
        self.voltage
    }

    /// Get the positive terminal.
    pub fn positive(&self) -> NodeId {
        self.nodes[0]
    }

    /// Get the negative terminal.
    pub fn negative(&self) -> NodeId {
        self.nodes[1]
    }
}
