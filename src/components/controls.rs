//! Control components: Potentiometer and Switch.

use crate::circuit::{BodyPath, NodeId};

/// Lower bound of the variable resistance.
pub const MIN_RESISTANCE: f64 = 1.0;

/// Upper bound of the variable resistance.
pub const MAX_RESISTANCE: f64 = 10_000.0;

/// Default resistance of the fixed A–C path.
pub const DEFAULT_FIXED_RESISTANCE: f64 = 10_000.0;

/// A potentiometer component.
///
/// Three terminals with two permanent paths:
///   A ----[variable]---- B
///   A ----[fixed]------- C
///
/// Only the variable path's resistance can change.
#[derive(Debug, Clone, PartialEq)]
pub struct Potentiometer {
    pub name: String,
    pub nodes: [NodeId; 3], // [a, b (variable), c (fixed max)]
    resistance: f64,
    fixed_resistance: f64,
}

impl Potentiometer {
    /// Create a new potentiometer.
    pub fn new(name: impl Into<String>, nodes: [NodeId; 3], resistance: f64) -> Self {
        Self {
            name: name.into(),
            nodes,
            resistance: clamp_resistance(resistance, MIN_RESISTANCE),
            fixed_resistance: DEFAULT_FIXED_RESISTANCE,
        }
    }

    /// Override the fixed A–C resistance.
    pub fn with_fixed_resistance(mut self, fixed_resistance: f64) -> Self {
        self.fixed_resistance = clamp_resistance(fixed_resistance, DEFAULT_FIXED_RESISTANCE);
        self
    }

    /// Get the variable resistance.
    pub fn resistance(&self) -> f64 {
        self.resistance
    }

    /// Get the fixed resistance.
    pub fn fixed_resistance(&self) -> f64 {
        self.fixed_resistance
    }

    /// Set the variable resistance, clamped to `[MIN_RESISTANCE, MAX_RESISTANCE]`.
    ///
    /// Returns `true` if the stored value changed. NaN is ignored.
    pub fn set_resistance(&mut self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        let clamped = value.clamp(MIN_RESISTANCE, MAX_RESISTANCE);
        if clamped == self.resistance {
            return false;
        }
        self.resistance = clamped;
        true
    }

    /// Resistance of one internal path, or `None` for paths a potentiometer
    /// does not have.
    pub fn effective_resistance(&self, path: BodyPath) -> Option<f64> {
        match path {
            BodyPath::Variable => Some(self.resistance),
            BodyPath::Fixed => Some(self.fixed_resistance),
            BodyPath::Cell | BodyPath::Filament => None,
        }
    }

    /// Get terminal A.
    pub fn a(&self) -> NodeId {
        self.nodes[0]
    }

    /// Get the variable terminal B.
    pub fn b(&self) -> NodeId {
        self.nodes[1]
    }

    /// Get the fixed terminal C.
    pub fn c(&self) -> NodeId {
        self.nodes[2]
    }
}

fn clamp_resistance(value: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(MIN_RESISTANCE, MAX_RESISTANCE)
    }
}

/// A switch component.
///
/// Closed: the contact links both terminals.
/// Open: no link.
#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    pub name: String,
    pub nodes: [NodeId; 2],
    pub closed: bool,
}

impl Switch {
    /// Create a new switch.
    pub fn new(name: impl Into<String>, nodes: [NodeId; 2], closed: bool) -> Self {
        Self {
            name: name.into(),
            nodes,
            closed,
        }
    }

    /// Toggle the switch state and return the new state.
    pub fn toggle(&mut self) -> bool {
        self.closed = !self.closed;
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pot(resistance: f64) -> Potentiometer {
        Potentiometer::new("POT1", [NodeId(0), NodeId(1), NodeId(2)], resistance)
    }

    #[test]
    fn test_resistance_is_clamped() {
        assert_eq!(pot(0.0).resistance(), MIN_RESISTANCE);
        assert_eq!(pot(50_000.0).resistance(), MAX_RESISTANCE);

        let mut p = pot(100.0);
        assert!(p.set_resistance(-5.0));
        assert_eq!(p.resistance(), MIN_RESISTANCE);
        assert!(p.set_resistance(1e9));
        assert_eq!(p.resistance(), MAX_RESISTANCE);
    }

    #[test]
    fn test_set_resistance_reports_change() {
        let mut p = pot(100.0);
        assert!(!p.set_resistance(100.0));
        assert!(p.set_resistance(220.0));
        assert!(!p.set_resistance(f64::NAN));
        assert_eq!(p.resistance(), 220.0);

        let mut max = pot(MAX_RESISTANCE);
        assert!(!max.set_resistance(20_000.0));
    }

    #[test]
    fn test_effective_resistance_by_path() {
        let p = pot(330.0).with_fixed_resistance(4_700.0);
        assert_eq!(p.effective_resistance(BodyPath::Variable), Some(330.0));
        assert_eq!(p.effective_resistance(BodyPath::Fixed), Some(4_700.0));
        assert_eq!(p.effective_resistance(BodyPath::Cell), None);
        assert_eq!(p.effective_resistance(BodyPath::Filament), None);
    }

    #[test]
    fn test_switch_toggle() {
        let mut sw = Switch::new("SW1", [NodeId(0), NodeId(1)], false);
        assert!(sw.toggle());
        assert!(!sw.toggle());
        assert!(!sw.closed);
    }
}
