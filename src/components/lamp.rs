//! Indicator lamps (LEDs).

use std::fmt;

use crate::circuit::NodeId;

/// Electrical condition behind a lamp's brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LampCondition {
    /// Not part of an energized loop
    #[default]
    Off,
    /// Lit within the safe operating band
    Normal,
    /// Energized but the current is below the visible threshold
    TooDim,
    /// Current above the safe limit; saturated as a warning
    OverCurrent,
    /// Zero or negative series resistance; saturated as a warning
    ShortCircuit,
}

impl LampCondition {
    /// Check if the condition is a warning state.
    pub fn is_warning(&self) -> bool {
        matches!(self, LampCondition::OverCurrent | LampCondition::ShortCircuit)
    }
}

impl fmt::Display for LampCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LampCondition::Off => "off",
            LampCondition::Normal => "normal",
            LampCondition::TooDim => "too dim",
            LampCondition::OverCurrent => "over-current",
            LampCondition::ShortCircuit => "short circuit",
        };
        f.write_str(text)
    }
}

/// Brightness computed for one lamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LampReading {
    pub intensity: f64,
    pub condition: LampCondition,
}

/// A lamp component.
///
/// State is derived: only the engine's recompute pass changes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Lamp {
    pub name: String,
    pub nodes: [NodeId; 2], // [positive, negative]
    is_on: bool,
    intensity: f64,
    condition: LampCondition,
}

impl Lamp {
    /// Create a new lamp in the Off state.
    pub fn new(name: impl Into<String>, nodes: [NodeId; 2]) -> Self {
        Self {
            name: name.into(),
            nodes,
            is_on: false,
            intensity: 0.0,
            condition: LampCondition::Off,
        }
    }

    /// Get the positive terminal.
    pub fn positive(&self) -> NodeId {
        self.nodes[0]
    }

    /// Get the negative terminal.
    pub fn negative(&self) -> NodeId {
        self.nodes[1]
    }

    /// Whether the lamp sits on an energized closed loop.
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Current brightness in `[0, max_intensity]`.
    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    /// Condition behind the current brightness.
    pub fn condition(&self) -> LampCondition {
        self.condition
    }

    pub(crate) fn turn_on(&mut self, reading: LampReading) {
        self.is_on = true;
        self.intensity = reading.intensity;
        self.condition = reading.condition;
    }

    pub(crate) fn turn_off(&mut self) {
        self.is_on = false;
        self.intensity = 0.0;
        self.condition = LampCondition::Off;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lamp_state_transitions() {
        let mut lamp = Lamp::new("LED1", [NodeId(0), NodeId(1)]);
        assert!(!lamp.is_on());
        assert_eq!(lamp.condition(), LampCondition::Off);

        lamp.turn_on(LampReading {
            intensity: 12.5,
            condition: LampCondition::Normal,
        });
        assert!(lamp.is_on());
        assert_eq!(lamp.intensity(), 12.5);

        lamp.turn_off();
        assert!(!lamp.is_on());
        assert_eq!(lamp.intensity(), 0.0);
        assert_eq!(lamp.condition(), LampCondition::Off);
    }

    #[test]
    fn test_warning_conditions() {
        assert!(LampCondition::OverCurrent.is_warning());
        assert!(LampCondition::ShortCircuit.is_warning());
        assert!(!LampCondition::TooDim.is_warning());
    }
}
