//! Engine configuration.

use crate::dsl::ParamDef;
use crate::error::{LumenError, Result};

use super::{
    DEFAULT_SERIES_RESISTANCE, LED_FORWARD_VOLTAGE, MAX_INTENSITY, MAX_SAFE_CURRENT, MIN_VISIBLE_CURRENT,
};

/// Configuration for the circuit engine's lamp model.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Voltage dropped across a lit lamp.
    pub led_forward_voltage: f64,
    /// Current above which a lamp saturates in a warning state.
    pub max_safe_current: f64,
    /// Current below which a lamp is too dim to perceive.
    pub min_visible_current: f64,
    /// Brightness reported at the safe current limit.
    pub max_intensity: f64,
    /// Series resistance assumed for loops without a potentiometer.
    pub default_series_resistance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            led_forward_voltage: LED_FORWARD_VOLTAGE,
            max_safe_current: MAX_SAFE_CURRENT,
            min_visible_current: MIN_VISIBLE_CURRENT,
            max_intensity: MAX_INTENSITY,
            default_series_resistance: DEFAULT_SERIES_RESISTANCE,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from `.param` entries, starting at the defaults.
    pub fn from_params(params: &[ParamDef]) -> Result<Self> {
        let mut config = Self::default();
        for param in params {
            config.set_param(&param.name, param.value)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Set the lamp forward voltage.
    pub fn with_led_forward_voltage(mut self, volts: f64) -> Self {
        self.led_forward_voltage = volts;
        self
    }

    /// Set the maximum safe current.
    pub fn with_max_safe_current(mut self, amps: f64) -> Self {
        self.max_safe_current = amps;
        self
    }

    /// Set the minimum visible current.
    pub fn with_min_visible_current(mut self, amps: f64) -> Self {
        self.min_visible_current = amps;
        self
    }

    /// Set the maximum intensity.
    pub fn with_max_intensity(mut self, intensity: f64) -> Self {
        self.max_intensity = intensity;
        self
    }

    /// Set the series resistance used when a loop has no potentiometer.
    pub fn with_default_series_resistance(mut self, ohms: f64) -> Self {
        self.default_series_resistance = ohms;
        self
    }

    /// Set one parameter by its description-file key.
    pub fn set_param(&mut self, key: &str, value: f64) -> Result<()> {
        let slot = match key {
            "led_forward_voltage" => &mut self.led_forward_voltage,
            "max_safe_current" => &mut self.max_safe_current,
            "min_visible_current" => &mut self.min_visible_current,
            "max_intensity" => &mut self.max_intensity,
            "default_resistance" | "default_series_resistance" => &mut self.default_series_resistance,
            _ => return Err(LumenError::invalid_parameter(".param", key, "unknown parameter")),
        };
        *slot = value;
        Ok(())
    }

    /// Check that every value is usable by the intensity model.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("led_forward_voltage", self.led_forward_voltage),
            ("max_safe_current", self.max_safe_current),
            ("min_visible_current", self.min_visible_current),
            ("max_intensity", self.max_intensity),
            ("default_resistance", self.default_series_resistance),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(LumenError::invalid_parameter(".param", key, "must be a positive number"));
            }
        }
        if self.min_visible_current >= self.max_safe_current {
            return Err(LumenError::invalid_parameter(
                ".param",
                "min_visible_current",
                "must be below max_safe_current",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, value: f64) -> ParamDef {
        ParamDef {
            name: name.to_string(),
            value,
            line: 1,
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_params_overrides() {
        let config = EngineConfig::from_params(&[param("max_intensity", 100.0), param("default_resistance", 1_000.0)])
            .unwrap();
        assert_eq!(config.max_intensity, 100.0);
        assert_eq!(config.default_series_resistance, 1_000.0);
        assert_eq!(config.led_forward_voltage, LED_FORWARD_VOLTAGE);
    }

    #[test]
    fn test_unknown_param_is_rejected() {
        let err = EngineConfig::from_params(&[param("brightness", 1.0)]).unwrap_err();
        assert!(matches!(err, LumenError::InvalidParameter { ref param, .. } if param == "brightness"));
    }

    #[test]
    fn test_inverted_current_band_is_rejected() {
        let err = EngineConfig::from_params(&[param("min_visible_current", 0.5)]).unwrap_err();
        assert!(matches!(err, LumenError::InvalidParameter { .. }));
        assert!(EngineConfig::new().with_max_intensity(-1.0).validate().is_err());
    }
}
