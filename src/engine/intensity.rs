//! Lamp brightness from loop voltage and series resistance.
//!
//! ```text
//! resistor_voltage = V - led_forward_voltage
//! current          = resistor_voltage / R
//! intensity        = (led_forward_voltage * current)
//!                  / (led_forward_voltage * max_safe_current) * max_intensity
//!                  = current / max_safe_current * max_intensity
//! ```
//!
//! with two saturating clamps: at or above the safe current the lamp reports
//! `max_intensity`, below the visible current it reports 0. The reduced form
//! is what gets evaluated, so a zero forward voltage cannot produce `0 / 0`.

use crate::components::{LampCondition, LampReading};

use super::EngineConfig;

/// Series resistance above which the lamp current drops below the visible threshold.
///
/// Non-positive when the voltage cannot overcome the forward drop.
pub fn visibility_cutoff(voltage: f64, config: &EngineConfig) -> f64 {
    (voltage - config.led_forward_voltage) / config.min_visible_current
}

/// Compute a lamp's brightness.
///
/// Pure: callers decide how to report the warning conditions.
pub fn lamp_intensity(voltage: f64, resistance: f64, config: &EngineConfig) -> LampReading {
    // An unvalidated config may carry a negative or NaN ceiling.
    let max = if config.max_intensity.is_finite() && config.max_intensity > 0.0 {
        config.max_intensity
    } else {
        0.0
    };
    let dark = LampReading {
        intensity: 0.0,
        condition: LampCondition::TooDim,
    };

    if resistance <= 0.0 || resistance.is_nan() {
        return LampReading {
            intensity: max,
            condition: LampCondition::ShortCircuit,
        };
    }

    let resistor_voltage = voltage - config.led_forward_voltage;
    let current = resistor_voltage / resistance;

    if current > config.max_safe_current {
        return LampReading {
            intensity: max,
            condition: LampCondition::OverCurrent,
        };
    }

    if resistance > visibility_cutoff(voltage, config) {
        return dark;
    }

    let intensity = current / config.max_safe_current * max;
    if !intensity.is_finite() {
        return dark;
    }
    LampReading {
        intensity: intensity.clamp(0.0, max),
        condition: LampCondition::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normal_band() {
        let config = EngineConfig::default();
        // (9 - 2.2) / 680 = 0.01 A, half the safe current
        let reading = lamp_intensity(9.0, 680.0, &config);
        assert_eq!(reading.condition, LampCondition::Normal);
        assert_relative_eq!(reading.intensity, config.max_intensity / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_short_circuit_saturates() {
        let config = EngineConfig::default();
        for r in [0.0, -10.0] {
            let reading = lamp_intensity(9.0, r, &config);
            assert_eq!(reading.condition, LampCondition::ShortCircuit);
            assert_eq!(reading.intensity, config.max_intensity);
        }
    }

    #[test]
    fn test_over_current_saturates() {
        let config = EngineConfig::default();
        let reading = lamp_intensity(9.0, 100.0, &config);
        assert_eq!(reading.condition, LampCondition::OverCurrent);
        assert_eq!(reading.intensity, config.max_intensity);
    }

    #[test]
    fn test_too_dim_above_cutoff() {
        let config = EngineConfig::default();
        assert_relative_eq!(visibility_cutoff(9.0, &config), 3_400.0, epsilon = 1e-9);
        let reading = lamp_intensity(9.0, 10_000.0, &config);
        assert_eq!(reading.condition, LampCondition::TooDim);
        assert_eq!(reading.intensity, 0.0);
    }

    #[test]
    fn test_below_forward_voltage_is_dark() {
        let config = EngineConfig::default();
        let reading = lamp_intensity(1.5, 10.0, &config);
        assert_eq!(reading.condition, LampCondition::TooDim);
        assert_eq!(reading.intensity, 0.0);
    }

    #[test]
    fn test_zero_forward_voltage_stays_in_range() {
        let config = EngineConfig::default().with_led_forward_voltage(0.0);
        let reading = lamp_intensity(9.0, 470.0, &config);
        assert_eq!(reading.condition, LampCondition::Normal);
        assert_relative_eq!(reading.intensity, 9.0 / 470.0 / 0.02 * 59.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_config_never_yields_nan() {
        let configs = [
            EngineConfig::default().with_max_intensity(f64::NAN),
            EngineConfig::default().with_max_intensity(-5.0),
            EngineConfig::default().with_max_safe_current(0.0),
            EngineConfig::default().with_min_visible_current(0.0),
            EngineConfig::default().with_led_forward_voltage(f64::NAN),
        ];
        for config in &configs {
            for r in [0.0, 1.0, 470.0, 10_000.0] {
                let reading = lamp_intensity(9.0, r, config);
                assert!(reading.intensity.is_finite(), "{:?} at R = {}", config, r);
                assert!(reading.intensity >= 0.0);
                assert!(reading.intensity <= config.max_intensity.max(0.0));
            }
        }
    }

    #[test]
    fn test_monotonic_in_resistance() {
        let config = EngineConfig::default();
        let mut previous = f64::INFINITY;
        for step in 0..=200 {
            let r = 1.0 + step as f64 * 50.0;
            let intensity = lamp_intensity(9.0, r, &config).intensity;
            assert!(intensity <= previous, "intensity rose at R = {}", r);
            assert!((0.0..=config.max_intensity).contains(&intensity));
            previous = intensity;
        }
    }
}
