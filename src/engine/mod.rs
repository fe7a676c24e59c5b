//! The circuit engine and its lamp model.
//!
//! [`CircuitEngine`] owns the node graph and the registered components. Every
//! mutation triggers a synchronous recompute:
//!
//! 1. Partition nodes into loop regions and build battery groups
//! 2. Mark regions closed when a powered cycle exists
//! 3. Turn each lamp on or off and compute its intensity
//! 4. Notify subscribed listeners

mod config;
mod core;
mod events;
mod intensity;

pub use self::core::CircuitEngine;
pub use config::EngineConfig;
pub use events::{CircuitUpdate, Listener, SubscriptionId};
pub use intensity::{lamp_intensity, visibility_cutoff};

/// Voltage dropped across a lit lamp (V)
pub const LED_FORWARD_VOLTAGE: f64 = 2.2;

/// Lamp current at which brightness saturates (A)
pub const MAX_SAFE_CURRENT: f64 = 0.02;

/// Lamp current below which the lamp reads as dark (A)
pub const MIN_VISIBLE_CURRENT: f64 = 0.002;

/// Brightness at the safe current limit
pub const MAX_INTENSITY: f64 = 59.0;

/// Series resistance for loops without a potentiometer (Ω)
pub const DEFAULT_SERIES_RESISTANCE: f64 = 470.0;
