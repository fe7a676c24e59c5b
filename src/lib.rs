//! # Lumen Core
//!
//! A topology engine for interactive lamp circuits.
//!
//! This library provides:
//! - A node graph with owned branches (connections, switch contacts and
//!   component bodies)
//! - Topology analysis: loop regions, battery groups and closed-loop detection
//! - A lamp intensity model driven by loop voltage and potentiometer resistance
//! - A small text format for describing circuits
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`dsl`] - Parser for the circuit description language
//! - [`circuit`] - Node graph, branch model and topology analysis
//! - [`components`] - Battery, switch, potentiometer and lamp models
//! - [`engine`] - The circuit engine that keeps lamp state current
//!
//! ## Usage
//!
//! ### Native
//!
//! ```
//! use lumen_core::{dsl, CircuitEngine};
//!
//! let ast = dsl::parse("BAT1 p n 9\nSW1 p a\nLED1 a n").unwrap();
//! let mut engine = CircuitEngine::from_ast(ast).unwrap();
//! let lamp = engine.find_component("LED1").unwrap();
//! assert!(!engine.is_lamp_on(lamp));
//!
//! let switch = engine.find_component("SW1").unwrap();
//! engine.toggle_switch(switch);
//! assert!(engine.is_lamp_on(lamp));
//! ```
//!
//! ### CLI
//!
//! ```bash
//! lumen circuit.lum --toggle SW1 --set POT1=680
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmCircuit } from 'lumen_core';
//!
//! const circuit = new WasmCircuit(description);
//! circuit.toggle("SW1");
//! circuit.lamp_intensity("LED1");
//! ```
//!
//! ## Lamp Model
//!
//! A lamp is on when its filament lies on a simple loop together with at least
//! one battery cell. Its brightness comes from the summed voltage of those
//! batteries and the resistance of the potentiometer paths sharing the loop,
//! or a default series resistance when there are none.

pub mod circuit;
pub mod components;
pub mod dsl;
pub mod engine;
pub mod error;

// Re-export main types for convenience
pub use circuit::{ComponentId, NodeGraph, NodeId, Topology, TopologyAnalyzer, WireId};
pub use components::{Component, LampCondition};
pub use engine::{CircuitEngine, CircuitUpdate, EngineConfig};
pub use error::{LumenError, Result};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmCircuit;
