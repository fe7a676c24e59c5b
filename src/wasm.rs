//! WASM bindings for Lumen Core.
//!
//! This module provides JavaScript-friendly bindings for driving a circuit
//! from a browser UI. Components and wires are addressed by name.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmCircuit } from 'lumen_core';
//!
//! await init();
//!
//! const circuit = new WasmCircuit(`
//!   BAT1 p n 9
//!   SW1 p a
//!   POT1 a b c 680
//!   LED1 b n
//! `);
//!
//! circuit.toggle("SW1");
//! let seen = circuit.revision;
//! // On every animation frame:
//! if (circuit.revision !== seen) {
//!   seen = circuit.revision;
//!   render(circuit.lamp_intensity("LED1"));
//! }
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::{ComponentId, WireId};
use crate::components::Component;
use crate::dsl;
use crate::engine::CircuitEngine;
use crate::error::LumenError;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(error: LumenError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// WASM-compatible circuit engine.
#[wasm_bindgen]
pub struct WasmCircuit {
    engine: CircuitEngine,
}

#[wasm_bindgen]
impl WasmCircuit {
    /// Build a circuit from a description string.
    ///
    /// # Example
    /// ```javascript
    /// const circuit = new WasmCircuit("BAT1 p n 9\nLED1 p n");
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new(description: &str) -> Result<WasmCircuit, JsValue> {
        let ast = dsl::parse(description).map_err(to_js)?;
        let engine = CircuitEngine::from_ast(ast).map_err(to_js)?;
        Ok(WasmCircuit { engine })
    }

    /// Toggle a switch, returning its new state.
    #[wasm_bindgen]
    pub fn toggle(&mut self, switch: &str) -> Result<bool, JsValue> {
        let id = self.component(switch)?;
        self.engine.toggle_switch(id).ok_or_else(|| {
            to_js(LumenError::WasmError {
                message: format!("'{}' is not a switch", switch),
            })
        })
    }

    /// Set a potentiometer's resistance. Returns `true` if it changed.
    #[wasm_bindgen]
    pub fn set_resistance(&mut self, potentiometer: &str, ohms: f64) -> Result<bool, JsValue> {
        let id = self.component(potentiometer)?;
        match self.engine.component(id) {
            Some(Component::Potentiometer(_)) => Ok(self.engine.set_resistance(id, ohms)),
            _ => Err(to_js(LumenError::WasmError {
                message: format!("'{}' is not a potentiometer", potentiometer),
            })),
        }
    }

    /// Add a named wire between two nodes. Returns `false` if the pair was
    /// already connected.
    #[wasm_bindgen]
    pub fn add_wire(&mut self, name: &str, a: &str, b: &str) -> Result<bool, JsValue> {
        let a = self.node(a)?;
        let b = self.node(b)?;
        Ok(self.engine.add_named_wire(name, a, b).is_some())
    }

    /// Remove a wire by name. Returns `false` if no such wire exists.
    #[wasm_bindgen]
    pub fn remove_wire(&mut self, name: &str) -> bool {
        self.engine
            .find_wire(name)
            .map(|id: WireId| self.engine.remove_wire(id))
            .unwrap_or(false)
    }

    /// Whether a lamp is on. Unknown names read as off.
    #[wasm_bindgen]
    pub fn is_lamp_on(&self, lamp: &str) -> bool {
        self.engine
            .find_component(lamp)
            .map(|id| self.engine.is_lamp_on(id))
            .unwrap_or(false)
    }

    /// A lamp's intensity. Unknown names read as 0.
    #[wasm_bindgen]
    pub fn lamp_intensity(&self, lamp: &str) -> f64 {
        self.engine
            .find_component(lamp)
            .map(|id| self.engine.lamp_intensity(id))
            .unwrap_or(0.0)
    }

    /// A lamp's condition as text ("normal", "too dim", ...).
    #[wasm_bindgen]
    pub fn lamp_condition(&self, lamp: &str) -> Option<String> {
        let id = self.engine.find_component(lamp)?;
        self.engine.lamp(id).map(|lamp| lamp.condition().to_string())
    }

    /// Whether any loop region is closed.
    #[wasm_bindgen(getter)]
    pub fn closed(&self) -> bool {
        self.engine.is_circuit_closed()
    }

    /// Recompute counter, bumped after every change.
    #[wasm_bindgen(getter)]
    pub fn revision(&self) -> f64 {
        self.engine.revision() as f64
    }
}

impl WasmCircuit {
    fn component(&self, name: &str) -> Result<ComponentId, JsValue> {
        self.engine.find_component(name).ok_or_else(|| {
            to_js(LumenError::ComponentNotFound {
                name: name.to_string(),
            })
        })
    }

    fn node(&self, name: &str) -> Result<crate::circuit::NodeId, JsValue> {
        self.engine.find_node(name).ok_or_else(|| {
            to_js(LumenError::NodeNotFound {
                node: name.to_string(),
            })
        })
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
