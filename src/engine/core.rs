//! The circuit engine: owns the graph and components and keeps lamp state current.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, error, warn};

use crate::circuit::{
    validate_terminals, BodyPath, BranchId, BranchKind, ComponentId, LoopBlocks, NodeGraph, NodeId, Region,
    Topology, TopologyAnalyzer, Wire, WireId,
};
use crate::components::{Battery, Component, Lamp, LampCondition, LampReading};
use crate::dsl::{CircuitAst, ComponentType};
use crate::error::{LumenError, Result};

use super::events::{CircuitUpdate, Listener, Listeners, SubscriptionId};
use super::intensity::lamp_intensity;
use super::EngineConfig;

/// The circuit engine.
///
/// Every mutating method applies its change to the graph and then runs a full
/// [`recompute`](Self::recompute) before returning, so read-back accessors are
/// never stale. Mutations that turn out to be no-ops skip the recompute.
#[derive(Debug)]
pub struct CircuitEngine {
    config: EngineConfig,
    graph: NodeGraph,
    components: BTreeMap<ComponentId, Component>,
    component_names: HashMap<String, ComponentId>,
    next_component: usize,
    wires: BTreeMap<WireId, Wire>,
    wire_names: HashMap<String, WireId>,
    next_wire: usize,
    topology: Topology,
    revision: u64,
    listeners: Listeners,
}

impl Default for CircuitEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitEngine {
    /// Create an empty engine with default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an empty engine with custom configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            graph: NodeGraph::new(),
            components: BTreeMap::new(),
            component_names: HashMap::new(),
            next_component: 0,
            wires: BTreeMap::new(),
            wire_names: HashMap::new(),
            next_wire: 0,
            topology: Topology::default(),
            revision: 0,
            listeners: Listeners::default(),
        }
    }

    /// Build an engine from a parsed circuit description.
    ///
    /// All nodes, components and wires are registered first, then a single
    /// recompute runs.
    pub fn from_ast(ast: CircuitAst) -> Result<Self> {
        let config = EngineConfig::from_params(&ast.params)?;
        let mut engine = Self::with_config(config);

        for name in &ast.nodes {
            engine.graph.add_node(name.as_str());
        }

        for def in &ast.components {
            let nodes: Vec<NodeId> = def
                .nodes
                .iter()
                .map(|name| {
                    engine
                        .graph
                        .find_node(name)
                        .ok_or_else(|| LumenError::NodeNotFound { node: name.clone() })
                })
                .collect::<Result<Vec<_>>>()?;
            if nodes.len() != def.component_type.expected_node_count() {
                return Err(LumenError::invalid_component(
                    &def.name,
                    def.line,
                    format!("expected {} nodes, got {}", def.component_type.expected_node_count(), nodes.len()),
                ));
            }

            if def.component_type == ComponentType::Wire {
                if nodes[0] == nodes[1] {
                    return Err(LumenError::invalid_component(
                        &def.name,
                        def.line,
                        "wire joins a node to itself",
                    ));
                }
                if engine.register_wire(&def.name, nodes[0], nodes[1]).is_none() {
                    warn!(wire = %def.name, line = def.line, "wire duplicates an existing connection");
                }
                continue;
            }

            let component = Component::from_def(def, &nodes)?;
            engine.register(component)?;
        }

        engine.recompute();
        Ok(engine)
    }

    // ============ Nodes and connections ============

    /// Add a node; idempotent by name.
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        let name = name.into();
        if let Some(existing) = self.graph.find_node(&name) {
            return existing;
        }
        let id = self.graph.add_node(name);
        self.recompute();
        id
    }

    /// Remove a node, its links, and every component or wire attached to it.
    pub fn remove_node(&mut self, node: NodeId) -> bool {
        if !self.graph.contains(node) {
            return false;
        }

        let dependents: Vec<ComponentId> = self
            .components
            .iter()
            .filter(|(_, component)| component.uses_node(node))
            .map(|(id, _)| *id)
            .collect();
        for id in dependents {
            warn!(component = %self.component_name(id), %node, "removing component whose terminal was deleted");
            self.deregister(id);
        }

        let orphaned: Vec<WireId> = self
            .wires
            .iter()
            .filter(|(_, wire)| wire.nodes.contains(&node))
            .map(|(id, _)| *id)
            .collect();
        for id in orphaned {
            if let Some(wire) = self.wires.remove(&id) {
                self.wire_names.remove(&wire.name);
            }
        }

        self.graph.remove_node(node);
        self.recompute();
        true
    }

    /// Connect two nodes directly. No-op for invalid or duplicate pairs.
    pub fn add_connection(&mut self, a: NodeId, b: NodeId) -> bool {
        let changed = self.graph.connect(a, b);
        if changed {
            self.recompute();
        }
        changed
    }

    /// Remove a direct connection or the wire joining two nodes.
    ///
    /// Component bodies and closed switch contacts cannot be removed this way.
    pub fn remove_connection(&mut self, a: NodeId, b: NodeId) -> bool {
        let wire = self
            .graph
            .connection_between(a, b)
            .and_then(|id| self.graph.branch(id))
            .and_then(|branch| match branch.kind {
                BranchKind::Connection(wire) => wire,
                _ => None,
            });
        if let Some(wire) = wire {
            return self.remove_wire(wire);
        }

        let changed = self.graph.disconnect(a, b);
        if changed {
            self.recompute();
        } else if self.graph.is_connected(a, b) {
            debug!(%a, %b, "pair is joined only by component paths, nothing to remove");
        }
        changed
    }

    /// Add a wire between two nodes. Returns `None` if the pair is invalid or
    /// already has a user connection.
    pub fn add_wire(&mut self, a: NodeId, b: NodeId) -> Option<WireId> {
        let name = format!("W{}", self.next_wire);
        self.add_named_wire(name, a, b)
    }

    /// Add a named wire between two nodes.
    pub fn add_named_wire(&mut self, name: impl Into<String>, a: NodeId, b: NodeId) -> Option<WireId> {
        let id = self.register_wire(&name.into(), a, b)?;
        self.recompute();
        Some(id)
    }

    /// Remove a wire and the connection it owns.
    pub fn remove_wire(&mut self, wire: WireId) -> bool {
        let Some(removed) = self.wires.remove(&wire) else {
            return false;
        };
        self.wire_names.remove(&removed.name);
        self.graph.disconnect_wire(wire);
        self.recompute();
        true
    }

    // ============ Components ============

    /// Register a component.
    ///
    /// Re-adding a name that is already registered is a no-op returning the
    /// existing id. Malformed components are rejected and logged.
    pub fn add_component(&mut self, component: Component) -> Result<ComponentId> {
        let known = self.component_names.contains_key(component.name());
        let id = self.register(component)?;
        if !known {
            self.recompute();
        }
        Ok(id)
    }

    /// Deregister a component and remove its links.
    pub fn remove_component(&mut self, id: ComponentId) -> bool {
        if self.deregister(id).is_none() {
            return false;
        }
        self.recompute();
        true
    }

    /// Toggle a switch. Returns the new state, or `None` if `id` is not a switch.
    pub fn toggle_switch(&mut self, id: ComponentId) -> Option<bool> {
        let Some(Component::Switch(switch)) = self.components.get_mut(&id) else {
            warn!(component = %id, "toggle ignored: not a registered switch");
            return None;
        };
        let closed = switch.toggle();
        let [a, b] = switch.nodes;
        if closed {
            self.graph.attach(a, b, BranchKind::SwitchContact(id));
        } else {
            self.graph.detach(BranchKind::SwitchContact(id));
        }
        debug!(switch = %id, closed, "switch toggled");
        self.recompute();
        Some(closed)
    }

    /// Drive a switch to a given state. Returns `true` if it changed.
    pub fn set_switch(&mut self, id: ComponentId, closed: bool) -> bool {
        match self.components.get(&id) {
            Some(Component::Switch(switch)) if switch.closed != closed => self.toggle_switch(id).is_some(),
            _ => false,
        }
    }

    /// Set a potentiometer's variable resistance (clamped). Returns `true` if
    /// the value changed.
    pub fn set_resistance(&mut self, id: ComponentId, value: f64) -> bool {
        let Some(Component::Potentiometer(pot)) = self.components.get_mut(&id) else {
            warn!(component = %id, "resistance change ignored: not a registered potentiometer");
            return false;
        };
        if !pot.set_resistance(value) {
            return false;
        }
        debug!(potentiometer = %id, resistance = pot.resistance(), "resistance changed");
        self.recompute();
        true
    }

    // ============ Subscriptions ============

    /// Register a listener invoked at the end of every recompute.
    pub fn subscribe(&mut self, listener: impl FnMut(&CircuitUpdate) + Send + 'static) -> SubscriptionId {
        let listener: Listener = Box::new(listener);
        self.listeners.subscribe(listener)
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // ============ Read-back ============

    /// Get the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read-only view of the node graph.
    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    /// Result of the latest analysis.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Loop regions of the latest analysis.
    pub fn regions(&self) -> &[Region] {
        &self.topology.regions
    }

    /// Number of recomputes run so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Find a node by name.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.graph.find_node(name)
    }

    /// Find a component by name.
    pub fn find_component(&self, name: &str) -> Option<ComponentId> {
        self.component_names.get(name).copied()
    }

    /// Find a wire by name.
    pub fn find_wire(&self, name: &str) -> Option<WireId> {
        self.wire_names.get(name).copied()
    }

    /// Look up a component.
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    /// Iterate over registered components in id order.
    pub fn components(&self) -> impl Iterator<Item = (ComponentId, &Component)> + '_ {
        self.components.iter().map(|(id, component)| (*id, component))
    }

    /// Iterate over registered wires.
    pub fn wires(&self) -> impl Iterator<Item = (WireId, &Wire)> + '_ {
        self.wires.iter().map(|(id, wire)| (*id, wire))
    }

    /// Look up a lamp.
    pub fn lamp(&self, id: ComponentId) -> Option<&Lamp> {
        self.components.get(&id).and_then(Component::as_lamp)
    }

    /// Iterate over registered lamps.
    pub fn lamps(&self) -> impl Iterator<Item = (ComponentId, &Lamp)> + '_ {
        self.components
            .iter()
            .filter_map(|(id, component)| component.as_lamp().map(|lamp| (*id, lamp)))
    }

    /// Whether a lamp is on. Unknown ids read as off.
    pub fn is_lamp_on(&self, id: ComponentId) -> bool {
        self.lamp(id).map(Lamp::is_on).unwrap_or(false)
    }

    /// A lamp's intensity. Unknown ids read as 0.
    pub fn lamp_intensity(&self, id: ComponentId) -> f64 {
        self.lamp(id).map(Lamp::intensity).unwrap_or(0.0)
    }

    /// Whether a lamp's region can be reached from any battery, closed or not.
    pub fn is_lamp_connected(&self, id: ComponentId) -> bool {
        let Some(lamp) = self.lamp(id) else {
            return false;
        };
        self.topology
            .groups
            .values()
            .any(|group| group.contains(&lamp.positive()) && group.contains(&lamp.negative()))
    }

    /// Whether any loop region is closed.
    pub fn is_circuit_closed(&self) -> bool {
        self.topology.is_closed()
    }

    // ============ Recompute ============

    /// Re-analyze the graph and refresh every lamp, then notify listeners.
    ///
    /// Never fails: a lamp that cannot be evaluated is turned off.
    pub fn recompute(&mut self) {
        let batteries: Vec<(ComponentId, NodeId)> = self
            .components
            .iter()
            .filter_map(|(id, component)| match component {
                Component::Battery(battery) => Some((*id, battery.positive())),
                _ => None,
            })
            .collect();
        let topology = TopologyAnalyzer::new(&self.graph).analyze(&batteries);

        let readings: Vec<(ComponentId, Option<LampReading>)> = self
            .lamps()
            .map(|(id, lamp)| (id, self.evaluate_lamp(id, lamp, &topology)))
            .collect();

        let mut lamps_on = 0;
        for (id, reading) in readings {
            if let Some(Component::Lamp(lamp)) = self.components.get_mut(&id) {
                match reading {
                    Some(reading) => {
                        lamp.turn_on(reading);
                        lamps_on += 1;
                    }
                    None => lamp.turn_off(),
                }
            }
        }

        self.topology = topology;
        self.revision += 1;

        let update = CircuitUpdate {
            revision: self.revision,
            lamps_on,
            closed_regions: self.topology.closed_regions(),
        };
        debug!(
            revision = update.revision,
            regions = self.topology.regions.len(),
            closed = update.closed_regions,
            lamps_on,
            "circuit recomputed"
        );
        self.listeners.notify(&update);
    }

    /// Decide one lamp's state against a fresh analysis.
    fn evaluate_lamp(&self, id: ComponentId, lamp: &Lamp, topology: &Topology) -> Option<LampReading> {
        let Some(filament) = self.graph.branch_of(BranchKind::Body(id, BodyPath::Filament)) else {
            warn!(lamp = %lamp.name, "lamp has no filament branch, treating as disconnected");
            return None;
        };

        let region = topology.region_of(lamp.positive())?;
        if !region.closed || !region.nodes.contains(&lamp.negative()) {
            return None;
        }

        let feeding: Vec<&Battery> = self
            .components
            .iter()
            .filter_map(|(battery_id, component)| match component {
                Component::Battery(battery) => Some((*battery_id, battery)),
                _ => None,
            })
            .filter(|(battery_id, _)| {
                topology
                    .groups
                    .get(battery_id)
                    .map(|group| group.contains(&lamp.positive()))
                    .unwrap_or(false)
            })
            .filter(|(battery_id, _)| {
                self.graph
                    .branch_of(BranchKind::Body(*battery_id, BodyPath::Cell))
                    .map(|cell| topology.blocks.share_loop(cell, filament))
                    .unwrap_or(false)
            })
            .map(|(_, battery)| battery)
            .collect();

        if feeding.is_empty() {
            return None;
        }

        let voltage: f64 = feeding.iter().map(|battery| battery.voltage()).sum();
        let resistance = self.series_resistance(filament, &topology.blocks);
        let reading = lamp_intensity(voltage, resistance, &self.config);

        match reading.condition {
            LampCondition::ShortCircuit => {
                warn!(lamp = %lamp.name, resistance, "non-positive series resistance, lamp saturated");
            }
            LampCondition::OverCurrent => {
                warn!(lamp = %lamp.name, voltage, resistance, "lamp current above safe limit");
            }
            _ => {}
        }
        Some(reading)
    }

    /// Sum of every potentiometer path sharing a loop with the filament.
    ///
    /// When both paths of one potentiometer take part, both are added.
    fn series_resistance(&self, filament: BranchId, blocks: &LoopBlocks) -> f64 {
        let mut total = 0.0;
        let mut found = false;
        for (id, component) in &self.components {
            let Component::Potentiometer(pot) = component else {
                continue;
            };
            for path in [BodyPath::Variable, BodyPath::Fixed] {
                let in_loop = self
                    .graph
                    .branch_of(BranchKind::Body(*id, path))
                    .map(|branch| blocks.share_loop(branch, filament))
                    .unwrap_or(false);
                if let (true, Some(ohms)) = (in_loop, pot.effective_resistance(path)) {
                    total += ohms;
                    found = true;
                }
            }
        }
        if found {
            total
        } else {
            self.config.default_series_resistance
        }
    }

    // ============ Registration internals ============

    fn register(&mut self, component: Component) -> Result<ComponentId> {
        if let Some(&existing) = self.component_names.get(component.name()) {
            debug!(component = %component.name(), "already registered");
            return Ok(existing);
        }
        if let Err(e) = validate_terminals(&component, &self.graph) {
            error!(component = %component.name(), error = %e, "rejecting malformed component");
            return Err(e);
        }

        let id = ComponentId(self.next_component);
        self.next_component += 1;

        for (a, b, path) in component.bodies() {
            self.graph.attach(a, b, BranchKind::Body(id, path));
        }
        match &component {
            Component::Battery(battery) => {
                for node in battery.nodes {
                    self.graph.set_powered(node, true);
                }
            }
            Component::Switch(switch) if switch.closed => {
                self.graph.attach(switch.nodes[0], switch.nodes[1], BranchKind::SwitchContact(id));
            }
            _ => {}
        }

        debug!(component = %component.name(), kind = component.kind(), %id, "component registered");
        self.component_names.insert(component.name().to_string(), id);
        self.components.insert(id, component);
        Ok(id)
    }

    fn deregister(&mut self, id: ComponentId) -> Option<Component> {
        let mut component = self.components.remove(&id)?;
        self.component_names.remove(component.name());
        self.graph.detach_owner(id);

        match &mut component {
            Component::Battery(battery) => {
                for node in battery.nodes {
                    let still_powered = self
                        .components
                        .values()
                        .any(|c| matches!(c, Component::Battery(other) if other.nodes.contains(&node)));
                    self.graph.set_powered(node, still_powered);
                }
            }
            Component::Lamp(lamp) => lamp.turn_off(),
            _ => {}
        }
        debug!(component = %component.name(), %id, "component removed");
        Some(component)
    }

    fn register_wire(&mut self, name: &str, a: NodeId, b: NodeId) -> Option<WireId> {
        if self.wire_names.contains_key(name) {
            debug!(wire = %name, "wire name already in use");
            return None;
        }
        let id = WireId(self.next_wire);
        if !self.graph.connect_wire(a, b, id) {
            return None;
        }
        self.next_wire += 1;
        self.wires.insert(
            id,
            Wire {
                name: name.to_string(),
                nodes: [a, b],
            },
        );
        self.wire_names.insert(name.to_string(), id);
        Some(id)
    }

    fn component_name(&self, id: ComponentId) -> String {
        self.components
            .get(&id)
            .map(|c| c.name().to_string())
            .unwrap_or_else(|| id.to_string())
    }
}
