//! Lumen - Lamp Circuit Topology Engine
//!
//! Loads a circuit description, applies switch, potentiometer and wire
//! actions, then prints the state of every lamp.
//!
//! # Usage
//!
//! ```bash
//! lumen circuit.lum --toggle SW1 --set POT1=4.7k --cut W2 --wire a:b -v
//! ```

use std::path::PathBuf;

use clap::Parser;
use lumen_core::{
    dsl,
    error::{LumenError, Result},
    CircuitEngine,
};
use tracing::{info, warn, Level};

/// Lamp circuit topology engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the circuit description file
    #[arg(value_name = "CIRCUIT_FILE")]
    circuit_file: PathBuf,

    /// Toggle a switch by name (repeatable)
    #[arg(long, value_name = "SWITCH")]
    toggle: Vec<String>,

    /// Set a potentiometer's resistance, e.g. POT1=4.7k (repeatable)
    #[arg(long, value_name = "POT=OHMS", value_parser = parse_setting)]
    set: Vec<(String, f64)>,

    /// Remove a wire by name (repeatable)
    #[arg(long, value_name = "WIRE")]
    cut: Vec<String>,

    /// Add a wire between two nodes, e.g. a:b (repeatable)
    #[arg(long, value_name = "A:B", value_parser = parse_node_pair)]
    wire: Vec<(String, String)>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_setting(s: &str) -> std::result::Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected POT=OHMS, got '{}'", s))?;
    let ohms = dsl::parse_value(value).ok_or_else(|| format!("invalid resistance '{}'", value))?;
    Ok((name.to_string(), ohms))
}

fn parse_node_pair(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once(':') {
        Some((a, b)) if !a.is_empty() && !b.is_empty() => Ok((a.to_string(), b.to_string())),
        _ => Err(format!("expected A:B, got '{}'", s)),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn component(engine: &CircuitEngine, name: &str) -> Result<lumen_core::ComponentId> {
    engine
        .find_component(name)
        .ok_or_else(|| LumenError::ComponentNotFound { name: name.to_string() })
}

fn node(engine: &CircuitEngine, name: &str) -> Result<lumen_core::NodeId> {
    engine
        .find_node(name)
        .ok_or_else(|| LumenError::NodeNotFound { node: name.to_string() })
}

fn cut_wire(engine: &mut CircuitEngine, name: &str) -> Result<()> {
    let wire = engine
        .find_wire(name)
        .ok_or_else(|| LumenError::WireNotFound { name: name.to_string() })?;
    engine.remove_wire(wire);
    Ok(())
}

/// Returns `false` when the pair already has a connection.
fn wire_nodes(engine: &mut CircuitEngine, a_name: &str, b_name: &str) -> Result<bool> {
    let (a, b) = (node(engine, a_name)?, node(engine, b_name)?);
    if engine.add_wire(a, b).is_some() {
        return Ok(true);
    }
    warn!(a = a_name, b = b_name, "nodes already connected, wire not added");
    Ok(false)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Parse the circuit file and build the engine
    let ast = dsl::parse_file(&args.circuit_file)?;
    let mut engine = CircuitEngine::from_ast(ast)?;
    info!(file = %args.circuit_file.display(), "circuit loaded");

    for name in &args.cut {
        cut_wire(&mut engine, name)?;
    }

    for (a, b) in &args.wire {
        wire_nodes(&mut engine, a, b)?;
    }

    for name in &args.toggle {
        let id = component(&engine, name)?;
        if engine.toggle_switch(id).is_none() {
            return Err(LumenError::invalid_component(name, 0, "not a switch"));
        }
    }

    for (name, ohms) in &args.set {
        let id = component(&engine, name)?;
        if !matches!(engine.component(id), Some(lumen_core::Component::Potentiometer(_))) {
            return Err(LumenError::invalid_component(name, 0, "not a potentiometer"));
        }
        engine.set_resistance(id, *ohms);
    }

    for (_, lamp) in engine.lamps() {
        println!(
            "{:<12} {:<4} {:>8.2}  {}",
            lamp.name,
            if lamp.is_on() { "on" } else { "off" },
            lamp.intensity(),
            lamp.condition()
        );
    }
    println!(
        "circuit {}",
        if engine.is_circuit_closed() { "closed" } else { "open" }
    );

    Ok(())
}
