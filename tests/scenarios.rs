//! End-to-end circuit scenarios.

use approx::assert_relative_eq;
use lumen_core::components::{Battery, Lamp, LampCondition};
use lumen_core::{dsl, CircuitEngine, Component, ComponentId};

fn load(src: &str) -> CircuitEngine {
    CircuitEngine::from_ast(dsl::parse(src).unwrap()).unwrap()
}

fn id(engine: &CircuitEngine, name: &str) -> ComponentId {
    engine.find_component(name).unwrap()
}

#[test]
fn battery_and_lamp_share_terminals() {
    let mut engine = CircuitEngine::new();
    let p = engine.add_node("P");
    let n = engine.add_node("N");
    engine
        .add_component(Component::Battery(Battery::new("BAT1", [p, n], 9.0)))
        .unwrap();
    let lamp = engine.add_component(Component::Lamp(Lamp::new("LED1", [p, n]))).unwrap();

    assert!(engine.is_lamp_on(lamp));
    assert!(engine.lamp_intensity(lamp) > 0.0);
    assert!(engine.is_circuit_closed());
}

#[test]
fn open_series_switch_keeps_lamp_off() {
    let engine = load("BAT1 P N 9\nSW1 P A open\nLED1 A N");
    let lamp = id(&engine, "LED1");
    assert!(!engine.is_lamp_on(lamp));
    assert_eq!(engine.lamp_intensity(lamp), 0.0);
}

#[test]
fn max_resistance_darkens_lamp() {
    let mut engine = load("BAT1 P N 9\nPOT1 P B C 680\nLED1 B N");
    let lamp = id(&engine, "LED1");
    assert!(engine.lamp_intensity(lamp) > 0.0);

    engine.set_resistance(id(&engine, "POT1"), 10_000.0);
    assert_eq!(engine.lamp_intensity(lamp), 0.0);
    assert_eq!(engine.lamp(lamp).unwrap().condition(), LampCondition::TooDim);
}

#[test]
fn independent_loops_do_not_interfere() {
    let mut engine = load(
        "BAT1 P1 N1 9\nSW1 P1 A1 open\nLED1 A1 N1\n\
         BAT2 P2 N2 9\nSW2 P2 A2 open\nLED2 A2 N2",
    );
    let (lamp_a, lamp_b) = (id(&engine, "LED1"), id(&engine, "LED2"));

    engine.toggle_switch(id(&engine, "SW1"));
    assert!(engine.is_lamp_on(lamp_a));
    assert!(!engine.is_lamp_on(lamp_b));
    assert_eq!(engine.topology().closed_regions(), 1);
    assert_eq!(engine.regions().len(), 2);
}

#[test]
fn alternate_route_re_energizes_lamp() {
    // P -W1- A -LED1- M -W2- N and P -W3- B -W4- N, battery across P and N.
    let mut engine = load("BAT1 P N 9\nW1 P A\nLED1 A M\nW2 M N\nW3 P B\nW4 B N");
    let lamp = id(&engine, "LED1");
    assert!(engine.is_lamp_on(lamp));

    engine.remove_wire(engine.find_wire("W1").unwrap());
    assert!(!engine.is_lamp_on(lamp));
    assert!(engine.is_circuit_closed(), "P-B-N still closes the region");

    let a = engine.find_node("A").unwrap();
    let b = engine.find_node("B").unwrap();
    engine.add_wire(a, b).unwrap();
    assert!(engine.is_lamp_on(lamp));

    engine.remove_wire(engine.find_wire("W2").unwrap());
    assert!(!engine.is_lamp_on(lamp));
}

#[test]
fn removing_one_parallel_path_keeps_lamp_on() {
    let mut engine = load("BAT1 P N 9\nW1 P A\nW2 P C\nW3 C A\nLED1 A N");
    let lamp = id(&engine, "LED1");
    let intensity = engine.lamp_intensity(lamp);

    engine.remove_wire(engine.find_wire("W1").unwrap());
    assert!(engine.is_lamp_on(lamp));
    assert_relative_eq!(engine.lamp_intensity(lamp), intensity, epsilon = 1e-12);
}

#[test]
fn connections_are_symmetric_and_idempotent() {
    let mut engine = CircuitEngine::new();
    let a = engine.add_node("A");
    let b = engine.add_node("B");

    assert!(engine.add_connection(a, b));
    let snapshot = engine.graph().clone();
    assert!(!engine.add_connection(a, b));
    assert!(!engine.add_connection(b, a));

    assert!(engine.graph().neighbors(a).unwrap().contains(&b));
    assert!(engine.graph().neighbors(b).unwrap().contains(&a));
    assert_eq!(
        engine.graph().branches().count(),
        snapshot.branches().count()
    );
}

#[test]
fn intensity_never_rises_with_resistance() {
    let mut engine = load("BAT1 P N 9\nPOT1 P B C 1\nLED1 B N");
    let pot = id(&engine, "POT1");
    let lamp = id(&engine, "LED1");

    let mut previous = f64::INFINITY;
    let mut r = 1.0;
    while r <= 10_000.0 {
        engine.set_resistance(pot, r);
        let intensity = engine.lamp_intensity(lamp);
        assert!(intensity <= previous, "intensity rose at R = {}", r);
        previous = intensity;
        r *= 1.5;
    }
}

#[test]
fn out_of_range_resistance_is_clamped() {
    let mut engine = load("BAT1 P N 9\nPOT1 P B C 680\nLED1 B N");
    let pot = id(&engine, "POT1");
    engine.set_resistance(pot, -50.0);
    match engine.component(pot) {
        Some(Component::Potentiometer(p)) => assert_eq!(p.resistance(), 1.0),
        other => panic!("expected potentiometer, got {:?}", other),
    }
    engine.set_resistance(pot, 1e9);
    match engine.component(pot) {
        Some(Component::Potentiometer(p)) => assert_eq!(p.resistance(), 10_000.0),
        other => panic!("expected potentiometer, got {:?}", other),
    }
}

#[test]
fn unpowered_ring_is_open() {
    let engine = load("LED1 A B\nW1 B C\nW2 C A\nBAT1 P N 9");
    assert!(!engine.is_lamp_on(id(&engine, "LED1")));
    assert!(!engine.is_circuit_closed());
}

#[test]
fn demo_circuit_loads() {
    let mut engine = load(include_str!("../demos/desk_lamp.lum"));
    let desk = id(&engine, "LED1");
    let pilot = id(&engine, "LED2");

    assert!(!engine.is_lamp_on(desk));
    assert!(engine.is_lamp_on(pilot));
    assert_relative_eq!(
        engine.lamp_intensity(pilot),
        (9.0 - 2.2) / 470.0 / 0.02 * 59.0,
        epsilon = 1e-9
    );

    engine.toggle_switch(id(&engine, "SW1"));
    assert!(engine.is_lamp_on(desk));
    assert_relative_eq!(engine.lamp_intensity(desk), 29.5, epsilon = 1e-9);
}
