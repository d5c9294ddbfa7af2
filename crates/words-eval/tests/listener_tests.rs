//! Integration tests for listeners and predicates.

mod common;

use common::*;
use pretty_assertions::assert_eq;
use words_eval::{Simulation, Value};
use words_types::ast::{BinOp, Direction, ListenerKind, PredicateCondition, Stmt};

fn prop(sim: &Simulation, object: &str, name: &str) -> Value {
    let id = sim.env().get_object(object).unwrap();
    sim.env().get_property(id, name)
}

fn bump(line: u32, object: &str, property: &str) -> Stmt {
    let path = format!("{object}.{property}");
    assign(line, object, property, binary(get(&path), BinOp::Add, num(1.0)))
}

fn walkers(extra: Vec<Stmt>) -> Simulation {
    let mut stmts = vec![
        class(
            1,
            "Walker",
            None,
            vec![default("count", num(0.0))],
        ),
        class(2, "Wall", None, vec![]),
        make(3, "a", "Walker", vec![], 0.0, 0.0),
        make(4, "b", "Walker", vec![], 5.0, 5.0),
        queue(5, "a", says("hi")),
        queue(6, "a", says("hi")),
    ];
    stmts.extend(extra);
    run(stmts)
}

// ══════════════════════════════════════════════════════════════════════════════
// Global listeners
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_permanent_listener_fires_every_matching_tick() {
    let mut sim = walkers(vec![listen(
        7,
        ListenerKind::Permanent,
        when(every("Walker"), Some("w"), PredicateCondition::Says(text("hi"))),
        vec![bump(8, "w", "count")],
    )]);
    sim.run_ticks(3);
    assert_eq!(prop(&sim, "a", "count"), Value::Number(2.0));
    assert_eq!(prop(&sim, "b", "count"), Value::Number(0.0));
    assert_eq!(sim.env().listeners().len(), 1);
}

#[test]
fn test_temporary_listener_fires_once() {
    let mut sim = walkers(vec![listen(
        7,
        ListenerKind::Temporary,
        when(every("Walker"), Some("w"), PredicateCondition::Says(text("hi"))),
        vec![bump(8, "w", "count")],
    )]);
    sim.run_ticks(3);
    assert_eq!(prop(&sim, "a", "count"), Value::Number(1.0));
    assert!(sim.env().listeners().is_empty());
}

#[test]
fn test_listener_alias_is_scoped_to_body() {
    let mut sim = walkers(vec![listen(
        7,
        ListenerKind::Temporary,
        when(the("a"), Some("speaker"), PredicateCondition::Says(text("hi"))),
        vec![],
    )]);
    sim.tick();
    assert_eq!(sim.env().lookup("speaker"), None);
    assert_eq!(sim.env().scope_depth(), 1);
}

#[test]
fn test_touches_same_or_adjacent_cell() {
    let mut sim = walkers(vec![
        make(7, "wall", "Wall", vec![], 1.0, 0.0),
        listen(
            8,
            ListenerKind::Permanent,
            when(every("Walker"), Some("w"), PredicateCondition::Touches(every("Wall"))),
            vec![assign(9, "w", "blocked", boolean(true))],
        ),
    ]);
    sim.tick();
    assert_eq!(prop(&sim, "a", "blocked"), Value::Boolean(true));
    assert_eq!(prop(&sim, "b", "blocked"), Value::Absent);
}

#[test]
fn test_body_removing_candidates() {
    let mut sim = walkers(vec![
        make(7, "wall", "Wall", vec![], 0.0, 1.0),
        make(8, "c", "Walker", vec![], 1.0, 1.0),
        listen(
            9,
            ListenerKind::Permanent,
            when(every("Walker"), Some("w"), PredicateCondition::Touches(every("Wall"))),
            vec![remove(10, "w")],
        ),
    ]);
    sim.tick();
    assert_eq!(sim.env().get_object("a"), None);
    assert_eq!(sim.env().get_object("c"), None);
    assert!(sim.env().get_object("b").is_some());
    assert!(!sim.diagnostics().has_errors());
}

#[test]
fn test_moves_with_direction() {
    let mut sim = walkers(vec![
        queue(7, "b", moves(Direction::Up, num(1.0))),
        queue(8, "b", moves(Direction::Left, num(1.0))),
        listen(
            9,
            ListenerKind::Permanent,
            when(
                every("Walker"),
                Some("w"),
                PredicateCondition::Moves(Some(dir(Direction::Up))),
            ),
            vec![bump(10, "w", "count")],
        ),
    ]);
    sim.run_ticks(2);
    assert_eq!(prop(&sim, "b", "count"), Value::Number(1.0));
    assert_eq!(prop(&sim, "a", "count"), Value::Number(0.0));
}

#[test]
fn test_undefined_subject_class_is_reported_each_tick() {
    let mut sim = walkers(vec![listen(
        7,
        ListenerKind::Permanent,
        when(every("Ghost"), None, PredicateCondition::Waits),
        vec![],
    )]);
    sim.run_ticks(2);
    let codes: Vec<u16> = errors(&sim).into_iter().map(|(_, code)| code).collect();
    assert_eq!(codes, vec![300, 300]);
}

// ══════════════════════════════════════════════════════════════════════════════
// Class listeners
// ══════════════════════════════════════════════════════════════════════════════

fn patrol_world() -> Simulation {
    run(vec![
        class(
            1,
            "Walker",
            None,
            vec![
                default("steps", num(0.0)),
                default("rested", num(0.0)),
                class_listener(
                    ListenerKind::Permanent,
                    when(the("me"), None, PredicateCondition::Moves(None)),
                    vec![bump(10, "me", "steps")],
                ),
                class_listener(
                    ListenerKind::Temporary,
                    when(the("me"), None, PredicateCondition::Waits),
                    vec![bump(11, "me", "rested")],
                ),
            ],
        ),
        class(2, "Runner", Some("Walker"), vec![]),
        make(3, "a", "Walker", vec![], 0.0, 0.0),
        make(4, "r", "Runner", vec![], 0.0, 0.0),
        queue(5, "a", moves(Direction::Up, num(1.0))),
        queue(6, "a", moves(Direction::Up, num(1.0))),
    ])
}

#[test]
fn test_class_listener_binds_me_per_instance() {
    let mut sim = patrol_world();
    sim.run_ticks(2);
    assert_eq!(prop(&sim, "a", "steps"), Value::Number(2.0));
    assert_eq!(prop(&sim, "r", "steps"), Value::Number(0.0));
    assert!(!sim.diagnostics().has_errors());
}

#[test]
fn test_temporary_class_listener_is_spent_per_instance() {
    let mut sim = patrol_world();
    sim.run_ticks(4);
    // `r` idles from the first tick, `a` only after its two moves.
    assert_eq!(prop(&sim, "r", "rested"), Value::Number(1.0));
    assert_eq!(prop(&sim, "a", "rested"), Value::Number(1.0));
}

#[test]
fn test_me_is_not_visible_outside_class_listeners() {
    let mut sim = patrol_world();
    sim.tick();
    assert_eq!(sim.env().lookup("me"), None);
}
