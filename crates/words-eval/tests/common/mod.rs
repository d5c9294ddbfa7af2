//! AST builders shared by the integration tests.
//!
//! Statement builders take the source line first; expressions carry line 0
//! unless built with an `_at` variant.
#![allow(dead_code)]

use words_eval::{EngineConfig, Simulation};
use words_types::ast::*;
use words_types::Span;

// ══════════════════════════════════════════════════════════════════════════════
// Names & References
// ══════════════════════════════════════════════════════════════════════════════

pub fn ident(name: &str) -> Ident {
    Ident::new(name, Span::default())
}

/// `"w1.friend.row"` reads as `w1's friend's row`.
pub fn reference(path: &str) -> Reference {
    reference_at(0, path)
}

pub fn reference_at(line: u32, path: &str) -> Reference {
    let span = Span::line(line);
    Reference::new(path.split('.').map(|p| Ident::new(p, span)).collect(), span)
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, Span::default())
}

pub fn num(n: f64) -> Expr {
    expr(ExprKind::NumberLit(n))
}

pub fn text(s: &str) -> Expr {
    expr(ExprKind::StringLit(s.to_string()))
}

pub fn boolean(b: bool) -> Expr {
    expr(ExprKind::BoolLit(b))
}

pub fn dir(d: Direction) -> Expr {
    expr(ExprKind::DirectionLit(d))
}

pub fn nothing() -> Expr {
    expr(ExprKind::NothingLit)
}

pub fn position(row: f64, column: f64) -> Expr {
    expr(ExprKind::Position {
        row: Box::new(num(row)),
        column: Box::new(num(column)),
    })
}

pub fn get(path: &str) -> Expr {
    expr(ExprKind::Reference(reference(path)))
}

pub fn get_at(line: u32, path: &str) -> Expr {
    Expr::new(ExprKind::Reference(reference_at(line, path)), Span::line(line))
}

pub fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
    expr(ExprKind::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    })
}

pub fn not(operand: Expr) -> Expr {
    expr(ExprKind::Unary {
        op: UnaryOp::Not,
        operand: Box::new(operand),
    })
}

pub fn neg(operand: Expr) -> Expr {
    expr(ExprKind::Unary {
        op: UnaryOp::Neg,
        operand: Box::new(operand),
    })
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

pub fn program(stmts: Vec<Stmt>) -> Program {
    Program {
        body: Block::new(stmts),
    }
}

fn stmt(line: u32, kind: StmtKind) -> Stmt {
    Stmt::new(kind, Span::line(line))
}

fn property(name: &str, value: Expr) -> PropertyDef {
    PropertyDef {
        name: ident(name),
        value,
        span: Span::default(),
    }
}

fn properties(props: Vec<(&str, Expr)>) -> Vec<PropertyDef> {
    props.into_iter().map(|(n, v)| property(n, v)).collect()
}

// ── Classes & Objects ────────────────────────────────────────────────────────

pub fn class(line: u32, name: &str, parent: Option<&str>, members: Vec<ClassMember>) -> Stmt {
    stmt(
        line,
        StmtKind::CreateClass(ClassDecl {
            name: ident(name),
            parent: parent.map(ident),
            members,
            span: Span::line(line),
        }),
    )
}

pub fn default(name: &str, value: Expr) -> ClassMember {
    ClassMember::Property(property(name, value))
}

pub fn action(name: &str, params: &[&str], body: Vec<Stmt>) -> ClassMember {
    ClassMember::Action(ActionDef {
        name: ident(name),
        params: params.iter().map(|p| ident(p)).collect(),
        body: Block::new(body),
        span: Span::default(),
    })
}

pub fn class_listener(kind: ListenerKind, predicate: Predicate, body: Vec<Stmt>) -> ClassMember {
    ClassMember::Listener(listener(0, kind, predicate, body))
}

pub fn make(line: u32, name: &str, class: &str, props: Vec<(&str, Expr)>, row: f64, column: f64) -> Stmt {
    stmt(
        line,
        StmtKind::CreateObject(CreateObjectStmt {
            name: ident(name),
            class: ident(class),
            properties: properties(props),
            position: position(row, column),
        }),
    )
}

pub fn assign(line: u32, object: &str, prop: &str, value: Expr) -> Stmt {
    stmt(
        line,
        StmtKind::Assign(AssignStmt {
            object: reference_at(line, object),
            property: ident(prop),
            value,
        }),
    )
}

pub fn remove(line: u32, object: &str) -> Stmt {
    stmt(line, StmtKind::Remove(reference_at(line, object)))
}

// ── Queued actions ───────────────────────────────────────────────────────────

pub fn queue(line: u32, target: &str, action: QueuedAction) -> Stmt {
    queue_stmt(line, target, action, false)
}

pub fn queue_now(line: u32, target: &str, action: QueuedAction) -> Stmt {
    queue_stmt(line, target, action, true)
}

fn queue_stmt(line: u32, target: &str, action: QueuedAction, now: bool) -> Stmt {
    stmt(
        line,
        StmtKind::Queue(QueueStmt {
            target: reference_at(line, target),
            action,
            now,
        }),
    )
}

pub fn moves(direction: Direction, distance: Expr) -> QueuedAction {
    QueuedAction::Move {
        direction: dir(direction),
        distance,
    }
}

pub fn says(message: &str) -> QueuedAction {
    QueuedAction::Say {
        message: text(message),
    }
}

pub fn waits(duration: Expr) -> QueuedAction {
    QueuedAction::Wait { duration }
}

pub fn stops() -> QueuedAction {
    QueuedAction::Stop
}

pub fn sets(props: Vec<(&str, Expr)>) -> QueuedAction {
    QueuedAction::Assign {
        properties: properties(props),
    }
}

pub fn custom(name: &str, args: Vec<Expr>) -> QueuedAction {
    QueuedAction::Custom {
        name: ident(name),
        args,
    }
}

// ── Control Flow ─────────────────────────────────────────────────────────────

pub fn repeat(line: u32, count: Expr, body: Vec<Stmt>) -> Stmt {
    stmt(
        line,
        StmtKind::Repeat(RepeatStmt {
            count,
            body: Block::new(body),
        }),
    )
}

pub fn while_loop(line: u32, condition: Expr, body: Vec<Stmt>) -> Stmt {
    stmt(
        line,
        StmtKind::While(WhileStmt {
            condition,
            body: Block::new(body),
        }),
    )
}

pub fn if_else(line: u32, condition: Expr, then_block: Vec<Stmt>, else_block: Option<Vec<Stmt>>) -> Stmt {
    stmt(
        line,
        StmtKind::If(IfStmt {
            condition,
            then_block: Block::new(then_block),
            else_block: else_block.map(Block::new),
        }),
    )
}

pub fn reset(line: u32) -> Stmt {
    stmt(line, StmtKind::Reset)
}

pub fn exit(line: u32) -> Stmt {
    stmt(line, StmtKind::Exit)
}

// ── Listeners ────────────────────────────────────────────────────────────────

pub fn listener(line: u32, kind: ListenerKind, predicate: Predicate, body: Vec<Stmt>) -> ListenerDecl {
    ListenerDecl {
        kind,
        predicate,
        body: Block::new(body),
        span: Span::line(line),
    }
}

pub fn listen(line: u32, kind: ListenerKind, predicate: Predicate, body: Vec<Stmt>) -> Stmt {
    stmt(line, StmtKind::Listener(listener(line, kind, predicate, body)))
}

pub fn when(subject: Subject, alias: Option<&str>, condition: PredicateCondition) -> Predicate {
    Predicate {
        subject,
        alias: alias.map(ident),
        condition,
        span: Span::default(),
    }
}

pub fn every(class: &str) -> Subject {
    Subject::Class(ident(class))
}

pub fn the(object: &str) -> Subject {
    Subject::Reference(reference(object))
}

// ══════════════════════════════════════════════════════════════════════════════
// Running
// ══════════════════════════════════════════════════════════════════════════════

pub fn run(stmts: Vec<Stmt>) -> Simulation {
    run_with(EngineConfig::default(), stmts)
}

pub fn run_with(config: EngineConfig, stmts: Vec<Stmt>) -> Simulation {
    let mut sim = Simulation::new(config);
    sim.run(&program(stmts));
    sim
}

/// Every recovered error as `(line, code)`.
pub fn errors(sim: &Simulation) -> Vec<(u32, u16)> {
    sim.diagnostics()
        .errors
        .iter()
        .map(|d| (d.line, d.code.0))
        .collect()
}
