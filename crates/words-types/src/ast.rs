//! AST node types for the Words language.
//!
//! Every statement and expression carries a [`Span`]; the evaluator reports
//! errors by the statement's line. Optional grammar parts are `Option` or an
//! empty `Vec`, never a placeholder node.

use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete Words script: a statement list.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Block,
}

/// A brace-delimited statement list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Identifiers & References
// ══════════════════════════════════════════════════════════════════════════════

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// A possessive chain: `w1`, `w1's friend`, `me's friend's speed`.
///
/// The first element names an alias or an object; every later element reads
/// a property of the object produced so far.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub path: Vec<Ident>,
    pub span: Span,
}

impl Reference {
    pub fn new(path: Vec<Ident>, span: Span) -> Self {
        Self { path, span }
    }

    /// The identifier the chain ends on.
    pub fn last(&self) -> Option<&Ident> {
        self.path.last()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.path.iter().map(|i| i.name.as_str()).collect();
        write!(f, "{}", names.join("'s "))
    }
}

/// Grid direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Case-insensitive parse of a direction name.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }

    /// `(row, column)` delta of a single step.
    pub fn delta(&self) -> (i64, i64) {
        match self {
            Direction::Up => (1, 0),
            Direction::Down => (-1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of statement.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `a Walker is a thing { ... }`
    CreateClass(ClassDecl),
    /// `make w1 a Walker (speed = 2) at (0, 0)`
    CreateObject(CreateObjectStmt),
    /// `w1's speed = 3`: immediate assignment
    Assign(AssignStmt),
    /// `w1 moves up 2 now` and friends: enqueue an action
    Queue(QueueStmt),
    /// `remove w1`
    Remove(Reference),
    /// `repeat n { ... }`
    Repeat(RepeatStmt),
    /// `while cond { ... }`
    While(WhileStmt),
    /// `if cond { ... } else { ... }`
    If(IfStmt),
    /// `whenever ...` / `when ...`
    Listener(ListenerDecl),
    /// `reset`: forget every object, class and listener
    Reset,
    /// `exit`: stop evaluating
    Exit,
}

// ── Classes & Objects ────────────────────────────────────────────────────────

/// Class definition with an optional parent.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Ident,
    pub parent: Option<Ident>,
    pub members: Vec<ClassMember>,
    pub span: Span,
}

/// Something declared inside a class body.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Property(PropertyDef),
    Action(ActionDef),
    Listener(ListenerDecl),
}

/// `name = expr`, used for class defaults, initial object properties and
/// queued assignments.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    pub name: Ident,
    pub value: Expr,
    pub span: Span,
}

/// A user-defined custom action: `to patrol (steps) { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDef {
    pub name: Ident,
    pub params: Vec<Ident>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateObjectStmt {
    pub name: Ident,
    pub class: Ident,
    pub properties: Vec<PropertyDef>,
    pub position: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    /// Object whose property is written.
    pub object: Reference,
    pub property: Ident,
    pub value: Expr,
}

// ── Queued actions ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct QueueStmt {
    pub target: Reference,
    pub action: QueuedAction,
    /// The `now` modifier: enqueue at the front instead of the back.
    pub now: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueuedAction {
    /// `moves <direction> <distance>`; the distance is evaluated on execution.
    Move { direction: Expr, distance: Expr },
    /// `says <message>`; the message is evaluated on enqueue.
    Say { message: Expr },
    /// `waits <duration>`; the duration is evaluated on execution.
    Wait { duration: Expr },
    /// `stops`
    Stop,
    /// `sets (a = 1, b = 2)`; values are evaluated on execution.
    Assign { properties: Vec<PropertyDef> },
    /// `patrol(3)`; arguments are evaluated on enqueue.
    Custom { name: Ident, args: Vec<Expr> },
}

// ── Control Flow ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct RepeatStmt {
    pub count: Expr,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Block,
    pub else_block: Option<Block>,
}

// ── Listeners & Predicates ───────────────────────────────────────────────────

/// Whether a listener survives firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKind {
    /// `whenever ...`: fires every tick its predicate matches
    Permanent,
    /// `when ...`: fires once, then is discarded
    Temporary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListenerDecl {
    pub kind: ListenerKind,
    pub predicate: Predicate,
    pub body: Block,
    pub span: Span,
}

/// `Walker as w says "hi"`, `w1 touches Wall`, ...
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub subject: Subject,
    /// Name bound to each matching object while the body runs.
    pub alias: Option<Ident>,
    pub condition: PredicateCondition,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredicateCondition {
    Says(Expr),
    Touches(Subject),
    Waits,
    Moves(Option<Expr>),
}

/// Either every object of a class, or one referenced object.
#[derive(Debug, Clone, PartialEq)]
pub enum Subject {
    Class(Ident),
    Reference(Reference),
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// An expression node. Uses `Box` for recursive variants.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // ── Literals ──
    NumberLit(f64),
    StringLit(String),
    BoolLit(bool),
    DirectionLit(Direction),
    /// `nothing`
    NothingLit,
    /// `(row, column)`
    Position { row: Box<Expr>, column: Box<Expr> },

    /// `w1's speed`, `me`, `n`
    Reference(Reference),

    // ── Operators ──
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
}

/// Binary operators (in precedence order, lowest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Logical
    Or,
    And,
    // Comparison
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `not x`
    Not,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parse_is_case_insensitive() {
        assert_eq!(Direction::parse("UP"), Some(Direction::Up));
        assert_eq!(Direction::parse(" left "), Some(Direction::Left));
        assert_eq!(Direction::parse("sideways"), None);
    }

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::Up.delta(), (1, 0));
        assert_eq!(Direction::Down.delta(), (-1, 0));
        assert_eq!(Direction::Left.delta(), (0, -1));
        assert_eq!(Direction::Right.delta(), (0, 1));
    }

    #[test]
    fn test_reference_display() {
        let span = Span::line(1);
        let r = Reference::new(
            vec![
                Ident::new("w1", span),
                Ident::new("friend", span),
                Ident::new("speed", span),
            ],
            span,
        );
        assert_eq!(r.to_string(), "w1's friend's speed");
        assert_eq!(r.last().map(|i| i.name.as_str()), Some("speed"));
    }
}
