//! Core statement and expression evaluator.

use crate::class::WordsClass;
use crate::config::EngineConfig;
use crate::diagnostics::DiagnosticSink;
use crate::env::Environment;
use crate::error::{EvalResult, ProgramError, RuntimeError};
use crate::scheduler::QueueTarget;
use crate::value::{Position, Value, ValueKind};
use crate::action::{Action, ActionKind, WaitLength};
use crate::arena::ObjectId;
use tracing::warn;
use words_types::ast::*;
use words_types::{Diagnostic, Diagnostics, SourceFile, Span};

/// The tree-walking evaluator. Owns the [`Environment`] it mutates.
pub struct Evaluator {
    pub env: Environment,
    pub(crate) config: EngineConfig,
    /// Loop iterations and expansions since the last reset.
    steps: u64,
    diagnostics: Diagnostics,
    sink: Option<Box<dyn DiagnosticSink>>,
    source: Option<SourceFile>,
}

impl Evaluator {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            env: Environment::new(),
            config,
            steps: 0,
            diagnostics: Diagnostics::empty(),
            sink: None,
            source: None,
        }
    }

    /// Also forward every recovered error to `sink`.
    pub fn with_sink(mut self, sink: Box<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Quote source lines in diagnostics.
    pub fn with_source(mut self, source: SourceFile) -> Self {
        self.source = Some(source);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Refill the step budget. `Simulation::tick` and `run` do this
    /// themselves; a host driving `execute_next_action` directly calls it
    /// once per tick.
    pub fn reset_steps(&mut self) {
        self.steps = 0;
    }

    /// Consume one step. Returns error if the limit is exhausted.
    pub(crate) fn consume_step(&mut self, span: Span) -> EvalResult<()> {
        self.steps += 1;
        let limit = self.config.step_limit;
        if limit > 0 && self.steps > limit {
            Err(RuntimeError::StepLimitExceeded(limit).at(span))
        } else {
            Ok(())
        }
    }

    /// Record a recovered program error.
    pub fn report(&mut self, err: &ProgramError) {
        let mut diagnostic = Diagnostic::from(err);
        if let Some(line) = self.source.as_ref().and_then(|s| s.line(err.line)) {
            diagnostic = diagnostic.with_source_line(line);
        }
        warn!(line = err.line, code = %diagnostic.code, "{}", err.error);
        if let Some(sink) = self.sink.as_mut() {
            sink.report(&diagnostic);
        }
        self.diagnostics.push_error(diagnostic);
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statement lists
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate a whole program against the live environment.
    #[tracing::instrument(level = "debug", skip_all, fields(statements = program.body.stmts.len()))]
    pub fn run(&mut self, program: &Program) {
        self.reset_steps();
        self.exec_block(&program.body, &mut QueueTarget::Live);
    }

    /// Run statements in order. A failing statement is reported and the
    /// next one still runs; nothing runs after `exit`.
    pub fn exec_block(&mut self, block: &Block, target: &mut QueueTarget) {
        for stmt in &block.stmts {
            if self.env.exited() {
                break;
            }
            if let Err(err) = self.exec_stmt(stmt, target) {
                self.report(&err);
            }
        }
    }

    pub fn exec_stmt(&mut self, stmt: &Stmt, target: &mut QueueTarget) -> EvalResult<()> {
        let span = stmt.span;
        match &stmt.kind {
            StmtKind::CreateClass(decl) => self.exec_create_class(decl),
            StmtKind::CreateObject(create) => self.exec_create_object(create, span),
            StmtKind::Assign(assign) => self.exec_assign(assign, span),
            StmtKind::Queue(queue) => self.exec_queue(queue, span, target),
            StmtKind::Remove(reference) => {
                let id = self.resolve_object(reference)?;
                self.env.remove(id);
                Ok(())
            }
            StmtKind::Repeat(repeat) => self.exec_repeat(repeat, span, target),
            StmtKind::While(while_stmt) => self.exec_while(while_stmt, span, target),
            StmtKind::If(if_stmt) => {
                if self.eval_boolean(&if_stmt.condition)? {
                    self.exec_block(&if_stmt.then_block, target);
                } else if let Some(else_block) = &if_stmt.else_block {
                    self.exec_block(else_block, target);
                }
                Ok(())
            }
            StmtKind::Listener(listener) => {
                self.env.add_listener(listener.clone());
                Ok(())
            }
            StmtKind::Reset => {
                self.env.reset();
                Ok(())
            }
            StmtKind::Exit => {
                self.env.exit();
                Ok(())
            }
        }
    }

    // ── Classes & Objects ────────────────────────────────────────────────

    fn exec_create_class(&mut self, decl: &ClassDecl) -> EvalResult<()> {
        let name = &decl.name.name;
        let parent = self
            .env
            .classes()
            .resolve_parent(name, decl.parent.as_ref().map(|p| p.name.as_str()))
            .map_err(|e| e.at(decl.span))?;

        let mut class = WordsClass::new(name.clone(), parent);
        for member in &decl.members {
            match member {
                ClassMember::Property(def) => {
                    let value = self.eval_expr(&def.value)?;
                    if !value.is_absent() {
                        class.properties.insert(def.name.name.clone(), value);
                    }
                }
                ClassMember::Action(def) => {
                    class.actions.insert(def.name.name.clone(), def.clone());
                }
                ClassMember::Listener(listener) => class.listeners.push(listener.clone()),
            }
        }
        self.env.define_class(class).map_err(|e| e.at(decl.span))?;
        Ok(())
    }

    fn exec_create_object(&mut self, create: &CreateObjectStmt, span: Span) -> EvalResult<()> {
        let mut properties = Vec::with_capacity(create.properties.len());
        for def in &create.properties {
            properties.push((def.name.name.clone(), self.eval_expr(&def.value)?));
        }
        let position = match self.eval_expr(&create.position)? {
            Value::Position(p) => p,
            other => {
                return Err(RuntimeError::invalid_type(ValueKind::Position, other.kind())
                    .at(create.position.span))
            }
        };
        self.env
            .create_object(&create.name.name, &create.class.name, properties, position)
            .map_err(|e| e.at(span))?;
        Ok(())
    }

    fn exec_assign(&mut self, assign: &AssignStmt, span: Span) -> EvalResult<()> {
        let id = self.resolve_object(&assign.object)?;
        let value = self.eval_expr(&assign.value)?;
        self.env
            .set_property(id, &assign.property.name, value)
            .map_err(|e| e.at(span))
    }

    // ── Queued actions ───────────────────────────────────────────────────

    fn exec_queue(&mut self, queue: &QueueStmt, span: Span, target: &mut QueueTarget) -> EvalResult<()> {
        let id = self.resolve_object(&queue.target)?;
        let kind = match &queue.action {
            QueuedAction::Move { direction, distance } => ActionKind::Move {
                direction: self.eval_direction(direction)?,
                distance: distance.clone(),
                scope: self.env.capture_scope(),
            },
            QueuedAction::Say { message } => ActionKind::Say {
                message: self.eval_text(message)?,
            },
            QueuedAction::Wait { duration } => ActionKind::Wait {
                length: WaitLength::Pending {
                    duration: duration.clone(),
                    scope: self.env.capture_scope(),
                },
            },
            QueuedAction::Stop => ActionKind::Stop,
            QueuedAction::Assign { properties } => ActionKind::Assign {
                properties: properties.clone(),
                scope: self.env.capture_scope(),
            },
            QueuedAction::Custom { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg)?);
                }
                ActionKind::Custom {
                    name: name.name.clone(),
                    args: values,
                }
            }
        };
        target.enqueue(&mut self.env, id, Action::new(kind, span.line), queue.now);
        Ok(())
    }

    // ── Control Flow ─────────────────────────────────────────────────────

    /// `repeat n`: the body runs `floor(n)` times; a negative count runs it
    /// zero times.
    fn exec_repeat(&mut self, repeat: &RepeatStmt, span: Span, target: &mut QueueTarget) -> EvalResult<()> {
        let count = self.eval_number(&repeat.count)?;
        let times = if count > 0.0 { count.floor() as u64 } else { 0 };
        for _ in 0..times {
            if self.env.exited() {
                break;
            }
            self.consume_step(span)?;
            self.exec_block(&repeat.body, target);
        }
        Ok(())
    }

    fn exec_while(&mut self, while_stmt: &WhileStmt, span: Span, target: &mut QueueTarget) -> EvalResult<()> {
        while !self.env.exited() {
            self.consume_step(span)?;
            if !self.eval_boolean(&while_stmt.condition)? {
                break;
            }
            self.exec_block(&while_stmt.body, target);
        }
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════
    // References
    // ══════════════════════════════════════════════════════════════════════

    /// Resolve a possessive chain to a value.
    ///
    /// The head is an alias (innermost scope first) or an object name;
    /// every later name is a property of the object produced so far.
    pub fn eval_reference(&self, reference: &Reference) -> EvalResult<Value> {
        let Some((head, rest)) = reference.path.split_first() else {
            panic!("reference with an empty path at line {}", reference.span.line);
        };
        let mut value = self
            .env
            .lookup(&head.name)
            .or_else(|| self.env.get_object(&head.name).map(Value::Object))
            .ok_or_else(|| RuntimeError::ObjectNotFound(head.name.clone()).at(head.span))?;

        for ident in rest {
            let id = match value {
                Value::Object(id) => id,
                other => {
                    return Err(RuntimeError::invalid_type(ValueKind::Object, other.kind())
                        .at(ident.span))
                }
            };
            value = self.env.get_property(id, &ident.name);
        }
        Ok(value)
    }

    /// Resolve a reference that must name a live object.
    pub fn resolve_object(&self, reference: &Reference) -> EvalResult<ObjectId> {
        match self.eval_reference(reference)? {
            Value::Object(id) => Ok(id),
            Value::Absent => Err(RuntimeError::ObjectNotFound(reference.to_string()).at(reference.span)),
            other => Err(RuntimeError::invalid_type(ValueKind::Object, other.kind()).at(reference.span)),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    pub fn eval_expr(&self, expr: &Expr) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::NumberLit(n) => Ok(Value::Number(*n)),
            ExprKind::StringLit(s) => Ok(Value::Text(s.clone())),
            ExprKind::BoolLit(b) => Ok(Value::Boolean(*b)),
            ExprKind::DirectionLit(d) => Ok(Value::Direction(*d)),
            ExprKind::NothingLit => Ok(Value::Absent),
            ExprKind::Position { row, column } => {
                let row = self.eval_number(row)?;
                let column = self.eval_number(column)?;
                let bad = if Position::coordinate(row).is_none() { row } else { column };
                Position::from_f64(row, column)
                    .map(Value::Position)
                    .ok_or_else(|| RuntimeError::NumberOutOfRange(bad).at(expr.span))
            }
            ExprKind::Reference(reference) => self.eval_reference(reference),
            ExprKind::Binary { left, op, right } => self.eval_binary(left, *op, right, expr.span),
            ExprKind::Unary { op, operand } => self.eval_unary(*op, operand),
        }
    }

    /// Evaluate and coerce to `kind`, failing with `InvalidType`.
    fn eval_as(&self, expr: &Expr, kind: ValueKind) -> EvalResult<Value> {
        let value = self.eval_expr(expr)?.try_coerce_to(kind);
        if value.kind() == kind {
            Ok(value)
        } else {
            Err(RuntimeError::invalid_type(kind, value.kind()).at(expr.span))
        }
    }

    pub fn eval_number(&self, expr: &Expr) -> EvalResult<f64> {
        match self.eval_as(expr, ValueKind::Number)? {
            Value::Number(n) => Ok(n),
            other => Err(RuntimeError::invalid_type(ValueKind::Number, other.kind()).at(expr.span)),
        }
    }

    pub fn eval_boolean(&self, expr: &Expr) -> EvalResult<bool> {
        match self.eval_as(expr, ValueKind::Boolean)? {
            Value::Boolean(b) => Ok(b),
            other => Err(RuntimeError::invalid_type(ValueKind::Boolean, other.kind()).at(expr.span)),
        }
    }

    pub fn eval_text(&self, expr: &Expr) -> EvalResult<String> {
        match self.eval_as(expr, ValueKind::Text)? {
            Value::Text(s) => Ok(s),
            other => Err(RuntimeError::invalid_type(ValueKind::Text, other.kind()).at(expr.span)),
        }
    }

    pub fn eval_direction(&self, expr: &Expr) -> EvalResult<Direction> {
        match self.eval_as(expr, ValueKind::Direction)? {
            Value::Direction(d) => Ok(d),
            other => Err(RuntimeError::invalid_type(ValueKind::Direction, other.kind()).at(expr.span)),
        }
    }

    // ── Operators ────────────────────────────────────────────────────────

    fn eval_binary(&self, left: &Expr, op: BinOp, right: &Expr, span: Span) -> EvalResult<Value> {
        // Short-circuit for logical operators
        match op {
            BinOp::And => {
                return Ok(Value::Boolean(
                    self.eval_boolean(left)? && self.eval_boolean(right)?,
                ))
            }
            BinOp::Or => {
                return Ok(Value::Boolean(
                    self.eval_boolean(left)? || self.eval_boolean(right)?,
                ))
            }
            _ => {}
        }

        let lv = self.eval_expr(left)?;
        let rv = self.eval_expr(right)?;

        match op {
            BinOp::Eq => Ok(Value::Boolean(lv == rv)),
            BinOp::NotEq => Ok(Value::Boolean(lv != rv)),
            BinOp::Less => self.eval_comparison(lv, rv, span, |o| o.is_lt()),
            BinOp::Greater => self.eval_comparison(lv, rv, span, |o| o.is_gt()),
            BinOp::LessEq => self.eval_comparison(lv, rv, span, |o| o.is_le()),
            BinOp::GreaterEq => self.eval_comparison(lv, rv, span, |o| o.is_ge()),
            BinOp::Add => {
                if matches!(lv, Value::Text(_)) || matches!(rv, Value::Text(_)) {
                    let a = Self::coerce(lv, ValueKind::Text, span)?;
                    let b = Self::coerce(rv, ValueKind::Text, span)?;
                    Ok(Value::Text(format!("{a}{b}")))
                } else {
                    self.eval_arith(lv, rv, span, |a, b| a + b)
                }
            }
            BinOp::Sub => self.eval_arith(lv, rv, span, |a, b| a - b),
            BinOp::Mul => self.eval_arith(lv, rv, span, |a, b| a * b),
            BinOp::Pow => self.eval_arith(lv, rv, span, f64::powf),
            BinOp::And | BinOp::Or => unreachable!("handled above"),
        }
    }

    fn coerce(value: Value, kind: ValueKind, span: Span) -> EvalResult<Value> {
        let value = value.try_coerce_to(kind);
        if value.kind() == kind {
            Ok(value)
        } else {
            Err(RuntimeError::invalid_type(kind, value.kind()).at(span))
        }
    }

    fn numbers(lv: Value, rv: Value, span: Span) -> EvalResult<(f64, f64)> {
        match (
            Self::coerce(lv, ValueKind::Number, span)?,
            Self::coerce(rv, ValueKind::Number, span)?,
        ) {
            (Value::Number(a), Value::Number(b)) => Ok((a, b)),
            (a, _) => Err(RuntimeError::invalid_type(ValueKind::Number, a.kind()).at(span)),
        }
    }

    fn eval_arith(&self, lv: Value, rv: Value, span: Span, op: fn(f64, f64) -> f64) -> EvalResult<Value> {
        let (a, b) = Self::numbers(lv, rv, span)?;
        Ok(Value::Number(op(a, b)))
    }

    /// Two texts compare lexicographically; anything else compares as numbers.
    fn eval_comparison(
        &self,
        lv: Value,
        rv: Value,
        span: Span,
        test: fn(std::cmp::Ordering) -> bool,
    ) -> EvalResult<Value> {
        let ordering = match (&lv, &rv) {
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            _ => {
                let (a, b) = Self::numbers(lv, rv, span)?;
                a.partial_cmp(&b)
            }
        };
        Ok(Value::Boolean(ordering.is_some_and(test)))
    }

    fn eval_unary(&self, op: UnaryOp, operand: &Expr) -> EvalResult<Value> {
        match op {
            UnaryOp::Neg => Ok(Value::Number(-self.eval_number(operand)?)),
            UnaryOp::Not => Ok(Value::Boolean(!self.eval_boolean(operand)?)),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
