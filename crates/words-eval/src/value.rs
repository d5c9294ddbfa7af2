//! Runtime values.

use crate::arena::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use words_types::ast::Direction;

/// A grid cell. `row` grows upward, `column` grows to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub row: i64,
    pub column: i64,
}

/// Largest coordinate magnitude. Every coordinate reads back as an exact `f64`.
pub const MAX_COORDINATE: i64 = 1 << 53;

impl Position {
    pub fn new(row: i64, column: i64) -> Self {
        Self { row, column }
    }

    /// Round `n` half away from zero. `None` if it is not finite or lies
    /// outside `±MAX_COORDINATE`.
    pub fn coordinate(n: f64) -> Option<i64> {
        let n = n.round();
        if n.is_finite() && n.abs() <= MAX_COORDINATE as f64 {
            Some(n as i64)
        } else {
            None
        }
    }

    /// Build a position from unrounded coordinates.
    pub fn from_f64(row: f64, column: f64) -> Option<Self> {
        Some(Self::new(Self::coordinate(row)?, Self::coordinate(column)?))
    }

    /// `distance` steps in `direction`, or `None` if that leaves the grid.
    pub fn offset(self, direction: Direction, distance: i64) -> Option<Self> {
        let (dr, dc) = direction.delta();
        let shift = |from: i64, delta: i64| {
            delta
                .checked_mul(distance)
                .and_then(|d| from.checked_add(d))
                .filter(|c| c.abs() <= MAX_COORDINATE)
        };
        Some(Self::new(shift(self.row, dr)?, shift(self.column, dc)?))
    }

    /// Same cell or an orthogonal neighbour.
    pub fn touches(self, other: Position) -> bool {
        (self.row - other.row).abs() + (self.column - other.column).abs() <= 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// The tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Number,
    Text,
    Boolean,
    Object,
    Direction,
    Position,
    Absent,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Number => "number",
            ValueKind::Text => "text",
            ValueKind::Boolean => "boolean",
            ValueKind::Object => "object",
            ValueKind::Direction => "direction",
            ValueKind::Position => "position",
            ValueKind::Absent => "nothing",
        };
        f.write_str(name)
    }
}

/// A Words runtime value.
///
/// `Absent` stands for "no value"; storing it into a property deletes the
/// property. `Object` holds a generational id and never keeps its target alive.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Boolean(bool),
    Object(ObjectId),
    Direction(Direction),
    Position(Position),
    Absent,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Text(_) => ValueKind::Text,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Object(_) => ValueKind::Object,
            Value::Direction(_) => ValueKind::Direction,
            Value::Position(_) => ValueKind::Position,
            Value::Absent => ValueKind::Absent,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Convert toward `target` where a rule exists; otherwise return `self`
    /// unchanged. Callers check the resulting kind.
    pub fn try_coerce_to(self, target: ValueKind) -> Value {
        if self.kind() == target {
            return self;
        }
        match (target, self) {
            (ValueKind::Number, Value::Text(s)) => match s.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Value::Number(n),
                _ => Value::Text(s),
            },
            (ValueKind::Text, v @ (Value::Number(_)
            | Value::Boolean(_)
            | Value::Direction(_)
            | Value::Position(_))) => Value::Text(v.to_string()),
            (ValueKind::Boolean, Value::Text(s)) => match s.trim() {
                "true" => Value::Boolean(true),
                "false" => Value::Boolean(false),
                _ => Value::Text(s),
            },
            (ValueKind::Direction, Value::Text(s)) => match Direction::parse(&s) {
                Some(d) => Value::Direction(d),
                None => Value::Text(s),
            },
            (_, v) => v,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < MAX_COORDINATE as f64 {
                    write!(f, "{}", *n as i64)
                } else if n.fract() == 0.0 {
                    write!(f, "{n:.0}")
                } else {
                    write!(f, "{n}")
                }
            }
            Value::Text(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Object(id) => write!(f, "{id}"),
            Value::Direction(d) => write!(f, "{d}"),
            Value::Position(p) => write!(f, "{p}"),
            Value::Absent => f.write_str("nothing"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Position> for Value {
    fn from(p: Position) -> Self {
        Value::Position(p)
    }
}

impl From<Direction> for Value {
    fn from(d: Direction) -> Self {
        Value::Direction(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_to_number() {
        assert_eq!(
            Value::from(" 2.5 ").try_coerce_to(ValueKind::Number),
            Value::Number(2.5)
        );
        assert_eq!(
            Value::from("far").try_coerce_to(ValueKind::Number),
            Value::from("far")
        );
        assert_eq!(
            Value::from("inf").try_coerce_to(ValueKind::Number).kind(),
            ValueKind::Text
        );
    }

    #[test]
    fn test_number_to_text_keeps_precision() {
        assert_eq!(Value::Number(3.0).try_coerce_to(ValueKind::Text), Value::from("3"));
        assert_eq!(
            Value::Number(0.125).try_coerce_to(ValueKind::Text),
            Value::from("0.125")
        );
    }

    #[test]
    fn test_large_integral_number_to_text() {
        assert_eq!(
            Value::Number(1e20).try_coerce_to(ValueKind::Text),
            Value::from("100000000000000000000")
        );
        assert_eq!(Value::Number(-1e20).to_string(), "-100000000000000000000");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "inf");
    }

    #[test]
    fn test_text_to_direction_and_boolean() {
        assert_eq!(
            Value::from("Up").try_coerce_to(ValueKind::Direction),
            Value::Direction(Direction::Up)
        );
        assert_eq!(
            Value::from("false").try_coerce_to(ValueKind::Boolean),
            Value::Boolean(false)
        );
    }

    #[test]
    fn test_no_rule_returns_original() {
        assert_eq!(
            Value::Boolean(true).try_coerce_to(ValueKind::Number),
            Value::Boolean(true)
        );
        assert_eq!(Value::Absent.try_coerce_to(ValueKind::Text), Value::Absent);
    }

    #[test]
    fn test_position_rounds_half_away_from_zero() {
        assert_eq!(Position::from_f64(2.5, -2.5), Some(Position::new(3, -3)));
        assert_eq!(Position::from_f64(1.49, 0.0), Some(Position::new(1, 0)));
    }

    #[test]
    fn test_coordinates_outside_the_grid() {
        assert_eq!(Position::coordinate(f64::NAN), None);
        assert_eq!(Position::coordinate(f64::NEG_INFINITY), None);
        assert_eq!(Position::coordinate(1e30), None);
        assert_eq!(Position::from_f64(0.0, 1e300), None);
        assert_eq!(Position::coordinate(-(MAX_COORDINATE as f64)), Some(-MAX_COORDINATE));
    }

    #[test]
    fn test_offset_is_checked() {
        let p = Position::new(1, 0);
        assert_eq!(p.offset(Direction::Up, 2), Some(Position::new(3, 0)));
        assert_eq!(p.offset(Direction::Up, i64::MAX), None);
        assert_eq!(Position::default().offset(Direction::Down, i64::MIN), None);
        assert_eq!(Position::new(0, MAX_COORDINATE).offset(Direction::Right, 1), None);
    }

    #[test]
    fn test_position_touches() {
        let p = Position::new(2, 2);
        assert!(p.touches(Position::new(2, 2)));
        assert!(p.touches(Position::new(3, 2)));
        assert!(p.touches(Position::new(2, 1)));
        assert!(!p.touches(Position::new(3, 3)));
        assert!(!p.touches(Position::new(4, 2)));
    }
}
