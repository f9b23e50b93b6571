//! Arithmetic and comparison on script values.
//!
//! `and`/`or` are not here: they short-circuit, so the interpreter handles them.
use svglabel_units::LengthDimension;

use crate::ast::{BinaryOperator, UnaryOperator};
use crate::error::ScriptError;
use crate::value::{HostValue, Value, generated_len};

pub fn unary<H: HostValue>(op: UnaryOperator, value: Value<H>) -> Result<Value<H>, ScriptError> {
    match (op, value) {
        (UnaryOperator::Not, v) => Ok(Value::Bool(!v.is_truthy())),
        (UnaryOperator::Minus, Value::Number(n)) => Ok(Value::Number(-n)),
        (UnaryOperator::Minus, Value::Length(l)) => Ok(Value::Length(-l)),
        (UnaryOperator::Minus, v) => Err(ScriptError::TypeError(format!(
            "bad operand type for unary -: {}",
            v.type_name()
        ))),
    }
}

pub fn binary<H: HostValue>(
    op: BinaryOperator,
    left: Value<H>,
    right: Value<H>,
) -> Result<Value<H>, ScriptError> {
    use BinaryOperator::*;
    match op {
        Equals => Ok(Value::Bool(left == right)),
        NotEquals => Ok(Value::Bool(left != right)),
        LessThan => Ok(Value::Bool(left.compare(&right)?.is_lt())),
        LessThanOrEqual => Ok(Value::Bool(left.compare(&right)?.is_le())),
        GreaterThan => Ok(Value::Bool(left.compare(&right)?.is_gt())),
        GreaterThanOrEqual => Ok(Value::Bool(left.compare(&right)?.is_ge())),
        Plus => add(left, right),
        Minus => subtract(left, right),
        Multiply => multiply(left, right),
        Divide => divide(left, right),
        FloorDivide => floor_divide(left, right),
        Modulo => modulo(left, right),
        Or | And => Err(ScriptError::TypeError(format!(
            "'{}' must be evaluated lazily",
            op.symbol()
        ))),
    }
}

fn unsupported<H: HostValue>(op: BinaryOperator, left: &Value<H>, right: &Value<H>) -> ScriptError {
    ScriptError::TypeError(format!(
        "unsupported operand types for {}: {} and {}",
        op.symbol(),
        left.type_name(),
        right.type_name()
    ))
}

fn add<H: HostValue>(left: Value<H>, right: Value<H>) -> Result<Value<H>, ScriptError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Value::Length(a), Value::Length(b)) => Ok(Value::Length(a + b)),
        (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
        (Value::Tuple(mut a), Value::Tuple(b)) => {
            a.extend(b);
            Ok(Value::Tuple(a))
        }
        (Value::List(a), Value::List(b)) => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::list(items))
        }
        (left, right) => Err(unsupported(BinaryOperator::Plus, &left, &right)),
    }
}

fn subtract<H: HostValue>(left: Value<H>, right: Value<H>) -> Result<Value<H>, ScriptError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
        (Value::Length(a), Value::Length(b)) => Ok(Value::Length(a - b)),
        (left, right) => Err(unsupported(BinaryOperator::Minus, &left, &right)),
    }
}

fn multiply<H: HostValue>(left: Value<H>, right: Value<H>) -> Result<Value<H>, ScriptError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
        (Value::Number(n), Value::Length(l)) | (Value::Length(l), Value::Number(n)) => {
            Ok(Value::Length(l * n))
        }
        (Value::Str(s), Value::Number(n)) | (Value::Number(n), Value::Str(s)) => {
            let count = n.max(0.0);
            if s.is_empty() || count < 1.0 {
                return Ok(Value::Str(String::new()));
            }
            generated_len(count * s.len() as f64, "repeated string")?;
            Ok(Value::Str(s.repeat(count as usize)))
        }
        // (1, 2) * inch scales each element
        (Value::Tuple(items), unit @ Value::Length(_))
        | (unit @ Value::Length(_), Value::Tuple(items)) => items
            .into_iter()
            .map(|item| multiply(item, unit.clone()))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Tuple),
        (left, right) => Err(unsupported(BinaryOperator::Multiply, &left, &right)),
    }
}

fn nonzero(divisor: f64) -> Result<f64, ScriptError> {
    if divisor == 0.0 {
        Err(ScriptError::DivisionByZero)
    } else {
        Ok(divisor)
    }
}

fn divide<H: HostValue>(left: Value<H>, right: Value<H>) -> Result<Value<H>, ScriptError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / nonzero(b)?)),
        (Value::Length(l), Value::Number(n)) => Ok(Value::Length(l / nonzero(n)?)),
        (Value::Length(a), Value::Length(b)) => Ok(Value::Number(a.to_px() / nonzero(b.to_px())?)),
        (left, right) => Err(unsupported(BinaryOperator::Divide, &left, &right)),
    }
}

fn floor_divide<H: HostValue>(left: Value<H>, right: Value<H>) -> Result<Value<H>, ScriptError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number((a / nonzero(b)?).floor())),
        (Value::Length(a), Value::Length(b)) => {
            Ok(Value::Number((a.to_px() / nonzero(b.to_px())?).floor()))
        }
        (left, right) => Err(unsupported(BinaryOperator::FloorDivide, &left, &right)),
    }
}

/// Modulo takes the sign of the divisor, so `-1 % 3 == 2`.
fn modulo<H: HostValue>(left: Value<H>, right: Value<H>) -> Result<Value<H>, ScriptError> {
    let floor_mod = |a: f64, b: f64| a - b * (a / b).floor();
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(floor_mod(a, nonzero(b)?))),
        (Value::Length(a), Value::Length(b)) => {
            let px = floor_mod(a.to_px(), nonzero(b.to_px())?);
            Ok(Value::Length(LengthDimension::px(px).to_unit(a.unit)))
        }
        (left, right) => Err(unsupported(BinaryOperator::Modulo, &left, &right)),
    }
}
