//! Operations on values.
//!
//! Arithmetic, comparison and equality with JavaScript coercion rules.
//! None of these can fail: invalid arithmetic yields `NaN` the way a JS
//! host would.

use std::cmp::Ordering;

use super::ast::{BinaryOp, UnaryOp};
use super::value::Value;

/// A primitive produced by `ToPrimitive`.
enum Primitive {
    Str(String),
    Other(Value),
}

/// Convert containers and functions to their string form; primitives pass
/// through unchanged.
fn to_primitive(value: &Value) -> Primitive {
    match value {
        Value::Array(_) | Value::Object(_) | Value::Func(_) | Value::Native(_) => {
            Primitive::Str(value.display())
        }
        Value::Str(s) => Primitive::Str(s.clone()),
        other => Primitive::Other(other.clone()),
    }
}

/// Apply a binary operator.
pub fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Value {
    match op {
        BinaryOp::Add => add(lhs, rhs),
        BinaryOp::Sub => Value::Number(lhs.to_number() - rhs.to_number()),
        BinaryOp::Mul => Value::Number(lhs.to_number() * rhs.to_number()),
        BinaryOp::Div => Value::Number(lhs.to_number() / rhs.to_number()),
        BinaryOp::Rem => Value::Number(lhs.to_number() % rhs.to_number()),
        BinaryOp::Pow => Value::Number(pow(lhs.to_number(), rhs.to_number())),
        BinaryOp::Eq => Value::Bool(loose_equals(lhs, rhs)),
        BinaryOp::NotEq => Value::Bool(!loose_equals(lhs, rhs)),
        BinaryOp::StrictEq => Value::Bool(lhs.strict_equals(rhs)),
        BinaryOp::StrictNotEq => Value::Bool(!lhs.strict_equals(rhs)),
        BinaryOp::Lt => Value::Bool(compare(lhs, rhs) == Some(Ordering::Less)),
        BinaryOp::Le => Value::Bool(matches!(
            compare(lhs, rhs),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Gt => Value::Bool(compare(lhs, rhs) == Some(Ordering::Greater)),
        BinaryOp::Ge => Value::Bool(matches!(
            compare(lhs, rhs),
            Some(Ordering::Greater | Ordering::Equal)
        )),
    }
}

/// Apply a unary operator.
pub fn unary(op: UnaryOp, value: &Value) -> Value {
    match op {
        UnaryOp::Neg => Value::Number(-value.to_number()),
        UnaryOp::Pos => Value::Number(value.to_number()),
        UnaryOp::Not => Value::Bool(!value.is_truthy()),
        UnaryOp::Typeof => Value::from(value.type_of().name()),
    }
}

/// The `+` operator: string concatenation if either side is (or converts
/// to) a string, numeric addition otherwise.
pub fn add(lhs: &Value, rhs: &Value) -> Value {
    match (to_primitive(lhs), to_primitive(rhs)) {
        (Primitive::Str(a), b) => Value::Str(a + &primitive_text(b)),
        (a, Primitive::Str(b)) => Value::Str(primitive_text(a) + &b),
        (Primitive::Other(a), Primitive::Other(b)) => Value::Number(a.to_number() + b.to_number()),
    }
}

fn primitive_text(p: Primitive) -> String {
    match p {
        Primitive::Str(s) => s,
        Primitive::Other(v) => v.display(),
    }
}

fn pow(base: f64, exp: f64) -> f64 {
    // Rust gives 1 for these, JavaScript gives NaN.
    if base.abs() == 1.0 && exp.is_infinite() {
        return f64::NAN;
    }
    base.powf(exp)
}

/// Abstract equality (`==`).
pub fn loose_equals(lhs: &Value, rhs: &Value) -> bool {
    use Value::*;
    match (lhs, rhs) {
        (Undefined | Null, Undefined | Null) => true,
        (Undefined | Null, _) | (_, Undefined | Null) => false,
        (Number(a), Str(_)) => *a == rhs.to_number(),
        (Str(_), Number(b)) => lhs.to_number() == *b,
        (Bool(_), _) => loose_equals(&Number(lhs.to_number()), rhs),
        (_, Bool(_)) => loose_equals(lhs, &Number(rhs.to_number())),
        (Array(_) | Object(_) | Func(_) | Native(_), Number(_) | Str(_)) => {
            loose_equals(&Str(lhs.display()), rhs)
        }
        (Number(_) | Str(_), Array(_) | Object(_) | Func(_) | Native(_)) => {
            loose_equals(lhs, &Str(rhs.display()))
        }
        _ => lhs.strict_equals(rhs),
    }
}

/// Relational comparison. `None` when either operand is `NaN` after
/// conversion, which makes every relational operator false.
pub fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (to_primitive(lhs), to_primitive(rhs)) {
        (Primitive::Str(a), Primitive::Str(b)) => Some(a.cmp(&b)),
        (a, b) => {
            let a = primitive_number(a);
            let b = primitive_number(b);
            a.partial_cmp(&b)
        }
    }
}

fn primitive_number(p: Primitive) -> f64 {
    match p {
        Primitive::Str(s) => Value::Str(s).to_number(),
        Primitive::Other(v) => v.to_number(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::from(n)
    }

    #[test]
    fn test_add_coercion() {
        assert_eq!(add(&num(1.0), &num(2.0)), num(3.0));
        assert_eq!(add(&Value::from("a"), &num(1.0)), Value::from("a1"));
        assert_eq!(add(&num(1.0), &Value::from("2")), Value::from("12"));
        assert_eq!(add(&Value::Bool(true), &num(1.0)), num(2.0));
        assert_eq!(add(&Value::Null, &num(1.0)), num(1.0));
        assert_eq!(
            add(&Value::array(vec![num(1.0), num(2.0)]), &Value::from("!")),
            Value::from("1,2!")
        );
        assert_eq!(add(&Value::Undefined, &Value::from("")), Value::from("undefined"));
    }

    #[test]
    fn test_arithmetic_yields_nan() {
        assert_eq!(binary(BinaryOp::Mul, &Value::from("x"), &num(2.0)), Value::Number(f64::NAN));
        assert_eq!(binary(BinaryOp::Sub, &Value::from("5"), &num(2.0)), num(3.0));
        assert_eq!(binary(BinaryOp::Div, &num(1.0), &num(0.0)), Value::Number(f64::INFINITY));
        assert_eq!(binary(BinaryOp::Rem, &num(-7.0), &num(3.0)), num(-1.0));
        assert_eq!(binary(BinaryOp::Pow, &num(2.0), &num(10.0)), num(1024.0));
    }

    #[test]
    fn test_loose_equality() {
        assert!(loose_equals(&Value::Null, &Value::Undefined));
        assert!(!loose_equals(&Value::Null, &num(0.0)));
        assert!(loose_equals(&num(1.0), &Value::from("1")));
        assert!(loose_equals(&Value::Bool(true), &num(1.0)));
        assert!(loose_equals(&Value::array(vec![num(2.0)]), &num(2.0)));
        assert!(!loose_equals(&Value::Number(f64::NAN), &Value::Number(f64::NAN)));
    }

    #[test]
    fn test_comparison() {
        assert_eq!(binary(BinaryOp::Lt, &num(1.0), &num(2.0)), Value::Bool(true));
        assert_eq!(binary(BinaryOp::Lt, &Value::from("10"), &Value::from("9")), Value::Bool(true));
        assert_eq!(binary(BinaryOp::Lt, &Value::from("10"), &num(9.0)), Value::Bool(false));
        assert_eq!(binary(BinaryOp::Ge, &Value::Number(f64::NAN), &num(0.0)), Value::Bool(false));
    }

    #[test]
    fn test_unary() {
        assert_eq!(unary(UnaryOp::Neg, &Value::from("3")), num(-3.0));
        assert_eq!(unary(UnaryOp::Not, &Value::from("")), Value::Bool(true));
        assert_eq!(unary(UnaryOp::Typeof, &Value::Null), Value::from("object"));
        assert_eq!(unary(UnaryOp::Typeof, &Value::Native(super::super::value::NativeFn("Math.max"))), Value::from("function"));
    }
}
