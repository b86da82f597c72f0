//! Compile-time evaluation of constant expressions with Lua 5.4 semantics.
//!
//! Evaluation returns `None` whenever the result is not statically known or
//! the operation would raise an error at run time; callers leave such
//! expressions untouched.

use std::cmp::Ordering;

use luaform_ast::{
    BinaryOp, NodeId, NodeKind, NumberLiteral, NumberValue, StringLiteral, StructuralError,
    SyntaxTree, UnaryOp,
};

/// 2^63 as a float, the first float above every `i64`.
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

/// A statically known Lua value.
#[derive(Debug, Clone, PartialEq)]
pub enum LuaValue {
    Nil,
    Boolean(bool),
    Number(NumberValue),
    String(Vec<u8>),
}

impl LuaValue {
    pub fn integer(value: i64) -> Self {
        LuaValue::Number(NumberValue::Integer(value))
    }

    pub fn float(value: f64) -> Self {
        LuaValue::Number(NumberValue::Float(value))
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, LuaValue::Nil | LuaValue::Boolean(false))
    }

    /// Result of Lua's `type`.
    pub fn type_name(&self) -> &'static str {
        match self {
            LuaValue::Nil => "nil",
            LuaValue::Boolean(_) => "boolean",
            LuaValue::Number(_) => "number",
            LuaValue::String(_) => "string",
        }
    }

    /// Result of Lua's `tostring`.
    pub fn to_lua_string(&self) -> Vec<u8> {
        match self {
            LuaValue::Nil => b"nil".to_vec(),
            LuaValue::Boolean(value) => value.to_string().into_bytes(),
            LuaValue::Number(number) => number_to_string(*number).into_bytes(),
            LuaValue::String(bytes) => bytes.clone(),
        }
    }

    /// Whether the value can be written back as a literal of the same value.
    pub fn is_representable(&self) -> bool {
        match self {
            LuaValue::Number(NumberValue::Integer(value)) => *value != i64::MIN,
            LuaValue::Number(NumberValue::Float(value)) => value.is_finite(),
            _ => true,
        }
    }
}

/// Reads the value of a literal node.
pub fn literal_value(kind: &NodeKind) -> Option<LuaValue> {
    match kind {
        NodeKind::Nil => Some(LuaValue::Nil),
        NodeKind::True => Some(LuaValue::Boolean(true)),
        NodeKind::False => Some(LuaValue::Boolean(false)),
        NodeKind::Number(number) => Some(LuaValue::Number(number.value)),
        NodeKind::String(string) => Some(LuaValue::String(string.value.clone())),
        _ => None,
    }
}

/// Evaluates an expression built only from literals and operators.
pub fn evaluate(tree: &SyntaxTree, id: NodeId) -> Option<LuaValue> {
    let kind = tree.kind(id);
    if let Some(value) = literal_value(kind) {
        return Some(value);
    }
    match kind {
        NodeKind::Paren => evaluate(tree, tree.child(id, 0)?),
        NodeKind::Unary { op } => unary(*op, &evaluate(tree, tree.child(id, 0)?)?),
        NodeKind::Binary { op } => {
            let left = evaluate(tree, tree.child(id, 0)?)?;
            match op {
                BinaryOp::And if !left.is_truthy() => Some(left),
                BinaryOp::Or if left.is_truthy() => Some(left),
                BinaryOp::And | BinaryOp::Or => evaluate(tree, tree.child(id, 1)?),
                _ => binary(*op, &left, &evaluate(tree, tree.child(id, 1)?)?),
            }
        }
        _ => None,
    }
}

/// Truthiness of a condition that can be decided without running code.
///
/// Besides constant expressions, function expressions and table
/// constructors whose entries are constant are always truthy.
pub fn static_truthiness(tree: &SyntaxTree, id: NodeId) -> Option<bool> {
    match tree.kind(id) {
        NodeKind::Function => Some(true),
        NodeKind::Table if is_constant_table(tree, id) => Some(true),
        NodeKind::Paren => static_truthiness(tree, tree.child(id, 0)?),
        _ => evaluate(tree, id).map(|value| value.is_truthy()),
    }
}

fn is_constant_table(tree: &SyntaxTree, id: NodeId) -> bool {
    tree.children(id).iter().all(|&entry| {
        tree.children(entry)
            .iter()
            .all(|&part| is_side_effect_free(tree, part))
    })
}

fn is_side_effect_free(tree: &SyntaxTree, id: NodeId) -> bool {
    match tree.kind(id) {
        NodeKind::Function => true,
        NodeKind::Table => is_constant_table(tree, id),
        _ => evaluate(tree, id).is_some(),
    }
}

pub fn unary(op: UnaryOp, operand: &LuaValue) -> Option<LuaValue> {
    match (op, operand) {
        (UnaryOp::Not, value) => Some(LuaValue::Boolean(!value.is_truthy())),
        (UnaryOp::Minus, LuaValue::Number(NumberValue::Integer(value))) => {
            Some(LuaValue::integer(value.wrapping_neg()))
        }
        (UnaryOp::Minus, LuaValue::Number(NumberValue::Float(value))) => {
            Some(LuaValue::float(-value))
        }
        (UnaryOp::Length, LuaValue::String(bytes)) => {
            Some(LuaValue::integer(i64::try_from(bytes.len()).ok()?))
        }
        (UnaryOp::BitNot, LuaValue::Number(number)) => {
            Some(LuaValue::integer(!to_integer(*number)?))
        }
        _ => None,
    }
}

pub fn binary(op: BinaryOp, left: &LuaValue, right: &LuaValue) -> Option<LuaValue> {
    match op {
        BinaryOp::And => Some(if left.is_truthy() { right } else { left }.clone()),
        BinaryOp::Or => Some(if left.is_truthy() { left } else { right }.clone()),
        BinaryOp::Equal => Some(LuaValue::Boolean(raw_equal(left, right))),
        BinaryOp::NotEqual => Some(LuaValue::Boolean(!raw_equal(left, right))),
        BinaryOp::Less => less_than(left, right, false),
        BinaryOp::LessEqual => less_than(left, right, true),
        BinaryOp::Greater => less_than(right, left, false),
        BinaryOp::GreaterEqual => less_than(right, left, true),
        BinaryOp::Concat => {
            let mut bytes = concat_operand(left)?;
            bytes.extend(concat_operand(right)?);
            Some(LuaValue::String(bytes))
        }
        _ => {
            let (LuaValue::Number(left), LuaValue::Number(right)) = (left, right) else {
                return None;
            };
            arithmetic(op, *left, *right).map(LuaValue::Number)
        }
    }
}

fn arithmetic(op: BinaryOp, left: NumberValue, right: NumberValue) -> Option<NumberValue> {
    use NumberValue::{Float, Integer};

    let integer = match (op, left, right) {
        (BinaryOp::Add, Integer(a), Integer(b)) => Some(a.wrapping_add(b)),
        (BinaryOp::Sub, Integer(a), Integer(b)) => Some(a.wrapping_sub(b)),
        (BinaryOp::Mul, Integer(a), Integer(b)) => Some(a.wrapping_mul(b)),
        (BinaryOp::FloorDiv, Integer(a), Integer(b)) => return floor_div(a, b).map(Integer),
        (BinaryOp::Mod, Integer(a), Integer(b)) => return modulo(a, b).map(Integer),
        _ => None,
    };
    if let Some(value) = integer {
        return Some(Integer(value));
    }

    match op {
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::ShiftLeft
        | BinaryOp::ShiftRight => {
            let (a, b) = (to_integer(left)?, to_integer(right)?);
            let value = match op {
                BinaryOp::BitAnd => a & b,
                BinaryOp::BitOr => a | b,
                BinaryOp::BitXor => a ^ b,
                BinaryOp::ShiftLeft => shift_left(a, b),
                _ => shift_left(a, b.checked_neg().unwrap_or(i64::MAX)),
            };
            Some(Integer(value))
        }
        _ => {
            let (a, b) = (to_float(left), to_float(right));
            let value = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                BinaryOp::Pow => a.powf(b),
                BinaryOp::FloorDiv => (a / b).floor(),
                BinaryOp::Mod => float_modulo(a, b),
                _ => return None,
            };
            Some(Float(value))
        }
    }
}

/// Integer floor division. Division by zero raises an error in Lua.
fn floor_div(a: i64, b: i64) -> Option<i64> {
    match b {
        0 => None,
        -1 => Some(a.wrapping_neg()),
        _ => {
            let quotient = a / b;
            if a % b != 0 && (a ^ b) < 0 {
                Some(quotient - 1)
            } else {
                Some(quotient)
            }
        }
    }
}

/// Integer modulo; the result takes the sign of the divisor.
fn modulo(a: i64, b: i64) -> Option<i64> {
    match b {
        0 => None,
        -1 => Some(0),
        _ => {
            let remainder = a % b;
            if remainder != 0 && (remainder ^ b) < 0 {
                Some(remainder + b)
            } else {
                Some(remainder)
            }
        }
    }
}

fn float_modulo(a: f64, b: f64) -> f64 {
    let remainder = a % b;
    if (remainder > 0.0 && b < 0.0) || (remainder < 0.0 && b > 0.0) {
        remainder + b
    } else {
        remainder
    }
}

fn shift_left(value: i64, shift: i64) -> i64 {
    if shift <= -64 || shift >= 64 {
        0
    } else if shift >= 0 {
        ((value as u64) << shift) as i64
    } else {
        ((value as u64) >> -shift) as i64
    }
}

/// Integer value of a number with an exact integer representation.
pub fn to_integer(number: NumberValue) -> Option<i64> {
    match number {
        NumberValue::Integer(value) => Some(value),
        NumberValue::Float(value)
            if value.fract() == 0.0 && (-TWO_POW_63..TWO_POW_63).contains(&value) =>
        {
            Some(value as i64)
        }
        NumberValue::Float(_) => None,
    }
}

pub fn to_float(number: NumberValue) -> f64 {
    match number {
        NumberValue::Integer(value) => value as f64,
        NumberValue::Float(value) => value,
    }
}

fn raw_equal(left: &LuaValue, right: &LuaValue) -> bool {
    match (left, right) {
        (LuaValue::Number(a), LuaValue::Number(b)) => {
            compare_numbers(*a, *b) == Some(Ordering::Equal)
        }
        _ => left == right,
    }
}

/// `left < right`, or `left <= right` with `or_equal`. Comparisons involving
/// NaN are false; mixed types raise an error in Lua and are not evaluated.
fn less_than(left: &LuaValue, right: &LuaValue, or_equal: bool) -> Option<LuaValue> {
    let ordering = match (left, right) {
        (LuaValue::Number(a), LuaValue::Number(b)) => compare_numbers(*a, *b),
        (LuaValue::String(a), LuaValue::String(b)) => Some(a.cmp(b)),
        _ => return None,
    };
    Some(LuaValue::Boolean(match ordering {
        Some(Ordering::Less) => true,
        Some(Ordering::Equal) => or_equal,
        _ => false,
    }))
}

/// Exact comparison across integer and float subtypes. `None` for NaN.
pub(crate) fn compare_numbers(left: NumberValue, right: NumberValue) -> Option<Ordering> {
    use NumberValue::{Float, Integer};
    match (left, right) {
        (Integer(a), Integer(b)) => Some(a.cmp(&b)),
        (Float(a), Float(b)) => a.partial_cmp(&b),
        (Integer(a), Float(b)) => compare_integer_float(a, b),
        (Float(a), Integer(b)) => compare_integer_float(b, a).map(Ordering::reverse),
    }
}

fn compare_integer_float(integer: i64, float: f64) -> Option<Ordering> {
    if float.is_nan() {
        return None;
    }
    if float >= TWO_POW_63 {
        return Some(Ordering::Less);
    }
    if float < -TWO_POW_63 {
        return Some(Ordering::Greater);
    }
    let floor = float.floor();
    match integer.cmp(&(floor as i64)) {
        Ordering::Equal if float > floor => Some(Ordering::Less),
        ordering => Some(ordering),
    }
}

fn concat_operand(value: &LuaValue) -> Option<Vec<u8>> {
    match value {
        LuaValue::String(bytes) => Some(bytes.clone()),
        LuaValue::Number(number) => Some(number_to_string(*number).into_bytes()),
        _ => None,
    }
}

/// Lua's number to string conversion (`%.14g` for floats, with `.0` added to
/// integral floats).
pub fn number_to_string(number: NumberValue) -> String {
    match number {
        NumberValue::Integer(value) => value.to_string(),
        NumberValue::Float(value) if value.is_nan() => {
            if value.is_sign_negative() { "-nan" } else { "nan" }.to_string()
        }
        NumberValue::Float(value) if value.is_infinite() => {
            if value > 0.0 { "inf" } else { "-inf" }.to_string()
        }
        NumberValue::Float(value) => {
            let mut text = format_general(value, 14);
            if text.bytes().all(|b| b == b'-' || b.is_ascii_digit()) {
                text.push_str(".0");
            }
            text
        }
    }
}

/// C's `%.{precision}g` for finite values.
fn format_general(value: f64, precision: usize) -> String {
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let scientific = format!("{:.*e}", precision - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Allocates a detached expression that evaluates to `value`.
///
/// Negative numbers become a unary minus over a literal. Returns `None` for
/// values that have no literal form.
pub fn to_node(tree: &mut SyntaxTree, value: &LuaValue) -> Result<Option<NodeId>, StructuralError> {
    if !value.is_representable() {
        return Ok(None);
    }
    let node = match value {
        LuaValue::Nil => tree.alloc(NodeKind::Nil, vec![])?,
        LuaValue::Boolean(true) => tree.alloc(NodeKind::True, vec![])?,
        LuaValue::Boolean(false) => tree.alloc(NodeKind::False, vec![])?,
        LuaValue::String(bytes) => {
            tree.alloc(NodeKind::String(StringLiteral::new(bytes.clone())), vec![])?
        }
        LuaValue::Number(NumberValue::Integer(value)) if *value < 0 => {
            negated(tree, NumberLiteral::integer(value.wrapping_neg()))?
        }
        LuaValue::Number(NumberValue::Float(value)) if value.is_sign_negative() => {
            negated(tree, NumberLiteral::float(-value))?
        }
        LuaValue::Number(NumberValue::Integer(value)) => {
            tree.alloc(NodeKind::Number(NumberLiteral::integer(*value)), vec![])?
        }
        LuaValue::Number(NumberValue::Float(value)) => {
            tree.alloc(NodeKind::Number(NumberLiteral::float(*value)), vec![])?
        }
    };
    Ok(Some(node))
}

fn negated(tree: &mut SyntaxTree, literal: NumberLiteral) -> Result<NodeId, StructuralError> {
    let operand = tree.alloc(NodeKind::Number(literal), vec![])?;
    tree.alloc(NodeKind::Unary { op: UnaryOp::Minus }, vec![operand])
}
