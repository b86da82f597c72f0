//! Replaces calls of pure standard library functions on constant arguments
//! with their result.
//!
//! A call is only inlined when the function is reached through an
//! unassigned global (`math.floor`, `tostring`) or through the string
//! metatable (`("x"):rep(3)`), and when it yields exactly one value. Programs
//! that touch the global environment dynamically are left alone entirely.

use std::cmp::Ordering;

use luaform_ast::{NodeId, NodeKind, NumberValue, SyntaxTree};
use serde::Deserialize;
use tracing::debug;

use super::replace_expression;
use crate::error::RuleError;
use crate::rule::{BuiltinRule, Rule, RuleContext, RuleMeta};
use crate::scope::{Resolution, ScopeAnalysis, Site, Slot};
use crate::value::{
    LuaValue, compare_numbers, evaluate, number_to_string, to_float, to_integer, to_node,
};

static META: RuleMeta = RuleMeta {
    name: "call-inlining",
    description: "Evaluates calls of pure library functions on constant arguments",
    runs_before: &["constant-folding"],
    runs_after: &[],
};

/// Functions this rule knows how to evaluate.
pub const SUPPORTED_FUNCTIONS: &[&str] = &[
    "math.abs",
    "math.ceil",
    "math.floor",
    "math.fmod",
    "math.max",
    "math.min",
    "select",
    "string.byte",
    "string.char",
    "string.len",
    "string.lower",
    "string.rep",
    "string.reverse",
    "string.sub",
    "string.upper",
    "tonumber",
    "tostring",
    "type",
];

/// Names through which a program can replace library functions without a
/// plain assignment.
const DYNAMIC_NAMES: &[&str] = &[
    "_ENV",
    "_G",
    "debug",
    "getfenv",
    "rawset",
    "setfenv",
    "setmetatable",
];

/// Results of `string.rep` longer than this are not inlined.
const MAX_REPEAT_LENGTH: usize = 4096;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CallInliningOptions {
    /// Restricts inlining to these functions; all supported ones if unset.
    pub functions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct CallInlining {
    options: CallInliningOptions,
}

impl BuiltinRule for CallInlining {
    const META: &'static RuleMeta = &META;
    type Options = CallInliningOptions;

    fn from_options(options: CallInliningOptions) -> Result<Self, String> {
        if let Some(unknown) = options
            .functions
            .iter()
            .flatten()
            .find(|name| !SUPPORTED_FUNCTIONS.contains(&name.as_str()))
        {
            return Err(format!("function '{unknown}' cannot be inlined"));
        }
        Ok(Self { options })
    }
}

impl Rule for CallInlining {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn apply(&self, tree: &mut SyntaxTree, ctx: &mut RuleContext<'_>) -> Result<(), RuleError> {
        let analysis = ScopeAnalysis::analyze(tree);
        if let Some((node, name)) = dynamic_environment(&analysis) {
            ctx.info(tree, node, format!("call inlining skipped: the program uses '{name}'"));
            return Ok(());
        }

        let mut inlined = 0;
        for id in tree.post_order(tree.root()) {
            if !tree.is_attached(id) || !tree.kind(id).is_call() {
                continue;
            }
            let is_statement = tree
                .parent(id)
                .is_some_and(|parent| matches!(tree.kind(parent), NodeKind::CallStatement));
            if is_statement {
                continue;
            }
            let Some(function) = self.callee(tree, &analysis, id) else {
                continue;
            };
            let Some(args) = arguments(tree, id) else {
                continue;
            };
            let Some(value) = call(&function, &args) else {
                continue;
            };
            if let Some(literal) = to_node(tree, &value)? {
                replace_expression(tree, id, literal)?;
                inlined += 1;
            }
        }
        debug!(inlined, "inlined library calls");
        Ok(())
    }
}

impl CallInlining {
    fn is_enabled(&self, function: &str) -> bool {
        SUPPORTED_FUNCTIONS.contains(&function)
            && self
                .options
                .functions
                .as_ref()
                .is_none_or(|functions| functions.iter().any(|name| name == function))
    }

    /// Qualified name of the library function `call` invokes, if it is one.
    fn callee(&self, tree: &SyntaxTree, analysis: &ScopeAnalysis, call: NodeId) -> Option<String> {
        let target = tree.children(call)[0];
        let function = match tree.kind(call) {
            NodeKind::MethodCall { method, .. } => match evaluate(tree, target)? {
                LuaValue::String(_) if !analysis.is_global_assigned("string") => {
                    format!("string.{method}")
                }
                _ => return None,
            },
            NodeKind::Call { .. } => match tree.kind(target) {
                NodeKind::Identifier(_) => global_name(tree, analysis, target)?.to_string(),
                NodeKind::Field { name } => {
                    let library = tree.children(target)[0];
                    format!("{}.{name}", global_name(tree, analysis, library)?)
                }
                _ => return None,
            },
            _ => return None,
        };
        self.is_enabled(&function).then_some(function)
    }
}

/// Name of the global `id` reads, if it is never assigned by the program.
fn global_name<'a>(tree: &SyntaxTree, analysis: &'a ScopeAnalysis, id: NodeId) -> Option<&'a str> {
    if !matches!(tree.kind(id), NodeKind::Identifier(_)) {
        return None;
    }
    match analysis.resolve(Site::new(id, Slot::Identifier))? {
        Resolution::Global(name) if !analysis.is_global_assigned(name) => Some(name.as_str()),
        _ => None,
    }
}

fn dynamic_environment(analysis: &ScopeAnalysis) -> Option<(NodeId, &'static str)> {
    let dynamic = |name: &str| DYNAMIC_NAMES.iter().copied().find(|&candidate| candidate == name);
    analysis
        .resolutions()
        .find_map(|(site, resolution)| {
            let name = match resolution {
                Resolution::Global(name) => name.as_str(),
                Resolution::Local(binding) => analysis.binding(*binding).name.as_str(),
            };
            dynamic(name).map(|name| (site.node, name))
        })
        .or_else(|| {
            analysis
                .bindings()
                .iter()
                .find_map(|binding| dynamic(&binding.name).map(|name| (binding.declaration.node, name)))
        })
}

/// Constant values of the arguments, the receiver of a method call first.
fn arguments(tree: &SyntaxTree, call: NodeId) -> Option<Vec<LuaValue>> {
    let children = tree.children(call);
    let args = match tree.kind(call) {
        NodeKind::MethodCall { .. } => children,
        _ => &children[1..],
    };
    args.iter().map(|&arg| evaluate(tree, arg)).collect()
}

/// Result of calling `function` with `args`. `None` when the call would
/// raise an error, yield other than one value, or cannot be evaluated here.
fn call(function: &str, args: &[LuaValue]) -> Option<LuaValue> {
    let value = match function {
        "math.abs" => LuaValue::Number(match number(args, 0)? {
            NumberValue::Integer(value) => NumberValue::Integer(value.wrapping_abs()),
            NumberValue::Float(value) => NumberValue::Float(value.abs()),
        }),
        "math.ceil" => round(number(args, 0)?, f64::ceil),
        "math.floor" => round(number(args, 0)?, f64::floor),
        "math.fmod" => fmod(number(args, 0)?, number(args, 1)?)?,
        "math.max" => extreme(args, Ordering::Greater)?,
        "math.min" => extreme(args, Ordering::Less)?,
        "select" => match args.first()? {
            LuaValue::String(selector) if selector == b"#" => {
                LuaValue::integer(i64::try_from(args.len() - 1).ok()?)
            }
            _ => return None,
        },
        "string.byte" => {
            let text = string(args, 0)?;
            let first = optional_integer(args, 1, 1)?;
            let start = start_position(first, text.len())?;
            let end = end_position(optional_integer(args, 2, first)?, text.len())?;
            if start != end {
                return None;
            }
            LuaValue::integer(i64::from(text[start - 1]))
        }
        "string.char" => LuaValue::String(
            (0..args.len())
                .map(|index| u8::try_from(integer(args, index)?).ok())
                .collect::<Option<_>>()?,
        ),
        "string.len" => LuaValue::integer(i64::try_from(string(args, 0)?.len()).ok()?),
        "string.lower" => LuaValue::String(string(args, 0)?.to_ascii_lowercase()),
        "string.upper" => LuaValue::String(string(args, 0)?.to_ascii_uppercase()),
        "string.rep" => repeat(&string(args, 0)?, integer(args, 1)?, optional_string(args, 2)?)?,
        "string.reverse" => {
            let mut text = string(args, 0)?;
            text.reverse();
            LuaValue::String(text)
        }
        "string.sub" => {
            let text = string(args, 0)?;
            let start = start_position(integer(args, 1)?, text.len())?;
            let end = end_position(optional_integer(args, 2, -1)?, text.len())?;
            LuaValue::String(if start <= end {
                text[start - 1..end].to_vec()
            } else {
                Vec::new()
            })
        }
        "tonumber" => {
            if args.len() > 1 {
                return None;
            }
            match args.first()? {
                LuaValue::Number(number) => LuaValue::Number(*number),
                LuaValue::String(text) => parse_number(text)?,
                _ => LuaValue::Nil,
            }
        }
        "tostring" => LuaValue::String(args.first()?.to_lua_string()),
        "type" => LuaValue::String(args.first()?.type_name().as_bytes().to_vec()),
        _ => return None,
    };
    Some(value)
}

fn number(args: &[LuaValue], index: usize) -> Option<NumberValue> {
    match args.get(index)? {
        LuaValue::Number(number) => Some(*number),
        _ => None,
    }
}

fn integer(args: &[LuaValue], index: usize) -> Option<i64> {
    to_integer(number(args, index)?)
}

fn optional_integer(args: &[LuaValue], index: usize, default: i64) -> Option<i64> {
    match args.get(index) {
        None | Some(LuaValue::Nil) => Some(default),
        Some(_) => integer(args, index),
    }
}

/// A string argument; numbers are converted like Lua does.
fn string(args: &[LuaValue], index: usize) -> Option<Vec<u8>> {
    match args.get(index)? {
        LuaValue::String(text) => Some(text.clone()),
        LuaValue::Number(number) => Some(number_to_string(*number).into_bytes()),
        _ => None,
    }
}

fn optional_string(args: &[LuaValue], index: usize) -> Option<Vec<u8>> {
    match args.get(index) {
        None | Some(LuaValue::Nil) => Some(Vec::new()),
        Some(_) => string(args, index),
    }
}

/// `math.floor` and `math.ceil`: an integer when the result fits one.
fn round(number: NumberValue, rounding: fn(f64) -> f64) -> LuaValue {
    match number {
        NumberValue::Integer(value) => LuaValue::integer(value),
        NumberValue::Float(value) => {
            let rounded = rounding(value);
            match to_integer(NumberValue::Float(rounded)) {
                Some(integer) => LuaValue::integer(integer),
                None => LuaValue::float(rounded),
            }
        }
    }
}

fn fmod(a: NumberValue, b: NumberValue) -> Option<LuaValue> {
    match (a, b) {
        (NumberValue::Integer(_), NumberValue::Integer(0)) => None,
        (NumberValue::Integer(_), NumberValue::Integer(-1)) => Some(LuaValue::integer(0)),
        (NumberValue::Integer(a), NumberValue::Integer(b)) => Some(LuaValue::integer(a % b)),
        (a, b) => Some(LuaValue::float(to_float(a) % to_float(b))),
    }
}

/// `math.max` for `Ordering::Greater`, `math.min` for `Ordering::Less`. The
/// first extreme argument wins, keeping its subtype.
fn extreme(args: &[LuaValue], wanted: Ordering) -> Option<LuaValue> {
    let mut best = number(args, 0)?;
    for index in 1..args.len() {
        let candidate = number(args, index)?;
        if compare_numbers(candidate, best) == Some(wanted) {
            best = candidate;
        }
    }
    Some(LuaValue::Number(best))
}

fn repeat(text: &[u8], count: i64, separator: Vec<u8>) -> Option<LuaValue> {
    if count <= 0 {
        return Some(LuaValue::String(Vec::new()));
    }
    let count = usize::try_from(count).ok()?;
    let length = text
        .len()
        .checked_add(separator.len())?
        .checked_mul(count)?
        .saturating_sub(separator.len());
    if length > MAX_REPEAT_LENGTH {
        return None;
    }
    let mut result = Vec::with_capacity(length);
    for index in 0..count {
        if index > 0 {
            result.extend_from_slice(&separator);
        }
        result.extend_from_slice(text);
    }
    Some(LuaValue::String(result))
}

/// 1-based start position of a string range, clamped like `string.sub`.
/// Positions past the end clamp to `length + 1`, an empty range.
fn start_position(position: i64, length: usize) -> Option<usize> {
    let length = i64::try_from(length).ok()?;
    let start = match position {
        p if p > length => length + 1,
        p if p > 0 => p,
        0 => 1,
        p if p < -length => 1,
        p => length + p + 1,
    };
    usize::try_from(start).ok()
}

/// 1-based inclusive end position of a string range. Zero for an empty range.
fn end_position(position: i64, length: usize) -> Option<usize> {
    let length = i64::try_from(length).ok()?;
    let end = match position {
        p if p > length => length,
        p if p >= 0 => p,
        p if p < -length => 0,
        p => length + p + 1,
    };
    usize::try_from(end).ok()
}

/// `tonumber` on a string. `None` for forms this conversion does not
/// handle (hexadecimal floats), `Nil` for strings that are not numerals.
fn parse_number(text: &[u8]) -> Option<LuaValue> {
    let Ok(text) = std::str::from_utf8(text) else {
        return Some(LuaValue::Nil);
    };
    let text = text.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c'));
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    if let Some(digits) = unsigned.strip_prefix("0x").or_else(|| unsigned.strip_prefix("0X")) {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            let maybe_float = digits
                .bytes()
                .all(|b| b.is_ascii_hexdigit() || matches!(b, b'.' | b'p' | b'P' | b'+' | b'-'));
            return if maybe_float { None } else { Some(LuaValue::Nil) };
        }
        // Hexadecimal integers wrap around.
        let value = digits.bytes().fold(0u64, |value, digit| {
            let digit = char::from(digit).to_digit(16).unwrap_or_default();
            value.wrapping_mul(16).wrapping_add(u64::from(digit))
        }) as i64;
        return Some(LuaValue::integer(if negative { value.wrapping_neg() } else { value }));
    }

    let is_decimal = unsigned
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if unsigned.is_empty() || !is_decimal {
        return Some(LuaValue::Nil);
    }
    if unsigned.bytes().all(|b| b.is_ascii_digit())
        && let Ok(value) = text.parse::<i64>()
    {
        return Some(LuaValue::integer(value));
    }
    Some(match text.parse::<f64>() {
        Ok(value) => LuaValue::float(value),
        Err(_) => LuaValue::Nil,
    })
}
