//! Node kinds and the data they carry.
//!
//! A node's *kind* holds only the data that is not itself a node (names,
//! literal values, operators). Sub-expressions, statements and blocks are
//! children, stored in program order. The expected child layout of each kind
//! is documented on the variant and enforced by [`crate::layout`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Trivia;
use crate::span::Span;

/// Index of a node inside a [`crate::SyntaxTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw arena index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Broad grammatical category of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Block,
    Statement,
    Expression,
    TableEntry,
    FunctionBody,
}

impl Category {
    pub const fn name(self) -> &'static str {
        match self {
            Category::Block => "block",
            Category::Statement => "statement",
            Category::Expression => "expression",
            Category::TableEntry => "table entry",
            Category::FunctionBody => "function body",
        }
    }
}

/// Binary operators, from lowest to highest precedence group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Or,
    And,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
    BitOr,
    BitXor,
    BitAnd,
    ShiftLeft,
    ShiftRight,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

/// Binding power of unary operators.
pub const UNARY_PRIORITY: u8 = 12;

impl BinaryOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "~=",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "~",
            BinaryOp::BitAnd => "&",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
            BinaryOp::Concat => "..",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^",
        }
    }

    /// Left and right binding power, as in the reference Lua parser.
    /// Right-associative operators have a lower right power.
    pub const fn priority(self) -> (u8, u8) {
        match self {
            BinaryOp::Or => (1, 1),
            BinaryOp::And => (2, 2),
            BinaryOp::Less
            | BinaryOp::Greater
            | BinaryOp::LessEqual
            | BinaryOp::GreaterEqual
            | BinaryOp::Equal
            | BinaryOp::NotEqual => (3, 3),
            BinaryOp::BitOr => (4, 4),
            BinaryOp::BitXor => (5, 5),
            BinaryOp::BitAnd => (6, 6),
            BinaryOp::ShiftLeft | BinaryOp::ShiftRight => (7, 7),
            BinaryOp::Concat => (9, 8),
            BinaryOp::Add | BinaryOp::Sub => (10, 10),
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod => (11, 11),
            BinaryOp::Pow => (14, 13),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Minus,
    Length,
    BitNot,
}

impl UnaryOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Minus => "-",
            UnaryOp::Length => "#",
            UnaryOp::BitNot => "~",
        }
    }
}

/// Operators of compound assignments (`x += 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompoundOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    Concat,
}

impl CompoundOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            CompoundOp::Add => "+=",
            CompoundOp::Sub => "-=",
            CompoundOp::Mul => "*=",
            CompoundOp::Div => "/=",
            CompoundOp::FloorDiv => "//=",
            CompoundOp::Mod => "%=",
            CompoundOp::Pow => "^=",
            CompoundOp::Concat => "..=",
        }
    }

    /// The binary operator this assignment applies.
    pub const fn binary(self) -> BinaryOp {
        match self {
            CompoundOp::Add => BinaryOp::Add,
            CompoundOp::Sub => BinaryOp::Sub,
            CompoundOp::Mul => BinaryOp::Mul,
            CompoundOp::Div => BinaryOp::Div,
            CompoundOp::FloorDiv => BinaryOp::FloorDiv,
            CompoundOp::Mod => BinaryOp::Mod,
            CompoundOp::Pow => BinaryOp::Pow,
            CompoundOp::Concat => BinaryOp::Concat,
        }
    }
}

/// A Lua number: integers and floats are distinct subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NumberValue {
    Integer(i64),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberLiteral {
    pub value: NumberValue,
    /// Source text of the literal, reused when serializing an unmodified number.
    pub raw: Option<String>,
}

impl NumberLiteral {
    pub fn integer(value: i64) -> Self {
        Self {
            value: NumberValue::Integer(value),
            raw: None,
        }
    }

    pub fn float(value: f64) -> Self {
        Self {
            value: NumberValue::Float(value),
            raw: None,
        }
    }
}

/// How a string literal is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StringStyle {
    Double,
    Single,
    /// Long bracket string with the given number of `=` signs.
    Long {
        level: usize,
    },
    /// Every byte written as a `\xHH` escape.
    Escaped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringLiteral {
    /// Decoded bytes. Lua strings are byte strings, not necessarily UTF-8.
    pub value: Vec<u8>,
    /// Source text of the literal, including delimiters.
    pub raw: Option<String>,
    pub style: StringStyle,
}

impl StringLiteral {
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self {
            value: value.into(),
            raw: None,
            style: StringStyle::Double,
        }
    }

    /// Returns the value as UTF-8 text when it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.value).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Const,
    Close,
}

impl Attribute {
    pub const fn name(self) -> &'static str {
        match self {
            Attribute::Const => "const",
            Attribute::Close => "close",
        }
    }
}

/// A name declared by a `local` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalName {
    pub name: String,
    pub attribute: Option<Attribute>,
}

impl LocalName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute: None,
        }
    }
}

/// The name of a `function a.b.c:d()` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionName {
    pub base: String,
    pub fields: Vec<String>,
    pub method: Option<String>,
}

impl FunctionName {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            fields: Vec::new(),
            method: None,
        }
    }
}

/// Argument syntax of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallArgs {
    /// `f(a, b)`
    Parenthesized,
    /// `f "s"`; exactly one string argument.
    String,
    /// `f { ... }`; exactly one table argument.
    Table,
}

/// The kind of a node and its non-node data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// `[statements..]`
    Block,

    /// `local a, b <const> = values..` → `[values..]`
    LocalAssign { names: Vec<LocalName> },
    /// `targets.. = values..` → `[targets.., values..]`
    Assign { targets: usize },
    /// `target op= value` → `[target, value]`
    CompoundAssign { op: CompoundOp },
    /// `[call]`
    CallStatement,
    /// `[block]`
    Do,
    /// `[condition, block]`
    While,
    /// `[block, condition]`
    Repeat,
    /// `[condition, block, (condition, block)*, else_block?]`
    If,
    /// `[start, end, step?, block]`
    NumericFor { var: String },
    /// `[expressions.., block]`
    GenericFor { names: Vec<String> },
    /// `[function_body]`
    FunctionDeclaration { name: FunctionName },
    /// `[function_body]`
    LocalFunction { name: String },
    Goto { label: String },
    Label { name: String },
    /// `[values..]`
    Return,
    Break,
    Continue,

    Nil,
    True,
    False,
    VarArgs,
    Number(NumberLiteral),
    String(StringLiteral),
    Identifier(String),
    /// `prefix.name` → `[prefix]`
    Field { name: String },
    /// `prefix[key]` → `[prefix, key]`
    Index,
    /// `[callee, arguments..]`
    Call { args: CallArgs },
    /// `receiver:method(arguments..)` → `[receiver, arguments..]`
    MethodCall { method: String, args: CallArgs },
    /// `[function_body]`
    Function,
    /// `[left, right]`
    Binary { op: BinaryOp },
    /// `[operand]`
    Unary { op: UnaryOp },
    /// `[expression]`
    Paren,
    /// `[entries..]`
    Table,
    /// `[condition, value, (condition, value)*, else_value]`
    IfExpression,

    /// `[value]`
    TableValue,
    /// `name = value` → `[value]`
    TableField { name: String },
    /// `[key] = value` → `[key, value]`
    TableIndex,

    /// `(params, ...) block end` → `[block]`
    FunctionBody { params: Vec<String>, is_variadic: bool },
}

impl NodeKind {
    pub fn category(&self) -> Category {
        match self {
            NodeKind::Block => Category::Block,
            NodeKind::LocalAssign { .. }
            | NodeKind::Assign { .. }
            | NodeKind::CompoundAssign { .. }
            | NodeKind::CallStatement
            | NodeKind::Do
            | NodeKind::While
            | NodeKind::Repeat
            | NodeKind::If
            | NodeKind::NumericFor { .. }
            | NodeKind::GenericFor { .. }
            | NodeKind::FunctionDeclaration { .. }
            | NodeKind::LocalFunction { .. }
            | NodeKind::Goto { .. }
            | NodeKind::Label { .. }
            | NodeKind::Return
            | NodeKind::Break
            | NodeKind::Continue => Category::Statement,
            NodeKind::TableValue | NodeKind::TableField { .. } | NodeKind::TableIndex => {
                Category::TableEntry
            }
            NodeKind::FunctionBody { .. } => Category::FunctionBody,
            _ => Category::Expression,
        }
    }

    /// Expressions that may be called, indexed or used as statement heads.
    pub fn is_prefix_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::Identifier(_)
                | NodeKind::Field { .. }
                | NodeKind::Index
                | NodeKind::Call { .. }
                | NodeKind::MethodCall { .. }
                | NodeKind::Paren
        )
    }

    /// Expressions that may appear on the left of an assignment.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            NodeKind::Identifier(_) | NodeKind::Field { .. } | NodeKind::Index
        )
    }

    pub fn is_call(&self) -> bool {
        matches!(self, NodeKind::Call { .. } | NodeKind::MethodCall { .. })
    }

    /// Expressions that can produce more than one value.
    pub fn is_multi_value(&self) -> bool {
        self.is_call() || matches!(self, NodeKind::VarArgs)
    }

    /// Literal constants.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            NodeKind::Nil
                | NodeKind::True
                | NodeKind::False
                | NodeKind::Number(_)
                | NodeKind::String(_)
        )
    }

    /// Human readable name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Block => "block",
            NodeKind::LocalAssign { .. } => "local assignment",
            NodeKind::Assign { .. } => "assignment",
            NodeKind::CompoundAssign { .. } => "compound assignment",
            NodeKind::CallStatement => "call statement",
            NodeKind::Do => "do statement",
            NodeKind::While => "while loop",
            NodeKind::Repeat => "repeat loop",
            NodeKind::If => "if statement",
            NodeKind::NumericFor { .. } => "numeric for loop",
            NodeKind::GenericFor { .. } => "generic for loop",
            NodeKind::FunctionDeclaration { .. } => "function declaration",
            NodeKind::LocalFunction { .. } => "local function",
            NodeKind::Goto { .. } => "goto statement",
            NodeKind::Label { .. } => "label",
            NodeKind::Return => "return statement",
            NodeKind::Break => "break statement",
            NodeKind::Continue => "continue statement",
            NodeKind::Nil => "nil",
            NodeKind::True | NodeKind::False => "boolean",
            NodeKind::VarArgs => "variadic expression",
            NodeKind::Number(_) => "number",
            NodeKind::String(_) => "string",
            NodeKind::Identifier(_) => "identifier",
            NodeKind::Field { .. } => "field access",
            NodeKind::Index => "index expression",
            NodeKind::Call { .. } => "call",
            NodeKind::MethodCall { .. } => "method call",
            NodeKind::Function => "function expression",
            NodeKind::Binary { .. } => "binary expression",
            NodeKind::Unary { .. } => "unary expression",
            NodeKind::Paren => "parenthesized expression",
            NodeKind::Table => "table constructor",
            NodeKind::IfExpression => "if expression",
            NodeKind::TableValue | NodeKind::TableField { .. } | NodeKind::TableIndex => {
                "table entry"
            }
            NodeKind::FunctionBody { .. } => "function body",
        }
    }
}

/// A node stored in the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) span: Option<Span>,
    pub(crate) trivia: Trivia,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, children: Vec<NodeId>, span: Option<Span>) -> Self {
        Self {
            kind,
            children,
            parent: None,
            span,
            trivia: Trivia::default(),
        }
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Weak back-reference to the parent, for traversal only.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Source span, when the node came from the parser.
    #[inline]
    pub fn span(&self) -> Option<Span> {
        self.span
    }

    #[inline]
    pub fn trivia(&self) -> &Trivia {
        &self.trivia
    }
}
