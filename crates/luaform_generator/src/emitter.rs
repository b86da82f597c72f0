//! Walks a syntax tree and writes its tokens to a sink.

use luaform_ast::{
    BinaryOp, CallArgs, FunctionName, LocalName, NodeId, NodeKind, SyntaxTree, TriviaPiece,
    UNARY_PRIORITY, UnaryOp,
};

use crate::literal::{number_tokens, string_text};
use crate::sink::TokenSink;

/// Side of a binary operator an operand sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

pub(crate) struct Emitter<'a, S> {
    tree: &'a SyntaxTree,
    sink: S,
}

impl<'a, S: TokenSink> Emitter<'a, S> {
    pub(crate) fn new(tree: &'a SyntaxTree, sink: S) -> Self {
        Self { tree, sink }
    }

    /// Emits the whole program and returns the text.
    pub(crate) fn emit(mut self) -> String {
        let root = self.tree.root();
        self.statements(root);
        self.block_comments(root);
        self.sink.finish()
    }

    fn word(&mut self, text: &str) {
        self.sink.token(text, true);
    }

    fn statements(&mut self, block: NodeId) {
        let tree = self.tree;
        let statements = tree.children(block);
        for (i, &statement) in statements.iter().enumerate() {
            if i > 0 {
                self.sink.line();
            }
            self.leading_comments(statement, i == 0);
            self.statement(statement);
            // `a = b` followed by `(f)()` would read as the call `b(f)()`.
            if statements
                .get(i + 1)
                .is_some_and(|&next| starts_with_paren(tree, next))
            {
                self.word(";");
            }
            self.trailing_comments(statement);
        }
    }

    fn leading_comments(&mut self, statement: NodeId, first: bool) {
        if !self.sink.keeps_comments() {
            return;
        }
        let tree = self.tree;
        let mut printed = false;
        for piece in &tree.trivia(statement).leading {
            match piece {
                TriviaPiece::BlankLine => {
                    if !first || printed {
                        self.sink.blank_line();
                    }
                }
                TriviaPiece::LineComment(text) | TriviaPiece::BlockComment(text) => {
                    self.sink.comment(text);
                    self.sink.line();
                    printed = true;
                }
            }
        }
    }

    fn trailing_comments(&mut self, statement: NodeId) {
        if !self.sink.keeps_comments() {
            return;
        }
        let tree = self.tree;
        for piece in &tree.trivia(statement).trailing {
            if let TriviaPiece::LineComment(text) | TriviaPiece::BlockComment(text) = piece {
                self.sink.space();
                self.sink.comment(text);
            }
        }
    }

    /// Comments kept at the end of a block, before its closing keyword.
    fn block_comments(&mut self, block: NodeId) {
        if !self.sink.keeps_comments() {
            return;
        }
        let tree = self.tree;
        let mut blank = false;
        for piece in &tree.trivia(block).trailing {
            match piece {
                TriviaPiece::BlankLine => blank = true,
                TriviaPiece::LineComment(text) | TriviaPiece::BlockComment(text) => {
                    if blank {
                        self.sink.blank_line();
                        blank = false;
                    } else {
                        self.sink.line();
                    }
                    self.sink.comment(text);
                }
            }
        }
    }

    fn has_content(&self, block: NodeId) -> bool {
        !self.tree.children(block).is_empty()
            || (self.sink.keeps_comments()
                && self
                    .tree
                    .trivia(block)
                    .trailing
                    .iter()
                    .any(TriviaPiece::is_comment))
    }

    /// Body of a compound statement, up to (not including) its closing word.
    fn body(&mut self, block: NodeId) {
        if !self.has_content(block) {
            self.sink.space();
            return;
        }
        self.sink.indent();
        self.sink.line();
        self.statements(block);
        self.block_comments(block);
        self.sink.dedent();
        self.sink.line();
    }

    fn statement(&mut self, id: NodeId) {
        let tree = self.tree;
        let children = tree.children(id);
        match tree.kind(id) {
            NodeKind::LocalAssign { names } => {
                self.word("local");
                self.sink.space();
                self.local_names(names);
                if !children.is_empty() {
                    self.assign_values(children);
                }
            }
            NodeKind::Assign { targets } => {
                let (targets, values) = children.split_at((*targets).min(children.len()));
                self.expression_list(targets);
                self.assign_values(values);
            }
            NodeKind::CompoundAssign { op } => {
                if let [target, value] = children {
                    self.expression(*target);
                    self.sink.space();
                    self.word(op.symbol());
                    self.sink.space();
                    self.expression(*value);
                }
            }
            NodeKind::CallStatement => self.expression_list(children),
            NodeKind::Do => {
                self.word("do");
                self.blocks(children);
                self.word("end");
            }
            NodeKind::While => {
                if let [condition, block] = children {
                    self.word("while");
                    self.sink.space();
                    self.expression(*condition);
                    self.sink.space();
                    self.word("do");
                    self.body(*block);
                    self.word("end");
                }
            }
            NodeKind::Repeat => {
                if let [block, condition] = children {
                    self.word("repeat");
                    self.body(*block);
                    self.word("until");
                    self.sink.space();
                    self.expression(*condition);
                }
            }
            NodeKind::If => self.if_statement(children),
            NodeKind::NumericFor { var } => {
                if let Some((block, bounds)) = children.split_last() {
                    self.word("for");
                    self.sink.space();
                    self.word(var);
                    self.assign_values(bounds);
                    self.sink.space();
                    self.word("do");
                    self.body(*block);
                    self.word("end");
                }
            }
            NodeKind::GenericFor { names } => {
                if let Some((block, iterators)) = children.split_last() {
                    self.word("for");
                    self.sink.space();
                    self.name_list(names);
                    self.sink.space();
                    self.word("in");
                    self.sink.space();
                    self.expression_list(iterators);
                    self.sink.space();
                    self.word("do");
                    self.body(*block);
                    self.word("end");
                }
            }
            NodeKind::FunctionDeclaration { name } => {
                self.word("function");
                self.sink.space();
                self.function_name(name);
                self.function_bodies(children);
            }
            NodeKind::LocalFunction { name } => {
                self.word("local");
                self.sink.space();
                self.word("function");
                self.sink.space();
                self.word(name);
                self.function_bodies(children);
            }
            NodeKind::Goto { label } => {
                self.word("goto");
                self.sink.space();
                self.word(label);
            }
            NodeKind::Label { name } => {
                self.word("::");
                self.word(name);
                self.word("::");
            }
            NodeKind::Break => self.word("break"),
            NodeKind::Continue => self.word("continue"),
            NodeKind::Return => {
                self.word("return");
                if !children.is_empty() {
                    self.sink.space();
                    self.expression_list(children);
                }
            }
            _ => self.expression(id),
        }
    }

    fn blocks(&mut self, blocks: &[NodeId]) {
        for &block in blocks {
            self.body(block);
        }
    }

    fn if_statement(&mut self, children: &[NodeId]) {
        for (i, pair) in children.chunks(2).enumerate() {
            match pair {
                [condition, block] => {
                    self.word(if i == 0 { "if" } else { "elseif" });
                    self.sink.space();
                    self.expression(*condition);
                    self.sink.space();
                    self.word("then");
                    self.body(*block);
                }
                [otherwise] => {
                    self.word("else");
                    self.body(*otherwise);
                }
                _ => {}
            }
        }
        self.word("end");
    }

    fn assign_values(&mut self, values: &[NodeId]) {
        self.sink.space();
        self.word("=");
        self.sink.space();
        self.expression_list(values);
    }

    fn local_names(&mut self, names: &[LocalName]) {
        for (i, local) in names.iter().enumerate() {
            if i > 0 {
                self.comma();
            }
            self.word(&local.name);
            if let Some(attribute) = local.attribute {
                self.sink.space();
                self.word("<");
                self.word(attribute.name());
                self.word(">");
            }
        }
    }

    fn name_list(&mut self, names: &[String]) {
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                self.comma();
            }
            self.word(name);
        }
    }

    fn function_name(&mut self, name: &FunctionName) {
        self.word(&name.base);
        for field in &name.fields {
            self.word(".");
            self.word(field);
        }
        if let Some(method) = &name.method {
            self.word(":");
            self.word(method);
        }
    }

    fn function_bodies(&mut self, children: &[NodeId]) {
        for &body in children {
            self.function_body(body);
        }
    }

    fn function_body(&mut self, id: NodeId) {
        let tree = self.tree;
        let NodeKind::FunctionBody {
            params,
            is_variadic,
        } = tree.kind(id)
        else {
            return;
        };
        self.sink.token("(", false);
        self.name_list(params);
        if *is_variadic {
            if !params.is_empty() {
                self.comma();
            }
            self.word("...");
        }
        self.word(")");
        self.blocks(tree.children(id));
        self.word("end");
    }

    fn comma(&mut self) {
        self.word(",");
        self.sink.space();
    }

    fn expression_list(&mut self, expressions: &[NodeId]) {
        for (i, &expression) in expressions.iter().enumerate() {
            if i > 0 {
                self.comma();
            }
            self.expression(expression);
        }
    }

    fn expression(&mut self, id: NodeId) {
        let tree = self.tree;
        let children = tree.children(id);
        match tree.kind(id) {
            NodeKind::Nil => self.word("nil"),
            NodeKind::True => self.word("true"),
            NodeKind::False => self.word("false"),
            NodeKind::VarArgs => self.word("..."),
            NodeKind::Number(number) => match &number.raw {
                Some(raw) => self.word(raw),
                None => {
                    for token in number_tokens(number.value) {
                        self.word(&token);
                    }
                }
            },
            NodeKind::String(string) => self.word(&string_text(string)),
            NodeKind::Identifier(name) => self.word(name),
            NodeKind::Field { name } => {
                self.expression_list(children);
                self.word(".");
                self.word(name);
            }
            NodeKind::Index => {
                if let [prefix, key] = children {
                    self.expression(*prefix);
                    self.word("[");
                    self.expression(*key);
                    self.word("]");
                }
            }
            NodeKind::Call { args } => {
                if let Some((callee, arguments)) = children.split_first() {
                    self.expression(*callee);
                    self.arguments(*args, arguments);
                }
            }
            NodeKind::MethodCall { method, args } => {
                if let Some((receiver, arguments)) = children.split_first() {
                    self.expression(*receiver);
                    self.word(":");
                    self.word(method);
                    self.arguments(*args, arguments);
                }
            }
            NodeKind::Function => {
                self.word("function");
                self.function_bodies(children);
            }
            NodeKind::Binary { op } => {
                if let [left, right] = children {
                    self.operand(*left, *op, Side::Left);
                    self.sink.space();
                    self.word(op.symbol());
                    self.sink.space();
                    self.operand(*right, *op, Side::Right);
                }
            }
            NodeKind::Unary { op } => {
                self.word(op.symbol());
                if *op == UnaryOp::Not {
                    self.sink.space();
                }
                for &operand in children {
                    self.parenthesized_if(operand, unary_operand_needs_parens(tree.kind(operand)));
                }
            }
            NodeKind::Paren => {
                self.word("(");
                self.expression_list(children);
                self.word(")");
            }
            NodeKind::Table => self.table(children),
            NodeKind::IfExpression => {
                for (i, pair) in children.chunks(2).enumerate() {
                    match pair {
                        [condition, value] => {
                            self.word(if i == 0 { "if" } else { "elseif" });
                            self.sink.space();
                            self.expression(*condition);
                            self.sink.space();
                            self.word("then");
                            self.sink.space();
                            self.expression(*value);
                            self.sink.space();
                        }
                        [otherwise] => {
                            self.word("else");
                            self.sink.space();
                            self.expression(*otherwise);
                        }
                        _ => {}
                    }
                }
            }
            NodeKind::TableValue => self.expression_list(children),
            NodeKind::TableField { name } => {
                self.word(name);
                self.assign_values(children);
            }
            NodeKind::TableIndex => {
                if let [key, value] = children {
                    self.word("[");
                    self.expression(*key);
                    self.word("]");
                    self.assign_values(std::slice::from_ref(value));
                }
            }
            NodeKind::FunctionBody { .. } => self.function_body(id),
            NodeKind::Block => self.statements(id),
            _ => self.statement(id),
        }
    }

    fn operand(&mut self, id: NodeId, parent: BinaryOp, side: Side) {
        let needs_parens = operand_needs_parens(self.tree.kind(id), parent, side);
        self.parenthesized_if(id, needs_parens);
    }

    fn parenthesized_if(&mut self, id: NodeId, parens: bool) {
        if parens {
            self.word("(");
            self.expression(id);
            self.word(")");
        } else {
            self.expression(id);
        }
    }

    fn arguments(&mut self, style: CallArgs, arguments: &[NodeId]) {
        match style {
            CallArgs::Parenthesized => {
                self.sink.token("(", false);
                self.expression_list(arguments);
                self.word(")");
            }
            CallArgs::String | CallArgs::Table => {
                self.sink.space();
                self.expression_list(arguments);
            }
        }
    }

    fn table(&mut self, entries: &[NodeId]) {
        self.word("{");
        self.expression_list(entries);
        self.word("}");
    }
}

fn operand_needs_parens(operand: &NodeKind, parent: BinaryOp, side: Side) -> bool {
    let (parent_left, parent_right) = parent.priority();
    match operand {
        NodeKind::IfExpression => true,
        NodeKind::Binary { op } => {
            let (left, right) = op.priority();
            match side {
                Side::Left => parent_left > right,
                Side::Right => left <= parent_right,
            }
        }
        NodeKind::Unary { .. } => side == Side::Left && parent_left > UNARY_PRIORITY,
        _ => false,
    }
}

fn unary_operand_needs_parens(operand: &NodeKind) -> bool {
    match operand {
        NodeKind::IfExpression => true,
        NodeKind::Binary { op } => op.priority().0 <= UNARY_PRIORITY,
        _ => false,
    }
}

/// Returns true if the statement's first token is `(`.
fn starts_with_paren(tree: &SyntaxTree, statement: NodeId) -> bool {
    let mut current = match tree.kind(statement) {
        NodeKind::CallStatement | NodeKind::Assign { .. } | NodeKind::CompoundAssign { .. } => {
            tree.child(statement, 0)
        }
        _ => None,
    };
    while let Some(id) = current {
        match tree.kind(id) {
            NodeKind::Paren => return true,
            NodeKind::Call { .. }
            | NodeKind::MethodCall { .. }
            | NodeKind::Field { .. }
            | NodeKind::Index => current = tree.child(id, 0),
            _ => return false,
        }
    }
    false
}
