//! Recursive-descent parser producing a [`SyntaxTree`].

use luaform_ast::{
    Attribute, BinaryOp, CallArgs, FunctionName, LocalName, NodeId, NodeKind, Span,
    SyntaxTree, TriviaPiece, UNARY_PRIORITY, UnaryOp,
};
use tracing::debug;

use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

type Result<T> = std::result::Result<T, ParseError>;

/// Default limit for nested blocks and expressions.
pub const DEFAULT_MAX_DEPTH: usize = 200;

/// Default limit for the size of a source text, in bytes.
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 10 * 1024 * 1024;

/// Parser settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Maximum nesting of blocks and expressions.
    pub max_depth: usize,
    /// Maximum source size in bytes.
    pub max_source_bytes: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
        }
    }
}

/// Per-function parsing state.
struct FunctionScope {
    is_variadic: bool,
    loops: usize,
}

/// Parses one source text. A parser is consumed by [`Parser::parse`].
pub(crate) struct Parser<'a> {
    lexer: Lexer<'a>,
    token: Token,
    next: Option<Token>,
    prev_end: u32,
    tree: SyntaxTree,
    options: ParserOptions,
    depth: usize,
    /// Trivia collected for the statements currently being parsed.
    trivia: Vec<Vec<TriviaPiece>>,
    functions: Vec<FunctionScope>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(source: &'a str, options: ParserOptions) -> Self {
        Self {
            lexer: Lexer::new(source),
            token: Token {
                kind: TokenKind::Eof,
                span: Span::new(0, 0),
                leading: Vec::new(),
                trailing: Vec::new(),
            },
            next: None,
            prev_end: 0,
            tree: SyntaxTree::new(),
            options,
            depth: 0,
            trivia: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Parses the whole source as a chunk.
    pub(crate) fn parse(mut self) -> Result<SyntaxTree> {
        self.token = self.lexer.next_token()?;
        // The main chunk is a vararg function.
        self.functions.push(FunctionScope {
            is_variadic: true,
            loops: 0,
        });

        let block = self.block()?;
        if self.token.kind != TokenKind::Eof {
            return Err(self.error_near("'<eof>' expected"));
        }
        self.tree.set_root(block)?;

        debug!(nodes = self.tree.len(), "parsed source");
        Ok(self.tree)
    }

    fn bump(&mut self) -> Result<Token> {
        let next = match self.next.take() {
            Some(token) => token,
            None => self.lexer.next_token()?,
        };
        let mut token = std::mem::replace(&mut self.token, next);
        self.prev_end = token.span.end;
        if let Some(collected) = self.trivia.last_mut() {
            collected.append(&mut token.leading);
            collected.append(&mut token.trailing);
        }
        Ok(token)
    }

    fn peek_next(&mut self) -> Result<&TokenKind> {
        let next = match self.next.take() {
            Some(token) => token,
            None => self.lexer.next_token()?,
        };
        Ok(&self.next.insert(next).kind)
    }

    #[inline]
    fn at(&self, kind: &TokenKind) -> bool {
        &self.token.kind == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> Result<bool> {
        if self.at(kind) {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<()> {
        if self.at(&kind) {
            self.bump()?;
            Ok(())
        } else {
            Err(self.error_near(format!("{} expected", kind.describe())))
        }
    }

    /// Expects the token closing a construct opened by `opener`.
    fn expect_closing(&mut self, kind: TokenKind, opener: &str) -> Result<()> {
        if self.at(&kind) {
            self.bump()?;
            Ok(())
        } else {
            Err(self.error_near(format!(
                "{} expected (to close '{opener}')",
                kind.describe()
            )))
        }
    }

    fn error_near(&self, message: impl std::fmt::Display) -> ParseError {
        ParseError::invalid_source_at(
            format!("{message} near {}", self.token.kind.describe()),
            self.token.span.start as usize,
        )
    }

    fn name(&mut self) -> Result<String> {
        if let TokenKind::Name(name) = &self.token.kind {
            let name = name.clone();
            self.bump()?;
            Ok(name)
        } else {
            Err(self.error_near("<name> expected"))
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(ParseError::TooDeep {
                limit: self.options.max_depth,
                offset: self.token.span.start as usize,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Undoes the `enter` calls made for nodes folded onto a chain.
    fn leave_chain(&mut self, links: usize) {
        self.depth -= links;
    }

    fn node(&mut self, kind: NodeKind, children: Vec<NodeId>, start: u32) -> Result<NodeId> {
        let span = Span::new(start, self.prev_end.max(start));
        Ok(self.tree.alloc_spanned(kind, children, span)?)
    }

    fn in_vararg_function(&self) -> bool {
        self.functions.last().is_some_and(|scope| scope.is_variadic)
    }

    fn in_loop(&self) -> bool {
        self.functions.last().is_some_and(|scope| scope.loops > 0)
    }

    fn adjust_loops(&mut self, enter: bool) {
        if let Some(scope) = self.functions.last_mut() {
            if enter {
                scope.loops += 1;
            } else {
                scope.loops -= 1;
            }
        }
    }

    fn block_follows(&self) -> bool {
        matches!(
            self.token.kind,
            TokenKind::End | TokenKind::Else | TokenKind::Elseif | TokenKind::Until | TokenKind::Eof
        )
    }

    fn block(&mut self) -> Result<NodeId> {
        self.enter()?;
        let start = self.token.span.start;
        let mut statements = Vec::new();
        let mut pending = Vec::new();

        while !self.block_follows() {
            if self.at(&TokenKind::Semicolon) {
                pending.append(&mut self.token.leading);
                pending.append(&mut self.token.trailing);
                self.bump()?;
                continue;
            }
            let is_return = self.at(&TokenKind::Return);
            let statement = self.statement(std::mem::take(&mut pending))?;
            statements.push(statement);
            if is_return {
                break;
            }
        }

        let mut trailing = pending;
        trailing.append(&mut self.token.leading);
        let block = self.node(NodeKind::Block, statements, start)?;
        self.tree.trivia_mut(block).trailing = trailing;
        self.leave();
        Ok(block)
    }

    fn statement(&mut self, mut leading: Vec<TriviaPiece>) -> Result<NodeId> {
        leading.append(&mut self.token.leading);
        let start = self.token.span.start;
        let is_return = self.at(&TokenKind::Return);

        self.trivia.push(Vec::new());
        let result = self.statement_kind(start).and_then(|id| {
            if !is_return {
                self.eat(&TokenKind::Semicolon)?;
            }
            Ok(id)
        });
        let mut trailing = self.trivia.pop().unwrap_or_default();
        let id = result?;

        trailing.retain(TriviaPiece::is_comment);
        let trivia = self.tree.trivia_mut(id);
        trivia.leading = leading;
        trivia.trailing = trailing;
        Ok(id)
    }

    fn statement_kind(&mut self, start: u32) -> Result<NodeId> {
        let is_continue = matches!(&self.token.kind, TokenKind::Name(name) if name == "continue")
            && self.continue_follows()?;
        if is_continue {
            self.bump()?;
            self.check_in_loop("continue", start)?;
            return self.node(NodeKind::Continue, vec![], start);
        }

        match self.token.kind {
            TokenKind::If => self.if_statement(start),
            TokenKind::While => self.while_statement(start),
            TokenKind::Do => {
                self.bump()?;
                let body = self.block()?;
                self.expect_closing(TokenKind::End, "do")?;
                self.node(NodeKind::Do, vec![body], start)
            }
            TokenKind::For => self.for_statement(start),
            TokenKind::Repeat => self.repeat_statement(start),
            TokenKind::Function => self.function_declaration(start),
            TokenKind::Local => {
                self.bump()?;
                if self.eat(&TokenKind::Function)? {
                    let name = self.name()?;
                    let body = self.function_body()?;
                    self.node(NodeKind::LocalFunction { name }, vec![body], start)
                } else {
                    self.local_assign(start)
                }
            }
            TokenKind::DoubleColon => {
                self.bump()?;
                let name = self.name()?;
                self.expect(TokenKind::DoubleColon)?;
                self.node(NodeKind::Label { name }, vec![], start)
            }
            TokenKind::Return => self.return_statement(start),
            TokenKind::Break => {
                self.bump()?;
                self.check_in_loop("break", start)?;
                self.node(NodeKind::Break, vec![], start)
            }
            TokenKind::Goto => {
                self.bump()?;
                let label = self.name()?;
                self.node(NodeKind::Goto { label }, vec![], start)
            }
            _ => self.expression_statement(start),
        }
    }

    /// `continue` is a statement unless the name is used as a variable.
    fn continue_follows(&mut self) -> Result<bool> {
        Ok(!matches!(
            self.peek_next()?,
            TokenKind::LeftParen
                | TokenKind::Dot
                | TokenKind::LeftBracket
                | TokenKind::Colon
                | TokenKind::LeftBrace
                | TokenKind::String(_)
                | TokenKind::Assign
                | TokenKind::Comma
                | TokenKind::CompoundAssign(_)
        ))
    }

    fn check_in_loop(&self, what: &str, start: u32) -> Result<()> {
        if !self.in_loop() {
            return Err(ParseError::invalid_source_at(
                format!("{what} outside a loop"),
                start as usize,
            ));
        }
        Ok(())
    }

    fn loop_body(&mut self) -> Result<NodeId> {
        self.adjust_loops(true);
        let body = self.block();
        self.adjust_loops(false);
        body
    }

    fn if_statement(&mut self, start: u32) -> Result<NodeId> {
        self.bump()?;
        let mut children = Vec::new();
        let condition = self.expression()?;
        self.expect(TokenKind::Then)?;
        let block = self.block()?;
        children.extend([condition, block]);

        loop {
            match self.token.kind {
                TokenKind::Elseif => {
                    self.bump()?;
                    let condition = self.expression()?;
                    self.expect(TokenKind::Then)?;
                    let block = self.block()?;
                    children.extend([condition, block]);
                }
                TokenKind::Else => {
                    self.bump()?;
                    children.push(self.block()?);
                    self.expect_closing(TokenKind::End, "if")?;
                    break;
                }
                _ => {
                    self.expect_closing(TokenKind::End, "if")?;
                    break;
                }
            }
        }
        self.node(NodeKind::If, children, start)
    }

    fn while_statement(&mut self, start: u32) -> Result<NodeId> {
        self.bump()?;
        let condition = self.expression()?;
        self.expect(TokenKind::Do)?;
        let body = self.loop_body()?;
        self.expect_closing(TokenKind::End, "while")?;
        self.node(NodeKind::While, vec![condition, body], start)
    }

    fn repeat_statement(&mut self, start: u32) -> Result<NodeId> {
        self.bump()?;
        let body = self.loop_body()?;
        self.expect_closing(TokenKind::Until, "repeat")?;
        let condition = self.expression()?;
        self.node(NodeKind::Repeat, vec![body, condition], start)
    }

    fn for_statement(&mut self, start: u32) -> Result<NodeId> {
        self.bump()?;
        let first = self.name()?;

        if self.eat(&TokenKind::Assign)? {
            let mut children = vec![self.expression()?];
            self.expect(TokenKind::Comma)?;
            children.push(self.expression()?);
            if self.eat(&TokenKind::Comma)? {
                children.push(self.expression()?);
            }
            self.expect(TokenKind::Do)?;
            children.push(self.loop_body()?);
            self.expect_closing(TokenKind::End, "for")?;
            return self.node(NodeKind::NumericFor { var: first }, children, start);
        }

        if !self.at(&TokenKind::Comma) && !self.at(&TokenKind::In) {
            return Err(self.error_near("'=' or 'in' expected"));
        }
        let mut names = vec![first];
        while self.eat(&TokenKind::Comma)? {
            names.push(self.name()?);
        }
        self.expect(TokenKind::In)?;
        let mut children = self.expression_list()?;
        self.expect(TokenKind::Do)?;
        children.push(self.loop_body()?);
        self.expect_closing(TokenKind::End, "for")?;
        self.node(NodeKind::GenericFor { names }, children, start)
    }

    fn function_declaration(&mut self, start: u32) -> Result<NodeId> {
        self.bump()?;
        let mut name = FunctionName::new(self.name()?);
        while self.eat(&TokenKind::Dot)? {
            name.fields.push(self.name()?);
        }
        if self.eat(&TokenKind::Colon)? {
            name.method = Some(self.name()?);
        }
        let body = self.function_body()?;
        self.node(NodeKind::FunctionDeclaration { name }, vec![body], start)
    }

    fn function_body(&mut self) -> Result<NodeId> {
        let start = self.token.span.start;
        self.expect(TokenKind::LeftParen)?;
        let mut params = Vec::new();
        let mut is_variadic = false;
        if !self.at(&TokenKind::RightParen) {
            loop {
                if self.eat(&TokenKind::TripleDot)? {
                    is_variadic = true;
                    break;
                }
                params.push(self.name()?);
                if !self.eat(&TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen)?;

        self.functions.push(FunctionScope {
            is_variadic,
            loops: 0,
        });
        let block = self.block();
        self.functions.pop();
        let block = block?;
        self.expect_closing(TokenKind::End, "function")?;
        self.node(NodeKind::FunctionBody { params, is_variadic }, vec![block], start)
    }

    fn local_assign(&mut self, start: u32) -> Result<NodeId> {
        let mut names = Vec::new();
        let mut has_close = false;
        loop {
            let mut local = LocalName::new(self.name()?);
            if self.at(&TokenKind::Less) {
                let attribute_start = self.token.span.start as usize;
                self.bump()?;
                let attribute = self.name()?;
                self.expect(TokenKind::Greater)?;
                local.attribute = Some(match attribute.as_str() {
                    "const" => Attribute::Const,
                    "close" if has_close => {
                        return Err(ParseError::invalid_source_at(
                            "multiple to-be-closed variables in local list",
                            attribute_start,
                        ));
                    }
                    "close" => {
                        has_close = true;
                        Attribute::Close
                    }
                    other => {
                        return Err(ParseError::invalid_source_at(
                            format!("unknown attribute '{other}'"),
                            attribute_start,
                        ));
                    }
                });
            }
            names.push(local);
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        let values = if self.eat(&TokenKind::Assign)? {
            self.expression_list()?
        } else {
            Vec::new()
        };
        self.node(NodeKind::LocalAssign { names }, values, start)
    }

    fn return_statement(&mut self, start: u32) -> Result<NodeId> {
        self.bump()?;
        let values = if self.block_follows() || self.at(&TokenKind::Semicolon) {
            Vec::new()
        } else {
            self.expression_list()?
        };
        self.eat(&TokenKind::Semicolon)?;
        self.node(NodeKind::Return, values, start)
    }

    fn expression_statement(&mut self, start: u32) -> Result<NodeId> {
        let first = self.suffixed_expression()?;

        if self.at(&TokenKind::Assign) || self.at(&TokenKind::Comma) {
            let mut targets = vec![first];
            while self.eat(&TokenKind::Comma)? {
                targets.push(self.suffixed_expression()?);
            }
            for &target in &targets {
                self.check_assignable(target)?;
            }
            self.expect(TokenKind::Assign)?;
            let count = targets.len();
            let mut children = targets;
            children.extend(self.expression_list()?);
            return self.node(NodeKind::Assign { targets: count }, children, start);
        }

        if let TokenKind::CompoundAssign(op) = self.token.kind {
            self.check_assignable(first)?;
            self.bump()?;
            let value = self.expression()?;
            return self.node(NodeKind::CompoundAssign { op }, vec![first, value], start);
        }

        if self.tree.kind(first).is_call() {
            return self.node(NodeKind::CallStatement, vec![first], start);
        }
        Err(self.error_near("syntax error"))
    }

    fn check_assignable(&self, target: NodeId) -> Result<()> {
        let kind = self.tree.kind(target);
        if kind.is_assignable() {
            return Ok(());
        }
        let offset = self.tree.span(target).map_or(0, |span| span.start as usize);
        Err(ParseError::invalid_source_at(
            format!("cannot assign to {}", kind.name()),
            offset,
        ))
    }

    fn expression_list(&mut self) -> Result<Vec<NodeId>> {
        let mut expressions = vec![self.expression()?];
        while self.eat(&TokenKind::Comma)? {
            expressions.push(self.expression()?);
        }
        Ok(expressions)
    }

    fn expression(&mut self) -> Result<NodeId> {
        self.subexpression(0)
    }

    /// Precedence climbing: parses operators whose left priority exceeds
    /// `limit`.
    fn subexpression(&mut self, limit: u8) -> Result<NodeId> {
        self.enter()?;
        let start = self.token.span.start;

        let mut left = if let Some(op) = unary_op(&self.token.kind) {
            self.bump()?;
            let operand = self.subexpression(UNARY_PRIORITY)?;
            self.node(NodeKind::Unary { op }, vec![operand], start)?
        } else {
            self.simple_expression()?
        };

        // Each operator folded here nests the chain one level deeper.
        let mut links = 0;
        while let Some(op) = binary_op(&self.token.kind) {
            let (left_priority, right_priority) = op.priority();
            if left_priority <= limit {
                break;
            }
            self.enter()?;
            links += 1;
            self.bump()?;
            let right = self.subexpression(right_priority)?;
            left = self.node(NodeKind::Binary { op }, vec![left, right], start)?;
        }

        self.leave_chain(links);
        self.leave();
        Ok(left)
    }

    fn simple_expression(&mut self) -> Result<NodeId> {
        let start = self.token.span.start;
        let kind = match &self.token.kind {
            TokenKind::Number(number) => NodeKind::Number(number.clone()),
            TokenKind::String(string) => NodeKind::String(string.clone()),
            TokenKind::Nil => NodeKind::Nil,
            TokenKind::True => NodeKind::True,
            TokenKind::False => NodeKind::False,
            TokenKind::TripleDot => {
                if !self.in_vararg_function() {
                    return Err(self.error_near("cannot use '...' outside a vararg function"));
                }
                NodeKind::VarArgs
            }
            TokenKind::LeftBrace => return self.table(),
            TokenKind::Function => {
                self.bump()?;
                let body = self.function_body()?;
                return self.node(NodeKind::Function, vec![body], start);
            }
            TokenKind::If => return self.if_expression(start),
            _ => return self.suffixed_expression(),
        };
        self.bump()?;
        self.node(kind, vec![], start)
    }

    fn if_expression(&mut self, start: u32) -> Result<NodeId> {
        self.bump()?;
        let mut children = vec![self.expression()?];
        self.expect(TokenKind::Then)?;
        children.push(self.expression()?);
        loop {
            if self.eat(&TokenKind::Elseif)? {
                children.push(self.expression()?);
                self.expect(TokenKind::Then)?;
                children.push(self.expression()?);
            } else {
                self.expect(TokenKind::Else)?;
                children.push(self.expression()?);
                break;
            }
        }
        self.node(NodeKind::IfExpression, children, start)
    }

    fn primary_expression(&mut self) -> Result<NodeId> {
        let start = self.token.span.start;
        match self.token.kind {
            TokenKind::Name(_) => {
                let name = self.name()?;
                self.node(NodeKind::Identifier(name), vec![], start)
            }
            TokenKind::LeftParen => {
                self.bump()?;
                let inner = self.expression()?;
                self.expect_closing(TokenKind::RightParen, "(")?;
                self.node(NodeKind::Paren, vec![inner], start)
            }
            _ => Err(self.error_near("unexpected symbol")),
        }
    }

    fn suffixed_expression(&mut self) -> Result<NodeId> {
        let start = self.token.span.start;
        let mut expression = self.primary_expression()?;
        let mut links = 0;
        loop {
            if matches!(
                self.token.kind,
                TokenKind::Dot
                    | TokenKind::LeftBracket
                    | TokenKind::Colon
                    | TokenKind::LeftParen
                    | TokenKind::String(_)
                    | TokenKind::LeftBrace
            ) {
                self.enter()?;
                links += 1;
            }
            expression = match self.token.kind {
                TokenKind::Dot => {
                    self.bump()?;
                    let name = self.name()?;
                    self.node(NodeKind::Field { name }, vec![expression], start)?
                }
                TokenKind::LeftBracket => {
                    self.bump()?;
                    let key = self.expression()?;
                    self.expect(TokenKind::RightBracket)?;
                    self.node(NodeKind::Index, vec![expression, key], start)?
                }
                TokenKind::Colon => {
                    self.bump()?;
                    let method = self.name()?;
                    let (arguments, args) = self.call_arguments()?;
                    let mut children = vec![expression];
                    children.extend(arguments);
                    self.node(NodeKind::MethodCall { method, args }, children, start)?
                }
                TokenKind::LeftParen | TokenKind::String(_) | TokenKind::LeftBrace => {
                    let (arguments, args) = self.call_arguments()?;
                    let mut children = vec![expression];
                    children.extend(arguments);
                    self.node(NodeKind::Call { args }, children, start)?
                }
                _ => {
                    self.leave_chain(links);
                    return Ok(expression);
                }
            };
        }
    }

    fn call_arguments(&mut self) -> Result<(Vec<NodeId>, CallArgs)> {
        match self.token.kind {
            TokenKind::String(_) => Ok((vec![self.simple_expression()?], CallArgs::String)),
            TokenKind::LeftBrace => Ok((vec![self.table()?], CallArgs::Table)),
            TokenKind::LeftParen => {
                self.bump()?;
                let arguments = if self.at(&TokenKind::RightParen) {
                    Vec::new()
                } else {
                    self.expression_list()?
                };
                self.expect_closing(TokenKind::RightParen, "(")?;
                Ok((arguments, CallArgs::Parenthesized))
            }
            _ => Err(self.error_near("function arguments expected")),
        }
    }

    fn table(&mut self) -> Result<NodeId> {
        let start = self.token.span.start;
        self.expect(TokenKind::LeftBrace)?;
        let mut entries = Vec::new();
        while !self.at(&TokenKind::RightBrace) {
            entries.push(self.table_entry()?);
            if !self.eat(&TokenKind::Comma)? && !self.eat(&TokenKind::Semicolon)? {
                break;
            }
        }
        self.expect_closing(TokenKind::RightBrace, "{")?;
        self.node(NodeKind::Table, entries, start)
    }

    fn table_entry(&mut self) -> Result<NodeId> {
        let start = self.token.span.start;
        if self.eat(&TokenKind::LeftBracket)? {
            let key = self.expression()?;
            self.expect(TokenKind::RightBracket)?;
            self.expect(TokenKind::Assign)?;
            let value = self.expression()?;
            return self.node(NodeKind::TableIndex, vec![key, value], start);
        }

        let is_field = matches!(self.token.kind, TokenKind::Name(_))
            && matches!(self.peek_next()?, TokenKind::Assign);
        if is_field {
            let name = self.name()?;
            self.bump()?;
            let value = self.expression()?;
            return self.node(NodeKind::TableField { name }, vec![value], start);
        }

        let value = self.expression()?;
        self.node(NodeKind::TableValue, vec![value], start)
    }
}

fn unary_op(kind: &TokenKind) -> Option<UnaryOp> {
    Some(match kind {
        TokenKind::Not => UnaryOp::Not,
        TokenKind::Minus => UnaryOp::Minus,
        TokenKind::Hash => UnaryOp::Length,
        TokenKind::Tilde => UnaryOp::BitNot,
        _ => return None,
    })
}

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Or => BinaryOp::Or,
        TokenKind::And => BinaryOp::And,
        TokenKind::Less => BinaryOp::Less,
        TokenKind::Greater => BinaryOp::Greater,
        TokenKind::LessEqual => BinaryOp::LessEqual,
        TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
        TokenKind::Equal => BinaryOp::Equal,
        TokenKind::NotEqual => BinaryOp::NotEqual,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Tilde => BinaryOp::BitXor,
        TokenKind::Ampersand => BinaryOp::BitAnd,
        TokenKind::ShiftLeft => BinaryOp::ShiftLeft,
        TokenKind::ShiftRight => BinaryOp::ShiftRight,
        TokenKind::DoubleDot => BinaryOp::Concat,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::DoubleSlash => BinaryOp::FloorDiv,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::Caret => BinaryOp::Pow,
        _ => return None,
    })
}
