//! On-demand tokenizer.
//!
//! The lexer hands out one token at a time so that the parser reports the
//! first problem in source order, whether it is lexical or syntactic.

use luaform_ast::{CompoundOp, NumberLiteral, NumberValue, Span, StringLiteral, StringStyle, TriviaPiece};

use crate::error::ParseError;
use crate::token::{Token, TokenKind};

type Result<T> = std::result::Result<T, ParseError>;

pub(crate) struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        let mut lexer = Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
        };
        // A leading `#` line is a shebang, never Lua code.
        if lexer.peek(0) == Some(b'#') {
            while !matches!(lexer.peek(0), None | Some(b'\n' | b'\r')) {
                lexer.pos += 1;
            }
        }
        lexer
    }

    pub(crate) fn next_token(&mut self) -> Result<Token> {
        let leading = self.leading_trivia()?;
        let start = self.pos;
        let kind = self.scan()?;
        let span = Span::new(start as u32, self.pos as u32);
        let trailing = if kind == TokenKind::Eof {
            Vec::new()
        } else {
            self.trailing_trivia()?
        };
        Ok(Token {
            kind,
            span,
            leading,
            trailing,
        })
    }

    #[inline]
    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn error(&self, message: impl Into<String>, offset: usize) -> ParseError {
        ParseError::invalid_source_at(message, offset)
    }

    /// Consumes a newline sequence (`\n`, `\r`, `\r\n` or `\n\r`).
    fn skip_newline(&mut self) {
        let first = self.peek(0);
        self.pos += 1;
        if matches!((first, self.peek(0)), (Some(b'\n'), Some(b'\r')) | (Some(b'\r'), Some(b'\n'))) {
            self.pos += 1;
        }
    }

    fn leading_trivia(&mut self) -> Result<Vec<TriviaPiece>> {
        let mut trivia = Vec::new();
        let mut newlines = 0;
        loop {
            match self.peek(0) {
                Some(b'\n' | b'\r') => {
                    newlines += 1;
                    self.skip_newline();
                }
                Some(b' ' | b'\t' | 0x0B | 0x0C) => self.pos += 1,
                Some(b'-') if self.peek(1) == Some(b'-') => {
                    if newlines >= 2 {
                        trivia.push(TriviaPiece::BlankLine);
                    }
                    trivia.push(self.comment()?);
                    newlines = 0;
                }
                _ => {
                    if newlines >= 2 {
                        trivia.push(TriviaPiece::BlankLine);
                    }
                    return Ok(trivia);
                }
            }
        }
    }

    /// Comments on the same line as the token just scanned.
    fn trailing_trivia(&mut self) -> Result<Vec<TriviaPiece>> {
        let mut trivia = Vec::new();
        loop {
            while matches!(self.peek(0), Some(b' ' | b'\t' | 0x0B | 0x0C)) {
                self.pos += 1;
            }
            if self.peek(0) == Some(b'-') && self.peek(1) == Some(b'-') {
                let comment = self.comment()?;
                let spans_lines = matches!(&comment, TriviaPiece::BlockComment(text) if text.contains(['\n', '\r']));
                trivia.push(comment);
                if spans_lines {
                    return Ok(trivia);
                }
            } else {
                return Ok(trivia);
            }
        }
    }

    fn comment(&mut self) -> Result<TriviaPiece> {
        let start = self.pos;
        self.pos += 2;
        if let Some(level) = self.long_bracket_level() {
            self.long_bracket(level, start, "unfinished long comment")?;
            return Ok(TriviaPiece::BlockComment(
                self.source[start..self.pos].to_string(),
            ));
        }
        while !matches!(self.peek(0), None | Some(b'\n' | b'\r')) {
            self.pos += 1;
        }
        Ok(TriviaPiece::LineComment(
            self.source[start..self.pos].trim_end().to_string(),
        ))
    }

    /// Level of a long bracket opening at the current position, if any.
    fn long_bracket_level(&self) -> Option<usize> {
        if self.peek(0) != Some(b'[') {
            return None;
        }
        let mut level = 0;
        while self.peek(1 + level) == Some(b'=') {
            level += 1;
        }
        (self.peek(1 + level) == Some(b'[')).then_some(level)
    }

    /// Reads a long bracket body. Newline sequences become `\n` and a newline
    /// right after the opening bracket is skipped.
    fn long_bracket(&mut self, level: usize, start: usize, unfinished: &str) -> Result<Vec<u8>> {
        self.pos += level + 2;
        if matches!(self.peek(0), Some(b'\n' | b'\r')) {
            self.skip_newline();
        }
        let mut content = Vec::new();
        loop {
            match self.peek(0) {
                None => return Err(self.error(unfinished, start)),
                Some(b']') if self.closes_long_bracket(level) => {
                    self.pos += level + 2;
                    return Ok(content);
                }
                Some(b'\n' | b'\r') => {
                    self.skip_newline();
                    content.push(b'\n');
                }
                Some(byte) => {
                    content.push(byte);
                    self.pos += 1;
                }
            }
        }
    }

    fn closes_long_bracket(&self, level: usize) -> bool {
        (1..=level).all(|i| self.peek(i) == Some(b'=')) && self.peek(level + 1) == Some(b']')
    }

    fn scan(&mut self) -> Result<TokenKind> {
        let start = self.pos;
        let Some(byte) = self.peek(0) else {
            return Ok(TokenKind::Eof);
        };

        let symbol = |lexer: &mut Self, len: usize, kind: TokenKind| -> Result<TokenKind> {
            lexer.pos += len;
            Ok(kind)
        };
        let next = self.peek(1);

        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => Ok(self.name()),
            b'0'..=b'9' => self.number(),
            b'.' => match (next, self.peek(2)) {
                (Some(b'0'..=b'9'), _) => self.number(),
                (Some(b'.'), Some(b'.')) => symbol(self, 3, TokenKind::TripleDot),
                (Some(b'.'), Some(b'=')) => {
                    symbol(self, 3, TokenKind::CompoundAssign(CompoundOp::Concat))
                }
                (Some(b'.'), _) => symbol(self, 2, TokenKind::DoubleDot),
                _ => symbol(self, 1, TokenKind::Dot),
            },
            b'"' | b'\'' => self.quoted_string(),
            b'[' => match self.long_bracket_level() {
                Some(level) => self.long_string(level),
                None if next == Some(b'=') => {
                    Err(self.error("invalid long string delimiter", start))
                }
                None => symbol(self, 1, TokenKind::LeftBracket),
            },
            b'-' if next == Some(b'=') => {
                symbol(self, 2, TokenKind::CompoundAssign(CompoundOp::Sub))
            }
            b'-' => symbol(self, 1, TokenKind::Minus),
            b'+' if next == Some(b'=') => {
                symbol(self, 2, TokenKind::CompoundAssign(CompoundOp::Add))
            }
            b'+' => symbol(self, 1, TokenKind::Plus),
            b'*' if next == Some(b'=') => {
                symbol(self, 2, TokenKind::CompoundAssign(CompoundOp::Mul))
            }
            b'*' => symbol(self, 1, TokenKind::Star),
            b'/' => match (next, self.peek(2)) {
                (Some(b'/'), Some(b'=')) => {
                    symbol(self, 3, TokenKind::CompoundAssign(CompoundOp::FloorDiv))
                }
                (Some(b'/'), _) => symbol(self, 2, TokenKind::DoubleSlash),
                (Some(b'='), _) => symbol(self, 2, TokenKind::CompoundAssign(CompoundOp::Div)),
                _ => symbol(self, 1, TokenKind::Slash),
            },
            b'%' if next == Some(b'=') => {
                symbol(self, 2, TokenKind::CompoundAssign(CompoundOp::Mod))
            }
            b'%' => symbol(self, 1, TokenKind::Percent),
            b'^' if next == Some(b'=') => {
                symbol(self, 2, TokenKind::CompoundAssign(CompoundOp::Pow))
            }
            b'^' => symbol(self, 1, TokenKind::Caret),
            b'#' => symbol(self, 1, TokenKind::Hash),
            b'&' => symbol(self, 1, TokenKind::Ampersand),
            b'|' => symbol(self, 1, TokenKind::Pipe),
            b'~' if next == Some(b'=') => symbol(self, 2, TokenKind::NotEqual),
            b'~' => symbol(self, 1, TokenKind::Tilde),
            b'=' if next == Some(b'=') => symbol(self, 2, TokenKind::Equal),
            b'=' => symbol(self, 1, TokenKind::Assign),
            b'<' if next == Some(b'<') => symbol(self, 2, TokenKind::ShiftLeft),
            b'<' if next == Some(b'=') => symbol(self, 2, TokenKind::LessEqual),
            b'<' => symbol(self, 1, TokenKind::Less),
            b'>' if next == Some(b'>') => symbol(self, 2, TokenKind::ShiftRight),
            b'>' if next == Some(b'=') => symbol(self, 2, TokenKind::GreaterEqual),
            b'>' => symbol(self, 1, TokenKind::Greater),
            b':' if next == Some(b':') => symbol(self, 2, TokenKind::DoubleColon),
            b':' => symbol(self, 1, TokenKind::Colon),
            b'(' => symbol(self, 1, TokenKind::LeftParen),
            b')' => symbol(self, 1, TokenKind::RightParen),
            b'{' => symbol(self, 1, TokenKind::LeftBrace),
            b'}' => symbol(self, 1, TokenKind::RightBrace),
            b']' => symbol(self, 1, TokenKind::RightBracket),
            b';' => symbol(self, 1, TokenKind::Semicolon),
            b',' => symbol(self, 1, TokenKind::Comma),
            _ => {
                let found = self.source[start..].chars().next().unwrap_or_default();
                Err(self.error(format!("unexpected symbol near '{found}'"), start))
            }
        }
    }

    fn name(&mut self) -> TokenKind {
        let start = self.pos;
        while matches!(self.peek(0), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.pos += 1;
        }
        let text = &self.source[start..self.pos];
        TokenKind::keyword(text).unwrap_or_else(|| TokenKind::Name(text.to_string()))
    }

    fn number(&mut self) -> Result<TokenKind> {
        let start = self.pos;
        let value = match (self.peek(0), self.peek(1)) {
            (Some(b'0'), Some(b'x' | b'X')) => {
                self.pos += 2;
                self.hex_number(start)?
            }
            (Some(b'0'), Some(b'b' | b'B')) => {
                self.pos += 2;
                self.binary_number(start)?
            }
            _ => self.decimal_number(start)?,
        };
        if matches!(self.peek(0), Some(b) if b.is_ascii_alphanumeric() || b == b'_' || b == b'.') {
            return Err(self.malformed_number(start));
        }
        Ok(TokenKind::Number(NumberLiteral {
            value,
            raw: Some(self.source[start..self.pos].to_string()),
        }))
    }

    fn malformed_number(&self, start: usize) -> ParseError {
        let mut end = self.pos;
        while matches!(self.bytes.get(end), Some(b) if b.is_ascii_alphanumeric() || *b == b'_' || *b == b'.')
        {
            end += 1;
        }
        self.error(
            format!("malformed number near '{}'", &self.source[start..end]),
            start,
        )
    }

    fn eat_while(&mut self, predicate: impl Fn(u8) -> bool) -> usize {
        let start = self.pos;
        while matches!(self.peek(0), Some(b) if predicate(b)) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn decimal_number(&mut self, start: usize) -> Result<NumberValue> {
        let mut is_float = false;
        self.eat_while(|b| b.is_ascii_digit());
        if self.peek(0) == Some(b'.') {
            is_float = true;
            self.pos += 1;
            self.eat_while(|b| b.is_ascii_digit());
        }
        if matches!(self.peek(0), Some(b'e' | b'E')) {
            is_float = true;
            self.pos += 1;
            if matches!(self.peek(0), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.eat_while(|b| b.is_ascii_digit()) == 0 {
                return Err(self.malformed_number(start));
            }
        }

        let text = &self.source[start..self.pos];
        if !is_float && let Ok(value) = text.parse::<i64>() {
            return Ok(NumberValue::Integer(value));
        }
        // Decimal integers that do not fit become floats.
        text.parse::<f64>()
            .map(NumberValue::Float)
            .map_err(|_| self.malformed_number(start))
    }

    fn hex_number(&mut self, start: usize) -> Result<NumberValue> {
        let mut integer: u64 = 0;
        let mut mantissa = 0.0f64;
        let mut exponent: i64 = 0;
        let mut digits = 0;
        let mut is_float = false;

        while let Some(digit) = self.peek(0).and_then(|b| (b as char).to_digit(16)) {
            integer = integer.wrapping_mul(16).wrapping_add(u64::from(digit));
            mantissa = mantissa * 16.0 + f64::from(digit);
            digits += 1;
            self.pos += 1;
        }
        if self.peek(0) == Some(b'.') {
            is_float = true;
            self.pos += 1;
            while let Some(digit) = self.peek(0).and_then(|b| (b as char).to_digit(16)) {
                mantissa = mantissa * 16.0 + f64::from(digit);
                exponent -= 4;
                digits += 1;
                self.pos += 1;
            }
        }
        if digits == 0 {
            return Err(self.malformed_number(start));
        }
        if matches!(self.peek(0), Some(b'p' | b'P')) {
            is_float = true;
            self.pos += 1;
            let negative = match self.peek(0) {
                Some(b'-') => {
                    self.pos += 1;
                    true
                }
                Some(b'+') => {
                    self.pos += 1;
                    false
                }
                _ => false,
            };
            let exp_start = self.pos;
            if self.eat_while(|b| b.is_ascii_digit()) == 0 {
                return Err(self.malformed_number(start));
            }
            let value: i64 = self.source[exp_start..self.pos].parse().unwrap_or(i64::MAX);
            exponent = exponent.saturating_add(if negative { -value } else { value });
        }

        if is_float {
            let exponent = exponent.clamp(-2200, 2200) as i32;
            Ok(NumberValue::Float(mantissa * 2f64.powi(exponent)))
        } else {
            // Hexadecimal integers wrap around modulo 2^64.
            Ok(NumberValue::Integer(integer as i64))
        }
    }

    fn binary_number(&mut self, start: usize) -> Result<NumberValue> {
        let mut value: u64 = 0;
        let mut digits = 0;
        while let Some(bit @ (b'0' | b'1')) = self.peek(0) {
            value = value.wrapping_mul(2).wrapping_add(u64::from(bit - b'0'));
            digits += 1;
            self.pos += 1;
        }
        if digits == 0 {
            return Err(self.malformed_number(start));
        }
        Ok(NumberValue::Integer(value as i64))
    }

    fn long_string(&mut self, level: usize) -> Result<TokenKind> {
        let start = self.pos;
        let value = self.long_bracket(level, start, "unfinished long string")?;
        Ok(TokenKind::String(StringLiteral {
            value,
            raw: Some(self.source[start..self.pos].to_string()),
            style: StringStyle::Long { level },
        }))
    }

    fn quoted_string(&mut self) -> Result<TokenKind> {
        let start = self.pos;
        let quote = self.bytes[start];
        self.pos += 1;

        let mut value = Vec::new();
        loop {
            match self.peek(0) {
                None | Some(b'\n' | b'\r') => {
                    return Err(self.error("unfinished string", start));
                }
                Some(b) if b == quote => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => self.escape(&mut value, start)?,
                Some(b) => {
                    value.push(b);
                    self.pos += 1;
                }
            }
        }

        Ok(TokenKind::String(StringLiteral {
            value,
            raw: Some(self.source[start..self.pos].to_string()),
            style: if quote == b'"' {
                StringStyle::Double
            } else {
                StringStyle::Single
            },
        }))
    }

    fn escape(&mut self, value: &mut Vec<u8>, string_start: usize) -> Result<()> {
        let escape_start = self.pos;
        self.pos += 1;
        let Some(byte) = self.peek(0) else {
            return Err(self.error("unfinished string", string_start));
        };

        let simple = match byte {
            b'a' => Some(0x07),
            b'b' => Some(0x08),
            b'f' => Some(0x0C),
            b'n' => Some(b'\n'),
            b'r' => Some(b'\r'),
            b't' => Some(b'\t'),
            b'v' => Some(0x0B),
            b'\\' | b'"' | b'\'' => Some(byte),
            _ => None,
        };
        if let Some(escaped) = simple {
            value.push(escaped);
            self.pos += 1;
            return Ok(());
        }

        match byte {
            b'\n' | b'\r' => {
                self.skip_newline();
                value.push(b'\n');
            }
            b'z' => {
                self.pos += 1;
                while matches!(self.peek(0), Some(b) if b.is_ascii_whitespace() || b == 0x0B) {
                    self.pos += 1;
                }
            }
            b'x' => {
                self.pos += 1;
                let mut code = 0u8;
                for _ in 0..2 {
                    let digit = self
                        .peek(0)
                        .and_then(|b| (b as char).to_digit(16))
                        .ok_or_else(|| self.error("hexadecimal digit expected", escape_start))?;
                    code = code * 16 + digit as u8;
                    self.pos += 1;
                }
                value.push(code);
            }
            b'u' => {
                self.pos += 1;
                if self.peek(0) != Some(b'{') {
                    return Err(self.error("missing '{' in \\u{xxxx}", escape_start));
                }
                self.pos += 1;
                let mut code: u32 = 0;
                let mut digits = 0;
                while let Some(digit) = self.peek(0).and_then(|b| (b as char).to_digit(16)) {
                    code = code
                        .checked_mul(16)
                        .and_then(|c| c.checked_add(digit))
                        .filter(|&c| c <= 0x7FFF_FFFF)
                        .ok_or_else(|| self.error("UTF-8 value too large", escape_start))?;
                    digits += 1;
                    self.pos += 1;
                }
                if digits == 0 {
                    return Err(self.error("hexadecimal digit expected", escape_start));
                }
                if self.peek(0) != Some(b'}') {
                    return Err(self.error("missing '}' in \\u{xxxx}", escape_start));
                }
                self.pos += 1;
                push_utf8(value, code);
            }
            b'0'..=b'9' => {
                let mut code: u32 = 0;
                for _ in 0..3 {
                    match self.peek(0) {
                        Some(digit @ b'0'..=b'9') => {
                            code = code * 10 + u32::from(digit - b'0');
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                let code = u8::try_from(code)
                    .map_err(|_| self.error("decimal escape too large", escape_start))?;
                value.push(code);
            }
            _ => return Err(self.error("invalid escape sequence", escape_start)),
        }
        Ok(())
    }
}

/// Encodes a code point the way Lua's `\u{}` escape does, allowing values up
/// to 2^31 with the extended UTF-8 forms.
fn push_utf8(value: &mut Vec<u8>, code: u32) {
    if code < 0x80 {
        value.push(code as u8);
        return;
    }
    let mut buffer = [0u8; 8];
    let mut count = 1;
    let mut rest = code;
    let mut first_byte_max: u32 = 0x3F;
    loop {
        buffer[8 - count] = 0x80 | (rest & 0x3F) as u8;
        count += 1;
        rest >>= 6;
        first_byte_max >>= 1;
        if rest <= first_byte_max {
            break;
        }
    }
    buffer[8 - count] = ((!first_byte_max << 1) | rest) as u8;
    value.extend_from_slice(&buffer[8 - count..]);
}
