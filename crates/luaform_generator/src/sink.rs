//! Token sinks: where the emitter writes tokens, and how they are laid out.

/// Receives the token stream of a program.
///
/// The emitter describes layout intent (optional spaces, statement breaks,
/// indentation); each sink decides what of it to honor.
pub(crate) trait TokenSink {
    /// Writes a token. A line break is never inserted before a token that is
    /// not `breakable`.
    fn token(&mut self, text: &str, breakable: bool);

    /// Optional space before the next token on the same line.
    fn space(&mut self);

    /// Ends the current statement line.
    fn line(&mut self);

    /// Requests an empty line before the next token.
    fn blank_line(&mut self);

    fn indent(&mut self);

    fn dedent(&mut self);

    /// Whether comments and blank lines reach the output.
    fn keeps_comments(&self) -> bool;

    /// Writes a comment verbatim.
    fn comment(&mut self, text: &str);

    fn finish(self) -> String;
}

/// Returns true if writing `next` right after `prev` would lex differently.
pub(crate) fn needs_space(prev: &str, next: &str) -> bool {
    let (Some(last), Some(first)) = (prev.chars().last(), next.chars().next()) else {
        return false;
    };
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';

    (is_word(last) && is_word(first))
        || (last == '-' && first == '-')
        || (last == '>' && first == '=')
        || (last == '[' && (first == '[' || first == '='))
        || (last == '.' && first == '.')
        || (is_number(prev) && first == '.')
}

fn is_number(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Break {
    None,
    Line,
    Blank,
}

/// Line-oriented output for people: indentation, spaces and comments.
#[derive(Debug)]
pub(crate) struct ReadableSink {
    out: String,
    depth: usize,
    pending: Break,
    space: bool,
    last: String,
    /// A line comment was written; the next token must start a new line.
    after_line_comment: bool,
}

impl ReadableSink {
    pub(crate) fn new() -> Self {
        Self {
            out: String::new(),
            depth: 0,
            pending: Break::None,
            space: false,
            last: String::new(),
            after_line_comment: false,
        }
    }

    fn flush(&mut self, text: &str) {
        if self.after_line_comment {
            self.pending = self.pending.max(Break::Line);
        }
        if self.pending != Break::None && !self.out.is_empty() {
            self.out.push('\n');
            if self.pending == Break::Blank {
                self.out.push('\n');
            }
            for _ in 0..self.depth {
                self.out.push_str(INDENT);
            }
        } else if !self.out.is_empty()
            && self.pending == Break::None
            && (self.space || needs_space(&self.last, text))
        {
            self.out.push(' ');
        }
        self.pending = Break::None;
        self.space = false;
        self.after_line_comment = false;
    }
}

impl TokenSink for ReadableSink {
    fn token(&mut self, text: &str, _breakable: bool) {
        self.flush(text);
        self.out.push_str(text);
        self.last.clear();
        self.last.push_str(text);
    }

    fn space(&mut self) {
        self.space = true;
    }

    fn line(&mut self) {
        self.pending = self.pending.max(Break::Line);
    }

    fn blank_line(&mut self) {
        self.pending = Break::Blank;
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn keeps_comments(&self) -> bool {
        true
    }

    fn comment(&mut self, text: &str) {
        self.space = true;
        self.flush(text);
        self.out.push_str(text);
        self.last.clear();
        self.space = true;
        // Only `--[[ ]]` comments can be followed by code on the same line.
        self.after_line_comment = !is_block_comment(text);
    }

    fn finish(self) -> String {
        self.out
    }
}

/// `--[==[` opens a block comment; `--[x` is a line comment.
fn is_block_comment(text: &str) -> bool {
    text.strip_prefix("--[")
        .is_some_and(|rest| rest.trim_start_matches('=').starts_with('['))
}

/// Minimal output: spaces only where tokens would merge, lines wrapped at a
/// column span.
#[derive(Debug)]
pub(crate) struct DenseSink {
    out: String,
    column_span: usize,
    column: usize,
    last: String,
}

impl DenseSink {
    /// A `column_span` of zero disables wrapping.
    pub(crate) fn new(column_span: usize) -> Self {
        Self {
            out: String::new(),
            column_span,
            column: 0,
            last: String::new(),
        }
    }
}

impl TokenSink for DenseSink {
    fn token(&mut self, text: &str, breakable: bool) {
        let space = needs_space(&self.last, text);
        let width = text.lines().next().map_or(0, |line| line.chars().count());
        let overflows = self.column_span > 0
            && self.column > 0
            && self.column + usize::from(space) + width > self.column_span;

        if breakable && overflows {
            self.out.push('\n');
            self.column = 0;
        } else if space {
            self.out.push(' ');
            self.column += 1;
        }

        self.out.push_str(text);
        match text.rfind('\n') {
            Some(index) => self.column = text[index + 1..].chars().count(),
            None => self.column += width,
        }
        self.last.clear();
        self.last.push_str(text);
    }

    fn space(&mut self) {}

    fn line(&mut self) {}

    fn blank_line(&mut self) {}

    fn indent(&mut self) {}

    fn dedent(&mut self) {}

    fn keeps_comments(&self) -> bool {
        false
    }

    fn comment(&mut self, _text: &str) {}

    fn finish(self) -> String {
        self.out
    }
}
