//! Tokenizer for the declarative Python subset used by manifests
//!
//! The manifest is never executed. The lexer only needs to understand enough
//! Python to split the file into logical lines (newlines inside brackets and
//! after a `\` do not end a line) and to read literals. Anything it does not
//! care about is tokenized loosely as an operator so method bodies can be
//! skipped by indentation.

use std::fmt;

/// Token kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Name(String),
    Str(String),
    Number(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Assign,
    Op(String),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Name(name) => write!(f, "`{name}`"),
            TokenKind::Str(_) => f.write_str("string literal"),
            TokenKind::Number(n) => write!(f, "number `{n}`"),
            TokenKind::LParen => f.write_str("`(`"),
            TokenKind::RParen => f.write_str("`)`"),
            TokenKind::LBracket => f.write_str("`[`"),
            TokenKind::RBracket => f.write_str("`]`"),
            TokenKind::LBrace => f.write_str("`{`"),
            TokenKind::RBrace => f.write_str("`}`"),
            TokenKind::Comma => f.write_str("`,`"),
            TokenKind::Colon => f.write_str("`:`"),
            TokenKind::Assign => f.write_str("`=`"),
            TokenKind::Op(op) => write!(f, "`{op}`"),
        }
    }
}

/// A token with its 1-based source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

/// Tokens of one logical line
#[derive(Debug, Clone)]
pub struct LogicalLine {
    /// Indentation width of the first physical line (tabs count to multiples of 8)
    pub indent: usize,
    pub tokens: Vec<Token>,
}

impl LogicalLine {
    pub fn line(&self) -> usize {
        self.tokens.first().map_or(0, |t| t.line)
    }

    pub fn starts_with_name(&self, name: &str) -> bool {
        matches!(self.tokens.first(), Some(Token { kind: TokenKind::Name(n), .. }) if n == name)
    }
}

/// Lexer failure at a source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub line: usize,
    pub column: usize,
    pub reason: String,
}

const STRING_PREFIXES: &[&str] = &["r", "u", "b", "f", "br", "rb", "fr", "rf"];

const MULTI_CHAR_OPS: &[&str] = &[
    "**=", "//=", ">>=", "<<=", "...", "->", "**", "//", ">>", "<<", "<=", ">=", "!=", "==",
    ":=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "@=",
];

/// Split source text into logical lines of tokens
pub fn tokenize(source: &str) -> Result<Vec<LogicalLine>, LexError> {
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    brackets: Vec<(char, usize, usize)>,
    lines: Vec<LogicalLine>,
    current: Vec<Token>,
    indent: usize,
    at_line_start: bool,
}

impl Lexer {
    fn new(source: &str) -> Self {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            brackets: Vec::new(),
            lines: Vec::new(),
            current: Vec::new(),
            indent: 0,
            at_line_start: true,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, line: usize, column: usize, reason: impl Into<String>) -> LexError {
        LexError {
            line,
            column,
            reason: reason.into(),
        }
    }

    fn push(&mut self, kind: TokenKind, line: usize, column: usize) {
        self.current.push(Token { kind, line, column });
    }

    fn finish_line(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(LogicalLine {
                indent: self.indent,
                tokens: std::mem::take(&mut self.current),
            });
        }
        self.at_line_start = true;
    }

    fn run(mut self) -> Result<Vec<LogicalLine>, LexError> {
        while let Some(c) = self.peek() {
            if self.at_line_start && self.brackets.is_empty() {
                self.at_line_start = false;
                self.measure_indent();
                continue;
            }

            let (line, column) = (self.line, self.column);
            match c {
                ' ' | '\t' | '\r' | '\x0c' => {
                    self.advance();
                }
                '\n' => {
                    self.advance();
                    if self.brackets.is_empty() {
                        self.finish_line();
                    }
                }
                '#' => self.skip_comment(),
                '\\' => {
                    self.advance();
                    if self.peek() == Some('\r') {
                        self.advance();
                    }
                    if self.peek() != Some('\n') {
                        return Err(self.error(line, column, "unexpected character after '\\'"));
                    }
                    self.advance();
                }
                '\'' | '"' => {
                    let text = self.read_string(false, line, column)?;
                    self.push(TokenKind::Str(text), line, column);
                }
                c if c.is_ascii_digit()
                    || (c == '.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit())) =>
                {
                    let number = self.read_number();
                    self.push(TokenKind::Number(number), line, column);
                }
                c if c.is_alphabetic() || c == '_' => {
                    let word = self.read_word();
                    let is_prefix = STRING_PREFIXES.contains(&word.to_ascii_lowercase().as_str());
                    if is_prefix && matches!(self.peek(), Some('\'' | '"')) {
                        let raw = word.to_ascii_lowercase().contains('r');
                        let text = self.read_string(raw, line, column)?;
                        self.push(TokenKind::Str(text), line, column);
                    } else {
                        self.push(TokenKind::Name(word), line, column);
                    }
                }
                '(' | '[' | '{' => {
                    self.advance();
                    self.brackets.push((c, line, column));
                    let kind = match c {
                        '(' => TokenKind::LParen,
                        '[' => TokenKind::LBracket,
                        _ => TokenKind::LBrace,
                    };
                    self.push(kind, line, column);
                }
                ')' | ']' | '}' => {
                    self.advance();
                    let expected = match c {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    match self.brackets.pop() {
                        Some((open, _, _)) if open == expected => {}
                        _ => return Err(self.error(line, column, format!("unmatched '{c}'"))),
                    }
                    let kind = match c {
                        ')' => TokenKind::RParen,
                        ']' => TokenKind::RBracket,
                        _ => TokenKind::RBrace,
                    };
                    self.push(kind, line, column);
                }
                _ => self.read_operator(line, column),
            }
        }

        if let Some((open, line, column)) = self.brackets.last().copied() {
            return Err(self.error(line, column, format!("'{open}' was never closed")));
        }
        self.finish_line();
        Ok(self.lines)
    }

    /// Measure leading whitespace; blank and comment-only lines are consumed whole
    fn measure_indent(&mut self) {
        let mut width = 0;
        while let Some(c) = self.peek() {
            match c {
                ' ' => width += 1,
                '\t' => width = (width / 8 + 1) * 8,
                '\x0c' | '\r' => {}
                _ => break,
            }
            self.advance();
        }
        match self.peek() {
            Some('\n') => {
                self.advance();
                self.at_line_start = true;
            }
            Some('#') => {
                self.skip_comment();
                if self.peek() == Some('\n') {
                    self.advance();
                }
                self.at_line_start = true;
            }
            _ => self.indent = width,
        }
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.advance();
            } else {
                break;
            }
        }
        word
    }

    fn read_number(&mut self) -> String {
        let mut number = String::new();
        while let Some(c) = self.peek() {
            let exponent_sign = matches!(c, '+' | '-')
                && number.ends_with(['e', 'E'])
                && !number.starts_with("0x")
                && !number.starts_with("0X");
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || exponent_sign {
                number.push(c);
                self.advance();
            } else {
                break;
            }
        }
        number
    }

    fn read_operator(&mut self, line: usize, column: usize) {
        for op in MULTI_CHAR_OPS {
            let matches = op
                .chars()
                .enumerate()
                .all(|(i, expected)| self.peek_at(i) == Some(expected));
            if matches {
                for _ in 0..op.chars().count() {
                    self.advance();
                }
                self.push(TokenKind::Op((*op).to_string()), line, column);
                return;
            }
        }

        let Some(c) = self.advance() else {
            return;
        };
        let kind = match c {
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '=' => TokenKind::Assign,
            other => TokenKind::Op(other.to_string()),
        };
        self.push(kind, line, column);
    }

    fn read_string(&mut self, raw: bool, line: usize, column: usize) -> Result<String, LexError> {
        let Some(quote) = self.advance() else {
            return Err(self.error(line, column, "unterminated string"));
        };
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.advance();
            self.advance();
        }

        let mut text = String::new();
        loop {
            let Some(c) = self.advance() else {
                return Err(self.error(line, column, "unterminated string"));
            };
            if c == quote {
                if !triple {
                    return Ok(text);
                }
                if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
                    self.advance();
                    self.advance();
                    return Ok(text);
                }
                text.push(c);
                continue;
            }
            match c {
                '\n' if !triple => {
                    return Err(self.error(line, column, "unterminated string"));
                }
                '\\' => self.read_escape(raw, &mut text, line, column)?,
                _ => text.push(c),
            }
        }
    }

    fn read_escape(
        &mut self,
        raw: bool,
        text: &mut String,
        line: usize,
        column: usize,
    ) -> Result<(), LexError> {
        let Some(next) = self.advance() else {
            return Err(self.error(line, column, "unterminated string"));
        };
        if raw {
            text.push('\\');
            text.push(next);
            return Ok(());
        }
        match next {
            '\n' => {}
            'n' => text.push('\n'),
            't' => text.push('\t'),
            'r' => text.push('\r'),
            '0' => text.push('\0'),
            'a' => text.push('\x07'),
            'b' => text.push('\x08'),
            'f' => text.push('\x0c'),
            'v' => text.push('\x0b'),
            '\\' | '\'' | '"' => text.push(next),
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = (0..width).filter_map(|_| self.advance()).collect();
                let decoded = u32::from_str_radix(&digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        self.error(line, column, format!("invalid escape '\\{next}{digits}'"))
                    })?;
                text.push(decoded);
            }
            other => {
                text.push('\\');
                text.push(other);
            }
        }
        Ok(())
    }
}
