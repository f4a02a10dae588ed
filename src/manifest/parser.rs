//! Recipe class extraction
//!
//! Reads the logical lines produced by the lexer and extracts imports, class
//! headers and class-level literal assignments. Method bodies, decorators and
//! nested blocks are skipped by indentation.

use tracing::debug;

use super::lexer::{LexError, LogicalLine, Token, TokenKind, tokenize};

/// A Python literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Number(String),
    Bool(bool),
    None,
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Dict(Vec<(Value, Value)>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Source spelling of a scalar, as an option value would be written
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Value::Str(s) | Value::Number(s) => Some(s.clone()),
            Value::Bool(true) => Some("True".to_string()),
            Value::Bool(false) => Some("False".to_string()),
            Value::None => Some("None".to_string()),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::None => "None",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
        }
    }
}

/// A class-level assignment
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub line: usize,
    pub column: usize,
    /// The literal value, or why it could not be read as one
    pub value: Result<Value, ParseError>,
}

/// A class definition with its literal assignments
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub bases: Vec<String>,
    pub line: usize,
    pub assignments: Vec<Assignment>,
}

impl ClassDef {
    /// Whether any base's last dotted segment equals `base`
    pub fn derives_from(&self, base: &str) -> bool {
        self.bases
            .iter()
            .any(|b| b.rsplit('.').next().is_some_and(|last| last == base))
    }

    pub fn assignment(&self, name: &str) -> Option<&Assignment> {
        // Later assignments shadow earlier ones, as in Python.
        self.assignments.iter().rev().find(|a| a.name == name)
    }
}

/// Everything the parser extracts from a manifest source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    pub imports: Vec<String>,
    pub classes: Vec<ClassDef>,
}

/// Parse failure at a source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub reason: String,
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self {
            line: err.line,
            column: err.column,
            reason: err.reason,
        }
    }
}

fn error_at(token: &Token, reason: impl Into<String>) -> ParseError {
    ParseError {
        line: token.line,
        column: token.column,
        reason: reason.into(),
    }
}

/// Parse a manifest source into imports and class definitions
pub fn parse_module(source: &str) -> Result<Module, ParseError> {
    let lines = tokenize(source)?;
    let mut module = Module::default();
    let mut index = 0;

    while index < lines.len() {
        let line = &lines[index];
        index += 1;
        if line.indent != 0 {
            continue;
        }
        if line.starts_with_name("import") || line.starts_with_name("from") {
            module.imports.push(render_tokens(&line.tokens));
        } else if line.starts_with_name("class") {
            let (class, next) = parse_class(&lines, index - 1)?;
            debug!(class = %class.name, bases = ?class.bases, "found class");
            module.classes.push(class);
            index = next;
        }
    }

    Ok(module)
}

/// Parse a class header at `start` and its body; returns the index after the body
fn parse_class(lines: &[LogicalLine], start: usize) -> Result<(ClassDef, usize), ParseError> {
    let header = &lines[start];
    let tokens = &header.tokens;
    let Some(Token {
        kind: TokenKind::Name(name),
        ..
    }) = tokens.get(1)
    else {
        return Err(error_at(&tokens[0], "expected class name after `class`"));
    };

    let mut cursor = 2;
    let mut bases = Vec::new();
    if matches!(tokens.get(cursor).map(|t| &t.kind), Some(TokenKind::LParen)) {
        let close = matching_close(tokens, cursor)
            .ok_or_else(|| error_at(&tokens[cursor], "unclosed class bases"))?;
        bases = parse_bases(&tokens[cursor + 1..close]);
        cursor = close + 1;
    }
    let Some(colon) = tokens.get(cursor) else {
        return Err(error_at(&tokens[tokens.len() - 1], "expected `:` after class header"));
    };
    if colon.kind != TokenKind::Colon {
        return Err(error_at(colon, format!("expected `:`, found {}", colon.kind)));
    }

    let mut class = ClassDef {
        name: name.clone(),
        bases,
        line: header.line(),
        assignments: Vec::new(),
    };

    // One-line body: `class A(ConanFile): name = "a"`
    let inline = &tokens[cursor + 1..];
    if !inline.is_empty() {
        if let Some(assignment) = parse_assignment(inline) {
            class.assignments.push(assignment);
        }
        return Ok((class, start + 1));
    }

    let mut index = start + 1;
    let Some(body_indent) = lines
        .get(index)
        .map(|l| l.indent)
        .filter(|indent| *indent > header.indent)
    else {
        return Ok((class, index));
    };

    while index < lines.len() && lines[index].indent > header.indent {
        let line = &lines[index];
        index += 1;
        if line.indent != body_indent {
            // Continuation of a block opened by a skipped statement.
            continue;
        }
        if let Some(assignment) = parse_assignment(&line.tokens) {
            debug!(attribute = %assignment.name, line = assignment.line, "class attribute");
            class.assignments.push(assignment);
        }
    }

    Ok((class, index))
}

/// Dotted base names, ignoring keyword arguments such as `metaclass=...`
fn parse_bases(tokens: &[Token]) -> Vec<String> {
    tokens
        .split(|t| t.kind == TokenKind::Comma)
        .filter(|part| !part.iter().any(|t| t.kind == TokenKind::Assign))
        .map(render_tokens)
        .filter(|base| !base.is_empty())
        .collect()
}

/// `name = expr` or `name: annotation = expr`; anything else is not an assignment
fn parse_assignment(tokens: &[Token]) -> Option<Assignment> {
    let first = tokens.first()?;
    let TokenKind::Name(name) = &first.kind else {
        return None;
    };
    if matches!(
        name.as_str(),
        "def" | "class" | "if" | "elif" | "else" | "for" | "while" | "with" | "try" | "except"
            | "finally" | "async"
    ) {
        return None;
    }

    let assign_at = match tokens.get(1).map(|t| &t.kind) {
        Some(TokenKind::Assign) => 1,
        Some(TokenKind::Colon) => top_level_position(tokens, 2, &TokenKind::Assign)?,
        _ => return None,
    };

    let expr = &tokens[assign_at + 1..];
    let value = if expr.is_empty() {
        Err(error_at(&tokens[assign_at], "missing value after `=`"))
    } else {
        parse_expression(expr)
    };

    Some(Assignment {
        name: name.clone(),
        line: first.line,
        column: first.column,
        value,
    })
}

/// Parse a complete expression; a top-level comma makes a tuple
pub fn parse_expression(tokens: &[Token]) -> Result<Value, ParseError> {
    let mut parser = ExprParser { tokens, pos: 0 };
    let (items, saw_comma) = parser.parse_items_until(None)?;
    let value = tuple_or_single(items, saw_comma);
    if let Some(extra) = parser.tokens.get(parser.pos) {
        return Err(error_at(extra, format!("unexpected {}", extra.kind)));
    }
    Ok(value)
}

struct ExprParser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl ExprParser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn last_token(&self) -> &Token {
        &self.tokens[self.tokens.len() - 1]
    }

    /// Comma-separated items up to `close` (or the end), and whether a comma was seen
    fn parse_items_until(
        &mut self,
        close: Option<&TokenKind>,
    ) -> Result<(Vec<Value>, bool), ParseError> {
        let mut items = Vec::new();
        let mut saw_comma = false;
        loop {
            match self.peek() {
                None => break,
                Some(t) if Some(&t.kind) == close => break,
                Some(_) => {}
            }
            items.push(self.parse_atom()?);
            match self.peek() {
                Some(t) if t.kind == TokenKind::Comma => {
                    saw_comma = true;
                    self.pos += 1;
                }
                _ => break,
            }
        }
        Ok((items, saw_comma))
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        match self.peek() {
            Some(t) if &t.kind == kind => {
                self.pos += 1;
                Ok(())
            }
            Some(t) => Err(error_at(t, format!("expected {kind}, found {}", t.kind))),
            None => Err(error_at(self.last_token(), format!("expected {kind}"))),
        }
    }

    fn parse_atom(&mut self) -> Result<Value, ParseError> {
        let Some(token) = self.peek().cloned() else {
            return Err(error_at(self.last_token(), "expected a value"));
        };
        self.pos += 1;
        match token.kind.clone() {
            TokenKind::Str(first) => {
                // Adjacent literals concatenate: 'a' 'b' == 'ab'.
                let mut text = first;
                while let Some(Token {
                    kind: TokenKind::Str(next),
                    ..
                }) = self.peek()
                {
                    text.push_str(next);
                    self.pos += 1;
                }
                Ok(Value::Str(text))
            }
            TokenKind::Number(n) => Ok(Value::Number(n)),
            TokenKind::Op(op) if op == "-" || op == "+" => match self.peek().cloned() {
                Some(Token {
                    kind: TokenKind::Number(n),
                    ..
                }) => {
                    self.pos += 1;
                    Ok(Value::Number(if op == "-" { format!("-{n}") } else { n }))
                }
                _ => Err(error_at(&token, format!("unexpected `{op}`"))),
            },
            TokenKind::Name(name) => match name.as_str() {
                "True" => Ok(Value::Bool(true)),
                "False" => Ok(Value::Bool(false)),
                "None" => Ok(Value::None),
                _ => Err(error_at(
                    &token,
                    format!("`{name}` is not a literal; only literal values can be read"),
                )),
            },
            TokenKind::LBracket => {
                let (items, _) = self.parse_items_until(Some(&TokenKind::RBracket))?;
                self.expect(&TokenKind::RBracket)?;
                Ok(Value::List(items))
            }
            TokenKind::LParen => {
                if self.peek().is_some_and(|t| t.kind == TokenKind::RParen) {
                    self.pos += 1;
                    return Ok(Value::Tuple(Vec::new()));
                }
                let (items, saw_comma) = self.parse_items_until(Some(&TokenKind::RParen))?;
                self.expect(&TokenKind::RParen)?;
                Ok(tuple_or_single(items, saw_comma))
            }
            TokenKind::LBrace => self.parse_dict(&token),
            other => Err(error_at(&token, format!("unexpected {other}"))),
        }
    }

    fn parse_dict(&mut self, open: &Token) -> Result<Value, ParseError> {
        let mut entries = Vec::new();
        loop {
            if self.peek().is_some_and(|t| t.kind == TokenKind::RBrace) {
                self.pos += 1;
                return Ok(Value::Dict(entries));
            }
            let key = self.parse_atom()?;
            match self.peek() {
                Some(t) if t.kind == TokenKind::Colon => self.pos += 1,
                Some(t) => {
                    return Err(error_at(t, "set literals are not supported; expected `:`"));
                }
                None => return Err(error_at(open, "'{' was never closed")),
            }
            let value = self.parse_atom()?;
            entries.push((key, value));
            match self.peek() {
                Some(t) if t.kind == TokenKind::Comma => self.pos += 1,
                Some(t) if t.kind == TokenKind::RBrace => {}
                Some(t) => return Err(error_at(t, format!("expected `,` or `}}`, found {}", t.kind))),
                None => return Err(error_at(open, "'{' was never closed")),
            }
        }
    }
}

/// `(x)` is `x`; `(x,)` and `x, y` are tuples
fn tuple_or_single(mut items: Vec<Value>, saw_comma: bool) -> Value {
    if items.len() == 1 && !saw_comma {
        return items.remove(0);
    }
    Value::Tuple(items)
}

/// Position of `kind` at bracket depth zero, starting at `from`
fn top_level_position(tokens: &[Token], from: usize, kind: &TokenKind) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(from) {
        match token.kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                depth = depth.saturating_sub(1);
            }
            _ if depth == 0 && &token.kind == kind => return Some(i),
            _ => {}
        }
    }
    None
}

fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Compact source-like rendering used for imports and base names
fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        let piece = match &token.kind {
            TokenKind::Name(n) | TokenKind::Number(n) => n.clone(),
            TokenKind::Str(s) => format!("{s:?}"),
            TokenKind::Op(op) => op.clone(),
            TokenKind::LParen => "(".to_string(),
            TokenKind::RParen => ")".to_string(),
            TokenKind::LBracket => "[".to_string(),
            TokenKind::RBracket => "]".to_string(),
            TokenKind::LBrace => "{".to_string(),
            TokenKind::RBrace => "}".to_string(),
            TokenKind::Comma => ",".to_string(),
            TokenKind::Colon => ":".to_string(),
            TokenKind::Assign => "=".to_string(),
        };
        let glue = matches!(token.kind, TokenKind::Op(ref op) if op == ".")
            || out.ends_with('.')
            || matches!(token.kind, TokenKind::Comma)
            || out.is_empty();
        if !glue {
            out.push(' ');
        }
        out.push_str(&piece);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(source: &str) -> Value {
        let lines = tokenize(source).unwrap();
        parse_expression(&lines[0].tokens).unwrap()
    }

    fn s(text: &str) -> Value {
        Value::Str(text.to_string())
    }

    #[test]
    fn test_bare_tuple() {
        assert_eq!(
            expr(r#""os", "arch", "compiler""#),
            Value::Tuple(vec![s("os"), s("arch"), s("compiler")])
        );
    }

    #[test]
    fn test_single_value_and_trailing_comma() {
        assert_eq!(expr("'cmake'"), s("cmake"));
        assert_eq!(expr("'cmake',"), Value::Tuple(vec![s("cmake")]));
        assert_eq!(expr("('cmake')"), s("cmake"));
        assert_eq!(expr("()"), Value::Tuple(vec![]));
    }

    #[test]
    fn test_list_with_trailing_comma() {
        assert_eq!(
            expr("['glfw/3.3.4', 'glm/0.9.9.8',]"),
            Value::List(vec![s("glfw/3.3.4"), s("glm/0.9.9.8")])
        );
        assert_eq!(expr("[]"), Value::List(vec![]));
        assert_eq!(expr("['a/1']"), Value::List(vec![s("a/1")]));
        assert_eq!(
            expr("[('a/1', 'override')]"),
            Value::List(vec![Value::Tuple(vec![s("a/1"), s("override")])])
        );
    }

    #[test]
    fn test_nested_tuple_in_list() {
        assert_eq!(
            expr("[('zlib/1.2.11', 'override'), 'glm/0.9.9.8']"),
            Value::List(vec![
                Value::Tuple(vec![s("zlib/1.2.11"), s("override")]),
                s("glm/0.9.9.8"),
            ])
        );
    }

    #[test]
    fn test_dict_and_scalars() {
        assert_eq!(
            expr("{'shared': False, 'glad:gl_version': 4.6, 'x': None, 'y': -1}"),
            Value::Dict(vec![
                (s("shared"), Value::Bool(false)),
                (s("glad:gl_version"), Value::Number("4.6".to_string())),
                (s("x"), Value::None),
                (s("y"), Value::Number("-1".to_string())),
            ])
        );
        assert_eq!(expr("{}"), Value::Dict(vec![]));
    }

    #[test]
    fn test_adjacent_strings_concatenate() {
        assert_eq!(expr("'glad/' '0.1.34'"), s("glad/0.1.34"));
    }

    #[test]
    fn test_non_literal_is_rejected() {
        let lines = tokenize("os.environ['X']").unwrap();
        let err = parse_expression(&lines[0].tokens).unwrap_err();
        assert!(err.reason.contains("`os` is not a literal"));
    }

    #[test]
    fn test_set_literal_is_rejected() {
        let lines = tokenize("{'a', 'b'}").unwrap();
        let err = parse_expression(&lines[0].tokens).unwrap_err();
        assert!(err.reason.contains("set literals"));
    }

    #[test]
    fn test_parse_module_classes_and_imports() {
        let source = r#"
from conans import ConanFile, CMake
import os

class SuperNovaEngine(ConanFile):
    name = 'SuperNova-Engine'
    settings = "os", "arch"

    def build(self):
        cmake = CMake(self)
        if True:
            cmake.build()

    generators = "cmake"

class Helper:
    pass
"#;
        let module = parse_module(source).unwrap();
        assert_eq!(
            module.imports,
            vec!["from conans import ConanFile, CMake", "import os"]
        );
        assert_eq!(module.classes.len(), 2);

        let recipe = &module.classes[0];
        assert_eq!(recipe.name, "SuperNovaEngine");
        assert!(recipe.derives_from("ConanFile"));
        let names: Vec<&str> = recipe.assignments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["name", "settings", "generators"]);
        assert!(!module.classes[1].derives_from("ConanFile"));
    }

    #[test]
    fn test_dotted_base_and_keyword_args() {
        let module =
            parse_module("class A(conans.ConanFile, metaclass=Meta):\n    name = 'a'\n").unwrap();
        assert_eq!(module.classes[0].bases, vec!["conans.ConanFile"]);
        assert!(module.classes[0].derives_from("ConanFile"));
    }

    #[test]
    fn test_annotated_assignment() {
        let module = parse_module("class A(ConanFile):\n    name: str = 'a'\n").unwrap();
        let assignment = module.classes[0].assignment("name").unwrap();
        assert_eq!(assignment.value, Ok(s("a")));
    }

    #[test]
    fn test_unsupported_value_is_recorded() {
        let module =
            parse_module("class A(ConanFile):\n    exports = os.path.join('a')\n").unwrap();
        let assignment = module.classes[0].assignment("exports").unwrap();
        assert!(assignment.value.is_err());
        assert_eq!((assignment.line, assignment.column), (2, 5));
    }

    #[test]
    fn test_later_assignment_shadows() {
        let module =
            parse_module("class A(ConanFile):\n    version = '1'\n    version = '2'\n").unwrap();
        assert_eq!(module.classes[0].assignment("version").unwrap().value, Ok(s("2")));
    }

    #[test]
    fn test_inline_class_body() {
        let module = parse_module("class A(ConanFile): name = 'a'\nx = 1\n").unwrap();
        assert_eq!(module.classes[0].assignments.len(), 1);
    }

    #[test]
    fn test_class_without_body_lines() {
        let module = parse_module("class A(ConanFile):\nname = 'top-level'\n").unwrap();
        assert!(module.classes[0].assignments.is_empty());
    }

    #[test]
    fn test_one_line_block_clauses_are_not_attributes() {
        let source = "class A(ConanFile):\n    if flag:\n        x = 1\n    else: y = 2\n    try: z = 1\n    except: z = 2\n    finally: w = 3\n    name = 'a'\n";
        let module = parse_module(source).unwrap();
        let names: Vec<&str> = module.classes[0]
            .assignments
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["name"]);
    }

    #[test]
    fn test_missing_colon() {
        let err = parse_module("class A(ConanFile)\n    name = 'a'\n").unwrap_err();
        assert_eq!(err.line, 1);
    }
}
