//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, token helpers, the reusable [`Parser::delimited`]
//! list parser, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses recursive descent for structural forms and precedence
//! climbing for infix operators:
//! - This module: Parser struct, helper methods, and coordination
//! - `expressions`: atoms, calls, and binary/assignment expressions
//!
//! Parser state is the lexer's one-token lookahead plus the call stack; there
//! is no backtracking and no error recovery. The first error aborts the parse.

use crate::parser::ast::*;
use crate::parser::lexer::{Keyword, LexError, Lexer, Token, TokenKind};
use thiserror::Error;
use tracing::debug;

/// Default bound on atom nesting, see [`ParserConfig::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Parser limits, passed at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum nesting of parentheses, blocks, conditionals, definitions and
    /// right-hand sides. Deeper input fails with
    /// [`ParseErrorKind::NestingTooDeep`] rather than exhausting the stack.
    ///
    /// Each right-hand side of `=`/`->` takes one level, so a chain like
    /// `a = b = ... = z` longer than the limit is rejected too.
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// What the parser expected and did not get.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected {expected}, found {found}")]
    Expected { expected: String, found: String },

    #[error("unexpected {0}")]
    UnexpectedToken(String),

    #[error("expected {expected}, found end of input")]
    UnexpectedEnd { expected: String },

    #[error("expected identifier, found {0}")]
    ExpectedIdentifier(String),

    #[error("nesting exceeds the limit of {limit}")]
    NestingTooDeep { limit: usize },
}

/// Parser error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("Parse error at {position}: {kind}")]
    Syntax {
        kind: ParseErrorKind,
        position: Position,
    },
}

impl ParseError {
    pub fn syntax(kind: ParseErrorKind, position: Position) -> Self {
        ParseError::Syntax { kind, position }
    }

    pub fn position(&self) -> Position {
        match self {
            ParseError::Lex(err) => err.position,
            ParseError::Syntax { position, .. } => *position,
        }
    }

    /// The syntax error kind, or `None` for lexer failures.
    pub fn kind(&self) -> Option<&ParseErrorKind> {
        match self {
            ParseError::Lex(_) => None,
            ParseError::Syntax { kind, .. } => Some(kind),
        }
    }
}

/// Recursive descent parser for Lumen
pub struct Parser {
    pub(crate) lexer: Lexer,
    config: ParserConfig,
    depth: usize,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Self::with_config(source, ParserConfig::default())
    }

    pub fn with_config(source: &str, config: ParserConfig) -> Self {
        Self::from_lexer(Lexer::new(source), config)
    }

    pub fn from_lexer(lexer: Lexer, config: ParserConfig) -> Self {
        Self {
            lexer,
            config,
            depth: 0,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse the entire source as a `;`-separated sequence of expressions.
    ///
    /// Returns a [`Node::Block`]; empty input yields an empty block.
    pub fn parse_program(&mut self) -> Result<Node, ParseError> {
        debug!(target: "lumen::parser", "Parsing program");
        let mut statements = Vec::new();

        while !self.lexer.at_end()? {
            statements.push(self.parse_expression()?);
            if !self.lexer.at_end()? {
                self.expect_punctuation(';')?;
            }
        }

        debug!(
            target: "lumen::parser",
            statements = statements.len(),
            "Parsed program"
        );
        Ok(Node::Block(statements))
    }

    /// Parse `start elem (sep elem)* [sep] stop`.
    ///
    /// An immediate `stop` yields an empty list, and one trailing separator
    /// before `stop` is tolerated.
    pub(crate) fn delimited<T>(
        &mut self,
        start: char,
        stop: char,
        separator: char,
        mut parse_element: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        self.expect_punctuation(start)?;

        let mut items = Vec::new();
        let mut first = true;
        while !self.lexer.at_end()? {
            if self.check_punctuation(stop)? {
                break;
            }
            if first {
                first = false;
            } else {
                self.expect_punctuation(separator)?;
                if self.check_punctuation(stop)? {
                    break;
                }
            }
            items.push(parse_element(self)?);
        }

        self.expect_punctuation(stop)?;
        Ok(items)
    }

    /// Run `f` one nesting level deeper.
    pub(crate) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= self.config.max_depth {
            let limit = self.config.max_depth;
            let position = self.lexer.position();
            return Err(self.fail(ParseError::syntax(
                ParseErrorKind::NestingTooDeep { limit },
                position,
            )));
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ===== Helper methods =====

    // The `check_*` helpers accept a concrete value or `None`; `None`
    // matches any token of that kind. All are false at end of input.

    pub(crate) fn check_punctuation(
        &mut self,
        ch: impl Into<Option<char>>,
    ) -> Result<bool, ParseError> {
        let ch = ch.into();
        Ok(self.lexer.peek()?.is_some_and(|t| match &t.kind {
            TokenKind::Punctuation(c) => ch.map_or(true, |ch| *c == ch),
            _ => false,
        }))
    }

    pub(crate) fn check_keyword(
        &mut self,
        keyword: impl Into<Option<Keyword>>,
    ) -> Result<bool, ParseError> {
        let keyword = keyword.into();
        Ok(self.lexer.peek()?.is_some_and(|t| match &t.kind {
            TokenKind::Keyword(kw) => keyword.map_or(true, |keyword| *kw == keyword),
            _ => false,
        }))
    }

    pub(crate) fn check_operator<'a>(
        &mut self,
        op: impl Into<Option<&'a str>>,
    ) -> Result<bool, ParseError> {
        let op = op.into();
        Ok(self.lexer.peek()?.is_some_and(|t| match &t.kind {
            TokenKind::Operator(o) => op.map_or(true, |op| o == op),
            _ => false,
        }))
    }

    pub(crate) fn expect_punctuation(&mut self, ch: char) -> Result<Token, ParseError> {
        if self.check_punctuation(ch)? {
            self.advance("punctuation")
        } else {
            Err(self.expected(&format!("'{}'", ch)))
        }
    }

    pub(crate) fn expect_keyword(&mut self, keyword: Keyword) -> Result<Token, ParseError> {
        if self.check_keyword(keyword)? {
            self.advance("keyword")
        } else {
            Err(self.expected(&format!("keyword '{}'", keyword)))
        }
    }

    pub(crate) fn expect_operator(&mut self, op: &str) -> Result<Token, ParseError> {
        if self.check_operator(op)? {
            self.advance("operator")
        } else {
            Err(self.expected(&format!("operator '{}'", op)))
        }
    }

    /// Consume the next token; end of input is an error naming `expected`.
    pub(crate) fn advance(&mut self, expected: &str) -> Result<Token, ParseError> {
        match self.lexer.next_token()? {
            Some(token) => Ok(token),
            None => Err(self.end_of_input(expected)),
        }
    }

    /// Consume an identifier token and return its name.
    pub(crate) fn parse_varname(&mut self) -> Result<String, ParseError> {
        let token = self.advance("parameter name")?;
        match token.kind {
            TokenKind::Identifier(name) => Ok(name),
            other => Err(self.fail(ParseError::syntax(
                ParseErrorKind::ExpectedIdentifier(other.to_string()),
                token.position,
            ))),
        }
    }

    /// Mismatch error against the current lookahead token.
    pub(crate) fn expected(&mut self, expected: &str) -> ParseError {
        let found = match self.lexer.peek() {
            Ok(found) => found.cloned(),
            Err(err) => return self.fail(err.into()),
        };

        match found {
            Some(token) => self.fail(ParseError::syntax(
                ParseErrorKind::Expected {
                    expected: expected.to_string(),
                    found: token.kind.to_string(),
                },
                token.position,
            )),
            None => self.end_of_input(expected),
        }
    }

    pub(crate) fn end_of_input(&self, expected: &str) -> ParseError {
        self.fail(ParseError::syntax(
            ParseErrorKind::UnexpectedEnd {
                expected: expected.to_string(),
            },
            self.lexer.position(),
        ))
    }

    pub(crate) fn fail(&self, err: ParseError) -> ParseError {
        debug!(target: "lumen::parser", error = %err, "Parse error");
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(text: &str) -> Node {
        Node::NumberLiteral(text.to_string())
    }

    #[test]
    fn test_parse_empty_program() {
        let program = Parser::new("").parse_program().unwrap();
        assert_eq!(program, Node::Block(vec![]));

        let program = Parser::new("  # nothing here\n").parse_program().unwrap();
        assert_eq!(program, Node::Block(vec![]));
    }

    #[test]
    fn test_parse_statements() {
        let program = Parser::new("1; 2; 3").parse_program().unwrap();
        assert_eq!(program, Node::Block(vec![num("1"), num("2"), num("3")]));
    }

    #[test]
    fn test_trailing_semicolon() {
        let program = Parser::new("1;").parse_program().unwrap();
        assert_eq!(program, Node::Block(vec![num("1")]));
    }

    #[test]
    fn test_missing_separator() {
        let err = Parser::new("1 2").parse_program().unwrap_err();
        assert_eq!(
            err.kind(),
            Some(&ParseErrorKind::Expected {
                expected: "';'".to_string(),
                found: "number 2".to_string(),
            })
        );
        assert_eq!(err.position(), Position::new(1, 2));
    }

    #[test]
    fn test_delimited_trailing_separator() {
        let mut parser = Parser::new("(a, b,)");
        let names = parser
            .delimited('(', ')', ',', Parser::parse_varname)
            .unwrap();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_delimited_empty() {
        let mut parser = Parser::new("()");
        let names = parser
            .delimited('(', ')', ',', Parser::parse_varname)
            .unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn test_delimited_unclosed() {
        let mut parser = Parser::new("(a, b");
        let err = parser
            .delimited('(', ')', ',', Parser::parse_varname)
            .unwrap_err();
        assert_eq!(
            err.kind(),
            Some(&ParseErrorKind::UnexpectedEnd {
                expected: "')'".to_string()
            })
        );
    }

    #[test]
    fn test_expect_operator() {
        let mut parser = Parser::new("-> x");
        assert!(parser.expect_operator("->").is_ok());
        let err = parser.expect_operator("=").unwrap_err();
        assert!(err.to_string().contains("operator '='"));
    }

    #[test]
    fn test_check_any_of_kind() {
        let mut parser = Parser::new("; else <=");
        assert!(parser.check_punctuation(None).unwrap());
        assert!(!parser.check_keyword(None).unwrap());
        parser.expect_punctuation(';').unwrap();

        assert!(parser.check_keyword(None).unwrap());
        assert!(!parser.check_keyword(Keyword::If).unwrap());
        assert!(!parser.check_operator(None).unwrap());
        parser.expect_keyword(Keyword::Else).unwrap();

        assert!(parser.check_operator(None).unwrap());
        assert!(parser.check_operator("<=").unwrap());
        assert!(!parser.check_punctuation(None).unwrap());
        parser.expect_operator("<=").unwrap();

        assert!(!parser.check_punctuation(None).unwrap());
        assert!(!parser.check_keyword(None).unwrap());
        assert!(!parser.check_operator(None).unwrap());
    }

    #[test]
    fn test_varname_rejects_keyword() {
        let mut parser = Parser::new("if");
        let err = parser.parse_varname().unwrap_err();
        assert_eq!(
            err.kind(),
            Some(&ParseErrorKind::ExpectedIdentifier("keyword 'if'".to_string()))
        );
    }

    #[test]
    fn test_lex_error_passes_through() {
        let err = Parser::new("1 + $").parse_program().unwrap_err();
        assert!(matches!(err, ParseError::Lex(_)));
        assert_eq!(err.position(), Position::new(1, 4));
        assert!(err.kind().is_none());
    }

    #[test]
    fn test_default_config() {
        let parser = Parser::new("");
        assert_eq!(parser.config().max_depth, DEFAULT_MAX_DEPTH);
    }
}
