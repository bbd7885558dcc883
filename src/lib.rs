//! # Introduction
//!
//! Lumen is a small expression-oriented scripting language. This crate is
//! its front end: it turns source text into an AST for an evaluator to
//! consume, or fails with a positioned error.
//!
//! ## Pipeline
//!
//! ```text
//! Source → SourceCursor → Lexer → Parser → AST
//! ```
//!
//! 1. [`parser::cursor`]: character access with line/column tracking.
//! 2. [`parser::lexer`]: lazy token stream with one token of lookahead.
//! 3. [`parser::parse`]: recursive descent plus precedence climbing.
//! 4. [`parser::ast`]: owned [`Node`] tree returned to the caller.
//!
//! ```
//! use lumen::{parse, Node};
//!
//! let program = parse("x = 1 + 2 * 3").unwrap();
//! assert_eq!(program.to_string(), "{(= x (+ 1 (* 2 3)))}");
//! assert!(matches!(program, Node::Block(_)));
//! ```
//!
//! Logging goes through `tracing` under the `lumen::lexer` and
//! `lumen::parser` targets; install a subscriber to see it.

pub mod parser;

pub use parser::ast::{AssignOp, BinOp, Node, Position};
pub use parser::lexer::{LexError, LexErrorKind, Lexer, Token, TokenKind};
pub use parser::parse::{ParseError, ParseErrorKind, Parser, ParserConfig};

/// Parse a whole program with the default configuration.
pub fn parse(source: &str) -> Result<Node, ParseError> {
    Parser::new(source).parse_program()
}
