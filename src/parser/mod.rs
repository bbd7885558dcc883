//! Lumen source code parser
//!
//! This module transforms Lumen source text into an Abstract Syntax Tree (AST):
//! - [`cursor`]: Character access with line/column tracking
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → AST)
//! - [`ast`]: AST node definitions
//!
//! # Language
//!
//! Everything is an expression. A program is a `;`-separated sequence of
//! expressions:
//! - Literals: numbers, `"strings"`, `'c'` chars, `true`, `false`
//! - Blocks `{ a; b }`, conditionals `if c { .. } else ..`
//! - Function definitions `def(x, y) body` and calls `f(a, b)`
//! - Assignment (`=`, `->`) and binary operators
//! - Line comments starting with `#`
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! No external parser generator dependencies.

pub mod ast;
pub mod cursor;
mod expressions;
pub mod lexer;
pub mod parse;

pub use expressions::precedence;
