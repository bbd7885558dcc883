//! Expression parsing implementation
//!
//! This module handles parsing of Lumen expressions using precedence climbing
//! for infix operators and recursive descent for everything else.
//!
//! # Supported Expressions
//!
//! - Literals: numbers, strings, characters, `true`/`false`
//! - Identifiers
//! - Grouping: `( expr )`
//! - Blocks: `{ expr; expr; ... }`
//! - Conditionals: `if cond { ... } else ...`
//! - Function definitions: `def(a, b) body`
//! - Calls: `f(x, y)` after any atom
//! - Binary operators and assignment (`=`, `->`)
//!
//! # Precedence
//!
//! | Operators            | Precedence | Associativity |
//! |----------------------|-----------:|---------------|
//! | `=` `->`             | 1          | right         |
//! | `\|\|`               | 2          | left          |
//! | `&&`                 | 3          | left          |
//! | `<` `>` `<=` `>=`    | 7          | left          |
//! | `+` `-`              | 10         | left          |
//! | `*` `/` `%`          | 20         | left          |
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::{Keyword, Token, TokenKind};
use crate::parser::parse::{ParseError, ParseErrorKind, Parser};
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InfixOp {
    Assign(AssignOp),
    Binary(BinOp),
}

#[derive(Debug, Clone, Copy)]
struct Infix {
    symbol: &'static str,
    precedence: u8,
    op: InfixOp,
}

impl Infix {
    /// Minimum precedence for the right-hand side. Right-associative
    /// operators let an equal-precedence neighbour bind to the right.
    fn rhs_min_precedence(&self) -> u8 {
        match self.op {
            InfixOp::Assign(_) => self.precedence - 1,
            InfixOp::Binary(_) => self.precedence,
        }
    }

    fn build(&self, left: Node, right: Node) -> Node {
        let left = Box::new(left);
        let right = Box::new(right);
        match self.op {
            InfixOp::Assign(op) => Node::Assign { op, left, right },
            InfixOp::Binary(op) => Node::BinaryOp { op, left, right },
        }
    }
}

static INFIX_OPERATORS: Lazy<FxHashMap<&'static str, Infix>> = Lazy::new(|| {
    let table = [
        (1, InfixOp::Assign(AssignOp::Assign)),
        (1, InfixOp::Assign(AssignOp::Arrow)),
        (2, InfixOp::Binary(BinOp::Or)),
        (3, InfixOp::Binary(BinOp::And)),
        (7, InfixOp::Binary(BinOp::Lt)),
        (7, InfixOp::Binary(BinOp::Gt)),
        (7, InfixOp::Binary(BinOp::Le)),
        (7, InfixOp::Binary(BinOp::Ge)),
        (10, InfixOp::Binary(BinOp::Add)),
        (10, InfixOp::Binary(BinOp::Sub)),
        (20, InfixOp::Binary(BinOp::Mul)),
        (20, InfixOp::Binary(BinOp::Div)),
        (20, InfixOp::Binary(BinOp::Mod)),
    ];

    table
        .into_iter()
        .map(|(precedence, op)| {
            let symbol = match op {
                InfixOp::Assign(op) => op.as_str(),
                InfixOp::Binary(op) => op.as_str(),
            };
            (
                symbol,
                Infix {
                    symbol,
                    precedence,
                    op,
                },
            )
        })
        .collect()
});

/// Binding power of an infix operator, or `None` if `op` is not one.
pub fn precedence(op: &str) -> Option<u8> {
    INFIX_OPERATORS.get(op).map(|infix| infix.precedence)
}

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<Node, ParseError> {
        let atom = self.parse_atom()?;
        let atom = self.maybe_call(atom)?;
        self.maybe_binary(atom, 0)
    }

    /// Precedence climbing over infix operators that bind tighter than
    /// `min_precedence`.
    fn maybe_binary(&mut self, mut left: Node, min_precedence: u8) -> Result<Node, ParseError> {
        while let Some(infix) = self.peek_infix(min_precedence)? {
            self.expect_operator(infix.symbol)?;
            let atom = self.parse_atom()?;
            let right = self.nested(|p| p.maybe_binary(atom, infix.rhs_min_precedence()))?;
            left = infix.build(left, right);
        }

        Ok(left)
    }

    fn peek_infix(&mut self, min_precedence: u8) -> Result<Option<Infix>, ParseError> {
        let infix = match self.lexer.peek()? {
            Some(Token {
                kind: TokenKind::Operator(op),
                ..
            }) => INFIX_OPERATORS.get(op.as_str()).copied(),
            _ => None,
        };
        Ok(infix.filter(|infix| infix.precedence > min_precedence))
    }

    /// Wrap `node` in calls for every `(` that follows it.
    pub(crate) fn maybe_call(&mut self, mut node: Node) -> Result<Node, ParseError> {
        while self.check_punctuation('(')? {
            node = self.parse_call(node)?;
        }
        Ok(node)
    }

    fn parse_call(&mut self, callee: Node) -> Result<Node, ParseError> {
        let args = self.delimited('(', ')', ',', Self::parse_expression)?;
        Ok(Node::FunctionCall {
            callee: Box::new(callee),
            args,
        })
    }

    /// Parse an atom and any calls applied to it.
    pub(crate) fn parse_atom(&mut self) -> Result<Node, ParseError> {
        self.nested(|p| {
            let atom = p.dispatch_atom()?;
            p.maybe_call(atom)
        })
    }

    fn dispatch_atom(&mut self) -> Result<Node, ParseError> {
        if self.check_punctuation('(')? {
            self.advance("'('")?;
            let expr = self.parse_expression()?;
            self.expect_punctuation(')')?;
            return Ok(expr);
        }

        if self.check_punctuation('{')? {
            return self.parse_block();
        }

        if self.check_keyword(Keyword::If)? {
            return self.parse_conditional();
        }

        if self.check_keyword(Keyword::True)? || self.check_keyword(Keyword::False)? {
            let token = self.advance("boolean")?;
            return Ok(Node::BoolLiteral(token.is_keyword(Keyword::True)));
        }

        if self.check_keyword(Keyword::Def)? {
            return self.parse_function_def();
        }

        let token = self.advance("expression")?;
        match token.kind {
            TokenKind::Number(text) => Ok(Node::NumberLiteral(text)),
            TokenKind::String(value) => Ok(Node::StringLiteral(value)),
            TokenKind::Char(value) => Ok(Node::CharLiteral(value)),
            TokenKind::Identifier(name) => Ok(Node::Identifier(name)),
            other => Err(self.fail(ParseError::syntax(
                ParseErrorKind::UnexpectedToken(other.to_string()),
                token.position,
            ))),
        }
    }

    /// Parse block: { expr; expr; ... }
    fn parse_block(&mut self) -> Result<Node, ParseError> {
        let statements = self.delimited('{', '}', ';', Self::parse_expression)?;
        Ok(Node::Block(statements))
    }

    /// Parse conditional: if cond { ... } [else expr]
    fn parse_conditional(&mut self) -> Result<Node, ParseError> {
        self.expect_keyword(Keyword::If)?;
        let condition = self.parse_expression()?;

        if !self.check_punctuation('{')? {
            return Err(self.expected("'{' after if condition"));
        }
        let then_branch = self.parse_expression()?;

        let else_branch = if self.check_keyword(Keyword::Else)? {
            self.expect_keyword(Keyword::Else)?;
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        Ok(Node::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch,
        })
    }

    /// Parse function definition: def(params) body
    fn parse_function_def(&mut self) -> Result<Node, ParseError> {
        self.expect_keyword(Keyword::Def)?;
        let params = self.delimited('(', ')', ',', Self::parse_varname)?;
        let body = self.parse_expression()?;

        Ok(Node::FunctionDef {
            params,
            body: Box::new(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(source: &str) -> Node {
        let program = Parser::new(source).parse_program().unwrap();
        let statements = program.statements().expect("Expected block");
        assert_eq!(statements.len(), 1, "expected one statement in {source:?}");
        statements[0].clone()
    }

    fn sexpr(source: &str) -> String {
        parse_one(source).to_string()
    }

    #[test]
    fn test_precedence_table() {
        assert_eq!(precedence("="), Some(1));
        assert_eq!(precedence("->"), Some(1));
        assert_eq!(precedence("||"), Some(2));
        assert_eq!(precedence("&&"), Some(3));
        assert_eq!(precedence(">="), Some(7));
        assert_eq!(precedence("-"), Some(10));
        assert_eq!(precedence("%"), Some(20));
        assert_eq!(precedence("=="), None);
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(sexpr("1 - 2 - 3"), "(- (- 1 2) 3)");
        assert_eq!(sexpr("8 / 4 % 3"), "(% (/ 8 4) 3)");
    }

    #[test]
    fn test_mixed_precedence() {
        assert_eq!(sexpr("1 * 2 + 3 * 4"), "(+ (* 1 2) (* 3 4))");
        assert_eq!(sexpr("a < b && c || d"), "(|| (&& (< a b) c) d)");
        assert_eq!(sexpr("x = 1 + 2 < 4"), "(= x (< (+ 1 2) 4))");
    }

    #[test]
    fn test_arrow_assignment_is_right_associative() {
        assert_eq!(sexpr("a -> b = c"), "(-> a (= b c))");
    }

    #[test]
    fn test_grouping_overrides_precedence() {
        assert_eq!(sexpr("(1 + 2) * 3"), "(* (+ 1 2) 3)");
    }

    #[test]
    fn test_chained_calls() {
        assert_eq!(sexpr("f(1)(2)"), "(call (call f 1) 2)");
        assert_eq!(sexpr("f(g(x), y + 1)"), "(call f (call g x) (+ y 1))");
    }

    #[test]
    fn test_call_after_group() {
        assert_eq!(sexpr("(f)(x)"), "(call f x)");
    }

    #[test]
    fn test_conditional_without_else() {
        let node = parse_one("if x {1}");
        assert_eq!(
            node,
            Node::Conditional {
                condition: Box::new(Node::Identifier("x".into())),
                then_branch: Box::new(Node::Block(vec![Node::NumberLiteral("1".into())])),
                else_branch: None,
            }
        );
    }

    #[test]
    fn test_conditional_requires_block() {
        let err = Parser::new("if x 1").parse_program().unwrap_err();
        assert!(matches!(
            err.kind(),
            Some(ParseErrorKind::Expected { expected, .. }) if expected.contains("'{'")
        ));
    }

    #[test]
    fn test_else_if_chain() {
        assert_eq!(
            sexpr("if a {1} else if b {2} else {3}"),
            "(if a {1} (if b {2} {3}))"
        );
    }

    #[test]
    fn test_function_def_no_params() {
        assert_eq!(sexpr("def() {}"), "(def () {})");
    }

    #[test]
    fn test_function_def_assigned() {
        assert_eq!(sexpr("add = def(a, b) { a + b }"), "(= add (def (a b) {(+ a b)}))");
    }

    #[test]
    fn test_block_statements() {
        assert_eq!(sexpr("{ a = 1; b = 2; }"), "{(= a 1) (= b 2)}");
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse_one("\"hi\""), Node::StringLiteral("hi".into()));
        assert_eq!(parse_one("'c'"), Node::CharLiteral('c'));
        assert_eq!(parse_one("false"), Node::BoolLiteral(false));
        assert_eq!(parse_one("3.25"), Node::NumberLiteral("3.25".into()));
    }

    #[test]
    fn test_type_keyword_is_unexpected() {
        let err = Parser::new("int").parse_program().unwrap_err();
        assert_eq!(
            err.kind(),
            Some(&ParseErrorKind::UnexpectedToken("keyword 'int'".into()))
        );
    }

    #[test]
    fn test_unknown_operator_stops_expression() {
        let err = Parser::new("a == b").parse_program().unwrap_err();
        assert_eq!(
            err.kind(),
            Some(&ParseErrorKind::Expected {
                expected: "';'".into(),
                found: "operator '=='".into(),
            })
        );
    }

    #[test]
    fn test_missing_right_operand() {
        let err = Parser::new("1 +").parse_program().unwrap_err();
        assert_eq!(
            err.kind(),
            Some(&ParseErrorKind::UnexpectedEnd {
                expected: "expression".into()
            })
        );
    }
}
