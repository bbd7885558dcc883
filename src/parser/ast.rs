// AST (Abstract Syntax Tree) definitions for the Lumen front end

use std::fmt;

/// Source position used by tokens and errors.
///
/// Lines start at 1, columns at 0. A newline bumps the line and resets the
/// column; every other character bumps the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Position of the first character of a source text.
    pub fn start() -> Self {
        Self { line: 1, column: 0 }
    }

    /// Position after consuming `ch` from this position.
    pub fn advanced_by(self, ch: char) -> Self {
        if ch == '\n' {
            Self {
                line: self.line + 1,
                column: 0,
            }
        } else {
            Self {
                line: self.line,
                column: self.column + 1,
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Assignment operators (right-associative, lowest precedence)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign, // =
    Arrow,  // ->
}

impl AssignOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Arrow => "->",
        }
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    // Logical
    Or,
    And,
    // Comparison
    Lt,
    Gt,
    Le,
    Ge,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AST nodes. Every expression form of the language is a `Node`; there is
/// no separate statement type.
///
/// Children are owned through `Box`/`Vec`, so a tree never shares or cycles.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    // Literals
    /// Raw numeric text, e.g. `"3.14"`. Interpretation is left to the evaluator.
    NumberLiteral(String),
    StringLiteral(String),
    CharLiteral(char),
    BoolLiteral(bool),

    Identifier(String),

    Assign {
        op: AssignOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    BinaryOp {
        op: BinOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    FunctionCall {
        callee: Box<Node>,
        args: Vec<Node>,
    },
    FunctionDef {
        params: Vec<String>,
        body: Box<Node>,
    },
    Conditional {
        condition: Box<Node>,
        then_branch: Box<Node>,
        else_branch: Option<Box<Node>>,
    },

    /// `{ ... }` blocks and the top-level program.
    Block(Vec<Node>),
}

impl Node {
    /// Statements of a block, or `None` for any other node.
    pub fn statements(&self) -> Option<&[Node]> {
        match self {
            Node::Block(statements) => Some(statements),
            _ => None,
        }
    }

    /// Move this node's children onto `stack`, leaving leaves in their place.
    fn detach_children(&mut self, stack: &mut Vec<Node>) {
        fn take(child: &mut Node) -> Node {
            std::mem::replace(child, Node::BoolLiteral(false))
        }

        match self {
            Node::Assign { left, right, .. } | Node::BinaryOp { left, right, .. } => {
                stack.push(take(left));
                stack.push(take(right));
            }
            Node::FunctionCall { callee, args } => {
                stack.push(take(callee));
                stack.append(args);
            }
            Node::FunctionDef { body, .. } => stack.push(take(body)),
            Node::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                stack.push(take(condition));
                stack.push(take(then_branch));
                if let Some(else_branch) = else_branch {
                    stack.push(take(else_branch));
                }
            }
            Node::Block(statements) => stack.append(statements),
            Node::NumberLiteral(_)
            | Node::StringLiteral(_)
            | Node::CharLiteral(_)
            | Node::BoolLiteral(_)
            | Node::Identifier(_) => {}
        }
    }
}

// Left-nested operator chains and call chains can be arbitrarily deep, so
// teardown uses a heap work list instead of recursive drop glue.
impl Drop for Node {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        self.detach_children(&mut stack);
        while let Some(mut node) = stack.pop() {
            node.detach_children(&mut stack);
        }
    }
}

/// S-expression rendering, e.g. `(+ 1 (* 2 3))`.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::NumberLiteral(text) => f.write_str(text),
            Node::StringLiteral(s) => write!(f, "{:?}", s),
            Node::CharLiteral(c) => write!(f, "{:?}", c),
            Node::BoolLiteral(b) => write!(f, "{}", b),
            Node::Identifier(name) => f.write_str(name),
            Node::Assign { op, left, right } => write!(f, "({} {} {})", op, left, right),
            Node::BinaryOp { op, left, right } => write!(f, "({} {} {})", op, left, right),
            Node::FunctionCall { callee, args } => {
                write!(f, "(call {}", callee)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                f.write_str(")")
            }
            Node::FunctionDef { params, body } => {
                write!(f, "(def ({}) {})", params.join(" "), body)
            }
            Node::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                write!(f, "(if {} {}", condition, then_branch)?;
                if let Some(else_branch) = else_branch {
                    write!(f, " {}", else_branch)?;
                }
                f.write_str(")")
            }
            Node::Block(statements) => {
                f.write_str("{")?;
                for (i, stmt) in statements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", stmt)?;
                }
                f.write_str("}")
            }
        }
    }
}
