//! Lexer (tokenizer) for Lumen source code
//!
//! Pulls characters from a [`SourceCursor`] and produces typed [`Token`]s on
//! demand. The stream is lazy and forward-only with exactly one token of
//! lookahead: [`Lexer::peek`] caches the next token, [`Lexer::next_token`]
//! hands it over. `#` starts a line comment.
//!
//! Operators are lexed by maximal munch over the operator character set, so
//! `<=`, `->` and `&&` each arrive as a single [`TokenKind::Operator`]. The
//! parser decides which operator texts are meaningful.

use super::ast::Position;
use super::cursor::SourceCursor;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};

/// Reserved words of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    If,
    Else,
    Char,
    Int,
    Long,
    Float,
    Double,
    String,
    Def,
    Namesp,
    Class,
    True,
    False,
}

static KEYWORDS: Lazy<FxHashMap<&'static str, Keyword>> = Lazy::new(|| {
    [
        Keyword::If,
        Keyword::Else,
        Keyword::Char,
        Keyword::Int,
        Keyword::Long,
        Keyword::Float,
        Keyword::Double,
        Keyword::String,
        Keyword::Def,
        Keyword::Namesp,
        Keyword::Class,
        Keyword::True,
        Keyword::False,
    ]
    .into_iter()
    .map(|kw| (kw.as_str(), kw))
    .collect()
});

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::Char => "char",
            Keyword::Int => "int",
            Keyword::Long => "long",
            Keyword::Float => "float",
            Keyword::Double => "double",
            Keyword::String => "string",
            Keyword::Def => "def",
            Keyword::Namesp => "namesp",
            Keyword::Class => "class",
            Keyword::True => "true",
            Keyword::False => "false",
        }
    }

    /// Look up an identifier-shaped word.
    pub fn from_word(word: &str) -> Option<Keyword> {
        KEYWORDS.get(word).copied()
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if `word` is a reserved keyword.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains_key(word)
}

/// Token payload, one variant per token kind.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Raw numeric text such as `42` or `3.14`.
    Number(String),
    /// Decoded string contents (quotes and escaping backslashes removed).
    String(String),
    Char(char),
    Keyword(Keyword),
    Identifier(String),
    Punctuation(char),
    Operator(String),
}

/// A token and the position of its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, position: Position) -> Self {
        Self { kind, position }
    }

    pub fn is_punctuation(&self, ch: char) -> bool {
        matches!(self.kind, TokenKind::Punctuation(c) if c == ch)
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.kind, TokenKind::Keyword(kw) if kw == keyword)
    }

    pub fn is_operator(&self, op: &str) -> bool {
        matches!(&self.kind, TokenKind::Operator(o) if o == op)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::String(s) => write!(f, "string {:?}", s),
            TokenKind::Char(c) => write!(f, "char {:?}", c),
            TokenKind::Keyword(kw) => write!(f, "keyword '{}'", kw),
            TokenKind::Identifier(name) => write!(f, "identifier '{}'", name),
            TokenKind::Punctuation(c) => write!(f, "'{}'", c),
            TokenKind::Operator(op) => write!(f, "operator '{}'", op),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.position)
    }
}

/// What went wrong while lexing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("unterminated literal starting at {start}, expected closing {terminator:?}")]
    UnterminatedLiteral { terminator: char, start: Position },

    #[error("malformed number '{0}': more than one decimal point")]
    MalformedNumber(String),

    #[error("character literal must hold exactly one character, found {0:?}")]
    InvalidCharLiteral(String),
}

/// Lexer error with the position where lexing stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Lex error at {position}: {kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: Position,
}

impl LexError {
    pub fn position(&self) -> Position {
        self.position
    }
}

// Character classes

pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

pub fn is_id_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

pub fn is_id_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

pub fn is_operator_char(ch: char) -> bool {
    matches!(
        ch,
        '+' | '-' | '*' | '/' | '%' | '=' | '&' | '|' | '<' | '>' | '!'
    )
}

pub fn is_punctuation(ch: char) -> bool {
    matches!(ch, ',' | '.' | ';' | '(' | ')' | '{' | '}' | '[' | ']')
}

pub fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

const COMMENT_START: char = '#';

/// Lazy token stream over one source text.
pub struct Lexer {
    cursor: SourceCursor,
    peeked: Option<Token>,
    failed: bool,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(source: &str) -> Self {
        Self::from_cursor(SourceCursor::new(source))
    }

    pub fn from_cursor(cursor: SourceCursor) -> Self {
        Self {
            cursor,
            peeked: None,
            failed: false,
        }
    }

    /// Next token without consuming it; `None` at end of input.
    pub fn peek(&mut self) -> Result<Option<&Token>, LexError> {
        if self.peeked.is_none() {
            self.peeked = self.produce_next()?;
        }
        Ok(self.peeked.as_ref())
    }

    /// Consume and return the next token; `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        match self.peeked.take() {
            Some(token) => Ok(Some(token)),
            None => self.produce_next(),
        }
    }

    pub fn at_end(&mut self) -> Result<bool, LexError> {
        Ok(self.peek()?.is_none())
    }

    /// Position of the character the cursor is about to read.
    pub fn position(&self) -> Position {
        match &self.peeked {
            Some(token) => token.position,
            None => self.cursor.position(),
        }
    }

    /// Drain the rest of the stream.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        self.by_ref().collect()
    }

    fn produce_next(&mut self) -> Result<Option<Token>, LexError> {
        loop {
            self.read_while(is_whitespace);

            let Some(ch) = self.cursor.peek() else {
                return Ok(None);
            };

            if ch == COMMENT_START {
                self.skip_comment();
                continue;
            }

            let position = self.cursor.position();
            let kind = match ch {
                '"' => TokenKind::String(self.scan_escaped('"')?),
                '\'' => TokenKind::Char(self.scan_char()?),
                c if is_digit(c) => TokenKind::Number(self.scan_number()?),
                c if is_id_start(c) => self.scan_word(),
                c if is_punctuation(c) => {
                    self.cursor.next();
                    TokenKind::Punctuation(c)
                }
                c if is_operator_char(c) => TokenKind::Operator(self.read_while(is_operator_char)),
                c => return Err(self.fail(self.cursor.error(LexErrorKind::UnexpectedChar(c)))),
            };

            trace!(
                target: "lumen::lexer",
                kind = %kind,
                line = position.line,
                column = position.column,
                "Produced token"
            );
            return Ok(Some(Token::new(kind, position)));
        }
    }

    /// Consume characters while `pred` holds.
    fn read_while(&mut self, mut pred: impl FnMut(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(ch) = self.cursor.peek() {
            if !pred(ch) {
                break;
            }
            text.push(ch);
            self.cursor.next();
        }
        text
    }

    /// Skip `# ...` through the end of the line, newline included.
    fn skip_comment(&mut self) {
        let start = self.cursor.position();
        let comment = self.read_while(|ch| ch != '\n');
        self.cursor.next();
        trace!(
            target: "lumen::lexer",
            line = start.line,
            len = comment.len(),
            "Skipped comment"
        );
    }

    /// Digits with at most one decimal point.
    fn scan_number(&mut self) -> Result<String, LexError> {
        let mut text = String::new();
        let mut seen_dot = false;

        while let Some(ch) = self.cursor.peek() {
            if ch == '.' {
                if seen_dot {
                    text.push(ch);
                    let err = self.cursor.error(LexErrorKind::MalformedNumber(text));
                    return Err(self.fail(err));
                }
                seen_dot = true;
            } else if !is_digit(ch) {
                break;
            }
            text.push(ch);
            self.cursor.next();
        }

        Ok(text)
    }

    fn scan_word(&mut self) -> TokenKind {
        let word = self.read_while(is_id_continue);
        match Keyword::from_word(&word) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Identifier(word),
        }
    }

    /// Scan a quoted literal, starting at the opening quote.
    ///
    /// A backslash makes the following character literal; no escape letters
    /// are interpreted, so `\n` decodes to `n`.
    fn scan_escaped(&mut self, terminator: char) -> Result<String, LexError> {
        let start = self.cursor.position();
        self.cursor.next();

        let mut value = String::new();
        let mut escaped = false;

        while let Some(ch) = self.cursor.next() {
            if escaped {
                value.push(ch);
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == terminator {
                return Ok(value);
            } else {
                value.push(ch);
            }
        }

        let err = self
            .cursor
            .error(LexErrorKind::UnterminatedLiteral { terminator, start });
        Err(self.fail(err))
    }

    fn scan_char(&mut self) -> Result<char, LexError> {
        let start = self.cursor.position();
        let value = self.scan_escaped('\'')?;

        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(ch),
            _ => Err(self.fail(LexError {
                kind: LexErrorKind::InvalidCharLiteral(value),
                position: start,
            })),
        }
    }

    fn fail(&mut self, err: LexError) -> LexError {
        debug!(target: "lumen::lexer", error = %err, "Lex error");
        self.failed = true;
        err
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, LexError>;

    /// Yields tokens until end of input or the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.next_token().transpose()
    }
}
