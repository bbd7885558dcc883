//! Character cursor over an in-memory source text
//!
//! [`SourceCursor`] is the lowest layer of the front end. It owns the whole
//! source as a `Vec<char>` and hands characters to the [`Lexer`] one at a time,
//! keeping the line/column bookkeeping in a single place.
//!
//! [`Lexer`]: super::lexer::Lexer

use super::ast::Position;
use super::lexer::{LexError, LexErrorKind};

/// Single-position reader with one character of lookahead.
#[derive(Debug, Clone)]
pub struct SourceCursor {
    input: Vec<char>,
    offset: usize,
    position: Position,
}

impl SourceCursor {
    pub fn new(source: &str) -> Self {
        Self {
            input: source.chars().collect(),
            offset: 0,
            position: Position::start(),
        }
    }

    /// Current character, or `None` once the text is exhausted.
    pub fn peek(&self) -> Option<char> {
        self.input.get(self.offset).copied()
    }

    /// Consume and return the current character.
    pub fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.offset += 1;
        self.position = self.position.advanced_by(ch);
        Some(ch)
    }

    pub fn at_end(&self) -> bool {
        self.offset >= self.input.len()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Build an error located at the current position. The caller decides
    /// whether to return it.
    pub fn error(&self, kind: LexErrorKind) -> LexError {
        LexError {
            kind,
            position: self.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_does_not_consume() {
        let cursor = SourceCursor::new("ab");
        assert_eq!(cursor.peek(), Some('a'));
        assert_eq!(cursor.peek(), Some('a'));
        assert_eq!(cursor.position(), Position::new(1, 0));
    }

    #[test]
    fn test_next_tracks_lines_and_columns() {
        let mut cursor = SourceCursor::new("a\nbc");
        assert_eq!(cursor.next(), Some('a'));
        assert_eq!(cursor.position(), Position::new(1, 1));
        assert_eq!(cursor.next(), Some('\n'));
        assert_eq!(cursor.position(), Position::new(2, 0));
        assert_eq!(cursor.next(), Some('b'));
        assert_eq!(cursor.next(), Some('c'));
        assert_eq!(cursor.position(), Position::new(2, 2));
        assert!(cursor.at_end());
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.position(), Position::new(2, 2));
    }

    #[test]
    fn test_empty_source() {
        let cursor = SourceCursor::new("");
        assert!(cursor.at_end());
        assert_eq!(cursor.peek(), None);
    }

    #[test]
    fn test_error_carries_position() {
        let mut cursor = SourceCursor::new("x\n?");
        cursor.next();
        cursor.next();
        let err = cursor.error(LexErrorKind::UnexpectedChar('?'));
        assert_eq!(err.position, Position::new(2, 0));
        assert!(matches!(err.kind, LexErrorKind::UnexpectedChar('?')));
    }

    #[test]
    fn test_multibyte_characters() {
        let mut cursor = SourceCursor::new("é\"");
        assert_eq!(cursor.next(), Some('é'));
        assert_eq!(cursor.peek(), Some('"'));
    }
}
