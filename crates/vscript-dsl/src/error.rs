use std::fmt;
use std::io;

use crate::token::{Keyword, TokenKind};

/// A byte-offset span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

impl Span {
    /// Creates a new span from start (inclusive) to end (exclusive).
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Errors raised while tokenizing source text.
///
/// The lexer stops at the first error; there is no resynchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LexError {
    /// A character that starts no token.
    InvalidCharacter { character: char, span: Span },

    /// A numeric literal with a doubled leading zero or more than one `.`.
    InvalidNumber { text: String, span: Span },

    /// End of input was reached before the closing `"`.
    UnterminatedString { span: Span },

    /// An operator lead character without its required second character.
    IncompleteOperator { operator: char, span: Span },

    /// Input ended right after `-`, `>` or `<`, before the optional second
    /// character could be read.
    UnexpectedEndOfInput { operator: char, span: Span },

    /// The underlying stream could not be read (including invalid UTF-8).
    Read { kind: io::ErrorKind, message: String },
}

impl LexError {
    /// The source span of the error, if it has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::InvalidCharacter { span, .. }
            | Self::InvalidNumber { span, .. }
            | Self::UnterminatedString { span }
            | Self::IncompleteOperator { span, .. }
            | Self::UnexpectedEndOfInput { span, .. } => Some(*span),
            Self::Read { .. } => None,
        }
    }
}

impl From<io::Error> for LexError {
    fn from(err: io::Error) -> Self {
        Self::Read {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCharacter { character, span } => {
                write!(f, "invalid token at {span}: {character:?}")
            }
            Self::InvalidNumber { text, span } => {
                write!(f, "invalid number '{text}' at {span}")
            }
            Self::UnterminatedString { span } => {
                write!(f, "unterminated string literal starting at {span}")
            }
            Self::IncompleteOperator { operator, span } => {
                write!(
                    f,
                    "incomplete operator '{operator}' at {span}: expected '{operator}='"
                )
            }
            Self::UnexpectedEndOfInput { operator, span } => {
                write!(f, "unexpected end of input after '{operator}' at {span}")
            }
            Self::Read { message, .. } => {
                write!(f, "failed to read source: {message}")
            }
        }
    }
}

impl std::error::Error for LexError {}

/// Errors raised while parsing a token sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// The current token has the wrong kind.
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        span: Span,
    },

    /// The current token has the right shape but not the required spelling,
    /// e.g. a keyword other than `on` after `validate`.
    UnexpectedLexeme {
        expected: String,
        found: String,
        span: Span,
    },

    /// A keyword that cannot start a declaration.
    InvalidKeyword { keyword: Keyword, span: Span },

    /// Conditions, groups or expressions nested past `limit` levels.
    NestingTooDeep { limit: usize, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::UnexpectedLexeme { span, .. }
            | Self::InvalidKeyword { span, .. }
            | Self::NestingTooDeep { span, .. } => *span,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken {
                expected,
                found,
                span,
            } => {
                write!(
                    f,
                    "unexpected token at {span}: expected {}, got {}",
                    expected.description(),
                    found.name()
                )
            }
            Self::UnexpectedLexeme {
                expected,
                found,
                span,
            } => {
                write!(
                    f,
                    "unexpected token at {span}: expected {expected}, found {found}"
                )
            }
            Self::InvalidKeyword { keyword, span } => {
                write!(
                    f,
                    "invalid keyword '{keyword}' at {span}: expected 'type' or 'validate'"
                )
            }
            Self::NestingTooDeep { limit, span } => {
                write!(f, "nesting too deep at {span}: more than {limit} levels")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Any error produced by the lex-then-parse pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DslError {
    Lex(LexError),
    Parse(ParseError),
}

impl DslError {
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lex(e) => e.span(),
            Self::Parse(e) => Some(e.span()),
        }
    }
}

impl From<LexError> for DslError {
    fn from(err: LexError) -> Self {
        Self::Lex(err)
    }
}

impl From<ParseError> for DslError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl fmt::Display for DslError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(e) => write!(f, "{e}"),
            Self::Parse(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DslError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Lex(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}
