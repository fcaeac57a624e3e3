use std::io::Read;

use logos::Logos;

use crate::error::{LexError, Span};
use crate::token::{Keyword, Operator, Token};

/// A token paired with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Why a raw match was rejected. Mapped to [`LexError`] once the span is known.
#[derive(Debug, Clone, PartialEq, Default)]
enum LexFault {
    #[default]
    InvalidCharacter,
    InvalidNumber,
    UnterminatedString,
    IncompleteOperator,
    TruncatedOperator,
}

/// Raw lexemes as matched by logos.
///
/// Whitespace is skipped automatically. Keyword and boolean spellings are
/// exact tokens, so they win over the identifier pattern on equal length.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexFault)]
#[logos(skip r"\s+")]
enum RawToken {
    #[regex(r"[0-9][0-9.]*", numeric_literal)]
    Number(Numeric),

    #[token("true", |_| true)]
    #[token("false", |_| false)]
    Bool(bool),

    #[token("type", |_| Keyword::Type)]
    #[token("validate", |_| Keyword::Validate)]
    #[token("on", |_| Keyword::On)]
    #[token("allow", |_| Keyword::Allow)]
    #[token("disallow", |_| Keyword::Disallow)]
    #[token("if", |_| Keyword::If)]
    #[token("is", |_| Keyword::Is)]
    #[token("not", |_| Keyword::Not)]
    #[token("empty", |_| Keyword::Empty)]
    #[token("and", |_| Keyword::And)]
    #[token("or", |_| Keyword::Or)]
    Keyword(Keyword),

    #[regex(r"[\p{L}_][\p{L}\p{Nd}_]*", |lex| lex.slice().to_owned())]
    Ident(String),

    #[token("\"", string_literal)]
    Str(String),

    #[token("{")]
    LCurly,

    #[token("}")]
    RCurly,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(";")]
    Semi,

    #[token(",")]
    Comma,

    #[token("-", |lex| extendable(lex, Operator::Minus))]
    #[token("->", |_| Operator::Arrow)]
    #[token("+", |_| Operator::Plus)]
    #[token(">", |lex| extendable(lex, Operator::Gt))]
    #[token(">=", |_| Operator::Ge)]
    #[token("<", |lex| extendable(lex, Operator::Lt))]
    #[token("<=", |_| Operator::Le)]
    #[token("=", |_| Operator::Assign)]
    #[token("!=", |_| Operator::NotEq)]
    #[token("!", incomplete_operator)]
    #[token("%", |_| Operator::Percent)]
    Operator(Operator),
}

#[derive(Debug, Clone, PartialEq)]
struct Numeric {
    is_float: bool,
    text: String,
}

/// Digits with at most one `.`; a doubled leading zero is rejected.
fn numeric_literal(lex: &mut logos::Lexer<RawToken>) -> Result<Numeric, LexFault> {
    let text = lex.slice();
    let dots = text.matches('.').count();
    if dots > 1 || text.starts_with("00") {
        return Err(LexFault::InvalidNumber);
    }
    Ok(Numeric {
        is_float: dots == 1,
        text: text.to_owned(),
    })
}

/// Everything up to the next `"` is taken verbatim; there are no escapes.
fn string_literal(lex: &mut logos::Lexer<RawToken>) -> Result<String, LexFault> {
    let rest = lex.remainder();
    match rest.find('"') {
        Some(end) => {
            let contents = rest[..end].to_owned();
            lex.bump(end + 1);
            Ok(contents)
        }
        None => {
            lex.bump(rest.len());
            Err(LexFault::UnterminatedString)
        }
    }
}

/// `-`, `>` and `<` may take a second character, so input must not end
/// right after them.
fn extendable(
    lex: &mut logos::Lexer<RawToken>,
    operator: Operator,
) -> Result<Operator, LexFault> {
    if lex.remainder().is_empty() {
        Err(LexFault::TruncatedOperator)
    } else {
        Ok(operator)
    }
}

fn incomplete_operator(_: &mut logos::Lexer<RawToken>) -> Result<Operator, LexFault> {
    Err(LexFault::IncompleteOperator)
}

impl RawToken {
    fn into_token(self) -> Token {
        match self {
            Self::Number(Numeric { is_float: true, text }) => Token::Float(text),
            Self::Number(Numeric { is_float: false, text }) => Token::Int(text),
            Self::Bool(value) => Token::Bool(value),
            Self::Keyword(kw) => Token::Keyword(kw),
            Self::Ident(name) => Token::Ident(name),
            Self::Str(contents) => Token::Str(contents),
            Self::LCurly => Token::LCurly,
            Self::RCurly => Token::RCurly,
            Self::LParen => Token::LParen,
            Self::RParen => Token::RParen,
            Self::Semi => Token::Semi,
            Self::Comma => Token::Comma,
            Self::Operator(op) => Token::Operator(op),
        }
    }
}

impl LexFault {
    fn into_error(self, source: &str, span: Span) -> LexError {
        let first = source
            .get(span.start..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        match self {
            Self::InvalidCharacter => LexError::InvalidCharacter {
                character: first,
                span,
            },
            Self::InvalidNumber => LexError::InvalidNumber {
                text: source.get(span.start..span.end).unwrap_or_default().to_owned(),
                span,
            },
            Self::UnterminatedString => LexError::UnterminatedString { span },
            Self::IncompleteOperator => LexError::IncompleteOperator {
                operator: first,
                span,
            },
            Self::TruncatedOperator => LexError::UnexpectedEndOfInput {
                operator: first,
                span,
            },
        }
    }
}

/// Tokenizes source text into a sequence of spanned tokens.
///
/// On success the sequence always ends with exactly one [`Token::Eof`]
/// whose span is the empty range at the end of the input.
///
/// # Errors
///
/// Returns the first [`LexError`] encountered; no partial token list is
/// produced.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, LexError> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = Span::new(range.start, range.end);
        match result {
            Ok(raw) => tokens.push(SpannedToken {
                token: raw.into_token(),
                span,
            }),
            Err(fault) => {
                let err = fault.into_error(source, span);
                tracing::debug!(error = %err, "lexing failed");
                return Err(err);
            }
        }
    }

    tokens.push(SpannedToken {
        token: Token::Eof,
        span: Span::new(source.len(), source.len()),
    });
    tracing::debug!(count = tokens.len(), "tokenized source");
    Ok(tokens)
}

/// Batch lexer over a readable byte stream.
///
/// The stream is drained completely before any token is produced.
pub struct Lexer<R> {
    reader: R,
}

impl<R: Read> Lexer<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads the whole stream and tokenizes it.
    ///
    /// # Errors
    ///
    /// Returns [`LexError::Read`] if the stream fails or is not valid UTF-8,
    /// otherwise the first lexical error in the text.
    pub fn lex(mut self) -> Result<Vec<SpannedToken>, LexError> {
        let mut source = String::new();
        self.reader.read_to_string(&mut source)?;
        tokenize(&source)
    }
}
