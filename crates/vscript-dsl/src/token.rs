use std::fmt;

/// Reserved words of the language.
///
/// An identifier-shaped run that spells one of these is always lexed as
/// [`Token::Keyword`], never as [`Token::Ident`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Type,
    Validate,
    On,
    Allow,
    Disallow,
    If,
    Is,
    Not,
    Empty,
    And,
    Or,
}

impl Keyword {
    /// Every keyword, in declaration order.
    pub const ALL: [Keyword; 11] = [
        Self::Type,
        Self::Validate,
        Self::On,
        Self::Allow,
        Self::Disallow,
        Self::If,
        Self::Is,
        Self::Not,
        Self::Empty,
        Self::And,
        Self::Or,
    ];

    /// The source spelling of this keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Validate => "validate",
            Self::On => "on",
            Self::Allow => "allow",
            Self::Disallow => "disallow",
            Self::If => "if",
            Self::Is => "is",
            Self::Not => "not",
            Self::Empty => "empty",
            Self::And => "and",
            Self::Or => "or",
        }
    }

    /// Looks up a keyword by its exact (case-sensitive) spelling.
    pub fn lookup(text: &str) -> Option<Keyword> {
        Self::ALL.into_iter().find(|kw| kw.as_str() == text)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operators recognised by the lexer.
///
/// Two-character operators are only formed from the fixed extension table:
/// `-` may extend to `->`, `>` to `>=`, `<` to `<=`, and `!` must extend to
/// `!=`. `+`, `=` and `%` never extend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Minus,
    Arrow,
    Plus,
    Gt,
    Ge,
    Lt,
    Le,
    Assign,
    NotEq,
    Percent,
}

impl Operator {
    /// The source spelling of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minus => "-",
            Self::Arrow => "->",
            Self::Plus => "+",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Assign => "=",
            Self::NotEq => "!=",
            Self::Percent => "%",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The lexical category of a token, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    Int,
    Float,
    Bool,
    String,
    Ident,
    Keyword,
    LCurly,
    RCurly,
    LParen,
    RParen,
    Semi,
    Comma,
    Operator,
}

impl TokenKind {
    /// Stable short name of this kind, used in token dumps and `Display`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Eof => "EOF",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::Bool => "Bool",
            Self::String => "String",
            Self::Ident => "Ident",
            Self::Keyword => "Keyword",
            Self::LCurly => "LCurly",
            Self::RCurly => "RCurly",
            Self::LParen => "LParen",
            Self::RParen => "RParen",
            Self::Semi => "Semi",
            Self::Comma => "Comma",
            Self::Operator => "Operator",
        }
    }

    /// Returns a human-readable description of this token kind.
    pub fn description(self) -> &'static str {
        match self {
            Self::Eof => "end of input",
            Self::Int => "integer literal",
            Self::Float => "float literal",
            Self::Bool => "boolean literal",
            Self::String => "string literal",
            Self::Ident => "identifier",
            Self::Keyword => "keyword",
            Self::LCurly => "'{'",
            Self::RCurly => "'}'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::Semi => "';'",
            Self::Comma => "','",
            Self::Operator => "operator",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified lexical unit.
///
/// Numeric literals keep their source text verbatim; they are never
/// converted to numbers at this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Eof,
    Int(String),
    Float(String),
    Bool(bool),
    Str(String),
    Ident(String),
    Keyword(Keyword),
    LCurly,
    RCurly,
    LParen,
    RParen,
    Semi,
    Comma,
    Operator(Operator),
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Self::Eof => TokenKind::Eof,
            Self::Int(_) => TokenKind::Int,
            Self::Float(_) => TokenKind::Float,
            Self::Bool(_) => TokenKind::Bool,
            Self::Str(_) => TokenKind::String,
            Self::Ident(_) => TokenKind::Ident,
            Self::Keyword(_) => TokenKind::Keyword,
            Self::LCurly => TokenKind::LCurly,
            Self::RCurly => TokenKind::RCurly,
            Self::LParen => TokenKind::LParen,
            Self::RParen => TokenKind::RParen,
            Self::Semi => TokenKind::Semi,
            Self::Comma => TokenKind::Comma,
            Self::Operator(_) => TokenKind::Operator,
        }
    }

    /// The token's value as text, or `None` for end of input.
    ///
    /// String literals yield their contents without the surrounding quotes.
    pub fn lexeme(&self) -> Option<&str> {
        match self {
            Self::Eof => None,
            Self::Int(text)
            | Self::Float(text)
            | Self::Str(text)
            | Self::Ident(text) => Some(text),
            Self::Bool(true) => Some("true"),
            Self::Bool(false) => Some("false"),
            Self::Keyword(kw) => Some(kw.as_str()),
            Self::Operator(op) => Some(op.as_str()),
            Self::LCurly => Some("{"),
            Self::RCurly => Some("}"),
            Self::LParen => Some("("),
            Self::RParen => Some(")"),
            Self::Semi => Some(";"),
            Self::Comma => Some(","),
        }
    }

    /// Returns true if this token is the given keyword.
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self, Self::Keyword(kw) if *kw == keyword)
    }

    /// Returns true if this token is the given operator.
    pub fn is_operator(&self, operator: Operator) -> bool {
        matches!(self, Self::Operator(op) if *op == operator)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lexeme() {
            Some(value) => write!(f, "{} ({value})", self.kind()),
            None => write!(f, "{}", self.kind()),
        }
    }
}
