use std::io::Read;

use crate::ast::{
    ArithOp, CompareOp, Condition, Expr, FieldDecl, Literal, Rule, Script, TypeDecl,
    ValidatorDecl, Verdict,
};
use crate::error::{DslError, ParseError, Span};
use crate::lexer::{tokenize, Lexer, SpannedToken};
use crate::token::{Keyword, Operator, Token, TokenKind};

/// How deep conditions and expressions may nest before parsing stops with
/// [`ParseError::NestingTooDeep`]. Chained binary operators count one
/// level per operator, so the finished tree is never deeper than this.
pub const MAX_NESTING: usize = 256;

/// Recursive descent parser for the vscript grammar.
///
/// Holds the complete token buffer and a forward-only cursor. Every
/// production is chosen from the current token alone; the first mismatch
/// is returned as the error.
pub struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    depth: usize,
}

impl Parser {
    /// Creates a parser over a lexed token sequence.
    ///
    /// A trailing [`Token::Eof`] is appended if the sequence lacks one.
    pub fn new(mut tokens: Vec<SpannedToken>) -> Self {
        if tokens.last().map(|st| &st.token) != Some(&Token::Eof) {
            let end = tokens.last().map_or(0, |st| st.span.end);
            tokens.push(SpannedToken {
                token: Token::Eof,
                span: Span::new(end, end),
            });
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Parses declarations until end of input.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`]; no partial script is produced.
    pub fn parse(mut self) -> Result<Script, ParseError> {
        let mut script = Script::default();

        while self.peek_token() != &Token::Eof {
            match self.parse_declaration()? {
                Declaration::Type(decl) => script.type_decls.push(decl),
                Declaration::Validator(decl) => script.validator_decls.push(decl),
            }
        }

        tracing::debug!(
            types = script.type_decls.len(),
            validators = script.validator_decls.len(),
            "parsed script"
        );
        Ok(script)
    }

    // -- Cursor helpers --

    fn peek(&self) -> &SpannedToken {
        &self.tokens[self.pos]
    }

    fn peek_token(&self) -> &Token {
        &self.peek().token
    }

    /// Returns the current token and moves past it, stopping at `Eof`.
    fn advance(&mut self) -> SpannedToken {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    /// Error for a current token of the wrong kind.
    fn mismatch(&self, expected: TokenKind) -> ParseError {
        let current = self.peek();
        ParseError::UnexpectedToken {
            expected,
            found: current.token.kind(),
            span: current.span,
        }
    }

    fn expect(&mut self, expected: TokenKind) -> Result<SpannedToken, ParseError> {
        if self.peek_token().kind() == expected {
            Ok(self.advance())
        } else {
            Err(self.mismatch(expected))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.peek_token() {
            Token::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.mismatch(TokenKind::Ident)),
        }
    }

    fn expect_string(&mut self) -> Result<String, ParseError> {
        match self.peek_token() {
            Token::Str(text) => {
                let text = text.clone();
                self.advance();
                Ok(text)
            }
            _ => Err(self.mismatch(TokenKind::String)),
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.peek_token().is_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(format!("'{keyword}'")))
        }
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        let matched = self.peek_token().is_keyword(keyword);
        if matched {
            self.advance();
        }
        matched
    }

    /// Claims one nesting level. Callers reset `depth` once the nested
    /// production returns.
    fn deepen(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING,
                span: self.peek().span,
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Runs `production` one nesting level down.
    fn nested<T>(
        &mut self,
        production: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.deepen()?;
        let result = production(self);
        self.depth -= 1;
        result
    }

    fn eat_operator(&mut self, operator: Operator) -> bool {
        let matched = self.peek_token().is_operator(operator);
        if matched {
            self.advance();
        }
        matched
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        let matched = self.peek_token().kind() == kind;
        if matched {
            self.advance();
        }
        matched
    }

    /// Error for a token that does not have the required spelling.
    fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        let current = self.peek();
        let kind = current.token.kind();
        let found = match (kind, current.token.lexeme()) {
            (
                TokenKind::LCurly
                | TokenKind::RCurly
                | TokenKind::LParen
                | TokenKind::RParen
                | TokenKind::Semi
                | TokenKind::Comma,
                _,
            )
            | (_, None) => kind.description().to_string(),
            (_, Some(text)) => format!("{} '{text}'", kind.description()),
        };
        ParseError::UnexpectedLexeme {
            expected: expected.into(),
            found,
            span: current.span,
        }
    }

    // -- Declarations --

    /// declaration = type_decl | validator_decl
    fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let span = self.peek().span;
        match self.peek_token() {
            Token::Keyword(Keyword::Type) => {
                self.advance();
                self.parse_type_decl().map(Declaration::Type)
            }
            Token::Keyword(Keyword::Validate) => {
                self.advance();
                self.parse_validator_decl().map(Declaration::Validator)
            }
            Token::Keyword(keyword) => Err(ParseError::InvalidKeyword {
                keyword: *keyword,
                span,
            }),
            _ => Err(self.mismatch(TokenKind::Keyword)),
        }
    }

    /// type_decl = "type" IDENT "{" field_decl* "}"
    fn parse_type_decl(&mut self) -> Result<TypeDecl, ParseError> {
        let name = self.expect_ident()?;
        self.expect(TokenKind::LCurly)?;

        let mut fields = Vec::new();
        while self.peek_token() != &Token::RCurly {
            fields.push(self.parse_field_decl()?);
        }
        self.expect(TokenKind::RCurly)?;

        tracing::trace!(name = %name, fields = fields.len(), "parsed type declaration");
        Ok(TypeDecl { name, fields })
    }

    /// field_decl = IDENT IDENT ";"
    fn parse_field_decl(&mut self) -> Result<FieldDecl, ParseError> {
        let field_type = self.expect_ident()?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::Semi)?;
        Ok(FieldDecl { field_type, name })
    }

    /// validator_decl = "validate" "on" IDENT "(" param_list? ")" ("if" condition)?
    ///                  "{" rule* "}"
    fn parse_validator_decl(&mut self) -> Result<ValidatorDecl, ParseError> {
        self.expect_keyword(Keyword::On)?;
        let target = self.expect_ident()?;

        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if self.peek_token() != &Token::RParen {
            loop {
                params.push(self.expect_ident()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        let guard = if self.eat_keyword(Keyword::If) {
            Some(self.parse_condition()?)
        } else {
            None
        };

        self.expect(TokenKind::LCurly)?;
        let mut rules = Vec::new();
        while self.peek_token() != &Token::RCurly {
            rules.push(self.parse_rule()?);
        }
        self.expect(TokenKind::RCurly)?;

        tracing::trace!(on = %target, rules = rules.len(), "parsed validator declaration");
        Ok(ValidatorDecl {
            target,
            params,
            guard,
            rules,
        })
    }

    /// rule = ("allow" | "disallow") condition ("->" STRING)? ";"?
    ///      | "validate" IDENT "(" arg_list? ")" ";"?
    fn parse_rule(&mut self) -> Result<Rule, ParseError> {
        let verdict = match self.peek_token() {
            Token::Keyword(Keyword::Allow) => Verdict::Allow,
            Token::Keyword(Keyword::Disallow) => Verdict::Disallow,
            Token::Keyword(Keyword::Validate) => {
                self.advance();
                let rule = self.parse_validate_call()?;
                self.eat(TokenKind::Semi);
                return Ok(rule);
            }
            _ => return Err(self.unexpected("'allow', 'disallow' or 'validate'")),
        };
        self.advance();

        let condition = self.parse_condition()?;
        let message = if self.eat_operator(Operator::Arrow) {
            Some(self.expect_string()?)
        } else {
            None
        };
        self.eat(TokenKind::Semi);

        Ok(Rule::Check {
            verdict,
            condition,
            message,
        })
    }

    /// validate_call = IDENT "(" (expr ("," expr)*)? ")"
    /// The "validate" keyword has already been consumed.
    fn parse_validate_call(&mut self) -> Result<Rule, ParseError> {
        let field = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;

        let mut args = Vec::new();
        if self.peek_token() != &Token::RParen {
            loop {
                args.push(self.parse_expr()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        Ok(Rule::Validate { field, args })
    }

    // -- Conditions --

    /// condition = and_cond ("or" and_cond)*
    fn parse_condition(&mut self) -> Result<Condition, ParseError> {
        let base = self.depth;
        let mut left = self.parse_and_condition()?;
        while self.eat_keyword(Keyword::Or) {
            self.deepen()?;
            let right = self.parse_and_condition()?;
            left = Condition::or(left, right);
        }
        self.depth = base;
        Ok(left)
    }

    /// and_cond = not_cond ("and" not_cond)*
    fn parse_and_condition(&mut self) -> Result<Condition, ParseError> {
        let base = self.depth;
        let mut left = self.parse_not_condition()?;
        while self.eat_keyword(Keyword::And) {
            self.deepen()?;
            let right = self.parse_not_condition()?;
            left = Condition::and(left, right);
        }
        self.depth = base;
        Ok(left)
    }

    /// not_cond = "not" not_cond | atom_cond
    fn parse_not_condition(&mut self) -> Result<Condition, ParseError> {
        if self.eat_keyword(Keyword::Not) {
            let inner = self.nested(Self::parse_not_condition)?;
            return Ok(Condition::negate(inner));
        }
        self.parse_atom_condition()
    }

    /// atom_cond = "(" condition ")" | expr (compare_op expr | "is" "not"? "empty")?
    fn parse_atom_condition(&mut self) -> Result<Condition, ParseError> {
        if self.eat(TokenKind::LParen) {
            let inner = self.nested(Self::parse_condition)?;
            self.expect(TokenKind::RParen)?;
            return Ok(inner);
        }

        let left = self.parse_expr()?;

        if self.eat_keyword(Keyword::Is) {
            let negated = self.eat_keyword(Keyword::Not);
            self.expect_keyword(Keyword::Empty)?;
            return Ok(Condition::IsEmpty {
                operand: left,
                negated,
            });
        }

        match self.peek_compare_op() {
            Some(op) => {
                self.advance();
                let right = self.parse_expr()?;
                Ok(Condition::Compare { left, op, right })
            }
            None => Ok(Condition::Value { expr: left }),
        }
    }

    fn peek_compare_op(&self) -> Option<CompareOp> {
        match self.peek_token() {
            Token::Operator(Operator::Assign) => Some(CompareOp::Eq),
            Token::Operator(Operator::NotEq) => Some(CompareOp::NotEq),
            Token::Operator(Operator::Lt) => Some(CompareOp::Lt),
            Token::Operator(Operator::Le) => Some(CompareOp::Le),
            Token::Operator(Operator::Gt) => Some(CompareOp::Gt),
            Token::Operator(Operator::Ge) => Some(CompareOp::Ge),
            _ => None,
        }
    }

    // -- Expressions --

    /// expr = term (("+" | "-") term)*
    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let base = self.depth;
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek_token() {
                Token::Operator(Operator::Plus) => ArithOp::Add,
                Token::Operator(Operator::Minus) => ArithOp::Sub,
                _ => break,
            };
            self.advance();
            self.deepen()?;
            let right = self.parse_term()?;
            left = Expr::binary(left, op, right);
        }
        self.depth = base;
        Ok(left)
    }

    /// term = unary ("%" unary)*
    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let base = self.depth;
        let mut left = self.parse_unary()?;
        while self.eat_operator(Operator::Percent) {
            self.deepen()?;
            let right = self.parse_unary()?;
            left = Expr::binary(left, ArithOp::Rem, right);
        }
        self.depth = base;
        Ok(left)
    }

    /// unary = "-" unary | primary
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.eat_operator(Operator::Minus) {
            let operand = self.nested(Self::parse_unary)?;
            return Ok(Expr::Neg {
                operand: Box::new(operand),
            });
        }
        self.parse_primary()
    }

    /// primary = INT | FLOAT | BOOL | STRING | IDENT
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let expr = match self.peek_token() {
            Token::Int(text) => Expr::Literal {
                value: Literal::Int(text.clone()),
            },
            Token::Float(text) => Expr::Literal {
                value: Literal::Float(text.clone()),
            },
            Token::Bool(value) => Expr::Literal {
                value: Literal::Bool(*value),
            },
            Token::Str(text) => Expr::Literal {
                value: Literal::Str(text.clone()),
            },
            Token::Ident(name) => Expr::Ident { name: name.clone() },
            _ => return Err(self.unexpected("literal or identifier")),
        };
        self.advance();
        Ok(expr)
    }
}

enum Declaration {
    Type(TypeDecl),
    Validator(ValidatorDecl),
}

/// Parse vscript source text into a [`Script`].
///
/// # Errors
///
/// Returns [`DslError::Lex`] if tokenizing fails (parsing never starts) or
/// [`DslError::Parse`] for the first grammar violation.
pub fn parse(source: &str) -> Result<Script, DslError> {
    let tokens = tokenize(source)?;
    Ok(Parser::new(tokens).parse()?)
}

/// Parse vscript source read from a stream.
///
/// The stream is drained completely before parsing begins.
///
/// # Errors
///
/// Same as [`parse`], plus [`crate::LexError::Read`] for stream failures.
pub fn parse_reader<R: Read>(reader: R) -> Result<Script, DslError> {
    let tokens = Lexer::new(reader).lex()?;
    Ok(Parser::new(tokens).parse()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Helper --
    fn parse_ok(source: &str) -> Script {
        parse(source).expect("parse should succeed")
    }

    fn parse_err(source: &str) -> ParseError {
        match parse(source) {
            Err(DslError::Parse(e)) => e,
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    fn only_validator(source: &str) -> ValidatorDecl {
        let script = parse_ok(source);
        assert_eq!(script.validator_decls.len(), 1, "expected exactly one validator");
        script.validator_decls.into_iter().next().unwrap()
    }

    fn guard_of(source: &str) -> Condition {
        only_validator(source).guard.expect("validator should have a guard")
    }

    // -- Type declarations --

    #[test]
    fn parse_payload_type() {
        let script = parse_ok("type Payload { string name; int age; }");
        assert_eq!(script.type_decls.len(), 1);
        assert!(script.validator_decls.is_empty());
        let decl = &script.type_decls[0];
        assert_eq!(decl.name, "Payload");
        assert_eq!(
            decl.fields,
            vec![FieldDecl::new("string", "name"), FieldDecl::new("int", "age")]
        );
    }

    #[test]
    fn parse_empty_type_body() {
        let script = parse_ok("type Empty {}");
        assert_eq!(script.type_decls[0].name, "Empty");
        assert!(script.type_decls[0].fields.is_empty());
    }

    #[test]
    fn parse_multiple_types_in_order() {
        let script = parse_ok("type A { int x; } type B { A a; A b; }");
        let names: Vec<&str> = script.type_decls.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(script.type_decls[1].fields.len(), 2);
    }

    #[test]
    fn duplicate_field_names_are_kept() {
        let script = parse_ok("type A { int x; string x; }");
        assert_eq!(script.type_decls[0].fields.len(), 2);
    }

    #[test]
    fn whitespace_only_is_empty_script() {
        let script = parse_ok(" \n\t ");
        assert!(script.is_empty());
    }

    #[test]
    fn missing_type_name() {
        let err = parse_err("type { }");
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                expected: TokenKind::Ident,
                found: TokenKind::LCurly,
                span: Span::new(5, 6),
            }
        );
    }

    #[test]
    fn missing_semicolon() {
        let err = parse_err("type A { int x }");
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                expected: TokenKind::Semi,
                found: TokenKind::RCurly,
                ..
            }
        ));
    }

    #[test]
    fn unterminated_type_body() {
        let err = parse_err("type A { int x;");
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                expected: TokenKind::Ident,
                found: TokenKind::Eof,
                ..
            }
        ));
    }

    #[test]
    fn keyword_as_field_type_is_rejected() {
        let err = parse_err("type A { type x; }");
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                expected: TokenKind::Ident,
                found: TokenKind::Keyword,
                ..
            }
        ));
    }

    #[test]
    fn declaration_must_start_with_keyword() {
        let err = parse_err("Payload { }");
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                expected: TokenKind::Keyword,
                found: TokenKind::Ident,
                ..
            }
        ));
    }

    #[test]
    fn invalid_leading_keyword() {
        let err = parse_err("allow x");
        assert_eq!(
            err,
            ParseError::InvalidKeyword {
                keyword: Keyword::Allow,
                span: Span::new(0, 5),
            }
        );
    }

    #[test]
    fn lex_errors_short_circuit() {
        let err = parse("type A { int x; } #").unwrap_err();
        assert!(matches!(err, DslError::Lex(_)));
    }

    #[test]
    fn parser_appends_missing_eof() {
        let tokens = vec![
            SpannedToken {
                token: Token::Keyword(Keyword::Type),
                span: Span::new(0, 4),
            },
            SpannedToken {
                token: Token::Ident("A".into()),
                span: Span::new(5, 6),
            },
        ];
        let err = Parser::new(tokens).parse().unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                expected: TokenKind::LCurly,
                found: TokenKind::Eof,
                span: Span::new(6, 6),
            }
        );
    }

    #[test]
    fn parser_over_empty_buffer() {
        let script = Parser::new(Vec::new()).parse().unwrap();
        assert!(script.is_empty());
    }

    // -- Validator declarations --

    #[test]
    fn parse_minimal_validator() {
        let decl = only_validator("validate on Payload() { }");
        assert_eq!(decl.target, "Payload");
        assert!(decl.params.is_empty());
        assert!(decl.guard.is_none());
        assert!(decl.rules.is_empty());
    }

    #[test]
    fn parse_validator_params() {
        let decl = only_validator("validate on Payload(version, min_age) { }");
        assert_eq!(decl.params, ["version", "min_age"]);
    }

    #[test]
    fn parse_check_rules_with_messages() {
        let decl = only_validator(
            r#"validate on Payload() {
                disallow name is empty -> "Item name is empty";
                allow age >= 18
            }"#,
        );
        assert_eq!(decl.rules.len(), 2);
        assert_eq!(
            decl.rules[0],
            Rule::Check {
                verdict: Verdict::Disallow,
                condition: Condition::IsEmpty {
                    operand: Expr::ident("name"),
                    negated: false,
                },
                message: Some("Item name is empty".into()),
            }
        );
        assert_eq!(
            decl.rules[1],
            Rule::Check {
                verdict: Verdict::Allow,
                condition: Condition::compare(Expr::ident("age"), CompareOp::Ge, Expr::int("18")),
                message: None,
            }
        );
    }

    #[test]
    fn parse_nested_validate_call() {
        let decl = only_validator("validate on Payload(version) { validate metadata(version, 0); }");
        assert_eq!(
            decl.rules,
            vec![Rule::Validate {
                field: "metadata".into(),
                args: vec![Expr::ident("version"), Expr::int("0")],
            }]
        );
    }

    #[test]
    fn parse_validate_call_without_args() {
        let decl = only_validator("validate on P() { validate inner() }");
        assert_eq!(
            decl.rules,
            vec![Rule::Validate {
                field: "inner".into(),
                args: vec![],
            }]
        );
    }

    #[test]
    fn guard_and_binds_tighter_than_or() {
        let guard = guard_of("validate on P() if a or b and c { }");
        let a = Condition::Value { expr: Expr::ident("a") };
        let b = Condition::Value { expr: Expr::ident("b") };
        let c = Condition::Value { expr: Expr::ident("c") };
        assert_eq!(guard, Condition::or(a, Condition::and(b, c)));
    }

    #[test]
    fn guard_connectives_are_left_associative() {
        let guard = guard_of("validate on P() if a or b or c { }");
        let a = Condition::Value { expr: Expr::ident("a") };
        let b = Condition::Value { expr: Expr::ident("b") };
        let c = Condition::Value { expr: Expr::ident("c") };
        assert_eq!(guard, Condition::or(Condition::or(a, b), c));
    }

    #[test]
    fn parenthesised_guard() {
        let guard = guard_of("validate on P() if (a or b) and not c { }");
        let a = Condition::Value { expr: Expr::ident("a") };
        let b = Condition::Value { expr: Expr::ident("b") };
        let c = Condition::Value { expr: Expr::ident("c") };
        assert_eq!(
            guard,
            Condition::and(Condition::or(a, b), Condition::negate(c))
        );
    }

    #[test]
    fn is_not_empty() {
        let guard = guard_of("validate on P() if name is not empty { }");
        assert_eq!(
            guard,
            Condition::IsEmpty {
                operand: Expr::ident("name"),
                negated: true,
            }
        );
    }

    #[test]
    fn arithmetic_precedence() {
        let guard = guard_of("validate on P() if a + b % 2 = -1 { }");
        let expected_left = Expr::binary(
            Expr::ident("a"),
            ArithOp::Add,
            Expr::binary(Expr::ident("b"), ArithOp::Rem, Expr::int("2")),
        );
        let expected_right = Expr::Neg {
            operand: Box::new(Expr::int("1")),
        };
        assert_eq!(
            guard,
            Condition::compare(expected_left, CompareOp::Eq, expected_right)
        );
    }

    #[test]
    fn all_comparison_operators() {
        for (text, op) in [
            ("=", CompareOp::Eq),
            ("!=", CompareOp::NotEq),
            ("<", CompareOp::Lt),
            ("<=", CompareOp::Le),
            (">", CompareOp::Gt),
            (">=", CompareOp::Ge),
        ] {
            let guard = guard_of(&format!("validate on P() if x {text} 1.5 {{ }}"));
            assert_eq!(
                guard,
                Condition::compare(
                    Expr::ident("x"),
                    op,
                    Expr::Literal {
                        value: Literal::Float("1.5".into()),
                    },
                )
            );
        }
    }

    #[test]
    fn literal_operands() {
        let guard = guard_of(r#"validate on P() if kind = "admin" or active = true { }"#);
        assert_eq!(
            guard,
            Condition::or(
                Condition::compare(Expr::ident("kind"), CompareOp::Eq, Expr::string("admin")),
                Condition::compare(
                    Expr::ident("active"),
                    CompareOp::Eq,
                    Expr::Literal {
                        value: Literal::Bool(true),
                    },
                ),
            )
        );
    }

    #[test]
    fn validator_requires_on() {
        let err = parse_err("validate Payload() { }");
        assert!(matches!(
            err,
            ParseError::UnexpectedLexeme { ref expected, .. } if expected == "'on'"
        ));
    }

    #[test]
    fn is_requires_empty() {
        let err = parse_err("validate on P() if name is blank { }");
        assert!(matches!(
            err,
            ParseError::UnexpectedLexeme { ref expected, ref found, .. }
                if expected == "'empty'" && found == "identifier 'blank'"
        ));
    }

    #[test]
    fn rule_must_start_with_rule_keyword() {
        let err = parse_err("validate on P() { age > 1 }");
        assert!(matches!(err, ParseError::UnexpectedLexeme { .. }));
    }

    #[test]
    fn message_must_be_string() {
        let err = parse_err("validate on P() { allow a -> b }");
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                expected: TokenKind::String,
                found: TokenKind::Ident,
                ..
            }
        ));
    }

    #[test]
    fn missing_operand() {
        let err = parse_err("validate on P() if age >= { }");
        assert!(matches!(
            err,
            ParseError::UnexpectedLexeme { ref found, .. } if found == "'{'"
        ));
    }

    #[test]
    fn types_and_validators_keep_their_own_order() {
        let script = parse_ok(
            "validate on B() { } type A { } validate on A() { } type B { }",
        );
        let types: Vec<&str> = script.type_decls.iter().map(|t| t.name.as_str()).collect();
        let targets: Vec<&str> = script
            .validator_decls
            .iter()
            .map(|v| v.target.as_str())
            .collect();
        assert_eq!(types, ["A", "B"]);
        assert_eq!(targets, ["B", "A"]);
        assert_eq!(script.validators_for("A").count(), 1);
    }

    fn assert_too_deep(source: &str) {
        let err = parse_err(source);
        assert!(
            matches!(err, ParseError::NestingTooDeep { limit: MAX_NESTING, .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn deep_not_chain_is_rejected() {
        assert_too_deep(&format!("validate on P() if {}a {{ }}", "not ".repeat(10_000)));
    }

    #[test]
    fn deep_parentheses_are_rejected() {
        assert_too_deep(&format!(
            "validate on P() if {}a{} {{ }}",
            "(".repeat(10_000),
            ")".repeat(10_000)
        ));
        // Unbalanced groups fail on depth before they can fail on ')'.
        assert_too_deep(&format!("validate on P() {{ allow {}", "(".repeat(10_000)));
    }

    #[test]
    fn deep_negation_is_rejected() {
        assert_too_deep(&format!("validate on P() if {}a {{ }}", "- ".repeat(10_000)));
    }

    #[test]
    fn long_operator_chains_are_rejected() {
        let ors = vec!["a"; 10_000].join(" or ");
        assert_too_deep(&format!("validate on P() if {ors} {{ }}"));
        let sums = vec!["1"; 10_000].join(" + ");
        assert_too_deep(&format!("validate on P() {{ allow {sums}; }}"));
    }

    #[test]
    fn nesting_error_points_at_the_overflowing_token() {
        let source = format!("validate on P() if {}a {{ }}", "not ".repeat(300));
        let err = parse_err(&source);
        // The first `not` past the limit is the one that fails.
        let offset = "validate on P() if ".len() + 4 * (MAX_NESTING + 1);
        assert_eq!(err.span(), Span::new(offset, offset + 3));
    }

    #[test]
    fn nesting_up_to_the_limit_parses() {
        let depth = MAX_NESTING / 2;
        let source = format!(
            "validate on P() if {}a{} {{ allow {}b; }}",
            "(".repeat(depth),
            ")".repeat(depth),
            "not ".repeat(depth)
        );
        let decl = only_validator(&source);
        assert!(decl.guard.is_some());
        assert_eq!(decl.rules.len(), 1);
    }

    #[test]
    fn sibling_groups_do_not_accumulate_depth() {
        let group = format!("{}a{}", "(".repeat(100), ")".repeat(100));
        let source = format!(
            "validate on P() {{ {} }}",
            vec![format!("allow {group};"); 20].join(" ")
        );
        assert_eq!(only_validator(&source).rules.len(), 20);
    }

    #[test]
    fn parse_from_reader() {
        let script = parse_reader("type Payload { string name; }".as_bytes()).unwrap();
        assert_eq!(script.type_decls[0].fields[0], FieldDecl::new("string", "name"));
    }
}
