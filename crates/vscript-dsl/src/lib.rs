//! # vscript-dsl
//!
//! Lexer and parser for the vscript data-declaration language.
//!
//! This crate provides:
//! - A lexer that tokenizes source text or any readable stream
//! - A recursive descent parser that produces a [`Script`] of type and
//!   validator declarations
//! - A printer that converts a [`Script`] back to canonical DSL text
//! - Round-trip fidelity: `parse(print(script))` produces an equal AST
//!
//! # Example
//!
//! ```
//! use vscript_dsl::{parse, print};
//!
//! let source = r#"
//! type Payload {
//!     string name;
//!     int age;
//! }
//!
//! validate on Payload() if age > 0 {
//!     disallow name is empty -> "Item name is empty";
//! }
//! "#;
//!
//! let script = parse(source).expect("parse failed");
//! assert_eq!(script.type_decls.len(), 1);
//! assert_eq!(script.type_decls[0].name, "Payload");
//! assert_eq!(script.validator_decls[0].rules.len(), 1);
//!
//! let dsl_text = print(&script);
//! assert!(dsl_text.contains("type Payload {"));
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod token;

pub use ast::Script;
pub use error::{DslError, LexError, ParseError, Span};
pub use lexer::{tokenize, Lexer, SpannedToken};
pub use parser::{parse, parse_reader, Parser, MAX_NESTING};
pub use printer::{print, print_type, print_validator};
pub use token::{Keyword, Operator, Token, TokenKind};
