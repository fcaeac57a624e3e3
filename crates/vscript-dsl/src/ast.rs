//! Syntax tree produced by the parser.
//!
//! Nodes are plain owned values built bottom-up; [`Script`] is the only
//! root. `Display` on declarations renders a compact debugging tree, while
//! conditions and expressions display in source syntax.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The parse root: every declaration of a source file, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub type_decls: Vec<TypeDecl>,
    #[serde(default)]
    pub validator_decls: Vec<ValidatorDecl>,
}

impl Script {
    /// Returns the type declaration with the given name, if any.
    pub fn type_decl(&self, name: &str) -> Option<&TypeDecl> {
        self.type_decls.iter().find(|t| t.name == name)
    }

    /// Returns all validators targeting the given type, in source order.
    pub fn validators_for<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a ValidatorDecl> {
        self.validator_decls.iter().filter(move |v| v.target == target)
    }

    pub fn is_empty(&self) -> bool {
        self.type_decls.is_empty() && self.validator_decls.is_empty()
    }
}

/// One `type Name { ... }` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDecl>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Returns the first field with the given name.
    ///
    /// Field names are not required to be unique at this layer.
    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One `TypeName fieldName;` member of a type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub field_type: String,
    pub name: String,
}

impl FieldDecl {
    pub fn new(field_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            field_type: field_type.into(),
            name: name.into(),
        }
    }
}

/// A `validate on Target(params) if guard { rules }` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorDecl {
    pub target: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<Condition>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// Whether a check rule accepts or rejects values matching its condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Allow,
    Disallow,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Disallow => "disallow",
        }
    }
}

/// A single statement inside a validator body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    /// `allow|disallow condition [-> "message"]`
    Check {
        verdict: Verdict,
        condition: Condition,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// `validate field(args)`: delegate to the validators of a nested value.
    Validate {
        field: String,
        #[serde(default)]
        args: Vec<Expr>,
    },
}

/// Comparison operators usable in conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// Boolean conditions used by guards and check rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cond", rename_all = "snake_case")]
pub enum Condition {
    Or {
        left: Box<Condition>,
        right: Box<Condition>,
    },
    And {
        left: Box<Condition>,
        right: Box<Condition>,
    },
    Not {
        inner: Box<Condition>,
    },
    Compare {
        left: Expr,
        op: CompareOp,
        right: Expr,
    },
    /// `operand is empty` / `operand is not empty`
    IsEmpty { operand: Expr, negated: bool },
    /// A bare operand used as a boolean.
    Value { expr: Expr },
}

impl Condition {
    pub fn or(left: Condition, right: Condition) -> Self {
        Self::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Condition, right: Condition) -> Self {
        Self::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn negate(inner: Condition) -> Self {
        Self::Not {
            inner: Box::new(inner),
        }
    }

    pub fn compare(left: Expr, op: CompareOp, right: Expr) -> Self {
        Self::Compare { left, op, right }
    }

    /// Binding strength: `or` < `and` < `not` < atoms.
    fn precedence(&self) -> u8 {
        match self {
            Self::Or { .. } => 1,
            Self::And { .. } => 2,
            Self::Not { .. } => 3,
            Self::Compare { .. } | Self::IsEmpty { .. } | Self::Value { .. } => 4,
        }
    }

    /// Writes the condition, parenthesising it when it binds looser than `min`.
    fn write_with(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        let wrap = self.precedence() < min;
        if wrap {
            f.write_str("(")?;
        }
        match self {
            // Both connectives are left-associative, so a right operand of
            // equal strength needs parentheses to keep its shape.
            Self::Or { left, right } => {
                left.write_with(f, 1)?;
                f.write_str(" or ")?;
                right.write_with(f, 2)?;
            }
            Self::And { left, right } => {
                left.write_with(f, 2)?;
                f.write_str(" and ")?;
                right.write_with(f, 3)?;
            }
            Self::Not { inner } => {
                f.write_str("not ")?;
                inner.write_with(f, 3)?;
            }
            Self::Compare { left, op, right } => {
                write!(f, "{left} {} {right}", op.as_str())?;
            }
            Self::IsEmpty { operand, negated } => {
                if *negated {
                    write!(f, "{operand} is not empty")?;
                } else {
                    write!(f, "{operand} is empty")?;
                }
            }
            Self::Value { expr } => write!(f, "{expr}")?,
        }
        if wrap {
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_with(f, 0)
    }
}

/// Arithmetic operators usable in expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithOp {
    Add,
    Sub,
    Rem,
}

impl ArithOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Rem => "%",
        }
    }
}

/// Literal values. Numeric text is kept exactly as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Int(String),
    Float(String),
    Bool(bool),
    Str(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(text) | Self::Float(text) => f.write_str(text),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Str(text) => write!(f, "\"{text}\""),
        }
    }
}

/// Operands of comparisons, emptiness checks and validate calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum Expr {
    Literal { value: Literal },
    Ident { name: String },
    Neg { operand: Box<Expr> },
    Binary {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident { name: name.into() }
    }

    pub fn int(text: impl Into<String>) -> Self {
        Self::Literal {
            value: Literal::Int(text.into()),
        }
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self::Literal {
            value: Literal::Str(text.into()),
        }
    }

    pub fn binary(left: Expr, op: ArithOp, right: Expr) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal { value } => write!(f, "{value}"),
            Self::Ident { name } => f.write_str(name),
            Self::Neg { operand } => write!(f, "-{operand}"),
            Self::Binary { op, left, right } => write!(f, "{left} {} {right}", op.as_str()),
        }
    }
}

impl fmt::Display for FieldDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldDecl({}, {})", self.field_type, self.name)
    }
}

impl fmt::Display for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDecl({}, [", self.name)?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}")?;
        }
        f.write_str("])")
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Check {
                verdict,
                condition,
                message,
            } => {
                write!(f, "{}({condition}", verdict.as_str())?;
                if let Some(message) = message {
                    write!(f, " -> \"{message}\"")?;
                }
                f.write_str(")")
            }
            Self::Validate { field, args } => {
                write!(f, "validate({field}")?;
                for arg in args {
                    write!(f, ", {arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for ValidatorDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValidatorDecl({}, [{}]", self.target, self.params.join(", "))?;
        if let Some(guard) = &self.guard {
            write!(f, ", if {guard}")?;
        }
        f.write_str(", [")?;
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{rule}")?;
        }
        f.write_str("])")
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Script(")?;
        for decl in &self.type_decls {
            write!(f, "\n\t{decl}")?;
        }
        for decl in &self.validator_decls {
            write!(f, "\n\t{decl}")?;
        }
        if !self.is_empty() {
            f.write_str("\n")?;
        }
        f.write_str(")")
    }
}
