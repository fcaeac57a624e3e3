use miette::{Diagnostic, NamedSource, SourceSpan};
use vscript_dsl::{DslError, LexError, ParseError, Span, TokenKind};

/// A diagnostic wrapping a `DslError` for rich miette rendering.
///
/// Provides source code highlighting, span labels, and actionable suggestions
/// when rendering lex and parse errors in human-readable mode.
///
/// The module-level `#[allow(unused_assignments)]` in main.rs is required
/// because miette's derive macro generates assignment patterns that rustc
/// flags as unused.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct ScriptDiagnostic {
    #[source_code]
    src: NamedSource<String>,

    #[label("{label}")]
    span: SourceSpan,

    message: String,
    label: String,

    #[help]
    suggestion: Option<String>,
}

/// Convert a `DslError` into a miette `ScriptDiagnostic`.
pub fn dsl_error_to_diagnostic(error: &DslError, source: &str, filename: &str) -> ScriptDiagnostic {
    let (label, suggestion) = match error {
        DslError::Lex(err) => describe_lex_error(err),
        DslError::Parse(err) => describe_parse_error(err),
    };

    ScriptDiagnostic {
        src: NamedSource::new(filename, source.to_string()),
        span: source_span(error.span(), source),
        message: error.to_string(),
        label,
        suggestion,
    }
}

/// Render a single error as a printable miette report.
pub fn render_diagnostic(error: &DslError, source: &str, filename: &str) -> miette::Report {
    miette::Report::new(dsl_error_to_diagnostic(error, source, filename))
}

fn describe_lex_error(error: &LexError) -> (String, Option<String>) {
    match error {
        LexError::InvalidCharacter { character, .. } => (
            format!("unexpected character {character:?}"),
            Some("Remove the character or move it inside a string literal.".to_string()),
        ),
        LexError::InvalidNumber { text, .. } => {
            let suggestion = if text.starts_with("00") {
                format!("Drop the extra leading zeros, e.g. '{}'.", trim_zeros(text))
            } else {
                "A number may contain at most one '.'.".to_string()
            };
            ("invalid number".to_string(), Some(suggestion))
        }
        LexError::UnterminatedString { .. } => (
            "string starts here".to_string(),
            Some("Add a closing '\"' to end the string.".to_string()),
        ),
        LexError::IncompleteOperator { operator, .. } => (
            format!("'{operator}' must be followed by '='"),
            Some(format!("Did you mean '{operator}='?")),
        ),
        LexError::UnexpectedEndOfInput { operator, .. } => (
            format!("input ends after '{operator}'"),
            Some(format!("Finish the expression after '{operator}'.")),
        ),
        LexError::Read { .. } => ("could not read input".to_string(), None),
        _ => ("error".to_string(), None),
    }
}

fn describe_parse_error(error: &ParseError) -> (String, Option<String>) {
    match error {
        ParseError::UnexpectedToken {
            expected, found, ..
        } => {
            let suggestion = (*found == TokenKind::Eof)
                .then(|| format!("The input ended early; add {}.", expected.description()));
            (format!("expected {}", expected.description()), suggestion)
        }
        ParseError::UnexpectedLexeme { expected, .. } => (format!("expected {expected}"), None),
        ParseError::InvalidKeyword { keyword, .. } => (
            format!("'{keyword}' cannot start a declaration"),
            Some("Declarations start with 'type' or 'validate'.".to_string()),
        ),
        ParseError::NestingTooDeep { limit, .. } => (
            format!("nesting limit of {limit} reached here"),
            Some("Split the condition into separate rules or drop redundant nesting.".to_string()),
        ),
        _ => ("error".to_string(), None),
    }
}

/// An empty span at end of input is widened to the last character.
fn source_span(span: Option<Span>, source: &str) -> SourceSpan {
    let Some(span) = span else {
        return (0, 0).into();
    };
    if span.is_empty() && span.start >= source.len() {
        if let Some((offset, c)) = source.char_indices().next_back() {
            return (offset, c.len_utf8()).into();
        }
    }
    (span.start, span.len()).into()
}

fn trim_zeros(text: &str) -> String {
    let trimmed = text.trim_start_matches('0');
    if trimmed.is_empty() || trimmed.starts_with('.') {
        format!("0{trimmed}")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnose(source: &str) -> ScriptDiagnostic {
        let err = vscript_dsl::parse(source).unwrap_err();
        dsl_error_to_diagnostic(&err, source, "test.vs")
    }

    #[test]
    fn invalid_character_diagnostic() {
        let diag = diagnose("type A { int x# ; }");
        assert!(diag.label.contains("'#'"));
        assert!(diag.suggestion.is_some());
        assert_eq!(diag.span, SourceSpan::from((14, 1)));
    }

    #[test]
    fn leading_zeros_suggest_trimmed_number() {
        let diag = diagnose("validate on A() { allow x > 007; }");
        assert_eq!(diag.label, "invalid number");
        assert!(diag.suggestion.as_ref().unwrap().contains("'7'"));
    }

    #[test]
    fn extra_dot_suggestion() {
        let diag = diagnose("validate on A() { allow x > 1.2.3; }");
        assert!(diag.suggestion.as_ref().unwrap().contains("at most one"));
    }

    #[test]
    fn incomplete_operator_diagnostic() {
        let diag = diagnose("validate on A() { allow x ! 1; }");
        assert!(diag.suggestion.as_ref().unwrap().contains("'!='"));
    }

    #[test]
    fn operator_at_end_of_input_diagnostic() {
        let diag = diagnose("validate on A() { allow x <");
        assert_eq!(diag.label, "input ends after '<'");
        assert_eq!(diag.span, SourceSpan::from((26, 1)));
    }

    #[test]
    fn nesting_too_deep_diagnostic() {
        let source = format!("validate on A() if {}x {{ }}", "not ".repeat(1_000));
        let diag = diagnose(&source);
        assert!(diag.message.contains("nesting too deep"));
        assert!(diag.label.contains("256"));
        assert!(diag.suggestion.is_some());
    }

    #[test]
    fn unexpected_token_diagnostic() {
        let diag = diagnose("type { }");
        assert!(diag.message.contains("expected identifier"));
        assert_eq!(diag.label, "expected identifier");
        assert!(diag.suggestion.is_none());
        assert_eq!(diag.span, SourceSpan::from((5, 1)));
    }

    #[test]
    fn end_of_input_points_at_last_character() {
        let source = "type A { int x;";
        let diag = diagnose(source);
        assert!(diag.suggestion.as_ref().unwrap().contains("ended early"));
        assert_eq!(diag.span, SourceSpan::from((source.len() - 1, 1)));
    }

    #[test]
    fn invalid_keyword_diagnostic() {
        let diag = diagnose("allow x;");
        assert!(diag.label.contains("'allow'"));
        assert!(diag.suggestion.as_ref().unwrap().contains("'type'"));
    }

    #[test]
    fn render_produces_report() {
        let source = "type { }";
        let err = vscript_dsl::parse(source).unwrap_err();
        let report = render_diagnostic(&err, source, "test.vs");
        assert!(report.to_string().contains("expected identifier"));
    }

    #[test]
    fn trim_zeros_keeps_a_digit() {
        assert_eq!(trim_zeros("007"), "7");
        assert_eq!(trim_zeros("00"), "0");
        assert_eq!(trim_zeros("00.5"), "0.5");
    }
}
