use std::path::PathBuf;

use vscript_dsl::DslError;

/// Exit codes for the CLI process.
///
/// Each variant maps to a numeric exit code following standard conventions:
/// - 0: success
/// - 1: general error
/// - 2: invalid arguments / configuration error
/// - 3: lex or parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidArguments = 2,
    ParseError = 3,
}

/// Errors returned by CLI command handlers.
///
/// Each variant maps to an `ExitCode` and can produce structured
/// output in JSON mode.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A lex or parse error in a single script.
    #[error("{file}: {error}")]
    Dsl {
        error: DslError,
        source_text: String,
        file: PathBuf,
    },

    /// Several scripts failed; their diagnostics were already reported.
    #[error("{failed} of {total} scripts failed to parse")]
    ScriptsFailed { failed: usize, total: usize },

    /// IO errors (file not found, permission denied).
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Script file or directory not found.
    #[error("no script files found in {path}")]
    NoScriptFiles { path: PathBuf },

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Maps this error to the appropriate exit code.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Dsl { .. } | Self::ScriptsFailed { .. } => ExitCode::ParseError,
            Self::Config { .. } | Self::NoScriptFiles { .. } => ExitCode::InvalidArguments,
            Self::Io { .. } | Self::Other(_) => ExitCode::GeneralError,
        }
    }

    /// Serializes this error as a JSON value for `--format json` output.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Dsl { error, file, .. } => {
                let kind = match error {
                    DslError::Lex(_) => "lex_error",
                    DslError::Parse(_) => "parse_error",
                };
                let mut json = serde_json::json!({
                    "error": kind,
                    "file": file.display().to_string(),
                    "message": error.to_string(),
                });
                if let Some(span) = error.span() {
                    json["span"] = serde_json::json!({ "start": span.start, "end": span.end });
                }
                json
            }
            Self::ScriptsFailed { failed, total } => serde_json::json!({
                "error": "parse_error",
                "failed": failed,
                "total": total,
            }),
            Self::Io { path, source } => serde_json::json!({
                "error": "io_error",
                "path": path.display().to_string(),
                "message": source.to_string(),
            }),
            Self::Config { message } => serde_json::json!({
                "error": "config_error",
                "message": message,
            }),
            other => serde_json::json!({
                "error": "error",
                "message": other.to_string(),
            }),
        }
    }
}
