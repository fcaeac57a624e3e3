use console::{Style, Term};
use vscript_dsl::DslError;

use crate::cli::GlobalOpts;
use crate::diagnostic::render_diagnostic;
use crate::error::CliError;

/// Output format mode, selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

impl OutputMode {
    fn from_format(format: &str) -> Self {
        match format {
            "json" => Self::Json,
            "plain" => Self::Plain,
            _ => Self::Human,
        }
    }
}

/// Where command results and messages go.
///
/// Results are written to stdout. Everything else (per-file lines,
/// summaries in human mode, warnings, diagnostics) goes to stderr so that
/// stdout can be piped.
pub struct OutputContext {
    pub mode: OutputMode,
    pub quiet: bool,
    pub use_color: bool,
}

impl OutputContext {
    pub fn from_global(global: &GlobalOpts) -> Self {
        let use_color = !global.no_color
            && std::env::var("TERM").map_or(true, |t| t != "dumb")
            && Term::stderr().is_term();

        Self {
            mode: OutputMode::from_format(&global.format),
            quiet: global.quiet,
            use_color,
        }
    }

    fn tag(&self, label: &str, style: Style) -> String {
        if self.use_color {
            style.bold().apply_to(label).to_string()
        } else {
            label.to_string()
        }
    }

    /// One line per parsed file (human mode, not quiet).
    pub fn file_parsed(&self, filename: &str, types: usize, validators: usize) {
        if self.quiet || self.mode != OutputMode::Human {
            return;
        }
        eprintln!("  {filename} .... {types} types, {validators} validators");
    }

    /// Closing line of a human-mode run, tagged by whether anything failed.
    pub fn outcome(&self, ok: bool, msg: &str) {
        if self.quiet || self.mode != OutputMode::Human {
            return;
        }
        if ok {
            eprintln!("{} {msg}", self.tag("ok", Style::new().green()));
        } else {
            eprintln!("{} {msg}", self.tag("warning:", Style::new().yellow()));
        }
    }

    /// Print a warning to stderr (not in quiet mode).
    pub fn warn(&self, msg: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => {
                eprintln!("{} {msg}", self.tag("warning:", Style::new().yellow()));
            }
            OutputMode::Json => eprintln!("{}", serde_json::json!({ "warning": msg })),
            OutputMode::Plain => eprintln!("warning\t{msg}"),
        }
    }

    /// Report a script that failed to lex or parse.
    ///
    /// Human mode renders a miette diagnostic with the offending source
    /// underlined and plain mode prints one tab-separated line. JSON runs
    /// carry the error inside their result document instead.
    pub fn script_error(&self, error: &DslError, source_text: &str, filename: &str) {
        match self.mode {
            OutputMode::Human => {
                let report = render_diagnostic(error, source_text, filename);
                eprintln!("{report:?}");
            }
            OutputMode::Json => {}
            OutputMode::Plain => eprintln!("{filename}\terror\t{error}"),
        }
    }

    /// Report the error that ended the command.
    pub fn print_error(&self, err: &CliError) {
        if let (
            OutputMode::Human,
            CliError::Dsl {
                error,
                source_text,
                file,
            },
        ) = (self.mode, err)
        {
            self.script_error(error, source_text, &file.display().to_string());
            return;
        }
        match self.mode {
            OutputMode::Human => eprintln!("{} {err}", self.tag("error:", Style::new().red())),
            OutputMode::Json => eprintln!("{}", err.to_json()),
            OutputMode::Plain => eprintln!("error\t{err}"),
        }
    }

    /// Print JSON data to stdout.
    pub fn print_json(&self, value: &serde_json::Value) {
        if let Ok(s) = serde_json::to_string_pretty(value) {
            println!("{s}");
        }
    }
}
