use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Lexer and parser for the vscript data-declaration language.
///
/// vscript declares record types and the validators that guard them.
/// This tool parses scripts, reports diagnostics, and prints the resulting
/// syntax tree or the raw token stream.
#[derive(Parser)]
#[command(
    name = "vscript",
    version,
    about = "Lexer and parser for the vscript data-declaration language",
    after_help = "Use 'vscript <command> --help' for more information about a command.",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Global options available to all subcommands.
#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Configuration file path [env: VSCRIPT_CONFIG]
    #[arg(short = 'c', long = "config", global = true, env = "VSCRIPT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format: human (default), json, plain
    #[arg(
        long,
        global = true,
        default_value = "human",
        value_parser = ["human", "json", "plain"]
    )]
    pub format: String,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all non-error output
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output [env: NO_COLOR]
    #[arg(long = "no-color", global = true, env = "NO_COLOR")]
    pub no_color: bool,
}

/// Top-level subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Parse and validate .vs script files
    Parse(ParseArgs),

    /// Dump the token stream of a script
    Tokens(TokensArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

/// Arguments for `vscript parse`.
#[derive(Args)]
pub struct ParseArgs {
    /// Script files or directories to parse; `-` reads stdin
    /// (default: the configured script directory)
    pub paths: Vec<PathBuf>,

    /// Print the parsed scripts as canonical DSL (ignored with --format json)
    #[arg(long = "print", conflicts_with = "tree")]
    pub print_ast: bool,

    /// Print the parsed syntax tree (ignored with --format json)
    #[arg(long = "tree")]
    pub tree: bool,
}

/// Arguments for `vscript tokens`.
#[derive(Args)]
pub struct TokensArgs {
    /// Script file to tokenize; `-` reads stdin
    pub path: PathBuf,
}

/// Arguments for `vscript completions`.
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_parser = ["bash", "zsh", "fish", "powershell", "elvish"])]
    pub shell: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_defaults() {
        let cli = Cli::try_parse_from(["vscript", "parse"]).unwrap();
        assert_eq!(cli.global.format, "human");
        assert_eq!(cli.global.verbose, 0);
        match cli.command {
            Commands::Parse(args) => {
                assert!(args.paths.is_empty());
                assert!(!args.print_ast);
                assert!(!args.tree);
            }
            _ => panic!("expected parse command"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["vscript", "tokens", "a.vs", "--format", "json", "-vv"]).unwrap();
        assert_eq!(cli.global.format, "json");
        assert_eq!(cli.global.verbose, 2);
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["vscript", "--format", "xml", "parse"]).is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["vscript", "-q", "-v", "parse"]).is_err());
    }

    #[test]
    fn print_conflicts_with_tree() {
        assert!(Cli::try_parse_from(["vscript", "parse", "--print", "--tree"]).is_err());
    }

    #[test]
    fn completions_rejects_unknown_shell() {
        assert!(Cli::try_parse_from(["vscript", "completions", "tcsh"]).is_err());
    }

    #[test]
    fn tokens_requires_path() {
        assert!(Cli::try_parse_from(["vscript", "tokens"]).is_err());
    }
}
