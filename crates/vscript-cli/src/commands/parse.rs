use std::path::PathBuf;

use vscript_dsl::Script;

use crate::cli::{GlobalOpts, ParseArgs};
use crate::commands::{discover_script_files, display_name, read_source};
use crate::config::load_config;
use crate::error::CliError;
use crate::output::{OutputContext, OutputMode};

/// Run the `parse` command: parse script files and render diagnostics.
pub fn run(args: ParseArgs, global: &GlobalOpts, output: &OutputContext) -> Result<(), CliError> {
    let config = load_config(global.config.as_deref())?;
    let paths = if args.paths.is_empty() {
        vec![PathBuf::from(&config.cli.default_script_dir)]
    } else {
        args.paths
    };
    let files = discover_script_files(&paths, &config.cli.script_extension)?;

    let mut total_types = 0usize;
    let mut total_validators = 0usize;
    let mut failed = 0usize;
    let mut all_file_results: Vec<serde_json::Value> = Vec::new();

    // JSON results already carry each AST, and stdout must stay one document.
    let print_text = (args.print_ast || args.tree) && output.mode != OutputMode::Json;
    if (args.print_ast || args.tree) && !print_text {
        output.warn("--print and --tree are ignored with --format json; see results[].ast");
    }

    for file in &files {
        let source_text = read_source(file)?;
        let filename = display_name(file);
        tracing::info!(file = %filename, bytes = source_text.len(), "parsing script");

        match vscript_dsl::parse(&source_text) {
            Ok(script) => {
                total_types += script.type_decls.len();
                total_validators += script.validator_decls.len();

                if print_text {
                    if args.print_ast {
                        print!("{}", vscript_dsl::print(&script));
                    } else {
                        println!("{script}");
                    }
                }

                if output.mode == OutputMode::Json {
                    all_file_results.push(file_result(&filename, Some(&script), None));
                } else {
                    output.file_parsed(
                        &filename,
                        script.type_decls.len(),
                        script.validator_decls.len(),
                    );
                }
            }
            Err(error) => {
                failed += 1;
                tracing::debug!(file = %filename, %error, "script failed to parse");

                output.script_error(&error, &source_text, &filename);
                if output.mode == OutputMode::Json {
                    let err = CliError::Dsl {
                        error,
                        source_text,
                        file: file.clone(),
                    };
                    all_file_results.push(file_result(&filename, None, Some(err.to_json())));
                }
            }
        }
    }

    // Summary
    let summary = format!(
        "{total_types} types, {total_validators} validators parsed from {} files, {failed} errors",
        files.len()
    );
    match output.mode {
        OutputMode::Human => output.outcome(failed == 0, &summary),
        OutputMode::Json => {
            output.print_json(&serde_json::json!({
                "files": files.len(),
                "types": total_types,
                "validators": total_validators,
                "errors": failed,
                "results": all_file_results,
            }));
        }
        OutputMode::Plain => {
            let line = format!("{}\t{total_types}\t{total_validators}\t{failed}", files.len());
            // Printed scripts own stdout; the counts move aside.
            if print_text {
                eprintln!("{line}");
            } else {
                println!("{line}");
            }
        }
    }

    if failed > 0 {
        Err(CliError::ScriptsFailed {
            failed,
            total: files.len(),
        })
    } else {
        Ok(())
    }
}

fn file_result(
    filename: &str,
    script: Option<&Script>,
    error: Option<serde_json::Value>,
) -> serde_json::Value {
    let ast = script
        .and_then(|s| serde_json::to_value(s).ok())
        .unwrap_or(serde_json::Value::Null);
    serde_json::json!({
        "file": filename,
        "types": script.map_or(0, |s| s.type_decls.len()),
        "validators": script.map_or(0, |s| s.validator_decls.len()),
        "error": error,
        "ast": ast,
    })
}
