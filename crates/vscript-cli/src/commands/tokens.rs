use vscript_dsl::SpannedToken;

use crate::cli::TokensArgs;
use crate::commands::{display_name, read_source};
use crate::error::CliError;
use crate::output::{OutputContext, OutputMode};

/// Run the `tokens` command: lex one script and dump its token stream.
pub fn run(args: TokensArgs, output: &OutputContext) -> Result<(), CliError> {
    let source_text = read_source(&args.path)?;

    let tokens = match vscript_dsl::tokenize(&source_text) {
        Ok(tokens) => tokens,
        Err(error) => {
            return Err(CliError::Dsl {
                error: error.into(),
                source_text,
                file: display_name(&args.path).into(),
            });
        }
    };

    match output.mode {
        OutputMode::Human => {
            for st in &tokens {
                println!("{:>12}  {}", st.span.to_string(), st.token);
            }
        }
        OutputMode::Plain => {
            for st in &tokens {
                println!(
                    "{}\t{}\t{}\t{}",
                    st.span.start,
                    st.span.end,
                    st.token.kind(),
                    st.token.lexeme().unwrap_or_default()
                );
            }
        }
        OutputMode::Json => {
            let list: Vec<serde_json::Value> = tokens.iter().map(token_json).collect();
            output.print_json(&serde_json::Value::Array(list));
        }
    }

    Ok(())
}

fn token_json(st: &SpannedToken) -> serde_json::Value {
    serde_json::json!({
        "kind": st.token.kind().name(),
        "value": st.token.lexeme(),
        "span": { "start": st.span.start, "end": st.span.end },
    })
}
