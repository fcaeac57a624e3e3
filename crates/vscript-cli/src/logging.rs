use tracing_subscriber::EnvFilter;

use crate::cli::GlobalOpts;

/// Install the stderr fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level follows `-q` / `-v`.
pub fn init(global: &GlobalOpts) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(global.verbose, global.quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!global.no_color)
        .with_target(false)
        .try_init();
}

fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
