pub mod completions;
pub mod parse;
pub mod tokens;

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::CliError;

/// The path argument that selects standard input.
pub const STDIN_PATH: &str = "-";

/// Returns true if `path` names standard input.
pub fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN_PATH
}

/// Read a whole script from a file, or from stdin for `-`.
pub fn read_source(path: &Path) -> Result<String, CliError> {
    let io_error = |source: std::io::Error| CliError::Io {
        path: path.to_path_buf(),
        source,
    };

    if is_stdin(path) {
        let mut text = String::new();
        std::io::stdin()
            .lock()
            .read_to_string(&mut text)
            .map_err(io_error)?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).map_err(io_error)
    }
}

/// Display name for a script path in diagnostics.
pub fn display_name(path: &Path) -> String {
    if is_stdin(path) {
        "<stdin>".to_string()
    } else {
        path.display().to_string()
    }
}

/// Discover script files from a list of paths.
///
/// Paths can be files (used directly), `-` for stdin, or directories
/// (searched recursively for files matching `**/*.{extension}`).
pub fn discover_script_files(paths: &[PathBuf], extension: &str) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();

    for path in paths {
        if is_stdin(path) || path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let base = path.display().to_string();
            let pattern = format!("{}/**/*.{extension}", base.trim_end_matches('/'));
            let entries = glob::glob(&pattern).map_err(|e| CliError::Other(e.to_string()))?;
            for entry in entries {
                let entry = entry.map_err(|e| CliError::Other(e.to_string()))?;
                files.push(entry);
            }
        } else {
            return Err(CliError::NoScriptFiles { path: path.clone() });
        }
    }

    if files.is_empty() {
        let display_path = paths
            .first()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("scripts/"));
        return Err(CliError::NoScriptFiles { path: display_path });
    }

    files.sort();
    files.dedup();
    tracing::debug!(count = files.len(), "discovered script files");
    Ok(files)
}
