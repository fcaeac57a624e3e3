use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CliError;

/// CLI configuration loaded from `vscript.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    #[serde(default)]
    pub cli: CliSettings,
}

/// CLI-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliSettings {
    #[serde(default = "default_script_dir")]
    pub default_script_dir: String,
    /// File extension (without the dot) used when scanning directories.
    #[serde(default = "default_script_extension")]
    pub script_extension: String,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            default_script_dir: default_script_dir(),
            script_extension: default_script_extension(),
        }
    }
}

fn default_script_dir() -> String {
    "scripts/".to_string()
}

fn default_script_extension() -> String {
    "vs".to_string()
}

/// Discovery order for config file:
/// 1. `--config <path>` (explicit)
/// 2. `VSCRIPT_CONFIG` env var
/// 3. `./vscript.toml` (project-local)
/// 4. `$XDG_CONFIG_HOME/vscript/config.toml`
/// 5. `~/.config/vscript/config.toml`
pub fn load_config(explicit_path: Option<&Path>) -> Result<CliConfig, CliError> {
    if let Some(path) = explicit_path {
        return load_config_from_path(path);
    }

    if let Ok(env_path) = std::env::var("VSCRIPT_CONFIG") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    let local = PathBuf::from("vscript.toml");
    if local.exists() {
        return load_config_from_path(&local);
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg).join("vscript/config.toml");
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    if let Some(home) = std::env::var_os("HOME") {
        let path = PathBuf::from(home).join(".config/vscript/config.toml");
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    tracing::debug!("no config file found, using defaults");
    Ok(CliConfig::default())
}

fn load_config_from_path(path: &Path) -> Result<CliConfig, CliError> {
    tracing::debug!(path = %path.display(), "loading config");
    let contents = std::fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_config(&contents).map_err(|message| CliError::Config {
        message: format!("failed to parse {}: {}", path.display(), message),
    })
}

fn parse_config(contents: &str) -> Result<CliConfig, String> {
    toml::from_str(contents).map_err(|e| e.to_string())
}
