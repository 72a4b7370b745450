use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::types::AppConfig;

/// `~/.config/toolbelt/config.toml` (platform equivalent).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("toolbelt").join("config.toml"))
}

pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str::<AppConfig>(&s).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_default() -> Result<AppConfig, ConfigError> {
    let mut cfg = match default_config_path() {
        Some(path) if path.exists() => load_from(&path)?,
        _ => AppConfig::default(),
    };

    if let Ok(v) = std::env::var("TOOLBELT_METHOD") {
        if let Ok(method) = v.parse() {
            cfg.default_method = Some(method);
        }
    }
    if let Ok(v) = std::env::var("TOOLBELT_CATALOG") {
        if !v.trim().is_empty() {
            cfg.catalog_path = Some(v);
        }
    }
    if let Ok(v) = std::env::var("TOOLBELT_MAX_PARALLEL") {
        if let Ok(n) = v.parse::<usize>() {
            cfg.engine.max_parallel = Some(n.max(1));
        }
    }

    Ok(cfg)
}

/// Expands `~` in a user-supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}
