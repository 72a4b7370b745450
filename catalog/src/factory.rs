use toolbelt_core::api::{AppConfig, Method};
use toolbelt_core::config::expand_path;
use tracing::warn;

use crate::detect::detect_method;
use crate::error::CatalogError;
use crate::static_catalog::StaticCatalog;

/// Builds the catalog: embedded defaults plus, when configured and present,
/// the user overlay file.
pub fn build_catalog(cfg: &AppConfig) -> Result<StaticCatalog, CatalogError> {
    let mut catalog = StaticCatalog::builtin()?;
    if let Some(raw_path) = &cfg.catalog_path {
        let path = expand_path(raw_path);
        if path.exists() {
            let s = std::fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                path: path.display().to_string(),
                source,
            })?;
            catalog.merge_toml(&s, &path.display().to_string())?;
        } else {
            warn!(path = %path.display(), "configured catalog overlay does not exist, using defaults");
        }
    }
    Ok(catalog)
}

/// Configured method if any, otherwise PATH-based auto-detection.
pub fn resolve_method(cfg: &AppConfig) -> Method {
    cfg.default_method.unwrap_or_else(detect_method)
}
