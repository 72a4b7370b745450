use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog {origin}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },
}
