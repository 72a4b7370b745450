use thiserror::Error;

/// Synchronous, user-visible failures of the engine surface.
///
/// Per-target failures (missing command, nonzero exit, timeout, cancellation,
/// spawn fault) are never errors; they are captured in
/// [`crate::state::ActionResult`] entries instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no targets selected")]
    NoTargets,

    #[error("a run is already in progress")]
    RunInProgress,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
