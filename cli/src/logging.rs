use std::path::PathBuf;

use toolbelt_core::api::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Interactive sessions log to a rolling file (stderr would corrupt the TUI);
/// headless runs log to stderr. `RUST_LOG` overrides the configured level.
pub fn init(cfg: &LoggingConfig, interactive: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.level.clone()));

    if !interactive {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    }

    let dir = cfg
        .dir
        .as_ref()
        .map(|d| toolbelt_core::config::expand_path(d))
        .or_else(|| dirs::data_dir().map(|d| d.join("toolbelt").join("logs")));
    let dir: PathBuf = match dir {
        Some(d) => d,
        // No place to write: drop logs rather than paint over the screen.
        None => return Ok(None),
    };
    std::fs::create_dir_all(&dir)?;
    let appender = tracing_appender::rolling::daily(dir, "toolbelt.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(Some(guard))
}
