use serde::{Deserialize, Serialize};

use crate::catalog::Method;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Method to use when none is given on the command line. When absent the
    /// first system package manager found on PATH wins.
    #[serde(default)]
    pub default_method: Option<Method>,

    /// Extra catalog file overlaid on the built-in defaults. Supports `~`.
    #[serde(default)]
    pub catalog_path: Option<String>,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Deadline for install/update/uninstall commands.
    #[serde(default = "default_action_timeout_secs")]
    pub action_timeout_secs: u64,

    /// Deadline for check commands; these are fast liveness probes.
    #[serde(default = "default_check_timeout_secs")]
    pub check_timeout_secs: u64,

    /// Animation tick period for pollers.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Cap on concurrently running commands. `None` means one task per target.
    #[serde(default)]
    pub max_parallel: Option<usize>,

    /// Seconds the UI keeps the finished-run banner before clearing it.
    #[serde(default = "default_clear_after_secs")]
    pub clear_after_secs: u64,
}

fn default_action_timeout_secs() -> u64 {
    600
}

fn default_check_timeout_secs() -> u64 {
    30
}

fn default_tick_interval_ms() -> u64 {
    100
}

fn default_clear_after_secs() -> u64 {
    5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            action_timeout_secs: default_action_timeout_secs(),
            check_timeout_secs: default_check_timeout_secs(),
            tick_interval_ms: default_tick_interval_ms(),
            max_parallel: None,
            clear_after_secs: default_clear_after_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log directory for TUI sessions (stderr would corrupt the screen).
    /// Defaults to the platform data dir when absent.
    #[serde(default)]
    pub dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}
