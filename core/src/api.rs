//! Stable re-exports for consumers (`cli`, `catalog`, and external crates).
//!
//! Prefer importing from `toolbelt_core::api` instead of reaching into internal modules.

pub use crate::catalog::{Action, CommandSource, Method};
pub use crate::config::{AppConfig, EngineConfig, LoggingConfig};
pub use crate::engine::Engine;
pub use crate::error::EngineError;
pub use crate::runner::{run_command, CommandOutcome, RunRequest};
pub use crate::state::{ActionResult, RunState};
