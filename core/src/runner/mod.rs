pub mod exit;
mod run;
mod types;

pub use run::{run_command, RunRequest};
pub use types::CommandOutcome;
