use clap::{Args as ClapArgs, Parser, Subcommand};
use toolbelt_core::api::{Action, Method};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "toolbelt",
    version,
    about = "Concurrent installer/updater/checker for common dev tools"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Package manager to use (apt, dnf, pacman, brew, script).
    /// Auto-detected from PATH when omitted.
    #[arg(long, global = true)]
    pub method: Option<Method>,

    /// Alternate config file (default: ~/.config/toolbelt/config.toml).
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run one action over a set of tools without the TUI.
    Run(RunArgs),
    /// List the tools known to the catalog.
    List,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    /// install | update | uninstall | check
    pub action: Action,

    /// Tools to operate on.
    #[arg(required = true)]
    pub tools: Vec<String>,

    /// Emit results as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Read the sudo password from the first line of stdin
    /// (only used by privileged methods).
    #[arg(long, default_value_t = false)]
    pub ask_pass: bool,
}
