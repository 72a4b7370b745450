//! Boundary between the engine and the command catalog.
//!
//! Resolution is synchronous and side-effect free; the engine treats a missing
//! command as a per-target failure, never as a fault.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Package manager or installation mechanism used for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Apt,
    Dnf,
    Pacman,
    Brew,
    Script,
}

impl Method {
    pub const ALL: [Method; 5] = [
        Method::Apt,
        Method::Dnf,
        Method::Pacman,
        Method::Brew,
        Method::Script,
    ];

    /// True for methods that write outside the user's home directory and
    /// therefore run under `sudo -S` with a piped credential.
    pub fn requires_privilege(self) -> bool {
        matches!(self, Method::Apt | Method::Dnf | Method::Pacman)
    }

    /// Binary probed on PATH when auto-detecting the method.
    pub fn probe_binary(self) -> &'static str {
        match self {
            Method::Apt => "apt-get",
            Method::Dnf => "dnf",
            Method::Pacman => "pacman",
            Method::Brew => "brew",
            Method::Script => "sh",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Apt => "apt",
            Method::Dnf => "dnf",
            Method::Pacman => "pacman",
            Method::Brew => "brew",
            Method::Script => "script",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "apt" | "apt-get" => Ok(Method::Apt),
            "dnf" => Ok(Method::Dnf),
            "pacman" => Ok(Method::Pacman),
            "brew" | "homebrew" => Ok(Method::Brew),
            "script" => Ok(Method::Script),
            other => Err(format!("unknown method: {other}")),
        }
    }
}

/// Operation applied to every selected target during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Install,
    Update,
    Uninstall,
    Check,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Install => "install",
            Action::Update => "update",
            Action::Uninstall => "uninstall",
            Action::Check => "check",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "install" => Ok(Action::Install),
            "update" | "upgrade" => Ok(Action::Update),
            "uninstall" | "remove" => Ok(Action::Uninstall),
            "check" => Ok(Action::Check),
            other => Err(format!("unknown action: {other}")),
        }
    }
}

/// Resolves the shell command for one (method, target, action) triple.
///
/// `None` means no command exists for the triple; the engine records a failed
/// [`crate::state::ActionResult`] without invoking the command runner.
pub trait CommandSource: Send + Sync {
    fn resolve(&self, method: Method, target: &str, action: Action) -> Option<String>;
}
