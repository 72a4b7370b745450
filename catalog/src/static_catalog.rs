use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Deserialize;
use toolbelt_core::api::{Action, CommandSource, Method};
use tracing::warn;

use crate::error::CatalogError;

const DEFAULTS: &str = include_str!("defaults.toml");

/// TOML shape: `[tool.method]` tables with one key per action.
///
/// ```toml
/// [git.apt]
/// install = "sudo -S apt-get install -y git"
/// check = "git --version"
/// ```
type RawCatalog = BTreeMap<String, BTreeMap<String, RawCommands>>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCommands {
    install: Option<String>,
    update: Option<String>,
    uninstall: Option<String>,
    check: Option<String>,
}

impl RawCommands {
    fn get(&self, action: Action) -> Option<&String> {
        match action {
            Action::Install => self.install.as_ref(),
            Action::Update => self.update.as_ref(),
            Action::Uninstall => self.uninstall.as_ref(),
            Action::Check => self.check.as_ref(),
        }
    }
}

/// In-memory catalog. Resolution is a plain map lookup: synchronous, pure,
/// side-effect free.
pub struct StaticCatalog {
    entries: HashMap<(Method, String, Action), String>,
    tools: BTreeSet<String>,
}

impl StaticCatalog {
    /// The embedded default catalog.
    pub fn builtin() -> Result<Self, CatalogError> {
        let mut catalog = Self {
            entries: HashMap::new(),
            tools: BTreeSet::new(),
        };
        catalog.merge_toml(DEFAULTS, "<builtin>")?;
        Ok(catalog)
    }

    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            tools: BTreeSet::new(),
        }
    }

    /// Overlays `raw` on top of the current entries; later sources win per
    /// (method, tool, action) triple. Unknown method names are skipped with a
    /// warning rather than rejecting the whole file.
    pub fn merge_toml(&mut self, raw: &str, origin: &str) -> Result<(), CatalogError> {
        let parsed: RawCatalog = toml::from_str(raw).map_err(|source| CatalogError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        for (tool, methods) in parsed {
            self.tools.insert(tool.clone());
            for (method_name, commands) in methods {
                let Ok(method) = method_name.parse::<Method>() else {
                    warn!(%tool, method = %method_name, %origin, "skipping unknown method in catalog");
                    continue;
                };
                for action in [
                    Action::Install,
                    Action::Update,
                    Action::Uninstall,
                    Action::Check,
                ] {
                    if let Some(cmd) = commands.get(action) {
                        self.entries
                            .insert((method, tool.clone(), action), cmd.clone());
                    }
                }
            }
        }
        Ok(())
    }

    /// Every tool named anywhere in the catalog, sorted.
    pub fn tools(&self) -> Vec<String> {
        self.tools.iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CommandSource for StaticCatalog {
    fn resolve(&self, method: Method, target: &str, action: Action) -> Option<String> {
        self.entries
            .get(&(method, target.to_string(), action))
            .cloned()
    }
}
