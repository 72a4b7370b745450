mod load;
mod types;

pub use load::{default_config_path, expand_path, load_default, load_from};
pub use types::{AppConfig, EngineConfig, LoggingConfig};
