//! The engine's Action Dispatcher collaborator: a static, data-driven command
//! catalog keyed by (method, tool, action), built from embedded defaults with
//! an optional user overlay file.

mod detect;
mod error;
pub mod factory;
mod static_catalog;

pub use detect::detect_method;
pub use error::CatalogError;
pub use static_catalog::StaticCatalog;
