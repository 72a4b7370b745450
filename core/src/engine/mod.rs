mod run;
mod ticker;

pub use run::Engine;
