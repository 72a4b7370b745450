use std::sync::Arc;

use clap::Parser;
use toolbelt_catalog::factory;
use toolbelt_core::api::{CommandSource, Engine};
use toolbelt_core::config;

mod commands;
mod logging;
mod tui;

use commands::cli::{Args, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let cfg = match &args.config {
        Some(path) => config::load_from(&config::expand_path(path))?,
        None => config::load_default()?,
    };

    let interactive = args.command.is_none();
    let _log_guard = logging::init(&cfg.logging, interactive)?;

    let catalog = factory::build_catalog(&cfg)?;
    let method = args.method.unwrap_or_else(|| factory::resolve_method(&cfg));

    match args.command {
        Some(Commands::List) => {
            for tool in catalog.tools() {
                println!("{tool}");
            }
            Ok(())
        }
        Some(Commands::Run(run_args)) => {
            let engine = Engine::new(
                Arc::new(catalog) as Arc<dyn CommandSource>,
                method,
                cfg.engine.clone(),
            );
            engine.set_selection(method, run_args.tools.clone(), run_args.action);
            let exit = commands::run::run(&engine, &run_args).await?;
            std::process::exit(exit);
        }
        None => {
            if !tui::check_tui_support() {
                anyhow::bail!("not a terminal; use `toolbelt run <action> <tools>...` instead");
            }
            let tools = catalog.tools();
            let engine = Engine::new(
                Arc::new(catalog) as Arc<dyn CommandSource>,
                method,
                cfg.engine.clone(),
            );
            let app = tui::TuiApp::new(engine, tools, method, cfg.engine.clear_after_secs);
            tui::run_tui(app).await
        }
    }
}
