//! TUI module: terminal input, application state (TuiApp) and rendering (ui).

pub(crate) mod app;
pub(crate) mod events;
mod terminal;
pub(crate) mod ui;

use std::time::Duration;

pub use app::{InputMode, TuiApp};
pub use terminal::{check_tui_support, restore_terminal, setup_terminal};

use events::TuiEvent;

/// Draw/poll loop. The engine is never awaited here; the screen refresh
/// cadence doubles as the polling cadence for the engine's snapshots.
pub async fn run_tui(mut app: TuiApp) -> anyhow::Result<()> {
    let mut terminal = setup_terminal()?;
    let res = run_loop(&mut terminal, &mut app).await;
    restore_terminal(&mut terminal)?;
    res
}

async fn run_loop(
    terminal: &mut ratatui::Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>,
    app: &mut TuiApp,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;
        match events::next_event(Duration::from_millis(100))? {
            TuiEvent::Key(key) => app.on_key(key),
            TuiEvent::Tick => {}
        }
        if app.should_quit() {
            return Ok(());
        }
    }
}
