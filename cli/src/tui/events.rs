use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

pub enum TuiEvent {
    Key(KeyEvent),
    Tick,
}

/// Waits up to `timeout` for a key press; anything else (or a timeout) is a
/// tick so the caller redraws at a steady cadence.
pub fn next_event(timeout: Duration) -> anyhow::Result<TuiEvent> {
    if event::poll(timeout)? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(TuiEvent::Key(key));
            }
        }
    }
    Ok(TuiEvent::Tick)
}
