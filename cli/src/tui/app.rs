use std::collections::BTreeSet;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use toolbelt_core::api::{Action, Engine, Method};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Collecting the sudo password; keystrokes go to the masked buffer.
    Password,
}

pub struct TuiApp {
    pub engine: Engine,
    pub tools: Vec<String>,
    pub cursor: usize,
    pub marked: BTreeSet<String>,
    pub method: Method,
    pub input_mode: InputMode,
    pub password: String,
    pub status: Option<String>,
    pub clear_after_secs: u64,
    quit: bool,
}

impl TuiApp {
    pub fn new(engine: Engine, tools: Vec<String>, method: Method, clear_after_secs: u64) -> Self {
        Self {
            engine,
            tools,
            cursor: 0,
            marked: BTreeSet::new(),
            method,
            input_mode: InputMode::Normal,
            password: String::new(),
            status: None,
            clear_after_secs,
            quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.abort();
            self.quit = true;
            return;
        }
        match self.input_mode {
            InputMode::Normal => self.on_normal_key(key),
            InputMode::Password => self.on_password_key(key),
        }
    }

    fn on_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.engine.is_running() {
                    self.abort();
                }
                self.quit = true;
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Char(' ') => self.toggle_current(),
            KeyCode::Char('a') => {
                self.marked = self.tools.iter().cloned().collect();
            }
            KeyCode::Char('n') => self.marked.clear(),
            KeyCode::Char('m') => self.cycle_method(),
            KeyCode::Char('p') => {
                if self.method.requires_privilege() {
                    self.password.clear();
                    self.input_mode = InputMode::Password;
                } else {
                    self.status = Some(format!("{} does not need a password", self.method));
                }
            }
            KeyCode::Char('i') => self.start(Action::Install),
            KeyCode::Char('u') => self.start(Action::Update),
            KeyCode::Char('d') => self.start(Action::Uninstall),
            KeyCode::Char('c') => self.start(Action::Check),
            KeyCode::Char('x') => {
                if self.engine.is_running() {
                    self.abort();
                    self.status = Some("aborting; in-flight commands are being cancelled".into());
                }
            }
            _ => {}
        }
    }

    fn on_password_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let secret = std::mem::take(&mut self.password);
                if secret.is_empty() {
                    self.engine.set_credential(None);
                    self.status = Some("password cleared".into());
                } else {
                    self.engine.set_credential(Some(secret));
                    self.status = Some("password stored for this run".into());
                }
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Esc => {
                self.password.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.password.pop();
            }
            KeyCode::Char(c) => self.password.push(c),
            _ => {}
        }
    }

    fn move_cursor(&mut self, delta: i32) {
        if self.tools.is_empty() {
            return;
        }
        let len = self.tools.len() as i32;
        self.cursor = (self.cursor as i32 + delta).rem_euclid(len) as usize;
    }

    fn toggle_current(&mut self) {
        let Some(tool) = self.tools.get(self.cursor) else {
            return;
        };
        if !self.marked.remove(tool) {
            self.marked.insert(tool.clone());
        }
    }

    fn cycle_method(&mut self) {
        if self.engine.is_running() {
            self.status = Some("cannot switch method during a run".into());
            return;
        }
        let idx = Method::ALL.iter().position(|m| *m == self.method).unwrap_or(0);
        self.method = Method::ALL[(idx + 1) % Method::ALL.len()];
    }

    fn start(&mut self, action: Action) {
        self.engine
            .set_selection(self.method, self.marked.iter().cloned(), action);
        match self.engine.start_run() {
            Ok(()) => {
                self.status = Some(format!(
                    "{action} started for {} tool(s)",
                    self.marked.len()
                ));
            }
            Err(_) => {
                self.status = self.engine.last_error();
            }
        }
    }

    fn abort(&mut self) {
        self.engine.request_abort();
        self.engine.cancel_run();
    }

    /// Summary banner shown after a run, auto-cleared a few seconds later.
    pub fn banner(&self) -> Option<String> {
        if !self.engine.is_done() {
            return None;
        }
        let since = self.engine.since_done()?;
        if since.as_secs() >= self.clear_after_secs {
            return None;
        }
        let results = self.engine.results();
        let failed = results.iter().filter(|r| !r.succeeded).count();
        Some(format!(
            "done: {} succeeded, {} failed in {}s",
            results.len() - failed,
            failed,
            self.engine.elapsed().map(|d| d.as_secs()).unwrap_or(0)
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use toolbelt_core::api::{CommandSource, EngineConfig};

    use super::*;

    struct NullSource;

    impl CommandSource for NullSource {
        fn resolve(&self, _m: Method, _t: &str, _a: Action) -> Option<String> {
            None
        }
    }

    fn app() -> TuiApp {
        let engine = Engine::new(
            Arc::new(NullSource) as Arc<dyn CommandSource>,
            Method::Script,
            EngineConfig::default(),
        );
        TuiApp::new(
            engine,
            vec!["bat".into(), "git".into(), "jq".into()],
            Method::Script,
            5,
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn space_toggles_marking() {
        let mut app = app();
        app.on_key(key(KeyCode::Char(' ')));
        assert!(app.marked.contains("bat"));
        app.on_key(key(KeyCode::Char(' ')));
        assert!(app.marked.is_empty());
    }

    #[test]
    fn cursor_wraps_around() {
        let mut app = app();
        app.on_key(key(KeyCode::Up));
        assert_eq!(app.cursor, 2);
        app.on_key(key(KeyCode::Down));
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn select_all_and_none() {
        let mut app = app();
        app.on_key(key(KeyCode::Char('a')));
        assert_eq!(app.marked.len(), 3);
        app.on_key(key(KeyCode::Char('n')));
        assert!(app.marked.is_empty());
    }

    #[test]
    fn starting_with_nothing_marked_surfaces_engine_error() {
        let mut app = app();
        app.on_key(key(KeyCode::Char('c')));
        assert_eq!(app.status.as_deref(), Some("no targets selected"));
    }

    #[test]
    fn method_cycles_through_all() {
        let mut app = app();
        let start = app.method;
        for _ in 0..Method::ALL.len() {
            app.on_key(key(KeyCode::Char('m')));
        }
        assert_eq!(app.method, start);
    }

    #[test]
    fn password_mode_collects_and_stores() {
        let mut app = app();
        app.method = Method::Apt;
        app.on_key(key(KeyCode::Char('p')));
        assert_eq!(app.input_mode, InputMode::Password);
        for c in "hunter2".chars() {
            app.on_key(key(KeyCode::Char(c)));
        }
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.engine.has_credential());
        assert!(app.password.is_empty());
    }

    #[test]
    fn q_quits() {
        let mut app = app();
        app.on_key(key(KeyCode::Char('q')));
        assert!(app.should_quit());
    }
}
