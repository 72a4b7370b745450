use std::collections::HashMap;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;
use toolbelt_core::api::ActionResult;
use toolbelt_core::state::ANIMATION_FRAMES;

use super::app::{InputMode, TuiApp};

const SPINNER: [char; ANIMATION_FRAMES as usize] =
    ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub fn draw(f: &mut Frame, app: &TuiApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(8),
            Constraint::Length(3),
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_tools(f, app, chunks[1]);
    draw_output(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);
}

fn draw_header(f: &mut Frame, app: &TuiApp, area: Rect) {
    let engine = &app.engine;
    let mut spans = vec![
        Span::styled("toolbelt ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!("[{}] ", app.method)),
    ];
    if engine.is_running() {
        let frame = SPINNER[engine.animation_frame() as usize % SPINNER.len()];
        let (_, targets, action) = engine.selection();
        spans.push(Span::styled(
            format!(
                "{frame} {action} {}/{} ",
                engine.completed_count(),
                targets.len()
            ),
            Style::default().fg(Color::Yellow),
        ));
        if let Some(elapsed) = engine.elapsed() {
            spans.push(Span::raw(format!("{}s", elapsed.as_secs())));
        }
    } else if let Some(banner) = app.banner() {
        spans.push(Span::styled(banner, Style::default().fg(Color::Green)));
    } else {
        spans.push(Span::raw(format!(
            "{} marked — i/u/d/c to act",
            app.marked.len()
        )));
    }
    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_tools(f: &mut Frame, app: &TuiApp, area: Rect) {
    let results = app.engine.results();
    let by_target: HashMap<&str, &ActionResult> = results
        .iter()
        .map(|r| (r.target.as_str(), r))
        .collect();

    let items: Vec<ListItem> = app
        .tools
        .iter()
        .enumerate()
        .map(|(i, tool)| {
            let cursor = if i == app.cursor { ">" } else { " " };
            let mark = if app.marked.contains(tool) { "[x]" } else { "[ ]" };
            let mut spans = vec![Span::raw(format!("{cursor} {mark} {tool:<14}"))];
            if let Some(result) = by_target.get(tool.as_str()) {
                if result.succeeded {
                    spans.push(Span::styled("✓ ", Style::default().fg(Color::Green)));
                } else {
                    spans.push(Span::styled("✗ ", Style::default().fg(Color::Red)));
                }
                if !result.message.is_empty() {
                    spans.push(Span::raw(result.message.clone()));
                }
            }
            let style = if i == app.cursor {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(spans)).style(style)
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("tools"));
    f.render_widget(list, area);
}

fn draw_output(f: &mut Frame, app: &TuiApp, area: Rect) {
    let output = app.engine.accumulated_output();
    let visible = area.height.saturating_sub(2) as usize;
    let mut tail: Vec<Line> = output
        .lines()
        .rev()
        .take(visible)
        .map(|l| Line::from(l.to_string()))
        .collect();
    tail.reverse();
    let pane = Paragraph::new(tail)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("output"));
    f.render_widget(pane, area);
}

fn draw_footer(f: &mut Frame, app: &TuiApp, area: Rect) {
    let line = match app.input_mode {
        InputMode::Password => Line::from(vec![
            Span::raw("password: "),
            Span::raw("*".repeat(app.password.chars().count())),
            Span::styled("  (enter to store, esc to cancel)", Style::default().fg(Color::DarkGray)),
        ]),
        InputMode::Normal => {
            if let Some(status) = app.status.as_deref() {
                Line::from(Span::styled(status.to_string(), Style::default().fg(Color::Cyan)))
            } else {
                Line::from(Span::styled(
                    "space mark  a all  n none  m method  p password  i install  u update  d uninstall  c check  x abort  q quit",
                    Style::default().fg(Color::DarkGray),
                ))
            }
        }
    };
    let footer = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}
