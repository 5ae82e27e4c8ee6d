use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;
use std::io;

use super::app::{App, Mode};
use super::ui;

#[derive(Debug, PartialEq, Eq)]
pub enum ApplyResult {
    Continue,
    Quit,
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            // Only process key press events (Windows reports Press + Release)
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if handle_key(app, key) == ApplyResult::Quit {
                return Ok(());
            }
        }
    }
}

pub fn handle_key(app: &mut App, key: KeyEvent) -> ApplyResult {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return ApplyResult::Quit;
    }

    match app.mode {
        Mode::Browse => handle_browse_key(app, key),
        Mode::Form => {
            handle_form_key(app, key);
            ApplyResult::Continue
        }
    }
}

fn handle_browse_key(app: &mut App, key: KeyEvent) -> ApplyResult {
    match key.code {
        KeyCode::Char('q') => return ApplyResult::Quit,
        KeyCode::Left | KeyCode::Char('h') => app.cycle_column(-1),
        KeyCode::Right | KeyCode::Char('l') => app.cycle_column(1),
        KeyCode::Up | KeyCode::Char('k') => app.cycle_value(-1),
        KeyCode::Down | KeyCode::Char('j') => app.cycle_value(1),
        KeyCode::PageUp => app.scroll_rows(-1),
        KeyCode::PageDown => app.scroll_rows(1),
        KeyCode::Char('f') => app.open_fill_form(),
        KeyCode::Char('e') => app.open_edit_form(),
        KeyCode::Char('x') => app.export(),
        KeyCode::Char('r') => app.reload(),
        _ => {}
    }
    ApplyResult::Continue
}

fn handle_form_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_form(),
        KeyCode::Enter => app.submit_form(),
        KeyCode::Tab | KeyCode::Down => {
            if let Some(form) = app.form.as_mut() {
                form.next_field();
            }
        }
        KeyCode::BackTab | KeyCode::Up => {
            if let Some(form) = app.form.as_mut() {
                form.prev_field();
            }
        }
        _ => {
            if let Some(form) = app.form.as_mut() {
                form.handle_key(key);
            }
        }
    }
}
